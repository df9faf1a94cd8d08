//! Session Manager - session lifetime, timeouts and speaking timers.
//!
//! Owns three independently cancellable timers:
//!
//! - idle: re-armed by every `record_activity`; firing raises
//!   `IdleTimeout` and ends the session
//! - listen: armed between `start_listening` and `stop_listening`; firing
//!   raises `ListenTimeout`
//! - max duration: armed once at session start; firing raises
//!   `MaxDurationReached` and leaves the wind-down to the owner
//!
//! Timers are tokio tasks holding a weak reference to the manager. Each
//! carries a token; a task whose token no longer matches the armed one has
//! been superseded and does nothing.
//!
//! Events are delivered synchronously to every registered listener. A
//! panicking listener is logged and does not stop delivery to the others.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::domain::foundation::{SessionId, Timestamp};
use crate::domain::voice::{ConversationSession, SessionEvent};

pub type SessionListener = Arc<dyn Fn(&SessionEvent) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSettings {
    /// Zero disables the timer.
    pub idle_timeout: Duration,
    /// Zero disables the timer.
    pub listen_timeout: Duration,
    /// Zero disables the timer.
    pub max_duration: Duration,
    /// Final stretch of the max duration reported by `is_session_expiring`.
    pub expiring_window: Duration,
    /// Minimum robot speaking time before the visitor may interrupt.
    pub barge_in_min_speaking: Duration,
    pub auto_restart: bool,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            idle_timeout: Duration::from_secs(60),
            listen_timeout: Duration::from_secs(15),
            max_duration: Duration::from_secs(600),
            expiring_window: Duration::from_secs(30),
            barge_in_min_speaking: Duration::from_millis(500),
            auto_restart: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerKind {
    Idle,
    Listen,
    MaxDuration,
}

#[derive(Debug)]
struct Timer {
    token: u64,
    handle: JoinHandle<()>,
}

#[derive(Debug, Default)]
struct Inner {
    session: ConversationSession,
    started_at: Option<Instant>,
    speaking_since: Option<Instant>,
    idle: Option<Timer>,
    listen: Option<Timer>,
    max_duration: Option<Timer>,
    next_token: u64,
}

impl Inner {
    fn slot(&mut self, kind: TimerKind) -> &mut Option<Timer> {
        match kind {
            TimerKind::Idle => &mut self.idle,
            TimerKind::Listen => &mut self.listen,
            TimerKind::MaxDuration => &mut self.max_duration,
        }
    }

    fn cancel(&mut self, kind: TimerKind) {
        if let Some(timer) = self.slot(kind).take() {
            timer.handle.abort();
        }
    }

    fn cancel_all(&mut self) {
        self.cancel(TimerKind::Idle);
        self.cancel(TimerKind::Listen);
        self.cancel(TimerKind::MaxDuration);
    }

    fn is_armed(&mut self, kind: TimerKind, token: u64) -> bool {
        self.slot(kind).as_ref().map(|t| t.token) == Some(token)
    }
}

struct Shared {
    settings: SessionSettings,
    inner: Mutex<Inner>,
    listeners: Mutex<Vec<SessionListener>>,
}

/// Cheap to clone; clones share the same session.
#[derive(Clone)]
pub struct SessionManager {
    shared: Arc<Shared>,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("settings", &self.shared.settings)
            .field("session", &self.snapshot())
            .finish()
    }
}

impl SessionManager {
    pub fn new(settings: SessionSettings) -> Self {
        Self {
            shared: Arc::new(Shared {
                settings,
                inner: Mutex::new(Inner::default()),
                listeners: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.shared.settings
    }

    fn inner(&self) -> MutexGuard<'_, Inner> {
        self.shared.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn on_event(&self, listener: SessionListener) {
        self.shared
            .listeners
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(listener);
    }

    /// Starts a session, or returns the id of the one already running.
    pub fn start_session(&self) -> SessionId {
        let id = {
            let mut inner = self.inner();
            if let Some(id) = inner.session.id.filter(|_| inner.session.is_active) {
                debug!(session_id = %id, "Session already active");
                return id;
            }

            let id = SessionId::new();
            inner.session = ConversationSession::started(id, Timestamp::now());
            inner.started_at = Some(Instant::now());
            inner.speaking_since = None;
            self.arm(&mut inner, TimerKind::Idle, self.shared.settings.idle_timeout);
            self.arm(&mut inner, TimerKind::MaxDuration, self.shared.settings.max_duration);
            id
        };

        info!(session_id = %id, "Session started");
        self.emit(SessionEvent::Started { session_id: id });
        id
    }

    /// Ends the active session and returns its final record.
    pub fn end_session(&self) -> Option<ConversationSession> {
        let ended = {
            let mut inner = self.inner();
            if !inner.session.is_active {
                return None;
            }
            inner.cancel_all();
            inner.started_at = None;
            inner.speaking_since = None;
            let mut ended = std::mem::take(&mut inner.session);
            ended.is_active = false;
            ended.speaking_start_time = None;
            ended
        };

        if let Some(session_id) = ended.id {
            info!(session_id = %session_id, turns = ended.turn_count, "Session ended");
            self.emit(SessionEvent::Ended {
                session_id,
                turn_count: ended.turn_count,
            });
        }
        Some(ended)
    }

    pub fn record_activity(&self) {
        let mut inner = self.inner();
        if !inner.session.is_active {
            return;
        }
        inner.session.last_activity_time = Some(Timestamp::now());
        self.arm(&mut inner, TimerKind::Idle, self.shared.settings.idle_timeout);
    }

    /// Counts a completed speech → response cycle.
    pub fn record_turn(&self) -> u32 {
        let turn_count = {
            let mut inner = self.inner();
            if !inner.session.is_active {
                return inner.session.turn_count;
            }
            inner.session.turn_count += 1;
            inner.session.turn_count
        };
        self.record_activity();
        turn_count
    }

    /// Arms the listen timeout.
    pub fn start_listening(&self) {
        let mut inner = self.inner();
        if inner.session.is_active {
            self.arm(&mut inner, TimerKind::Listen, self.shared.settings.listen_timeout);
        }
    }

    pub fn stop_listening(&self) {
        self.inner().cancel(TimerKind::Listen);
    }

    pub fn start_speaking(&self) {
        let mut inner = self.inner();
        if !inner.session.is_active {
            return;
        }
        inner.cancel(TimerKind::Listen);
        inner.speaking_since = Some(Instant::now());
        inner.session.speaking_start_time = Some(Timestamp::now());
    }

    /// Returns how long the robot was speaking.
    pub fn stop_speaking(&self) -> Option<Duration> {
        let mut inner = self.inner();
        inner.session.speaking_start_time = None;
        inner.speaking_since.take().map(|since| since.elapsed())
    }

    pub fn is_speaking(&self) -> bool {
        self.inner().speaking_since.is_some()
    }

    /// True once the robot has spoken for at least the barge-in minimum.
    pub fn can_barge_in(&self) -> bool {
        let inner = self.inner();
        inner.session.is_active
            && inner
                .speaking_since
                .map_or(false, |since| since.elapsed() >= self.shared.settings.barge_in_min_speaking)
    }

    /// Whether listening should resume after the robot finishes speaking.
    pub fn should_auto_restart(&self) -> bool {
        self.shared.settings.auto_restart && self.is_active() && !self.time_exhausted()
    }

    /// True during the final stretch of the max duration.
    pub fn is_session_expiring(&self) -> bool {
        let max = self.shared.settings.max_duration;
        !max.is_zero() && self.is_active() && self.remaining_time() <= self.shared.settings.expiring_window
    }

    /// Time left before the max duration. Zero when no session is active.
    pub fn remaining_time(&self) -> Duration {
        let inner = self.inner();
        match inner.started_at {
            Some(started) if inner.session.is_active => {
                let max = self.shared.settings.max_duration;
                if max.is_zero() {
                    Duration::MAX
                } else {
                    max.saturating_sub(started.elapsed())
                }
            }
            _ => Duration::ZERO,
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.inner()
            .started_at
            .map(|started| started.elapsed())
            .unwrap_or_default()
    }

    pub fn is_active(&self) -> bool {
        self.inner().session.is_active
    }

    pub fn session_id(&self) -> Option<SessionId> {
        let inner = self.inner();
        inner.session.id.filter(|_| inner.session.is_active)
    }

    pub fn turn_count(&self) -> u32 {
        self.inner().session.turn_count
    }

    pub fn snapshot(&self) -> ConversationSession {
        self.inner().session.clone()
    }

    /// Cancels all timers and drops listeners without emitting events.
    pub fn dispose(&self) {
        {
            let mut inner = self.inner();
            inner.cancel_all();
            let next_token = inner.next_token;
            *inner = Inner {
                next_token,
                ..Inner::default()
            };
        }
        self.shared
            .listeners
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
        debug!("Session manager disposed");
    }

    fn time_exhausted(&self) -> bool {
        !self.shared.settings.max_duration.is_zero() && self.remaining_time().is_zero()
    }

    fn arm(&self, inner: &mut Inner, kind: TimerKind, after: Duration) {
        inner.cancel(kind);
        if after.is_zero() {
            return;
        }

        inner.next_token += 1;
        let token = inner.next_token;
        let weak = Arc::downgrade(&self.shared);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(after).await;
            Self::fire(weak, kind, token);
        });
        *inner.slot(kind) = Some(Timer { token, handle });
    }

    fn fire(weak: Weak<Shared>, kind: TimerKind, token: u64) {
        let Some(shared) = weak.upgrade() else {
            return;
        };
        let manager = SessionManager { shared };

        {
            let mut inner = manager.inner();
            if !inner.is_armed(kind, token) {
                return;
            }
            // The timer is firing; drop its slot without aborting ourselves.
            *inner.slot(kind) = None;
        }

        match kind {
            TimerKind::Idle => {
                info!("Session idle timeout");
                manager.emit(SessionEvent::IdleTimeout);
                manager.end_session();
            }
            TimerKind::Listen => {
                debug!("Listen timeout");
                manager.emit(SessionEvent::ListenTimeout);
            }
            TimerKind::MaxDuration => {
                info!("Session max duration reached");
                manager.emit(SessionEvent::MaxDurationReached);
            }
        }
    }

    fn emit(&self, event: SessionEvent) {
        let listeners = self
            .shared
            .listeners
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone();

        for listener in listeners {
            if catch_unwind(AssertUnwindSafe(|| listener(&event))).is_err() {
                warn!(event = %event, "Session event listener panicked");
            }
        }
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new(SessionSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::advance;

    fn collect(manager: &SessionManager) -> Arc<Mutex<Vec<SessionEvent>>> {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        manager.on_event(Arc::new(move |e: &SessionEvent| sink.lock().unwrap().push(*e)));
        events
    }

    fn names(events: &Arc<Mutex<Vec<SessionEvent>>>) -> Vec<String> {
        events.lock().unwrap().iter().map(|e| e.to_string()).collect()
    }

    /// Lets spawned timer tasks run after the clock moved.
    async fn settle() {
        for _ in 0..5 {
            tokio::task::yield_now().await;
        }
    }

    mod lifecycle {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn start_and_end_emit_events() {
            let manager = SessionManager::default();
            let events = collect(&manager);

            let id = manager.start_session();
            assert!(manager.is_active());
            assert_eq!(manager.session_id(), Some(id));

            let ended = manager.end_session().unwrap();
            assert!(!ended.is_active);
            assert!(!manager.is_active());
            assert_eq!(names(&events), vec!["session_started", "session_ended"]);
        }

        #[tokio::test(start_paused = true)]
        async fn start_is_idempotent_while_active() {
            let manager = SessionManager::default();
            let first = manager.start_session();
            assert_eq!(manager.start_session(), first);
        }

        #[tokio::test(start_paused = true)]
        async fn end_without_session_is_none() {
            assert!(SessionManager::default().end_session().is_none());
        }

        #[tokio::test(start_paused = true)]
        async fn record_turn_counts() {
            let manager = SessionManager::default();
            manager.start_session();
            for _ in 0..3 {
                manager.record_turn();
            }
            assert_eq!(manager.turn_count(), 3);
            assert_eq!(manager.end_session().unwrap().turn_count, 3);
        }
    }

    mod timers {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn idle_timeout_ends_session() {
            let manager = SessionManager::default();
            let events = collect(&manager);
            manager.start_session();

            advance(Duration::from_secs(61)).await;
            settle().await;

            assert!(!manager.is_active());
            assert_eq!(
                names(&events),
                vec!["session_started", "idle_timeout", "session_ended"]
            );
        }

        #[tokio::test(start_paused = true)]
        async fn activity_rearms_idle_timer() {
            let manager = SessionManager::default();
            manager.start_session();

            advance(Duration::from_secs(40)).await;
            manager.record_activity();
            advance(Duration::from_secs(40)).await;
            settle().await;

            assert!(manager.is_active());
        }

        #[tokio::test(start_paused = true)]
        async fn listen_timeout_fires_only_while_armed() {
            let manager = SessionManager::default();
            let events = collect(&manager);
            manager.start_session();

            manager.start_listening();
            advance(Duration::from_secs(10)).await;
            manager.stop_listening();
            advance(Duration::from_secs(10)).await;
            settle().await;
            assert!(!names(&events).contains(&"listen_timeout".to_string()));

            manager.record_activity();
            manager.start_listening();
            advance(Duration::from_secs(16)).await;
            settle().await;
            assert!(names(&events).contains(&"listen_timeout".to_string()));
            assert!(manager.is_active());
        }

        #[tokio::test(start_paused = true)]
        async fn max_duration_is_reported_not_enforced() {
            let manager = SessionManager::new(SessionSettings {
                idle_timeout: Duration::ZERO,
                max_duration: Duration::from_secs(120),
                ..Default::default()
            });
            let events = collect(&manager);
            manager.start_session();

            advance(Duration::from_secs(95)).await;
            assert!(manager.is_session_expiring());
            advance(Duration::from_secs(30)).await;
            settle().await;

            assert!(names(&events).contains(&"max_duration_reached".to_string()));
            assert!(manager.is_active());
            assert!(!manager.should_auto_restart());
        }

        #[tokio::test(start_paused = true)]
        async fn end_session_cancels_timers() {
            let manager = SessionManager::default();
            let events = collect(&manager);
            manager.start_session();
            manager.start_listening();
            manager.end_session();

            advance(Duration::from_secs(700)).await;
            settle().await;

            assert_eq!(names(&events), vec!["session_started", "session_ended"]);
        }

        #[tokio::test(start_paused = true)]
        async fn dispose_is_silent() {
            let manager = SessionManager::default();
            let events = collect(&manager);
            manager.start_session();
            manager.dispose();

            advance(Duration::from_secs(700)).await;
            settle().await;

            assert!(!manager.is_active());
            assert_eq!(names(&events), vec!["session_started"]);
        }
    }

    mod speaking {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn barge_in_requires_minimum_speaking_time() {
            let manager = SessionManager::default();
            manager.start_session();
            manager.start_speaking();

            advance(Duration::from_millis(200)).await;
            assert!(!manager.can_barge_in());
            advance(Duration::from_millis(400)).await;
            assert!(manager.can_barge_in());

            assert_eq!(manager.stop_speaking(), Some(Duration::from_millis(600)));
            assert!(!manager.can_barge_in());
        }

        #[tokio::test(start_paused = true)]
        async fn speaking_time_only_set_while_speaking() {
            let manager = SessionManager::default();
            manager.start_session();
            assert!(manager.snapshot().speaking_start_time.is_none());
            manager.start_speaking();
            assert!(manager.snapshot().speaking_start_time.is_some());
            manager.stop_speaking();
            assert!(manager.snapshot().speaking_start_time.is_none());
        }

        #[tokio::test(start_paused = true)]
        async fn auto_restart_follows_settings() {
            let manager = SessionManager::new(SessionSettings {
                auto_restart: false,
                ..Default::default()
            });
            manager.start_session();
            assert!(!manager.should_auto_restart());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn panicking_listener_does_not_block_others() {
        let manager = SessionManager::default();
        manager.on_event(Arc::new(|_: &SessionEvent| panic!("listener bug")));
        let events = collect(&manager);

        manager.start_session();

        assert_eq!(names(&events), vec!["session_started"]);
    }
}
