//! Session lifecycle: greeting, farewell, failure recovery, pause gating
//! and session timers.

mod common;

use std::time::Duration;

use common::{Harness, Options};
use tokio::sync::mpsc;

use salesbot_voice::adapters::mock::{MockDialogueClient, MockRecognizer};
use salesbot_voice::application::{InteractionEvent, OrchestratorSettings};
use salesbot_voice::domain::conversation::{CannedUtterance, CaptureReason, ConversationPhase};
use salesbot_voice::domain::language::Language;
use salesbot_voice::domain::voice::{
    Animation, InteractionError, InteractionState, SessionEvent, VadProfile,
};
use salesbot_voice::ports::{DialogueError, RecognitionError};

mod greeting {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn start_session_greets_then_listens_relaxed() {
        let mut h = Harness::with_defaults();

        let state = h.dispatch(InteractionEvent::StartSession).await.unwrap();
        assert_eq!(state, InteractionState::Speaking);
        assert_eq!(
            &h.animation.performed()[..2],
            &[Animation::ApproachCamera, Animation::Waving]
        );
        assert!(h.orchestrator.session().is_active());

        h.finish_playback().await.unwrap();

        assert_eq!(h.state(), InteractionState::Listening);
        assert_eq!(h.vad.current_profile(), Some(VadProfile::Relaxed));
        assert_eq!(h.orchestrator.session().turn_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn start_session_without_greeting_listens_immediately() {
        let mut h = Harness::new(Options {
            settings: OrchestratorSettings {
                greet_on_start: false,
                ..Default::default()
            },
            ..Default::default()
        });

        h.dispatch(InteractionEvent::StartSession).await.unwrap();

        assert_eq!(h.state(), InteractionState::Listening);
        assert_eq!(h.player.play_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn second_start_session_is_ignored() {
        let mut h = Harness::with_defaults();
        h.dispatch(InteractionEvent::StartSession).await.unwrap();
        let session = h.orchestrator.session().session_id();

        h.dispatch(InteractionEvent::StartSession).await.unwrap();

        assert_eq!(h.orchestrator.session().session_id(), session);
        assert_eq!(h.player.play_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn response_without_audio_goes_straight_back_to_listening() {
        let mut h = Harness::new(Options {
            dialogue: MockDialogueClient::new().with_speech(Ok(None)),
            recognizer: MockRecognizer::new().with_text("Quiero información sobre precios", "es"),
            ..Default::default()
        });
        h.dispatch(InteractionEvent::StartListening).await.unwrap();
        tokio::time::advance(Duration::from_secs(1)).await;

        h.utterance(1000).await.unwrap();

        assert_eq!(h.state(), InteractionState::Listening);
        assert_eq!(h.player.play_count(), 0);
        assert_eq!(h.observer.responses().last().unwrap().0, MockDialogueClient::DEFAULT_REPLY);
    }
}

mod farewell {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn goodbye_closes_session_after_the_reply() {
        let mut h = Harness::new(Options {
            recognizer: MockRecognizer::new().with_text("Gracias, adiós", "es"),
            dialogue: MockDialogueClient::new().with_reply("¡Hasta pronto!"),
            ..Default::default()
        });

        h.dispatch(InteractionEvent::StartListening).await.unwrap();
        tokio::time::advance(Duration::from_secs(1)).await;
        h.utterance(1000).await.unwrap();
        assert_eq!(h.state(), InteractionState::Speaking);
        assert_eq!(h.orchestrator.tracker().phase(), ConversationPhase::Farewell);

        h.finish_playback().await.unwrap();

        assert_eq!(h.state(), InteractionState::Idle);
        assert!(!h.orchestrator.session().is_active());
        assert_eq!(h.lead_sink.count(CaptureReason::SessionEnded), 1);
        assert_eq!(h.lead_sink.last().unwrap().turn_count, 1);
        assert_eq!(h.animation.performed().last(), Some(&Animation::Goodbye));
    }

    #[tokio::test(start_paused = true)]
    async fn end_session_while_speaking_stops_playback() {
        let mut h = Harness::with_defaults();
        h.dispatch(InteractionEvent::StartSession).await.unwrap();
        let greeting = h.orchestrator.generation();

        h.dispatch(InteractionEvent::EndSession).await.unwrap();

        assert_eq!(h.state(), InteractionState::Idle);
        assert!(h.player.stop_count() > 0);
        assert_eq!(h.lead_sink.count(CaptureReason::SessionEnded), 1);

        h.dispatch(InteractionEvent::PlaybackEnded { generation: greeting })
            .await
            .unwrap();
        assert_eq!(h.state(), InteractionState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn end_session_without_a_session_is_a_no_op() {
        let mut h = Harness::with_defaults();

        h.dispatch(InteractionEvent::EndSession).await.unwrap();

        assert_eq!(h.state(), InteractionState::Idle);
        assert!(h.lead_sink.snapshots().is_empty());
    }
}

mod failures {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn recognition_failure_enters_error_and_recovers_on_listen() {
        let mut h = Harness::new(Options {
            recognizer: MockRecognizer::new()
                .with_error(RecognitionError::Service("upstream down".into())),
            ..Default::default()
        });
        h.dispatch(InteractionEvent::StartListening).await.unwrap();
        tokio::time::advance(Duration::from_secs(1)).await;

        let err = h.utterance(1000).await.unwrap_err();

        assert!(matches!(err, InteractionError::RecognitionFailure(_)));
        assert_eq!(h.state(), InteractionState::Error);
        let performed = h.animation.performed();
        assert!(performed.contains(&Animation::Confused));
        assert!(performed.contains(&Animation::StepBackward));
        assert_eq!(h.dialogue.call_count(), 0);
        assert_eq!(h.observer.errors().len(), 1);

        h.dispatch(InteractionEvent::StartListening).await.unwrap();
        assert_eq!(h.state(), InteractionState::Listening);
    }

    #[tokio::test(start_paused = true)]
    async fn dialogue_outage_is_fatal_for_the_turn() {
        let mut h = Harness::new(Options {
            recognizer: MockRecognizer::new().with_text("¿Qué servicios ofrecen?", "es"),
            dialogue: MockDialogueClient::new().with_error(DialogueError::unavailable("503")),
            ..Default::default()
        });
        h.dispatch(InteractionEvent::StartListening).await.unwrap();
        tokio::time::advance(Duration::from_secs(1)).await;

        let err = h.utterance(1000).await.unwrap_err();

        assert!(matches!(err, InteractionError::DialogueFailure(_)));
        assert_eq!(h.state(), InteractionState::Error);
        assert_eq!(h.orchestrator.session().turn_count(), 0);
        assert!(h.orchestrator.history().is_empty());
    }
}

mod lead_events {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn scheduled_meeting_triggers_a_dance() {
        let mut h = Harness::new(Options {
            recognizer: MockRecognizer::new().with_text("Perfecto, ya agendé la reunión", "es"),
            ..Default::default()
        });

        h.full_turn().await.unwrap();

        assert_eq!(h.animation.count(Animation::DanceMove), 1);
        assert!(h.orchestrator.tracker().lead_data().has_meeting());
    }
}

mod pause_gating {
    use super::*;

    fn gated() -> (Harness, mpsc::UnboundedReceiver<InteractionEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let h = Harness::new(Options {
            settings: OrchestratorSettings {
                pause_gating: true,
                ..Default::default()
            },
            recognizer: MockRecognizer::new().with_text("Estoy pensando en un asistente", "es"),
            ..Default::default()
        })
        .with_scheduler(tx);
        (h, rx)
    }

    async fn speak_then_pause(h: &mut Harness, silence_ms: u64) {
        h.dispatch(InteractionEvent::StartListening).await.unwrap();
        tokio::time::advance(Duration::from_secs(1)).await;
        h.dispatch(InteractionEvent::SpeechStarted).await.unwrap();
        tokio::time::advance(Duration::from_millis(1000)).await;
        h.dispatch(InteractionEvent::SpeechEnded {
            speech_ms: 1000,
            silence_ms,
        })
        .await
        .unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn thinking_pause_holds_then_processes_after_grace() {
        let (mut h, mut rx) = gated();

        speak_then_pause(&mut h, 850).await;
        assert_eq!(h.state(), InteractionState::ListeningActive);
        assert_eq!(h.recorder.stop_count(), 0);

        let grace = rx.recv().await.unwrap();
        assert!(matches!(grace, InteractionEvent::PauseGraceElapsed { .. }));
        h.dispatch(grace).await.unwrap();

        assert_eq!(h.state(), InteractionState::Speaking);
        assert_eq!(h.recognizer.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn resumed_speech_cancels_the_grace_period() {
        let (mut h, mut rx) = gated();

        speak_then_pause(&mut h, 850).await;
        h.dispatch(InteractionEvent::SpeechStarted).await.unwrap();

        let stale = rx.recv().await.unwrap();
        h.dispatch(stale).await.unwrap();

        assert_eq!(h.state(), InteractionState::ListeningActive);
        assert_eq!(h.recognizer.call_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn discarded_noise_after_a_pause_keeps_the_held_speech() {
        let (mut h, mut rx) = gated();

        speak_then_pause(&mut h, 850).await;
        h.dispatch(InteractionEvent::SpeechStarted).await.unwrap();
        h.dispatch(InteractionEvent::SpeechDiscarded { speech_ms: 200 })
            .await
            .unwrap();

        assert_eq!(h.state(), InteractionState::ListeningActive);
        assert_eq!(h.recorder.cancel_count(), 0);

        // The first grace was cancelled by the resumed speech.
        let stale = rx.recv().await.unwrap();
        h.dispatch(stale).await.unwrap();
        assert_eq!(h.recognizer.call_count(), 0);

        let live = rx.recv().await.unwrap();
        h.dispatch(live).await.unwrap();

        assert_eq!(h.state(), InteractionState::Speaking);
        assert_eq!(h.recognizer.call_count(), 1);
        assert_eq!(h.recorder.stop_count(), 1);
        assert_eq!(h.recorder.cancel_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn short_segment_after_a_pause_keeps_the_held_speech() {
        let (mut h, mut rx) = gated();

        speak_then_pause(&mut h, 850).await;
        h.dispatch(InteractionEvent::SpeechStarted).await.unwrap();
        h.dispatch(InteractionEvent::SpeechEnded {
            speech_ms: 150,
            silence_ms: 850,
        })
        .await
        .unwrap();

        assert_eq!(h.state(), InteractionState::ListeningActive);
        assert_eq!(h.recorder.cancel_count(), 0);

        while h.state() == InteractionState::ListeningActive {
            let grace = rx.recv().await.unwrap();
            h.dispatch(grace).await.unwrap();
        }

        assert_eq!(h.state(), InteractionState::Speaking);
        assert_eq!(h.recognizer.call_count(), 1);
        assert_eq!(h.recorder.cancel_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn long_silence_without_speech_ends_the_session() {
        let (mut h, _rx) = gated();
        h.dispatch(InteractionEvent::StartListening).await.unwrap();
        assert!(h.orchestrator.session().is_active());

        h.dispatch(InteractionEvent::Session(SessionEvent::ListenTimeout))
            .await
            .unwrap();

        assert_eq!(h.state(), InteractionState::Idle);
        assert!(!h.orchestrator.session().is_active());
        assert_eq!(h.lead_sink.count(CaptureReason::SessionEnded), 1);
        assert_eq!(h.animation.performed().last(), Some(&Animation::Goodbye));
        assert_eq!(h.recognizer.call_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn sentence_end_is_processed_at_once() {
        let (mut h, _rx) = gated();

        speak_then_pause(&mut h, 2000).await;

        assert_eq!(h.state(), InteractionState::Speaking);
        assert_eq!(h.recognizer.call_count(), 1);
    }
}

mod timing {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn without_auto_restart_the_robot_goes_idle_after_speaking() {
        let mut h = Harness::new(Options {
            session: salesbot_voice::application::SessionSettings {
                auto_restart: false,
                ..Default::default()
            },
            recognizer: MockRecognizer::new().with_text("Quiero una demostración", "es"),
            ..Default::default()
        });

        h.full_turn().await.unwrap();

        assert_eq!(h.state(), InteractionState::Idle);
        assert_eq!(h.vad.current_profile(), Some(VadProfile::Standard));
        assert_eq!(h.orchestrator.session().turn_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn listening_again_clears_the_previous_response() {
        let mut h = Harness::new(Options {
            session: salesbot_voice::application::SessionSettings {
                auto_restart: false,
                ..Default::default()
            },
            recognizer: MockRecognizer::new().with_text("Quiero una demostración", "es"),
            ..Default::default()
        });
        h.full_turn().await.unwrap();
        assert_eq!(h.orchestrator.last_response(), Some(MockDialogueClient::DEFAULT_REPLY));

        h.dispatch(InteractionEvent::StartListening).await.unwrap();

        assert_eq!(h.state(), InteractionState::Listening);
        assert_eq!(h.orchestrator.last_response(), None);
    }
}

mod session_timers {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn listen_timeout_goes_idle_and_keeps_the_session() {
        let mut h = Harness::with_defaults();
        h.dispatch(InteractionEvent::StartListening).await.unwrap();

        h.dispatch(InteractionEvent::Session(SessionEvent::ListenTimeout))
            .await
            .unwrap();

        assert_eq!(h.state(), InteractionState::Idle);
        assert!(h.vad.is_paused());
        assert_eq!(h.animation.count(Animation::ShakeLegsTwist), 1);
        assert_eq!(
            h.observer.responses().last().unwrap().0,
            CannedUtterance::ListenTimeout.text(Language::Es)
        );
        assert!(h.orchestrator.session().is_active());
        assert!(h.lead_sink.snapshots().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn listen_timeout_outside_listening_is_ignored() {
        let mut h = Harness::with_defaults();
        h.dispatch(InteractionEvent::StartSession).await.unwrap();

        h.dispatch(InteractionEvent::Session(SessionEvent::ListenTimeout))
            .await
            .unwrap();

        assert_eq!(h.state(), InteractionState::Speaking);
        assert_eq!(h.animation.count(Animation::ShakeLegsTwist), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn max_duration_says_farewell_and_ends_the_session() {
        let mut h = Harness::new(Options {
            recognizer: MockRecognizer::new().with_text("Quiero información sobre precios", "es"),
            ..Default::default()
        });
        h.full_turn().await.unwrap();

        h.dispatch(InteractionEvent::Session(SessionEvent::MaxDurationReached))
            .await
            .unwrap();

        assert_eq!(
            h.observer.responses().last().unwrap().0,
            CannedUtterance::Farewell.text(Language::Es)
        );
        assert_eq!(h.state(), InteractionState::Idle);
        assert!(!h.orchestrator.session().is_active());
        assert_eq!(h.lead_sink.count(CaptureReason::SessionEnded), 1);
        assert_eq!(h.lead_sink.last().unwrap().turn_count, 1);
        assert_eq!(h.animation.performed().last(), Some(&Animation::Goodbye));
    }
}

mod speech_synthesis {
    use super::*;

    fn with_tts_error(error: DialogueError) -> Harness {
        Harness::new(Options {
            recognizer: MockRecognizer::new().with_text("¿Cuánto cuesta el asistente?", "es"),
            dialogue: MockDialogueClient::new().with_speech(Err(error)),
            ..Default::default()
        })
    }

    #[tokio::test(start_paused = true)]
    async fn rate_limited_synthesis_shows_text_and_waits() {
        let mut h = with_tts_error(DialogueError::rate_limited(5_000));
        h.dispatch(InteractionEvent::StartListening).await.unwrap();
        tokio::time::advance(Duration::from_secs(1)).await;

        let state = h.utterance(1000).await.unwrap();

        assert_eq!(state, InteractionState::Idle);
        assert_eq!(h.player.play_count(), 0);
        assert_eq!(h.observer.responses().last().unwrap().0, MockDialogueClient::DEFAULT_REPLY);
        assert!(h.observer.errors().is_empty());
        assert!(!h.observer.state_path().contains(&InteractionState::Error));
        let remaining = h.orchestrator.rate_limit_remaining().unwrap();
        assert!(remaining > Duration::from_millis(4_900));
        assert!(remaining <= Duration::from_millis(5_000));
        assert_eq!(h.orchestrator.session().turn_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn synthesis_outage_is_not_fatal() {
        let mut h = with_tts_error(DialogueError::unavailable("tts down"));
        h.dispatch(InteractionEvent::StartListening).await.unwrap();
        tokio::time::advance(Duration::from_secs(1)).await;

        let state = h.utterance(1000).await.unwrap();

        assert_eq!(state, InteractionState::Listening);
        assert_eq!(h.vad.current_profile(), Some(VadProfile::Relaxed));
        assert_eq!(h.observer.responses().last().unwrap().0, MockDialogueClient::DEFAULT_REPLY);
        assert!(h.observer.errors().is_empty());
        assert_eq!(h.orchestrator.rate_limit_remaining(), None);
    }
}
