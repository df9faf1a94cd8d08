//! Salesbot Voice - voice interaction core of the robot sales avatar
//!
//! This crate runs the listen → transcribe → reply → speak loop of a
//! conversational sales robot: voice activity detection, barge-in, session
//! timers, debounced language switching, lead extraction and the animation
//! cues that accompany each turn.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
