//! # Tuner Session Module
//!
//! The session orchestrates the per-frame pipeline (estimate, octave
//! correction, smoothing, evaluation) and owns all mutable cross-frame
//! state. It is single-threaded and synchronous: the host calls
//! [`TunerSession::process_frame`] once per incoming audio frame from its
//! own scheduling loop and must not overlap calls on one session.

use thiserror::Error;
use tracing::debug;

use crate::tracking::TrackingState;
use crate::tuning::{self, GuitarString};
use crate::{TuningStatus, TuningVerdict, pitch};

/// Tuning target for the session.
///
/// Determines whether readings are reported against whichever open string
/// is nearest, or against one specific string the user has locked in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TuningTarget {
    /// Automatic mode - report against the nearest open string
    Auto,
    /// Manual mode - a specific open string has been locked in
    Manual(GuitarString),
}

/// Errors raised for host contract violations.
///
/// These are programmer errors in the caller, never runtime signal
/// conditions; an unpitched frame is an ordinary [`TuningVerdict::Listening`]
/// reading, not an error.
#[derive(Debug, Error, PartialEq)]
pub enum SessionError {
    /// A frame arrived while the session was idle.
    #[error("session is idle; call start() before processing frames")]
    InvalidSessionState,
    /// The frame itself violates the input contract.
    #[error("invalid audio frame: {0}")]
    InvalidFrame(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum SessionState {
    Idle,
    Listening,
}

/// A single tuner instance.
///
/// Exclusively owns its [`TrackingState`]; `start` acquires fresh state
/// and `stop` releases it, so hosts must treat the two as a pair. Several
/// independent sessions may coexist (one per logical detector), but one
/// session must never be shared across threads.
#[derive(Debug)]
pub struct TunerSession {
    state: SessionState,
    target: TuningTarget,
    tracking: TrackingState,
}

impl TunerSession {
    /// Creates an idle session in automatic mode.
    pub fn new() -> Self {
        Self {
            state: SessionState::Idle,
            target: TuningTarget::Auto,
            tracking: TrackingState::new(),
        }
    }

    /// Allocates fresh tracking state and begins listening.
    ///
    /// Starting an already-running session re-zeroes its tracking state.
    pub fn start(&mut self) {
        self.tracking.reset();
        self.state = SessionState::Listening;
        debug!(mode = ?self.target, "tuner session started");
    }

    /// Discards tracking state and goes idle.
    ///
    /// Terminal until [`TunerSession::start`] is called again.
    pub fn stop(&mut self) {
        self.tracking.reset();
        self.state = SessionState::Idle;
        debug!("tuner session stopped");
    }

    /// Changes the tuning target, in any state.
    ///
    /// Always resets tracking state: smoothing history carried across a
    /// lock/unlock would bias the next string's readings.
    pub fn select_target(&mut self, target: TuningTarget) {
        self.target = target;
        self.tracking.reset();
        debug!(mode = ?target, "tuning target changed");
    }

    pub fn is_running(&self) -> bool {
        self.state == SessionState::Listening
    }

    pub fn target(&self) -> TuningTarget {
        self.target
    }

    /// Processes one frame of audio and returns the tuning status.
    ///
    /// The samples are normalized floats in roughly [-1, 1] and are not
    /// retained beyond the call. The caller keeps the frame size fixed
    /// per session and delivers frames in temporal order.
    ///
    /// # Errors
    /// * [`SessionError::InvalidSessionState`] - the session is idle
    /// * [`SessionError::InvalidFrame`] - empty buffer or bad sample rate
    pub fn process_frame(
        &mut self,
        samples: &[f32],
        sample_rate_hz: f32,
    ) -> Result<TuningStatus, SessionError> {
        if self.state != SessionState::Listening {
            return Err(SessionError::InvalidSessionState);
        }
        if samples.is_empty() {
            return Err(SessionError::InvalidFrame("empty sample buffer"));
        }
        if !sample_rate_hz.is_finite() || sample_rate_hz <= 0.0 {
            return Err(SessionError::InvalidFrame("sample rate must be positive"));
        }

        let Some(raw) = pitch::detect_pitch(samples, sample_rate_hz) else {
            return Ok(self.listening_status());
        };

        // Fold harmonics toward the locked string before any smoothing.
        let corrected = match self.target {
            TuningTarget::Manual(string) => tuning::fold_to_octave(raw, string.frequency),
            TuningTarget::Auto => raw,
        };

        let filtered = self.tracking.filter_frequency(corrected);

        let (display_name, base_frequency) = match self.target {
            TuningTarget::Manual(string) => (string.name, string.frequency),
            TuningTarget::Auto => {
                let nearest = tuning::nearest_string(filtered);
                (nearest.name, nearest.frequency)
            }
        };

        let cents = tuning::cents_deviation(filtered, base_frequency).round();
        let locked = matches!(self.target, TuningTarget::Manual(_));
        let smoothed = self.tracking.smooth(cents, corrected, locked);
        let confidence = self.tracking.settle_confidence();

        Ok(TuningStatus {
            display_name: display_name.to_string(),
            frequency: Some(filtered),
            note_name: tuning::note_name(filtered),
            rounded_cents: smoothed.clamp(-50.0, 50.0).round() as i32,
            smoothed_cents: smoothed,
            confidence,
            verdict: self.tracking.verdict(),
        })
    }

    /// Status for a frame with no stable pitch. Tracking state is left
    /// untouched so the needle holds its last position while the string
    /// decays.
    fn listening_status(&self) -> TuningStatus {
        let display_name = match self.target {
            TuningTarget::Manual(string) => string.name.to_string(),
            TuningTarget::Auto => tuning::NO_NOTE.to_string(),
        };
        let smoothed = self.tracking.smoothed_cents();
        TuningStatus {
            display_name,
            frequency: None,
            note_name: tuning::NO_NOTE.to_string(),
            rounded_cents: smoothed.clamp(-50.0, 50.0).round() as i32,
            smoothed_cents: smoothed,
            confidence: self.tracking.confidence(),
            verdict: TuningVerdict::Listening,
        }
    }
}

impl Default for TunerSession {
    fn default() -> Self {
        Self::new()
    }
}
