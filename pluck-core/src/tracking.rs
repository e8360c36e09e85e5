//! Cross-frame pitch tracking: median filtering of raw estimates,
//! velocity-damped adaptive smoothing of the cents offset, and the
//! confidence/verdict evaluation derived from that state.
//!
//! The smoothing constants are empirically tuned for tuner feel; a fixed
//! smoothing rate either lags on string attacks or jitters on sustain.

use std::collections::VecDeque;

use crate::TuningVerdict;

/// Strings above this frequency settle faster and get the short window.
const HIGH_FREQ_CUTOFF: f32 = 200.0;
/// Median window above the cutoff.
const SHORT_WINDOW: usize = 4;
/// Median window at or below the cutoff.
const LONG_WINDOW: usize = 7;

/// All mutable state carried across frames. Owned exclusively by one
/// `TunerSession` and zeroed on start, stop, and target change.
#[derive(Debug, Default)]
pub(crate) struct TrackingState {
    median_history: VecDeque<f32>,
    smoothed_cents: f32,
    last_cents: f32,
    velocity: f32,
    confidence: f32,
}

impl TrackingState {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn reset(&mut self) {
        self.median_history.clear();
        self.smoothed_cents = 0.0;
        self.last_cents = 0.0;
        self.velocity = 0.0;
        self.confidence = 0.0;
    }

    /// Median-filters a raw frequency estimate against recent history.
    ///
    /// The window shrinks to [`SHORT_WINDOW`] above [`HIGH_FREQ_CUTOFF`]
    /// so the faster-changing high strings are not over-damped.
    pub(crate) fn filter_frequency(&mut self, frequency: f32) -> f32 {
        let window = if frequency > HIGH_FREQ_CUTOFF {
            SHORT_WINDOW
        } else {
            LONG_WINDOW
        };
        self.median_history.push_back(frequency);
        while self.median_history.len() > window {
            self.median_history.pop_front();
        }

        let mut sorted: Vec<f32> = self.median_history.iter().copied().collect();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
        let mid = sorted.len() / 2;
        if sorted.len() % 2 == 0 {
            (sorted[mid - 1] + sorted[mid]) / 2.0
        } else {
            sorted[mid]
        }
    }

    /// Advances the velocity estimate and the adaptive EMA by one frame.
    ///
    /// `cents` is the rounded offset of the filtered frequency from the
    /// base frequency; `frequency` is the incoming (octave-corrected)
    /// estimate; `locked` selects the target-locked alpha table. Returns
    /// the updated smoothed offset.
    ///
    /// The smoothing rate rises with the deviation from the current
    /// smoothed value (fast lock-on after a jump) and falls as the
    /// velocity grows (more damping while the signal is volatile).
    pub(crate) fn smooth(&mut self, cents: f32, frequency: f32, locked: bool) -> f32 {
        self.velocity = 0.7 * self.velocity + 0.3 * (cents - self.last_cents);
        self.last_cents = cents;

        let velocity_factor = (1.0 - self.velocity.abs() / 30.0).max(0.5);
        let deviation = (cents - self.smoothed_cents).abs();
        let base_alpha = if locked {
            if frequency > HIGH_FREQ_CUTOFF {
                if deviation > 15.0 { 0.3 } else { 0.2 }
            } else if deviation > 15.0 {
                0.25
            } else {
                0.15
            }
        } else if deviation > 10.0 {
            0.45
        } else {
            0.35
        };
        let alpha = base_alpha * velocity_factor;

        self.smoothed_cents += alpha * (cents - self.smoothed_cents);
        self.smoothed_cents
    }

    /// Folds the current velocity into the confidence estimate.
    ///
    /// Confidence is an EMA of per-frame stability, so it only rises as
    /// the reading stays settled over multiple frames.
    pub(crate) fn settle_confidence(&mut self) -> f32 {
        let stability = 1.0 - (self.velocity.abs() / 20.0).min(1.0);
        self.confidence = 0.8 * self.confidence + 0.2 * stability;
        self.confidence
    }

    pub(crate) fn smoothed_cents(&self) -> f32 {
        self.smoothed_cents
    }

    pub(crate) fn confidence(&self) -> f32 {
        self.confidence
    }

    /// Derives the discrete verdict from the unclamped smoothed state.
    pub(crate) fn verdict(&self) -> TuningVerdict {
        if self.smoothed_cents.abs() <= 5.0 && self.confidence > 0.6 {
            TuningVerdict::InTune
        } else if self.confidence < 0.5 {
            TuningVerdict::Settling
        } else {
            TuningVerdict::Tuning
        }
    }
}
