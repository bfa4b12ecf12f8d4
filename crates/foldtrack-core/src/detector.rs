//! Fold detector implementation.
//!
//! The detector is a debounced edge-triggered state machine. It does not use
//! internal threads -- the caller feeds it one angle sample at a time and acts
//! on the returned outcome.
//!
//! ## State Transitions
//!
//! ```text
//! Closed --angle in [90, 180]--> OpenOrUnknown   (one fold confirmed)
//! OpenOrUnknown --angle <= 10--> Closed          (no event)
//! ```
//!
//! Angles in the dead zone `(10, 90)` leave the state untouched, so chatter
//! at either boundary cannot double-count a single physical fold.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SampleError;

/// Lower edge of the "open" band. Angles at or above confirm a fold.
pub const OPEN_THRESHOLD_DEG: i32 = 90;
/// Upper edge of the "closed" band. Angles at or below re-arm the detector.
pub const CLOSED_THRESHOLD_DEG: i32 = 10;
/// Physical hinge range.
pub const MAX_ANGLE_DEG: i32 = 180;

/// One reading from the hinge sensor (or the simulation fallback).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HingeSample {
    pub at: DateTime<Utc>,
    /// Hinge angle in integer degrees, expected in `0..=180`.
    pub angle: i32,
}

impl HingeSample {
    pub fn new(angle: i32) -> Self {
        Self {
            at: Utc::now(),
            angle,
        }
    }

    /// Reject readings outside the physical hinge range. A sensor glitch or
    /// a garbage value must never reach the state machine.
    pub fn validate(&self) -> Result<(), SampleError> {
        if (0..=MAX_ANGLE_DEG).contains(&self.angle) {
            Ok(())
        } else {
            Err(SampleError::OutOfRange { angle: self.angle })
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FoldState {
    /// Device closed (or assumed closed at startup).
    Closed,
    /// Device open, or open-ness unknown after the first wide reading.
    OpenOrUnknown,
}

/// What a single sample did to the detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleOutcome {
    /// Closed-to-open edge: count exactly one fold.
    FoldConfirmed,
    /// Device re-entered the closed band; the detector is re-armed.
    ClosedAgain,
    /// Dead zone or repeated reading; nothing to do.
    Unchanged,
}

/// Debounced fold-event state machine.
///
/// Starts in [`FoldState::Closed`], so the first wide-angle reading after
/// startup counts as a fold rather than waiting for a full close/open cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoldDetector {
    state: FoldState,
}

impl FoldDetector {
    pub fn new() -> Self {
        Self {
            state: FoldState::Closed,
        }
    }

    pub fn state(&self) -> FoldState {
        self.state
    }

    /// Feed one validated angle reading through the state machine.
    pub fn on_sample(&mut self, angle: i32) -> SampleOutcome {
        if angle >= OPEN_THRESHOLD_DEG {
            if self.state == FoldState::Closed {
                self.state = FoldState::OpenOrUnknown;
                tracing::debug!(angle, "fold confirmed");
                return SampleOutcome::FoldConfirmed;
            }
            SampleOutcome::Unchanged
        } else if angle <= CLOSED_THRESHOLD_DEG {
            if self.state == FoldState::OpenOrUnknown {
                self.state = FoldState::Closed;
                return SampleOutcome::ClosedAgain;
            }
            SampleOutcome::Unchanged
        } else {
            // Hysteresis band: no transitions between 10 and 90 degrees.
            SampleOutcome::Unchanged
        }
    }
}

impl Default for FoldDetector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn first_wide_reading_counts_once() {
        let mut det = FoldDetector::new();
        assert_eq!(det.on_sample(120), SampleOutcome::FoldConfirmed);
        assert_eq!(det.on_sample(120), SampleOutcome::Unchanged);
        assert_eq!(det.on_sample(175), SampleOutcome::Unchanged);
    }

    #[test]
    fn close_then_open_counts_again() {
        let mut det = FoldDetector::new();
        assert_eq!(det.on_sample(120), SampleOutcome::FoldConfirmed);
        assert_eq!(det.on_sample(5), SampleOutcome::ClosedAgain);
        assert_eq!(det.on_sample(120), SampleOutcome::FoldConfirmed);
    }

    #[test]
    fn dead_zone_never_transitions() {
        let mut det = FoldDetector::new();
        assert_eq!(det.on_sample(45), SampleOutcome::Unchanged);
        assert_eq!(det.state(), FoldState::Closed);

        det.on_sample(120);
        assert_eq!(det.on_sample(89), SampleOutcome::Unchanged);
        assert_eq!(det.on_sample(11), SampleOutcome::Unchanged);
        assert_eq!(det.state(), FoldState::OpenOrUnknown);
    }

    #[test]
    fn boundary_angles() {
        let mut det = FoldDetector::new();
        assert_eq!(det.on_sample(90), SampleOutcome::FoldConfirmed);
        assert_eq!(det.on_sample(10), SampleOutcome::ClosedAgain);
        assert_eq!(det.on_sample(180), SampleOutcome::FoldConfirmed);
        assert_eq!(det.on_sample(0), SampleOutcome::ClosedAgain);
    }

    #[test]
    fn out_of_range_samples_are_invalid() {
        assert!(HingeSample::new(-1).validate().is_err());
        assert!(HingeSample::new(181).validate().is_err());
        assert!(HingeSample::new(0).validate().is_ok());
        assert!(HingeSample::new(180).validate().is_ok());
    }

    proptest! {
        /// Fold events equal the number of closed-to-open transitions:
        /// never more than one per contiguous stay in the open band.
        #[test]
        fn fold_count_matches_transitions(angles in prop::collection::vec(0i32..=180, 0..300)) {
            let mut det = FoldDetector::new();
            let folds = angles
                .iter()
                .filter(|&&a| det.on_sample(a) == SampleOutcome::FoldConfirmed)
                .count();

            // Reference: track the closed flag directly.
            let mut was_closed = true;
            let mut expected = 0usize;
            for &a in &angles {
                if a >= OPEN_THRESHOLD_DEG {
                    if was_closed {
                        expected += 1;
                        was_closed = false;
                    }
                } else if a <= CLOSED_THRESHOLD_DEG {
                    was_closed = true;
                }
            }
            prop_assert_eq!(folds, expected);
        }
    }
}
