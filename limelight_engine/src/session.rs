// Copyright 2025 the Limelight Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The per-tour session record.

use kurbo::{Point, Rect};

/// Lifecycle status of a tour session.
///
/// `Completed` and `Skipped` are terminal; no transition leaves them.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TourStatus {
    /// Created but not started.
    Idle,
    /// Showing a step; `current_step` is valid.
    Active,
    /// Finished (or bypassed by the device gate); `on_complete` has fired.
    Completed,
    /// Dismissed by the user; `on_skip` has fired.
    Skipped,
}

impl TourStatus {
    /// Whether this status is terminal.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Skipped)
    }
}

/// Mutable state for one active tour.
///
/// The session is owned exclusively by the state machine and mutated only
/// through its transition methods; external code reads it through the
/// accessors. All geometry held here is a snapshot taken within the current
/// step's lifetime — it is discarded on every step change and re-measured
/// on every resize, never reused.
#[derive(Clone, Debug)]
pub struct TourSession<K> {
    pub(crate) current_step: usize,
    pub(crate) status: TourStatus,
    pub(crate) resolved_target: Option<(K, Rect)>,
    pub(crate) tooltip_origin: Option<Point>,
    pub(crate) in_transition: bool,
}

impl<K> TourSession<K> {
    pub(crate) const fn new() -> Self {
        Self {
            current_step: 0,
            status: TourStatus::Idle,
            resolved_target: None,
            tooltip_origin: None,
            in_transition: false,
        }
    }

    /// Index of the step currently shown. Only meaningful while
    /// [`TourStatus::Active`].
    #[must_use]
    pub const fn current_step(&self) -> usize {
        self.current_step
    }

    /// Current lifecycle status.
    #[must_use]
    pub const fn status(&self) -> TourStatus {
        self.status
    }

    /// The current step's measured target box, if resolution succeeded.
    #[must_use]
    pub fn resolved_target_box(&self) -> Option<Rect> {
        self.resolved_target.as_ref().map(|(_, bounds)| *bounds)
    }

    /// The current tooltip origin, if a step is presented.
    #[must_use]
    pub const fn tooltip_origin(&self) -> Option<Point> {
        self.tooltip_origin
    }

    /// Whether a step transition is mid-flight (advancement is refused).
    #[must_use]
    pub const fn in_transition(&self) -> bool {
        self.in_transition
    }

    pub(crate) fn clear_presentation(&mut self) {
        self.resolved_target = None;
        self.tooltip_origin = None;
    }
}
