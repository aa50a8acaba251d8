// Copyright 2025 the Limelight Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Device gate: should the tour run at all in this viewport?

use kurbo::Size;

/// Viewport classification for the gate.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DeviceClass {
    /// Too narrow for the tour; the engine records the tour as satisfied
    /// without ever entering the active state.
    Narrow,
    /// Wide enough for the tour to run.
    Wide,
}

/// Decides whether the tour runs, based on viewport width.
///
/// The gate is consulted exactly once, in `start()`. The decision is sticky
/// for the session: a tour that started wide never aborts mid-flight
/// because the viewport later shrank, and a bypassed tour is not revived by
/// growth. Re-evaluation only affects future sessions.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DeviceGate {
    /// Minimum viewport width, in viewport units, for the tour to run.
    pub min_width: f64,
}

impl Default for DeviceGate {
    fn default() -> Self {
        Self { min_width: 768.0 }
    }
}

impl DeviceGate {
    /// Classify a viewport.
    #[must_use]
    pub fn evaluate(&self, viewport: Size) -> DeviceClass {
        if viewport.width < self.min_width {
            DeviceClass::Narrow
        } else {
            DeviceClass::Wide
        }
    }
}
