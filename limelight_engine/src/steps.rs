// Copyright 2025 the Limelight Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Step definitions: what each tour stop points at and how it advances.

use alloc::string::String;

use limelight_geometry::Placement;

/// How a step advances to the next one.
///
/// The interceptor is armed on this tagged variant and nothing else; intent
/// is never inferred from the shape of the selector.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum AdvanceMode {
    /// Advances via the tooltip's explicit "Next" control.
    Explicit,
    /// Advances when the user clicks the live target itself; the click's
    /// default effect is suppressed.
    ClickIntercept,
}

/// One authored tour stop.
///
/// Step definitions are immutable and externally authored; the engine
/// consumes them as an ordered sequence whose order is fixed for a session.
#[derive(Clone, Debug, PartialEq)]
pub struct StepDefinition {
    /// Host-assigned identifier, carried through for the host's benefit.
    pub id: u32,
    /// Stable element identifier the step points at (for example, an
    /// attribute selector). Opaque to the engine.
    pub target_selector: String,
    /// Tooltip heading.
    pub title: String,
    /// Tooltip body text.
    pub body: String,
    /// Which side of the target the tooltip opens on.
    pub placement: Placement,
    /// How the step advances.
    pub advance: AdvanceMode,
    /// Breathing room between the target and the spotlight cutout.
    pub highlight_padding: f64,
}

impl StepDefinition {
    /// A step with the given identity and selector, defaulting to a
    /// bottom-placed, explicitly advanced stop with 8px of padding.
    #[must_use]
    pub fn new(id: u32, target_selector: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id,
            target_selector: target_selector.into(),
            title: title.into(),
            body: String::new(),
            placement: Placement::Bottom,
            advance: AdvanceMode::Explicit,
            highlight_padding: 8.0,
        }
    }
}
