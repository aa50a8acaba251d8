// Copyright 2025 the Limelight Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Limelight Spotlight: the dimmed-overlay-with-cutout description.
//!
//! A spotlight is a full-viewport dim mask with one rectangular region
//! excluded from it, framing the current tour target. This crate produces
//! that description declaratively, built on top of [`kurbo`]: the caller
//! gets a [`RoundedRect`] cutout plus a highlight phase, and renders it with
//! whatever mask/border machinery its environment has. No drawing happens
//! here.
//!
//! ## Highlight phases
//!
//! The highlight around the cutout has two phases:
//!
//! - [`HighlightPhase::Active`] — the normal framing while a step is shown.
//! - [`HighlightPhase::Confirmed`] — transient feedback shown immediately
//!   after a click-intercepted advancement, held for
//!   [`SpotlightStyle::confirm_hold_ms`] before the tour moves on. The
//!   confirmation is purely visual and independent of whatever the
//!   intercepted click would have done.
//!
//! Styling is symbolic: [`Spotlight::border_color_token`] names which of the
//! two border treatments applies, and the host maps tokens to its own
//! colors. Content styling is the host's concern.
//!
//! # Example
//!
//! ```
//! use kurbo::Rect;
//! use limelight_spotlight::{cutout, HighlightPhase, Spotlight, SpotlightStyle};
//!
//! let style = SpotlightStyle::default();
//! let target = Rect::new(100.0, 100.0, 180.0, 140.0);
//!
//! let spot = Spotlight::active(cutout(target, 8.0, style.corner_radius));
//! assert_eq!(spot.phase, HighlightPhase::Active);
//! // The cutout is the target inflated by the step's highlight padding.
//! assert_eq!(spot.cutout.rect(), target.inflate(8.0, 8.0));
//! ```
//!
//! This crate is `no_std`.

#![no_std]

use kurbo::{Rect, RoundedRect};

/// Visual state of the highlight ring around the cutout.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum HighlightPhase {
    /// Normal framing while the step is displayed.
    Active,
    /// Transient post-intercept feedback, held briefly before advancing.
    Confirmed,
}

/// Fixed visual constants for the spotlight layer.
///
/// These are defaults, not load-bearing values; hosts override what they
/// care about. `confirm_hold_ms` is the one the engine consumes: it is how
/// long the [`HighlightPhase::Confirmed`] frame stays up before a
/// click-intercepted step advances.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SpotlightStyle {
    /// Opacity of the full-viewport dim mask, in `0.0..=1.0`.
    pub dim_opacity: f64,
    /// Width of the highlight ring around the cutout.
    pub border_width: f64,
    /// Corner radius applied to the cutout rectangle.
    pub corner_radius: f64,
    /// How long the confirmed phase is held after an intercepted click.
    pub confirm_hold_ms: u64,
}

impl Default for SpotlightStyle {
    fn default() -> Self {
        Self {
            dim_opacity: 0.6,
            border_width: 2.0,
            corner_radius: 6.0,
            confirm_hold_ms: 350,
        }
    }
}

/// Symbolic border treatment for a highlight phase.
///
/// Hosts map these to concrete colors; the engine never deals in colors.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BorderToken {
    /// The accent treatment used while a step is active.
    Accent,
    /// The success treatment used during confirmed feedback.
    Success,
}

/// Declarative description of one spotlight frame.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Spotlight {
    /// The region excluded from the dim mask.
    pub cutout: RoundedRect,
    /// Current highlight phase.
    pub phase: HighlightPhase,
}

impl Spotlight {
    /// A spotlight in the normal active phase.
    #[must_use]
    pub const fn active(cutout: RoundedRect) -> Self {
        Self {
            cutout,
            phase: HighlightPhase::Active,
        }
    }

    /// A spotlight in the transient confirmed phase.
    #[must_use]
    pub const fn confirmed(cutout: RoundedRect) -> Self {
        Self {
            cutout,
            phase: HighlightPhase::Confirmed,
        }
    }

    /// The same cutout, switched to the confirmed phase.
    #[must_use]
    pub const fn confirm(self) -> Self {
        Self {
            cutout: self.cutout,
            phase: HighlightPhase::Confirmed,
        }
    }

    /// Which border treatment the current phase uses.
    #[must_use]
    pub const fn border_color_token(&self) -> BorderToken {
        match self.phase {
            HighlightPhase::Active => BorderToken::Accent,
            HighlightPhase::Confirmed => BorderToken::Success,
        }
    }
}

/// Compute the cutout region for a target box.
///
/// The cutout is the target inflated by the step's `highlight_padding` on
/// all sides, with the style's corner radius. The padding gives the
/// highlighted element breathing room inside the ring; `0.0` hugs the
/// target exactly.
#[must_use]
pub fn cutout(target: Rect, highlight_padding: f64, corner_radius: f64) -> RoundedRect {
    RoundedRect::from_rect(target.inflate(highlight_padding, highlight_padding), corner_radius)
}
