// Copyright 2025 the Limelight Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Limelight Intercept: the capture-phase click trap.
//!
//! Some tour steps advance only when the user clicks the live target itself
//! — a real navigation link, say. For those steps the tour must fully own
//! the interaction: the click is captured ahead of the page's own handler,
//! its default effect is suppressed (the link must not navigate), and the
//! tour advances instead.
//!
//! This crate models that trap's lifecycle. The actual listener lives in
//! the host environment; the host attaches a capture-phase listener when
//! the engine arms the trap and removes it when the engine disarms it,
//! applying the [`SuppressFlags`] the trap carries. What this crate owns is
//! the decision logic:
//!
//! - A trap is armed on exactly one element for the duration of one step.
//! - The first click on the armed element is [`TrapOutcome::Captured`] and
//!   *consumes* the trap, so a second near-simultaneous click cannot drive
//!   a second advancement.
//! - A click on any other element, or on a previously armed element after
//!   [`ClickTrap::disarm`], is [`TrapOutcome::Ignored`] with no state
//!   change. A dangling trap on a now-irrelevant element is a correctness
//!   bug, so disarming is synchronous and unconditional on step change and
//!   tour end.
//!
//! The trap is generic over the element handle `K`, matching the handle
//! type of the host's query seam.
//!
//! # Example
//!
//! ```
//! use limelight_intercept::{ClickTrap, TrapOutcome};
//!
//! let mut trap: ClickTrap<u32> = ClickTrap::new();
//! trap.arm(42);
//!
//! // A click somewhere else passes through untouched.
//! assert_eq!(trap.on_click(&7), TrapOutcome::Ignored);
//!
//! // The click on the live target is captured, once.
//! assert_eq!(trap.on_click(&42), TrapOutcome::Captured);
//! assert_eq!(trap.on_click(&42), TrapOutcome::Ignored);
//! ```
//!
//! This crate is `no_std`.

#![no_std]

bitflags::bitflags! {
    /// How the host's capture-phase listener suppresses the real click.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct SuppressFlags: u8 {
        /// Call `preventDefault()` so the click's default effect (for
        /// example, navigation) never happens.
        const PREVENT_DEFAULT  = 0b0000_0001;
        /// Call `stopPropagation()` so the page's own handlers never run.
        const STOP_PROPAGATION = 0b0000_0010;
    }
}

impl Default for SuppressFlags {
    fn default() -> Self {
        Self::PREVENT_DEFAULT | Self::STOP_PROPAGATION
    }
}

/// Result of offering a click to the trap.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TrapOutcome {
    /// The click hit the armed element; the tour owns this interaction.
    Captured,
    /// Not armed for this element; the click is none of the tour's business.
    Ignored,
}

/// One-shot capture trap for a single step's target element.
///
/// At most one element is armed at a time; arming a new element replaces
/// the previous one. Capturing consumes the armed entry.
#[derive(Clone, Debug)]
pub struct ClickTrap<K> {
    armed: Option<K>,
    flags: SuppressFlags,
}

impl<K: PartialEq> ClickTrap<K> {
    /// Create a disarmed trap with the default suppression flags.
    #[must_use]
    pub fn new() -> Self {
        Self {
            armed: None,
            flags: SuppressFlags::default(),
        }
    }

    /// Create a disarmed trap with explicit suppression flags.
    #[must_use]
    pub const fn with_flags(flags: SuppressFlags) -> Self {
        Self { armed: None, flags }
    }

    /// The suppression flags the host's listener should apply.
    #[must_use]
    pub const fn flags(&self) -> SuppressFlags {
        self.flags
    }

    /// Arm the trap on a step's target element.
    ///
    /// Returns the previously armed element, if any, so the caller can tell
    /// its host to detach the stale listener.
    pub fn arm(&mut self, target: K) -> Option<K> {
        self.armed.replace(target)
    }

    /// Disarm the trap, returning the element whose listener must go.
    pub fn disarm(&mut self) -> Option<K> {
        self.armed.take()
    }

    /// The currently armed element, if any.
    #[must_use]
    pub const fn armed(&self) -> Option<&K> {
        self.armed.as_ref()
    }

    /// Offer a click to the trap.
    ///
    /// Capturing consumes the armed entry, so repeated clicks on the same
    /// element yield `Captured` at most once per arming.
    pub fn on_click(&mut self, target: &K) -> TrapOutcome {
        match &self.armed {
            Some(armed) if armed == target => {
                self.armed = None;
                TrapOutcome::Captured
            }
            _ => TrapOutcome::Ignored,
        }
    }
}

impl<K: PartialEq> Default for ClickTrap<K> {
    fn default() -> Self {
        Self::new()
    }
}
