// Copyright 2025 the Limelight Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The effect vocabulary the host executes.
//!
//! The engine never touches a real page, timer, or listener. Every public
//! operation returns a small batch of [`Effect`]s describing what the host
//! should do: render or clear the overlay, request a paint frame, start or
//! cancel a timer, attach or detach the capture-phase click listener. The
//! host executes them in order and reports completions back through the
//! engine's `frame`/`timer`/`target_clicked` methods.
//!
//! Scheduling is token-based: the engine issues a fresh [`ScheduleToken`]
//! per frame request or timer and validates it on delivery. A token the
//! engine no longer knows about — cancelled, superseded by a step change,
//! or outliving a teardown — is ignored, so a host timer that fires late
//! can never mutate tour state.

use alloc::string::String;

use kurbo::{Point, Size};
use limelight_intercept::SuppressFlags;
use limelight_spotlight::Spotlight;
use smallvec::SmallVec;

/// Opaque handle for one scheduled frame request or timer.
///
/// Issued once, never reused within a session.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ScheduleToken(pub(crate) u64);

/// Declarative tooltip content and position for one rendered step.
#[derive(Clone, Debug, PartialEq)]
pub struct TooltipFrame {
    /// Top-left corner, already clamped to the viewport.
    pub origin: Point,
    /// The layout estimate the origin was computed with.
    pub size: Size,
    /// Step heading.
    pub title: String,
    /// Step body text.
    pub body: String,
    /// One-based position of this step, for a progress label.
    pub step: usize,
    /// Total number of steps.
    pub total: usize,
    /// Whether this is the final step (hosts typically relabel the
    /// advance control "Done").
    pub last: bool,
    /// Whether the tooltip offers the explicit advance control. False for
    /// click-intercept steps, whose only way forward is the live target —
    /// exactly one advancement control exists per step.
    pub next_control: bool,
}

/// Everything the host needs to paint one step's overlay.
#[derive(Clone, Debug, PartialEq)]
pub struct OverlayFrame {
    /// The dim mask cutout and highlight ring.
    pub spotlight: Spotlight,
    /// The tooltip card.
    pub tooltip: TooltipFrame,
}

/// One instruction for the host.
#[derive(Clone, Debug, PartialEq)]
pub enum Effect<K> {
    /// Paint (or repaint) the overlay for the current step.
    Render(OverlayFrame),
    /// Remove the overlay entirely.
    ClearOverlay,
    /// Call back `frame(token)` on the next paint frame.
    RequestFrame(ScheduleToken),
    /// Call back `timer(token)` after the given number of milliseconds.
    StartTimer(ScheduleToken, u64),
    /// The schedule behind this token is obsolete; stop it if possible.
    /// Late delivery is harmless either way.
    CancelSchedule(ScheduleToken),
    /// Attach a capture-phase click listener to this element, applying the
    /// given suppression before the page's own handler can run, and report
    /// clicks via `target_clicked`.
    ArmClickTrap(K, SuppressFlags),
    /// Detach the capture-phase listener from this element.
    DisarmClickTrap(K),
}

/// Per-operation effect batch; almost always four entries or fewer.
pub type Effects<K> = SmallVec<[Effect<K>; 4]>;
