// Copyright 2025 the Limelight Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Limelight Engine: the guided-tour state machine.
//!
//! ## Overview
//!
//! This crate ties the Limelight building blocks together into the tour
//! engine proper: an ordered list of [`StepDefinition`]s is walked by a
//! [`Tour`], which resolves each step's live target through the host's
//! [`TargetQuery`](limelight_resolve::TargetQuery) seam, computes overlay
//! geometry, and decides per step whether advancement is explicit or
//! click-driven.
//!
//! The engine is sans-io. It owns no timers, listeners, or page access:
//! every public operation returns a batch of [`Effect`]s — render this
//! overlay, request a paint frame, start or cancel this timer, attach or
//! detach this capture-phase click listener — and the host reports
//! completions back through [`Tour::frame`], [`Tour::timer`], and
//! [`Tour::target_clicked`]. This keeps the whole engine deterministic and
//! testable with an in-memory page and no real clock.
//!
//! ## Lifecycle
//!
//! ```text
//! idle ──start()──▶ active ──advance()/click──▶ … ──▶ completed
//!                     │
//!                     └──skip()──▶ skipped
//! ```
//!
//! `completed` and `skipped` are terminal. The injected [`TourObserver`]
//! hears exactly one of `on_complete`/`on_skip` per session; the host
//! persists the decision and suppresses future tours accordingly. A
//! [`DeviceGate`] check in `start()` bypasses the tour entirely on narrow
//! viewports, completing it immediately — an environment decision, not a
//! user one, and sticky for the session.
//!
//! ## Failure posture
//!
//! The tour is an enhancement layer over a live product page: every failure
//! degrades toward "let the user keep using the page". Unresolvable targets
//! render nothing but leave the tour navigable; late timers and stale
//! clicks are ignored; geometry overflow is clamped, never surfaced.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod effects;
pub mod gate;
pub mod session;
pub mod steps;
pub mod tour;

pub use effects::{Effect, Effects, OverlayFrame, ScheduleToken, TooltipFrame};
pub use gate::{DeviceClass, DeviceGate};
pub use session::{TourSession, TourStatus};
pub use steps::{AdvanceMode, StepDefinition};
pub use tour::{Tour, TourConfig, TourObserver};
