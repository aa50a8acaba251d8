// Copyright 2025 the Limelight Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Limelight Geometry: tooltip placement and viewport clamping.
//!
//! This crate computes where a tour tooltip goes relative to its highlighted
//! target, built on top of [`kurbo`]. It is intentionally decoupled from any
//! particular host environment or render layer: callers pass a target
//! bounding box, a requested [`Placement`], and the current viewport size,
//! and get back a top-left origin for the tooltip.
//!
//! ## Placement model
//!
//! - The tooltip is anchored to one edge of the target per [`Placement`]
//!   (for example, [`Placement::Right`] centers the tooltip vertically on
//!   the target and offsets it past the target's right edge by
//!   [`TooltipMetrics::gap`]).
//! - Both axes are then clamped independently so the tooltip never extends
//!   past `[margin, viewport - size - margin]`.
//!
//! The result is deterministic and monotonic: the same target, placement,
//! viewport, and metrics always produce the same origin, and moving the
//! target along an axis never moves the tooltip the other way. There is no
//! animation or randomness at this layer; positions must be recomputed by
//! the caller on every resize and step change because the underlying page
//! is dynamic.
//!
//! # Example
//!
//! ```
//! use kurbo::{Rect, Size};
//! use limelight_geometry::{place_tooltip, Placement, TooltipMetrics};
//!
//! let target = Rect::new(100.0, 100.0, 180.0, 140.0);
//! let viewport = Size::new(1280.0, 720.0);
//! let metrics = TooltipMetrics::default();
//!
//! // "Bottom" opens below the target, horizontally centered on it.
//! let origin = place_tooltip(target, Placement::Bottom, viewport, &metrics);
//! assert_eq!(origin.y, 140.0 + metrics.gap);
//!
//! // Same inputs, same output.
//! assert_eq!(
//!     origin,
//!     place_tooltip(target, Placement::Bottom, viewport, &metrics),
//! );
//! ```
//!
//! This crate is `no_std`.

#![no_std]

use kurbo::{Point, Rect, Size};

/// Which side of the target the tooltip opens on.
///
/// The placement is a *request*: clamping may shift the tooltip along
/// either axis to keep it inside the viewport, but it never flips the
/// tooltip to the opposite side.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Placement {
    /// Above the target, horizontally centered on it.
    Top,
    /// Below the target, horizontally centered on it.
    Bottom,
    /// To the left of the target, vertically centered on it.
    Left,
    /// To the right of the target, vertically centered on it.
    Right,
}

/// Fixed layout constants for tooltip placement.
///
/// The tooltip size is an *estimate* used for anchoring and clamping; the
/// host renders the real tooltip at whatever size its content needs. The
/// defaults are reasonable for a ~3-sentence tour card and none of them are
/// load-bearing.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TooltipMetrics {
    /// Estimated tooltip extent used for anchoring and clamping.
    pub size: Size,
    /// Gap between the target's edge and the tooltip, in viewport units.
    pub gap: f64,
    /// Minimum distance kept between the tooltip and the viewport edges.
    pub margin: f64,
}

impl Default for TooltipMetrics {
    fn default() -> Self {
        Self {
            size: Size::new(320.0, 140.0),
            gap: 12.0,
            margin: 16.0,
        }
    }
}

/// Clamp a tooltip origin coordinate along one axis.
///
/// Keeps `value` within `[margin, limit - extent - margin]`, where `limit`
/// is the viewport extent along the axis and `extent` is the tooltip extent
/// along the same axis. When the viewport is too small to honor the margin
/// on both sides, the lower bound wins, keeping the tooltip's origin edge
/// on screen.
///
/// The clamp is monotonic in `value` for fixed `extent`, `limit`, and
/// `margin`.
#[inline]
#[must_use]
pub fn clamp_axis(value: f64, extent: f64, limit: f64, margin: f64) -> f64 {
    let upper = limit - extent - margin;
    value.min(upper).max(margin)
}

/// Unclamped anchor position for a tooltip of `size` on the given side.
///
/// `Top`/`Bottom` center the tooltip horizontally on the target;
/// `Left`/`Right` center it vertically. `gap` is the distance between the
/// target's edge and the near edge of the tooltip.
#[must_use]
pub fn anchor(target: Rect, placement: Placement, size: Size, gap: f64) -> Point {
    let center = target.center();
    match placement {
        Placement::Top => Point::new(center.x - size.width / 2.0, target.y0 - gap - size.height),
        Placement::Bottom => Point::new(center.x - size.width / 2.0, target.y1 + gap),
        Placement::Left => Point::new(target.x0 - gap - size.width, center.y - size.height / 2.0),
        Placement::Right => Point::new(target.x1 + gap, center.y - size.height / 2.0),
    }
}

/// Compute the tooltip origin for a target box within a viewport.
///
/// Anchors per `placement`, then clamps each axis independently so the
/// tooltip stays within `[margin, viewport - size - margin]` on both axes.
/// Callers must recompute on every resize and step change; the returned
/// point is a snapshot, not a live position.
#[must_use]
pub fn place_tooltip(
    target: Rect,
    placement: Placement,
    viewport: Size,
    metrics: &TooltipMetrics,
) -> Point {
    let raw = anchor(target, placement, metrics.size, metrics.gap);
    Point::new(
        clamp_axis(raw.x, metrics.size.width, viewport.width, metrics.margin),
        clamp_axis(raw.y, metrics.size.height, viewport.height, metrics.margin),
    )
}
