// Copyright 2025 the Limelight Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Limelight Resolve: target lookup and bounded retry.
//!
//! Tour steps point at live elements in a dynamic page, and those elements
//! may mount asynchronously: the element a step targets can be absent on
//! the frame the step activates and present a few hundred milliseconds
//! later. This crate owns the two pieces that deal with that:
//!
//! - [`TargetQuery`], the single capability the engine needs from its host
//!   environment: "find the element matching this identifier" and "read an
//!   element's current bounding box". Supplying a fake implementation of
//!   this trait is the only seam needed to test the whole engine without a
//!   real page.
//! - [`RetryPolicy`], the bounded retry schedule expressed as a pure
//!   function of how many attempts have been made, so it is testable
//!   without real timers. The default is the engine's contract: attempt
//!   once on activation, retry exactly once more after a fixed short delay,
//!   then give up for that step activation (fail-soft).
//!
//! [`Resolver`] ties the two together for one step activation: it counts
//! attempts, consults the policy, and classifies each attempt as resolved,
//! retry-later, or unreachable. It never sleeps or schedules anything —
//! deferral to the next paint frame and the retry delay are the caller's
//! job, driven by the returned [`Resolution`].
//!
//! Queries are expected to be idempotent and side-effect-free on the page;
//! bounding boxes are snapshots in viewport coordinates, never live
//! references, and must be re-read after any geometry-affecting event.
//!
//! # Example
//!
//! ```
//! use kurbo::Rect;
//! use limelight_resolve::{Resolution, Resolver, RetryPolicy, TargetQuery};
//!
//! struct EmptyPage;
//! impl TargetQuery for EmptyPage {
//!     type Handle = u32;
//!     fn find(&self, _selector: &str) -> Option<u32> {
//!         None
//!     }
//!     fn bounding_box(&self, _handle: &u32) -> Option<Rect> {
//!         None
//!     }
//! }
//!
//! let mut resolver = Resolver::new(RetryPolicy::default());
//! resolver.begin();
//!
//! // First attempt misses: retry after the policy's delay.
//! assert_eq!(
//!     resolver.attempt(&EmptyPage, "[data-tour=vendors]"),
//!     Resolution::RetryAfter(300),
//! );
//! // Second attempt misses: the step is unreachable for this activation.
//! assert_eq!(
//!     resolver.attempt(&EmptyPage, "[data-tour=vendors]"),
//!     Resolution::Unreachable,
//! );
//! ```
//!
//! This crate is `no_std`.

#![no_std]

#[cfg(test)]
extern crate alloc;

use kurbo::Rect;

/// The host-environment capability the tour engine depends on.
///
/// `Handle` is whatever small value the host uses to refer to an element —
/// a node id, an interned pointer, an index into a test fixture. The engine
/// only clones and compares handles; it never inspects them.
///
/// Implementations must be idempotent and side-effect-free on the page:
/// calling [`TargetQuery::find`] twice in a row with the same selector
/// observes the page, it does not change it.
pub trait TargetQuery {
    /// Opaque element handle.
    type Handle: Clone + PartialEq;

    /// Find the element matching a stable identifier, or report not-found.
    fn find(&self, selector: &str) -> Option<Self::Handle>;

    /// Read an element's current bounding box in viewport coordinates.
    ///
    /// Returns `None` when the element is no longer measurable (for
    /// example, it unmounted between `find` and the measurement).
    fn bounding_box(&self, handle: &Self::Handle) -> Option<Rect>;
}

/// Bounded retry schedule for asynchronous targets.
///
/// The schedule is a pure function of the number of attempts already made:
/// [`RetryPolicy::delay_after`] returns the delay to wait before the next
/// attempt, or `None` once the budget is spent. No timer types appear here.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total resolution attempts allowed per step activation.
    pub max_attempts: u32,
    /// Fixed delay between attempts, in milliseconds.
    pub retry_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            retry_delay_ms: 300,
        }
    }
}

impl RetryPolicy {
    /// Delay before the next attempt, given how many attempts were made.
    ///
    /// `Some(ms)` while the budget allows another attempt, `None` once
    /// `attempts_made >= max_attempts`.
    #[must_use]
    pub const fn delay_after(&self, attempts_made: u32) -> Option<u64> {
        if attempts_made < self.max_attempts {
            Some(self.retry_delay_ms)
        } else {
            None
        }
    }
}

/// Outcome of one resolution attempt.
#[derive(Clone, Debug, PartialEq)]
pub enum Resolution<K> {
    /// The target was found and measured.
    Resolved {
        /// Handle of the resolved element.
        handle: K,
        /// Fresh bounding-box snapshot in viewport coordinates.
        bounds: Rect,
    },
    /// Not found; try again after this many milliseconds.
    RetryAfter(u64),
    /// Not found and the attempt budget is spent; the step renders nothing.
    Unreachable,
}

/// Attempt bookkeeping for a single step activation.
///
/// Call [`Resolver::begin`] on every step activation, then
/// [`Resolver::attempt`] once per paint frame the caller dedicates to
/// resolution. The resolver holds no element state between activations, so
/// a stale handle can never leak across a step transition.
#[derive(Clone, Debug)]
pub struct Resolver {
    policy: RetryPolicy,
    attempts: u32,
}

impl Resolver {
    /// Create a resolver with the given policy.
    #[must_use]
    pub const fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            attempts: 0,
        }
    }

    /// Reset the attempt count for a new step activation.
    pub fn begin(&mut self) {
        self.attempts = 0;
    }

    /// Attempts made since the last [`Resolver::begin`].
    #[must_use]
    pub const fn attempts_made(&self) -> u32 {
        self.attempts
    }

    /// The policy this resolver consults.
    #[must_use]
    pub const fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Perform one resolution attempt through the query seam.
    ///
    /// A target that is found but not measurable counts as a miss: the
    /// element exists but cannot be highlighted yet.
    pub fn attempt<Q: TargetQuery>(
        &mut self,
        query: &Q,
        selector: &str,
    ) -> Resolution<Q::Handle> {
        self.attempts += 1;
        if let Some(handle) = query.find(selector)
            && let Some(bounds) = query.bounding_box(&handle)
        {
            return Resolution::Resolved { handle, bounds };
        }
        match self.policy.delay_after(self.attempts) {
            Some(ms) => Resolution::RetryAfter(ms),
            None => Resolution::Unreachable,
        }
    }
}
