// Copyright 2025 the Limelight Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The tour state machine.
//!
//! ## Overview
//!
//! [`Tour`] owns the session, drives resolution, geometry, the spotlight,
//! and the click trap, and decides per step whether advancement is explicit
//! or click-driven. It is strictly sans-io: hosts call the transition and
//! delivery methods and execute the returned [`Effect`](crate::Effect)
//! batches.
//!
//! ## Lifecycle
//!
//! - [`Tour::start`]: idle → active at step 0, unless the device gate says
//!   the viewport is too narrow or the step list is empty — both complete
//!   the tour immediately (the host records it as satisfied) without ever
//!   entering the active state.
//! - [`Tour::advance`]: explicit advancement; at the last step it completes
//!   the tour and fires `on_complete` exactly once.
//! - [`Tour::target_clicked`]: delivery from the host's armed capture
//!   listener. A captured click shows the confirmed spotlight, holds
//!   briefly, then advances.
//! - [`Tour::skip`]: user dismissal from any step, firing `on_skip`.
//! - [`Tour::resize`]: re-measures the current target and re-places the
//!   tooltip. The gate decision is sticky; a resize never aborts a tour.
//! - [`Tour::teardown`] / [`Tour::reset`]: synchronous cancellation of all
//!   schedules and the trap, without firing either callback.
//!
//! ## Step activation
//!
//! Activating a step cancels everything the previous step scheduled,
//! disarms the trap, clears the session's geometry snapshots, and requests
//! a paint frame. Resolution runs on that frame so DOM mutations triggered
//! by the previous advancement have committed. A miss retries once after a
//! fixed delay; a second miss renders nothing for the step (fail-soft) but
//! leaves `skip` and `advance` live. A broken step must never trap the
//! user.
//!
//! ## Re-entrancy
//!
//! Advancement is refused while a transition is mid-flight: from the moment
//! an advance (explicit or click-driven) is accepted until the next step's
//! activation frame arrives. Together with the one-shot click trap this
//! makes near-simultaneous duplicate events advance at most one step.

use alloc::vec::Vec;

use hashbrown::HashMap;
use kurbo::Size;

use limelight_geometry::{place_tooltip, TooltipMetrics};
use limelight_intercept::{ClickTrap, SuppressFlags, TrapOutcome};
use limelight_resolve::{Resolution, Resolver, RetryPolicy, TargetQuery};
use limelight_spotlight::{cutout, HighlightPhase, Spotlight, SpotlightStyle};

use crate::effects::{Effect, Effects, OverlayFrame, ScheduleToken, TooltipFrame};
use crate::gate::{DeviceClass, DeviceGate};
use crate::session::{TourSession, TourStatus};
use crate::steps::{AdvanceMode, StepDefinition};

/// Completion callbacks, injected at construction.
///
/// The host treats skip identically to completion for persistence purposes
/// (the user should not see the tour again), but the callbacks are distinct
/// so it can record which occurred.
pub trait TourObserver {
    /// The tour finished its last step, was bypassed by the device gate, or
    /// had nothing to show.
    fn on_complete(&mut self);
    /// The user dismissed the tour midway.
    fn on_skip(&mut self);
}

/// Tunable constants for one tour.
///
/// Every field has a reasonable fixed default; none of the values are
/// load-bearing.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TourConfig {
    /// Tooltip layout constants.
    pub metrics: TooltipMetrics,
    /// Resolution retry schedule.
    pub retry: RetryPolicy,
    /// Viewport gate consulted once in [`Tour::start`].
    pub gate: DeviceGate,
    /// Spotlight visuals, including the confirm-hold duration.
    pub style: SpotlightStyle,
    /// Suppression the host applies in its capture-phase listener.
    pub suppress: SuppressFlags,
}

impl Default for TourConfig {
    fn default() -> Self {
        Self {
            metrics: TooltipMetrics::default(),
            retry: RetryPolicy::default(),
            gate: DeviceGate::default(),
            style: SpotlightStyle::default(),
            suppress: SuppressFlags::default(),
        }
    }
}

/// What a scheduled token is for. Tokens are purpose-tagged here, so it
/// does not matter whether the host reports them back through
/// [`Tour::frame`] or [`Tour::timer`].
#[derive(Copy, Clone, Debug)]
enum Pending {
    /// Attempt target resolution on this paint frame.
    ResolveFrame,
    /// The retry delay elapsed; request the next resolution frame.
    RetryDelay,
    /// The confirmed-feedback hold elapsed; finish the advancement.
    ConfirmHold,
}

/// The guided-tour state machine.
///
/// Generic over the host's query seam `Q` and observer `O`. The session is
/// owned exclusively by this machine; external code reads it through
/// [`Tour::session`] and mutates it only through the transition methods.
pub struct Tour<Q: TargetQuery, O: TourObserver> {
    steps: Vec<StepDefinition>,
    query: Q,
    observer: O,
    config: TourConfig,
    viewport: Size,
    session: TourSession<Q::Handle>,
    resolver: Resolver,
    trap: ClickTrap<Q::Handle>,
    phase: HighlightPhase,
    pending: HashMap<ScheduleToken, Pending>,
    next_token: u64,
}

impl<Q: TargetQuery, O: TourObserver> core::fmt::Debug for Tour<Q, O> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tour")
            .field("steps", &self.steps.len())
            .field("status", &self.session.status())
            .field("current_step", &self.session.current_step())
            .finish_non_exhaustive()
    }
}

impl<Q: TargetQuery, O: TourObserver> Tour<Q, O> {
    /// Create a tour over an ordered step list with default configuration.
    ///
    /// `viewport` is the initial viewport size; keep it current through
    /// [`Tour::resize`].
    pub fn new(steps: Vec<StepDefinition>, query: Q, observer: O, viewport: Size) -> Self {
        Self::with_config(steps, query, observer, viewport, TourConfig::default())
    }

    /// Create a tour with explicit configuration.
    pub fn with_config(
        steps: Vec<StepDefinition>,
        query: Q,
        observer: O,
        viewport: Size,
        config: TourConfig,
    ) -> Self {
        Self {
            steps,
            query,
            observer,
            viewport,
            session: TourSession::new(),
            resolver: Resolver::new(config.retry),
            trap: ClickTrap::with_flags(config.suppress),
            phase: HighlightPhase::Active,
            pending: HashMap::new(),
            next_token: 0,
            config,
        }
    }

    /// Read-only view of the session.
    #[must_use]
    pub const fn session(&self) -> &TourSession<Q::Handle> {
        &self.session
    }

    /// The authored step list.
    #[must_use]
    pub fn steps(&self) -> &[StepDefinition] {
        &self.steps
    }

    /// The viewport size the engine last saw.
    #[must_use]
    pub const fn viewport(&self) -> Size {
        self.viewport
    }

    /// The configuration in effect.
    #[must_use]
    pub const fn config(&self) -> &TourConfig {
        &self.config
    }

    /// Begin the tour: idle → active at step 0.
    ///
    /// An empty step list and a gate-rejected viewport both complete the
    /// tour immediately: `on_complete` fires once and the active state is
    /// never entered. Starting from any state but idle is a no-op.
    pub fn start(&mut self) -> Effects<Q::Handle> {
        let mut fx = Effects::new();
        if self.session.status != TourStatus::Idle {
            return fx;
        }
        if self.steps.is_empty()
            || self.config.gate.evaluate(self.viewport) == DeviceClass::Narrow
        {
            self.session.status = TourStatus::Completed;
            self.observer.on_complete();
            return fx;
        }
        self.session.status = TourStatus::Active;
        self.session.current_step = 0;
        self.activate_step(&mut fx);
        fx
    }

    /// Explicit "Next" advancement.
    ///
    /// No-op unless active, and refused while a transition is mid-flight so
    /// near-simultaneous calls cannot skip two steps at once. At the last
    /// step the tour completes and `on_complete` fires exactly once.
    pub fn advance(&mut self) -> Effects<Q::Handle> {
        let mut fx = Effects::new();
        if self.session.status != TourStatus::Active || self.session.in_transition {
            return fx;
        }
        self.finish_advance(&mut fx);
        fx
    }

    /// User dismissal. Active → skipped from any step, firing `on_skip`.
    ///
    /// Cancels every pending schedule and disarms the click trap
    /// synchronously, before the terminal state is entered.
    pub fn skip(&mut self) -> Effects<Q::Handle> {
        let mut fx = Effects::new();
        if self.session.status != TourStatus::Active {
            return fx;
        }
        self.clear_step_state(&mut fx);
        self.session.clear_presentation();
        self.session.in_transition = false;
        fx.push(Effect::ClearOverlay);
        self.session.status = TourStatus::Skipped;
        self.observer.on_skip();
        fx
    }

    /// The viewport changed.
    ///
    /// Re-measures the current target through the query seam and recomputes
    /// the overlay; stale geometry is never reused. The gate decision made
    /// in [`Tour::start`] is sticky — shrinking the viewport mid-tour does
    /// not abort it. A target that can no longer be measured clears the
    /// overlay for the step (fail-soft).
    pub fn resize(&mut self, viewport: Size) -> Effects<Q::Handle> {
        let mut fx = Effects::new();
        self.viewport = viewport;
        if self.session.status != TourStatus::Active {
            return fx;
        }
        let Some((handle, _)) = self.session.resolved_target.clone() else {
            return fx;
        };
        match self.query.bounding_box(&handle) {
            Some(bounds) => {
                self.session.resolved_target = Some((handle, bounds));
                self.present(&mut fx, self.phase);
            }
            None => {
                self.session.clear_presentation();
                fx.push(Effect::ClearOverlay);
            }
        }
        fx
    }

    /// A requested paint frame arrived.
    pub fn frame(&mut self, token: ScheduleToken) -> Effects<Q::Handle> {
        self.deliver(token)
    }

    /// A started timer fired.
    pub fn timer(&mut self, token: ScheduleToken) -> Effects<Q::Handle> {
        self.deliver(token)
    }

    /// The host's armed capture listener saw a click on `target`.
    ///
    /// A click on anything but the armed element (including the armed
    /// element of an earlier step) is ignored with no state change. A
    /// captured click consumes the trap, renders the confirmed spotlight,
    /// and schedules the hold after which the tour advances.
    pub fn target_clicked(&mut self, target: &Q::Handle) -> Effects<Q::Handle> {
        let mut fx = Effects::new();
        if self.session.status != TourStatus::Active || self.session.in_transition {
            return fx;
        }
        if self.trap.on_click(target) != TrapOutcome::Captured {
            return fx;
        }
        fx.push(Effect::DisarmClickTrap(target.clone()));
        self.session.in_transition = true;
        self.present(&mut fx, HighlightPhase::Confirmed);
        let token = self.issue(Pending::ConfirmHold);
        fx.push(Effect::StartTimer(token, self.config.style.confirm_hold_ms));
        fx
    }

    /// Synchronously cancel every schedule and detach the click trap,
    /// without firing either callback.
    ///
    /// For the host navigating away mid-tour: after this returns, no
    /// intercepted click or late timer can reach the session. The machine
    /// is left in its current status; use [`Tour::reset`] to make it
    /// startable again.
    pub fn teardown(&mut self) -> Effects<Q::Handle> {
        let mut fx = Effects::new();
        self.clear_step_state(&mut fx);
        if self.session.status == TourStatus::Active {
            self.session.clear_presentation();
            fx.push(Effect::ClearOverlay);
        }
        fx
    }

    /// Teardown plus a fresh idle session, so the host's "reset tour"
    /// action can call [`Tour::start`] again.
    pub fn reset(&mut self) -> Effects<Q::Handle> {
        let mut fx = self.teardown();
        self.session = TourSession::new();
        self.phase = HighlightPhase::Active;
        self.resolver.begin();
        // Tokens keep counting up; stale ones from before the reset stay dead.
        fx
    }

    fn issue(&mut self, purpose: Pending) -> ScheduleToken {
        self.next_token += 1;
        let token = ScheduleToken(self.next_token);
        self.pending.insert(token, purpose);
        token
    }

    /// Cancel pending schedules and disarm the trap, emitting the
    /// corresponding host effects.
    fn clear_step_state(&mut self, fx: &mut Effects<Q::Handle>) {
        for (token, _) in self.pending.drain() {
            fx.push(Effect::CancelSchedule(token));
        }
        if let Some(stale) = self.trap.disarm() {
            fx.push(Effect::DisarmClickTrap(stale));
        }
    }

    /// Enter the current step: drop everything the previous step owned and
    /// request the activation frame.
    fn activate_step(&mut self, fx: &mut Effects<Q::Handle>) {
        self.clear_step_state(fx);
        self.session.clear_presentation();
        self.phase = HighlightPhase::Active;
        self.session.in_transition = true;
        self.resolver.begin();
        fx.push(Effect::ClearOverlay);
        let token = self.issue(Pending::ResolveFrame);
        fx.push(Effect::RequestFrame(token));
    }

    /// Move to the next step, or complete at the last one.
    fn finish_advance(&mut self, fx: &mut Effects<Q::Handle>) {
        if self.session.current_step + 1 >= self.steps.len() {
            self.clear_step_state(fx);
            self.session.clear_presentation();
            self.session.in_transition = false;
            fx.push(Effect::ClearOverlay);
            self.session.status = TourStatus::Completed;
            self.observer.on_complete();
        } else {
            self.session.current_step += 1;
            self.activate_step(fx);
        }
    }

    /// Token delivery. Stale and unknown tokens (cancelled, superseded, or
    /// outliving a skip or teardown) are ignored without touching the
    /// session.
    fn deliver(&mut self, token: ScheduleToken) -> Effects<Q::Handle> {
        let mut fx = Effects::new();
        let Some(purpose) = self.pending.remove(&token) else {
            return fx;
        };
        if self.session.status != TourStatus::Active {
            return fx;
        }
        match purpose {
            Pending::ResolveFrame => {
                self.session.in_transition = false;
                self.resolve_current(&mut fx);
            }
            Pending::RetryDelay => {
                let token = self.issue(Pending::ResolveFrame);
                fx.push(Effect::RequestFrame(token));
            }
            Pending::ConfirmHold => {
                self.finish_advance(&mut fx);
            }
        }
        fx
    }

    /// One resolution attempt for the current step, on its paint frame.
    fn resolve_current(&mut self, fx: &mut Effects<Q::Handle>) {
        let step = &self.steps[self.session.current_step];
        let selector = step.target_selector.clone();
        let advance = step.advance;
        match self.resolver.attempt(&self.query, &selector) {
            Resolution::Resolved { handle, bounds } => {
                self.session.resolved_target = Some((handle.clone(), bounds));
                self.present(fx, HighlightPhase::Active);
                if advance == AdvanceMode::ClickIntercept {
                    self.trap.arm(handle.clone());
                    fx.push(Effect::ArmClickTrap(handle, self.config.suppress));
                }
            }
            Resolution::RetryAfter(ms) => {
                let token = self.issue(Pending::RetryDelay);
                fx.push(Effect::StartTimer(token, ms));
            }
            Resolution::Unreachable => {
                // Fail-soft: nothing rendered for this step, but the tour
                // stays responsive to skip() and advance().
                fx.push(Effect::ClearOverlay);
            }
        }
    }

    /// Build and emit the overlay frame for the current step from the
    /// session's fresh target snapshot.
    fn present(&mut self, fx: &mut Effects<Q::Handle>, phase: HighlightPhase) {
        let bounds = match self.session.resolved_target {
            Some((_, bounds)) => bounds,
            None => return,
        };
        let step = &self.steps[self.session.current_step];
        let origin = place_tooltip(bounds, step.placement, self.viewport, &self.config.metrics);
        let cut = cutout(bounds, step.highlight_padding, self.config.style.corner_radius);
        let spotlight = match phase {
            HighlightPhase::Active => Spotlight::active(cut),
            HighlightPhase::Confirmed => Spotlight::confirmed(cut),
        };
        let tooltip = TooltipFrame {
            origin,
            size: self.config.metrics.size,
            title: step.title.clone(),
            body: step.body.clone(),
            step: self.session.current_step + 1,
            total: self.steps.len(),
            last: self.session.current_step + 1 == self.steps.len(),
            next_control: step.advance == AdvanceMode::Explicit,
        };
        self.phase = phase;
        self.session.tooltip_origin = Some(origin);
        fx.push(Effect::Render(OverlayFrame { spotlight, tooltip }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::collections::BTreeMap;
    use alloc::rc::Rc;
    use alloc::string::{String, ToString};
    use alloc::vec;
    use alloc::vec::Vec;
    use core::cell::{Cell, RefCell};
    use kurbo::Rect;

    const VIEWPORT: Size = Size::new(1280.0, 720.0);

    /// In-memory page keyed by selector. Boxes are mutable so tests can
    /// move elements between measurements; `mount_after` models targets
    /// that render asynchronously.
    struct FakePage {
        boxes: RefCell<BTreeMap<String, Rect>>,
        mount_after: u32,
        finds: Cell<u32>,
    }

    impl FakePage {
        fn new(entries: &[(&str, Rect)]) -> Self {
            let mut boxes = BTreeMap::new();
            for (selector, rect) in entries {
                boxes.insert(selector.to_string(), *rect);
            }
            Self {
                boxes: RefCell::new(boxes),
                mount_after: 0,
                finds: Cell::new(0),
            }
        }

        fn mounting_after(mut self, finds: u32) -> Self {
            self.mount_after = finds;
            self
        }

        fn move_box(&self, selector: &str, rect: Rect) {
            self.boxes.borrow_mut().insert(selector.to_string(), rect);
        }

        fn remove_box(&self, selector: &str) {
            self.boxes.borrow_mut().remove(selector);
        }
    }

    impl TargetQuery for FakePage {
        type Handle = String;

        fn find(&self, selector: &str) -> Option<String> {
            let seen = self.finds.get() + 1;
            self.finds.set(seen);
            if seen <= self.mount_after {
                return None;
            }
            self.boxes
                .borrow()
                .contains_key(selector)
                .then(|| selector.to_string())
        }

        fn bounding_box(&self, handle: &String) -> Option<Rect> {
            self.boxes.borrow().get(handle).copied()
        }
    }

    #[derive(Default, Debug)]
    struct Counts {
        completed: u32,
        skipped: u32,
    }

    impl TourObserver for Rc<RefCell<Counts>> {
        fn on_complete(&mut self) {
            self.borrow_mut().completed += 1;
        }
        fn on_skip(&mut self) {
            self.borrow_mut().skipped += 1;
        }
    }

    type TestTour = Tour<FakePage, Rc<RefCell<Counts>>>;

    fn three_steps() -> Vec<StepDefinition> {
        let mut nav = StepDefinition::new(2, "[data-tour=vendors]", "Vendors");
        nav.advance = AdvanceMode::ClickIntercept;
        vec![
            StepDefinition::new(1, "[data-tour=dash]", "Dashboard"),
            nav,
            StepDefinition::new(3, "[data-tour=upload]", "Uploads"),
        ]
    }

    fn full_page() -> FakePage {
        FakePage::new(&[
            ("[data-tour=dash]", Rect::new(100.0, 100.0, 300.0, 160.0)),
            ("[data-tour=vendors]", Rect::new(400.0, 100.0, 560.0, 140.0)),
            ("[data-tour=upload]", Rect::new(100.0, 300.0, 300.0, 360.0)),
        ])
    }

    fn tour_with(steps: Vec<StepDefinition>, page: FakePage) -> (TestTour, Rc<RefCell<Counts>>) {
        let counts = Rc::new(RefCell::new(Counts::default()));
        let tour = Tour::new(steps, page, Rc::clone(&counts), VIEWPORT);
        (tour, counts)
    }

    fn start_and_run(tour: &mut TestTour) -> Vec<Effect<String>> {
        let fx = tour.start();
        run_to_idle(tour, fx)
    }

    fn advance_and_run(tour: &mut TestTour) -> Vec<Effect<String>> {
        let fx = tour.advance();
        run_to_idle(tour, fx)
    }

    /// Deliver every scheduled frame/timer until the engine stops
    /// scheduling, returning the non-schedule effects seen along the way.
    fn run_to_idle(tour: &mut TestTour, fx: Effects<String>) -> Vec<Effect<String>> {
        let mut log = Vec::new();
        let mut queue: Vec<(ScheduleToken, bool)> = Vec::new();
        let mut batch = fx;
        loop {
            for effect in batch.drain(..) {
                match effect {
                    Effect::RequestFrame(t) => queue.push((t, true)),
                    Effect::StartTimer(t, _) => queue.push((t, false)),
                    other => log.push(other),
                }
            }
            let Some((token, is_frame)) = queue.pop() else {
                break;
            };
            batch = if is_frame {
                tour.frame(token)
            } else {
                tour.timer(token)
            };
        }
        log
    }

    fn rendered_frames(log: &[Effect<String>]) -> Vec<&OverlayFrame> {
        log.iter()
            .filter_map(|e| match e {
                Effect::Render(frame) => Some(frame),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn happy_path_three_steps_one_completion() {
        let (mut tour, counts) = tour_with(three_steps(), full_page());
        let mut indices = Vec::new();

        let log = start_and_run(&mut tour);
        indices.push(tour.session().current_step());
        assert_eq!(tour.session().status(), TourStatus::Active);
        let frames = rendered_frames(&log);
        assert_eq!(frames.last().unwrap().tooltip.step, 1);
        assert!(!frames.last().unwrap().tooltip.last);
        assert!(frames.last().unwrap().tooltip.next_control);

        // Step 1 is explicit.
        advance_and_run(&mut tour);
        indices.push(tour.session().current_step());

        // Step 2 advances by clicking the live target.
        let handle = "[data-tour=vendors]".to_string();
        let fx = tour.target_clicked(&handle);
        assert!(
            fx.iter()
                .any(|e| matches!(e, Effect::DisarmClickTrap(h) if *h == handle)),
            "captured click must detach the listener"
        );
        run_to_idle(&mut tour, fx);
        indices.push(tour.session().current_step());

        // Step 3 is explicit and last.
        advance_and_run(&mut tour);

        assert_eq!(indices, vec![0, 1, 2]);
        assert_eq!(tour.session().status(), TourStatus::Completed);
        assert_eq!(counts.borrow().completed, 1);
        assert_eq!(counts.borrow().skipped, 0);
    }

    #[test]
    fn click_intercept_step_arms_trap_with_suppression() {
        let (mut tour, _) = tour_with(three_steps(), full_page());
        start_and_run(&mut tour);
        let log = advance_and_run(&mut tour);

        let armed = log.iter().find_map(|e| match e {
            Effect::ArmClickTrap(h, flags) => Some((h.clone(), *flags)),
            _ => None,
        });
        let (handle, flags) = armed.expect("click-intercept step must arm the trap");
        assert_eq!(handle, "[data-tour=vendors]");
        assert!(flags.contains(SuppressFlags::PREVENT_DEFAULT));
        assert!(flags.contains(SuppressFlags::STOP_PROPAGATION));

        // The tooltip for a click-advance step offers no explicit control.
        let frames = rendered_frames(&log);
        assert!(!frames.last().unwrap().tooltip.next_control);
    }

    #[test]
    fn confirmed_feedback_precedes_click_advancement() {
        let (mut tour, _) = tour_with(three_steps(), full_page());
        start_and_run(&mut tour);
        advance_and_run(&mut tour);

        let fx = tour.target_clicked(&"[data-tour=vendors]".to_string());
        let confirmed = fx.iter().any(|e| {
            matches!(
                e,
                Effect::Render(frame) if frame.spotlight.phase == HighlightPhase::Confirmed
            )
        });
        assert!(confirmed, "captured click must render confirmed feedback");
        // Still on step 2 until the hold elapses.
        assert_eq!(tour.session().current_step(), 1);

        run_to_idle(&mut tour, fx);
        assert_eq!(tour.session().current_step(), 2);
    }

    #[test]
    fn skip_midway_fires_on_skip_once_and_deadens_targets() {
        let (mut tour, counts) = tour_with(three_steps(), full_page());
        start_and_run(&mut tour);
        advance_and_run(&mut tour);
        assert_eq!(tour.session().current_step(), 1);

        let fx = tour.skip();
        assert!(fx.iter().any(|e| matches!(e, Effect::ClearOverlay)));
        assert_eq!(tour.session().status(), TourStatus::Skipped);
        assert_eq!(counts.borrow().skipped, 1);
        assert_eq!(counts.borrow().completed, 0);

        // A later click on step 2's target has no effect.
        let fx = tour.target_clicked(&"[data-tour=vendors]".to_string());
        assert!(fx.is_empty());
        assert_eq!(tour.session().status(), TourStatus::Skipped);
        assert_eq!(counts.borrow().skipped, 1);
    }

    #[test]
    fn narrow_viewport_bypasses_without_entering_active() {
        let counts = Rc::new(RefCell::new(Counts::default()));
        let mut tour = Tour::new(
            three_steps(),
            full_page(),
            Rc::clone(&counts),
            Size::new(375.0, 812.0),
        );

        let fx = tour.start();
        assert!(fx.is_empty());
        assert_eq!(tour.session().status(), TourStatus::Completed);
        assert_eq!(counts.borrow().completed, 1);

        // Starting again is a no-op; the callback does not re-fire.
        tour.start();
        assert_eq!(counts.borrow().completed, 1);
    }

    #[test]
    fn empty_step_list_completes_immediately() {
        let (mut tour, counts) = tour_with(Vec::new(), full_page());

        tour.start();
        assert_eq!(tour.session().status(), TourStatus::Completed);
        assert_eq!(counts.borrow().completed, 1);
    }

    #[test]
    fn progress_is_monotonic_and_completion_idempotent() {
        let (mut tour, counts) = tour_with(three_steps(), full_page());
        start_and_run(&mut tour);

        let mut last = tour.session().current_step();
        for _ in 0..10 {
            advance_and_run(&mut tour);
            // Step 2 is click-advance; push it through its click.
            if tour.session().status() == TourStatus::Active
                && tour.session().current_step() == 1
            {
                let fx = tour.target_clicked(&"[data-tour=vendors]".to_string());
                run_to_idle(&mut tour, fx);
            }
            let step = tour.session().current_step();
            assert!(step >= last, "current_step must be non-decreasing");
            last = step;
        }

        assert_eq!(tour.session().status(), TourStatus::Completed);
        assert_eq!(counts.borrow().completed, 1, "on_complete fires exactly once");
    }

    #[test]
    fn unresolvable_target_attempts_exactly_twice() {
        let steps = vec![StepDefinition::new(1, "[data-tour=ghost]", "Ghost")];
        let page = full_page();
        let (mut tour, _) = tour_with(steps, page);

        let log = start_and_run(&mut tour);

        assert_eq!(tour.query.finds.get(), 2, "bounded retry: two attempts, no more");
        // Fail-soft: the overlay is simply absent.
        assert!(rendered_frames(&log).is_empty());
        assert_eq!(tour.session().status(), TourStatus::Active);
        assert!(tour.session().resolved_target_box().is_none());
    }

    #[test]
    fn unreachable_step_remains_skippable() {
        let steps = vec![StepDefinition::new(1, "[data-tour=ghost]", "Ghost")];
        let (mut tour, counts) = tour_with(steps, full_page());
        start_and_run(&mut tour);

        tour.skip();
        assert_eq!(tour.session().status(), TourStatus::Skipped);
        assert_eq!(counts.borrow().skipped, 1);
    }

    #[test]
    fn late_mounting_target_renders_after_retry() {
        let steps = vec![StepDefinition::new(1, "[data-tour=dash]", "Dashboard")];
        let page = full_page().mounting_after(1);
        let (mut tour, _) = tour_with(steps, page);

        let log = start_and_run(&mut tour);

        assert!(!rendered_frames(&log).is_empty());
        assert!(tour.session().resolved_target_box().is_some());
    }

    #[test]
    fn teardown_detaches_listener_and_clears_timers() {
        let (mut tour, counts) = tour_with(three_steps(), full_page());
        start_and_run(&mut tour);
        advance_and_run(&mut tour);

        let fx = tour.teardown();
        assert!(
            fx.iter()
                .any(|e| matches!(e, Effect::DisarmClickTrap(h) if h == "[data-tour=vendors]")),
            "teardown must detach the armed listener"
        );

        // A synthetic click afterwards does not advance anything.
        let fx = tour.target_clicked(&"[data-tour=vendors]".to_string());
        assert!(fx.is_empty());
        assert_eq!(tour.session().current_step(), 1);
        assert_eq!(counts.borrow().completed, 0);
        assert_eq!(counts.borrow().skipped, 0);
    }

    #[test]
    fn stale_timer_after_skip_is_ignored() {
        let (mut tour, _) = tour_with(three_steps(), full_page());
        start_and_run(&mut tour);
        advance_and_run(&mut tour);

        // Capture the confirm-hold token, then skip before it fires.
        let fx = tour.target_clicked(&"[data-tour=vendors]".to_string());
        let token = fx
            .iter()
            .find_map(|e| match e {
                Effect::StartTimer(t, _) => Some(*t),
                _ => None,
            })
            .expect("captured click schedules the confirm hold");
        tour.skip();

        let fx = tour.timer(token);
        assert!(fx.is_empty(), "a timer outliving the tour must not mutate state");
        assert_eq!(tour.session().status(), TourStatus::Skipped);
    }

    #[test]
    fn advance_is_refused_mid_transition() {
        let (mut tour, _) = tour_with(three_steps(), full_page());

        // The activation frame has not arrived yet: still in transition.
        let fx = tour.start();
        assert!(tour.session().in_transition());
        let extra = tour.advance();
        assert!(extra.is_empty());

        run_to_idle(&mut tour, fx);
        assert_eq!(tour.session().current_step(), 0, "the early advance was dropped");
    }

    #[test]
    fn double_click_advances_one_step() {
        let (mut tour, _) = tour_with(three_steps(), full_page());
        start_and_run(&mut tour);
        advance_and_run(&mut tour);

        let handle = "[data-tour=vendors]".to_string();
        let first = tour.target_clicked(&handle);
        let second = tour.target_clicked(&handle);
        assert!(second.is_empty(), "the second click of a double-click is absorbed");

        run_to_idle(&mut tour, first);
        assert_eq!(tour.session().current_step(), 2);
    }

    #[test]
    fn click_on_unarmed_element_is_ignored() {
        let (mut tour, _) = tour_with(three_steps(), full_page());
        start_and_run(&mut tour);

        // Step 1 is explicit; its target is not armed.
        let fx = tour.target_clicked(&"[data-tour=dash]".to_string());
        assert!(fx.is_empty());
        assert_eq!(tour.session().current_step(), 0);
    }

    #[test]
    fn resize_remeasures_and_reclamps() {
        let steps = vec![StepDefinition::new(1, "[data-tour=dash]", "Dashboard")];
        let page = full_page();
        let (mut tour, _) = tour_with(steps, page);
        start_and_run(&mut tour);
        let before = tour.session().tooltip_origin().unwrap();

        // The element moved to the far right edge; the shrunk viewport
        // forces the tooltip back inside the margin.
        tour.query.move_box("[data-tour=dash]", Rect::new(900.0, 100.0, 1000.0, 160.0));
        let fx = tour.resize(Size::new(960.0, 600.0));

        let frames: Vec<_> = fx
            .iter()
            .filter_map(|e| match e {
                Effect::Render(frame) => Some(frame),
                _ => None,
            })
            .collect();
        assert_eq!(frames.len(), 1);
        let origin = frames[0].tooltip.origin;
        assert_ne!(origin, before);
        let m = tour.config().metrics;
        assert!(origin.x >= m.margin);
        assert!(origin.x <= 960.0 - m.size.width - m.margin);
        assert_eq!(tour.session().tooltip_origin(), Some(origin));
    }

    #[test]
    fn shrinking_below_gate_mid_tour_does_not_abort() {
        let (mut tour, counts) = tour_with(three_steps(), full_page());
        start_and_run(&mut tour);

        tour.resize(Size::new(375.0, 812.0));
        assert_eq!(tour.session().status(), TourStatus::Active);
        assert_eq!(counts.borrow().completed, 0);
    }

    #[test]
    fn resize_after_target_unmounts_clears_overlay() {
        let steps = vec![StepDefinition::new(1, "[data-tour=dash]", "Dashboard")];
        let (mut tour, _) = tour_with(steps, full_page());
        start_and_run(&mut tour);
        assert!(tour.session().resolved_target_box().is_some());

        tour.query.remove_box("[data-tour=dash]");
        let fx = tour.resize(Size::new(1024.0, 768.0));

        assert!(fx.iter().any(|e| matches!(e, Effect::ClearOverlay)));
        assert!(tour.session().resolved_target_box().is_none());
        assert_eq!(tour.session().status(), TourStatus::Active);
    }

    #[test]
    fn fresh_measurement_taken_on_each_step() {
        // Two steps pointing at the same selector: the box moves between
        // them, and the second step must see the new position.
        let steps = vec![
            StepDefinition::new(1, "[data-tour=dash]", "First"),
            StepDefinition::new(2, "[data-tour=dash]", "Second"),
        ];
        let (mut tour, _) = tour_with(steps, full_page());
        start_and_run(&mut tour);
        let first = tour.session().resolved_target_box().unwrap();

        tour.query.move_box("[data-tour=dash]", Rect::new(500.0, 500.0, 700.0, 560.0));
        advance_and_run(&mut tour);
        let second = tour.session().resolved_target_box().unwrap();

        assert_ne!(first, second, "stale measurements must not survive a step change");
        assert_eq!(second, Rect::new(500.0, 500.0, 700.0, 560.0));
    }

    #[test]
    fn reset_returns_to_idle_without_callbacks() {
        let (mut tour, counts) = tour_with(three_steps(), full_page());
        start_and_run(&mut tour);
        advance_and_run(&mut tour);

        tour.reset();
        assert_eq!(tour.session().status(), TourStatus::Idle);
        assert_eq!(counts.borrow().completed, 0);
        assert_eq!(counts.borrow().skipped, 0);

        // Startable again from scratch.
        start_and_run(&mut tour);
        assert_eq!(tour.session().status(), TourStatus::Active);
        assert_eq!(tour.session().current_step(), 0);
    }

    #[test]
    fn tooltip_progress_reflects_position_in_sequence() {
        let (mut tour, _) = tour_with(three_steps(), full_page());
        start_and_run(&mut tour);
        advance_and_run(&mut tour);
        let fx = tour.target_clicked(&"[data-tour=vendors]".to_string());
        let log = run_to_idle(&mut tour, fx);

        let frames = rendered_frames(&log);
        let final_frame = frames.last().unwrap();
        assert_eq!(final_frame.tooltip.step, 3);
        assert_eq!(final_frame.tooltip.total, 3);
        assert!(final_frame.tooltip.last);
    }
}
