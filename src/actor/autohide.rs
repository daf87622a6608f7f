use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::dock::behavior::{Behavior, BehaviorCtx, ButtonEvent, Capabilities};
use super::dock::effect::{AnimKey, Deferred, Effect, slide_at};
use crate::animation::{Frame, FrameSample, TimerId};
use crate::layout_engine::DockGeometry;
use crate::sys::geometry::Point;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AutoHideState {
    Hidden,
    Showing,
    Shown,
    Hiding,
}

/// Keeps the dock off-screen until the pointer comes near its edge.
///
/// The dock position is owned here. It only moves through `Slide` frames
/// scheduled under [`AnimKey::AutoHide`] or by snapping to fresh geometry.
#[derive(Debug)]
pub struct AutoHide {
    state: AutoHideState,
    position: Point,
    pointer_inside: bool,
    enabled: bool,
    hide_timer: Option<TimerId>,
    geometry: Option<DockGeometry>,
}

impl Default for AutoHide {
    fn default() -> Self { Self::new() }
}

impl AutoHide {
    pub fn new() -> Self {
        AutoHide {
            state: AutoHideState::Shown,
            position: Point::ZERO,
            pointer_inside: false,
            enabled: false,
            hide_timer: None,
            geometry: None,
        }
    }

    pub fn state(&self) -> AutoHideState { self.state }

    pub fn position(&self) -> Point { self.position }

    pub fn pointer_inside(&self) -> bool { self.pointer_inside }

    /// Whether autohide was in effect as of the last layout pass.
    pub fn enabled(&self) -> bool { self.enabled }

    pub fn hide_pending(&self) -> bool { self.hide_timer.is_some() }

    /// Reconciles with a layout pass. Disabling settles to shown at once; a
    /// changed geometry restarts a running transition towards the new
    /// endpoints and snaps a settled dock onto them.
    pub fn on_layout(&mut self, ctx: &mut BehaviorCtx<'_>) {
        let geometry = ctx.geometry;
        let previous = self.geometry.replace(geometry);

        if !ctx.autohide_allowed() {
            if self.enabled || self.state != AutoHideState::Shown {
                debug!(
                    blocked = geometry.autohide_blocked,
                    from = %self.state,
                    "autohide disabled, forcing shown"
                );
            }
            self.enabled = false;
            // Pointer events are not delivered while disabled.
            self.pointer_inside = false;
            self.force_shown(ctx);
            return;
        }

        let was_enabled = std::mem::replace(&mut self.enabled, true);
        if was_enabled && previous == Some(geometry) {
            return;
        }
        let edge_changed = previous.is_some_and(|p| p.position != geometry.position);

        match self.state {
            AutoHideState::Shown => {
                self.position = geometry.shown_position;
                if !was_enabled && !self.pointer_inside {
                    self.arm_hide(ctx);
                }
            }
            AutoHideState::Hidden => self.position = geometry.hidden_position,
            AutoHideState::Showing => {
                let from = if edge_changed { geometry.hidden_position } else { self.position };
                debug!(?from, to = ?geometry.shown_position, "restarting show with new geometry");
                self.start_slide(ctx, from, geometry.shown_position);
            }
            AutoHideState::Hiding => {
                let from = if edge_changed { geometry.shown_position } else { self.position };
                debug!(?from, to = ?geometry.hidden_position, "restarting hide with new geometry");
                self.start_slide(ctx, from, geometry.hidden_position);
            }
        }
    }

    /// Writes the dock position for one `Slide` sample.
    pub fn apply(&mut self, sample: &FrameSample<AnimKey, Effect>) {
        if let Effect::Slide { from, to, easing } = sample.effect {
            self.position = slide_at(from, to, easing, sample.elapsed_ms, sample.duration_ms);
        }
    }

    /// The transition sequence ran to completion.
    pub fn settle(&mut self, ctx: &mut BehaviorCtx<'_>) {
        match self.state {
            AutoHideState::Showing => {
                self.transition(AutoHideState::Shown);
                self.position = ctx.geometry.shown_position;
                if !self.pointer_inside {
                    self.arm_hide(ctx);
                }
            }
            AutoHideState::Hiding => {
                self.transition(AutoHideState::Hidden);
                self.position = ctx.geometry.hidden_position;
            }
            AutoHideState::Shown | AutoHideState::Hidden => {}
        }
    }

    /// The hide debounce expired.
    pub fn on_hide_timer(&mut self, ctx: &mut BehaviorCtx<'_>) {
        self.hide_timer = None;
        if !self.enabled || self.pointer_inside || self.state != AutoHideState::Shown {
            trace!(state = %self.state, inside = self.pointer_inside, "hide debounce ignored");
            return;
        }
        self.transition(AutoHideState::Hiding);
        let to = ctx.geometry.hidden_position;
        self.start_slide(ctx, self.position, to);
    }

    fn reveal(&mut self, ctx: &mut BehaviorCtx<'_>) {
        self.cancel_hide(ctx);
        match self.state {
            AutoHideState::Hidden | AutoHideState::Hiding => {
                self.transition(AutoHideState::Showing);
                // From wherever the dock is now, so an interrupted hide never jumps.
                let to = ctx.geometry.shown_position;
                self.start_slide(ctx, self.position, to);
            }
            AutoHideState::Showing | AutoHideState::Shown => {}
        }
    }

    fn force_shown(&mut self, ctx: &mut BehaviorCtx<'_>) {
        ctx.scheduler.cancel(AnimKey::AutoHide);
        self.cancel_hide(ctx);
        self.state = AutoHideState::Shown;
        self.position = ctx.geometry.shown_position;
    }

    fn start_slide(&mut self, ctx: &mut BehaviorCtx<'_>, from: Point, to: Point) {
        let settings = &ctx.config.autohide;
        ctx.scheduler.run_animation(
            AnimKey::AutoHide,
            vec![Frame::new(settings.duration_ms, Effect::slide(from, to, settings.easing))],
        );
    }

    fn arm_hide(&mut self, ctx: &mut BehaviorCtx<'_>) {
        self.cancel_hide(ctx);
        self.hide_timer =
            Some(ctx.scheduler.run_once(ctx.config.autohide.hide_delay_ms, Deferred::Hide));
    }

    fn cancel_hide(&mut self, ctx: &mut BehaviorCtx<'_>) {
        if let Some(timer) = self.hide_timer.take() {
            ctx.scheduler.cancel_timer(timer);
        }
    }

    fn transition(&mut self, to: AutoHideState) {
        debug!(from = %self.state, %to, "autohide");
        self.state = to;
    }

    /// The pointer is over the dock as currently placed, or over the edge
    /// trigger strip.
    fn covers(&self, ctx: &BehaviorCtx<'_>, pointer: Point) -> bool {
        ctx.geometry.trigger_area.contains(pointer)
            || ctx.geometry.rect_at(self.position).contains(pointer)
    }

    fn pointer_on_dock(&mut self, ctx: &mut BehaviorCtx<'_>) {
        self.pointer_inside = true;
        self.cancel_hide(ctx);
    }
}

impl Behavior for AutoHide {
    fn capabilities(&self) -> Capabilities { Capabilities::all() }

    fn is_enabled(&self, ctx: &BehaviorCtx<'_>) -> bool { ctx.autohide_allowed() }

    fn on_motion(&mut self, ctx: &mut BehaviorCtx<'_>, pointer: Point) {
        if self.covers(ctx, pointer) {
            self.pointer_on_dock(ctx);
            self.reveal(ctx);
        } else if std::mem::replace(&mut self.pointer_inside, false)
            && self.state == AutoHideState::Shown
        {
            self.arm_hide(ctx);
        }
    }

    fn on_button(&mut self, ctx: &mut BehaviorCtx<'_>, _event: &ButtonEvent) {
        self.pointer_on_dock(ctx);
    }

    fn on_enter(&mut self, ctx: &mut BehaviorCtx<'_>, _pointer: Point) {
        self.pointer_on_dock(ctx);
        self.reveal(ctx);
    }

    fn on_leave(&mut self, ctx: &mut BehaviorCtx<'_>) {
        self.pointer_inside = false;
        if self.state == AutoHideState::Shown {
            self.arm_hide(ctx);
        }
    }

    fn on_scroll(&mut self, ctx: &mut BehaviorCtx<'_>, _delta: f64) { self.pointer_on_dock(ctx); }
}
