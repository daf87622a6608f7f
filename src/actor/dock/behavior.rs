use bitflags::bitflags;
use enum_dispatch::enum_dispatch;
use serde::{Deserialize, Serialize};

use super::activation::Modifiers;
use super::effect::DockScheduler;
use crate::actor::animator::Animator;
use crate::actor::autohide::AutoHide;
use crate::common::config::DockConfig;
use crate::layout_engine::DockGeometry;
use crate::model::IconEntry;
use crate::sys::geometry::Point;

bitflags! {
    /// Pointer events a behavior wants to see.
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct Capabilities: u8 {
        const MOTION = 1 << 0;
        const BUTTON = 1 << 1;
        const ENTER  = 1 << 2;
        const LEAVE  = 1 << 3;
        const SCROLL = 1 << 4;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ButtonEvent {
    pub pointer: Point,
    pub button: u8,
    pub pressed: bool,
    #[serde(default)]
    pub modifiers: Modifiers,
}

/// Everything a behavior may look at while handling one event. Geometry is
/// a copy of the last layout pass; behaviors never write it back.
pub struct BehaviorCtx<'a> {
    pub geometry: DockGeometry,
    /// Where the dock sits right now. Differs from the shown position only
    /// while autohide has it hidden or in transit.
    pub dock_origin: Point,
    pub icons: &'a [IconEntry],
    pub config: &'a DockConfig,
    pub scheduler: &'a mut DockScheduler,
}

impl BehaviorCtx<'_> {
    pub fn autohide_allowed(&self) -> bool {
        self.config.autohide.enabled && !self.geometry.autohide_blocked
    }

    pub fn fully_shown(&self) -> bool { self.dock_origin == self.geometry.shown_position }
}

#[enum_dispatch]
pub trait Behavior {
    fn capabilities(&self) -> Capabilities;

    fn is_enabled(&self, _ctx: &BehaviorCtx<'_>) -> bool { true }

    fn on_motion(&mut self, _ctx: &mut BehaviorCtx<'_>, _pointer: Point) {}

    fn on_button(&mut self, _ctx: &mut BehaviorCtx<'_>, _event: &ButtonEvent) {}

    fn on_enter(&mut self, _ctx: &mut BehaviorCtx<'_>, _pointer: Point) {}

    fn on_leave(&mut self, _ctx: &mut BehaviorCtx<'_>) {}

    fn on_scroll(&mut self, _ctx: &mut BehaviorCtx<'_>, _delta: f64) {}
}

/// Listeners in dispatch order. Animator runs before AutoHide.
#[derive(Debug)]
#[enum_dispatch(Behavior)]
pub enum Listener {
    Animator(Animator),
    AutoHide(AutoHide),
}

impl Listener {
    pub fn as_autohide(&self) -> Option<&AutoHide> {
        match self {
            Listener::AutoHide(autohide) => Some(autohide),
            _ => None,
        }
    }

    pub fn as_autohide_mut(&mut self) -> Option<&mut AutoHide> {
        match self {
            Listener::AutoHide(autohide) => Some(autohide),
            _ => None,
        }
    }

    pub fn as_animator_mut(&mut self) -> Option<&mut Animator> {
        match self {
            Listener::Animator(animator) => Some(animator),
            _ => None,
        }
    }
}

/// Pointer input as seen by the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerInput {
    Motion(Point),
    Button(ButtonEvent),
    Enter(Point),
    Leave,
    Scroll(f64),
}

impl PointerInput {
    pub fn capability(&self) -> Capabilities {
        match self {
            PointerInput::Motion(_) => Capabilities::MOTION,
            PointerInput::Button(_) => Capabilities::BUTTON,
            PointerInput::Enter(_) => Capabilities::ENTER,
            PointerInput::Leave => Capabilities::LEAVE,
            PointerInput::Scroll(_) => Capabilities::SCROLL,
        }
    }
}

/// Forwards `input` to every enabled listener that handles it, in list
/// order. Returns how many listeners saw the event.
pub fn dispatch(
    listeners: &mut [Listener],
    ctx: &mut BehaviorCtx<'_>,
    input: PointerInput,
) -> usize {
    let wanted = input.capability();
    let mut delivered = 0;
    for listener in listeners.iter_mut() {
        if !listener.capabilities().contains(wanted) || !listener.is_enabled(ctx) {
            continue;
        }
        delivered += 1;
        match input {
            PointerInput::Motion(pointer) => listener.on_motion(ctx, pointer),
            PointerInput::Button(event) => listener.on_button(ctx, &event),
            PointerInput::Enter(pointer) => listener.on_enter(ctx, pointer),
            PointerInput::Leave => listener.on_leave(ctx),
            PointerInput::Scroll(delta) => listener.on_scroll(ctx, delta),
        }
    }
    delivered
}
