//! The dock actor: owns the last layout, the scheduler and the behaviors,
//! and turns incoming events into calls on them.

pub mod activation;
pub mod behavior;
pub mod effect;
mod error;

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, trace, warn};

pub use self::activation::{ACTIVATION_DELAY_MS, Modifiers};
pub use self::behavior::{
    Behavior, BehaviorCtx, ButtonEvent, Capabilities, Listener, PointerInput,
};
pub use self::effect::{AnimKey, Deferred, DockScheduler, Effect};
pub use self::error::DockError;
use super::animator::Animator;
use super::autohide::{AutoHide, AutoHideState};
use crate::actor;
use crate::common::config::DockConfig;
use crate::layout_engine::{DockGeometry, layout_on};
use crate::model::{IconEntry, IconId, IconKind, IconSource, WindowActions};
use crate::sys::geometry::{Point, Size};
use crate::sys::screen::{Display, MonitorId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Event {
    PointerMoved(Point),
    PointerEntered(Point),
    PointerLeft,
    Button(ButtonEvent),
    Scroll {
        delta: f64,
    },
    IconActivated {
        icon: IconId,
        #[serde(default)]
        modifiers: Modifiers,
    },
    /// Advance animations by this many milliseconds.
    Tick(f64),
    ConfigUpdated(DockConfig),
    MonitorsChanged,
    /// Pin the dock to a monitor, or follow the primary one.
    SetMonitor(Option<MonitorId>),
}

pub type Sender = actor::Sender<Event>;
pub type Receiver = actor::Receiver<Event>;

/// What an observer can see of the dock after an event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DockSnapshot {
    pub state: AutoHideState,
    pub position: Point,
    pub autohide_enabled: bool,
    pub pointer_inside: bool,
    pub icon_size: f64,
    pub dock_width: f64,
    pub dock_height: f64,
    pub shrunk: bool,
}

pub struct Dock {
    config: DockConfig,
    monitor: Option<MonitorId>,
    display: Box<dyn Display>,
    icon_source: Box<dyn IconSource>,
    windows: Box<dyn WindowActions>,
    geometry: Option<DockGeometry>,
    icons: Vec<IconEntry>,
    scheduler: DockScheduler,
    listeners: Vec<Listener>,
}

impl Dock {
    pub fn new(
        config: DockConfig,
        display: Box<dyn Display>,
        icon_source: Box<dyn IconSource>,
        windows: Box<dyn WindowActions>,
    ) -> Self {
        let mut dock = Dock {
            config,
            monitor: None,
            display,
            icon_source,
            windows,
            geometry: None,
            icons: Vec::new(),
            scheduler: DockScheduler::new(),
            listeners: vec![Animator::new().into(), AutoHide::new().into()],
        };
        _ = dock.relayout();
        dock
    }

    pub fn config(&self) -> &DockConfig { &self.config }

    pub fn geometry(&self) -> Option<&DockGeometry> { self.geometry.as_ref() }

    pub fn icons(&self) -> &[IconEntry] { &self.icons }

    pub fn scheduler(&self) -> &DockScheduler { &self.scheduler }

    pub fn autohide(&self) -> Option<&AutoHide> {
        self.listeners.iter().find_map(Listener::as_autohide)
    }

    pub fn snapshot(&self) -> Option<DockSnapshot> {
        let geometry = self.geometry.as_ref()?;
        let autohide = self.autohide()?;
        Some(DockSnapshot {
            state: autohide.state(),
            position: autohide.position(),
            autohide_enabled: autohide.enabled(),
            pointer_inside: autohide.pointer_inside(),
            icon_size: geometry.icon_size,
            dock_width: geometry.dock_width,
            dock_height: geometry.dock_height,
            shrunk: geometry.is_shrunk(),
        })
    }

    pub async fn run(mut self, mut events: Receiver, shutdown: CancellationToken) {
        let mut fps = self.config.animation_fps;
        let mut interval = frame_interval(fps);
        let mut last = tokio::time::Instant::now();

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    debug!("dock shutting down");
                    break;
                }
                event = events.recv() => {
                    let Some((span, event)) = event else { break };
                    let _guard = span.enter();
                    self.handle_event(event);
                    if self.config.animation_fps != fps {
                        fps = self.config.animation_fps;
                        interval = frame_interval(fps);
                    }
                }
                now = interval.tick() => {
                    let dt = now.duration_since(last).as_secs_f64() * 1000.0;
                    last = now;
                    if !self.scheduler.is_idle() {
                        self.tick(dt);
                    }
                }
            }
        }
    }

    fn log_event(&self, event: &Event) {
        match event {
            Event::PointerMoved(_) | Event::Tick(_) | Event::Scroll { .. } => {
                trace!(?event, "Event")
            }
            _ => debug!(?event, "Event"),
        }
    }

    #[instrument(name = "dock::handle_event", skip(self), fields(event=?event))]
    pub fn handle_event(&mut self, event: Event) {
        self.log_event(&event);
        match event {
            Event::PointerMoved(pointer) => self.dispatch(PointerInput::Motion(pointer)),
            Event::PointerEntered(pointer) => {
                self.dispatch(PointerInput::Enter(pointer));
                // Geometry may have gone stale while the pointer was away.
                _ = self.relayout();
            }
            Event::PointerLeft => self.dispatch(PointerInput::Leave),
            Event::Button(button) => self.dispatch(PointerInput::Button(button)),
            Event::Scroll { delta } => self.dispatch(PointerInput::Scroll(delta)),
            Event::IconActivated { icon, modifiers } => {
                if let Err(e) = self.activate(icon, modifiers) {
                    debug!(%e, "activation skipped");
                }
            }
            Event::Tick(dt) => self.tick(dt),
            Event::ConfigUpdated(config) => {
                self.config = config;
                _ = self.relayout();
            }
            Event::MonitorsChanged => {
                _ = self.relayout();
            }
            Event::SetMonitor(monitor) => {
                self.monitor = monitor;
                _ = self.relayout();
            }
        }
    }

    /// Recomputes geometry from fresh config, monitor and icon snapshots,
    /// and lets autohide reconcile with it. A failed pass keeps the previous
    /// geometry.
    pub fn relayout(&mut self) -> Result<DockGeometry, DockError> {
        let icons = self.collect_icons();
        let count = icons.iter().filter(|icon| counts_toward_layout(icon)).count();

        let geometry = match layout_on(&*self.display, self.monitor, &self.config, count) {
            Ok(geometry) => geometry,
            Err(e) => {
                warn!(%e, "layout pass skipped");
                return Err(e.into());
            }
        };
        if geometry.shrink_clamped {
            warn!(count, icon_size = geometry.icon_size, "icons clamped to minimum size");
        }

        let separator = Size::new(geometry.separator_size, geometry.separator_size);
        for icon in icons.iter().filter(|icon| icon.is_separator()) {
            icon.with_visual(|v| v.size = Some(separator));
        }

        if self.geometry.as_ref() != Some(&geometry) {
            debug!(
                count,
                icon_size = geometry.icon_size,
                dock_width = geometry.dock_width,
                dock_height = geometry.dock_height,
                shrink = geometry.shrink,
                "layout"
            );
        }
        self.icons = icons;
        self.geometry = Some(geometry);
        self.with_autohide(|autohide, ctx| autohide.on_layout(ctx));
        Ok(geometry)
    }

    /// Pulls the current icons and applies the per-pass display flags.
    fn collect_icons(&mut self) -> Vec<IconEntry> {
        let mut icons = self.icon_source.icons();
        let before = icons.len();
        icons.retain(IconEntry::is_alive);
        if icons.len() != before {
            debug!(stale = before - icons.len(), "dropping icons without a visual");
        }

        for icon in &icons {
            match icon.kind {
                IconKind::App => {
                    let shown = !self.config.favorites_only || icon.favorite;
                    icon.with_visual(|v| {
                        v.visible = shown;
                        v.size = if shown { None } else { Some(Size::new(0.0, 0.0)) };
                    });
                }
                IconKind::ShowApps => {
                    icon.with_visual(|v| v.visible = self.config.apps_icon);
                }
                IconKind::Separator => {}
            }
        }
        icons
    }

    fn dispatch(&mut self, input: PointerInput) {
        let Some(geometry) = self.geometry else {
            trace!(?input, "no layout yet");
            return;
        };
        let dock_origin = self.dock_origin(&geometry);
        let mut ctx = BehaviorCtx {
            geometry,
            dock_origin,
            icons: &self.icons,
            config: &self.config,
            scheduler: &mut self.scheduler,
        };
        behavior::dispatch(&mut self.listeners, &mut ctx, input);
    }

    fn dock_origin(&self, geometry: &DockGeometry) -> Point {
        self.autohide().map_or(geometry.shown_position, AutoHide::position)
    }

    fn with_autohide<T>(
        &mut self,
        f: impl FnOnce(&mut AutoHide, &mut BehaviorCtx<'_>) -> T,
    ) -> Option<T> {
        let geometry = self.geometry?;
        let dock_origin = self.dock_origin(&geometry);
        let autohide = self.listeners.iter_mut().find_map(Listener::as_autohide_mut)?;
        let mut ctx = BehaviorCtx {
            geometry,
            dock_origin,
            icons: &self.icons,
            config: &self.config,
            scheduler: &mut self.scheduler,
        };
        Some(f(autohide, &mut ctx))
    }

    fn activate(&mut self, id: IconId, modifiers: Modifiers) -> Result<(), DockError> {
        let icon = self.icons.iter().find(|icon| icon.id == id).cloned();
        let icon = icon.filter(IconEntry::is_alive).ok_or(DockError::UnknownIcon(id))?;
        let app = icon.app.clone().ok_or(DockError::NoApp(id))?;

        if self.config.open_app_animation && app.window_count == 0 {
            if let Some(geometry) = self.geometry {
                let dock_origin = self.dock_origin(&geometry);
                let animator = self.listeners.iter_mut().find_map(Listener::as_animator_mut);
                if let Some(animator) = animator {
                    let mut ctx = BehaviorCtx {
                        geometry,
                        dock_origin,
                        icons: &self.icons,
                        config: &self.config,
                        scheduler: &mut self.scheduler,
                    };
                    animator.bounce(&mut ctx, &icon);
                }
            }
        }

        let windows = self.windows.windows(&app.id);
        if let Some(action) = activation::decide(&app, &windows, modifiers) {
            self.scheduler.run_once(ACTIVATION_DELAY_MS, Deferred::Activate(action));
        }
        Ok(())
    }

    fn tick(&mut self, dt: f64) {
        let tick = self.scheduler.tick(dt);

        for payload in tick.fired {
            match payload {
                Deferred::Hide => {
                    self.with_autohide(|autohide, ctx| autohide.on_hide_timer(ctx));
                }
                Deferred::Activate(action) => {
                    info!(?action, "activation");
                    self.windows.perform(&action);
                }
            }
        }

        for sample in &tick.samples {
            match sample.key {
                AnimKey::AutoHide => {
                    if let Some(autohide) =
                        self.listeners.iter_mut().find_map(Listener::as_autohide_mut)
                    {
                        autohide.apply(sample);
                    }
                }
                AnimKey::Magnify | AnimKey::Bounce(_) => Animator::apply(&self.icons, sample),
            }
        }

        if tick.finished.contains(&AnimKey::AutoHide) {
            self.with_autohide(|autohide, ctx| autohide.settle(ctx));
        }
    }
}

/// Separators and hidden icons take no slot in the icon run.
fn counts_toward_layout(icon: &IconEntry) -> bool { !icon.is_separator() && icon.is_visible() }

fn frame_interval(fps: f64) -> tokio::time::Interval {
    let fps = if fps.is_finite() && fps > 0.0 { fps } else { 60.0 };
    let mut interval = tokio::time::interval(Duration::from_secs_f64(1.0 / fps));
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}
