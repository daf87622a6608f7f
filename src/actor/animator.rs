use std::f64::consts::PI;

use tracing::{debug, trace};

use super::dock::behavior::{Behavior, BehaviorCtx, Capabilities};
use super::dock::effect::{AnimKey, Effect};
use crate::animation::{Frame, FrameSample, interpolate};
use crate::common::config::{AnimationEasing, DockConfig};
use crate::layout_engine::DockGeometry;
use crate::model::{IconEntry, IconKind};
use crate::sys::geometry::Point;

pub const RISE_MS: f64 = 250.0;
pub const FALL_MS: f64 = 750.0;
pub const BOUNCES: usize = 3;
pub const UNMAGNIFY_MS: f64 = 150.0;

/// Icon magnification under the pointer and the launch bounce.
#[derive(Debug, Default)]
pub struct Animator {
    magnified: bool,
}

/// Scale for an icon centred at `center` with the pointer at `pointer`.
/// Raised cosine over the primary axis, reaching neutral at the edge of the
/// spread.
pub fn magnification(
    geometry: &DockGeometry,
    config: &DockConfig,
    center: Point,
    pointer: Point,
) -> f64 {
    let reach = geometry.icon_size * geometry.scale_factor * (1.0 + 3.0 * config.animation_spread);
    if reach <= 0.0 {
        return 1.0;
    }
    let distance = geometry.primary_axis_distance(center, pointer);
    if distance >= reach {
        return 1.0;
    }
    1.0 + config.animation_magnify * 0.5 * (1.0 + (PI * distance / reach).cos())
}

/// Height of the launch bounce in pixels.
pub fn bounce_travel(geometry: &DockGeometry, config: &DockConfig) -> f64 {
    geometry.icon_size / 3.0 * (config.animation_rise * 1.5) * geometry.scale_factor
}

/// Rise then bounce back, three times, then snap to rest.
pub fn bounce_frames(travel: f64) -> Vec<Frame<Effect>> {
    let mut frames = Vec::with_capacity(BOUNCES * 2 + 1);
    for _ in 0..BOUNCES {
        frames.push(Frame::new(RISE_MS, Effect::offset(0.0, -travel, AnimationEasing::Linear)));
        frames.push(Frame::new(FALL_MS, Effect::offset(-travel, 0.0, AnimationEasing::BounceOut)));
    }
    frames.push(Frame::snap(Effect::offset(0.0, 0.0, AnimationEasing::Linear)));
    frames
}

fn magnifiable(icon: &IconEntry) -> bool { icon.kind != IconKind::Separator && icon.is_visible() }

impl Animator {
    pub fn new() -> Self { Self::default() }

    pub fn is_magnified(&self) -> bool { self.magnified }

    /// Starts the launch bounce on `icon`, replacing any bounce already
    /// running on it.
    pub fn bounce(&mut self, ctx: &mut BehaviorCtx<'_>, icon: &IconEntry) {
        let travel = bounce_travel(&ctx.geometry, ctx.config);
        debug!(icon = ?icon.id, travel, "launch bounce");
        ctx.scheduler.run_animation(AnimKey::Bounce(icon.id), bounce_frames(travel));
    }

    /// Writes one frame sample to the icons it targets. Icons that went away
    /// since the last layout pass are skipped.
    pub fn apply(icons: &[IconEntry], sample: &FrameSample<AnimKey, Effect>) {
        match (&sample.key, &sample.effect) {
            (AnimKey::Bounce(id), Effect::Offset { from, to, easing }) => {
                let value = interpolate(*easing, sample.elapsed_ms, sample.duration_ms, *from, *to);
                let written = icons
                    .iter()
                    .find(|icon| icon.id == *id)
                    .and_then(|icon| icon.with_visual(|v| v.translation_y = value));
                if written.is_none() {
                    trace!(icon = ?id, "bounce target gone");
                }
            }
            (AnimKey::Magnify, Effect::Scale { from, to, easing }) => {
                for (id, start) in from {
                    let value =
                        interpolate(*easing, sample.elapsed_ms, sample.duration_ms, *start, *to);
                    if let Some(icon) = icons.iter().find(|icon| icon.id == *id) {
                        icon.with_visual(|v| v.scale = value);
                    }
                }
            }
            (key, effect) => trace!(?key, ?effect, "sample not for the animator"),
        }
    }

    fn magnify(&mut self, ctx: &mut BehaviorCtx<'_>, pointer: Point) {
        ctx.scheduler.cancel(AnimKey::Magnify);
        // The trigger strip overlaps the shown rect; a hidden dock stays flat.
        if !ctx.fully_shown() || !ctx.geometry.shown_rect().contains(pointer) {
            self.reset(ctx);
            return;
        }
        let mut stale = 0;
        for icon in ctx.icons.iter().filter(|icon| icon.kind != IconKind::Separator) {
            let scale = if icon.is_visible() {
                magnification(&ctx.geometry, ctx.config, icon.bounds.mid(), pointer)
            } else {
                1.0
            };
            if icon.with_visual(|v| v.scale = scale).is_none() {
                stale += 1;
            }
        }
        if stale > 0 {
            debug!(stale, "skipped icons without a visual");
        }
        self.magnified = true;
    }

    fn reset(&mut self, ctx: &mut BehaviorCtx<'_>) {
        if !std::mem::replace(&mut self.magnified, false) {
            return;
        }
        for icon in ctx.icons {
            icon.with_visual(|v| v.scale = 1.0);
        }
    }

    fn decay(&mut self, ctx: &mut BehaviorCtx<'_>) {
        self.magnified = false;
        let from: Vec<_> = ctx
            .icons
            .iter()
            .filter(|icon| magnifiable(icon))
            .filter_map(|icon| icon.with_visual(|v| v.scale).map(|scale| (icon.id, scale)))
            .filter(|(_, scale)| *scale != 1.0)
            .collect();
        if from.is_empty() {
            return;
        }
        trace!(icons = from.len(), "unmagnify");
        ctx.scheduler.run_animation(
            AnimKey::Magnify,
            vec![
                Frame::new(UNMAGNIFY_MS, Effect::Scale {
                    from: from.clone(),
                    to: 1.0,
                    easing: AnimationEasing::Linear,
                }),
                Frame::snap(Effect::Scale {
                    from,
                    to: 1.0,
                    easing: AnimationEasing::Linear,
                }),
            ],
        );
    }
}

impl Behavior for Animator {
    fn capabilities(&self) -> Capabilities {
        Capabilities::MOTION | Capabilities::ENTER | Capabilities::LEAVE
    }

    fn on_motion(&mut self, ctx: &mut BehaviorCtx<'_>, pointer: Point) {
        self.magnify(ctx, pointer);
    }

    fn on_enter(&mut self, ctx: &mut BehaviorCtx<'_>, pointer: Point) {
        self.magnify(ctx, pointer);
    }

    fn on_leave(&mut self, ctx: &mut BehaviorCtx<'_>) { self.decay(ctx); }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::actor::dock::effect::DockScheduler;
    use crate::layout_engine::compute_layout;
    use crate::model::{IconId, IconVisual, new_visual};
    use crate::sys::geometry::Rect;
    use crate::sys::screen::{MonitorGeometry, MonitorId};

    struct Harness {
        config: DockConfig,
        geometry: DockGeometry,
        scheduler: DockScheduler,
        visuals: Vec<Rc<RefCell<IconVisual>>>,
        icons: Vec<IconEntry>,
        origin: Point,
        animator: Animator,
    }

    impl Harness {
        fn new(count: usize) -> Self {
            let config = DockConfig::default();
            let monitor = MonitorGeometry {
                id: MonitorId::new(1),
                frame: Rect::from_xywh(0.0, 0.0, 1920.0, 1080.0),
                scale_factor: 1.0,
                is_primary: true,
                panel_height: 0.0,
            };
            let geometry = compute_layout(&config, &monitor, count);
            let visuals: Vec<_> = (0..count).map(|_| new_visual()).collect();
            let y = geometry.shown_position.y;
            let icons = visuals
                .iter()
                .enumerate()
                .map(|(i, visual)| IconEntry {
                    id: IconId(i as u64),
                    kind: IconKind::App,
                    bounds: Rect::from_xywh(600.0 + 80.0 * i as f64, y, 64.0, 64.0),
                    app: None,
                    favorite: true,
                    visual: Rc::downgrade(visual),
                })
                .collect();
            Harness {
                config,
                geometry,
                scheduler: DockScheduler::new(),
                visuals,
                icons,
                origin: geometry.shown_position,
                animator: Animator::new(),
            }
        }

        fn with<T>(&mut self, f: impl FnOnce(&mut Animator, &mut BehaviorCtx<'_>) -> T) -> T {
            let mut ctx = BehaviorCtx {
                geometry: self.geometry,
                dock_origin: self.origin,
                icons: &self.icons,
                config: &self.config,
                scheduler: &mut self.scheduler,
            };
            f(&mut self.animator, &mut ctx)
        }

        fn tick(&mut self, dt: f64) -> usize {
            let tick = self.scheduler.tick(dt);
            for sample in &tick.samples {
                Animator::apply(&self.icons, sample);
            }
            tick.samples.len()
        }

        fn scales(&self) -> Vec<f64> { self.visuals.iter().map(|v| v.borrow().scale).collect() }

        fn pointer_over(&self, index: usize) -> Point { self.icons[index].bounds.mid() }
    }

    #[test]
    fn icon_under_pointer_is_largest() {
        let mut h = Harness::new(5);
        let pointer = h.pointer_over(2);
        h.with(|animator, ctx| animator.on_motion(ctx, pointer));

        let scales = h.scales();
        assert_eq!(scales[2], 1.0 + h.config.animation_magnify);
        assert!(scales[1] < scales[2] && scales[1] > 1.0);
        assert_eq!(scales[1], scales[3]);
        assert!(scales[0] < scales[1]);
    }

    #[test]
    fn falloff_reaches_neutral_outside_spread() {
        let h = Harness::new(1);
        let center = Point::new(500.0, 1000.0);
        let reach = h.geometry.icon_size * (1.0 + 3.0 * h.config.animation_spread);
        let edge = Point::new(500.0 + reach, 1000.0);
        assert_eq!(magnification(&h.geometry, &h.config, center, edge), 1.0);
        // Only the primary axis counts for a horizontal dock.
        assert_eq!(
            magnification(&h.geometry, &h.config, center, Point::new(500.0, 1060.0)),
            1.0 + h.config.animation_magnify
        );
    }

    #[test]
    fn pointer_outside_dock_resets_scales() {
        let mut h = Harness::new(3);
        let pointer = h.pointer_over(1);
        h.with(|animator, ctx| animator.on_motion(ctx, pointer));
        assert!(h.animator.is_magnified());

        h.with(|animator, ctx| animator.on_motion(ctx, Point::new(900.0, 100.0)));
        assert_eq!(h.scales(), vec![1.0; 3]);
        assert!(!h.animator.is_magnified());
    }

    #[test]
    fn hidden_dock_is_not_magnified_from_the_trigger_strip() {
        let mut h = Harness::new(3);
        h.origin = h.geometry.hidden_position;
        let strip = Point::new(h.pointer_over(1).x, h.geometry.trigger_area.mid().y);
        assert!(h.geometry.shown_rect().contains(strip));

        h.with(|animator, ctx| animator.on_motion(ctx, strip));
        assert_eq!(h.scales(), vec![1.0; 3]);
        assert!(!h.animator.is_magnified());

        h.origin = h.geometry.shown_position;
        h.with(|animator, ctx| animator.on_motion(ctx, strip));
        assert!(h.scales()[1] > 1.0);
    }

    #[test]
    fn leave_decays_back_to_neutral() {
        let mut h = Harness::new(3);
        let pointer = h.pointer_over(0);
        h.with(|animator, ctx| animator.on_motion(ctx, pointer));
        h.with(|animator, ctx| animator.on_leave(ctx));
        assert!(h.scheduler.is_active(AnimKey::Magnify));

        h.tick(75.0);
        let halfway = h.scales()[0];
        assert!(halfway > 1.0 && halfway < 1.0 + h.config.animation_magnify);

        while h.tick(16.0) > 0 {}
        assert_eq!(h.scales(), vec![1.0; 3]);
    }

    #[test]
    fn motion_cancels_decay() {
        let mut h = Harness::new(3);
        let pointer = h.pointer_over(0);
        h.with(|animator, ctx| animator.on_motion(ctx, pointer));
        h.with(|animator, ctx| animator.on_leave(ctx));
        h.with(|animator, ctx| animator.on_motion(ctx, pointer));
        assert!(!h.scheduler.is_active(AnimKey::Magnify));
    }

    #[test]
    fn bounce_runs_seven_frames_and_rests_at_zero() {
        let mut h = Harness::new(2);
        let icon = h.icons[1].clone();
        h.with(|animator, ctx| animator.bounce(ctx, &icon));

        let mut frames_seen = Vec::new();
        let mut lowest: f64 = 0.0;
        loop {
            let tick = h.scheduler.tick(16.0);
            if tick.samples.is_empty() {
                break;
            }
            for sample in &tick.samples {
                if frames_seen.last() != Some(&sample.index) {
                    frames_seen.push(sample.index);
                }
                Animator::apply(&h.icons, sample);
            }
            lowest = lowest.min(h.visuals[1].borrow().translation_y);
        }

        assert_eq!(frames_seen, (0..7).collect::<Vec<_>>());
        assert_eq!(h.visuals[1].borrow().translation_y, 0.0);
        assert_eq!(h.visuals[0].borrow().translation_y, 0.0);
        let travel = bounce_travel(&h.geometry, &h.config);
        assert!((lowest + travel).abs() < 1e-9);
    }

    #[test]
    fn bounce_on_destroyed_icon_is_harmless() {
        let mut h = Harness::new(2);
        let icon = h.icons[0].clone();
        h.with(|animator, ctx| animator.bounce(ctx, &icon));
        h.visuals.remove(0);
        while h.tick(100.0) > 0 {}
        assert_eq!(h.visuals[0].borrow().translation_y, 0.0);
    }
}
