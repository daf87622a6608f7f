use crate::common::config::AnimationEasing;

/// Eases a normalized time `t` in [0, 1]. The endpoints are exact.
pub fn ease(easing: AnimationEasing, t: f64) -> f64 {
    if t <= 0.0 {
        return 0.0;
    }
    if t >= 1.0 {
        return 1.0;
    }
    match easing {
        AnimationEasing::Linear => t,
        AnimationEasing::EaseInQuad => t * t,
        AnimationEasing::EaseOutQuad => 1.0 - (1.0 - t) * (1.0 - t),
        AnimationEasing::EaseInOutQuad => {
            if t < 0.5 {
                2.0 * t * t
            } else {
                1.0 - f64::powi(-2.0 * t + 2.0, 2) / 2.0
            }
        }
        AnimationEasing::BounceIn => 1.0 - bounce_out(1.0 - t),
        AnimationEasing::BounceOut => bounce_out(t),
        AnimationEasing::BounceInOut => {
            if t < 0.5 {
                (1.0 - bounce_out(1.0 - 2.0 * t)) / 2.0
            } else {
                (1.0 + bounce_out(2.0 * t - 1.0)) / 2.0
            }
        }
    }
}

/// Value between `from` and `to` after `elapsed` of `duration` ms. A
/// zero-length duration yields `to`.
pub fn interpolate(
    easing: AnimationEasing,
    elapsed: f64,
    duration: f64,
    from: f64,
    to: f64,
) -> f64 {
    if duration <= 0.0 {
        return to;
    }
    from + (to - from) * ease(easing, elapsed / duration)
}

fn bounce_out(t: f64) -> f64 {
    const N1: f64 = 7.5625;
    const D1: f64 = 2.75;

    if t < 1.0 / D1 {
        N1 * t * t
    } else if t < 2.0 / D1 {
        let t = t - 1.5 / D1;
        N1 * t * t + 0.75
    } else if t < 2.5 / D1 {
        let t = t - 2.25 / D1;
        N1 * t * t + 0.9375
    } else {
        let t = t - 2.625 / D1;
        N1 * t * t + 0.984375
    }
}
