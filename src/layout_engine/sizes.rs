use once_cell::sync::Lazy;

/// Preferred icon sizes in logical pixels, ascending. Built on first use and
/// never mutated afterwards.
static PREFERRED_ICON_SIZES: Lazy<Vec<f64>> =
    Lazy::new(|| (16..128).step_by(4).map(f64::from).collect());

/// The rendered icon is twice the preferred size.
const ICON_SIZE_MULTIPLIER: f64 = 2.0;

pub fn preferred_icon_sizes() -> &'static [f64] { &PREFERRED_ICON_SIZES }

/// Maps a normalized size fraction onto the table. Out-of-range fractions
/// clamp to the ends.
pub fn preferred_icon_size(fraction: f64) -> f64 {
    let table = preferred_icon_sizes();
    let fraction = if fraction.is_nan() { 0.0 } else { fraction.clamp(0.0, 1.0) };
    let idx = ((fraction * table.len() as f64).floor() as usize).min(table.len() - 1);
    table[idx] * ICON_SIZE_MULTIPLIER
}
