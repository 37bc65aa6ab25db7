pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t.clamp(0.0, 1.0)
}

/// Position of `x` inside `[a, b]` as a fraction, clamped to `[0, 1]`.
pub fn unlerp(a: f64, b: f64, x: f64) -> f64 {
    let span = b - a;
    if span.abs() < 1e-12 {
        return 0.0;
    }
    ((x - a) / span).clamp(0.0, 1.0)
}
