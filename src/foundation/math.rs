use crate::foundation::core::{Rgba, Vec3};

/// Linear interpolation `a + t * (b - a)`.
///
/// `t == 0` returns `a` untouched, so `b` has no influence at all (not even through
/// NaN/inf or signed-zero propagation).
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    if t == 0.0 {
        return a;
    }
    a + t * (b - a)
}

/// Component-wise [`lerp`] over RGBA.
pub fn lerp_rgba(a: Rgba, b: Rgba, t: f32) -> Rgba {
    if t == 0.0 {
        return a;
    }
    [
        lerp(a[0], b[0], t),
        lerp(a[1], b[1], t),
        lerp(a[2], b[2], t),
        lerp(a[3], b[3], t),
    ]
}

/// Component-wise [`lerp`] over three-component vectors.
pub fn lerp_vec3(a: Vec3, b: Vec3, t: f32) -> Vec3 {
    if t == 0.0 {
        return a;
    }
    [lerp(a[0], b[0], t), lerp(a[1], b[1], t), lerp(a[2], b[2], t)]
}

pub(crate) fn normalize_or_zero(v: Vec3) -> Vec3 {
    let len = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
    if len <= f32::EPSILON || !len.is_finite() {
        return v;
    }
    [v[0] / len, v[1] / len, v[2] / len]
}

/// Decode a packed tangent-space normal color: `normalize(2 * rgb - 1)`.
pub fn decode_tangent_normal(color: Rgba) -> Vec3 {
    normalize_or_zero([
        color[0] * 2.0 - 1.0,
        color[1] * 2.0 - 1.0,
        color[2] * 2.0 - 1.0,
    ])
}

/// Flip the green channel of a packed normal color (`g -> 1 - g`).
pub fn invert_green(color: Rgba) -> Rgba {
    [color[0], 1.0 - color[1], color[2], color[3]]
}

/// Rec.709 luminance, used when a color feeds a scalar socket.
pub(crate) fn luminance(c: Rgba) -> f32 {
    0.2126 * c[0] + 0.7152 * c[1] + 0.0722 * c[2]
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
