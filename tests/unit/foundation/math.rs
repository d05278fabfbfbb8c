use super::*;

#[test]
fn lerp_endpoints() {
    assert_eq!(lerp(0.25, 0.75, 0.0), 0.25);
    assert!((lerp(0.25, 0.75, 1.0) - 0.75).abs() < 1e-6);
    assert!((lerp(0.0, 1.0, 0.5) - 0.5).abs() < 1e-6);
}

#[test]
fn zero_factor_ignores_non_finite_target() {
    assert_eq!(lerp(0.3, f32::NAN, 0.0), 0.3);
    assert_eq!(lerp(0.3, f32::INFINITY, 0.0), 0.3);
    let a = [-0.0, 0.5, 1.0];
    let out = lerp_vec3(a, [1.0, f32::NAN, -3.0], 0.0);
    assert_eq!(out[0].to_bits(), (-0.0f32).to_bits());
    assert_eq!(out[1], 0.5);
}

#[test]
fn flat_normal_decodes_to_plus_z() {
    let n = decode_tangent_normal([0.5, 0.5, 1.0, 1.0]);
    assert_eq!(n, [0.0, 0.0, 1.0]);
}

#[test]
fn green_inversion_flips_tangent_y_only() {
    let c = [0.7, 0.8, 0.9, 1.0];
    let a = decode_tangent_normal(c);
    let b = decode_tangent_normal(invert_green(c));
    assert!((a[0] - b[0]).abs() < 1e-6);
    assert!((a[1] + b[1]).abs() < 1e-6);
    assert!((a[2] - b[2]).abs() < 1e-6);
}

#[test]
fn zero_vector_is_not_normalized() {
    assert_eq!(normalize_or_zero([0.0, 0.0, 0.0]), [0.0, 0.0, 0.0]);
}

#[test]
fn luminance_of_white_is_one() {
    assert!((luminance([1.0, 1.0, 1.0, 1.0]) - 1.0).abs() < 1e-6);
}
