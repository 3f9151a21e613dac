use proptest::num::f64::NORMAL;
use proptest::prelude::*;
use proptest::strategy::Strategy;
use strata_geom::Vec3;

fn approx_abs_rel(a: f64, b: f64, atol: f64, rtol: f64) -> bool {
    let diff = (a - b).abs();
    let scale = a.abs().max(b.abs());
    diff <= atol + rtol * scale
}

fn vapprox_abs_rel(a: Vec3, b: Vec3, atol: f64, rtol: f64) -> bool {
    approx_abs_rel(a.x, b.x, atol, rtol)
        && approx_abs_rel(a.y, b.y, atol, rtol)
        && approx_abs_rel(a.z, b.z, atol, rtol)
}

fn bounded_f64() -> impl Strategy<Value = f64> {
    NORMAL.prop_filter("bounded", |v| v.is_finite() && v.abs() <= 1e6)
}

fn bounded_nonzero_f64() -> impl Strategy<Value = f64> {
    NORMAL.prop_filter("bounded_nonzero", |v| {
        let a = v.abs();
        v.is_finite() && (1e-6..=1e6).contains(&a)
    })
}

fn arb_vec3() -> impl Strategy<Value = Vec3> {
    (bounded_f64(), bounded_f64(), bounded_f64()).prop_map(|(x, y, z)| Vec3::new(x, y, z))
}

fn arb_nondegenerate_vec3() -> impl Strategy<Value = Vec3> {
    (
        bounded_nonzero_f64(),
        bounded_nonzero_f64(),
        bounded_nonzero_f64(),
    )
        .prop_map(|(x, y, z)| Vec3::new(x, y, z))
}

proptest! {
    // Distributive property of dot over addition: (a + b)·c = a·c + b·c
    #[test]
    fn vec3_dot_distributive(a in arb_vec3(), b in arb_vec3(), c in arb_vec3()) {
        let left = (a + b).dot(c);
        let right = a.dot(c) + b.dot(c);
        let scale = (a.length() + b.length()) * c.length();
        prop_assert!((left - right).abs() <= 1e-9 + 1e-12 * scale);
    }

    // Cross orthogonality relative to the magnitudes involved
    #[test]
    fn vec3_cross_orthogonal(a in arb_nondegenerate_vec3(), b in arb_nondegenerate_vec3()) {
        let c = a.cross(b);
        let ab = a.length() * b.length();
        prop_assert!(a.dot(c).abs() <= 1e-9 + 1e-12 * a.length() * ab);
        prop_assert!(b.dot(c).abs() <= 1e-9 + 1e-12 * b.length() * ab);
    }

    #[test]
    fn vec3_normalized_length(v in arb_nondegenerate_vec3()) {
        prop_assert!(approx_abs_rel(v.normalized().length(), 1.0, 1e-12, 1e-12));
    }

    // Scalar roundtrip: (a * k) / k == a for k != 0
    #[test]
    fn vec3_scalar_roundtrip(a in arb_vec3(), k in bounded_nonzero_f64()) {
        let r = (a * k) / k;
        prop_assert!(vapprox_abs_rel(r, a, 1e-12, 1e-12));
    }

    // Triangle inequality: |a + b| <= |a| + |b|
    #[test]
    fn vec3_triangle_inequality(a in arb_vec3(), b in arb_vec3()) {
        let lhs = (a + b).length();
        let rhs = a.length() + b.length();
        prop_assert!(lhs <= rhs + 1e-9 * rhs.max(1.0));
    }

    // Planar distance matches the XZ part of a full 3D difference
    #[test]
    fn planar_distance_matches_flattened(a in arb_vec3(), x in bounded_f64(), z in bounded_f64()) {
        let flat = Vec3::new(a.x - x, 0.0, a.z - z);
        prop_assert!(approx_abs_rel(a.planar_distance_sq(x, z), flat.dot(flat), 1e-9, 1e-12));
    }
}
