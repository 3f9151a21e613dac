use proptest::prelude::*;
use strata_world::{Interpolation, NoiseConfig, NoiseField, Primitive};

fn coord() -> impl Strategy<Value = f64> {
    -1.0e6f64..1.0e6
}

fn seed() -> impl Strategy<Value = i32> {
    -10_000i32..=10_000
}

fn interpolation() -> impl Strategy<Value = Interpolation> {
    prop_oneof![
        Just(Interpolation::Linear),
        Just(Interpolation::Smoothstep),
        Just(Interpolation::Quintic),
    ]
}

proptest! {
    // Independent fields with the same seed agree bit for bit, in any call order
    #[test]
    fn height_is_deterministic(s in seed(), pts in proptest::collection::vec((coord(), coord()), 1..16)) {
        let a = NoiseField::new(s);
        let b = NoiseField::new(s);
        let forward: Vec<u64> = pts.iter().map(|&(x, z)| a.height(x, z).to_bits()).collect();
        let mut backward: Vec<u64> = pts.iter().rev().map(|&(x, z)| b.height(x, z).to_bits()).collect();
        backward.reverse();
        prop_assert_eq!(&forward, &backward);
        let again: Vec<u64> = pts.iter().map(|&(x, z)| a.height(x, z).to_bits()).collect();
        prop_assert_eq!(forward, again);
    }

    // Small steps never produce jumps, whatever the interpolation curve
    #[test]
    fn height_is_lipschitz(s in seed(), x in -5_000.0f64..5_000.0, z in -5_000.0f64..5_000.0, interp in interpolation()) {
        let cfg = NoiseConfig { interpolation: interp, ..NoiseConfig::default() };
        let field = NoiseField::from_config(s, &cfg).unwrap();
        let eps = 1e-3;
        let h = field.height(x, z);
        prop_assert!((field.height(x + eps, z) - h).abs() <= 16.0 * eps);
        prop_assert!((field.height(x, z + eps) - h).abs() <= 16.0 * eps);
    }

    #[test]
    fn normal_is_unit_and_up(s in seed(), x in coord(), z in coord()) {
        let n = NoiseField::new(s).normal(x, z);
        prop_assert!((n.length() - 1.0).abs() < 1e-9);
        prop_assert!(n.y > 0.0);
    }

    #[test]
    fn library_primitive_is_deterministic(s in seed(), x in -1.0e4f64..1.0e4, z in -1.0e4f64..1.0e4) {
        let cfg = NoiseConfig { primitive: Primitive::OpenSimplex2, ..NoiseConfig::default() };
        let a = NoiseField::from_config(s, &cfg).unwrap();
        let b = NoiseField::from_config(s, &cfg).unwrap();
        prop_assert_eq!(a.height(x, z).to_bits(), b.height(x, z).to_bits());
    }
}
