/// Non-negative `(dx, dz)` steps of the admission scan, in visiting order.
///
/// Steps advance by `chunk_size` while below `load_radius` on each axis; a
/// column stops at the first step whose squared reach exceeds the squared
/// radius. Callers visit the four sign reflections of every step.
pub(crate) fn admission_steps(chunk_size: f64, load_radius: f64) -> Vec<(f64, f64)> {
    let r_sq = load_radius * load_radius;
    let mut steps = Vec::new();
    let mut ix = 0u32;
    loop {
        let dx = f64::from(ix) * chunk_size;
        if dx >= load_radius {
            break;
        }
        let mut iz = 0u32;
        loop {
            let dz = f64::from(iz) * chunk_size;
            if dz >= load_radius || dx * dx + dz * dz > r_sq {
                break;
            }
            steps.push((dx, dz));
            iz += 1;
        }
        ix += 1;
    }
    steps
}

#[inline]
pub(crate) fn reflections(x: f64, z: f64, dx: f64, dz: f64) -> [(f64, f64); 4] {
    [
        (x + dx, z + dz),
        (x + dx, z - dz),
        (x - dx, z + dz),
        (x - dx, z - dz),
    ]
}

/// Longest step the scan takes from the observer.
pub(crate) fn max_reach(steps: &[(f64, f64)]) -> f64 {
    steps
        .iter()
        .map(|&(dx, dz)| (dx * dx + dz * dz).sqrt())
        .fold(0.0, f64::max)
}
