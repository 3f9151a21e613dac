use strata_geom::Vec3;
use strata_world::NoiseField;

/// Scripted route for the observer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum PathKind {
    /// Straight along +x.
    Line,
    /// Wide circle around the origin.
    Circle,
    /// Walks, then jumps far away every few hundred ticks.
    Teleport,
}

const FOOT_OFFSET: f64 = 0.5;
const CIRCLE_RADIUS: f64 = 1_500.0;
const TELEPORT_EVERY: u64 = 240;
const TELEPORT_DISTANCE: f64 = 10_000.0;

#[derive(Debug)]
pub struct Walker {
    pub pos: Vec3, // x,z planar, y at the feet
    pub speed: f64,
    pub path: PathKind,
    /// Surface normal under the feet after the last `settle`.
    pub ground_normal: Vec3,
    traveled: f64,
}

impl Walker {
    pub fn new(spawn_x: f64, spawn_z: f64, speed: f64, path: PathKind) -> Self {
        Self {
            pos: Vec3::new(spawn_x, 0.0, spawn_z),
            speed,
            path,
            ground_normal: Vec3::UP,
            traveled: 0.0,
        }
    }

    /// Moves one tick along the path. Returns true on a teleport.
    pub fn advance(&mut self, tick: u64, dt: f64) -> bool {
        let step = self.speed * dt;
        self.traveled += step;
        match self.path {
            PathKind::Line => {
                self.pos.x += step;
                false
            }
            PathKind::Circle => {
                let theta = self.traveled / CIRCLE_RADIUS;
                self.pos.x = CIRCLE_RADIUS * theta.cos() - CIRCLE_RADIUS;
                self.pos.z = CIRCLE_RADIUS * theta.sin();
                false
            }
            PathKind::Teleport => {
                if tick > 0 && tick % TELEPORT_EVERY == 0 {
                    let hop = tick / TELEPORT_EVERY;
                    self.pos.x += TELEPORT_DISTANCE;
                    if hop % 2 == 0 {
                        self.pos.z += TELEPORT_DISTANCE;
                    } else {
                        self.pos.z -= TELEPORT_DISTANCE;
                    }
                    true
                } else {
                    self.pos.z += step;
                    false
                }
            }
        }
    }

    /// Puts the feet on the terrain.
    pub fn settle(&mut self, field: &NoiseField) {
        self.pos.y = field.height(self.pos.x, self.pos.z) + FOOT_OFFSET;
        self.ground_normal = field.normal(self.pos.x, self.pos.z);
    }

    /// Slope under the feet in degrees from horizontal.
    pub fn slope_degrees(&self) -> f64 {
        self.ground_normal.y.clamp(-1.0, 1.0).acos().to_degrees()
    }

    /// Height of a chase camera `behind` units back, eased toward the ground
    /// it hovers over.
    pub fn chase_camera_height(&self, field: &NoiseField, behind: f64) -> f64 {
        let (dx, dz) = self.heading();
        let cam_ground = field.height(self.pos.x - dx * behind, self.pos.z - dz * behind);
        self.pos.y + 2.0 + 0.75 * (cam_ground - self.pos.y)
    }

    fn heading(&self) -> (f64, f64) {
        match self.path {
            PathKind::Line => (1.0, 0.0),
            PathKind::Circle => {
                let theta = self.traveled / CIRCLE_RADIUS;
                (-theta.sin(), theta.cos())
            }
            PathKind::Teleport => (0.0, 1.0),
        }
    }
}
