use serde::{Deserialize, Serialize};

/// Integer identity of a square terrain tile.
///
/// The tile `(cx, cz)` is centred on world position `(cx * size, cz * size)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoord {
    pub cx: i32,
    pub cz: i32,
}

impl TileCoord {
    #[inline]
    pub const fn new(cx: i32, cz: i32) -> Self {
        Self { cx, cz }
    }

    /// Tile whose centre is the nearest multiple of `size` to `(x, z)`.
    ///
    /// Ties round toward positive infinity. Non-finite input saturates
    /// (NaN maps to 0), so any `f64` yields some coordinate.
    #[inline]
    pub fn containing(x: f64, z: f64, size: f64) -> Self {
        Self {
            cx: round_half_up(x / size) as i32,
            cz: round_half_up(z / size) as i32,
        }
    }

    /// World-space centre of the tile.
    #[inline]
    pub fn origin(self, size: f64) -> (f64, f64) {
        (f64::from(self.cx) * size, f64::from(self.cz) * size)
    }

    #[inline]
    pub fn offset(self, dx: i32, dz: i32) -> Self {
        Self {
            cx: self.cx.saturating_add(dx),
            cz: self.cz.saturating_add(dz),
        }
    }

    #[inline]
    pub fn distance_sq(self, other: TileCoord) -> i64 {
        let dx = i64::from(self.cx) - i64::from(other.cx);
        let dz = i64::from(self.cz) - i64::from(other.cz);
        dx * dx + dz * dz
    }
}

#[inline]
fn round_half_up(v: f64) -> f64 {
    (v + 0.5).floor()
}

impl From<(i32, i32)> for TileCoord {
    fn from(value: (i32, i32)) -> Self {
        Self::new(value.0, value.1)
    }
}

impl From<TileCoord> for (i32, i32) {
    fn from(value: TileCoord) -> Self {
        (value.cx, value.cz)
    }
}
