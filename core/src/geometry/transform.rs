use super::vector::Vector3;
use serde::{Deserialize, Serialize};

/// WGS84 equatorial radius (km). Also the reference radius for the altitude fallback.
pub const EARTH_RADIUS_KM: f64 = 6_378.137;
/// WGS84 flattening.
pub const WGS84_F: f64 = 1.0 / 298.257_223_563;
/// WGS84 first eccentricity squared.
pub const WGS84_E2: f64 = WGS84_F * (2.0 - WGS84_F);

const MAX_ITERATIONS: usize = 16;
const LATITUDE_TOLERANCE_RAD: f64 = 1e-12;
const MIN_RADIUS_KM: f64 = 1e-6;

/// Length unit of the display space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayUnit {
    Kilometers,
    #[default]
    Meters,
}

impl DisplayUnit {
    pub fn scale_from_km(self) -> f64 {
        match self {
            DisplayUnit::Kilometers => 1.0,
            DisplayUnit::Meters => 1_000.0,
        }
    }
}

/// Display-space position together with the altitude it was derived from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayPosition {
    pub position: Vector3,
    pub altitude_km: f64,
    /// The geodetic projection failed and the altitude came from the vector magnitude.
    pub degenerate: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateTransform {
    unit: DisplayUnit,
}

impl CoordinateTransform {
    pub fn new(unit: DisplayUnit) -> Self {
        Self { unit }
    }

    pub fn unit(&self) -> DisplayUnit {
        self.unit
    }

    /// Converts a kilometer position into display space. Never fails: when the geodetic
    /// solver cannot project the point the altitude is `|position| - EARTH_RADIUS_KM`.
    pub fn to_display(&self, position_km: Vector3) -> DisplayPosition {
        let (altitude_km, degenerate) = match geodetic_altitude_km(position_km) {
            Some(altitude) => (altitude, false),
            None => (position_km.length() - EARTH_RADIUS_KM, true),
        };

        DisplayPosition {
            position: position_km.scale(self.unit.scale_from_km()),
            altitude_km,
            degenerate,
        }
    }
}

impl Default for CoordinateTransform {
    fn default() -> Self {
        Self::new(DisplayUnit::default())
    }
}

/// Height above the WGS84 ellipsoid by fixed-point iteration on geodetic latitude.
///
/// Returns `None` for the origin, non-finite input, or when the iteration does not settle.
pub fn geodetic_altitude_km(position_km: Vector3) -> Option<f64> {
    if !position_km.is_finite() || position_km.length() < MIN_RADIUS_KM {
        return None;
    }

    let p = (position_km.x * position_km.x + position_km.y * position_km.y).sqrt();
    let z = position_km.z;
    let mut lat = z.atan2(p * (1.0 - WGS84_E2));

    for _ in 0..MAX_ITERATIONS {
        let (sin_lat, cos_lat) = lat.sin_cos();
        let root = (1.0 - WGS84_E2 * sin_lat * sin_lat).sqrt();
        let n = EARTH_RADIUS_KM / root;
        let height = p * cos_lat + z * sin_lat - EARTH_RADIUS_KM * root;

        let denominator = n + height;
        if denominator.abs() < MIN_RADIUS_KM {
            return None;
        }
        let next = z.atan2(p * (1.0 - WGS84_E2 * n / denominator));
        if !next.is_finite() {
            return None;
        }
        if (next - lat).abs() < LATITUDE_TOLERANCE_RAD {
            let (sin_lat, cos_lat) = next.sin_cos();
            let root = (1.0 - WGS84_E2 * sin_lat * sin_lat).sqrt();
            let height = p * cos_lat + z * sin_lat - EARTH_RADIUS_KM * root;
            return height.is_finite().then_some(height);
        }
        lat = next;
    }

    None
}
