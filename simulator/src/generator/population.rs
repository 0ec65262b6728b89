use crate::workflow::config::FeedConfig;
use orbitcore::catalog::CatalogEntry;
use orbitcore::geometry::{Vector3, EARTH_RADIUS_KM};
use orbitcore::stream::ObjectSample;
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::f64::consts::TAU;

/// Earth gravitational parameter (km^3/s^2).
const MU_KM3_S2: f64 = 398_600.441_8;

const COUNTRIES: [&str; 10] = ["US", "CIS", "PRC", "JPN", "IND", "FR", "UK", "ESA", "ISRA", "TBD"];
const JUNK_TYPES: [&str; 2] = ["DEBRIS", "ROCKET BODY"];

/// Altitude bands (km) and their relative weights, roughly shaped like the real catalog.
const ALTITUDE_BANDS: [(f64, f64, f64); 6] = [
    (160.0, 200.0, 0.02),
    (200.0, 400.0, 0.08),
    (400.0, 800.0, 0.45),
    (800.0, 1200.0, 0.25),
    (1200.0, 2000.0, 0.12),
    (19_000.0, 36_000.0, 0.08),
];

/// One synthetic object on a circular orbit.
#[derive(Debug, Clone)]
pub struct OrbitSpec {
    pub radius_km: f64,
    pub inclination: f64,
    pub raan: f64,
    pub phase: f64,
    pub object_type: &'static str,
    pub country: &'static str,
}

impl OrbitSpec {
    fn angular_rate(&self) -> f64 {
        (MU_KM3_S2 / self.radius_km.powi(3)).sqrt()
    }

    /// Position and velocity at `t_secs` after epoch.
    pub fn sample(&self, t_secs: f64) -> ObjectSample {
        let rate = self.angular_rate();
        let (sin_a, cos_a) = (self.phase + rate * t_secs).sin_cos();
        let (sin_i, cos_i) = self.inclination.sin_cos();
        let (sin_o, cos_o) = self.raan.sin_cos();

        let rotate = |px: f64, py: f64| {
            let (x1, y1, z1) = (px, py * cos_i, py * sin_i);
            Vector3::new(x1 * cos_o - y1 * sin_o, x1 * sin_o + y1 * cos_o, z1)
        };

        let position = rotate(self.radius_km * cos_a, self.radius_km * sin_a);
        let speed = self.radius_km * rate;
        let velocity = rotate(-speed * sin_a, speed * cos_a);
        ObjectSample::new(position, Some(velocity))
    }
}

#[derive(Debug, Clone)]
pub struct Population {
    objects: Vec<OrbitSpec>,
}

impl Population {
    pub fn generate(config: &FeedConfig) -> Self {
        let mut rng = StdRng::seed_from_u64(config.seed);
        let total_weight: f64 = ALTITUDE_BANDS.iter().map(|band| band.2).sum();

        let objects = (0..config.object_count)
            .map(|_| {
                let mut pick = rng.gen_range(0.0..total_weight);
                let (low, high, _) = ALTITUDE_BANDS
                    .iter()
                    .copied()
                    .find(|&(_, _, weight)| {
                        pick -= weight;
                        pick < 0.0
                    })
                    .unwrap_or(ALTITUDE_BANDS[2]);

                let object_type = if rng.gen_bool(config.junk_fraction) {
                    JUNK_TYPES[rng.gen_range(0..JUNK_TYPES.len())]
                } else {
                    "PAYLOAD"
                };

                OrbitSpec {
                    radius_km: EARTH_RADIUS_KM + rng.gen_range(low..high),
                    inclination: rng.gen_range(0.0..TAU / 2.0),
                    raan: rng.gen_range(0.0..TAU),
                    phase: rng.gen_range(0.0..TAU),
                    object_type,
                    country: COUNTRIES[rng.gen_range(0..COUNTRIES.len())],
                }
            })
            .collect();

        Self { objects }
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Catalog entries keyed by the same positional index the stream uses.
    pub fn catalog(&self) -> Vec<CatalogEntry> {
        self.objects
            .iter()
            .enumerate()
            .map(|(index, orbit)| CatalogEntry {
                index,
                object_type: orbit.object_type.to_string(),
                country: orbit.country.to_string(),
            })
            .collect()
    }

    pub fn samples_at(&self, t_secs: f64) -> Vec<ObjectSample> {
        self.objects.iter().map(|orbit| orbit.sample(t_secs)).collect()
    }
}
