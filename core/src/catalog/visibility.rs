use crate::catalog::cache::ObjectCache;
use crate::catalog::object::{AltitudeBin, ObjectKind, Origin, TrackedObject};
use crate::telemetry::log::LogManager;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Acceptable kinds, origins and altitude bins. An object is eligible only if all three
/// sets contain its value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterCriteria {
    pub kinds: BTreeSet<ObjectKind>,
    pub origins: BTreeSet<Origin>,
    pub altitude_bins: BTreeSet<AltitudeBin>,
}

impl FilterCriteria {
    pub fn accept_all() -> Self {
        Self {
            kinds: ObjectKind::ALL.into_iter().collect(),
            origins: Origin::ALL.into_iter().collect(),
            altitude_bins: AltitudeBin::ALL.into_iter().collect(),
        }
    }

    pub fn accept_none() -> Self {
        Self {
            kinds: BTreeSet::new(),
            origins: BTreeSet::new(),
            altitude_bins: BTreeSet::new(),
        }
    }

    pub fn with_kinds(mut self, kinds: impl IntoIterator<Item = ObjectKind>) -> Self {
        self.kinds = kinds.into_iter().collect();
        self
    }

    pub fn with_origins(mut self, origins: impl IntoIterator<Item = Origin>) -> Self {
        self.origins = origins.into_iter().collect();
        self
    }

    pub fn with_altitude_bins(mut self, bins: impl IntoIterator<Item = AltitudeBin>) -> Self {
        self.altitude_bins = bins.into_iter().collect();
        self
    }

    /// Flips membership of `kind`; returns whether it is now accepted.
    pub fn toggle_kind(&mut self, kind: ObjectKind) -> bool {
        toggle(&mut self.kinds, kind)
    }

    pub fn toggle_origin(&mut self, origin: Origin) -> bool {
        toggle(&mut self.origins, origin)
    }

    pub fn toggle_altitude_bin(&mut self, bin: AltitudeBin) -> bool {
        toggle(&mut self.altitude_bins, bin)
    }

    pub fn accepts(&self, object: &TrackedObject) -> bool {
        self.kinds.contains(&object.kind())
            && self.origins.contains(&object.origin())
            && self.altitude_bins.contains(&object.altitude_bin())
    }
}

impl Default for FilterCriteria {
    fn default() -> Self {
        Self::accept_all()
    }
}

fn toggle<T: Ord>(set: &mut BTreeSet<T>, value: T) -> bool {
    if set.remove(&value) {
        false
    } else {
        set.insert(value);
        true
    }
}

/// Outcome of a recompute, for UI display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct VisibilityCounts {
    pub visible: usize,
    pub eligible: usize,
}

/// Marks a capacity-bounded, order-stable subset of the cache visible.
#[derive(Debug, Clone, Copy)]
pub struct VisibilityFilterEngine {
    logger: LogManager,
}

impl VisibilityFilterEngine {
    pub fn new() -> Self {
        Self {
            logger: LogManager::new("visibility"),
        }
    }

    /// Walks the cache in first-sighting order and shows the first `capacity` eligible
    /// objects, hiding everything else. Only the `visible` flags are written, so
    /// repeated calls with the same inputs select the same subset.
    pub fn recompute(
        &self,
        cache: &mut ObjectCache,
        criteria: &FilterCriteria,
        capacity: usize,
    ) -> VisibilityCounts {
        let mut counts = VisibilityCounts::default();
        for object in cache.iter_mut() {
            let eligible = criteria.accepts(object);
            if eligible {
                counts.eligible += 1;
            }
            object.visible = eligible && counts.visible < capacity;
            if object.visible {
                counts.visible += 1;
            }
        }

        self.logger.trace(&format!(
            "visible {} / eligible {} (capacity {})",
            counts.visible, counts.eligible, capacity
        ));
        counts
    }
}

impl Default for VisibilityFilterEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Vector3;
    use crate::prelude::ObjectId;

    fn populated(specs: &[(ObjectKind, Origin, f64)]) -> ObjectCache {
        let mut cache = ObjectCache::default();
        for (idx, &(kind, origin, radius_km)) in specs.iter().enumerate() {
            cache.upsert(ObjectId(idx), kind, origin, Vector3::new(radius_km, 0.0, 0.0), None);
        }
        cache
    }

    fn visible_ids(cache: &ObjectCache) -> Vec<usize> {
        cache
            .iter()
            .filter(|object| object.is_visible())
            .map(|object| object.id().0)
            .collect()
    }

    #[test]
    fn capacity_cuts_in_insertion_order_and_is_stable() {
        let mut cache = populated(&[(ObjectKind::Junk, Origin::Other, 7000.0); 5]);
        let engine = VisibilityFilterEngine::new();
        let criteria = FilterCriteria::accept_all();

        let counts = engine.recompute(&mut cache, &criteria, 2);
        assert_eq!(counts, VisibilityCounts { visible: 2, eligible: 5 });
        assert_eq!(visible_ids(&cache), vec![0, 1]);

        let again = engine.recompute(&mut cache, &criteria, 2);
        assert_eq!(again, counts);
        assert_eq!(visible_ids(&cache), vec![0, 1]);
    }

    #[test]
    fn criteria_are_a_conjunction() {
        let mut cache = populated(&[
            (ObjectKind::Active, Origin::UnitedStates, 7000.0),
            (ObjectKind::Junk, Origin::UnitedStates, 7000.0),
            (ObjectKind::Active, Origin::China, 7000.0),
            (ObjectKind::Active, Origin::UnitedStates, 9000.0),
        ]);
        let criteria = FilterCriteria::accept_all()
            .with_kinds([ObjectKind::Active])
            .with_origins([Origin::UnitedStates])
            .with_altitude_bins([AltitudeBin::From400To800]);

        let counts = VisibilityFilterEngine::new().recompute(&mut cache, &criteria, 10);
        assert_eq!(counts, VisibilityCounts { visible: 1, eligible: 1 });
        assert_eq!(visible_ids(&cache), vec![0]);
    }

    #[test]
    fn toggling_filters_does_not_reshuffle_selection() {
        let mut cache = populated(&[
            (ObjectKind::Active, Origin::Russia, 7000.0),
            (ObjectKind::Junk, Origin::Russia, 7000.0),
            (ObjectKind::Active, Origin::Russia, 7000.0),
            (ObjectKind::Junk, Origin::Russia, 7000.0),
        ]);
        let engine = VisibilityFilterEngine::new();
        let mut criteria = FilterCriteria::accept_all();

        engine.recompute(&mut cache, &criteria, 2);
        assert_eq!(visible_ids(&cache), vec![0, 1]);

        assert!(!criteria.toggle_kind(ObjectKind::Junk));
        engine.recompute(&mut cache, &criteria, 2);
        assert_eq!(visible_ids(&cache), vec![0, 2]);

        assert!(criteria.toggle_kind(ObjectKind::Junk));
        engine.recompute(&mut cache, &criteria, 2);
        assert_eq!(visible_ids(&cache), vec![0, 1]);
    }

    #[test]
    fn visible_is_min_of_eligible_and_capacity() {
        let specs: Vec<_> = (0..12)
            .map(|i| {
                let kind = if i % 3 == 0 { ObjectKind::Active } else { ObjectKind::Junk };
                (kind, Origin::ALL[i % Origin::ALL.len()], 6600.0 + 150.0 * i as f64)
            })
            .collect();
        let mut cache = populated(&specs);
        let engine = VisibilityFilterEngine::new();
        let criteria_set = [
            FilterCriteria::accept_all(),
            FilterCriteria::accept_none(),
            FilterCriteria::accept_all().with_kinds([ObjectKind::Junk]),
            FilterCriteria::accept_all()
                .with_altitude_bins([AltitudeBin::From400To800, AltitudeBin::Above2000]),
        ];

        for criteria in &criteria_set {
            let mut previous: Option<VisibilityCounts> = None;
            for capacity in (0..=14).rev() {
                let counts = engine.recompute(&mut cache, criteria, capacity);
                assert_eq!(counts.visible, counts.eligible.min(capacity));
                assert_eq!(visible_ids(&cache).len(), counts.visible);
                if let Some(prev) = previous {
                    assert!(counts.visible <= prev.visible);
                    assert_eq!(counts.eligible, prev.eligible);
                }
                previous = Some(counts);
            }
        }
    }

    #[test]
    fn zero_capacity_hides_everything() {
        let mut cache = populated(&[(ObjectKind::Active, Origin::Esa, 7000.0); 3]);
        let counts =
            VisibilityFilterEngine::new().recompute(&mut cache, &FilterCriteria::default(), 0);
        assert_eq!(counts, VisibilityCounts { visible: 0, eligible: 3 });
        assert!(visible_ids(&cache).is_empty());
    }
}
