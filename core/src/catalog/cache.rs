use crate::catalog::identity::positional_id;
use crate::catalog::known::ObjectCatalog;
use crate::catalog::object::{ObjectKind, Origin, TrackedObject};
use crate::geometry::{CoordinateTransform, Vector3};
use crate::prelude::ObjectId;
use crate::stream::message::StreamFrame;
use crate::telemetry::log::LogManager;
use std::collections::HashMap;

/// Result of a single upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpsertOutcome {
    pub created: bool,
    /// The altitude came from the magnitude fallback.
    pub degenerate: bool,
}

/// Per-frame reconciliation tally.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileSummary {
    pub created: usize,
    pub updated: usize,
    pub degenerate: usize,
}

/// Identity-keyed store of tracked objects for one live session.
///
/// Iteration follows first-sighting order. Entries are never removed individually;
/// [`ObjectCache::clear`] is the only bulk destroy.
pub struct ObjectCache {
    objects: Vec<TrackedObject>,
    slots: HashMap<ObjectId, usize>,
    transform: CoordinateTransform,
    logger: LogManager,
}

impl ObjectCache {
    pub fn new(transform: CoordinateTransform) -> Self {
        Self {
            objects: Vec::new(),
            slots: HashMap::new(),
            transform,
            logger: LogManager::new("cache"),
        }
    }

    /// Creates or updates one object. `kind` and `origin` are only read when `id` is
    /// first seen; later values are ignored. New objects start hidden.
    pub fn upsert(
        &mut self,
        id: ObjectId,
        kind: ObjectKind,
        origin: Origin,
        position_km: Vector3,
        velocity_km_s: Option<Vector3>,
    ) -> UpsertOutcome {
        let display = self.transform.to_display(position_km);
        let created = match self.slots.get(&id) {
            Some(&slot) => {
                self.objects[slot].relocate(display.position, display.altitude_km, velocity_km_s);
                false
            }
            None => {
                let mut object = TrackedObject::new(id, kind, origin);
                object.relocate(display.position, display.altitude_km, velocity_km_s);
                self.slots.insert(id, self.objects.len());
                self.objects.push(object);
                true
            }
        };

        UpsertOutcome {
            created,
            degenerate: display.degenerate,
        }
    }

    /// Reconciles every sample of `frame`, classifying first sightings via `catalog`.
    pub fn apply_frame(
        &mut self,
        frame: &StreamFrame,
        catalog: &ObjectCatalog,
    ) -> ReconcileSummary {
        if frame.object_count != frame.objects.len() {
            self.logger.trace(&format!(
                "frame announces {} objects but carries {}",
                frame.object_count,
                frame.objects.len()
            ));
        }

        let mut summary = ReconcileSummary::default();
        for (index, sample) in frame.objects.iter().enumerate() {
            let id = positional_id(index);
            let (kind, origin) = catalog.classify(id);
            let outcome = self.upsert(id, kind, origin, sample.position_km, sample.velocity_km_s);
            if outcome.created {
                summary.created += 1;
            } else {
                summary.updated += 1;
            }
            if outcome.degenerate {
                summary.degenerate += 1;
            }
        }

        if summary.degenerate > 0 {
            self.logger.diagnostic(&format!(
                "{} samples had no geodetic projection; used magnitude altitude",
                summary.degenerate
            ));
        }
        summary
    }

    pub fn clear(&mut self) {
        self.objects.clear();
        self.slots.clear();
    }

    pub fn get(&self, id: ObjectId) -> Option<&TrackedObject> {
        self.slots.get(&id).map(|&slot| &self.objects[slot])
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrackedObject> {
        self.objects.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut TrackedObject> {
        self.objects.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn transform(&self) -> CoordinateTransform {
        self.transform
    }
}

impl Default for ObjectCache {
    fn default() -> Self {
        Self::new(CoordinateTransform::default())
    }
}
