use log::{error, info};
use orbitcore::catalog::{AltitudeBin, ObjectCache, VisibilityCounts};
use orbitcore::prelude::TransportError;
use orbitcore::session::{FrameUpdate, SessionObserver, SessionState};
use orbitcore::stream::StatusMessage;

/// Console stand-in for the rendering and UI collaborators.
#[derive(Debug, Default)]
pub struct ConsoleObserver {
    frames: usize,
    /// Print the per-bin breakdown every this many frames; 0 disables it.
    pub legend_every: usize,
}

impl ConsoleObserver {
    pub fn new(legend_every: usize) -> Self {
        Self {
            frames: 0,
            legend_every,
        }
    }
}

impl SessionObserver for ConsoleObserver {
    fn state_changed(&mut self, from: SessionState, to: SessionState) {
        info!("session {} -> {}", from, to);
    }

    fn historical_suspended(&mut self) {
        self.frames = 0;
        println!("[LIVE] historical view suspended");
    }

    fn historical_resumed(&mut self) {
        println!("[LIVE] back to historical view after {} frames", self.frames);
    }

    fn status(&mut self, message: &StatusMessage) {
        println!("[FEED] {}", message.status);
    }

    fn frame_applied(&mut self, update: &FrameUpdate<'_>) {
        self.frames += 1;
        println!(
            "[LIVE] {} frame {}: objects {} | collisions total {} step {} | visible {}/{}",
            update.tag,
            self.frames,
            update.counters.object_count,
            update.counters.total_num_collisions,
            update.counters.step_num_collision,
            update.visibility.visible,
            update.visibility.eligible
        );
        if self.legend_every > 0 && self.frames % self.legend_every == 0 {
            println!("{}", legend(update.objects));
        }
    }

    fn visibility_changed(&mut self, counts: VisibilityCounts, objects: &ObjectCache) {
        println!("[FILTER] visible {}/{}", counts.visible, counts.eligible);
        println!("{}", legend(objects));
    }

    fn transport_failed(&mut self, error: &TransportError) {
        error!("live transport failed: {}", error);
        eprintln!("[LIVE] transport failure: {}", error);
    }
}

/// Visible objects per altitude bin with the bin's display color.
pub fn legend(objects: &ObjectCache) -> String {
    let mut counts = [0usize; AltitudeBin::ALL.len()];
    for object in objects.iter().filter(|object| object.is_visible()) {
        if let Some(slot) = AltitudeBin::ALL
            .iter()
            .position(|&bin| bin == object.altitude_bin())
        {
            counts[slot] += 1;
        }
    }

    AltitudeBin::ALL
        .iter()
        .zip(counts)
        .map(|(bin, count)| format!("  {:>9} {} {}", bin.label(), bin.color().to_hex(), count))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use orbitcore::catalog::{FilterCriteria, ObjectKind, Origin, VisibilityFilterEngine};
    use orbitcore::geometry::Vector3;
    use orbitcore::ObjectId;

    #[test]
    fn legend_counts_only_visible_objects() {
        let mut cache = ObjectCache::default();
        for (idx, radius) in [7000.0, 7050.0, 6500.0, 9000.0].into_iter().enumerate() {
            cache.upsert(
                ObjectId(idx),
                ObjectKind::Junk,
                Origin::Other,
                Vector3::new(radius, 0.0, 0.0),
                None,
            );
        }
        VisibilityFilterEngine::new().recompute(&mut cache, &FilterCriteria::accept_all(), 3);

        let text = legend(&cache);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 6);
        assert!(lines[0].trim_end().ends_with(" 1"));
        assert!(lines[2].trim_end().ends_with(" 2"));
        assert!(lines[5].trim_end().ends_with(" 0"));
    }
}
