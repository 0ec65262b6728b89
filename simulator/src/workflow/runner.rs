use crate::generator::collisions::count_close_pairs;
use crate::generator::population::Population;
use crate::workflow::config::FeedConfig;
use log::error;
use orbitcore::catalog::CatalogEntry;
use orbitcore::session::SessionParameters;
use orbitcore::stream::{StatusMessage, StreamFrame};
use serde::Serialize;
use std::sync::Arc;

pub const STARTED_STATUS: &str = "simulation started";
pub const COMPLETE_STATUS: &str = "simulation complete";

/// Produces feed runs over a fixed synthetic population.
#[derive(Clone)]
pub struct Runner {
    population: Arc<Population>,
}

impl Runner {
    pub fn new(config: &FeedConfig) -> Self {
        Self {
            population: Arc::new(Population::generate(config)),
        }
    }

    pub fn catalog(&self) -> Vec<CatalogEntry> {
        self.population.catalog()
    }

    pub fn object_count(&self) -> usize {
        self.population.len()
    }

    /// One session's worth of NDJSON lines: a start status, a frame per step, and a
    /// completion status.
    pub fn run(&self, params: SessionParameters) -> FeedRun {
        FeedRun {
            population: Arc::clone(&self.population),
            params,
            next_step: 0,
            total_collisions: 0,
            finished: false,
        }
    }
}

pub struct FeedRun {
    population: Arc<Population>,
    params: SessionParameters,
    next_step: u32,
    total_collisions: u64,
    finished: bool,
}

impl FeedRun {
    fn frame(&mut self, step: u32) -> StreamFrame {
        let t_secs = f64::from(step) * f64::from(self.params.step_secs());
        let objects = self.population.samples_at(t_secs);
        let step_collisions =
            count_close_pairs(&objects, f64::from(self.params.collision_threshold()));
        self.total_collisions += step_collisions;

        StreamFrame {
            object_count: objects.len(),
            objects,
            total_num_collisions: self.total_collisions,
            step_num_collision: step_collisions,
        }
    }
}

fn to_line<T: Serialize>(message: &T) -> Option<String> {
    match serde_json::to_string(message) {
        Ok(mut line) => {
            line.push('\n');
            Some(line)
        }
        Err(err) => {
            error!("failed to encode feed message: {}", err);
            None
        }
    }
}

impl Iterator for FeedRun {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let step = self.next_step;
        self.next_step += 1;
        if step == 0 {
            return to_line(&StatusMessage {
                status: STARTED_STATUS.into(),
            });
        }
        if step > self.params.step_count() {
            self.finished = true;
            return to_line(&StatusMessage {
                status: COMPLETE_STATUS.into(),
            });
        }

        let frame = self.frame(step);
        let line = to_line(&frame);
        if line.is_none() {
            self.finished = true;
        }
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orbitcore::stream::{FrameLineDecoder, MessageClassifier, StreamMessage};

    #[test]
    fn run_emits_status_frames_status() {
        let runner = Runner::new(&FeedConfig::from_args(10, 4, 0));
        let params = SessionParameters::new(0, 100, 30).unwrap();
        let lines: Vec<String> = runner.run(params).collect();
        assert_eq!(lines.len(), 1 + 3 + 1);
        assert!(lines.iter().all(|line| line.ends_with('\n')));

        let mut decoder = FrameLineDecoder::new();
        let classifier = MessageClassifier::new();
        let messages: Vec<StreamMessage> = decoder
            .push(lines.concat().as_bytes())
            .map(|line| classifier.classify(&line).unwrap())
            .collect();

        assert!(matches!(&messages[0], StreamMessage::Status(s) if s.status == STARTED_STATUS));
        assert!(matches!(&messages[4], StreamMessage::Status(s) if s.status == COMPLETE_STATUS));
        for message in &messages[1..4] {
            let StreamMessage::Frame(frame) = message else {
                panic!("expected frame, got {message:?}");
            };
            assert_eq!(frame.objects.len(), 10);
            assert_eq!(frame.object_count, 10);
            assert_eq!(frame.step_num_collision, 0);
        }
    }

    #[test]
    fn total_collisions_accumulate() {
        let runner = Runner::new(&FeedConfig::from_args(300, 8, 0));
        let params = SessionParameters::new(20_000, 3, 1).unwrap();
        let mut run = runner.run(params);
        run.next();
        let frames: Vec<StreamFrame> = (0..3).map(|step| run.frame(step + 1)).collect();
        let mut expected = 0;
        for frame in &frames {
            expected += frame.step_num_collision;
        }
        assert!(expected > 0);
        assert_eq!(frames[2].total_num_collisions, expected);
    }
}
