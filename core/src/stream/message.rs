use crate::geometry::Vector3;
use crate::prelude::MessageError;
use crate::telemetry::log::LogManager;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Informational message from the feed. Never mutates the cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusMessage {
    pub status: String,
}

/// One simulation tick: a sample for every live-tracked object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamFrame {
    pub objects: Vec<ObjectSample>,
    #[serde(default)]
    pub object_count: usize,
    #[serde(default)]
    pub total_num_collisions: u64,
    #[serde(default)]
    pub step_num_collision: u64,
}

impl StreamFrame {
    pub fn counters(&self) -> FrameCounters {
        FrameCounters {
            object_count: self.object_count,
            total_num_collisions: self.total_num_collisions,
            step_num_collision: self.step_num_collision,
        }
    }
}

/// Per-frame counters forwarded untouched to collaborators.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FrameCounters {
    pub object_count: usize,
    pub total_num_collisions: u64,
    pub step_num_collision: u64,
}

/// `[[x, y, z], [vx, vy, vz]]` on the wire; the velocity half is optional.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vector3>", into = "Vec<Vector3>")]
pub struct ObjectSample {
    pub position_km: Vector3,
    pub velocity_km_s: Option<Vector3>,
}

impl ObjectSample {
    pub fn new(position_km: Vector3, velocity_km_s: Option<Vector3>) -> Self {
        Self {
            position_km,
            velocity_km_s,
        }
    }
}

impl TryFrom<Vec<Vector3>> for ObjectSample {
    type Error = String;

    fn try_from(value: Vec<Vector3>) -> Result<Self, Self::Error> {
        match value.as_slice() {
            [position] => Ok(Self::new(*position, None)),
            [position, velocity] => Ok(Self::new(*position, Some(*velocity))),
            other => Err(format!(
                "object sample must hold 1 or 2 vectors, found {}",
                other.len()
            )),
        }
    }
}

impl From<ObjectSample> for Vec<Vector3> {
    fn from(sample: ObjectSample) -> Self {
        match sample.velocity_km_s {
            Some(velocity) => vec![sample.position_km, velocity],
            None => vec![sample.position_km],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StreamMessage {
    Status(StatusMessage),
    Frame(StreamFrame),
}

/// Turns decoded lines into typed messages.
#[derive(Debug, Clone, Copy)]
pub struct MessageClassifier {
    logger: LogManager,
}

impl MessageClassifier {
    pub fn new() -> Self {
        Self {
            logger: LogManager::new("classifier"),
        }
    }

    /// Parses and classifies a line. A `status` field wins over an `objects` field.
    pub fn classify(&self, line: &str) -> Result<StreamMessage, MessageError> {
        let value: Value = serde_json::from_str(line)?;
        let Value::Object(fields) = &value else {
            return Err(MessageError::UnrecognizedShape(
                "top level is not an object".into(),
            ));
        };

        if let Some(Value::String(status)) = fields.get("status") {
            return Ok(StreamMessage::Status(StatusMessage {
                status: status.clone(),
            }));
        }

        if fields.contains_key("objects") {
            return serde_json::from_value(value)
                .map(StreamMessage::Frame)
                .map_err(|err| MessageError::InvalidFrame(err.to_string()));
        }

        let keys = fields.keys().cloned().collect::<Vec<_>>().join(", ");
        Err(MessageError::UnrecognizedShape(keys))
    }

    /// Like [`classify`](Self::classify), but logs and swallows failures so a bad line
    /// never ends the stream.
    pub fn accept(&self, line: &str) -> Option<StreamMessage> {
        match self.classify(line) {
            Ok(message) => Some(message),
            Err(err) => {
                self.logger
                    .diagnostic(&format!("skipping line ({}): {}", err, preview(line)));
                None
            }
        }
    }
}

impl Default for MessageClassifier {
    fn default() -> Self {
        Self::new()
    }
}

fn preview(line: &str) -> &str {
    match line.char_indices().nth(80) {
        Some((idx, _)) => &line[..idx],
        None => line,
    }
}
