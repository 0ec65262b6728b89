use crate::prelude::ParameterError;
use serde::{Deserialize, Serialize};

/// Parameters the transport collaborator sends when opening a live stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawParameters")]
pub struct SessionParameters {
    collision_threshold: u32,
    length_secs: u32,
    step_secs: u32,
}

#[derive(Deserialize)]
struct RawParameters {
    collision_threshold: u32,
    length_secs: u32,
    step_secs: u32,
}

impl TryFrom<RawParameters> for SessionParameters {
    type Error = ParameterError;

    fn try_from(raw: RawParameters) -> Result<Self, Self::Error> {
        Self::new(raw.collision_threshold, raw.length_secs, raw.step_secs)
    }
}

impl SessionParameters {
    pub fn new(
        collision_threshold: u32,
        length_secs: u32,
        step_secs: u32,
    ) -> Result<Self, ParameterError> {
        if length_secs < 1 {
            return Err(ParameterError::LengthTooShort);
        }
        if step_secs < 1 {
            return Err(ParameterError::StepTooShort);
        }
        if step_secs > length_secs {
            return Err(ParameterError::StepExceedsLength {
                step: step_secs,
                length: length_secs,
            });
        }
        Ok(Self {
            collision_threshold,
            length_secs,
            step_secs,
        })
    }

    pub fn collision_threshold(&self) -> u32 {
        self.collision_threshold
    }

    pub fn length_secs(&self) -> u32 {
        self.length_secs
    }

    pub fn step_secs(&self) -> u32 {
        self.step_secs
    }

    /// Number of frames a complete session produces.
    pub fn step_count(&self) -> u32 {
        self.length_secs / self.step_secs
    }

    /// Query-string pairs understood by the feed endpoint.
    pub fn query_pairs(&self) -> [(&'static str, String); 3] {
        [
            ("collision_threshold", self.collision_threshold.to_string()),
            ("length", self.length_secs.to_string()),
            ("step", self.step_secs.to_string()),
        ]
    }
}

impl Default for SessionParameters {
    fn default() -> Self {
        Self {
            collision_threshold: 1,
            length_secs: 3_600,
            step_secs: 60,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validates_bounds() {
        assert!(SessionParameters::new(0, 1, 1).is_ok());
        assert_eq!(
            SessionParameters::new(0, 0, 1),
            Err(ParameterError::LengthTooShort)
        );
        assert_eq!(
            SessionParameters::new(0, 10, 0),
            Err(ParameterError::StepTooShort)
        );
        assert_eq!(
            SessionParameters::new(3, 10, 11),
            Err(ParameterError::StepExceedsLength { step: 11, length: 10 })
        );
    }

    #[test]
    fn step_count_and_query() {
        let params = SessionParameters::new(2, 100, 30).unwrap();
        assert_eq!(params.step_count(), 3);
        let query = params.query_pairs();
        assert_eq!(query[0], ("collision_threshold", "2".to_string()));
        assert_eq!(query[2], ("step", "30".to_string()));
    }

    #[test]
    fn deserialization_validates() {
        let ok: SessionParameters =
            serde_json::from_str(r#"{"collision_threshold":1,"length_secs":60,"step_secs":5}"#)
                .unwrap();
        assert_eq!(ok.step_count(), 12);
        assert!(serde_json::from_str::<SessionParameters>(
            r#"{"collision_threshold":1,"length_secs":5,"step_secs":60}"#
        )
        .is_err());
    }
}
