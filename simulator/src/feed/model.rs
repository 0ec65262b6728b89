use orbitcore::prelude::ParameterError;
use orbitcore::session::SessionParameters;
use serde::{Deserialize, Serialize};

/// Query string of `GET /stream`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamQuery {
    #[serde(default)]
    pub collision_threshold: u32,
    pub length: u32,
    pub step: u32,
}

impl StreamQuery {
    pub fn to_params(&self) -> Result<SessionParameters, ParameterError> {
        SessionParameters::new(self.collision_threshold, self.length, self.step)
    }
}
