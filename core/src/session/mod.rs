pub mod controller;
pub mod driver;
pub mod observer;
pub mod params;
pub mod transport;

pub use controller::{
    ChunkOutcome, SessionConfig, SessionContext, SessionState, StopReason, StreamSessionController,
};
pub use driver::{SessionCommand, SessionDriver};
pub use observer::{FrameUpdate, SessionObserver};
pub use params::SessionParameters;
pub use transport::{ChunkSource, Transport};
