use crate::prelude::TransportError;
use crate::session::params::SessionParameters;

/// Opens live streams. Implemented by the collaborator that owns the network client.
#[allow(async_fn_in_trait)]
pub trait Transport {
    type Source: ChunkSource + 'static;

    /// Performs the handshake. A non-success response is a [`TransportError`].
    async fn open(&self, params: &SessionParameters) -> Result<Self::Source, TransportError>;
}

/// An open, readable stream body.
#[allow(async_fn_in_trait)]
pub trait ChunkSource {
    /// Next chunk of raw bytes at whatever boundary the network produced, or `None`
    /// once the stream ended.
    async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, TransportError>;
}
