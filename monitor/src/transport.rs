use anyhow::Context;
use orbitcore::catalog::{CatalogEntry, ObjectCatalog};
use orbitcore::prelude::TransportError;
use orbitcore::session::{ChunkSource, SessionParameters, Transport};
use reqwest::{Client, Response, StatusCode};

/// Opens the live stream as a long-lived chunked HTTP response.
pub struct HttpTransport {
    client: Client,
    endpoint: String,
}

impl HttpTransport {
    pub fn new(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

pub struct HttpSource {
    response: Response,
}

impl Transport for HttpTransport {
    type Source = HttpSource;

    async fn open(&self, params: &SessionParameters) -> Result<HttpSource, TransportError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&params.query_pairs())
            .send()
            .await
            .map_err(|err| TransportError::Connect(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Handshake {
                status: status.as_u16(),
            });
        }
        if status == StatusCode::NO_CONTENT || response.content_length() == Some(0) {
            return Err(TransportError::MissingBody);
        }
        Ok(HttpSource { response })
    }
}

impl ChunkSource for HttpSource {
    async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
        self.response
            .chunk()
            .await
            .map(|chunk| chunk.map(|bytes| bytes.to_vec()))
            .map_err(|err| TransportError::Read(err.to_string()))
    }
}

/// Loads the previously known object set from a file or an http(s) URL.
pub async fn load_catalog(client: &Client, source: &str) -> anyhow::Result<ObjectCatalog> {
    if source.starts_with("http://") || source.starts_with("https://") {
        let entries = client
            .get(source)
            .send()
            .await
            .with_context(|| format!("requesting catalog {}", source))?
            .error_for_status()
            .with_context(|| format!("catalog request to {} rejected", source))?
            .json::<Vec<CatalogEntry>>()
            .await
            .with_context(|| format!("decoding catalog from {}", source))?;
        ObjectCatalog::from_entries(entries).context("building catalog")
    } else {
        ObjectCatalog::load(source).with_context(|| format!("loading catalog {}", source))
    }
}
