//! Backend client over HTTP/JSON

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;

use crate::error::{BackendError, BackendResult};
use crate::traits::ChessBackend;
use crate::types::*;

/// Network client for the evaluation backend.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    root: Url,
    timeout: Duration,
}

impl HttpBackend {
    /// Build a client for the service rooted at `base_url`
    /// (e.g. `http://localhost:8000`). `timeout` bounds every request.
    pub fn new(base_url: &str, timeout: Duration) -> BackendResult<Self> {
        let trimmed = base_url.trim_end_matches('/');
        let root = Url::parse(&format!("{}/", trimmed))
            .map_err(|e| BackendError::InvalidUrl(format!("{}: {}", base_url, e)))?;
        if !matches!(root.scheme(), "http" | "https") {
            return Err(BackendError::InvalidUrl(format!(
                "{}: unsupported scheme",
                base_url
            )));
        }

        let client = Client::builder()
            .user_agent(concat!("chessboard/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| BackendError::InvalidUrl(e.to_string()))?;

        Ok(Self {
            client,
            root,
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        self.root.as_str()
    }

    fn url(&self, path: &str) -> BackendResult<Url> {
        self.root
            .join(path)
            .map_err(|e| BackendError::InvalidUrl(e.to_string()))
    }

    fn check_status(&self, response: Response) -> BackendResult<Response> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            Err(BackendError::Status(status.as_u16()))
        }
    }

    async fn decode<T: DeserializeOwned>(&self, response: Response) -> BackendResult<T> {
        let response = self.check_status(response)?;
        response
            .json::<T>()
            .await
            .map_err(|e| BackendError::from_reqwest(e, self.timeout))
    }

    async fn get(&self, path: &str) -> BackendResult<Response> {
        let url = self.url(path)?;
        tracing::debug!(%url, "GET");
        self.client
            .get(url)
            .send()
            .await
            .map_err(|e| BackendError::from_reqwest(e, self.timeout))
    }

    async fn post<B: serde::Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> BackendResult<Response> {
        let url = self.url(path)?;
        tracing::debug!(%url, "POST");
        self.client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| BackendError::from_reqwest(e, self.timeout))
    }
}

#[async_trait]
impl ChessBackend for HttpBackend {
    async fn health(&self) -> BackendResult<()> {
        let response = self.get("health").await?;
        self.check_status(response)?;
        Ok(())
    }

    async fn best_move(&self, fen: &str) -> BackendResult<MoveResponse> {
        let response = self.post("api/move", &PositionRequest { fen }).await?;
        self.decode(response).await
    }

    async fn analyze(&self, fen: &str) -> BackendResult<AnalysisResponse> {
        let response = self.post("api/analyze", &PositionRequest { fen }).await?;
        self.decode(response).await
    }

    async fn engines(&self) -> BackendResult<EnginesResponse> {
        let response = self.get("api/engines").await?;
        self.decode(response).await
    }

    async fn select_engine(&self, engine: &str) -> BackendResult<()> {
        let response = self
            .post("api/engines/select", &SelectEngineRequest { engine })
            .await?;
        self.check_status(response)?;
        Ok(())
    }
}
