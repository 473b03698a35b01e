//! How the sync client reaches the resource router.

use std::sync::Arc;

use async_trait::async_trait;

use super::SyncError;
use crate::record::Record;
use crate::resource::ResourceRouter;

/// The four resource operations, as seen from the client.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn list(&self, collection: &str) -> Result<Vec<Record>, SyncError>;

    async fn create(&self, collection: &str, fields: Record) -> Result<Record, SyncError>;

    async fn update(&self, collection: &str, id: &str, fields: Record)
        -> Result<Record, SyncError>;

    async fn delete(&self, collection: &str, id: &str) -> Result<(), SyncError>;
}

/// In-process transport calling a shared [`ResourceRouter`] directly.
#[derive(Clone)]
pub struct LocalTransport {
    resources: Arc<ResourceRouter>,
}

impl LocalTransport {
    pub fn new(resources: Arc<ResourceRouter>) -> Self {
        Self { resources }
    }
}

#[async_trait]
impl Transport for LocalTransport {
    async fn list(&self, collection: &str) -> Result<Vec<Record>, SyncError> {
        Ok(self.resources.list(collection)?)
    }

    async fn create(&self, collection: &str, fields: Record) -> Result<Record, SyncError> {
        Ok(self.resources.create(collection, fields)?)
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        fields: Record,
    ) -> Result<Record, SyncError> {
        Ok(self.resources.update(collection, id, fields)?)
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), SyncError> {
        Ok(self.resources.delete(collection, id)?)
    }
}

#[cfg(feature = "http")]
pub use http::HttpTransport;

#[cfg(feature = "http")]
mod http {
    use async_trait::async_trait;
    use reqwest::{Client, Response, StatusCode, Url};
    use serde::de::DeserializeOwned;
    use serde::Deserialize;

    use super::{SyncError, Transport};
    use crate::record::Record;

    #[derive(Deserialize)]
    struct ErrorBody {
        error: String,
    }

    /// Transport speaking the resource API over HTTP.
    #[derive(Clone)]
    pub struct HttpTransport {
        client: Client,
        base: Url,
    }

    impl HttpTransport {
        /// `base_url` is the server root, e.g. `http://127.0.0.1:5000`.
        pub fn new(base_url: &str) -> Result<Self, SyncError> {
            Self::with_client(Client::new(), base_url)
        }

        pub fn with_client(client: Client, base_url: &str) -> Result<Self, SyncError> {
            let base = Url::parse(base_url)
                .map_err(|e| SyncError::Network(format!("invalid base url {base_url}: {e}")))?;
            if base.cannot_be_a_base() {
                return Err(SyncError::Network(format!(
                    "base url {base_url} cannot carry a path"
                )));
            }
            Ok(Self { client, base })
        }

        fn url(&self, segments: &[&str]) -> Url {
            let mut url = self.base.clone();
            if let Ok(mut path) = url.path_segments_mut() {
                path.pop_if_empty().push("api").extend(segments);
            }
            url
        }
    }

    fn network(err: reqwest::Error) -> SyncError {
        SyncError::Network(err.to_string())
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, SyncError> {
        let status = response.status();
        if status.is_success() {
            return response
                .json::<T>()
                .await
                .map_err(|e| SyncError::Network(format!("invalid response body: {e}")));
        }

        let message = match response.json::<ErrorBody>().await {
            Ok(body) => body.error,
            Err(_) => status.to_string(),
        };
        Err(match status {
            StatusCode::FORBIDDEN => SyncError::AccessDenied,
            StatusCode::NOT_FOUND => SyncError::NotFound,
            StatusCode::BAD_REQUEST => SyncError::InvalidRequest(message),
            StatusCode::UNAUTHORIZED => SyncError::Unauthorized,
            s if s.is_server_error() => SyncError::Store(message),
            s => SyncError::Network(format!("unexpected status {s}: {message}")),
        })
    }

    #[async_trait]
    impl Transport for HttpTransport {
        async fn list(&self, collection: &str) -> Result<Vec<Record>, SyncError> {
            let response = self
                .client
                .get(self.url(&[collection]))
                .send()
                .await
                .map_err(network)?;
            decode(response).await
        }

        async fn create(&self, collection: &str, fields: Record) -> Result<Record, SyncError> {
            let response = self
                .client
                .post(self.url(&[collection]))
                .json(&fields)
                .send()
                .await
                .map_err(network)?;
            decode(response).await
        }

        async fn update(
            &self,
            collection: &str,
            id: &str,
            fields: Record,
        ) -> Result<Record, SyncError> {
            let response = self
                .client
                .put(self.url(&[collection, id]))
                .json(&fields)
                .send()
                .await
                .map_err(network)?;
            decode(response).await
        }

        async fn delete(&self, collection: &str, id: &str) -> Result<(), SyncError> {
            let response = self
                .client
                .delete(self.url(&[collection, id]))
                .send()
                .await
                .map_err(network)?;
            decode::<serde_json::Value>(response).await.map(|_| ())
        }
    }

}
