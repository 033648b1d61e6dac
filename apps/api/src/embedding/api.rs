//! Embedding client for OpenAI-compatible `/embeddings` endpoints
//! (OpenAI, text-embeddings-inference, Ollama, vLLM, ...).
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::embedding::{EmbedError, Embedder};

const MAX_RETRIES: u32 = 3;
const REQUEST_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: [&'a str; 1],
    encoding_format: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f64>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Remote embedder. Retries on 429 and 5xx with exponential backoff.
#[derive(Clone)]
pub struct ApiEmbedder {
    client: Client,
    url: String,
    api_key: String,
    model: String,
    dimension: usize,
}

impl ApiEmbedder {
    pub fn new(base_url: &str, api_key: String, model: String, dimension: usize) -> Result<Self, EmbedError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            client,
            url: embeddings_url(base_url),
            api_key,
            model,
            dimension,
        })
    }

    async fn request(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        let body = EmbeddingRequest {
            model: &self.model,
            input: [text],
            encoding_format: "float",
        };

        let mut last_error: Option<EmbedError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // Exponential backoff: 500ms, 1s
                let delay = std::time::Duration::from_millis(500 * (1 << (attempt - 1)));
                warn!(
                    "Embedding call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = match self
                .client
                .post(&self.url)
                .bearer_auth(&self.api_key)
                .json(&body)
                .send()
                .await
            {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(EmbedError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let message = response.text().await.unwrap_or_default();
                warn!("Embedding API returned {}: {}", status, message);
                last_error = Some(EmbedError::Api {
                    status: status.as_u16(),
                    message,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<ApiError>(&body)
                    .map(|e| e.error.message)
                    .unwrap_or(body);
                return Err(EmbedError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let parsed: EmbeddingResponse = response.json().await?;
            let embedding = parsed
                .data
                .into_iter()
                .next()
                .ok_or(EmbedError::EmptyResponse)?
                .embedding;

            return self.check_dimension(embedding);
        }

        Err(last_error.unwrap_or(EmbedError::EmptyResponse))
    }

    fn check_dimension(&self, embedding: Vec<f64>) -> Result<Vec<f32>, EmbedError> {
        if embedding.len() != self.dimension {
            return Err(EmbedError::Dimension {
                expected: self.dimension,
                actual: embedding.len(),
            });
        }
        debug!("Embedding call succeeded ({} dims)", embedding.len());
        Ok(embedding.into_iter().map(|v| v as f32).collect())
    }
}

#[async_trait]
impl Embedder for ApiEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        if text.trim().is_empty() {
            return Ok(vec![0.0; self.dimension]);
        }
        self.request(text).await
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn name(&self) -> &str {
        &self.model
    }
}

/// Accepts either a base URL (`http://host/v1`) or the full endpoint.
fn embeddings_url(base_url: &str) -> String {
    let trimmed = base_url.trim_end_matches('/');
    if trimmed.ends_with("/embeddings") {
        trimmed.to_string()
    } else {
        format!("{trimmed}/embeddings")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn embedder(dimension: usize) -> ApiEmbedder {
        ApiEmbedder::new("http://localhost:9/v1", "key".to_string(), "m".to_string(), dimension)
            .unwrap()
    }

    #[test]
    fn test_embeddings_url_appends_path() {
        assert_eq!(embeddings_url("http://h/v1"), "http://h/v1/embeddings");
        assert_eq!(embeddings_url("http://h/v1/"), "http://h/v1/embeddings");
        assert_eq!(
            embeddings_url("http://h/v1/embeddings"),
            "http://h/v1/embeddings"
        );
    }

    #[test]
    fn test_response_deserializes() {
        let json = r#"{"object":"list","data":[{"object":"embedding","index":0,"embedding":[0.5,-0.25]}],"model":"m"}"#;
        let parsed: EmbeddingResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.data[0].embedding, vec![0.5, -0.25]);
    }

    #[test]
    fn test_dimension_check() {
        let e = embedder(2);
        assert_eq!(e.check_dimension(vec![0.5, 1.0]).unwrap(), vec![0.5_f32, 1.0]);
        assert!(matches!(
            e.check_dimension(vec![0.5]),
            Err(EmbedError::Dimension {
                expected: 2,
                actual: 1
            })
        ));
    }

    #[tokio::test]
    async fn test_blank_text_skips_request() {
        let v = embedder(4).embed("  \n ").await.unwrap();
        assert_eq!(v, vec![0.0; 4]);
    }
}
