//! Provider abstractions for embeddings and text generation
//!
//! Trait-based seams that allow switching between a hosted OpenAI-compatible
//! API and a local Ollama server.

pub mod embedding;
pub mod llm;
pub mod ollama;
pub mod openai;

pub use embedding::EmbeddingProvider;
pub use llm::LlmProvider;

use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

use crate::error::{Error, Result};

/// Retry a request with exponential backoff (1s, 2s, 4s, ...)
pub(crate) async fn retry_request<F, Fut, T>(max_retries: u32, operation: F) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut last_error = None;

    for attempt in 0..=max_retries {
        match operation().await {
            Ok(result) => return Ok(result),
            Err(e) => {
                if attempt < max_retries {
                    let delay = Duration::from_secs(2u64.pow(attempt));
                    tracing::warn!(
                        "Request failed (attempt {}/{}): {}, retrying in {:?}",
                        attempt + 1,
                        max_retries + 1,
                        e,
                        delay
                    );
                    sleep(delay).await;
                }
                last_error = Some(e);
            }
        }
    }

    Err(last_error.unwrap_or_else(|| Error::internal("Retry loop ended without a result")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test(start_paused = true)]
    async fn test_retry_succeeds_after_failure() {
        let calls = AtomicU32::new(0);
        let result = retry_request(2, || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    Err(Error::llm("transient"))
                } else {
                    Ok(n)
                }
            }
        })
        .await
        .unwrap();

        assert_eq!(result, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_gives_up() {
        let calls = AtomicU32::new(0);
        let result: Result<()> = retry_request(1, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(Error::llm("down")) }
        })
        .await;

        assert!(matches!(result, Err(Error::Llm(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
