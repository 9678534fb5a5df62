//! LlmClient trait definition

use async_trait::async_trait;

use super::{CompletionRequest, CompletionResponse, LlmError};

/// Stateless generation gateway - each call is independent
///
/// This is the single seam through which every call to the external
/// text-generation capability passes. Implementations normalize errors
/// into [`LlmError`] and never retry internally; a transient failure is
/// reported to the caller, who retries with backoff if they choose.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send a single completion request (blocking until complete)
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError>;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tracing::debug;

    use std::sync::Mutex;

    /// Mock gateway for unit tests
    ///
    /// Returns queued responses in order and counts calls so tests can
    /// assert that cached paths make zero generative calls.
    pub struct MockLlmClient {
        responses: Mutex<Vec<Option<Result<CompletionResponse, LlmError>>>>,
        call_count: AtomicUsize,
    }

    impl MockLlmClient {
        /// Mock that expects zero calls
        pub fn new() -> Self {
            Self::with_responses(Vec::new())
        }

        /// Queue full results, errors included
        pub fn with_responses(responses: Vec<Result<CompletionResponse, LlmError>>) -> Self {
            debug!(response_count = %responses.len(), "MockLlmClient::with_responses: called");
            Self {
                responses: Mutex::new(responses.into_iter().map(Some).collect()),
                call_count: AtomicUsize::new(0),
            }
        }

        /// Queue plain text responses
        pub fn with_texts(texts: Vec<String>) -> Self {
            Self::with_responses(
                texts
                    .into_iter()
                    .map(|t| Ok(CompletionResponse::text_only(t)))
                    .collect(),
            )
        }

        pub fn call_count(&self) -> usize {
            self.call_count.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl LlmClient for MockLlmClient {
        async fn complete(&self, _request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
            let idx = self.call_count.fetch_add(1, Ordering::SeqCst);
            debug!(%idx, "MockLlmClient::complete: called");
            let taken = self.responses.lock().unwrap().get_mut(idx).and_then(Option::take);
            match taken {
                Some(result) => result,
                None => Err(LlmError::InvalidResponse("No more mock responses".to_string())),
            }
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[tokio::test]
        async fn test_mock_client_returns_responses_in_order() {
            let client = MockLlmClient::with_texts(vec!["Response 1".to_string(), "Response 2".to_string()]);
            let req = CompletionRequest::new("Test", "input");

            let resp1 = client.complete(req.clone()).await.unwrap();
            assert_eq!(resp1.text, "Response 1");

            let resp2 = client.complete(req).await.unwrap();
            assert_eq!(resp2.text, "Response 2");

            assert_eq!(client.call_count(), 2);
        }

        #[tokio::test]
        async fn test_mock_client_errors_when_exhausted() {
            let client = MockLlmClient::new();
            let result = client.complete(CompletionRequest::new("Test", "input")).await;
            assert!(result.is_err());
        }
    }
}
