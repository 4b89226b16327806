//! Bounded retry with backoff around transient provider faults.

use std::time::Duration;

use tracing::warn;

use crate::{ChatModel, Completion, Message, ModelError};

const INITIAL_BACKOFF: Duration = Duration::from_secs(1);

/// Call `complete`, retrying up to `retries` times on [`ModelError::Transient`]
/// with exponential backoff. Everything else surfaces immediately — retrying
/// an unchanged prompt against a content defect does not help.
pub async fn complete_with_retry(
    model: &dyn ChatModel,
    messages: &[Message],
    temperature: f32,
    max_tokens: u32,
    retries: u32,
) -> Result<Completion, ModelError> {
    let mut attempt = 0u32;
    let mut backoff = INITIAL_BACKOFF;

    loop {
        match model.complete(messages, temperature, max_tokens).await {
            Ok(completion) => return Ok(completion),
            Err(err) if err.is_retryable() && attempt < retries => {
                attempt += 1;
                warn!(
                    attempt,
                    backoff_secs = backoff.as_secs(),
                    error = %err,
                    "transient model fault, retrying"
                );
                tokio::time::sleep(backoff).await;
                backoff *= 2;
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Usage;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Fails with `Transient` for the first `failures` calls, then succeeds.
    struct FlakyModel {
        failures: u32,
        calls: AtomicU32,
    }

    #[async_trait]
    impl ChatModel for FlakyModel {
        async fn complete(
            &self,
            _messages: &[Message],
            _temperature: f32,
            _max_tokens: u32,
        ) -> Result<Completion, ModelError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                Err(ModelError::Transient("overloaded".into()))
            } else {
                Ok(Completion {
                    content: "TRUE ok".into(),
                    finish_reason: "stop".into(),
                    usage: Usage::default(),
                })
            }
        }

        fn model_name(&self) -> &str {
            "flaky"
        }
    }

    /// Always fails with a non-retryable error.
    struct BrokenModel;

    #[async_trait]
    impl ChatModel for BrokenModel {
        async fn complete(
            &self,
            _messages: &[Message],
            _temperature: f32,
            _max_tokens: u32,
        ) -> Result<Completion, ModelError> {
            Err(ModelError::Provider {
                status: 400,
                body: "bad request".into(),
            })
        }

        fn model_name(&self) -> &str {
            "broken"
        }
    }

    #[tokio::test(start_paused = true)]
    async fn recovers_within_budget() {
        let model = FlakyModel {
            failures: 2,
            calls: AtomicU32::new(0),
        };
        let messages = [Message::user("hi")];
        let out = complete_with_retry(&model, &messages, 0.0, 64, 3)
            .await
            .unwrap();
        assert_eq!(out.content, "TRUE ok");
        assert_eq!(model.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn surfaces_transient_after_budget_exhausted() {
        let model = FlakyModel {
            failures: 10,
            calls: AtomicU32::new(0),
        };
        let messages = [Message::user("hi")];
        let err = complete_with_retry(&model, &messages, 0.0, 64, 2)
            .await
            .unwrap_err();
        assert!(matches!(err, ModelError::Transient(_)));
        // Initial call plus two retries.
        assert_eq!(model.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn non_retryable_errors_surface_immediately() {
        let messages = [Message::user("hi")];
        let err = complete_with_retry(&BrokenModel, &messages, 0.0, 64, 5)
            .await
            .unwrap_err();
        assert!(matches!(err, ModelError::Provider { status: 400, .. }));
    }
}
