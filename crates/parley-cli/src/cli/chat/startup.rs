//! Backend availability check run once before the chat loop starts.

use parley_core::llm::generator::TextGenerator;
use parley_types::llm::GenerationError;

/// Outcome of a startup check that did not rule the engine out.
#[derive(Debug)]
pub enum Readiness {
    Ready,
    /// The check failed transiently (rate limit, timeout, 5xx); chatting may
    /// still work.
    Degraded(GenerationError),
}

/// Probe the engine. Only errors that make it unusable are returned as `Err`.
pub async fn check_backend<G: TextGenerator>(generator: &G) -> Result<Readiness, GenerationError> {
    match generator.check().await {
        Ok(()) => Ok(Readiness::Ready),
        Err(e) if e.is_init_failure() => Err(e),
        Err(e) => {
            tracing::warn!(
                backend = generator.name(),
                error = %e,
                "startup check failed, continuing"
            );
            Ok(Readiness::Degraded(e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_core::llm::scripted::ScriptedGenerator;

    #[tokio::test]
    async fn test_reachable_engine_is_ready() {
        let generator = ScriptedGenerator::new(vec![]);
        assert!(matches!(check_backend(&generator).await, Ok(Readiness::Ready)));
    }

    #[tokio::test]
    async fn test_unavailable_engine_is_fatal() {
        let generator = ScriptedGenerator::unavailable();
        let err = check_backend(&generator).await.unwrap_err();
        assert!(matches!(err, GenerationError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_bad_credentials_are_fatal() {
        let generator = ScriptedGenerator::failing_check(GenerationError::AuthenticationFailed);
        assert!(check_backend(&generator).await.is_err());
    }

    #[tokio::test]
    async fn test_transient_failures_are_not_fatal() {
        let transient = [
            GenerationError::RateLimited,
            GenerationError::Timeout,
            GenerationError::Provider {
                message: "HTTP 503: overloaded".into(),
            },
        ];
        for err in transient {
            let generator = ScriptedGenerator::failing_check(err);
            assert!(matches!(
                check_backend(&generator).await,
                Ok(Readiness::Degraded(_))
            ));
        }
    }
}
