//! BoxTextGenerator -- object-safe dynamic dispatch wrapper for TextGenerator.
//!
//! 1. Define an object-safe `TextGeneratorDyn` trait with boxed futures
//! 2. Blanket-impl `TextGeneratorDyn` for all `T: TextGenerator`
//! 3. `BoxTextGenerator` wraps `Box<dyn TextGeneratorDyn>` and delegates

use std::future::Future;
use std::pin::Pin;

use parley_types::llm::{GenerationError, GenerationParams};

use super::generator::TextGenerator;

type BoxedResult<'a, T> = Pin<Box<dyn Future<Output = Result<T, GenerationError>> + Send + 'a>>;

/// Object-safe version of [`TextGenerator`] with boxed futures.
pub trait TextGeneratorDyn: Send + Sync {
    fn name(&self) -> &str;

    fn model(&self) -> &str;

    fn generate_boxed<'a>(
        &'a self,
        prompt: &'a str,
        params: &'a GenerationParams,
        stop: &'a [String],
    ) -> BoxedResult<'a, String>;

    fn check_boxed(&self) -> BoxedResult<'_, ()>;
}

impl<T: TextGenerator> TextGeneratorDyn for T {
    fn name(&self) -> &str {
        TextGenerator::name(self)
    }

    fn model(&self) -> &str {
        TextGenerator::model(self)
    }

    fn generate_boxed<'a>(
        &'a self,
        prompt: &'a str,
        params: &'a GenerationParams,
        stop: &'a [String],
    ) -> BoxedResult<'a, String> {
        Box::pin(self.generate(prompt, params, stop))
    }

    fn check_boxed(&self) -> BoxedResult<'_, ()> {
        Box::pin(self.check())
    }
}

/// Type-erased generator chosen at runtime from configuration.
pub struct BoxTextGenerator {
    inner: Box<dyn TextGeneratorDyn>,
}

impl BoxTextGenerator {
    /// Wrap a concrete `TextGenerator` in a type-erased box.
    pub fn new<T: TextGenerator + 'static>(generator: T) -> Self {
        Self {
            inner: Box::new(generator),
        }
    }
}

impl TextGenerator for BoxTextGenerator {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn model(&self) -> &str {
        self.inner.model()
    }

    async fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
        stop: &[String],
    ) -> Result<String, GenerationError> {
        self.inner.generate_boxed(prompt, params, stop).await
    }

    async fn check(&self) -> Result<(), GenerationError> {
        self.inner.check_boxed().await
    }
}
