use crate::Language;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TranslateError {
    #[error("translation disabled")]
    Disabled,
    #[error("translation request failed: {0}")]
    Request(String),
    #[error("translation response missing text")]
    EmptyResponse,
}

/// Best-effort English-to-`target` translation.
pub trait Translator: Send + Sync {
    fn translate(&self, text: &str, target: Language) -> Result<String, TranslateError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTranslator;

impl Translator for NoopTranslator {
    fn translate(&self, _text: &str, _target: Language) -> Result<String, TranslateError> {
        Err(TranslateError::Disabled)
    }
}
