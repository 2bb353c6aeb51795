use crate::Language;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GeneratorConfig {
    pub min_batch: usize,
    pub max_batch: usize,
    /// Delay between consecutive task starts in a batch.
    pub stagger_ms: u64,
    /// Added to the variation index when a result repeats its source card.
    pub retry_offset: usize,
    pub target_language: Language,
}

impl GeneratorConfig {
    pub fn stagger(&self, index: usize) -> Duration {
        Duration::from_millis(self.stagger_ms.saturating_mul(index as u64))
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            min_batch: 2,
            max_batch: 3,
            stagger_ms: 50,
            retry_offset: 10,
            target_language: Language::Tr,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SessionConfig {
    pub candidate_count: usize,
    pub hidden_downvote_threshold: usize,
    pub closing_max_intensity: u8,
    pub generator: GeneratorConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            candidate_count: 3,
            hidden_downvote_threshold: 1,
            closing_max_intensity: 3,
            generator: GeneratorConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_fills_defaults() {
        let config: SessionConfig =
            serde_json::from_str(r#"{"candidate_count": 4, "generator": {"stagger_ms": 0}}"#)
                .expect("parse config");
        assert_eq!(config.candidate_count, 4);
        assert_eq!(config.hidden_downvote_threshold, 1);
        assert_eq!(config.generator.stagger_ms, 0);
        assert_eq!(config.generator.max_batch, 3);
        assert_eq!(config.generator.stagger(2), Duration::ZERO);
    }
}
