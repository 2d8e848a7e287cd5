//! Configuration validation.
//!
//! Errors make a configuration unusable; warnings flag settings that are
//! legal but almost certainly unintended.

use std::fmt;

use crate::error::ConfigError;
use crate::schema::{Config, EmbeddingProviderKind};

/// One finding, addressed by its dotted TOML path.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationIssue {
    pub path: String,
    pub message: String,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: &str, message: impl Into<String>) {
        self.errors.push(ValidationIssue {
            path: path.to_string(),
            message: message.into(),
        });
    }

    fn warn(&mut self, path: &str, message: impl Into<String>) {
        self.warnings.push(ValidationIssue {
            path: path.to_string(),
            message: message.into(),
        });
    }

    /// The first error as a [`ConfigError::InvalidValue`], if any.
    pub fn into_error(self) -> Option<ConfigError> {
        self.errors.into_iter().next().map(|e| ConfigError::InvalidValue {
            field: e.path,
            message: e.message,
        })
    }
}

pub struct ConfigValidator;

impl ConfigValidator {
    pub fn validate(config: &Config) -> ValidationResult {
        let mut result = ValidationResult::default();
        Self::validate_engine(config, &mut result);
        Self::validate_cache(config, &mut result);
        Self::validate_search(config, &mut result);
        Self::validate_hybrid(config, &mut result);
        Self::validate_embedding(config, &mut result);
        result
    }

    fn validate_engine(config: &Config, result: &mut ValidationResult) {
        let engine = &config.engine;

        if engine.embed_concurrency == 0 {
            result.error("engine.embed_concurrency", "embed_concurrency must be greater than 0");
        }

        if !engine.importance_weight.is_finite() {
            result.error(
                "engine.importance_weight",
                "importance_weight must be a finite number",
            );
        } else if engine.importance_weight < 0.0 {
            result.error("engine.importance_weight", "importance_weight cannot be negative");
        } else if engine.importance_weight > 1.0 {
            result.warn(
                "engine.importance_weight",
                "importance_weight above 1 lets importance outweigh similarity",
            );
        }

        for (path, window) in [
            ("engine.message_window", engine.message_window),
            ("engine.episodic_window", engine.episodic_window),
        ] {
            if window == 0 {
                result.warn(path, "window is 0, this source will never return results");
            }
        }
    }

    fn validate_cache(config: &Config, result: &mut ValidationResult) {
        if config.cache.capacity == 0 {
            result.error("cache.capacity", "capacity must be greater than 0");
        }

        if let Some(ref url) = config.cache.shared.url {
            if !url.starts_with("redis://") && !url.starts_with("rediss://") {
                result.error("cache.shared.url", "url must start with redis:// or rediss://");
            }
        }

        if config.cache.shared.key_prefix.is_empty() {
            result.warn(
                "cache.shared.key_prefix",
                "empty key_prefix shares the key space with other Redis users",
            );
        }
    }

    fn validate_search(config: &Config, result: &mut ValidationResult) {
        let search = &config.search;

        if search.top_k == 0 {
            result.error("search.top_k", "top_k must be greater than 0");
        }

        if !(-1.0..=1.0).contains(&search.min_score) {
            result.error("search.min_score", "min_score must be within [-1, 1]");
        }

        if search.use_cache && search.cache_ttl_secs == 0 {
            result.warn(
                "search.cache_ttl_secs",
                "cache_ttl_secs is 0, every cached entry is already stale",
            );
        }
    }

    fn validate_hybrid(config: &Config, result: &mut ValidationResult) {
        let hybrid = &config.hybrid;

        for (path, weight) in [
            ("hybrid.message_weight", hybrid.message_weight),
            ("hybrid.episodic_weight", hybrid.episodic_weight),
        ] {
            if !weight.is_finite() {
                result.error(path, "weight must be a finite number");
            } else if weight < 0.0 {
                result.error(path, "weight cannot be negative");
            }
        }

        if hybrid.message_weight + hybrid.episodic_weight == 0.0 {
            result.warn("hybrid", "both weights are 0, hybrid scores will all be 0");
        }
    }

    fn validate_embedding(config: &Config, result: &mut ValidationResult) {
        let embedding = &config.embedding;

        if embedding.dimension == 0 {
            result.error("embedding.dimension", "dimension must be greater than 0");
        }

        if embedding.provider == EmbeddingProviderKind::OpenAI {
            if embedding.require_api_key().is_err() {
                result.error("embedding.api_key", "api_key is required for the openai provider");
            }

            if !embedding.base_url.starts_with("http://")
                && !embedding.base_url.starts_with("https://")
            {
                result.error("embedding.base_url", "base_url must start with http:// or https://");
            }
        }
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
