use super::*;

fn paths(errors: &[ValidationIssue]) -> Vec<&str> {
    errors.iter().map(|e| e.path.as_str()).collect()
}

#[test]
fn test_validate_default_config() {
    let result = ConfigValidator::validate(&Config::default());
    assert!(result.is_valid());
    assert!(result.warnings.is_empty());
}

#[test]
fn test_zero_capacity() {
    let mut config = Config::default();
    config.cache.capacity = 0;

    let result = ConfigValidator::validate(&config);
    assert!(!result.is_valid());
    assert_eq!(paths(&result.errors), vec!["cache.capacity"]);
}

#[test]
fn test_zero_top_k() {
    let mut config = Config::default();
    config.search.top_k = 0;

    let result = ConfigValidator::validate(&config);
    assert!(paths(&result.errors).contains(&"search.top_k"));
}

#[test]
fn test_min_score_range() {
    let mut config = Config::default();
    config.search.min_score = -1.0;
    assert!(ConfigValidator::validate(&config).is_valid());

    config.search.min_score = 1.5;
    let result = ConfigValidator::validate(&config);
    assert!(paths(&result.errors).contains(&"search.min_score"));
}

#[test]
fn test_negative_weights() {
    let mut config = Config::default();
    config.hybrid.episodic_weight = -0.1;

    let result = ConfigValidator::validate(&config);
    assert_eq!(paths(&result.errors), vec!["hybrid.episodic_weight"]);
}

#[test]
fn test_zero_weights_warning() {
    let mut config = Config::default();
    config.hybrid.message_weight = 0.0;
    config.hybrid.episodic_weight = 0.0;

    let result = ConfigValidator::validate(&config);
    assert!(result.is_valid());
    assert!(result.warnings.iter().any(|w| w.path == "hybrid"));
}

#[test]
fn test_importance_weight() {
    let mut config = Config::default();
    config.engine.importance_weight = 1.5;
    let result = ConfigValidator::validate(&config);
    assert!(result.is_valid());
    assert!(result.warnings.iter().any(|w| w.path == "engine.importance_weight"));

    config.engine.importance_weight = -0.5;
    let result = ConfigValidator::validate(&config);
    assert!(!result.is_valid());
}

#[test]
fn test_openai_requires_api_key() {
    let mut config = Config::default();
    config.embedding.provider = EmbeddingProviderKind::OpenAI;

    let result = ConfigValidator::validate(&config);
    assert_eq!(paths(&result.errors), vec!["embedding.api_key"]);

    config.embedding.api_key = Some("sk-test".to_string());
    assert!(ConfigValidator::validate(&config).is_valid());
}

#[test]
fn test_openai_base_url_scheme() {
    let mut config = Config::default();
    config.embedding.provider = EmbeddingProviderKind::OpenAI;
    config.embedding.api_key = Some("sk-test".to_string());
    config.embedding.base_url = "api.openai.com".to_string();

    let result = ConfigValidator::validate(&config);
    assert_eq!(paths(&result.errors), vec!["embedding.base_url"]);
}

#[test]
fn test_hash_provider_ignores_api_key() {
    let mut config = Config::default();
    config.embedding.base_url = "not-a-url".to_string();
    assert!(ConfigValidator::validate(&config).is_valid());
}

#[test]
fn test_zero_dimension() {
    let mut config = Config::default();
    config.embedding.dimension = 0;

    let result = ConfigValidator::validate(&config);
    assert!(paths(&result.errors).contains(&"embedding.dimension"));
}

#[test]
fn test_shared_url_scheme() {
    let mut config = Config::default();
    config.cache.shared.url = Some("http://localhost:6379".to_string());
    let result = ConfigValidator::validate(&config);
    assert_eq!(paths(&result.errors), vec!["cache.shared.url"]);

    config.cache.shared.url = Some("redis://localhost:6379".to_string());
    assert!(ConfigValidator::validate(&config).is_valid());
}

#[test]
fn test_zero_windows_warn() {
    let mut config = Config::default();
    config.engine.message_window = 0;

    let result = ConfigValidator::validate(&config);
    assert!(result.is_valid());
    assert!(result.warnings.iter().any(|w| w.path == "engine.message_window"));
}

#[test]
fn test_into_error() {
    let mut config = Config::default();
    config.engine.embed_concurrency = 0;

    let err = ConfigValidator::validate(&config).into_error().unwrap();
    assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "engine.embed_concurrency"));

    assert!(ConfigValidator::validate(&Config::default())
        .into_error()
        .is_none());
}

#[test]
fn test_issue_display() {
    let mut config = Config::default();
    config.cache.capacity = 0;
    let result = ConfigValidator::validate(&config);
    assert_eq!(
        result.errors[0].to_string(),
        "cache.capacity: capacity must be greater than 0"
    );
}

#[test]
fn test_nan_weights_rejected() {
    let config = crate::ConfigLoader::load_str(
        r#"
        [engine]
        importance_weight = nan

        [hybrid]
        message_weight = nan
        episodic_weight = inf
        "#,
    )
    .unwrap();

    let result = ConfigValidator::validate(&config);
    assert_eq!(
        paths(&result.errors),
        vec![
            "engine.importance_weight",
            "hybrid.message_weight",
            "hybrid.episodic_weight"
        ]
    );
}

#[test]
fn test_nan_min_score_rejected() {
    let mut config = Config::default();
    config.search.min_score = f32::NAN;
    assert!(paths(&ConfigValidator::validate(&config).errors).contains(&"search.min_score"));
}
