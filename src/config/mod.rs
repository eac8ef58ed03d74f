//! Configuration loaded from the environment.

/// Runtime configuration for the turn orchestrator and model invoker.
#[derive(Debug, Clone)]
pub struct AuroraConfig {
    /// Model identifier sent to the provider.
    pub model: String,
    /// Provider API key, if configured.
    pub api_key: Option<String>,
    /// Override for the provider base URL.
    pub base_url: Option<String>,
    /// How many recent messages of durable history each turn loads.
    pub history_limit: usize,
    /// Iteration budget for the agent loop.
    pub max_iterations: usize,
}

impl Default for AuroraConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            api_key: None,
            base_url: None,
            history_limit: 20,
            max_iterations: 5,
        }
    }
}

impl AuroraConfig {
    /// Load from environment variables, falling back to defaults.
    ///
    /// Recognized: `AURORA_MODEL`, `OPENAI_API_KEY`, `OPENAI_BASE_URL`,
    /// `AURORA_HISTORY_LIMIT`, `AURORA_MAX_ITERATIONS`.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error
        let mut config = Self::default();

        if let Ok(model) = std::env::var("AURORA_MODEL") {
            config.model = model;
        }
        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            config.api_key = Some(key);
        }
        if let Ok(url) = std::env::var("OPENAI_BASE_URL") {
            config.base_url = Some(url);
        }
        if let Some(limit) = parse_env_usize("AURORA_HISTORY_LIMIT") {
            config.history_limit = limit;
        }
        if let Some(max) = parse_env_usize("AURORA_MAX_ITERATIONS") {
            config.max_iterations = max;
        }

        config
    }
}

fn parse_env_usize(name: &str) -> Option<usize> {
    match std::env::var(name) {
        Ok(raw) => match raw.trim().parse::<usize>() {
            Ok(value) if value > 0 => Some(value),
            _ => {
                tracing::warn!(var = name, value = %raw, "ignoring non-positive or unparsable value");
                None
            }
        },
        Err(_) => None,
    }
}
