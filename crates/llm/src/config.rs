/// Chat-completion endpoint configuration.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Bearer token sent with every request. Empty disables the feature.
    pub api_key: String,
    /// Full URL of the `chat/completions` endpoint.
    pub api_url: String,
    pub model: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    pub max_tokens: u32,
    pub temperature: f64,
    pub top_p: f64,
}

pub const DEFAULT_API_URL: &str = "https://api.deepseek.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "deepseek-chat";
pub const DEFAULT_MAX_TOKENS: u32 = 2000;

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_url: DEFAULT_API_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout_secs: 120,
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: 0.7,
            top_p: 0.95,
        }
    }
}

impl LlmConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var            | Default                                          |
    /// |--------------------|--------------------------------------------------|
    /// | `LLM_API_KEY`      | (empty)                                          |
    /// | `LLM_API_URL`      | `https://api.deepseek.com/v1/chat/completions`   |
    /// | `LLM_MODEL`        | `deepseek-chat`                                  |
    /// | `LLM_TIMEOUT_SECS` | `120`                                            |
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let api_key = std::env::var("LLM_API_KEY").unwrap_or_default();
        let api_url = std::env::var("LLM_API_URL").unwrap_or(defaults.api_url);
        let model = std::env::var("LLM_MODEL").unwrap_or(defaults.model);

        let timeout_secs: u64 = std::env::var("LLM_TIMEOUT_SECS")
            .unwrap_or_else(|_| defaults.timeout_secs.to_string())
            .parse()
            .expect("LLM_TIMEOUT_SECS must be a valid u64");

        Self {
            api_key,
            api_url,
            model,
            timeout_secs,
            ..defaults
        }
    }
}
