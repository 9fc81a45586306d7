use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub llm: LlmConfig,
    pub matching: MatchingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// `gemini` or `openai`.
    pub provider: String,
    /// Environment variable holding the service key. Unset or empty means fallback mode.
    pub api_key_env: String,
    pub base_url: String,
    #[serde(default)]
    pub preferred_model_family: String,
    pub default_model: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchingConfig {
    /// How many experts the matching prompt asks for. Replies are not truncated.
    pub top_k: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                path: "nexa.db".to_string(),
            },
            llm: LlmConfig {
                provider: "gemini".to_string(),
                api_key_env: "GOOGLE_API_KEY".to_string(),
                base_url: "https://generativelanguage.googleapis.com".to_string(),
                preferred_model_family: "gemini-1.5".to_string(),
                default_model: "models/gemini-1.5-flash".to_string(),
            },
            matching: MatchingConfig { top_k: 3 },
        }
    }
}

impl LlmConfig {
    /// The configured key, if present and non-empty.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
    }
}

pub fn load(path: Option<&str>) -> anyhow::Result<AppConfig> {
    let defaults = AppConfig::default();
    let mut settings = config::Config::builder()
        .set_default("database.path", defaults.database.path)?
        .set_default("llm.provider", defaults.llm.provider)?
        .set_default("llm.api_key_env", defaults.llm.api_key_env)?
        .set_default("llm.base_url", defaults.llm.base_url)?
        .set_default(
            "llm.preferred_model_family",
            defaults.llm.preferred_model_family,
        )?
        .set_default("llm.default_model", defaults.llm.default_model)?
        .set_default("matching.top_k", defaults.matching.top_k as i64)?;
    if let Some(p) = path {
        settings = settings.add_source(config::File::with_name(p));
    } else {
        settings = settings.add_source(config::File::with_name("config/default").required(false));
    }
    settings = settings.add_source(config::Environment::with_prefix("NEXA").separator("__"));
    let cfg = settings.build()?;
    Ok(cfg.try_deserialize()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn file_values_override_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nexa.toml");
        fs::write(
            &path,
            r#"
            [database]
            path = "sqlite::memory:"

            [llm]
            provider = "openai"
            api_key_env = "NEXA_TEST_OPENAI_KEY"
            base_url = "http://localhost:1234"
            default_model = "gpt-4o-mini"
            "#,
        )
        .unwrap();

        let cfg = load(Some(&path.to_string_lossy())).unwrap();
        assert_eq!(cfg.database.path, "sqlite::memory:");
        assert_eq!(cfg.llm.provider, "openai");
        assert_eq!(cfg.llm.default_model, "gpt-4o-mini");
        assert_eq!(cfg.llm.preferred_model_family, "gemini-1.5");
        assert_eq!(cfg.matching.top_k, 3);
    }

    #[test]
    fn blank_key_counts_as_missing() {
        let mut llm = AppConfig::default().llm;
        llm.api_key_env = "NEXA_TEST_BLANK_KEY".into();
        std::env::set_var("NEXA_TEST_BLANK_KEY", "   ");
        assert_eq!(llm.api_key(), None);
        std::env::set_var("NEXA_TEST_BLANK_KEY", "abc");
        assert_eq!(llm.api_key().as_deref(), Some("abc"));
        std::env::remove_var("NEXA_TEST_BLANK_KEY");
    }
}
