use anyhow::{Context, Result};
use config::{Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment prefix for overrides, e.g. `RELAY__SYSTEM_CONFIG__PORT=9000`.
pub const ENV_PREFIX: &str = "RELAY";

/// Config file used when `CONFIG_PATH` is not set.
pub const DEFAULT_CONFIG_PATH: &str = "conf.yaml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub system_config: SystemConfig,
    #[serde(default)]
    pub openai: OpenAIConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Send an `error` frame before closing a connection on a fault.
    #[serde(default)]
    pub send_error_frames: bool,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

/// Hosted speech-to-text and chat API settings.
#[derive(Clone, Serialize, Deserialize)]
pub struct OpenAIConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_transcription_model")]
    pub transcription_model: String,
    #[serde(default = "default_chat_model")]
    pub chat_model: String,
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_transcription_model() -> String {
    "whisper-1".to_string()
}

fn default_chat_model() -> String {
    "gpt-4".to_string()
}

// Keeps the key out of logs.
impl std::fmt::Debug for OpenAIConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAIConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("transcription_model", &self.transcription_model)
            .field("chat_model", &self.chat_model)
            .finish()
    }
}

impl Config {
    /// Load configuration: defaults, then the YAML file at `$CONFIG_PATH`
    /// (or `conf.yaml`) if it exists, then `RELAY__*` environment overrides.
    /// `OPENAI_API_KEY` fills the API key when nothing else set it.
    pub fn load() -> Result<Self> {
        let path =
            std::env::var("CONFIG_PATH").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let env = Environment::with_prefix(ENV_PREFIX)
            .separator("__")
            .try_parsing(true);

        let mut config = Self::load_from(Path::new(&path), env)?;
        config.apply_api_key_fallback(std::env::var("OPENAI_API_KEY").ok());
        Ok(config)
    }

    pub fn load_from(path: &Path, env: Environment) -> Result<Self> {
        if path.exists() {
            tracing::debug!("Reading configuration file {}", path.display());
        }

        let config: Config = config::Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(env)
            .build()
            .with_context(|| format!("failed to build configuration from {}", path.display()))?
            .try_deserialize()
            .context("invalid configuration")?;

        Ok(config)
    }

    pub fn apply_api_key_fallback(&mut self, key: Option<String>) {
        let unset = self.openai.api_key.as_deref().map_or(true, str::is_empty);
        if unset {
            self.openai.api_key = key.filter(|k| !k.is_empty());
        }
    }
}

impl SystemConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            send_error_frames: false,
        }
    }
}

impl Default for OpenAIConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            transcription_model: default_transcription_model(),
            chat_model: default_chat_model(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env_from(vars: &[(&str, &str)]) -> Environment {
        let source: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Environment::with_prefix(ENV_PREFIX)
            .separator("__")
            .try_parsing(true)
            .source(Some(source))
    }

    #[test]
    fn defaults_without_file() {
        let config = Config::load_from(Path::new("does-not-exist.yaml"), env_from(&[])).unwrap();
        assert_eq!(config.system_config.host, "0.0.0.0");
        assert_eq!(config.system_config.port, 8000);
        assert!(!config.system_config.send_error_frames);
        assert_eq!(config.openai.base_url, "https://api.openai.com/v1");
        assert_eq!(config.openai.transcription_model, "whisper-1");
        assert_eq!(config.openai.chat_model, "gpt-4");
        assert!(config.openai.api_key.is_none());
    }

    #[test]
    fn yaml_file_then_env_override() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(
            file,
            "{}",
            concat!(
                "system_config:\n",
                "  port: 9100\n",
                "  send_error_frames: true\n",
                "openai:\n",
                "  chat_model: gpt-4o\n",
                "  api_key: from-file",
            )
        )
        .unwrap();

        let config = Config::load_from(
            file.path(),
            env_from(&[("RELAY__SYSTEM_CONFIG__PORT", "9200")]),
        )
        .unwrap();

        assert_eq!(config.system_config.port, 9200);
        assert!(config.system_config.send_error_frames);
        assert_eq!(config.openai.chat_model, "gpt-4o");
        assert_eq!(config.openai.transcription_model, "whisper-1");
        assert_eq!(config.openai.api_key.as_deref(), Some("from-file"));
    }

    #[test]
    fn api_key_fallback_only_fills_missing_key() {
        let mut config = Config::default();
        config.apply_api_key_fallback(Some("sk-env".to_string()));
        assert_eq!(config.openai.api_key.as_deref(), Some("sk-env"));

        config.apply_api_key_fallback(Some("sk-other".to_string()));
        assert_eq!(config.openai.api_key.as_deref(), Some("sk-env"));

        let mut empty = Config::default();
        empty.apply_api_key_fallback(Some(String::new()));
        assert!(empty.openai.api_key.is_none());
    }

    #[test]
    fn debug_output_redacts_api_key() {
        let mut config = OpenAIConfig::default();
        config.api_key = Some("sk-secret".to_string());
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("sk-secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
