use crate::error::{ReportError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_CLIENT_NAME: &str = "Team Wendy";
pub const DEFAULT_STEP_ENDPOINT: &str = "http://localhost:3000/api/ai-agent";
pub const DEFAULT_CHAT_ENDPOINT: &str = "http://localhost:3000/api/chat";
pub const DEFAULT_MODEL: &str = "gpt-4o";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_STORE_DIR: &str = ".report-store";

/// Runtime settings for a report session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Company every generated section is written for.
    pub client_name: String,
    pub step_endpoint: String,
    pub chat_endpoint: String,
    /// When set, completions go straight to the OpenAI API instead of the endpoints.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub store_dir: PathBuf,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            client_name: DEFAULT_CLIENT_NAME.to_string(),
            step_endpoint: DEFAULT_STEP_ENDPOINT.to_string(),
            chat_endpoint: DEFAULT_CHAT_ENDPOINT.to_string(),
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            store_dir: PathBuf::from(DEFAULT_STORE_DIR),
        }
    }
}

impl ReportConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key/value source. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        let temperature = match get("REPORT_TEMPERATURE") {
            Some(raw) => parse_temperature(&raw)?,
            None => defaults.temperature,
        };

        Ok(Self {
            client_name: get("REPORT_CLIENT_NAME").unwrap_or(defaults.client_name),
            step_endpoint: get("REPORT_STEP_ENDPOINT").unwrap_or(defaults.step_endpoint),
            chat_endpoint: get("REPORT_CHAT_ENDPOINT").unwrap_or(defaults.chat_endpoint),
            api_key: get("OPENAI_API_KEY"),
            model: get("REPORT_MODEL").unwrap_or(defaults.model),
            temperature,
            store_dir: get("REPORT_STORE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.store_dir),
        })
    }
}

fn parse_temperature(raw: &str) -> Result<f32> {
    let value: f32 = raw.parse().map_err(|_| {
        ReportError::Config(format!("REPORT_TEMPERATURE must be a number, got '{}'", raw))
    })?;
    if !(0.0..=2.0).contains(&value) {
        return Err(ReportError::Config(format!(
            "REPORT_TEMPERATURE must be between 0 and 2, got {}",
            value
        )));
    }
    Ok(value)
}
