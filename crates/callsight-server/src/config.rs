//! Server configuration
//!
//! Read once at startup from Shuttle secrets. Every key except
//! `GEMINI_API_KEY` has a default.

use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::adapters::gemini::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::application::{GatewayConfig, DEFAULT_QUEUE_CAPACITY};

const DEFAULT_EXAMPLE_PROMPT_IDS: &[i64] = &[1, 2];
const DEFAULT_MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub gateway: GatewayConfig,
    pub example_prompt_ids: Vec<i64>,
    pub prompt_queue_capacity: usize,
    pub max_upload_bytes: usize,
}

impl AppConfig {
    /// Build the config from a key lookup (e.g. `|k| secrets.get(k)`).
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let gemini_api_key = get("GEMINI_API_KEY").context("GEMINI_API_KEY is not set")?;
        let defaults = GatewayConfig::default();

        let gateway = GatewayConfig {
            max_attempts: parse_or(&get, "GATEWAY_MAX_ATTEMPTS", defaults.max_attempts)?,
            backoff_base: Duration::from_millis(parse_or(
                &get,
                "GATEWAY_BACKOFF_BASE_MS",
                defaults.backoff_base.as_millis() as u64,
            )?),
            inference_timeout: Duration::from_secs(parse_or(
                &get,
                "INFERENCE_TIMEOUT_SECS",
                defaults.inference_timeout.as_secs(),
            )?),
            storage_timeout: Duration::from_secs(parse_or(
                &get,
                "STORAGE_TIMEOUT_SECS",
                defaults.storage_timeout.as_secs(),
            )?),
        };

        let example_prompt_ids = match get("EXAMPLE_PROMPT_IDS") {
            Some(raw) => raw
                .split(',')
                .map(|id| id.trim().parse::<i64>())
                .collect::<Result<Vec<_>, _>>()
                .with_context(|| format!("EXAMPLE_PROMPT_IDS is not a list of ids: {:?}", raw))?,
            None => DEFAULT_EXAMPLE_PROMPT_IDS.to_vec(),
        };

        Ok(Self {
            gemini_api_key,
            gemini_model: get("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            gemini_base_url: get("GEMINI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            gateway,
            example_prompt_ids,
            prompt_queue_capacity: parse_or(&get, "PROMPT_QUEUE_CAPACITY", DEFAULT_QUEUE_CAPACITY)?,
            max_upload_bytes: parse_or(&get, "MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
        })
    }
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw
            .parse()
            .with_context(|| format!("{} has an invalid value: {:?}", key, raw)),
        None => Ok(default),
    }
}
