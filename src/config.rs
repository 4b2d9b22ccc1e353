//! API token configuration.
//!
//! Tokens are resolved once at startup and passed down by reference. For each
//! token the first non-blank value wins, in this order:
//!
//! 1. explicit override (CLI flag)
//! 2. secrets file (`secrets.toml`, flat `KEY = "value"` entries)
//! 3. environment (`.env` is loaded first via `dotenvy`)
//! 4. unset

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::AppError;

pub const BANXICO_TOKEN: &str = "BANXICO_TOKEN";
pub const INEGI_TOKEN: &str = "INEGI_TOKEN";
pub const FRED_API_KEY: &str = "FRED_API_KEY";

const DEFAULT_SECRETS_FILE: &str = "secrets.toml";

/// Where a token value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TokenSource {
    Override,
    SecretsFile,
    Environment,
    Unset,
}

impl TokenSource {
    pub fn label(self) -> &'static str {
        match self {
            TokenSource::Override => "command line",
            TokenSource::SecretsFile => "secrets file",
            TokenSource::Environment => "environment",
            TokenSource::Unset => "not set",
        }
    }
}

/// A resolved API token. `Debug` never shows the value.
#[derive(Clone, PartialEq, Eq)]
pub struct Token {
    value: Option<String>,
    source: TokenSource,
}

impl Token {
    pub fn unset() -> Self {
        Self {
            value: None,
            source: TokenSource::Unset,
        }
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn source(&self) -> TokenSource {
        self.source
    }

    pub fn is_set(&self) -> bool {
        self.value.is_some()
    }

    /// The token value, or a configuration error naming `key`.
    pub fn require(&self, key: &str) -> Result<&str, AppError> {
        self.value().ok_or_else(|| {
            AppError::config(format!(
                "Missing {key}: pass it on the command line, in {DEFAULT_SECRETS_FILE}, or in the environment (.env)."
            ))
        })
    }
}

impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Token")
            .field("value", &self.value.as_ref().map(|_| "<redacted>"))
            .field("source", &self.source)
            .finish()
    }
}

/// Token values given explicitly on the command line.
#[derive(Debug, Clone, Default)]
pub struct TokenOverrides {
    pub banxico: Option<String>,
    pub inegi: Option<String>,
    pub fred: Option<String>,
}

/// Resolved configuration for a run.
#[derive(Debug, Clone)]
pub struct Settings {
    pub banxico: Token,
    pub inegi: Token,
    pub fred: Token,
    /// Secrets file that was read, if any.
    pub secrets_path: Option<PathBuf>,
}

impl Settings {
    /// Resolve settings from overrides, the secrets file, and the process environment.
    ///
    /// `secrets` names an explicit secrets file (which must exist); without it,
    /// `secrets.toml` in the working directory is used when present.
    pub fn load(overrides: &TokenOverrides, secrets: Option<&Path>) -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let (secrets_path, table) = match secrets {
            Some(path) => (Some(path.to_path_buf()), read_secrets_file(path)?),
            None => {
                let default = PathBuf::from(DEFAULT_SECRETS_FILE);
                if default.is_file() {
                    let table = read_secrets_file(&default)?;
                    (Some(default), table)
                } else {
                    (None, HashMap::new())
                }
            }
        };

        let mut settings = Self::resolve(overrides, &table, |key| std::env::var(key).ok());
        settings.secrets_path = secrets_path;
        Ok(settings)
    }

    /// Where file-based tokens came from, for the `status` output.
    pub fn secrets_label(&self) -> String {
        match &self.secrets_path {
            Some(path) => path.display().to_string(),
            None => "none".to_string(),
        }
    }

    /// Pure precedence resolution; `env` looks up an environment variable.
    pub fn resolve(
        overrides: &TokenOverrides,
        secrets: &HashMap<String, String>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let pick = |key: &str, explicit: Option<&String>| -> Token {
            let candidates = [
                (explicit.cloned(), TokenSource::Override),
                (secrets.get(key).cloned(), TokenSource::SecretsFile),
                (env(key), TokenSource::Environment),
            ];
            candidates
                .into_iter()
                .find_map(|(value, source)| {
                    let value = value?.trim().to_string();
                    (!value.is_empty()).then_some(Token {
                        value: Some(value),
                        source,
                    })
                })
                .unwrap_or_else(Token::unset)
        };

        Self {
            banxico: pick(BANXICO_TOKEN, overrides.banxico.as_ref()),
            inegi: pick(INEGI_TOKEN, overrides.inegi.as_ref()),
            fred: pick(FRED_API_KEY, overrides.fred.as_ref()),
            secrets_path: None,
        }
    }
}

/// Parse a secrets file into its string entries.
pub fn read_secrets_file(path: &Path) -> Result<HashMap<String, String>, AppError> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        AppError::config(format!("Failed to read secrets file '{}': {e}", path.display()))
    })?;
    parse_secrets(&text)
        .map_err(|e| AppError::config(format!("Invalid secrets file '{}': {e}", path.display())))
}

fn parse_secrets(text: &str) -> Result<HashMap<String, String>, toml::de::Error> {
    let table: toml::Table = text.parse()?;
    Ok(table
        .into_iter()
        .filter_map(|(k, v)| match v {
            toml::Value::String(s) => Some((k, s)),
            _ => None,
        })
        .collect())
}
