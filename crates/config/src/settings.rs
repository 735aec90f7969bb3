// Application settings, stored as TOML in the user config directory.
//
// API keys are NEVER stored here; see ai.rs for keychain/env lookup.

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// An enrichment provider kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    OpenAi,
    Anthropic,
}

impl ProviderKind {
    /// Lowercase name, used for key lookup and CLI output.
    pub fn name(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Anthropic => "anthropic",
        }
    }

    /// Returns the default model for this provider
    pub fn default_model(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "gpt-4.1-mini",
            ProviderKind::Anthropic => "claude-sonnet-4-20250514",
        }
    }

    pub fn needs_api_key(&self) -> bool {
        true
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "openai" => Ok(ProviderKind::OpenAi),
            "anthropic" => Ok(ProviderKind::Anthropic),
            other => Err(format!("unknown provider: {other}")),
        }
    }
}

/// Enrichment-specific settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrichSettings {
    /// Providers in fallback order: the first is tried first, each later
    /// entry only after the previous one failed or returned invalid output.
    pub providers: Vec<ProviderKind>,

    /// Model identifier for the OpenAI provider (empty = provider default)
    pub openai_model: String,

    /// Model identifier for the Anthropic provider (empty = provider default)
    pub anthropic_model: String,
}

impl Default for EnrichSettings {
    fn default() -> Self {
        Self {
            providers: vec![ProviderKind::OpenAi, ProviderKind::Anthropic],
            openai_model: String::new(),
            anthropic_model: String::new(),
        }
    }
}

impl EnrichSettings {
    /// Effective model for a provider: the configured one, or its default.
    pub fn model_for(&self, provider: ProviderKind) -> &str {
        let configured = match provider {
            ProviderKind::OpenAi => &self.openai_model,
            ProviderKind::Anthropic => &self.anthropic_model,
        };
        if configured.is_empty() {
            provider.default_model()
        } else {
            configured
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub enrich: EnrichSettings,
}

impl Settings {
    pub fn path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("tabula")
            .join("settings.toml")
    }

    /// Load settings, falling back to defaults on missing or malformed file.
    pub fn load() -> Self {
        Self::load_from(&Self::path())
    }

    pub fn load_from(path: &PathBuf) -> Self {
        fs::read_to_string(path)
            .ok()
            .and_then(|s| toml::from_str(&s).ok())
            .unwrap_or_default()
    }

    pub fn save(&self) -> Result<(), String> {
        self.save_to(&Self::path())
    }

    pub fn save_to(&self, path: &PathBuf) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }
        let toml = toml::to_string_pretty(self).map_err(|e| e.to_string())?;
        fs::write(path, toml).map_err(|e| e.to_string())
    }
}
