// AI provider secrets and diagnostics
//
// API keys are stored securely using:
// 1. System keychain (preferred)
// 2. Environment variables (fallback for CI/headless)
//
// Keys are NEVER stored in settings.toml

use std::env;

use crate::settings::{EnrichSettings, ProviderKind};

/// Service name for keychain storage
const KEYCHAIN_SERVICE: &str = "tabula";

/// Source of an API key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySource {
    /// Key retrieved from system keychain
    Keychain,
    /// Key retrieved from environment variable
    Environment,
    /// No key found
    None,
}

impl KeySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeySource::Keychain => "keychain",
            KeySource::Environment => "environment",
            KeySource::None => "none",
        }
    }
}

/// Result of key lookup
#[derive(Debug, Clone)]
pub struct KeyLookup {
    pub key: Option<String>,
    pub source: KeySource,
}

/// Get the environment variable name for a provider
pub fn env_var_name(provider: &str) -> String {
    format!("TABULA_{}_KEY", provider.to_uppercase())
}

/// Get the keychain account name for a provider
fn keychain_account(provider: &str) -> String {
    format!("ai/{}", provider.to_lowercase())
}

/// Get an API key for the specified provider
///
/// Checks in order:
/// 1. System keychain
/// 2. Environment variable (TABULA_OPENAI_KEY, etc.)
pub fn get_api_key(provider: &str) -> KeyLookup {
    // Try keychain first
    #[cfg(feature = "keychain")]
    {
        if let Ok(entry) = keyring::Entry::new(KEYCHAIN_SERVICE, &keychain_account(provider)) {
            if let Ok(key) = entry.get_password() {
                return KeyLookup {
                    key: Some(key),
                    source: KeySource::Keychain,
                };
            }
        }
    }

    // Fall back to environment variable
    let env_name = env_var_name(provider);
    if let Ok(key) = env::var(&env_name) {
        if !key.is_empty() {
            return KeyLookup {
                key: Some(key),
                source: KeySource::Environment,
            };
        }
    }

    KeyLookup {
        key: None,
        source: KeySource::None,
    }
}

/// Store an API key in the system keychain
#[cfg(feature = "keychain")]
pub fn set_api_key(provider: &str, key: &str) -> Result<(), String> {
    let entry = keyring::Entry::new(KEYCHAIN_SERVICE, &keychain_account(provider))
        .map_err(|e| format!("Failed to create keychain entry: {}", e))?;

    entry
        .set_password(key)
        .map_err(|e| format!("Failed to store key in keychain: {}", e))
}

#[cfg(not(feature = "keychain"))]
pub fn set_api_key(_provider: &str, _key: &str) -> Result<(), String> {
    Err("Keychain support not enabled. Set TABULA_<PROVIDER>_KEY environment variable instead.".to_string())
}

/// Delete an API key from the system keychain
#[cfg(feature = "keychain")]
pub fn delete_api_key(provider: &str) -> Result<(), String> {
    let entry = keyring::Entry::new(KEYCHAIN_SERVICE, &keychain_account(provider))
        .map_err(|e| format!("Failed to access keychain entry: {}", e))?;

    entry
        .delete_credential()
        .map_err(|e| format!("Failed to delete key from keychain: {}", e))
}

#[cfg(not(feature = "keychain"))]
pub fn delete_api_key(_provider: &str) -> Result<(), String> {
    Err("Keychain support not enabled.".to_string())
}

/// Check if keychain support is available
pub fn keychain_available() -> bool {
    #[cfg(feature = "keychain")]
    {
        keyring::Entry::new(KEYCHAIN_SERVICE, "test").is_ok()
    }
    #[cfg(not(feature = "keychain"))]
    {
        false
    }
}

// ============================================================================
// Diagnostics (for CLI doctor and debugging)
// ============================================================================

/// Per-provider diagnostic row
#[derive(Debug)]
pub struct ProviderDiagnostics {
    pub provider: ProviderKind,
    pub model: String,
    pub key_present: bool,
    pub key_source: KeySource,
}

/// Diagnostic information about enrichment configuration
#[derive(Debug)]
pub struct EnrichDiagnostics {
    pub providers: Vec<ProviderDiagnostics>,
    pub keychain_available: bool,
}

impl EnrichDiagnostics {
    pub fn from_settings(settings: &EnrichSettings) -> Self {
        let providers = settings
            .providers
            .iter()
            .map(|&provider| {
                let lookup = get_api_key(provider.name());
                ProviderDiagnostics {
                    provider,
                    model: settings.model_for(provider).to_string(),
                    key_present: lookup.key.is_some(),
                    key_source: lookup.source,
                }
            })
            .collect();

        Self {
            providers,
            keychain_available: keychain_available(),
        }
    }

    /// True when at least one ranked provider has a usable key.
    pub fn any_ready(&self) -> bool {
        self.providers.iter().any(|p| p.key_present)
    }
}

impl std::fmt::Display for EnrichDiagnostics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Enrichment Configuration")?;
        writeln!(f, "──────────────────────────────")?;
        writeln!(
            f,
            "Keychain available: {}",
            if self.keychain_available { "yes" } else { "no" }
        )?;
        for (rank, p) in self.providers.iter().enumerate() {
            writeln!(f, "Provider {}:         {}", rank + 1, p.provider.name())?;
            writeln!(f, "  Model:            {}", p.model)?;
            writeln!(
                f,
                "  Key present:      {}",
                if p.key_present { "yes" } else { "no" }
            )?;
            writeln!(f, "  Key source:       {}", p.key_source.as_str())?;
            if !p.key_present {
                writeln!(
                    f,
                    "  Hint:             set via keychain or {}",
                    env_var_name(p.provider.name())
                )?;
            }
        }
        Ok(())
    }
}
