//! wordpress.org availability lookups
//!
//! Decides whether a plugin or theme slug is addressable by name on the
//! public registry. Used to filter bulk adds; a lookup failure degrades to
//! "not available" instead of aborting the surrounding command.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::manifest::DependencyKind;

/// Registry endpoints, overridable through config
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Base URL of the plugin information API
    pub plugin_api_base: String,

    /// Base URL of the theme information API
    pub theme_api_base: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            plugin_api_base: "https://api.wordpress.org/plugins/info/1.0".to_string(),
            theme_api_base: "https://api.wordpress.org/themes/info/1.1".to_string(),
        }
    }
}

/// Errors from a single availability lookup
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("registry request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("registry returned status {0}")]
    Status(reqwest::StatusCode),
}

/// Client for the wordpress.org information APIs
pub struct RegistryClient {
    config: RegistryConfig,
    client: reqwest::blocking::Client,
}

/// Availability check seam.
///
/// Bulk commands take this as a parameter instead of constructing a client
/// themselves, so they can be exercised against a canned answer set without
/// network access.
pub trait Availability {
    /// Whether `slug` is publicly addressable by name
    fn is_available(&self, kind: DependencyKind, slug: &str) -> bool;
}

impl Availability for RegistryClient {
    /// Transport and decode failures are reported as a warning and treated
    /// as "not available": the check only filters what gets declared, it is
    /// not a correctness condition for the manifest mutation.
    fn is_available(&self, kind: DependencyKind, slug: &str) -> bool {
        match self.lookup(kind, slug) {
            Ok(hit) => hit,
            Err(err) => {
                eprintln!(
                    "Warning: registry lookup for {} '{}' failed: {}",
                    kind, slug, err
                );
                false
            }
        }
    }
}

impl RegistryClient {
    pub fn new() -> Result<Self> {
        Self::with_config(RegistryConfig::default())
    }

    pub fn with_config(config: RegistryConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent("wp-composer/0.1.0")
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { config, client })
    }

    fn lookup(&self, kind: DependencyKind, slug: &str) -> Result<bool, RegistryError> {
        let url = self.lookup_url(kind, slug);
        let response = self.client.get(&url).send()?;

        if !response.status().is_success() {
            return Err(RegistryError::Status(response.status()));
        }

        let body: Value = response.json()?;
        Ok(body_indicates_hit(&body))
    }

    fn lookup_url(&self, kind: DependencyKind, slug: &str) -> String {
        match kind {
            DependencyKind::Plugin => {
                format!("{}/{}.json", self.config.plugin_api_base, slug)
            }
            DependencyKind::Theme => format!(
                "{}/?action=theme_information&request[slug]={}",
                self.config.theme_api_base, slug
            ),
        }
    }
}

/// The information APIs answer misses with HTTP 200 and a `null` (plugins)
/// or `false` (themes) body, or an object carrying an `error` field.
fn body_indicates_hit(body: &Value) -> bool {
    match body {
        Value::Null => false,
        Value::Bool(hit) => *hit,
        Value::Object(fields) => !fields.contains_key("error"),
        _ => false,
    }
}
