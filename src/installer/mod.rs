//! Bridge to the host `wp` CLI
//!
//! Installing, uninstalling, and listing plugins/themes is delegated to the
//! pre-existing `wp` commands; we only pass slugs in and parse listings out.

use std::process::Command;

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;

use crate::manifest::DependencyKind;

/// Constraints that wordpress.org has no release for; all of them mean
/// "install whatever is current", so the version flag is omitted.
const LATEST_ALIASES: [&str; 5] = ["*", "dev-trunk", "dev-master", "master", "dev"];

pub fn is_latest_alias(version: &str) -> bool {
    LATEST_ALIASES.contains(&version)
}

/// One row of `wp plugin list` / `wp theme list` output
#[derive(Debug, Clone, Deserialize)]
pub struct InstalledItem {
    pub name: String,
    pub version: String,
}

/// Runs `wp` subcommands for install/uninstall/list operations
pub struct Installer {
    wp_bin: String,
}

impl Default for Installer {
    fn default() -> Self {
        Self::new()
    }
}

impl Installer {
    pub fn new() -> Self {
        Self {
            wp_bin: "wp".to_string(),
        }
    }

    /// Use a different `wp` binary (tests point this at a stub script)
    pub fn with_binary(wp_bin: impl Into<String>) -> Self {
        Self {
            wp_bin: wp_bin.into(),
        }
    }

    /// List currently installed plugins or themes
    pub fn list(&self, kind: DependencyKind) -> Result<Vec<InstalledItem>> {
        let stdout = self.run(&[
            kind.noun(),
            "list",
            "--format=json",
            "--fields=name,version",
        ])?;
        parse_list_output(&stdout)
            .with_context(|| format!("failed to parse `wp {} list` output", kind.noun()))
    }

    /// Install one plugin or theme at the given version constraint.
    ///
    /// Wildcard and branch-alias constraints install the latest release.
    pub fn install(&self, kind: DependencyKind, slug: &str, version: &str) -> Result<()> {
        let mut args = vec![kind.noun(), "install", slug];
        let version_flag;
        if !is_latest_alias(version) {
            version_flag = format!("--version={}", version);
            args.push(&version_flag);
        }
        self.run(&args)?;
        Ok(())
    }

    /// Uninstall one plugin (deactivating it first) or delete one theme
    pub fn uninstall(&self, kind: DependencyKind, slug: &str) -> Result<()> {
        match kind {
            DependencyKind::Plugin => {
                self.run(&["plugin", "deactivate", slug])?;
                self.run(&["plugin", "uninstall", slug])?;
            }
            DependencyKind::Theme => {
                self.run(&["theme", "delete", slug])?;
            }
        }
        Ok(())
    }

    fn run(&self, args: &[&str]) -> Result<String> {
        let output = Command::new(&self.wp_bin)
            .args(args)
            .output()
            .with_context(|| format!("failed to run `{} {}`", self.wp_bin, args.join(" ")))?;

        if !output.status.success() {
            return Err(anyhow!(
                "`{} {}` failed: {}",
                self.wp_bin,
                args.join(" "),
                String::from_utf8_lossy(&output.stderr).trim()
            ));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

fn parse_list_output(stdout: &str) -> Result<Vec<InstalledItem>> {
    let trimmed = stdout.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_str(trimmed)?)
}
