//! The composer.json manifest store
//!
//! Loads the manifest into a typed structure, exposes add/remove operations
//! for plugin and theme dependencies in both scopes, and writes the result
//! back. Sections we don't model (name, description, repositories, scripts,
//! ...) are carried through a flattened passthrough map so a save never
//! destroys them.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Version constraint used when none is given: any version.
pub const ANY_VERSION: &str = "*";

/// Errors raised by manifest operations
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("manifest not found at {}", path.display())]
    FileNotFound { path: PathBuf },

    #[error("failed to read manifest at {}", path.display())]
    Read {
        path: PathBuf,
        source: io::Error,
    },

    #[error("{} is not a valid composer manifest", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to write manifest to {}", path.display())]
    Write {
        path: PathBuf,
        source: io::Error,
    },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// Whether a dependency key names a WordPress plugin or a theme.
///
/// Dependencies live in the manifest under a wpackagist-style namespace
/// (`wpackagist-plugin/<slug>`, `wpackagist-theme/<slug>`); the namespace is
/// stripped again before the bare slug is handed to the installer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependencyKind {
    Plugin,
    Theme,
}

impl DependencyKind {
    /// Word used in CLI messages and `wp` subcommands
    pub fn noun(&self) -> &'static str {
        match self {
            DependencyKind::Plugin => "plugin",
            DependencyKind::Theme => "theme",
        }
    }

    pub fn namespace(&self) -> &'static str {
        match self {
            DependencyKind::Plugin => "wpackagist-plugin",
            DependencyKind::Theme => "wpackagist-theme",
        }
    }

    /// Full manifest key for a bare slug
    pub fn namespaced(&self, slug: &str) -> String {
        format!("{}/{}", self.namespace(), slug)
    }

    /// Strip the namespace from a manifest key, returning the bare slug.
    /// Returns `None` when the key belongs to a different namespace.
    pub fn strip<'a>(&self, name: &'a str) -> Option<&'a str> {
        name.strip_prefix(self.namespace())
            .and_then(|rest| rest.strip_prefix('/'))
            .filter(|slug| !slug.is_empty())
    }
}

impl fmt::Display for DependencyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.noun())
    }
}

/// Whether a dependency is a runtime requirement or a dev-only requirement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Normal,
    Dev,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Normal => write!(f, "require"),
            Scope::Dev => write!(f, "require-dev"),
        }
    }
}

/// A composer.json document with typed `require`/`require-dev` sections.
///
/// The sections are `Option` so a section absent from the input stays absent
/// on save, while a section that was present (even if we emptied it) is
/// written back as `{}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub require: Option<BTreeMap<String, String>>,

    #[serde(rename = "require-dev", skip_serializing_if = "Option::is_none")]
    pub require_dev: Option<BTreeMap<String, String>>,

    /// Everything else in the document, round-tripped untouched
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl Manifest {
    /// Read and parse the manifest at `path`.
    ///
    /// A nonexistent file is "no dependencies declared yet" and yields an
    /// empty manifest; invalid JSON is a `ParseError`.
    pub fn load(path: &Path) -> Result<Manifest, ManifestError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Ok(Manifest::default());
            }
            Err(err) => {
                return Err(ManifestError::Read {
                    path: path.to_path_buf(),
                    source: err,
                });
            }
        };

        serde_json::from_str(&content).map_err(|err| ManifestError::Parse {
            path: path.to_path_buf(),
            source: err,
        })
    }

    /// Like [`Manifest::load`], but a missing file is an error.
    ///
    /// Bulk install/uninstall runs read the declared dependencies, so running
    /// them against a manifest that was never written is a user mistake worth
    /// reporting rather than an empty no-op.
    pub fn load_required(path: &Path) -> Result<Manifest, ManifestError> {
        if !path.exists() {
            return Err(ManifestError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        Manifest::load(path)
    }

    /// Serialize and write the manifest back to `path`.
    pub fn save(&self, path: &Path) -> Result<(), ManifestError> {
        let json = serde_json::to_string_pretty(self).map_err(|err| ManifestError::Write {
            path: path.to_path_buf(),
            source: io::Error::other(err),
        })?;

        fs::write(path, json + "\n").map_err(|err| ManifestError::Write {
            path: path.to_path_buf(),
            source: err,
        })
    }

    /// Insert or overwrite `name → version` under `scope`.
    ///
    /// A name lives in at most one scope: adding it here removes it from the
    /// other scope first. An empty version constraint falls back to `"*"`.
    pub fn add_dependency(&mut self, name: &str, version: &str, scope: Scope) {
        let version = if version.trim().is_empty() {
            ANY_VERSION
        } else {
            version
        };

        let (target, opposite) = match scope {
            Scope::Normal => (&mut self.require, &mut self.require_dev),
            Scope::Dev => (&mut self.require_dev, &mut self.require),
        };

        if let Some(map) = opposite.as_mut() {
            map.remove(name);
        }
        target
            .get_or_insert_with(BTreeMap::new)
            .insert(name.to_string(), version.to_string());
    }

    /// Delete `name` from whichever scope holds it. Returns whether anything
    /// was removed; absence from both scopes is a no-op, not an error.
    pub fn remove_dependency(&mut self, name: &str) -> bool {
        let from_require = self
            .require
            .as_mut()
            .is_some_and(|map| map.remove(name).is_some());
        let from_dev = self
            .require_dev
            .as_mut()
            .is_some_and(|map| map.remove(name).is_some());
        from_require || from_dev
    }

    /// Which scope currently declares `name`, if any
    pub fn scope_of(&self, name: &str) -> Option<Scope> {
        if self.require.as_ref().is_some_and(|m| m.contains_key(name)) {
            Some(Scope::Normal)
        } else if self
            .require_dev
            .as_ref()
            .is_some_and(|m| m.contains_key(name))
        {
            Some(Scope::Dev)
        } else {
            None
        }
    }

    /// Iterate the `name → version` entries declared under `scope`
    pub fn entries(&self, scope: Scope) -> impl Iterator<Item = (&String, &String)> {
        let map = match scope {
            Scope::Normal => self.require.as_ref(),
            Scope::Dev => self.require_dev.as_ref(),
        };
        map.into_iter().flat_map(|m| m.iter())
    }

    /// Write Composer installer-paths entries into the `extra` section so
    /// wordpress-plugin/wordpress-theme packages install under `base`.
    ///
    /// Other keys already present in `extra` are kept; if `extra` exists but
    /// is not an object we leave it alone rather than clobber user data.
    pub fn set_installer_path(&mut self, base: &str) {
        let base = base.trim_end_matches('/');

        let extra = self
            .other
            .entry("extra".to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        let Value::Object(extra) = extra else {
            return;
        };

        let paths = extra
            .entry("installer-paths".to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        let Value::Object(paths) = paths else {
            return;
        };

        paths.insert(
            format!("{}/plugins/{{$name}}/", base),
            serde_json::json!(["type:wordpress-plugin"]),
        );
        paths.insert(
            format!("{}/themes/{{$name}}/", base),
            serde_json::json!(["type:wordpress-theme"]),
        );
    }
}
