//! CLI commands for wp-composer
//!
//! Every command is a fresh load → mutate → save cycle on an explicitly
//! chosen manifest file; nothing is carried between invocations. Bulk
//! commands receive the installer and the registry availability check as
//! parameters so the `wp` binary and the network can both be substituted.

use std::path::PathBuf;

use anyhow::Result;

use crate::config::{load_config, Config};
use crate::installer::Installer;
use crate::manifest::{DependencyKind, Manifest, ManifestError, Scope, ANY_VERSION};
use crate::registry::{Availability, RegistryClient};

/// Flags shared by the single-slug `plugin`/`theme` commands
#[derive(Debug, Clone, Default)]
pub struct ItemOpts {
    /// Manifest path override (`--file`)
    pub file: Option<String>,
    /// Explicit version constraint; honored only for a single slug
    pub version: Option<String>,
    /// Force the wildcard constraint
    pub latest: bool,
    /// Declare under require-dev instead of require
    pub dev: bool,
    /// Base directory for `extra.installer-paths`
    pub installer_path: Option<String>,
}

/// Flags shared by the bulk `plugins`/`themes`/`add` commands
#[derive(Debug, Clone, Default)]
pub struct BulkOpts {
    pub file: Option<String>,
    /// Also add items the registry doesn't know about
    pub all: bool,
    /// Declare the wildcard constraint instead of installed versions
    pub latest: bool,
    /// Operate on the require-dev scope (install/uninstall actions)
    pub dev: bool,
    pub installer_path: Option<String>,
}

/// Dispatch for `wp-composer plugin <action>` and `wp-composer theme <action>`
pub fn item_command(
    kind: DependencyKind,
    action: &str,
    slugs: &[String],
    opts: &ItemOpts,
) -> Result<()> {
    if slugs.is_empty() {
        return Err(
            ManifestError::InvalidArgument(format!("no {} slug given", kind)).into(),
        );
    }

    match action {
        "add" => add_items(kind, slugs, opts),
        "remove" => remove_items(kind, slugs, opts),
        other => {
            Err(ManifestError::InvalidArgument(format!("{} is not a valid action", other)).into())
        }
    }
}

/// Dispatch for `wp-composer plugins <action>` and `wp-composer themes <action>`
pub fn bulk_command(kind: DependencyKind, action: &str, opts: &BulkOpts) -> Result<()> {
    let config = load_config()?;
    let installer = Installer::new();
    let registry = registry_filter(&config, opts)?;
    bulk_command_with(
        kind,
        action,
        opts,
        &config,
        &installer,
        availability(&registry),
    )
}

/// [`bulk_command`] with the collaborators supplied by the caller
pub fn bulk_command_with(
    kind: DependencyKind,
    action: &str,
    opts: &BulkOpts,
    config: &Config,
    installer: &Installer,
    registry: Option<&dyn Availability>,
) -> Result<()> {
    match action {
        "add" => add_installed(kind, opts, config, installer, registry),
        "install" => install_declared(kind, opts, config, installer),
        "uninstall" => uninstall_declared(kind, opts, config, installer),
        other => {
            Err(ManifestError::InvalidArgument(format!("{} is not a valid action", other)).into())
        }
    }
}

/// `wp-composer add`: declare every installed plugin and theme
pub fn add_all(opts: &BulkOpts) -> Result<()> {
    let config = load_config()?;
    let installer = Installer::new();
    let registry = registry_filter(&config, opts)?;

    add_installed(
        DependencyKind::Plugin,
        opts,
        &config,
        &installer,
        availability(&registry),
    )?;
    add_installed(
        DependencyKind::Theme,
        opts,
        &config,
        &installer,
        availability(&registry),
    )
}

/// No registry client means no filtering, which is what `--all` asks for
fn registry_filter(config: &Config, opts: &BulkOpts) -> Result<Option<RegistryClient>> {
    if opts.all {
        Ok(None)
    } else {
        Ok(Some(RegistryClient::with_config(config.registry.clone())?))
    }
}

fn availability(registry: &Option<RegistryClient>) -> Option<&dyn Availability> {
    registry.as_ref().map(|client| client as &dyn Availability)
}

/// Declare one or more slugs in the manifest
fn add_items(kind: DependencyKind, slugs: &[String], opts: &ItemOpts) -> Result<()> {
    let config = load_config()?;
    let path = manifest_path(opts.file.as_deref(), &config);
    let mut manifest = Manifest::load(&path)?;

    apply_installer_path(&mut manifest, opts.installer_path.as_deref(), &config);

    // A pinned version only makes sense for a single slug; several slugs
    // rarely share one version number.
    let version = if opts.latest {
        ANY_VERSION
    } else {
        match opts.version.as_deref() {
            Some(version) if slugs.len() == 1 => version,
            _ => ANY_VERSION,
        }
    };
    let scope = if opts.dev { Scope::Dev } else { Scope::Normal };

    for slug in slugs {
        let slug = bare_slug(kind, slug);
        println!("Adding {} {}. Using version {}", kind, slug, version);
        manifest.add_dependency(&kind.namespaced(slug), version, scope);
    }

    manifest.save(&path)?;

    let listed = slugs.join(", ");
    if opts.dev {
        println!(
            "✓ Saved {} {} as a dev dependency to {}",
            listed,
            kind,
            path.display()
        );
    } else {
        println!(
            "✓ Saved {} {} as a dependency to {}",
            listed,
            kind,
            path.display()
        );
    }
    Ok(())
}

/// Drop one or more slugs from the manifest, whichever scope holds them
fn remove_items(kind: DependencyKind, slugs: &[String], opts: &ItemOpts) -> Result<()> {
    let config = load_config()?;
    let path = manifest_path(opts.file.as_deref(), &config);
    let mut manifest = Manifest::load(&path)?;

    let mut removed = Vec::new();
    for slug in slugs {
        let slug = bare_slug(kind, slug);
        let name = kind.namespaced(slug);
        match manifest.scope_of(&name) {
            Some(scope) => {
                println!("Removing {} {} from {}", kind, slug, scope);
                manifest.remove_dependency(&name);
                removed.push(slug);
            }
            None => println!("{} was not declared in {}", slug, path.display()),
        }
    }

    manifest.save(&path)?;

    if removed.is_empty() {
        println!(
            "No {} dependencies were removed from {}",
            kind,
            path.display()
        );
    } else {
        println!(
            "✓ Removed {} {} dependency from {}",
            removed.join(", "),
            kind,
            path.display()
        );
    }
    Ok(())
}

/// Declare everything `wp <kind> list` reports as installed.
///
/// With a registry check in place, only items it knows about are added so
/// the resulting manifest stays installable by name.
fn add_installed(
    kind: DependencyKind,
    opts: &BulkOpts,
    config: &Config,
    installer: &Installer,
    registry: Option<&dyn Availability>,
) -> Result<()> {
    let path = manifest_path(opts.file.as_deref(), config);
    let mut manifest = Manifest::load(&path)?;

    let paths_changed = apply_installer_path(&mut manifest, opts.installer_path.as_deref(), config);

    let installed = installer.list(kind)?;

    let mut added = Vec::new();
    for item in installed {
        if let Some(registry) = registry {
            if !registry.is_available(kind, &item.name) {
                continue;
            }
        }

        let version = if opts.latest {
            ANY_VERSION
        } else {
            item.version.as_str()
        };
        println!("Adding {} {}. Using version {}", kind, item.name, version);
        manifest.add_dependency(&kind.namespaced(&item.name), version, Scope::Normal);
        added.push(item.name);
    }

    if added.is_empty() {
        // an --installer-path given alongside an empty listing still counts
        if paths_changed {
            manifest.save(&path)?;
        }
        println!("No {}s to add to {}", kind, path.display());
        return Ok(());
    }

    manifest.save(&path)?;
    println!(
        "✓ Saved {} {} dependencies to {}",
        added.join(", "),
        kind,
        path.display()
    );
    Ok(())
}

/// Install everything declared in the chosen scope of the manifest
fn install_declared(
    kind: DependencyKind,
    opts: &BulkOpts,
    config: &Config,
    installer: &Installer,
) -> Result<()> {
    let path = manifest_path(opts.file.as_deref(), config);
    let manifest = Manifest::load_required(&path)?;

    let scope = if opts.dev { Scope::Dev } else { Scope::Normal };

    let mut installed = Vec::new();
    for (name, version) in manifest.entries(scope) {
        if let Some(slug) = kind.strip(name) {
            println!("Installing {} {} ({})", kind, slug, version);
            installer.install(kind, slug, version)?;
            installed.push(slug.to_string());
        }
    }

    if installed.is_empty() {
        println!(
            "No {} dependencies declared under {} in {}",
            kind,
            scope,
            path.display()
        );
        return Ok(());
    }

    println!(
        "✓ Installed {} {} found in {}",
        installed.join(", "),
        kind,
        path.display()
    );
    Ok(())
}

/// Uninstall everything declared in the chosen scope and drop it from the
/// manifest. The manifest is saved before the uninstall commands run, so a
/// failing `wp` invocation never leaves manifest mutations unpersisted.
fn uninstall_declared(
    kind: DependencyKind,
    opts: &BulkOpts,
    config: &Config,
    installer: &Installer,
) -> Result<()> {
    let path = manifest_path(opts.file.as_deref(), config);
    let mut manifest = Manifest::load_required(&path)?;

    let scope = if opts.dev { Scope::Dev } else { Scope::Normal };
    let declared: Vec<String> = manifest
        .entries(scope)
        .filter_map(|(name, _)| kind.strip(name).map(str::to_string))
        .collect();

    if declared.is_empty() {
        println!(
            "No {} dependencies declared under {} in {}",
            kind,
            scope,
            path.display()
        );
        return Ok(());
    }

    for slug in &declared {
        manifest.remove_dependency(&kind.namespaced(slug));
    }
    manifest.save(&path)?;

    for slug in &declared {
        println!("Uninstalling {} {}", kind, slug);
        installer.uninstall(kind, slug)?;
    }

    println!(
        "✓ Uninstalled {} and removed the {} dependencies from {}",
        declared.join(", "),
        kind,
        path.display()
    );
    Ok(())
}

/// Resolve the manifest path: `--file` wins, otherwise the configured default
fn manifest_path(file: Option<&str>, config: &Config) -> PathBuf {
    PathBuf::from(file.unwrap_or(&config.manifest_file))
}

fn apply_installer_path(manifest: &mut Manifest, flag: Option<&str>, config: &Config) -> bool {
    if let Some(base) = flag.or(config.installer_path.as_deref()) {
        manifest.set_installer_path(base);
        true
    } else {
        false
    }
}

/// Accept already-namespaced names on the command line too
fn bare_slug<'a>(kind: DependencyKind, raw: &'a str) -> &'a str {
    kind.strip(raw).unwrap_or(raw)
}
