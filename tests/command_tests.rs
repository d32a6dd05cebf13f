// Integration tests for the command layer
// Exercises the add/remove commands end to end against a temp manifest;
// commands that shell out to `wp` or hit the network are not covered here.

use std::fs;

use anyhow::Result;
use tempfile::TempDir;
use wp_composer::commands::{item_command, ItemOpts};
use wp_composer::manifest::DependencyKind;

fn opts_for(dir: &TempDir) -> ItemOpts {
    ItemOpts {
        file: Some(dir.path().join("composer.json").display().to_string()),
        ..ItemOpts::default()
    }
}

fn read_manifest(dir: &TempDir) -> Result<serde_json::Value> {
    let content = fs::read_to_string(dir.path().join("composer.json"))?;
    Ok(serde_json::from_str(&content)?)
}

#[test]
fn plugin_add_creates_manifest_with_wildcard() -> Result<()> {
    let dir = TempDir::new()?;
    item_command(
        DependencyKind::Plugin,
        "add",
        &["akismet".to_string()],
        &opts_for(&dir),
    )?;

    let saved = read_manifest(&dir)?;
    assert_eq!(saved["require"]["wpackagist-plugin/akismet"], "*");
    Ok(())
}

#[test]
fn plugin_add_honors_pinned_version_for_single_slug() -> Result<()> {
    let dir = TempDir::new()?;
    let opts = ItemOpts {
        version: Some("5.3".to_string()),
        ..opts_for(&dir)
    };
    item_command(
        DependencyKind::Plugin,
        "add",
        &["akismet".to_string()],
        &opts,
    )?;

    let saved = read_manifest(&dir)?;
    assert_eq!(saved["require"]["wpackagist-plugin/akismet"], "5.3");
    Ok(())
}

#[test]
fn pinned_version_is_ignored_for_multiple_slugs() -> Result<()> {
    let dir = TempDir::new()?;
    let opts = ItemOpts {
        version: Some("5.3".to_string()),
        ..opts_for(&dir)
    };
    item_command(
        DependencyKind::Plugin,
        "add",
        &["akismet".to_string(), "hello-dolly".to_string()],
        &opts,
    )?;

    let saved = read_manifest(&dir)?;
    assert_eq!(saved["require"]["wpackagist-plugin/akismet"], "*");
    assert_eq!(saved["require"]["wpackagist-plugin/hello-dolly"], "*");
    Ok(())
}

#[test]
fn theme_add_with_dev_goes_to_require_dev() -> Result<()> {
    let dir = TempDir::new()?;
    let opts = ItemOpts {
        dev: true,
        ..opts_for(&dir)
    };
    item_command(
        DependencyKind::Theme,
        "add",
        &["twentytwenty".to_string()],
        &opts,
    )?;

    let saved = read_manifest(&dir)?;
    assert_eq!(saved["require-dev"]["wpackagist-theme/twentytwenty"], "*");
    assert!(saved.get("require").is_none());
    Ok(())
}

#[test]
fn remove_drops_entry_from_both_scopes() -> Result<()> {
    let dir = TempDir::new()?;
    fs::write(
        dir.path().join("composer.json"),
        r#"{
            "require": { "wpackagist-plugin/akismet": "5.3", "php": ">=8.1" },
            "require-dev": { "wpackagist-plugin/query-monitor": "*" }
        }"#,
    )?;

    item_command(
        DependencyKind::Plugin,
        "remove",
        &["akismet".to_string(), "query-monitor".to_string()],
        &opts_for(&dir),
    )?;

    let saved = read_manifest(&dir)?;
    assert!(saved["require"].get("wpackagist-plugin/akismet").is_none());
    assert!(saved["require-dev"]
        .get("wpackagist-plugin/query-monitor")
        .is_none());
    // non-WordPress entries are untouched
    assert_eq!(saved["require"]["php"], ">=8.1");
    Ok(())
}

#[test]
fn remove_of_undeclared_slug_is_not_an_error() -> Result<()> {
    let dir = TempDir::new()?;
    fs::write(dir.path().join("composer.json"), r#"{"require":{}}"#)?;

    item_command(
        DependencyKind::Plugin,
        "remove",
        &["akismet".to_string()],
        &opts_for(&dir),
    )?;

    let saved = read_manifest(&dir)?;
    assert_eq!(saved, serde_json::json!({ "require": {} }));
    Ok(())
}

#[test]
fn installer_path_flag_writes_extra_section() -> Result<()> {
    let dir = TempDir::new()?;
    let opts = ItemOpts {
        installer_path: Some("wp-content".to_string()),
        ..opts_for(&dir)
    };
    item_command(
        DependencyKind::Plugin,
        "add",
        &["akismet".to_string()],
        &opts,
    )?;

    let saved = read_manifest(&dir)?;
    assert_eq!(
        saved["extra"]["installer-paths"]["wp-content/plugins/{$name}/"],
        serde_json::json!(["type:wordpress-plugin"])
    );
    assert_eq!(
        saved["extra"]["installer-paths"]["wp-content/themes/{$name}/"],
        serde_json::json!(["type:wordpress-theme"])
    );
    Ok(())
}

// Bulk commands, driven by a stub `wp` script and a canned availability set
#[cfg(unix)]
mod bulk {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use std::path::PathBuf;
    use wp_composer::commands::{bulk_command_with, BulkOpts};
    use wp_composer::config::Config;
    use wp_composer::installer::Installer;
    use wp_composer::manifest::ManifestError;
    use wp_composer::registry::Availability;

    /// Availability check answering from a fixed slug list
    struct KnownSlugs(&'static [&'static str]);

    impl Availability for KnownSlugs {
        fn is_available(&self, _kind: DependencyKind, slug: &str) -> bool {
            self.0.contains(&slug)
        }
    }

    fn write_stub(dir: &TempDir, body: &str) -> Result<PathBuf> {
        let path = dir.path().join("wp");
        fs::write(&path, format!("#!/bin/sh\n{}\n", body))?;
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755))?;
        Ok(path)
    }

    fn stub_installer(dir: &TempDir, body: &str) -> Result<Installer> {
        Ok(Installer::with_binary(
            write_stub(dir, body)?.display().to_string(),
        ))
    }

    fn bulk_opts(dir: &TempDir) -> BulkOpts {
        BulkOpts {
            file: Some(dir.path().join("composer.json").display().to_string()),
            ..BulkOpts::default()
        }
    }

    const TWO_PLUGINS: &str =
        r#"echo '[{"name":"akismet","version":"5.3"},{"name":"custom-inhouse","version":"0.1"}]'"#;

    #[test]
    fn bulk_add_declares_only_registry_known_items() -> Result<()> {
        let dir = TempDir::new()?;
        let installer = stub_installer(&dir, TWO_PLUGINS)?;

        bulk_command_with(
            DependencyKind::Plugin,
            "add",
            &bulk_opts(&dir),
            &Config::default(),
            &installer,
            Some(&KnownSlugs(&["akismet"])),
        )?;

        let saved = read_manifest(&dir)?;
        assert_eq!(saved["require"]["wpackagist-plugin/akismet"], "5.3");
        assert!(saved["require"]
            .get("wpackagist-plugin/custom-inhouse")
            .is_none());
        Ok(())
    }

    #[test]
    fn bulk_add_without_filter_takes_everything_at_latest() -> Result<()> {
        let dir = TempDir::new()?;
        let installer = stub_installer(&dir, TWO_PLUGINS)?;
        let opts = BulkOpts {
            all: true,
            latest: true,
            ..bulk_opts(&dir)
        };

        bulk_command_with(
            DependencyKind::Plugin,
            "add",
            &opts,
            &Config::default(),
            &installer,
            None,
        )?;

        let saved = read_manifest(&dir)?;
        assert_eq!(saved["require"]["wpackagist-plugin/akismet"], "*");
        assert_eq!(saved["require"]["wpackagist-plugin/custom-inhouse"], "*");
        Ok(())
    }

    #[test]
    fn bulk_add_with_empty_listing_still_persists_installer_paths() -> Result<()> {
        let dir = TempDir::new()?;
        let installer = stub_installer(&dir, "echo '[]'")?;
        let opts = BulkOpts {
            installer_path: Some("wp-content".to_string()),
            ..bulk_opts(&dir)
        };

        bulk_command_with(
            DependencyKind::Plugin,
            "add",
            &opts,
            &Config::default(),
            &installer,
            None,
        )?;

        let saved = read_manifest(&dir)?;
        assert_eq!(
            saved["extra"]["installer-paths"]["wp-content/plugins/{$name}/"],
            serde_json::json!(["type:wordpress-plugin"])
        );
        Ok(())
    }

    #[test]
    fn bulk_install_pins_versions_and_skips_foreign_entries() -> Result<()> {
        let dir = TempDir::new()?;
        fs::write(
            dir.path().join("composer.json"),
            r#"{
                "require": { "wpackagist-plugin/akismet": "5.3", "php": ">=8.1" },
                "require-dev": { "wpackagist-plugin/query-monitor": "*" }
            }"#,
        )?;
        let log = dir.path().join("args.log");
        let installer = stub_installer(&dir, &format!(r#"echo "$@" >> {}"#, log.display()))?;

        bulk_command_with(
            DependencyKind::Plugin,
            "install",
            &bulk_opts(&dir),
            &Config::default(),
            &installer,
            None,
        )?;

        let lines: Vec<String> = fs::read_to_string(&log)?.lines().map(String::from).collect();
        assert_eq!(lines, vec!["plugin install akismet --version=5.3"]);
        Ok(())
    }

    #[test]
    fn bulk_install_with_dev_reads_require_dev() -> Result<()> {
        let dir = TempDir::new()?;
        fs::write(
            dir.path().join("composer.json"),
            r#"{
                "require": { "wpackagist-plugin/akismet": "5.3" },
                "require-dev": { "wpackagist-plugin/query-monitor": "*" }
            }"#,
        )?;
        let log = dir.path().join("args.log");
        let installer = stub_installer(&dir, &format!(r#"echo "$@" >> {}"#, log.display()))?;
        let opts = BulkOpts {
            dev: true,
            ..bulk_opts(&dir)
        };

        bulk_command_with(
            DependencyKind::Plugin,
            "install",
            &opts,
            &Config::default(),
            &installer,
            None,
        )?;

        let lines: Vec<String> = fs::read_to_string(&log)?.lines().map(String::from).collect();
        assert_eq!(lines, vec!["plugin install query-monitor"]);
        Ok(())
    }

    #[test]
    fn bulk_install_on_missing_manifest_is_file_not_found() -> Result<()> {
        let dir = TempDir::new()?;
        let installer = stub_installer(&dir, "echo '[]'")?;

        let err = bulk_command_with(
            DependencyKind::Plugin,
            "install",
            &bulk_opts(&dir),
            &Config::default(),
            &installer,
            None,
        )
        .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<ManifestError>(),
            Some(ManifestError::FileNotFound { .. })
        ));
        Ok(())
    }

    #[test]
    fn bulk_uninstall_removes_only_chosen_scope() -> Result<()> {
        let dir = TempDir::new()?;
        fs::write(
            dir.path().join("composer.json"),
            r#"{
                "require": { "wpackagist-plugin/akismet": "5.3" },
                "require-dev": { "wpackagist-plugin/query-monitor": "*" }
            }"#,
        )?;
        let log = dir.path().join("args.log");
        let installer = stub_installer(&dir, &format!(r#"echo "$@" >> {}"#, log.display()))?;
        let opts = BulkOpts {
            dev: true,
            ..bulk_opts(&dir)
        };

        bulk_command_with(
            DependencyKind::Plugin,
            "uninstall",
            &opts,
            &Config::default(),
            &installer,
            None,
        )?;

        let lines: Vec<String> = fs::read_to_string(&log)?.lines().map(String::from).collect();
        assert_eq!(
            lines,
            vec![
                "plugin deactivate query-monitor",
                "plugin uninstall query-monitor"
            ]
        );

        let saved = read_manifest(&dir)?;
        assert_eq!(saved["require"]["wpackagist-plugin/akismet"], "5.3");
        assert!(saved["require-dev"]
            .get("wpackagist-plugin/query-monitor")
            .is_none());
        Ok(())
    }

    #[test]
    fn bulk_uninstall_saves_manifest_before_wp_runs() -> Result<()> {
        let dir = TempDir::new()?;
        fs::write(
            dir.path().join("composer.json"),
            r#"{
                "require": { "wpackagist-plugin/akismet": "5.3" },
                "require-dev": { "wpackagist-plugin/query-monitor": "*" }
            }"#,
        )?;
        let installer = stub_installer(&dir, "echo 'wp exploded' >&2\nexit 1")?;

        let err = bulk_command_with(
            DependencyKind::Plugin,
            "uninstall",
            &bulk_opts(&dir),
            &Config::default(),
            &installer,
            None,
        )
        .unwrap_err();
        assert!(err.to_string().contains("wp exploded"));

        // the dependency is already gone even though `wp` failed
        let saved = read_manifest(&dir)?;
        assert!(saved["require"].get("wpackagist-plugin/akismet").is_none());
        assert_eq!(saved["require-dev"]["wpackagist-plugin/query-monitor"], "*");
        Ok(())
    }
}

#[test]
fn namespaced_name_on_command_line_is_accepted() -> Result<()> {
    let dir = TempDir::new()?;
    item_command(
        DependencyKind::Plugin,
        "add",
        &["wpackagist-plugin/akismet".to_string()],
        &opts_for(&dir),
    )?;

    let saved = read_manifest(&dir)?;
    assert_eq!(saved["require"]["wpackagist-plugin/akismet"], "*");
    Ok(())
}
