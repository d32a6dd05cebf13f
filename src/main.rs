//! wp-composer - keep WordPress plugins and themes in sync with composer.json

mod commands;
mod config;
mod installer;
mod manifest;
mod registry;

use clap::{Args, Parser, Subcommand};

use commands::{BulkOpts, ItemOpts};
use manifest::DependencyKind;

#[derive(Parser)]
#[command(name = "wp-composer")]
#[command(
    author,
    version,
    about = "Manage WordPress plugin and theme dependencies through a composer.json manifest"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add or remove specific plugins by slug
    Plugin {
        /// The action to perform: "add" or "remove"
        action: String,

        /// One or more plugin slugs
        #[arg(required = true)]
        slugs: Vec<String>,

        #[command(flatten)]
        opts: ItemArgs,
    },

    /// Add or remove specific themes by slug
    Theme {
        /// The action to perform: "add" or "remove"
        action: String,

        /// One or more theme slugs
        #[arg(required = true)]
        slugs: Vec<String>,

        #[command(flatten)]
        opts: ItemArgs,
    },

    /// Bulk actions over installed or declared plugins
    Plugins {
        /// The action to perform: "add", "install", or "uninstall"
        action: String,

        #[command(flatten)]
        opts: BulkArgs,
    },

    /// Bulk actions over installed or declared themes
    Themes {
        /// The action to perform: "add", "install", or "uninstall"
        action: String,

        #[command(flatten)]
        opts: BulkArgs,
    },

    /// Add all installed plugins and themes to the manifest
    Add {
        #[command(flatten)]
        opts: BulkArgs,
    },
}

#[derive(Args)]
struct ItemArgs {
    /// Path to the composer.json file
    #[arg(long)]
    file: Option<String>,

    /// Pin this version (only applies when adding a single slug)
    #[arg(long)]
    version: Option<String>,

    /// Always track the latest version instead of a pinned one
    #[arg(long)]
    latest: bool,

    /// Declare as a dev dependency
    #[arg(long)]
    dev: bool,

    /// Base directory for the Composer installer paths
    #[arg(long = "installer-path")]
    installer_path: Option<String>,
}

#[derive(Args)]
struct BulkArgs {
    /// Path to the composer.json file
    #[arg(long)]
    file: Option<String>,

    /// Include items not found on wordpress.org
    #[arg(long)]
    all: bool,

    /// Track the latest version instead of the installed one
    #[arg(long)]
    latest: bool,

    /// Operate on dev dependencies
    #[arg(long)]
    dev: bool,

    /// Base directory for the Composer installer paths
    #[arg(long = "installer-path")]
    installer_path: Option<String>,
}

impl From<ItemArgs> for ItemOpts {
    fn from(args: ItemArgs) -> Self {
        ItemOpts {
            file: args.file,
            version: args.version,
            latest: args.latest,
            dev: args.dev,
            installer_path: args.installer_path,
        }
    }
}

impl From<BulkArgs> for BulkOpts {
    fn from(args: BulkArgs) -> Self {
        BulkOpts {
            file: args.file,
            all: args.all,
            latest: args.latest,
            dev: args.dev,
            installer_path: args.installer_path,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Plugin {
            action,
            slugs,
            opts,
        } => {
            commands::item_command(DependencyKind::Plugin, &action, &slugs, &opts.into())?;
        }
        Commands::Theme {
            action,
            slugs,
            opts,
        } => {
            commands::item_command(DependencyKind::Theme, &action, &slugs, &opts.into())?;
        }
        Commands::Plugins { action, opts } => {
            commands::bulk_command(DependencyKind::Plugin, &action, &opts.into())?;
        }
        Commands::Themes { action, opts } => {
            commands::bulk_command(DependencyKind::Theme, &action, &opts.into())?;
        }
        Commands::Add { opts } => {
            commands::add_all(&opts.into())?;
        }
    }

    Ok(())
}
