//! wp-composer - keep WordPress plugins and themes in sync with composer.json

pub mod commands;
pub mod config;
pub mod installer;
pub mod manifest;
pub mod registry;
