//! config-tree
//!
//! Loads hierarchical configuration from files and directories and prints
//! what the merged tree holds.

use anyhow::{Context, Result};
use clap::Parser;
use config_tree::cli::{Cli, Command, DumpArgs, GetArgs};
use config_tree::format;
use config_tree::logging::{self, LogTarget};
use config_tree::{BundleLoader, ConfigTree, Settings, bootstrap};
use serde_json::Value;
use std::process::ExitCode;
use tracing::debug;

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let target: LogTarget = cli.log.parse().unwrap_or(LogTarget::Stderr);
    logging::init(&target, cli.verbose)?;

    let settings = match &cli.settings {
        Some(path) => {
            let mut settings = Settings::load(path)?;
            settings.apply_overrides(|name| std::env::var(name).ok());
            settings
        }
        None => Settings::load_or_default(),
    };
    debug!(?settings, "Loaded settings");

    let tree = load_tree(&cli, &settings)?;

    match cli.command {
        Command::Dump(args) => dump(&tree, &args)?,
        Command::Get(args) => get(&tree, &args)?,
        Command::Has { key } => {
            let found = tree.has(&key)?;
            println!("{}", found);
            if !found {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Keys { key } => keys(&tree, key.as_deref())?,
    }

    Ok(ExitCode::SUCCESS)
}

/// Merge the sources named on the command line, or the configured directory.
fn load_tree(cli: &Cli, settings: &Settings) -> Result<ConfigTree> {
    if !cli.has_explicit_sources() {
        return Ok(bootstrap::build(settings)?);
    }

    let loader = BundleLoader::new();
    let walker = loader
        .walker()
        .follow_links(settings.discovery.follow_links)
        .include_hidden(settings.discovery.include_hidden)
        .max_depth(settings.discovery.max_depth);

    let mut tree = ConfigTree::new();
    for dir in &cli.dirs {
        loader
            .merge_directory_with(&mut tree, dir, &walker)
            .with_context(|| format!("failed to merge directory {}", dir.display()))?;
    }
    for file in &cli.files {
        loader
            .merge_file(&mut tree, &file.path, file.key.as_deref())
            .with_context(|| format!("failed to merge file {}", file.path.display()))?;
    }
    Ok(tree)
}

fn dump(tree: &ConfigTree, args: &DumpArgs) -> Result<()> {
    let (value, prefix) = match &args.key {
        Some(key) => (Value::Object(tree.wrap(key)?.into_map()), key.as_str()),
        None => (Value::Object(tree.to_map()), ""),
    };
    print!("{}", format::render(&value, prefix, args.format)?);
    Ok(())
}

fn get(tree: &ConfigTree, args: &GetArgs) -> Result<()> {
    let value = match (tree.get(&args.key)?, &args.default) {
        (Some(value), _) => value.clone(),
        (None, Some(default)) => serde_json::from_str(default)
            .with_context(|| format!("--default is not valid JSON: {}", default))?,
        (None, None) => anyhow::bail!("Configuration key \"{}\" not found.", args.key),
    };
    print!("{}", format::render(&value, &args.key, args.format)?);
    Ok(())
}

fn keys(tree: &ConfigTree, key: Option<&str>) -> Result<()> {
    let (scope, prefix) = match key {
        Some(key) => (tree.wrap(key)?, format!("{}.", key)),
        None => (tree.clone(), String::new()),
    };
    for (path, _) in scope.leaf_paths() {
        println!("{}{}", prefix, path);
    }
    Ok(())
}
