//! Command-line arguments for the `config-tree` binary.
//!
//! Sources come from `--dir`/`--file` or, when neither is given, from the
//! configured directory. Each subcommand reads the merged tree.

use crate::format::OutputFormat;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Inspect hierarchical configuration loaded from files and directories
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to settings file (default: ./config-tree.yaml)
    #[arg(short, long, global = true)]
    pub settings: Option<PathBuf>,

    /// Config directory to merge (repeatable; replaces the configured directory)
    #[arg(short, long = "dir", value_name = "DIR", global = true)]
    pub dirs: Vec<PathBuf>,

    /// Config file to merge, optionally nested under KEY (PATH or PATH=KEY)
    #[arg(short, long = "file", value_name = "PATH[=KEY]", global = true)]
    pub files: Vec<FileArg>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2", global = true)]
    pub log: String,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// True when sources were named explicitly on the command line.
    pub fn has_explicit_sources(&self) -> bool {
        !self.dirs.is_empty() || !self.files.is_empty()
    }
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the merged tree, or the subtree at --key
    Dump(DumpArgs),

    /// Print the value at KEY
    Get(GetArgs),

    /// Print whether KEY exists (exit status 1 when it does not)
    Has {
        /// Path key, e.g. database.mysql.host
        key: String,
    },

    /// List every leaf path, or those under --key
    Keys {
        #[arg(short, long)]
        key: Option<String>,
    },
}

#[derive(Args, Debug)]
pub struct DumpArgs {
    /// Only print the subtree at this key
    #[arg(short, long)]
    pub key: Option<String>,

    /// Output format: json (default), yaml, or flat
    #[arg(long, default_value = "json", value_name = "FORMAT")]
    pub format: OutputFormat,
}

#[derive(Args, Debug)]
pub struct GetArgs {
    /// Path key, e.g. database.mysql.host
    pub key: String,

    /// JSON value printed when KEY is absent
    #[arg(long, value_name = "JSON")]
    pub default: Option<String>,

    /// Output format: json (default), yaml, or flat
    #[arg(long, default_value = "json", value_name = "FORMAT")]
    pub format: OutputFormat,
}

/// A `--file` argument: a path and an optional namespace key.
///
/// `PATH=KEY` splits at the last `=`. An argument that names an existing
/// file is always taken as a bare path, so `a=b.yaml` loads that file when
/// it exists; `a=b.yaml=ns` nests it under `ns`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileArg {
    pub path: PathBuf,
    pub key: Option<String>,
}

impl std::str::FromStr for FileArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if std::path::Path::new(s).is_file() {
            return Ok(FileArg {
                path: PathBuf::from(s),
                key: None,
            });
        }

        match s.rsplit_once('=') {
            Some((path, key)) if !path.is_empty() && !key.trim().is_empty() => Ok(FileArg {
                path: PathBuf::from(path),
                key: Some(key.to_string()),
            }),
            Some(_) => Err(format!("Invalid file argument '{}'. Expected PATH or PATH=KEY", s)),
            None => Ok(FileArg {
                path: PathBuf::from(s),
                key: None,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_arg() {
        let arg: FileArg = "config/db.yaml".parse().unwrap();
        assert_eq!(arg.path, PathBuf::from("config/db.yaml"));
        assert_eq!(arg.key, None);

        let arg: FileArg = "mysql.yaml=database.mysql".parse().unwrap();
        assert_eq!(arg.path, PathBuf::from("mysql.yaml"));
        assert_eq!(arg.key.as_deref(), Some("database.mysql"));

        assert!("mysql.yaml=".parse::<FileArg>().is_err());
    }

    #[test]
    fn test_file_arg_with_equals_in_path() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("a=b.yaml");
        std::fs::write(&path, "k: v\n").unwrap();
        let raw = path.to_str().unwrap();

        let arg: FileArg = raw.parse().unwrap();
        assert_eq!(arg.path, path);
        assert_eq!(arg.key, None);

        let arg: FileArg = format!("{}=ns", raw).parse().unwrap();
        assert_eq!(arg.path, path);
        assert_eq!(arg.key.as_deref(), Some("ns"));
    }

    #[test]
    fn test_parse_command_line() {
        let cli = Cli::try_parse_from([
            "config-tree",
            "-d",
            "config",
            "--file",
            "extra.yaml=extra",
            "get",
            "app.name",
            "--default",
            "\"none\"",
            "--format",
            "yaml",
        ])
        .unwrap();

        assert!(cli.has_explicit_sources());
        assert_eq!(cli.dirs, [PathBuf::from("config")]);
        match cli.command {
            Command::Get(args) => {
                assert_eq!(args.key, "app.name");
                assert_eq!(args.default.as_deref(), Some("\"none\""));
                assert_eq!(args.format, OutputFormat::Yaml);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_defaults_to_bootstrap() {
        let cli = Cli::try_parse_from(["config-tree", "dump"]).unwrap();
        assert!(!cli.has_explicit_sources());
        assert_eq!(cli.log, "2");
    }
}
