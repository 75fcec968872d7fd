use crate::error::Error;
use crate::filewalker::ExclusionSet;
use anyhow::Result;
use clap::{Arg, ArgAction, ArgMatches, Command};
use log::LevelFilter;
use std::path::PathBuf;

/// Settings for one collector run.
#[derive(Debug, Clone)]
pub struct CollectConfig {
    pub doc_root: PathBuf,
    /// `None` writes the document to standard output.
    pub output: Option<PathBuf>,
    pub excludes: ExclusionSet,
    pub include_hidden: bool,
    pub respect_gitignore: bool,
    pub verbosity: i8,
}

/// Where the restorer reads its document from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    Stdin,
    File(PathBuf),
}

/// Settings for one restorer run.
#[derive(Debug, Clone)]
pub struct RestoreConfig {
    pub input: InputSource,
    pub doc_root: PathBuf,
    pub verbosity: i8,
}

fn verbosity_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("verbose")
            .short('v')
            .long("verbose")
            .visible_alias("debug")
            .help("More log output (repeat for line-by-line tracing)")
            .action(ArgAction::Count),
    )
    .arg(
        Arg::new("quiet")
            .short('q')
            .long("quiet")
            .help("Only print warnings and errors")
            .action(ArgAction::SetTrue)
            .conflicts_with("verbose"),
    )
}

fn verbosity(matches: &ArgMatches) -> i8 {
    if matches.get_flag("quiet") {
        -1
    } else {
        matches.get_count("verbose").min(i8::MAX as u8) as i8
    }
}

pub fn collect_command() -> Command {
    let cmd = Command::new("collect-sources")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Concatenates a directory tree's text files into one annotated Markdown document")
        .arg(
            Arg::new("doc-root")
                .long("doc-root")
                .value_name("DIR")
                .help("Root directory to collect from")
                .required(true)
                .num_args(1),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("FILE")
                .help("Output .md file path ('-' or omitted for standard output)")
                .num_args(1),
        )
        .arg(
            Arg::new("exclude")
                .long("exclude")
                .value_name("FRAGMENT")
                .help("File or directory names to exclude (e.g. .git venv)")
                .num_args(0..)
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("hidden")
                .long("hidden")
                .help("Include hidden files and directories")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("gitignore")
                .long("gitignore")
                .help("Also skip paths matched by .gitignore and .ignore files")
                .action(ArgAction::SetTrue),
        );

    verbosity_args(cmd)
}

pub fn restore_command() -> Command {
    let cmd = Command::new("restore-sources")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Recreates a directory tree from a Markdown document of path lines and code blocks")
        .arg(
            Arg::new("input")
                .short('i')
                .long("input")
                .value_name("FILE")
                .help("Input Markdown file ('-' for standard input)")
                .required(true)
                .num_args(1),
        )
        .arg(
            Arg::new("doc-root")
                .long("doc-root")
                .value_name("DIR")
                .help("Destination root, created if absent (defaults to the current directory)")
                .num_args(1),
        );

    verbosity_args(cmd)
}

pub fn collect_config_from(matches: &ArgMatches) -> Result<CollectConfig> {
    let doc_root = matches
        .get_one::<String>("doc-root")
        .map(PathBuf::from)
        .ok_or_else(|| Error::FatalArgument {
            arg: "--doc-root",
            message: "a directory is required".to_string(),
        })?;

    let output = matches
        .get_one::<String>("output")
        .filter(|s| s.as_str() != "-")
        .map(PathBuf::from);

    let excludes = ExclusionSet::new(
        matches
            .get_many::<String>("exclude")
            .into_iter()
            .flatten(),
    );

    Ok(CollectConfig {
        doc_root,
        output,
        excludes,
        include_hidden: matches.get_flag("hidden"),
        respect_gitignore: matches.get_flag("gitignore"),
        verbosity: verbosity(matches),
    })
}

pub fn restore_config_from(matches: &ArgMatches) -> Result<RestoreConfig> {
    let input = match matches.get_one::<String>("input").map(String::as_str) {
        Some("-") => InputSource::Stdin,
        Some(path) => InputSource::File(PathBuf::from(path)),
        None => {
            return Err(Error::FatalArgument {
                arg: "--input",
                message: "a file is required".to_string(),
            }
            .into());
        }
    };

    let doc_root = match matches.get_one::<String>("doc-root") {
        Some(dir) => PathBuf::from(dir),
        None => std::env::current_dir()?,
    };

    Ok(RestoreConfig {
        input,
        doc_root,
        verbosity: verbosity(matches),
    })
}

pub fn parse_collect_args() -> Result<CollectConfig> {
    collect_config_from(&collect_command().get_matches())
}

pub fn parse_restore_args() -> Result<RestoreConfig> {
    restore_config_from(&restore_command().get_matches())
}

/// Installs the stderr logger. `RUST_LOG` overrides the verbosity flags.
pub fn init_logging(verbosity: i8) {
    let level = match verbosity {
        i8::MIN..=-1 => LevelFilter::Warn,
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(level)
        .format_timestamp(None)
        .format_target(false)
        .parse_default_env()
        .init();
}
