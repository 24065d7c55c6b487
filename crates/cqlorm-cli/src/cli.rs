use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HelpTopic {
    Root,
    Init,
    Migrate,
}

#[derive(Debug, Clone)]
pub enum Command {
    Help(HelpTopic),
    Init(InitArgs),
    Migrate(MigrateArgs),
}

#[derive(Debug, Clone)]
pub struct InitArgs {
    pub config: PathBuf,
}

#[derive(Debug, Clone)]
pub struct MigrateArgs {
    pub config: PathBuf,
    pub dry_run: bool,
    pub files: Vec<PathBuf>,
}

const DEFAULT_CONFIG: &str = "cqlorm.toml";

pub fn parse_args(args: &[String]) -> anyhow::Result<Command> {
    let mut it = args.iter().skip(1);
    let Some(first) = it.next() else {
        return Ok(Command::Help(HelpTopic::Root));
    };

    match first.as_str() {
        "-h" | "--help" => Ok(Command::Help(HelpTopic::Root)),
        "help" => match it.next().map(|s| s.as_str()) {
            None => Ok(Command::Help(HelpTopic::Root)),
            Some("init") => Ok(Command::Help(HelpTopic::Init)),
            Some("migrate") => Ok(Command::Help(HelpTopic::Migrate)),
            Some(other) => anyhow::bail!("unknown command: {other}"),
        },
        "init" => parse_init(it.map(|s| s.as_str())),
        "migrate" => parse_migrate(it.map(|s| s.as_str())),
        _ => anyhow::bail!("unknown command: {first}"),
    }
}

fn parse_config<'a>(
    token: &str,
    it: &mut impl Iterator<Item = &'a str>,
) -> anyhow::Result<Option<PathBuf>> {
    if token == "--config" {
        let Some(v) = it.next() else {
            anyhow::bail!("--config requires a value");
        };
        return Ok(Some(PathBuf::from(v)));
    }
    Ok(token.strip_prefix("--config=").map(PathBuf::from))
}

fn parse_init<'a>(mut it: impl Iterator<Item = &'a str>) -> anyhow::Result<Command> {
    let mut config = PathBuf::from(DEFAULT_CONFIG);

    while let Some(token) = it.next() {
        if matches!(token, "-h" | "--help") {
            return Ok(Command::Help(HelpTopic::Init));
        }
        match parse_config(token, &mut it)? {
            Some(path) => config = path,
            None => anyhow::bail!("unknown argument: {token}"),
        }
    }

    Ok(Command::Init(InitArgs { config }))
}

fn parse_migrate<'a>(mut it: impl Iterator<Item = &'a str>) -> anyhow::Result<Command> {
    let mut config = PathBuf::from(DEFAULT_CONFIG);
    let mut dry_run = false;
    let mut files = Vec::new();

    while let Some(token) = it.next() {
        match token {
            "-h" | "--help" => return Ok(Command::Help(HelpTopic::Migrate)),
            "--dry-run" => dry_run = true,
            _ => match parse_config(token, &mut it)? {
                Some(path) => config = path,
                None if token.starts_with('-') => anyhow::bail!("unknown argument: {token}"),
                None => files.push(PathBuf::from(token)),
            },
        }
    }

    if files.is_empty() {
        anyhow::bail!("migrate requires at least one .cql file");
    }

    Ok(Command::Migrate(MigrateArgs {
        config,
        dry_run,
        files,
    }))
}

pub fn print_help(topic: HelpTopic) {
    match topic {
        HelpTopic::Root => {
            println!(
                "\
cqlorm - schema migration CLI for cqlorm

USAGE:
  cqlorm <COMMAND> [OPTIONS]

COMMANDS:
  init          Write a starter cqlorm.toml
  migrate       Apply .cql schema scripts in order

Run `cqlorm <command> --help` for more."
            );
        }
        HelpTopic::Init => {
            println!(
                "\
USAGE:
  cqlorm init [OPTIONS]

OPTIONS:
  --config <FILE>       Config file to create (default: cqlorm.toml)
  -h, --help            Print help"
            );
        }
        HelpTopic::Migrate => {
            println!(
                "\
USAGE:
  cqlorm migrate [OPTIONS] <FILE>...

OPTIONS:
  --config <FILE>       Config file path (default: cqlorm.toml)
  --dry-run             Print the statements without connecting
  -h, --help            Print help

Each file is split on `;`; `--` and `//` line comments are ignored."
            );
        }
    }
}
