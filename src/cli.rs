use clap::Parser;
use serde_json::Value;
use std::path::PathBuf;

use crate::domain::LengthRange;

/// Schema-driven generator of realistic JSON fixtures
#[derive(Parser, Debug, Clone)]
#[command(name = "proteus", version, about, long_about = None)]
pub struct Cli {
    /// Schema document (JSON, or YAML for .yaml/.yml files)
    #[arg(short, long, env = "PROTEUS_SCHEMA", required_unless_present = "list_generators")]
    pub schema: Option<PathBuf>,

    /// JSON pointer of the schema inside the document
    #[arg(short, long, default_value = "#")]
    pub pointer: String,

    /// Path to the configuration file
    #[arg(short, long, env = "PROTEUS_CONFIG", default_value = "proteus.toml")]
    pub config: PathBuf,

    /// Seed for reproducible output
    #[arg(long)]
    pub seed: Option<u64>,

    /// Maximum expansion depth for self-referencing schemas
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// Ignore `example` and `default` values in the schema
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    pub bypass_examples: Option<bool>,

    /// Number of values to generate; more than one prints an array
    #[arg(short = 'n', long)]
    pub count: Option<usize>,

    /// Pretty-print the output
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    pub pretty: Option<bool>,

    /// Fixed value at a path, e.g. `user.name="Ada"` or `items.0.qty=3`
    #[arg(long = "set", value_name = "PATH=VALUE", value_parser = parse_override)]
    pub overrides: Vec<(String, Value)>,

    /// Array length at a path or property name, e.g. `users=2..4` or `users[*].tags=1`
    #[arg(long = "array-length", value_name = "PATH=MIN..MAX", value_parser = parse_array_length)]
    pub array_lengths: Vec<(String, LengthRange)>,

    /// Print the available named generators and exit
    #[arg(long)]
    pub list_generators: bool,
}

/// `path=value`; the value is read as JSON and falls back to a plain string.
pub fn parse_override(raw: &str) -> Result<(String, Value), String> {
    let (path, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected PATH=VALUE, got '{}'", raw))?;
    if path.is_empty() {
        return Err(format!("missing path in '{}'", raw));
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((path.to_string(), value))
}

/// `path=min..max` or `path=n`.
pub fn parse_array_length(raw: &str) -> Result<(String, LengthRange), String> {
    let (path, range) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected PATH=MIN..MAX, got '{}'", raw))?;
    if path.is_empty() {
        return Err(format!("missing path in '{}'", raw));
    }

    let parse = |s: &str| {
        s.trim()
            .parse::<usize>()
            .map_err(|_| format!("invalid length '{}' in '{}'", s, raw))
    };
    let bounds = match range.split_once("..") {
        Some((min, max)) => (parse(min)?, parse(max.trim_start_matches('='))?),
        None => {
            let n = parse(range)?;
            (n, n)
        }
    };
    Ok((path.to_string(), bounds))
}
