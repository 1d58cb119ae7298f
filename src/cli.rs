//! CLI argument parsing for npar

use crate::descriptor::VariablePairs;
use crate::dictionary::Dictionary;
use crate::missing::MissingMode;
use crate::stats::NparConfig;
use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for result tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format (default)
    Text,
    /// JSON format for machine parsing
    Json,
    /// CSV format for spreadsheet analysis
    Csv,
}

/// Which summary statistics to print after the tests
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Statistics {
    Descriptives,
    Quartiles,
    All,
}

#[derive(Parser, Debug)]
#[command(name = "npar")]
#[command(version)]
#[command(about = "Nonparametric tests (Cochran's Q, sign test) over delimited data", long_about = None)]
pub struct Cli {
    /// Comma-separated data file: header row of variable names, then one
    /// case per line (an empty cell or "." is system-missing)
    #[arg(short, long, value_name = "FILE")]
    pub data: PathBuf,

    /// Weight cases by this variable
    #[arg(short, long, value_name = "VAR")]
    pub weight: Option<String>,

    /// Declare user-missing values (e.g., --user-missing score=9,99)
    #[arg(long = "user-missing", value_name = "VAR=V1,V2")]
    pub user_missing: Vec<String>,

    /// Run Cochran's Q over a comma-separated variable group (repeatable)
    #[arg(long = "cochran", value_name = "A,B,C")]
    pub cochran: Vec<String>,

    /// Run the sign test (repeatable). Accepts explicit pairs "A:B,C:D",
    /// a list "A,B,C" (every unordered pair) or "A,B WITH C,D" with an
    /// optional trailing "(PAIRED)"
    #[arg(long = "sign", value_name = "PAIRS")]
    pub sign: Vec<String>,

    /// Treatment of user-missing values (overrides --config)
    #[arg(long = "missing", value_enum)]
    pub missing: Option<MissingMode>,

    /// Drop cases missing on any variable named by any test
    #[arg(long = "listwise")]
    pub listwise: bool,

    /// Summary statistics to print after the tests
    #[arg(long = "statistics", value_enum)]
    pub statistics: Option<Statistics>,

    /// TOML configuration file
    #[arg(short, long, value_name = "FILE.toml")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long = "format", value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Enable debug tracing output
    #[arg(long = "debug")]
    pub debug: bool,
}

impl Cli {
    /// Start from `--config` (or defaults) and apply the flags on top
    pub fn npar_config(&self) -> Result<NparConfig> {
        let mut config = match &self.config {
            Some(path) => NparConfig::from_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => NparConfig::default(),
        };

        if let Some(missing) = self.missing {
            config.missing = missing;
        }
        if self.listwise {
            config.listwise = true;
        }
        match self.statistics {
            Some(Statistics::Descriptives) => config.descriptives = true,
            Some(Statistics::Quartiles) => config.quartiles = true,
            Some(Statistics::All) => {
                config.descriptives = true;
                config.quartiles = true;
            }
            None => {}
        }

        config.validate()?;
        Ok(config)
    }
}

/// Parse `VAR=V1,V2,...` into the variable name and its missing values
pub fn parse_user_missing(spec: &str) -> Result<(String, Vec<f64>)> {
    let Some((name, values)) = spec.split_once('=') else {
        bail!("Invalid --user-missing '{}': expected VAR=V1,V2", spec);
    };
    let name = name.trim();
    if name.is_empty() {
        bail!("Invalid --user-missing '{}': empty variable name", spec);
    }
    let values = values
        .split(',')
        .map(|v| {
            v.trim()
                .parse::<f64>()
                .with_context(|| format!("Invalid missing value '{}' for {}", v, name))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok((name.to_string(), values))
}

/// Parse `A,B,C` into variable names
pub fn parse_group(spec: &str) -> Vec<String> {
    spec.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse `A:B,C:D` into (left, right) name pairs
pub fn parse_pairs(spec: &str) -> Result<Vec<(String, String)>> {
    parse_group(spec)
        .iter()
        .map(|pair| match pair.split_once(':') {
            Some((left, right)) if !left.trim().is_empty() && !right.trim().is_empty() => {
                Ok((left.trim().to_string(), right.trim().to_string()))
            }
            _ => bail!("Invalid --sign pair '{}': expected LEFT:RIGHT", pair),
        })
        .collect()
}

/// Resolve a `--sign` argument against the dictionary
pub fn resolve_sign_pairs(dict: &Dictionary, spec: &str) -> Result<VariablePairs> {
    if spec.contains(':') {
        return Ok(VariablePairs::from_names(dict, &parse_pairs(spec)?)?);
    }

    let lookup = |names: &str| -> Result<Vec<_>> {
        parse_group(names)
            .iter()
            .map(|n| Ok(dict.lookup(n)?.clone()))
            .collect()
    };

    let words: Vec<&str> = spec.split_whitespace().collect();
    match words.iter().position(|w| w.eq_ignore_ascii_case("with")) {
        Some(at) => {
            let mut rest = &words[at + 1..];
            let paired = rest
                .last()
                .is_some_and(|w| w.eq_ignore_ascii_case("(paired)"));
            if paired {
                rest = &rest[..rest.len() - 1];
            }
            let vars = lookup(&words[..at].join(","))?;
            let with = lookup(&rest.join(","))?;
            Ok(VariablePairs::cross(&vars, &with, paired)?)
        }
        None => Ok(VariablePairs::all_pairs(&lookup(spec)?)?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_minimal() {
        let cli = Cli::parse_from(["npar", "--data", "cases.csv", "--cochran", "a,b,c"]);
        assert_eq!(cli.data, PathBuf::from("cases.csv"));
        assert_eq!(cli.cochran, vec!["a,b,c"]);
        assert!(cli.sign.is_empty());
        assert_eq!(cli.format, OutputFormat::Text);
        assert!(cli.missing.is_none());
        assert!(!cli.listwise);
        assert!(!cli.debug);
    }

    #[test]
    fn test_cli_repeatable_tests() {
        let cli = Cli::parse_from([
            "npar", "-d", "x.csv", "--sign", "a:b", "--sign", "c:d,e:f", "--cochran", "a,b",
        ]);
        assert_eq!(cli.sign, vec!["a:b", "c:d,e:f"]);
        assert_eq!(cli.cochran, vec!["a,b"]);
    }

    #[test]
    fn test_cli_options() {
        let cli = Cli::parse_from([
            "npar",
            "--data",
            "x.csv",
            "--weight",
            "w",
            "--user-missing",
            "a=9",
            "--missing",
            "include",
            "--listwise",
            "--statistics",
            "all",
            "--format",
            "json",
            "--debug",
        ]);
        assert_eq!(cli.weight.as_deref(), Some("w"));
        assert_eq!(cli.user_missing, vec!["a=9"]);
        assert_eq!(cli.missing, Some(MissingMode::Include));
        assert!(cli.listwise);
        assert_eq!(cli.statistics, Some(Statistics::All));
        assert_eq!(cli.format, OutputFormat::Json);
        assert!(cli.debug);
    }

    #[test]
    fn test_cli_requires_data() {
        assert!(Cli::try_parse_from(["npar", "--cochran", "a,b"]).is_err());
    }

    #[test]
    fn test_parse_user_missing() {
        let (name, values) = parse_user_missing("score=9, 99").unwrap();
        assert_eq!(name, "score");
        assert_eq!(values, vec![9.0, 99.0]);

        assert!(parse_user_missing("score").is_err());
        assert!(parse_user_missing("=9").is_err());
        assert!(parse_user_missing("score=x").is_err());
    }

    #[test]
    fn test_parse_group() {
        assert_eq!(parse_group("a, b,c"), vec!["a", "b", "c"]);
        assert!(parse_group("").is_empty());
    }

    #[test]
    fn test_parse_pairs() {
        let pairs = parse_pairs("a:b, c : d").unwrap();
        assert_eq!(
            pairs,
            vec![
                ("a".to_string(), "b".to_string()),
                ("c".to_string(), "d".to_string())
            ]
        );
        assert!(parse_pairs("a-b").is_err());
        assert!(parse_pairs("a:").is_err());
    }

    #[test]
    fn test_flags_override_defaults() {
        let cli = Cli::parse_from([
            "npar",
            "-d",
            "x.csv",
            "--missing",
            "include",
            "--listwise",
            "--statistics",
            "quartiles",
        ]);
        let config = cli.npar_config().unwrap();
        assert_eq!(config.missing, MissingMode::Include);
        assert!(config.listwise);
        assert!(config.quartiles);
        assert!(!config.descriptives);
    }

    #[test]
    fn test_flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("npar.toml");
        std::fs::write(&path, "descriptives = true\nmissing = \"include\"\n").unwrap();

        let cli = Cli::parse_from([
            "npar",
            "-d",
            "x.csv",
            "--config",
            path.to_str().unwrap(),
            "--missing",
            "exclude",
        ]);
        let config = cli.npar_config().unwrap();
        assert!(config.descriptives);
        assert_eq!(config.missing, MissingMode::Exclude);
    }

    fn sign_dict() -> Dictionary {
        let mut dict = Dictionary::new();
        for name in ["a", "b", "c", "d"] {
            dict.add_variable(name).unwrap();
        }
        dict
    }

    fn labels(pairs: &VariablePairs) -> Vec<String> {
        pairs.pairs().iter().map(|p| p.label()).collect()
    }

    #[test]
    fn test_resolve_explicit_pairs() {
        let pairs = resolve_sign_pairs(&sign_dict(), "a:b,d:c").unwrap();
        assert_eq!(labels(&pairs), vec!["a - b", "d - c"]);
    }

    #[test]
    fn test_resolve_all_pairs() {
        let pairs = resolve_sign_pairs(&sign_dict(), "a,b,c").unwrap();
        assert_eq!(labels(&pairs), vec!["a - b", "a - c", "b - c"]);
    }

    #[test]
    fn test_resolve_with_and_paired() {
        let dict = sign_dict();
        let pairs = resolve_sign_pairs(&dict, "a,b WITH c,d").unwrap();
        assert_eq!(labels(&pairs), vec!["a - c", "a - d", "b - c", "b - d"]);

        let pairs = resolve_sign_pairs(&dict, "a, b with c, d (PAIRED)").unwrap();
        assert_eq!(labels(&pairs), vec!["a - c", "b - d"]);

        assert!(resolve_sign_pairs(&dict, "a,b WITH c (PAIRED)").is_err());
        assert!(resolve_sign_pairs(&dict, "a WITH zz").is_err());
    }
}
