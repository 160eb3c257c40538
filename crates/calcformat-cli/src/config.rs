//! Answer configuration for the command line

use anyhow::{Context, Result};
use calcformat::{AnswerRecord, ToleranceKind};
use clap::Args;
use std::path::{Path, PathBuf};

/// Options shared by every subcommand that formats or grades
#[derive(Args, Debug, Default)]
pub struct ConfigArgs {
    /// JSON answer record (missing fields take their defaults)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Display base (0 accepts any prefixed base)
    #[arg(short, long)]
    pub base: Option<u32>,

    /// Integer digits (significant digits with --sig-figs)
    #[arg(short, long)]
    pub int_digits: Option<u32>,

    /// Fraction digits
    #[arg(short, long)]
    pub frac_digits: Option<u32>,

    /// Treat --int-digits as significant figures
    #[arg(long)]
    pub sig_figs: bool,

    /// Group digits (thousands in base 10, nibbles/triples otherwise)
    #[arg(long)]
    pub group: bool,

    /// Show 0b/0o/0d/0x before the answer
    #[arg(long)]
    pub prefix: bool,

    /// Tolerance value
    #[arg(short, long)]
    pub tolerance: Option<f64>,

    /// Tolerance kind: relative, nominal or geometric
    #[arg(short = 'k', long)]
    pub tolerance_kind: Option<ToleranceKind>,
}

impl ConfigArgs {
    /// The record from `--config` (or the default) with flags applied on top
    pub fn record(&self) -> Result<AnswerRecord> {
        let mut record = match &self.config {
            Some(path) => load_record(path)?,
            None => AnswerRecord::default(),
        };

        if let Some(base) = self.base {
            record.base = base;
        }
        if let Some(digits) = self.int_digits {
            record.integer_digits = digits;
        }
        if let Some(digits) = self.frac_digits {
            record.fraction_digits = digits;
        }
        if let Some(tolerance) = self.tolerance {
            record.tolerance = tolerance;
        }
        if let Some(kind) = self.tolerance_kind {
            record.tolerance_kind = kind;
        }
        record.significant_figures |= self.sig_figs;
        record.group_digits |= self.group;
        record.show_base_prefix |= self.prefix;

        Ok(record)
    }
}

/// Read an [`AnswerRecord`] from a JSON file
pub fn load_record(path: &Path) -> Result<AnswerRecord> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read '{}'", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse answer record '{}'", path.display()))
}

/// Parse a `name=value` dataset binding
pub fn parse_binding(s: &str) -> std::result::Result<(String, f64), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got '{}'", s))?;
    let value = value
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("invalid value for '{}': {}", name, e))?;
    Ok((name.trim().to_string(), value))
}
