use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Run every configured scraper in parallel and report whether they all succeeded
#[derive(Debug, Parser)]
#[clap(name = "run-scrapers", version)]
pub struct ArgParser {
    /// built-in job set, used when no config file is given
    #[clap(long, value_enum, env = "SCRAPERS_VARIANT", default_value = "standard")]
    pub variant: Variant,

    /// TOML file listing the jobs to run, replaces the built-in variant
    #[clap(short = 'f', long = "config-file", value_name = "PATH", env = "SCRAPERS_CONFIG")]
    pub config_file: Option<PathBuf>,

    /// project root that job scripts are relative to
    #[clap(long, value_name = "DIR", env = "SCRAPERS_ROOT")]
    pub root: Option<PathBuf>,

    /// interpreter used to run each job's script (default: python3)
    #[clap(long, value_name = "PROGRAM", env = "PYTHON")]
    pub python: Option<String>,

    /// only run the named job, may be repeated
    #[clap(long = "only", value_name = "NAME")]
    pub only: Vec<String>,

    /// extra environment variable for every job, may be repeated
    #[clap(long = "env", value_name = "VAR=VAL", parse(try_from_str = var_eq_val))]
    pub envs: Vec<(String, String)>,

    /// re-run the whole batch every SECONDS (at least 60) until interrupted
    #[clap(long, value_name = "SECONDS", env = "SCRAPERS_EVERY")]
    pub every: Option<u64>,

    /// print the resolved jobs and exit without running them
    #[clap(long)]
    pub list: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Variant {
    /// APRA, FMA, RBNZ and RBA (news)
    Standard,
    /// APRA, RBNZ and RBA (full listing)
    Lite,
}

/// try_from_str parse function for job env variables
fn var_eq_val(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((var, val)) if !var.is_empty() => Ok((var.to_string(), val.to_string())),
        _ => Err("Required format is VAR=VAL".to_string()),
    }
}
