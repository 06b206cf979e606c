//! Command-line / environment configuration
//!
//! Every option can be given as a flag or through its environment variable;
//! flags win, then the environment, then the compiled default.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use raster_common::rules::{DEFAULT_END_TOLERANCE_MINUTES, DEFAULT_FILLER_NAME};
use raster_common::{DuplicatePolicies, DuplicatePolicy, ReconcileOptions, RuleOptions};
use thiserror::Error;

/// Command-line arguments for raster-check
#[derive(Parser, Debug, Clone)]
#[command(name = "raster-check")]
#[command(about = "Compares the website programme with the broadcast automation schedule")]
#[command(version)]
pub struct Args {
    /// Address to listen on
    #[arg(long, default_value = "0.0.0.0:8080", env = "LISTEN_ADDR")]
    pub listen_addr: SocketAddr,

    /// Base URL of the website (event calendar)
    #[arg(long, default_value = "https://rabe.ch", env = "WEBSITE_URL")]
    pub website_url: String,

    /// Base URL of the LibreTime automation system
    #[arg(long, default_value = "https://airtime.service.int.rabe.ch", env = "LIBRETIME_URL")]
    pub libretime_url: String,

    /// Number of days to look ahead
    #[arg(long, default_value_t = 60, env = "DURATION_DAYS")]
    pub days: u32,

    /// Timeout per feed request in seconds
    #[arg(long, default_value_t = 30, env = "FETCH_TIMEOUT_SECS")]
    pub fetch_timeout_secs: u64,

    /// Placeholder programme that is never reported as missing
    #[arg(long, default_value = DEFAULT_FILLER_NAME, env = "FILLER_SHOW")]
    pub filler_show: String,

    /// Report shows without a description on the website
    #[arg(long, env = "CHECK_DESCRIPTIONS")]
    pub check_descriptions: bool,

    /// Abort a reload when the automation feed has two shows at the same time
    #[arg(long, env = "STRICT_AUTOMATION_DUPLICATES")]
    pub strict_automation_duplicates: bool,

    /// TLS certificate (PEM); requires --tls-key
    #[arg(long, env = "TLS_CERT")]
    pub tls_cert: Option<PathBuf>,

    /// TLS private key (PEM); requires --tls-cert
    #[arg(long, env = "TLS_KEY")]
    pub tls_key: Option<PathBuf>,
}

/// Configuration validation errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Look-ahead window must be at least one day")]
    ZeroDays,

    #[error("Fetch timeout must be at least one second")]
    ZeroTimeout,

    #[error("Both --tls-cert and --tls-key are required for TLS")]
    IncompleteTls,

    #[error("Invalid base URL {0:?}: must start with http:// or https://")]
    InvalidUrl(String),
}

/// TLS certificate and key paths
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsPaths {
    pub cert: PathBuf,
    pub key: PathBuf,
}

/// Validated service configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: SocketAddr,
    pub website_url: String,
    pub libretime_url: String,
    pub days: u32,
    pub fetch_timeout: Duration,
    pub tls: Option<TlsPaths>,
    pub reconcile: ReconcileOptions,
}

impl Config {
    pub fn from_args(args: Args) -> Result<Self, ConfigError> {
        if args.days == 0 {
            return Err(ConfigError::ZeroDays);
        }
        if args.fetch_timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }

        let tls = match (args.tls_cert, args.tls_key) {
            (Some(cert), Some(key)) => Some(TlsPaths { cert, key }),
            (None, None) => None,
            _ => return Err(ConfigError::IncompleteTls),
        };

        let automation_duplicates = if args.strict_automation_duplicates {
            DuplicatePolicy::Reject
        } else {
            DuplicatePolicy::Report
        };

        Ok(Self {
            listen_addr: args.listen_addr,
            website_url: normalize_base_url(&args.website_url)?,
            libretime_url: normalize_base_url(&args.libretime_url)?,
            days: args.days,
            fetch_timeout: Duration::from_secs(args.fetch_timeout_secs),
            tls,
            reconcile: ReconcileOptions {
                rules: RuleOptions {
                    filler_name: args.filler_show,
                    end_tolerance: chrono::Duration::minutes(DEFAULT_END_TOLERANCE_MINUTES),
                    check_descriptions: args.check_descriptions,
                },
                duplicates: DuplicatePolicies {
                    website: DuplicatePolicy::Report,
                    automation: automation_duplicates,
                },
            },
        })
    }
}

fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        Ok(trimmed.to_string())
    } else {
        Err(ConfigError::InvalidUrl(raw.to_string()))
    }
}
