use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

/// Startup options. The dataset path is fixed for the lifetime of the process.
#[derive(Debug, Clone, Parser)]
#[command(name = "paper-table", version, about = "Browse a research paper table in the browser")]
pub struct Config {
    /// Paper table to serve (.csv, .tsv, .json or .parquet).
    #[arg(long, default_value = "research_papers.csv")]
    pub data: PathBuf,

    /// Address to listen on.
    #[arg(long, default_value = "127.0.0.1:8050")]
    pub addr: SocketAddr,

    /// Verbose logging, error details in responses and browser live reload.
    #[arg(long)]
    pub debug: bool,
}

impl Config {
    /// Log filter used when `RUST_LOG` is not set.
    pub fn default_log_filter(&self) -> &'static str {
        if self.debug { "debug" } else { "info" }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::try_parse_from(["paper-table"]).unwrap();
        assert_eq!(config.data, PathBuf::from("research_papers.csv"));
        assert_eq!(config.addr, "127.0.0.1:8050".parse::<SocketAddr>().unwrap());
        assert!(!config.debug);
        assert_eq!(config.default_log_filter(), "info");
    }

    #[test]
    fn debug_flag_and_overrides() {
        let config = Config::try_parse_from([
            "paper-table",
            "--data",
            "papers.parquet",
            "--addr",
            "0.0.0.0:9000",
            "--debug",
        ])
        .unwrap();
        assert_eq!(config.data, PathBuf::from("papers.parquet"));
        assert_eq!(config.addr.port(), 9000);
        assert_eq!(config.default_log_filter(), "debug");
    }

    #[test]
    fn bad_address_is_rejected() {
        assert!(Config::try_parse_from(["paper-table", "--addr", "localhost"]).is_err());
    }
}
