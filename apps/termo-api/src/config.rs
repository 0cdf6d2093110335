//! Command-line and environment configuration

use std::path::PathBuf;

use clap::Parser;
use version_store::{DEFAULT_EXPORT_CAP, DEFAULT_HISTORY_CAP};

/// Command-line arguments for the termo API server.
///
/// Every option can also be set through the environment (or a `.env` file).
#[derive(Parser, Debug, Clone)]
#[command(name = "termo-api")]
#[command(about = "Edit, version and export change-of-residency terms")]
pub struct Args {
    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value = "3000")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Directory holding template.json, history.json and downloads.json
    #[arg(long, env = "TERMO_DATA_DIR", default_value = "data")]
    pub data_dir: PathBuf,

    /// Maximum number of template versions kept
    #[arg(long, env = "TERMO_HISTORY_CAP", default_value_t = DEFAULT_HISTORY_CAP)]
    pub history_cap: usize,

    /// Maximum number of export records kept
    #[arg(long, env = "TERMO_DOWNLOAD_CAP", default_value_t = DEFAULT_EXPORT_CAP)]
    pub download_cap: usize,

    /// Access code for the admin endpoints; admin login is refused when unset
    #[arg(long, env = "TERMO_ADMIN_CODE", hide_env_values = true)]
    pub admin_code: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["termo-api"]).unwrap();
        assert_eq!(args.history_cap, 200);
        assert_eq!(args.download_cap, 1000);
        assert_eq!(args.data_dir, PathBuf::from("data"));
    }

    #[test]
    fn test_flags() {
        let args = Args::try_parse_from([
            "termo-api",
            "--port",
            "8080",
            "--data-dir",
            "/tmp/termo",
            "--history-cap",
            "5",
            "--admin-code",
            "1234",
            "-v",
        ])
        .unwrap();
        assert_eq!(args.port, 8080);
        assert_eq!(args.data_dir, PathBuf::from("/tmp/termo"));
        assert_eq!(args.history_cap, 5);
        assert_eq!(args.admin_code.as_deref(), Some("1234"));
        assert!(args.verbose);
    }
}
