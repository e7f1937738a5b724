//! keyvert CLI
//!
//! Batch-converts EIP-2335 validator keystores: every keystore in the source
//! directory is decrypted with its password file and re-encrypted into the
//! destination directory under fresh salt, IV, and UUID.

use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum};
use keyvert::{execute, NamingMode, RunConfig};
use keyvert_keystore::{KdfFunction, RecryptOptions};
use tracing_subscriber::EnvFilter;

/// Re-encrypt a directory of EIP-2335 keystores
#[derive(Parser, Debug)]
#[command(name = "keyvert")]
#[command(version)]
#[command(about = "Batch converter for BLS12-381 validator keystores", long_about = None)]
#[command(disable_version_flag = true)]
struct Cli {
    /// Source directory of keystores
    #[arg(short = 's', long)]
    src: PathBuf,

    /// Destination directory (created if missing)
    #[arg(short = 'd', long)]
    dest: PathBuf,

    /// Directory of password files
    #[arg(short = 'w', long = "password_dir")]
    password_dir: PathBuf,

    /// On-disk naming convention for keystores and passwords
    #[arg(short = 'm', long, value_enum, default_value = "WEB3SIGNER")]
    mode: NamingMode,

    /// KDF for the re-encrypted output
    #[arg(short = 'k', long, value_enum, default_value = "PBKDF2")]
    kdf: KdfArg,

    /// PBKDF2 iteration count (test-grade default; raise for production)
    #[arg(short = 'c', default_value_t = 1)]
    pbkdf2_count: u32,

    /// scrypt CPU/memory cost, must be a power of 2
    #[arg(short = 'n', default_value_t = 2)]
    scrypt_n: u64,

    /// scrypt parallelization
    #[arg(short = 'p', default_value_t = 1)]
    scrypt_p: u32,

    /// scrypt block size
    #[arg(short = 'r', default_value_t = 8)]
    scrypt_r: u32,

    /// Print version
    #[arg(short = 'v', long = "version", action = ArgAction::Version)]
    version: Option<bool>,
}

/// KDF selection for the output keystores
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
enum KdfArg {
    /// PBKDF2-HMAC-SHA256
    #[default]
    #[value(name = "PBKDF2")]
    Pbkdf2,

    /// scrypt
    #[value(name = "SCRYPT")]
    Scrypt,
}

impl From<KdfArg> for KdfFunction {
    fn from(arg: KdfArg) -> Self {
        match arg {
            KdfArg::Pbkdf2 => KdfFunction::Pbkdf2,
            KdfArg::Scrypt => KdfFunction::Scrypt,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    init_tracing();

    let config = RunConfig {
        src: cli.src,
        dest: cli.dest,
        password_dir: cli.password_dir,
        mode: cli.mode,
        options: RecryptOptions {
            kdf: cli.kdf.into(),
            pbkdf2_count: cli.pbkdf2_count,
            scrypt_n: cli.scrypt_n,
            scrypt_r: cli.scrypt_r,
            scrypt_p: cli.scrypt_p,
        },
    };

    match execute(&config) {
        Ok(summary) if summary.is_success() => {
            tracing::info!(converted = summary.converted, "conversion finished");
        }
        Ok(summary) => {
            eprintln!(
                "Error: {} of {} keystores failed to convert",
                summary.failed.len(),
                summary.converted + summary.failed.len()
            );
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["keyvert", "-s", "src", "-d", "dest", "-w", "passwords"]);

        assert_eq!(cli.mode, NamingMode::Web3signer);
        assert_eq!(cli.kdf, KdfArg::Pbkdf2);
        assert_eq!(cli.pbkdf2_count, 1);
        assert_eq!(cli.scrypt_n, 2);
        assert_eq!(cli.scrypt_p, 1);
        assert_eq!(cli.scrypt_r, 8);
    }

    #[test]
    fn test_short_and_long_flags() {
        let cli = Cli::parse_from([
            "keyvert",
            "--src",
            "a",
            "--dest",
            "b",
            "--password_dir",
            "c",
            "-m",
            "NIMBUS",
            "-k",
            "SCRYPT",
            "-c",
            "262144",
            "-n",
            "131072",
            "-p",
            "2",
            "-r",
            "16",
        ]);

        assert_eq!(cli.mode, NamingMode::Nimbus);
        assert_eq!(cli.kdf, KdfArg::Scrypt);
        assert_eq!(cli.pbkdf2_count, 262_144);
        assert_eq!(cli.scrypt_n, 131_072);
        assert_eq!(cli.scrypt_p, 2);
        assert_eq!(cli.scrypt_r, 16);
    }

    #[test]
    fn test_missing_required_args_fail() {
        let result = Cli::try_parse_from(["keyvert", "-s", "src"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_short_version_flag() {
        let err = Cli::try_parse_from(["keyvert", "-v"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_version_field_is_only_a_flag() {
        let cli = Cli::parse_from(["keyvert", "-s", "a", "-d", "b", "-w", "c"]);
        assert!(cli.version.is_none());
    }
}
