#![deny(missing_docs)]
#![deny(unsafe_code)]

//! RIPACrypt dead man's switch command line client
//!
//! The `ripacrypt` binary keeps its account record in a single yaml file
//! (falling back to a legacy `rc.conf` on read) under the ripacrypt root
//! directory (`--ripacrypt-root`, env
//! `RIPACRYPT_ROOT`, default `~/.ripacrypt`). Logs go to stderr and are
//! filtered with `RUST_LOG`, stdout carries only command output.

use ripacrypt_api::dependencies::*;
use ripacrypt_api::prelude::*;
use std::path::{Path, PathBuf};

/// Re-exported dependencies.
pub mod dependencies {
    pub use ripacrypt_api::dependencies::*;
}

/// File name of the account record within the ripacrypt root.
pub const CONFIG_N: &str = "ripacrypt-account.yaml";

/// File name of the legacy json account record within the ripacrypt
/// root. Read when [CONFIG_N] is missing, never written.
pub const LEGACY_CONFIG_N: &str = "rc.conf";

/// Name of the root directory under the home directory.
pub const DEFAULT_ROOT_N: &str = ".ripacrypt";

/// `~/.ripacrypt`, or `./.ripacrypt` if no home directory can be found.
pub fn default_root() -> PathBuf {
    match directories::BaseDirs::new() {
        Some(dirs) => dirs.home_dir().join(DEFAULT_ROOT_N),
        None => PathBuf::from(DEFAULT_ROOT_N),
    }
}

/// Create the root directory if needed and canonicalize it.
pub fn prepare_root(root: &Path) -> RcResult<PathBuf> {
    std::fs::create_dir_all(root).map_err(|e| {
        RcError::Config(format!("could not create ripacrypt root {root:?}: {e}"))
    })?;
    Ok(dunce::canonicalize(root)?)
}

/// Path of the account record within `root`.
pub fn account_path(root: &Path) -> PathBuf {
    root.join(CONFIG_N)
}

/// Path of the legacy account record within `root`.
pub fn legacy_account_path(root: &Path) -> PathBuf {
    root.join(LEGACY_CONFIG_N)
}

/// Install the stderr log subscriber, filtered by `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing::subscriber::set_global_default(
        tracing_subscriber::FmtSubscriber::builder()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_writer(std::io::stderr)
            .compact()
            .finish(),
    );
}
