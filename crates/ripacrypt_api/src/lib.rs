#![deny(missing_docs)]
//! RIPACrypt dead man's switch client
//!
//! Register an account bound to a PGP key, store crypts encrypted to that
//! key, and keep them alive by checking in before their deadline. Every
//! write is authorized by decrypting a fresh challenge from the service.
//!
//! ```no_run
//! use ripacrypt_api::prelude::*;
//!
//! # fn main() -> RcResult<()> {
//! let mut account = RcAccount::default();
//! let client = RcClient::connect(account.endpoint_config(), account.route(false))?;
//! client.register(&mut account, RcKeySource::default())?;
//! let crypt = client.create_crypt(&account, RcNewCrypt::new("my secret"))?;
//! client.check_in(&account, &crypt.crypt.crypt_id)?;
//! # Ok(())
//! # }
//! ```

mod error;
pub use error::*;

mod config;
pub use config::*;

pub mod pgp;
pub use pgp::*;

pub mod transport;
pub use transport::*;

pub mod rc_api;
pub use rc_api::*;

mod rc_client;
pub use rc_client::*;

mod account;
pub use account::*;

mod challenge;
pub use challenge::*;

mod register;
pub use register::*;

mod crypt;
pub use crypt::*;

pub mod test_service;

/// Re-exported dependencies.
pub mod dependencies {
    pub use serde;
    pub use serde_json;
    pub use serde_yaml;
    pub use tracing;
    pub use url;
    pub use zeroize;
}

/// Everything needed to drive the client.
pub mod prelude {
    pub use crate::rc_api::traits::*;
    pub use crate::transport::traits::*;
    pub use crate::*;
}
