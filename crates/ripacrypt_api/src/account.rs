//! the locally persisted account record

use crate::*;
use std::path::Path;
use zeroize::Zeroizing;

/// The local account. Created by registration, the user id never
/// changes once the service has assigned one. Only the public half of
/// the key material is ever sent anywhere.
///
/// The yaml field names match the json names of the legacy `rc.conf`
/// record, so a legacy file (json being a subset of yaml) loads as is.
#[derive(Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RcAccount {
    /// route every request through Tor.
    #[serde(rename = "usetor")]
    pub use_tor: bool,

    /// user id assigned at registration, zero means unregistered.
    #[serde(rename = "userid")]
    pub user_id: u64,

    /// bitcoin payout address.
    #[serde(rename = "btcaddr")]
    pub btc_addr: String,

    /// ascii-armored public key.
    pub public_key: String,

    /// ascii-armored private key.
    pub private_key: Zeroizing<String>,

    /// key id of the public key.
    pub fingerprint: String,

    /// endpoint overrides, the public service is used if absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoints: Option<RcEndpointConfigInner>,
}

impl std::fmt::Debug for RcAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RcAccount")
            .field("use_tor", &self.use_tor)
            .field("user_id", &self.user_id)
            .field("btc_addr", &self.btc_addr)
            .field("fingerprint", &self.fingerprint)
            .field("has_private_key", &!self.private_key.is_empty())
            .field("endpoints", &self.endpoints)
            .finish()
    }
}

impl std::fmt::Display for RcAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = serde_yaml::to_string(self).map_err(|_| std::fmt::Error)?;
        f.write_str(&s)
    }
}

impl RcAccount {
    /// Decode an account from yaml (or legacy json) bytes.
    pub fn from_bytes(bytes: &[u8]) -> RcResult<Self> {
        serde_yaml::from_slice(bytes)
            .map_err(|e| RcError::Config(format!("invalid account record: {e}")))
    }

    /// Load the account at `path`. A missing file is an unregistered
    /// default account, an unreadable or corrupt file is an error.
    pub fn load(path: &Path) -> RcResult<Self> {
        match Self::read(path)? {
            Some(account) => Ok(account),
            None => {
                tracing::warn!(?path, "no account record found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Like [RcAccount::load], but if `path` is missing the legacy json
    /// record at `legacy_path` is loaded instead. It is never written,
    /// the next save goes to `path`.
    pub fn load_with_legacy(path: &Path, legacy_path: &Path) -> RcResult<Self> {
        if let Some(account) = Self::read(path)? {
            return Ok(account);
        }
        match Self::read(legacy_path)? {
            Some(account) => {
                tracing::info!(
                    ?legacy_path,
                    user_id = account.user_id,
                    "loaded legacy account record",
                );
                Ok(account)
            }
            None => Self::load(path),
        }
    }

    fn read(path: &Path) -> RcResult<Option<Self>> {
        match std::fs::read(path) {
            Ok(bytes) => Self::from_bytes(&bytes).map(Some),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(RcError::Config(format!(
                "could not read account record {path:?}: {e}"
            ))),
        }
    }

    /// Write the account to `path`, readable by the owner only.
    pub fn save(&self, path: &Path) -> RcResult<()> {
        let yaml = serde_yaml::to_string(self)?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    RcError::Config(format!("could not create {parent:?}: {e}"))
                })?;
            }
        }

        let mut opts = std::fs::OpenOptions::new();
        opts.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            opts.mode(0o600);
        }

        use std::io::Write;
        let mut file = opts.open(path).map_err(|e| {
            RcError::Config(format!("could not write account record {path:?}: {e}"))
        })?;
        // an existing file keeps its mode on open
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
        }
        file.write_all(yaml.as_bytes())?;
        file.sync_all()?;

        tracing::debug!(?path, "saved account record");

        Ok(())
    }

    /// True once the service has assigned a user id.
    pub fn is_registered(&self) -> bool {
        self.user_id != 0
    }

    /// Error with [RcError::NotRegistered] unless registered.
    pub fn require_registered(&self) -> RcResult<()> {
        if self.is_registered() {
            Ok(())
        } else {
            Err(RcError::NotRegistered)
        }
    }

    /// The endpoint configuration for this account.
    pub fn endpoint_config(&self) -> RcEndpointConfig {
        RcEndpointConfigBuilder::from_config(self.endpoints.clone().unwrap_or_default())
            .build()
    }

    /// The route requests for this account take.
    pub fn route(&self, flag_use_tor: bool) -> RcRoute {
        RcRoute::select(self.use_tor, flag_use_tor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn legacy_json_record_loads() {
        let acct = RcAccount::from_bytes(
            br#"{"usetor":true,"userid":42,"btcaddr":"1abc","public_key":"-----BEGIN PGP PUBLIC KEY BLOCK-----\nxx\n","private_key":"secret","fingerprint":"0123456789ABCDEF"}"#,
        )
        .unwrap();
        assert!(acct.use_tor);
        assert_eq!(42, acct.user_id);
        assert_eq!("1abc", acct.btc_addr);
        assert_eq!("-----BEGIN PGP PUBLIC KEY BLOCK-----\nxx\n", acct.public_key);
        assert_eq!("secret", acct.private_key.as_str());
        assert_eq!(None, acct.endpoints);
    }

    #[test]
    fn yaml_round_trip_keeps_wire_names() {
        let acct = RcAccount {
            user_id: 7,
            btc_addr: "1xyz".into(),
            ..Default::default()
        };
        let yaml = acct.to_string();
        assert!(yaml.contains("userid: 7"), "{yaml}");
        assert!(yaml.contains("btcaddr: 1xyz"), "{yaml}");
        assert!(!yaml.contains("endpoints"), "{yaml}");
        let back = RcAccount::from_bytes(yaml.as_bytes()).unwrap();
        assert_eq!(7, back.user_id);
    }

    #[test]
    fn debug_hides_private_key() {
        let acct = RcAccount {
            private_key: Zeroizing::new("very secret".into()),
            ..Default::default()
        };
        assert!(!format!("{acct:?}").contains("very secret"));
    }

    #[test]
    fn registration_state() {
        let mut acct = RcAccount::default();
        assert!(!acct.is_registered());
        assert!(matches!(
            acct.require_registered(),
            Err(RcError::NotRegistered)
        ));
        acct.user_id = 1;
        acct.require_registered().unwrap();
    }
}
