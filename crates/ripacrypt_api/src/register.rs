//! account registration

use crate::*;
use zeroize::Zeroizing;

/// Where the key material for a new account comes from.
#[derive(Debug, Clone)]
pub enum RcKeySource {
    /// An existing armored public key. No private key is held locally,
    /// so write operations will fail at challenge decryption.
    PublicKey(String),

    /// Generate a fresh key pair locally.
    Generate(RcKeyAlgorithm, RcIdentity),
}

impl Default for RcKeySource {
    fn default() -> Self {
        Self::Generate(RcKeyAlgorithm::default(), RcIdentity::default())
    }
}

impl RcClient {
    /// Register a new account and record the assigned user id, payout
    /// address and key material in `account`.
    ///
    /// Refuses with [RcError::AlreadyRegistered] before generating keys
    /// or touching the network if `account` already has a user id.
    /// `account` is left untouched on any failure.
    pub fn register(
        &self,
        account: &mut RcAccount,
        key_source: RcKeySource,
    ) -> RcResult<RcApiResRegister> {
        if account.is_registered() {
            return Err(RcError::AlreadyRegistered(account.user_id));
        }

        let (public_key, private_key, fingerprint) = match key_source {
            RcKeySource::PublicKey(public_key) => {
                let fingerprint = public_key_fingerprint(&public_key)?;
                (public_key, Zeroizing::new(String::new()), fingerprint)
            }
            RcKeySource::Generate(algorithm, identity) => {
                let pair = generate_key_pair(&identity, algorithm)?;
                (pair.public_key, pair.private_key, pair.fingerprint)
            }
        };

        let res = self
            .request(&RcApiReqRegister::new(public_key.clone()))
            .step(RcStep::Register)?;

        if res.user_id == 0 {
            return Err(RcError::Api {
                status_code: res.status.status_code,
                message: "service reported success without assigning a user id"
                    .to_string(),
            }
            .in_step(RcStep::Register));
        }

        tracing::info!(user_id = res.user_id, %fingerprint, "registered");

        account.user_id = res.user_id;
        account.btc_addr = res.btc_addr.clone();
        account.public_key = public_key;
        account.private_key = private_key;
        account.fingerprint = fingerprint;

        Ok(res)
    }
}
