//! crypt lifecycle and payout address rotation

use crate::*;

/// Default seconds allowed between check-ins.
pub const DEFAULT_CHECKIN_DURATION: i64 = 86400;

/// Default missed check-ins tolerated before destruction.
pub const DEFAULT_MISS_COUNT: i64 = 3;

/// Parameters for a new crypt.
#[derive(Clone)]
pub struct RcNewCrypt {
    /// content to store.
    pub payload: Vec<u8>,

    /// the payload is already a base64 pgp message, send it verbatim.
    pub already_encrypted: bool,

    /// free text description.
    pub description: String,

    /// seconds allowed between check-ins, must be positive.
    pub checkin_duration: i64,

    /// missed check-ins tolerated before destruction, must not be negative.
    pub miss_count: i64,
}

impl Default for RcNewCrypt {
    fn default() -> Self {
        Self {
            payload: Vec::new(),
            already_encrypted: false,
            description: String::new(),
            checkin_duration: DEFAULT_CHECKIN_DURATION,
            miss_count: DEFAULT_MISS_COUNT,
        }
    }
}

impl std::fmt::Debug for RcNewCrypt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RcNewCrypt")
            .field("payload_len", &self.payload.len())
            .field("already_encrypted", &self.already_encrypted)
            .field("description", &self.description)
            .field("checkin_duration", &self.checkin_duration)
            .field("miss_count", &self.miss_count)
            .finish()
    }
}

impl RcNewCrypt {
    /// New crypt parameters for `payload` with default timing.
    pub fn new(payload: impl Into<Vec<u8>>) -> Self {
        Self {
            payload: payload.into(),
            ..Default::default()
        }
    }

    fn check(&self) -> RcResult<()> {
        if self.checkin_duration <= 0 {
            return Err(RcError::InvalidInput(format!(
                "check-in duration must be positive, got {}",
                self.checkin_duration
            )));
        }
        if self.miss_count < 0 {
            return Err(RcError::InvalidInput(format!(
                "miss count must not be negative, got {}",
                self.miss_count
            )));
        }
        Ok(())
    }
}

/// Acknowledgement required to rotate the payout address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RcAddressRotation {
    /// Refuse, nothing is sent.
    Unacknowledged,
    /// The caller accepts that the current address is lost for good.
    Acknowledged,
}

/// Crypt ids are placed in the request path, so they may not be empty
/// or carry anything that would change which path is addressed. `new`
/// is refused as well, `crypt/new/` is the create endpoint.
pub fn check_crypt_id(crypt_id: &str) -> RcResult<()> {
    if crypt_id.is_empty() {
        return Err(RcError::InvalidInput("crypt id is required".into()));
    }
    if crypt_id == "."
        || crypt_id == ".."
        || crypt_id == "new"
        || crypt_id
            .chars()
            .any(|c| c.is_whitespace() || c.is_control() || "/?#%\\".contains(c))
    {
        return Err(RcError::InvalidInput(format!(
            "invalid crypt id {crypt_id:?}"
        )));
    }
    Ok(())
}

impl RcClient {
    /// Store a new crypt. Unless already encrypted the payload is
    /// encrypted to the account's own public key first, before any
    /// challenge is requested.
    pub fn create_crypt(
        &self,
        account: &RcAccount,
        new_crypt: RcNewCrypt,
    ) -> RcResult<RcApiResCrypt> {
        account.require_registered()?;
        new_crypt.check()?;

        let crypt_content = if new_crypt.already_encrypted {
            String::from_utf8(new_crypt.payload).map_err(|_| {
                RcError::InvalidInput(
                    "pre-encrypted payload must be base64 text".into(),
                )
            })?
        } else {
            encrypt_to_public_key(&account.public_key, &new_crypt.payload)
                .step(RcStep::Encrypt)?
        };

        let proof = self.prove_key_possession(account)?;

        let res = self
            .request(&RcApiReqNewCrypt {
                user_id: account.user_id,
                crypt_content,
                challenge: proof.challenge.as_str().to_owned(),
                challenge_id: proof.challenge_id,
                description: new_crypt.description,
                checkin_duration: new_crypt.checkin_duration,
                miss_count: new_crypt.miss_count,
            })
            .step(RcStep::Submit)?;

        if res.crypt.crypt_id.is_empty() {
            return Err(RcError::Api {
                status_code: res.status.status_code,
                message: "service reported success without a crypt id"
                    .to_string(),
            }
            .in_step(RcStep::Submit));
        }

        tracing::info!(crypt_id = %res.crypt.crypt_id, "crypt created");

        Ok(res)
    }

    /// Check in on a crypt, resetting its deadline.
    pub fn check_in(
        &self,
        account: &RcAccount,
        crypt_id: &str,
    ) -> RcResult<RcApiResCheckin> {
        account.require_registered()?;
        check_crypt_id(crypt_id)?;

        let proof = self.prove_key_possession(account)?;

        let res = self
            .request(&RcApiReqCheckin {
                crypt_id: crypt_id.to_string(),
                user_id: account.user_id,
                challenge: proof.challenge.as_str().to_owned(),
                challenge_id: proof.challenge_id,
            })
            .step(RcStep::Submit)?;

        tracing::info!(%crypt_id, message = %res.status.message, "checked in");

        Ok(res)
    }

    /// Fetch a crypt. No proof is involved.
    pub fn get_crypt(&self, crypt_id: &str) -> RcResult<RcApiResCrypt> {
        check_crypt_id(crypt_id)?;
        self.request(&RcApiReqGetCrypt::new(crypt_id.to_string()))
            .step(RcStep::Fetch)
    }

    /// Replace the account's payout address, updating `account` on
    /// success. The previous address is not retained by the service.
    pub fn request_new_address(
        &self,
        account: &mut RcAccount,
        rotation: RcAddressRotation,
    ) -> RcResult<RcApiResNewBtc> {
        if rotation != RcAddressRotation::Acknowledged {
            return Err(RcError::Unacknowledged);
        }
        account.require_registered()?;

        let proof = self.prove_key_possession(account)?;

        let res = self
            .request(&RcApiReqNewBtc {
                user_id: account.user_id,
                challenge: proof.challenge.as_str().to_owned(),
                challenge_id: proof.challenge_id,
            })
            .step(RcStep::Submit)?;

        tracing::warn!(
            old = %account.btc_addr,
            new = %res.btc_addr,
            "payout address replaced",
        );
        account.btc_addr = res.btc_addr.clone();

        Ok(res)
    }
}

/// Decrypt a crypt's content with the account's private key.
pub fn decrypt_crypt(crypt: &RcCrypt, account: &RcAccount) -> RcResult<Vec<u8>> {
    decrypt_with_private_key(&account.private_key, &crypt.crypt_content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crypt_id_checks() {
        check_crypt_id("a1B2_c-3").unwrap();
        check_crypt_id("news").unwrap();
        for bad in ["", ".", "..", "new", "a/b", "a?b", "a#b", "a b", "%2e"] {
            assert!(
                matches!(check_crypt_id(bad), Err(RcError::InvalidInput(_))),
                "{bad:?}"
            );
        }
    }

    #[test]
    fn new_crypt_defaults() {
        let c = RcNewCrypt::new("x");
        assert_eq!(86400, c.checkin_duration);
        assert_eq!(3, c.miss_count);
        assert!(!c.already_encrypted);
        c.check().unwrap();
    }

    #[test]
    fn bad_timing_is_rejected() {
        let c = RcNewCrypt {
            checkin_duration: 0,
            ..RcNewCrypt::new("x")
        };
        assert!(matches!(c.check(), Err(RcError::InvalidInput(_))));
        let c = RcNewCrypt {
            miss_count: -1,
            ..RcNewCrypt::new("x")
        };
        assert!(matches!(c.check(), Err(RcError::InvalidInput(_))));
    }
}
