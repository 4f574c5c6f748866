//! proof of key possession
//!
//! Every write operation is authorized by a fresh challenge: the service
//! encrypts a value to the account's registered public key, the client
//! decrypts it locally and sends the plaintext back alongside the write.

use crate::*;
use zeroize::Zeroizing;

/// A decrypted challenge, ready to accompany one write request.
pub struct RcProof {
    /// decrypted challenge plaintext.
    pub challenge: Zeroizing<String>,
    /// id of the challenge this answers.
    pub challenge_id: u64,
}

impl std::fmt::Debug for RcProof {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RcProof")
            .field("challenge_id", &self.challenge_id)
            .finish()
    }
}

impl RcClient {
    /// Request an encrypted challenge for a registered account.
    pub fn get_challenge(&self, account: &RcAccount) -> RcResult<RcApiResChallenge> {
        account.require_registered()?;
        self.request(&RcApiReqChallenge::new(
            account.user_id,
            account.fingerprint.clone(),
        ))
    }

    /// Fetch and decrypt a fresh challenge. Errors are tagged with
    /// [RcStep::ChallengeFetch] or [RcStep::ChallengeDecrypt], and nothing
    /// is submitted if either fails.
    pub fn prove_key_possession(&self, account: &RcAccount) -> RcResult<RcProof> {
        let res = self.get_challenge(account).step(RcStep::ChallengeFetch)?;

        let plain = decrypt_with_private_key(&account.private_key, &res.challenge)
            .step(RcStep::ChallengeDecrypt)?;
        let challenge = String::from_utf8(plain).map_err(|e| {
            RcError::Decryption(format!("challenge is not utf8: {e}"))
                .in_step(RcStep::ChallengeDecrypt)
        })?;

        tracing::debug!(challenge_id = res.challenge_id, "challenge decrypted");

        Ok(RcProof {
            challenge: Zeroizing::new(challenge),
            challenge_id: res.challenge_id,
        })
    }
}
