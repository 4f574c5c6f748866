use super::*;

/// Ask the service for a challenge encrypted to the account's key.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RcApiReqChallenge {
    /// the registered user id.
    pub user_id: u64,

    /// key id of the registered public key.
    pub fingerprint: String,
}

impl RcApiReqChallenge {
    /// Make a new challenge request.
    pub fn new(user_id: u64, fingerprint: String) -> Self {
        Self {
            user_id,
            fingerprint,
        }
    }
}

/// Response to a Challenge request.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RcApiResChallenge {
    /// status envelope.
    #[serde(flatten)]
    pub status: RcApiStatus,

    /// base64 pgp message, decrypts to the challenge plaintext.
    pub challenge: String,

    /// identifies this challenge when it is answered.
    pub challenge_id: u64,

    /// the user id the challenge was issued for.
    pub user_id: u64,
}

impl AsRcRequest for RcApiReqChallenge {
    type Response = RcApiResChallenge;
    const METHOD: RcMethod = RcMethod::Post;

    fn path(&self) -> String {
        "challenge/".to_string()
    }
}

impl AsRcResponse for RcApiResChallenge {
    fn status(&self) -> &RcApiStatus {
        &self.status
    }
}
