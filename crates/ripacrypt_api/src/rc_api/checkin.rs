use super::*;

/// Check in on a crypt, resetting its timer. Carries a challenge proof.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RcApiReqCheckin {
    /// crypt to check in on, sent in the path only.
    #[serde(skip)]
    pub crypt_id: String,

    /// the registered user id.
    pub user_id: u64,

    /// decrypted challenge plaintext.
    pub challenge: String,

    /// id of the answered challenge.
    pub challenge_id: u64,
}

/// Response to a Checkin request.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RcApiResCheckin {
    /// status envelope, the message describes the outcome.
    #[serde(flatten)]
    pub status: RcApiStatus,

    /// the crypt after check-in, if the service includes it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crypt: Option<RcCrypt>,
}

impl AsRcRequest for RcApiReqCheckin {
    type Response = RcApiResCheckin;
    const METHOD: RcMethod = RcMethod::Post;

    fn path(&self) -> String {
        format!("crypt/{}/", self.crypt_id)
    }
}

impl AsRcResponse for RcApiResCheckin {
    fn status(&self) -> &RcApiStatus {
        &self.status
    }
}
