use super::*;

/// Replace the account's bitcoin address. Carries a challenge proof.
/// The previous address is unrecoverable afterwards.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RcApiReqNewBtc {
    /// the registered user id.
    pub user_id: u64,

    /// decrypted challenge plaintext.
    pub challenge: String,

    /// id of the answered challenge.
    pub challenge_id: u64,
}

/// Response to a NewBtc request.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RcApiResNewBtc {
    /// status envelope.
    #[serde(flatten)]
    pub status: RcApiStatus,

    /// the replacement address.
    pub btc_addr: String,

    /// the account's user id.
    pub user_id: u64,
}

impl AsRcRequest for RcApiReqNewBtc {
    type Response = RcApiResNewBtc;
    const METHOD: RcMethod = RcMethod::Post;
    const PREFER_HIDDEN_SERVICE: bool = true;

    fn path(&self) -> String {
        "newbtc/".to_string()
    }
}

impl AsRcResponse for RcApiResNewBtc {
    fn status(&self) -> &RcApiStatus {
        &self.status
    }
}
