use super::*;

/// Register a public key with the service, creating an account.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RcApiReqRegister {
    /// ascii-armored pgp public key.
    pub public_key: String,
}

impl RcApiReqRegister {
    /// Make a new register request.
    pub fn new(public_key: String) -> Self {
        Self { public_key }
    }
}

/// Response to a Register request.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RcApiResRegister {
    /// status envelope.
    #[serde(flatten)]
    pub status: RcApiStatus,

    /// bitcoin address assigned to the new account.
    pub btc_addr: String,

    /// the new account's user id.
    pub user_id: u64,
}

impl AsRcRequest for RcApiReqRegister {
    type Response = RcApiResRegister;
    const METHOD: RcMethod = RcMethod::Post;

    fn path(&self) -> String {
        "register/".to_string()
    }
}

impl AsRcResponse for RcApiResRegister {
    fn status(&self) -> &RcApiStatus {
        &self.status
    }
}
