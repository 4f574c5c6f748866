use super::*;

/// Fetch a crypt by id. No proof required.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RcApiReqGetCrypt {
    /// crypt to fetch, sent in the path only.
    #[serde(skip)]
    pub crypt_id: String,
}

impl RcApiReqGetCrypt {
    /// Make a new get crypt request.
    pub fn new(crypt_id: String) -> Self {
        Self { crypt_id }
    }
}

impl AsRcRequest for RcApiReqGetCrypt {
    type Response = RcApiResCrypt;
    const METHOD: RcMethod = RcMethod::Get;

    fn path(&self) -> String {
        format!("crypt/{}/", self.crypt_id)
    }
}
