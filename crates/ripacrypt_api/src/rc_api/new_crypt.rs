use super::*;

/// A crypt as the service reports it.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RcCrypt {
    /// identifier assigned by the service.
    pub crypt_id: String,

    /// stored content, base64 pgp message unless uploaded pre-encrypted.
    #[serde(rename = "ciphertext")]
    pub crypt_content: String,

    /// creation time, unix seconds.
    #[serde(rename = "crypt_timestamp")]
    pub created_at: i64,

    /// free text description.
    #[serde(rename = "crypt_description")]
    pub description: String,

    /// the service has destroyed this crypt.
    #[serde(rename = "is_crypt_destroyed")]
    pub destroyed: bool,

    /// last check-in time, unix seconds.
    pub last_checkin: i64,

    /// seconds allowed between check-ins.
    #[serde(rename = "check_in_duration")]
    pub checkin_duration: i64,

    /// missed check-ins tolerated before destruction.
    pub miss_count: i64,
}

/// Create a new crypt. Carries a challenge proof.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct RcApiReqNewCrypt {
    /// the registered user id.
    pub user_id: u64,

    /// content to store.
    pub crypt_content: String,

    /// decrypted challenge plaintext.
    pub challenge: String,

    /// id of the answered challenge.
    pub challenge_id: u64,

    /// free text description.
    pub description: String,

    /// seconds allowed between check-ins.
    pub checkin_duration: i64,

    /// missed check-ins tolerated before destruction.
    pub miss_count: i64,
}

/// Response carrying a crypt, used by NewCrypt and GetCrypt.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RcApiResCrypt {
    /// status envelope.
    #[serde(flatten)]
    pub status: RcApiStatus,

    /// the crypt.
    pub crypt: RcCrypt,
}

impl AsRcRequest for RcApiReqNewCrypt {
    type Response = RcApiResCrypt;
    const METHOD: RcMethod = RcMethod::Post;

    fn path(&self) -> String {
        "crypt/new/".to_string()
    }
}

impl AsRcResponse for RcApiResCrypt {
    fn status(&self) -> &RcApiStatus {
        &self.status
    }
}
