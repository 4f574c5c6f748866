//! RIPACrypt api serialization types

use crate::*;

/// Helper traits for api types - you probably don't need these unless
/// you are adding a new endpoint.
pub mod traits {
    use super::*;

    /// A "Response" type api object.
    pub trait AsRcResponse:
        'static
        + std::fmt::Debug
        + serde::Serialize
        + for<'de> serde::Deserialize<'de>
    {
        /// The status envelope every response carries.
        fn status(&self) -> &RcApiStatus;
    }

    /// A "Request" type api object.
    pub trait AsRcRequest: 'static + std::fmt::Debug + serde::Serialize {
        /// The "Response" type associated with this request type.
        type Response: AsRcResponse;

        /// Http method for this request. GET requests carry no body.
        const METHOD: RcMethod;

        /// If true, requests routed through Tor go to the hidden
        /// service base url when one is configured.
        const PREFER_HIDDEN_SERVICE: bool = false;

        /// Path relative to the base url, always with a trailing '/'.
        fn path(&self) -> String;
    }
}
use traits::*;

/// The status envelope shared by all responses.
/// Fields missing from the json decode as zero values.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RcApiStatus {
    /// numeric status code.
    pub status_code: i64,

    /// did the service accept the request.
    pub success: bool,

    /// human readable status message.
    #[serde(rename = "status_message")]
    pub message: String,

    /// api version.
    pub version: i64,
}

impl RcApiStatus {
    /// Turn a non-success envelope into an [RcError::Api].
    pub fn check(&self) -> RcResult<()> {
        if self.success {
            Ok(())
        } else {
            Err(RcError::Api {
                status_code: self.status_code,
                message: self.message.clone(),
            })
        }
    }
}

mod register;
pub use register::*;

mod challenge;
pub use challenge::*;

mod new_crypt;
pub use new_crypt::*;

mod get_crypt;
pub use get_crypt::*;

mod checkin;
pub use checkin::*;

mod new_btc;
pub use new_btc::*;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn status_envelope_is_lenient() {
        let status: RcApiStatus = serde_json::from_str("{}").unwrap();
        assert_eq!(RcApiStatus::default(), status);
        assert!(status.check().is_err());
    }

    #[test]
    fn non_success_becomes_api_error() {
        let status: RcApiStatus = serde_json::from_str(
            r#"{"status_code":404,"success":false,"status_message":"Crypt not found","version":1}"#,
        )
        .unwrap();
        match status.check().unwrap_err() {
            RcError::Api {
                status_code,
                message,
            } => {
                assert_eq!(404, status_code);
                assert_eq!("Crypt not found", message);
            }
            oth => panic!("unexpected {oth:?}"),
        }
    }

    #[test]
    fn request_paths() {
        assert_eq!("register/", RcApiReqRegister::new("k".into()).path());
        assert_eq!(
            "crypt/abc123/",
            RcApiReqGetCrypt::new("abc123".into()).path()
        );
        assert_eq!("crypt/new/", <RcApiReqNewCrypt as Default>::default().path());
        assert_eq!(RcMethod::Get, RcApiReqGetCrypt::METHOD);
        assert!(RcApiReqNewBtc::PREFER_HIDDEN_SERVICE);
        assert!(!RcApiReqCheckin::PREFER_HIDDEN_SERVICE);
    }
}
