use ripacrypt_api::dependencies::*;
use ripacrypt_api::prelude::*;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// The mock server runs on its own thread, the blocking client must
/// not be driven from inside this runtime.
fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

fn json_response(body: &'static str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body, "application/json")
}

fn client_for(server: &MockServer) -> RcClient {
    let base_url = url::Url::parse(&format!("{}/1/", server.uri())).unwrap();
    let config = RcEndpointConfigInner::builder().set_base_url(base_url).build();
    RcClient::connect(config, RcRoute::Direct).unwrap()
}

#[test]
fn requests_carry_version_and_content_type() {
    let rt = runtime();
    let server = rt.block_on(async {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/1/challenge/"))
            .and(header(CLIENT_VERSION_HEADER, CLIENT_VERSION))
            .and(header("content-type", "application/json"))
            .respond_with(json_response(
                r#"{"challenge":"abc","challenge_id":9,"user_id":5,"status_code":200,"success":true,"status_message":"","version":1}"#,
            ))
            .expect(1)
            .mount(&server)
            .await;
        server
    });

    let res = client_for(&server)
        .request(&RcApiReqChallenge::new(5, "0123456789ABCDEF".into()))
        .unwrap();
    assert_eq!(9, res.challenge_id);
    assert_eq!("abc", res.challenge);

    let received = rt.block_on(server.received_requests()).unwrap();
    assert_eq!(1, received.len());
    let body: serde_json::Value =
        serde_json::from_slice(&received[0].body).unwrap();
    assert_eq!(5, body["user_id"]);
    assert_eq!("0123456789ABCDEF", body["fingerprint"]);

    rt.block_on(server.verify());
}

#[test]
fn non_success_envelope_over_http_is_api_error() {
    let rt = runtime();
    let server = rt.block_on(async {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/1/crypt/abc/"))
            .respond_with(json_response(
                r#"{"status_code":404,"success":false,"status_message":"Crypt not found","version":1}"#,
            ))
            .expect(1)
            .mount(&server)
            .await;
        server
    });

    let err = client_for(&server).get_crypt("abc").unwrap_err();
    assert!(err.is_api(), "{err:?}");
    assert_eq!(Some(RcStep::Fetch), err.step());

    let received = rt.block_on(server.received_requests()).unwrap();
    assert_eq!(1, received.len());
    assert!(received[0].body.is_empty());

    rt.block_on(server.verify());
}

#[test]
fn non_json_body_is_malformed_response() {
    let rt = runtime();
    let server = rt.block_on(async {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/1/crypt/abc/"))
            .respond_with(
                ResponseTemplate::new(502).set_body_string("<html>bad gateway</html>"),
            )
            .mount(&server)
            .await;
        server
    });

    let err = client_for(&server).get_crypt("abc").unwrap_err();
    assert!(
        matches!(err.root(), RcError::MalformedResponse(m) if m.contains("502")),
        "{err:?}"
    );
}
