use pretty_assertions::assert_eq;
use ripacrypt_api::dependencies::*;
use ripacrypt_api::prelude::*;
use ripacrypt_api::test_service::*;

fn init_tracing() {
    let _ = tracing::subscriber::set_global_default(
        tracing_subscriber::FmtSubscriber::builder()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .compact()
            .finish(),
    );
}

fn registered() -> (RcTestService, RcClient, RcAccount) {
    init_tracing();
    let svc = RcTestService::new();
    let client = svc.client();
    let mut account = RcAccount::default();
    client
        .register(
            &mut account,
            RcKeySource::Generate(RcKeyAlgorithm::Cv25519, RcIdentity::default()),
        )
        .unwrap();
    (svc, client, account)
}

fn bodies_for(svc: &RcTestService, suffix: &str) -> Vec<serde_json::Value> {
    svc.requests()
        .into_iter()
        .filter(|r| r.url.as_str().ends_with(suffix))
        .filter_map(|r| r.body)
        .collect()
}

#[test]
fn register_generates_and_records_keys() {
    let (svc, _client, account) = registered();

    assert!(account.is_registered());
    assert_eq!(16, account.fingerprint.len());
    assert!(account.public_key.contains("PUBLIC KEY BLOCK"));
    assert!(account.private_key.contains("PRIVATE KEY BLOCK"));
    assert_eq!(svc.btc_addr(account.user_id), Some(account.btc_addr.clone()));

    // only the public half is transmitted
    let sent = bodies_for(&svc, "register/");
    assert_eq!(1, sent.len());
    assert_eq!(account.public_key, sent[0]["public_key"]);
    assert!(!sent[0].to_string().contains("PRIVATE KEY"));
}

#[test]
fn create_crypt_encrypts_to_own_key() {
    let (svc, client, account) = registered();

    let res = client
        .create_crypt(
            &account,
            RcNewCrypt {
                description: "d".into(),
                ..RcNewCrypt::new("secret")
            },
        )
        .unwrap();
    let crypt = res.crypt;

    assert!(!crypt.crypt_id.is_empty());
    assert!(!crypt.destroyed);
    assert_eq!("d", crypt.description);
    assert_eq!(86400, crypt.checkin_duration);
    assert_eq!(3, crypt.miss_count);

    let sent = bodies_for(&svc, "crypt/new/");
    assert_eq!(1, sent.len());
    let content = sent[0]["crypt_content"].as_str().unwrap();
    assert_ne!("secret", content);
    assert_eq!(
        b"secret".to_vec(),
        decrypt_with_private_key(&account.private_key, content).unwrap()
    );
    assert_eq!(b"secret".to_vec(), decrypt_crypt(&crypt, &account).unwrap());
}

#[test]
fn pre_encrypted_payload_is_sent_verbatim() {
    let (svc, client, account) = registered();

    client
        .create_crypt(
            &account,
            RcNewCrypt {
                already_encrypted: true,
                ..RcNewCrypt::new("aGVsbG8=")
            },
        )
        .unwrap();

    let sent = bodies_for(&svc, "crypt/new/");
    assert_eq!("aGVsbG8=", sent[0]["crypt_content"]);
}

#[test]
fn bad_timing_sends_nothing() {
    let (svc, client, account) = registered();
    let before = svc.requests().len();

    let err = client
        .create_crypt(
            &account,
            RcNewCrypt {
                checkin_duration: -5,
                ..RcNewCrypt::new("x")
            },
        )
        .unwrap_err();

    assert!(matches!(err, RcError::InvalidInput(_)), "{err:?}");
    assert_eq!(before, svc.requests().len());
}

#[test]
fn each_write_fetches_a_fresh_challenge() {
    let (svc, client, account) = registered();

    let crypt = client
        .create_crypt(&account, RcNewCrypt::new("x"))
        .unwrap()
        .crypt;
    client.check_in(&account, &crypt.crypt_id).unwrap();
    client.check_in(&account, &crypt.crypt_id).unwrap();

    let ids: Vec<u64> = svc
        .requests()
        .into_iter()
        .filter(|r| r.url.path() != "/1/challenge/")
        .filter_map(|r| r.body)
        .filter_map(|b| b["challenge_id"].as_u64())
        .collect();
    assert_eq!(3, ids.len());
    assert!(ids[0] != ids[1] && ids[1] != ids[2], "{ids:?}");
}

#[test]
fn failed_decrypt_prevents_submit() {
    let (svc, client, mut account) = registered();

    // a different key cannot open challenges minted for the registered one
    let other = generate_key_pair(&RcIdentity::default(), RcKeyAlgorithm::Cv25519)
        .unwrap();
    account.private_key = other.private_key;

    let err = client
        .create_crypt(&account, RcNewCrypt::new("x"))
        .unwrap_err();

    assert_eq!(Some(RcStep::ChallengeDecrypt), err.step());
    assert!(matches!(err.root(), RcError::Decryption(_)));
    assert!(bodies_for(&svc, "crypt/new/").is_empty());
}

#[test]
fn failed_challenge_fetch_prevents_submit() {
    let (svc, client, account) = registered();
    svc.script_response(RcMethod::Post, "challenge/", RcScript::Unreachable);

    let err = client
        .create_crypt(&account, RcNewCrypt::new("x"))
        .unwrap_err();

    assert_eq!(Some(RcStep::ChallengeFetch), err.step());
    assert!(err.is_transport());
    assert!(!err.is_api());
    assert!(bodies_for(&svc, "crypt/new/").is_empty());
}

#[test]
fn unusable_public_key_fails_before_any_challenge() {
    let (svc, client, mut account) = registered();
    account.public_key = "not a key".to_string();
    let before = svc.requests().len();

    let err = client
        .create_crypt(&account, RcNewCrypt::new("x"))
        .unwrap_err();

    assert_eq!(Some(RcStep::Encrypt), err.step());
    assert!(matches!(err.root(), RcError::KeyParse(_)), "{err:?}");
    // nothing at all was sent, in particular no challenge request
    assert_eq!(before, svc.requests().len());
}

#[test]
fn create_without_crypt_id_is_api_error() {
    let (svc, client, account) = registered();
    svc.script_response(
        RcMethod::Post,
        "crypt/new/",
        RcScript::Respond(RcRawResponse {
            status: 200,
            body: br#"{"status_code":200,"success":true,"status_message":"Crypt created"}"#
                .to_vec(),
        }),
    );

    let err = client
        .create_crypt(&account, RcNewCrypt::new("x"))
        .unwrap_err();

    assert_eq!(Some(RcStep::Submit), err.step());
    assert!(err.is_api(), "{err:?}");
}

#[test]
fn check_in_refuses_the_create_path() {
    let (svc, client, account) = registered();
    let before = svc.requests().len();

    let err = client.check_in(&account, "new").unwrap_err();

    assert!(matches!(err, RcError::InvalidInput(_)), "{err:?}");
    assert_eq!(before, svc.requests().len());
    assert!(svc.requests().iter().all(|r| !r.url.as_str().ends_with("crypt/new/")));
}

#[test]
fn check_in_unknown_crypt_is_api_error() {
    let (_svc, client, account) = registered();
    let before = account.to_string();

    let err = client.check_in(&account, "doesnotexist").unwrap_err();

    assert_eq!(Some(RcStep::Submit), err.step());
    match err.root() {
        RcError::Api {
            status_code,
            message,
        } => {
            assert_eq!(404, *status_code);
            assert_eq!("Crypt not found", message);
        }
        oth => panic!("unexpected {oth:?}"),
    }
    assert_eq!(before, account.to_string());
}

#[test]
fn check_in_requires_crypt_id() {
    let (svc, client, account) = registered();
    let before = svc.requests().len();

    let err = client.check_in(&account, "").unwrap_err();

    assert!(matches!(err, RcError::InvalidInput(_)));
    assert_eq!(before, svc.requests().len());
}

#[test]
fn get_crypt_observes_destruction() {
    let (svc, client, account) = registered();
    let crypt = client
        .create_crypt(&account, RcNewCrypt::new("x"))
        .unwrap()
        .crypt;

    let fetched = client.get_crypt(&crypt.crypt_id).unwrap().crypt;
    assert_eq!(crypt, fetched);

    svc.destroy_crypt(&crypt.crypt_id);
    assert!(client.get_crypt(&crypt.crypt_id).unwrap().crypt.destroyed);

    let err = client.check_in(&account, &crypt.crypt_id).unwrap_err();
    assert!(err.is_api());
}

#[test]
fn get_crypt_needs_no_account() {
    let (_svc, client, account) = registered();
    let crypt = client
        .create_crypt(&account, RcNewCrypt::new("x"))
        .unwrap()
        .crypt;

    let err = client.get_crypt("missing").unwrap_err();
    assert_eq!(Some(RcStep::Fetch), err.step());
    assert!(err.is_api());

    // anyone can fetch, only the key holder can read
    let stranger = RcAccount {
        private_key: generate_key_pair(&RcIdentity::default(), RcKeyAlgorithm::Cv25519)
            .unwrap()
            .private_key,
        ..Default::default()
    };
    let fetched = client.get_crypt(&crypt.crypt_id).unwrap().crypt;
    assert!(matches!(
        decrypt_crypt(&fetched, &stranger),
        Err(RcError::Decryption(_))
    ));
}

#[test]
fn new_address_requires_acknowledgement() {
    let (svc, client, mut account) = registered();
    let before = svc.requests().len();
    let old = account.btc_addr.clone();

    let err = client
        .request_new_address(&mut account, RcAddressRotation::Unacknowledged)
        .unwrap_err();

    assert!(matches!(err, RcError::Unacknowledged));
    assert_eq!(before, svc.requests().len());
    assert_eq!(old, account.btc_addr);
}

#[test]
fn new_address_replaces_the_old_one() {
    let (svc, client, mut account) = registered();
    let old = account.btc_addr.clone();

    let res = client
        .request_new_address(&mut account, RcAddressRotation::Acknowledged)
        .unwrap();

    assert_ne!(old, res.btc_addr);
    assert_eq!(res.btc_addr, account.btc_addr);
    assert_eq!(Some(account.btc_addr.clone()), svc.btc_addr(account.user_id));
}

#[test]
fn write_without_registration_sends_nothing() {
    init_tracing();
    let svc = RcTestService::new();
    let client = svc.client();
    let mut account = RcAccount::default();

    assert!(matches!(
        client.create_crypt(&account, RcNewCrypt::new("x")),
        Err(RcError::NotRegistered)
    ));
    assert!(matches!(
        client.check_in(&account, "abc"),
        Err(RcError::NotRegistered)
    ));
    assert!(matches!(
        client.request_new_address(&mut account, RcAddressRotation::Acknowledged),
        Err(RcError::NotRegistered)
    ));
    assert!(svc.requests().is_empty());
}

#[test]
fn requests_target_the_configured_base_url() {
    let (svc, client, account) = registered();
    client.create_crypt(&account, RcNewCrypt::new("x")).unwrap();

    for req in svc.requests() {
        assert!(
            req.url.as_str().starts_with(RcTestService::BASE_URL),
            "{}",
            req.url
        );
    }
}
