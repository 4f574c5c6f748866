//! an in-memory RIPACrypt service for tests
//!
//! Implements the service side of the protocol behind [AsRcTransport]:
//! registration, challenges encrypted to the registered key, single-use
//! proofs, crypt storage and check-in, and address rotation. Every
//! request is logged, and individual endpoints can be scripted to return
//! arbitrary bodies or fail at the transport level.

use crate::transport::traits::*;
use crate::*;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// A request as the test service saw it.
#[derive(Debug, Clone, PartialEq)]
pub struct RcRecordedRequest {
    /// http method.
    pub method: RcMethod,
    /// full request url.
    pub url: url::Url,
    /// decoded json body, if one was sent.
    pub body: Option<serde_json::Value>,
}

/// Scripted behavior for one endpoint, replacing the normal handling.
#[derive(Debug, Clone)]
pub enum RcScript {
    /// Answer with this raw response.
    Respond(RcRawResponse),
    /// Fail as if the service could not be reached.
    Unreachable,
}

/// In-memory service handle. Clones share state.
#[derive(Clone)]
pub struct RcTestService(Arc<Mutex<ServiceInner>>);

impl Default for RcTestService {
    fn default() -> Self {
        Self::new()
    }
}

impl RcTestService {
    /// Base url the test clients are configured with.
    pub const BASE_URL: &'static str = "http://ripacrypt.test/1/";

    /// Hidden service url the test clients are configured with.
    pub const HIDDEN_SERVICE_URL: &'static str = "http://ripacrypttest.onion/1/";

    /// Construct a new, empty service.
    pub fn new() -> Self {
        Self(Arc::new(Mutex::new(ServiceInner {
            next_user_id: 1000,
            next_challenge_id: 1,
            next_btc: 1,
            ..Default::default()
        })))
    }

    /// Endpoint configuration pointing at this service.
    pub fn config(&self) -> RcEndpointConfig {
        let parse = |s| url::Url::parse(s).expect("static test url");
        RcEndpointConfigInner::builder()
            .set_base_url(parse(Self::BASE_URL))
            .set_hidden_service_url(parse(Self::HIDDEN_SERVICE_URL))
            .build()
    }

    /// A transport delivering requests to this service.
    pub fn transport(&self) -> RcTransport {
        RcTransport(Arc::new(self.clone()))
    }

    /// A direct route client for this service.
    pub fn client(&self) -> RcClient {
        self.client_with_route(RcRoute::Direct)
    }

    /// A client for this service on the given route.
    pub fn client_with_route(&self, route: RcRoute) -> RcClient {
        RcClient::with_transport(self.config(), route, self.transport())
    }

    /// Replace the handling of `path` (relative to either base url).
    pub fn script_response(&self, method: RcMethod, path: &str, script: RcScript) {
        self.0
            .lock()
            .scripts
            .insert((method, path.to_string()), script);
    }

    /// Every request received so far, oldest first.
    pub fn requests(&self) -> Vec<RcRecordedRequest> {
        self.0.lock().log.clone()
    }

    /// The plaintext of a challenge that has been issued but not used.
    pub fn outstanding_challenge(&self, challenge_id: u64) -> Option<String> {
        self.0
            .lock()
            .challenges
            .get(&challenge_id)
            .map(|(_, nonce)| nonce.clone())
    }

    /// The stored state of a crypt.
    pub fn crypt(&self, crypt_id: &str) -> Option<RcCrypt> {
        self.0.lock().crypts.get(crypt_id).map(|(_, c)| c.clone())
    }

    /// Mark a crypt destroyed, as the service does once misses run out.
    pub fn destroy_crypt(&self, crypt_id: &str) {
        if let Some((_, c)) = self.0.lock().crypts.get_mut(crypt_id) {
            c.destroyed = true;
        }
    }

    /// The current payout address of a user.
    pub fn btc_addr(&self, user_id: u64) -> Option<String> {
        self.0.lock().users.get(&user_id).map(|u| u.btc_addr.clone())
    }
}

impl AsRcTransport for RcTestService {
    fn send(
        &self,
        method: RcMethod,
        url: url::Url,
        body: Option<Vec<u8>>,
    ) -> RcResult<RcRawResponse> {
        let mut inner = self.0.lock();

        let json = match &body {
            Some(b) => Some(serde_json::from_slice(b).map_err(RcError::other)?),
            None => None,
        };
        inner.log.push(RcRecordedRequest {
            method,
            url: url.clone(),
            body: json.clone(),
        });

        let path = [Self::BASE_URL, Self::HIDDEN_SERVICE_URL]
            .iter()
            .find_map(|base| url.as_str().strip_prefix(base))
            .ok_or_else(|| RcError::Transport(format!("unknown host in {url}")))?
            .to_string();

        if let Some(script) = inner.scripts.get(&(method, path.clone())) {
            return match script.clone() {
                RcScript::Respond(raw) => Ok(raw),
                RcScript::Unreachable => {
                    Err(RcError::Transport("connection refused".into()))
                }
            };
        }

        let json = json.unwrap_or(serde_json::Value::Null);
        let out = match (method, path.as_str()) {
            (RcMethod::Post, "register/") => inner.register(&json),
            (RcMethod::Post, "challenge/") => inner.challenge(&json),
            (RcMethod::Post, "crypt/new/") => inner.new_crypt(&json),
            (RcMethod::Post, "newbtc/") => inner.new_btc(&json),
            (m, p) => match p
                .strip_prefix("crypt/")
                .and_then(|p| p.strip_suffix('/'))
            {
                Some(id) if m == RcMethod::Get => inner.get_crypt(id),
                Some(id) => inner.checkin(id, &json),
                None => Err((404, "not found".to_string())),
            },
        };

        let (status, value) = match out {
            Ok(mut value) => {
                value["status_code"] = 200.into();
                value["success"] = true.into();
                value["version"] = 1.into();
                (200, value)
            }
            Err((code, message)) => (
                code,
                serde_json::json!({
                    "status_code": code,
                    "success": false,
                    "status_message": message,
                    "version": 1,
                }),
            ),
        };

        Ok(RcRawResponse {
            status,
            body: serde_json::to_vec(&value).map_err(RcError::other)?,
        })
    }
}

// -- private -- //

type Handled = Result<serde_json::Value, (u16, String)>;

struct TestUser {
    public_key: String,
    fingerprint: String,
    btc_addr: String,
}

#[derive(Default)]
struct ServiceInner {
    next_user_id: u64,
    next_challenge_id: u64,
    next_btc: u64,
    users: HashMap<u64, TestUser>,
    challenges: HashMap<u64, (u64, String)>,
    crypts: HashMap<String, (u64, RcCrypt)>,
    scripts: HashMap<(RcMethod, String), RcScript>,
    log: Vec<RcRecordedRequest>,
}

fn field_str(json: &serde_json::Value, name: &str) -> String {
    json[name].as_str().unwrap_or_default().to_string()
}

fn field_u64(json: &serde_json::Value, name: &str) -> u64 {
    json[name].as_u64().unwrap_or_default()
}

fn field_i64(json: &serde_json::Value, name: &str) -> i64 {
    json[name].as_i64().unwrap_or_default()
}

fn now() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}

impl ServiceInner {
    fn new_btc_addr(&mut self) -> String {
        let n = self.next_btc;
        self.next_btc += 1;
        format!("1RipaTest{n:025}")
    }

    fn register(&mut self, json: &serde_json::Value) -> Handled {
        let public_key = field_str(json, "public_key");
        let fingerprint = public_key_fingerprint(&public_key)
            .map_err(|_| (400, "Invalid public key".to_string()))?;

        let user_id = self.next_user_id;
        self.next_user_id += 1;
        let btc_addr = self.new_btc_addr();

        self.users.insert(
            user_id,
            TestUser {
                public_key,
                fingerprint,
                btc_addr: btc_addr.clone(),
            },
        );

        Ok(serde_json::json!({
            "status_message": "Registered",
            "btc_addr": btc_addr,
            "user_id": user_id,
        }))
    }

    fn challenge(&mut self, json: &serde_json::Value) -> Handled {
        let user_id = field_u64(json, "user_id");
        let fingerprint = field_str(json, "fingerprint");
        let user = self
            .users
            .get(&user_id)
            .filter(|u| u.fingerprint == fingerprint)
            .ok_or((403, "Unknown user or fingerprint".to_string()))?;

        let nonce = nanoid::nanoid!(32);
        let challenge = encrypt_to_public_key(&user.public_key, nonce.as_bytes())
            .map_err(|e| (500, e.to_string()))?;

        let challenge_id = self.next_challenge_id;
        self.next_challenge_id += 1;
        self.challenges.insert(challenge_id, (user_id, nonce));

        Ok(serde_json::json!({
            "challenge": challenge,
            "challenge_id": challenge_id,
            "user_id": user_id,
        }))
    }

    /// Consume the challenge named in `json`, proofs are single use.
    fn verify(&mut self, json: &serde_json::Value) -> Result<u64, (u16, String)> {
        let user_id = field_u64(json, "user_id");
        let challenge_id = field_u64(json, "challenge_id");
        let challenge = field_str(json, "challenge");
        match self.challenges.remove(&challenge_id) {
            Some((uid, nonce)) if uid == user_id && nonce == challenge => {
                Ok(user_id)
            }
            _ => Err((403, "Challenge failed".to_string())),
        }
    }

    fn new_crypt(&mut self, json: &serde_json::Value) -> Handled {
        let user_id = self.verify(json)?;

        let crypt_id = nanoid::nanoid!(16);
        let created_at = now();
        let crypt = RcCrypt {
            crypt_id: crypt_id.clone(),
            crypt_content: field_str(json, "crypt_content"),
            created_at,
            description: field_str(json, "description"),
            destroyed: false,
            last_checkin: created_at,
            checkin_duration: field_i64(json, "checkin_duration"),
            miss_count: field_i64(json, "miss_count"),
        };
        self.crypts.insert(crypt_id, (user_id, crypt.clone()));

        Ok(serde_json::json!({
            "status_message": "Crypt created",
            "crypt": crypt,
        }))
    }

    fn get_crypt(&mut self, crypt_id: &str) -> Handled {
        let (_, crypt) = self
            .crypts
            .get(crypt_id)
            .ok_or((404, "Crypt not found".to_string()))?;
        Ok(serde_json::json!({ "crypt": crypt }))
    }

    fn checkin(&mut self, crypt_id: &str, json: &serde_json::Value) -> Handled {
        let user_id = self.verify(json)?;
        let (owner, crypt) = self
            .crypts
            .get_mut(crypt_id)
            .ok_or((404, "Crypt not found".to_string()))?;
        if *owner != user_id {
            return Err((403, "Not your crypt".to_string()));
        }
        if crypt.destroyed {
            return Err((410, "Crypt has been destroyed".to_string()));
        }
        crypt.last_checkin = now();
        Ok(serde_json::json!({
            "status_message": "Checked in",
            "crypt": crypt,
        }))
    }

    fn new_btc(&mut self, json: &serde_json::Value) -> Handled {
        let user_id = self.verify(json)?;
        let btc_addr = self.new_btc_addr();
        if let Some(user) = self.users.get_mut(&user_id) {
            user.btc_addr = btc_addr.clone();
        }
        Ok(serde_json::json!({
            "status_message": "New address issued",
            "btc_addr": btc_addr,
            "user_id": user_id,
        }))
    }
}
