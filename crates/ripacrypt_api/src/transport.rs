//! http transport to the RIPACrypt service

use crate::*;
use std::sync::Arc;

/// Traits related to RcTransport. Unless you're writing a new
/// implementation, you probably don't need these.
pub mod traits {
    use super::*;

    /// Defines a blocking request/response transport.
    pub trait AsRcTransport: 'static + Send + Sync {
        /// Send a single request and return the raw response.
        /// Only failures to obtain a response at all are errors here,
        /// status codes are left to the caller.
        fn send(
            &self,
            method: RcMethod,
            url: url::Url,
            body: Option<Vec<u8>>,
        ) -> RcResult<RcRawResponse>;
    }
}
use traits::*;

/// The network path requests take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RcRoute {
    /// Connect to the service directly.
    Direct,
    /// Connect through the local Tor SOCKS5 proxy.
    Tor,
}

impl RcRoute {
    /// Tor if either the account or the invocation asks for it.
    pub fn select(account_use_tor: bool, flag_use_tor: bool) -> Self {
        if account_use_tor || flag_use_tor {
            Self::Tor
        } else {
            Self::Direct
        }
    }
}

/// Http method of an api request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RcMethod {
    /// GET, sent without a body.
    Get,
    /// POST, sent with a json body.
    Post,
}

impl std::fmt::Display for RcMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Get => f.write_str("GET"),
            Self::Post => f.write_str("POST"),
        }
    }
}

/// What came back over the wire, before any json decoding.
#[derive(Debug, Clone)]
pub struct RcRawResponse {
    /// http status code.
    pub status: u16,
    /// response body bytes.
    pub body: Vec<u8>,
}

/// Concrete transport handle.
#[derive(Clone)]
pub struct RcTransport(pub Arc<dyn AsRcTransport>);

impl RcTransport {
    /// Send a single request.
    pub fn send(
        &self,
        method: RcMethod,
        url: url::Url,
        body: Option<Vec<u8>>,
    ) -> RcResult<RcRawResponse> {
        AsRcTransport::send(&*self.0, method, url, body)
    }
}

/// Build the http transport for a route. Every request it sends carries
/// the client version header and a json content type. Timeouts are the
/// http client defaults, nothing is retried.
pub fn connect_transport(
    config: &RcEndpointConfig,
    route: RcRoute,
) -> RcResult<RcTransport> {
    use reqwest::header;

    let mut headers = header::HeaderMap::new();
    headers.insert(
        header::HeaderName::from_bytes(CLIENT_VERSION_HEADER.as_bytes())
            .map_err(RcError::other)?,
        header::HeaderValue::from_str(&config.client_version).map_err(|e| {
            RcError::Config(format!(
                "invalid client version {:?}: {e}",
                config.client_version
            ))
        })?,
    );
    headers.insert(
        header::CONTENT_TYPE,
        header::HeaderValue::from_static("application/json"),
    );

    let mut builder = reqwest::blocking::Client::builder().default_headers(headers);

    if route == RcRoute::Tor {
        let proxy_url = config.tor_proxy_url();
        tracing::debug!(%proxy_url, "routing through tor");
        let proxy = reqwest::Proxy::all(&proxy_url).map_err(|e| {
            RcError::Config(format!("invalid tor proxy {proxy_url:?}: {e}"))
        })?;
        builder = builder.proxy(proxy);
    }

    let client = builder.build()?;

    Ok(RcTransport(Arc::new(PrivHttpTransport { client })))
}

// -- private -- //

struct PrivHttpTransport {
    client: reqwest::blocking::Client,
}

impl AsRcTransport for PrivHttpTransport {
    fn send(
        &self,
        method: RcMethod,
        url: url::Url,
        body: Option<Vec<u8>>,
    ) -> RcResult<RcRawResponse> {
        tracing::debug!(%method, %url, "sending request");

        let req = match method {
            RcMethod::Get => self.client.get(url),
            RcMethod::Post => self.client.post(url),
        };
        let req = match body {
            Some(body) => req.body(body),
            None => req,
        };

        let res = req.send()?;
        let status = res.status().as_u16();
        let body = res.bytes()?.to_vec();

        tracing::trace!(status, len = body.len(), "got response");

        Ok(RcRawResponse { status, body })
    }
}
