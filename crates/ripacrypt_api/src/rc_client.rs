//! client for the RIPACrypt service api

use crate::rc_api::traits::*;
use crate::*;

/// A client bound to one endpoint configuration and one route.
/// Requests are sent one at a time and never retried.
#[derive(Clone)]
pub struct RcClient {
    config: RcEndpointConfig,
    route: RcRoute,
    transport: RcTransport,
}

impl std::fmt::Debug for RcClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RcClient")
            .field("base_url", &self.config.base_url.as_str())
            .field("route", &self.route)
            .finish()
    }
}

impl RcClient {
    /// Connect an http client for the given route.
    pub fn connect(config: RcEndpointConfig, route: RcRoute) -> RcResult<Self> {
        let transport = connect_transport(&config, route)?;
        Ok(Self::with_transport(config, route, transport))
    }

    /// Use an already constructed transport.
    pub fn with_transport(
        config: RcEndpointConfig,
        route: RcRoute,
        transport: RcTransport,
    ) -> Self {
        Self {
            config,
            route,
            transport,
        }
    }

    /// The endpoint configuration in use.
    pub fn config(&self) -> &RcEndpointConfig {
        &self.config
    }

    /// The route requests take.
    pub fn route(&self) -> RcRoute {
        self.route
    }

    /// Send a request and decode its response. A body that is not the
    /// expected json is a malformed response, a decoded envelope with
    /// `success == false` is an api error.
    pub fn request<R: AsRcRequest>(&self, request: &R) -> RcResult<R::Response> {
        let path = request.path();
        let url = if R::PREFER_HIDDEN_SERVICE {
            self.config.hidden_service_url_for(self.route, &path)?
        } else {
            self.config.url_for(&path)?
        };

        let body = match R::METHOD {
            RcMethod::Get => None,
            RcMethod::Post => {
                Some(serde_json::to_vec(request).map_err(RcError::other)?)
            }
        };

        let raw = self.transport.send(R::METHOD, url, body)?;

        let res: R::Response = serde_json::from_slice(&raw.body).map_err(|e| {
            RcError::MalformedResponse(format!("http status {}: {e}", raw.status))
        })?;

        tracing::debug!(
            path = %path,
            http_status = raw.status,
            status_code = res.status().status_code,
            success = res.status().success,
            "api response",
        );

        res.status().check()?;

        Ok(res)
    }
}
