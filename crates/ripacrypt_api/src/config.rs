use crate::*;
use std::sync::Arc;

/// Base url all api paths are joined onto.
pub const DEFAULT_BASE_URL: &str = "https://ripacrypt.download/1/";

/// SOCKS5 host used when a request is routed through Tor.
pub const DEFAULT_TOR_SOCKS: &str = "localhost:9050";

/// Value sent in the `X-CLIENT-VER` header.
pub const CLIENT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Name of the header carrying the client version.
pub const CLIENT_VERSION_HEADER: &str = "X-CLIENT-VER";

fn default_base_url() -> url::Url {
    url::Url::parse(DEFAULT_BASE_URL).expect("default base url is valid")
}

fn default_client_version() -> String {
    CLIENT_VERSION.to_string()
}

fn default_tor_socks() -> String {
    DEFAULT_TOR_SOCKS.to_string()
}

/// Where and how to reach the RIPACrypt service.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RcEndpointConfigInner {
    /// Base url for all queries, must end with '/'.
    #[serde(default = "default_base_url")]
    pub base_url: url::Url,

    /// Hidden service base url, used for address rotation
    /// when routed through Tor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hidden_service_url: Option<url::Url>,

    /// Client version string sent with every request.
    #[serde(default = "default_client_version")]
    pub client_version: String,

    /// host:port of the local Tor SOCKS5 proxy.
    #[serde(default = "default_tor_socks")]
    pub tor_socks: String,
}

impl Default for RcEndpointConfigInner {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            hidden_service_url: None,
            client_version: default_client_version(),
            tor_socks: default_tor_socks(),
        }
    }
}

impl RcEndpointConfigInner {
    /// Obtain a new config builder.
    pub fn builder() -> RcEndpointConfigBuilder {
        RcEndpointConfigBuilder::default()
    }

    /// Resolve an api path against the base url.
    pub fn url_for(&self, path: &str) -> RcResult<url::Url> {
        join(&self.base_url, path)
    }

    /// Resolve an api path against the hidden service url when routed
    /// through Tor and one is configured, else against the base url.
    pub fn hidden_service_url_for(
        &self,
        route: RcRoute,
        path: &str,
    ) -> RcResult<url::Url> {
        match (route, &self.hidden_service_url) {
            (RcRoute::Tor, Some(hs)) => join(hs, path),
            _ => self.url_for(path),
        }
    }

    /// The proxy url handed to the http client for the Tor route.
    /// socks5h so that .onion names are resolved by Tor itself.
    pub fn tor_proxy_url(&self) -> String {
        format!("socks5h://{}", self.tor_socks)
    }
}

/// Shared endpoint configuration.
pub type RcEndpointConfig = Arc<RcEndpointConfigInner>;

/// Endpoint configuration builder.
#[derive(Default)]
pub struct RcEndpointConfigBuilder(RcEndpointConfigInner);

impl RcEndpointConfigBuilder {
    /// Obtain a new config builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing config, e.g. one read from an account file.
    pub fn from_config(config: RcEndpointConfigInner) -> Self {
        let RcEndpointConfigInner {
            base_url,
            hidden_service_url,
            client_version,
            tor_socks,
        } = config;
        let mut builder = Self::new()
            .set_base_url(base_url)
            .set_client_version(client_version)
            .set_tor_socks(tor_socks);
        if let Some(hs) = hidden_service_url {
            builder = builder.set_hidden_service_url(hs);
        }
        builder
    }

    /// Consume the config builder to obtain a true config instance.
    pub fn build(self) -> RcEndpointConfig {
        Arc::new(self.0)
    }

    /// Override the base url. A trailing '/' is appended if missing,
    /// otherwise `join` would drop the last path segment.
    pub fn set_base_url(mut self, base_url: url::Url) -> Self {
        self.0.base_url = with_trailing_slash(base_url);
        self
    }

    /// Set the hidden service base url.
    pub fn set_hidden_service_url(mut self, url: url::Url) -> Self {
        self.0.hidden_service_url = Some(with_trailing_slash(url));
        self
    }

    /// Override the client version header value.
    pub fn set_client_version<S: Into<String>>(mut self, version: S) -> Self {
        self.0.client_version = version.into();
        self
    }

    /// Override the Tor SOCKS5 host:port.
    pub fn set_tor_socks<S: Into<String>>(mut self, tor_socks: S) -> Self {
        self.0.tor_socks = tor_socks.into();
        self
    }
}

fn join(base: &url::Url, path: &str) -> RcResult<url::Url> {
    base.join(path).map_err(|e| {
        RcError::Config(format!("cannot join {path:?} onto {base}: {e}"))
    })
}

fn with_trailing_slash(mut url: url::Url) -> url::Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_endpoints() {
        let config = RcEndpointConfigInner::builder().build();
        assert_eq!(
            "https://ripacrypt.download/1/crypt/new/",
            config.url_for("crypt/new/").unwrap().as_str(),
        );
        assert_eq!("1.0.0", config.client_version);
        assert_eq!("socks5h://localhost:9050", config.tor_proxy_url());
    }

    #[test]
    fn base_url_gets_trailing_slash() {
        let config = RcEndpointConfigInner::builder()
            .set_base_url(url::Url::parse("http://127.0.0.1:8080/1").unwrap())
            .build();
        assert_eq!(
            "http://127.0.0.1:8080/1/register/",
            config.url_for("register/").unwrap().as_str(),
        );
    }

    #[test]
    fn hidden_service_only_under_tor() {
        let config = RcEndpointConfigInner::builder()
            .set_hidden_service_url(
                url::Url::parse("http://exampleonionaddress.onion/1/").unwrap(),
            )
            .build();
        assert_eq!(
            "https://ripacrypt.download/1/newbtc/",
            config
                .hidden_service_url_for(RcRoute::Direct, "newbtc/")
                .unwrap()
                .as_str(),
        );
        assert_eq!(
            "http://exampleonionaddress.onion/1/newbtc/",
            config
                .hidden_service_url_for(RcRoute::Tor, "newbtc/")
                .unwrap()
                .as_str(),
        );
    }

    #[test]
    fn missing_fields_use_defaults() {
        let config: RcEndpointConfigInner =
            serde_yaml::from_str("tor_socks: 127.0.0.1:9150\n").unwrap();
        assert_eq!("127.0.0.1:9150", config.tor_socks);
        assert_eq!(DEFAULT_BASE_URL, config.base_url.as_str());
    }
}
