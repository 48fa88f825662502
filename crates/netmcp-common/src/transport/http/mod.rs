//! HTTP sessions for devices with a REST API.
//!
//! [`http_client`] builds a `reqwest` client carrying the base URL, the
//! request timeout, credentials, and default headers a tool needs. TLS
//! certificate checking follows the process-wide [`TlsPolicy`].

use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;
use url::Url;

use netmcp_config::TlsPolicy;
use netmcp_config::defaults::DEFAULT_HTTP_TIMEOUT;

use crate::failure::ToolError;

const HTTP_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::transport::http");

/// Credentials sent with every request.
#[derive(Clone, PartialEq, Eq)]
pub enum HttpAuth {
    /// HTTP basic authentication.
    Basic {
        /// Username.
        username: String,
        /// Password.
        password: String,
    },
    /// Bearer token, e.g. a FortiGate API key.
    Bearer(String),
}

impl HttpAuth {
    /// Basic credentials.
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::Basic {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Bearer token.
    pub fn bearer(token: impl Into<String>) -> Self {
        Self::Bearer(token.into())
    }

    fn header_value(&self) -> String {
        match self {
            Self::Basic { username, password } => {
                format!("Basic {}", STANDARD.encode(format!("{username}:{password}")))
            }
            Self::Bearer(token) => format!("Bearer {token}"),
        }
    }
}

impl std::fmt::Debug for HttpAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
            Self::Bearer(_) => f.debug_tuple("Bearer").field(&"<redacted>").finish(),
        }
    }
}

/// Options for [`http_client`].
///
/// The default certificate policy is read from `MCP_TLS_VERIFY` each time
/// options are created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpClientOptions {
    base_url: Option<String>,
    timeout: Duration,
    auth: Option<HttpAuth>,
    headers: Vec<(String, String)>,
    tls: TlsPolicy,
}

impl Default for HttpClientOptions {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout: DEFAULT_HTTP_TIMEOUT,
            auth: None,
            headers: Vec::new(),
            tls: TlsPolicy::from_env(),
        }
    }
}

impl HttpClientOptions {
    /// Sets the URL relative request paths are joined onto.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Replaces the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, limit: Duration) -> Self {
        self.timeout = limit;
        self
    }

    /// Sends `auth` with every request.
    #[must_use]
    pub fn with_auth(mut self, auth: HttpAuth) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Adds a default header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Overrides the certificate policy.
    #[must_use]
    pub const fn with_tls_policy(mut self, tls: TlsPolicy) -> Self {
        self.tls = tls;
        self
    }

    /// Request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Certificate policy.
    #[must_use]
    pub const fn tls_policy(&self) -> TlsPolicy {
        self.tls
    }
}

/// Errors raised while building or addressing an HTTP session.
#[derive(Debug, Error)]
pub enum HttpClientError {
    /// The base URL does not parse.
    #[error("invalid base URL '{url}': {source}")]
    InvalidBaseUrl {
        /// URL as configured.
        url: String,
        /// Parser error.
        #[source]
        source: url::ParseError,
    },
    /// A default header name or value is not valid HTTP.
    #[error("invalid header '{name}': {message}")]
    InvalidHeader {
        /// Header name as configured.
        name: String,
        /// Reason the header was refused.
        message: String,
    },
    /// A request path cannot be joined onto the base URL.
    #[error("invalid request path '{path}': {source}")]
    InvalidPath {
        /// Path as requested.
        path: String,
        /// Parser error.
        #[source]
        source: url::ParseError,
    },
    /// A relative path was requested from a session without a base URL.
    #[error("relative request path '{path}' needs a base URL")]
    MissingBaseUrl {
        /// Path as requested.
        path: String,
    },
    /// The underlying client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),
}

/// HTTP client bound to one device.
#[derive(Debug, Clone)]
pub struct HttpSession {
    client: Client,
    base_url: Option<Url>,
}

/// Builds an [`HttpSession`] from `options`.
///
/// # Errors
///
/// Returns [`HttpClientError`] for an unparsable base URL, an invalid header,
/// or a client that cannot be built.
pub fn http_client(options: &HttpClientOptions) -> Result<HttpSession, HttpClientError> {
    let base_url = options.base_url.as_deref().map(parse_base_url).transpose()?;

    let mut headers = HeaderMap::new();
    for (name, value) in &options.headers {
        headers.insert(header_name(name)?, header_value(name, value)?);
    }
    if let Some(auth) = &options.auth {
        let mut credentials = header_value(AUTHORIZATION.as_str(), &auth.header_value())?;
        credentials.set_sensitive(true);
        headers.insert(AUTHORIZATION, credentials);
    }

    let accept_invalid = !options.tls.verifies_certificates();
    let client = Client::builder()
        .timeout(options.timeout)
        .default_headers(headers)
        .danger_accept_invalid_certs(accept_invalid)
        .build()
        .map_err(HttpClientError::Build)?;

    debug!(
        target: HTTP_TARGET,
        base_url = base_url.as_ref().map_or("", Url::as_str),
        timeout_secs = options.timeout.as_secs(),
        verify_tls = !accept_invalid,
        "HTTP client built"
    );

    Ok(HttpSession { client, base_url })
}

impl HttpSession {
    /// Underlying `reqwest` client.
    #[must_use]
    pub const fn client(&self) -> &Client {
        &self.client
    }

    /// Base URL, normalised to end with `/`.
    #[must_use]
    pub const fn base_url(&self) -> Option<&Url> {
        self.base_url.as_ref()
    }

    /// Resolves `path` against the base URL.
    ///
    /// Absolute URLs are used as given. Relative paths are appended to the
    /// base URL's path, so `/monitor/status` under `https://fw/api/v2`
    /// resolves to `https://fw/api/v2/monitor/status`.
    ///
    /// # Errors
    ///
    /// Returns [`HttpClientError`] when the path cannot be joined or is
    /// relative without a base URL.
    pub fn url(&self, path: &str) -> Result<Url, HttpClientError> {
        if let Ok(absolute) = Url::parse(path)
            && absolute.has_host()
        {
            return Ok(absolute);
        }
        let Some(base) = &self.base_url else {
            return Err(HttpClientError::MissingBaseUrl {
                path: path.to_owned(),
            });
        };
        base.join(path.trim_start_matches('/'))
            .map_err(|source| HttpClientError::InvalidPath {
                path: path.to_owned(),
                source,
            })
    }

    /// Starts a request for `path`.
    ///
    /// # Errors
    ///
    /// Propagates [`HttpSession::url`] failures.
    pub fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, HttpClientError> {
        Ok(self.client.request(method, self.url(path)?))
    }

    /// Starts a GET request for `path`.
    ///
    /// # Errors
    ///
    /// Propagates [`HttpSession::url`] failures.
    pub fn get(&self, path: &str) -> Result<RequestBuilder, HttpClientError> {
        self.request(Method::GET, path)
    }

    /// Fetches `path` and decodes the JSON body.
    ///
    /// Non-success statuses become [`ToolError::Status`].
    ///
    /// # Errors
    ///
    /// Returns [`ToolError`] for addressing, transport, status, or decoding
    /// failures.
    pub async fn get_json<T>(&self, path: &str) -> Result<T, ToolError>
    where
        T: DeserializeOwned,
    {
        let response = self.get(path)?.send().await?.error_for_status()?;
        Ok(response.json::<T>().await?)
    }
}

fn parse_base_url(raw: &str) -> Result<Url, HttpClientError> {
    let mut url = Url::parse(raw).map_err(|source| HttpClientError::InvalidBaseUrl {
        url: raw.to_owned(),
        source,
    })?;
    if !url.path().ends_with('/') {
        let normalised = format!("{}/", url.path());
        url.set_path(&normalised);
    }
    Ok(url)
}

fn header_name(name: &str) -> Result<HeaderName, HttpClientError> {
    HeaderName::from_bytes(name.as_bytes()).map_err(|error| HttpClientError::InvalidHeader {
        name: name.to_owned(),
        message: error.to_string(),
    })
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue, HttpClientError> {
    HeaderValue::from_str(value).map_err(|error| HttpClientError::InvalidHeader {
        name: name.to_owned(),
        message: error.to_string(),
    })
}
