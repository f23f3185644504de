//! Web origins (scheme, host, port).
//!
//! Routing decisions compare the origin of every intercepted request with
//! the origin of the page that registered the interception layer.

use std::fmt;
use std::str::FromStr;

use http::Uri;
use http::uri::Scheme;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// Error returned when a string cannot be parsed as an origin.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OriginError {
    /// The input is not a valid URI.
    #[error("invalid origin URI {0:?}")]
    InvalidUri(String),
    /// The URI has no scheme or no host.
    #[error("origin {0:?} must be absolute (scheme and host)")]
    NotAbsolute(String),
}

/// A web origin: scheme, lowercased host and effective port.
///
/// Default ports are normalized, so `https://catolid.app` and
/// `https://catolid.app:443` are the same origin.
///
/// ```
/// use swcache_core::Origin;
///
/// let origin: Origin = "https://catolid.app".parse().unwrap();
/// let same: Origin = "https://CATOLID.app:443/perfil".parse().unwrap();
/// assert_eq!(origin, same);
/// assert_eq!(origin.to_string(), "https://catolid.app");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Origin {
    scheme: Scheme,
    host: SmolStr,
    port: Option<u16>,
}

impl Origin {
    /// Extracts the origin of an absolute URI.
    ///
    /// Returns `None` for relative URIs.
    pub fn from_uri(uri: &Uri) -> Option<Self> {
        let scheme = uri.scheme()?.clone();
        let host = uri.host()?;
        Some(Self {
            port: uri.port_u16().or_else(|| default_port(&scheme)),
            scheme,
            host: SmolStr::from(host.to_ascii_lowercase()),
        })
    }

    /// Returns the scheme.
    pub fn scheme(&self) -> &Scheme {
        &self.scheme
    }

    /// Returns the lowercased host name.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the effective port, if the scheme has one.
    pub fn port(&self) -> Option<u16> {
        self.port
    }

    /// Whether the scheme is `http` or `https`.
    pub fn is_http(&self) -> bool {
        is_http_scheme(&self.scheme)
    }

    /// Returns the `host[:port]` authority, omitting default ports.
    pub fn authority(&self) -> String {
        match self.port {
            Some(port) if Some(port) != default_port(&self.scheme) => {
                format!("{}:{}", self.host, port)
            }
            _ => self.host.to_string(),
        }
    }
}

/// Whether a scheme is `http` or `https`.
pub fn is_http_scheme(scheme: &Scheme) -> bool {
    *scheme == Scheme::HTTP || *scheme == Scheme::HTTPS
}

fn default_port(scheme: &Scheme) -> Option<u16> {
    if *scheme == Scheme::HTTPS {
        Some(443)
    } else if *scheme == Scheme::HTTP {
        Some(80)
    } else {
        None
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.scheme, self.authority())
    }
}

impl FromStr for Origin {
    type Err = OriginError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let uri: Uri = s
            .parse()
            .map_err(|_| OriginError::InvalidUri(s.to_owned()))?;
        Self::from_uri(&uri).ok_or_else(|| OriginError::NotAbsolute(s.to_owned()))
    }
}

impl TryFrom<String> for Origin {
    type Error = OriginError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Origin> for String {
    fn from(origin: Origin) -> Self {
        origin.to_string()
    }
}
