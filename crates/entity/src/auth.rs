//! Hosts and the authentication scopes derived from them.

use std::fmt::{Display, Formatter};

use http::Uri;
use http::uri::Scheme;

/// A target host: scheme, host name and an optional explicit port.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HttpHost {
    scheme: Scheme,
    host: String,
    port: Option<u16>,
}

impl HttpHost {
    pub fn new(host: impl Into<String>, port: Option<u16>, scheme: Scheme) -> Self {
        Self { scheme, host: host.into(), port }
    }

    /// Extracts the host part of an absolute URI. A URI without a scheme is
    /// taken as plain `http`; a URI without a host yields `None`.
    pub fn from_uri(uri: &Uri) -> Option<Self> {
        let host = uri.host()?;
        let scheme = uri.scheme().cloned().unwrap_or(Scheme::HTTP);
        Some(Self::new(host, uri.port_u16(), scheme))
    }

    pub fn host_name(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> Option<u16> {
        self.port
    }

    pub fn scheme(&self) -> &Scheme {
        &self.scheme
    }
}

impl Display for HttpHost {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}://{}", self.scheme, self.host)?;
        if let Some(port) = self.port {
            write!(f, ":{port}")?;
        }
        Ok(())
    }
}

/// Where a set of credentials applies. `None` in any field matches anything.
///
/// Host names are kept lower case and schemes upper case, so scopes compare
/// regardless of how they were spelled.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct AuthScope {
    host: Option<String>,
    port: Option<u16>,
    realm: Option<String>,
    scheme: Option<String>,
}

impl AuthScope {
    pub const ANY: AuthScope = AuthScope { host: None, port: None, realm: None, scheme: None };

    pub fn new(host: Option<&str>, port: Option<u16>, realm: Option<&str>, scheme: Option<&str>) -> Self {
        Self {
            host: host.map(str::to_ascii_lowercase),
            port,
            realm: realm.map(str::to_owned),
            scheme: scheme.map(str::to_ascii_uppercase),
        }
    }

    /// The scope for `host`: its host name and port, any realm, and the
    /// host's scheme name.
    pub fn for_host(host: &HttpHost) -> Self {
        Self::new(Some(host.host_name()), host.port(), None, Some(host.scheme().as_str()))
    }

    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    pub fn port(&self) -> Option<u16> {
        self.port
    }

    pub fn realm(&self) -> Option<&str> {
        self.realm.as_deref()
    }

    pub fn scheme(&self) -> Option<&str> {
        self.scheme.as_deref()
    }

    /// Scores how specifically `self` matches `that`: `-1` when any set field
    /// conflicts, otherwise the sum of 8 (host), 4 (port), 2 (realm) and
    /// 1 (scheme) for every field that is equal on both sides.
    pub fn match_score(&self, that: &AuthScope) -> i32 {
        let mut score = 0;
        for (matches, weight) in [
            (field_match(&self.scheme, &that.scheme), 1),
            (field_match(&self.realm, &that.realm), 2),
            (field_match(&self.port, &that.port), 4),
            (field_match(&self.host, &that.host), 8),
        ] {
            match matches {
                FieldMatch::Equal => score += weight,
                FieldMatch::Wildcard => {}
                FieldMatch::Conflict => return -1,
            }
        }
        score
    }
}

enum FieldMatch {
    Equal,
    Wildcard,
    Conflict,
}

fn field_match<T: PartialEq>(this: &Option<T>, that: &Option<T>) -> FieldMatch {
    match (this, that) {
        (a, b) if a == b => FieldMatch::Equal,
        (Some(_), Some(_)) => FieldMatch::Conflict,
        _ => FieldMatch::Wildcard,
    }
}

impl Display for AuthScope {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if let Some(scheme) = &self.scheme {
            write!(f, "{scheme} ")?;
        }
        match &self.realm {
            Some(realm) => write!(f, "'{realm}'")?,
            None => f.write_str("<any realm>")?,
        }
        if let Some(host) = &self.host {
            write!(f, "@{host}")?;
            if let Some(port) = self.port {
                write!(f, ":{port}")?;
            }
        }
        Ok(())
    }
}

impl From<&HttpHost> for AuthScope {
    fn from(host: &HttpHost) -> Self {
        Self::for_host(host)
    }
}
