use crate::error::*;
use std::borrow::Cow;
use std::str::FromStr;
use url::Url;

/// The parts of a request URI that Hawk signs: host, port, and resource (path and query).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Uri {
    pub host: String,
    pub port: u16,
    pub resource: String,
}

impl Uri {
    pub fn new<S1, S2>(host: S1, port: u16, resource: S2) -> Self
    where
        S1: Into<String>,
        S2: Into<String>,
    {
        Uri {
            host: host.into(),
            port,
            resource: resource.into(),
        }
    }

    /// Build a Uri from a parsed `url::Url`, using the scheme's default port when none is given.
    pub fn from_url(url: &Url) -> Result<Self> {
        let host = url
            .host_str()
            .ok_or_else(|| Error::InvalidUrl(format!("url {} has no host", url)))?;
        let port = url
            .port_or_known_default()
            .ok_or_else(|| Error::InvalidUrl(format!("url {} has no port", url)))?;
        let resource = match url.query() {
            Some(q) => format!("{}?{}", url.path(), q),
            None => url.path().to_string(),
        };
        Ok(Uri::new(host, port, resource))
    }
}

/// Parse a URI permissively, the way browsers' Hawk clients do: the string is split into
/// `scheme://[userinfo@]host[:port][path][?query][#fragment]` without validating or
/// normalizing any component.  The fragment is discarded; an empty resource becomes `/`.
impl FromStr for Uri {
    type Err = Error;
    fn from_str(input: &str) -> Result<Uri> {
        let invalid = |why: &str| Error::InvalidUrl(format!("{}: {}", input, why));

        let scheme_end = input.find("://").ok_or_else(|| invalid("missing scheme"))?;
        let scheme = &input[..scheme_end];
        if scheme.is_empty() || scheme.contains(':') {
            return Err(invalid("missing scheme"));
        }
        let rest = &input[scheme_end + 3..];

        // drop the fragment before anything else
        let rest = match rest.find('#') {
            Some(i) => &rest[..i],
            None => rest,
        };

        let authority_end = rest.find(|c: char| c == '/' || c == '?').unwrap_or(rest.len());
        let (authority, resource) = rest.split_at(authority_end);

        let hostport = match authority.rfind('@') {
            Some(i) => &authority[i + 1..],
            None => authority,
        };

        let (host, port) = split_host_port(hostport).ok_or_else(|| invalid("invalid authority"))?;
        if host.is_empty() {
            return Err(invalid("missing host"));
        }

        let port = match port {
            Some(port) => port
                .parse::<u16>()
                .map_err(|_| invalid("invalid port"))?,
            None => default_port(scheme).ok_or_else(|| invalid("no default port for scheme"))?,
        };

        let resource = if resource.starts_with('/') {
            resource.to_string()
        } else {
            format!("/{}", resource)
        };

        Ok(Uri::new(host, port, resource))
    }
}

fn split_host_port(hostport: &str) -> Option<(&str, Option<&str>)> {
    if hostport.starts_with('[') {
        // IPv6 literal, kept bracketed as in a Host header
        let close = hostport.find(']')?;
        let (host, rest) = hostport.split_at(close + 1);
        match rest {
            "" => Some((host, None)),
            _ if rest.starts_with(':') => Some((host, Some(&rest[1..]))),
            _ => None,
        }
    } else {
        match hostport.find(':') {
            Some(i) => Some((&hostport[..i], Some(&hostport[i + 1..]))),
            None => Some((hostport, None)),
        }
    }
}

fn default_port(scheme: &str) -> Option<u16> {
    match scheme.to_ascii_lowercase().as_str() {
        "http" => Some(80),
        "https" => Some(443),
        _ => None,
    }
}

/// Anything that can name the target of a Hawk-signed request: a URI string, a `url::Url`, or
/// an already-parsed `Uri`.
pub trait RequestUri {
    fn to_uri(&self) -> Result<Cow<'_, Uri>>;
}

impl RequestUri for Uri {
    fn to_uri(&self) -> Result<Cow<'_, Uri>> {
        Ok(Cow::Borrowed(self))
    }
}

impl RequestUri for str {
    fn to_uri(&self) -> Result<Cow<'_, Uri>> {
        Ok(Cow::Owned(self.parse()?))
    }
}

impl RequestUri for String {
    fn to_uri(&self) -> Result<Cow<'_, Uri>> {
        self.as_str().to_uri()
    }
}

impl RequestUri for Url {
    fn to_uri(&self) -> Result<Cow<'_, Uri>> {
        Ok(Cow::Owned(Uri::from_url(self)?))
    }
}
