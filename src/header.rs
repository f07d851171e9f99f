use crate::artifacts::unix_secs;
use crate::b64;
use crate::error::*;
use crate::mac::Mac;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Attributes allowed in a request `Authorization` header.
pub const AUTHORIZATION_KEYS: &[&str] = &["id", "ts", "nonce", "hash", "ext", "mac", "app", "dlg"];

/// Attributes allowed in a `Server-Authorization` header.
pub const SERVER_AUTHORIZATION_KEYS: &[&str] = &["mac", "ext", "hash"];

/// Attributes allowed in a `WWW-Authenticate` header.
pub const WWW_AUTHENTICATE_KEYS: &[&str] = &["ts", "tsm", "error"];

/// Representation of a Hawk `Authorization` header value (the part following "Hawk ").
///
/// All fields are optional, since the same attribute set is used for `Authorization`,
/// `Server-Authorization`, and `WWW-Authenticate` headers.
///
/// Note that the `Display` implementation does not include the "`Hawk "` prefix, while
/// `FromStr` expects it.
#[derive(Clone, PartialEq, Debug)]
pub struct Header {
    pub id: Option<String>,
    pub ts: Option<SystemTime>,
    pub nonce: Option<String>,
    pub mac: Option<Mac>,
    pub ext: Option<String>,
    pub hash: Option<Vec<u8>>,
    pub app: Option<String>,
    pub dlg: Option<String>,
}

impl Header {
    /// Create a new Header with the full set of Hawk fields.  `Client::header` is the usual
    /// way to get one.
    ///
    /// `id`, `nonce`, `app` and `dlg` cannot contain `"`; `ext` is escaped when formatted.
    #[allow(clippy::too_many_arguments)]
    pub fn new<S>(
        id: Option<S>,
        ts: Option<SystemTime>,
        nonce: Option<S>,
        mac: Option<Mac>,
        ext: Option<S>,
        hash: Option<Vec<u8>>,
        app: Option<S>,
        dlg: Option<S>,
    ) -> Result<Header>
    where
        S: Into<String>,
    {
        Ok(Header {
            id: Header::check_component(id)?,
            ts,
            nonce: Header::check_component(nonce)?,
            mac,
            ext: ext.map(Into::into),
            hash,
            app: Header::check_component(app)?,
            dlg: Header::check_component(dlg)?,
        })
    }

    /// Check a header component for validity.
    fn check_component<S>(value: Option<S>) -> Result<Option<String>>
    where
        S: Into<String>,
    {
        match value {
            Some(value) => {
                let value = value.into();
                if value.contains('"') {
                    return Err(Error::HeaderParseError(
                        "Hawk header components cannot contain `\"`".into(),
                    ));
                }
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    /// Format the header for transmission in an HTTP header, writing attributes in the order
    /// `id, ts, nonce, hash, ext, mac, app, dlg`.  Empty `hash`, `ext`, `app`, and `dlg`
    /// values are omitted, and `dlg` only appears alongside `app`.
    fn fmt_header(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut sep = "";

        // attribute order follows Hawk's browser client
        if let Some(ref id) = self.id {
            write!(f, "{}id=\"{}\"", sep, id)?;
            sep = ", ";
        }
        if let Some(ref ts) = self.ts {
            write!(f, "{}ts=\"{}\"", sep, unix_secs(*ts))?;
            sep = ", ";
        }
        if let Some(ref nonce) = self.nonce {
            write!(f, "{}nonce=\"{}\"", sep, nonce)?;
            sep = ", ";
        }
        if let Some(ref hash) = self.hash {
            if !hash.is_empty() {
                write!(f, "{}hash=\"{}\"", sep, b64::encode(hash))?;
                sep = ", ";
            }
        }
        if let Some(ref ext) = self.ext {
            if !ext.is_empty() {
                write!(f, "{}ext=\"{}\"", sep, escape_header_attribute(ext))?;
                sep = ", ";
            }
        }
        if let Some(ref mac) = self.mac {
            write!(f, "{}mac=\"{}\"", sep, mac.to_base64())?;
            sep = ", ";
        }
        if let Some(ref app) = self.app {
            if !app.is_empty() {
                write!(f, "{}app=\"{}\"", sep, app)?;
                if let Some(ref dlg) = self.dlg {
                    if !dlg.is_empty() {
                        write!(f, ", dlg=\"{}\"", dlg)?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Parse a header value, accepting only the given attribute names.
    pub fn parse_with_keys(s: &str, keys: &[&str]) -> Result<Header> {
        let attributes = parse_authorization_header(s, keys)
            .ok_or_else(|| Error::HeaderParseError("malformed Hawk attributes".into()))?;

        let ts = match attributes.get("ts") {
            Some(ts) => Some(parse_ts(ts)?),
            None => None,
        };
        let mac = match attributes.get("mac") {
            Some(mac) => Some(Mac::from(b64::decode(mac)?)),
            None => None,
        };
        let hash = match attributes.get("hash") {
            Some(hash) => Some(b64::decode(hash)?),
            None => None,
        };
        let get = |key: &str| attributes.get(key).map(|v| v.to_string());

        Ok(Header {
            id: get("id"),
            ts,
            nonce: get("nonce"),
            mac,
            ext: get("ext"),
            hash,
            app: get("app"),
            dlg: get("dlg"),
        })
    }
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.fmt_header(f)
    }
}

impl FromStr for Header {
    type Err = Error;
    fn from_str(s: &str) -> Result<Header> {
        Header::parse_with_keys(s, AUTHORIZATION_KEYS)
    }
}

pub(crate) fn parse_ts(ts: &str) -> Result<SystemTime> {
    u64::from_str(ts)
        .ok()
        .and_then(|secs| UNIX_EPOCH.checked_add(Duration::from_secs(secs)))
        .ok_or_else(|| Error::HeaderParseError(format!("Error parsing `ts` value {:?}", ts)))
}

/// Escape a value for inclusion in a quoted header attribute.
pub fn escape_header_attribute(attribute: &str) -> String {
    attribute.replace('\\', "\\\\").replace('"', "\\\"")
}

fn is_word(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn is_line_terminator(c: char) -> bool {
    c == '\n' || c == '\r' || c == '\u{2028}' || c == '\u{2029}'
}

fn is_value_char(c: char) -> bool {
    (' '..='~').contains(&c) && c != '"' && c != '\\'
}

/// Parse a Hawk authorization-style header into its attributes.
///
/// The header must be `Hawk` (case-insensitive) followed by whitespace and a sequence of
/// `key="value"` pairs, each followed by optional whitespace and either a comma or the end of
/// the string.  Keys must be in `keys` and may appear only once; values must be non-empty
/// printable ASCII without `"` or `\`.  Any violation, including trailing text, invalidates
/// the whole header and yields `None`.
pub fn parse_authorization_header<'a>(
    header: &'a str,
    keys: &[&str],
) -> Option<HashMap<&'a str, &'a str>> {
    let scheme_end = header.find(|c: char| !is_word(c)).unwrap_or(header.len());
    let (scheme, rest) = header.split_at(scheme_end);
    if !scheme.eq_ignore_ascii_case("hawk") {
        return None;
    }

    let mut p = rest.trim_start();
    if p.len() == rest.len() || p.is_empty() || p.contains(is_line_terminator) {
        return None;
    }

    let mut attributes = HashMap::new();
    while !p.is_empty() {
        let key_end = p.find(|c: char| !is_word(c)).unwrap_or(p.len());
        if key_end == 0 {
            return None;
        }
        let key = &p[..key_end];
        p = p[key_end..].strip_prefix("=\"")?;

        let value_end = p.find(|c: char| c == '"' || c == '\\')?;
        if !p[value_end..].starts_with('"') {
            return None;
        }
        let value = &p[..value_end];
        p = p[value_end + 1..].trim_start();
        if !p.is_empty() {
            p = p.strip_prefix(',')?.trim_start();
        }

        if !keys.contains(&key)
            || value.is_empty()
            || !value.chars().all(is_value_char)
            || attributes.insert(key, value).is_some()
        {
            return None;
        }
    }

    Some(attributes)
}
