use crate::artifacts::unix_secs;
use crate::b64;
use crate::error::*;
use crate::mac::Mac;
use std::borrow::Cow;
use std::str::FromStr;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

const BEWIT_PARAM: &str = "bewit=";

/// A bewit authorizes a single GET request through a query parameter, in place of an
/// `Authorization` header.  It carries the client id, an expiration time, a MAC and an
/// optional `ext` string.
#[derive(Clone, Debug, PartialEq)]
pub struct Bewit<'a> {
    id: Cow<'a, str>,
    exp: SystemTime,
    mac: Cow<'a, Mac>,
    ext: Option<Cow<'a, str>>,
}

impl<'a> Bewit<'a> {
    /// Assemble a bewit from its parts.  `Client::bewit` computes the MAC as well.
    pub fn new(id: &'a str, exp: SystemTime, mac: Mac, ext: Option<&'a str>) -> Bewit<'a> {
        Bewit {
            id: Cow::Borrowed(id),
            exp,
            mac: Cow::Owned(mac),
            ext: ext.map(Cow::Borrowed),
        }
    }

    /// Remove the `bewit` query parameter from a request path and decode it.
    ///
    /// Returns `Ok(None)`, leaving the path alone, when there is no bewit.  Otherwise the path
    /// is rewritten without the parameter, which is the resource the bewit's MAC covers.  More
    /// than one bewit, or one that does not decode, is an error.
    pub fn from_path(path: &mut Cow<'a, str>) -> Result<Option<Bewit<'a>>> {
        let (resource, query) = match path.find('?') {
            Some(i) => (&path[..i], &path[i + 1..]),
            None => return Ok(None),
        };

        let (bewits, rest): (Vec<&str>, Vec<&str>) = query
            .split('&')
            .partition(|param| param.starts_with(BEWIT_PARAM));
        let encoded = match bewits.as_slice() {
            [] => return Ok(None),
            [one] => &one[BEWIT_PARAM.len()..],
            _ => return Err(InvalidBewit::Multiple.into()),
        };
        let bewit = encoded.parse::<Bewit>()?.into_owned();

        let stripped = if rest.is_empty() {
            resource.to_string()
        } else {
            format!("{}?{}", resource, rest.join("&"))
        };
        *path = Cow::Owned(stripped);
        Ok(Some(bewit))
    }

    /// Encode the bewit for use as a query parameter value: `id\exp\mac\ext`, in url-safe
    /// base64 without padding.
    pub fn to_str(&self) -> String {
        let raw = format!(
            "{}\\{}\\{}\\{}",
            self.id,
            unix_secs(self.exp),
            self.mac.to_base64(),
            self.ext().unwrap_or("")
        );
        base64::encode_config(&raw, b64::BEWIT_CONFIG)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn exp(&self) -> SystemTime {
        self.exp
    }

    pub fn mac(&self) -> &Mac {
        &self.mac
    }

    /// The `ext` string, if it was non-empty.
    pub fn ext(&self) -> Option<&str> {
        self.ext.as_deref()
    }

    /// Detach the bewit from any borrowed strings.
    pub fn into_owned(self) -> Bewit<'static> {
        Bewit {
            id: Cow::Owned(self.id.into_owned()),
            exp: self.exp,
            mac: Cow::Owned(self.mac.into_owned()),
            ext: self.ext.map(|ext| Cow::Owned(ext.into_owned())),
        }
    }
}

impl<'a> FromStr for Bewit<'a> {
    type Err = Error;
    fn from_str(encoded: &str) -> Result<Bewit<'a>> {
        let decoded = base64::decode_config(encoded, b64::BEWIT_CONFIG)?;
        let decoded = String::from_utf8(decoded).map_err(|_| InvalidBewit::Format)?;

        let fields: Vec<&str> = decoded.split('\\').collect();
        let (id, exp, mac, ext) = match fields.as_slice() {
            [id, exp, mac, ext] => (*id, *exp, *mac, *ext),
            _ => return Err(InvalidBewit::Format.into()),
        };

        if id.is_empty() {
            return Err(InvalidBewit::Id.into());
        }
        let exp = exp
            .parse::<u64>()
            .ok()
            .and_then(|secs| UNIX_EPOCH.checked_add(Duration::from_secs(secs)))
            .ok_or(InvalidBewit::Exp)?;
        let mac = b64::decode(mac).map_err(|_| InvalidBewit::Mac)?;

        Ok(Bewit {
            id: Cow::Owned(id.to_string()),
            exp,
            mac: Cow::Owned(Mac::from(mac)),
            ext: if ext.is_empty() {
                None
            } else {
                Some(Cow::Owned(ext.to_string()))
            },
        })
    }
}
