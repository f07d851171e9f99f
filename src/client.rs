use crate::artifacts::{unix_secs, Artifacts};
use crate::bewit::Bewit;
use crate::clock::ClockSync;
use crate::credentials::Credentials;
use crate::error::*;
use crate::header::Header;
use crate::mac::{Mac, MacType};
use crate::payload::PayloadHasher;
use crate::uri::RequestUri;
use crate::util::{random_string, NONCE_LEN};
use log::debug;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Options for `Client::header`.  Every field is optional; the defaults generate a fresh
/// timestamp and nonce and sign no payload.
#[derive(Debug, Clone, Default)]
pub struct HeaderOptions<'a> {
    /// Use this timestamp instead of the (offset-corrected) current time
    pub timestamp: Option<SystemTime>,
    /// Use this nonce instead of a random one
    pub nonce: Option<&'a str>,
    /// Milliseconds added to the local clock before the clock offset is applied
    pub localtime_offset_ms: i64,
    /// Request payload to hash; an empty payload is still hashed
    pub payload: Option<&'a [u8]>,
    /// Content type of `payload`
    pub content_type: Option<&'a str>,
    /// Precomputed payload hash; takes precedence over `payload`
    pub hash: Option<&'a [u8]>,
    pub ext: Option<&'a str>,
    pub app: Option<&'a str>,
    pub dlg: Option<&'a str>,
}

/// Options for `Client::bewit`.
#[derive(Debug, Clone, Default)]
pub struct BewitOptions<'a> {
    /// How long the bewit is valid; required, and must be at least one second
    pub ttl: Option<Duration>,
    pub ext: Option<&'a str>,
    /// Milliseconds added to the local clock before the clock offset is applied
    pub localtime_offset_ms: i64,
}

/// The result of signing a request: the `Authorization` header value, and the artifacts that
/// must be kept to validate the server's response.
#[derive(Debug, Clone, PartialEq)]
pub struct SignedHeader {
    pub field_value: String,
    pub artifacts: Artifacts,
}

/// A Hawk client, signing requests and validating responses for a single clock.
///
/// # Examples
///
/// ```
/// use hawk_signer::{Client, ClockSync, Credentials, DigestAlgorithm, HeaderOptions};
///
/// let clock = ClockSync::new();
/// let client = Client::new(&clock);
/// let credentials = Credentials::new(
///     "dh37fgj492je",
///     "werxhqb98rpaxn39848xrunpaw3489ruxnpa98w4rxn",
///     DigestAlgorithm::Sha256,
/// )
/// .unwrap();
/// let signed = client
///     .header("https://example.com/resource", "GET", &credentials, &HeaderOptions::default())
///     .unwrap();
/// assert!(signed.field_value.starts_with("Hawk id=\"dh37fgj492je\""));
/// ```
#[derive(Clone, Copy)]
pub struct Client<'c> {
    pub(crate) clock: &'c ClockSync,
}

impl<'c> Client<'c> {
    pub fn new(clock: &'c ClockSync) -> Self {
        Client { clock }
    }

    /// The clock this client uses for timestamps.
    pub fn clock(&self) -> &'c ClockSync {
        self.clock
    }

    /// Generate an `Authorization` header for a request to `uri` with the given method.
    ///
    /// On error no header is produced at all.
    pub fn header<U>(
        &self,
        uri: &U,
        method: &str,
        credentials: &Credentials,
        options: &HeaderOptions,
    ) -> Result<SignedHeader>
    where
        U: RequestUri + ?Sized,
    {
        if method.is_empty() {
            return Err(Error::InvalidArgument("missing method".into()));
        }
        let uri = uri.to_uri()?;

        let ts = match options.timestamp {
            Some(ts) => whole_seconds(ts),
            None => self.clock.now(options.localtime_offset_ms),
        };
        let nonce = match options.nonce {
            Some(nonce) if !nonce.is_empty() => nonce.to_string(),
            _ => random_string(NONCE_LEN),
        };
        let hash = match (options.hash, options.payload) {
            (Some(hash), _) => Some(hash.to_vec()),
            (None, Some(payload)) => Some(PayloadHasher::hash(
                options.content_type,
                credentials.algorithm(),
                payload,
            )?),
            (None, None) => None,
        };

        let artifacts = Artifacts {
            ts,
            nonce,
            method: method.to_string(),
            resource: uri.resource.clone(),
            host: uri.host.clone(),
            port: uri.port,
            hash,
            ext: options.ext.map(str::to_string),
            app: options.app.map(str::to_string),
            dlg: options.dlg.map(str::to_string),
        };

        let mac = Mac::new(MacType::Header, credentials.key(), &artifacts)?;
        let header = Header::new(
            Some(credentials.id()),
            Some(artifacts.ts),
            Some(artifacts.nonce.as_str()),
            Some(mac),
            artifacts.ext.as_deref(),
            artifacts.hash.clone(),
            artifacts.app.as_deref(),
            artifacts.dlg.as_deref(),
        )?;

        Ok(SignedHeader {
            field_value: format!("Hawk {}", header),
            artifacts,
        })
    }

    /// Generate a bewit token for a GET request to `uri`.
    ///
    /// Any failure (an invalid uri, a missing ttl) results in an empty string.  Use
    /// `try_bewit` to learn what went wrong.
    pub fn bewit<U>(&self, uri: &U, credentials: &Credentials, options: &BewitOptions) -> String
    where
        U: RequestUri + ?Sized,
    {
        match self.try_bewit(uri, credentials, options) {
            Ok(bewit) => bewit.to_str(),
            Err(e) => {
                debug!("not generating bewit: {}", e);
                String::new()
            }
        }
    }

    /// Generate a Bewit for a GET request to `uri`, expiring `options.ttl` from now.
    pub fn try_bewit<'a, U>(
        &self,
        uri: &U,
        credentials: &'a Credentials,
        options: &BewitOptions<'a>,
    ) -> Result<Bewit<'a>>
    where
        U: RequestUri + ?Sized,
    {
        let ttl = match options.ttl {
            Some(ttl) if ttl.as_secs() > 0 => ttl,
            _ => return Err(Error::InvalidArgument("missing ttl".into())),
        };
        let uri = uri.to_uri()?;

        let exp = self
            .clock
            .now(options.localtime_offset_ms)
            .checked_add(Duration::from_secs(ttl.as_secs()))
            .ok_or_else(|| Error::InvalidArgument("ttl out of range".into()))?;
        let ext = options.ext.filter(|ext| !ext.is_empty());

        let artifacts = Artifacts {
            ts: exp,
            nonce: String::new(),
            method: "GET".to_string(),
            resource: uri.resource.clone(),
            host: uri.host.clone(),
            port: uri.port,
            hash: None,
            ext: ext.map(str::to_string),
            app: None,
            dlg: None,
        };
        let mac = Mac::new(MacType::Bewit, credentials.key(), &artifacts)?;

        Ok(Bewit::new(credentials.id(), exp, mac, ext))
    }
}

fn whole_seconds(ts: SystemTime) -> SystemTime {
    UNIX_EPOCH + Duration::from_secs(unix_secs(ts))
}
