use crate::artifacts::{unix_secs, Artifacts};
use crate::b64;
use crate::credentials::{Credentials, Key};
use crate::crypto;
use crate::error::*;
use std::fmt::Write;
use std::ops::Deref;
use std::time::SystemTime;

/// Version string included in every Hawk normalized string.
pub const HEADER_VERSION: &str = "1";

/// The kind of MAC being calculated; this is included in the normalized string, so a MAC of one
/// kind can never be replayed as another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacType {
    Header,
    Response,
    Bewit,
    Message,
}

impl MacType {
    fn name(self) -> &'static str {
        match self {
            MacType::Header => "header",
            MacType::Response => "response",
            MacType::Bewit => "bewit",
            MacType::Message => "message",
        }
    }
}

/// A Hawk message authentication code, as raw HMAC output.
///
/// Equality is checked in constant time by the installed Cryptographer.
#[derive(Debug, Clone)]
pub struct Mac(Vec<u8>);

impl Mac {
    /// Calculate the MAC of the given artifacts.
    pub fn new(mac_type: MacType, key: &Key, artifacts: &Artifacts) -> Result<Mac> {
        let normalized = normalized_string(mac_type, artifacts);
        Ok(Mac(key.sign(normalized.as_bytes())?))
    }

    /// Calculate the MAC of the given artifacts, with the payload hash given exactly as it was
    /// received rather than re-encoded from `artifacts.hash`.
    pub(crate) fn with_received_hash(
        mac_type: MacType,
        key: &Key,
        artifacts: &Artifacts,
        hash: Option<&str>,
    ) -> Result<Mac> {
        let normalized = build_normalized(mac_type, artifacts, hash);
        Ok(Mac(key.sign(normalized.as_bytes())?))
    }

    /// Calculate the MAC a server attaches to a timestamp it sends for clock synchronization.
    pub fn for_timestamp(key: &Key, ts: SystemTime) -> Result<Mac> {
        Mac::for_received_timestamp(key, &unix_secs(ts).to_string())
    }

    /// Calculate the timestamp MAC over `ts` as it appeared on the wire.
    pub(crate) fn for_received_timestamp(key: &Key, ts: &str) -> Result<Mac> {
        let normalized = format!("hawk.{}.ts\n{}\n", HEADER_VERSION, ts);
        Ok(Mac(key.sign(normalized.as_bytes())?))
    }

    /// Encode the MAC with standard, padded base64, as it appears in headers.
    pub fn to_base64(&self) -> String {
        b64::encode(&self.0)
    }
}

impl From<Vec<u8>> for Mac {
    fn from(original: Vec<u8>) -> Self {
        Mac(original)
    }
}

impl Deref for Mac {
    type Target = Vec<u8>;
    fn deref(&self) -> &Vec<u8> {
        &self.0
    }
}

impl AsRef<[u8]> for Mac {
    fn as_ref(&self) -> &[u8] {
        &self.0[..]
    }
}

impl PartialEq for Mac {
    fn eq(&self, other: &Mac) -> bool {
        crypto::get_cryptographer().constant_time_compare(&self.0, &other.0)
    }
}

/// Build the newline-delimited string that is HMAC'd for the given artifacts.
///
/// Every field is terminated by a newline, even when empty.  The `app`/`dlg` pair is only
/// present when `app` is set.
pub fn normalized_string(mac_type: MacType, artifacts: &Artifacts) -> String {
    let hash = artifacts.hash.as_ref().map(|hash| b64::encode(hash));
    build_normalized(mac_type, artifacts, hash.as_deref())
}

fn build_normalized(mac_type: MacType, artifacts: &Artifacts, hash: Option<&str>) -> String {
    let mut buffer = String::new();

    // writing to a String cannot fail
    let _ = write!(
        buffer,
        "hawk.{}.{}\n{}\n{}\n{}\n{}\n{}\n{}\n",
        HEADER_VERSION,
        mac_type.name(),
        artifacts.ts_secs(),
        artifacts.nonce,
        artifacts.method.to_uppercase(),
        artifacts.resource,
        artifacts.host.to_lowercase(),
        artifacts.port
    );

    if let Some(hash) = hash {
        buffer.push_str(hash);
    }
    buffer.push('\n');

    if let Some(ref ext) = artifacts.ext {
        buffer.push_str(&escape_ext(ext));
    }
    buffer.push('\n');

    if let Some(ref app) = artifacts.app {
        if !app.is_empty() {
            buffer.push_str(app);
            buffer.push('\n');
            if let Some(ref dlg) = artifacts.dlg {
                buffer.push_str(dlg);
            }
            buffer.push('\n');
        }
    }

    buffer
}

fn escape_ext(ext: &str) -> String {
    ext.replace('\\', "\\\\").replace('\n', "\\n")
}

/// Calculate the base64-encoded MAC of `artifacts` with the given credentials.
pub fn calculate_mac(
    mac_type: MacType,
    credentials: &Credentials,
    artifacts: &Artifacts,
) -> Result<String> {
    Ok(Mac::new(mac_type, credentials.key(), artifacts)?.to_base64())
}

/// Calculate the base64-encoded MAC of a clock-synchronization timestamp.
pub fn calculate_ts_mac(ts: SystemTime, credentials: &Credentials) -> Result<String> {
    Ok(Mac::for_timestamp(credentials.key(), ts)?.to_base64())
}
