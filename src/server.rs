//! Server-side counterparts of the client operations: validating request headers, bewits, and
//! messages, and producing `Server-Authorization` and `WWW-Authenticate` values.

use crate::artifacts::{unix_secs, Artifacts};
use crate::b64;
use crate::bewit::Bewit;
use crate::clock::ClockSync;
use crate::credentials::Credentials;
use crate::error::*;
use crate::header::{escape_header_attribute, Header};
use crate::mac::{Mac, MacType};
use crate::message::MessageAuth;
use crate::payload::PayloadHasher;
use crate::uri::RequestUri;
use log::debug;
use std::time::{Duration, SystemTime};

/// Default allowed difference between a request's timestamp and the server's clock.
pub const DEFAULT_TS_SKEW: Duration = Duration::from_secs(60);

/// Options for `Server::validate_header` and `Server::validate_message`.
#[derive(Debug, Clone)]
pub struct ValidateOptions<'a> {
    /// Largest accepted difference between the request timestamp and the server's clock
    pub ts_skew: Duration,
    /// Hash of the payload the server received; when given, the header must carry an equal hash
    pub payload_hash: Option<&'a [u8]>,
}

impl<'a> Default for ValidateOptions<'a> {
    fn default() -> Self {
        ValidateOptions {
            ts_skew: DEFAULT_TS_SKEW,
            payload_hash: None,
        }
    }
}

/// A Hawk server, validating requests against a single clock.
#[derive(Clone, Copy)]
pub struct Server<'c> {
    clock: &'c ClockSync,
}

impl<'c> Server<'c> {
    pub fn new(clock: &'c ClockSync) -> Self {
        Server { clock }
    }

    /// Validate a request's `Authorization` header, returning true if the MAC, payload hash,
    /// and timestamp are all acceptable.
    ///
    /// Nonces are not tracked; callers concerned with replay must remember (id, ts, nonce)
    /// triples themselves.
    pub fn validate_header<U>(
        &self,
        header: &Header,
        credentials: &Credentials,
        method: &str,
        uri: &U,
        options: &ValidateOptions,
    ) -> bool
    where
        U: RequestUri + ?Sized,
    {
        // extract required fields, returning early if they are not present
        match header.id {
            Some(ref id) if id == credentials.id() => (),
            _ => {
                debug!("header id does not match credentials");
                return false;
            }
        }
        let (ts, nonce, header_mac) = match (header.ts, &header.nonce, &header.mac) {
            (Some(ts), Some(nonce), Some(mac)) => (ts, nonce, mac),
            _ => {
                debug!("header is missing ts, nonce, or mac");
                return false;
            }
        };
        let uri = match uri.to_uri() {
            Ok(uri) => uri,
            Err(e) => {
                debug!("invalid request uri: {}", e);
                return false;
            }
        };

        let artifacts = Artifacts {
            ts,
            nonce: nonce.clone(),
            method: method.to_string(),
            resource: uri.resource.clone(),
            host: uri.host.clone(),
            port: uri.port,
            hash: header.hash.clone(),
            ext: header.ext.clone(),
            app: header.app.clone(),
            dlg: header.dlg.clone(),
        };
        if !self.mac_matches(MacType::Header, credentials, &artifacts, header_mac) {
            return false;
        }

        if let Some(local_hash) = options.payload_hash {
            match header.hash {
                Some(ref hash) if &hash[..] == local_hash => (),
                Some(_) => {
                    debug!("payload hash mismatch");
                    return false;
                }
                None => {
                    debug!("header has no payload hash");
                    return false;
                }
            }
        }

        self.ts_within_skew(ts, options.ts_skew)
    }

    /// Render a `Server-Authorization` header value for the response to a request with the
    /// given artifacts.
    pub fn response_header(
        &self,
        credentials: &Credentials,
        artifacts: &Artifacts,
        hash: Option<&[u8]>,
        ext: Option<&str>,
    ) -> Result<String> {
        let response_artifacts = Artifacts {
            hash: hash.map(<[u8]>::to_vec),
            ext: ext.map(str::to_string),
            ..artifacts.clone()
        };
        let mac = Mac::new(MacType::Response, credentials.key(), &response_artifacts)?;

        let mut header = format!("Hawk mac=\"{}\"", mac.to_base64());
        if let Some(hash) = hash {
            if !hash.is_empty() {
                header.push_str(&format!(", hash=\"{}\"", b64::encode(hash)));
            }
        }
        if let Some(ext) = ext {
            if !ext.is_empty() {
                header.push_str(&format!(", ext=\"{}\"", escape_header_attribute(ext)));
            }
        }
        Ok(header)
    }

    /// Render a `WWW-Authenticate` header value carrying the server's current time, so that the
    /// client can correct its clock.
    pub fn timestamp_header(&self, credentials: &Credentials, error: Option<&str>) -> Result<String> {
        let ts = self.clock.now(0);
        let tsm = Mac::for_timestamp(credentials.key(), ts)?;
        let mut header = format!("Hawk ts=\"{}\", tsm=\"{}\"", unix_secs(ts), tsm.to_base64());
        if let Some(error) = error {
            header.push_str(&format!(", error=\"{}\"", escape_header_attribute(error)));
        }
        Ok(header)
    }

    /// Validate a bewit extracted from a request for `uri`, which must no longer contain the
    /// bewit itself (see `Bewit::from_path`).
    pub fn validate_bewit<U>(&self, bewit: &Bewit, credentials: &Credentials, uri: &U) -> bool
    where
        U: RequestUri + ?Sized,
    {
        if bewit.id() != credentials.id() {
            debug!("bewit id does not match credentials");
            return false;
        }
        let uri = match uri.to_uri() {
            Ok(uri) => uri,
            Err(e) => {
                debug!("invalid request uri: {}", e);
                return false;
            }
        };

        let artifacts = Artifacts::new(
            bewit.exp(),
            "",
            "GET",
            uri.resource.as_str(),
            uri.host.as_str(),
            uri.port,
        )
        .ext(bewit.ext());
        if !self.mac_matches(MacType::Bewit, credentials, &artifacts, bewit.mac()) {
            return false;
        }

        if bewit.exp() <= self.clock.now(0) {
            debug!("bewit has expired");
            return false;
        }
        true
    }

    /// Validate a one-way message received from `host:port`.
    pub fn validate_message(
        &self,
        auth: &MessageAuth,
        message: &[u8],
        host: &str,
        port: u16,
        credentials: &Credentials,
        options: &ValidateOptions,
    ) -> bool {
        if auth.id != credentials.id() {
            debug!("message id does not match credentials");
            return false;
        }
        match PayloadHasher::hash(None, credentials.algorithm(), message) {
            Ok(ref hash) if hash == &auth.hash => (),
            Ok(_) => {
                debug!("message hash mismatch");
                return false;
            }
            Err(e) => {
                debug!("could not hash message: {}", e);
                return false;
            }
        }
        if !self.mac_matches(MacType::Message, credentials, &auth.artifacts(host, port), &auth.mac) {
            return false;
        }
        self.ts_within_skew(auth.ts, options.ts_skew)
    }

    fn mac_matches(
        &self,
        mac_type: MacType,
        credentials: &Credentials,
        artifacts: &Artifacts,
        given: &Mac,
    ) -> bool {
        match Mac::new(mac_type, credentials.key(), artifacts) {
            Ok(ref calculated) if calculated == given => true,
            Ok(_) => {
                debug!("{:?} MAC mismatch", mac_type);
                false
            }
            Err(e) => {
                debug!("could not calculate {:?} MAC: {}", mac_type, e);
                false
            }
        }
    }

    fn ts_within_skew(&self, ts: SystemTime, skew: Duration) -> bool {
        let now = self.clock.now(0);
        let diff = match ts.duration_since(now) {
            Ok(d) => d,
            Err(e) => e.duration(),
        };
        if diff > skew {
            debug!("timestamp is {}s from the server clock", diff.as_secs());
            return false;
        }
        true
    }
}
