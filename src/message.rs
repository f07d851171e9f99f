//! One-way message signing, for channels other than HTTP.
//!
//! A signed message covers a host, port, and payload but no method or resource.  The receiver
//! validates it with `Server::validate_message`.

use crate::artifacts::{unix_secs, Artifacts};
use crate::client::Client;
use crate::credentials::Credentials;
use crate::error::*;
use crate::mac::{Mac, MacType};
use crate::payload::PayloadHasher;
use crate::response::ts_mac_matches;
use crate::util::{random_string, NONCE_LEN};
use log::debug;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Options for `Client::message`.
#[derive(Debug, Clone, Default)]
pub struct MessageOptions<'a> {
    pub timestamp: Option<SystemTime>,
    pub nonce: Option<&'a str>,
    pub localtime_offset_ms: i64,
}

/// The authorization attached to a one-way message.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageAuth {
    pub id: String,
    pub ts: SystemTime,
    pub nonce: String,
    /// Payload hash of the message, as raw digest bytes
    pub hash: Vec<u8>,
    pub mac: Mac,
}

/// A server timestamp and its MAC, as delivered out-of-band for clock synchronization.
#[derive(Debug, Clone, PartialEq)]
pub struct TimestampMessage {
    pub ts: SystemTime,
    /// base64-encoded timestamp MAC
    pub tsm: String,
}

impl MessageAuth {
    /// The artifacts this authorization's MAC covers.
    pub(crate) fn artifacts(&self, host: &str, port: u16) -> Artifacts {
        Artifacts::new(self.ts, self.nonce.as_str(), "", "", host, port).hash(self.hash.clone())
    }
}

impl<'c> Client<'c> {
    /// Sign `message` for delivery to `host:port`.
    pub fn message(
        &self,
        host: &str,
        port: u16,
        message: &[u8],
        credentials: &Credentials,
        options: &MessageOptions,
    ) -> Result<MessageAuth> {
        if host.is_empty() {
            return Err(Error::InvalidArgument("missing host".into()));
        }
        if port == 0 {
            return Err(Error::InvalidArgument("invalid port".into()));
        }

        let ts = match options.timestamp {
            Some(ts) => UNIX_EPOCH + Duration::from_secs(unix_secs(ts)),
            None => self.clock.now(options.localtime_offset_ms),
        };
        let nonce = match options.nonce {
            Some(nonce) if !nonce.is_empty() => nonce.to_string(),
            _ => random_string(NONCE_LEN),
        };
        let hash = PayloadHasher::hash(None, credentials.algorithm(), message)?;

        let mut auth = MessageAuth {
            id: credentials.id().to_string(),
            ts,
            nonce,
            hash,
            mac: Mac::from(vec![]),
        };
        auth.mac = Mac::new(MacType::Message, credentials.key(), &auth.artifacts(host, port))?;
        Ok(auth)
    }

    /// Check a timestamp MAC received from the server, and optionally adopt the server's clock.
    pub fn authenticate_timestamp(
        &self,
        message: &TimestampMessage,
        credentials: &Credentials,
        update_clock: bool,
    ) -> bool {
        let ts = unix_secs(message.ts).to_string();
        if !ts_mac_matches(credentials, &ts, &message.tsm) {
            debug!("timestamp message MAC mismatch");
            return false;
        }
        if update_clock {
            self.clock.sync_to(unix_secs(message.ts));
        }
        true
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::clock::{ClockSync, FixedClock};
    use crate::credentials::DigestAlgorithm;
    use crate::mac::calculate_ts_mac;
    use pretty_assertions::assert_eq;

    fn credentials() -> Credentials {
        Credentials::new(
            "dh37fgj492je",
            "werxhqb98rpaxn39848xrunpaw3489ruxnpa98w4rxn",
            DigestAlgorithm::Sha256,
        )
        .unwrap()
    }

    fn clock() -> ClockSync {
        ClockSync::new().with_clock(FixedClock(UNIX_EPOCH + Duration::new(1353832000, 0)))
    }

    #[test]
    fn test_message() {
        let clock = clock();
        let options = MessageOptions {
            nonce: Some("abc123"),
            ..Default::default()
        };
        let auth = Client::new(&clock)
            .message("example.com", 8080, b"I am the boodyman", &credentials(), &options)
            .unwrap();
        assert_eq!(auth.id, "dh37fgj492je");
        assert_eq!(auth.ts, UNIX_EPOCH + Duration::new(1353832000, 0));
        assert_eq!(auth.nonce, "abc123");
        assert_eq!(
            auth.hash,
            PayloadHasher::hash(None, DigestAlgorithm::Sha256, "I am the boodyman").unwrap()
        );

        let artifacts = Artifacts::new(auth.ts, "abc123", "", "", "example.com", 8080)
            .hash(auth.hash.clone());
        let mac = Mac::new(MacType::Message, credentials().key(), &artifacts).unwrap();
        assert!(auth.mac == mac);
    }

    #[test]
    fn test_message_random_nonce() {
        let clock = clock();
        let auth = Client::new(&clock)
            .message("example.com", 8080, b"", &credentials(), &Default::default())
            .unwrap();
        assert_eq!(auth.nonce.len(), NONCE_LEN);
    }

    #[test]
    fn test_message_invalid_arguments() {
        let clock = clock();
        let client = Client::new(&clock);
        assert!(client
            .message("", 8080, b"x", &credentials(), &Default::default())
            .is_err());
        assert!(client
            .message("example.com", 0, b"x", &credentials(), &Default::default())
            .is_err());
    }

    #[test]
    fn test_authenticate_timestamp() {
        let clock = clock();
        let client = Client::new(&clock);
        let ts = UNIX_EPOCH + Duration::new(1353832234, 0);
        let message = TimestampMessage {
            ts,
            tsm: calculate_ts_mac(ts, &credentials()).unwrap(),
        };
        assert!(client.authenticate_timestamp(&message, &credentials(), false));
        assert_eq!(clock.offset(), 0);
        assert!(client.authenticate_timestamp(&message, &credentials(), true));
        assert_eq!(clock.offset(), 234);
    }

    #[test]
    fn test_authenticate_timestamp_altered() {
        let clock = clock();
        let client = Client::new(&clock);
        let message = TimestampMessage {
            ts: UNIX_EPOCH + Duration::new(1353832234, 0),
            tsm: "3mw1eh/qXzl0wJZ/E6XvBhRMEJN7L3j8AyMA8eItEb0=".to_string(),
        };
        assert!(!client.authenticate_timestamp(&message, &credentials(), true));
        assert_eq!(clock.offset(), 0);
    }
}
