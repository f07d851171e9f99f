use crate::artifacts::{unix_secs, Artifacts};
use crate::b64;
use crate::client::Client;
use crate::credentials::Credentials;
use crate::header::{
    parse_authorization_header, parse_ts, SERVER_AUTHORIZATION_KEYS, WWW_AUTHENTICATE_KEYS,
};
use crate::mac::{Mac, MacType};
use crate::payload::PayloadHasher;
use log::debug;
use std::collections::HashMap;
use std::hash::BuildHasher;

/// Read access to the headers of an HTTP response.  Lookups are case-insensitive.
pub trait ResponseHeaders {
    fn get_header(&self, name: &str) -> Option<&str>;
}

impl<K, V, S> ResponseHeaders for HashMap<K, V, S>
where
    K: AsRef<str>,
    V: AsRef<str>,
    S: BuildHasher,
{
    fn get_header(&self, name: &str) -> Option<&str> {
        self.iter()
            .find(|(k, _)| k.as_ref().eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_ref())
    }
}

impl<K, V> ResponseHeaders for [(K, V)]
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    fn get_header(&self, name: &str) -> Option<&str> {
        self.iter()
            .find(|(k, _)| k.as_ref().eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_ref())
    }
}

impl<K, V> ResponseHeaders for Vec<(K, V)>
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    fn get_header(&self, name: &str) -> Option<&str> {
        self.as_slice().get_header(name)
    }
}

/// Options for `Client::authenticate`.
#[derive(Debug, Clone, Default)]
pub struct AuthenticateOptions<'a> {
    /// The response body.  When given, the `Server-Authorization` header must carry a matching
    /// payload hash, computed with the response's `Content-Type`.
    pub payload: Option<&'a [u8]>,
    /// Fail when the response has no `Server-Authorization` header.
    pub required: bool,
}

impl<'c> Client<'c> {
    /// Validate a server's response to a request signed with `artifacts`.
    ///
    /// A `WWW-Authenticate` header carrying a timestamp must carry a valid timestamp MAC; when
    /// it does, the clock offset is updated.  The `Server-Authorization` header, if present (or
    /// if `options.required`), must carry a valid response MAC, and a payload hash matching
    /// `options.payload` if one is given.
    ///
    /// Malformed headers are never an error: the response simply fails to authenticate.
    pub fn authenticate<H>(
        &self,
        headers: &H,
        credentials: &Credentials,
        artifacts: &Artifacts,
        options: &AuthenticateOptions,
    ) -> bool
    where
        H: ResponseHeaders + ?Sized,
    {
        if let Some(www_authenticate) = headers.get_header("www-authenticate") {
            let attributes = match parse_authorization_header(www_authenticate, WWW_AUTHENTICATE_KEYS)
            {
                Some(attributes) => attributes,
                None => {
                    debug!("invalid WWW-Authenticate header");
                    return false;
                }
            };
            if let Some(ts) = attributes.get("ts") {
                let tsm = attributes.get("tsm").copied().unwrap_or("");
                if !ts_mac_matches(credentials, ts, tsm) {
                    debug!("WWW-Authenticate timestamp MAC mismatch");
                    return false;
                }
                let ts = match parse_ts(ts) {
                    Ok(ts) => ts,
                    Err(_) => {
                        debug!("invalid WWW-Authenticate timestamp");
                        return false;
                    }
                };
                self.clock.sync_to(unix_secs(ts));
            }
        }

        let server_authorization = match headers.get_header("server-authorization") {
            Some(value) => value,
            None if options.required => {
                debug!("missing required Server-Authorization header");
                return false;
            }
            None => return true,
        };

        let attributes =
            match parse_authorization_header(server_authorization, SERVER_AUTHORIZATION_KEYS) {
                Some(attributes) => attributes,
                None => {
                    debug!("invalid Server-Authorization header");
                    return false;
                }
            };
        let header_mac = match attributes.get("mac").map(|mac| b64::decode(mac)) {
            Some(Ok(mac)) => Mac::from(mac),
            Some(Err(e)) => {
                debug!("invalid Server-Authorization mac: {}", e);
                return false;
            }
            None => {
                debug!("Server-Authorization header has no mac");
                return false;
            }
        };
        // the hash enters the MAC exactly as the server sent it
        let received_hash = attributes.get("hash").copied();
        let response_artifacts = Artifacts {
            hash: None,
            ext: attributes.get("ext").map(|ext| ext.to_string()),
            ..artifacts.clone()
        };
        match Mac::with_received_hash(
            MacType::Response,
            credentials.key(),
            &response_artifacts,
            received_hash,
        ) {
            Ok(ref calculated) if calculated == &header_mac => (),
            Ok(_) => {
                debug!("Server-Authorization MAC mismatch");
                return false;
            }
            Err(e) => {
                debug!("could not calculate response MAC: {}", e);
                return false;
            }
        }

        let payload = match options.payload {
            Some(payload) => payload,
            None => return true,
        };
        let header_hash = match received_hash.map(b64::decode) {
            Some(Ok(hash)) => hash,
            Some(Err(e)) => {
                debug!("invalid Server-Authorization payload hash: {}", e);
                return false;
            }
            None => {
                debug!("Server-Authorization header has no payload hash");
                return false;
            }
        };
        let content_type = headers.get_header("content-type");
        match PayloadHasher::hash(content_type, credentials.algorithm(), payload) {
            Ok(ref calculated) if calculated == &header_hash => true,
            Ok(_) => {
                debug!("response payload hash mismatch");
                false
            }
            Err(e) => {
                debug!("could not hash response payload: {}", e);
                false
            }
        }
    }
}

/// Check a base64-encoded timestamp MAC over `ts` as received, in constant time.
pub(crate) fn ts_mac_matches(credentials: &Credentials, ts: &str, tsm: &str) -> bool {
    let given = match b64::decode(tsm) {
        Ok(bytes) if !bytes.is_empty() => Mac::from(bytes),
        _ => return false,
    };
    match Mac::for_received_timestamp(credentials.key(), ts) {
        Ok(calculated) => calculated == given,
        Err(_) => false,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::clock::{ClockSync, FixedClock};
    use crate::header::Header;
    use crate::credentials::DigestAlgorithm;
    use crate::mac::calculate_ts_mac;
    use crate::payload::calculate_payload_hash;
    use std::time::{Duration, UNIX_EPOCH};

    fn credentials() -> Credentials {
        Credentials::new(
            "dh37fgj492je",
            "werxhqb98rpaxn39848xrunpaw3489ruxnpa98w4rxn",
            DigestAlgorithm::Sha256,
        )
        .unwrap()
    }

    fn artifacts() -> Artifacts {
        Artifacts::new(
            UNIX_EPOCH + Duration::new(1353832234, 0),
            "j4h3g2",
            "POST",
            "/resource/1?b=1&a=2",
            "example.com",
            8000,
        )
    }

    fn server_authorization(hash: Option<Vec<u8>>, ext: Option<&str>) -> String {
        let artifacts = Artifacts {
            hash: hash.clone(),
            ext: ext.map(str::to_string),
            ..artifacts()
        };
        let mac = Mac::new(MacType::Response, credentials().key(), &artifacts).unwrap();
        let header = Header::new(None, None, None, Some(mac), ext, hash, None, None).unwrap();
        format!("Hawk {}", header)
    }

    fn clock() -> ClockSync {
        ClockSync::new().with_clock(FixedClock(UNIX_EPOCH + Duration::new(1353832000, 0)))
    }

    #[test]
    fn test_header_lookup_case_insensitive() {
        let mut map = HashMap::new();
        map.insert("Server-Authorization", "x");
        assert_eq!(map.get_header("server-authorization"), Some("x"));
        let list = vec![("CONTENT-TYPE".to_string(), "text/plain".to_string())];
        assert_eq!(list.get_header("Content-Type"), Some("text/plain"));
        assert_eq!(list.get_header("Server-Authorization"), None);
    }

    #[test]
    fn test_no_server_authorization() {
        let clock = clock();
        let client = Client::new(&clock);
        let headers: Vec<(&str, &str)> = vec![];
        assert!(client.authenticate(&headers, &credentials(), &artifacts(), &Default::default()));
        let required = AuthenticateOptions {
            required: true,
            ..Default::default()
        };
        assert!(!client.authenticate(&headers, &credentials(), &artifacts(), &required));
    }

    #[test]
    fn test_valid_response() {
        let clock = clock();
        let client = Client::new(&clock);
        let value = server_authorization(None, Some("response-ext"));
        let headers = vec![("Server-Authorization", value.as_str())];
        assert!(client.authenticate(&headers, &credentials(), &artifacts(), &Default::default()));
    }

    #[test]
    fn test_altered_mac() {
        let clock = clock();
        let client = Client::new(&clock);
        let value = server_authorization(None, None);
        // flip one character of the base64 mac
        let mac_start = value.find("mac=\"").unwrap() + 5;
        let mut altered = value.clone().into_bytes();
        altered[mac_start] = if altered[mac_start] == b'A' { b'B' } else { b'A' };
        let altered = String::from_utf8(altered).unwrap();
        let headers = vec![("Server-Authorization", altered.as_str())];
        assert!(!client.authenticate(&headers, &credentials(), &artifacts(), &Default::default()));
    }

    #[test]
    fn test_wrong_artifacts() {
        let clock = clock();
        let client = Client::new(&clock);
        let value = server_authorization(None, None);
        let headers = vec![("Server-Authorization", value.as_str())];
        let mut other = artifacts();
        other.nonce = "other".to_string();
        assert!(!client.authenticate(&headers, &credentials(), &other, &Default::default()));
    }

    #[test]
    fn test_malformed_server_authorization() {
        let clock = clock();
        let client = Client::new(&clock);
        for value in &[
            "Hawk",
            "Basic abc",
            "Hawk mac=\"abc\", id=\"x\"",
            "Hawk mac=\"abc\", mac=\"abc\"",
            "Hawk ext=\"only-ext\"",
            "Hawk mac=\"not base64!\"",
        ] {
            let headers = vec![("Server-Authorization", *value)];
            assert!(
                !client.authenticate(&headers, &credentials(), &artifacts(), &Default::default()),
                "{:?} authenticated",
                value
            );
        }
    }

    #[test]
    fn test_payload() {
        let clock = clock();
        let client = Client::new(&clock);
        let payload = b"some reply";
        let hash =
            PayloadHasher::hash(Some("text/plain"), DigestAlgorithm::Sha256, &payload[..]).unwrap();
        let value = server_authorization(Some(hash), None);
        let headers = vec![
            ("Server-Authorization", value.as_str()),
            ("Content-Type", "text/plain; charset=utf-8"),
        ];
        let options = AuthenticateOptions {
            payload: Some(&payload[..]),
            required: true,
        };
        assert!(client.authenticate(&headers, &credentials(), &artifacts(), &options));

        let wrong = AuthenticateOptions {
            payload: Some(&b"other reply"[..]),
            required: true,
        };
        assert!(!client.authenticate(&headers, &credentials(), &artifacts(), &wrong));

        let wrong_type = vec![
            ("Server-Authorization", value.as_str()),
            ("Content-Type", "application/json"),
        ];
        assert!(!client.authenticate(&wrong_type, &credentials(), &artifacts(), &options));
    }

    #[test]
    fn test_payload_without_hash() {
        let clock = clock();
        let client = Client::new(&clock);
        let value = server_authorization(None, None);
        let headers = vec![("Server-Authorization", value.as_str())];
        let options = AuthenticateOptions {
            payload: Some(&b""[..]),
            required: false,
        };
        assert!(!client.authenticate(&headers, &credentials(), &artifacts(), &options));
    }

    #[test]
    fn test_payload_hash_pinned() {
        assert_eq!(
            calculate_payload_hash(
                "Thank you for flying Hawk",
                DigestAlgorithm::Sha256,
                Some("text/plain")
            )
            .unwrap(),
            "Yi9LfIIFRtBEPt74PVmbTF/xVAwPn7ub15ePICfgnuY="
        );
    }

    #[test]
    fn test_www_authenticate_updates_offset() {
        let clock = clock();
        let client = Client::new(&clock);
        let ts = UNIX_EPOCH + Duration::new(1353832234, 0);
        let tsm = calculate_ts_mac(ts, &credentials()).unwrap();
        let value = format!("Hawk ts=\"1353832234\", tsm=\"{}\", error=\"Stale timestamp\"", tsm);
        let headers = vec![("WWW-Authenticate", value.as_str())];
        assert!(client.authenticate(&headers, &credentials(), &artifacts(), &Default::default()));
        assert_eq!(clock.offset(), 234);
    }

    #[test]
    fn test_www_authenticate_bad_tsm() {
        let clock = clock();
        let client = Client::new(&clock);
        let value = "Hawk ts=\"1353832234\", tsm=\"3mw1eh/qXzl0wJZ/E6XvBhRMEJN7L3j8AyMA8eItEb0=\"";
        let headers = vec![("WWW-Authenticate", value)];
        assert!(!client.authenticate(&headers, &credentials(), &artifacts(), &Default::default()));
        assert_eq!(clock.offset(), 0);
    }

    #[test]
    fn test_www_authenticate_missing_tsm() {
        let clock = clock();
        let client = Client::new(&clock);
        let headers = vec![("WWW-Authenticate", "Hawk ts=\"1353832234\"")];
        assert!(!client.authenticate(&headers, &credentials(), &artifacts(), &Default::default()));
    }

    #[test]
    fn test_www_authenticate_error_only() {
        let clock = clock();
        let client = Client::new(&clock);
        let headers = vec![("WWW-Authenticate", "Hawk error=\"Unauthorized\"")];
        assert!(client.authenticate(&headers, &credentials(), &artifacts(), &Default::default()));
        let malformed = vec![("WWW-Authenticate", "Hawk error=Unauthorized")];
        assert!(!client.authenticate(&malformed, &credentials(), &artifacts(), &Default::default()));
    }

    #[test]
    fn test_www_authenticate_non_numeric_ts() {
        let clock = clock();
        let client = Client::new(&clock);
        let headers = vec![("WWW-Authenticate", "Hawk ts=\"soon\", tsm=\"abc\"")];
        assert!(!client.authenticate(&headers, &credentials(), &artifacts(), &Default::default()));
    }

    #[test]
    fn test_www_authenticate_ts_out_of_range() {
        let clock = clock();
        let client = Client::new(&clock);
        let headers = vec![(
            "WWW-Authenticate",
            "Hawk ts=\"18446744073709551615\", tsm=\"abc\"",
        )];
        assert!(!client.authenticate(&headers, &credentials(), &artifacts(), &Default::default()));

        // even a correctly signed timestamp fails when it cannot be represented
        let key = credentials();
        let tsm = Mac::for_received_timestamp(key.key(), "18446744073709551615").unwrap();
        let value = format!("Hawk ts=\"18446744073709551615\", tsm=\"{}\"", tsm.to_base64());
        let headers = vec![("WWW-Authenticate", value.as_str())];
        assert!(!client.authenticate(&headers, &key, &artifacts(), &Default::default()));
        assert_eq!(clock.offset(), 0);
    }

    #[test]
    fn test_www_authenticate_ts_mac_over_received_string() {
        let clock = clock();
        let client = Client::new(&clock);
        let key = credentials();
        let tsm = Mac::for_received_timestamp(key.key(), "01353832234").unwrap();
        let value = format!("Hawk ts=\"01353832234\", tsm=\"{}\"", tsm.to_base64());
        let headers = vec![("WWW-Authenticate", value.as_str())];
        assert!(client.authenticate(&headers, &key, &artifacts(), &Default::default()));
        assert_eq!(clock.offset(), 234);

        // the MAC of the canonical rendering does not cover the zero-padded string
        let tsm = calculate_ts_mac(UNIX_EPOCH + Duration::new(1353832234, 0), &key).unwrap();
        let value = format!("Hawk ts=\"01353832234\", tsm=\"{}\"", tsm);
        let headers = vec![("WWW-Authenticate", value.as_str())];
        assert!(!client.authenticate(&headers, &key, &artifacts(), &Default::default()));
    }

    #[test]
    fn test_server_authorization_hash_used_as_received() {
        let clock = clock();
        let client = Client::new(&clock);
        let key = credentials();
        // MAC computed over a hash string that is not the canonical encoding of its bytes
        let received = "AQIDBB==";
        let mac = Mac::with_received_hash(MacType::Response, key.key(), &artifacts(), Some(received))
            .unwrap();
        let value = format!("Hawk mac=\"{}\", hash=\"{}\"", mac.to_base64(), received);
        let headers = vec![("Server-Authorization", value.as_str())];
        assert!(client.authenticate(&headers, &key, &artifacts(), &Default::default()));

        let canonical = format!("Hawk mac=\"{}\", hash=\"AQIDBA==\"", mac.to_base64());
        let headers = vec![("Server-Authorization", canonical.as_str())];
        assert!(!client.authenticate(&headers, &key, &artifacts(), &Default::default()));
    }

    #[test]
    fn test_ts_mac_matches() {
        assert!(ts_mac_matches(
            &credentials(),
            "1353832234",
            "2mw1eh/qXzl0wJZ/E6XvBhRMEJN7L3j8AyMA8eItEb0="
        ));
        assert!(!ts_mac_matches(&credentials(), "1353832234", ""));
        assert!(!ts_mac_matches(&credentials(), "1353832234", "%%%"));
    }
}
