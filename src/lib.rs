//! This crate signs HTTP requests with Hawk and verifies the server's responses.
//!
//! It computes `Authorization` header values and bewit tokens for requests, validates
//! `Server-Authorization` and `WWW-Authenticate` response headers, and keeps a clock offset so
//! that requests from a machine with a wrong clock are still accepted.  Server-side validation
//! is included as well, mostly so that both halves of the exchange can be tested together.
//!
//! # Examples
//!
//! ## Hawk Client
//!
//! A client signs a request, sends the resulting header, and then checks the response:
//!
//! ```
//! use hawk_signer::{AuthenticateOptions, Client, ClockSync, Credentials, DigestAlgorithm,
//!                   HeaderOptions};
//!
//! fn main() {
//!     // one ClockSync per Hawk server, shared by everything talking to that server
//!     let clock = ClockSync::new();
//!     let client = Client::new(&clock);
//!     let credentials = Credentials::new(
//!         "test-client",
//!         "no-secret",
//!         DigestAlgorithm::Sha256,
//!     )
//!     .unwrap();
//!
//!     let payload = b"{\"some\": \"json\"}";
//!     let options = HeaderOptions {
//!         payload: Some(&payload[..]),
//!         content_type: Some("application/json"),
//!         ext: Some("some-app-data"),
//!         ..Default::default()
//!     };
//!     let signed = client
//!         .header("http://localhost:8000/resource", "POST", &credentials, &options)
//!         .unwrap();
//!     assert!(signed.field_value.starts_with("Hawk id=\"test-client\", "));
//!     assert!(signed.field_value.contains("mac=\""));
//!
//!     // .. send the request with `Authorization: <field_value>` and collect the response
//!     // headers, then:
//!     let headers: Vec<(&str, &str)> = vec![];
//!     let valid = client.authenticate(
//!         &headers,
//!         &credentials,
//!         &signed.artifacts,
//!         &AuthenticateOptions::default(),
//!     );
//!     // without a Server-Authorization header there is nothing to check
//!     assert!(valid);
//! }
//! ```
//!
//! ## Hawk Server
//!
//! ```
//! use hawk_signer::{ClockSync, Credentials, DigestAlgorithm, Header, Server, Uri};
//! use std::str::FromStr;
//!
//! fn main() {
//!     let clock = ClockSync::new();
//!     let server = Server::new(&clock);
//!     let credentials = Credentials::new(
//!         "dh37fgj492je",
//!         "werxhqb98rpaxn39848xrunpaw3489ruxnpa98w4rxn",
//!         DigestAlgorithm::Sha256,
//!     )
//!     .unwrap();
//!
//!     let header = Header::from_str(
//!         "Hawk id=\"dh37fgj492je\", ts=\"1353832234\", nonce=\"j4h3g2\", \
//!          ext=\"some-app-ext-data\", mac=\"6R4rV5iE+NPoym+WwjeHzjAGXUtLNIxmo1vpMofpLAE=\"",
//!     )
//!     .unwrap();
//!     let uri = Uri::new("example.com", 8000, "/resource/1?b=1&a=2");
//!
//!     // the MAC is valid, but the timestamp is years old
//!     assert!(!server.validate_header(&header, &credentials, "GET", &uri, &Default::default()));
//!
//!     // tell the client what time it is
//!     let www_authenticate = server
//!         .timestamp_header(&credentials, Some("Stale timestamp"))
//!         .unwrap();
//!     assert!(www_authenticate.starts_with("Hawk ts=\""));
//! }
//! ```

mod artifacts;
mod b64;
mod bewit;
mod client;
mod clock;
mod credentials;
pub mod crypto;
mod error;
mod header;
mod mac;
mod message;
mod payload;
mod response;
mod server;
mod uri;
mod util;

pub use crate::artifacts::Artifacts;
pub use crate::bewit::Bewit;
pub use crate::client::{BewitOptions, Client, HeaderOptions, SignedHeader};
pub use crate::clock::{
    Clock, ClockSync, FixedClock, KeyValueStore, MemoryStore, SystemClock, NTP_OFFSET_KEY,
};
pub use crate::credentials::{Credentials, DigestAlgorithm, Key};
pub use crate::error::*;
pub use crate::header::{parse_authorization_header, Header};
pub use crate::mac::{calculate_mac, calculate_ts_mac, normalized_string, Mac, MacType};
pub use crate::message::{MessageAuth, MessageOptions, TimestampMessage};
pub use crate::payload::{calculate_payload_hash, parse_content_type, PayloadHasher};
pub use crate::response::{AuthenticateOptions, ResponseHeaders};
pub use crate::server::{Server, ValidateOptions, DEFAULT_TS_SKEW};
pub use crate::uri::{RequestUri, Uri};

/// Attribute names accepted in each kind of Hawk header.
pub mod attributes {
    pub use crate::header::{AUTHORIZATION_KEYS, SERVER_AUTHORIZATION_KEYS, WWW_AUTHENTICATE_KEYS};
}
