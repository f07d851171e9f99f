use crate::crypto::{self, HmacKey};
use crate::error::*;
use std::fmt;
use std::str::FromStr;

/// The HMAC digest algorithms Hawk agrees on between client and server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DigestAlgorithm {
    Sha1,
    Sha256,
}

impl DigestAlgorithm {
    /// The name used for this algorithm by credential stores and other Hawk implementations.
    pub fn name(self) -> &'static str {
        match self {
            DigestAlgorithm::Sha1 => "sha1",
            DigestAlgorithm::Sha256 => "sha256",
        }
    }
}

impl FromStr for DigestAlgorithm {
    type Err = Error;
    fn from_str(s: &str) -> Result<DigestAlgorithm> {
        match s {
            "sha1" => Ok(DigestAlgorithm::Sha1),
            "sha256" => Ok(DigestAlgorithm::Sha256),
            other => Err(Error::UnknownAlgorithm(other.to_string())),
        }
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Hawk key.
///
/// While any sequence of bytes can be specified as a key, note that each digest algorithm has
/// a suggested key length, and that passwords should *not* be used as keys.  Keys of incorrect
/// length are handled according to the digest's implementation.
pub struct Key {
    inner: Box<dyn HmacKey>,
    algorithm: DigestAlgorithm,
}

impl Key {
    pub fn new<B>(key: B, algorithm: DigestAlgorithm) -> Result<Key>
    where
        B: AsRef<[u8]>,
    {
        Ok(Key {
            inner: crypto::get_cryptographer().new_key(algorithm, key.as_ref())?,
            algorithm,
        })
    }

    pub fn sign(&self, data: &[u8]) -> Result<Vec<u8>> {
        Ok(self.inner.sign(data)?)
    }

    pub fn algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Key")
            .field("algorithm", &self.algorithm)
            .finish()
    }
}

/// Hawk credentials: an ID and a key associated with that ID.  The digest algorithm
/// must be agreed between the server and the client.
///
/// Credentials are usually supplied by a credential store as three strings; the
/// algorithm string is checked with `str::parse::<DigestAlgorithm>()` before any
/// cryptographic work happens.
#[derive(Debug)]
pub struct Credentials {
    id: String,
    key: Key,
}

impl Credentials {
    /// Create credentials, rejecting an empty id or key.
    pub fn new<S, B>(id: S, key: B, algorithm: DigestAlgorithm) -> Result<Credentials>
    where
        S: Into<String>,
        B: AsRef<[u8]>,
    {
        let id = id.into();
        if id.is_empty() {
            return Err(Error::InvalidCredentials("missing id".to_string()));
        }
        if key.as_ref().is_empty() {
            return Err(Error::InvalidCredentials("missing key".to_string()));
        }
        Ok(Credentials {
            id,
            key: Key::new(key, algorithm)?,
        })
    }

    /// Create credentials from the three strings a credential store hands out.
    pub fn from_strings(id: &str, key: &str, algorithm: &str) -> Result<Credentials> {
        let algorithm = algorithm.parse()?;
        Credentials::new(id, key, algorithm)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn key(&self) -> &Key {
        &self.key
    }

    pub fn algorithm(&self) -> DigestAlgorithm {
        self.key.algorithm
    }
}
