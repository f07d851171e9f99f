//! `hawk-signer` must perform certain cryptographic operations in order to function,
//! and applications may need control over which library is used for these.
//!
//! This module can be used for that purpose. If you do not care, the default
//! `use_ring` feature uses [`ring`](https://crates.io/crates/ring); the
//! `use_openssl` feature selects OpenSSL instead.
//!
//! If you want to use your own implementation, disable both features and call
//! [`set_cryptographer`] (or [`set_boxed_cryptographer`]) before any other
//! function in this crate.

use crate::DigestAlgorithm;
use failure::Fail;

mod holder;
pub(crate) use holder::get_cryptographer;
pub use holder::{set_boxed_cryptographer, set_cryptographer, SetCryptographerError};

#[cfg(feature = "use_openssl")]
pub mod openssl;
#[cfg(feature = "use_ring")]
pub mod ring;

#[derive(Fail, Debug)]
pub enum CryptoError {
    /// The configured cryptographer does not support the digest algorithm
    /// specified.
    #[fail(display = "Digest algorithm {:?} is unsupported by this Cryptographer", _0)]
    UnsupportedDigest(DigestAlgorithm),

    /// The underlying library reported a failure.
    #[fail(display = "Cryptographic failure: {}", _0)]
    Other(String),
}

/// A keyed HMAC, ready to sign data.
pub trait HmacKey: Send + Sync + 'static {
    fn sign(&self, data: &[u8]) -> Result<Vec<u8>, CryptoError>;
}

/// A digest context.  `finish` may only be called once.
pub trait Hasher: Send + Sync + 'static {
    fn update(&mut self, data: &[u8]) -> Result<(), CryptoError>;
    fn finish(&mut self) -> Result<Vec<u8>, CryptoError>;
}

/// The set of primitives Hawk needs from a cryptography library.
pub trait Cryptographer: Send + Sync + 'static {
    fn new_key(
        &self,
        algorithm: DigestAlgorithm,
        key: &[u8],
    ) -> Result<Box<dyn HmacKey>, CryptoError>;
    fn new_hasher(&self, algorithm: DigestAlgorithm) -> Result<Box<dyn Hasher>, CryptoError>;
    fn constant_time_compare(&self, a: &[u8], b: &[u8]) -> bool;
}
