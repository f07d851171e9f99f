use super::{CryptoError, Cryptographer, Hasher, HmacKey};
use crate::DigestAlgorithm;
use ::openssl::error::ErrorStack;
use ::openssl::hash::{Hasher as OpensslHasher, MessageDigest};
use ::openssl::pkey::{PKey, Private};
use ::openssl::sign::Signer;

impl From<ErrorStack> for CryptoError {
    fn from(e: ErrorStack) -> Self {
        CryptoError::Other(e.to_string())
    }
}

pub struct OpensslCryptographer;

struct OpensslHmacKey {
    key: PKey<Private>,
    digest: MessageDigest,
}

impl HmacKey for OpensslHmacKey {
    fn sign(&self, data: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let mut signer = Signer::new(self.digest, &self.key)?;
        signer.update(data)?;
        Ok(signer.sign_to_vec()?)
    }
}

// This is always `Some` until `finish` is called.
struct OpensslHasherWrapper(Option<OpensslHasher>);

impl Hasher for OpensslHasherWrapper {
    fn update(&mut self, data: &[u8]) -> Result<(), CryptoError> {
        match self.0.as_mut() {
            Some(hasher) => Ok(hasher.update(data)?),
            None => Err(CryptoError::Other("update called after `finish`".to_string())),
        }
    }

    fn finish(&mut self) -> Result<Vec<u8>, CryptoError> {
        let mut hasher = self
            .0
            .take()
            .ok_or_else(|| CryptoError::Other("`finish` called twice".to_string()))?;
        Ok(hasher.finish()?.to_vec())
    }
}

fn message_digest(algorithm: DigestAlgorithm) -> MessageDigest {
    match algorithm {
        DigestAlgorithm::Sha1 => MessageDigest::sha1(),
        DigestAlgorithm::Sha256 => MessageDigest::sha256(),
    }
}

impl Cryptographer for OpensslCryptographer {
    fn new_key(
        &self,
        algorithm: DigestAlgorithm,
        key: &[u8],
    ) -> Result<Box<dyn HmacKey>, CryptoError> {
        Ok(Box::new(OpensslHmacKey {
            key: PKey::hmac(key)?,
            digest: message_digest(algorithm),
        }))
    }

    fn constant_time_compare(&self, a: &[u8], b: &[u8]) -> bool {
        // openssl::memcmp::eq panics on differing lengths
        a.len() == b.len() && ::openssl::memcmp::eq(a, b)
    }

    fn new_hasher(&self, algorithm: DigestAlgorithm) -> Result<Box<dyn Hasher>, CryptoError> {
        let hasher = OpensslHasher::new(message_digest(algorithm))?;
        Ok(Box::new(OpensslHasherWrapper(Some(hasher))))
    }
}
