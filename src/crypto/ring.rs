use super::{CryptoError, Cryptographer, Hasher, HmacKey};
use crate::DigestAlgorithm;
use ::ring::{digest, hmac};

pub struct RingCryptographer;

struct RingHmacKey(hmac::Key);

impl HmacKey for RingHmacKey {
    fn sign(&self, data: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let tag = hmac::sign(&self.0, data);
        Ok(tag.as_ref().to_vec())
    }
}

// This is always `Some` until `finish` is called.
struct RingHasher(Option<digest::Context>);

impl Hasher for RingHasher {
    fn update(&mut self, data: &[u8]) -> Result<(), CryptoError> {
        match self.0.as_mut() {
            Some(ctx) => {
                ctx.update(data);
                Ok(())
            }
            None => Err(CryptoError::Other("update called after `finish`".to_string())),
        }
    }

    fn finish(&mut self) -> Result<Vec<u8>, CryptoError> {
        let ctx = self
            .0
            .take()
            .ok_or_else(|| CryptoError::Other("`finish` called twice".to_string()))?;
        Ok(ctx.finish().as_ref().to_owned())
    }
}

impl Cryptographer for RingCryptographer {
    fn new_key(
        &self,
        algorithm: DigestAlgorithm,
        key: &[u8],
    ) -> Result<Box<dyn HmacKey>, CryptoError> {
        let algorithm = match algorithm {
            DigestAlgorithm::Sha1 => hmac::HMAC_SHA1_FOR_LEGACY_USE_ONLY,
            DigestAlgorithm::Sha256 => hmac::HMAC_SHA256,
        };
        Ok(Box::new(RingHmacKey(hmac::Key::new(algorithm, key))))
    }

    #[allow(deprecated)]
    fn constant_time_compare(&self, a: &[u8], b: &[u8]) -> bool {
        ::ring::constant_time::verify_slices_are_equal(a, b).is_ok()
    }

    fn new_hasher(&self, algorithm: DigestAlgorithm) -> Result<Box<dyn Hasher>, CryptoError> {
        let algorithm: &'static digest::Algorithm = match algorithm {
            DigestAlgorithm::Sha1 => &digest::SHA1_FOR_LEGACY_USE_ONLY,
            DigestAlgorithm::Sha256 => &digest::SHA256,
        };
        Ok(Box::new(RingHasher(Some(digest::Context::new(algorithm)))))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_hmac_sha256_length() {
        let key = RingCryptographer
            .new_key(DigestAlgorithm::Sha256, b"secret")
            .unwrap();
        assert_eq!(key.sign(b"data").unwrap().len(), 32);
    }

    #[test]
    fn test_hmac_sha1_length() {
        let key = RingCryptographer
            .new_key(DigestAlgorithm::Sha1, b"secret")
            .unwrap();
        assert_eq!(key.sign(b"data").unwrap().len(), 20);
    }

    #[test]
    fn test_hasher_finish_twice() {
        let mut hasher = RingCryptographer
            .new_hasher(DigestAlgorithm::Sha256)
            .unwrap();
        hasher.update(b"abc").unwrap();
        assert!(hasher.finish().is_ok());
        assert!(hasher.finish().is_err());
        assert!(hasher.update(b"more").is_err());
    }

    #[test]
    fn test_constant_time_compare() {
        assert!(RingCryptographer.constant_time_compare(b"abc", b"abc"));
        assert!(!RingCryptographer.constant_time_compare(b"abc", b"abd"));
        assert!(!RingCryptographer.constant_time_compare(b"abc", b"abcd"));
    }
}
