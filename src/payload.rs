use crate::b64;
use crate::credentials::DigestAlgorithm;
use crate::crypto::{self, Hasher};
use crate::error::*;
use crate::mac::HEADER_VERSION;

/// A utility for hashing payloads. Feed your entity body to this, then pass the `finish`
/// result to a request or response.
pub struct PayloadHasher(Box<dyn Hasher>);

impl PayloadHasher {
    /// Create a new PayloadHasher. The `content_type` is normalized: parameters after `;` are
    /// dropped, and the remainder trimmed and lower-cased.  A missing content type hashes as
    /// the empty string.  The digest is assumed to be the same as the digest used for the
    /// credentials in the request.
    pub fn new(content_type: Option<&str>, algorithm: DigestAlgorithm) -> Result<Self> {
        let mut hasher = PayloadHasher(crypto::get_cryptographer().new_hasher(algorithm)?);
        hasher.update(format!("hawk.{}.payload\n", HEADER_VERSION))?;
        hasher.update(parse_content_type(content_type))?;
        hasher.update("\n")?;
        Ok(hasher)
    }

    /// Hash a single value and return it
    pub fn hash<B>(content_type: Option<&str>, algorithm: DigestAlgorithm, payload: B) -> Result<Vec<u8>>
    where
        B: AsRef<[u8]>,
    {
        let mut hasher = PayloadHasher::new(content_type, algorithm)?;
        hasher.update(payload)?;
        hasher.finish()
    }

    /// Update the hash with new data.
    pub fn update<B>(&mut self, data: B) -> Result<()>
    where
        B: AsRef<[u8]>,
    {
        Ok(self.0.update(data.as_ref())?)
    }

    /// Finish hashing and return the result
    ///
    /// Note that this appends a newline to the payload, as does the JS Hawk implementation.
    pub fn finish(mut self) -> Result<Vec<u8>> {
        self.update("\n")?;
        Ok(self.0.finish()?)
    }
}

/// Reduce a `Content-Type` header value to its lower-cased media type.
pub fn parse_content_type(header: Option<&str>) -> String {
    match header {
        None => String::new(),
        Some(header) => header
            .split(';')
            .next()
            .unwrap_or("")
            .trim()
            .to_lowercase(),
    }
}

/// Calculate the base64-encoded Hawk payload hash.
pub fn calculate_payload_hash<B>(
    payload: B,
    algorithm: DigestAlgorithm,
    content_type: Option<&str>,
) -> Result<String>
where
    B: AsRef<[u8]>,
{
    Ok(b64::encode(PayloadHasher::hash(content_type, algorithm, payload)?))
}
