use super::Cryptographer;
use failure::Fail;
use once_cell::sync::OnceCell;

static CRYPTOGRAPHER: OnceCell<&'static dyn Cryptographer> = OnceCell::new();

#[cfg(feature = "use_ring")]
const DEFAULT_CRYPTOGRAPHER: Option<&'static dyn Cryptographer> =
    Some(&super::ring::RingCryptographer);

#[cfg(all(feature = "use_openssl", not(feature = "use_ring")))]
const DEFAULT_CRYPTOGRAPHER: Option<&'static dyn Cryptographer> =
    Some(&super::openssl::OpensslCryptographer);

#[cfg(not(any(feature = "use_openssl", feature = "use_ring")))]
const DEFAULT_CRYPTOGRAPHER: Option<&'static dyn Cryptographer> = None;

#[derive(Debug, Fail)]
#[fail(display = "A Cryptographer is already installed")]
pub struct SetCryptographerError(());

/// Install a boxed Cryptographer for the rest of the process; see [`set_cryptographer`].
pub fn set_boxed_cryptographer(c: Box<dyn Cryptographer>) -> Result<(), SetCryptographerError> {
    set_cryptographer(Box::leak(c))
}

/// Install the Cryptographer used for every HMAC, digest and comparison in this crate.
///
/// Only the first installation wins.  With the `use_ring` or `use_openssl` feature enabled,
/// the first cryptographic operation installs that backend, so a custom Cryptographer must be
/// installed before any header is signed.  With neither feature, signing before installing
/// one panics.
pub fn set_cryptographer(c: &'static dyn Cryptographer) -> Result<(), SetCryptographerError> {
    CRYPTOGRAPHER.set(c).map_err(|_| SetCryptographerError(()))
}

pub(crate) fn get_cryptographer() -> &'static dyn Cryptographer {
    match DEFAULT_CRYPTOGRAPHER {
        Some(default) => *CRYPTOGRAPHER.get_or_init(|| default),
        None => CRYPTOGRAPHER
            .get()
            .copied()
            .expect("no Cryptographer installed; call hawk_signer::crypto::set_cryptographer"),
    }
}
