use rand::distributions::Alphanumeric;
use rand::Rng;

/// Length of generated nonces, as in other Hawk clients.
pub(crate) const NONCE_LEN: usize = 6;

/// Create a random string of `len` alphanumeric characters.
pub(crate) fn random_string(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .collect()
}
