//! This module contains basic base64 functionality as used in Hawk.

/// BEWIT_CONFIG encodes to a url-safe value with no padding.
pub(crate) const BEWIT_CONFIG: base64::Config = base64::URL_SAFE_NO_PAD;

/// STANDARD_CONFIG encodes with the standard alphabet and includes padding.
pub(crate) const STANDARD_CONFIG: base64::Config = base64::STANDARD;

pub(crate) fn encode<T: AsRef<[u8]>>(input: T) -> String {
    base64::encode_config(input, STANDARD_CONFIG)
}

pub(crate) fn decode<T: AsRef<[u8]>>(input: T) -> Result<Vec<u8>, base64::DecodeError> {
    base64::decode_config(input, STANDARD_CONFIG)
}
