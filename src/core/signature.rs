//! HMAC request signing for the upstream dictionary API.
//!
//! The upstream uses a POP-style scheme: query parameters (plus `appKey` and
//! `timestamp`) are canonicalized with a restricted percent-encoding, sorted
//! ordinally, folded into a single string-to-sign, and signed with
//! HMAC-SHA1 keyed by `appSecret + "&"`. The resulting digest is
//! base64-encoded and sent in the `Signature` header.
use std::collections::BTreeMap;

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64_STANDARD};
use chrono::{FixedOffset, Utc};
use hmac::{Hmac, Mac};
use sha1::Sha1;

type HmacSha1 = Hmac<Sha1>;

/// Timestamp format required by the upstream, rendered in UTC+8.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const UPSTREAM_UTC_OFFSET_SECS: i32 = 8 * 3600;

/// Percent-encode a value under the upstream's restricted rule set.
///
/// After the base encoding, three substitutions are applied: `+` becomes
/// `%20`, `*` becomes `%2A` and `%7E` is decoded back to a literal `~`.
/// The same rule must be applied on every invocation or signatures stop
/// being reproducible.
pub fn special_url_encode(value: &str) -> String {
    apply_substitutions(&urlencoding::encode(value))
}

/// The canonicalization delta versus a naive form-encoder. Idempotent.
fn apply_substitutions(encoded: &str) -> String {
    encoded
        .replace('+', "%20")
        .replace('*', "%2A")
        .replace("%7E", "~")
}

/// Build the canonical string-to-sign.
///
/// `query_params` are merged with `appKey` and `timestamp`, sorted by key
/// using ordinal comparison, and joined as `encKey=encValue` pairs. The
/// final shape is `UPPER(method) + "&" + enc(path) + "&" + enc(sortedQuery)`.
/// Parameter insertion order never affects the result.
pub fn build_string_to_sign(
    method: &str,
    path: &str,
    query_params: &[(String, String)],
    app_key: &str,
    timestamp: &str,
) -> String {
    let mut params: BTreeMap<&str, &str> = query_params
        .iter()
        .map(|(key, value)| (key.as_str(), value.as_str()))
        .collect();
    params.insert("appKey", app_key);
    params.insert("timestamp", timestamp);

    let sorted_query = params
        .iter()
        .map(|(key, value)| format!("{}={}", special_url_encode(key), special_url_encode(value)))
        .collect::<Vec<_>>()
        .join("&");

    format!(
        "{}&{}&{}",
        method.to_uppercase(),
        special_url_encode(path),
        special_url_encode(&sorted_query)
    )
}

/// Compute the base64-encoded HMAC-SHA1 signature for one request.
///
/// The signing key is `app_secret + "&"`, per the upstream contract.
pub fn sign(
    method: &str,
    path: &str,
    query_params: &[(String, String)],
    app_key: &str,
    app_secret: &str,
    timestamp: &str,
) -> String {
    let string_to_sign = build_string_to_sign(method, path, query_params, app_key, timestamp);
    let signing_key = format!("{app_secret}&");
    let mut mac =
        HmacSha1::new_from_slice(signing_key.as_bytes()).expect("HMAC accepts any key length");
    mac.update(string_to_sign.as_bytes());
    BASE64_STANDARD.encode(mac.finalize().into_bytes())
}

/// Current timestamp in the upstream's expected format and zone.
pub fn generate_timestamp() -> String {
    let offset =
        FixedOffset::east_opt(UPSTREAM_UTC_OFFSET_SECS).expect("static UTC+8 offset is valid");
    Utc::now()
        .with_timezone(&offset)
        .format(TIMESTAMP_FORMAT)
        .to_string()
}
