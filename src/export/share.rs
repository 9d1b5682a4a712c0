//! Share-link encoding.
//!
//! A share token is the document's JSON, base64 encoded with the standard
//! alphabet. Tokens travel inside a `data` query parameter, where they can
//! pick up damage on the way (a `+` turned into a space, padding stripped, or
//! a URL-safe re-encoding), so decoding accepts all of those.

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, STANDARD};
use base64::engine::DecodePaddingMode;
use base64::Engine;
use tracing::{debug, warn};
use url::Url;

use crate::error::{ShareError, ShareResult};
use crate::model::Analysis;

/// Query parameter carrying a share token.
pub const SHARE_PARAM: &str = "data";

const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Encode a document as a share token.
pub fn encode_share(analysis: &Analysis) -> ShareResult<String> {
    let json = serde_json::to_vec(analysis)?;
    Ok(STANDARD.encode(json))
}

/// Decode a share token into a normalized document.
pub fn decode_share(token: &str) -> ShareResult<Analysis> {
    let cleaned: String = token
        .trim()
        .chars()
        .map(|c| match c {
            ' ' => '+',
            '-' => '+',
            '_' => '/',
            other => other,
        })
        .collect();
    if cleaned.is_empty() {
        return Err(ShareError::EmptyToken);
    }

    let bytes = LENIENT.decode(cleaned.as_bytes())?;
    let value: serde_json::Value = serde_json::from_slice(&bytes)?;
    let analysis = Analysis::from_json_value(value)?;
    debug!(analysis_id = %analysis.id, "Decoded shared analysis");
    Ok(analysis)
}

/// Build `<base>?data=<token>` for a document.
///
/// Any query or fragment already on `base` is dropped.
pub fn share_url(base: &Url, analysis: &Analysis) -> ShareResult<Url> {
    let token = encode_share(analysis)?;
    let mut url = base.clone();
    url.set_fragment(None);
    url.set_query(None);
    url.query_pairs_mut().append_pair(SHARE_PARAM, &token);
    Ok(url)
}

/// Extract the share token from a link.
pub fn token_from_url(url: &Url) -> ShareResult<String> {
    url.query_pairs()
        .find(|(key, _)| key == SHARE_PARAM)
        .map(|(_, value)| value.into_owned())
        .ok_or(ShareError::MissingData)
}

/// Decode either a full share link or a bare token.
pub fn decode_link_or_token(input: &str) -> ShareResult<Analysis> {
    let input = input.trim();
    match Url::parse(input) {
        Ok(url) if url.has_host() => decode_share(&token_from_url(&url)?),
        _ => decode_share(input),
    }
}

/// The same URL with the `data` parameter removed.
///
/// Other query parameters are kept; the query is dropped entirely when
/// nothing else remains.
pub fn strip_share_param(url: &Url) -> Url {
    let remaining: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key != SHARE_PARAM)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    let mut stripped = url.clone();
    if remaining.is_empty() {
        stripped.set_query(None);
    } else {
        stripped.query_pairs_mut().clear().extend_pairs(remaining);
    }
    stripped
}

/// Decode the share parameter of a startup URL, if present.
///
/// Returns `None` when there is no parameter or it cannot be decoded; a bad
/// token is logged and otherwise ignored so startup can continue.
pub fn shared_analysis_from_url(url: &Url) -> Option<Analysis> {
    let token = token_from_url(url).ok()?;
    match decode_share(&token) {
        Ok(analysis) => Some(analysis),
        Err(e) => {
            warn!(error = %e, "Failed to decode shared link");
            None
        }
    }
}
