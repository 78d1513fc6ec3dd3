//! Response bodies: size-capped reads and charset decoding

use crate::{error::Result, ExtractError};
use encoding_rs::{Encoding, UTF_8};
use once_cell::sync::Lazy;
use regex::bytes::Regex;
use reqwest::header::CONTENT_TYPE;
use reqwest::Response;

/// How far into a document a `<meta charset>` declaration is looked for
const META_SNIFF_BYTES: usize = 1024;

static META_CHARSET: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<meta[^>]+charset\s*=\s*["']?\s*([A-Za-z0-9_:.-]+)"#).unwrap()
});

/// A response body read under a byte limit, with its declared content type
pub struct LimitedBody {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

impl LimitedBody {
    /// Decode using the declared charset (header first, then `<meta>`),
    /// falling back to UTF-8. A byte order mark wins over both.
    pub fn text(&self) -> String {
        decode(&self.bytes, self.content_type.as_deref())
    }
}

/// Read a response body, refusing anything over `max` bytes
pub async fn read_limited(
    mut response: Response,
    max: usize,
    timeout_secs: u64,
) -> Result<LimitedBody> {
    if let Some(len) = response.content_length() {
        if len as usize > max {
            return Err(ExtractError::ContentTooLarge {
                size: len as usize,
                max,
            });
        }
    }

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string());

    let mut bytes = Vec::new();
    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|e| ExtractError::from_reqwest(e, timeout_secs))?
    {
        if bytes.len() + chunk.len() > max {
            return Err(ExtractError::ContentTooLarge {
                size: bytes.len() + chunk.len(),
                max,
            });
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(LimitedBody {
        bytes,
        content_type,
    })
}

/// Decode `bytes` to text according to the declared charset
pub fn decode(bytes: &[u8], content_type: Option<&str>) -> String {
    let encoding = content_type
        .and_then(charset_param)
        .and_then(|label| Encoding::for_label(label.as_bytes()))
        .or_else(|| meta_charset(bytes))
        .unwrap_or(UTF_8);

    let (text, _, _) = encoding.decode(bytes);
    text.into_owned()
}

/// `charset` parameter of a Content-Type header value
fn charset_param(content_type: &str) -> Option<&str> {
    content_type.split(';').skip(1).find_map(|param| {
        let (name, value) = param.split_once('=')?;
        name.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches('"'))
    })
}

fn meta_charset(bytes: &[u8]) -> Option<&'static Encoding> {
    let head = &bytes[..bytes.len().min(META_SNIFF_BYTES)];
    let label = META_CHARSET.captures(head)?.get(1)?;
    Encoding::for_label(label.as_bytes())
}
