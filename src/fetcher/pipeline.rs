use crate::fetcher::{
    errors::FetchError,
    types::{Charset, PageResponse},
};
use bytes::Bytes;
use chrono::Utc;
use encoding_rs::Encoding;
use regex::Regex;
use reqwest::{StatusCode, header::HeaderMap};
use std::sync::LazyLock;
use url::Url;

static CHARSET_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)charset\s*=\s*["']?([^"'\s;]+)"#).unwrap());

static META_CHARSET_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)<meta\s+[^>]*?charset\s*=\s*["']?([^"'\s/>]+)"#).unwrap());

/// Decode the response body to UTF-8 and assemble the [`PageResponse`]
/// handed to the classifier and extractors. Regional news sites still serve
/// a mix of declared and undeclared legacy encodings, so detection walks
/// header, meta tag, then byte-level heuristics.
pub fn process_response(
    url_final: Url,
    status: StatusCode,
    headers: HeaderMap,
    body_bytes: Bytes,
    content_type: &str,
) -> Result<PageResponse, FetchError> {
    let encoding = detect_encoding(content_type, &body_bytes);
    let body_utf8 = decode_to_utf8(&body_bytes, encoding)?;

    Ok(PageResponse {
        url_final,
        status,
        headers,
        body_raw: body_bytes,
        body_utf8,
        charset: Charset::from_encoding(encoding),
        fetched_at: Utc::now(),
    })
}

fn detect_encoding(content_type: &str, body_bytes: &[u8]) -> &'static Encoding {
    // 1. Content-Type header charset
    if let Some(captures) = CHARSET_REGEX.captures(content_type)
        && let Some(charset_str) = captures.get(1)
        && let Some(encoding) = Encoding::for_label(charset_str.as_str().as_bytes())
    {
        return encoding;
    }

    // 2. <meta charset> within the first 4KB
    let search_bytes = &body_bytes[..body_bytes.len().min(4096)];
    let search_str = String::from_utf8_lossy(search_bytes);
    if let Some(captures) = META_CHARSET_REGEX.captures(&search_str)
        && let Some(charset_str) = captures.get(1)
        && let Some(encoding) = Encoding::for_label(charset_str.as_str().as_bytes())
    {
        return encoding;
    }

    // 3. Byte-level heuristic detection
    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(search_bytes, false);
    detector.guess(None, true)
}

fn decode_to_utf8(body_bytes: &[u8], encoding: &'static Encoding) -> Result<String, FetchError> {
    let (decoded, _encoding, had_errors) = encoding.decode(body_bytes);

    if had_errors {
        return Err(FetchError::Charset(format!(
            "failed to decode content as {}",
            encoding.name()
        )));
    }

    Ok(decoded.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_encoding_from_content_type() {
        let content_type = "text/html; charset=utf-8";
        let body = b"<html><head><title>Test</title></head></html>";

        let encoding = detect_encoding(content_type, body);
        assert_eq!(encoding, encoding_rs::UTF_8);
    }

    #[test]
    fn detect_encoding_from_meta_tag() {
        let content_type = "text/html";
        let body = b"<html><head><meta charset=\"iso-8859-1\"><title>Test</title></head></html>";

        // encoding_rs maps ISO-8859-1 to its windows-1252 superset
        let encoding = detect_encoding(content_type, body);
        assert_eq!(encoding, encoding_rs::WINDOWS_1252);
    }

    #[test]
    fn decode_utf8_body() {
        let body = "Devara Review — రివ్యూ".as_bytes();

        let decoded = decode_to_utf8(body, encoding_rs::UTF_8).unwrap();
        assert_eq!(decoded, "Devara Review — రివ్యూ");
    }

    #[test]
    fn process_response_produces_page() {
        let url = Url::parse("https://example.com/review").unwrap();
        let body = Bytes::from_static(b"<html><body>ok</body></html>");

        let page = process_response(
            url.clone(),
            StatusCode::OK,
            HeaderMap::new(),
            body,
            "text/html; charset=utf-8",
        )
        .unwrap();

        assert_eq!(page.url_final, url);
        assert_eq!(page.charset, Charset::Utf8);
        assert!(page.body_utf8.contains("ok"));
    }
}
