use bytes::Bytes;
use chrono::{DateTime, Utc};
use reqwest::{StatusCode, header::HeaderMap};
use serde::{Deserialize, Serialize};
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Charset {
    Utf8,
    Windows1252,
    ShiftJis,
    Gbk,
    Big5,
    Other(String),
}

impl Charset {
    pub fn from_encoding(encoding: &'static encoding_rs::Encoding) -> Self {
        use std::ptr;

        if ptr::eq(encoding as *const _, encoding_rs::UTF_8 as *const _) {
            Self::Utf8
        } else if ptr::eq(encoding as *const _, encoding_rs::WINDOWS_1252 as *const _) {
            Self::Windows1252
        } else if ptr::eq(encoding as *const _, encoding_rs::SHIFT_JIS as *const _) {
            Self::ShiftJis
        } else if ptr::eq(encoding as *const _, encoding_rs::GBK as *const _)
            || ptr::eq(encoding as *const _, encoding_rs::GB18030 as *const _)
        {
            Self::Gbk
        } else if ptr::eq(encoding as *const _, encoding_rs::BIG5 as *const _) {
            Self::Big5
        } else {
            Self::Other(encoding.name().to_ascii_lowercase())
        }
    }
}

/// A fetched reference page, decoded to UTF-8.
#[derive(Debug)]
pub struct PageResponse {
    pub url_final: Url,
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body_raw: Bytes,
    pub body_utf8: String,
    pub charset: Charset,
    pub fetched_at: DateTime<Utc>,
}
