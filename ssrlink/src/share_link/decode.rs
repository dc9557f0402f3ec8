use std::collections::BTreeMap;

use percent_encoding::percent_decode_str;
use thiserror::Error;

use super::b64::decode_b64url_str;
use super::{REMARKS_KEY, SSR_SCHEME_PREFIX};
use crate::record::SsrRecord;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("unknown URL scheme")]
    UnknownScheme,
    #[error("invalid UTF-8 or Base64 encoding")]
    InvalidEncoding,
    #[error("link does not match server:port:protocol:method:obfs:password")]
    InvalidFormat,
}

pub type DecodeResult<T> = Result<T, DecodeError>;

pub fn decode_share_link(link: &str) -> DecodeResult<SsrRecord> {
    let b64 = link
        .trim()
        .strip_prefix(SSR_SCHEME_PREFIX)
        .ok_or(DecodeError::UnknownScheme)?;
    let payload = decode_b64url_str(b64)?;

    let (body, query) = match payload.split_once('?') {
        Some((body, query)) => (body, Some(query)),
        None => (&*payload, None),
    };
    let mut record = decode_body(body)?;
    if let Some(query) = query {
        record.params = decode_query(query)?;
    }
    Ok(record)
}

fn decode_body(body: &str) -> DecodeResult<SsrRecord> {
    let mut fields = body.splitn(6, ':');
    let mut next_field = || fields.next().ok_or(DecodeError::InvalidFormat);

    let server = next_field()?;
    let port = next_field()?;
    let protocol = next_field()?;
    let method = next_field()?;
    let obfs = next_field()?;
    let password = next_field()?;
    // `/` only ever appears as the first half of the `/?` query separator.
    let password = password.strip_suffix('/').unwrap_or(password);

    if server.is_empty() || method.is_empty() {
        return Err(DecodeError::InvalidFormat);
    }
    Ok(SsrRecord {
        server: server.into(),
        port: parse_port(port)?,
        protocol: protocol.into(),
        method: method.into(),
        obfs: obfs.into(),
        password: decode_b64url_str(password)?,
        params: BTreeMap::new(),
    })
}

fn parse_port(port: &str) -> DecodeResult<u16> {
    // `u16::from_str` accepts a leading `+`, which is not part of the grammar.
    if port.is_empty() || !port.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DecodeError::InvalidFormat);
    }
    port.parse().map_err(|_| DecodeError::InvalidFormat)
}

/// Form-urlencoded, but escapes that do not form valid UTF-8 are rejected
/// instead of being replaced.
fn decode_query(query: &str) -> DecodeResult<BTreeMap<String, String>> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| -> DecodeResult<(String, String)> {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            let key = decode_query_component(key)?;
            let value = decode_query_component(value)?;
            let value = if key == REMARKS_KEY {
                decode_b64url_str(&value)?
            } else {
                value
            };
            Ok((key, value))
        })
        .collect()
}

fn decode_query_component(s: &str) -> DecodeResult<String> {
    percent_decode_str(&s.replace('+', " "))
        .decode_utf8()
        .map(|s| s.into_owned())
        .map_err(|_| DecodeError::InvalidEncoding)
}
