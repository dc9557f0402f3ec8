use thiserror::Error;

use super::b64::encode_b64url_str;
use super::{REMARKS_KEY, SSR_SCHEME_PREFIX};
use crate::record::SsrRecord;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EncodeError {
    #[error(r#""{0}" contains a reserved delimiter"#)]
    ReservedDelimiter(&'static str),
    #[error(r#""{0}" is required, but is empty"#)]
    MissingField(&'static str),
}

pub type EncodeResult<T> = Result<T, EncodeError>;

fn ensure_positional(field: &'static str, value: &str) -> EncodeResult<()> {
    // `:` separates the positional fields and the decoder splits the payload
    // at the first `?`.
    if value.contains(&[':', '?'][..]) {
        return Err(EncodeError::ReservedDelimiter(field));
    }
    Ok(())
}

pub fn encode_share_link(record: &SsrRecord) -> EncodeResult<String> {
    ensure_positional("server", &record.server)?;
    ensure_positional("protocol", &record.protocol)?;
    ensure_positional("method", &record.method)?;
    ensure_positional("obfs", &record.obfs)?;
    if record.server.is_empty() {
        return Err(EncodeError::MissingField("server"));
    }
    if record.method.is_empty() {
        return Err(EncodeError::MissingField("method"));
    }

    let mut payload = format!(
        "{}:{}:{}:{}:{}:{}",
        record.server,
        record.port,
        record.protocol,
        record.method,
        record.obfs,
        encode_b64url_str(&record.password),
    );
    if !record.params.is_empty() {
        let mut query = url::form_urlencoded::Serializer::new(String::new());
        for (key, value) in &record.params {
            if key == REMARKS_KEY {
                query.append_pair(key, &encode_b64url_str(value));
            } else {
                query.append_pair(key, value);
            }
        }
        payload.push_str("/?");
        payload.push_str(&query.finish());
    }

    Ok(format!("{}{}", SSR_SCHEME_PREFIX, encode_b64url_str(&payload)))
}
