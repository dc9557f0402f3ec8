mod b64;
mod decode;
mod encode;

pub use decode::{decode_share_link, DecodeError, DecodeResult};
pub use encode::{encode_share_link, EncodeError, EncodeResult};

pub const SSR_SCHEME_PREFIX: &str = "ssr://";
/// Query key whose value travels as base64url text instead of plain text.
pub const REMARKS_KEY: &str = "remarks";
