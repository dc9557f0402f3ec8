pub mod record;
pub mod share_link;
pub mod subconverter;

pub use record::SsrRecord;
pub use share_link::{decode_share_link, encode_share_link};
