use base64::alphabet::URL_SAFE;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;

use super::decode::{DecodeError, DecodeResult};

/// URL-safe alphabet. Output carries no padding; input must be padded to a
/// multiple of 4 by [`repad`] first.
pub static BASE64URL_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_allow_trailing_bits(true)
        .with_decode_padding_mode(DecodePaddingMode::RequireCanonical),
);

/// Pad base64url text with exactly `(4 - len % 4) % 4` `=` characters.
/// A length of 1 mod 4 cannot come from any byte sequence and is rejected.
pub(super) fn repad(text: &str) -> DecodeResult<String> {
    let pad = match text.len() % 4 {
        0 => 0,
        1 => return Err(DecodeError::InvalidEncoding),
        rem => 4 - rem,
    };
    let mut padded = String::with_capacity(text.len() + pad);
    padded.push_str(text);
    padded.extend(std::iter::repeat('=').take(pad));
    Ok(padded)
}

pub(super) fn decode_b64url_str(text: &str) -> DecodeResult<String> {
    let bytes = BASE64URL_ENGINE
        .decode(repad(text)?)
        .map_err(|_| DecodeError::InvalidEncoding)?;
    String::from_utf8(bytes).map_err(|_| DecodeError::InvalidEncoding)
}

pub(super) fn encode_b64url_str(text: &str) -> String {
    BASE64URL_ENGINE.encode(text.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repad() {
        let cases = [
            ("", ""),
            ("YQ", "YQ=="),
            ("YWI", "YWI="),
            ("YWJj", "YWJj"),
            ("YWJjZA", "YWJjZA=="),
        ];
        for (input, expected) in cases {
            assert_eq!(repad(input).unwrap(), expected, "{input}");
        }
    }

    #[test]
    fn test_repad_invalid_length() {
        for input in ["Y", "YWJjZ"] {
            assert_eq!(repad(input), Err(DecodeError::InvalidEncoding), "{input}");
        }
    }

    #[test]
    fn test_decode_b64url_str_padding() {
        let cases = [("", ""), ("YQ", "a"), ("YWI", "ab"), ("YWJj", "abc"), ("YQ==", "a")];
        for (input, expected) in cases {
            assert_eq!(decode_b64url_str(input).unwrap(), expected, "{input}");
        }
    }

    #[test]
    fn test_decode_b64url_str_url_safe_alphabet() {
        // 0xfb 0xff encodes to "-_8" in the URL-safe alphabet, which is not UTF-8.
        assert_eq!(
            decode_b64url_str("-_8"),
            Err(DecodeError::InvalidEncoding)
        );
        assert_eq!(decode_b64url_str("Pz8_"), Ok("???".into()));
        assert_eq!(decode_b64url_str("Pz8/"), Err(DecodeError::InvalidEncoding));
        assert_eq!(decode_b64url_str("Pz8+"), Err(DecodeError::InvalidEncoding));
    }

    #[test]
    fn test_decode_b64url_str_invalid_utf8() {
        assert_eq!(decode_b64url_str("_w"), Err(DecodeError::InvalidEncoding));
    }

    #[test]
    fn test_encode_b64url_str_no_padding() {
        assert_eq!(encode_b64url_str("a"), "YQ");
        assert_eq!(encode_b64url_str("???"), "Pz8_");
        assert_eq!(encode_b64url_str(""), "");
    }
}
