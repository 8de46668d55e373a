use crate::error::DecodeError;
use percent_encoding::percent_decode_str;

/// Decode a percent-encoded URI component.
///
/// Stricter than `percent_decode_str` alone: a `%` that is not followed by
/// two hex digits is an error instead of being passed through, and the
/// decoded bytes must form valid UTF-8. `+` is left as is.
///
/// ```
/// use lecturer_links_core::decode::decode_component;
///
/// assert_eq!(decode_component("%D0%98%D0%B2%D0%B0%D0%BD%D0%BE%D0%B2").unwrap(), "Иванов");
/// assert_eq!(decode_component("a%20b+c").unwrap(), "a b+c");
/// assert!(decode_component("%zz").is_err());
/// ```
pub fn decode_component(input: &str) -> Result<String, DecodeError> {
    validate_escapes(input)?;
    percent_decode_str(input)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .map_err(|_| DecodeError::InvalidUtf8)
}

fn validate_escapes(input: &str) -> Result<(), DecodeError> {
    let bytes = input.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let well_formed = bytes.len() > i + 2
                && bytes[i + 1].is_ascii_hexdigit()
                && bytes[i + 2].is_ascii_hexdigit();
            if !well_formed {
                return Err(DecodeError::InvalidEscape { offset: i });
            }
            i += 3;
        } else {
            i += 1;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_cyrillic() {
        assert_eq!(
            decode_component("Белоусов%20Александр%20Сергеевич").unwrap(),
            "Белоусов Александр Сергеевич"
        );
        assert_eq!(
            decode_component("%D0%9C%D1%83%D0%BD%D0%B6%D1%83%D0%BA%D0%BE%D0%B2%D0%B0").unwrap(),
            "Мунжукова"
        );
    }

    #[test]
    fn test_decode_passthrough() {
        assert_eq!(decode_component("").unwrap(), "");
        assert_eq!(decode_component("plain_text/").unwrap(), "plain_text/");
        assert_eq!(decode_component("%25").unwrap(), "%");
        assert_eq!(decode_component("%2f%2F").unwrap(), "//");
    }

    #[test]
    fn test_decode_invalid_escape() {
        assert_eq!(
            decode_component("%zz"),
            Err(DecodeError::InvalidEscape { offset: 0 })
        );
        assert_eq!(
            decode_component("abc%"),
            Err(DecodeError::InvalidEscape { offset: 3 })
        );
        assert_eq!(
            decode_component("%E0%A4%A"),
            Err(DecodeError::InvalidEscape { offset: 6 })
        );
    }

    #[test]
    fn test_decode_invalid_utf8() {
        assert_eq!(decode_component("%FF"), Err(DecodeError::InvalidUtf8));
        // Truncated two-byte sequence
        assert_eq!(decode_component("%D0"), Err(DecodeError::InvalidUtf8));
    }
}
