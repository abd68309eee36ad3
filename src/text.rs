//! JSON-style escape resolution for string spans.
//!
//! The token cursor hands out raw spans with escapes intact; everything that
//! needs the decoded form funnels through [`unescape_into`]. The unescaped
//! form is never longer than the escaped form, so a destination sized to the
//! source always fits.

/// Failure inside an escaped span. `offset` is relative to the span start so
/// the caller can rebase it onto the token's position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct EscapeError {
    pub offset: usize,
    pub message: &'static str,
}

/// Resolves escapes from `src` into `dst`, returning the number of bytes
/// written. `dst` must be at least `src.len()` bytes.
pub(crate) fn unescape_into(src: &[u8], dst: &mut [u8]) -> Result<usize, EscapeError> {
    debug_assert!(dst.len() >= src.len());

    let mut read = 0;
    let mut written = 0;

    while read < src.len() {
        let byte = src[read];
        if byte != b'\\' {
            dst[written] = byte;
            read += 1;
            written += 1;
            continue;
        }

        let escape_at = read;
        read += 1;
        let code = *src.get(read).ok_or(EscapeError {
            offset: escape_at,
            message: "dangling escape at end of string",
        })?;
        read += 1;

        let resolved = match code {
            b'"' => b'"',
            b'\\' => b'\\',
            b'/' => b'/',
            b'b' => 0x08,
            b'f' => 0x0c,
            b'n' => b'\n',
            b'r' => b'\r',
            b't' => b'\t',
            b'u' => {
                let unit = read_hex_unit(src, read, escape_at)?;
                read += 4;
                let ch = if (0xd800..0xdc00).contains(&unit) {
                    // High surrogate: a `\uXXXX` low surrogate must follow.
                    if src.get(read..read + 2) != Some(b"\\u") {
                        return Err(EscapeError {
                            offset: escape_at,
                            message: "unpaired surrogate escape",
                        });
                    }
                    let low = read_hex_unit(src, read + 2, escape_at)?;
                    read += 6;
                    combine_surrogates(unit, low).ok_or(EscapeError {
                        offset: escape_at,
                        message: "invalid surrogate pair escape",
                    })?
                } else {
                    char::from_u32(unit as u32).ok_or(EscapeError {
                        offset: escape_at,
                        message: "unpaired surrogate escape",
                    })?
                };
                written += ch.encode_utf8(&mut dst[written..]).len();
                continue;
            }
            _ => {
                return Err(EscapeError {
                    offset: escape_at,
                    message: "invalid escape sequence",
                })
            }
        };

        dst[written] = resolved;
        written += 1;
    }

    Ok(written)
}

/// Decodes a raw string-token span into owned text.
pub(crate) fn decode_string(src: &[u8]) -> Result<String, EscapeError> {
    let mut buf = vec![0u8; src.len()];
    let written = unescape_into(src, &mut buf)?;
    buf.truncate(written);
    String::from_utf8(buf).map_err(|err| EscapeError {
        offset: err.utf8_error().valid_up_to(),
        message: "string is not valid UTF-8",
    })
}

fn read_hex_unit(src: &[u8], at: usize, escape_at: usize) -> Result<u16, EscapeError> {
    let digits = src.get(at..at + 4).ok_or(EscapeError {
        offset: escape_at,
        message: "truncated \\u escape",
    })?;
    let mut unit = 0u16;
    for &digit in digits {
        let nibble = match digit {
            b'0'..=b'9' => digit - b'0',
            b'a'..=b'f' => digit - b'a' + 10,
            b'A'..=b'F' => digit - b'A' + 10,
            _ => {
                return Err(EscapeError {
                    offset: escape_at,
                    message: "non-hex digit in \\u escape",
                })
            }
        };
        unit = (unit << 4) | nibble as u16;
    }
    Ok(unit)
}

fn combine_surrogates(high: u16, low: u16) -> Option<char> {
    if !(0xdc00..0xe000).contains(&low) {
        return None;
    }
    let code = 0x10000 + (((high as u32 - 0xd800) << 10) | (low as u32 - 0xdc00));
    char::from_u32(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unescape(src: &[u8]) -> Result<Vec<u8>, EscapeError> {
        let mut buf = vec![0u8; src.len()];
        let written = unescape_into(src, &mut buf)?;
        buf.truncate(written);
        Ok(buf)
    }

    #[rstest::rstest]
    fn passthrough_without_escapes() {
        assert_eq!(unescape(b"{ hero { name } }").unwrap(), b"{ hero { name } }");
    }

    #[rstest::rstest]
    fn resolves_simple_escapes() {
        assert_eq!(unescape(br#"a\n\t\"\\\/b"#).unwrap(), b"a\n\t\"\\/b");
        assert_eq!(unescape(br"\b\f").unwrap(), &[0x08, 0x0c]);
    }

    #[rstest::rstest]
    fn never_grows() {
        let cases: [&[u8]; 4] = [b"plain", br"\n\n\n", b"\\u0041BC", b"\\ud83d\\ude00"];
        for src in cases {
            assert!(unescape(src).unwrap().len() <= src.len());
        }
    }

    #[rstest::rstest]
    fn resolves_unicode_escapes() {
        assert_eq!(decode_string(b"\\u0041").unwrap(), "A");
        assert_eq!(decode_string(b"caf\\u00e9").unwrap(), "caf\u{e9}");
        assert_eq!(decode_string(b"\\ud83d\\ude00").unwrap(), "\u{1f600}");
    }

    #[rstest::rstest]
    fn rejects_bad_escapes() {
        assert_eq!(unescape(br"\q").unwrap_err().message, "invalid escape sequence");
        assert_eq!(unescape(br"\u12").unwrap_err().message, "truncated \\u escape");
        assert_eq!(
            unescape(br"\uzzzz").unwrap_err().message,
            "non-hex digit in \\u escape"
        );
        assert_eq!(
            unescape(br"\ud800x").unwrap_err().message,
            "unpaired surrogate escape"
        );
        assert_eq!(
            unescape(br"\ud800\ud800").unwrap_err().message,
            "invalid surrogate pair escape"
        );
        let err = unescape(b"abc\\").unwrap_err();
        assert_eq!(err.offset, 3);
        assert_eq!(err.message, "dangling escape at end of string");
    }
}
