//! Markup and literal escaping.
//!
//! Every escaper scans the input once and returns it borrowed when there is
//! nothing to escape. Otherwise a single output buffer is allocated, sized
//! by the expansion found during the scan.
use std::borrow::Cow;
use std::fmt;

const LT: &str = "&lt;";
const GT: &str = "&gt;";
const AMP: &str = "&amp;";
const QUOT: &str = "&quot;";
const HTML_APOS: &str = "&#39;";
const XML_APOS: &str = "&apos;";

/// XML encoding, replacing `<`, `>`, `&`, `"` and `'`.
pub fn xml(s: &str) -> Cow<'_, str> {
    xml_or_html(s, true, true, Some(XML_APOS))
}

/// XHTML encoding.
///
/// Same as [`xml`], except apostrophes become `&#39;`, which legacy user
/// agents decode where they would not decode `&apos;`.
pub fn xhtml(s: &str) -> Cow<'_, str> {
    xml_or_html(s, true, true, Some(HTML_APOS))
}

/// HTML encoding; like [`xml`] but apostrophes are left alone.
pub fn html(s: &str) -> Cow<'_, str> {
    xml_or_html(s, true, true, None)
}

/// Encoding for attribute values quoted with `"` (not with `'`).
pub fn xml_attr(s: &str) -> Cow<'_, str> {
    xml_or_html(s, false, true, None)
}

/// Minimal XML encoding: only `<`, `&`, and the `>` of a possible `]]>`.
pub fn xml_minimal(s: &str) -> Cow<'_, str> {
    xml_or_html(s, false, false, None)
}

/// Streaming [`xml`].
pub fn xml_to(s: &str, out: &mut dyn fmt::Write) -> fmt::Result {
    xml_or_html_to(s, XML_APOS, out)
}

/// Streaming [`xhtml`].
pub fn xhtml_to(s: &str, out: &mut dyn fmt::Write) -> fmt::Result {
    xml_or_html_to(s, HTML_APOS, out)
}

fn xml_or_html<'a>(
    s: &'a str,
    esc_gt: bool,
    esc_quot: bool,
    apos: Option<&'static str>,
) -> Cow<'a, str> {
    let bytes = s.as_bytes();

    // First find out if we need to escape at all, and by how much the
    // output grows.
    let mut extra = 0;
    for (i, b) in bytes.iter().enumerate() {
        extra += match b {
            b'<' => LT.len() - 1,
            b'>' if esc_gt || maybe_cdata_end_gt(bytes, i) => GT.len() - 1,
            b'&' => AMP.len() - 1,
            b'"' if esc_quot => QUOT.len() - 1,
            b'\'' => match apos {
                Some(apos) => apos.len() - 1,
                None => continue,
            },
            _ => continue,
        };
    }
    if extra == 0 {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len() + extra);
    let mut flushed = 0;
    for (i, b) in bytes.iter().enumerate() {
        let rep = match b {
            b'<' => LT,
            b'>' if esc_gt || maybe_cdata_end_gt(bytes, i) => GT,
            b'&' => AMP,
            b'"' if esc_quot => QUOT,
            b'\'' => match apos {
                Some(apos) => apos,
                None => continue,
            },
            _ => continue,
        };
        out.push_str(&s[flushed..i]);
        out.push_str(rep);
        flushed = i + 1;
    }
    out.push_str(&s[flushed..]);
    Cow::Owned(out)
}

/// `>` at index `i` may close a `]]>`, in which case it must always be
/// escaped, even by the escapers that otherwise keep `>`.
fn maybe_cdata_end_gt(bytes: &[u8], i: usize) -> bool {
    if i == 0 {
        return true;
    }
    if bytes[i - 1] != b']' {
        return false;
    }
    i == 1 || bytes[i - 2] == b']'
}

fn xml_or_html_to(s: &str, apos: &'static str, out: &mut dyn fmt::Write) -> fmt::Result {
    let mut flushed = 0;
    for (i, b) in s.bytes().enumerate() {
        let rep = match b {
            b'<' => LT,
            b'>' => GT,
            b'&' => AMP,
            b'"' => QUOT,
            b'\'' => apos,
            _ => continue,
        };
        if flushed != i {
            out.write_str(&s[flushed..i])?;
        }
        out.write_str(rep)?;
        flushed = i + 1;
    }
    if flushed < s.len() {
        out.write_str(&s[flushed..])?;
    }
    Ok(())
}

/// Rich Text Format encoding; escapes `\`, `{` and `}`.
///
/// Line breaks are not replaced.
pub fn rtf(s: &str) -> Cow<'_, str> {
    let extra = s.bytes().filter(|b| matches!(b, b'{' | b'}' | b'\\')).count();
    if extra == 0 {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len() + extra);
    let mut flushed = 0;
    for (i, b) in s.bytes().enumerate() {
        if matches!(b, b'{' | b'}' | b'\\') {
            out.push_str(&s[flushed..i]);
            out.push('\\');
            flushed = i;
        }
    }
    out.push_str(&s[flushed..]);
    Cow::Owned(out)
}

/// Streaming [`rtf`].
pub fn rtf_to(s: &str, out: &mut dyn fmt::Write) -> fmt::Result {
    let mut flushed = 0;
    for (i, b) in s.bytes().enumerate() {
        if matches!(b, b'{' | b'}' | b'\\') {
            if flushed != i {
                out.write_str(&s[flushed..i])?;
            }
            out.write_char('\\')?;
            // not i + 1, the escaped character itself flushes later
            flushed = i;
        }
    }
    if flushed < s.len() {
        out.write_str(&s[flushed..])?;
    }
    Ok(())
}

/// URL encoding (`like%20this`) for query parameter values, path
/// *segments* and fragments; escapes every character that is reserved
/// anywhere. Bytes are the UTF-8 encoding of the input.
pub fn url(s: &str) -> Cow<'_, str> {
    url_enc(s, false)
}

/// Like [`url`], but keeps `/` unescaped, for encoding whole paths.
pub fn url_path(s: &str) -> Cow<'_, str> {
    url_enc(s, true)
}

fn url_enc(s: &str, keep_slash: bool) -> Cow<'_, str> {
    if s.bytes().all(|b| safe_in_url(b, keep_slash)) {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len() + s.len() / 3 + 2);
    for b in s.bytes() {
        if safe_in_url(b, keep_slash) {
            out.push(b as char);
        } else {
            out.push('%');
            out.push(hex_digit((b >> 4) & 0xF));
            out.push(hex_digit(b & 0xF));
        }
    }
    Cow::Owned(out)
}

fn safe_in_url(b: u8, keep_slash: bool) -> bool {
    b.is_ascii_alphanumeric()
        || matches!(b, b'_' | b'-' | b'.' | b'!' | b'~')
        || (b'\''..=b'*').contains(&b)
        || (keep_slash && b == b'/')
}

/// JavaScript string literal escaping; see [`js_or_json_string`].
pub fn js_string(s: &str) -> Cow<'_, str> {
    js_or_json_string(s, false)
}

/// JSON string literal escaping; see [`js_or_json_string`].
///
/// Unlike [`js_string`] this never escapes `'`, as JSON has no such
/// escape, and the literal must be quoted with `"`.
pub fn json_string(s: &str) -> Cow<'_, str> {
    js_or_json_string(s, true)
}

enum JsEsc {
    Named(char),
    Hexa,
    Backslash,
}

/// Escapes a string to be safely insertable into a JavaScript or JSON
/// string literal. The result is not quoted.
///
/// Besides the literal-closing characters, this guards against sequences
/// that are special to a surrounding HTML `script` block: `/` is escaped
/// after `<`, `>` after `]]` or `--`, and `<` before `!` or `?`. Those
/// characters are left alone elsewhere, so escaping stays minimal.
pub fn js_or_json_string(s: &str, json: bool) -> Cow<'_, str> {
    let bytes = s.as_bytes();
    let ln = s.len();
    let mut out: Option<String> = None;

    for (i, c) in s.char_indices() {
        let u = c as u32;
        // skip the common characters fast
        if (c > '>' && u < 0x7F && c != '\\') || c == ' ' || (0xA0..0x2028).contains(&u) || u > 0x2029
        {
            if let Some(out) = out.as_mut() {
                out.push(c);
            }
            continue;
        }

        let esc = if u <= 0x1F {
            match c {
                '\n' => JsEsc::Named('n'),
                '\r' => JsEsc::Named('r'),
                '\x0C' => JsEsc::Named('f'),
                '\x08' => JsEsc::Named('b'),
                '\t' => JsEsc::Named('t'),
                _ => JsEsc::Hexa,
            }
        } else if c == '"' || c == '\\' || (c == '\'' && !json) {
            JsEsc::Backslash
        } else if c == '/' && (i == 0 || bytes[i - 1] == b'<') {
            // against closing elements
            JsEsc::Backslash
        } else if c == '>' {
            // against "]]>" and "-->"
            let dangerous = match i {
                0 => true,
                1 => matches!(bytes[0], b']' | b'-'),
                _ => matches!(bytes[i - 1], b']' | b'-') && bytes[i - 2] == bytes[i - 1],
            };
            if !dangerous {
                if let Some(out) = out.as_mut() {
                    out.push(c);
                }
                continue;
            }
            if json { JsEsc::Hexa } else { JsEsc::Backslash }
        } else if c == '<' {
            // against "<!" and "<?"
            let dangerous = i + 1 >= ln || matches!(bytes[i + 1], b'!' | b'?');
            if !dangerous {
                if let Some(out) = out.as_mut() {
                    out.push(c);
                }
                continue;
            }
            JsEsc::Hexa
        } else if (0x7F..=0x9F).contains(&u) || u == 0x2028 || u == 0x2029 {
            JsEsc::Hexa
        } else {
            if let Some(out) = out.as_mut() {
                out.push(c);
            }
            continue;
        };

        let out = out.get_or_insert_with(|| {
            let mut buf = String::with_capacity(ln + 6);
            buf.push_str(&s[..i]);
            buf
        });
        out.push('\\');
        match esc {
            JsEsc::Named(name) => out.push(name),
            JsEsc::Backslash => out.push(c),
            JsEsc::Hexa => {
                if !json && u < 0x100 {
                    out.push('x');
                    out.push(hex_digit((u >> 4) as u8 & 0xF));
                    out.push(hex_digit(u as u8 & 0xF));
                } else {
                    out.push('u');
                    out.push(hex_digit((u >> 12) as u8 & 0xF));
                    out.push(hex_digit((u >> 8) as u8 & 0xF));
                    out.push(hex_digit((u >> 4) as u8 & 0xF));
                    out.push(hex_digit(u as u8 & 0xF));
                }
            }
        }
    }

    match out {
        Some(out) => Cow::Owned(out),
        None => Cow::Borrowed(s),
    }
}

fn hex_digit(d: u8) -> char {
    (if d < 10 { d + b'0' } else { d - 10 + b'A' }) as char
}

/// Template string literal encoding, the inverse of
/// [`unescape_string_literal`].
pub fn string_literal(s: &str) -> Cow<'_, str> {
    let mut out: Option<String> = None;
    for (i, c) in s.char_indices() {
        let rep = match c {
            '\\' => "\\\\",
            '"' => "\\\"",
            '\'' => "\\'",
            '\n' => "\\n",
            '\r' => "\\r",
            '\t' => "\\t",
            '\x08' => "\\b",
            '\x0C' => "\\f",
            '<' => "\\l",
            '>' => "\\g",
            '&' => "\\a",
            '$' => "\\$",
            c if (c as u32) < 0x20 => {
                let out = out.get_or_insert_with(|| {
                    let mut buf = String::with_capacity(s.len() + 4);
                    buf.push_str(&s[..i]);
                    buf
                });
                // hex escape, zero padded to 4 digits so that a following
                // literal hex digit can't extend the escape
                out.push_str("\\x00");
                out.push(hex_digit((c as u8 >> 4) & 0xF));
                out.push(hex_digit(c as u8 & 0xF));
                continue;
            }
            c => {
                if let Some(out) = out.as_mut() {
                    out.push(c);
                }
                continue;
            }
        };
        let out = out.get_or_insert_with(|| {
            let mut buf = String::with_capacity(s.len() + 3);
            buf.push_str(&s[..i]);
            buf
        });
        out.push_str(rep);
    }
    match out {
        Some(out) => Cow::Owned(out),
        None => Cow::Borrowed(s),
    }
}

/// An invalid escape sequence found by [`unescape_string_literal`].
#[derive(Debug, PartialEq, Eq)]
pub enum EscapeError {
    /// The last character of the literal is a lone backslash.
    TrailingBackslash,
    /// A `\x` escape without any hexadecimal digit.
    InvalidHex,
    /// `\` followed by a character that doesn't form an escape.
    InvalidEscape(char),
}

impl std::error::Error for EscapeError {}

impl fmt::Display for EscapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EscapeError::TrailingBackslash => {
                f.write_str("The last character of the string literal is backslash")
            }
            EscapeError::InvalidHex => {
                f.write_str("Invalid \\x escape in the string literal")
            }
            EscapeError::InvalidEscape(c) => {
                write!(f, "Invalid escape sequence (\\{c}) in the string literal")
            }
        }
    }
}

/// Template string literal decoding, for the literal *without* its
/// surrounding quotation marks.
///
/// `\\`, `\"`, `\'`, `\n`, `\t`, `\r`, `\b` and `\f` follow the usual
/// rules; additionally `\g`, `\l`, `\a`, `\$` and `\{` decode to `>`,
/// `<`, `&`, `$` and `{`. `\x` starts a hexadecimal character code of at
/// most 4 digits.
pub fn unescape_string_literal(s: &str) -> Result<Cow<'_, str>, EscapeError> {
    let Some(mut idx) = s.find('\\') else {
        return Ok(Cow::Borrowed(s));
    };

    let bytes = s.as_bytes();
    let mut out = String::with_capacity(s.len() - 1);
    let mut flushed = 0;
    loop {
        out.push_str(&s[flushed..idx]);
        if idx + 1 >= s.len() {
            return Err(EscapeError::TrailingBackslash);
        }
        match bytes[idx + 1] {
            b'"' => out.push('"'),
            b'\'' => out.push('\''),
            b'\\' => out.push('\\'),
            b'n' => out.push('\n'),
            b'r' => out.push('\r'),
            b't' => out.push('\t'),
            b'f' => out.push('\x0C'),
            b'b' => out.push('\x08'),
            b'g' => out.push('>'),
            b'l' => out.push('<'),
            b'a' => out.push('&'),
            b'$' => out.push('$'),
            b'{' => out.push('{'),
            b'x' => {
                let start = idx + 2;
                let mut end = start;
                let mut code = 0u32;
                while end < s.len() && end < start + 4 {
                    let digit = match bytes[end] {
                        b @ b'0'..=b'9' => b - b'0',
                        b @ b'a'..=b'f' => b - b'a' + 10,
                        b @ b'A'..=b'F' => b - b'A' + 10,
                        _ => break,
                    };
                    code = (code << 4) + digit as u32;
                    end += 1;
                }
                if end == start {
                    return Err(EscapeError::InvalidHex);
                }
                // codes are interpreted in the UCS basic plane
                match char::from_u32(code) {
                    Some(c) => out.push(c),
                    None => return Err(EscapeError::InvalidHex),
                }
                flushed = end;
                match s[flushed..].find('\\') {
                    Some(rel) => {
                        idx = flushed + rel;
                        continue;
                    }
                    None => break,
                }
            }
            b => {
                // the byte after a backslash is a full character unless the
                // input holds multi-byte garbage, which first_char recovers
                let c = s[idx + 1..].chars().next().unwrap_or(b as char);
                return Err(EscapeError::InvalidEscape(c));
            }
        }
        flushed = idx + 2;
        match s[flushed..].find('\\') {
            Some(rel) => idx = flushed + rel,
            None => break,
        }
    }
    out.push_str(&s[flushed..]);
    Ok(Cow::Owned(out))
}

/// Quotes a string as a double-quoted literal for diagnostics.
///
/// Control characters are escaped so the result stays printable on one
/// line.
pub fn tquote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 4);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\x08' => out.push_str("\\b"),
            '\x0C' => out.push_str("\\f"),
            c if (c as u32) < 0x20 => {
                out.push_str("\\u00");
                out.push(hex_digit((c as u8 >> 4) & 0xF));
                out.push(hex_digit(c as u8 & 0xF));
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod test {
    use super::*;
    use std::borrow::Cow;

    #[test]
    fn xml_basic() {
        assert_eq!(xml("a<b>&'\"c"), "a&lt;b&gt;&amp;&apos;&quot;c");
        assert_eq!(xhtml("it's"), "it&#39;s");
        assert_eq!(html("it's <b>"), "it's &lt;b&gt;");
        assert!(matches!(xml("nothing here"), Cow::Borrowed(_)));
        assert_eq!(xml(""), "");
    }

    #[test]
    fn cdata_end_guard() {
        // xml_minimal keeps ">" except when it may close a "]]>"
        assert_eq!(xml_minimal("a > b"), "a > b");
        assert_eq!(xml_minimal("a]]>b"), "a]]&gt;b");
        assert_eq!(xml_minimal(">"), "&gt;");
        assert_eq!(xml_minimal("]>"), "]&gt;");
        assert_eq!(xml_minimal("x]>"), "x]>");
    }

    #[test]
    fn xml_attr_variant() {
        assert_eq!(xml_attr("a\"b'c>d"), "a&quot;b'c>d");
    }

    #[test]
    fn xml_streaming_matches() {
        let mut out = String::new();
        xml_to("a<b>&'\"c", &mut out).unwrap();
        assert_eq!(out, xml("a<b>&'\"c"));
    }

    #[test]
    fn rtf_basic() {
        assert_eq!(rtf("a{b}c\\d"), "a\\{b\\}c\\\\d");
        assert!(matches!(rtf("plain"), Cow::Borrowed(_)));
        let mut out = String::new();
        rtf_to("a{b}c\\d", &mut out).unwrap();
        assert_eq!(out, "a\\{b\\}c\\\\d");
    }

    #[test]
    fn url_basic() {
        assert_eq!(url("a/b c"), "a%2Fb%20c");
        assert_eq!(url_path("a/b c"), "a/b%20c");
        assert_eq!(url("Ä"), "%C3%84");
        assert!(matches!(url("safe-chars_only.~"), Cow::Borrowed(_)));
    }

    #[test]
    fn js_string_basic() {
        assert_eq!(js_string("a\"b'c\\d"), "a\\\"b\\'c\\\\d");
        assert_eq!(json_string("a'b"), "a'b");
        assert_eq!(js_string("\n\r\t"), "\\n\\r\\t");
        assert_eq!(js_string("\x01"), "\\x01");
        assert_eq!(json_string("\x01"), "\\u0001");
        assert_eq!(js_string("\u{2028}"), "\\u2028");
    }

    #[test]
    fn js_string_script_block_guards() {
        // "/" only after "<"
        assert_eq!(js_string("</x"), "<\\/x");
        assert_eq!(js_string("a/b"), "a/b");
        // ">" only after "]]" or "--"
        assert_eq!(js_string("]]>"), "]]\\>");
        assert_eq!(json_string("-->"), "--\\u003E");
        assert_eq!(js_string("a>b"), "a>b");
        // "<" only before "!" or "?", or at the end
        assert_eq!(js_string("<!--"), "\\x3C!--");
        assert_eq!(json_string("<!--"), "\\u003C!--");
        assert_eq!(js_string("a<b"), "a<b");
        assert_eq!(js_string("a<"), "a\\x3C");
    }

    #[test]
    fn string_literal_round_trip() {
        let cases = [
            "plain",
            "with \"quotes\" and 'apos'",
            "back\\slash",
            "ctl\x01\x02\x1f",
            "line\nbreaks\r\tand tabs",
            "<markup> & ${interpolation}",
            "",
        ];
        for s in cases {
            let escaped = string_literal(s);
            assert_eq!(unescape_string_literal(&escaped).unwrap(), s, "case {s:?}");
        }
    }

    #[test]
    fn string_literal_hex_padding() {
        // the escape is padded so a following hex digit can't extend it
        assert_eq!(string_literal("\x01f"), "\\x0001f");
        assert_eq!(unescape_string_literal("\\x0001f").unwrap(), "\x01f");
        assert_eq!(unescape_string_literal("f\\x6Fo").unwrap(), "foo");
        assert_eq!(unescape_string_literal("f\\x006F123").unwrap(), "fo123");
    }

    #[test]
    fn string_literal_invalid_escapes() {
        assert_eq!(
            unescape_string_literal("oops\\"),
            Err(EscapeError::TrailingBackslash),
        );
        assert_eq!(
            unescape_string_literal("\\q"),
            Err(EscapeError::InvalidEscape('q')),
        );
        assert_eq!(unescape_string_literal("\\xzz"), Err(EscapeError::InvalidHex));
    }

    #[test]
    fn tquote_basic() {
        assert_eq!(tquote("a\"b"), "\"a\\\"b\"");
        assert_eq!(tquote("\x01"), "\"\\u0001\"");
    }
}
