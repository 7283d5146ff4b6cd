//! Template name checks.
use std::borrow::Cow;

/// Checks that a template name can't climb out of the template root,
/// returning it with a leading `/` removed, or `None` when it's rejected.
///
/// The name is rejected when it contains a `..` path step, also when the
/// dots hide behind percent encoding. Only `%2e`, `%2f` and `%5c` (and
/// their upper case forms) are decoded for the check, so a name that is
/// merely unusual, like `lib/foo..bar`, stays accepted.
pub fn safe_template_name(name: &str) -> Option<&str> {
    let decoded = decode_suspicious(name);
    if decoded.split(['/', '\\']).any(|step| step == "..") {
        return None;
    }
    Some(name.strip_prefix('/').unwrap_or(name))
}

fn decode_suspicious(name: &str) -> Cow<'_, str> {
    if !name.contains('%') {
        return Cow::Borrowed(name);
    }
    let mut out = String::with_capacity(name.len());
    let mut rest = name;
    while let Some(pos) = rest.find('%') {
        out.push_str(&rest[..pos]);
        let decoded = match rest.as_bytes().get(pos + 1..pos + 3) {
            Some(&[b'2', b'e' | b'E']) => Some('.'),
            Some(&[b'2', b'f' | b'F']) => Some('/'),
            Some(&[b'5', b'c' | b'C']) => Some('\\'),
            _ => None,
        };
        match decoded {
            Some(c) => {
                out.push(c);
                rest = &rest[pos + 3..];
            }
            None => {
                out.push('%');
                rest = &rest[pos + 1..];
            }
        }
    }
    out.push_str(rest);
    Cow::Owned(out)
}

/// Backslash-escapes the characters that are valid inside an identifier
/// but also operators: `-`, `.` and `:`.
pub fn escape_identifier(name: &str) -> Cow<'_, str> {
    let extra = name
        .bytes()
        .filter(|b| matches!(b, b'-' | b'.' | b':'))
        .count();
    if extra == 0 {
        return Cow::Borrowed(name);
    }
    let mut out = String::with_capacity(name.len() + extra);
    for c in name.chars() {
        if matches!(c, '-' | '.' | ':') {
            out.push('\\');
        }
        out.push(c);
    }
    Cow::Owned(out)
}
