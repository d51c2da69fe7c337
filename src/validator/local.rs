/// Strict rules: ASCII atext plus '.', never leading, trailing or doubled.
pub(crate) fn is_local_strict(s: &str) -> bool {
    if s.is_empty() || s.starts_with('.') || s.ends_with('.') || s.contains("..") {
        return false;
    }
    s.chars().all(|c| {
        c.is_ascii_alphanumeric()
            || matches!(
                c,
                '!' | '#'
                    | '$'
                    | '%'
                    | '&'
                    | '\''
                    | '*'
                    | '+'
                    | '-'
                    | '/'
                    | '='
                    | '?'
                    | '^'
                    | '_'
                    | '`'
                    | '{'
                    | '|'
                    | '}'
                    | '~'
                    | '.'
            )
    })
}

/// Relaxed rules: a simple quoted-string is accepted as is,
/// anything else falls back to [`is_local_strict`].
pub(crate) fn is_local_relaxed(s: &str) -> bool {
    is_quoted(s) || is_local_strict(s)
}

/// A quoted-string whose content is only qtext (printable ASCII other
/// than `"` and `\`, plus space) or quoted-pairs (`\` + printable).
/// Control characters are never allowed, escaped or not.
pub(crate) fn is_quoted(s: &str) -> bool {
    let Some(inner) = s
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
    else {
        return false;
    };
    let mut bytes = inner.bytes();
    while let Some(b) = bytes.next() {
        match b {
            b'\\' => match bytes.next() {
                Some(escaped) if is_printable(escaped) => {}
                _ => return false,
            },
            b'"' => return false,
            b if is_printable(b) => {}
            _ => return false,
        }
    }
    true
}

fn is_printable(b: u8) -> bool {
    matches!(b, b' '..=b'~')
}
