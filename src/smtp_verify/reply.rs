use std::io::{BufRead, Read};
use std::sync::OnceLock;

use regex::Regex;

use crate::smtp_verify::types::{SmtpReply, StatusCode};

/// Upper bound on the bytes gathered for a single reply.
const MAX_REPLY_LEN: usize = 64 * 1024;

fn status_line() -> &'static Regex {
    static STATUS_LINE: OnceLock<Regex> = OnceLock::new();
    STATUS_LINE.get_or_init(|| {
        Regex::new(r"(?ims)^([0-9]{3}) (.*)$").expect("status line pattern compiles")
    })
}

/// Extracts the status code of the first `NNN <text>` line in `raw`.
///
/// Continuation lines (`NNN-text`) never match, so a multi-line reply
/// yields the code of its final line.
pub fn parse_status_code(raw: &str) -> Option<StatusCode> {
    let captures = status_line().captures(raw)?;
    let digits = captures.get(1)?.as_str();
    digits.parse::<u16>().ok().and_then(StatusCode::new)
}

/// `NNN ` ends a reply. A bare `NNN` cannot be continued either, so reading
/// stops there too, although it carries no parseable code.
fn is_final_line(line: &[u8]) -> bool {
    let trimmed = line.strip_suffix(b"\n").unwrap_or(line);
    let trimmed = trimmed.strip_suffix(b"\r").unwrap_or(trimmed);
    if trimmed.len() < 3 || !trimmed[..3].iter().all(u8::is_ascii_digit) {
        return false;
    }
    matches!(trimmed.get(3), None | Some(b' '))
}

/// Reads one (possibly multi-line) reply.
///
/// Stops at the final line, at end of stream, or on the first read error
/// (typically the per-read timeout). Whatever was gathered is then parsed;
/// an empty or malformed reply has no code.
pub(crate) fn read_reply<R: BufRead>(reader: &mut R) -> SmtpReply {
    let mut raw = Vec::new();
    loop {
        let remaining = MAX_REPLY_LEN.saturating_sub(raw.len());
        if remaining == 0 {
            break;
        }
        let mut line = Vec::new();
        let result = reader
            .by_ref()
            .take(remaining as u64)
            .read_until(b'\n', &mut line);
        raw.extend_from_slice(&line);
        match result {
            Ok(0) => break,
            Ok(_) if is_final_line(&line) || !line.ends_with(b"\n") => break,
            Ok(_) => {}
            Err(_err) => {
                #[cfg(feature = "with-tracing")]
                tracing::debug!(error = %_err, "reply read interrupted");
                break;
            }
        }
    }
    let raw = String::from_utf8_lossy(&raw).into_owned();
    SmtpReply {
        code: parse_status_code(&raw),
        raw,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, BufReader, Cursor};

    fn code(value: u16) -> Option<StatusCode> {
        StatusCode::new(value)
    }

    #[test]
    fn single_line_reply() {
        assert_eq!(parse_status_code("220 mx.example.com ESMTP\r\n"), code(220));
    }

    #[test]
    fn continuation_lines_are_skipped() {
        assert_eq!(
            parse_status_code("250-Recipient\r\n250 2.1.5 Ok\r\n"),
            code(250)
        );
    }

    #[test]
    fn continuation_only_has_no_code() {
        assert_eq!(parse_status_code("250-PIPELINING\r\n250-SIZE\r\n"), None);
    }

    #[test]
    fn garbage_has_no_code() {
        assert_eq!(parse_status_code(""), None);
        assert_eq!(parse_status_code("hello there\r\n"), None);
        assert_eq!(parse_status_code("25 short\r\n"), None);
        assert_eq!(parse_status_code("250\r\n"), None);
    }

    #[test]
    fn code_must_start_a_line() {
        assert_eq!(parse_status_code("banner 220 ready\r\n"), None);
    }

    #[test]
    fn reads_until_final_line_and_leaves_the_rest() {
        let mut reader = Cursor::new(b"250-mx.example\r\n250 HELP\r\n550 later\r\n".to_vec());
        let first = read_reply(&mut reader);
        assert_eq!(first.code, code(250));
        assert_eq!(first.raw, "250-mx.example\r\n250 HELP\r\n");
        let second = read_reply(&mut reader);
        assert_eq!(second.code, code(550));
    }

    #[test]
    fn immediate_eof_is_absent() {
        let mut reader = Cursor::new(Vec::new());
        let reply = read_reply(&mut reader);
        assert_eq!(reply, SmtpReply::absent());
    }

    #[test]
    fn truncated_multiline_is_absent() {
        let mut reader = Cursor::new(b"250-first\r\n250-second".to_vec());
        let reply = read_reply(&mut reader);
        assert_eq!(reply.code, None);
        assert_eq!(reply.raw, "250-first\r\n250-second");
    }

    #[test]
    fn bare_code_line_stops_reading() {
        let mut reader = Cursor::new(b"250\r\n221 bye\r\n".to_vec());
        assert_eq!(read_reply(&mut reader).code, None);
        assert_eq!(read_reply(&mut reader).code, code(221));
    }

    #[test]
    fn lf_only_line_endings() {
        let mut reader = Cursor::new(b"220-hello\n220 ready\n".to_vec());
        assert_eq!(read_reply(&mut reader).code, code(220));
    }

    struct TimesOut;

    impl Read for TimesOut {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::WouldBlock, "timed out"))
        }
    }

    #[test]
    fn read_error_is_absent() {
        let mut reader = BufReader::new(TimesOut);
        assert_eq!(read_reply(&mut reader).code, None);
    }

    #[test]
    fn oversized_reply_is_cut() {
        let mut data = b"250-".to_vec();
        data.extend(std::iter::repeat_n(b'x', MAX_REPLY_LEN * 2));
        let mut reader = Cursor::new(data);
        let reply = read_reply(&mut reader);
        assert_eq!(reply.raw.len(), MAX_REPLY_LEN);
        assert_eq!(reply.code, None);
    }
}
