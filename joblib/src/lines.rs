use crate::types::OutputLine;
use bytes::BytesMut;

/// Longest line forwarded in one piece; longer output is cut into lines of this size.
pub(crate) const MAX_LINE_LEN: usize = 64 * 1024;

/// Split the next complete line off the front of `buf`, without its line ending.
///
/// Returns `None` when `buf` holds no newline yet; the partial line stays
/// buffered unless it has reached `MAX_LINE_LEN`.
pub(crate) fn next_line(buf: &mut BytesMut) -> Option<OutputLine> {
    let Some(newline) = buf.iter().take(MAX_LINE_LEN + 1).position(|b| *b == b'\n') else {
        if buf.len() >= MAX_LINE_LEN {
            return Some(buf.split_to(MAX_LINE_LEN).freeze());
        }
        return None;
    };
    let mut line = buf.split_to(newline + 1);
    line.truncate(newline);
    Some(strip_carriage_return(line))
}

/// Whatever is left once the stream has ended.
pub(crate) fn remainder(buf: &mut BytesMut) -> Option<OutputLine> {
    if buf.is_empty() {
        None
    } else {
        Some(strip_carriage_return(buf.split()))
    }
}

fn strip_carriage_return(mut line: BytesMut) -> OutputLine {
    if line.last() == Some(&b'\r') {
        line.truncate(line.len() - 1);
    }
    line.freeze()
}
