//! PARA_TEXT payload decoding.
//!
//! Paragraph text is UTF-16LE with in-band control characters. A control
//! character is a code unit below 0x20; depending on its kind it spans one
//! code unit or eight (the extra units carry an inline parameter or an object
//! reference). Only the line break produces output; every other control
//! character is dropped together with its parameter units.

use super::consts::{CTRL_LINE_BREAK, ControlCharKind};
use crate::common::{Error, Result};
use encoding_rs::UTF_16LE;

/// Position of the next control marker at or after `from`: a byte in
/// `0x00..=0x1F` followed by `0x00`.
#[inline]
fn find_marker(data: &[u8], from: usize) -> Option<usize> {
    data.get(from..)?
        .windows(2)
        .position(|w| w[0] <= 0x1F && w[1] == 0)
        .map(|i| from + i)
}

#[inline]
fn push_utf16(out: &mut String, bytes: &[u8]) {
    if !bytes.is_empty() {
        let (text, _) = UTF_16LE.decode_without_bom_handling(bytes);
        out.push_str(&text);
    }
}

/// Decode a PARA_TEXT payload into plain text.
///
/// Markers are only honoured at even byte offsets, i.e. on code unit
/// boundaries; a match at an odd offset straddles two ordinary characters
/// and is skipped.
///
/// # Examples
///
/// ```
/// use hwp_tables::hwp::decode_para_text;
///
/// // "A", line break, "B"
/// let payload = [0x41, 0x00, 0x0A, 0x00, 0x42, 0x00];
/// assert_eq!(decode_para_text(&payload).unwrap(), "A\nB");
/// ```
pub fn decode_para_text(payload: &[u8]) -> Result<String> {
    let mut out = String::with_capacity(payload.len() / 2);
    let mut cursor = 0;
    let mut search = 0;

    while let Some(pos) = find_marker(payload, search) {
        if pos % 2 != 0 {
            search = pos + 1;
            continue;
        }

        push_utf16(&mut out, &payload[cursor..pos]);
        let code = payload[pos];
        let kind = ControlCharKind::of(code).ok_or(Error::UnknownControlCharacter(code))?;
        if code == CTRL_LINE_BREAK {
            out.push('\n');
        }
        cursor = (pos + kind.code_units() * 2).min(payload.len());
        search = cursor;
    }

    push_utf16(&mut out, &payload[cursor..]);
    Ok(out)
}

#[cfg(test)]
pub(crate) fn encode_utf16(text: &str) -> Vec<u8> {
    text.encode_utf16().flat_map(u16::to_le_bytes).collect()
}
