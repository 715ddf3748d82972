/*
[INPUT]:  Canonical challenge message bytes
[OUTPUT]: HIP-820 framed bytes ready for signing
[POS]:    Auth layer - message domain separation before signing
[UPDATE]: When the signed-message envelope changes
*/

/// Fixed envelope prefix: `0x19` followed by `Hedera Signed Message:\n`
pub const HIP820_PREFIX: &[u8] = b"\x19Hedera Signed Message:\n";

/// Wrap a canonical message in the HIP-820 envelope
///
/// Layout: prefix, ASCII decimal byte length, `\n`, message verbatim.
pub fn wrap_message(message: &[u8]) -> Vec<u8> {
    let length = message.len().to_string();
    let mut wrapped = Vec::with_capacity(HIP820_PREFIX.len() + length.len() + 1 + message.len());
    wrapped.extend_from_slice(HIP820_PREFIX);
    wrapped.extend_from_slice(length.as_bytes());
    wrapped.push(b'\n');
    wrapped.extend_from_slice(message);
    wrapped
}

/// Inverse of [`wrap_message`]; `None` if the envelope or length header is wrong
pub fn unwrap_message(wrapped: &[u8]) -> Option<&[u8]> {
    let rest = wrapped.strip_prefix(HIP820_PREFIX)?;
    let newline = rest.iter().position(|&b| b == b'\n')?;
    let (header, body) = rest.split_at(newline);
    let body = &body[1..];

    if header.is_empty() || !header.iter().all(u8::is_ascii_digit) {
        return None;
    }
    let length: usize = std::str::from_utf8(header).ok()?.parse().ok()?;
    (length == body.len()).then_some(body)
}
