//! Base-128 varint codec (protobuf wire style).
//!
//! Unsigned values are encoded least-significant group first, 7 payload bits
//! per byte, high bit as continuation flag, at most [`MAX_VARINT_LEN`] bytes.
//! Signed values go through the zig-zag mapping first so small magnitudes of
//! either sign stay short on the wire.

/// Longest legal encoding of a 64-bit value: ceil(64 / 7) = 10 bytes.
pub const MAX_VARINT_LEN: usize = 10;

/// Decode an unsigned varint from the start of `data`.
///
/// Returns `Some((value, consumed))` on a complete, well-formed varint.
/// Returns `None` when no terminating byte (continuation bit clear) appears
/// within `min(data.len(), MAX_VARINT_LEN)` bytes — the caller distinguishes
/// underrun from overlong by how many bytes it had available.
pub fn decode_uvarint(data: &[u8]) -> Option<(u64, usize)> {
    let mut result: u64 = 0;
    let mut shift: u32 = 0;
    for (i, &b) in data.iter().take(MAX_VARINT_LEN).enumerate() {
        // At the tenth group shift is 63; payload bits beyond 64 fall off.
        result |= u64::from(b & 0x7F) << shift;
        if b & 0x80 == 0 {
            return Some((result, i + 1));
        }
        shift += 7;
    }
    None
}

/// Decode a zig-zag signed varint from the start of `data`.
pub fn decode_ivarint(data: &[u8]) -> Option<(i64, usize)> {
    let (raw, consumed) = decode_uvarint(data)?;
    Some((zigzag_decode(raw), consumed))
}

/// Encode an unsigned varint, appending to `out`. Returns bytes written.
pub fn encode_uvarint(mut value: u64, out: &mut Vec<u8>) -> usize {
    let mut written = 0;
    loop {
        let mut b = (value & 0x7F) as u8;
        value >>= 7;
        if value != 0 {
            b |= 0x80;
        }
        out.push(b);
        written += 1;
        if value == 0 {
            return written;
        }
    }
}

/// Encode a signed varint (zig-zag then unsigned), appending to `out`.
pub fn encode_ivarint(value: i64, out: &mut Vec<u8>) -> usize {
    encode_uvarint(zigzag_encode(value), out)
}

/// Zig-zag map: 0 → 0, -1 → 1, 1 → 2, -2 → 3, ...
fn zigzag_encode(value: i64) -> u64 {
    ((value << 1) ^ (value >> 63)) as u64
}

/// Inverse zig-zag: even values map to `v / 2`, odd values to `!(v / 2)`.
fn zigzag_decode(value: u64) -> i64 {
    let half = (value >> 1) as i64;
    if value & 1 != 0 {
        !half
    } else {
        half
    }
}
