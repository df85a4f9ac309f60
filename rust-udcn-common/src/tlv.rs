//! TLV (Type‑Length‑Value) encoding utilities.
//!
//! The forwarder only needs the wire form of a Data packet to derive its
//! implicit SHA‑256 digest, so only the encoding half lives here.

use bytes::{BufMut, Bytes, BytesMut};

/* ---------------------------------------------------------------- *
 * TLV type constants (single‑byte for µDCN)
 * ---------------------------------------------------------------- */

pub const TLV_IMPLICIT_DIGEST: u8   = 0x01;
pub const TLV_DATA: u8              = 0x06;
pub const TLV_NAME: u8              = 0x07;
pub const TLV_COMPONENT: u8         = 0x08;
pub const TLV_META_INFO: u8         = 0x14;
pub const TLV_CONTENT: u8           = 0x15;
pub const TLV_SIGNATURE_VALUE: u8   = 0x17;
pub const TLV_CONTENT_TYPE: u8      = 0x18;
pub const TLV_FRESHNESS_PERIOD: u8  = 0x19;

/* ---------------------------------------------------------------- *
 * Encoding helpers
 * ---------------------------------------------------------------- */

/// Encode the 1‑byte TLV *type* field.
pub fn encode_tlv_type(tlv_type: u8, buf: &mut BytesMut) {
    buf.put_u8(tlv_type);
}

/// Encode the variable‑width TLV *length* field.
///
/// * `< 253`  → 1 byte
/// * `≤ 65 535`  → marker 253 + 2‑byte length
/// * otherwise → marker 254 + 4‑byte length (max ≈ 4 GB)
pub fn encode_tlv_length(length: usize, buf: &mut BytesMut) {
    if length < 253 {
        buf.put_u8(length as u8);
    } else if length <= 65_535 {
        buf.put_u8(253);
        buf.put_u16(length as u16);
    } else {
        buf.put_u8(254);
        buf.put_u32(length as u32);
    }
}

/// Shortest big‑endian encoding of a NonNegativeInteger (1, 2, 4 or 8 bytes).
pub fn non_negative_integer(value: u64) -> Bytes {
    let mut buf = BytesMut::with_capacity(8);
    if value <= u8::MAX as u64 {
        buf.put_u8(value as u8);
    } else if value <= u16::MAX as u64 {
        buf.put_u16(value as u16);
    } else if value <= u32::MAX as u64 {
        buf.put_u32(value as u32);
    } else {
        buf.put_u64(value);
    }
    buf.freeze()
}

/* ---------------------------------------------------------------- *
 * TLV element wrapper
 * ---------------------------------------------------------------- */

/// A generic TLV element consisting of *type*, *length* and *value*.
#[derive(Debug, Clone, PartialEq)]
pub struct TlvElement {
    pub tlv_type: u8,
    pub value: Bytes,
}

impl TlvElement {
    /// Create a new wrapper from raw parts.
    pub fn new(tlv_type: u8, value: impl Into<Bytes>) -> Self {
        Self {
            tlv_type,
            value: value.into(),
        }
    }

    /// Total number of bytes when this element is encoded.
    pub fn len(&self) -> usize {
        let vlen = self.value.len();
        1            // type
        + tlv_length_size(vlen)
        + vlen       // value
    }

    /// Encode this element into `buf`.
    pub fn encode(&self, buf: &mut BytesMut) {
        encode_tlv_type(self.tlv_type, buf);
        encode_tlv_length(self.value.len(), buf);
        buf.extend_from_slice(&self.value);
    }
}

/* ---------------------------------------------------------------- *
 * Helper
 * ---------------------------------------------------------------- */

/// Number of bytes required to encode `length` with the variable‑width scheme.
fn tlv_length_size(length: usize) -> usize {
    if length < 253 {
        1
    } else if length <= 65_535 {
        3
    } else {
        5
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_encoding_widths() {
        let mut buf = BytesMut::new();
        encode_tlv_length(100, &mut buf);
        assert_eq!(&buf[..], &[100]);

        buf.clear();
        encode_tlv_length(1000, &mut buf);
        assert_eq!(buf.len(), 3);
        assert_eq!(buf[0], 253);

        buf.clear();
        encode_tlv_length(100_000, &mut buf);
        assert_eq!(buf.len(), 5);
        assert_eq!(buf[0], 254);
    }

    #[test]
    fn test_element_encoding() {
        let element = TlvElement::new(TLV_CONTENT, Bytes::from_static(b"abc"));
        let mut buf = BytesMut::new();
        element.encode(&mut buf);
        assert_eq!(buf.len(), element.len());
        assert_eq!(&buf[..], &[TLV_CONTENT, 3, b'a', b'b', b'c']);

        let long = TlvElement::new(TLV_CONTENT, vec![0u8; 300]);
        buf.clear();
        long.encode(&mut buf);
        assert_eq!(buf.len(), long.len());
        assert_eq!(&buf[..4], &[TLV_CONTENT, 253, 0x01, 0x2c]);
    }

    #[test]
    fn test_non_negative_integer_is_shortest() {
        assert_eq!(non_negative_integer(7).len(), 1);
        assert_eq!(non_negative_integer(300).len(), 2);
        assert_eq!(non_negative_integer(70_000).len(), 4);
        assert_eq!(non_negative_integer(u64::MAX).len(), 8);
    }
}
