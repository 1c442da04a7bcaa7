//! Shared helpers for the service layer's tag-stream walk.
//!
//! Grounded on the Go original's `services.combine`/`decResultsFlag`/
//! `decStatusFlags` helpers (`cack-rr.go`): a fixed-arity dispatch key for
//! `(top-of-context, tag-number)` pairs, and bit-flag decoders for the
//! result-flags and status-flags bit strings that ComplexACK/ReadRange replies
//! carry.

use crate::error::{Result, TagError};
use crate::tag::Tag;

/// Combine a context-stack top and a tag number into a single dispatch key,
/// the `top*10 + n` pattern described in the service layer's per-service
/// contracts. Kept as a plain function (rather than a match on a `(u8, u8)`
/// tuple) so call sites can use it in `match` arms.
pub const fn combine(context: u8, tag_number: u8) -> u16 {
    context as u16 * 10 + tag_number as u16
}

/// Bits of a BACnet `results-flags` BIT STRING(3): first-item, last-item,
/// more-items, in presentation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResultFlags {
    pub first_item: bool,
    pub last_item: bool,
    pub more_items: bool,
}

/// Bits of a BACnet `status-flags` BIT STRING(4): in-alarm, fault, overridden,
/// out-of-service, in presentation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatusFlags {
    pub in_alarm: bool,
    pub fault: bool,
    pub overridden: bool,
    pub out_of_service: bool,
}

fn bit_string_bytes(tag: &Tag) -> Result<&[u8]> {
    if tag.data.is_empty() {
        return Err(TagError::InvalidObjectType.into());
    }
    Ok(&tag.data[1..])
}

/// Decode a `results-flags` bit string carried by a context tag.
pub fn decode_result_flags(tag: &Tag) -> Result<ResultFlags> {
    let bits = bit_string_bytes(tag)?;
    if bits.is_empty() {
        return Err(TagError::InvalidObjectType.into());
    }
    Ok(ResultFlags {
        first_item: bits[0] & 0x80 == 0x80,
        last_item: bits[0] & 0x40 == 0x40,
        more_items: bits[0] & 0x20 == 0x20,
    })
}

/// Decode a `status-flags` bit string carried by a context tag.
pub fn decode_status_flags(tag: &Tag) -> Result<StatusFlags> {
    let bits = bit_string_bytes(tag)?;
    if bits.is_empty() {
        return Err(TagError::InvalidObjectType.into());
    }
    Ok(StatusFlags {
        in_alarm: bits[0] & 0x80 == 0x80,
        fault: bits[0] & 0x40 == 0x40,
        overridden: bits[0] & 0x20 == 0x20,
        out_of_service: bits[0] & 0x10 == 0x10,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combine_matches_canonical_pattern() {
        assert_eq!(combine(8, 0), 80);
        assert_eq!(combine(1, 2), 12);
        assert_eq!(combine(5, 2), 52);
    }

    #[test]
    fn status_flags_decode_bits() {
        let tag = Tag::context(2, vec![0x00, 0b1010_0000]).unwrap();
        let flags = decode_status_flags(&tag).unwrap();
        assert!(flags.in_alarm);
        assert!(!flags.fault);
        assert!(flags.overridden);
        assert!(!flags.out_of_service);
    }

    #[test]
    fn result_flags_decode_bits() {
        let tag = Tag::context(3, vec![0x00, 0b1110_0000]).unwrap();
        let flags = decode_result_flags(&tag).unwrap();
        assert!(flags.first_item);
        assert!(flags.last_item);
        assert!(flags.more_items);
    }
}
