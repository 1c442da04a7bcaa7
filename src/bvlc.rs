//! BVLC (BACnet Virtual Link Control) envelope.
//!
//! Fixed 4-byte outer framing for BACnet/IP: type (always `0x81`), function
//! (unicast/broadcast), and a big-endian total-length covering the whole UDP
//! payload including these 4 bytes. Grounded on the host crate's
//! `datalink::bip::BvlcHeader`, trimmed to the two functions this codec's scope
//! (direct unicast/broadcast messaging) actually uses — forwarding, foreign
//! device registration, and BDT/FDT management are out of scope.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use crate::error::{BvlcError, Result};

/// BVLC type octet for BACnet/IP.
pub const BVLC_TYPE: u8 = 0x81;

/// BVLC function codes used by this codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum BvlcFunction {
    /// Original-Unicast-NPDU.
    Unicast = 0x0A,
    /// Original-Broadcast-NPDU.
    Broadcast = 0x0B,
}

impl TryFrom<u8> for BvlcFunction {
    type Error = BvlcError;

    fn try_from(value: u8) -> core::result::Result<Self, Self::Error> {
        match value {
            0x0A => Ok(BvlcFunction::Unicast),
            0x0B => Ok(BvlcFunction::Broadcast),
            other => Err(BvlcError::InvalidFunction(other)),
        }
    }
}

/// The 4-byte BVLC header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bvlc {
    pub function: BvlcFunction,
    /// Total length of the whole message (BVLC + NPDU + APDU), re-stamped by
    /// the owning message's `set_length()`.
    pub length: u16,
}

impl Bvlc {
    /// Create a new BVLC header for the given function, length defaulted to
    /// the bare 4-byte header.
    pub fn new(function: BvlcFunction) -> Self {
        Bvlc { function, length: 4 }
    }

    pub const fn marshal_len(&self) -> usize {
        4
    }

    pub fn marshal_to(&self, buf: &mut [u8]) -> Result<()> {
        if buf.len() < self.marshal_len() {
            return Err(BvlcError::TooShortToMarshal.into());
        }
        buf[0] = BVLC_TYPE;
        buf[1] = self.function as u8;
        buf[2..4].copy_from_slice(&self.length.to_be_bytes());
        Ok(())
    }

    pub fn marshal(&self) -> Vec<u8> {
        let mut buf = [0u8; 4];
        self.marshal_to(&mut buf).expect("fixed-size buffer");
        buf.to_vec()
    }

    pub fn unmarshal(buf: &[u8]) -> Result<(Bvlc, usize)> {
        if buf.len() < 4 {
            return Err(BvlcError::TooShortToParse.into());
        }
        if buf[0] != BVLC_TYPE {
            return Err(BvlcError::InvalidType(buf[0]).into());
        }
        let function = BvlcFunction::try_from(buf[1])?;
        let length = u16::from_be_bytes([buf[2], buf[3]]);
        Ok((Bvlc { function, length }, 4))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marshal_unicast() {
        let b = Bvlc { function: BvlcFunction::Unicast, length: 17 };
        assert_eq!(b.marshal(), vec![0x81, 0x0A, 0x00, 0x11]);
    }

    #[test]
    fn round_trip_broadcast() {
        let b = Bvlc { function: BvlcFunction::Broadcast, length: 12 };
        let bytes = b.marshal();
        let (parsed, consumed) = Bvlc::unmarshal(&bytes).unwrap();
        assert_eq!(consumed, 4);
        assert_eq!(parsed, b);
    }

    #[test]
    fn rejects_wrong_type() {
        let bytes = [0x80, 0x0A, 0x00, 0x04];
        assert!(Bvlc::unmarshal(&bytes).is_err());
    }

    #[test]
    fn too_short_to_parse() {
        assert!(Bvlc::unmarshal(&[0x81, 0x0A, 0x00]).is_err());
    }
}
