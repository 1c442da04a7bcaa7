//! NPDU (Network Protocol Data Unit) envelope.
//!
//! Variable 2-11-byte network-layer header: version, a control byte, and
//! optional DNET/DLEN, SNET/SLEN/SADR, and hop-count blocks gated by control
//! bits. Grounded on the host crate's `network::{Npdu, NpduControl}`, narrowed
//! to the single destination/source-address-byte shape this codec's scope
//! (routed NPDU forwarding is an explicit Non-goal) actually needs.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use bitflags::bitflags;

use crate::error::{NpduError, Result};

bitflags! {
    /// NPDU control-byte bits this codec interprets.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ControlFlags: u8 {
        /// Bit 7: this NPDU carries no APDU, network-layer message only.
        const APDU_ABSENT = 0x80;
        /// Bit 5: a destination (DNET/DLEN[/DADR]) specifier is present.
        const DESTINATION_PRESENT = 0x20;
        /// Bit 3: a source (SNET/SLEN/SADR) specifier is present.
        const SOURCE_PRESENT = 0x08;
        /// Bit 2: the sender expects a reply (confirmed service follows).
        const EXPECTING_REPLY = 0x04;
    }
}

/// A BACnet network-layer header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Npdu {
    pub version: u8,
    pub control: ControlFlags,
    pub dnet: u16,
    pub dlen: u8,
    pub snet: u16,
    pub slen: u8,
    pub sadr: u8,
    pub hop_count: u8,
}

impl Npdu {
    /// Construct an NPDU with the given control flags and zeroed address fields.
    pub fn new(apdu_absent: bool, destination_present: bool, source_present: bool, expecting_reply: bool) -> Self {
        let mut control = ControlFlags::empty();
        control.set(ControlFlags::APDU_ABSENT, apdu_absent);
        control.set(ControlFlags::DESTINATION_PRESENT, destination_present);
        control.set(ControlFlags::SOURCE_PRESENT, source_present);
        control.set(ControlFlags::EXPECTING_REPLY, expecting_reply);
        Npdu { version: 1, control, dnet: 0, dlen: 0, snet: 0, slen: 0, sadr: 0, hop_count: 0 }
    }

    fn has_destination(&self) -> bool {
        self.control.contains(ControlFlags::DESTINATION_PRESENT)
    }

    fn has_source(&self) -> bool {
        self.control.contains(ControlFlags::SOURCE_PRESENT)
    }

    pub fn marshal_len(&self) -> usize {
        let mut len = 2;
        if self.has_destination() {
            len += 4; // DNET(2) + DLEN(1) + hop count(1), per the destination-present gate
        }
        if self.has_source() {
            len += 4; // SNET(2) + SLEN(1) + SADR(1)
        }
        len
    }

    pub fn marshal_to(&self, buf: &mut [u8]) -> Result<()> {
        if buf.len() < self.marshal_len() {
            return Err(NpduError::TooShortToMarshal.into());
        }
        buf[0] = self.version;
        buf[1] = self.control.bits();
        let mut offset = 2;
        if self.has_destination() {
            buf[offset..offset + 2].copy_from_slice(&self.dnet.to_be_bytes());
            buf[offset + 2] = self.dlen;
            offset += 3;
        }
        if self.has_source() {
            buf[offset..offset + 2].copy_from_slice(&self.snet.to_be_bytes());
            buf[offset + 2] = self.slen;
            buf[offset + 3] = self.sadr;
            offset += 4;
        }
        if self.has_destination() {
            buf[offset] = self.hop_count;
        }
        Ok(())
    }

    pub fn marshal(&self) -> Vec<u8> {
        let mut buf = vec![0u8; self.marshal_len()];
        self.marshal_to(&mut buf).expect("sized by marshal_len");
        buf
    }

    pub fn unmarshal(buf: &[u8]) -> Result<(Npdu, usize)> {
        if buf.len() < 2 {
            return Err(NpduError::TooShortToParse.into());
        }
        let version = buf[0];
        let control = ControlFlags::from_bits_truncate(buf[1]);
        let mut npdu = Npdu { version, control, dnet: 0, dlen: 0, snet: 0, slen: 0, sadr: 0, hop_count: 0 };

        let mut offset = 2;
        if npdu.has_destination() {
            if buf.len() < offset + 3 {
                return Err(NpduError::TooShortToParse.into());
            }
            npdu.dnet = u16::from_be_bytes([buf[offset], buf[offset + 1]]);
            npdu.dlen = buf[offset + 2];
            offset += 3;
        }
        if npdu.has_source() {
            if buf.len() < offset + 4 {
                return Err(NpduError::TooShortToParse.into());
            }
            npdu.snet = u16::from_be_bytes([buf[offset], buf[offset + 1]]);
            npdu.slen = buf[offset + 2];
            npdu.sadr = buf[offset + 3];
            offset += 4;
        }
        if npdu.has_destination() {
            if buf.len() < offset + 1 {
                return Err(NpduError::TooShortToParse.into());
            }
            npdu.hop_count = buf[offset];
            offset += 1;
        }
        Ok((npdu, offset))
    }

    /// The DNET=0xFFFF/DLEN=0/hop=0xFF broadcast convention used by IAm.
    pub fn broadcast_destination(mut self) -> Self {
        self.control.insert(ControlFlags::DESTINATION_PRESENT);
        self.dnet = 0xFFFF;
        self.dlen = 0;
        self.hop_count = 0xFF;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_no_flags() {
        let (npdu, consumed) = Npdu::unmarshal(&[0x01, 0x00]).unwrap();
        assert_eq!(consumed, 2);
        assert_eq!(npdu.version, 1);
        assert_eq!(npdu.control.bits(), 0);
        assert_eq!(npdu.dnet, 0);
        assert_eq!(npdu.hop_count, 0);
    }

    #[test]
    fn with_dnet() {
        let (npdu, _) = Npdu::unmarshal(&[0x01, 0x20, 0xff, 0xff, 0x00, 0xff]).unwrap();
        assert_eq!(npdu.control.bits(), 0x20);
        assert_eq!(npdu.dnet, 0xffff);
        assert_eq!(npdu.dlen, 0);
        assert_eq!(npdu.hop_count, 0xff);
    }

    #[test]
    fn with_snet() {
        let (npdu, _) = Npdu::unmarshal(&[0x1, 0x8, 0x0, 0x8, 0x1, 0x8]).unwrap();
        assert_eq!(npdu.control.bits(), 0x08);
        assert_eq!(npdu.snet, 0x0008);
        assert_eq!(npdu.slen, 1);
        assert_eq!(npdu.sadr, 8);
        assert_eq!(npdu.dnet, 0);
        assert_eq!(npdu.hop_count, 0);
    }

    #[test]
    fn with_snet_and_dnet() {
        let bytes = [0x1, 0x28, 0xff, 0xff, 0x0, 0x0, 0x8, 0x1, 0x18, 0xfe];
        let (npdu, consumed) = Npdu::unmarshal(&bytes).unwrap();
        assert_eq!(consumed, 10);
        assert_eq!(npdu.snet, 0x0008);
        assert_eq!(npdu.slen, 1);
        assert_eq!(npdu.sadr, 24);
        assert_eq!(npdu.dnet, 0xffff);
        assert_eq!(npdu.hop_count, 0xfe);
    }

    #[test]
    fn marshal_with_snet_and_dnet_round_trips() {
        let mut npdu = Npdu::new(false, true, true, false);
        npdu.dnet = 0xffff;
        npdu.dlen = 0;
        npdu.hop_count = 0xfe;
        npdu.snet = 0x0008;
        npdu.slen = 1;
        npdu.sadr = 24;

        let bytes = npdu.marshal();
        assert_eq!(bytes, vec![0x1, 0x28, 0xff, 0xff, 0x0, 0x0, 0x8, 0x1, 0x18, 0xfe]);
    }

    #[test]
    fn marshal_len_formula() {
        let npdu = Npdu::new(false, true, true, false);
        assert_eq!(npdu.marshal_len(), 2 + 4 + 4);
        let npdu = Npdu::new(false, false, false, false);
        assert_eq!(npdu.marshal_len(), 2);
    }
}
