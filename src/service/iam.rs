//! I-Am: unconfirmed device-identity announcement, sent broadcast in reply to
//! Who-Is or unicast when addressed directly. Grounded on the Go original's
//! `encoding.go` `NewIAm` and the host crate's `NewIAm` equivalent.

#[cfg(not(feature = "std"))]
use alloc::{vec, vec::Vec};

use crate::apdu::Apdu;
use crate::bvlc::{Bvlc, BvlcFunction};
use crate::error::{Result, ServiceError};
use crate::npdu::Npdu;
use crate::object::ObjectType;
use crate::tag::{self, Tag};

use super::{Envelope, UnconfirmedServiceChoice};

/// Default max-APDU-length-accepted advertised by [`new_broadcast`]/[`new_unicast`].
pub const DEFAULT_MAX_APDU: u32 = 1024;
/// Default segmentation-supported enumeration: 3 = no segmentation.
pub const DEFAULT_SEGMENTATION_SUPPORTED: u32 = 3;

/// A decoded I-Am announcement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IAmDecoded {
    pub device_instance: u32,
    pub max_apdu_length: u32,
    pub segmentation_supported: u32,
    pub vendor_id: u32,
}

fn objects(device_instance: u32, vendor_id: u32) -> Result<Vec<Tag>> {
    Ok(vec![
        tag::encode_object_identifier(None, ObjectType::Device as u16, device_instance)?,
        tag::encode_unsigned(DEFAULT_MAX_APDU)?,
        tag::encode_enumerated(DEFAULT_SEGMENTATION_SUPPORTED)?,
        tag::encode_unsigned(vendor_id)?,
    ])
}

/// Build a broadcast I-Am for `device_instance`/`vendor_id`.
pub fn new_broadcast(device_instance: u32, vendor_id: u32) -> Result<Envelope> {
    let mut env = Envelope {
        bvlc: Bvlc::new(BvlcFunction::Broadcast),
        npdu: Npdu::new(false, false, false, false),
        apdu: Apdu::UnconfirmedRequest {
            service_choice: UnconfirmedServiceChoice::IAm as u8,
            objects: objects(device_instance, vendor_id)?,
        },
    };
    env.set_length();
    Ok(env)
}

/// Build a unicast I-Am addressed to `destination_network`, used when replying
/// to a directed Who-Is rather than broadcasting.
pub fn new_unicast(device_instance: u32, vendor_id: u32, destination_network: u16) -> Result<Envelope> {
    let mut npdu = Npdu::new(false, true, false, false);
    npdu.dnet = destination_network;
    npdu.dlen = 0;
    npdu.hop_count = 0xFF;
    let mut env = Envelope {
        bvlc: Bvlc::new(BvlcFunction::Unicast),
        npdu,
        apdu: Apdu::UnconfirmedRequest {
            service_choice: UnconfirmedServiceChoice::IAm as u8,
            objects: objects(device_instance, vendor_id)?,
        },
    };
    env.set_length();
    Ok(env)
}

/// Decode an I-Am's four application-tagged objects, in their fixed order.
pub fn decode(envelope: &Envelope) -> Result<IAmDecoded> {
    let objects = envelope.apdu.objects();
    if objects.len() != 4 {
        return Err(ServiceError::WrongObjectCount { expected: "4", got: objects.len() }.into());
    }
    let (_, device_instance) = tag::decode_object_identifier(&objects[0])?;
    let max_apdu_length = tag::decode_unsigned(&objects[1])?;
    let segmentation_supported = tag::decode_enumerated(&objects[2])?;
    let vendor_id = tag::decode_unsigned(&objects[3])?;
    Ok(IAmDecoded { device_instance, max_apdu_length, segmentation_supported, vendor_id })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn broadcast_round_trips() {
        let env = new_broadcast(321, 31).unwrap();
        let bytes = env.marshal().unwrap();
        let parsed = Envelope::unmarshal(&bytes).unwrap();
        let decoded = decode(&parsed).unwrap();
        assert_eq!(decoded.device_instance, 321);
        assert_eq!(decoded.vendor_id, 31);
        assert_eq!(decoded.max_apdu_length, DEFAULT_MAX_APDU);
        assert_eq!(decoded.segmentation_supported, DEFAULT_SEGMENTATION_SUPPORTED);
    }

    #[test]
    fn max_apdu_matches_scenario_2_literal_bytes() {
        // spec.md scenario 2: `22 04 00` is the max-apdu-length-accepted tag,
        // minimal-width unsigned 0x0400 = 1024 (matches the Go original's
        // `DEFAULT_ACCEPTED_SIZE`, not the unrelated 1476 transport ceiling).
        let t = tag::encode_unsigned(DEFAULT_MAX_APDU).unwrap();
        assert_eq!(t.marshal(), vec![0x22, 0x04, 0x00]);
    }

    #[test]
    fn unicast_sets_destination_network() {
        let env = new_unicast(5, 7, 42).unwrap();
        assert_eq!(env.npdu.dnet, 42);
        assert_eq!(env.npdu.hop_count, 0xFF);
    }

    #[test]
    fn wrong_object_count_rejected() {
        let mut env = new_broadcast(1, 1).unwrap();
        if let Apdu::UnconfirmedRequest { objects, .. } = &mut env.apdu {
            objects.pop();
        }
        assert!(decode(&env).is_err());
    }
}
