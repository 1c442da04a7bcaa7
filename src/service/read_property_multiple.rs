//! ReadPropertyMultiple: confirmed request for several properties of one
//! object in a single round trip. Grounded on the Go original's
//! `ConfirmedReadPropertyMultipleObjects` (`services/rp.go`), which already
//! encodes each property-id under context tag 0 inside the opening/closing
//! bracket-1 block.

#[cfg(not(feature = "std"))]
use alloc::{vec, vec::Vec};

use crate::apdu::Apdu;
use crate::bvlc::{Bvlc, BvlcFunction};
use crate::error::{Result, ServiceError};
use crate::npdu::Npdu;
use crate::tag::{self, Tag};
use crate::util::combine;

use super::{walk_tag_stream, ConfirmedServiceChoice, Envelope, WalkEvent};

/// A decoded ReadPropertyMultiple request: one object, several property ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadPropertyMultipleRequest {
    pub object_type: u16,
    pub instance: u32,
    pub property_ids: Vec<u16>,
}

/// Build a ReadPropertyMultiple confirmed request.
///
/// Wire shape: `object-identifier[0]`, then `{ opening[1], property-id[0]...,
/// closing[1] }` per ASHRAE 135's `ReadAccessSpecification`.
pub fn new_request(object_type: u16, instance: u32, property_ids: &[u16], invoke_id: u8) -> Result<Envelope> {
    let mut objects = vec![tag::encode_object_identifier(Some(0), object_type, instance)?, Tag::opening(1)];
    for &property_id in property_ids {
        objects.push(tag::encode_context_unsigned(0, property_id as u32)?);
    }
    objects.push(Tag::closing(1));
    let mut env = Envelope {
        bvlc: Bvlc::new(BvlcFunction::Unicast),
        npdu: Npdu::new(false, false, false, true),
        apdu: Apdu::ConfirmedRequest {
            segmented: false,
            more_follows: false,
            segmented_response_accepted: true,
            max_segments: 0,
            max_response_size: super::read_property::DEFAULT_MAX_RESPONSE_SIZE,
            invoke_id,
            sequence_number: None,
            proposed_window_size: None,
            service_choice: ConfirmedServiceChoice::ReadPropertyMultiple as u8,
            objects,
        },
    };
    env.set_length();
    Ok(env)
}

/// Decode a ReadPropertyMultiple request.
pub fn decode_request(envelope: &Envelope) -> Result<ReadPropertyMultipleRequest> {
    let mut object_type = None;
    let mut instance = None;
    let mut property_ids = Vec::new();
    walk_tag_stream(envelope.apdu.objects(), |event| {
        if let WalkEvent::Context { top, tag } = event {
            match combine(top, tag.number) {
                80 => {
                    let (ot, inst) = tag::decode_object_identifier(tag)?;
                    object_type = Some(ot);
                    instance = Some(inst);
                }
                10 => property_ids.push(tag::decode_unsigned(tag)? as u16),
                key => log::warn!("ReadPropertyMultiple request: unrecognized context key {}", key),
            }
        }
        Ok(())
    })?;
    Ok(ReadPropertyMultipleRequest {
        object_type: object_type.ok_or(ServiceError::WrongObjectCount { expected: "object-identifier", got: 0 })?,
        instance: instance.unwrap_or(0),
        property_ids,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{ObjectType, PropertyIdentifier};

    #[test]
    fn request_round_trips_with_multiple_properties() {
        let ids = [PropertyIdentifier::PresentValue as u16, PropertyIdentifier::StatusFlags as u16];
        let env = new_request(ObjectType::AnalogInput as u16, 1, &ids, 9).unwrap();
        let bytes = env.marshal().unwrap();
        let parsed = Envelope::unmarshal(&bytes).unwrap();
        let decoded = decode_request(&parsed).unwrap();
        assert_eq!(decoded.object_type, ObjectType::AnalogInput as u16);
        assert_eq!(decoded.property_ids, vec![85, 111]);
    }

    #[test]
    fn property_ids_use_context_tag_0_per_scenario_4() {
        // spec.md scenario 4: object (1,0), properties [85,36] — opening-bracket
        // context-1 (`1e`), two context-0 unsigned property-ids, closing-bracket
        // context-1 (`1f`).
        let env = new_request(1, 0, &[85, 36], 1).unwrap();
        if let Apdu::ConfirmedRequest { objects, .. } = &env.apdu {
            assert_eq!(objects[1].marshal(), vec![0x1e]);
            assert_eq!(objects[2].marshal(), vec![0x09, 0x55]);
            assert_eq!(objects[3].marshal(), vec![0x09, 0x24]);
            assert_eq!(objects[4].marshal(), vec![0x1f]);
        } else {
            panic!("expected ConfirmedRequest");
        }
    }
}
