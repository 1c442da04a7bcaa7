//! ReadProperty: confirmed request for a single object/property pair, plus
//! the matching ComplexACK reply. Grounded on the Go original's `services/rp.go`
//! and `cack-rr.go`'s generic ComplexACK object list.

#[cfg(not(feature = "std"))]
use alloc::{vec, vec::Vec};

use crate::apdu::Apdu;
use crate::bvlc::{Bvlc, BvlcFunction};
use crate::error::{Result, ServiceError};
use crate::npdu::Npdu;
use crate::tag::{self, Tag, Value};
use crate::util::combine;

use super::{walk_tag_stream, ConfirmedServiceChoice, Envelope, WalkEvent};

/// Default accepted-APDU-size used when no segmentation is negotiated.
pub const DEFAULT_MAX_RESPONSE_SIZE: u8 = 5;

/// A decoded ReadProperty request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadPropertyRequest {
    pub object_type: u16,
    pub instance: u32,
    pub property_id: u16,
}

/// A decoded ReadProperty ComplexACK: the echoed object/property plus every
/// application-tagged value found in the property-value bracket (almost
/// always one element, but list-valued properties can carry several).
#[derive(Debug, Clone, PartialEq)]
pub struct ReadPropertyAck {
    pub object_type: u16,
    pub instance: u32,
    pub property_id: u16,
    pub values: Vec<Value>,
}

/// Build a ReadProperty confirmed request.
pub fn new_request(object_type: u16, instance: u32, property_id: u16, invoke_id: u8) -> Result<Envelope> {
    let objects = vec![
        tag::encode_object_identifier(Some(0), object_type, instance)?,
        tag::encode_context_unsigned(1, property_id as u32)?,
    ];
    let mut env = Envelope {
        bvlc: Bvlc::new(BvlcFunction::Unicast),
        npdu: Npdu::new(false, false, false, true),
        apdu: Apdu::ConfirmedRequest {
            segmented: false,
            more_follows: false,
            segmented_response_accepted: true,
            max_segments: 0,
            max_response_size: DEFAULT_MAX_RESPONSE_SIZE,
            invoke_id,
            sequence_number: None,
            proposed_window_size: None,
            service_choice: ConfirmedServiceChoice::ReadProperty as u8,
            objects,
        },
    };
    env.set_length();
    Ok(env)
}

/// Decode a ReadProperty request's two context-tagged objects.
pub fn decode_request(envelope: &Envelope) -> Result<ReadPropertyRequest> {
    let mut object_type = None;
    let mut instance = None;
    let mut property_id = None;
    walk_tag_stream(envelope.apdu.objects(), |event| {
        if let WalkEvent::Context { top, tag } = event {
            match combine(top, tag.number) {
                80 => {
                    let (ot, inst) = tag::decode_object_identifier(tag)?;
                    object_type = Some(ot);
                    instance = Some(inst);
                }
                81 => property_id = Some(tag::decode_unsigned(tag)? as u16),
                key => log::warn!("ReadProperty request: unrecognized context key {}", key),
            }
        }
        Ok(())
    })?;
    Ok(ReadPropertyRequest {
        object_type: object_type.ok_or(ServiceError::WrongObjectCount { expected: "object-identifier", got: 0 })?,
        instance: instance.unwrap_or(0),
        property_id: property_id.ok_or(ServiceError::WrongObjectCount { expected: "property-identifier", got: 0 })?,
    })
}

/// Build the ComplexACK carrying `value` as the property's one or more
/// application-tagged values.
pub fn new_ack(object_type: u16, instance: u32, property_id: u16, values: Vec<Tag>, invoke_id: u8) -> Result<Envelope> {
    let mut objects = vec![
        tag::encode_object_identifier(Some(0), object_type, instance)?,
        tag::encode_context_unsigned(1, property_id as u32)?,
        Tag::opening(3),
    ];
    objects.extend(values);
    objects.push(Tag::closing(3));
    let mut env = Envelope {
        bvlc: Bvlc::new(BvlcFunction::Unicast),
        npdu: Npdu::new(false, false, false, false),
        apdu: Apdu::ComplexAck {
            segmented: false,
            more_follows: false,
            invoke_id,
            sequence_number: None,
            proposed_window_size: None,
            service_choice: ConfirmedServiceChoice::ReadProperty as u8,
            objects,
        },
    };
    env.set_length();
    Ok(env)
}

/// Decode a ReadProperty ComplexACK.
pub fn decode_ack(envelope: &Envelope) -> Result<ReadPropertyAck> {
    let mut object_type = None;
    let mut instance = None;
    let mut property_id = None;
    let mut values = Vec::new();
    walk_tag_stream(envelope.apdu.objects(), |event| {
        match event {
            WalkEvent::Context { top, tag } => match combine(top, tag.number) {
                80 => {
                    let (ot, inst) = tag::decode_object_identifier(tag)?;
                    object_type = Some(ot);
                    instance = Some(inst);
                }
                81 => property_id = Some(tag::decode_unsigned(tag)? as u16),
                key => log::warn!("ReadProperty ack: unrecognized context key {}", key),
            },
            WalkEvent::Application(tag) => values.push(tag::decode_value(tag)?),
        }
        Ok(())
    })?;
    Ok(ReadPropertyAck {
        object_type: object_type.ok_or(ServiceError::WrongObjectCount { expected: "object-identifier", got: 0 })?,
        instance: instance.unwrap_or(0),
        property_id: property_id.ok_or(ServiceError::WrongObjectCount { expected: "property-identifier", got: 0 })?,
        values,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{ObjectType, PropertyIdentifier};

    #[test]
    fn request_round_trips() {
        let env = new_request(ObjectType::AnalogInput as u16, 1, PropertyIdentifier::PresentValue as u16, 5).unwrap();
        let bytes = env.marshal().unwrap();
        let parsed = Envelope::unmarshal(&bytes).unwrap();
        let decoded = decode_request(&parsed).unwrap();
        assert_eq!(decoded.object_type, ObjectType::AnalogInput as u16);
        assert_eq!(decoded.instance, 1);
        assert_eq!(decoded.property_id, PropertyIdentifier::PresentValue as u16);
    }

    #[test]
    fn ack_round_trips_real_value() {
        let value = tag::encode_real(23.5).unwrap();
        let env =
            new_ack(ObjectType::AnalogInput as u16, 1, PropertyIdentifier::PresentValue as u16, vec![value], 5).unwrap();
        let bytes = env.marshal().unwrap();
        let parsed = Envelope::unmarshal(&bytes).unwrap();
        let decoded = decode_ack(&parsed).unwrap();
        assert_eq!(decoded.values, vec![Value::Real(23.5)]);
    }
}
