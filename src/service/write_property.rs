//! WriteProperty: confirmed request to set an object/property to a new value,
//! with an optional write priority. Grounded on the Go original's
//! `services/wp.go`; the REDESIGN FLAG there hardcoded priority 16
//! (lowest/no-priority) — this makes it an optional argument instead.

#[cfg(not(feature = "std"))]
use alloc::{vec, vec::Vec};

use crate::apdu::Apdu;
use crate::bvlc::{Bvlc, BvlcFunction};
use crate::error::{Result, ServiceError};
use crate::npdu::Npdu;
use crate::tag::{self, Tag, Value};
use crate::util::combine;

use super::{walk_tag_stream, ConfirmedServiceChoice, Envelope, WalkEvent};

/// A value this crate can construct into a WriteProperty request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WriteValue {
    Real(f32),
    Unsigned(u32),
    Signed(i32),
    Enumerated(u32),
    Boolean(bool),
}

impl WriteValue {
    fn to_tag(self) -> Result<Tag> {
        match self {
            WriteValue::Real(v) => tag::encode_real(v),
            WriteValue::Unsigned(v) => tag::encode_unsigned(v),
            WriteValue::Signed(v) => tag::encode_signed(v),
            WriteValue::Enumerated(v) => tag::encode_enumerated(v),
            WriteValue::Boolean(v) => Ok(Tag::application_boolean(v)),
        }
    }
}

/// A decoded WriteProperty request. `priority` is `None` when the writer
/// omitted it (the receiving device applies its own default, conventionally
/// the lowest priority 16).
#[derive(Debug, Clone, PartialEq)]
pub struct WritePropertyRequest {
    pub object_type: u16,
    pub instance: u32,
    pub property_id: u16,
    pub priority: Option<u8>,
    pub values: Vec<Value>,
}

/// Build a WriteProperty confirmed request.
pub fn new_request(
    object_type: u16,
    instance: u32,
    property_id: u16,
    value: WriteValue,
    priority: Option<u8>,
    invoke_id: u8,
) -> Result<Envelope> {
    let mut objects = vec![
        tag::encode_object_identifier(Some(0), object_type, instance)?,
        tag::encode_context_unsigned(1, property_id as u32)?,
        Tag::opening(3),
        value.to_tag()?,
        Tag::closing(3),
    ];
    if let Some(priority) = priority {
        objects.push(tag::encode_context_unsigned(4, priority as u32)?);
    }
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
            service_choice: ConfirmedServiceChoice::WriteProperty as u8,
            objects,
        },
    };
    env.set_length();
    Ok(env)
}

/// Decode a WriteProperty request.
pub fn decode_request(envelope: &Envelope) -> Result<WritePropertyRequest> {
    let mut object_type = None;
    let mut instance = None;
    let mut property_id = None;
    let mut priority = None;
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
                84 => priority = Some(tag::decode_unsigned(tag)? as u8),
                key => log::warn!("WriteProperty request: unrecognized context key {}", key),
            },
            WalkEvent::Application(tag) => values.push(tag::decode_value(tag)?),
        }
        Ok(())
    })?;
    Ok(WritePropertyRequest {
        object_type: object_type.ok_or(ServiceError::WrongObjectCount { expected: "object-identifier", got: 0 })?,
        instance: instance.unwrap_or(0),
        property_id: property_id.ok_or(ServiceError::WrongObjectCount { expected: "property-identifier", got: 0 })?,
        priority,
        values,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{ObjectType, PropertyIdentifier};

    #[test]
    fn request_without_priority_round_trips() {
        let env = new_request(
            ObjectType::AnalogOutput as u16,
            2,
            PropertyIdentifier::PresentValue as u16,
            WriteValue::Real(72.0),
            None,
            4,
        )
        .unwrap();
        let bytes = env.marshal().unwrap();
        let parsed = Envelope::unmarshal(&bytes).unwrap();
        let decoded = decode_request(&parsed).unwrap();
        assert_eq!(decoded.priority, None);
        assert_eq!(decoded.values, vec![Value::Real(72.0)]);
    }

    #[test]
    fn request_with_priority_round_trips() {
        let env = new_request(
            ObjectType::AnalogOutput as u16,
            2,
            PropertyIdentifier::PresentValue as u16,
            WriteValue::Real(72.0),
            Some(8),
            4,
        )
        .unwrap();
        let bytes = env.marshal().unwrap();
        let parsed = Envelope::unmarshal(&bytes).unwrap();
        let decoded = decode_request(&parsed).unwrap();
        assert_eq!(decoded.priority, Some(8));
    }
}
