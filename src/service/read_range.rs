//! ReadRange: confirmed request for a windowed slice of a list-valued
//! property, most commonly a trend-log's `log-buffer`. Grounded on the Go
//! original's `services/rr.go` (request) and `services/cack-rr.go` (the
//! ComplexACK's results-flags/item-count/log-buffer-entries shape).

#[cfg(not(feature = "std"))]
use alloc::{vec, vec::Vec};

use crate::apdu::Apdu;
use crate::bvlc::{Bvlc, BvlcFunction};
use crate::error::{Result, ServiceError};
use crate::npdu::Npdu;
use crate::object::PropertyIdentifier;
use crate::tag::{self, Tag, Value};
use crate::util::{self, combine, ResultFlags};

use super::{walk_tag_stream, ConfirmedServiceChoice, Envelope, WalkEvent};

/// By-position range restriction: `index` is 1-based per ASHRAE 135, `count`
/// may be negative to read backward from `index`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    pub index: u32,
    pub count: i32,
}

/// A decoded ReadRange request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadRangeRequest {
    pub object_type: u16,
    pub instance: u32,
    pub property_id: u16,
    pub range: Option<Range>,
}

/// Build a ReadRange confirmed request. Only the log-buffer and present-value
/// properties are supported; anything else is rejected up front rather than
/// producing a malformed wire message the peer would reject anyway.
pub fn new_request(object_type: u16, instance: u32, property_id: u16, range: Option<Range>, invoke_id: u8) -> Result<Envelope> {
    if property_id != PropertyIdentifier::LogBuffer as u16 && property_id != PropertyIdentifier::PresentValue as u16 {
        return Err(ServiceError::UnsupportedProperty(property_id).into());
    }
    let mut objects = vec![
        tag::encode_object_identifier(Some(0), object_type, instance)?,
        tag::encode_context_unsigned(1, property_id as u32)?,
    ];
    if let Some(r) = range {
        objects.push(Tag::opening(3));
        objects.push(tag::encode_unsigned(r.index)?);
        objects.push(tag::encode_signed(r.count)?);
        objects.push(Tag::closing(3));
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
            service_choice: ConfirmedServiceChoice::ReadRange as u8,
            objects,
        },
    };
    env.set_length();
    Ok(env)
}

/// Decode a ReadRange request.
pub fn decode_request(envelope: &Envelope) -> Result<ReadRangeRequest> {
    let mut object_type = None;
    let mut instance = None;
    let mut property_id = None;
    let mut index = None;
    let mut count = None;
    walk_tag_stream(envelope.apdu.objects(), |event| {
        if let WalkEvent::Context { top, tag } = event {
            match combine(top, tag.number) {
                80 => {
                    let (ot, inst) = tag::decode_object_identifier(tag)?;
                    object_type = Some(ot);
                    instance = Some(inst);
                }
                81 => property_id = Some(tag::decode_unsigned(tag)? as u16),
                30 => index = Some(tag::decode_unsigned(tag)?),
                31 => count = Some(tag::decode_signed(tag)?),
                key => log::warn!("ReadRange request: unrecognized context key {}", key),
            }
        }
        Ok(())
    })?;
    let property_id = property_id.ok_or(ServiceError::WrongObjectCount { expected: "property-identifier", got: 0 })?;
    if property_id != PropertyIdentifier::LogBuffer as u16 && property_id != PropertyIdentifier::PresentValue as u16 {
        return Err(ServiceError::UnsupportedProperty(property_id).into());
    }
    let range = match (index, count) {
        (Some(index), Some(count)) => Some(Range { index, count }),
        _ => None,
    };
    Ok(ReadRangeRequest {
        object_type: object_type.ok_or(ServiceError::WrongObjectCount { expected: "object-identifier", got: 0 })?,
        instance: instance.unwrap_or(0),
        property_id,
        range,
    })
}

/// One log-buffer entry: a timestamp and the logged value.
#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    pub timestamp: Value,
    pub value: Value,
}

/// A decoded ReadRange ComplexACK over a trend-log's log-buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct LogBufferAck {
    pub object_type: u16,
    pub instance: u32,
    pub property_id: u16,
    pub result_flags: ResultFlags,
    pub item_count: u32,
    pub records: Vec<LogRecord>,
}

/// Build the ComplexACK carrying a log-buffer slice.
pub fn new_log_buffer_ack(
    object_type: u16,
    instance: u32,
    result_flags: [bool; 3],
    records: &[LogRecord],
    invoke_id: u8,
) -> Result<Envelope> {
    let bits = (result_flags[0] as u8) << 7 | (result_flags[1] as u8) << 6 | (result_flags[2] as u8) << 5;
    let mut objects = vec![
        tag::encode_object_identifier(Some(0), object_type, instance)?,
        tag::encode_context_unsigned(1, PropertyIdentifier::LogBuffer as u32)?,
        Tag::context(3, vec![0, bits])?,
        tag::encode_context_unsigned(4, records.len() as u32)?,
        Tag::opening(5),
    ];
    for record in records {
        objects.push(value_to_tag(&record.timestamp)?);
        objects.push(value_to_tag(&record.value)?);
    }
    objects.push(Tag::closing(5));
    let mut env = Envelope {
        bvlc: Bvlc::new(BvlcFunction::Unicast),
        npdu: Npdu::new(false, false, false, false),
        apdu: Apdu::ComplexAck {
            segmented: false,
            more_follows: false,
            invoke_id,
            sequence_number: None,
            proposed_window_size: None,
            service_choice: ConfirmedServiceChoice::ReadRange as u8,
            objects,
        },
    };
    env.set_length();
    Ok(env)
}

fn value_to_tag(value: &Value) -> Result<Tag> {
    match value {
        Value::Real(v) => tag::encode_real(*v),
        Value::UnsignedInt(v) => tag::encode_unsigned(*v),
        Value::SignedInt(v) => tag::encode_signed(*v),
        Value::Enumerated(v) => tag::encode_enumerated(*v),
        Value::Date { year, month, day, weekday } => tag::encode_date(*year, *month, *day, *weekday),
        Value::Time { hour, minute, second, hundredths } => tag::encode_time(*hour, *minute, *second, *hundredths),
        _ => Err(ServiceError::UnsupportedProperty(0).into()),
    }
}

/// Decode a ReadRange ComplexACK's log-buffer payload: results-flags,
/// item-count, and each `{timestamp, value}` pair found inside the bracket.
pub fn decode_log_buffer_ack(envelope: &Envelope) -> Result<LogBufferAck> {
    let mut object_type = None;
    let mut instance = None;
    let mut result_flags = None;
    let mut item_count = None;
    let mut records = Vec::new();
    let mut pending_timestamp: Option<Value> = None;
    walk_tag_stream(envelope.apdu.objects(), |event| match event {
        WalkEvent::Context { top, tag } => {
            match combine(top, tag.number) {
                80 => {
                    let (ot, inst) = tag::decode_object_identifier(tag)?;
                    object_type = Some(ot);
                    instance = Some(inst);
                }
                81 => {} // property-identifier, implied LogBuffer for this decode
                83 => result_flags = Some(util::decode_result_flags(tag)?),
                84 => item_count = Some(tag::decode_unsigned(tag)?),
                key => log::warn!("ReadRange log-buffer ack: unrecognized context key {}", key),
            }
            Ok(())
        }
        WalkEvent::Application(tag) => {
            let value = tag::decode_value(tag)?;
            match pending_timestamp.take() {
                Some(timestamp) => records.push(LogRecord { timestamp, value }),
                None => pending_timestamp = Some(value),
            }
            Ok(())
        }
    })?;
    Ok(LogBufferAck {
        object_type: object_type.ok_or(ServiceError::WrongObjectCount { expected: "object-identifier", got: 0 })?,
        instance: instance.unwrap_or(0),
        property_id: PropertyIdentifier::LogBuffer as u16,
        result_flags: result_flags.unwrap_or_default(),
        item_count: item_count.unwrap_or(0),
        records,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::ObjectType;

    #[test]
    fn request_without_range_round_trips() {
        let env = new_request(ObjectType::TrendLog as u16, 1, PropertyIdentifier::LogBuffer as u16, None, 1).unwrap();
        let bytes = env.marshal().unwrap();
        let parsed = Envelope::unmarshal(&bytes).unwrap();
        let decoded = decode_request(&parsed).unwrap();
        assert_eq!(decoded.range, None);
    }

    #[test]
    fn request_with_range_round_trips() {
        let range = Range { index: 1, count: 10 };
        let env =
            new_request(ObjectType::TrendLog as u16, 1, PropertyIdentifier::LogBuffer as u16, Some(range), 1).unwrap();
        let bytes = env.marshal().unwrap();
        let parsed = Envelope::unmarshal(&bytes).unwrap();
        let decoded = decode_request(&parsed).unwrap();
        assert_eq!(decoded.range, Some(range));
    }

    #[test]
    fn unsupported_property_rejected() {
        let err = new_request(ObjectType::TrendLog as u16, 1, PropertyIdentifier::ObjectName as u16, None, 1);
        assert!(err.is_err());
    }

    #[cfg(feature = "std")]
    #[test]
    fn log_buffer_ack_round_trips_with_date_time_timestamp() {
        let (date, time) = tag::now_date_time();
        let records = vec![LogRecord { timestamp: date, value: Value::Real(19.0) }, LogRecord { timestamp: time, value: Value::Real(20.0) }];
        let env = new_log_buffer_ack(ObjectType::TrendLog as u16, 1, [true, true, false], &records, 3).unwrap();
        let bytes = env.marshal().unwrap();
        let parsed = Envelope::unmarshal(&bytes).unwrap();
        let decoded = decode_log_buffer_ack(&parsed).unwrap();
        assert_eq!(decoded.records.len(), 2);
        assert!(matches!(decoded.records[0].timestamp, Value::Date { .. }));
        assert!(matches!(decoded.records[1].timestamp, Value::Time { .. }));
    }

    #[test]
    fn log_buffer_ack_round_trips() {
        let records = vec![LogRecord { timestamp: Value::UnsignedInt(1000), value: Value::Real(23.5) }];
        let env = new_log_buffer_ack(ObjectType::TrendLog as u16, 1, [true, true, false], &records, 3).unwrap();
        let bytes = env.marshal().unwrap();
        let parsed = Envelope::unmarshal(&bytes).unwrap();
        let decoded = decode_log_buffer_ack(&parsed).unwrap();
        assert_eq!(decoded.item_count, 1);
        assert!(decoded.result_flags.first_item);
        assert!(decoded.result_flags.last_item);
        assert_eq!(decoded.records.len(), 1);
        assert_eq!(decoded.records[0].value, Value::Real(23.5));
    }
}
