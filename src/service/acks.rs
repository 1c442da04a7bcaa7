//! SimpleACK, a generic ComplexACK, and Error replies not tied to a specific
//! request shape. Grounded on the Go original's `services/cack-rr.go` generic
//! ComplexACK object list and the BACnet `Error-PDU` (error-class,
//! error-code) pair used by every confirmed service's negative reply.

#[cfg(not(feature = "std"))]
use alloc::{vec, vec::Vec};

use crate::apdu::Apdu;
use crate::bvlc::{Bvlc, BvlcFunction};
use crate::error::Result;
use crate::npdu::Npdu;
use crate::tag::{self, Tag, Value};

use super::Envelope;

/// A decoded SimpleACK.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimpleAck {
    pub invoke_id: u8,
    pub service_choice: u8,
}

/// Build a SimpleACK reply.
pub fn new_simple_ack(service_choice: u8, invoke_id: u8) -> Envelope {
    let mut env = Envelope {
        bvlc: Bvlc::new(BvlcFunction::Unicast),
        npdu: Npdu::new(false, false, false, false),
        apdu: Apdu::SimpleAck { invoke_id, service_choice },
    };
    env.set_length();
    env
}

/// Decode a SimpleACK.
pub fn decode_simple_ack(envelope: &Envelope) -> Result<SimpleAck> {
    match &envelope.apdu {
        Apdu::SimpleAck { invoke_id, service_choice } => Ok(SimpleAck { invoke_id: *invoke_id, service_choice: *service_choice }),
        _ => Err(crate::error::ServiceError::WrongObjectCount { expected: "SimpleACK PDU", got: 0 }.into()),
    }
}

/// A decoded generic ComplexACK: every application-tagged value found in the
/// object list, at any bracket depth, without assuming a particular service's
/// field layout.
#[derive(Debug, Clone, PartialEq)]
pub struct ComplexAckValues {
    pub invoke_id: u8,
    pub service_choice: u8,
    pub values: Vec<Value>,
}

/// Build a generic ComplexACK carrying `values` as a flat application-tagged
/// list (no context wrapper) under `service_choice`.
pub fn new_complex_ack(service_choice: u8, invoke_id: u8, values: Vec<Tag>) -> Envelope {
    let mut env = Envelope {
        bvlc: Bvlc::new(BvlcFunction::Unicast),
        npdu: Npdu::new(false, false, false, false),
        apdu: Apdu::ComplexAck {
            segmented: false,
            more_follows: false,
            invoke_id,
            sequence_number: None,
            proposed_window_size: None,
            service_choice,
            objects: values,
        },
    };
    env.set_length();
    env
}

/// Decode a generic ComplexACK's application-tagged values, ignoring any
/// context-tagged framing (service-specific ACKs like ReadProperty's should
/// use their own typed `decode_ack`).
pub fn decode_complex_ack(envelope: &Envelope) -> Result<ComplexAckValues> {
    let (invoke_id, service_choice) = match &envelope.apdu {
        Apdu::ComplexAck { invoke_id, service_choice, .. } => (*invoke_id, *service_choice),
        _ => return Err(crate::error::ServiceError::WrongObjectCount { expected: "ComplexACK PDU", got: 0 }.into()),
    };
    let mut values = Vec::new();
    super::walk_tag_stream(envelope.apdu.objects(), |event| {
        if let super::WalkEvent::Application(tag) = event {
            values.push(tag::decode_value(tag)?);
        }
        Ok(())
    })?;
    Ok(ComplexAckValues { invoke_id, service_choice, values })
}

/// A decoded BACnet Error-PDU.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorPdu {
    pub invoke_id: u8,
    pub service_choice: u8,
    pub error_class: u32,
    pub error_code: u32,
}

/// Build an Error-PDU reply.
pub fn new_error(service_choice: u8, invoke_id: u8, error_class: u32, error_code: u32) -> Result<Envelope> {
    let objects = vec![tag::encode_enumerated(error_class)?, tag::encode_enumerated(error_code)?];
    let mut env = Envelope {
        bvlc: Bvlc::new(BvlcFunction::Unicast),
        npdu: Npdu::new(false, false, false, false),
        apdu: Apdu::Error { invoke_id, service_choice, objects },
    };
    env.set_length();
    Ok(env)
}

/// Decode an Error-PDU's two enumerated objects.
pub fn decode_error(envelope: &Envelope) -> Result<ErrorPdu> {
    let (invoke_id, service_choice) = match &envelope.apdu {
        Apdu::Error { invoke_id, service_choice, .. } => (*invoke_id, *service_choice),
        _ => return Err(crate::error::ServiceError::WrongObjectCount { expected: "Error PDU", got: 0 }.into()),
    };
    let objects = envelope.apdu.objects();
    if objects.len() != 2 {
        return Err(crate::error::ServiceError::WrongObjectCount { expected: "2", got: objects.len() }.into());
    }
    let error_class = tag::decode_enumerated(&objects[0])?;
    let error_code = tag::decode_enumerated(&objects[1])?;
    Ok(ErrorPdu { invoke_id, service_choice, error_class, error_code })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_ack_round_trips() {
        let env = new_simple_ack(15, 9);
        let bytes = env.marshal().unwrap();
        let parsed = Envelope::unmarshal(&bytes).unwrap();
        let decoded = decode_simple_ack(&parsed).unwrap();
        assert_eq!(decoded.invoke_id, 9);
        assert_eq!(decoded.service_choice, 15);
    }

    #[test]
    fn complex_ack_carries_flat_values() {
        let env = new_complex_ack(12, 3, vec![tag::encode_real(23.5).unwrap()]);
        let bytes = env.marshal().unwrap();
        let parsed = Envelope::unmarshal(&bytes).unwrap();
        let decoded = decode_complex_ack(&parsed).unwrap();
        assert_eq!(decoded.values, vec![Value::Real(23.5)]);
    }

    #[test]
    fn error_pdu_round_trips() {
        let env = new_error(12, 3, 1, 31).unwrap();
        let bytes = env.marshal().unwrap();
        let parsed = Envelope::unmarshal(&bytes).unwrap();
        let decoded = decode_error(&parsed).unwrap();
        assert_eq!(decoded.error_class, 1);
        assert_eq!(decoded.error_code, 31);
    }
}
