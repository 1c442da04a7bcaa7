//! Top-level message dispatch: parse a raw BACnet/IP datagram into the
//! `(BVLC, NPDU, APDU)` envelope and classify it by `(pdu-type, service-choice)`
//! into a typed [`Message`] variant. Grounded on the host crate's top-level
//! `Client`/`decode` entry points, narrowed to a pure parse-and-classify
//! function (no socket I/O, an explicit Non-goal of this crate).

use crate::apdu::PduType;
use crate::error::{Result, ServiceError};

use super::{ConfirmedServiceChoice, Envelope, UnconfirmedServiceChoice};

/// A classified, parsed BACnet/IP message. Each variant carries the envelope;
/// call the matching service module's `decode`/`decode_request`/`decode_ack`
/// to get a typed view of its payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    WhoIs(Envelope),
    IAm(Envelope),
    ReadPropertyRequest(Envelope),
    ReadPropertyAck(Envelope),
    ReadPropertyMultipleRequest(Envelope),
    ReadRangeRequest(Envelope),
    ReadRangeAck(Envelope),
    SubscribeCov(Envelope),
    WriteProperty(Envelope),
    SimpleAck(Envelope),
    ComplexAck(Envelope),
    Error(Envelope),
}

impl Message {
    /// The envelope every variant wraps.
    pub fn envelope(&self) -> &Envelope {
        match self {
            Message::WhoIs(e)
            | Message::IAm(e)
            | Message::ReadPropertyRequest(e)
            | Message::ReadPropertyAck(e)
            | Message::ReadPropertyMultipleRequest(e)
            | Message::ReadRangeRequest(e)
            | Message::ReadRangeAck(e)
            | Message::SubscribeCov(e)
            | Message::WriteProperty(e)
            | Message::SimpleAck(e)
            | Message::ComplexAck(e)
            | Message::Error(e) => e,
        }
    }
}

/// Parse and classify a raw datagram.
///
/// Requests are classified by `(ConfirmedRequest/UnconfirmedRequest,
/// service-choice)`; ComplexACK additionally splits on service-choice into
/// `ReadPropertyAck`/`ReadRangeAck` (both of which a caller will usually want
/// a typed decode of) versus a generic `ComplexAck` for anything else this
/// crate doesn't special-case.
pub fn parse(buf: &[u8]) -> Result<Message> {
    let envelope = Envelope::unmarshal(buf)?;
    let pdu_type = envelope.apdu.pdu_type();
    let service_choice = envelope.apdu.service_choice();

    let message = match (pdu_type, service_choice) {
        (PduType::UnconfirmedRequest, Some(s)) if s == UnconfirmedServiceChoice::WhoIs as u8 => Message::WhoIs(envelope),
        (PduType::UnconfirmedRequest, Some(s)) if s == UnconfirmedServiceChoice::IAm as u8 => Message::IAm(envelope),
        (PduType::ConfirmedRequest, Some(s)) if s == ConfirmedServiceChoice::ReadProperty as u8 => {
            Message::ReadPropertyRequest(envelope)
        }
        (PduType::ConfirmedRequest, Some(s)) if s == ConfirmedServiceChoice::ReadPropertyMultiple as u8 => {
            Message::ReadPropertyMultipleRequest(envelope)
        }
        (PduType::ConfirmedRequest, Some(s)) if s == ConfirmedServiceChoice::ReadRange as u8 => {
            Message::ReadRangeRequest(envelope)
        }
        (PduType::ConfirmedRequest, Some(s)) if s == ConfirmedServiceChoice::SubscribeCov as u8 => {
            Message::SubscribeCov(envelope)
        }
        (PduType::ConfirmedRequest, Some(s)) if s == ConfirmedServiceChoice::WriteProperty as u8 => {
            Message::WriteProperty(envelope)
        }
        (PduType::SimpleAck, Some(_)) => Message::SimpleAck(envelope),
        (PduType::ComplexAck, Some(s)) if s == ConfirmedServiceChoice::ReadProperty as u8 => {
            Message::ReadPropertyAck(envelope)
        }
        (PduType::ComplexAck, Some(s)) if s == ConfirmedServiceChoice::ReadRange as u8 => Message::ReadRangeAck(envelope),
        (PduType::ComplexAck, Some(_)) => Message::ComplexAck(envelope),
        (PduType::Error, Some(_)) => Message::Error(envelope),
        (_, service) => return Err(ServiceError::UnsupportedServiceChoice(service.unwrap_or(0xFF)).into()),
    };
    Ok(message)
}
