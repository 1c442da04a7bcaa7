//! APDU (Application Protocol Data Unit) envelope.
//!
//! Carries the PDU-type discriminator, transaction-control flags, invoke-id,
//! service choice, and the ordered tag stream forming the service payload.
//! Grounded on the host crate's `app::Apdu` enum shape (one variant per
//! PDU-type) and on the `plumbing.APDU`/`ConfirmedReq`/`UnConfirmedReq` pattern
//! in the Go implementation this crate generalizes, with the raw object list
//! kept on every ACK/Error/request variant so a service's `decode()` can walk
//! it with the context-stack algorithm in [`crate::service`].

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use crate::error::{ApduError, Result};
use crate::tag::Tag;

/// PDU-type discriminator (top nibble of the first APDU byte).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PduType {
    ConfirmedRequest = 0,
    UnconfirmedRequest = 1,
    SimpleAck = 2,
    ComplexAck = 3,
    SegmentAck = 4,
    Error = 5,
    Reject = 6,
    Abort = 7,
}

impl TryFrom<u8> for PduType {
    type Error = ApduError;

    fn try_from(value: u8) -> core::result::Result<Self, Self::Error> {
        match value {
            0 => Ok(PduType::ConfirmedRequest),
            1 => Ok(PduType::UnconfirmedRequest),
            2 => Ok(PduType::SimpleAck),
            3 => Ok(PduType::ComplexAck),
            4 => Ok(PduType::SegmentAck),
            5 => Ok(PduType::Error),
            6 => Ok(PduType::Reject),
            7 => Ok(PduType::Abort),
            other => Err(ApduError::UnknownPduType(other)),
        }
    }
}

/// An Application Protocol Data Unit.
#[derive(Debug, Clone, PartialEq)]
pub enum Apdu {
    ConfirmedRequest {
        segmented: bool,
        more_follows: bool,
        segmented_response_accepted: bool,
        max_segments: u8,
        max_response_size: u8,
        invoke_id: u8,
        sequence_number: Option<u8>,
        proposed_window_size: Option<u8>,
        service_choice: u8,
        objects: Vec<Tag>,
    },
    UnconfirmedRequest {
        service_choice: u8,
        objects: Vec<Tag>,
    },
    SimpleAck {
        invoke_id: u8,
        service_choice: u8,
    },
    ComplexAck {
        segmented: bool,
        more_follows: bool,
        invoke_id: u8,
        sequence_number: Option<u8>,
        proposed_window_size: Option<u8>,
        service_choice: u8,
        objects: Vec<Tag>,
    },
    SegmentAck {
        negative: bool,
        server: bool,
        invoke_id: u8,
        sequence_number: u8,
        window_size: u8,
    },
    Error {
        invoke_id: u8,
        service_choice: u8,
        objects: Vec<Tag>,
    },
    Reject {
        invoke_id: u8,
        reason: u8,
    },
    Abort {
        server: bool,
        invoke_id: u8,
        reason: u8,
    },
}

impl Apdu {
    pub fn pdu_type(&self) -> PduType {
        match self {
            Apdu::ConfirmedRequest { .. } => PduType::ConfirmedRequest,
            Apdu::UnconfirmedRequest { .. } => PduType::UnconfirmedRequest,
            Apdu::SimpleAck { .. } => PduType::SimpleAck,
            Apdu::ComplexAck { .. } => PduType::ComplexAck,
            Apdu::SegmentAck { .. } => PduType::SegmentAck,
            Apdu::Error { .. } => PduType::Error,
            Apdu::Reject { .. } => PduType::Reject,
            Apdu::Abort { .. } => PduType::Abort,
        }
    }

    /// Service choice, when this variant carries one.
    pub fn service_choice(&self) -> Option<u8> {
        match self {
            Apdu::ConfirmedRequest { service_choice, .. }
            | Apdu::UnconfirmedRequest { service_choice, .. }
            | Apdu::SimpleAck { service_choice, .. }
            | Apdu::ComplexAck { service_choice, .. }
            | Apdu::Error { service_choice, .. } => Some(*service_choice),
            Apdu::SegmentAck { .. } | Apdu::Reject { .. } | Apdu::Abort { .. } => None,
        }
    }

    pub fn invoke_id(&self) -> Option<u8> {
        match self {
            Apdu::ConfirmedRequest { invoke_id, .. }
            | Apdu::SimpleAck { invoke_id, .. }
            | Apdu::ComplexAck { invoke_id, .. }
            | Apdu::SegmentAck { invoke_id, .. }
            | Apdu::Error { invoke_id, .. }
            | Apdu::Reject { invoke_id, .. }
            | Apdu::Abort { invoke_id, .. } => Some(*invoke_id),
            Apdu::UnconfirmedRequest { .. } => None,
        }
    }

    /// The raw object list, for variants that carry a service payload.
    pub fn objects(&self) -> &[Tag] {
        match self {
            Apdu::ConfirmedRequest { objects, .. }
            | Apdu::UnconfirmedRequest { objects, .. }
            | Apdu::ComplexAck { objects, .. }
            | Apdu::Error { objects, .. } => objects,
            Apdu::SimpleAck { .. } | Apdu::SegmentAck { .. } | Apdu::Reject { .. } | Apdu::Abort { .. } => &[],
        }
    }

    fn objects_len(objects: &[Tag]) -> usize {
        objects.iter().map(Tag::marshal_len).sum()
    }

    pub fn marshal_len(&self) -> usize {
        match self {
            Apdu::ConfirmedRequest { sequence_number, objects, .. } => {
                3 + sequence_number.map_or(0, |_| 2) + 1 + Self::objects_len(objects)
            }
            Apdu::UnconfirmedRequest { objects, .. } => 1 + Self::objects_len(objects),
            Apdu::SimpleAck { .. } => 3,
            Apdu::ComplexAck { sequence_number, objects, .. } => {
                2 + sequence_number.map_or(0, |_| 2) + 1 + Self::objects_len(objects)
            }
            Apdu::SegmentAck { .. } => 4,
            Apdu::Error { objects, .. } => 3 + Self::objects_len(objects),
            Apdu::Reject { .. } => 2,
            Apdu::Abort { .. } => 2,
        }
    }

    pub fn marshal(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.marshal_len());
        match self {
            Apdu::ConfirmedRequest {
                segmented,
                more_follows,
                segmented_response_accepted,
                max_segments,
                max_response_size,
                invoke_id,
                sequence_number,
                proposed_window_size,
                service_choice,
                objects,
            } => {
                let mut b0 = (PduType::ConfirmedRequest as u8) << 4;
                if *segmented {
                    b0 |= 0x08;
                }
                if *more_follows {
                    b0 |= 0x04;
                }
                if *segmented_response_accepted {
                    b0 |= 0x02;
                }
                buf.push(b0);
                buf.push((max_segments << 4) | (max_response_size & 0x0F));
                buf.push(*invoke_id);
                if let Some(seq) = sequence_number {
                    buf.push(*seq);
                    buf.push(proposed_window_size.unwrap_or(0));
                }
                buf.push(*service_choice);
                for tag in objects {
                    buf.extend(tag.marshal());
                }
            }
            Apdu::UnconfirmedRequest { service_choice, objects } => {
                buf.push((PduType::UnconfirmedRequest as u8) << 4);
                buf.push(*service_choice);
                for tag in objects {
                    buf.extend(tag.marshal());
                }
            }
            Apdu::SimpleAck { invoke_id, service_choice } => {
                buf.push((PduType::SimpleAck as u8) << 4);
                buf.push(*invoke_id);
                buf.push(*service_choice);
            }
            Apdu::ComplexAck { segmented, more_follows, invoke_id, sequence_number, proposed_window_size, service_choice, objects } => {
                let mut b0 = (PduType::ComplexAck as u8) << 4;
                if *segmented {
                    b0 |= 0x08;
                }
                if *more_follows {
                    b0 |= 0x04;
                }
                buf.push(b0);
                buf.push(*invoke_id);
                if let Some(seq) = sequence_number {
                    buf.push(*seq);
                    buf.push(proposed_window_size.unwrap_or(0));
                }
                buf.push(*service_choice);
                for tag in objects {
                    buf.extend(tag.marshal());
                }
            }
            Apdu::SegmentAck { negative, server, invoke_id, sequence_number, window_size } => {
                let mut b0 = (PduType::SegmentAck as u8) << 4;
                if *negative {
                    b0 |= 0x02;
                }
                if *server {
                    b0 |= 0x01;
                }
                buf.push(b0);
                buf.push(*invoke_id);
                buf.push(*sequence_number);
                buf.push(*window_size);
            }
            Apdu::Error { invoke_id, service_choice, objects } => {
                buf.push((PduType::Error as u8) << 4);
                buf.push(*invoke_id);
                buf.push(*service_choice);
                for tag in objects {
                    buf.extend(tag.marshal());
                }
            }
            Apdu::Reject { invoke_id, reason } => {
                buf.push((PduType::Reject as u8) << 4);
                buf.push(*invoke_id);
                buf.push(*reason);
            }
            Apdu::Abort { server, invoke_id, reason } => {
                let mut b0 = (PduType::Abort as u8) << 4;
                if *server {
                    b0 |= 0x01;
                }
                buf.push(b0);
                buf.push(*invoke_id);
                buf.push(*reason);
            }
        }
        buf
    }

    /// Parse a full APDU, consuming the rest of `buf` as a greedily-decoded tag
    /// stream wherever the PDU-type carries a service payload.
    pub fn unmarshal(buf: &[u8]) -> Result<Apdu> {
        if buf.is_empty() {
            return Err(ApduError::TooShortToParse.into());
        }
        let b0 = buf[0];
        let pdu_type = PduType::try_from(b0 >> 4)?;

        let apdu = match pdu_type {
            PduType::ConfirmedRequest => {
                if buf.len() < 4 {
                    return Err(ApduError::TooShortToParse.into());
                }
                let segmented = b0 & 0x08 != 0;
                let more_follows = b0 & 0x04 != 0;
                let segmented_response_accepted = b0 & 0x02 != 0;
                let max_segments = buf[1] >> 4;
                let max_response_size = buf[1] & 0x0F;
                let invoke_id = buf[2];
                let mut offset = 3;
                let (sequence_number, proposed_window_size) = if segmented {
                    if buf.len() < offset + 2 {
                        return Err(ApduError::TooShortToParse.into());
                    }
                    let s = buf[offset];
                    let w = buf[offset + 1];
                    offset += 2;
                    (Some(s), Some(w))
                } else {
                    (None, None)
                };
                if buf.len() < offset + 1 {
                    return Err(ApduError::TooShortToParse.into());
                }
                let service_choice = buf[offset];
                offset += 1;
                let objects = parse_tag_stream(&buf[offset..])?;
                Apdu::ConfirmedRequest {
                    segmented,
                    more_follows,
                    segmented_response_accepted,
                    max_segments,
                    max_response_size,
                    invoke_id,
                    sequence_number,
                    proposed_window_size,
                    service_choice,
                    objects,
                }
            }
            PduType::UnconfirmedRequest => {
                if buf.len() < 2 {
                    return Err(ApduError::TooShortToParse.into());
                }
                let service_choice = buf[1];
                let objects = parse_tag_stream(&buf[2..])?;
                Apdu::UnconfirmedRequest { service_choice, objects }
            }
            PduType::SimpleAck => {
                if buf.len() < 3 {
                    return Err(ApduError::TooShortToParse.into());
                }
                Apdu::SimpleAck { invoke_id: buf[1], service_choice: buf[2] }
            }
            PduType::ComplexAck => {
                if buf.len() < 3 {
                    return Err(ApduError::TooShortToParse.into());
                }
                let segmented = b0 & 0x08 != 0;
                let more_follows = b0 & 0x04 != 0;
                let invoke_id = buf[1];
                let mut offset = 2;
                let (sequence_number, proposed_window_size) = if segmented {
                    if buf.len() < offset + 2 {
                        return Err(ApduError::TooShortToParse.into());
                    }
                    let s = buf[offset];
                    let w = buf[offset + 1];
                    offset += 2;
                    (Some(s), Some(w))
                } else {
                    (None, None)
                };
                if buf.len() < offset + 1 {
                    return Err(ApduError::TooShortToParse.into());
                }
                let service_choice = buf[offset];
                offset += 1;
                let objects = parse_tag_stream(&buf[offset..])?;
                Apdu::ComplexAck { segmented, more_follows, invoke_id, sequence_number, proposed_window_size, service_choice, objects }
            }
            PduType::SegmentAck => {
                if buf.len() < 4 {
                    return Err(ApduError::TooShortToParse.into());
                }
                Apdu::SegmentAck {
                    negative: b0 & 0x02 != 0,
                    server: b0 & 0x01 != 0,
                    invoke_id: buf[1],
                    sequence_number: buf[2],
                    window_size: buf[3],
                }
            }
            PduType::Error => {
                if buf.len() < 3 {
                    return Err(ApduError::TooShortToParse.into());
                }
                let invoke_id = buf[1];
                let service_choice = buf[2];
                let objects = parse_tag_stream(&buf[3..])?;
                Apdu::Error { invoke_id, service_choice, objects }
            }
            PduType::Reject => {
                if buf.len() < 3 {
                    return Err(ApduError::TooShortToParse.into());
                }
                Apdu::Reject { invoke_id: buf[1], reason: buf[2] }
            }
            PduType::Abort => {
                if buf.len() < 3 {
                    return Err(ApduError::TooShortToParse.into());
                }
                Apdu::Abort { server: b0 & 0x01 != 0, invoke_id: buf[1], reason: buf[2] }
            }
        };
        Ok(apdu)
    }
}

/// Greedily consume `buf` as a sequence of tags until exhausted.
pub fn parse_tag_stream(buf: &[u8]) -> Result<Vec<Tag>> {
    let mut objects = Vec::new();
    let mut offset = 0;
    while offset < buf.len() {
        let (tag, consumed) = Tag::unmarshal(&buf[offset..])?;
        objects.push(tag);
        offset += consumed;
    }
    Ok(objects)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tag;

    #[test]
    fn whois_unconfirmed_round_trips() {
        let apdu = Apdu::UnconfirmedRequest { service_choice: 0x08, objects: vec![] };
        let bytes = apdu.marshal();
        assert_eq!(bytes, vec![0x10, 0x08]);
        let parsed = Apdu::unmarshal(&bytes).unwrap();
        assert_eq!(parsed, apdu);
    }

    #[test]
    fn confirmed_request_round_trips_with_objects() {
        let objects = vec![
            tag::encode_object_identifier(Some(0), 0, 1).unwrap(),
            tag::encode_context_unsigned(1, 85).unwrap(),
        ];
        let apdu = Apdu::ConfirmedRequest {
            segmented: false,
            more_follows: false,
            segmented_response_accepted: true,
            max_segments: 0,
            max_response_size: 5,
            invoke_id: 1,
            sequence_number: None,
            proposed_window_size: None,
            service_choice: 12,
            objects,
        };
        let bytes = apdu.marshal();
        let parsed = Apdu::unmarshal(&bytes).unwrap();
        assert_eq!(parsed, apdu);
    }

    #[test]
    fn error_pdu_round_trips() {
        let objects = vec![tag::encode_enumerated(1).unwrap(), tag::encode_enumerated(31).unwrap()];
        let apdu = Apdu::Error { invoke_id: 1, service_choice: 12, objects };
        let bytes = apdu.marshal();
        assert_eq!(bytes[0] >> 4, PduType::Error as u8);
        let parsed = Apdu::unmarshal(&bytes).unwrap();
        assert_eq!(parsed, apdu);
    }
}
