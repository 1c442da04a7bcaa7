//! BACnet application-layer services.
//!
//! Each service owns: a constructor that builds the `(BVLC, NPDU, APDU)`
//! envelope triple (an [`Envelope`]), and a `decode()` free function that walks
//! the APDU's object list into a typed decoded view using the shared
//! context-stack algorithm in [`walk_tag_stream`]. Grounded on the Go
//! original's `services` package (one file per service family) and on the host
//! crate's `service::mod.rs` service-choice enums, narrowed to the service set
//! this codec supports.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

pub mod acks;
pub mod dispatch;
pub mod iam;
pub mod read_property;
pub mod read_property_multiple;
pub mod read_range;
pub mod subscribe_cov;
pub mod whois;
pub mod write_property;

pub use dispatch::{parse, Message};

use crate::apdu::Apdu;
use crate::bvlc::Bvlc;
use crate::error::{Result, ServiceError};
use crate::npdu::Npdu;
use crate::tag::TagClass;
use crate::tag::Tag;

/// Confirmed service choice codes this crate constructs or decodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ConfirmedServiceChoice {
    SubscribeCov = 5,
    ReadProperty = 12,
    ReadPropertyMultiple = 14,
    WriteProperty = 15,
    ReadRange = 26,
}

/// Unconfirmed service choice codes this crate constructs or decodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum UnconfirmedServiceChoice {
    IAm = 0,
    WhoIs = 8,
}

/// The shared `(BVLC, NPDU, APDU)` triple every service message wraps.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub bvlc: Bvlc,
    pub npdu: Npdu,
    pub apdu: Apdu,
}

impl Envelope {
    pub fn marshal_len(&self) -> usize {
        self.bvlc.marshal_len() + self.npdu.marshal_len() + self.apdu.marshal_len()
    }

    /// Re-stamp `bvlc.length` to the full marshalled length of this message.
    pub fn set_length(&mut self) {
        self.bvlc.length = self.marshal_len() as u16;
    }

    pub fn marshal(&self) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; self.marshal_len()];
        self.bvlc.marshal_to(&mut buf[0..self.bvlc.marshal_len()])?;
        let npdu_start = self.bvlc.marshal_len();
        let npdu_end = npdu_start + self.npdu.marshal_len();
        self.npdu.marshal_to(&mut buf[npdu_start..npdu_end])?;
        buf[npdu_end..].copy_from_slice(&self.apdu.marshal());
        Ok(buf)
    }

    pub fn unmarshal(buf: &[u8]) -> Result<Envelope> {
        let (bvlc, consumed) = Bvlc::unmarshal(buf)?;
        let (npdu, npdu_len) = Npdu::unmarshal(&buf[consumed..])?;
        let apdu = Apdu::unmarshal(&buf[consumed + npdu_len..])?;
        Ok(Envelope { bvlc, npdu, apdu })
    }
}

/// One step of a tag-stream walk: either a context-tagged value (with the
/// context-stack top it was found under) or an application-tagged value.
pub enum WalkEvent<'a> {
    Context { top: u8, tag: &'a Tag },
    Application(&'a Tag),
}

/// Walk a service's object list with the context stack described in the
/// tag-stream decode algorithm: brackets push/pop the stack (initialized with
/// the sentinel `8`), and every other tag is handed to `f` tagged with whether
/// it's context- or application-class.
pub fn walk_tag_stream<'a>(objects: &'a [Tag], mut f: impl FnMut(WalkEvent<'a>) -> Result<()>) -> Result<()> {
    let mut context: Vec<u8> = vec![8];
    for tag in objects {
        if tag.is_opening() {
            context.push(tag.number);
            continue;
        }
        if tag.is_closing() {
            if context.is_empty() {
                return Err(ServiceError::MismatchedClosingTag.into());
            }
            context.pop();
            continue;
        }
        match tag.class {
            TagClass::Context => {
                let top = *context.last().ok_or(ServiceError::MismatchedClosingTag)?;
                f(WalkEvent::Context { top, tag })?;
            }
            TagClass::Application => f(WalkEvent::Application(tag))?,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bvlc::BvlcFunction;

    #[test]
    fn envelope_set_length_matches_marshal_len() {
        let mut env = Envelope {
            bvlc: Bvlc::new(BvlcFunction::Broadcast),
            npdu: Npdu::new(false, false, false, false),
            apdu: Apdu::UnconfirmedRequest { service_choice: 8, objects: vec![] },
        };
        env.set_length();
        assert_eq!(env.bvlc.length as usize, env.marshal_len());
        assert_eq!(env.marshal_len(), env.marshal().unwrap().len());
    }

    #[test]
    fn walk_reports_balanced_brackets() {
        let objects = vec![Tag::opening(3), Tag::application_boolean(true), Tag::closing(3)];
        let mut seen_app = 0;
        walk_tag_stream(&objects, |event| {
            if let WalkEvent::Application(_) = event {
                seen_app += 1;
            }
            Ok(())
        })
        .unwrap();
        assert_eq!(seen_app, 1);
    }

    #[test]
    fn walk_rejects_mismatched_closing_tag() {
        let objects = vec![Tag::closing(3)];
        let result = walk_tag_stream(&objects, |_| Ok(()));
        assert!(result.is_err());
    }
}
