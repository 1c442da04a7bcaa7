//! SubscribeCOV: confirmed request to subscribe to (or cancel) Change-of-Value
//! notifications for an object. Not present in `original_source/`; designed
//! directly from ASHRAE 135 clause 13.14's `SubscribeCOV-Request` field layout,
//! in the same context-tag-per-argument style as `services/rp.go`/`wp.go`.

#[cfg(not(feature = "std"))]
use alloc::vec;

use crate::apdu::Apdu;
use crate::bvlc::{Bvlc, BvlcFunction};
use crate::error::{Result, ServiceError};
use crate::npdu::Npdu;
use crate::tag;
use crate::util::combine;

use super::{walk_tag_stream, ConfirmedServiceChoice, Envelope, WalkEvent};

/// A decoded SubscribeCOV request. `confirmed`/`lifetime` are absent on a
/// cancellation (the subscriber sends only `subscriber_process_id` and the
/// monitored object).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscribeCovRequest {
    pub subscriber_process_id: u32,
    pub object_type: u16,
    pub instance: u32,
    pub confirmed: Option<bool>,
    pub lifetime: Option<u32>,
}

impl SubscribeCovRequest {
    pub fn is_cancellation(&self) -> bool {
        self.confirmed.is_none() && self.lifetime.is_none()
    }
}

/// Build a SubscribeCOV confirmed request. `confirmed_notifications`/`lifetime`
/// are `None` to request cancellation of an existing subscription.
pub fn new_request(
    subscriber_process_id: u32,
    object_type: u16,
    instance: u32,
    confirmed_notifications: Option<bool>,
    lifetime: Option<u32>,
    invoke_id: u8,
) -> Result<Envelope> {
    let mut objects = vec![
        tag::encode_context_unsigned(0, subscriber_process_id)?,
        tag::encode_object_identifier(Some(1), object_type, instance)?,
    ];
    if let Some(confirmed) = confirmed_notifications {
        objects.push(tag::Tag::context_boolean(2, confirmed));
    }
    if let Some(lifetime) = lifetime {
        objects.push(tag::encode_context_unsigned(3, lifetime)?);
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
            service_choice: ConfirmedServiceChoice::SubscribeCov as u8,
            objects,
        },
    };
    env.set_length();
    Ok(env)
}

/// Decode a SubscribeCOV request.
pub fn decode_request(envelope: &Envelope) -> Result<SubscribeCovRequest> {
    let mut subscriber_process_id = None;
    let mut object_type = None;
    let mut instance = None;
    let mut confirmed = None;
    let mut lifetime = None;
    walk_tag_stream(envelope.apdu.objects(), |event| {
        if let WalkEvent::Context { top, tag } = event {
            match combine(top, tag.number) {
                80 => subscriber_process_id = Some(tag::decode_unsigned(tag)?),
                81 => {
                    let (ot, inst) = tag::decode_object_identifier(tag)?;
                    object_type = Some(ot);
                    instance = Some(inst);
                }
                82 => confirmed = Some(tag::decode_context_boolean(tag)?),
                83 => lifetime = Some(tag::decode_unsigned(tag)?),
                key => log::warn!("SubscribeCOV request: unrecognized context key {}", key),
            }
        }
        Ok(())
    })?;
    Ok(SubscribeCovRequest {
        subscriber_process_id: subscriber_process_id
            .ok_or(ServiceError::WrongObjectCount { expected: "subscriber-process-identifier", got: 0 })?,
        object_type: object_type.ok_or(ServiceError::WrongObjectCount { expected: "object-identifier", got: 0 })?,
        instance: instance.unwrap_or(0),
        confirmed,
        lifetime,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::ObjectType;

    #[test]
    fn subscribe_round_trips() {
        let env = new_request(1, ObjectType::AnalogInput as u16, 1, Some(true), Some(300), 7).unwrap();
        let bytes = env.marshal().unwrap();
        let parsed = Envelope::unmarshal(&bytes).unwrap();
        let decoded = decode_request(&parsed).unwrap();
        assert_eq!(decoded.subscriber_process_id, 1);
        assert_eq!(decoded.confirmed, Some(true));
        assert_eq!(decoded.lifetime, Some(300));
        assert!(!decoded.is_cancellation());
    }

    #[test]
    fn cancellation_omits_confirmed_and_lifetime() {
        let env = new_request(1, ObjectType::AnalogInput as u16, 1, None, None, 7).unwrap();
        let bytes = env.marshal().unwrap();
        let parsed = Envelope::unmarshal(&bytes).unwrap();
        let decoded = decode_request(&parsed).unwrap();
        assert!(decoded.is_cancellation());
    }
}
