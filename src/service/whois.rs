//! Who-Is: unconfirmed broadcast device discovery, with an optional device
//! instance-range restriction. Grounded on the Go original's `encoding.go`
//! `NewWhois`/`NewWhoisRange` constructors.

#[cfg(not(feature = "std"))]
use alloc::vec;

use crate::apdu::Apdu;
use crate::bvlc::{Bvlc, BvlcFunction};
use crate::error::Result;
use crate::npdu::Npdu;
use crate::tag;

use super::{walk_tag_stream, Envelope, UnconfirmedServiceChoice, WalkEvent};

/// A decoded Who-Is request. `None` limits mean "any device".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WhoIsDecoded {
    pub low_limit: Option<u32>,
    pub high_limit: Option<u32>,
}

/// Build an unrestricted, broadcast Who-Is.
pub fn new() -> Envelope {
    let mut env = Envelope {
        bvlc: Bvlc::new(BvlcFunction::Broadcast),
        npdu: Npdu::new(false, false, false, false),
        apdu: Apdu::UnconfirmedRequest { service_choice: UnconfirmedServiceChoice::WhoIs as u8, objects: vec![] },
    };
    env.set_length();
    env
}

/// Build a Who-Is restricted to `[low, high]` device instance numbers.
pub fn new_ranged(low: u32, high: u32) -> Result<Envelope> {
    let objects = vec![tag::encode_unsigned(low)?, tag::encode_unsigned(high)?];
    let mut env = Envelope {
        bvlc: Bvlc::new(BvlcFunction::Broadcast),
        npdu: Npdu::new(false, false, false, false),
        apdu: Apdu::UnconfirmedRequest { service_choice: UnconfirmedServiceChoice::WhoIs as u8, objects },
    };
    env.set_length();
    Ok(env)
}

/// Decode a Who-Is request's object list.
pub fn decode(envelope: &Envelope) -> Result<WhoIsDecoded> {
    let mut decoded = WhoIsDecoded::default();
    let mut first = true;
    walk_tag_stream(envelope.apdu.objects(), |event| {
        if let WalkEvent::Application(t) = event {
            let value = tag::decode_unsigned(t)?;
            if first {
                decoded.low_limit = Some(value);
                first = false;
            } else {
                decoded.high_limit = Some(value);
            }
        }
        Ok(())
    })?;
    Ok(decoded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unrestricted_whois_has_no_objects() {
        let env = new();
        assert!(env.apdu.objects().is_empty());
        assert_eq!(env.apdu.service_choice(), Some(8));
    }

    #[test]
    fn ranged_whois_round_trips() {
        let env = new_ranged(100, 200).unwrap();
        let bytes = env.marshal().unwrap();
        let parsed = Envelope::unmarshal(&bytes).unwrap();
        let decoded = decode(&parsed).unwrap();
        assert_eq!(decoded.low_limit, Some(100));
        assert_eq!(decoded.high_limit, Some(200));
    }

    #[test]
    fn unrestricted_decode_has_no_limits() {
        let env = new();
        let decoded = decode(&env).unwrap();
        assert_eq!(decoded, WhoIsDecoded::default());
    }
}
