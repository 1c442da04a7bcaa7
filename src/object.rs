//! BACnet object-type and property-identifier constants.
//!
//! Only the subset referenced by the services in scope — the full object and
//! property registry is an explicit Non-goal. Grounded on the host crate's
//! `object::ObjectType`/`PropertyIdentifier` enums, trimmed to what WhoIs, IAm,
//! ReadProperty(Multiple), ReadRange, SubscribeCOV, and WriteProperty touch.

/// BACnet standard object types (ASHRAE 135 clause 12.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum ObjectType {
    AnalogInput = 0,
    AnalogOutput = 1,
    AnalogValue = 2,
    BinaryInput = 3,
    BinaryOutput = 4,
    BinaryValue = 5,
    Device = 8,
    MultiStateInput = 13,
    MultiStateOutput = 14,
    MultiStateValue = 19,
    TrendLog = 20,
}

/// BACnet standard property identifiers (ASHRAE 135 clause 21), limited to the
/// subset used by this crate's services.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum PropertyIdentifier {
    PresentValue = 85,
    ObjectIdentifier = 75,
    ObjectName = 77,
    ObjectType = 79,
    StatusFlags = 111,
    LogBuffer = 131,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn present_value_is_85() {
        assert_eq!(PropertyIdentifier::PresentValue as u16, 85);
    }

    #[test]
    fn log_buffer_is_131() {
        assert_eq!(PropertyIdentifier::LogBuffer as u16, 131);
    }
}
