//! Error taxonomy for the BACnet/IP codec.
//!
//! Every layer (primitive tags, the three envelopes, the service layer) owns a
//! small error enum of its own, mirroring the shape used throughout this crate's
//! predecessor (`EncodingError`, `ApplicationError`, `NetworkError`, ...): a plain
//! enum with a hand-rolled `Display` impl and a `#[cfg(feature = "std")] impl Error`.
//! [`BacnetError`] unifies them for the crate's public `Result` alias.

#[cfg(feature = "std")]
use std::error::Error;
#[cfg(feature = "std")]
use std::fmt;

#[cfg(not(feature = "std"))]
use core::fmt;

/// Crate-wide result alias.
pub type Result<T> = core::result::Result<T, BacnetError>;

/// Errors from the primitive tag codec (`tag.rs`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagError {
    /// Buffer too short to contain the declared tag header/payload.
    TooShortToParse,
    /// Output buffer too short to hold the marshalled tag.
    TooShortToMarshal,
    /// Tag was of a different class/tag-number than the caller expected.
    InvalidObjectType,
    /// Payload exceeds what the inline/one-extra-byte length scheme supports.
    PayloadTooLong(usize),
}

impl fmt::Display for TagError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagError::TooShortToParse => write!(f, "too short to parse"),
            TagError::TooShortToMarshal => write!(f, "too short to marshal"),
            TagError::InvalidObjectType => write!(f, "invalid object type"),
            TagError::PayloadTooLong(n) => write!(f, "payload of {} bytes exceeds the 5-byte inline/extended limit", n),
        }
    }
}

#[cfg(feature = "std")]
impl Error for TagError {}

/// Errors from the BVLC envelope (`bvlc.rs`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BvlcError {
    TooShortToParse,
    TooShortToMarshal,
    /// The first octet wasn't `0x81`.
    InvalidType(u8),
    /// The function octet didn't match a known [`crate::bvlc::BvlcFunction`].
    InvalidFunction(u8),
}

impl fmt::Display for BvlcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BvlcError::TooShortToParse => write!(f, "too short to parse"),
            BvlcError::TooShortToMarshal => write!(f, "too short to marshal"),
            BvlcError::InvalidType(t) => write!(f, "invalid BVLC type 0x{:02x}, expected 0x81", t),
            BvlcError::InvalidFunction(fun) => write!(f, "unrecognized BVLC function 0x{:02x}", fun),
        }
    }
}

#[cfg(feature = "std")]
impl Error for BvlcError {}

/// Errors from the NPDU envelope (`npdu.rs`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NpduError {
    TooShortToParse,
    TooShortToMarshal,
}

impl fmt::Display for NpduError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NpduError::TooShortToParse => write!(f, "too short to parse"),
            NpduError::TooShortToMarshal => write!(f, "too short to marshal"),
        }
    }
}

#[cfg(feature = "std")]
impl Error for NpduError {}

/// Errors from the APDU envelope (`apdu.rs`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApduError {
    TooShortToParse,
    TooShortToMarshal,
    /// The PDU-type nibble didn't match a known discriminator.
    UnknownPduType(u8),
}

impl fmt::Display for ApduError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApduError::TooShortToParse => write!(f, "too short to parse"),
            ApduError::TooShortToMarshal => write!(f, "too short to marshal"),
            ApduError::UnknownPduType(t) => write!(f, "unknown PDU type {}", t),
        }
    }
}

#[cfg(feature = "std")]
impl Error for ApduError {}

/// Errors from service construction/decoding (`service/`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// The APDU's object list had a different arity than the service expects.
    WrongObjectCount { expected: &'static str, got: usize },
    /// A closing bracket was seen with an empty context stack.
    MismatchedClosingTag,
    /// A property was requested that this service's constructor can't encode.
    UnsupportedProperty(u16),
    /// Dispatch couldn't find a matching `(pdu_type, service_choice)` entry.
    UnsupportedServiceChoice(u8),
    Tag(TagError),
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceError::WrongObjectCount { expected, got } => {
                write!(f, "expected {} objects, got {}", expected, got)
            }
            ServiceError::MismatchedClosingTag => write!(f, "closing tag with empty context stack"),
            ServiceError::UnsupportedProperty(p) => write!(f, "unsupported property {}", p),
            ServiceError::UnsupportedServiceChoice(s) => write!(f, "unsupported service choice {}", s),
            ServiceError::Tag(e) => write!(f, "{}", e),
        }
    }
}

#[cfg(feature = "std")]
impl Error for ServiceError {}

impl From<TagError> for ServiceError {
    fn from(e: TagError) -> Self {
        ServiceError::Tag(e)
    }
}

/// Unified error type returned by every public operation in this crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BacnetError {
    Tag(TagError),
    Bvlc(BvlcError),
    Npdu(NpduError),
    Apdu(ApduError),
    Service(ServiceError),
}

impl fmt::Display for BacnetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BacnetError::Tag(e) => write!(f, "tag codec: {}", e),
            BacnetError::Bvlc(e) => write!(f, "BVLC: {}", e),
            BacnetError::Npdu(e) => write!(f, "NPDU: {}", e),
            BacnetError::Apdu(e) => write!(f, "APDU: {}", e),
            BacnetError::Service(e) => write!(f, "service: {}", e),
        }
    }
}

#[cfg(feature = "std")]
impl Error for BacnetError {}

impl From<TagError> for BacnetError {
    fn from(e: TagError) -> Self {
        BacnetError::Tag(e)
    }
}

impl From<BvlcError> for BacnetError {
    fn from(e: BvlcError) -> Self {
        BacnetError::Bvlc(e)
    }
}

impl From<NpduError> for BacnetError {
    fn from(e: NpduError) -> Self {
        BacnetError::Npdu(e)
    }
}

impl From<ApduError> for BacnetError {
    fn from(e: ApduError) -> Self {
        BacnetError::Apdu(e)
    }
}

impl From<ServiceError> for BacnetError {
    fn from(e: ServiceError) -> Self {
        BacnetError::Service(e)
    }
}
