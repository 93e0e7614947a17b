//! Unified error types for the PulsePair firmware.
//!
//! A single `Error` enum that every subsystem converts into, keeping the
//! top-level control loop's error handling uniform. All variants are `Copy`
//! so they can be threaded through the protocol engine without allocation.
//!
//! Note that protocol validation failures and retry timeouts are *not*
//! errors — they are handled state transitions (see the protocol engine).

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The radio transport failed to initialise or send.
    Transport(TransportError),
    /// Persistent storage failed.
    Storage(StorageError),
    /// An inbound frame failed wire-format validation.
    Codec(DecodeError),
    /// Peripheral initialisation failed.
    Init(&'static str),
    /// Configuration is invalid or could not be loaded.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(e) => write!(f, "transport: {e}"),
            Self::Storage(e) => write!(f, "storage: {e}"),
            Self::Codec(e) => write!(f, "codec: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Transport errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportError {
    /// Radio/ESP-NOW stack initialisation failed.
    InitFailed,
    /// The datagram could not be queued for transmission.
    SendFailed,
    /// Registering the destination peer failed.
    PeerAddFailed,
    /// A send was attempted while the radio is powered off.
    RadioOff,
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InitFailed => write!(f, "radio init failed"),
            Self::SendFailed => write!(f, "send failed"),
            Self::PeerAddFailed => write!(f, "peer add failed"),
            Self::RadioOff => write!(f, "radio is off"),
        }
    }
}

impl From<TransportError> for Error {
    fn from(e: TransportError) -> Self {
        Self::Transport(e)
    }
}

// ---------------------------------------------------------------------------
// Storage errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// Requested key does not exist.
    NotFound,
    /// Storage partition is full.
    Full,
    /// Stored record failed integrity / deserialization check.
    Corrupted,
    /// Generic I/O error from the storage backend.
    IoError,
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "key not found"),
            Self::Full => write!(f, "storage full"),
            Self::Corrupted => write!(f, "record corrupted"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl From<StorageError> for Error {
    fn from(e: StorageError) -> Self {
        Self::Storage(e)
    }
}

// ---------------------------------------------------------------------------
// Wire decode errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// Frame length does not match the fixed wire size.
    BadLength,
    /// Magic bytes do not identify a PulsePair frame.
    BadMagic,
    /// Frame carries an unsupported wire version.
    BadVersion,
    /// Message tag is not a known `MessageKind`.
    BadTag,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadLength => write!(f, "bad frame length"),
            Self::BadMagic => write!(f, "bad magic"),
            Self::BadVersion => write!(f, "unsupported wire version"),
            Self::BadTag => write!(f, "unknown message tag"),
        }
    }
}

impl From<DecodeError> for Error {
    fn from(e: DecodeError) -> Self {
        Self::Codec(e)
    }
}

impl std::error::Error for Error {}
impl std::error::Error for TransportError {}
impl std::error::Error for StorageError {}
impl std::error::Error for DecodeError {}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
