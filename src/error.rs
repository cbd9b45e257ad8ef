//! Failure taxonomy of the engine boundary.

use core::fmt;

/// Errors surfaced when an operation rejects its input or state.
///
/// Invariants are enforced at ingress: an element or scalar that decodes
/// successfully is valid everywhere inside the engine. Variants that carry a
/// reason string describe the rejected input; none of them ever reproduce
/// secret material.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A group element failed to decode, was off the curve, or was the
    /// identity where the protocol forbids it.
    InvalidPoint(&'static str),
    /// A scalar failed to decode, was out of range, or was zero where the
    /// protocol forbids it.
    InvalidScalar(&'static str),
    /// An operation was invoked in a mode that does not support it. This is
    /// a programmer error, not an input error.
    ModeMisuse(&'static str),
    /// An input exceeded one of the protocol's size limits.
    SizeLimit(&'static str),
    /// Deterministic key derivation exhausted all 256 counter values.
    ///
    /// Practically impossible; implies a broken `hash_to_scalar`.
    DeriveKeyPair,
    /// A DLEQ proof failed to verify.
    InvalidProof,
    /// The requested key version is not installed.
    UnknownVersion(u32),
    /// A key version could not be installed: zero, already taken, or the
    /// version space is exhausted.
    InvalidVersion(u32),
    /// The current key version cannot be retired.
    RetireCurrent(u32),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidPoint(reason) => write!(f, "invalid group element: {reason}"),
            Error::InvalidScalar(reason) => write!(f, "invalid scalar: {reason}"),
            Error::ModeMisuse(reason) => write!(f, "mode misuse: {reason}"),
            Error::SizeLimit(reason) => write!(f, "size limit exceeded: {reason}"),
            Error::DeriveKeyPair => {
                write!(f, "key derivation produced no valid secret key")
            }
            Error::InvalidProof => write!(f, "the proof provided is invalid"),
            Error::UnknownVersion(version) => {
                write!(f, "key version {version} is not installed")
            }
            Error::InvalidVersion(version) => {
                write!(f, "key version {version} cannot be installed")
            }
            Error::RetireCurrent(version) => {
                write!(f, "key version {version} is current and cannot be retired")
            }
        }
    }
}

impl core::error::Error for Error {}
