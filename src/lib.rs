//! Server-side Oblivious Pseudorandom Function (OPRF) engine for the
//! `P256-SHA256` ciphersuite of [RFC 9497].
//!
//! A client holding a sensitive input obtains a deterministic 32-byte output
//! that depends only on that input and the server's secret key, while the
//! server learns nothing about the input. Three [modes](mode::Mode) are
//! supported:
//!
//! - `Base`: plain blind evaluation (OPRF).
//! - `Verifiable`: the server additionally proves, with a batched DLEQ
//!   [`Proof`], that it used its committed key (VOPRF).
//! - `Partial`: a public `info` string participates in the evaluation and
//!   the proof is formed over the tweaked key (POPRF).
//!
//! The [`server`] module holds the evaluation engine, [`manager`] adds
//! versioned key storage with online rotation, and [`client`] implements the
//! reference client side that fixes the wire contract. All protocol values
//! cross the API boundary in their RFC encodings: compressed SEC1 elements
//! (33 bytes), big-endian scalars (32 bytes), and 64-byte proofs. The
//! identity element and malformed encodings are rejected at decode time.
//!
//! Curve and field arithmetic, including the RFC 9380
//! `P256_XMD:SHA-256_SSWU_RO_` hash-to-curve suite, is provided by the
//! constant-time [`p256`] crate.
//!
//! [RFC 9497]: https://www.rfc-editor.org/rfc/rfc9497.html

pub mod client;
pub mod error;
mod input;
pub mod key;
pub mod manager;
pub mod mode;
pub mod proof;
pub mod server;

use digest::consts::U48;
use group::{Group, GroupEncoding, ff::PrimeField};
use p256::{NistP256, ProjectivePoint, Scalar};
use sha2::Sha256;

pub use error::Error;
pub use input::Input;
pub use key::KeyPair;
pub use manager::KeyManager;
pub use mode::Mode;
pub use proof::Proof;
pub use server::Server;

/// Identifier of the ciphersuite, registered as `0x0003` in RFC 9497.
pub const SUITE_IDENTIFIER: &[u8] = b"P256-SHA256";

/// Length of a compressed SEC1 group element encoding.
pub const ELEMENT_LENGTH: usize = 33;

/// Length of a big-endian scalar encoding.
pub const SCALAR_LENGTH: usize = 32;

/// Output length of the suite hash function, and of the protocol output.
pub const HASH_LENGTH: usize = 32;

/// Expansion length `L` used when hashing to a field element (RFC 9380).
pub const EXPAND_LENGTH: usize = 48;

/// Largest number of elements accepted in a batched operation.
///
/// Batches are indexed with two-byte integers in the proof transcript, so
/// the protocol cannot address more.
pub const MAX_BATCH: usize = u16::MAX as usize;

/// A blinded element.
///
/// What the client sends to the server for evaluation, so that the server
/// does not learn the original input. Decoding rejects the identity, so a
/// `Blinded` is always a valid non-identity curve point.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Blinded(pub(crate) ProjectivePoint);

/// An evaluated element.
///
/// What the server sends back to the client after evaluating the blinded
/// element.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Evaluated(pub(crate) ProjectivePoint);

/// The public key evaluations are verified against.
///
/// In `Verifiable` mode this is the server's public key; in `Partial` mode
/// the server exposes the tweaked key `pk + t*G` instead.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VerifyingKey(pub(crate) ProjectivePoint);

impl Blinded {
    /// Decode a compressed SEC1 element, rejecting the identity.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        decode_element(bytes).map(Blinded)
    }

    /// The canonical 33-byte compressed encoding.
    pub fn to_bytes(&self) -> [u8; ELEMENT_LENGTH] {
        encode_element(&self.0)
    }
}

impl Evaluated {
    /// Decode a compressed SEC1 element, rejecting the identity.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        decode_element(bytes).map(Evaluated)
    }

    /// The canonical 33-byte compressed encoding.
    pub fn to_bytes(&self) -> [u8; ELEMENT_LENGTH] {
        encode_element(&self.0)
    }
}

impl VerifyingKey {
    /// Decode a compressed SEC1 element, rejecting the identity.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        decode_element(bytes).map(VerifyingKey)
    }

    /// The canonical 33-byte compressed encoding.
    pub fn to_bytes(&self) -> [u8; ELEMENT_LENGTH] {
        encode_element(&self.0)
    }
}

/// Decode a group element from its compressed SEC1 encoding.
///
/// Only the canonical 33-byte form with an `0x02`/`0x03` prefix is accepted;
/// the identity and points off the curve are rejected. Every element that
/// enters the engine passes through here.
fn decode_element(bytes: &[u8]) -> Result<ProjectivePoint, Error> {
    let repr = p256::CompressedPoint::try_from(bytes)
        .map_err(|_| Error::InvalidPoint("element encoding must be 33 bytes"))?;
    if !matches!(bytes[0], 0x02 | 0x03) {
        return Err(Error::InvalidPoint(
            "element encoding must be compressed SEC1",
        ));
    }
    let element = ProjectivePoint::from_bytes(&repr)
        .into_option()
        .ok_or(Error::InvalidPoint("element is not on the curve"))?;
    if element.is_identity().into() {
        return Err(Error::InvalidPoint("element is the identity"));
    }
    Ok(element)
}

fn encode_element(element: &ProjectivePoint) -> [u8; ELEMENT_LENGTH] {
    let mut out = [0u8; ELEMENT_LENGTH];
    out.copy_from_slice(element.to_bytes().as_slice());
    out
}

/// Decode a scalar from its 32-byte big-endian encoding.
///
/// Values greater than or equal to the group order are rejected, so the
/// reduced-representative invariant holds for every decoded scalar.
pub(crate) fn decode_scalar(bytes: &[u8]) -> Result<Scalar, Error> {
    let repr = p256::FieldBytes::try_from(bytes)
        .map_err(|_| Error::InvalidScalar("scalar encoding must be 32 bytes"))?;
    Scalar::from_repr(repr)
        .into_option()
        .ok_or(Error::InvalidScalar("scalar is not in range"))
}

pub(crate) fn encode_scalar(scalar: &Scalar) -> [u8; SCALAR_LENGTH] {
    let mut out = [0u8; SCALAR_LENGTH];
    out.copy_from_slice(scalar.to_repr().as_slice());
    out
}

/// `HashToGroup` of the suite, with the mode's domain separation tag.
pub(crate) fn hash_to_group(parts: &[&[u8]], mode: Mode) -> ProjectivePoint {
    hash2curve::hash_from_bytes::<NistP256, hash2curve::ExpandMsgXmd<Sha256>>(
        parts,
        &mode.domain(b"HashToGroup-"),
    )
    .expect("domain separation tag is within length bounds")
}

/// `HashToScalar` of the suite, with the mode's domain separation tag.
pub(crate) fn hash_to_scalar(parts: &[&[u8]], mode: Mode) -> Scalar {
    hash_to_scalar_with(parts, &mode.domain(b"HashToScalar-"))
}

/// `HashToScalar` with an explicit domain separation tag.
pub(crate) fn hash_to_scalar_with(parts: &[&[u8]], domain: &[&[u8]]) -> Scalar {
    hash2curve::hash_to_scalar::<NistP256, hash2curve::ExpandMsgXmd<Sha256>, U48>(parts, domain)
        .expect("domain separation tag is within length bounds")
}
