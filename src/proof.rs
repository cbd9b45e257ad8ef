//! Batched DLEQ proof generation and verification.
//!
//! A [`Proof`] shows that the same discrete logarithm links `B = k * A` and
//! `Z = k * M`, where `M` and `Z` are composites folded from a batch of element
//! pairs. One proof therefore covers an entire evaluation batch.

use group::{Group, GroupEncoding, ff::Field};
use p256::{ProjectivePoint, Scalar};
use rand_core::Rng;
use sha2::{Digest, Sha256};

use crate::{Error, MAX_BATCH, Mode, SCALAR_LENGTH, decode_scalar, encode_scalar, hash_to_scalar};

/// Proof of evaluation: the challenge and response scalars `(c, s)`.
///
/// A proof shows that the server evaluated the blinded elements using the
/// secret key matching its committed public key. Serialized as the 64-byte
/// concatenation `c || s`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Proof {
    c: Scalar,
    s: Scalar,
}

impl Proof {
    /// Serialized proof length: two fixed-width scalars.
    pub const LENGTH: usize = 2 * SCALAR_LENGTH;

    /// The 64-byte `c || s` encoding.
    pub fn to_bytes(&self) -> [u8; Self::LENGTH] {
        let mut out = [0u8; Self::LENGTH];
        out[..SCALAR_LENGTH].copy_from_slice(&encode_scalar(&self.c));
        out[SCALAR_LENGTH..].copy_from_slice(&encode_scalar(&self.s));
        out
    }

    /// Decode a proof from its 64-byte encoding.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() != Self::LENGTH {
            return Err(Error::SizeLimit("proof encoding must be 64 bytes"));
        }
        Ok(Proof {
            c: decode_scalar(&bytes[..SCALAR_LENGTH])?,
            s: decode_scalar(&bytes[SCALAR_LENGTH..])?,
        })
    }

    /// Implementation of [`GenerateProof`] from RFC 9497, with a fresh
    /// nonce.
    ///
    /// Proves that `k` maps `a` to `b` as well as every `cs[i]` to `ds[i]`. A
    /// zero nonce is resampled.
    ///
    /// [`GenerateProof`]: https://www.rfc-editor.org/rfc/rfc9497.html#section-2.2.1-3
    pub fn generate(
        mode: Mode,
        k: Scalar,
        a: ProjectivePoint,
        b: ProjectivePoint,
        cs: &[ProjectivePoint],
        ds: &[ProjectivePoint],
        rng: &mut impl Rng,
    ) -> Result<Self, Error> {
        let mut nonce = Scalar::random(&mut *rng);
        while nonce.is_zero().into() {
            nonce = Scalar::random(&mut *rng);
        }
        Self::generate_with_nonce(mode, k, a, b, cs, ds, nonce)
    }

    /// [`GenerateProof`] with a caller-provided nonce.
    ///
    /// Deterministic, which makes known-answer reproduction possible; a zero
    /// nonce would leak `c * k` through `s` and is rejected.
    ///
    /// [`GenerateProof`]: https://www.rfc-editor.org/rfc/rfc9497.html#section-2.2.1-3
    pub fn generate_with_nonce(
        mode: Mode,
        k: Scalar,
        a: ProjectivePoint,
        b: ProjectivePoint,
        cs: &[ProjectivePoint],
        ds: &[ProjectivePoint],
        nonce: Scalar,
    ) -> Result<Self, Error> {
        check_batch(cs, ds)?;
        if nonce.is_zero().into() {
            return Err(Error::InvalidScalar("proof nonce is zero"));
        }

        let (m, z) = compute_composites_fast(mode, k, b, cs, ds);
        let t2 = a * nonce;
        let t3 = m * nonce;

        let c = challenge(mode, b, m, z, t2, t3);
        let s = nonce - c * k;

        Ok(Proof { c, s })
    }

    /// Implementation of [`VerifyProof`] from RFC 9497.
    ///
    /// Recomputes the composites from the public transcript and checks the
    /// challenge. Returns `false` for malformed shapes (empty, mismatched,
    /// or oversized lists) as well as for invalid proofs; it never errors.
    ///
    /// [`VerifyProof`]: https://www.rfc-editor.org/rfc/rfc9497.html#section-2.2.2-2
    pub fn verify(
        &self,
        mode: Mode,
        a: ProjectivePoint,
        b: ProjectivePoint,
        cs: &[ProjectivePoint],
        ds: &[ProjectivePoint],
    ) -> bool {
        if check_batch(cs, ds).is_err() {
            return false;
        }

        let (m, z) = compute_composites(mode, b, cs, ds);
        let t2 = a * self.s + b * self.c;
        let t3 = m * self.s + z * self.c;

        self.c == challenge(mode, b, m, z, t2, t3)
    }
}

fn check_batch(cs: &[ProjectivePoint], ds: &[ProjectivePoint]) -> Result<(), Error> {
    if cs.is_empty() {
        return Err(Error::SizeLimit("proof requires at least one element pair"));
    }
    if cs.len() != ds.len() {
        return Err(Error::SizeLimit("element lists must have equal lengths"));
    }
    if cs.len() > MAX_BATCH {
        return Err(Error::SizeLimit("more than 65535 element pairs"));
    }
    Ok(())
}

/// The challenge scalar over the length-prefixed `(B, M, Z, t2, t3)`
/// transcript.
fn challenge(
    mode: Mode,
    b: ProjectivePoint,
    m: ProjectivePoint,
    z: ProjectivePoint,
    t2: ProjectivePoint,
    t3: ProjectivePoint,
) -> Scalar {
    let bm = b.to_bytes();
    let a0 = m.to_bytes();
    let a1 = z.to_bytes();
    let a2 = t2.to_bytes();
    let a3 = t3.to_bytes();

    let transcript: [&[u8]; 11] = [
        &(bm.as_slice().len() as u16).to_be_bytes(),
        bm.as_slice(),
        &(a0.as_slice().len() as u16).to_be_bytes(),
        a0.as_slice(),
        &(a1.as_slice().len() as u16).to_be_bytes(),
        a1.as_slice(),
        &(a2.as_slice().len() as u16).to_be_bytes(),
        a2.as_slice(),
        &(a3.as_slice().len() as u16).to_be_bytes(),
        a3.as_slice(),
        b"Challenge",
    ];

    hash_to_scalar(&transcript, mode)
}

/// The per-batch seed binding the public key into every composite scalar.
fn transcript_seed(mode: Mode, b: ProjectivePoint) -> digest::Output<Sha256> {
    let bm = b.to_bytes();
    let seed_dst = mode.domain(b"Seed-");

    let mut hasher = Sha256::new();
    hasher.update((bm.as_slice().len() as u16).to_be_bytes());
    hasher.update(bm.as_slice());
    hasher.update((seed_dst.iter().map(|part| part.len()).sum::<usize>() as u16).to_be_bytes());
    for part in seed_dst {
        hasher.update(part);
    }
    hasher.finalize()
}

fn composite_scalar(mode: Mode, seed: &[u8], index: u16, ci: &[u8], di: &[u8]) -> Scalar {
    let transcript: [&[u8]; 8] = [
        &(seed.len() as u16).to_be_bytes(),
        seed,
        &index.to_be_bytes(),
        &(ci.len() as u16).to_be_bytes(),
        ci,
        &(di.len() as u16).to_be_bytes(),
        di,
        b"Composite",
    ];

    hash_to_scalar(&transcript, mode)
}

// Implementation of [`ComputeCompositesFast`] from RFC 9497: the prover
// knows `k`, so `Z = k * M` replaces the per-pair accumulation over `ds`.
//
// [`ComputeCompositesFast`]: https://www.rfc-editor.org/rfc/rfc9497.html#section-2.2.1-5
fn compute_composites_fast(
    mode: Mode,
    k: Scalar,
    b: ProjectivePoint,
    cs: &[ProjectivePoint],
    ds: &[ProjectivePoint],
) -> (ProjectivePoint, ProjectivePoint) {
    let seed = transcript_seed(mode, b);

    let mut m = ProjectivePoint::identity();
    for (i, (ci, di)) in cs.iter().zip(ds).enumerate() {
        let ci_bytes = ci.to_bytes();
        let di_bytes = di.to_bytes();
        let factor = composite_scalar(
            mode,
            seed.as_slice(),
            i as u16,
            ci_bytes.as_slice(),
            di_bytes.as_slice(),
        );
        m = *ci * factor + m;
    }
    let z = m * k;

    (m, z)
}

// Implementation of [`ComputeComposites`] from RFC 9497, used by the
// verifier which folds both lists.
//
// [`ComputeComposites`]: https://www.rfc-editor.org/rfc/rfc9497.html#section-2.2.2-4
fn compute_composites(
    mode: Mode,
    b: ProjectivePoint,
    cs: &[ProjectivePoint],
    ds: &[ProjectivePoint],
) -> (ProjectivePoint, ProjectivePoint) {
    let seed = transcript_seed(mode, b);

    let mut m = ProjectivePoint::identity();
    let mut z = ProjectivePoint::identity();
    for (i, (ci, di)) in cs.iter().zip(ds).enumerate() {
        let ci_bytes = ci.to_bytes();
        let di_bytes = di.to_bytes();
        let factor = composite_scalar(
            mode,
            seed.as_slice(),
            i as u16,
            ci_bytes.as_slice(),
            di_bytes.as_slice(),
        );
        m = *ci * factor + m;
        z = *di * factor + z;
    }

    (m, z)
}
