//! The blind-evaluation engine.

use group::Group;
use p256::{ProjectivePoint, Scalar};
use rand_core::Rng;

use crate::{
    Blinded, ELEMENT_LENGTH, Error, Evaluated, Input, KeyPair, MAX_BATCH, Mode, Proof,
    SCALAR_LENGTH, VerifyingKey, hash_to_scalar,
};

/// Result of evaluating a single blinded element.
///
/// `proof` is present exactly in the verifiable modes. `public_key` is the
/// key the proof verifies against: the server's public key, except in
/// `Partial` mode where it is the tweaked key `pk + t*G`.
#[derive(Clone, Copy, Debug)]
pub struct Evaluation {
    /// The evaluated element, ready to return to the client.
    pub evaluated: Evaluated,
    /// DLEQ proof of correct evaluation.
    pub proof: Option<Proof>,
    /// The key the client verifies the proof against.
    pub public_key: VerifyingKey,
}

/// Result of evaluating a batch of blinded elements.
///
/// One proof covers the whole batch; it applies to every element of
/// `evaluated`.
#[derive(Clone, Debug)]
pub struct BatchEvaluation {
    /// The evaluated elements, in input order.
    pub evaluated: Vec<Evaluated>,
    /// DLEQ proof covering the whole batch.
    pub proof: Option<Proof>,
    /// The key the client verifies the proof against.
    pub public_key: VerifyingKey,
}

/// Server of the OPRF protocol.
///
/// The server holds a [`KeyPair`] and evaluates blinded elements provided by
/// clients. In the verifiable modes it also generates a [`Proof`] that the
/// evaluation used the key matching [`public_key`], which clients verify.
///
/// Batching is supported through [`evaluate_batch`]: the whole batch shares
/// a single proof. In `Partial` mode the public `info` string is required
/// and the `_with_info` variants must be used; supplying `info` in any other
/// mode, or omitting it in `Partial` mode, is reported as
/// [`Error::ModeMisuse`].
///
/// [`public_key`]: Server::public_key
/// [`evaluate_batch`]: Server::evaluate_batch
#[derive(Clone)]
pub struct Server {
    mode: Mode,
    key: KeyPair,
}

impl Server {
    /// Initialize a server with a random secret key.
    pub fn random(mode: Mode, rng: &mut impl Rng) -> Self {
        Server {
            mode,
            key: KeyPair::random(rng),
        }
    }

    /// Deterministically initialize a server via `DeriveKeyPair`.
    pub fn derive(mode: Mode, seed: &[u8; 32], info: Input<'_>) -> Result<Self, Error> {
        Ok(Server {
            mode,
            key: KeyPair::derive(mode, seed, info)?,
        })
    }

    /// Initialize a server with an existing key pair.
    pub fn from_key_pair(mode: Mode, key: KeyPair) -> Self {
        Server { mode, key }
    }

    /// Initialize a server from the 32-byte secret key encoding.
    pub fn from_secret_bytes(mode: Mode, bytes: &[u8]) -> Result<Self, Error> {
        Ok(Server {
            mode,
            key: KeyPair::from_secret_bytes(bytes)?,
        })
    }

    /// The mode this server evaluates in.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// The server's public key.
    pub fn public_key(&self) -> VerifyingKey {
        self.key.public_key()
    }

    /// The server's public key in its 33-byte compressed encoding.
    pub fn public_key_bytes(&self) -> [u8; ELEMENT_LENGTH] {
        self.key.public_key().to_bytes()
    }

    /// Export the secret key as its 32-byte big-endian encoding.
    ///
    /// Each call returns an independent copy.
    pub fn export_secret_key(&self) -> [u8; SCALAR_LENGTH] {
        self.key.secret_key_bytes()
    }

    /// Evaluate one blinded element.
    ///
    /// The [`BlindEvaluate`] method defined in RFC 9497 for the `Base` and
    /// `Verifiable` modes; `Partial` servers must use
    /// [`evaluate_with_info`][Server::evaluate_with_info].
    ///
    /// [`BlindEvaluate`]: https://www.rfc-editor.org/rfc/rfc9497.html#section-3.3.1-4
    pub fn evaluate(&self, blinded: &Blinded, rng: &mut impl Rng) -> Result<Evaluation, Error> {
        if self.mode == Mode::Partial {
            return Err(Error::ModeMisuse("Partial mode requires an info string"));
        }
        self.evaluate_inner(core::slice::from_ref(blinded), None, rng)
            .map(into_single)
    }

    /// Evaluate one blinded element over a public `info` string.
    ///
    /// The [`BlindEvaluate`] method defined in RFC 9497 for the `Partial`
    /// mode. Fails with [`Error::InvalidScalar`] in the negligible case
    /// where `info` tweaks the secret key to zero.
    ///
    /// [`BlindEvaluate`]: https://www.rfc-editor.org/rfc/rfc9497.html#section-3.3.3-4
    pub fn evaluate_with_info(
        &self,
        blinded: &Blinded,
        info: Input<'_>,
        rng: &mut impl Rng,
    ) -> Result<Evaluation, Error> {
        if self.mode != Mode::Partial {
            return Err(Error::ModeMisuse(
                "info string only participates in Partial mode",
            ));
        }
        self.evaluate_inner(core::slice::from_ref(blinded), Some(info), rng)
            .map(into_single)
    }

    /// Evaluate a batch of blinded elements under one shared proof.
    ///
    /// Rejects empty batches and batches larger than 65535 elements.
    pub fn evaluate_batch(
        &self,
        blinded: &[Blinded],
        rng: &mut impl Rng,
    ) -> Result<BatchEvaluation, Error> {
        if self.mode == Mode::Partial {
            return Err(Error::ModeMisuse("Partial mode requires an info string"));
        }
        self.evaluate_inner(blinded, None, rng)
    }

    /// Evaluate a batch of blinded elements over a public `info` string.
    pub fn evaluate_batch_with_info(
        &self,
        blinded: &[Blinded],
        info: Input<'_>,
        rng: &mut impl Rng,
    ) -> Result<BatchEvaluation, Error> {
        if self.mode != Mode::Partial {
            return Err(Error::ModeMisuse(
                "info string only participates in Partial mode",
            ));
        }
        self.evaluate_inner(blinded, Some(info), rng)
    }

    fn evaluate_inner(
        &self,
        blinded: &[Blinded],
        info: Option<Input<'_>>,
        rng: &mut impl Rng,
    ) -> Result<BatchEvaluation, Error> {
        if blinded.is_empty() {
            return Err(Error::SizeLimit("batch must contain at least one element"));
        }
        if blinded.len() > MAX_BATCH {
            return Err(Error::SizeLimit("batch larger than 65535 elements"));
        }
        for element in blinded {
            if element.0.is_identity().into() {
                return Err(Error::InvalidPoint("blinded element is the identity"));
            }
        }

        match self.mode {
            Mode::Base => {
                let evaluated = evaluate_all(*self.key.secret_key(), blinded)?;
                Ok(BatchEvaluation {
                    evaluated,
                    proof: None,
                    public_key: self.key.public_key(),
                })
            }
            Mode::Verifiable => {
                let secret = *self.key.secret_key();
                let evaluated = evaluate_all(secret, blinded)?;
                let cs: Vec<ProjectivePoint> = blinded.iter().map(|b| b.0).collect();
                let ds: Vec<ProjectivePoint> = evaluated.iter().map(|e| e.0).collect();
                let proof = Proof::generate(
                    Mode::Verifiable,
                    secret,
                    ProjectivePoint::generator(),
                    self.key.public_key().0,
                    &cs,
                    &ds,
                    rng,
                )?;
                Ok(BatchEvaluation {
                    evaluated,
                    proof: Some(proof),
                    public_key: self.key.public_key(),
                })
            }
            Mode::Partial => {
                let info = info.ok_or(Error::ModeMisuse("Partial mode requires an info string"))?;
                let info_len = info.length_prefix();
                let framed_info: [&[u8]; 3] = [b"Info", &info_len, info.as_ref()];
                let t = hash_to_scalar(&framed_info, Mode::Partial);

                let tweaked = *self.key.secret_key() + t;
                let inverse = tweaked
                    .invert()
                    .into_option()
                    .ok_or(Error::InvalidScalar("info tweaks the secret key to zero"))?;

                let evaluated = evaluate_all(inverse, blinded)?;
                let tweaked_key = ProjectivePoint::mul_by_generator(&tweaked);

                // The proved scalar links evaluated to blinded, so the
                // composite lists are swapped relative to Verifiable mode.
                let cs: Vec<ProjectivePoint> = evaluated.iter().map(|e| e.0).collect();
                let ds: Vec<ProjectivePoint> = blinded.iter().map(|b| b.0).collect();
                let proof = Proof::generate(
                    Mode::Partial,
                    tweaked,
                    ProjectivePoint::generator(),
                    tweaked_key,
                    &cs,
                    &ds,
                    rng,
                )?;
                Ok(BatchEvaluation {
                    evaluated,
                    proof: Some(proof),
                    public_key: VerifyingKey(tweaked_key),
                })
            }
        }
    }
}

impl core::fmt::Debug for Server {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Server")
            .field("mode", &self.mode)
            .field("key", &self.key)
            .finish()
    }
}

impl zeroize::Zeroize for Server {
    fn zeroize(&mut self) {
        zeroize::Zeroize::zeroize(&mut self.key);
    }
}

fn evaluate_all(scalar: Scalar, blinded: &[Blinded]) -> Result<Vec<Evaluated>, Error> {
    blinded
        .iter()
        .map(|Blinded(element)| {
            let evaluated = *element * scalar;
            if evaluated.is_identity().into() {
                return Err(Error::InvalidPoint("evaluated element is the identity"));
            }
            Ok(Evaluated(evaluated))
        })
        .collect()
}

fn into_single(batch: BatchEvaluation) -> Evaluation {
    Evaluation {
        evaluated: batch.evaluated[0],
        proof: batch.proof,
        public_key: batch.public_key,
    }
}
