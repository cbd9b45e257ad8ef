//! Reference client of the OPRF protocol.
//!
//! The client hashes its inputs to the curve, blinds them with fresh random
//! scalars, and later unblinds the evaluated elements and derives the
//! protocol output. In the verifiable modes it also holds the server's
//! committed [`VerifyingKey`] and verifies the evaluation [`Proof`] before
//! producing any output.

use group::{
    Group, GroupEncoding,
    ff::{BatchInverter, Field},
};
use p256::{ProjectivePoint, Scalar};
use rand_core::Rng;
use sha2::{Digest, Sha256};

use crate::{
    Blinded, Error, Evaluated, HASH_LENGTH, Input, MAX_BATCH, Mode, Proof, VerifyingKey,
    hash_to_group, hash_to_scalar,
};

/// Client of the OPRF protocol.
///
/// Construct with the mode-specific `blind` constructor ([`blind`],
/// [`blind_verifiable`], or [`blind_partial`]), send the returned
/// [`Blinded`] elements to the server, and feed the server's response to
/// [`finalize`]. Batching is controlled by the number of inputs passed to
/// the constructor.
///
/// [`blind`]: Client::blind
/// [`blind_verifiable`]: Client::blind_verifiable
/// [`blind_partial`]: Client::blind_partial
/// [`finalize`]: Client::finalize
#[derive(Clone)]
pub struct Client<'a> {
    mode: Mode,
    inputs: Vec<Input<'a>>,
    blinds: Vec<Scalar>,
    blinded: Vec<Blinded>,
    verifying_key: Option<VerifyingKey>,
    info: Option<Input<'a>>,
}

impl<'a> Client<'a> {
    /// Blind inputs for `Base` mode evaluation.
    ///
    /// The [`Blind`] method defined in RFC 9497. Each input is hashed to the
    /// curve and multiplied by a fresh non-zero random scalar.
    ///
    /// [`Blind`]: https://www.rfc-editor.org/rfc/rfc9497.html#section-3.3.1-2
    pub fn blind(
        inputs: &[Input<'a>],
        rng: &mut impl Rng,
    ) -> Result<(Self, Vec<Blinded>), Error> {
        Self::blind_inner(Mode::Base, inputs, None, None, rng)
    }

    /// Blind inputs for `Verifiable` mode evaluation.
    ///
    /// The server's committed verifying key is stored so that
    /// [`finalize`][Client::finalize] can check the evaluation proof.
    pub fn blind_verifiable(
        inputs: &[Input<'a>],
        verifying_key: VerifyingKey,
        rng: &mut impl Rng,
    ) -> Result<(Self, Vec<Blinded>), Error> {
        Self::blind_inner(Mode::Verifiable, inputs, None, Some(verifying_key), rng)
    }

    /// Blind inputs for `Partial` mode evaluation over `info`.
    ///
    /// The tweaked key `pk + t*G` is computed here and stored for proof
    /// verification; an `info` that tweaks the server key to the identity is
    /// rejected.
    pub fn blind_partial(
        inputs: &[Input<'a>],
        info: Input<'a>,
        verifying_key: VerifyingKey,
        rng: &mut impl Rng,
    ) -> Result<(Self, Vec<Blinded>), Error> {
        let info_len = info.length_prefix();
        let framed_info: [&[u8]; 3] = [b"Info", &info_len, info.as_ref()];
        let t = hash_to_scalar(&framed_info, Mode::Partial);

        let tweaked_key = ProjectivePoint::mul_by_generator(&t) + verifying_key.0;
        if tweaked_key.is_identity().into() {
            return Err(Error::InvalidPoint("tweaked public key is the identity"));
        }

        Self::blind_inner(
            Mode::Partial,
            inputs,
            Some(info),
            Some(VerifyingKey(tweaked_key)),
            rng,
        )
    }

    fn blind_inner(
        mode: Mode,
        inputs: &[Input<'a>],
        info: Option<Input<'a>>,
        verifying_key: Option<VerifyingKey>,
        rng: &mut impl Rng,
    ) -> Result<(Self, Vec<Blinded>), Error> {
        if inputs.is_empty() {
            return Err(Error::SizeLimit("at least one input is required"));
        }
        if inputs.len() > MAX_BATCH {
            return Err(Error::SizeLimit("batch larger than 65535 inputs"));
        }

        let mut blinds = Vec::with_capacity(inputs.len());
        let mut blinded = Vec::with_capacity(inputs.len());
        for input in inputs {
            let element = hash_to_group(&[input.as_ref()], mode);
            if element.is_identity().into() {
                return Err(Error::InvalidPoint("input hashes to the identity"));
            }

            let mut blind = Scalar::random(&mut *rng);
            while blind.is_zero().into() {
                blind = Scalar::random(&mut *rng);
            }

            blinds.push(blind);
            blinded.push(Blinded(element * blind));
        }

        Ok((
            Client {
                mode,
                inputs: inputs.to_vec(),
                blinds,
                blinded: blinded.clone(),
                verifying_key,
                info,
            },
            blinded,
        ))
    }

    /// Finalize the protocol.
    ///
    /// The [`Finalize`] method defined in RFC 9497: verify the proof in the
    /// verifiable modes, unblind each evaluated element, and hash it with
    /// the input (and `info` in `Partial` mode) into the 32-byte protocol
    /// output. `Base` mode must not be handed a proof.
    ///
    /// [`Finalize`]: https://www.rfc-editor.org/rfc/rfc9497.html#section-3.3.1-7
    pub fn finalize(
        self,
        evaluated: &[Evaluated],
        proof: Option<&Proof>,
    ) -> Result<Vec<[u8; HASH_LENGTH]>, Error> {
        if evaluated.len() != self.blinds.len() {
            return Err(Error::SizeLimit(
                "evaluated elements do not match the blinded batch",
            ));
        }

        if self.mode.is_verifiable() {
            let proof = proof.ok_or(Error::ModeMisuse("verifiable modes require a proof"))?;
            let verifying_key = self
                .verifying_key
                .ok_or(Error::ModeMisuse("missing verifying key"))?;

            let blinded: Vec<ProjectivePoint> = self.blinded.iter().map(|b| b.0).collect();
            let results: Vec<ProjectivePoint> = evaluated.iter().map(|e| e.0).collect();
            // Partial mode proves the inverse scalar, so the composite
            // lists are swapped.
            let (cs, ds) = if self.mode == Mode::Partial {
                (results, blinded)
            } else {
                (blinded, results)
            };

            if !proof.verify(
                self.mode,
                ProjectivePoint::generator(),
                verifying_key.0,
                &cs,
                &ds,
            ) {
                return Err(Error::InvalidProof);
            }
        } else if proof.is_some() {
            return Err(Error::ModeMisuse("Base mode produces no proof"));
        }

        let mut inverted_blinds = self.blinds;
        if inverted_blinds.len() == 1 {
            inverted_blinds[0] = inverted_blinds[0].invert().expect("blind is non-zero");
        } else {
            let mut scratch = vec![Scalar::ONE; inverted_blinds.len()];
            BatchInverter::invert_with_external_scratch(&mut inverted_blinds, &mut scratch);
        }

        Ok(evaluated
            .iter()
            .zip(&inverted_blinds)
            .zip(&self.inputs)
            .map(|((element, inverted), input)| {
                let unblinded = (element.0 * *inverted).to_bytes();

                let mut digest = Sha256::new();
                digest.update(input.length_prefix());
                digest.update(input.as_ref());
                if let Some(info) = &self.info {
                    digest.update(info.length_prefix());
                    digest.update(info.as_ref());
                }
                digest.update((unblinded.as_slice().len() as u16).to_be_bytes());
                digest.update(unblinded.as_slice());
                digest.update(b"Finalize");

                let mut output = [0u8; HASH_LENGTH];
                output.copy_from_slice(&digest.finalize());
                output
            })
            .collect())
    }
}

impl zeroize::Zeroize for Client<'_> {
    fn zeroize(&mut self) {
        for blind in &mut self.blinds {
            *blind = Scalar::ZERO;
        }
    }
}
