//! Key pairs and deterministic key derivation.

use group::{Group, ff::Field};
use p256::{ProjectivePoint, Scalar};
use rand_core::Rng;

use crate::{
    Error, Input, Mode, SCALAR_LENGTH, VerifyingKey, decode_scalar, encode_scalar,
    hash_to_scalar_with,
};

/// A server key pair: a non-zero secret scalar and its public point.
///
/// Immutable after construction. The secret is exported only as a fresh
/// byte copy through [`secret_key_bytes`][KeyPair::secret_key_bytes], and
/// the `Debug` implementation shows the public half only.
#[derive(Clone)]
pub struct KeyPair {
    secret: Scalar,
    public: ProjectivePoint,
}

impl KeyPair {
    /// Generate a key pair with a random non-zero secret key.
    ///
    /// The [`GenerateKeyPair`] method defined in RFC 9497. Sampling rejects
    /// until a non-zero scalar is drawn.
    ///
    /// [`GenerateKeyPair`]: https://www.rfc-editor.org/rfc/rfc9497.html#section-3.2-2
    pub fn random(rng: &mut impl Rng) -> Self {
        let mut secret = Scalar::random(&mut *rng);
        while secret.is_zero().into() {
            secret = Scalar::random(&mut *rng);
        }
        KeyPair {
            secret,
            public: ProjectivePoint::mul_by_generator(&secret),
        }
    }

    /// Deterministically derive a key pair from a seed and an info string.
    ///
    /// The [`DeriveKeyPair`] method defined in RFC 9497: a one-byte counter
    /// is appended to `seed || I2OSP(len(info), 2) || info` and hashed to a
    /// scalar under the mode's `DeriveKeyPair` tag until the result is
    /// non-zero. All 256 counter values producing zero fails with
    /// [`Error::DeriveKeyPair`].
    ///
    /// [`DeriveKeyPair`]: https://www.rfc-editor.org/rfc/rfc9497.html#section-3.2.1-2
    pub fn derive(mode: Mode, seed: &[u8; 32], info: Input<'_>) -> Result<Self, Error> {
        let info_len = info.length_prefix();
        for counter in 0u8..=255 {
            let derive_input: [&[u8]; 4] = [seed.as_slice(), &info_len, info.as_ref(), &[counter]];
            let secret = hash_to_scalar_with(&derive_input, &mode.domain(b"DeriveKeyPair"));
            if !bool::from(secret.is_zero()) {
                return Ok(KeyPair {
                    secret,
                    public: ProjectivePoint::mul_by_generator(&secret),
                });
            }
        }
        Err(Error::DeriveKeyPair)
    }

    /// Build a key pair from an existing secret scalar.
    ///
    /// Zero is rejected: the public key would be the identity.
    pub fn from_secret_scalar(secret: Scalar) -> Result<Self, Error> {
        if secret.is_zero().into() {
            return Err(Error::InvalidScalar("secret key is zero"));
        }
        Ok(KeyPair {
            secret,
            public: ProjectivePoint::mul_by_generator(&secret),
        })
    }

    /// Build a key pair from the 32-byte big-endian secret key encoding.
    pub fn from_secret_bytes(bytes: &[u8]) -> Result<Self, Error> {
        Self::from_secret_scalar(decode_scalar(bytes)?)
    }

    pub(crate) fn secret_key(&self) -> &Scalar {
        &self.secret
    }

    /// The public key `sk * G`.
    pub fn public_key(&self) -> VerifyingKey {
        VerifyingKey(self.public)
    }

    /// The 32-byte big-endian secret key encoding.
    ///
    /// Each call returns an independent copy; the internal scalar is never
    /// aliased.
    pub fn secret_key_bytes(&self) -> [u8; SCALAR_LENGTH] {
        encode_scalar(&self.secret)
    }
}

impl core::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("KeyPair")
            .field("public", &self.public)
            .finish_non_exhaustive()
    }
}

impl zeroize::Zeroize for KeyPair {
    fn zeroize(&mut self) {
        self.secret = Scalar::ZERO;
        self.public = ProjectivePoint::identity();
    }
}
