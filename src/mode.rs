//! The different modes in which the OPRF protocol can operate.
//!
//! The mode selects which key preparation [`Server`][crate::server::Server]
//! applies, whether evaluations carry a DLEQ proof, and which domain
//! separation tags every transcript is hashed under. It is a closed set: the
//! protocol defines exactly these three.

use crate::SUITE_IDENTIFIER;

/// Mode of operation of the OPRF protocol, [as defined in RFC 9497].
///
/// [as defined in RFC 9497]: https://www.rfc-editor.org/rfc/rfc9497.html#name-configuration
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Mode {
    /// The basic `OPRF` mode.
    ///
    /// A server and client evaluate a pseudo-random function `F(k, x)` where
    /// the client input `x` is not disclosed to the server, and the server
    /// key `k` is not disclosed to the client. Only the client learns the
    /// output.
    Base,
    /// The verifiable `VOPRF` mode.
    ///
    /// In addition to the properties of [`Base`][Mode::Base], the server
    /// provides a [`Proof`][crate::Proof] of evaluation that the client
    /// verifies against the server's committed public key.
    Verifiable,
    /// The partially oblivious `POPRF` mode.
    ///
    /// In addition to the properties of [`Verifiable`][Mode::Verifiable], a
    /// public `info` string shared between client and server participates in
    /// the output.
    Partial,
}

impl Mode {
    /// One-byte identifier mixed into every domain separation tag.
    pub const fn identifier(self) -> u8 {
        match self {
            Mode::Base => 0x00,
            Mode::Verifiable => 0x01,
            Mode::Partial => 0x02,
        }
    }

    /// Whether evaluations in this mode carry a DLEQ proof.
    pub const fn is_verifiable(self) -> bool {
        !matches!(self, Mode::Base)
    }

    const fn identifier_bytes(self) -> &'static [u8] {
        match self {
            Mode::Base => &[0x00],
            Mode::Verifiable => &[0x01],
            Mode::Partial => &[0x02],
        }
    }

    /// `CreateContextString` from RFC 9497, prefixed with the tag's label.
    ///
    /// The context string is defined and compared as bytes; it contains the
    /// raw mode identifier and is not text.
    pub(crate) const fn domain(self, prefix: &'static [u8]) -> [&'static [u8]; 5] {
        [
            prefix,
            b"OPRFV1-",
            self.identifier_bytes(),
            b"-",
            SUITE_IDENTIFIER,
        ]
    }
}
