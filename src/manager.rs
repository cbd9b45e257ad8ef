//! Versioned key storage with online rotation.
//!
//! A [`KeyManager`] holds one [`Server`] per key version and a snapshot of
//! the current version. Rotation installs a new key at the smallest unused
//! version above the current one and atomically makes it current; readers
//! that already hold a version's [`Server`] handle are unaffected.

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use rand_core::Rng;

use crate::{Error, Input, KeyPair, Mode, SCALAR_LENGTH, Server, VerifyingKey};

/// Snapshot of the manager's current key version.
///
/// The snapshot pairs the version with its engine handle so concurrent
/// rotations cannot tear the two apart: an evaluation performed through
/// `server` always uses the key that `version` names.
#[derive(Clone, Debug)]
pub struct CurrentKey {
    /// The current version number.
    pub version: u32,
    /// The evaluation engine for that version.
    pub server: Arc<Server>,
}

/// Metadata describing one installed key version.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyMetadata {
    /// The version number.
    pub version: u32,
    /// The version's public key.
    pub public_key: VerifyingKey,
    /// Whether this version is the current one.
    pub current: bool,
}

/// Versioned key manager enabling online key rotation.
///
/// Versions are positive integers; zero is reserved and rejected. All
/// mutations (rotation, retirement) serialize on an internal write lock and
/// replace the [`CurrentKey`] snapshot atomically, so either a rotation is
/// fully installed and current, or the state is unchanged. Reads
/// ([`current`], [`get`], [`metadata`]) take the shared lock and hand out
/// [`Arc`] clones, leaving the read path free of writer interference.
///
/// [`current`]: KeyManager::current
/// [`get`]: KeyManager::get
/// [`metadata`]: KeyManager::metadata
pub struct KeyManager {
    mode: Mode,
    state: RwLock<State>,
}

struct State {
    servers: BTreeMap<u32, Arc<Server>>,
    current: CurrentKey,
}

impl KeyManager {
    /// Create a manager with a fresh random key installed at version 1.
    pub fn new(mode: Mode, rng: &mut impl Rng) -> Self {
        Self::install_first(mode, Server::random(mode, rng))
    }

    /// Create a manager with the given secret key installed at version 1.
    pub fn from_secret_bytes(mode: Mode, secret: &[u8]) -> Result<Self, Error> {
        Ok(Self::install_first(
            mode,
            Server::from_secret_bytes(mode, secret)?,
        ))
    }

    /// Create a manager from existing versioned keys.
    ///
    /// Version zero and duplicate versions are rejected with
    /// [`Error::InvalidVersion`]; a `current_version` that is not among the
    /// keys is rejected with [`Error::UnknownVersion`].
    pub fn with_keys(
        mode: Mode,
        keys: impl IntoIterator<Item = (u32, KeyPair)>,
        current_version: u32,
    ) -> Result<Self, Error> {
        let mut servers = BTreeMap::new();
        for (version, key) in keys {
            if version == 0 {
                return Err(Error::InvalidVersion(0));
            }
            let server = Arc::new(Server::from_key_pair(mode, key));
            if servers.insert(version, server).is_some() {
                return Err(Error::InvalidVersion(version));
            }
        }

        let server = servers
            .get(&current_version)
            .cloned()
            .ok_or(Error::UnknownVersion(current_version))?;

        Ok(KeyManager {
            mode,
            state: RwLock::new(State {
                servers,
                current: CurrentKey {
                    version: current_version,
                    server,
                },
            }),
        })
    }

    fn install_first(mode: Mode, server: Server) -> Self {
        let server = Arc::new(server);
        let servers = BTreeMap::from([(1, Arc::clone(&server))]);

        KeyManager {
            mode,
            state: RwLock::new(State {
                servers,
                current: CurrentKey { version: 1, server },
            }),
        }
    }

    /// The mode every managed key evaluates in.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Snapshot of the current version and its engine.
    pub fn current(&self) -> CurrentKey {
        self.read().current.clone()
    }

    /// The current version number.
    pub fn current_version(&self) -> u32 {
        self.read().current.version
    }

    /// The public key of the current version.
    pub fn current_public_key(&self) -> VerifyingKey {
        self.read().current.server.public_key()
    }

    /// Look up the engine for a version.
    pub fn get(&self, version: u32) -> Result<Arc<Server>, Error> {
        self.read()
            .servers
            .get(&version)
            .cloned()
            .ok_or(Error::UnknownVersion(version))
    }

    /// Rotate to a fresh random key. Returns the new version.
    pub fn rotate_random(&self, rng: &mut impl Rng) -> Result<u32, Error> {
        self.install(Server::random(self.mode, rng))
    }

    /// Rotate to a key derived from `(seed, info)`. Returns the new version.
    pub fn rotate_derived(&self, seed: &[u8; 32], info: Input<'_>) -> Result<u32, Error> {
        self.install(Server::derive(self.mode, seed, info)?)
    }

    /// Rotate to the given 32-byte secret key. Returns the new version.
    pub fn rotate_to(&self, secret: &[u8]) -> Result<u32, Error> {
        self.install(Server::from_secret_bytes(self.mode, secret)?)
    }

    fn install(&self, server: Server) -> Result<u32, Error> {
        let server = Arc::new(server);
        let mut state = self.write();

        let mut version = state
            .current
            .version
            .checked_add(1)
            .ok_or(Error::InvalidVersion(u32::MAX))?;
        while state.servers.contains_key(&version) {
            version = version
                .checked_add(1)
                .ok_or(Error::InvalidVersion(u32::MAX))?;
        }

        state.servers.insert(version, Arc::clone(&server));
        state.current = CurrentKey { version, server };
        Ok(version)
    }

    /// Remove a non-current version.
    ///
    /// The current version is rejected with [`Error::RetireCurrent`]. The
    /// retired key's storage is freed once the last [`Arc`] handle obtained
    /// through [`get`][KeyManager::get] or [`current`][KeyManager::current]
    /// is dropped; callers still holding one may finish their evaluations.
    pub fn retire(&self, version: u32) -> Result<(), Error> {
        let mut state = self.write();
        if version == state.current.version {
            return Err(Error::RetireCurrent(version));
        }
        state
            .servers
            .remove(&version)
            .map(drop)
            .ok_or(Error::UnknownVersion(version))
    }

    /// Ordered `(version, public key, is current)` rows for every version.
    pub fn metadata(&self) -> Vec<KeyMetadata> {
        let state = self.read();
        state
            .servers
            .iter()
            .map(|(&version, server)| KeyMetadata {
                version,
                public_key: server.public_key(),
                current: version == state.current.version,
            })
            .collect()
    }

    /// Export every version's secret key bytes, in version order.
    ///
    /// The returned buffers are independent copies.
    pub fn export_all(&self) -> Vec<(u32, [u8; SCALAR_LENGTH])> {
        self.read()
            .servers
            .iter()
            .map(|(&version, server)| (version, server.export_secret_key()))
            .collect()
    }

    /// Export one version's secret key bytes as an independent copy.
    pub fn export_secret_key(&self, version: u32) -> Result<[u8; SCALAR_LENGTH], Error> {
        Ok(self.get(version)?.export_secret_key())
    }

    fn read(&self) -> RwLockReadGuard<'_, State> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, State> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl core::fmt::Debug for KeyManager {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let state = self.read();
        f.debug_struct("KeyManager")
            .field("mode", &self.mode)
            .field("versions", &state.servers.keys().collect::<Vec<_>>())
            .field("current", &state.current.version)
            .finish()
    }
}
