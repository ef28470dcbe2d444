//! Per-dialog generation cache.
//!
//! A session is opened when the configuration editor opens and closed with
//! it. It keeps the last credential of each kind so the editor can show it
//! again without drawing new key material, and it refuses a second request
//! for a kind whose generation is still running.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::generate::{CredentialGenerator, GenerationRequest, Generator};
use crate::types::{Credential, CredentialKind};
use crate::vless::VlessBuilderOptions;

#[derive(Default)]
struct SessionState {
    cache: HashMap<CredentialKind, Credential>,
    in_flight: HashSet<CredentialKind>,
    // Bumped by `clear`; a generation started before the bump is discarded.
    epoch: u64,
}

/// Clears the in-flight flag for one kind. Committing stores the result and
/// clears the flag under a single lock; dropping without commit (error or
/// unwind) only clears the flag. A result whose generation started before
/// the last `clear` is dropped instead of stored.
struct InFlight<'a> {
    state: &'a Mutex<SessionState>,
    kind: CredentialKind,
    epoch: u64,
    committed: bool,
}

impl InFlight<'_> {
    fn commit(mut self, credential: Credential) {
        let mut state = lock(self.state);
        state.in_flight.remove(&self.kind);
        if state.epoch == self.epoch {
            state.cache.insert(self.kind, credential);
        } else {
            debug!(kind = %self.kind, "session cleared during generation, result not cached");
        }
        self.committed = true;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.committed {
            lock(self.state).in_flight.remove(&self.kind);
        }
    }
}

fn lock(state: &Mutex<SessionState>) -> MutexGuard<'_, SessionState> {
    // Cache contents stay consistent across a panicking generator: entries are
    // only written in `commit`.
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct GenerationSession<G = Generator> {
    generator: G,
    state: Mutex<SessionState>,
}

impl GenerationSession<Generator> {
    /// Session over the OS random source.
    pub fn open_default() -> Self {
        Self::open(Generator::os())
    }
}

impl<G: CredentialGenerator> GenerationSession<G> {
    pub fn open(generator: G) -> Self {
        info!("generation session opened");
        Self {
            generator,
            state: Mutex::new(SessionState::default()),
        }
    }

    /// Cached credential for `kind`, generating it only if none exists yet.
    pub fn view(&self, kind: CredentialKind, request: &GenerationRequest) -> Result<Credential> {
        if let Some(cached) = lock(&self.state).cache.get(&kind) {
            debug!(kind = %kind, "serving cached credential");
            return Ok(cached.clone());
        }
        self.run(kind, request)
    }

    /// Always generate; on success the new value replaces the cached one, on
    /// failure the cached value is left as it was.
    pub fn regenerate(&self, kind: CredentialKind, request: &GenerationRequest) -> Result<Credential> {
        self.run(kind, request)
    }

    fn run(&self, kind: CredentialKind, request: &GenerationRequest) -> Result<Credential> {
        let guard = self.begin(kind)?;
        let credential = self.generator.generate(kind, request)?;
        guard.commit(credential.clone());
        Ok(credential)
    }

    fn begin(&self, kind: CredentialKind) -> Result<InFlight<'_>> {
        let mut state = lock(&self.state);
        if !state.in_flight.insert(kind) {
            warn!(kind = %kind, "generation already in progress, request rejected");
            return Err(Error::InProgress(kind));
        }
        Ok(InFlight {
            state: &self.state,
            kind,
            epoch: state.epoch,
            committed: false,
        })
    }

    /// Re-encode a cached VLESS entry for new builder options. Key material is
    /// kept, so both variants move together and nothing is regenerated.
    pub fn apply_vless_options(&self, options: &VlessBuilderOptions) -> Option<Credential> {
        let mut state = lock(&self.state);
        match state.cache.get_mut(&CredentialKind::VlessEncryption) {
            Some(Credential::VlessEncryption(result)) => {
                result.rebuild(options);
                Some(Credential::VlessEncryption(result.clone()))
            }
            _ => None,
        }
    }

    pub fn cached(&self, kind: CredentialKind) -> Option<Credential> {
        lock(&self.state).cache.get(&kind).cloned()
    }

    pub fn is_in_progress(&self, kind: CredentialKind) -> bool {
        lock(&self.state).in_flight.contains(&kind)
    }

    pub fn len(&self) -> usize {
        lock(&self.state).cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every cached credential while keeping the session open.
    /// Generations still running finish for their caller but are not cached.
    pub fn clear(&self) {
        let mut state = lock(&self.state);
        state.cache.clear();
        state.epoch = state.epoch.wrapping_add(1);
    }

    /// End of the editing dialog. Nothing survives into the next session.
    pub fn close(self) {
        let dropped = {
            let mut state = lock(&self.state);
            let n = state.cache.len();
            state.cache.clear();
            n
        };
        info!(dropped, "generation session closed");
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }
}
