//! Token store.
//!
//! The session asks for a token to be persisted after a successful login and
//! cleared after a failed one. Where the token lives is up to the store.

use std::{
    io,
    sync::{Arc, Mutex, PoisonError},
};

use chatterm_core::CachedToken;

/// Persists resume tokens between runs.
pub trait TokenStore: Send {
    /// Save `token`, replacing any previous one.
    fn persist(&mut self, token: CachedToken) -> io::Result<()>;

    /// Discard any saved token.
    fn clear(&mut self) -> io::Result<()>;
}

/// In-memory store. Clones share the same slot.
#[derive(Debug, Clone, Default)]
pub struct MemoryTokenStore {
    slot: Arc<Mutex<Option<CachedToken>>>,
}

impl MemoryTokenStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Currently saved token, if any.
    pub fn current(&self) -> Option<CachedToken> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl TokenStore for MemoryTokenStore {
    fn persist(&mut self, token: CachedToken) -> io::Result<()> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(token);
        Ok(())
    }

    fn clear(&mut self) -> io::Result<()> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}
