use std::sync::{Arc, RwLock};

use super::credential::{Credential, CredentialStore, StoreError};
use crate::types::{read, write};

/// Process-wide credential context shared by the resource client and the
/// session guard. Cloning is cheap and every clone sees the same credential.
///
/// Lifecycle: [`Session::hydrate`] loads whatever the store holds,
/// [`Session::establish`] installs a fresh pair after login,
/// [`Session::replace_access`] is the refresh path and [`Session::clear`]
/// tears everything down on logout.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    store: Arc<dyn CredentialStore>,
    current: RwLock<Option<Credential>>,
}

impl Session {
    /// Empty session backed by `store`; nothing is read from it
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                store,
                current: RwLock::new(None),
            }),
        }
    }

    /// Session initialised from the store's current contents
    pub fn hydrate(store: Arc<dyn CredentialStore>) -> Result<Self, StoreError> {
        let current = store.load()?;
        tracing::debug!("Session hydrated (credential present: {})", current.is_some());
        Ok(Self {
            inner: Arc::new(SessionInner {
                store,
                current: RwLock::new(current),
            }),
        })
    }

    pub fn credential(&self) -> Option<Credential> {
        read(&self.inner.current).clone()
    }

    pub fn access_token(&self) -> Option<String> {
        read(&self.inner.current).as_ref().map(|c| c.access.clone())
    }

    pub fn refresh_token(&self) -> Option<String> {
        read(&self.inner.current).as_ref().map(|c| c.refresh.clone())
    }

    pub fn is_present(&self) -> bool {
        read(&self.inner.current).is_some()
    }

    /// Install a freshly issued pair (login)
    pub fn establish(&self, credential: Credential) -> Result<(), StoreError> {
        self.inner.store.save(&credential)?;
        *write(&self.inner.current) = Some(credential);
        Ok(())
    }

    /// Swap in a refreshed access token. The in-memory session is updated
    /// even when persisting fails; the error is still reported.
    pub fn replace_access(&self, access: String) -> Result<(), StoreError> {
        let updated = {
            let mut current = write(&self.inner.current);
            match current.as_mut() {
                Some(credential) => {
                    credential.access = access;
                    credential.clone()
                }
                // Cleared while the refresh was in flight; do not resurrect it
                None => return Ok(()),
            }
        };
        self.inner.store.save(&updated)
    }

    /// Drop both tokens from memory and storage
    pub fn clear(&self) -> Result<(), StoreError> {
        *write(&self.inner.current) = None;
        self.inner.store.clear()
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("present", &self.is_present())
            .finish()
    }
}
