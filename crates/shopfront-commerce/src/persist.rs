//! Snapshot persistence for the state containers.

use crate::error::CommerceError;
use serde::{de::DeserializeOwned, Serialize};
use shopfront_kv::StateSlot;

/// Storage seam for one container's whole state.
///
/// Implemented by [`StateSlot`] for any serializable state, so a container
/// can be backed by memory, files, or any other [`shopfront_kv::KeyValueStore`]
/// without touching its business logic.
pub trait StateRepository<S>: Send + Sync {
    /// Rehydrate the persisted snapshot, `None` if nothing was saved yet.
    fn load(&self) -> Result<Option<S>, CommerceError>;

    /// Replace the persisted snapshot.
    fn save(&self, state: &S) -> Result<(), CommerceError>;
}

impl<S> StateRepository<S> for StateSlot<S>
where
    S: Serialize + DeserializeOwned,
{
    fn load(&self) -> Result<Option<S>, CommerceError> {
        Ok(StateSlot::load(self)?)
    }

    fn save(&self, state: &S) -> Result<(), CommerceError> {
        StateSlot::save(self, state)?;
        Ok(())
    }
}

/// Live container state paired with its repository.
///
/// Mutations run against a working copy which is saved before it replaces
/// the live state. A mutation that fails, or whose save fails, leaves the
/// live state untouched.
pub(crate) struct Persisted<S> {
    name: &'static str,
    state: S,
    repo: Box<dyn StateRepository<S>>,
}

impl<S> Persisted<S>
where
    S: Clone + Default,
{
    /// Rehydrate from `repo`, starting empty when nothing was saved.
    pub(crate) fn load(
        name: &'static str,
        repo: Box<dyn StateRepository<S>>,
    ) -> Result<Self, CommerceError> {
        let state = match repo.load()? {
            Some(state) => state,
            None => {
                tracing::debug!(container = name, "no snapshot, starting empty");
                S::default()
            }
        };
        Ok(Self { name, state, repo })
    }

    pub(crate) fn get(&self) -> &S {
        &self.state
    }

    /// Apply `f` to a working copy, persist it, then commit it.
    pub(crate) fn update<T>(
        &mut self,
        f: impl FnOnce(&mut S) -> Result<T, CommerceError>,
    ) -> Result<T, CommerceError> {
        let mut next = self.state.clone();
        let out = f(&mut next)?;
        if let Err(e) = self.repo.save(&next) {
            tracing::error!(container = self.name, error = %e, "failed to persist snapshot");
            return Err(e);
        }
        self.state = next;
        Ok(out)
    }

    /// Persist the live state as-is.
    pub(crate) fn flush(&self) -> Result<(), CommerceError> {
        self.repo.save(&self.state)
    }
}

impl<S: std::fmt::Debug> std::fmt::Debug for Persisted<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Persisted")
            .field("name", &self.name)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shopfront_kv::{Cache, KvError, MemoryStore};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    struct FlakyRepo {
        fail: Arc<AtomicBool>,
    }

    impl StateRepository<Vec<u32>> for FlakyRepo {
        fn load(&self) -> Result<Option<Vec<u32>>, CommerceError> {
            Ok(None)
        }

        fn save(&self, _state: &Vec<u32>) -> Result<(), CommerceError> {
            if self.fail.load(Ordering::SeqCst) {
                Err(KvError::StoreError("disk full".to_string()).into())
            } else {
                Ok(())
            }
        }
    }

    #[test]
    fn test_update_commits_after_save() {
        let cache = Cache::new(Arc::new(MemoryStore::new()));
        let slot = StateSlot::<Vec<u32>>::new(cache.clone(), "numbers");
        let mut persisted: Persisted<Vec<u32>> =
            Persisted::load("numbers", Box::new(slot)).unwrap();

        persisted
            .update(|s| {
                s.push(1);
                Ok(())
            })
            .unwrap();

        assert_eq!(persisted.get(), &vec![1]);
        let reread = StateSlot::<Vec<u32>>::new(cache, "numbers").load().unwrap();
        assert_eq!(reread, Some(vec![1]));
    }

    #[test]
    fn test_failed_mutation_leaves_state() {
        let fail = Arc::new(AtomicBool::new(false));
        let mut persisted: Persisted<Vec<u32>> =
            Persisted::load("numbers", Box::new(FlakyRepo { fail: fail.clone() })).unwrap();

        let result: Result<(), CommerceError> = persisted.update(|s| {
            s.push(1);
            Err(CommerceError::Validation("nope".to_string()))
        });
        assert!(result.is_err());
        assert!(persisted.get().is_empty());
    }

    #[test]
    fn test_failed_save_leaves_state() {
        let fail = Arc::new(AtomicBool::new(true));
        let mut persisted: Persisted<Vec<u32>> =
            Persisted::load("numbers", Box::new(FlakyRepo { fail: fail.clone() })).unwrap();

        let result = persisted.update(|s| {
            s.push(1);
            Ok(())
        });
        assert!(matches!(result, Err(CommerceError::Storage(_))));
        assert!(persisted.get().is_empty());

        fail.store(false, Ordering::SeqCst);
        persisted
            .update(|s| {
                s.push(2);
                Ok(())
            })
            .unwrap();
        assert_eq!(persisted.get(), &vec![2]);
    }
}
