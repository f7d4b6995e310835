//! Native source handles and their reuse pool.

use crate::backend::AlBackend;
use crate::error::{OpenAlError, Result};
use crate::sink::SourceId;
use crate::sys::*;
use std::collections::HashMap;

/// A native OpenAL source name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceHandle(ALuint);

impl SourceHandle {
    pub fn raw(self) -> ALuint {
        self.0
    }
}

/// Result of [`HandleAllocator::acquire`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Acquired {
    pub handle: SourceHandle,
    /// `false` if the entity already owned this handle before the call.
    pub fresh: bool,
    /// `true` if the handle came out of the reuse pool.
    pub recycled: bool,
}

/// Binds entities to native source handles.
///
/// Handles released by detached entities are kept in a pool and handed out
/// again once the native source is no longer playing or paused.
#[derive(Debug, Default)]
pub struct HandleAllocator {
    assigned: HashMap<SourceId, SourceHandle>,
    free: Vec<SourceHandle>,
}

impl HandleAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn acquire<B: AlBackend + ?Sized>(
        &mut self,
        entity: SourceId,
        backend: &B,
    ) -> Result<Acquired> {
        if let Some(handle) = self.assigned.get(&entity) {
            return Ok(Acquired {
                handle: *handle,
                fresh: false,
                recycled: false,
            });
        }

        // A pooled name deleted behind our back cannot be handed out again.
        self.free.retain(|handle| backend.is_source(handle.0));
        let reusable = self.free.iter().position(|handle| {
            let state = backend.get_source_i(handle.0, AL_SOURCE_STATE);
            state == AL_INITIAL || state == AL_STOPPED
        });
        // Querying pooled handles must not leak an error into the next check.
        backend.get_error();

        let (handle, recycled) = match reusable {
            Some(index) => {
                let handle = self.free.swap_remove(index);
                log::debug!("Reusing source handle {} for {}", handle.0, entity);
                (handle, true)
            }
            None => (generate(backend)?, false),
        };

        self.assigned.insert(entity, handle);
        Ok(Acquired {
            handle,
            fresh: true,
            recycled,
        })
    }

    /// Moves the entity's handle into the reuse pool.
    pub fn release(&mut self, entity: SourceId) -> Option<SourceHandle> {
        let handle = self.assigned.remove(&entity)?;
        log::debug!("Released source handle {} from {}", handle.0, entity);
        self.free.push(handle);
        Some(handle)
    }

    /// Unbinds the entity's handle without pooling it, for callers that
    /// destroy the native source themselves.
    pub fn forget(&mut self, entity: SourceId) -> Option<SourceHandle> {
        self.assigned.remove(&entity)
    }

    pub fn handle_of(&self, entity: SourceId) -> Option<SourceHandle> {
        self.assigned.get(&entity).copied()
    }

    pub fn pooled(&self) -> &[SourceHandle] {
        &self.free
    }

    /// Takes every handle, assigned and pooled.
    pub fn drain(&mut self) -> Vec<SourceHandle> {
        let mut handles: Vec<SourceHandle> = self.assigned.drain().map(|(_, h)| h).collect();
        handles.append(&mut self.free);
        handles
    }
}

fn generate<B: AlBackend + ?Sized>(backend: &B) -> Result<SourceHandle> {
    let mut ids = [0 as ALuint; 1];
    backend.gen_sources(&mut ids);
    let code = backend.get_error();
    if code != AL_NO_ERROR || ids[0] == 0 {
        log::warn!("alGenSources failed: {:#x}", code);
        return Err(OpenAlError::ResourceExhausted {
            resource: "source",
            code,
        });
    }
    log::debug!("Generated source handle {}", ids[0]);
    Ok(SourceHandle(ids[0]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Call, MockBackend};

    #[test]
    fn test_acquire_is_idempotent() {
        let backend = MockBackend::new();
        let mut allocator = HandleAllocator::new();

        let first = allocator.acquire(SourceId(1), &backend).unwrap();
        assert!(first.fresh);
        assert!(!first.recycled);

        let second = allocator.acquire(SourceId(1), &backend).unwrap();
        assert!(!second.fresh);
        assert_eq!(first.handle, second.handle);
        assert_eq!(backend.calls(), vec![Call::GenSources(1)]);
    }

    #[test]
    fn test_distinct_entities_get_distinct_handles() {
        let backend = MockBackend::new();
        let mut allocator = HandleAllocator::new();

        let a = allocator.acquire(SourceId(1), &backend).unwrap().handle;
        let b = allocator.acquire(SourceId(2), &backend).unwrap().handle;
        assert_ne!(a, b);
        assert_eq!(allocator.handle_of(SourceId(2)), Some(b));
    }

    #[test]
    fn test_released_handle_reused_once_stopped() {
        let backend = MockBackend::new();
        let mut allocator = HandleAllocator::new();

        let handle = allocator.acquire(SourceId(1), &backend).unwrap().handle;
        backend.source_play_v(&[handle.raw()]);
        assert_eq!(allocator.release(SourceId(1)), Some(handle));
        assert_eq!(allocator.pooled(), &[handle]);

        // Still playing: a new native source is generated.
        let other = allocator.acquire(SourceId(2), &backend).unwrap();
        assert_ne!(other.handle, handle);
        assert!(!other.recycled);

        backend.source_stop_v(&[handle.raw()]);
        let reused = allocator.acquire(SourceId(3), &backend).unwrap();
        assert_eq!(reused.handle, handle);
        assert!(reused.recycled);
        assert!(allocator.pooled().is_empty());
    }

    #[test]
    fn test_deleted_pooled_handle_is_dropped() {
        let backend = MockBackend::new();
        let mut allocator = HandleAllocator::new();
        let handle = allocator.acquire(SourceId(1), &backend).unwrap().handle;
        allocator.release(SourceId(1));
        backend.delete_sources(&[handle.raw()]);

        let next = allocator.acquire(SourceId(2), &backend).unwrap();
        assert_ne!(next.handle, handle);
        assert!(!next.recycled);
        assert!(allocator.pooled().is_empty());
    }

    #[test]
    fn test_release_unknown_entity() {
        let mut allocator = HandleAllocator::new();
        assert_eq!(allocator.release(SourceId(9)), None);
        assert!(allocator.pooled().is_empty());
    }

    #[test]
    fn test_refused_allocation_is_resource_exhausted() {
        let backend = MockBackend::new();
        backend.refuse_allocation(Some(AL_OUT_OF_MEMORY));
        let mut allocator = HandleAllocator::new();

        let err = allocator.acquire(SourceId(1), &backend).unwrap_err();
        assert!(matches!(
            err,
            OpenAlError::ResourceExhausted {
                resource: "source",
                code: AL_OUT_OF_MEMORY
            }
        ));
        assert_eq!(allocator.handle_of(SourceId(1)), None);
        assert_eq!(backend.get_error(), AL_NO_ERROR);
    }

    #[test]
    fn test_drain_returns_everything() {
        let backend = MockBackend::new();
        let mut allocator = HandleAllocator::new();
        allocator.acquire(SourceId(1), &backend).unwrap();
        allocator.acquire(SourceId(2), &backend).unwrap();
        allocator.release(SourceId(1));

        let mut raw: Vec<ALuint> = allocator.drain().into_iter().map(|h| h.raw()).collect();
        raw.sort();
        assert_eq!(raw, vec![1, 2]);
        assert!(allocator.pooled().is_empty());
        assert_eq!(allocator.handle_of(SourceId(2)), None);
    }
}
