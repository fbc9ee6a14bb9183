// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! A registry of lazily created resources shared by every user of a kind.
//!
//! Some resources are identical for every instance of a scene item kind (a
//! unit quad vertex array, a sky box mesh...). The [`SharedResourceRegistry`]
//! creates such a resource on the first acquire, hands out clones of the same
//! `Arc` while anyone holds one, and lets it drop with its last user.
//!
//! # Design
//!
//! The registry only keeps [`Weak`] references, so it never extends the
//! lifetime of what it tracks. It is an explicit object owned by whoever
//! needs it rather than file-scope state.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, Weak};

type SharedKey = (TypeId, &'static str);
type SharedSlot = Arc<Mutex<Option<Weak<dyn Any + Send + Sync>>>>;

fn lock_slot(slot: &SharedSlot) -> MutexGuard<'_, Option<Weak<dyn Any + Send + Sync>>> {
    slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn is_live(entry: &Option<Weak<dyn Any + Send + Sync>>) -> bool {
    entry.as_ref().is_some_and(|weak| weak.strong_count() > 0)
}

/// Shared resources keyed by type and name.
///
/// Each key owns its own slot. Creating one resource only locks that slot,
/// so a constructor may acquire other shared resources from the same
/// registry (a sky box built on the shared unit quad).
///
/// # Example
///
/// ```rust
/// use kiln_core::rhi::shared::SharedResourceRegistry;
/// use std::sync::Arc;
///
/// struct UnitQuad { vertices: u32 }
///
/// let registry = SharedResourceRegistry::new();
/// let first = registry
///     .acquire("unit_quad", || Ok::<_, ()>(Arc::new(UnitQuad { vertices: 4 })))
///     .unwrap();
/// let second = registry
///     .acquire("unit_quad", || Ok::<_, ()>(Arc::new(UnitQuad { vertices: 0 })))
///     .unwrap();
///
/// assert!(Arc::ptr_eq(&first, &second));
/// assert_eq!(second.vertices, 4);
/// ```
#[derive(Debug, Default)]
pub struct SharedResourceRegistry {
    entries: Mutex<HashMap<SharedKey, SharedSlot>>,
}

impl SharedResourceRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, map_key: SharedKey) -> SharedSlot {
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(entries.entry(map_key).or_default())
    }

    /// Returns the live resource registered under `key`, or creates it.
    ///
    /// `create` runs only when no user holds the resource anymore. Its error
    /// is returned as-is and nothing is registered. Concurrent first acquires
    /// of one key build the resource once. `create` must not acquire its own
    /// key.
    pub fn acquire<T, E>(
        &self,
        key: &'static str,
        create: impl FnOnce() -> Result<Arc<T>, E>,
    ) -> Result<Arc<T>, E>
    where
        T: Send + Sync + 'static,
    {
        let map_key = (TypeId::of::<T>(), key);
        let slot = self.slot(map_key);
        let mut entry = lock_slot(&slot);

        if let Some(existing) = entry
            .as_ref()
            .and_then(Weak::upgrade)
            .and_then(|any| any.downcast::<T>().ok())
        {
            return Ok(existing);
        }

        match create() {
            Ok(created) => {
                let erased: Arc<dyn Any + Send + Sync> = created.clone();
                *entry = Some(Arc::downgrade(&erased));
                log::debug!("SharedResourceRegistry: Created shared '{key}'");
                Ok(created)
            }
            Err(error) => {
                drop(entry);
                self.forget_if_dead(map_key, &slot);
                Err(error)
            }
        }
    }

    fn forget_if_dead(&self, map_key: SharedKey, slot: &SharedSlot) {
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let dead = entries.get(&map_key).is_some_and(|current| {
            Arc::ptr_eq(current, slot)
                && current.try_lock().is_ok_and(|entry| !is_live(&entry))
        });
        if dead {
            entries.remove(&map_key);
        }
    }

    /// Whether a resource of type `T` registered under `key` is still alive.
    #[must_use]
    pub fn is_alive<T: Send + Sync + 'static>(&self, key: &'static str) -> bool {
        let slot = match self.entries.lock() {
            Ok(entries) => entries.get(&(TypeId::of::<T>(), key)).cloned(),
            Err(_) => None,
        };
        match slot {
            Some(slot) => {
                let entry = lock_slot(&slot);
                is_live(&entry)
            }
            None => false,
        }
    }

    /// Forgets entries whose resource was released.
    ///
    /// Slots with a creation in progress are kept.
    pub fn purge(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.retain(|_, slot| slot.try_lock().map_or(true, |entry| is_live(&entry)));
        }
    }

    /// Returns the number of tracked entries, released ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    /// Returns `true` if nothing was ever registered or everything was purged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeVertexArray {
        name: String,
    }

    struct FakeSkyBox {
        quad: Arc<FakeVertexArray>,
    }

    #[test]
    fn test_first_acquire_creates() {
        let registry = SharedResourceRegistry::new();
        let created = AtomicUsize::new(0);
        let make = || {
            created.fetch_add(1, Ordering::SeqCst);
            Ok::<_, ()>(Arc::new(FakeVertexArray {
                name: "quad".to_string(),
            }))
        };

        let first = registry.acquire("quad", make).unwrap();
        let second = registry.acquire("quad", make).unwrap();

        assert_eq!(created.load(Ordering::SeqCst), 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.name, "quad");
    }

    #[test]
    fn test_last_release_drops_the_resource() {
        let registry = SharedResourceRegistry::new();
        let quad = registry
            .acquire("quad", || {
                Ok::<_, ()>(Arc::new(FakeVertexArray {
                    name: "quad".to_string(),
                }))
            })
            .unwrap();
        assert!(registry.is_alive::<FakeVertexArray>("quad"));

        drop(quad);
        assert!(!registry.is_alive::<FakeVertexArray>("quad"));

        registry.purge();
        assert!(registry.is_empty());
    }

    #[test]
    fn test_types_do_not_collide() {
        let registry = SharedResourceRegistry::new();
        let quad = registry
            .acquire("shared", || {
                Ok::<_, ()>(Arc::new(FakeVertexArray {
                    name: "quad".to_string(),
                }))
            })
            .unwrap();
        let _sky = registry
            .acquire("shared", || {
                Ok::<_, ()>(Arc::new(FakeSkyBox {
                    quad: Arc::clone(&quad),
                }))
            })
            .unwrap();

        assert_eq!(registry.len(), 2);
        assert!(registry.is_alive::<FakeSkyBox>("shared"));
    }

    #[test]
    fn test_failed_creation_registers_nothing() {
        let registry = SharedResourceRegistry::new();
        let result = registry.acquire::<FakeSkyBox, _>("sky", || Err("no device"));
        assert_eq!(result.err(), Some("no device"));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_creation_may_acquire_other_shared_resources() {
        let registry = Arc::new(SharedResourceRegistry::new());
        let (done_tx, done_rx) = flume::bounded(1);

        let worker_registry = Arc::clone(&registry);
        std::thread::spawn(move || {
            let sky = worker_registry.acquire("sky_box", || {
                let quad = worker_registry.acquire("unit_quad", || {
                    Ok::<_, ()>(Arc::new(FakeVertexArray {
                        name: "quad".to_string(),
                    }))
                })?;
                Ok(Arc::new(FakeSkyBox { quad }))
            });
            let _ = done_tx.send(sky.map(|sky| sky.quad.name.clone()));
        });

        let result: Result<String, ()> = done_rx
            .recv_timeout(std::time::Duration::from_secs(5))
            .expect("nested acquire finished");
        assert_eq!(result, Ok("quad".to_string()));
        assert_eq!(registry.len(), 2);
    }
}
