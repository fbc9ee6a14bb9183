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

//! Live resource counters of an RHI instance.

use crate::rhi::resource::ResourceType;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Counts the resources an RHI instance currently holds.
///
/// Updated by [`ResourceCore`](crate::rhi::resource::ResourceCore) so the
/// numbers are correct for every backend without extra bookkeeping.
#[derive(Debug)]
pub struct RhiStatistics {
    current: [AtomicUsize; ResourceType::COUNT],
    created: AtomicU64,
}

impl Default for RhiStatistics {
    fn default() -> Self {
        Self {
            current: std::array::from_fn(|_| AtomicUsize::new(0)),
            created: AtomicU64::new(0),
        }
    }
}

impl RhiStatistics {
    /// Records the creation of a resource.
    pub fn resource_created(&self, resource_type: ResourceType) {
        self.current[resource_type.index()].fetch_add(1, Ordering::Relaxed);
        self.created.fetch_add(1, Ordering::Relaxed);
    }

    /// Records the destruction of a resource.
    pub fn resource_destroyed(&self, resource_type: ResourceType) {
        self.current[resource_type.index()].fetch_sub(1, Ordering::Relaxed);
    }

    /// Number of live resources of one kind.
    pub fn current_number_of(&self, resource_type: ResourceType) -> usize {
        self.current[resource_type.index()].load(Ordering::Relaxed)
    }

    /// Number of live resources of every kind.
    pub fn number_of_current_resources(&self) -> usize {
        self.current
            .iter()
            .map(|counter| counter.load(Ordering::Relaxed))
            .sum()
    }

    /// Number of resources created over the lifetime of the instance.
    pub fn number_of_created_resources(&self) -> u64 {
        self.created.load(Ordering::Relaxed)
    }

    /// Logs every kind with live resources. Used to report leaks at shutdown.
    pub fn debug_output_current_resources(&self) {
        for resource_type in ResourceType::ALL {
            let count = self.current_number_of(resource_type);
            if count > 0 {
                log::info!("RhiStatistics: {count} live {resource_type:?}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_per_kind() {
        let stats = RhiStatistics::default();
        stats.resource_created(ResourceType::Texture2D);
        stats.resource_created(ResourceType::Texture2D);
        stats.resource_created(ResourceType::SamplerState);
        stats.resource_destroyed(ResourceType::Texture2D);

        assert_eq!(stats.current_number_of(ResourceType::Texture2D), 1);
        assert_eq!(stats.current_number_of(ResourceType::SamplerState), 1);
        assert_eq!(stats.number_of_current_resources(), 2);
        assert_eq!(stats.number_of_created_resources(), 3);
    }
}
