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

//! Backend identification.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU32, Ordering};

/// The native graphics API family an RHI instance talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BackendType {
    /// Headless backend that records instead of rendering.
    Null,
    /// Desktop OpenGL.
    OpenGL,
    /// OpenGL ES 3.
    OpenGLES3,
    /// Vulkan.
    Vulkan,
    /// Direct3D 9.
    Direct3D9,
    /// Direct3D 10.
    Direct3D10,
    /// Direct3D 11.
    Direct3D11,
    /// Direct3D 12.
    Direct3D12,
}

impl BackendType {
    /// Every known backend.
    pub const ALL: [BackendType; 8] = [
        BackendType::Null,
        BackendType::OpenGL,
        BackendType::OpenGLES3,
        BackendType::Vulkan,
        BackendType::Direct3D9,
        BackendType::Direct3D10,
        BackendType::Direct3D11,
        BackendType::Direct3D12,
    ];

    /// The canonical backend name used for selection by name.
    pub const fn name(self) -> &'static str {
        match self {
            BackendType::Null => "Null",
            BackendType::OpenGL => "OpenGL",
            BackendType::OpenGLES3 => "OpenGLES3",
            BackendType::Vulkan => "Vulkan",
            BackendType::Direct3D9 => "Direct3D9",
            BackendType::Direct3D10 => "Direct3D10",
            BackendType::Direct3D11 => "Direct3D11",
            BackendType::Direct3D12 => "Direct3D12",
        }
    }

    /// How the native API binds resources to shaders.
    pub const fn binding_model(self) -> BindingModel {
        match self {
            BackendType::Vulkan | BackendType::Direct3D12 => BindingModel::DescriptorTables,
            _ => BindingModel::Slots,
        }
    }
}

impl fmt::Display for BackendType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BackendType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BackendType::ALL
            .iter()
            .copied()
            .find(|backend| backend.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| s.to_string())
    }
}

/// The resource binding model of a native API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BindingModel {
    /// Every resource is bound to a numbered slot per shader stage
    /// (OpenGL, Direct3D 9/10/11).
    #[default]
    Slots,
    /// Groups of resources are bound as descriptor tables (Vulkan, Direct3D 12).
    DescriptorTables,
}

/// Identifies the RHI instance that created a resource.
///
/// Resources of one instance must never be handed to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RhiId(pub u32);

static NEXT_RHI_ID: AtomicU32 = AtomicU32::new(1);

impl RhiId {
    /// Allocates a process-unique instance id.
    pub fn next() -> Self {
        RhiId(NEXT_RHI_ID.fetch_add(1, Ordering::Relaxed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_names_round_trip_case_insensitively() {
        for backend in BackendType::ALL {
            assert_eq!(backend.name().parse::<BackendType>(), Ok(backend));
        }
        assert_eq!("vulkan".parse::<BackendType>(), Ok(BackendType::Vulkan));
        assert!("Metal".parse::<BackendType>().is_err());
    }

    #[test]
    fn table_based_apis_use_descriptor_tables() {
        assert_eq!(
            BackendType::Direct3D12.binding_model(),
            BindingModel::DescriptorTables
        );
        assert_eq!(BackendType::OpenGL.binding_model(), BindingModel::Slots);
    }

    #[test]
    fn rhi_ids_are_unique() {
        let first = RhiId::next();
        let second = RhiId::next();
        assert_ne!(first, second);
    }
}
