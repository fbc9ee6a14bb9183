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

//! Resource objects.
//!
//! Every GPU-side object is a struct embedding a [`ResourceCore`] and an
//! opaque, backend-private native object. Handles are `Arc<T>`: the native
//! object is released exactly when the last handle drops, there is no
//! explicit destroy call.

pub mod buffer;
pub mod query;
pub mod sampler;
pub mod shader;
pub mod texture;

pub use self::buffer::*;
pub use self::query::*;
pub use self::sampler::*;
pub use self::shader::*;
pub use self::texture::*;

use crate::rhi::backend::RhiId;
use crate::rhi::statistics::RhiStatistics;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// The kind of a resource object.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceType {
    RootSignature,
    ResourceGroup,
    GraphicsProgram,
    VertexArray,
    RenderPass,
    QueryPool,
    SwapChain,
    Framebuffer,
    IndexBuffer,
    VertexBuffer,
    TextureBuffer,
    StructuredBuffer,
    IndirectBuffer,
    UniformBuffer,
    Texture1D,
    Texture1DArray,
    Texture2D,
    Texture2DArray,
    Texture3D,
    TextureCube,
    TextureCubeArray,
    GraphicsPipelineState,
    ComputePipelineState,
    SamplerState,
    VertexShader,
    TessellationControlShader,
    TessellationEvaluationShader,
    GeometryShader,
    FragmentShader,
    TaskShader,
    MeshShader,
    ComputeShader,
}

impl ResourceType {
    /// Number of resource kinds.
    pub const COUNT: usize = 32;

    /// Every resource kind, in declaration order.
    pub const ALL: [ResourceType; Self::COUNT] = [
        ResourceType::RootSignature,
        ResourceType::ResourceGroup,
        ResourceType::GraphicsProgram,
        ResourceType::VertexArray,
        ResourceType::RenderPass,
        ResourceType::QueryPool,
        ResourceType::SwapChain,
        ResourceType::Framebuffer,
        ResourceType::IndexBuffer,
        ResourceType::VertexBuffer,
        ResourceType::TextureBuffer,
        ResourceType::StructuredBuffer,
        ResourceType::IndirectBuffer,
        ResourceType::UniformBuffer,
        ResourceType::Texture1D,
        ResourceType::Texture1DArray,
        ResourceType::Texture2D,
        ResourceType::Texture2DArray,
        ResourceType::Texture3D,
        ResourceType::TextureCube,
        ResourceType::TextureCubeArray,
        ResourceType::GraphicsPipelineState,
        ResourceType::ComputePipelineState,
        ResourceType::SamplerState,
        ResourceType::VertexShader,
        ResourceType::TessellationControlShader,
        ResourceType::TessellationEvaluationShader,
        ResourceType::GeometryShader,
        ResourceType::FragmentShader,
        ResourceType::TaskShader,
        ResourceType::MeshShader,
        ResourceType::ComputeShader,
    ];

    /// Position of the kind in [`ResourceType::ALL`].
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Returns `true` for every texture kind.
    pub const fn is_texture(self) -> bool {
        matches!(
            self,
            ResourceType::Texture1D
                | ResourceType::Texture1DArray
                | ResourceType::Texture2D
                | ResourceType::Texture2DArray
                | ResourceType::Texture3D
                | ResourceType::TextureCube
                | ResourceType::TextureCubeArray
        )
    }

    /// Returns `true` for every buffer kind.
    pub const fn is_buffer(self) -> bool {
        matches!(
            self,
            ResourceType::IndexBuffer
                | ResourceType::VertexBuffer
                | ResourceType::TextureBuffer
                | ResourceType::StructuredBuffer
                | ResourceType::IndirectBuffer
                | ResourceType::UniformBuffer
        )
    }

    /// Returns `true` for every shader kind.
    pub const fn is_shader(self) -> bool {
        matches!(
            self,
            ResourceType::VertexShader
                | ResourceType::TessellationControlShader
                | ResourceType::TessellationEvaluationShader
                | ResourceType::GeometryShader
                | ResourceType::FragmentShader
                | ResourceType::TaskShader
                | ResourceType::MeshShader
                | ResourceType::ComputeShader
        )
    }
}

/// Identifies one resource object within an RHI instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId(pub u64);

/// The backend-private part of a resource.
pub trait NativeResource: Any + Send + Sync + fmt::Debug {
    /// Allows the owning backend to downcast to its concrete native type.
    fn as_any(&self) -> &dyn Any;
}

/// Behaviour shared by every resource object.
pub trait Resource: Any + Send + Sync + fmt::Debug {
    /// The shared bookkeeping of the resource.
    fn core(&self) -> &ResourceCore;

    /// Upcast used for downcasting type-erased resources.
    fn as_any(&self) -> &dyn Any;

    /// The kind of the resource.
    fn resource_type(&self) -> ResourceType {
        self.core().resource_type()
    }

    /// The id of the resource within its RHI instance.
    fn id(&self) -> ResourceId {
        self.core().id()
    }

    /// The RHI instance that created the resource.
    fn rhi_id(&self) -> RhiId {
        self.core().rhi_id()
    }

    /// The debug name, empty when none was given or names are not kept.
    fn debug_name(&self) -> &str {
        self.core().debug_name()
    }
}

/// Bookkeeping embedded into every resource.
///
/// Registers the resource with the instance statistics when built and
/// unregisters it when dropped.
pub struct ResourceCore {
    resource_type: ResourceType,
    id: ResourceId,
    rhi_id: RhiId,
    debug_name: String,
    statistics: Arc<RhiStatistics>,
}

impl ResourceCore {
    /// Creates the bookkeeping of a new resource. Called by backends only.
    pub fn new(
        resource_type: ResourceType,
        id: ResourceId,
        rhi_id: RhiId,
        debug_name: &str,
        statistics: &Arc<RhiStatistics>,
    ) -> Self {
        statistics.resource_created(resource_type);
        Self {
            resource_type,
            id,
            rhi_id,
            debug_name: debug_name.to_string(),
            statistics: Arc::clone(statistics),
        }
    }

    /// The kind of the resource.
    pub fn resource_type(&self) -> ResourceType {
        self.resource_type
    }

    /// The id of the resource.
    pub fn id(&self) -> ResourceId {
        self.id
    }

    /// The owning RHI instance.
    pub fn rhi_id(&self) -> RhiId {
        self.rhi_id
    }

    /// The debug name of the resource.
    pub fn debug_name(&self) -> &str {
        &self.debug_name
    }
}

impl fmt::Debug for ResourceCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceCore")
            .field("resource_type", &self.resource_type)
            .field("id", &self.id)
            .field("rhi_id", &self.rhi_id)
            .field("debug_name", &self.debug_name)
            .finish()
    }
}

impl Drop for ResourceCore {
    fn drop(&mut self) {
        self.statistics.resource_destroyed(self.resource_type);
    }
}

/// Implements [`Resource`] for a struct with a `core: ResourceCore` field.
macro_rules! impl_resource {
    ($($name:ty),+ $(,)?) => {
        $(
            impl $crate::rhi::resource::Resource for $name {
                fn core(&self) -> &$crate::rhi::resource::ResourceCore {
                    &self.core
                }

                fn as_any(&self) -> &dyn std::any::Any {
                    self
                }
            }
        )+
    };
}
pub(crate) use impl_resource;

/// Returns `true` when both handles point at the same resource object.
pub fn same_resource(a: &dyn Resource, b: &dyn Resource) -> bool {
    a.rhi_id() == b.rhi_id() && a.id() == b.id()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_kinds_are_indexed_in_order() {
        for (position, kind) in ResourceType::ALL.iter().enumerate() {
            assert_eq!(kind.index(), position);
        }
    }

    #[test]
    fn kind_families() {
        assert!(ResourceType::TextureCubeArray.is_texture());
        assert!(!ResourceType::TextureBuffer.is_texture());
        assert!(ResourceType::TextureBuffer.is_buffer());
        assert!(ResourceType::MeshShader.is_shader());
        assert!(!ResourceType::SamplerState.is_buffer());
    }

    #[test]
    fn core_updates_statistics_on_drop() {
        let statistics = Arc::new(RhiStatistics::default());
        let core = ResourceCore::new(
            ResourceType::VertexBuffer,
            ResourceId(1),
            RhiId(7),
            "cube",
            &statistics,
        );
        assert_eq!(statistics.current_number_of(ResourceType::VertexBuffer), 1);
        assert_eq!(core.debug_name(), "cube");

        drop(core);
        assert_eq!(statistics.current_number_of(ResourceType::VertexBuffer), 0);
        assert_eq!(statistics.number_of_created_resources(), 1);
    }
}
