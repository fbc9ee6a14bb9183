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

//! Root signatures and resource groups.
//!
//! A root signature declares, per root parameter, the ordered descriptor
//! ranges a shader expects. A resource group fills exactly one descriptor
//! table parameter with one resource per range, in range order. Shaders and
//! pipeline states are created against a root signature and only resource
//! groups matching the bound root signature may be set.

use crate::kiln_bitflags;
use crate::rhi::backend::RhiId;
use crate::rhi::error::ResourceError;
use crate::rhi::resource::{
    impl_resource, NativeResource, Resource, ResourceCore, ResourceType, SamplerState,
    SamplerStateDescriptor, ShaderStage,
};
use std::sync::Arc;

/// Maximum length in bytes of a descriptor range's base shader register name.
pub const MAXIMUM_DESCRIPTOR_RANGE_NAME_LENGTH: usize = 32;

/// How a descriptor range is accessed by shaders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DescriptorRangeType {
    /// Shader resource view (read-only textures and buffers).
    Srv,
    /// Unordered access view (read/write textures and buffers).
    Uav,
    /// Uniform buffer view.
    Ubv,
    /// Sampler state.
    Sampler,
}

/// The shader stages a root parameter or range is visible to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ShaderVisibility {
    /// Every stage.
    #[default]
    All,
    /// Every graphics stage.
    AllGraphics,
    /// Vertex stage only.
    Vertex,
    /// Tessellation control stage only.
    TessellationControl,
    /// Tessellation evaluation stage only.
    TessellationEvaluation,
    /// Geometry stage only.
    Geometry,
    /// Fragment stage only.
    Fragment,
    /// Task stage only.
    Task,
    /// Mesh stage only.
    Mesh,
    /// Compute stage only.
    Compute,
}

impl ShaderVisibility {
    /// Whether a shader of `stage` sees resources with this visibility.
    pub const fn includes(self, stage: ShaderStage) -> bool {
        match self {
            ShaderVisibility::All => true,
            ShaderVisibility::AllGraphics => !matches!(stage, ShaderStage::Compute),
            ShaderVisibility::Vertex => matches!(stage, ShaderStage::Vertex),
            ShaderVisibility::TessellationControl => {
                matches!(stage, ShaderStage::TessellationControl)
            }
            ShaderVisibility::TessellationEvaluation => {
                matches!(stage, ShaderStage::TessellationEvaluation)
            }
            ShaderVisibility::Geometry => matches!(stage, ShaderStage::Geometry),
            ShaderVisibility::Fragment => matches!(stage, ShaderStage::Fragment),
            ShaderVisibility::Task => matches!(stage, ShaderStage::Task),
            ShaderVisibility::Mesh => matches!(stage, ShaderStage::Mesh),
            ShaderVisibility::Compute => matches!(stage, ShaderStage::Compute),
        }
    }

    /// The stages this visibility includes.
    pub fn stages(self) -> impl Iterator<Item = ShaderStage> {
        [
            ShaderStage::Vertex,
            ShaderStage::TessellationControl,
            ShaderStage::TessellationEvaluation,
            ShaderStage::Geometry,
            ShaderStage::Fragment,
            ShaderStage::Task,
            ShaderStage::Mesh,
            ShaderStage::Compute,
        ]
        .into_iter()
        .filter(move |stage| self.includes(*stage))
    }
}

/// One slot of a descriptor table.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DescriptorRange {
    /// Access type of the range.
    pub range_type: DescriptorRangeType,
    /// Number of descriptors in the range. Resource groups provide one.
    pub number_of_descriptors: u32,
    /// First shader register (binding number) of the range.
    pub base_shader_register: u32,
    /// Register space (descriptor set).
    pub register_space: u32,
    /// Name of the resource in shader source, for APIs that bind by name.
    pub base_shader_register_name: String,
    /// Stages that see the range.
    pub shader_visibility: ShaderVisibility,
    /// The resource kind the range expects.
    pub resource_type: ResourceType,
}

impl DescriptorRange {
    /// A read-only range for a buffer or texture kind. Uniform buffers get a
    /// uniform buffer view.
    pub fn new(
        resource_type: ResourceType,
        base_shader_register: u32,
        base_shader_register_name: impl Into<String>,
        shader_visibility: ShaderVisibility,
    ) -> Self {
        let range_type = match resource_type {
            ResourceType::UniformBuffer => DescriptorRangeType::Ubv,
            ResourceType::SamplerState => DescriptorRangeType::Sampler,
            _ => DescriptorRangeType::Srv,
        };
        Self {
            range_type,
            number_of_descriptors: 1,
            base_shader_register,
            register_space: 0,
            base_shader_register_name: base_shader_register_name.into(),
            shader_visibility,
            resource_type,
        }
    }

    /// A read/write range.
    pub fn unordered_access(
        resource_type: ResourceType,
        base_shader_register: u32,
        base_shader_register_name: impl Into<String>,
        shader_visibility: ShaderVisibility,
    ) -> Self {
        Self {
            range_type: DescriptorRangeType::Uav,
            ..Self::new(
                resource_type,
                base_shader_register,
                base_shader_register_name,
                shader_visibility,
            )
        }
    }

    /// A sampler range.
    pub fn sampler(base_shader_register: u32, shader_visibility: ShaderVisibility) -> Self {
        Self::new(
            ResourceType::SamplerState,
            base_shader_register,
            "",
            shader_visibility,
        )
    }

    /// Whether a resource of kind `actual` may fill this range.
    ///
    /// Texture ranges accept any texture dimension, buffer and sampler ranges
    /// require their exact kind.
    pub fn accepts(&self, actual: ResourceType) -> bool {
        if self.resource_type.is_texture() {
            actual.is_texture()
        } else {
            self.resource_type == actual
        }
    }
}

/// A sampler baked into the root signature.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StaticSampler {
    /// Sampling parameters.
    pub sampler: SamplerStateDescriptor,
    /// Shader register of the sampler.
    pub shader_register: u32,
    /// Register space of the sampler.
    pub register_space: u32,
    /// Stages that see the sampler.
    pub shader_visibility: ShaderVisibility,
}

/// One entry of a root signature.
#[derive(Debug, Clone, PartialEq)]
pub enum RootParameter {
    /// An ordered list of descriptor ranges filled by one resource group.
    DescriptorTable(Vec<DescriptorRange>),
    /// A sampler that needs no resource group.
    StaticSampler(StaticSampler),
}

impl RootParameter {
    /// The descriptor ranges of a table parameter.
    pub fn descriptor_ranges(&self) -> Option<&[DescriptorRange]> {
        match self {
            RootParameter::DescriptorTable(ranges) => Some(ranges),
            RootParameter::StaticSampler(_) => None,
        }
    }
}

kiln_bitflags! {
    /// Options of a root signature.
    pub struct RootSignatureFlags: u32 {
        /// No option.
        const NONE = 0;
        /// The signature is used with vertex input layouts.
        const ALLOW_INPUT_ASSEMBLER_INPUT_LAYOUT = 1 << 0;
        /// Hides root parameters from vertex shaders.
        const DENY_VERTEX_SHADER_ROOT_ACCESS = 1 << 1;
        /// Hides root parameters from tessellation control shaders.
        const DENY_TESSELLATION_CONTROL_SHADER_ROOT_ACCESS = 1 << 2;
        /// Hides root parameters from tessellation evaluation shaders.
        const DENY_TESSELLATION_EVALUATION_SHADER_ROOT_ACCESS = 1 << 3;
        /// Hides root parameters from geometry shaders.
        const DENY_GEOMETRY_SHADER_ROOT_ACCESS = 1 << 4;
        /// Hides root parameters from fragment shaders.
        const DENY_FRAGMENT_SHADER_ROOT_ACCESS = 1 << 5;
        /// The signature is used with stream output.
        const ALLOW_STREAM_OUTPUT = 1 << 6;
    }
}

/// Describes a root signature.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RootSignatureDescriptor {
    /// The root parameters, addressed by index.
    pub parameters: Vec<RootParameter>,
    /// Options.
    pub flags: RootSignatureFlags,
}

impl RootSignatureDescriptor {
    /// An empty root signature.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a descriptor table parameter.
    #[must_use]
    pub fn with_descriptor_table(mut self, ranges: Vec<DescriptorRange>) -> Self {
        self.parameters.push(RootParameter::DescriptorTable(ranges));
        self
    }

    /// Appends a static sampler parameter.
    #[must_use]
    pub fn with_static_sampler(mut self, sampler: StaticSampler) -> Self {
        self.parameters.push(RootParameter::StaticSampler(sampler));
        self
    }

    /// Sets the flags.
    #[must_use]
    pub fn with_flags(mut self, flags: RootSignatureFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Checks the parameters for structural errors.
    pub fn validate(&self) -> Result<(), ResourceError> {
        for (parameter_index, parameter) in self.parameters.iter().enumerate() {
            let Some(ranges) = parameter.descriptor_ranges() else {
                continue;
            };
            if ranges.is_empty() {
                return Err(ResourceError::InvalidArgument(format!(
                    "descriptor table {parameter_index} has no range"
                )));
            }
            for range in ranges {
                if range.number_of_descriptors != 1 {
                    return Err(ResourceError::InvalidArgument(format!(
                        "descriptor range '{}' of table {parameter_index} must hold exactly one descriptor",
                        range.base_shader_register_name
                    )));
                }
                if range.base_shader_register_name.len() > MAXIMUM_DESCRIPTOR_RANGE_NAME_LENGTH {
                    return Err(ResourceError::InvalidArgument(format!(
                        "descriptor range name '{}' is longer than {MAXIMUM_DESCRIPTOR_RANGE_NAME_LENGTH} bytes",
                        range.base_shader_register_name
                    )));
                }
                let is_sampler_kind = range.resource_type == ResourceType::SamplerState;
                let is_sampler_range = range.range_type == DescriptorRangeType::Sampler;
                if is_sampler_kind != is_sampler_range {
                    return Err(ResourceError::InvalidArgument(format!(
                        "descriptor range '{}' of table {parameter_index} mixes sampler and non-sampler kinds",
                        range.base_shader_register_name
                    )));
                }
                let bindable = range.resource_type.is_buffer()
                    || range.resource_type.is_texture()
                    || is_sampler_kind;
                if !bindable {
                    return Err(ResourceError::InvalidArgument(format!(
                        "{:?} cannot be bound through a descriptor range",
                        range.resource_type
                    )));
                }
            }
        }
        Ok(())
    }
}

/// A created root signature.
#[derive(Debug)]
pub struct RootSignature {
    core: ResourceCore,
    descriptor: RootSignatureDescriptor,
    native: Box<dyn NativeResource>,
}

impl RootSignature {
    /// Wraps a native root signature. Called by backends only.
    pub fn new(
        core: ResourceCore,
        descriptor: RootSignatureDescriptor,
        native: Box<dyn NativeResource>,
    ) -> Self {
        Self {
            core,
            descriptor,
            native,
        }
    }

    /// The layout the signature was created from.
    pub fn descriptor(&self) -> &RootSignatureDescriptor {
        &self.descriptor
    }

    /// The root parameters.
    pub fn parameters(&self) -> &[RootParameter] {
        &self.descriptor.parameters
    }

    /// Whether two signatures declare the same layout.
    ///
    /// Pipeline states and resource groups created against either can be
    /// used with the other.
    pub fn is_compatible_with(&self, other: &RootSignature) -> bool {
        std::ptr::eq(self, other) || self.descriptor == other.descriptor
    }

    /// The backend-private root signature object.
    pub fn native(&self) -> &dyn NativeResource {
        self.native.as_ref()
    }

    /// Checks a prospective resource group against one descriptor table.
    ///
    /// Returns the ranges of the table on success.
    pub fn validate_resource_group(
        &self,
        rhi_id: RhiId,
        root_parameter_index: u32,
        resources: &[Arc<dyn Resource>],
        sampler_states: Option<&[Option<Arc<SamplerState>>]>,
    ) -> Result<&[DescriptorRange], ResourceError> {
        let parameters = self.parameters();
        let parameter = parameters.get(root_parameter_index as usize).ok_or(
            ResourceError::InvalidRootParameter {
                root_parameter_index,
                number_of_parameters: parameters.len(),
            },
        )?;
        let ranges = parameter
            .descriptor_ranges()
            .ok_or(ResourceError::NotADescriptorTable {
                root_parameter_index,
            })?;

        if resources.is_empty() || resources.len() != ranges.len() {
            return Err(ResourceError::ArityMismatch {
                root_parameter_index,
                expected: ranges.len(),
                actual: resources.len(),
            });
        }
        if let Some(sampler_states) = sampler_states {
            if sampler_states.len() != resources.len() {
                return Err(ResourceError::InvalidArgument(format!(
                    "{} sampler states supplied for {} resources",
                    sampler_states.len(),
                    resources.len()
                )));
            }
            for sampler in sampler_states.iter().flatten() {
                if sampler.rhi_id() != rhi_id {
                    return Err(ResourceError::ForeignResource {
                        expected: rhi_id,
                        actual: sampler.rhi_id(),
                    });
                }
            }
        }

        for (range_index, (range, resource)) in ranges.iter().zip(resources).enumerate() {
            if resource.rhi_id() != rhi_id {
                return Err(ResourceError::ForeignResource {
                    expected: rhi_id,
                    actual: resource.rhi_id(),
                });
            }
            if !range.accepts(resource.resource_type()) {
                return Err(ResourceError::IncompatibleResource {
                    root_parameter_index,
                    range_index,
                    expected: range.resource_type,
                    actual: resource.resource_type(),
                });
            }
        }
        Ok(ranges)
    }
}

/// Resources filling one descriptor table of a root signature.
#[derive(Debug)]
pub struct ResourceGroup {
    core: ResourceCore,
    root_signature: Arc<RootSignature>,
    root_parameter_index: u32,
    resources: Vec<Arc<dyn Resource>>,
    sampler_states: Option<Vec<Option<Arc<SamplerState>>>>,
    native: Box<dyn NativeResource>,
}

impl ResourceGroup {
    /// Wraps a native resource group. Called by backends only, after
    /// [`RootSignature::validate_resource_group`] succeeded.
    pub fn new(
        core: ResourceCore,
        root_signature: Arc<RootSignature>,
        root_parameter_index: u32,
        resources: Vec<Arc<dyn Resource>>,
        sampler_states: Option<Vec<Option<Arc<SamplerState>>>>,
        native: Box<dyn NativeResource>,
    ) -> Self {
        Self {
            core,
            root_signature,
            root_parameter_index,
            resources,
            sampler_states,
            native,
        }
    }

    /// The root signature the group was created against.
    pub fn root_signature(&self) -> &Arc<RootSignature> {
        &self.root_signature
    }

    /// The descriptor table the group fills.
    pub fn root_parameter_index(&self) -> u32 {
        self.root_parameter_index
    }

    /// The resources, in descriptor range order.
    pub fn resources(&self) -> &[Arc<dyn Resource>] {
        &self.resources
    }

    /// The sampler state paired with each resource, if any.
    pub fn sampler_states(&self) -> Option<&[Option<Arc<SamplerState>>]> {
        self.sampler_states.as_deref()
    }

    /// The descriptor ranges the resources fill.
    pub fn descriptor_ranges(&self) -> &[DescriptorRange] {
        self.root_signature
            .parameters()
            .get(self.root_parameter_index as usize)
            .and_then(RootParameter::descriptor_ranges)
            .unwrap_or(&[])
    }

    /// The backend-private resource group object.
    pub fn native(&self) -> &dyn NativeResource {
        self.native.as_ref()
    }
}

impl_resource!(RootSignature, ResourceGroup);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_constructors_pick_the_access_type() {
        let ubv = DescriptorRange::new(
            ResourceType::UniformBuffer,
            0,
            "UniformBlockDynamicVs",
            ShaderVisibility::Vertex,
        );
        assert_eq!(ubv.range_type, DescriptorRangeType::Ubv);

        let srv = DescriptorRange::new(
            ResourceType::Texture2D,
            0,
            "AlbedoMap",
            ShaderVisibility::Fragment,
        );
        assert_eq!(srv.range_type, DescriptorRangeType::Srv);

        let sampler = DescriptorRange::sampler(0, ShaderVisibility::Fragment);
        assert_eq!(sampler.range_type, DescriptorRangeType::Sampler);
        assert_eq!(sampler.resource_type, ResourceType::SamplerState);

        let uav = DescriptorRange::unordered_access(
            ResourceType::StructuredBuffer,
            1,
            "OutputBuffer",
            ShaderVisibility::Compute,
        );
        assert_eq!(uav.range_type, DescriptorRangeType::Uav);
    }

    #[test]
    fn texture_ranges_accept_any_dimension() {
        let range = DescriptorRange::new(
            ResourceType::Texture2D,
            0,
            "AlbedoMap",
            ShaderVisibility::Fragment,
        );
        assert!(range.accepts(ResourceType::Texture2DArray));
        assert!(range.accepts(ResourceType::TextureCube));
        assert!(!range.accepts(ResourceType::TextureBuffer));

        let buffer_range = DescriptorRange::new(
            ResourceType::TextureBuffer,
            0,
            "InstanceTextureBuffer",
            ShaderVisibility::Vertex,
        );
        assert!(!buffer_range.accepts(ResourceType::StructuredBuffer));
        assert!(buffer_range.accepts(ResourceType::TextureBuffer));
    }

    #[test]
    fn descriptor_validation_rejects_malformed_tables() {
        assert!(RootSignatureDescriptor::new()
            .with_descriptor_table(Vec::new())
            .validate()
            .is_err());

        let long_name = "X".repeat(MAXIMUM_DESCRIPTOR_RANGE_NAME_LENGTH + 1);
        assert!(RootSignatureDescriptor::new()
            .with_descriptor_table(vec![DescriptorRange::new(
                ResourceType::UniformBuffer,
                0,
                long_name,
                ShaderVisibility::All,
            )])
            .validate()
            .is_err());

        let mut mixed = DescriptorRange::sampler(0, ShaderVisibility::Fragment);
        mixed.range_type = DescriptorRangeType::Srv;
        assert!(RootSignatureDescriptor::new()
            .with_descriptor_table(vec![mixed])
            .validate()
            .is_err());

        let vertex_array_range = DescriptorRange::new(
            ResourceType::VertexArray,
            0,
            "Nope",
            ShaderVisibility::All,
        );
        assert!(RootSignatureDescriptor::new()
            .with_descriptor_table(vec![vertex_array_range])
            .validate()
            .is_err());
    }

    #[test]
    fn visibility_stages() {
        let graphics: Vec<_> = ShaderVisibility::AllGraphics.stages().collect();
        assert!(!graphics.contains(&ShaderStage::Compute));
        assert_eq!(graphics.len(), 7);
        assert_eq!(ShaderVisibility::Fragment.stages().count(), 1);
        assert!(ShaderVisibility::All.includes(ShaderStage::Compute));
    }
}
