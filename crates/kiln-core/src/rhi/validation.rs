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

//! Creation-time checks shared by every backend.
//!
//! Backends run these before touching their native API so that every
//! backend rejects the same descriptors with the same errors.

use crate::rhi::backend::RhiId;
use crate::rhi::capabilities::Capabilities;
use crate::rhi::error::ResourceError;
use crate::rhi::format::{IndexBufferFormat, TextureFormat};
use crate::rhi::pipeline::{ComputePipelineStateDescriptor, GraphicsPipelineStateDescriptor};
use crate::rhi::render_target::{FramebufferAttachment, FramebufferDescriptor, RenderPassDescriptor};
use crate::rhi::resource::{
    BufferDescriptor, GraphicsProgramShaders, IndexBuffer, IndirectBufferFlags, Resource,
    SamplerStateDescriptor, ShaderStage, TextureDescriptor, TextureDimension, TextureFlags,
    VertexBuffer,
};
use crate::rhi::vertex::VertexAttributes;
use std::sync::Arc;

fn exceeded(capability: &'static str, requested: u64, maximum: u64) -> ResourceError {
    ResourceError::CapabilityExceeded {
        capability,
        requested,
        maximum,
    }
}

/// Fails when `resource` was created by another RHI instance.
pub fn ensure_same_rhi(rhi_id: RhiId, resource: &dyn Resource) -> Result<(), ResourceError> {
    if resource.rhi_id() == rhi_id {
        Ok(())
    } else {
        Err(ResourceError::ForeignResource {
            expected: rhi_id,
            actual: resource.rhi_id(),
        })
    }
}

/// Checks the size and initial data of any buffer.
pub fn validate_buffer(descriptor: &BufferDescriptor<'_>) -> Result<(), ResourceError> {
    if descriptor.number_of_bytes == 0 {
        return Err(ResourceError::InvalidArgument(format!(
            "buffer '{}' has a size of zero bytes",
            descriptor.label_str()
        )));
    }
    if let Some(data) = descriptor.data {
        if data.len() as u64 != descriptor.number_of_bytes as u64 {
            return Err(ResourceError::DataSizeMismatch {
                expected: descriptor.number_of_bytes as u64,
                actual: data.len() as u64,
            });
        }
    }
    Ok(())
}

/// Checks an index buffer holds a whole number of indices.
pub fn validate_index_buffer(
    descriptor: &BufferDescriptor<'_>,
    format: IndexBufferFormat,
) -> Result<(), ResourceError> {
    validate_buffer(descriptor)?;
    if descriptor.number_of_bytes % format.bytes_per_element() != 0 {
        return Err(ResourceError::InvalidArgument(format!(
            "index buffer size {} is not a multiple of the {:?} index size",
            descriptor.number_of_bytes, format
        )));
    }
    Ok(())
}

/// Checks a uniform buffer against the device uniform buffer limit.
///
/// A device without uniform buffer support still creates them; uploads into
/// them are dropped at dispatch.
pub fn validate_uniform_buffer(
    capabilities: &Capabilities,
    descriptor: &BufferDescriptor<'_>,
) -> Result<(), ResourceError> {
    validate_buffer(descriptor)?;
    let maximum = capabilities.maximum_uniform_buffer_size;
    if maximum > 0 && descriptor.number_of_bytes > maximum {
        return Err(exceeded(
            "maximum_uniform_buffer_size",
            descriptor.number_of_bytes as u64,
            maximum as u64,
        ));
    }
    Ok(())
}

/// Checks a texture buffer against the device texel limit.
pub fn validate_texture_buffer(
    capabilities: &Capabilities,
    descriptor: &BufferDescriptor<'_>,
    format: TextureFormat,
) -> Result<(), ResourceError> {
    validate_buffer(descriptor)?;
    if capabilities.maximum_texture_buffer_size == 0 {
        return Err(ResourceError::FeatureNotSupported("texture buffers".into()));
    }
    if format.is_compressed() || format.is_depth() {
        return Err(ResourceError::InvalidArgument(format!(
            "{format:?} cannot be used as texture buffer format"
        )));
    }
    let texels = descriptor.number_of_bytes / format.bytes_per_element();
    if texels > capabilities.maximum_texture_buffer_size {
        return Err(exceeded(
            "maximum_texture_buffer_size",
            texels as u64,
            capabilities.maximum_texture_buffer_size as u64,
        ));
    }
    Ok(())
}

/// Checks a structured buffer holds whole elements and fits the device limit.
pub fn validate_structured_buffer(
    capabilities: &Capabilities,
    descriptor: &BufferDescriptor<'_>,
    number_of_structure_bytes: u32,
) -> Result<(), ResourceError> {
    validate_buffer(descriptor)?;
    if capabilities.maximum_structured_buffer_size == 0 {
        return Err(ResourceError::FeatureNotSupported(
            "structured buffers".into(),
        ));
    }
    if number_of_structure_bytes == 0 || descriptor.number_of_bytes % number_of_structure_bytes != 0
    {
        return Err(ResourceError::InvalidArgument(format!(
            "structured buffer size {} is not a multiple of its {number_of_structure_bytes} byte element",
            descriptor.number_of_bytes
        )));
    }
    if descriptor.number_of_bytes > capabilities.maximum_structured_buffer_size {
        return Err(exceeded(
            "maximum_structured_buffer_size",
            descriptor.number_of_bytes as u64,
            capabilities.maximum_structured_buffer_size as u64,
        ));
    }
    Ok(())
}

/// Checks an indirect buffer declares what it holds and fits the device limit.
pub fn validate_indirect_buffer(
    capabilities: &Capabilities,
    descriptor: &BufferDescriptor<'_>,
    indirect_flags: IndirectBufferFlags,
) -> Result<(), ResourceError> {
    validate_buffer(descriptor)?;
    let draw_arguments =
        IndirectBufferFlags::DRAW_ARGUMENTS | IndirectBufferFlags::DRAW_INDEXED_ARGUMENTS;
    if !indirect_flags.intersects(draw_arguments) {
        return Err(ResourceError::InvalidArgument(
            "indirect buffer holds neither draw nor indexed draw arguments".into(),
        ));
    }
    if descriptor.number_of_bytes > capabilities.maximum_indirect_buffer_size {
        return Err(exceeded(
            "maximum_indirect_buffer_size",
            descriptor.number_of_bytes as u64,
            capabilities.maximum_indirect_buffer_size as u64,
        ));
    }
    Ok(())
}

/// Checks a vertex array has a buffer for each input slot, all from `rhi_id`.
pub fn validate_vertex_array(
    rhi_id: RhiId,
    vertex_attributes: &VertexAttributes,
    vertex_buffers: &[Arc<VertexBuffer>],
    index_buffer: Option<&Arc<IndexBuffer>>,
) -> Result<(), ResourceError> {
    let slots = vertex_attributes.number_of_input_slots();
    if (vertex_buffers.len() as u64) < slots {
        return Err(ResourceError::InvalidArgument(format!(
            "{} vertex buffers supplied for {slots} input slots",
            vertex_buffers.len()
        )));
    }
    for vertex_buffer in vertex_buffers {
        ensure_same_rhi(rhi_id, vertex_buffer.as_ref())?;
    }
    if let Some(index_buffer) = index_buffer {
        ensure_same_rhi(rhi_id, index_buffer.as_ref())?;
    }
    Ok(())
}

/// Checks a texture descriptor against the device limits.
pub fn validate_texture(
    capabilities: &Capabilities,
    descriptor: &TextureDescriptor<'_>,
) -> Result<(), ResourceError> {
    let maximum_dimension = capabilities.maximum_texture_dimension;
    for (axis, extent) in [
        ("width", descriptor.width),
        ("height", descriptor.height),
        ("depth", descriptor.depth),
    ] {
        if extent == 0 {
            return Err(ResourceError::InvalidArgument(format!(
                "texture '{}' has a {axis} of zero",
                descriptor.label_str()
            )));
        }
        if extent > maximum_dimension {
            return Err(exceeded(
                "maximum_texture_dimension",
                extent as u64,
                maximum_dimension as u64,
            ));
        }
    }

    let slices = descriptor.number_of_slices;
    let maximum_slices = match descriptor.dimension {
        TextureDimension::D1Array => Some((
            "maximum_number_of_1d_texture_array_slices",
            capabilities.maximum_number_of_1d_texture_array_slices,
        )),
        TextureDimension::D2Array => Some((
            "maximum_number_of_2d_texture_array_slices",
            capabilities.maximum_number_of_2d_texture_array_slices,
        )),
        TextureDimension::CubeArray => Some((
            "maximum_number_of_cube_texture_array_slices",
            capabilities.maximum_number_of_cube_texture_array_slices,
        )),
        _ => None,
    };
    match maximum_slices {
        Some((capability, 0)) => {
            return Err(ResourceError::FeatureNotSupported(format!(
                "{:?} textures ({capability} is 0)",
                descriptor.dimension
            )));
        }
        Some((capability, maximum)) => {
            if slices == 0 {
                return Err(ResourceError::InvalidArgument(
                    "texture arrays need at least one slice".into(),
                ));
            }
            if slices > maximum {
                return Err(exceeded(capability, slices as u64, maximum as u64));
            }
        }
        None if slices != 1 => {
            return Err(ResourceError::InvalidArgument(format!(
                "{:?} textures have exactly one slice, got {slices}",
                descriptor.dimension
            )));
        }
        None => {}
    }

    let is_cube = matches!(
        descriptor.dimension,
        TextureDimension::Cube | TextureDimension::CubeArray
    );
    if is_cube && descriptor.width != descriptor.height {
        return Err(ResourceError::InvalidArgument(format!(
            "cube texture faces must be square, got {}x{}",
            descriptor.width, descriptor.height
        )));
    }

    let samples = descriptor.number_of_multisamples;
    if samples == 0 || !samples.is_power_of_two() {
        return Err(ResourceError::InvalidArgument(format!(
            "{samples} is not a valid number of multisamples"
        )));
    }
    if samples > capabilities.maximum_number_of_multisamples {
        return Err(exceeded(
            "maximum_number_of_multisamples",
            samples as u64,
            capabilities.maximum_number_of_multisamples as u64,
        ));
    }
    if samples > 1
        && (descriptor.dimension != TextureDimension::D2
            || descriptor.flags.intersects(
                TextureFlags::GENERATE_MIPMAPS | TextureFlags::DATA_CONTAINS_MIPMAPS,
            )
            || descriptor.data.is_some())
    {
        return Err(ResourceError::InvalidArgument(
            "multisampled textures must be 2D, without mipmaps and initial data".into(),
        ));
    }

    if descriptor.format.is_compressed()
        && descriptor.flags.contains(TextureFlags::GENERATE_MIPMAPS)
    {
        return Err(ResourceError::InvalidArgument(format!(
            "mipmaps of {:?} textures cannot be generated",
            descriptor.format
        )));
    }
    if let Some(data) = descriptor.data {
        let expected = descriptor.expected_data_size();
        if data.len() as u64 != expected {
            return Err(ResourceError::DataSizeMismatch {
                expected,
                actual: data.len() as u64,
            });
        }
    }
    Ok(())
}

/// Checks sampler parameters against the device anisotropy limit.
pub fn validate_sampler_state(
    capabilities: &Capabilities,
    descriptor: &SamplerStateDescriptor,
) -> Result<(), ResourceError> {
    if descriptor.max_anisotropy > capabilities.maximum_anisotropy as u32 {
        return Err(exceeded(
            "maximum_anisotropy",
            descriptor.max_anisotropy as u64,
            capabilities.maximum_anisotropy as u64,
        ));
    }
    if descriptor.min_lod > descriptor.max_lod {
        return Err(ResourceError::InvalidArgument(format!(
            "sampler min_lod {} is above max_lod {}",
            descriptor.min_lod, descriptor.max_lod
        )));
    }
    Ok(())
}

/// Checks render pass attachment formats against the device limits.
pub fn validate_render_pass(
    capabilities: &Capabilities,
    descriptor: &RenderPassDescriptor<'_>,
) -> Result<(), ResourceError> {
    let colors = descriptor.color_attachment_texture_formats.len() as u64;
    let maximum = capabilities.maximum_number_of_simultaneous_render_targets as u64;
    if colors > maximum {
        return Err(exceeded(
            "maximum_number_of_simultaneous_render_targets",
            colors,
            maximum,
        ));
    }
    if let Some(format) = descriptor
        .color_attachment_texture_formats
        .iter()
        .find(|format| format.is_depth())
    {
        return Err(ResourceError::InvalidArgument(format!(
            "{format:?} cannot be a color attachment format"
        )));
    }
    if let Some(format) = descriptor.depth_stencil_attachment_texture_format {
        if !format.is_depth() {
            return Err(ResourceError::InvalidArgument(format!(
                "{format:?} cannot be a depth-stencil attachment format"
            )));
        }
    }
    if descriptor.number_of_multisamples == 0
        || descriptor.number_of_multisamples > capabilities.maximum_number_of_multisamples
    {
        return Err(exceeded(
            "maximum_number_of_multisamples",
            descriptor.number_of_multisamples as u64,
            capabilities.maximum_number_of_multisamples as u64,
        ));
    }
    Ok(())
}

fn attachment_size(
    rhi_id: RhiId,
    attachment: &FramebufferAttachment,
    expected_format: TextureFormat,
) -> Result<(u32, u32), ResourceError> {
    let texture = &attachment.texture;
    ensure_same_rhi(rhi_id, texture.as_ref())?;
    if texture.format() != expected_format {
        return Err(ResourceError::InvalidArgument(format!(
            "attachment '{}' is {:?}, the render pass expects {expected_format:?}",
            texture.debug_name(),
            texture.format()
        )));
    }
    if !texture.flags().contains(TextureFlags::RENDER_TARGET) {
        return Err(ResourceError::InvalidArgument(format!(
            "texture '{}' was not created as render target",
            texture.debug_name()
        )));
    }
    if attachment.mipmap_index >= texture.number_of_mipmaps() {
        return Err(ResourceError::InvalidArgument(format!(
            "attachment '{}' mipmap {} is out of range",
            texture.debug_name(),
            attachment.mipmap_index
        )));
    }
    let layers = texture.number_of_slices() * texture.dimension().faces_per_slice();
    if attachment.layer_index >= layers {
        return Err(ResourceError::InvalidArgument(format!(
            "attachment '{}' layer {} is out of range",
            texture.debug_name(),
            attachment.layer_index
        )));
    }
    Ok(texture.mipmap_width_and_height(attachment.mipmap_index))
}

/// Checks framebuffer attachments match their render pass and each other.
///
/// Returns the size of the renderable area.
pub fn validate_framebuffer(
    rhi_id: RhiId,
    descriptor: &FramebufferDescriptor<'_>,
) -> Result<(u32, u32), ResourceError> {
    let render_pass = &descriptor.render_pass;
    ensure_same_rhi(rhi_id, render_pass.as_ref())?;
    let formats = render_pass.color_attachment_texture_formats();
    if descriptor.color_attachments.len() != formats.len() {
        return Err(ResourceError::InvalidArgument(format!(
            "{} color attachments supplied for a render pass with {}",
            descriptor.color_attachments.len(),
            formats.len()
        )));
    }

    let mut sizes = Vec::with_capacity(formats.len() + 1);
    for (attachment, format) in descriptor.color_attachments.iter().zip(formats) {
        sizes.push(attachment_size(rhi_id, attachment, *format)?);
    }
    match (
        &descriptor.depth_stencil_attachment,
        render_pass.depth_stencil_attachment_texture_format(),
    ) {
        (Some(attachment), Some(format)) => {
            sizes.push(attachment_size(rhi_id, attachment, format)?)
        }
        (None, None) => {}
        _ => {
            return Err(ResourceError::InvalidArgument(
                "depth-stencil attachment does not match the render pass".into(),
            ))
        }
    }

    let Some(&first) = sizes.first() else {
        return Err(ResourceError::InvalidArgument(
            "framebuffer without attachments".into(),
        ));
    };
    if sizes.iter().any(|size| *size != first) {
        return Err(ResourceError::InvalidArgument(
            "framebuffer attachments differ in size".into(),
        ));
    }
    Ok(first)
}

/// Checks a shader stage is supported by the device.
pub fn validate_shader_stage(
    capabilities: &Capabilities,
    stage: ShaderStage,
) -> Result<(), ResourceError> {
    let supported = match stage {
        ShaderStage::Vertex => capabilities.vertex_shader,
        ShaderStage::TessellationControl | ShaderStage::TessellationEvaluation => {
            capabilities.supports_tessellation()
        }
        ShaderStage::Geometry => capabilities.supports_geometry_shader(),
        ShaderStage::Fragment => capabilities.fragment_shader,
        ShaderStage::Task | ShaderStage::Mesh => capabilities.mesh_shader,
        ShaderStage::Compute => capabilities.compute_shader,
    };
    if supported {
        Ok(())
    } else {
        Err(ResourceError::FeatureNotSupported(format!(
            "{stage:?} shaders"
        )))
    }
}

/// Checks the shaders of a graphics program form a valid pipeline.
pub fn validate_graphics_program_shaders(
    capabilities: &Capabilities,
    rhi_id: RhiId,
    shaders: &GraphicsProgramShaders,
) -> Result<(), ResourceError> {
    for (stage, shader) in shaders.iter() {
        ensure_same_rhi(rhi_id, shader.as_ref())?;
        if shader.stage() != stage {
            return Err(ResourceError::InvalidArgument(format!(
                "{:?} shader '{}' linked as {stage:?} shader",
                shader.stage(),
                shader.debug_name()
            )));
        }
        validate_shader_stage(capabilities, stage)?;
    }
    match (shaders.vertex.is_some(), shaders.mesh.is_some()) {
        (true, true) => Err(ResourceError::InvalidArgument(
            "a graphics program uses either a vertex or a mesh shader".into(),
        )),
        (false, false) => Err(ResourceError::InvalidArgument(
            "a graphics program needs a vertex or a mesh shader".into(),
        )),
        _ if shaders.tessellation_control.is_some()
            != shaders.tessellation_evaluation.is_some() =>
        {
            Err(ResourceError::InvalidArgument(
                "tessellation needs both a control and an evaluation shader".into(),
            ))
        }
        _ => Ok(()),
    }
}

/// Checks a graphics pipeline state descriptor.
pub fn validate_graphics_pipeline_state(
    capabilities: &Capabilities,
    rhi_id: RhiId,
    descriptor: &GraphicsPipelineStateDescriptor<'_>,
) -> Result<(), ResourceError> {
    ensure_same_rhi(rhi_id, descriptor.root_signature.as_ref())?;
    ensure_same_rhi(rhi_id, descriptor.graphics_program.as_ref())?;
    ensure_same_rhi(rhi_id, descriptor.render_pass.as_ref())?;

    let program = &descriptor.graphics_program;
    if !program
        .root_signature()
        .is_compatible_with(&descriptor.root_signature)
    {
        return Err(ResourceError::InvalidArgument(format!(
            "graphics program '{}' was linked against another root signature",
            program.debug_name()
        )));
    }
    if program.vertex_attributes() != &descriptor.vertex_attributes {
        return Err(ResourceError::InvalidArgument(format!(
            "vertex attributes differ from those of graphics program '{}'",
            program.debug_name()
        )));
    }
    if let Some(points) = descriptor.primitive_topology.patch_control_points() {
        let maximum = capabilities.maximum_number_of_patch_vertices;
        if maximum == 0 {
            return Err(ResourceError::FeatureNotSupported("patch lists".into()));
        }
        if points == 0 || points as u32 > maximum {
            return Err(exceeded(
                "maximum_number_of_patch_vertices",
                points as u64,
                maximum as u64,
            ));
        }
    }
    if descriptor.vertex_attributes.has_instanced_attributes() && !capabilities.instanced_arrays {
        return Err(ResourceError::FeatureNotSupported("instanced arrays".into()));
    }
    Ok(())
}

/// Checks a compute pipeline state descriptor.
pub fn validate_compute_pipeline_state(
    capabilities: &Capabilities,
    rhi_id: RhiId,
    descriptor: &ComputePipelineStateDescriptor<'_>,
) -> Result<(), ResourceError> {
    validate_shader_stage(capabilities, ShaderStage::Compute)?;
    ensure_same_rhi(rhi_id, descriptor.root_signature.as_ref())?;
    ensure_same_rhi(rhi_id, descriptor.compute_shader.as_ref())?;
    if descriptor.compute_shader.stage() != ShaderStage::Compute {
        return Err(ResourceError::InvalidArgument(format!(
            "{:?} shader '{}' used as compute shader",
            descriptor.compute_shader.stage(),
            descriptor.compute_shader.debug_name()
        )));
    }
    Ok(())
}

/// Checks a query pool holds at least one query.
pub fn validate_query_pool(number_of_queries: u32) -> Result<(), ResourceError> {
    if number_of_queries == 0 {
        return Err(ResourceError::InvalidArgument(
            "query pools hold at least one query".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rhi::format::TextureFormat;

    #[test]
    fn buffer_data_must_match_the_size() {
        let data = [0u8; 12];
        let mut descriptor = BufferDescriptor::with_data(&data);
        assert!(validate_buffer(&descriptor).is_ok());

        descriptor.number_of_bytes = 16;
        assert_eq!(
            validate_buffer(&descriptor),
            Err(ResourceError::DataSizeMismatch {
                expected: 16,
                actual: 12
            })
        );
        assert!(validate_buffer(&BufferDescriptor::with_size(0)).is_err());
    }

    #[test]
    fn uniform_limit_only_applies_when_supported() {
        let descriptor = BufferDescriptor::with_size(1024);
        let mut capabilities = Capabilities {
            maximum_uniform_buffer_size: 512,
            ..Default::default()
        };
        assert!(matches!(
            validate_uniform_buffer(&capabilities, &descriptor),
            Err(ResourceError::CapabilityExceeded { .. })
        ));

        capabilities.maximum_uniform_buffer_size = 0;
        assert!(validate_uniform_buffer(&capabilities, &descriptor).is_ok());
    }

    #[test]
    fn array_slices_are_not_clamped() {
        let capabilities = Capabilities {
            maximum_number_of_2d_texture_array_slices: 4,
            ..Default::default()
        };
        let descriptor = TextureDescriptor {
            height: 64,
            number_of_slices: 5,
            ..TextureDescriptor::new(TextureDimension::D2Array, 64, TextureFormat::Rgba8Unorm)
        };
        assert_eq!(
            validate_texture(&capabilities, &descriptor),
            Err(ResourceError::CapabilityExceeded {
                capability: "maximum_number_of_2d_texture_array_slices",
                requested: 5,
                maximum: 4
            })
        );

        let unsupported = Capabilities {
            maximum_number_of_2d_texture_array_slices: 0,
            ..Default::default()
        };
        assert!(matches!(
            validate_texture(&unsupported, &descriptor),
            Err(ResourceError::FeatureNotSupported(_))
        ));
    }

    #[test]
    fn texture_shapes_are_checked() {
        let capabilities = Capabilities::default();
        let cube = TextureDescriptor {
            height: 32,
            ..TextureDescriptor::new(TextureDimension::Cube, 64, TextureFormat::Rgba8Unorm)
        };
        assert!(validate_texture(&capabilities, &cube).is_err());

        let data = vec![0u8; 4 * 4 * 4];
        let with_data = TextureDescriptor {
            height: 4,
            data: Some(&data),
            ..TextureDescriptor::new(TextureDimension::D2, 4, TextureFormat::Rgba8Unorm)
        };
        assert!(validate_texture(&capabilities, &with_data).is_ok());

        let short = TextureDescriptor {
            height: 8,
            ..with_data.clone()
        };
        assert!(matches!(
            validate_texture(&capabilities, &short),
            Err(ResourceError::DataSizeMismatch { .. })
        ));
    }

    #[test]
    fn shader_stages_follow_capabilities() {
        let capabilities = Capabilities {
            mesh_shader: false,
            maximum_number_of_gs_output_vertices: 0,
            ..Default::default()
        };
        assert!(validate_shader_stage(&capabilities, ShaderStage::Vertex).is_ok());
        assert!(validate_shader_stage(&capabilities, ShaderStage::Mesh).is_err());
        assert!(validate_shader_stage(&capabilities, ShaderStage::Geometry).is_err());
    }

    #[test]
    fn render_pass_formats_are_checked() {
        let capabilities = Capabilities {
            maximum_number_of_simultaneous_render_targets: 1,
            ..Default::default()
        };
        let two_targets = RenderPassDescriptor::new(
            vec![TextureFormat::Rgba8Unorm, TextureFormat::Rgba16Float],
            None,
        );
        assert!(validate_render_pass(&capabilities, &two_targets).is_err());

        let depth_as_color = RenderPassDescriptor::new(vec![TextureFormat::Depth32Float], None);
        assert!(validate_render_pass(&Capabilities::default(), &depth_as_color).is_err());

        let valid = RenderPassDescriptor::new(
            vec![TextureFormat::Bgra8Unorm],
            Some(TextureFormat::Depth24PlusStencil8),
        );
        assert!(validate_render_pass(&Capabilities::default(), &valid).is_ok());
    }
}
