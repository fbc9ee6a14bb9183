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

//! Device capabilities.
//!
//! Filled once by the backend while the RHI instance initializes and
//! read-only afterwards. Higher layers branch on these values instead of on
//! the backend type.

use crate::rhi::format::TextureFormat;
use serde::{Deserialize, Serialize};

/// Limits and feature flags of an RHI instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Capabilities {
    /// Human readable device name.
    pub device_name: String,
    /// Preferred color format for swap chains.
    pub preferred_swap_chain_color_texture_format: TextureFormat,
    /// Preferred depth-stencil format for swap chains.
    pub preferred_swap_chain_depth_stencil_texture_format: TextureFormat,
    /// Maximum number of viewports and scissor rectangles set at once.
    pub maximum_number_of_viewports: u32,
    /// Maximum number of simultaneously bound color render targets.
    pub maximum_number_of_simultaneous_render_targets: u32,
    /// Maximum width, height or depth of a texture.
    pub maximum_texture_dimension: u32,
    /// Maximum slices of a 1D texture array, 0 when unsupported.
    pub maximum_number_of_1d_texture_array_slices: u32,
    /// Maximum slices of a 2D texture array, 0 when unsupported.
    pub maximum_number_of_2d_texture_array_slices: u32,
    /// Maximum cube slices of a cube texture array, 0 when unsupported.
    pub maximum_number_of_cube_texture_array_slices: u32,
    /// Maximum texture buffer size in texel elements, 0 when unsupported.
    pub maximum_texture_buffer_size: u32,
    /// Maximum structured buffer size in bytes, 0 when unsupported.
    pub maximum_structured_buffer_size: u32,
    /// Maximum indirect buffer size in bytes.
    pub maximum_indirect_buffer_size: u32,
    /// Maximum uniform buffer size in bytes, 0 when shaders cannot consume
    /// uniform buffers.
    pub maximum_uniform_buffer_size: u32,
    /// Maximum number of multisamples, 1 when multisampling is unsupported.
    pub maximum_number_of_multisamples: u8,
    /// Maximum anisotropy for texture filtering.
    pub maximum_anisotropy: u8,
    /// Whether the clip space origin is upper left.
    pub upper_left_origin: bool,
    /// Whether clip space depth ranges over [0, 1] instead of [-1, 1].
    pub zero_to_one_clip_z: bool,
    /// Individual uniforms can be set on graphics programs.
    pub individual_uniforms: bool,
    /// Per-instance vertex data is supported.
    pub instanced_arrays: bool,
    /// Instanced draw calls are supported.
    pub draw_instanced: bool,
    /// Base vertex offsets on indexed draws are supported.
    pub base_vertex: bool,
    /// Resources may be created concurrently with command dispatch.
    pub native_multithreading: bool,
    /// Draw arguments may come from indirect buffers natively.
    pub indirect_buffer_supported: bool,
    /// Shaders can be created from bytecode.
    pub shader_bytecode: bool,
    /// Vertex shaders are supported.
    pub vertex_shader: bool,
    /// Maximum vertices per tessellation patch, 0 when unsupported.
    pub maximum_number_of_patch_vertices: u32,
    /// Maximum geometry shader output vertices, 0 when unsupported.
    pub maximum_number_of_gs_output_vertices: u32,
    /// Fragment shaders are supported.
    pub fragment_shader: bool,
    /// Task and mesh shaders are supported.
    pub mesh_shader: bool,
    /// Compute shaders are supported.
    pub compute_shader: bool,
}

impl Capabilities {
    /// Whether shaders can consume uniform buffers.
    pub fn supports_uniform_buffers(&self) -> bool {
        self.maximum_uniform_buffer_size > 0
    }

    /// Whether tessellation shaders are supported.
    pub fn supports_tessellation(&self) -> bool {
        self.maximum_number_of_patch_vertices > 0
    }

    /// Whether geometry shaders are supported.
    pub fn supports_geometry_shader(&self) -> bool {
        self.maximum_number_of_gs_output_vertices > 0
    }
}

impl Default for Capabilities {
    /// A modern desktop feature level.
    fn default() -> Self {
        Self {
            device_name: String::from("Unknown device"),
            preferred_swap_chain_color_texture_format: TextureFormat::Rgba8Unorm,
            preferred_swap_chain_depth_stencil_texture_format: TextureFormat::Depth32Float,
            maximum_number_of_viewports: 8,
            maximum_number_of_simultaneous_render_targets: 8,
            maximum_texture_dimension: 16384,
            maximum_number_of_1d_texture_array_slices: 2048,
            maximum_number_of_2d_texture_array_slices: 2048,
            maximum_number_of_cube_texture_array_slices: 2048 / 6,
            maximum_texture_buffer_size: 128 * 1024 * 1024,
            maximum_structured_buffer_size: 128 * 1024 * 1024,
            maximum_indirect_buffer_size: 128 * 1024,
            maximum_uniform_buffer_size: 64 * 1024,
            maximum_number_of_multisamples: 8,
            maximum_anisotropy: 16,
            upper_left_origin: true,
            zero_to_one_clip_z: true,
            individual_uniforms: true,
            instanced_arrays: true,
            draw_instanced: true,
            base_vertex: true,
            native_multithreading: true,
            indirect_buffer_supported: true,
            shader_bytecode: true,
            vertex_shader: true,
            maximum_number_of_patch_vertices: 32,
            maximum_number_of_gs_output_vertices: 1024,
            fragment_shader: true,
            mesh_shader: true,
            compute_shader: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_feature_level_supports_everything() {
        let caps = Capabilities::default();
        assert!(caps.supports_uniform_buffers());
        assert!(caps.supports_tessellation());
        assert!(caps.supports_geometry_shader());
    }

    #[test]
    fn zero_limits_disable_features() {
        let caps = Capabilities {
            maximum_uniform_buffer_size: 0,
            maximum_number_of_patch_vertices: 0,
            maximum_number_of_gs_output_vertices: 0,
            ..Capabilities::default()
        };
        assert!(!caps.supports_uniform_buffers());
        assert!(!caps.supports_tessellation());
        assert!(!caps.supports_geometry_shader());
    }
}
