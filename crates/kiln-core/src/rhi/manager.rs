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

//! Resource managers: buffer, texture and shader factories of a backend.
//!
//! Every method returns a fresh `Arc` handle, so the reference count of a new
//! resource is exactly one. Arguments are checked against the instance
//! capabilities; limits are never clamped implicitly.

use crate::rhi::backend::RhiId;
use crate::rhi::error::ResourceError;
use crate::rhi::format::{IndexBufferFormat, TextureFormat};
use crate::rhi::resource::{
    BufferDescriptor, GraphicsProgram, GraphicsProgramShaders, IndexBuffer, IndirectBuffer,
    IndirectBufferFlags, Shader, ShaderBytecode, ShaderSourceCode, ShaderStage, StructuredBuffer,
    Texture, TextureBuffer, TextureDescriptor, TextureDimension, TextureFlags, UniformBuffer,
    VertexBuffer,
};
use crate::rhi::root_signature::RootSignature;
use crate::rhi::vertex::{VertexArray, VertexAttributes};
use std::borrow::Cow;
use std::fmt::Debug;
use std::sync::Arc;

/// Creates buffers and vertex arrays.
pub trait BufferManager: Send + Sync + Debug {
    /// The RHI instance the manager creates resources for.
    fn rhi_id(&self) -> RhiId;

    /// Creates a vertex buffer.
    fn create_vertex_buffer(
        &self,
        descriptor: &BufferDescriptor<'_>,
    ) -> Result<Arc<VertexBuffer>, ResourceError>;

    /// Creates an index buffer of `format` indices.
    fn create_index_buffer(
        &self,
        descriptor: &BufferDescriptor<'_>,
        format: IndexBufferFormat,
    ) -> Result<Arc<IndexBuffer>, ResourceError>;

    /// Creates a vertex array.
    ///
    /// `vertex_buffers` must provide one buffer per input slot of
    /// `vertex_attributes`. The vertex array keeps every buffer alive.
    fn create_vertex_array(
        &self,
        vertex_attributes: &VertexAttributes,
        vertex_buffers: &[Arc<VertexBuffer>],
        index_buffer: Option<&Arc<IndexBuffer>>,
        debug_name: &str,
    ) -> Result<Arc<VertexArray>, ResourceError>;

    /// Creates a texture buffer of `format` texels.
    fn create_texture_buffer(
        &self,
        descriptor: &BufferDescriptor<'_>,
        format: TextureFormat,
    ) -> Result<Arc<TextureBuffer>, ResourceError>;

    /// Creates a structured buffer of `number_of_structure_bytes` sized elements.
    fn create_structured_buffer(
        &self,
        descriptor: &BufferDescriptor<'_>,
        number_of_structure_bytes: u32,
    ) -> Result<Arc<StructuredBuffer>, ResourceError>;

    /// Creates an indirect argument buffer.
    fn create_indirect_buffer(
        &self,
        descriptor: &BufferDescriptor<'_>,
        indirect_flags: IndirectBufferFlags,
    ) -> Result<Arc<IndirectBuffer>, ResourceError>;

    /// Creates a uniform buffer.
    fn create_uniform_buffer(
        &self,
        descriptor: &BufferDescriptor<'_>,
    ) -> Result<Arc<UniformBuffer>, ResourceError>;
}

/// Creates textures.
///
/// Backends implement [`create_texture`](Self::create_texture); the
/// per-dimension helpers build the descriptor.
pub trait TextureManager: Send + Sync + Debug {
    /// The RHI instance the manager creates resources for.
    fn rhi_id(&self) -> RhiId;

    /// Creates a texture of any dimension.
    fn create_texture(
        &self,
        descriptor: &TextureDescriptor<'_>,
    ) -> Result<Arc<Texture>, ResourceError>;

    /// Creates a 1D texture.
    fn create_texture_1d(
        &self,
        width: u32,
        format: TextureFormat,
        data: Option<&[u8]>,
        flags: TextureFlags,
        debug_name: &str,
    ) -> Result<Arc<Texture>, ResourceError> {
        self.create_texture(&TextureDescriptor {
            label: Some(Cow::Borrowed(debug_name)),
            data,
            flags,
            ..TextureDescriptor::new(TextureDimension::D1, width, format)
        })
    }

    /// Creates a 1D texture array.
    fn create_texture_1d_array(
        &self,
        width: u32,
        number_of_slices: u32,
        format: TextureFormat,
        data: Option<&[u8]>,
        flags: TextureFlags,
        debug_name: &str,
    ) -> Result<Arc<Texture>, ResourceError> {
        self.create_texture(&TextureDescriptor {
            label: Some(Cow::Borrowed(debug_name)),
            number_of_slices,
            data,
            flags,
            ..TextureDescriptor::new(TextureDimension::D1Array, width, format)
        })
    }

    /// Creates a 2D texture.
    fn create_texture_2d(
        &self,
        width: u32,
        height: u32,
        format: TextureFormat,
        data: Option<&[u8]>,
        flags: TextureFlags,
        debug_name: &str,
    ) -> Result<Arc<Texture>, ResourceError> {
        self.create_texture(&TextureDescriptor {
            label: Some(Cow::Borrowed(debug_name)),
            height,
            data,
            flags,
            ..TextureDescriptor::new(TextureDimension::D2, width, format)
        })
    }

    /// Creates a 2D texture array.
    #[allow(clippy::too_many_arguments)]
    fn create_texture_2d_array(
        &self,
        width: u32,
        height: u32,
        number_of_slices: u32,
        format: TextureFormat,
        data: Option<&[u8]>,
        flags: TextureFlags,
        debug_name: &str,
    ) -> Result<Arc<Texture>, ResourceError> {
        self.create_texture(&TextureDescriptor {
            label: Some(Cow::Borrowed(debug_name)),
            height,
            number_of_slices,
            data,
            flags,
            ..TextureDescriptor::new(TextureDimension::D2Array, width, format)
        })
    }

    /// Creates a volume texture.
    #[allow(clippy::too_many_arguments)]
    fn create_texture_3d(
        &self,
        width: u32,
        height: u32,
        depth: u32,
        format: TextureFormat,
        data: Option<&[u8]>,
        flags: TextureFlags,
        debug_name: &str,
    ) -> Result<Arc<Texture>, ResourceError> {
        self.create_texture(&TextureDescriptor {
            label: Some(Cow::Borrowed(debug_name)),
            height,
            depth,
            data,
            flags,
            ..TextureDescriptor::new(TextureDimension::D3, width, format)
        })
    }

    /// Creates a cube texture with square faces of `width` texels.
    fn create_texture_cube(
        &self,
        width: u32,
        format: TextureFormat,
        data: Option<&[u8]>,
        flags: TextureFlags,
        debug_name: &str,
    ) -> Result<Arc<Texture>, ResourceError> {
        self.create_texture(&TextureDescriptor {
            label: Some(Cow::Borrowed(debug_name)),
            height: width,
            data,
            flags,
            ..TextureDescriptor::new(TextureDimension::Cube, width, format)
        })
    }

    /// Creates a cube texture array of `number_of_slices` cubes.
    fn create_texture_cube_array(
        &self,
        width: u32,
        number_of_slices: u32,
        format: TextureFormat,
        data: Option<&[u8]>,
        flags: TextureFlags,
        debug_name: &str,
    ) -> Result<Arc<Texture>, ResourceError> {
        self.create_texture(&TextureDescriptor {
            label: Some(Cow::Borrowed(debug_name)),
            height: width,
            number_of_slices,
            data,
            flags,
            ..TextureDescriptor::new(TextureDimension::CubeArray, width, format)
        })
    }
}

/// Creates shaders and links graphics programs.
pub trait ShaderLanguage: Send + Sync + Debug {
    /// Name of the language, e.g. `"GLSL"` or `"HLSL"`.
    fn name(&self) -> &str;

    /// Compiles a shader from source.
    fn create_shader_from_source_code(
        &self,
        stage: ShaderStage,
        source_code: &ShaderSourceCode<'_>,
        debug_name: &str,
    ) -> Result<Arc<Shader>, ResourceError>;

    /// Creates a shader from precompiled bytecode.
    ///
    /// Fails with [`ResourceError::FeatureNotSupported`] when the instance
    /// does not advertise bytecode support.
    fn create_shader_from_bytecode(
        &self,
        stage: ShaderStage,
        bytecode: &ShaderBytecode,
        debug_name: &str,
    ) -> Result<Arc<Shader>, ResourceError>;

    /// Links shaders into a program usable with `root_signature`.
    fn create_graphics_program(
        &self,
        root_signature: &Arc<RootSignature>,
        vertex_attributes: &VertexAttributes,
        shaders: GraphicsProgramShaders,
        debug_name: &str,
    ) -> Result<Arc<GraphicsProgram>, ResourceError>;
}
