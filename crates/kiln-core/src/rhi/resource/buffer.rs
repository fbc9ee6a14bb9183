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

//! Buffer resources and their creation descriptors.

use super::{impl_resource, NativeResource, ResourceCore};
use crate::kiln_bitflags;
use crate::rhi::format::{IndexBufferFormat, TextureFormat};
use bytemuck::{Pod, Zeroable};
use std::borrow::Cow;

/// Expected access pattern of a buffer, used by backends to pick memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BufferUsage {
    /// Written once, drawn a few times.
    StreamDraw,
    /// Written by the GPU once, read back a few times.
    StreamRead,
    /// Written by the GPU once, used as GPU source a few times.
    StreamCopy,
    /// Written once, drawn many times.
    #[default]
    StaticDraw,
    /// Written by the GPU once, read back many times.
    StaticRead,
    /// Written by the GPU once, used as GPU source many times.
    StaticCopy,
    /// Written repeatedly, drawn many times.
    DynamicDraw,
    /// Written by the GPU repeatedly, read back many times.
    DynamicRead,
    /// Written by the GPU repeatedly, used as GPU source many times.
    DynamicCopy,
}

kiln_bitflags! {
    /// Additional views a buffer can be bound through.
    pub struct BufferFlags: u32 {
        /// Bindable for unordered read/write access.
        const UNORDERED_ACCESS = 1 << 0;
        /// Bindable as a read-only shader resource.
        const SHADER_RESOURCE = 1 << 1;
    }
}

kiln_bitflags! {
    /// Usage flags of an indirect buffer.
    pub struct IndirectBufferFlags: u32 {
        /// Bindable for unordered read/write access.
        const UNORDERED_ACCESS = 1 << 0;
        /// Bindable as a read-only shader resource.
        const SHADER_RESOURCE = 1 << 1;
        /// Holds [`DrawArguments`] records.
        const DRAW_ARGUMENTS = 1 << 2;
        /// Holds [`DrawIndexedArguments`] records.
        const DRAW_INDEXED_ARGUMENTS = 1 << 3;
    }
}

/// Describes a buffer to create.
#[derive(Debug, Clone, Default)]
pub struct BufferDescriptor<'a> {
    /// Optional debug name.
    pub label: Option<Cow<'a, str>>,
    /// Size of the buffer in bytes.
    pub number_of_bytes: u32,
    /// Optional initial contents. Must be exactly `number_of_bytes` long.
    pub data: Option<&'a [u8]>,
    /// Additional views.
    pub flags: BufferFlags,
    /// Expected access pattern.
    pub usage: BufferUsage,
}

impl<'a> BufferDescriptor<'a> {
    /// A buffer sized to and filled with `data`.
    pub fn with_data(data: &'a [u8]) -> Self {
        Self {
            number_of_bytes: data.len() as u32,
            data: Some(data),
            ..Default::default()
        }
    }

    /// An uninitialized buffer of `number_of_bytes`.
    pub fn with_size(number_of_bytes: u32) -> Self {
        Self {
            number_of_bytes,
            ..Default::default()
        }
    }

    /// Sets the debug name.
    #[must_use]
    pub fn label(mut self, label: impl Into<Cow<'a, str>>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Sets the usage hint.
    #[must_use]
    pub fn usage(mut self, usage: BufferUsage) -> Self {
        self.usage = usage;
        self
    }

    /// Sets the buffer flags.
    #[must_use]
    pub fn flags(mut self, flags: BufferFlags) -> Self {
        self.flags = flags;
        self
    }

    /// The debug name, empty when unset.
    pub fn label_str(&self) -> &str {
        self.label.as_deref().unwrap_or("")
    }
}

/// Arguments of one non-indexed draw, as stored in indirect buffers.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Pod, Zeroable)]
pub struct DrawArguments {
    /// Number of vertices per instance.
    pub vertex_count_per_instance: u32,
    /// Number of instances.
    pub instance_count: u32,
    /// First vertex.
    pub start_vertex_location: u32,
    /// First instance.
    pub start_instance_location: u32,
}

impl DrawArguments {
    /// Size in bytes of one record.
    pub const SIZE: u32 = std::mem::size_of::<Self>() as u32;
}

/// Arguments of one indexed draw, as stored in indirect buffers.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Pod, Zeroable)]
pub struct DrawIndexedArguments {
    /// Number of indices per instance.
    pub index_count_per_instance: u32,
    /// Number of instances.
    pub instance_count: u32,
    /// First index.
    pub start_index_location: u32,
    /// Value added to every index before fetching the vertex.
    pub base_vertex_location: i32,
    /// First instance.
    pub start_instance_location: u32,
}

impl DrawIndexedArguments {
    /// Size in bytes of one record.
    pub const SIZE: u32 = std::mem::size_of::<Self>() as u32;
}

macro_rules! buffer_accessors {
    () => {
        /// Size of the buffer in bytes.
        pub fn number_of_bytes(&self) -> u32 {
            self.number_of_bytes
        }

        /// The usage hint the buffer was created with.
        pub fn usage(&self) -> BufferUsage {
            self.usage
        }

        /// The backend-private buffer object.
        pub fn native(&self) -> &dyn NativeResource {
            self.native.as_ref()
        }
    };
}

/// Vertex data consumed through a vertex array.
#[derive(Debug)]
pub struct VertexBuffer {
    core: ResourceCore,
    number_of_bytes: u32,
    usage: BufferUsage,
    native: Box<dyn NativeResource>,
}

impl VertexBuffer {
    /// Wraps a native vertex buffer. Called by backends only.
    pub fn new(
        core: ResourceCore,
        number_of_bytes: u32,
        usage: BufferUsage,
        native: Box<dyn NativeResource>,
    ) -> Self {
        Self {
            core,
            number_of_bytes,
            usage,
            native,
        }
    }

    buffer_accessors!();
}

/// Index data consumed through a vertex array.
#[derive(Debug)]
pub struct IndexBuffer {
    core: ResourceCore,
    number_of_bytes: u32,
    usage: BufferUsage,
    format: IndexBufferFormat,
    native: Box<dyn NativeResource>,
}

impl IndexBuffer {
    /// Wraps a native index buffer. Called by backends only.
    pub fn new(
        core: ResourceCore,
        number_of_bytes: u32,
        usage: BufferUsage,
        format: IndexBufferFormat,
        native: Box<dyn NativeResource>,
    ) -> Self {
        Self {
            core,
            number_of_bytes,
            usage,
            format,
            native,
        }
    }

    buffer_accessors!();

    /// The index element format.
    pub fn format(&self) -> IndexBufferFormat {
        self.format
    }

    /// Number of indices the buffer holds.
    pub fn number_of_indices(&self) -> u32 {
        self.number_of_bytes / self.format.bytes_per_element()
    }
}

/// Constant data read by shaders as a block.
#[derive(Debug)]
pub struct UniformBuffer {
    core: ResourceCore,
    number_of_bytes: u32,
    usage: BufferUsage,
    native: Box<dyn NativeResource>,
}

impl UniformBuffer {
    /// Wraps a native uniform buffer. Called by backends only.
    pub fn new(
        core: ResourceCore,
        number_of_bytes: u32,
        usage: BufferUsage,
        native: Box<dyn NativeResource>,
    ) -> Self {
        Self {
            core,
            number_of_bytes,
            usage,
            native,
        }
    }

    buffer_accessors!();
}

/// Typed texel data read by shaders through a texture view.
#[derive(Debug)]
pub struct TextureBuffer {
    core: ResourceCore,
    number_of_bytes: u32,
    usage: BufferUsage,
    format: TextureFormat,
    native: Box<dyn NativeResource>,
}

impl TextureBuffer {
    /// Wraps a native texture buffer. Called by backends only.
    pub fn new(
        core: ResourceCore,
        number_of_bytes: u32,
        usage: BufferUsage,
        format: TextureFormat,
        native: Box<dyn NativeResource>,
    ) -> Self {
        Self {
            core,
            number_of_bytes,
            usage,
            format,
            native,
        }
    }

    buffer_accessors!();

    /// The texel format.
    pub fn format(&self) -> TextureFormat {
        self.format
    }
}

/// An array of fixed-size structures read by shaders.
#[derive(Debug)]
pub struct StructuredBuffer {
    core: ResourceCore,
    number_of_bytes: u32,
    usage: BufferUsage,
    number_of_structure_bytes: u32,
    native: Box<dyn NativeResource>,
}

impl StructuredBuffer {
    /// Wraps a native structured buffer. Called by backends only.
    pub fn new(
        core: ResourceCore,
        number_of_bytes: u32,
        usage: BufferUsage,
        number_of_structure_bytes: u32,
        native: Box<dyn NativeResource>,
    ) -> Self {
        Self {
            core,
            number_of_bytes,
            usage,
            number_of_structure_bytes,
            native,
        }
    }

    buffer_accessors!();

    /// Size in bytes of one structure.
    pub fn number_of_structure_bytes(&self) -> u32 {
        self.number_of_structure_bytes
    }
}

/// Draw arguments read by indirect draws.
#[derive(Debug)]
pub struct IndirectBuffer {
    core: ResourceCore,
    number_of_bytes: u32,
    usage: BufferUsage,
    indirect_flags: IndirectBufferFlags,
    native: Box<dyn NativeResource>,
}

impl IndirectBuffer {
    /// Wraps a native indirect buffer. Called by backends only.
    pub fn new(
        core: ResourceCore,
        number_of_bytes: u32,
        usage: BufferUsage,
        indirect_flags: IndirectBufferFlags,
        native: Box<dyn NativeResource>,
    ) -> Self {
        Self {
            core,
            number_of_bytes,
            usage,
            indirect_flags,
            native,
        }
    }

    buffer_accessors!();

    /// The indirect usage flags.
    pub fn indirect_flags(&self) -> IndirectBufferFlags {
        self.indirect_flags
    }
}

impl_resource!(
    VertexBuffer,
    IndexBuffer,
    UniformBuffer,
    TextureBuffer,
    StructuredBuffer,
    IndirectBuffer
);
