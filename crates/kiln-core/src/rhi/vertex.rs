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

//! Vertex input layouts and vertex arrays.

use crate::rhi::error::ResourceError;
use crate::rhi::format::VertexAttributeFormat;
use crate::rhi::resource::{
    impl_resource, IndexBuffer, NativeResource, ResourceCore, VertexBuffer,
};
use std::sync::Arc;

/// Maximum length in bytes of attribute and semantic names.
pub const MAXIMUM_VERTEX_ATTRIBUTE_NAME_LENGTH: usize = 32;

/// One element of a vertex input layout.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VertexAttribute {
    /// Data type of the element.
    pub format: VertexAttributeFormat,
    /// Name of the attribute in shader source.
    pub name: String,
    /// Semantic name for APIs that bind by semantic.
    pub semantic_name: String,
    /// Semantic index.
    pub semantic_index: u32,
    /// Vertex buffer slot the element is read from.
    pub input_slot: u32,
    /// Offset of the element within one vertex.
    pub aligned_byte_offset: u32,
    /// Size of one vertex in the input slot.
    pub stride_in_bytes: u32,
    /// 0 for per-vertex data, otherwise the number of instances per element.
    pub instances_per_element: u32,
}

impl VertexAttribute {
    /// A per-vertex attribute in input slot 0.
    pub fn new(
        format: VertexAttributeFormat,
        name: impl Into<String>,
        semantic_name: impl Into<String>,
        aligned_byte_offset: u32,
        stride_in_bytes: u32,
    ) -> Self {
        Self {
            format,
            name: name.into(),
            semantic_name: semantic_name.into(),
            semantic_index: 0,
            input_slot: 0,
            aligned_byte_offset,
            stride_in_bytes,
            instances_per_element: 0,
        }
    }

    /// Moves the attribute to another input slot.
    #[must_use]
    pub fn in_slot(mut self, input_slot: u32) -> Self {
        self.input_slot = input_slot;
        self
    }

    /// Sets the semantic index.
    #[must_use]
    pub fn semantic_index(mut self, semantic_index: u32) -> Self {
        self.semantic_index = semantic_index;
        self
    }

    /// Makes the attribute advance once per `instances_per_element` instances.
    #[must_use]
    pub fn per_instance(mut self, instances_per_element: u32) -> Self {
        self.instances_per_element = instances_per_element;
        self
    }
}

/// A validated vertex input layout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct VertexAttributes {
    attributes: Vec<VertexAttribute>,
}

impl VertexAttributes {
    /// Validates and wraps a list of attributes.
    ///
    /// Rejects names longer than [`MAXIMUM_VERTEX_ATTRIBUTE_NAME_LENGTH`],
    /// elements that overflow their stride and input slots declared with
    /// differing strides.
    pub fn new(attributes: Vec<VertexAttribute>) -> Result<Self, ResourceError> {
        for attribute in &attributes {
            for name in [&attribute.name, &attribute.semantic_name] {
                if name.len() > MAXIMUM_VERTEX_ATTRIBUTE_NAME_LENGTH {
                    return Err(ResourceError::InvalidArgument(format!(
                        "vertex attribute name '{name}' is longer than {MAXIMUM_VERTEX_ATTRIBUTE_NAME_LENGTH} bytes"
                    )));
                }
            }
            let end = attribute
                .aligned_byte_offset
                .checked_add(attribute.format.size());
            if end.map_or(true, |end| end > attribute.stride_in_bytes) {
                return Err(ResourceError::InvalidArgument(format!(
                    "vertex attribute '{}' at offset {} overflows its stride of {} bytes",
                    attribute.name, attribute.aligned_byte_offset, attribute.stride_in_bytes
                )));
            }
            let conflicting_stride = attributes.iter().any(|other| {
                other.input_slot == attribute.input_slot
                    && other.stride_in_bytes != attribute.stride_in_bytes
            });
            if conflicting_stride {
                return Err(ResourceError::InvalidArgument(format!(
                    "input slot {} is declared with different strides",
                    attribute.input_slot
                )));
            }
        }
        Ok(Self { attributes })
    }

    /// The attributes in declaration order.
    pub fn attributes(&self) -> &[VertexAttribute] {
        &self.attributes
    }

    /// Number of attributes.
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    /// Whether the layout has no attribute (e.g. vertex pulling).
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Number of vertex buffers the layout reads from.
    ///
    /// Widened to `u64` since a layout may use input slot `u32::MAX`.
    pub fn number_of_input_slots(&self) -> u64 {
        self.attributes
            .iter()
            .map(|attribute| u64::from(attribute.input_slot) + 1)
            .max()
            .unwrap_or(0)
    }

    /// Stride of an input slot, if any attribute reads from it.
    pub fn stride_of_slot(&self, input_slot: u32) -> Option<u32> {
        self.attributes
            .iter()
            .find(|attribute| attribute.input_slot == input_slot)
            .map(|attribute| attribute.stride_in_bytes)
    }

    /// Whether any attribute advances per instance.
    pub fn has_instanced_attributes(&self) -> bool {
        self.attributes
            .iter()
            .any(|attribute| attribute.instances_per_element > 0)
    }
}

/// Binds vertex buffers, an optional index buffer and a vertex layout.
///
/// Holds strong references to its buffers, so they live at least as long as
/// the vertex array.
#[derive(Debug)]
pub struct VertexArray {
    core: ResourceCore,
    vertex_attributes: VertexAttributes,
    vertex_buffers: Vec<Arc<VertexBuffer>>,
    index_buffer: Option<Arc<IndexBuffer>>,
    native: Box<dyn NativeResource>,
}

impl VertexArray {
    /// Wraps a native vertex array. Called by backends only.
    pub fn new(
        core: ResourceCore,
        vertex_attributes: VertexAttributes,
        vertex_buffers: Vec<Arc<VertexBuffer>>,
        index_buffer: Option<Arc<IndexBuffer>>,
        native: Box<dyn NativeResource>,
    ) -> Self {
        Self {
            core,
            vertex_attributes,
            vertex_buffers,
            index_buffer,
            native,
        }
    }

    /// The vertex input layout.
    pub fn vertex_attributes(&self) -> &VertexAttributes {
        &self.vertex_attributes
    }

    /// The vertex buffers, one per input slot.
    pub fn vertex_buffers(&self) -> &[Arc<VertexBuffer>] {
        &self.vertex_buffers
    }

    /// The index buffer, if any.
    pub fn index_buffer(&self) -> Option<&Arc<IndexBuffer>> {
        self.index_buffer.as_ref()
    }

    /// The backend-private vertex array object.
    pub fn native(&self) -> &dyn NativeResource {
        self.native.as_ref()
    }
}

impl_resource!(VertexArray);
