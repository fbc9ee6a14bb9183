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

//! Uniform updates independent of uniform buffer support.
//!
//! Devices either consume uniform buffers or only individual uniforms set on
//! a program. The dispatcher never substitutes one path for the other, so
//! the choice is made once here from the device capabilities and every
//! update of a block goes through a [`UniformBlockWriter`].
//!
//! Blocks uploaded into a uniform buffer follow the std140 layout, which is
//! also what HLSL constant buffers accept for these field types: vectors of
//! three components align to 16 bytes and every matrix column is padded to
//! a full vec4.

use crate::rhi::capabilities::Capabilities;
use crate::rhi::command::{CommandBuffer, CopyUniformBufferData, SetUniform};
use crate::rhi::error::{CommandError, ResourceError};
use crate::rhi::resource::{GraphicsProgram, Resource, UniformBuffer, UniformHandle, UniformValue};
use std::sync::Arc;

/// How uniform blocks reach shaders on a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniformUpdateStrategy {
    /// One upload of the std140 block into a uniform buffer.
    UniformBuffer,
    /// One individual uniform set per block field.
    IndividualUniforms,
}

impl UniformUpdateStrategy {
    /// Picks the strategy for a device. Uniform buffers are preferred.
    ///
    /// Returns `None` when the device supports neither path.
    pub fn from_capabilities(capabilities: &Capabilities) -> Option<Self> {
        if capabilities.supports_uniform_buffers() {
            Some(Self::UniformBuffer)
        } else if capabilities.individual_uniforms {
            Some(Self::IndividualUniforms)
        } else {
            None
        }
    }
}

/// The type of a uniform block field.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UniformKind {
    Float1,
    Float2,
    Float3,
    Float4,
    Matrix3,
    Matrix4,
    Int1,
}

impl UniformKind {
    /// The kind of a value.
    pub fn of(value: &UniformValue) -> Self {
        match value {
            UniformValue::Float1(_) => UniformKind::Float1,
            UniformValue::Float2(_) => UniformKind::Float2,
            UniformValue::Float3(_) => UniformKind::Float3,
            UniformValue::Float4(_) => UniformKind::Float4,
            UniformValue::Matrix3(_) => UniformKind::Matrix3,
            UniformValue::Matrix4(_) => UniformKind::Matrix4,
            UniformValue::Int1(_) => UniformKind::Int1,
        }
    }

    /// Size in bytes of a value of this kind, tightly packed.
    pub const fn size(self) -> u32 {
        match self {
            UniformKind::Float1 | UniformKind::Int1 => 4,
            UniformKind::Float2 => 8,
            UniformKind::Float3 => 12,
            UniformKind::Float4 => 16,
            UniformKind::Matrix3 => 36,
            UniformKind::Matrix4 => 64,
        }
    }

    /// Alignment in bytes of a field of this kind in a std140 block.
    pub const fn std140_alignment(self) -> u32 {
        match self {
            UniformKind::Float1 | UniformKind::Int1 => 4,
            UniformKind::Float2 => 8,
            UniformKind::Float3
            | UniformKind::Float4
            | UniformKind::Matrix3
            | UniformKind::Matrix4 => 16,
        }
    }

    /// Size in bytes of a field of this kind in a std140 block.
    pub const fn std140_size(self) -> u32 {
        match self {
            UniformKind::Matrix3 => 48,
            other => other.size(),
        }
    }
}

const STD140_BLOCK_ALIGNMENT: u32 = 16;

fn align_up(offset: u32, alignment: u32) -> u32 {
    offset.div_ceil(alignment) * alignment
}

/// Offsets of each field in a std140 block and the size of the block.
fn std140_layout(fields: &[UniformField]) -> (Vec<u32>, u32) {
    let mut offsets = Vec::with_capacity(fields.len());
    let mut end = 0;
    for field in fields {
        let offset = align_up(end, field.kind.std140_alignment());
        offsets.push(offset);
        end = offset + field.kind.std140_size();
    }
    (offsets, align_up(end, STD140_BLOCK_ALIGNMENT))
}

/// Writes `value` at `offset` of a std140 block.
fn write_std140(block: &mut [u8], offset: usize, value: &UniformValue) {
    let bytes = value.as_bytes();
    match value {
        UniformValue::Matrix3(_) => {
            // Three columns of 12 bytes, each on a 16 byte stride.
            for (column, chunk) in bytes.chunks_exact(12).enumerate() {
                let start = offset + column * 16;
                block[start..start + 12].copy_from_slice(chunk);
            }
        }
        _ => block[offset..offset + bytes.len()].copy_from_slice(bytes),
    }
}

/// One named field of a uniform block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniformField {
    /// Name of the individual uniform in shader source.
    pub name: String,
    /// Type of the field.
    pub kind: UniformKind,
}

impl UniformField {
    /// Declares a field.
    pub fn new(name: impl Into<String>, kind: UniformKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

#[derive(Debug)]
enum UniformTarget {
    Buffer(Arc<UniformBuffer>),
    Program {
        graphics_program: Arc<GraphicsProgram>,
        handles: Vec<UniformHandle>,
    },
}

/// Records updates of one uniform block with the strategy of the device.
#[derive(Debug)]
pub struct UniformBlockWriter {
    fields: Vec<UniformField>,
    target: UniformTarget,
}

impl UniformBlockWriter {
    /// Creates a writer using the strategy the capabilities call for.
    ///
    /// `uniform_buffer` is only used with [`UniformUpdateStrategy::UniformBuffer`],
    /// `graphics_program` only with [`UniformUpdateStrategy::IndividualUniforms`].
    pub fn new(
        capabilities: &Capabilities,
        fields: Vec<UniformField>,
        graphics_program: &Arc<GraphicsProgram>,
        uniform_buffer: Option<&Arc<UniformBuffer>>,
    ) -> Result<Self, ResourceError> {
        match UniformUpdateStrategy::from_capabilities(capabilities) {
            Some(UniformUpdateStrategy::UniformBuffer) => {
                let uniform_buffer = uniform_buffer.ok_or_else(|| {
                    ResourceError::InvalidArgument(
                        "the device uses uniform buffers but none was supplied".into(),
                    )
                })?;
                Self::for_uniform_buffer(fields, uniform_buffer)
            }
            Some(UniformUpdateStrategy::IndividualUniforms) => {
                Self::for_graphics_program(fields, graphics_program)
            }
            None => Err(ResourceError::FeatureNotSupported(
                "uniform buffers and individual uniforms".into(),
            )),
        }
    }

    /// Creates a writer uploading the std140 block into `uniform_buffer`.
    pub fn for_uniform_buffer(
        fields: Vec<UniformField>,
        uniform_buffer: &Arc<UniformBuffer>,
    ) -> Result<Self, ResourceError> {
        let (_, block_size) = std140_layout(&fields);
        if block_size > uniform_buffer.number_of_bytes() {
            return Err(ResourceError::InvalidArgument(format!(
                "uniform block of {block_size} bytes does not fit uniform buffer '{}' of {} bytes",
                uniform_buffer.debug_name(),
                uniform_buffer.number_of_bytes()
            )));
        }
        Ok(Self {
            fields,
            target: UniformTarget::Buffer(Arc::clone(uniform_buffer)),
        })
    }

    /// Creates a writer setting one individual uniform of `graphics_program` per field.
    pub fn for_graphics_program(
        fields: Vec<UniformField>,
        graphics_program: &Arc<GraphicsProgram>,
    ) -> Result<Self, ResourceError> {
        let handles = fields
            .iter()
            .map(|field| {
                graphics_program.uniform_handle(&field.name).ok_or_else(|| {
                    ResourceError::InvalidArgument(format!(
                        "graphics program '{}' has no uniform named '{}'",
                        graphics_program.debug_name(),
                        field.name
                    ))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            fields,
            target: UniformTarget::Program {
                graphics_program: Arc::clone(graphics_program),
                handles,
            },
        })
    }

    /// The strategy the writer records with.
    pub fn strategy(&self) -> UniformUpdateStrategy {
        match self.target {
            UniformTarget::Buffer(_) => UniformUpdateStrategy::UniformBuffer,
            UniformTarget::Program { .. } => UniformUpdateStrategy::IndividualUniforms,
        }
    }

    /// The fields of the block, in declaration order.
    pub fn fields(&self) -> &[UniformField] {
        &self.fields
    }

    /// Size in bytes of the std140 block uploaded into the uniform buffer.
    pub fn block_size(&self) -> u32 {
        std140_layout(&self.fields).1
    }

    /// Records an update of every field.
    ///
    /// `values` must match the declared fields one to one, in order.
    pub fn record(
        &self,
        command_buffer: &mut CommandBuffer,
        values: &[UniformValue],
    ) -> Result<(), CommandError> {
        if values.len() != self.fields.len() {
            return Err(CommandError::UniformLayoutMismatch(format!(
                "{} values supplied for {} fields",
                values.len(),
                self.fields.len()
            )));
        }
        for (field, value) in self.fields.iter().zip(values) {
            if UniformKind::of(value) != field.kind {
                return Err(CommandError::UniformLayoutMismatch(format!(
                    "field '{}' is {:?}, got {:?}",
                    field.name,
                    field.kind,
                    UniformKind::of(value)
                )));
            }
        }

        match &self.target {
            UniformTarget::Buffer(uniform_buffer) => {
                let (offsets, block_size) = std140_layout(&self.fields);
                let mut data = vec![0u8; block_size as usize];
                for (offset, value) in offsets.into_iter().zip(values) {
                    write_std140(&mut data, offset as usize, value);
                }
                CopyUniformBufferData::create(command_buffer, uniform_buffer, &data)
            }
            UniformTarget::Program {
                graphics_program,
                handles,
            } => {
                for (handle, value) in handles.iter().zip(values) {
                    SetUniform::create(command_buffer, graphics_program, *handle, *value);
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strategy_prefers_uniform_buffers() {
        let capabilities = Capabilities::default();
        assert_eq!(
            UniformUpdateStrategy::from_capabilities(&capabilities),
            Some(UniformUpdateStrategy::UniformBuffer)
        );

        let no_buffers = Capabilities {
            maximum_uniform_buffer_size: 0,
            ..Default::default()
        };
        assert_eq!(
            UniformUpdateStrategy::from_capabilities(&no_buffers),
            Some(UniformUpdateStrategy::IndividualUniforms)
        );

        let neither = Capabilities {
            individual_uniforms: false,
            ..no_buffers
        };
        assert_eq!(UniformUpdateStrategy::from_capabilities(&neither), None);
    }

    #[test]
    fn kinds_report_their_packed_size() {
        let value = UniformValue::Matrix3([0.0; 9]);
        assert_eq!(UniformKind::of(&value), UniformKind::Matrix3);
        assert_eq!(UniformKind::Matrix3.size() as usize, value.as_bytes().len());
        assert_eq!(UniformKind::Int1.size(), 4);
    }

    #[test]
    fn std140_pads_vec3_and_matrix3() {
        let fields = vec![
            UniformField::new("Color", UniformKind::Float3),
            UniformField::new("Intensity", UniformKind::Float1),
            UniformField::new("Normal", UniformKind::Matrix3),
            UniformField::new("Offset", UniformKind::Float2),
        ];

        let (offsets, block_size) = std140_layout(&fields);

        // The float fills the tail of the vec3, the matrix starts on 16.
        assert_eq!(offsets, vec![0, 12, 16, 64]);
        assert_eq!(block_size, 80);
    }

    #[test]
    fn std140_matrix3_columns_are_padded() {
        let value = UniformValue::Matrix3([1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]);
        let mut block = vec![0u8; 48];

        write_std140(&mut block, 0, &value);

        let floats: Vec<f32> = block
            .chunks_exact(4)
            .map(|bytes| f32::from_ne_bytes(bytes.try_into().unwrap()))
            .collect();
        assert_eq!(
            floats,
            vec![1.0, 2.0, 3.0, 0.0, 4.0, 5.0, 6.0, 0.0, 7.0, 8.0, 9.0, 0.0]
        );
    }
}
