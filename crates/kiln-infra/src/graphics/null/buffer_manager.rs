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

use super::resources::{NullBuffer, NullNativeObject};
use super::rhi::NullRhi;
use kiln_core::rhi::resource::{
    BufferDescriptor, IndexBuffer, IndirectBuffer, IndirectBufferFlags, ResourceType,
    StructuredBuffer, TextureBuffer, UniformBuffer, VertexBuffer,
};
use kiln_core::rhi::validation;
use kiln_core::rhi::vertex::{VertexArray, VertexAttributes};
use kiln_core::rhi::{
    BufferManager, IndexBufferFormat, ResourceError, Rhi, RhiId, TextureFormat,
};
use std::sync::Arc;

/// Buffer manager of the null backend. Buffers keep a CPU copy of their data.
#[derive(Debug)]
pub struct NullBufferManager {
    rhi: NullRhi,
}

impl NullBufferManager {
    /// Creates a manager for `rhi`.
    pub fn new(rhi: NullRhi) -> Self {
        Self { rhi }
    }

    fn native(descriptor: &BufferDescriptor<'_>) -> Box<NullBuffer> {
        Box::new(NullBuffer::new(descriptor.number_of_bytes, descriptor.data))
    }

    fn log_creation(kind: &str, descriptor: &BufferDescriptor<'_>) {
        log::debug!(
            "NullBufferManager: Creating {kind} '{}' of {} bytes",
            descriptor.label_str(),
            descriptor.number_of_bytes
        );
    }
}

impl BufferManager for NullBufferManager {
    fn rhi_id(&self) -> RhiId {
        self.rhi.rhi_id()
    }

    fn create_vertex_buffer(
        &self,
        descriptor: &BufferDescriptor<'_>,
    ) -> Result<Arc<VertexBuffer>, ResourceError> {
        validation::validate_buffer(descriptor)?;
        Self::log_creation("vertex buffer", descriptor);
        Ok(Arc::new(VertexBuffer::new(
            self.rhi
                .core(ResourceType::VertexBuffer, descriptor.label_str()),
            descriptor.number_of_bytes,
            descriptor.usage,
            Self::native(descriptor),
        )))
    }

    fn create_index_buffer(
        &self,
        descriptor: &BufferDescriptor<'_>,
        format: IndexBufferFormat,
    ) -> Result<Arc<IndexBuffer>, ResourceError> {
        validation::validate_index_buffer(descriptor, format)?;
        Self::log_creation("index buffer", descriptor);
        Ok(Arc::new(IndexBuffer::new(
            self.rhi
                .core(ResourceType::IndexBuffer, descriptor.label_str()),
            descriptor.number_of_bytes,
            descriptor.usage,
            format,
            Self::native(descriptor),
        )))
    }

    fn create_vertex_array(
        &self,
        vertex_attributes: &VertexAttributes,
        vertex_buffers: &[Arc<VertexBuffer>],
        index_buffer: Option<&Arc<IndexBuffer>>,
        debug_name: &str,
    ) -> Result<Arc<VertexArray>, ResourceError> {
        validation::validate_vertex_array(
            self.rhi_id(),
            vertex_attributes,
            vertex_buffers,
            index_buffer,
        )?;
        log::debug!(
            "NullBufferManager: Creating vertex array '{debug_name}' over {} buffer(s)",
            vertex_buffers.len()
        );
        Ok(Arc::new(VertexArray::new(
            self.rhi.core(ResourceType::VertexArray, debug_name),
            vertex_attributes.clone(),
            vertex_buffers.to_vec(),
            index_buffer.cloned(),
            Box::new(NullNativeObject),
        )))
    }

    fn create_texture_buffer(
        &self,
        descriptor: &BufferDescriptor<'_>,
        format: TextureFormat,
    ) -> Result<Arc<TextureBuffer>, ResourceError> {
        validation::validate_texture_buffer(self.rhi.capabilities(), descriptor, format)?;
        Self::log_creation("texture buffer", descriptor);
        Ok(Arc::new(TextureBuffer::new(
            self.rhi
                .core(ResourceType::TextureBuffer, descriptor.label_str()),
            descriptor.number_of_bytes,
            descriptor.usage,
            format,
            Self::native(descriptor),
        )))
    }

    fn create_structured_buffer(
        &self,
        descriptor: &BufferDescriptor<'_>,
        number_of_structure_bytes: u32,
    ) -> Result<Arc<StructuredBuffer>, ResourceError> {
        validation::validate_structured_buffer(
            self.rhi.capabilities(),
            descriptor,
            number_of_structure_bytes,
        )?;
        Self::log_creation("structured buffer", descriptor);
        Ok(Arc::new(StructuredBuffer::new(
            self.rhi
                .core(ResourceType::StructuredBuffer, descriptor.label_str()),
            descriptor.number_of_bytes,
            descriptor.usage,
            number_of_structure_bytes,
            Self::native(descriptor),
        )))
    }

    fn create_indirect_buffer(
        &self,
        descriptor: &BufferDescriptor<'_>,
        indirect_flags: IndirectBufferFlags,
    ) -> Result<Arc<IndirectBuffer>, ResourceError> {
        validation::validate_indirect_buffer(self.rhi.capabilities(), descriptor, indirect_flags)?;
        Self::log_creation("indirect buffer", descriptor);
        Ok(Arc::new(IndirectBuffer::new(
            self.rhi
                .core(ResourceType::IndirectBuffer, descriptor.label_str()),
            descriptor.number_of_bytes,
            descriptor.usage,
            indirect_flags,
            Self::native(descriptor),
        )))
    }

    fn create_uniform_buffer(
        &self,
        descriptor: &BufferDescriptor<'_>,
    ) -> Result<Arc<UniformBuffer>, ResourceError> {
        validation::validate_uniform_buffer(self.rhi.capabilities(), descriptor)?;
        Self::log_creation("uniform buffer", descriptor);
        Ok(Arc::new(UniformBuffer::new(
            self.rhi
                .core(ResourceType::UniformBuffer, descriptor.label_str()),
            descriptor.number_of_bytes,
            descriptor.usage,
            Self::native(descriptor),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiln_core::Context;

    #[test]
    fn initial_data_is_kept_on_the_cpu() {
        let rhi = NullRhi::new(Context::default());
        let manager = NullBufferManager::new(rhi);
        let data = [1u8, 2, 3, 4];

        let buffer = manager
            .create_vertex_buffer(&BufferDescriptor::with_data(&data).label("bytes"))
            .unwrap();

        let native = NullBuffer::of(buffer.native()).unwrap();
        assert_eq!(native.contents(), data);
        assert_eq!(buffer.number_of_bytes(), 4);
    }

    #[test]
    fn failed_creation_registers_nothing() {
        let rhi = NullRhi::new(Context::default());
        let manager = NullBufferManager::new(rhi.clone());

        let result = manager.create_vertex_buffer(&BufferDescriptor::with_size(0));

        assert!(matches!(result, Err(ResourceError::InvalidArgument(_))));
        assert_eq!(rhi.statistics().number_of_created_resources(), 0);
    }
}
