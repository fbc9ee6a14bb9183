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

//! Command sink of the null backend.
//!
//! Instead of driving a GPU, every validated record becomes a [`NullCall`]
//! describing the native call a real backend would make. Resource groups
//! are expanded through the binding model the root signature was resolved
//! for, and indirect draws are read back from the CPU copy of their buffer.

use bytemuck::Pod;
use super::resources::{
    NullBindings, NullBuffer, NullProgram, NullQueryPool, NullRootSignature, NullTexture,
};
use kiln_core::rhi::binding::SlotNamespace;
use kiln_core::rhi::command::{ClearFlags, ClearGraphics, DrawSource, ScissorRectangle, Viewport};
use kiln_core::rhi::dispatch::CommandSink;
use kiln_core::rhi::pipeline::{ComputePipelineState, GraphicsPipelineState};
use kiln_core::rhi::render_target::RenderTarget;
use kiln_core::rhi::resource::{
    DrawArguments, DrawIndexedArguments, GraphicsProgram, IndirectBuffer, QueryControlFlags,
    QueryPool, QueryType, Resource, ResourceId, Texture, UniformBuffer, UniformHandle,
    UniformValue,
};
use kiln_core::rhi::root_signature::{ResourceGroup, RootSignature, ShaderVisibility};
use kiln_core::rhi::vertex::VertexArray;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// One native call made by the null backend.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq)]
pub enum NullCall {
    BindRootSignature {
        compute: bool,
        root_signature: ResourceId,
    },
    BindPipelineState {
        compute: bool,
        pipeline_state: ResourceId,
    },
    /// One resource of a group bound to a numbered slot.
    BindSlot {
        compute: bool,
        namespace: SlotNamespace,
        visibility: ShaderVisibility,
        slot: u32,
        resource: ResourceId,
        sampler: Option<ResourceId>,
    },
    /// A whole group bound as one descriptor table.
    BindDescriptorTable {
        compute: bool,
        root_parameter_index: u32,
        sampler_heap: bool,
        heap_offset: u32,
        resource_group: ResourceId,
    },
    BindVertexArray(ResourceId),
    SetViewports(Vec<Viewport>),
    SetScissorRectangles(Vec<ScissorRectangle>),
    BeginRenderPass {
        render_target: ResourceId,
        width: u32,
        height: u32,
    },
    EndRenderPass,
    Clear {
        flags: ClearFlags,
        color: [f32; 4],
        z: f32,
        stencil: u32,
    },
    Draw(DrawArguments),
    DrawIndexed(DrawIndexedArguments),
    DispatchCompute([u32; 3]),
    UpdateUniformBuffer {
        uniform_buffer: ResourceId,
        number_of_bytes: usize,
    },
    SetUniform {
        graphics_program: ResourceId,
        uniform_handle: UniformHandle,
        value: UniformValue,
    },
    CopyTexture {
        destination: ResourceId,
        source: ResourceId,
    },
    GenerateMipmaps(ResourceId),
    SetMipmapRange {
        texture: ResourceId,
        minimum_mipmap_index: u32,
        maximum_mipmap_index: u32,
    },
    ResetQueries {
        query_pool: ResourceId,
        first_query_index: u32,
        number_of_queries: u32,
    },
    BeginQuery {
        query_pool: ResourceId,
        query_index: u32,
    },
    EndQuery {
        query_pool: ResourceId,
        query_index: u32,
    },
    WriteTimestamp {
        query_pool: ResourceId,
        query_index: u32,
    },
    DebugMarker(String),
    BeginDebugEvent(String),
    EndDebugEvent,
}

/// Turns validated records into [`NullCall`]s.
///
/// Occlusion and pipeline statistics queries count the vertices submitted
/// between their begin and end. Timestamps come from a clock shared by every
/// submission of one RHI instance.
#[derive(Debug)]
pub struct NullCommandSink<'a> {
    clock: &'a AtomicU64,
    calls: Vec<NullCall>,
    vertices_submitted: u64,
    open_queries: HashMap<(ResourceId, u32), u64>,
}

impl<'a> NullCommandSink<'a> {
    /// Creates a sink reading timestamps from `clock`.
    pub fn new(clock: &'a AtomicU64) -> Self {
        Self {
            clock,
            calls: Vec::new(),
            vertices_submitted: 0,
            open_queries: HashMap::new(),
        }
    }

    /// The calls made so far.
    pub fn into_calls(self) -> Vec<NullCall> {
        self.calls
    }

    fn bind_resource_group(
        &mut self,
        compute: bool,
        root_parameter_index: u32,
        resource_group: &Arc<ResourceGroup>,
    ) {
        let Some(root_signature) = NullRootSignature::of(resource_group.root_signature().native())
        else {
            log::error!(
                "NullCommandSink: Resource group '{}' has a foreign root signature",
                resource_group.debug_name()
            );
            return;
        };
        match root_signature.bindings() {
            NullBindings::Slots(parameters) => {
                let Some(bindings) = parameters.get(root_parameter_index as usize) else {
                    return;
                };
                let resources = resource_group.resources();
                let sampler_states = resource_group.sampler_states();
                for binding in bindings {
                    let range_index = binding.range_index as usize;
                    let Some(resource) = resources.get(range_index) else {
                        continue;
                    };
                    let sampler = sampler_states
                        .and_then(|samplers| samplers.get(range_index))
                        .and_then(Option::as_ref)
                        .map(|sampler| sampler.id());
                    self.calls.push(NullCall::BindSlot {
                        compute,
                        namespace: binding.namespace,
                        visibility: binding.visibility,
                        slot: binding.slot,
                        resource: resource.id(),
                        sampler,
                    });
                }
            }
            NullBindings::DescriptorTables(tables) => {
                if let Some(table) = tables
                    .iter()
                    .find(|table| table.root_parameter_index == root_parameter_index)
                {
                    self.calls.push(NullCall::BindDescriptorTable {
                        compute,
                        root_parameter_index,
                        sampler_heap: table.sampler_heap,
                        heap_offset: table.heap_offset,
                        resource_group: resource_group.id(),
                    });
                }
            }
        }
    }

    /// Reads `number_of_draws` argument records back from an indirect buffer.
    fn read_indirect<A: Pod>(
        indirect_buffer: &IndirectBuffer,
        indirect_buffer_offset: u32,
        number_of_draws: u32,
    ) -> Vec<A> {
        let Some(buffer) = NullBuffer::of(indirect_buffer.native()) else {
            return Vec::new();
        };
        let record_size = std::mem::size_of::<A>();
        (0..number_of_draws as usize)
            .filter_map(|draw| {
                let offset = indirect_buffer_offset as usize + draw * record_size;
                buffer
                    .read(offset, record_size)
                    .map(|bytes| bytemuck::pod_read_unaligned::<A>(&bytes))
            })
            .collect()
    }

    fn arguments<A: Pod + Copy>(source: &DrawSource<A>) -> Vec<A> {
        match source {
            DrawSource::Inline(arguments) => vec![*arguments],
            DrawSource::Indirect {
                indirect_buffer,
                indirect_buffer_offset,
                number_of_draws,
            } => Self::read_indirect(indirect_buffer, *indirect_buffer_offset, *number_of_draws),
        }
    }

    fn now(&self) -> u64 {
        self.clock.fetch_add(1, Ordering::Relaxed)
    }
}

impl CommandSink for NullCommandSink<'_> {
    fn set_graphics_root_signature(&mut self, root_signature: &Arc<RootSignature>) {
        self.calls.push(NullCall::BindRootSignature {
            compute: false,
            root_signature: root_signature.id(),
        });
    }

    fn set_graphics_pipeline_state(&mut self, pipeline_state: &Arc<GraphicsPipelineState>) {
        self.calls.push(NullCall::BindPipelineState {
            compute: false,
            pipeline_state: pipeline_state.id(),
        });
    }

    fn set_graphics_resource_group(
        &mut self,
        root_parameter_index: u32,
        resource_group: &Arc<ResourceGroup>,
    ) {
        self.bind_resource_group(false, root_parameter_index, resource_group);
    }

    fn set_graphics_vertex_array(&mut self, vertex_array: &Arc<VertexArray>) {
        self.calls.push(NullCall::BindVertexArray(vertex_array.id()));
    }

    fn set_graphics_viewports(&mut self, viewports: &[Viewport]) {
        self.calls.push(NullCall::SetViewports(viewports.to_vec()));
    }

    fn set_graphics_scissor_rectangles(&mut self, rectangles: &[ScissorRectangle]) {
        self.calls
            .push(NullCall::SetScissorRectangles(rectangles.to_vec()));
    }

    fn begin_render_pass(&mut self, render_target: &RenderTarget) {
        let (width, height) = render_target.width_and_height();
        self.calls.push(NullCall::BeginRenderPass {
            render_target: render_target.id(),
            width,
            height,
        });
    }

    fn end_render_pass(&mut self) {
        self.calls.push(NullCall::EndRenderPass);
    }

    fn clear_graphics(&mut self, clear: &ClearGraphics) {
        self.calls.push(NullCall::Clear {
            flags: clear.flags(),
            color: clear.color(),
            z: clear.z(),
            stencil: clear.stencil(),
        });
    }

    fn draw_graphics(&mut self, source: &DrawSource<DrawArguments>) {
        for arguments in Self::arguments(source) {
            self.vertices_submitted +=
                arguments.vertex_count_per_instance as u64 * arguments.instance_count as u64;
            self.calls.push(NullCall::Draw(arguments));
        }
    }

    fn draw_indexed_graphics(&mut self, source: &DrawSource<DrawIndexedArguments>) {
        for arguments in Self::arguments(source) {
            self.vertices_submitted +=
                arguments.index_count_per_instance as u64 * arguments.instance_count as u64;
            self.calls.push(NullCall::DrawIndexed(arguments));
        }
    }

    fn set_compute_root_signature(&mut self, root_signature: &Arc<RootSignature>) {
        self.calls.push(NullCall::BindRootSignature {
            compute: true,
            root_signature: root_signature.id(),
        });
    }

    fn set_compute_pipeline_state(&mut self, pipeline_state: &Arc<ComputePipelineState>) {
        self.calls.push(NullCall::BindPipelineState {
            compute: true,
            pipeline_state: pipeline_state.id(),
        });
    }

    fn set_compute_resource_group(
        &mut self,
        root_parameter_index: u32,
        resource_group: &Arc<ResourceGroup>,
    ) {
        self.bind_resource_group(true, root_parameter_index, resource_group);
    }

    fn dispatch_compute(&mut self, group_count: [u32; 3]) {
        self.calls.push(NullCall::DispatchCompute(group_count));
    }

    fn copy_uniform_buffer_data(&mut self, uniform_buffer: &Arc<UniformBuffer>, data: &[u8]) {
        if let Some(buffer) = NullBuffer::of(uniform_buffer.native()) {
            buffer.write(data);
        }
        self.calls.push(NullCall::UpdateUniformBuffer {
            uniform_buffer: uniform_buffer.id(),
            number_of_bytes: data.len(),
        });
    }

    fn set_uniform(
        &mut self,
        graphics_program: &Arc<GraphicsProgram>,
        uniform_handle: UniformHandle,
        value: &UniformValue,
    ) {
        let accepted = NullProgram::of(graphics_program.native())
            .is_some_and(|program| program.set_uniform(uniform_handle, *value));
        if !accepted {
            log::warn!(
                "NullCommandSink: Program '{}' has no uniform {:?}",
                graphics_program.debug_name(),
                uniform_handle
            );
        }
        self.calls.push(NullCall::SetUniform {
            graphics_program: graphics_program.id(),
            uniform_handle,
            value: *value,
        });
    }

    fn copy_resource(&mut self, destination: &Arc<Texture>, source: &Arc<Texture>) {
        if let (Some(destination), Some(source)) = (
            NullTexture::of(destination.native()),
            NullTexture::of(source.native()),
        ) {
            destination.copy_from(source);
        }
        self.calls.push(NullCall::CopyTexture {
            destination: destination.id(),
            source: source.id(),
        });
    }

    fn generate_mipmaps(&mut self, texture: &Arc<Texture>) {
        self.calls.push(NullCall::GenerateMipmaps(texture.id()));
    }

    fn set_texture_minimum_maximum_mipmap_index(
        &mut self,
        texture: &Arc<Texture>,
        minimum_mipmap_index: u32,
        maximum_mipmap_index: u32,
    ) {
        if let Some(native) = NullTexture::of(texture.native()) {
            native.set_mipmap_range(minimum_mipmap_index, maximum_mipmap_index);
        }
        self.calls.push(NullCall::SetMipmapRange {
            texture: texture.id(),
            minimum_mipmap_index,
            maximum_mipmap_index,
        });
    }

    fn reset_query_pool(
        &mut self,
        query_pool: &Arc<QueryPool>,
        first_query_index: u32,
        number_of_queries: u32,
    ) {
        if let Some(native) = NullQueryPool::of(query_pool.native()) {
            native.reset(first_query_index, number_of_queries);
        }
        self.calls.push(NullCall::ResetQueries {
            query_pool: query_pool.id(),
            first_query_index,
            number_of_queries,
        });
    }

    fn begin_query(
        &mut self,
        query_pool: &Arc<QueryPool>,
        query_index: u32,
        _control_flags: QueryControlFlags,
    ) {
        self.open_queries
            .insert((query_pool.id(), query_index), self.vertices_submitted);
        self.calls.push(NullCall::BeginQuery {
            query_pool: query_pool.id(),
            query_index,
        });
    }

    fn end_query(&mut self, query_pool: &Arc<QueryPool>, query_index: u32) {
        match self.open_queries.remove(&(query_pool.id(), query_index)) {
            Some(start) => {
                if let Some(native) = NullQueryPool::of(query_pool.native()) {
                    native.write(query_index, self.vertices_submitted - start);
                }
            }
            None => log::warn!(
                "NullCommandSink: {:?} query {query_index} of '{}' ended without begin",
                query_pool.query_type(),
                query_pool.debug_name()
            ),
        }
        self.calls.push(NullCall::EndQuery {
            query_pool: query_pool.id(),
            query_index,
        });
    }

    fn write_timestamp_query(&mut self, query_pool: &Arc<QueryPool>, query_index: u32) {
        debug_assert_eq!(query_pool.query_type(), QueryType::Timestamp);
        let now = self.now();
        if let Some(native) = NullQueryPool::of(query_pool.native()) {
            native.write(query_index, now);
        }
        self.calls.push(NullCall::WriteTimestamp {
            query_pool: query_pool.id(),
            query_index,
        });
    }

    fn set_debug_marker(&mut self, name: &str) {
        self.calls.push(NullCall::DebugMarker(name.to_string()));
    }

    fn begin_debug_event(&mut self, name: &str) {
        self.calls.push(NullCall::BeginDebugEvent(name.to_string()));
    }

    fn end_debug_event(&mut self) {
        self.calls.push(NullCall::EndDebugEvent);
    }
}
