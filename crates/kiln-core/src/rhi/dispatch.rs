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

//! Interpretation of command buffers against one backend.
//!
//! The [`CommandDispatcher`] walks the records of a buffer in append order,
//! tracks what is currently bound and checks every record against that state
//! and the device [`Capabilities`]. Records that pass are forwarded to the
//! backend's [`CommandSink`], records that violate a contract are reported
//! through the context's assertion handler and skipped.
//!
//! Nested buffers are interpreted recursively with the same state, so the
//! sink sees exactly the calls it would see if the nested records had been
//! recorded inline.

use crate::context::Context;
use crate::rhi::backend::RhiId;
use crate::rhi::capabilities::Capabilities;
use crate::rhi::command::{
    ClearGraphics, Command, CommandBuffer, DrawSource, ScissorRectangle, Viewport,
};
use crate::rhi::pipeline::{ComputePipelineState, GraphicsPipelineState};
use crate::rhi::render_target::{RenderPass, RenderTarget};
use crate::rhi::resource::{
    DrawArguments, DrawIndexedArguments, GraphicsProgram, QueryControlFlags, QueryPool,
    QueryType, Resource, Texture, UniformBuffer, UniformHandle, UniformValue,
};
use crate::rhi::root_signature::{ResourceGroup, RootSignature};
use crate::rhi::vertex::VertexArray;
use crate::rhi_assert;
use std::sync::Arc;

/// Translates validated records into native calls.
///
/// Implemented by every backend. Each method corresponds to one record kind
/// and is only called once the dispatcher checked the bound state, so
/// implementations may rely on the prerequisites documented here.
pub trait CommandSink {
    /// Binds the graphics root signature.
    fn set_graphics_root_signature(&mut self, root_signature: &Arc<RootSignature>);

    /// Binds a graphics pipeline state.
    fn set_graphics_pipeline_state(&mut self, pipeline_state: &Arc<GraphicsPipelineState>);

    /// Binds a resource group. A compatible graphics root signature is bound.
    fn set_graphics_resource_group(
        &mut self,
        root_parameter_index: u32,
        resource_group: &Arc<ResourceGroup>,
    );

    /// Binds the vertex array.
    fn set_graphics_vertex_array(&mut self, vertex_array: &Arc<VertexArray>);

    /// Sets the viewports. The list is non-empty and within device limits.
    fn set_graphics_viewports(&mut self, viewports: &[Viewport]);

    /// Sets the scissor rectangles. The list is non-empty and within device limits.
    fn set_graphics_scissor_rectangles(&mut self, rectangles: &[ScissorRectangle]);

    /// Starts rendering into `render_target`. No render pass is active.
    fn begin_render_pass(&mut self, render_target: &RenderTarget);

    /// Ends the active render pass.
    fn end_render_pass(&mut self);

    /// Clears the active render target.
    fn clear_graphics(&mut self, clear: &ClearGraphics);

    /// Issues non-indexed draws. A graphics root signature is bound.
    fn draw_graphics(&mut self, source: &DrawSource<DrawArguments>);

    /// Issues indexed draws. A vertex array with an index buffer is bound.
    fn draw_indexed_graphics(&mut self, source: &DrawSource<DrawIndexedArguments>);

    /// Binds the compute root signature.
    fn set_compute_root_signature(&mut self, root_signature: &Arc<RootSignature>);

    /// Binds a compute pipeline state.
    fn set_compute_pipeline_state(&mut self, pipeline_state: &Arc<ComputePipelineState>);

    /// Binds a resource group for compute work.
    fn set_compute_resource_group(
        &mut self,
        root_parameter_index: u32,
        resource_group: &Arc<ResourceGroup>,
    );

    /// Launches compute work groups.
    fn dispatch_compute(&mut self, group_count: [u32; 3]);

    /// Uploads uniform data. Only called when the device has uniform buffers.
    fn copy_uniform_buffer_data(&mut self, uniform_buffer: &Arc<UniformBuffer>, data: &[u8]);

    /// Sets one uniform of a program.
    fn set_uniform(
        &mut self,
        graphics_program: &Arc<GraphicsProgram>,
        uniform_handle: UniformHandle,
        value: &UniformValue,
    );

    /// Copies `source` into `destination`. Both have the same shape.
    fn copy_resource(&mut self, destination: &Arc<Texture>, source: &Arc<Texture>);

    /// Regenerates the mipmap chain of a texture.
    fn generate_mipmaps(&mut self, texture: &Arc<Texture>);

    /// Restricts the mipmap levels sampled from a texture.
    fn set_texture_minimum_maximum_mipmap_index(
        &mut self,
        texture: &Arc<Texture>,
        minimum_mipmap_index: u32,
        maximum_mipmap_index: u32,
    );

    /// Resets a range of queries.
    fn reset_query_pool(
        &mut self,
        query_pool: &Arc<QueryPool>,
        first_query_index: u32,
        number_of_queries: u32,
    );

    /// Starts a query.
    fn begin_query(
        &mut self,
        query_pool: &Arc<QueryPool>,
        query_index: u32,
        control_flags: QueryControlFlags,
    );

    /// Ends a query.
    fn end_query(&mut self, query_pool: &Arc<QueryPool>, query_index: u32);

    /// Writes a timestamp.
    fn write_timestamp_query(&mut self, query_pool: &Arc<QueryPool>, query_index: u32);

    /// Inserts a debug marker. Ignored by backends without debugger support.
    fn set_debug_marker(&mut self, _name: &str) {}

    /// Opens a debug event region.
    fn begin_debug_event(&mut self, _name: &str) {}

    /// Closes the innermost debug event region.
    fn end_debug_event(&mut self) {}
}

/// Outcome of one dispatch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Records visited, nested records included.
    pub records_visited: usize,
    /// Records forwarded to the sink.
    pub native_calls: usize,
    /// Records dropped by a failed contract check or capability gating.
    pub records_skipped: usize,
    /// Nested command buffers entered.
    pub nested_buffers: usize,
}

impl DispatchReport {
    /// Adds the counters of `other` to `self`.
    pub fn accumulate(&mut self, other: &DispatchReport) {
        self.records_visited += other.records_visited;
        self.native_calls += other.native_calls;
        self.records_skipped += other.records_skipped;
        self.nested_buffers += other.nested_buffers;
    }
}

#[derive(Debug, Default)]
struct BoundState {
    graphics_root_signature: Option<Arc<RootSignature>>,
    graphics_pipeline_state: Option<Arc<GraphicsPipelineState>>,
    vertex_array: Option<Arc<VertexArray>>,
    render_pass: Option<Arc<RenderPass>>,
    compute_root_signature: Option<Arc<RootSignature>>,
    compute_pipeline_state: Option<Arc<ComputePipelineState>>,
    debug_event_depth: u32,
}

/// Validates and forwards the records of command buffers to a sink.
///
/// Bound state starts empty for every [`dispatch`](Self::dispatch) call.
#[derive(Debug)]
pub struct CommandDispatcher<'a> {
    context: &'a Context,
    capabilities: &'a Capabilities,
    rhi_id: RhiId,
    state: BoundState,
    report: DispatchReport,
}

impl<'a> CommandDispatcher<'a> {
    /// Creates a dispatcher for the RHI instance `rhi_id`.
    pub fn new(context: &'a Context, capabilities: &'a Capabilities, rhi_id: RhiId) -> Self {
        Self {
            context,
            capabilities,
            rhi_id,
            state: BoundState::default(),
            report: DispatchReport::default(),
        }
    }

    /// Interprets every record of `command_buffer`, in order.
    pub fn dispatch(
        &mut self,
        command_buffer: &CommandBuffer,
        sink: &mut dyn CommandSink,
    ) -> DispatchReport {
        self.state = BoundState::default();
        self.report = DispatchReport::default();

        self.dispatch_commands(command_buffer, sink);

        let depth = self.state.debug_event_depth;
        rhi_assert!(
            self.context,
            depth == 0,
            "command buffer left {depth} debug event(s) open"
        );
        if self.state.render_pass.is_some() {
            log::warn!("CommandDispatcher: Command buffer ended inside a render pass");
        }
        log::trace!("CommandDispatcher: {:?}", self.report);
        self.report
    }

    fn dispatch_commands(&mut self, command_buffer: &CommandBuffer, sink: &mut dyn CommandSink) {
        for command in command_buffer {
            self.report.records_visited += 1;
            if let Command::ExecuteCommandBuffer(execute) = command {
                self.report.nested_buffers += 1;
                self.dispatch_commands(execute.command_buffer(), sink);
                continue;
            }
            if self.dispatch_command(command, sink) {
                self.report.native_calls += 1;
            } else {
                log::debug!("CommandDispatcher: Skipped {:?} record", command.kind());
                self.report.records_skipped += 1;
            }
        }
    }

    fn owned(&self, resource: &dyn Resource) -> bool {
        rhi_assert!(
            self.context,
            resource.rhi_id() == self.rhi_id,
            "{:?} '{}' belongs to RHI {:?}, not {:?}",
            resource.resource_type(),
            resource.debug_name(),
            resource.rhi_id(),
            self.rhi_id
        )
    }

    /// Returns whether the record was forwarded to the sink.
    fn dispatch_command(&mut self, command: &Command, sink: &mut dyn CommandSink) -> bool {
        let context = self.context;
        let capabilities = self.capabilities;

        match command {
            // Handled by the caller.
            Command::ExecuteCommandBuffer(_) => false,

            Command::SetGraphicsRootSignature(record) => {
                let root_signature = record.root_signature();
                if !self.owned(root_signature.as_ref()) {
                    return false;
                }
                self.state.graphics_root_signature = Some(Arc::clone(root_signature));
                sink.set_graphics_root_signature(root_signature);
                true
            }

            Command::SetGraphicsPipelineState(record) => {
                let pipeline_state = record.pipeline_state();
                if !self.owned(pipeline_state.as_ref()) {
                    return false;
                }
                if let Some(bound) = &self.state.graphics_root_signature {
                    if !rhi_assert!(
                        context,
                        bound.is_compatible_with(pipeline_state.root_signature()),
                        "graphics pipeline state '{}' was created for another root signature",
                        pipeline_state.debug_name()
                    ) {
                        return false;
                    }
                }
                if let Some(active) = &self.state.render_pass {
                    if !rhi_assert!(
                        context,
                        active.is_compatible_with(pipeline_state.render_pass()),
                        "graphics pipeline state '{}' does not match the active render pass",
                        pipeline_state.debug_name()
                    ) {
                        return false;
                    }
                }
                self.state.graphics_pipeline_state = Some(Arc::clone(pipeline_state));
                sink.set_graphics_pipeline_state(pipeline_state);
                true
            }

            Command::SetGraphicsResourceGroup(record) => {
                let bound = self.state.graphics_root_signature.clone();
                if !self.check_resource_group(
                    bound.as_deref(),
                    record.root_parameter_index(),
                    record.resource_group(),
                    "graphics",
                ) {
                    return false;
                }
                sink.set_graphics_resource_group(
                    record.root_parameter_index(),
                    record.resource_group(),
                );
                true
            }

            Command::SetGraphicsVertexArray(record) => {
                let vertex_array = record.vertex_array();
                if !self.owned(vertex_array.as_ref()) {
                    return false;
                }
                if vertex_array.vertex_attributes().has_instanced_attributes()
                    && !rhi_assert!(
                        context,
                        capabilities.instanced_arrays,
                        "vertex array '{}' has per-instance attributes but instanced arrays are unsupported",
                        vertex_array.debug_name()
                    )
                {
                    return false;
                }
                self.state.vertex_array = Some(Arc::clone(vertex_array));
                sink.set_graphics_vertex_array(vertex_array);
                true
            }

            Command::SetGraphicsViewports(record) => {
                let count = record.viewports().len();
                if !rhi_assert!(
                    context,
                    count as u32 <= capabilities.maximum_number_of_viewports,
                    "{count} viewports exceed the device maximum of {}",
                    capabilities.maximum_number_of_viewports
                ) {
                    return false;
                }
                sink.set_graphics_viewports(record.viewports());
                true
            }

            Command::SetGraphicsScissorRectangles(record) => {
                let count = record.rectangles().len();
                if !rhi_assert!(
                    context,
                    count as u32 <= capabilities.maximum_number_of_viewports,
                    "{count} scissor rectangles exceed the device maximum of {}",
                    capabilities.maximum_number_of_viewports
                ) {
                    return false;
                }
                sink.set_graphics_scissor_rectangles(record.rectangles());
                true
            }

            Command::BeginRenderPass(record) => {
                let render_target = record.render_target();
                if !rhi_assert!(
                    context,
                    self.state.render_pass.is_none(),
                    "render pass begun while another one is active"
                ) || !self.owned(render_target.as_resource())
                {
                    return false;
                }
                self.state.render_pass = Some(Arc::clone(render_target.render_pass()));
                sink.begin_render_pass(render_target);
                true
            }

            Command::EndRenderPass(_) => {
                if !rhi_assert!(
                    context,
                    self.state.render_pass.is_some(),
                    "render pass ended while none is active"
                ) {
                    return false;
                }
                self.state.render_pass = None;
                sink.end_render_pass();
                true
            }

            Command::ClearGraphics(record) => {
                if !rhi_assert!(
                    context,
                    self.state.render_pass.is_some(),
                    "clear recorded outside of a render pass"
                ) || !rhi_assert!(
                    context,
                    (0.0..=1.0).contains(&record.z()),
                    "depth clear value {} is outside [0, 1]",
                    record.z()
                ) {
                    return false;
                }
                sink.clear_graphics(record);
                true
            }

            Command::DrawGraphics(record) => {
                let source = record.source();
                if !self.check_draw_prerequisites(source, false) {
                    return false;
                }
                if let DrawSource::Inline(arguments) = source {
                    if !self.check_instancing(arguments.instance_count, 0) {
                        return false;
                    }
                }
                sink.draw_graphics(source);
                true
            }

            Command::DrawIndexedGraphics(record) => {
                let source = record.source();
                if !self.check_draw_prerequisites(source, true) {
                    return false;
                }
                if let DrawSource::Inline(arguments) = source {
                    if !self
                        .check_instancing(arguments.instance_count, arguments.base_vertex_location)
                    {
                        return false;
                    }
                }
                sink.draw_indexed_graphics(source);
                true
            }

            Command::SetComputeRootSignature(record) => {
                let root_signature = record.root_signature();
                if !rhi_assert!(
                    context,
                    capabilities.compute_shader,
                    "compute root signature bound but compute shaders are unsupported"
                ) || !self.owned(root_signature.as_ref())
                {
                    return false;
                }
                self.state.compute_root_signature = Some(Arc::clone(root_signature));
                sink.set_compute_root_signature(root_signature);
                true
            }

            Command::SetComputePipelineState(record) => {
                let pipeline_state = record.pipeline_state();
                if !self.owned(pipeline_state.as_ref()) {
                    return false;
                }
                if let Some(bound) = &self.state.compute_root_signature {
                    if !rhi_assert!(
                        context,
                        bound.is_compatible_with(pipeline_state.root_signature()),
                        "compute pipeline state '{}' was created for another root signature",
                        pipeline_state.debug_name()
                    ) {
                        return false;
                    }
                }
                self.state.compute_pipeline_state = Some(Arc::clone(pipeline_state));
                sink.set_compute_pipeline_state(pipeline_state);
                true
            }

            Command::SetComputeResourceGroup(record) => {
                let bound = self.state.compute_root_signature.clone();
                if !self.check_resource_group(
                    bound.as_deref(),
                    record.root_parameter_index(),
                    record.resource_group(),
                    "compute",
                ) {
                    return false;
                }
                sink.set_compute_resource_group(
                    record.root_parameter_index(),
                    record.resource_group(),
                );
                true
            }

            Command::DispatchCompute(record) => {
                if !rhi_assert!(
                    context,
                    capabilities.compute_shader,
                    "compute dispatch but compute shaders are unsupported"
                ) || !rhi_assert!(
                    context,
                    self.state.compute_root_signature.is_some(),
                    "compute dispatch without a compute root signature"
                ) || !rhi_assert!(
                    context,
                    self.state.compute_pipeline_state.is_some(),
                    "compute dispatch without a compute pipeline state"
                ) {
                    return false;
                }
                sink.dispatch_compute(record.group_count());
                true
            }

            Command::CopyUniformBufferData(record) => {
                if !capabilities.supports_uniform_buffers() {
                    log::debug!(
                        "CommandDispatcher: Device has no uniform buffers, dropping copy into '{}'",
                        record.uniform_buffer().debug_name()
                    );
                    return false;
                }
                if !self.owned(record.uniform_buffer().as_ref()) {
                    return false;
                }
                sink.copy_uniform_buffer_data(record.uniform_buffer(), record.data());
                true
            }

            Command::SetUniform(record) => {
                if !rhi_assert!(
                    context,
                    capabilities.individual_uniforms,
                    "individual uniform set but the device does not support individual uniforms"
                ) || !self.owned(record.graphics_program().as_ref())
                {
                    return false;
                }
                sink.set_uniform(
                    record.graphics_program(),
                    record.uniform_handle(),
                    record.value(),
                );
                true
            }

            Command::CopyResource(record) => {
                let (destination, source) = (record.destination(), record.source());
                if !self.owned(destination.as_ref()) || !self.owned(source.as_ref()) {
                    return false;
                }
                let same_shape = destination.dimension() == source.dimension()
                    && destination.format() == source.format()
                    && destination.width() == source.width()
                    && destination.height() == source.height()
                    && destination.depth() == source.depth()
                    && destination.number_of_slices() == source.number_of_slices();
                if !rhi_assert!(
                    context,
                    same_shape,
                    "texture '{}' cannot be copied into '{}' of a different shape",
                    source.debug_name(),
                    destination.debug_name()
                ) {
                    return false;
                }
                sink.copy_resource(destination, source);
                true
            }

            Command::GenerateMipmaps(record) => {
                let texture = record.texture();
                if !self.owned(texture.as_ref())
                    || !rhi_assert!(
                        context,
                        !texture.format().is_compressed(),
                        "mipmaps of compressed texture '{}' cannot be generated",
                        texture.debug_name()
                    )
                {
                    return false;
                }
                sink.generate_mipmaps(texture);
                true
            }

            Command::SetTextureMinimumMaximumMipmapIndex(record) => {
                let texture = record.texture();
                let (minimum, maximum) =
                    (record.minimum_mipmap_index(), record.maximum_mipmap_index());
                if !self.owned(texture.as_ref())
                    || !rhi_assert!(
                        context,
                        minimum <= maximum && maximum < texture.number_of_mipmaps(),
                        "mipmap range [{minimum}, {maximum}] is invalid for '{}' with {} mipmaps",
                        texture.debug_name(),
                        texture.number_of_mipmaps()
                    )
                {
                    return false;
                }
                sink.set_texture_minimum_maximum_mipmap_index(texture, minimum, maximum);
                true
            }

            Command::ResetQueryPool(record) => {
                let query_pool = record.query_pool();
                let (first_query_index, number_of_queries) =
                    (record.first_query_index(), record.number_of_queries());
                if !self.check_query(query_pool, first_query_index, number_of_queries) {
                    return false;
                }
                sink.reset_query_pool(query_pool, first_query_index, number_of_queries);
                true
            }

            Command::BeginQuery(record) => {
                let query_pool = record.query_pool();
                if !self.check_query(query_pool, record.query_index(), 1)
                    || !rhi_assert!(
                        context,
                        query_pool.query_type() != QueryType::Timestamp,
                        "timestamp queries are written, not begun"
                    )
                {
                    return false;
                }
                sink.begin_query(query_pool, record.query_index(), record.control_flags());
                true
            }

            Command::EndQuery(record) => {
                let query_pool = record.query_pool();
                if !self.check_query(query_pool, record.query_index(), 1)
                    || !rhi_assert!(
                        context,
                        query_pool.query_type() != QueryType::Timestamp,
                        "timestamp queries are written, not ended"
                    )
                {
                    return false;
                }
                sink.end_query(query_pool, record.query_index());
                true
            }

            Command::WriteTimestampQuery(record) => {
                let query_pool = record.query_pool();
                if !self.check_query(query_pool, record.query_index(), 1)
                    || !rhi_assert!(
                        context,
                        query_pool.query_type() == QueryType::Timestamp,
                        "timestamp written into a {:?} query pool",
                        query_pool.query_type()
                    )
                {
                    return false;
                }
                sink.write_timestamp_query(query_pool, record.query_index());
                true
            }

            Command::SetDebugMarker(record) => {
                sink.set_debug_marker(record.name());
                true
            }

            Command::BeginDebugEvent(record) => {
                self.state.debug_event_depth += 1;
                sink.begin_debug_event(record.name());
                true
            }

            Command::EndDebugEvent(_) => {
                if !rhi_assert!(
                    context,
                    self.state.debug_event_depth > 0,
                    "debug event ended while none is open"
                ) {
                    return false;
                }
                self.state.debug_event_depth -= 1;
                sink.end_debug_event();
                true
            }
        }
    }

    fn check_resource_group(
        &self,
        bound: Option<&RootSignature>,
        root_parameter_index: u32,
        resource_group: &Arc<ResourceGroup>,
        pipeline: &str,
    ) -> bool {
        let context = self.context;
        let Some(bound) = bound else {
            rhi_assert!(
                context,
                false,
                "{pipeline} resource group '{}' set without a {pipeline} root signature",
                resource_group.debug_name()
            );
            return false;
        };
        self.owned(resource_group.as_ref())
            && rhi_assert!(
                context,
                root_parameter_index == resource_group.root_parameter_index(),
                "resource group '{}' was created for root parameter {} but set at {root_parameter_index}",
                resource_group.debug_name(),
                resource_group.root_parameter_index()
            )
            && rhi_assert!(
                context,
                (root_parameter_index as usize) < bound.parameters().len(),
                "root parameter {root_parameter_index} is out of range for the bound root signature"
            )
            && rhi_assert!(
                context,
                bound.is_compatible_with(resource_group.root_signature()),
                "resource group '{}' was created for another root signature",
                resource_group.debug_name()
            )
    }

    fn check_draw_prerequisites<A>(&self, source: &DrawSource<A>, indexed: bool) -> bool {
        let context = self.context;
        if !rhi_assert!(
            context,
            self.state.graphics_root_signature.is_some(),
            "draw recorded without a graphics root signature"
        ) {
            return false;
        }
        if indexed {
            let has_index_buffer = self
                .state
                .vertex_array
                .as_ref()
                .is_some_and(|vertex_array| vertex_array.index_buffer().is_some());
            if !rhi_assert!(
                context,
                has_index_buffer,
                "indexed draw recorded without a vertex array holding an index buffer"
            ) {
                return false;
            }
        }
        if let DrawSource::Indirect {
            indirect_buffer, ..
        } = source
        {
            return rhi_assert!(
                context,
                self.capabilities.indirect_buffer_supported,
                "indirect draw recorded but indirect buffers are unsupported"
            ) && self.owned(indirect_buffer.as_ref());
        }
        rhi_assert!(
            context,
            source.number_of_draws() > 0,
            "draw recorded with zero draws"
        )
    }

    fn check_instancing(&self, instance_count: u32, base_vertex_location: i32) -> bool {
        let context = self.context;
        (instance_count <= 1
            || rhi_assert!(
                context,
                self.capabilities.draw_instanced,
                "{instance_count} instances drawn but instanced draws are unsupported"
            ))
            && (base_vertex_location == 0
                || rhi_assert!(
                    context,
                    self.capabilities.base_vertex,
                    "base vertex {base_vertex_location} used but base vertex is unsupported"
                ))
    }

    fn check_query(
        &self,
        query_pool: &Arc<QueryPool>,
        first_query_index: u32,
        number_of_queries: u32,
    ) -> bool {
        self.owned(query_pool.as_ref())
            && rhi_assert!(
                self.context,
                query_pool.contains_range(first_query_index, number_of_queries),
                "queries [{first_query_index}, +{number_of_queries}) are outside pool '{}' of {}",
                query_pool.debug_name(),
                query_pool.number_of_queries()
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::RecordingAssertHandler;
    use crate::rhi::command::{
        BeginDebugEvent, DrawGraphics, EndDebugEvent, ExecuteCommandBuffer, SetDebugMarker,
    };

    #[derive(Default)]
    struct MarkerSink {
        calls: Vec<String>,
    }

    impl CommandSink for MarkerSink {
        fn set_graphics_root_signature(&mut self, _: &Arc<RootSignature>) {}
        fn set_graphics_pipeline_state(&mut self, _: &Arc<GraphicsPipelineState>) {}
        fn set_graphics_resource_group(&mut self, _: u32, _: &Arc<ResourceGroup>) {}
        fn set_graphics_vertex_array(&mut self, _: &Arc<VertexArray>) {}
        fn set_graphics_viewports(&mut self, _: &[Viewport]) {}
        fn set_graphics_scissor_rectangles(&mut self, _: &[ScissorRectangle]) {}
        fn begin_render_pass(&mut self, _: &RenderTarget) {}
        fn end_render_pass(&mut self) {}
        fn clear_graphics(&mut self, _: &ClearGraphics) {}
        fn draw_graphics(&mut self, _: &DrawSource<DrawArguments>) {
            self.calls.push("draw".into());
        }
        fn draw_indexed_graphics(&mut self, _: &DrawSource<DrawIndexedArguments>) {}
        fn set_compute_root_signature(&mut self, _: &Arc<RootSignature>) {}
        fn set_compute_pipeline_state(&mut self, _: &Arc<ComputePipelineState>) {}
        fn set_compute_resource_group(&mut self, _: u32, _: &Arc<ResourceGroup>) {}
        fn dispatch_compute(&mut self, _: [u32; 3]) {}
        fn copy_uniform_buffer_data(&mut self, _: &Arc<UniformBuffer>, _: &[u8]) {}
        fn set_uniform(&mut self, _: &Arc<GraphicsProgram>, _: UniformHandle, _: &UniformValue) {}
        fn copy_resource(&mut self, _: &Arc<Texture>, _: &Arc<Texture>) {}
        fn generate_mipmaps(&mut self, _: &Arc<Texture>) {}
        fn set_texture_minimum_maximum_mipmap_index(&mut self, _: &Arc<Texture>, _: u32, _: u32) {}
        fn reset_query_pool(&mut self, _: &Arc<QueryPool>, _: u32, _: u32) {}
        fn begin_query(&mut self, _: &Arc<QueryPool>, _: u32, _: QueryControlFlags) {}
        fn end_query(&mut self, _: &Arc<QueryPool>, _: u32) {}
        fn write_timestamp_query(&mut self, _: &Arc<QueryPool>, _: u32) {}

        fn set_debug_marker(&mut self, name: &str) {
            self.calls.push(format!("marker {name}"));
        }
        fn begin_debug_event(&mut self, name: &str) {
            self.calls.push(format!("begin {name}"));
        }
        fn end_debug_event(&mut self) {
            self.calls.push("end".into());
        }
    }

    fn recording_context() -> (Arc<RecordingAssertHandler>, Context) {
        let recorder = Arc::new(RecordingAssertHandler::new());
        let context = Context::new(recorder.clone());
        (recorder, context)
    }

    #[test]
    fn nested_buffers_are_walked_in_place() {
        let (recorder, context) = recording_context();
        let capabilities = Capabilities::default();

        let mut inner = CommandBuffer::new();
        SetDebugMarker::create(&mut inner, "inner");
        let inner = Arc::new(inner);

        let mut outer = CommandBuffer::new();
        BeginDebugEvent::create(&mut outer, "frame");
        ExecuteCommandBuffer::create(&mut outer, &inner);
        EndDebugEvent::create(&mut outer);

        let mut sink = MarkerSink::default();
        let report = CommandDispatcher::new(&context, &capabilities, RhiId(1))
            .dispatch(&outer, &mut sink);

        assert_eq!(sink.calls, vec!["begin frame", "marker inner", "end"]);
        assert_eq!(report.records_visited, 4);
        assert_eq!(report.native_calls, 3);
        assert_eq!(report.nested_buffers, 1);
        assert_eq!(recorder.failure_count(), 0);
    }

    #[test]
    fn draw_without_root_signature_is_skipped() {
        let (recorder, context) = recording_context();
        let capabilities = Capabilities::default();
        let mut command_buffer = CommandBuffer::new();
        DrawGraphics::create(&mut command_buffer, 3, 1, 0, 0);

        let mut sink = MarkerSink::default();
        let report = CommandDispatcher::new(&context, &capabilities, RhiId(1))
            .dispatch(&command_buffer, &mut sink);

        assert!(sink.calls.is_empty());
        assert_eq!(report.records_skipped, 1);
        assert_eq!(recorder.failure_count(), 1);
        assert!(recorder.failures()[0].contains("root signature"));
    }

    #[test]
    fn unbalanced_debug_events_are_reported() {
        let (recorder, context) = recording_context();
        let capabilities = Capabilities::default();
        let mut command_buffer = CommandBuffer::new();
        EndDebugEvent::create(&mut command_buffer);
        BeginDebugEvent::create(&mut command_buffer, "open");

        let mut sink = MarkerSink::default();
        let report = CommandDispatcher::new(&context, &capabilities, RhiId(1))
            .dispatch(&command_buffer, &mut sink);

        assert_eq!(report.records_skipped, 1);
        assert_eq!(recorder.failure_count(), 2);
    }
}
