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

//! Command record payloads and their factories.
//!
//! Records are only appended through the `create*` factories. Factories
//! check what can be checked without device state; everything else is
//! validated when the buffer is dispatched.

use super::types::{ClearFlags, DrawSource, ScissorRectangle, Viewport};
use super::{Command, CommandBuffer};
use crate::rhi::error::CommandError;
use crate::rhi::pipeline::{ComputePipelineState, GraphicsPipelineState};
use crate::rhi::render_target::RenderTarget;
use crate::rhi::resource::{
    DrawArguments, DrawIndexedArguments, GraphicsProgram, IndirectBuffer, IndirectBufferFlags,
    QueryControlFlags, QueryPool, Texture, UniformBuffer, UniformHandle, UniformValue,
};
use crate::rhi::root_signature::{ResourceGroup, RootSignature};
use crate::rhi::vertex::VertexArray;
use bytemuck::Pod;
use std::sync::Arc;

/// Maximum length in bytes of debug marker and event names.
pub const MAXIMUM_DEBUG_NAME_LENGTH: usize = 128;

fn truncated_debug_name(name: &str) -> String {
    if name.len() <= MAXIMUM_DEBUG_NAME_LENGTH {
        return name.to_string();
    }
    let mut end = MAXIMUM_DEBUG_NAME_LENGTH;
    while !name.is_char_boundary(end) {
        end -= 1;
    }
    log::debug!("CommandBuffer: Truncated debug name '{name}' to {end} bytes");
    name[..end].to_string()
}

/// Executes the records of another command buffer in place.
#[derive(Debug, Clone)]
pub struct ExecuteCommandBuffer {
    command_buffer: Arc<CommandBuffer>,
}

impl ExecuteCommandBuffer {
    /// Records the execution of `command_buffer_to_execute`.
    pub fn create(
        command_buffer: &mut CommandBuffer,
        command_buffer_to_execute: &Arc<CommandBuffer>,
    ) {
        command_buffer.push(Command::ExecuteCommandBuffer(Self {
            command_buffer: Arc::clone(command_buffer_to_execute),
        }));
    }

    /// The nested command buffer.
    pub fn command_buffer(&self) -> &Arc<CommandBuffer> {
        &self.command_buffer
    }
}

/// Binds the root signature for graphics work.
#[derive(Debug, Clone)]
pub struct SetGraphicsRootSignature {
    root_signature: Arc<RootSignature>,
}

impl SetGraphicsRootSignature {
    /// Records the binding.
    pub fn create(command_buffer: &mut CommandBuffer, root_signature: &Arc<RootSignature>) {
        command_buffer.push(Command::SetGraphicsRootSignature(Self {
            root_signature: Arc::clone(root_signature),
        }));
    }

    /// The root signature.
    pub fn root_signature(&self) -> &Arc<RootSignature> {
        &self.root_signature
    }
}

/// Binds a graphics pipeline state.
#[derive(Debug, Clone)]
pub struct SetGraphicsPipelineState {
    pipeline_state: Arc<GraphicsPipelineState>,
}

impl SetGraphicsPipelineState {
    /// Records the binding.
    pub fn create(command_buffer: &mut CommandBuffer, pipeline_state: &Arc<GraphicsPipelineState>) {
        command_buffer.push(Command::SetGraphicsPipelineState(Self {
            pipeline_state: Arc::clone(pipeline_state),
        }));
    }

    /// The pipeline state.
    pub fn pipeline_state(&self) -> &Arc<GraphicsPipelineState> {
        &self.pipeline_state
    }
}

/// Binds a resource group to a descriptor table of the graphics root signature.
#[derive(Debug, Clone)]
pub struct SetGraphicsResourceGroup {
    root_parameter_index: u32,
    resource_group: Arc<ResourceGroup>,
}

impl SetGraphicsResourceGroup {
    /// Records the binding.
    pub fn create(
        command_buffer: &mut CommandBuffer,
        root_parameter_index: u32,
        resource_group: &Arc<ResourceGroup>,
    ) {
        command_buffer.push(Command::SetGraphicsResourceGroup(Self {
            root_parameter_index,
            resource_group: Arc::clone(resource_group),
        }));
    }

    /// The descriptor table bound to.
    pub fn root_parameter_index(&self) -> u32 {
        self.root_parameter_index
    }

    /// The resource group.
    pub fn resource_group(&self) -> &Arc<ResourceGroup> {
        &self.resource_group
    }
}

/// Binds the vertex array used by draws.
#[derive(Debug, Clone)]
pub struct SetGraphicsVertexArray {
    vertex_array: Arc<VertexArray>,
}

impl SetGraphicsVertexArray {
    /// Records the binding.
    pub fn create(command_buffer: &mut CommandBuffer, vertex_array: &Arc<VertexArray>) {
        command_buffer.push(Command::SetGraphicsVertexArray(Self {
            vertex_array: Arc::clone(vertex_array),
        }));
    }

    /// The vertex array.
    pub fn vertex_array(&self) -> &Arc<VertexArray> {
        &self.vertex_array
    }
}

/// Sets the viewports.
#[derive(Debug, Clone)]
pub struct SetGraphicsViewports {
    viewports: Vec<Viewport>,
}

impl SetGraphicsViewports {
    /// Records a list of viewports. The list must not be empty.
    pub fn create(
        command_buffer: &mut CommandBuffer,
        viewports: &[Viewport],
    ) -> Result<(), CommandError> {
        if viewports.is_empty() {
            return Err(CommandError::EmptyList("viewport"));
        }
        command_buffer.push(Command::SetGraphicsViewports(Self {
            viewports: viewports.to_vec(),
        }));
        Ok(())
    }

    /// Records a single viewport with depth range [0, 1].
    pub fn create_single(
        command_buffer: &mut CommandBuffer,
        top_left_x: f32,
        top_left_y: f32,
        width: f32,
        height: f32,
    ) {
        command_buffer.push(Command::SetGraphicsViewports(Self {
            viewports: vec![Viewport::new(top_left_x, top_left_y, width, height)],
        }));
    }

    /// The viewports.
    pub fn viewports(&self) -> &[Viewport] {
        &self.viewports
    }
}

/// Sets the scissor rectangles.
#[derive(Debug, Clone)]
pub struct SetGraphicsScissorRectangles {
    rectangles: Vec<ScissorRectangle>,
}

impl SetGraphicsScissorRectangles {
    /// Records a list of rectangles. The list must not be empty.
    pub fn create(
        command_buffer: &mut CommandBuffer,
        rectangles: &[ScissorRectangle],
    ) -> Result<(), CommandError> {
        if rectangles.is_empty() {
            return Err(CommandError::EmptyList("scissor rectangle"));
        }
        command_buffer.push(Command::SetGraphicsScissorRectangles(Self {
            rectangles: rectangles.to_vec(),
        }));
        Ok(())
    }

    /// Records a single rectangle.
    pub fn create_single(
        command_buffer: &mut CommandBuffer,
        top_left_x: i32,
        top_left_y: i32,
        bottom_right_x: i32,
        bottom_right_y: i32,
    ) {
        command_buffer.push(Command::SetGraphicsScissorRectangles(Self {
            rectangles: vec![ScissorRectangle {
                top_left_x,
                top_left_y,
                bottom_right_x,
                bottom_right_y,
            }],
        }));
    }

    /// The rectangles.
    pub fn rectangles(&self) -> &[ScissorRectangle] {
        &self.rectangles
    }
}

/// Starts rendering into a render target.
#[derive(Debug, Clone)]
pub struct BeginRenderPass {
    render_target: RenderTarget,
}

impl BeginRenderPass {
    /// Records the start of a render pass.
    pub fn create(command_buffer: &mut CommandBuffer, render_target: impl Into<RenderTarget>) {
        command_buffer.push(Command::BeginRenderPass(Self {
            render_target: render_target.into(),
        }));
    }

    /// The render target.
    pub fn render_target(&self) -> &RenderTarget {
        &self.render_target
    }
}

/// Ends the active render pass.
#[derive(Debug, Clone)]
pub struct EndRenderPass;

impl EndRenderPass {
    /// Records the end of the render pass.
    pub fn create(command_buffer: &mut CommandBuffer) {
        command_buffer.push(Command::EndRenderPass(Self));
    }
}

/// Clears attachments of the active render target.
#[derive(Debug, Clone)]
pub struct ClearGraphics {
    flags: ClearFlags,
    color: [f32; 4],
    z: f32,
    stencil: u32,
}

impl ClearGraphics {
    /// Records a clear with depth 1 and stencil 0.
    pub fn create(command_buffer: &mut CommandBuffer, flags: ClearFlags, color: [f32; 4]) {
        Self::create_with_depth_stencil(command_buffer, flags, color, 1.0, 0);
    }

    /// Records a clear with explicit depth and stencil values. `z` must be in [0, 1].
    pub fn create_with_depth_stencil(
        command_buffer: &mut CommandBuffer,
        flags: ClearFlags,
        color: [f32; 4],
        z: f32,
        stencil: u32,
    ) {
        command_buffer.push(Command::ClearGraphics(Self {
            flags,
            color,
            z,
            stencil,
        }));
    }

    /// Attachments cleared.
    pub fn flags(&self) -> ClearFlags {
        self.flags
    }

    /// Color clear value.
    pub fn color(&self) -> [f32; 4] {
        self.color
    }

    /// Depth clear value.
    pub fn z(&self) -> f32 {
        self.z
    }

    /// Stencil clear value.
    pub fn stencil(&self) -> u32 {
        self.stencil
    }
}

fn check_indirect_range(
    indirect_buffer: &IndirectBuffer,
    required_flag: IndirectBufferFlags,
    flag_name: &'static str,
    indirect_buffer_offset: u32,
    number_of_draws: u32,
    record_size: u32,
) -> Result<(), CommandError> {
    if number_of_draws == 0 {
        return Err(CommandError::EmptyList("indirect draw"));
    }
    if !indirect_buffer.indirect_flags().contains(required_flag) {
        return Err(CommandError::IndirectBufferUsage(flag_name));
    }
    let required = number_of_draws as u64 * record_size as u64;
    if indirect_buffer_offset as u64 + required > indirect_buffer.number_of_bytes() as u64 {
        return Err(CommandError::IndirectBufferOverrun {
            offset: indirect_buffer_offset,
            required,
            buffer_size: indirect_buffer.number_of_bytes(),
        });
    }
    Ok(())
}

/// Non-indexed draw.
#[derive(Debug, Clone)]
pub struct DrawGraphics {
    source: DrawSource<DrawArguments>,
}

impl DrawGraphics {
    /// Records one draw with inline arguments.
    pub fn create(
        command_buffer: &mut CommandBuffer,
        vertex_count_per_instance: u32,
        instance_count: u32,
        start_vertex_location: u32,
        start_instance_location: u32,
    ) {
        command_buffer.push(Command::DrawGraphics(Self {
            source: DrawSource::Inline(DrawArguments {
                vertex_count_per_instance,
                instance_count,
                start_vertex_location,
                start_instance_location,
            }),
        }));
    }

    /// Records `number_of_draws` draws read from an indirect buffer.
    ///
    /// The buffer must be flagged for draw arguments and large enough.
    pub fn create_indirect(
        command_buffer: &mut CommandBuffer,
        indirect_buffer: &Arc<IndirectBuffer>,
        indirect_buffer_offset: u32,
        number_of_draws: u32,
    ) -> Result<(), CommandError> {
        check_indirect_range(
            indirect_buffer,
            IndirectBufferFlags::DRAW_ARGUMENTS,
            "DRAW_ARGUMENTS",
            indirect_buffer_offset,
            number_of_draws,
            DrawArguments::SIZE,
        )?;
        command_buffer.push(Command::DrawGraphics(Self {
            source: DrawSource::Indirect {
                indirect_buffer: Arc::clone(indirect_buffer),
                indirect_buffer_offset,
                number_of_draws,
            },
        }));
        Ok(())
    }

    /// Where the arguments come from.
    pub fn source(&self) -> &DrawSource<DrawArguments> {
        &self.source
    }
}

/// Indexed draw.
#[derive(Debug, Clone)]
pub struct DrawIndexedGraphics {
    source: DrawSource<DrawIndexedArguments>,
}

impl DrawIndexedGraphics {
    /// Records one indexed draw with inline arguments.
    pub fn create(
        command_buffer: &mut CommandBuffer,
        index_count_per_instance: u32,
        instance_count: u32,
        start_index_location: u32,
        base_vertex_location: i32,
        start_instance_location: u32,
    ) {
        command_buffer.push(Command::DrawIndexedGraphics(Self {
            source: DrawSource::Inline(DrawIndexedArguments {
                index_count_per_instance,
                instance_count,
                start_index_location,
                base_vertex_location,
                start_instance_location,
            }),
        }));
    }

    /// Records `number_of_draws` indexed draws read from an indirect buffer.
    pub fn create_indirect(
        command_buffer: &mut CommandBuffer,
        indirect_buffer: &Arc<IndirectBuffer>,
        indirect_buffer_offset: u32,
        number_of_draws: u32,
    ) -> Result<(), CommandError> {
        check_indirect_range(
            indirect_buffer,
            IndirectBufferFlags::DRAW_INDEXED_ARGUMENTS,
            "DRAW_INDEXED_ARGUMENTS",
            indirect_buffer_offset,
            number_of_draws,
            DrawIndexedArguments::SIZE,
        )?;
        command_buffer.push(Command::DrawIndexedGraphics(Self {
            source: DrawSource::Indirect {
                indirect_buffer: Arc::clone(indirect_buffer),
                indirect_buffer_offset,
                number_of_draws,
            },
        }));
        Ok(())
    }

    /// Where the arguments come from.
    pub fn source(&self) -> &DrawSource<DrawIndexedArguments> {
        &self.source
    }
}

/// Binds the root signature for compute work.
#[derive(Debug, Clone)]
pub struct SetComputeRootSignature {
    root_signature: Arc<RootSignature>,
}

impl SetComputeRootSignature {
    /// Records the binding.
    pub fn create(command_buffer: &mut CommandBuffer, root_signature: &Arc<RootSignature>) {
        command_buffer.push(Command::SetComputeRootSignature(Self {
            root_signature: Arc::clone(root_signature),
        }));
    }

    /// The root signature.
    pub fn root_signature(&self) -> &Arc<RootSignature> {
        &self.root_signature
    }
}

/// Binds a compute pipeline state.
#[derive(Debug, Clone)]
pub struct SetComputePipelineState {
    pipeline_state: Arc<ComputePipelineState>,
}

impl SetComputePipelineState {
    /// Records the binding.
    pub fn create(command_buffer: &mut CommandBuffer, pipeline_state: &Arc<ComputePipelineState>) {
        command_buffer.push(Command::SetComputePipelineState(Self {
            pipeline_state: Arc::clone(pipeline_state),
        }));
    }

    /// The pipeline state.
    pub fn pipeline_state(&self) -> &Arc<ComputePipelineState> {
        &self.pipeline_state
    }
}

/// Binds a resource group to a descriptor table of the compute root signature.
#[derive(Debug, Clone)]
pub struct SetComputeResourceGroup {
    root_parameter_index: u32,
    resource_group: Arc<ResourceGroup>,
}

impl SetComputeResourceGroup {
    /// Records the binding.
    pub fn create(
        command_buffer: &mut CommandBuffer,
        root_parameter_index: u32,
        resource_group: &Arc<ResourceGroup>,
    ) {
        command_buffer.push(Command::SetComputeResourceGroup(Self {
            root_parameter_index,
            resource_group: Arc::clone(resource_group),
        }));
    }

    /// The descriptor table bound to.
    pub fn root_parameter_index(&self) -> u32 {
        self.root_parameter_index
    }

    /// The resource group.
    pub fn resource_group(&self) -> &Arc<ResourceGroup> {
        &self.resource_group
    }
}

/// Launches compute work groups.
#[derive(Debug, Clone)]
pub struct DispatchCompute {
    group_count: [u32; 3],
}

impl DispatchCompute {
    /// Records the dispatch of `x * y * z` work groups.
    pub fn create(
        command_buffer: &mut CommandBuffer,
        group_count_x: u32,
        group_count_y: u32,
        group_count_z: u32,
    ) {
        command_buffer.push(Command::DispatchCompute(Self {
            group_count: [group_count_x, group_count_y, group_count_z],
        }));
    }

    /// Work group counts along x, y and z.
    pub fn group_count(&self) -> [u32; 3] {
        self.group_count
    }
}

/// Uploads bytes to the start of a uniform buffer.
#[derive(Debug, Clone)]
pub struct CopyUniformBufferData {
    uniform_buffer: Arc<UniformBuffer>,
    data: Vec<u8>,
}

impl CopyUniformBufferData {
    /// Records the upload. `data` must be non-empty and fit the buffer.
    pub fn create(
        command_buffer: &mut CommandBuffer,
        uniform_buffer: &Arc<UniformBuffer>,
        data: &[u8],
    ) -> Result<(), CommandError> {
        if data.is_empty() {
            return Err(CommandError::EmptyUniformData);
        }
        if data.len() > uniform_buffer.number_of_bytes() as usize {
            return Err(CommandError::UniformDataTooLarge {
                buffer_size: uniform_buffer.number_of_bytes(),
                data_size: data.len(),
            });
        }
        command_buffer.push(Command::CopyUniformBufferData(Self {
            uniform_buffer: Arc::clone(uniform_buffer),
            data: data.to_vec(),
        }));
        Ok(())
    }

    /// Records the upload of a plain-old-data value.
    pub fn create_from_pod<T: Pod>(
        command_buffer: &mut CommandBuffer,
        uniform_buffer: &Arc<UniformBuffer>,
        value: &T,
    ) -> Result<(), CommandError> {
        Self::create(command_buffer, uniform_buffer, bytemuck::bytes_of(value))
    }

    /// The destination buffer.
    pub fn uniform_buffer(&self) -> &Arc<UniformBuffer> {
        &self.uniform_buffer
    }

    /// The bytes copied.
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

/// Sets an individual uniform of a graphics program.
#[derive(Debug, Clone)]
pub struct SetUniform {
    graphics_program: Arc<GraphicsProgram>,
    uniform_handle: UniformHandle,
    value: UniformValue,
}

impl SetUniform {
    /// Records the update.
    pub fn create(
        command_buffer: &mut CommandBuffer,
        graphics_program: &Arc<GraphicsProgram>,
        uniform_handle: UniformHandle,
        value: UniformValue,
    ) {
        command_buffer.push(Command::SetUniform(Self {
            graphics_program: Arc::clone(graphics_program),
            uniform_handle,
            value,
        }));
    }

    /// Records a float update.
    pub fn create_1f(
        command_buffer: &mut CommandBuffer,
        graphics_program: &Arc<GraphicsProgram>,
        uniform_handle: UniformHandle,
        value: f32,
    ) {
        Self::create(command_buffer, graphics_program, uniform_handle, UniformValue::Float1(value));
    }

    /// Records a two float vector update.
    pub fn create_2fv(
        command_buffer: &mut CommandBuffer,
        graphics_program: &Arc<GraphicsProgram>,
        uniform_handle: UniformHandle,
        value: [f32; 2],
    ) {
        Self::create(command_buffer, graphics_program, uniform_handle, UniformValue::Float2(value));
    }

    /// Records a three float vector update.
    pub fn create_3fv(
        command_buffer: &mut CommandBuffer,
        graphics_program: &Arc<GraphicsProgram>,
        uniform_handle: UniformHandle,
        value: [f32; 3],
    ) {
        Self::create(command_buffer, graphics_program, uniform_handle, UniformValue::Float3(value));
    }

    /// Records a four float vector update.
    pub fn create_4fv(
        command_buffer: &mut CommandBuffer,
        graphics_program: &Arc<GraphicsProgram>,
        uniform_handle: UniformHandle,
        value: [f32; 4],
    ) {
        Self::create(command_buffer, graphics_program, uniform_handle, UniformValue::Float4(value));
    }

    /// Records a 3x3 matrix update.
    pub fn create_matrix3fv(
        command_buffer: &mut CommandBuffer,
        graphics_program: &Arc<GraphicsProgram>,
        uniform_handle: UniformHandle,
        value: [f32; 9],
    ) {
        Self::create(
            command_buffer,
            graphics_program,
            uniform_handle,
            UniformValue::Matrix3(value),
        );
    }

    /// Records a 4x4 matrix update.
    pub fn create_matrix4fv(
        command_buffer: &mut CommandBuffer,
        graphics_program: &Arc<GraphicsProgram>,
        uniform_handle: UniformHandle,
        value: [f32; 16],
    ) {
        Self::create(
            command_buffer,
            graphics_program,
            uniform_handle,
            UniformValue::Matrix4(value),
        );
    }

    /// Records an integer update.
    pub fn create_1i(
        command_buffer: &mut CommandBuffer,
        graphics_program: &Arc<GraphicsProgram>,
        uniform_handle: UniformHandle,
        value: i32,
    ) {
        Self::create(command_buffer, graphics_program, uniform_handle, UniformValue::Int1(value));
    }

    /// The program updated.
    pub fn graphics_program(&self) -> &Arc<GraphicsProgram> {
        &self.graphics_program
    }

    /// The uniform updated.
    pub fn uniform_handle(&self) -> UniformHandle {
        self.uniform_handle
    }

    /// The new value.
    pub fn value(&self) -> &UniformValue {
        &self.value
    }
}

/// Copies the contents of one texture into another of the same shape.
#[derive(Debug, Clone)]
pub struct CopyResource {
    destination: Arc<Texture>,
    source: Arc<Texture>,
}

impl CopyResource {
    /// Records the copy.
    pub fn create(
        command_buffer: &mut CommandBuffer,
        destination: &Arc<Texture>,
        source: &Arc<Texture>,
    ) {
        command_buffer.push(Command::CopyResource(Self {
            destination: Arc::clone(destination),
            source: Arc::clone(source),
        }));
    }

    /// The texture written.
    pub fn destination(&self) -> &Arc<Texture> {
        &self.destination
    }

    /// The texture read.
    pub fn source(&self) -> &Arc<Texture> {
        &self.source
    }
}

/// Regenerates the mipmap chain of a texture from its top level.
#[derive(Debug, Clone)]
pub struct GenerateMipmaps {
    texture: Arc<Texture>,
}

impl GenerateMipmaps {
    /// Records the generation.
    pub fn create(command_buffer: &mut CommandBuffer, texture: &Arc<Texture>) {
        command_buffer.push(Command::GenerateMipmaps(Self {
            texture: Arc::clone(texture),
        }));
    }

    /// The texture.
    pub fn texture(&self) -> &Arc<Texture> {
        &self.texture
    }
}

/// Restricts sampling of a texture to a range of mipmap levels.
#[derive(Debug, Clone)]
pub struct SetTextureMinimumMaximumMipmapIndex {
    texture: Arc<Texture>,
    minimum_mipmap_index: u32,
    maximum_mipmap_index: u32,
}

impl SetTextureMinimumMaximumMipmapIndex {
    /// Records the restriction.
    pub fn create(
        command_buffer: &mut CommandBuffer,
        texture: &Arc<Texture>,
        minimum_mipmap_index: u32,
        maximum_mipmap_index: u32,
    ) {
        command_buffer.push(Command::SetTextureMinimumMaximumMipmapIndex(Self {
            texture: Arc::clone(texture),
            minimum_mipmap_index,
            maximum_mipmap_index,
        }));
    }

    /// The texture.
    pub fn texture(&self) -> &Arc<Texture> {
        &self.texture
    }

    /// Lowest level sampled.
    pub fn minimum_mipmap_index(&self) -> u32 {
        self.minimum_mipmap_index
    }

    /// Highest level sampled.
    pub fn maximum_mipmap_index(&self) -> u32 {
        self.maximum_mipmap_index
    }
}

/// Resets a range of queries before reuse.
#[derive(Debug, Clone)]
pub struct ResetQueryPool {
    query_pool: Arc<QueryPool>,
    first_query_index: u32,
    number_of_queries: u32,
}

impl ResetQueryPool {
    /// Records the reset.
    pub fn create(
        command_buffer: &mut CommandBuffer,
        query_pool: &Arc<QueryPool>,
        first_query_index: u32,
        number_of_queries: u32,
    ) {
        command_buffer.push(Command::ResetQueryPool(Self {
            query_pool: Arc::clone(query_pool),
            first_query_index,
            number_of_queries,
        }));
    }

    /// The pool.
    pub fn query_pool(&self) -> &Arc<QueryPool> {
        &self.query_pool
    }

    /// First query reset.
    pub fn first_query_index(&self) -> u32 {
        self.first_query_index
    }

    /// Number of queries reset.
    pub fn number_of_queries(&self) -> u32 {
        self.number_of_queries
    }
}

/// Starts an occlusion or pipeline statistics query.
#[derive(Debug, Clone)]
pub struct BeginQuery {
    query_pool: Arc<QueryPool>,
    query_index: u32,
    control_flags: QueryControlFlags,
}

impl BeginQuery {
    /// Records the start of the query.
    pub fn create(
        command_buffer: &mut CommandBuffer,
        query_pool: &Arc<QueryPool>,
        query_index: u32,
        control_flags: QueryControlFlags,
    ) {
        command_buffer.push(Command::BeginQuery(Self {
            query_pool: Arc::clone(query_pool),
            query_index,
            control_flags,
        }));
    }

    /// The pool.
    pub fn query_pool(&self) -> &Arc<QueryPool> {
        &self.query_pool
    }

    /// The query started.
    pub fn query_index(&self) -> u32 {
        self.query_index
    }

    /// Query options.
    pub fn control_flags(&self) -> QueryControlFlags {
        self.control_flags
    }
}

/// Ends an occlusion or pipeline statistics query.
#[derive(Debug, Clone)]
pub struct EndQuery {
    query_pool: Arc<QueryPool>,
    query_index: u32,
}

impl EndQuery {
    /// Records the end of the query.
    pub fn create(
        command_buffer: &mut CommandBuffer,
        query_pool: &Arc<QueryPool>,
        query_index: u32,
    ) {
        command_buffer.push(Command::EndQuery(Self {
            query_pool: Arc::clone(query_pool),
            query_index,
        }));
    }

    /// The pool.
    pub fn query_pool(&self) -> &Arc<QueryPool> {
        &self.query_pool
    }

    /// The query ended.
    pub fn query_index(&self) -> u32 {
        self.query_index
    }
}

/// Writes a GPU timestamp into a query.
#[derive(Debug, Clone)]
pub struct WriteTimestampQuery {
    query_pool: Arc<QueryPool>,
    query_index: u32,
}

impl WriteTimestampQuery {
    /// Records the timestamp write.
    pub fn create(
        command_buffer: &mut CommandBuffer,
        query_pool: &Arc<QueryPool>,
        query_index: u32,
    ) {
        command_buffer.push(Command::WriteTimestampQuery(Self {
            query_pool: Arc::clone(query_pool),
            query_index,
        }));
    }

    /// The pool.
    pub fn query_pool(&self) -> &Arc<QueryPool> {
        &self.query_pool
    }

    /// The query written.
    pub fn query_index(&self) -> u32 {
        self.query_index
    }
}

/// Inserts a named marker for GPU debuggers.
#[derive(Debug, Clone)]
pub struct SetDebugMarker {
    name: String,
}

impl SetDebugMarker {
    /// Records the marker. Names longer than [`MAXIMUM_DEBUG_NAME_LENGTH`] are truncated.
    pub fn create(command_buffer: &mut CommandBuffer, name: &str) {
        command_buffer.push(Command::SetDebugMarker(Self {
            name: truncated_debug_name(name),
        }));
    }

    /// The marker name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Opens a named event region for GPU debuggers.
#[derive(Debug, Clone)]
pub struct BeginDebugEvent {
    name: String,
}

impl BeginDebugEvent {
    /// Records the start of the region. Names longer than
    /// [`MAXIMUM_DEBUG_NAME_LENGTH`] are truncated.
    pub fn create(command_buffer: &mut CommandBuffer, name: &str) {
        command_buffer.push(Command::BeginDebugEvent(Self {
            name: truncated_debug_name(name),
        }));
    }

    /// The event name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Closes the innermost debug event region.
#[derive(Debug, Clone)]
pub struct EndDebugEvent;

impl EndDebugEvent {
    /// Records the end of the region.
    pub fn create(command_buffer: &mut CommandBuffer) {
        command_buffer.push(Command::EndDebugEvent(Self));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_names_are_truncated_on_char_boundaries() {
        let name = "é".repeat(MAXIMUM_DEBUG_NAME_LENGTH);
        let truncated = truncated_debug_name(&name);
        assert!(truncated.len() <= MAXIMUM_DEBUG_NAME_LENGTH);
        assert_eq!(truncated.chars().count(), MAXIMUM_DEBUG_NAME_LENGTH / 2);
        assert_eq!(truncated_debug_name("Scene"), "Scene");
    }

    #[test]
    fn empty_lists_are_rejected() {
        let mut command_buffer = CommandBuffer::new();
        assert_eq!(
            SetGraphicsViewports::create(&mut command_buffer, &[]),
            Err(CommandError::EmptyList("viewport"))
        );
        assert!(SetGraphicsScissorRectangles::create(&mut command_buffer, &[]).is_err());
        assert!(command_buffer.is_empty());
    }

    #[test]
    fn clear_defaults_depth_and_stencil() {
        let mut command_buffer = CommandBuffer::new();
        ClearGraphics::create(&mut command_buffer, ClearFlags::COLOR_DEPTH, [0.5, 0.5, 0.5, 1.0]);
        let Some(Command::ClearGraphics(clear)) = command_buffer.iter().next() else {
            panic!("expected a clear record");
        };
        assert_eq!(clear.z(), 1.0);
        assert_eq!(clear.stencil(), 0);
        assert!(clear.flags().contains(ClearFlags::DEPTH));
    }
}
