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

//! The RHI instance contract every backend implements.

use crate::context::Context;
use crate::rhi::backend::{BackendType, RhiId};
use crate::rhi::capabilities::Capabilities;
use crate::rhi::command::CommandBuffer;
use crate::rhi::dispatch::DispatchReport;
use crate::rhi::error::{RenderError, ResourceError};
use crate::rhi::manager::{BufferManager, ShaderLanguage, TextureManager};
use crate::rhi::pipeline::{
    ComputePipelineState, ComputePipelineStateDescriptor, GraphicsPipelineState,
    GraphicsPipelineStateDescriptor,
};
use crate::rhi::render_target::{
    Framebuffer, FramebufferDescriptor, RenderPass, RenderPassDescriptor, SwapChain,
    SwapChainDescriptor,
};
use crate::rhi::resource::{
    QueryPool, QueryResultFlags, QueryType, Resource, SamplerState, SamplerStateDescriptor,
};
use crate::rhi::root_signature::{ResourceGroup, RootSignature, RootSignatureDescriptor};
use crate::rhi::statistics::RhiStatistics;
use std::fmt::Debug;
use std::sync::Arc;

/// One RHI instance bound to one backend for its whole lifetime.
///
/// Resources created through an instance (or its managers) carry its
/// [`RhiId`] and may only be used with it. Every creation method validates
/// its arguments against the instance [`Capabilities`] and fails instead of
/// clamping.
pub trait Rhi: Send + Sync + Debug + 'static {
    /// The backend the instance runs on.
    fn backend_type(&self) -> BackendType;

    /// Human readable backend name.
    fn name(&self) -> &str {
        self.backend_type().name()
    }

    /// Identifies the instance among every live instance.
    fn rhi_id(&self) -> RhiId;

    /// The services the instance was created with.
    fn context(&self) -> &Context;

    /// The limits discovered at creation time. Never change afterwards.
    fn capabilities(&self) -> &Capabilities;

    /// Live resource counters.
    fn statistics(&self) -> &Arc<RhiStatistics>;

    /// Whether the backend finished its initialization successfully.
    fn is_initialized(&self) -> bool;

    /// The shader language used when callers do not pick one.
    fn default_shader_language(&self) -> Arc<dyn ShaderLanguage>;

    /// Creates a buffer manager sharing the instance.
    fn create_buffer_manager(&self) -> Arc<dyn BufferManager>;

    /// Creates a texture manager sharing the instance.
    fn create_texture_manager(&self) -> Arc<dyn TextureManager>;

    /// Creates a root signature.
    /// ## Arguments
    /// * `descriptor` - The root parameters and flags.
    /// * `debug_name` - Name shown in debuggers, dropped when the context does not keep names.
    /// ## Errors
    /// * `ResourceError::InvalidArgument` - If the descriptor is malformed.
    /// * `ResourceError::BindingConflict` - If the backend binding model cannot realize it.
    fn create_root_signature(
        &self,
        descriptor: &RootSignatureDescriptor,
        debug_name: &str,
    ) -> Result<Arc<RootSignature>, ResourceError>;

    /// Creates a resource group filling one descriptor table of `root_signature`.
    /// ## Arguments
    /// * `root_parameter_index` - The descriptor table parameter to fill.
    /// * `resources` - One resource per descriptor range, in range order.
    /// * `sampler_states` - Optional sampler per resource, parallel to `resources`.
    /// ## Errors
    /// * `ResourceError::ArityMismatch` - If the resource count differs from the range count.
    /// * `ResourceError::IncompatibleResource` - If a resource kind does not fit its range.
    fn create_resource_group(
        &self,
        root_signature: &Arc<RootSignature>,
        root_parameter_index: u32,
        resources: Vec<Arc<dyn Resource>>,
        sampler_states: Option<Vec<Option<Arc<SamplerState>>>>,
        debug_name: &str,
    ) -> Result<Arc<ResourceGroup>, ResourceError>;

    /// Creates a graphics pipeline state.
    fn create_graphics_pipeline_state(
        &self,
        descriptor: &GraphicsPipelineStateDescriptor<'_>,
    ) -> Result<Arc<GraphicsPipelineState>, ResourceError>;

    /// Creates a compute pipeline state.
    fn create_compute_pipeline_state(
        &self,
        descriptor: &ComputePipelineStateDescriptor<'_>,
    ) -> Result<Arc<ComputePipelineState>, ResourceError>;

    /// Creates a sampler state.
    fn create_sampler_state(
        &self,
        descriptor: &SamplerStateDescriptor,
        debug_name: &str,
    ) -> Result<Arc<SamplerState>, ResourceError>;

    /// Creates a render pass.
    fn create_render_pass(
        &self,
        descriptor: &RenderPassDescriptor<'_>,
    ) -> Result<Arc<RenderPass>, ResourceError>;

    /// Creates a pool of `number_of_queries` queries.
    fn create_query_pool(
        &self,
        query_type: QueryType,
        number_of_queries: u32,
        debug_name: &str,
    ) -> Result<Arc<QueryPool>, ResourceError>;

    /// Creates a swap chain presenting to a native window.
    fn create_swap_chain(
        &self,
        descriptor: &SwapChainDescriptor<'_>,
    ) -> Result<Arc<SwapChain>, ResourceError>;

    /// Creates a framebuffer.
    fn create_framebuffer(
        &self,
        descriptor: &FramebufferDescriptor<'_>,
    ) -> Result<Arc<Framebuffer>, ResourceError>;

    /// Reads query results back.
    /// ## Returns
    /// One value per query of the range, or `Ok(None)` when the results are
    /// not available yet and `flags` does not ask to wait.
    fn get_query_pool_results(
        &self,
        query_pool: &QueryPool,
        first_query_index: u32,
        number_of_queries: u32,
        flags: QueryResultFlags,
    ) -> Result<Option<Vec<u64>>, RenderError>;

    /// Starts a frame. Returns `false` when nothing should be rendered.
    fn begin_scene(&self) -> bool;

    /// Ends the frame started by [`begin_scene`](Self::begin_scene).
    fn end_scene(&self);

    /// Validates and executes every record of `command_buffer`, in order.
    fn submit_command_buffer(&self, command_buffer: &CommandBuffer) -> DispatchReport;

    /// Sends pending native work to the GPU.
    fn flush(&self);

    /// Blocks until the GPU finished every submitted command.
    fn finish(&self);
}
