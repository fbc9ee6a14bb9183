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

//! The null RHI instance.

use super::buffer_manager::NullBufferManager;
use super::config::NullRhiConfig;
use super::resources::{
    NullBindings, NullNativeObject, NullProgram, NullQueryPool, NullRootSignature, NullSwapChain,
};
use super::shader_language::NullShaderLanguage;
use super::sink::{NullCall, NullCommandSink};
use super::texture_manager::NullTextureManager;
use kiln_core::rhi::binding::{resolve_descriptor_tables, resolve_slot_bindings};
use kiln_core::rhi::pipeline::{
    ComputePipelineState, ComputePipelineStateDescriptor, GraphicsPipelineState,
    GraphicsPipelineStateDescriptor,
};
use kiln_core::rhi::render_target::{
    Framebuffer, FramebufferDescriptor, RenderPass, RenderPassDescriptor, SwapChain,
    SwapChainDescriptor,
};
use kiln_core::rhi::resource::{
    GraphicsProgram, QueryPool, QueryResultFlags, QueryType, Resource, ResourceCore, ResourceId,
    ResourceType, SamplerState, SamplerStateDescriptor, UniformHandle, UniformValue,
};
use kiln_core::rhi::root_signature::{
    ResourceGroup, RootParameter, RootSignature, RootSignatureDescriptor,
};
use kiln_core::rhi::validation;
use kiln_core::rhi::{
    BackendType, BindingModel, BufferManager, Capabilities, CommandBuffer, CommandDispatcher,
    DispatchReport, RenderError, ResourceError, Rhi, RhiId, RhiStatistics, ShaderLanguage,
    TextureManager,
};
use kiln_core::{rhi_assert, Context};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Debug)]
struct NullRhiInternal {
    rhi_id: RhiId,
    context: Context,
    capabilities: Capabilities,
    binding_model: BindingModel,
    statistics: Arc<RhiStatistics>,
    next_resource_id: AtomicU64,
    native_calls: Mutex<Vec<NullCall>>,
    in_scene: AtomicBool,
    frame_number: AtomicU64,
    clock: AtomicU64,
}

impl Drop for NullRhiInternal {
    fn drop(&mut self) {
        let remaining = self.statistics.number_of_current_resources();
        if remaining > 0 {
            log::warn!(
                "NullRhi: {:?} destroyed while {remaining} resource(s) are alive",
                self.rhi_id
            );
            self.statistics.debug_output_current_resources();
        } else {
            log::debug!("NullRhi: {:?} destroyed", self.rhi_id);
        }
    }
}

/// An RHI instance without a GPU.
///
/// It validates everything a real backend validates, keeps the contents of
/// buffers, textures and uniforms on the CPU and records the native calls
/// submitted command buffers turn into. Useful for tests, servers and tools
/// that need the rendering contracts without a device.
///
/// Cloning is cheap and shares the instance.
#[derive(Clone, Debug)]
pub struct NullRhi {
    internal: Arc<NullRhiInternal>,
}

impl NullRhi {
    /// Creates an instance with the default configuration.
    pub fn new(context: Context) -> Self {
        Self::with_config(context, &NullRhiConfig::default())
    }

    /// Creates an instance advertising the configured capabilities.
    pub fn with_config(context: Context, config: &NullRhiConfig) -> Self {
        let context = match config.keep_debug_names {
            Some(keep_debug_names) => context.with_debug_names(keep_debug_names),
            None => context,
        };
        let rhi_id = RhiId::next();
        log::info!(
            "NullRhi: Initialized {:?} as '{}' with {:?} binding",
            rhi_id,
            config.capabilities.device_name,
            config.binding_model
        );
        Self {
            internal: Arc::new(NullRhiInternal {
                rhi_id,
                context,
                capabilities: config.capabilities.clone(),
                binding_model: config.binding_model,
                statistics: Arc::new(RhiStatistics::default()),
                next_resource_id: AtomicU64::new(1),
                native_calls: Mutex::new(Vec::new()),
                in_scene: AtomicBool::new(false),
                frame_number: AtomicU64::new(0),
                clock: AtomicU64::new(0),
            }),
        }
    }

    /// Builds the bookkeeping of a new resource of this instance.
    pub(crate) fn core(&self, resource_type: ResourceType, debug_name: &str) -> ResourceCore {
        let id = self.internal.next_resource_id.fetch_add(1, Ordering::Relaxed);
        ResourceCore::new(
            resource_type,
            ResourceId(id),
            self.internal.rhi_id,
            self.internal.context.retained_debug_name(debug_name),
            &self.internal.statistics,
        )
    }

    /// The binding model root signatures are resolved for.
    pub fn binding_model(&self) -> BindingModel {
        self.internal.binding_model
    }

    /// Number of frames ended so far.
    pub fn frame_number(&self) -> u64 {
        self.internal.frame_number.load(Ordering::Relaxed)
    }

    /// Removes and returns the native calls recorded since the last take.
    pub fn take_native_calls(&self) -> Vec<NullCall> {
        self.internal
            .native_calls
            .lock()
            .map(|mut calls| std::mem::take(&mut *calls))
            .unwrap_or_default()
    }

    /// The last value set for an individual uniform of a program.
    pub fn uniform_value(
        &self,
        graphics_program: &GraphicsProgram,
        uniform_handle: UniformHandle,
    ) -> Option<UniformValue> {
        NullProgram::of(graphics_program.native())?.uniform(uniform_handle)
    }

    fn label_or<'a>(label: &'a str, fallback: &'a str) -> &'a str {
        if label.is_empty() {
            fallback
        } else {
            label
        }
    }
}

impl Rhi for NullRhi {
    fn backend_type(&self) -> BackendType {
        BackendType::Null
    }

    fn rhi_id(&self) -> RhiId {
        self.internal.rhi_id
    }

    fn context(&self) -> &Context {
        &self.internal.context
    }

    fn capabilities(&self) -> &Capabilities {
        &self.internal.capabilities
    }

    fn statistics(&self) -> &Arc<RhiStatistics> {
        &self.internal.statistics
    }

    fn is_initialized(&self) -> bool {
        true
    }

    fn default_shader_language(&self) -> Arc<dyn ShaderLanguage> {
        Arc::new(NullShaderLanguage::new(self.clone()))
    }

    fn create_buffer_manager(&self) -> Arc<dyn BufferManager> {
        Arc::new(NullBufferManager::new(self.clone()))
    }

    fn create_texture_manager(&self) -> Arc<dyn TextureManager> {
        Arc::new(NullTextureManager::new(self.clone()))
    }

    fn create_root_signature(
        &self,
        descriptor: &RootSignatureDescriptor,
        debug_name: &str,
    ) -> Result<Arc<RootSignature>, ResourceError> {
        descriptor.validate()?;
        for parameter in &descriptor.parameters {
            if let RootParameter::StaticSampler(static_sampler) = parameter {
                validation::validate_sampler_state(self.capabilities(), &static_sampler.sampler)?;
            }
        }
        let bindings = match self.internal.binding_model {
            BindingModel::Slots => NullBindings::Slots(resolve_slot_bindings(descriptor)?),
            BindingModel::DescriptorTables => {
                NullBindings::DescriptorTables(resolve_descriptor_tables(descriptor)?)
            }
        };
        log::debug!(
            "NullRhi: Creating root signature '{}' with {} parameter(s)",
            debug_name,
            descriptor.parameters.len()
        );
        Ok(Arc::new(RootSignature::new(
            self.core(ResourceType::RootSignature, debug_name),
            descriptor.clone(),
            Box::new(NullRootSignature::new(bindings)),
        )))
    }

    fn create_resource_group(
        &self,
        root_signature: &Arc<RootSignature>,
        root_parameter_index: u32,
        resources: Vec<Arc<dyn Resource>>,
        sampler_states: Option<Vec<Option<Arc<SamplerState>>>>,
        debug_name: &str,
    ) -> Result<Arc<ResourceGroup>, ResourceError> {
        validation::ensure_same_rhi(self.rhi_id(), root_signature.as_ref())?;
        root_signature.validate_resource_group(
            self.rhi_id(),
            root_parameter_index,
            &resources,
            sampler_states.as_deref(),
        )?;
        Ok(Arc::new(ResourceGroup::new(
            self.core(ResourceType::ResourceGroup, debug_name),
            Arc::clone(root_signature),
            root_parameter_index,
            resources,
            sampler_states,
            Box::new(NullNativeObject),
        )))
    }

    fn create_graphics_pipeline_state(
        &self,
        descriptor: &GraphicsPipelineStateDescriptor<'_>,
    ) -> Result<Arc<GraphicsPipelineState>, ResourceError> {
        validation::validate_graphics_pipeline_state(
            self.capabilities(),
            self.rhi_id(),
            descriptor,
        )?;
        let label = Self::label_or(descriptor.label_str(), "Graphics pipeline state");
        log::debug!("NullRhi: Creating graphics pipeline state '{label}'");
        Ok(Arc::new(GraphicsPipelineState::new(
            self.core(ResourceType::GraphicsPipelineState, label),
            descriptor,
            Box::new(NullNativeObject),
        )))
    }

    fn create_compute_pipeline_state(
        &self,
        descriptor: &ComputePipelineStateDescriptor<'_>,
    ) -> Result<Arc<ComputePipelineState>, ResourceError> {
        validation::validate_compute_pipeline_state(
            self.capabilities(),
            self.rhi_id(),
            descriptor,
        )?;
        let label = Self::label_or(descriptor.label_str(), "Compute pipeline state");
        log::debug!("NullRhi: Creating compute pipeline state '{label}'");
        Ok(Arc::new(ComputePipelineState::new(
            self.core(ResourceType::ComputePipelineState, label),
            descriptor,
            Box::new(NullNativeObject),
        )))
    }

    fn create_sampler_state(
        &self,
        descriptor: &SamplerStateDescriptor,
        debug_name: &str,
    ) -> Result<Arc<SamplerState>, ResourceError> {
        validation::validate_sampler_state(self.capabilities(), descriptor)?;
        Ok(Arc::new(SamplerState::new(
            self.core(ResourceType::SamplerState, debug_name),
            *descriptor,
            Box::new(NullNativeObject),
        )))
    }

    fn create_render_pass(
        &self,
        descriptor: &RenderPassDescriptor<'_>,
    ) -> Result<Arc<RenderPass>, ResourceError> {
        validation::validate_render_pass(self.capabilities(), descriptor)?;
        Ok(Arc::new(RenderPass::new(
            self.core(ResourceType::RenderPass, descriptor.label_str()),
            descriptor,
            Box::new(NullNativeObject),
        )))
    }

    fn create_query_pool(
        &self,
        query_type: QueryType,
        number_of_queries: u32,
        debug_name: &str,
    ) -> Result<Arc<QueryPool>, ResourceError> {
        validation::validate_query_pool(number_of_queries)?;
        Ok(Arc::new(QueryPool::new(
            self.core(ResourceType::QueryPool, debug_name),
            query_type,
            number_of_queries,
            Box::new(NullQueryPool::new(number_of_queries)),
        )))
    }

    fn create_swap_chain(
        &self,
        descriptor: &SwapChainDescriptor<'_>,
    ) -> Result<Arc<SwapChain>, ResourceError> {
        validation::ensure_same_rhi(self.rhi_id(), descriptor.render_pass.as_ref())?;
        if descriptor.width == 0 || descriptor.height == 0 {
            return Err(ResourceError::InvalidArgument(format!(
                "swap chain of {}x{} pixels",
                descriptor.width, descriptor.height
            )));
        }
        let label = descriptor.label.as_deref().unwrap_or("Swap chain");
        log::debug!(
            "NullRhi: Creating swap chain '{label}' for window {:?}",
            descriptor.window
        );
        Ok(Arc::new(SwapChain::new(
            self.core(ResourceType::SwapChain, label),
            descriptor,
            Box::new(NullSwapChain::default()),
        )))
    }

    fn create_framebuffer(
        &self,
        descriptor: &FramebufferDescriptor<'_>,
    ) -> Result<Arc<Framebuffer>, ResourceError> {
        let (width, height) = validation::validate_framebuffer(self.rhi_id(), descriptor)?;
        Ok(Arc::new(Framebuffer::new(
            self.core(
                ResourceType::Framebuffer,
                descriptor.label.as_deref().unwrap_or(""),
            ),
            descriptor,
            width,
            height,
            Box::new(NullNativeObject),
        )))
    }

    fn get_query_pool_results(
        &self,
        query_pool: &QueryPool,
        first_query_index: u32,
        number_of_queries: u32,
        flags: QueryResultFlags,
    ) -> Result<Option<Vec<u64>>, RenderError> {
        validation::ensure_same_rhi(self.rhi_id(), query_pool)?;
        if !query_pool.contains_range(first_query_index, number_of_queries) {
            return Err(RenderError::QueryFailed(format!(
                "queries [{first_query_index}, +{number_of_queries}) are outside pool '{}' of {}",
                query_pool.debug_name(),
                query_pool.number_of_queries()
            )));
        }
        let native = NullQueryPool::of(query_pool.native()).ok_or_else(|| {
            RenderError::Internal(format!(
                "query pool '{}' has no null native object",
                query_pool.debug_name()
            ))
        })?;
        match native.results(first_query_index, number_of_queries) {
            Some(results) => Ok(Some(results)),
            None if flags.contains(QueryResultFlags::WAIT) => Err(RenderError::QueryFailed(
                format!(
                    "waiting on unwritten queries of pool '{}'",
                    query_pool.debug_name()
                ),
            )),
            None => Ok(None),
        }
    }

    fn begin_scene(&self) -> bool {
        let was_in_scene = self.internal.in_scene.swap(true, Ordering::AcqRel);
        rhi_assert!(
            self.internal.context,
            !was_in_scene,
            "begin_scene called while a scene is already active"
        )
    }

    fn end_scene(&self) {
        let was_in_scene = self.internal.in_scene.swap(false, Ordering::AcqRel);
        if rhi_assert!(
            self.internal.context,
            was_in_scene,
            "end_scene called without begin_scene"
        ) {
            self.internal.frame_number.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn submit_command_buffer(&self, command_buffer: &CommandBuffer) -> DispatchReport {
        let internal = &self.internal;
        let mut sink = NullCommandSink::new(&internal.clock);
        let report =
            CommandDispatcher::new(&internal.context, &internal.capabilities, internal.rhi_id)
                .dispatch(command_buffer, &mut sink);
        match internal.native_calls.lock() {
            Ok(mut calls) => calls.extend(sink.into_calls()),
            Err(e) => log::error!("NullRhi: Mutex poisoned (native_calls): {e}"),
        }
        report
    }

    fn flush(&self) {
        log::trace!("NullRhi: Flush");
    }

    fn finish(&self) {
        log::trace!("NullRhi: Finish");
    }
}
