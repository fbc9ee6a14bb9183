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

//! Graphics and compute pipeline states.

use crate::rhi::render_target::RenderPass;
use crate::rhi::resource::{impl_resource, GraphicsProgram, NativeResource, ResourceCore, Shader};
use crate::rhi::root_signature::RootSignature;
use crate::rhi::state::{BlendState, DepthStencilState, PrimitiveTopology, RasterizerState};
use crate::rhi::vertex::VertexAttributes;
use std::borrow::Cow;
use std::sync::Arc;

/// Describes a graphics pipeline state.
#[derive(Debug, Clone)]
pub struct GraphicsPipelineStateDescriptor<'a> {
    /// Optional debug name.
    pub label: Option<Cow<'a, str>>,
    /// The root signature resources are bound through.
    pub root_signature: Arc<RootSignature>,
    /// The linked shaders.
    pub graphics_program: Arc<GraphicsProgram>,
    /// The vertex input layout. Must equal the program's layout.
    pub vertex_attributes: VertexAttributes,
    /// Primitive assembly.
    pub primitive_topology: PrimitiveTopology,
    /// Rasterizer configuration.
    pub rasterizer_state: RasterizerState,
    /// Depth and stencil testing.
    pub depth_stencil_state: DepthStencilState,
    /// Color blending.
    pub blend_state: BlendState,
    /// The attachment formats rendered into.
    pub render_pass: Arc<RenderPass>,
}

impl<'a> GraphicsPipelineStateDescriptor<'a> {
    /// A triangle list pipeline with default fixed-function state.
    pub fn new(
        root_signature: Arc<RootSignature>,
        graphics_program: Arc<GraphicsProgram>,
        vertex_attributes: VertexAttributes,
        render_pass: Arc<RenderPass>,
    ) -> Self {
        Self {
            label: None,
            root_signature,
            graphics_program,
            vertex_attributes,
            primitive_topology: PrimitiveTopology::TriangleList,
            rasterizer_state: RasterizerState::default(),
            depth_stencil_state: DepthStencilState::default(),
            blend_state: BlendState::default(),
            render_pass,
        }
    }

    /// The debug name, empty when unset.
    pub fn label_str(&self) -> &str {
        self.label.as_deref().unwrap_or("")
    }
}

/// A compiled graphics pipeline.
#[derive(Debug)]
pub struct GraphicsPipelineState {
    core: ResourceCore,
    root_signature: Arc<RootSignature>,
    graphics_program: Arc<GraphicsProgram>,
    vertex_attributes: VertexAttributes,
    primitive_topology: PrimitiveTopology,
    rasterizer_state: RasterizerState,
    depth_stencil_state: DepthStencilState,
    blend_state: BlendState,
    render_pass: Arc<RenderPass>,
    native: Box<dyn NativeResource>,
}

impl GraphicsPipelineState {
    /// Wraps a native pipeline state. Called by backends only.
    pub fn new(
        core: ResourceCore,
        descriptor: &GraphicsPipelineStateDescriptor<'_>,
        native: Box<dyn NativeResource>,
    ) -> Self {
        Self {
            core,
            root_signature: Arc::clone(&descriptor.root_signature),
            graphics_program: Arc::clone(&descriptor.graphics_program),
            vertex_attributes: descriptor.vertex_attributes.clone(),
            primitive_topology: descriptor.primitive_topology,
            rasterizer_state: descriptor.rasterizer_state,
            depth_stencil_state: descriptor.depth_stencil_state,
            blend_state: descriptor.blend_state,
            render_pass: Arc::clone(&descriptor.render_pass),
            native,
        }
    }

    /// The root signature the pipeline was created against.
    pub fn root_signature(&self) -> &Arc<RootSignature> {
        &self.root_signature
    }

    /// The linked shaders.
    pub fn graphics_program(&self) -> &Arc<GraphicsProgram> {
        &self.graphics_program
    }

    /// The vertex input layout.
    pub fn vertex_attributes(&self) -> &VertexAttributes {
        &self.vertex_attributes
    }

    /// Primitive assembly.
    pub fn primitive_topology(&self) -> PrimitiveTopology {
        self.primitive_topology
    }

    /// Rasterizer configuration.
    pub fn rasterizer_state(&self) -> &RasterizerState {
        &self.rasterizer_state
    }

    /// Depth and stencil testing.
    pub fn depth_stencil_state(&self) -> &DepthStencilState {
        &self.depth_stencil_state
    }

    /// Color blending.
    pub fn blend_state(&self) -> &BlendState {
        &self.blend_state
    }

    /// The render pass the pipeline renders into.
    pub fn render_pass(&self) -> &Arc<RenderPass> {
        &self.render_pass
    }

    /// The backend-private pipeline object.
    pub fn native(&self) -> &dyn NativeResource {
        self.native.as_ref()
    }
}

/// Describes a compute pipeline state.
#[derive(Debug, Clone)]
pub struct ComputePipelineStateDescriptor<'a> {
    /// Optional debug name.
    pub label: Option<Cow<'a, str>>,
    /// The root signature resources are bound through.
    pub root_signature: Arc<RootSignature>,
    /// The compute shader.
    pub compute_shader: Arc<Shader>,
}

impl<'a> ComputePipelineStateDescriptor<'a> {
    /// A compute pipeline without debug name.
    pub fn new(root_signature: Arc<RootSignature>, compute_shader: Arc<Shader>) -> Self {
        Self {
            label: None,
            root_signature,
            compute_shader,
        }
    }

    /// The debug name, empty when unset.
    pub fn label_str(&self) -> &str {
        self.label.as_deref().unwrap_or("")
    }
}

/// A compiled compute pipeline.
#[derive(Debug)]
pub struct ComputePipelineState {
    core: ResourceCore,
    root_signature: Arc<RootSignature>,
    compute_shader: Arc<Shader>,
    native: Box<dyn NativeResource>,
}

impl ComputePipelineState {
    /// Wraps a native compute pipeline. Called by backends only.
    pub fn new(
        core: ResourceCore,
        descriptor: &ComputePipelineStateDescriptor<'_>,
        native: Box<dyn NativeResource>,
    ) -> Self {
        Self {
            core,
            root_signature: Arc::clone(&descriptor.root_signature),
            compute_shader: Arc::clone(&descriptor.compute_shader),
            native,
        }
    }

    /// The root signature the pipeline was created against.
    pub fn root_signature(&self) -> &Arc<RootSignature> {
        &self.root_signature
    }

    /// The compute shader.
    pub fn compute_shader(&self) -> &Arc<Shader> {
        &self.compute_shader
    }

    /// The backend-private pipeline object.
    pub fn native(&self) -> &dyn NativeResource {
        self.native.as_ref()
    }
}

impl_resource!(GraphicsPipelineState, ComputePipelineState);
