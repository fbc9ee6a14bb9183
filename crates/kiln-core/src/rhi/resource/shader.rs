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

//! Shaders and graphics programs.

use super::{impl_resource, NativeResource, ResourceCore, ResourceType};
use crate::rhi::root_signature::RootSignature;
use crate::rhi::vertex::VertexAttributes;
use std::sync::Arc;

/// A programmable pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ShaderStage {
    /// Vertex stage.
    Vertex,
    /// Tessellation control (hull) stage.
    TessellationControl,
    /// Tessellation evaluation (domain) stage.
    TessellationEvaluation,
    /// Geometry stage.
    Geometry,
    /// Fragment (pixel) stage.
    Fragment,
    /// Task (amplification) stage.
    Task,
    /// Mesh stage.
    Mesh,
    /// Compute stage.
    Compute,
}

impl ShaderStage {
    /// The resource kind of shaders of this stage.
    pub const fn resource_type(self) -> ResourceType {
        match self {
            ShaderStage::Vertex => ResourceType::VertexShader,
            ShaderStage::TessellationControl => ResourceType::TessellationControlShader,
            ShaderStage::TessellationEvaluation => ResourceType::TessellationEvaluationShader,
            ShaderStage::Geometry => ResourceType::GeometryShader,
            ShaderStage::Fragment => ResourceType::FragmentShader,
            ShaderStage::Task => ResourceType::TaskShader,
            ShaderStage::Mesh => ResourceType::MeshShader,
            ShaderStage::Compute => ResourceType::ComputeShader,
        }
    }
}

/// Shader source handed to a shader language.
#[derive(Debug, Clone, Copy)]
pub struct ShaderSourceCode<'a> {
    /// The source text.
    pub source_code: &'a str,
    /// Optional preprocessor definitions prepended to the source.
    pub preprocessor_definitions: Option<&'a str>,
}

impl<'a> ShaderSourceCode<'a> {
    /// Source without preprocessor definitions.
    pub fn new(source_code: &'a str) -> Self {
        Self {
            source_code,
            preprocessor_definitions: None,
        }
    }
}

/// Precompiled shader bytecode.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShaderBytecode {
    bytecode: Vec<u8>,
}

impl ShaderBytecode {
    /// Wraps compiled bytecode.
    pub fn new(bytecode: Vec<u8>) -> Self {
        Self { bytecode }
    }

    /// The raw bytecode.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytecode
    }
}

/// A compiled shader of one stage.
#[derive(Debug)]
pub struct Shader {
    core: ResourceCore,
    stage: ShaderStage,
    native: Box<dyn NativeResource>,
}

impl Shader {
    /// Wraps a native shader. Called by backends only.
    pub fn new(core: ResourceCore, stage: ShaderStage, native: Box<dyn NativeResource>) -> Self {
        Self {
            core,
            stage,
            native,
        }
    }

    /// The stage the shader runs in.
    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    /// The backend-private shader object.
    pub fn native(&self) -> &dyn NativeResource {
        self.native.as_ref()
    }
}

/// Opaque handle of an individual uniform within a graphics program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UniformHandle(pub u32);

/// A value written to an individual uniform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    /// One float.
    Float1(f32),
    /// Two floats.
    Float2([f32; 2]),
    /// Three floats.
    Float3([f32; 3]),
    /// Four floats.
    Float4([f32; 4]),
    /// Column-major 3x3 matrix.
    Matrix3([f32; 9]),
    /// Column-major 4x4 matrix.
    Matrix4([f32; 16]),
    /// One signed integer.
    Int1(i32),
}

impl UniformValue {
    /// The raw bytes of the value, as laid out in a tightly packed block.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            UniformValue::Float1(v) => bytemuck::bytes_of(v),
            UniformValue::Float2(v) => bytemuck::bytes_of(v),
            UniformValue::Float3(v) => bytemuck::bytes_of(v),
            UniformValue::Float4(v) => bytemuck::bytes_of(v),
            UniformValue::Matrix3(v) => bytemuck::bytes_of(v),
            UniformValue::Matrix4(v) => bytemuck::bytes_of(v),
            UniformValue::Int1(v) => bytemuck::bytes_of(v),
        }
    }
}

/// The backend-private part of a graphics program.
pub trait NativeGraphicsProgram: NativeResource {
    /// Looks up an individual uniform by name.
    fn uniform_handle(&self, name: &str) -> Option<UniformHandle>;
}

/// The set of shaders linked into a graphics program.
#[derive(Debug, Clone, Default)]
pub struct GraphicsProgramShaders {
    /// Vertex shader.
    pub vertex: Option<Arc<Shader>>,
    /// Tessellation control shader.
    pub tessellation_control: Option<Arc<Shader>>,
    /// Tessellation evaluation shader.
    pub tessellation_evaluation: Option<Arc<Shader>>,
    /// Geometry shader.
    pub geometry: Option<Arc<Shader>>,
    /// Fragment shader.
    pub fragment: Option<Arc<Shader>>,
    /// Task shader.
    pub task: Option<Arc<Shader>>,
    /// Mesh shader.
    pub mesh: Option<Arc<Shader>>,
}

impl GraphicsProgramShaders {
    /// The classic vertex plus fragment pair.
    pub fn vertex_fragment(vertex: Arc<Shader>, fragment: Arc<Shader>) -> Self {
        Self {
            vertex: Some(vertex),
            fragment: Some(fragment),
            ..Default::default()
        }
    }

    /// Every present shader paired with the stage it is linked as.
    pub fn iter(&self) -> impl Iterator<Item = (ShaderStage, &Arc<Shader>)> {
        [
            (ShaderStage::Vertex, &self.vertex),
            (ShaderStage::TessellationControl, &self.tessellation_control),
            (ShaderStage::TessellationEvaluation, &self.tessellation_evaluation),
            (ShaderStage::Geometry, &self.geometry),
            (ShaderStage::Fragment, &self.fragment),
            (ShaderStage::Task, &self.task),
            (ShaderStage::Mesh, &self.mesh),
        ]
        .into_iter()
        .filter_map(|(stage, shader)| shader.as_ref().map(|shader| (stage, shader)))
    }
}

/// Linked shaders forming the programmable part of a graphics pipeline.
#[derive(Debug)]
pub struct GraphicsProgram {
    core: ResourceCore,
    root_signature: Arc<RootSignature>,
    vertex_attributes: VertexAttributes,
    shaders: GraphicsProgramShaders,
    native: Box<dyn NativeGraphicsProgram>,
}

impl GraphicsProgram {
    /// Wraps a native program. Called by backends only.
    pub fn new(
        core: ResourceCore,
        root_signature: Arc<RootSignature>,
        vertex_attributes: VertexAttributes,
        shaders: GraphicsProgramShaders,
        native: Box<dyn NativeGraphicsProgram>,
    ) -> Self {
        Self {
            core,
            root_signature,
            vertex_attributes,
            shaders,
            native,
        }
    }

    /// The root signature the program was linked against.
    pub fn root_signature(&self) -> &Arc<RootSignature> {
        &self.root_signature
    }

    /// The vertex input layout of the program.
    pub fn vertex_attributes(&self) -> &VertexAttributes {
        &self.vertex_attributes
    }

    /// The linked shaders.
    pub fn shaders(&self) -> &GraphicsProgramShaders {
        &self.shaders
    }

    /// Looks up an individual uniform by name.
    pub fn uniform_handle(&self, name: &str) -> Option<UniformHandle> {
        self.native.uniform_handle(name)
    }

    /// The backend-private program object.
    pub fn native(&self) -> &dyn NativeGraphicsProgram {
        self.native.as_ref()
    }
}

impl_resource!(Shader, GraphicsProgram);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_values_expose_packed_bytes() {
        assert_eq!(UniformValue::Float2([1.0, 2.0]).as_bytes().len(), 8);
        assert_eq!(UniformValue::Matrix4([0.0; 16]).as_bytes().len(), 64);
        assert_eq!(UniformValue::Int1(-1).as_bytes(), &[0xff; 4]);
    }

    #[test]
    fn stages_map_to_shader_kinds() {
        assert_eq!(
            ShaderStage::Fragment.resource_type(),
            ResourceType::FragmentShader
        );
        assert!(ShaderStage::Compute.resource_type().is_shader());
    }
}
