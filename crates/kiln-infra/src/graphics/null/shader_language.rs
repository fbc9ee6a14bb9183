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

//! Shader "compilation" of the null backend.
//!
//! Nothing is compiled. Source shaders are scanned for individual uniform
//! declarations so linked programs can hand out uniform handles; bytecode
//! shaders are opaque and declare none.

use super::resources::{NullProgram, NullShader};
use super::rhi::NullRhi;
use kiln_core::rhi::resource::{
    GraphicsProgram, GraphicsProgramShaders, Shader, ShaderBytecode, ShaderSourceCode,
    ShaderStage,
};
use kiln_core::rhi::root_signature::RootSignature;
use kiln_core::rhi::validation;
use kiln_core::rhi::vertex::VertexAttributes;
use kiln_core::rhi::{ResourceError, ResourceType, Rhi, ShaderLanguage};
use std::sync::Arc;

/// Shader language of the null backend.
#[derive(Debug)]
pub struct NullShaderLanguage {
    rhi: NullRhi,
}

impl NullShaderLanguage {
    /// Name reported by [`ShaderLanguage::name`].
    pub const NAME: &'static str = "Null";

    /// Creates the language for `rhi`.
    pub fn new(rhi: NullRhi) -> Self {
        Self { rhi }
    }

    fn create_shader(
        &self,
        stage: ShaderStage,
        native: NullShader,
        debug_name: &str,
    ) -> Result<Arc<Shader>, ResourceError> {
        validation::validate_shader_stage(self.rhi.capabilities(), stage)?;
        log::debug!(
            "NullShaderLanguage: Creating {stage:?} shader '{debug_name}' with {} uniform(s)",
            native.uniform_names().len()
        );
        Ok(Arc::new(Shader::new(
            self.rhi.core(stage.resource_type(), debug_name),
            stage,
            Box::new(native),
        )))
    }
}

impl ShaderLanguage for NullShaderLanguage {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn create_shader_from_source_code(
        &self,
        stage: ShaderStage,
        source_code: &ShaderSourceCode<'_>,
        debug_name: &str,
    ) -> Result<Arc<Shader>, ResourceError> {
        if source_code.source_code.trim().is_empty() {
            return Err(ResourceError::InvalidArgument(format!(
                "{stage:?} shader '{debug_name}' has no source code"
            )));
        }
        let native = match source_code.preprocessor_definitions {
            Some(definitions) => {
                NullShader::from_source(&format!("{definitions}\n{}", source_code.source_code))
            }
            None => NullShader::from_source(source_code.source_code),
        };
        self.create_shader(stage, native, debug_name)
    }

    fn create_shader_from_bytecode(
        &self,
        stage: ShaderStage,
        bytecode: &ShaderBytecode,
        debug_name: &str,
    ) -> Result<Arc<Shader>, ResourceError> {
        if !self.rhi.capabilities().shader_bytecode {
            return Err(ResourceError::FeatureNotSupported(
                "shader bytecode".into(),
            ));
        }
        if bytecode.as_bytes().is_empty() {
            return Err(ResourceError::InvalidArgument(format!(
                "{stage:?} shader '{debug_name}' has empty bytecode"
            )));
        }
        self.create_shader(stage, NullShader::default(), debug_name)
    }

    fn create_graphics_program(
        &self,
        root_signature: &Arc<RootSignature>,
        vertex_attributes: &VertexAttributes,
        shaders: GraphicsProgramShaders,
        debug_name: &str,
    ) -> Result<Arc<GraphicsProgram>, ResourceError> {
        validation::ensure_same_rhi(self.rhi.rhi_id(), root_signature.as_ref())?;
        validation::validate_graphics_program_shaders(
            self.rhi.capabilities(),
            self.rhi.rhi_id(),
            &shaders,
        )?;
        let uniform_names: Vec<&str> = shaders
            .iter()
            .filter_map(|(_, shader)| NullShader::of(shader.native()))
            .flat_map(|shader| shader.uniform_names().iter().map(String::as_str))
            .collect();
        let native = NullProgram::new(uniform_names);
        log::debug!(
            "NullShaderLanguage: Linking graphics program '{debug_name}' with {} uniform(s)",
            native.number_of_uniforms()
        );
        Ok(Arc::new(GraphicsProgram::new(
            self.rhi.core(ResourceType::GraphicsProgram, debug_name),
            Arc::clone(root_signature),
            vertex_attributes.clone(),
            shaders,
            Box::new(native),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiln_core::rhi::resource::UniformHandle;
    use kiln_core::rhi::root_signature::RootSignatureDescriptor;
    use kiln_core::rhi::Capabilities;
    use kiln_core::Context;
    use crate::graphics::null::NullRhiConfig;

    const VERTEX_SOURCE: &str = "uniform mat4 ObjectSpaceToClipSpaceMatrix;\nvoid main() {}";
    const FRAGMENT_SOURCE: &str =
        "uniform vec4 Tint;\nuniform mat4 ObjectSpaceToClipSpaceMatrix;\nvoid main() {}";

    #[test]
    fn programs_merge_uniforms_of_every_stage() {
        let rhi = NullRhi::new(Context::default());
        let language = NullShaderLanguage::new(rhi.clone());
        let root_signature = rhi
            .create_root_signature(&RootSignatureDescriptor::new(), "empty")
            .unwrap();

        let vertex = language
            .create_shader_from_source_code(
                ShaderStage::Vertex,
                &ShaderSourceCode::new(VERTEX_SOURCE),
                "vs",
            )
            .unwrap();
        let fragment = language
            .create_shader_from_source_code(
                ShaderStage::Fragment,
                &ShaderSourceCode::new(FRAGMENT_SOURCE),
                "fs",
            )
            .unwrap();
        let program = language
            .create_graphics_program(
                &root_signature,
                &VertexAttributes::default(),
                GraphicsProgramShaders::vertex_fragment(vertex, fragment),
                "program",
            )
            .unwrap();

        assert_eq!(
            program.uniform_handle("ObjectSpaceToClipSpaceMatrix"),
            Some(UniformHandle(0))
        );
        assert_eq!(program.uniform_handle("Tint"), Some(UniformHandle(1)));
        assert_eq!(program.uniform_handle("Missing"), None);
    }

    #[test]
    fn bytecode_needs_device_support() {
        let config = NullRhiConfig {
            capabilities: Capabilities {
                shader_bytecode: false,
                ..Capabilities::default()
            },
            ..NullRhiConfig::default()
        };
        let language = NullShaderLanguage::new(NullRhi::with_config(Context::default(), &config));

        let result = language.create_shader_from_bytecode(
            ShaderStage::Vertex,
            &ShaderBytecode::new(vec![0x03, 0x02, 0x23, 0x07]),
            "spirv",
        );

        assert!(matches!(result, Err(ResourceError::FeatureNotSupported(_))));
    }

    #[test]
    fn empty_source_is_rejected() {
        let language = NullShaderLanguage::new(NullRhi::new(Context::default()));
        let result = language.create_shader_from_source_code(
            ShaderStage::Fragment,
            &ShaderSourceCode::new("   "),
            "blank",
        );
        assert!(matches!(result, Err(ResourceError::InvalidArgument(_))));
    }
}
