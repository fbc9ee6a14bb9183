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

//! The null backend: the full RHI contract without a GPU.
//!
//! Every creation call is validated exactly like on a real device, resource
//! contents live on the CPU and submitted command buffers are turned into a
//! log of [`NullCall`]s. The advertised capabilities come from a
//! [`NullRhiConfig`], so one process can emulate any feature level.

mod buffer_manager;
mod config;
mod resources;
mod rhi;
mod shader_language;
mod sink;
mod texture_manager;

pub use self::buffer_manager::NullBufferManager;
pub use self::config::NullRhiConfig;
pub use self::resources::{
    NullBindings, NullBuffer, NullNativeObject, NullProgram, NullQueryPool, NullRootSignature,
    NullShader, NullSwapChain, NullTexture,
};
pub use self::rhi::NullRhi;
pub use self::shader_language::NullShaderLanguage;
pub use self::sink::{NullCall, NullCommandSink};
pub use self::texture_manager::NullTextureManager;
