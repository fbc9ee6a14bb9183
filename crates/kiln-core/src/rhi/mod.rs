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

//! The backend-agnostic rendering hardware interface.
//!
//! This module defines the object and command model every backend presents:
//! resource objects and their descriptors, root signatures and resource
//! groups, command buffers and the dispatcher that validates them, device
//! capabilities and errors.
//!
//! The contracts here say 'what' a backend must do. The 'how' lives in
//! `kiln-infra`, whose backends implement [`Rhi`], the resource manager
//! traits and [`CommandSink`]. Higher layers only ever talk to these traits,
//! so switching backends never changes their code.

pub mod backend;
pub mod binding;
pub mod capabilities;
pub mod command;
pub mod deferred;
pub mod device;
pub mod dispatch;
pub mod error;
pub mod format;
pub mod manager;
pub mod pipeline;
pub mod render_target;
pub mod resource;
pub mod root_signature;
pub mod shared;
pub mod state;
pub mod statistics;
pub mod uniform;
pub mod validation;
pub mod vertex;

// Re-export the most important traits and types for easier use.
pub use self::backend::{BackendType, BindingModel, RhiId};
pub use self::capabilities::Capabilities;
pub use self::command::{Command, CommandBuffer, CommandKind};
pub use self::deferred::{GpuWorkQueue, GpuWorkSender};
pub use self::device::Rhi;
pub use self::dispatch::{CommandDispatcher, CommandSink, DispatchReport};
pub use self::error::{CommandError, RenderError, ResourceError};
pub use self::format::{IndexBufferFormat, TextureFormat, VertexAttributeFormat};
pub use self::manager::{BufferManager, ShaderLanguage, TextureManager};
pub use self::resource::{Resource, ResourceId, ResourceType};
pub use self::shared::SharedResourceRegistry;
pub use self::statistics::RhiStatistics;
pub use self::uniform::{UniformBlockWriter, UniformUpdateStrategy};
