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

//! Configuration of the null backend.

use kiln_core::rhi::{BindingModel, Capabilities};
use serde::{Deserialize, Serialize};

/// What the null backend pretends to be.
///
/// Every field has a default, so a configuration file only lists what it
/// changes:
///
/// ```json
/// {
///     "binding_model": "DescriptorTables",
///     "capabilities": { "maximum_uniform_buffer_size": 0 }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NullRhiConfig {
    /// The limits the device advertises.
    pub capabilities: Capabilities,
    /// The binding model root signatures are resolved for.
    pub binding_model: BindingModel,
    /// Overrides the debug-name policy of the context when set.
    pub keep_debug_names: Option<bool>,
}

impl Default for NullRhiConfig {
    fn default() -> Self {
        Self {
            capabilities: Capabilities {
                device_name: String::from("Null device"),
                ..Capabilities::default()
            },
            binding_model: BindingModel::Slots,
            keep_debug_names: None,
        }
    }
}

impl NullRhiConfig {
    /// Parses a configuration from JSON.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Emulates a device without uniform buffers, like OpenGL ES 2.
    pub fn without_uniform_buffers(mut self) -> Self {
        self.capabilities.maximum_uniform_buffer_size = 0;
        self
    }
}
