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

//! Loading backend configuration from disk.

#[cfg(feature = "null")]
use crate::graphics::null::NullRhiConfig;
#[cfg(feature = "null")]
use anyhow::Context as _;
#[cfg(feature = "null")]
use std::{fs, path::Path};

/// Reads a [`NullRhiConfig`] from a JSON file.
///
/// Missing fields take their default values, so a file only needs to name
/// the capabilities it wants to change.
#[cfg(feature = "null")]
pub fn load_null_rhi_config(path: impl AsRef<Path>) -> anyhow::Result<NullRhiConfig> {
    let path = path.as_ref();
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read null RHI configuration '{}'", path.display()))?;
    let config = NullRhiConfig::from_json_str(&json)
        .with_context(|| format!("Invalid null RHI configuration '{}'", path.display()))?;
    log::info!(
        "Loaded null RHI configuration '{}' for device '{}'",
        path.display(),
        config.capabilities.device_name
    );
    Ok(config)
}

#[cfg(all(test, feature = "null"))]
mod tests {
    use super::*;

    #[test]
    fn missing_files_name_the_path() {
        let error = load_null_rhi_config("/definitely/not/here.json").unwrap_err();
        assert!(error.to_string().contains("/definitely/not/here.json"));
    }
}
