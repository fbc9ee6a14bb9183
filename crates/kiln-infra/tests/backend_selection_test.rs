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

//! Integration tests for backend selection and configuration loading.

use kiln_core::rhi::{BackendType, BindingModel, RenderError};
use kiln_core::Context;
use kiln_infra::{load_null_rhi_config, RhiInstance};
use std::fs;
use std::path::PathBuf;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn temp_config_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("kiln-{}-{name}.json", std::process::id()))
}

#[test]
fn test_backend_names_select_the_null_backend() {
    init_logger();
    for name in ["Null", "null", "NULL"] {
        let instance = RhiInstance::from_name(name, Context::default())
            .unwrap_or_else(|e| panic!("'{name}' should select the null backend: {e}"));
        assert_eq!(instance.backend_type(), BackendType::Null);
        assert_eq!(instance.rhi().name(), "Null");
    }
}

#[test]
fn test_unknown_backend_names_are_rejected() {
    init_logger();
    let result = RhiInstance::from_name("Glide", Context::default());
    assert!(matches!(result, Err(RenderError::UnknownBackend(name)) if name == "Glide"));
}

#[test]
fn test_known_but_missing_backends_are_unavailable() {
    init_logger();
    for backend in BackendType::ALL {
        if backend == BackendType::Null {
            continue;
        }
        let result = RhiInstance::new(backend, Context::default());
        assert!(
            matches!(result, Err(RenderError::BackendUnavailable(b)) if b == backend),
            "{backend} has no implementation in this build"
        );
    }
}

#[test]
fn test_partial_config_file_overrides_only_what_it_names() {
    init_logger();
    // --- 1. ARRANGE ---
    let path = temp_config_path("partial");
    fs::write(
        &path,
        r#"{
            "binding_model": "DescriptorTables",
            "capabilities": {
                "device_name": "Emulated GLES device",
                "maximum_uniform_buffer_size": 0
            }
        }"#,
    )
    .unwrap();

    // --- 2. ACT ---
    let config = load_null_rhi_config(&path);
    let _ = fs::remove_file(&path);

    // --- 3. ASSERT ---
    let config = config.expect("A partial configuration must load");
    assert_eq!(config.binding_model, BindingModel::DescriptorTables);
    assert_eq!(config.capabilities.device_name, "Emulated GLES device");
    assert!(!config.capabilities.supports_uniform_buffers());
    assert!(
        config.capabilities.individual_uniforms,
        "Fields missing from the file must keep their defaults"
    );

    let instance = RhiInstance::with_null_config(Context::default(), &config);
    assert_eq!(
        instance.rhi().capabilities().device_name,
        "Emulated GLES device"
    );
}

#[test]
fn test_malformed_config_file_is_an_error() {
    init_logger();
    // --- 1. ARRANGE ---
    let path = temp_config_path("malformed");
    fs::write(&path, "{ \"binding_model\": 42 }").unwrap();

    // --- 2. ACT ---
    let result = load_null_rhi_config(&path);
    let _ = fs::remove_file(&path);

    // --- 3. ASSERT ---
    let error = result.expect_err("A wrongly typed field must be rejected");
    assert!(
        format!("{error:#}").contains("Invalid null RHI configuration"),
        "Unexpected error: {error:#}"
    );
}
