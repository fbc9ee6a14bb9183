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

//! Integration tests for resource ownership on the null backend.
//!
//! Every handle starts with a single owner, composite resources keep what
//! they reference alive, and the backend statistics return to their
//! baseline once the last handle is dropped.

use kiln_core::rhi::resource::{BufferDescriptor, Resource, ResourceType, TextureFlags};
use kiln_core::rhi::vertex::{VertexAttribute, VertexAttributes};
use kiln_core::rhi::{
    BufferManager, IndexBufferFormat, Rhi, TextureFormat, TextureManager, VertexAttributeFormat,
};
use kiln_core::{Context, RecordingAssertHandler};
use kiln_infra::NullRhi;
use std::sync::Arc;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn position_attributes() -> VertexAttributes {
    VertexAttributes::new(vec![VertexAttribute::new(
        VertexAttributeFormat::Float3,
        "Position",
        "POSITION",
        0,
        12,
    )])
    .unwrap()
}

#[test]
fn test_created_handles_have_a_single_owner() {
    init_logger();
    // --- 1. ARRANGE ---
    let rhi = NullRhi::new(Context::default());
    let buffers = rhi.create_buffer_manager();

    // --- 2. ACT ---
    let vertex_buffer = buffers
        .create_vertex_buffer(&BufferDescriptor::with_size(64).label("Single owner"))
        .unwrap();

    // --- 3. ASSERT ---
    assert_eq!(
        Arc::strong_count(&vertex_buffer),
        1,
        "A fresh handle must be owned by its creator only"
    );
    assert_eq!(vertex_buffer.resource_type(), ResourceType::VertexBuffer);
}

#[test]
fn test_resource_count_returns_to_baseline() {
    init_logger();
    // --- 1. ARRANGE ---
    let rhi = NullRhi::new(Context::default());
    let buffers = rhi.create_buffer_manager();
    let textures = rhi.create_texture_manager();
    let baseline = rhi.statistics().number_of_current_resources();

    // --- 2. ACT ---
    {
        let mut handles: Vec<Arc<dyn Resource>> = Vec::new();
        for i in 0..16u32 {
            handles.push(
                buffers
                    .create_uniform_buffer(&BufferDescriptor::with_size(256))
                    .unwrap(),
            );
            handles.push(
                textures
                    .create_texture_2d(
                        16 + i,
                        16,
                        TextureFormat::Rgba8Unorm,
                        None,
                        TextureFlags::SHADER_RESOURCE,
                        "Transient",
                    )
                    .unwrap(),
            );
        }
        assert_eq!(
            rhi.statistics().number_of_current_resources(),
            baseline + 32,
            "Every created handle must be counted while alive"
        );
    }

    // --- 3. ASSERT ---
    assert_eq!(
        rhi.statistics().number_of_current_resources(),
        baseline,
        "Dropping every handle must release every native resource"
    );
    assert_eq!(rhi.statistics().number_of_created_resources(), 32);
    assert_eq!(rhi.statistics().current_number_of(ResourceType::UniformBuffer), 0);
}

#[test]
fn test_vertex_array_keeps_its_buffers_alive() {
    init_logger();
    // --- 1. ARRANGE ---
    let rhi = NullRhi::new(Context::default());
    let buffers = rhi.create_buffer_manager();
    let vertex_buffer = buffers
        .create_vertex_buffer(&BufferDescriptor::with_size(36))
        .unwrap();
    let index_buffer = buffers
        .create_index_buffer(&BufferDescriptor::with_size(6), IndexBufferFormat::UnsignedShort)
        .unwrap();

    // --- 2. ACT ---
    let vertex_array = buffers
        .create_vertex_array(
            &position_attributes(),
            &[Arc::clone(&vertex_buffer)],
            Some(&index_buffer),
            "Triangle",
        )
        .unwrap();
    drop(vertex_buffer);
    drop(index_buffer);

    // --- 3. ASSERT ---
    assert_eq!(
        rhi.statistics().current_number_of(ResourceType::VertexBuffer),
        1,
        "The vertex array must outlive the caller's buffer handles"
    );
    assert_eq!(rhi.statistics().current_number_of(ResourceType::IndexBuffer), 1);

    drop(vertex_array);
    assert_eq!(
        rhi.statistics().number_of_current_resources(),
        0,
        "Dropping the last referrer must release the referenced buffers"
    );
}

#[test]
fn test_foreign_resources_are_rejected() {
    init_logger();
    // --- 1. ARRANGE ---
    let recorder = Arc::new(RecordingAssertHandler::new());
    let first = NullRhi::new(Context::new(recorder.clone()));
    let second = NullRhi::new(Context::new(recorder));
    let foreign_buffer = first
        .create_buffer_manager()
        .create_vertex_buffer(&BufferDescriptor::with_size(12))
        .unwrap();

    // --- 2. ACT ---
    let result = second.create_buffer_manager().create_vertex_array(
        &position_attributes(),
        &[foreign_buffer],
        None,
        "Foreign",
    );

    // --- 3. ASSERT ---
    assert!(
        result.is_err(),
        "A vertex array must not reference buffers of another RHI instance"
    );
    assert_eq!(second.statistics().number_of_current_resources(), 0);
}
