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

//! Integration tests for using one RHI from several threads.
//!
//! Recording happens anywhere, submission on the render thread. GPU resource
//! creation is deferred to the render thread when the device does not
//! advertise native multithreading.

use kiln_core::rhi::capabilities::Capabilities;
use kiln_core::rhi::command::{
    CommandBuffer, DrawGraphics, SetDebugMarker, SetGraphicsRootSignature,
};
use kiln_core::rhi::resource::{BufferDescriptor, VertexBuffer};
use kiln_core::rhi::root_signature::RootSignatureDescriptor;
use kiln_core::rhi::vertex::{VertexArray, VertexAttribute, VertexAttributes};
use kiln_core::rhi::{
    BufferManager, GpuWorkQueue, ResourceError, ResourceType, Rhi, SharedResourceRegistry,
    VertexAttributeFormat,
};
use kiln_core::{Context, RecordingAssertHandler};
use kiln_infra::graphics::null::NullCall;
use kiln_infra::{NullRhi, NullRhiConfig};
use std::sync::Arc;
use std::thread;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn single_threaded_config() -> NullRhiConfig {
    NullRhiConfig {
        capabilities: Capabilities {
            native_multithreading: false,
            ..NullRhiConfig::default().capabilities
        },
        ..NullRhiConfig::default()
    }
}

fn unit_quad(buffers: &dyn BufferManager) -> Result<Arc<VertexArray>, ResourceError> {
    let positions: [f32; 8] = [-0.5, -0.5, 0.5, -0.5, 0.5, 0.5, -0.5, 0.5];
    let vertex_buffer = buffers.create_vertex_buffer(&BufferDescriptor::with_data(
        bytemuck::cast_slice(&positions),
    ))?;
    let attributes = VertexAttributes::new(vec![VertexAttribute::new(
        VertexAttributeFormat::Float2,
        "Position",
        "POSITION",
        0,
        8,
    )])?;
    buffers.create_vertex_array(&attributes, &[vertex_buffer], None, "Unit quad")
}

#[test]
fn test_creation_is_deferred_without_native_multithreading() {
    init_logger();
    // --- 1. ARRANGE ---
    let rhi = NullRhi::with_config(Context::default(), &single_threaded_config());
    let queue = GpuWorkQueue::new(rhi.capabilities());
    let sender = queue.sender();
    let buffers = rhi.create_buffer_manager();
    let (created_tx, created_rx) = flume::unbounded::<Arc<VertexBuffer>>();

    // --- 2. ACT ---
    let loader = thread::spawn(move || {
        for size in [16u32, 32, 64] {
            let buffers = Arc::clone(&buffers);
            let created_tx = created_tx.clone();
            let ran = sender.submit(move || {
                let descriptor = BufferDescriptor::with_size(size);
                if let Ok(buffer) = buffers.create_vertex_buffer(&descriptor) {
                    let _ = created_tx.send(buffer);
                }
            });
            assert!(!ran, "Jobs must wait for the render thread");
        }
    });
    loader.join().unwrap();
    let queued = queue.pending();
    let created_before = created_rx.len();
    let ran = queue.run_pending();

    // --- 3. ASSERT ---
    assert!(!queue.runs_immediately());
    assert_eq!(queued, 3);
    assert_eq!(created_before, 0, "Nothing may be created on the loader thread");
    assert_eq!(ran, 3);
    let sizes: Vec<u32> = created_rx.drain().map(|buffer| buffer.number_of_bytes()).collect();
    assert_eq!(sizes, vec![16, 32, 64], "Deferred jobs run oldest first");
}

#[test]
fn test_creation_runs_in_place_with_native_multithreading() {
    init_logger();
    // --- 1. ARRANGE ---
    let rhi = NullRhi::new(Context::default());
    let queue = GpuWorkQueue::new(rhi.capabilities());
    let buffers = rhi.create_buffer_manager();
    let (created_tx, created_rx) = flume::unbounded();

    // --- 2. ACT ---
    let ran = queue.submit(move || {
        let _ = created_tx.send(buffers.create_uniform_buffer(&BufferDescriptor::with_size(64)));
    });

    // --- 3. ASSERT ---
    assert!(ran);
    assert_eq!(queue.pending(), 0);
    assert!(created_rx.try_recv().unwrap().is_ok());
}

#[test]
fn test_command_buffers_recorded_on_workers_are_submitted_on_the_render_thread() {
    init_logger();
    // --- 1. ARRANGE ---
    let recorder = Arc::new(RecordingAssertHandler::new());
    let rhi = NullRhi::new(Context::new(recorder.clone()));
    let root_signature = rhi
        .create_root_signature(&RootSignatureDescriptor::new(), "Empty")
        .unwrap();
    let (frames_tx, frames_rx) = flume::bounded::<CommandBuffer>(2);

    // --- 2. ACT ---
    let worker = {
        let root_signature = Arc::clone(&root_signature);
        thread::spawn(move || {
            for frame in 0..4u32 {
                let mut command_buffer = CommandBuffer::new();
                SetDebugMarker::create(&mut command_buffer, &format!("Frame {frame}"));
                SetGraphicsRootSignature::create(&mut command_buffer, &root_signature);
                DrawGraphics::create(&mut command_buffer, 3 * (frame + 1), 1, 0, 0);
                if frames_tx.send(command_buffer).is_err() {
                    break;
                }
            }
        })
    };
    let mut frames = 0;
    for command_buffer in frames_rx.iter() {
        assert!(rhi.begin_scene());
        command_buffer.submit_to_rhi(&rhi);
        rhi.end_scene();
        frames += 1;
    }
    worker.join().unwrap();

    // --- 3. ASSERT ---
    assert_eq!(frames, 4);
    assert_eq!(recorder.failure_count(), 0, "{:?}", recorder.failures());
    let vertex_counts: Vec<u32> = rhi
        .take_native_calls()
        .into_iter()
        .filter_map(|call| match call {
            NullCall::Draw(arguments) => Some(arguments.vertex_count_per_instance),
            _ => None,
        })
        .collect();
    assert_eq!(vertex_counts, vec![3, 6, 9, 12], "Frames must be submitted in order");
}

#[test]
fn test_shared_resources_live_while_someone_uses_them() {
    init_logger();
    // --- 1. ARRANGE ---
    let rhi = NullRhi::new(Context::default());
    let buffers = rhi.create_buffer_manager();
    let registry = Arc::new(SharedResourceRegistry::new());

    // --- 2. ACT ---
    let users: Vec<Arc<VertexArray>> = (0..4)
        .map(|_| {
            let registry = Arc::clone(&registry);
            let buffers = Arc::clone(&buffers);
            thread::spawn(move || registry.acquire("unit_quad", || unit_quad(buffers.as_ref())))
        })
        .collect::<Vec<_>>()
        .into_iter()
        .map(|handle| handle.join().unwrap().unwrap())
        .collect();

    // --- 3. ASSERT ---
    assert!(users.windows(2).all(|pair| Arc::ptr_eq(&pair[0], &pair[1])));
    assert_eq!(
        rhi.statistics().current_number_of(ResourceType::VertexArray),
        1,
        "Concurrent first users must share one vertex array"
    );
    assert!(registry.is_alive::<VertexArray>("unit_quad"));

    drop(users);
    assert!(!registry.is_alive::<VertexArray>("unit_quad"));
    assert_eq!(rhi.statistics().number_of_current_resources(), 0);
    registry.purge();
    assert!(registry.is_empty());
}
