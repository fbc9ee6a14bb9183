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

//! Integration tests for command buffer dispatch on the null backend.
//!
//! The null backend logs every native call it would make, which makes the
//! dispatch results directly comparable between submissions.

use kiln_core::rhi::command::{
    BeginDebugEvent, CommandBuffer, CopyUniformBufferData, DrawGraphics,
    DrawIndexedGraphics, EndDebugEvent, ExecuteCommandBuffer, SetDebugMarker,
    SetGraphicsRootSignature, SetGraphicsVertexArray, SetGraphicsViewports, SetUniform,
};
use kiln_core::rhi::resource::{
    BufferDescriptor, DrawArguments, GraphicsProgram, GraphicsProgramShaders, IndirectBufferFlags,
    ShaderSourceCode, ShaderStage, UniformValue,
};
use kiln_core::rhi::root_signature::{RootSignature, RootSignatureDescriptor};
use kiln_core::rhi::vertex::{VertexArray, VertexAttribute, VertexAttributes};
use kiln_core::rhi::{
    BufferManager, IndexBufferFormat, Rhi, ShaderLanguage, UniformBlockWriter,
    UniformUpdateStrategy, VertexAttributeFormat,
};
use kiln_core::rhi::uniform::{UniformField, UniformKind};
use kiln_core::{Context, RecordingAssertHandler};
use kiln_infra::graphics::null::{NullBuffer, NullCall};
use kiln_infra::{NullRhi, NullRhiConfig};
use std::sync::Arc;

const VERTEX_SOURCE: &str = "uniform vec4 Tint;\nvoid main() {}";
const FRAGMENT_SOURCE: &str = "void main() {}";

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn recording_rhi(config: &NullRhiConfig) -> (Arc<RecordingAssertHandler>, NullRhi) {
    let recorder = Arc::new(RecordingAssertHandler::new());
    let rhi = NullRhi::with_config(Context::new(recorder.clone()), config);
    (recorder, rhi)
}

fn empty_root_signature(rhi: &NullRhi) -> Arc<RootSignature> {
    rhi.create_root_signature(&RootSignatureDescriptor::new(), "Empty")
        .unwrap()
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

/// A quad: 4 vertices of 6 floats (position and color), 6 indices.
fn quad_vertex_array(rhi: &NullRhi) -> Arc<VertexArray> {
    let vertices: [f32; 24] = [
        -1.0, -1.0, 0.0, 1.0, 0.0, 0.0, //
        1.0, -1.0, 0.0, 0.0, 1.0, 0.0, //
        1.0, 1.0, 0.0, 0.0, 0.0, 1.0, //
        -1.0, 1.0, 0.0, 1.0, 1.0, 1.0,
    ];
    let indices: [u16; 6] = [0, 1, 2, 0, 2, 3];
    let buffers = rhi.create_buffer_manager();
    let vertex_buffer = buffers
        .create_vertex_buffer(
            &BufferDescriptor::with_data(bytemuck::cast_slice(&vertices)).label("Quad vertices"),
        )
        .unwrap();
    let index_buffer = buffers
        .create_index_buffer(
            &BufferDescriptor::with_data(bytemuck::cast_slice(&indices)).label("Quad indices"),
            IndexBufferFormat::UnsignedShort,
        )
        .unwrap();
    let attributes = VertexAttributes::new(vec![
        VertexAttribute::new(VertexAttributeFormat::Float3, "Position", "POSITION", 0, 24),
        VertexAttribute::new(VertexAttributeFormat::Float3, "Color", "COLOR", 12, 24),
    ])
    .unwrap();
    buffers
        .create_vertex_array(&attributes, &[vertex_buffer], Some(&index_buffer), "Quad")
        .unwrap()
}

fn tinted_program(rhi: &NullRhi, root_signature: &Arc<RootSignature>) -> Arc<GraphicsProgram> {
    let language = rhi.default_shader_language();
    let vertex = language
        .create_shader_from_source_code(
            ShaderStage::Vertex,
            &ShaderSourceCode::new(VERTEX_SOURCE),
            "Tinted vertex",
        )
        .unwrap();
    let fragment = language
        .create_shader_from_source_code(
            ShaderStage::Fragment,
            &ShaderSourceCode::new(FRAGMENT_SOURCE),
            "Tinted fragment",
        )
        .unwrap();
    language
        .create_graphics_program(
            root_signature,
            &position_attributes(),
            GraphicsProgramShaders::vertex_fragment(vertex, fragment),
            "Tinted",
        )
        .unwrap()
}

fn record_frame(
    command_buffer: &mut CommandBuffer,
    root_signature: &Arc<RootSignature>,
    vertex_array: &Arc<VertexArray>,
) {
    BeginDebugEvent::create(command_buffer, "Frame");
    SetGraphicsViewports::create_single(command_buffer, 0.0, 0.0, 1280.0, 720.0);
    SetGraphicsRootSignature::create(command_buffer, root_signature);
    SetGraphicsVertexArray::create(command_buffer, vertex_array);
    DrawIndexedGraphics::create(command_buffer, 6, 1, 0, 0, 0);
    SetDebugMarker::create(command_buffer, "Quad drawn");
    DrawGraphics::create(command_buffer, 3, 1, 0, 0);
    EndDebugEvent::create(command_buffer);
}

// ─────────────────────────────────────────────────────────────────────────────
// Draw submission
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_indexed_quad_records_one_draw_call() {
    init_logger();
    // --- 1. ARRANGE ---
    let (recorder, rhi) = recording_rhi(&NullRhiConfig::default());
    let root_signature = empty_root_signature(&rhi);
    let vertex_array = quad_vertex_array(&rhi);
    let mut command_buffer = CommandBuffer::new();
    SetGraphicsRootSignature::create(&mut command_buffer, &root_signature);
    SetGraphicsVertexArray::create(&mut command_buffer, &vertex_array);
    DrawIndexedGraphics::create(&mut command_buffer, 6, 1, 0, 0, 0);

    // --- 2. ACT ---
    assert!(rhi.begin_scene());
    let report = command_buffer.submit_to_rhi(&rhi);
    rhi.end_scene();

    // --- 3. ASSERT ---
    assert_eq!(recorder.failure_count(), 0, "{:?}", recorder.failures());
    assert_eq!(report.native_calls, 3);
    assert_eq!(report.records_skipped, 0);
    let draws: Vec<_> = rhi
        .take_native_calls()
        .into_iter()
        .filter_map(|call| match call {
            NullCall::DrawIndexed(arguments) => Some(arguments),
            _ => None,
        })
        .collect();
    assert_eq!(draws.len(), 1, "Exactly one indexed draw must reach the backend");
    assert_eq!(draws[0].index_count_per_instance, 6);
    assert_eq!(draws[0].instance_count, 1);
}

#[test]
fn test_draw_without_required_state_is_skipped() {
    init_logger();
    // --- 1. ARRANGE ---
    let (recorder, rhi) = recording_rhi(&NullRhiConfig::default());
    let root_signature = empty_root_signature(&rhi);
    let mut command_buffer = CommandBuffer::new();
    DrawGraphics::create(&mut command_buffer, 3, 1, 0, 0);
    SetGraphicsRootSignature::create(&mut command_buffer, &root_signature);
    DrawIndexedGraphics::create(&mut command_buffer, 6, 1, 0, 0, 0);

    // --- 2. ACT ---
    let report = command_buffer.submit_to_rhi(&rhi);

    // --- 3. ASSERT ---
    assert_eq!(report.records_skipped, 2);
    assert_eq!(
        recorder.failure_count(),
        2,
        "Both draws violate a binding contract and must be reported"
    );
    assert!(!rhi
        .take_native_calls()
        .iter()
        .any(|call| matches!(call, NullCall::Draw(_) | NullCall::DrawIndexed(_))));
}

#[test]
fn test_indirect_draws_read_their_arguments_from_the_buffer() {
    init_logger();
    // --- 1. ARRANGE ---
    let (recorder, rhi) = recording_rhi(&NullRhiConfig::default());
    let root_signature = empty_root_signature(&rhi);
    let arguments = [
        DrawArguments {
            vertex_count_per_instance: 3,
            instance_count: 1,
            start_vertex_location: 0,
            start_instance_location: 0,
        },
        DrawArguments {
            vertex_count_per_instance: 6,
            instance_count: 4,
            start_vertex_location: 3,
            start_instance_location: 0,
        },
    ];
    let indirect_buffer = rhi
        .create_buffer_manager()
        .create_indirect_buffer(
            &BufferDescriptor::with_data(bytemuck::cast_slice(&arguments)),
            IndirectBufferFlags::DRAW_ARGUMENTS,
        )
        .unwrap();
    let mut command_buffer = CommandBuffer::new();
    SetGraphicsRootSignature::create(&mut command_buffer, &root_signature);
    DrawGraphics::create_indirect(&mut command_buffer, &indirect_buffer, 0, 2).unwrap();

    // --- 2. ACT ---
    command_buffer.submit_to_rhi(&rhi);

    // --- 3. ASSERT ---
    assert_eq!(recorder.failure_count(), 0, "{:?}", recorder.failures());
    let draws: Vec<_> = rhi
        .take_native_calls()
        .into_iter()
        .filter_map(|call| match call {
            NullCall::Draw(arguments) => Some(arguments),
            _ => None,
        })
        .collect();
    assert_eq!(draws, arguments.to_vec());
}

#[test]
fn test_indirect_ranges_are_checked_when_recording() {
    init_logger();
    // --- 1. ARRANGE ---
    let rhi = NullRhi::new(Context::default());
    let indirect_buffer = rhi
        .create_buffer_manager()
        .create_indirect_buffer(
            &BufferDescriptor::with_size(DrawArguments::SIZE),
            IndirectBufferFlags::DRAW_ARGUMENTS,
        )
        .unwrap();
    let mut command_buffer = CommandBuffer::new();

    // --- 2. ACT ---
    let result = DrawGraphics::create_indirect(&mut command_buffer, &indirect_buffer, 0, 2);

    // --- 3. ASSERT ---
    assert!(result.is_err(), "Two draws do not fit a one-draw buffer");
    assert!(command_buffer.is_empty(), "A rejected record must not be added");
}

// ─────────────────────────────────────────────────────────────────────────────
// Replay determinism
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_clear_and_refill_gives_identical_native_calls() {
    init_logger();
    // --- 1. ARRANGE ---
    let (recorder, rhi) = recording_rhi(&NullRhiConfig::default());
    let root_signature = empty_root_signature(&rhi);
    let vertex_array = quad_vertex_array(&rhi);
    let mut command_buffer = CommandBuffer::new();

    // --- 2. ACT ---
    record_frame(&mut command_buffer, &root_signature, &vertex_array);
    let first_report = command_buffer.submit_to_rhi_and_clear(&rhi);
    let first_calls = rhi.take_native_calls();

    assert!(command_buffer.is_empty());
    record_frame(&mut command_buffer, &root_signature, &vertex_array);
    let second_report = command_buffer.submit_to_rhi_and_clear(&rhi);
    let second_calls = rhi.take_native_calls();

    // --- 3. ASSERT ---
    assert_eq!(recorder.failure_count(), 0, "{:?}", recorder.failures());
    assert_eq!(first_report, second_report);
    assert!(!first_calls.is_empty());
    assert_eq!(
        first_calls, second_calls,
        "Replaying the same records must produce the same native calls"
    );
}

#[test]
fn test_nested_buffers_match_inlined_records() {
    init_logger();
    // --- 1. ARRANGE ---
    let (recorder, rhi) = recording_rhi(&NullRhiConfig::default());
    let root_signature = empty_root_signature(&rhi);
    let vertex_array = quad_vertex_array(&rhi);

    let mut innermost = CommandBuffer::new();
    SetGraphicsVertexArray::create(&mut innermost, &vertex_array);
    DrawIndexedGraphics::create(&mut innermost, 6, 1, 0, 0, 0);
    let innermost = Arc::new(innermost);

    let mut middle = CommandBuffer::new();
    SetDebugMarker::create(&mut middle, "Before quad");
    ExecuteCommandBuffer::create(&mut middle, &innermost);
    DrawGraphics::create(&mut middle, 3, 1, 0, 0);
    let middle = Arc::new(middle);

    let mut nested = CommandBuffer::new();
    SetGraphicsRootSignature::create(&mut nested, &root_signature);
    ExecuteCommandBuffer::create(&mut nested, &middle);

    let mut inlined = CommandBuffer::new();
    SetGraphicsRootSignature::create(&mut inlined, &root_signature);
    SetDebugMarker::create(&mut inlined, "Before quad");
    SetGraphicsVertexArray::create(&mut inlined, &vertex_array);
    DrawIndexedGraphics::create(&mut inlined, 6, 1, 0, 0, 0);
    DrawGraphics::create(&mut inlined, 3, 1, 0, 0);

    // --- 2. ACT ---
    let nested_report = nested.submit_to_rhi(&rhi);
    let nested_calls = rhi.take_native_calls();
    let inlined_report = inlined.submit_to_rhi(&rhi);
    let inlined_calls = rhi.take_native_calls();

    // --- 3. ASSERT ---
    assert_eq!(recorder.failure_count(), 0, "{:?}", recorder.failures());
    assert_eq!(nested_calls, inlined_calls);
    assert_eq!(nested_report.nested_buffers, 2);
    assert_eq!(nested_report.native_calls, inlined_report.native_calls);
}

// ─────────────────────────────────────────────────────────────────────────────
// Uniform updates
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_uniform_buffer_copy_has_no_effect_without_uniform_buffers() {
    init_logger();
    // --- 1. ARRANGE ---
    let config = NullRhiConfig::default().without_uniform_buffers();
    let (recorder, rhi) = recording_rhi(&config);
    let root_signature = empty_root_signature(&rhi);
    let program = tinted_program(&rhi, &root_signature);
    let tint_handle = program.uniform_handle("Tint").unwrap();
    let uniform_buffer = rhi
        .create_buffer_manager()
        .create_uniform_buffer(&BufferDescriptor::with_size(16).label("Tint block"))
        .unwrap();
    let tint = [0.25f32, 0.5, 0.75, 1.0];

    let mut command_buffer = CommandBuffer::new();
    CopyUniformBufferData::create(&mut command_buffer, &uniform_buffer, bytemuck::cast_slice(&tint))
        .unwrap();
    SetUniform::create(&mut command_buffer, &program, tint_handle, UniformValue::Float4(tint));

    // --- 2. ACT ---
    let report = command_buffer.submit_to_rhi(&rhi);

    // --- 3. ASSERT ---
    assert_eq!(recorder.failure_count(), 0, "Gating must not be a contract violation");
    assert_eq!(report.records_skipped, 1);
    let native = NullBuffer::of(uniform_buffer.native()).unwrap();
    assert!(
        native.contents().iter().all(|byte| *byte == 0),
        "The uniform buffer copy must leave the buffer untouched"
    );
    let calls = rhi.take_native_calls();
    assert!(!calls
        .iter()
        .any(|call| matches!(call, NullCall::UpdateUniformBuffer { .. })));
    match rhi.uniform_value(&program, tint_handle) {
        Some(UniformValue::Float4(value)) => {
            for (actual, expected) in value.iter().zip(tint) {
                approx::assert_relative_eq!(*actual, expected);
            }
        }
        other => panic!("The individual uniform must be set, got {other:?}"),
    }
}

#[test]
fn test_uniform_buffer_copy_reaches_the_buffer_when_supported() {
    init_logger();
    // --- 1. ARRANGE ---
    let (recorder, rhi) = recording_rhi(&NullRhiConfig::default());
    let uniform_buffer = rhi
        .create_buffer_manager()
        .create_uniform_buffer(&BufferDescriptor::with_size(32))
        .unwrap();
    let data: Vec<u8> = (1..=16).collect();
    let mut command_buffer = CommandBuffer::new();
    CopyUniformBufferData::create(&mut command_buffer, &uniform_buffer, &data).unwrap();

    // --- 2. ACT ---
    command_buffer.submit_to_rhi(&rhi);

    // --- 3. ASSERT ---
    assert_eq!(recorder.failure_count(), 0, "{:?}", recorder.failures());
    let native = NullBuffer::of(uniform_buffer.native()).unwrap();
    assert_eq!(native.read(0, 16), Some(data));
    assert_eq!(native.read(16, 16), Some(vec![0; 16]));
}

#[test]
fn test_block_writer_uploads_a_std140_block() {
    init_logger();
    // --- 1. ARRANGE ---
    let (recorder, rhi) = recording_rhi(&NullRhiConfig::default());
    let root_signature = empty_root_signature(&rhi);
    let program = tinted_program(&rhi, &root_signature);
    let uniform_buffer = rhi
        .create_buffer_manager()
        .create_uniform_buffer(&BufferDescriptor::with_size(64))
        .unwrap();
    let fields = vec![
        UniformField::new("Color", UniformKind::Float3),
        UniformField::new("Normal", UniformKind::Matrix3),
    ];

    // --- 2. ACT ---
    let writer =
        UniformBlockWriter::new(rhi.capabilities(), fields, &program, Some(&uniform_buffer))
            .unwrap();
    let mut command_buffer = CommandBuffer::new();
    writer
        .record(
            &mut command_buffer,
            &[
                UniformValue::Float3([1.0, 2.0, 3.0]),
                UniformValue::Matrix3([4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0, 12.0]),
            ],
        )
        .unwrap();
    command_buffer.submit_to_rhi(&rhi);

    // --- 3. ASSERT ---
    assert_eq!(writer.strategy(), UniformUpdateStrategy::UniformBuffer);
    assert_eq!(writer.block_size(), 64);
    assert_eq!(recorder.failure_count(), 0, "{:?}", recorder.failures());
    let native = NullBuffer::of(uniform_buffer.native()).unwrap();
    let floats: Vec<f32> = native
        .read(0, 64)
        .unwrap()
        .chunks_exact(4)
        .map(|bytes| f32::from_ne_bytes(bytes.try_into().unwrap()))
        .collect();
    let expected = [
        1.0, 2.0, 3.0, 0.0, 4.0, 5.0, 6.0, 0.0, 7.0, 8.0, 9.0, 0.0, 10.0, 11.0, 12.0, 0.0,
    ];
    for (actual, expected) in floats.iter().zip(expected) {
        approx::assert_relative_eq!(*actual, expected);
    }
}

#[test]
fn test_block_writer_follows_the_device_strategy() {
    init_logger();
    // --- 1. ARRANGE ---
    let config = NullRhiConfig::default().without_uniform_buffers();
    let (recorder, rhi) = recording_rhi(&config);
    let root_signature = empty_root_signature(&rhi);
    let program = tinted_program(&rhi, &root_signature);
    let fields = vec![UniformField::new("Tint", UniformKind::Float4)];

    // --- 2. ACT ---
    let writer = UniformBlockWriter::new(rhi.capabilities(), fields, &program, None).unwrap();
    let mut command_buffer = CommandBuffer::new();
    writer
        .record(&mut command_buffer, &[UniformValue::Float4([1.0, 0.0, 0.0, 1.0])])
        .unwrap();
    command_buffer.submit_to_rhi(&rhi);

    // --- 3. ASSERT ---
    assert_eq!(writer.strategy(), UniformUpdateStrategy::IndividualUniforms);
    assert_eq!(recorder.failure_count(), 0, "{:?}", recorder.failures());
    assert_eq!(
        rhi.uniform_value(&program, program.uniform_handle("Tint").unwrap()),
        Some(UniformValue::Float4([1.0, 0.0, 0.0, 1.0]))
    );
}
