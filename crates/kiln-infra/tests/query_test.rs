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

//! Integration tests for query pools on the null backend.
//!
//! Occlusion queries count the vertices submitted between begin and end,
//! timestamps come from a monotonic per-device counter.

use kiln_core::rhi::command::{
    BeginQuery, CommandBuffer, DrawGraphics, EndQuery, ResetQueryPool, SetGraphicsRootSignature,
    WriteTimestampQuery,
};
use kiln_core::rhi::resource::{QueryControlFlags, QueryResultFlags, QueryType};
use kiln_core::rhi::root_signature::RootSignatureDescriptor;
use kiln_core::rhi::{RenderError, Rhi};
use kiln_core::{Context, RecordingAssertHandler};
use kiln_infra::NullRhi;
use std::sync::Arc;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn recording_rhi() -> (Arc<RecordingAssertHandler>, NullRhi) {
    let recorder = Arc::new(RecordingAssertHandler::new());
    let rhi = NullRhi::new(Context::new(recorder.clone()));
    (recorder, rhi)
}

#[test]
fn test_occlusion_query_counts_submitted_vertices() {
    init_logger();
    // --- 1. ARRANGE ---
    let (recorder, rhi) = recording_rhi();
    let root_signature = rhi
        .create_root_signature(&RootSignatureDescriptor::new(), "Empty")
        .unwrap();
    let query_pool = rhi
        .create_query_pool(QueryType::Occlusion, 2, "Visibility")
        .unwrap();
    let mut command_buffer = CommandBuffer::new();
    ResetQueryPool::create(&mut command_buffer, &query_pool, 0, 2);
    SetGraphicsRootSignature::create(&mut command_buffer, &root_signature);
    BeginQuery::create(&mut command_buffer, &query_pool, 0, QueryControlFlags::PRECISE);
    DrawGraphics::create(&mut command_buffer, 3, 2, 0, 0);
    EndQuery::create(&mut command_buffer, &query_pool, 0);

    // --- 2. ACT ---
    command_buffer.submit_to_rhi(&rhi);
    let written = rhi.get_query_pool_results(&query_pool, 0, 1, QueryResultFlags::WAIT);
    let pending = rhi.get_query_pool_results(&query_pool, 1, 1, QueryResultFlags::EMPTY);
    let waited = rhi.get_query_pool_results(&query_pool, 1, 1, QueryResultFlags::WAIT);

    // --- 3. ASSERT ---
    assert_eq!(recorder.failure_count(), 0, "{:?}", recorder.failures());
    assert_eq!(written.unwrap(), Some(vec![6]));
    assert_eq!(
        pending.unwrap(),
        None,
        "An unwritten query must be reported as not ready"
    );
    assert!(matches!(waited, Err(RenderError::QueryFailed(_))));
}

#[test]
fn test_timestamps_increase_within_a_submission() {
    init_logger();
    // --- 1. ARRANGE ---
    let (recorder, rhi) = recording_rhi();
    let query_pool = rhi
        .create_query_pool(QueryType::Timestamp, 2, "Frame timing")
        .unwrap();
    let mut command_buffer = CommandBuffer::new();
    WriteTimestampQuery::create(&mut command_buffer, &query_pool, 0);
    WriteTimestampQuery::create(&mut command_buffer, &query_pool, 1);

    // --- 2. ACT ---
    command_buffer.submit_to_rhi(&rhi);
    let results = rhi
        .get_query_pool_results(&query_pool, 0, 2, QueryResultFlags::WAIT)
        .unwrap()
        .unwrap();

    // --- 3. ASSERT ---
    assert_eq!(recorder.failure_count(), 0, "{:?}", recorder.failures());
    assert!(results[0] < results[1], "Timestamps must be monotonic: {results:?}");
}

#[test]
fn test_timestamp_into_an_occlusion_pool_is_reported() {
    init_logger();
    // --- 1. ARRANGE ---
    let (recorder, rhi) = recording_rhi();
    let query_pool = rhi
        .create_query_pool(QueryType::Occlusion, 1, "Visibility")
        .unwrap();
    let mut command_buffer = CommandBuffer::new();
    WriteTimestampQuery::create(&mut command_buffer, &query_pool, 0);

    // --- 2. ACT ---
    let report = command_buffer.submit_to_rhi(&rhi);

    // --- 3. ASSERT ---
    assert_eq!(report.records_skipped, 1);
    assert_eq!(recorder.failure_count(), 1);
}

#[test]
fn test_results_outside_the_pool_fail() {
    init_logger();
    let (_, rhi) = recording_rhi();
    let query_pool = rhi
        .create_query_pool(QueryType::PipelineStatistics, 4, "Statistics")
        .unwrap();
    let result = rhi.get_query_pool_results(&query_pool, 3, 2, QueryResultFlags::EMPTY);
    assert!(matches!(result, Err(RenderError::QueryFailed(_))));
}
