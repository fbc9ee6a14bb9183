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

//! Backend-agnostic command recording.
//!
//! A [`CommandBuffer`] is an ordered list of [`Command`] records. Recording
//! never touches a device; records are validated and translated into native
//! calls only when the buffer is submitted to an RHI instance. A recorded
//! buffer can be submitted any number of times and nested into other
//! buffers through [`ExecuteCommandBuffer`].

mod debug;
mod records;
mod types;

pub use self::debug::DebugEventScope;
pub use self::records::*;
pub use self::types::*;

use crate::rhi::device::Rhi;
use crate::rhi::dispatch::DispatchReport;

/// The kind of a command record, without its payload.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    ExecuteCommandBuffer,
    SetGraphicsRootSignature,
    SetGraphicsPipelineState,
    SetGraphicsResourceGroup,
    SetGraphicsVertexArray,
    SetGraphicsViewports,
    SetGraphicsScissorRectangles,
    BeginRenderPass,
    EndRenderPass,
    ClearGraphics,
    DrawGraphics,
    DrawIndexedGraphics,
    SetComputeRootSignature,
    SetComputePipelineState,
    SetComputeResourceGroup,
    DispatchCompute,
    CopyUniformBufferData,
    SetUniform,
    CopyResource,
    GenerateMipmaps,
    SetTextureMinimumMaximumMipmapIndex,
    ResetQueryPool,
    BeginQuery,
    EndQuery,
    WriteTimestampQuery,
    SetDebugMarker,
    BeginDebugEvent,
    EndDebugEvent,
}

/// One recorded command.
#[allow(missing_docs)]
#[derive(Debug, Clone)]
pub enum Command {
    ExecuteCommandBuffer(ExecuteCommandBuffer),
    SetGraphicsRootSignature(SetGraphicsRootSignature),
    SetGraphicsPipelineState(SetGraphicsPipelineState),
    SetGraphicsResourceGroup(SetGraphicsResourceGroup),
    SetGraphicsVertexArray(SetGraphicsVertexArray),
    SetGraphicsViewports(SetGraphicsViewports),
    SetGraphicsScissorRectangles(SetGraphicsScissorRectangles),
    BeginRenderPass(BeginRenderPass),
    EndRenderPass(EndRenderPass),
    ClearGraphics(ClearGraphics),
    DrawGraphics(DrawGraphics),
    DrawIndexedGraphics(DrawIndexedGraphics),
    SetComputeRootSignature(SetComputeRootSignature),
    SetComputePipelineState(SetComputePipelineState),
    SetComputeResourceGroup(SetComputeResourceGroup),
    DispatchCompute(DispatchCompute),
    CopyUniformBufferData(CopyUniformBufferData),
    SetUniform(SetUniform),
    CopyResource(CopyResource),
    GenerateMipmaps(GenerateMipmaps),
    SetTextureMinimumMaximumMipmapIndex(SetTextureMinimumMaximumMipmapIndex),
    ResetQueryPool(ResetQueryPool),
    BeginQuery(BeginQuery),
    EndQuery(EndQuery),
    WriteTimestampQuery(WriteTimestampQuery),
    SetDebugMarker(SetDebugMarker),
    BeginDebugEvent(BeginDebugEvent),
    EndDebugEvent(EndDebugEvent),
}

impl Command {
    /// The kind of the record.
    pub fn kind(&self) -> CommandKind {
        match self {
            Command::ExecuteCommandBuffer(_) => CommandKind::ExecuteCommandBuffer,
            Command::SetGraphicsRootSignature(_) => CommandKind::SetGraphicsRootSignature,
            Command::SetGraphicsPipelineState(_) => CommandKind::SetGraphicsPipelineState,
            Command::SetGraphicsResourceGroup(_) => CommandKind::SetGraphicsResourceGroup,
            Command::SetGraphicsVertexArray(_) => CommandKind::SetGraphicsVertexArray,
            Command::SetGraphicsViewports(_) => CommandKind::SetGraphicsViewports,
            Command::SetGraphicsScissorRectangles(_) => CommandKind::SetGraphicsScissorRectangles,
            Command::BeginRenderPass(_) => CommandKind::BeginRenderPass,
            Command::EndRenderPass(_) => CommandKind::EndRenderPass,
            Command::ClearGraphics(_) => CommandKind::ClearGraphics,
            Command::DrawGraphics(_) => CommandKind::DrawGraphics,
            Command::DrawIndexedGraphics(_) => CommandKind::DrawIndexedGraphics,
            Command::SetComputeRootSignature(_) => CommandKind::SetComputeRootSignature,
            Command::SetComputePipelineState(_) => CommandKind::SetComputePipelineState,
            Command::SetComputeResourceGroup(_) => CommandKind::SetComputeResourceGroup,
            Command::DispatchCompute(_) => CommandKind::DispatchCompute,
            Command::CopyUniformBufferData(_) => CommandKind::CopyUniformBufferData,
            Command::SetUniform(_) => CommandKind::SetUniform,
            Command::CopyResource(_) => CommandKind::CopyResource,
            Command::GenerateMipmaps(_) => CommandKind::GenerateMipmaps,
            Command::SetTextureMinimumMaximumMipmapIndex(_) => {
                CommandKind::SetTextureMinimumMaximumMipmapIndex
            }
            Command::ResetQueryPool(_) => CommandKind::ResetQueryPool,
            Command::BeginQuery(_) => CommandKind::BeginQuery,
            Command::EndQuery(_) => CommandKind::EndQuery,
            Command::WriteTimestampQuery(_) => CommandKind::WriteTimestampQuery,
            Command::SetDebugMarker(_) => CommandKind::SetDebugMarker,
            Command::BeginDebugEvent(_) => CommandKind::BeginDebugEvent,
            Command::EndDebugEvent(_) => CommandKind::EndDebugEvent,
        }
    }
}

/// An ordered, replayable list of command records.
#[derive(Debug, Clone, Default)]
pub struct CommandBuffer {
    commands: Vec<Command>,
}

impl CommandBuffer {
    /// An empty command buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty command buffer with room for `capacity` records.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            commands: Vec::with_capacity(capacity),
        }
    }

    /// Whether no record was added since creation or the last clear.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Number of top-level records.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Removes every record, keeping the allocation.
    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// The records in recording order.
    pub fn iter(&self) -> std::slice::Iter<'_, Command> {
        self.commands.iter()
    }

    pub(crate) fn push(&mut self, command: Command) {
        self.commands.push(command);
    }

    /// Validates and executes every record on `rhi`, in order.
    ///
    /// The buffer is left untouched and can be submitted again.
    pub fn submit_to_rhi(&self, rhi: &dyn Rhi) -> DispatchReport {
        rhi.submit_command_buffer(self)
    }

    /// Submits the buffer, then clears it for the next frame.
    pub fn submit_to_rhi_and_clear(&mut self, rhi: &dyn Rhi) -> DispatchReport {
        let report = self.submit_to_rhi(rhi);
        self.clear();
        report
    }

    /// Opens a debug event region closed when the returned scope drops.
    ///
    /// Records go through the scope, which dereferences to the buffer.
    pub fn scoped_debug_event(&mut self, name: &str) -> DebugEventScope<'_> {
        DebugEventScope::new(self, name)
    }
}

impl<'a> IntoIterator for &'a CommandBuffer {
    type Item = &'a Command;
    type IntoIter = std::slice::Iter<'a, Command>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
