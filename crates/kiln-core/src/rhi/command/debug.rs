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

use super::{BeginDebugEvent, CommandBuffer, EndDebugEvent};
use std::ops::{Deref, DerefMut};

/// A debug event region that ends when dropped.
#[derive(Debug)]
pub struct DebugEventScope<'a> {
    command_buffer: &'a mut CommandBuffer,
}

impl<'a> DebugEventScope<'a> {
    pub(super) fn new(command_buffer: &'a mut CommandBuffer, name: &str) -> Self {
        BeginDebugEvent::create(command_buffer, name);
        Self { command_buffer }
    }
}

impl Deref for DebugEventScope<'_> {
    type Target = CommandBuffer;

    fn deref(&self) -> &Self::Target {
        self.command_buffer
    }
}

impl DerefMut for DebugEventScope<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.command_buffer
    }
}

impl Drop for DebugEventScope<'_> {
    fn drop(&mut self) {
        EndDebugEvent::create(self.command_buffer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rhi::command::{CommandKind, DispatchCompute};

    #[test]
    fn scope_brackets_its_records() {
        let mut command_buffer = CommandBuffer::new();
        {
            let mut scope = command_buffer.scoped_debug_event("Culling");
            DispatchCompute::create(&mut scope, 64, 1, 1);
        }
        let kinds: Vec<_> = command_buffer.iter().map(|command| command.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                CommandKind::BeginDebugEvent,
                CommandKind::DispatchCompute,
                CommandKind::EndDebugEvent
            ]
        );
    }
}
