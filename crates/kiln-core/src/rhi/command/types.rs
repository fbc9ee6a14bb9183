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

//! Plain value types carried by command records.

use crate::kiln_bitflags;
use crate::rhi::resource::IndirectBuffer;
use std::sync::Arc;

/// A viewport rectangle with its depth range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Left edge in pixels.
    pub top_left_x: f32,
    /// Top edge in pixels.
    pub top_left_y: f32,
    /// Width in pixels.
    pub width: f32,
    /// Height in pixels.
    pub height: f32,
    /// Minimum depth, in [0, 1].
    pub min_depth: f32,
    /// Maximum depth, in [0, 1].
    pub max_depth: f32,
}

impl Viewport {
    /// A viewport covering depth [0, 1].
    pub fn new(top_left_x: f32, top_left_y: f32, width: f32, height: f32) -> Self {
        Self {
            top_left_x,
            top_left_y,
            width,
            height,
            min_depth: 0.0,
            max_depth: 1.0,
        }
    }
}

/// A scissor rectangle in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ScissorRectangle {
    /// Left edge.
    pub top_left_x: i32,
    /// Top edge.
    pub top_left_y: i32,
    /// Right edge, exclusive.
    pub bottom_right_x: i32,
    /// Bottom edge, exclusive.
    pub bottom_right_y: i32,
}

kiln_bitflags! {
    /// Which attachments a clear touches.
    pub struct ClearFlags: u32 {
        /// Clear the color attachments.
        const COLOR = 1 << 0;
        /// Clear the depth attachment.
        const DEPTH = 1 << 1;
        /// Clear the stencil attachment.
        const STENCIL = 1 << 2;
        /// Clear color and depth.
        const COLOR_DEPTH = Self::COLOR.bits() | Self::DEPTH.bits();
    }
}

/// Where draw arguments come from.
#[derive(Debug, Clone)]
pub enum DrawSource<A> {
    /// One draw with arguments recorded into the command buffer.
    Inline(A),
    /// Draws whose arguments are read from an indirect buffer.
    Indirect {
        /// The buffer holding the argument records.
        indirect_buffer: Arc<IndirectBuffer>,
        /// Byte offset of the first record.
        indirect_buffer_offset: u32,
        /// Number of consecutive records to draw.
        number_of_draws: u32,
    },
}

impl<A> DrawSource<A> {
    /// Number of draws the source issues.
    pub fn number_of_draws(&self) -> u32 {
        match self {
            DrawSource::Inline(_) => 1,
            DrawSource::Indirect {
                number_of_draws, ..
            } => *number_of_draws,
        }
    }

    /// Whether the arguments live in an indirect buffer.
    pub fn is_indirect(&self) -> bool {
        matches!(self, DrawSource::Indirect { .. })
    }
}
