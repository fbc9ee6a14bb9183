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

//! Pixel, index and vertex element formats.

use serde::{Deserialize, Serialize};

/// Defines the memory format of texels in a texture or texture buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextureFormat {
    /// One 8-bit unsigned normalized component.
    R8Unorm,
    /// Four 8-bit unsigned normalized components (RGBA).
    Rgba8Unorm,
    /// Four 8-bit unsigned normalized components (RGBA) in the sRGB color space.
    Rgba8UnormSrgb,
    /// Four 8-bit unsigned normalized components (BGRA).
    Bgra8Unorm,
    /// One 16-bit unsigned normalized component.
    R16Unorm,
    /// One 32-bit unsigned integer component.
    R32Uint,
    /// One 32-bit float component.
    R32Float,
    /// Packed 11/11/10-bit float RGB.
    Rg11b10Float,
    /// Four 16-bit float components.
    Rgba16Float,
    /// Four 32-bit float components.
    Rgba32Float,
    /// Block compressed RGB(A), 8 bytes per 4x4 block.
    Bc1,
    /// Block compressed RGBA, 16 bytes per 4x4 block.
    Bc2,
    /// Block compressed RGBA, 16 bytes per 4x4 block.
    Bc3,
    /// Block compressed single channel, 8 bytes per 4x4 block.
    Bc4,
    /// Block compressed two channels, 16 bytes per 4x4 block.
    Bc5,
    /// A 32-bit float depth format.
    Depth32Float,
    /// A 24-bit unsigned normalized depth format with an 8-bit stencil component.
    Depth24PlusStencil8,
}

impl TextureFormat {
    /// Returns `true` for block-compressed formats.
    pub const fn is_compressed(self) -> bool {
        matches!(
            self,
            TextureFormat::Bc1
                | TextureFormat::Bc2
                | TextureFormat::Bc3
                | TextureFormat::Bc4
                | TextureFormat::Bc5
        )
    }

    /// Returns `true` for depth or depth-stencil formats.
    pub const fn is_depth(self) -> bool {
        matches!(
            self,
            TextureFormat::Depth32Float | TextureFormat::Depth24PlusStencil8
        )
    }

    /// Size in bytes of one element: a texel, or a 4x4 block for compressed formats.
    pub const fn bytes_per_element(self) -> u32 {
        match self {
            TextureFormat::R8Unorm => 1,
            TextureFormat::R16Unorm => 2,
            TextureFormat::Rgba8Unorm
            | TextureFormat::Rgba8UnormSrgb
            | TextureFormat::Bgra8Unorm
            | TextureFormat::R32Uint
            | TextureFormat::R32Float
            | TextureFormat::Rg11b10Float
            | TextureFormat::Depth32Float
            | TextureFormat::Depth24PlusStencil8 => 4,
            TextureFormat::Rgba16Float => 8,
            TextureFormat::Rgba32Float => 16,
            TextureFormat::Bc1 | TextureFormat::Bc4 => 8,
            TextureFormat::Bc2 | TextureFormat::Bc3 | TextureFormat::Bc5 => 16,
        }
    }

    /// Number of bytes of one row of a mipmap `width` texels wide.
    pub const fn bytes_per_row(self, width: u32) -> u64 {
        if self.is_compressed() {
            (width.div_ceil(4) as u64) * self.bytes_per_element() as u64
        } else {
            width as u64 * self.bytes_per_element() as u64
        }
    }

    /// Number of bytes of one 2D slice of a mipmap.
    pub const fn bytes_per_slice(self, width: u32, height: u32) -> u64 {
        let rows = if self.is_compressed() {
            height.div_ceil(4)
        } else {
            height
        };
        self.bytes_per_row(width) * rows as u64
    }
}

/// Element type of an index buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum IndexBufferFormat {
    /// 8-bit indices. Not every native API supports them.
    UnsignedChar,
    /// 16-bit indices.
    #[default]
    UnsignedShort,
    /// 32-bit indices.
    UnsignedInt,
}

impl IndexBufferFormat {
    /// Size in bytes of one index.
    pub const fn bytes_per_element(self) -> u32 {
        match self {
            IndexBufferFormat::UnsignedChar => 1,
            IndexBufferFormat::UnsignedShort => 2,
            IndexBufferFormat::UnsignedInt => 4,
        }
    }
}

/// Data type of one vertex attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexAttributeFormat {
    /// One 32-bit float.
    Float1,
    /// Two 32-bit floats.
    Float2,
    /// Three 32-bit floats.
    Float3,
    /// Four 32-bit floats.
    Float4,
    /// Four 8-bit unsigned normalized components.
    R8G8B8A8Unorm,
    /// Four 8-bit unsigned integer components.
    R8G8B8A8Uint,
    /// Two 16-bit signed integers.
    Short2,
    /// Four 16-bit signed integers.
    Short4,
    /// One 32-bit unsigned integer.
    Uint1,
}

impl VertexAttributeFormat {
    /// Size in bytes of one attribute element.
    pub const fn size(self) -> u32 {
        match self {
            VertexAttributeFormat::Float1 | VertexAttributeFormat::Uint1 => 4,
            VertexAttributeFormat::Float2 => 8,
            VertexAttributeFormat::Float3 => 12,
            VertexAttributeFormat::Float4 => 16,
            VertexAttributeFormat::R8G8B8A8Unorm
            | VertexAttributeFormat::R8G8B8A8Uint
            | VertexAttributeFormat::Short2 => 4,
            VertexAttributeFormat::Short4 => 8,
        }
    }
}
