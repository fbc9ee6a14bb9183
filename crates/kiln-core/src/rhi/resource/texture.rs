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

//! Texture resources.

use super::{impl_resource, NativeResource, ResourceCore, ResourceType};
use crate::kiln_bitflags;
use crate::rhi::format::TextureFormat;
use std::borrow::Cow;

/// The shape of a texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureDimension {
    /// One-dimensional texture.
    D1,
    /// Array of one-dimensional textures.
    D1Array,
    /// Two-dimensional texture.
    D2,
    /// Array of two-dimensional textures.
    D2Array,
    /// Volume texture.
    D3,
    /// Six-faced cube texture.
    Cube,
    /// Array of cube textures.
    CubeArray,
}

impl TextureDimension {
    /// The resource kind of textures with this dimension.
    pub const fn resource_type(self) -> ResourceType {
        match self {
            TextureDimension::D1 => ResourceType::Texture1D,
            TextureDimension::D1Array => ResourceType::Texture1DArray,
            TextureDimension::D2 => ResourceType::Texture2D,
            TextureDimension::D2Array => ResourceType::Texture2DArray,
            TextureDimension::D3 => ResourceType::Texture3D,
            TextureDimension::Cube => ResourceType::TextureCube,
            TextureDimension::CubeArray => ResourceType::TextureCubeArray,
        }
    }

    /// Whether the dimension stores several slices.
    pub const fn is_array(self) -> bool {
        matches!(
            self,
            TextureDimension::D1Array | TextureDimension::D2Array | TextureDimension::CubeArray
        )
    }

    /// Number of 2D faces per slice.
    pub const fn faces_per_slice(self) -> u32 {
        match self {
            TextureDimension::Cube | TextureDimension::CubeArray => 6,
            _ => 1,
        }
    }
}

kiln_bitflags! {
    /// Creation flags of a texture.
    pub struct TextureFlags: u32 {
        /// The initial data contains every mipmap level.
        const DATA_CONTAINS_MIPMAPS = 1 << 0;
        /// Mipmaps are generated from the top level after upload.
        const GENERATE_MIPMAPS = 1 << 1;
        /// Bindable as a read-only shader resource.
        const SHADER_RESOURCE = 1 << 2;
        /// Bindable for unordered read/write access.
        const UNORDERED_ACCESS = 1 << 3;
        /// Usable as framebuffer attachment.
        const RENDER_TARGET = 1 << 4;
    }
}

/// Expected access pattern of a texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextureUsage {
    /// Read and written by the GPU.
    #[default]
    Default,
    /// Read by the GPU only, contents fixed at creation.
    Immutable,
    /// Written by the CPU, read by the GPU.
    Dynamic,
    /// CPU readback.
    Staging,
}

/// Clear value a backend may optimize a render target texture for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OptimizedTextureClearValue {
    /// Color clear value.
    Color([f32; 4]),
    /// Depth and stencil clear values.
    DepthStencil {
        /// Depth clear value.
        depth: f32,
        /// Stencil clear value.
        stencil: u32,
    },
}

/// Describes a texture to create.
#[derive(Debug, Clone)]
pub struct TextureDescriptor<'a> {
    /// Optional debug name.
    pub label: Option<Cow<'a, str>>,
    /// Shape of the texture.
    pub dimension: TextureDimension,
    /// Width in texels.
    pub width: u32,
    /// Height in texels, 1 for 1D textures.
    pub height: u32,
    /// Depth in texels, 1 unless 3D.
    pub depth: u32,
    /// Number of array slices, 1 unless an array.
    pub number_of_slices: u32,
    /// Texel format.
    pub format: TextureFormat,
    /// Optional initial contents.
    pub data: Option<&'a [u8]>,
    /// Creation flags.
    pub flags: TextureFlags,
    /// Access pattern.
    pub usage: TextureUsage,
    /// Number of multisamples, 1 disables multisampling.
    pub number_of_multisamples: u8,
    /// Clear value the texture is optimized for.
    pub optimized_clear_value: Option<OptimizedTextureClearValue>,
}

impl<'a> TextureDescriptor<'a> {
    /// A descriptor with every optional field at its default.
    pub fn new(dimension: TextureDimension, width: u32, format: TextureFormat) -> Self {
        Self {
            label: None,
            dimension,
            width,
            height: 1,
            depth: 1,
            number_of_slices: 1,
            format,
            data: None,
            flags: TextureFlags::SHADER_RESOURCE,
            usage: TextureUsage::Default,
            number_of_multisamples: 1,
            optimized_clear_value: None,
        }
    }

    /// The debug name, empty when unset.
    pub fn label_str(&self) -> &str {
        self.label.as_deref().unwrap_or("")
    }

    /// Number of mipmap levels the texture gets.
    pub fn number_of_mipmaps(&self) -> u32 {
        if self
            .flags
            .intersects(TextureFlags::DATA_CONTAINS_MIPMAPS | TextureFlags::GENERATE_MIPMAPS)
        {
            let depth = if self.dimension == TextureDimension::D3 {
                self.depth
            } else {
                1
            };
            number_of_mipmaps(self.width.max(self.height).max(depth))
        } else {
            1
        }
    }

    /// Number of bytes of initial data the descriptor implies.
    pub fn expected_data_size(&self) -> u64 {
        let depth = if self.dimension == TextureDimension::D3 {
            self.depth
        } else {
            1
        };
        let layers = self.number_of_slices as u64 * self.dimension.faces_per_slice() as u64;
        let levels = if self.flags.contains(TextureFlags::DATA_CONTAINS_MIPMAPS) {
            self.number_of_mipmaps()
        } else {
            1
        };
        (0..levels)
            .map(|level| {
                let width = mipmap_size(self.width, level);
                let height = mipmap_size(self.height, level);
                let depth = mipmap_size(depth, level);
                self.format.bytes_per_slice(width, height) * depth as u64 * layers
            })
            .sum()
    }
}

/// Number of mipmap levels of a full chain for the given largest extent.
pub fn number_of_mipmaps(largest_extent: u32) -> u32 {
    u32::BITS - largest_extent.max(1).leading_zeros()
}

/// Extent of a mipmap level, never smaller than one texel.
pub fn mipmap_size(extent: u32, level: u32) -> u32 {
    (extent >> level).max(1)
}

/// A texture of any dimension.
#[derive(Debug)]
pub struct Texture {
    core: ResourceCore,
    dimension: TextureDimension,
    width: u32,
    height: u32,
    depth: u32,
    number_of_slices: u32,
    format: TextureFormat,
    flags: TextureFlags,
    usage: TextureUsage,
    number_of_mipmaps: u32,
    number_of_multisamples: u8,
    native: Box<dyn NativeResource>,
}

impl Texture {
    /// Wraps a native texture. Called by backends only.
    pub fn new(
        core: ResourceCore,
        descriptor: &TextureDescriptor<'_>,
        native: Box<dyn NativeResource>,
    ) -> Self {
        Self {
            core,
            dimension: descriptor.dimension,
            width: descriptor.width,
            height: descriptor.height,
            depth: descriptor.depth,
            number_of_slices: descriptor.number_of_slices,
            format: descriptor.format,
            flags: descriptor.flags,
            usage: descriptor.usage,
            number_of_mipmaps: descriptor.number_of_mipmaps(),
            number_of_multisamples: descriptor.number_of_multisamples,
            native,
        }
    }

    /// Shape of the texture.
    pub fn dimension(&self) -> TextureDimension {
        self.dimension
    }

    /// Width in texels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in texels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Depth in texels.
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Number of array slices.
    pub fn number_of_slices(&self) -> u32 {
        self.number_of_slices
    }

    /// Texel format.
    pub fn format(&self) -> TextureFormat {
        self.format
    }

    /// Creation flags.
    pub fn flags(&self) -> TextureFlags {
        self.flags
    }

    /// Access pattern.
    pub fn usage(&self) -> TextureUsage {
        self.usage
    }

    /// Number of mipmap levels.
    pub fn number_of_mipmaps(&self) -> u32 {
        self.number_of_mipmaps
    }

    /// Number of multisamples.
    pub fn number_of_multisamples(&self) -> u8 {
        self.number_of_multisamples
    }

    /// Width and height of a mipmap level.
    pub fn mipmap_width_and_height(&self, mipmap_index: u32) -> (u32, u32) {
        (
            mipmap_size(self.width, mipmap_index),
            mipmap_size(self.height, mipmap_index),
        )
    }

    /// The backend-private texture object.
    pub fn native(&self) -> &dyn NativeResource {
        self.native.as_ref()
    }
}

impl_resource!(Texture);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mipmap_chain_length() {
        assert_eq!(number_of_mipmaps(1), 1);
        assert_eq!(number_of_mipmaps(256), 9);
        assert_eq!(number_of_mipmaps(300), 9);
        assert_eq!(mipmap_size(5, 2), 1);
        assert_eq!(mipmap_size(5, 10), 1);
    }

    #[test]
    fn expected_size_covers_slices_faces_and_mipmaps() {
        let mut descriptor =
            TextureDescriptor::new(TextureDimension::D2, 4, TextureFormat::Rgba8Unorm);
        descriptor.height = 4;
        assert_eq!(descriptor.expected_data_size(), 64);

        descriptor.flags = TextureFlags::DATA_CONTAINS_MIPMAPS;
        // 4x4 + 2x2 + 1x1 texels.
        assert_eq!(descriptor.expected_data_size(), (16 + 4 + 1) * 4);

        let mut cube = TextureDescriptor::new(TextureDimension::Cube, 2, TextureFormat::R8Unorm);
        cube.height = 2;
        assert_eq!(cube.expected_data_size(), 6 * 4);

        let mut array =
            TextureDescriptor::new(TextureDimension::D2Array, 2, TextureFormat::R8Unorm);
        array.height = 2;
        array.number_of_slices = 3;
        assert_eq!(array.expected_data_size(), 3 * 4);
    }

    #[test]
    fn generated_mipmaps_count_without_data() {
        let mut descriptor =
            TextureDescriptor::new(TextureDimension::D2, 64, TextureFormat::Rgba8Unorm);
        descriptor.height = 32;
        descriptor.flags = TextureFlags::GENERATE_MIPMAPS;
        assert_eq!(descriptor.number_of_mipmaps(), 7);
        assert_eq!(descriptor.expected_data_size(), 64 * 32 * 4);
    }
}
