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

//! Sampler states.

use super::{impl_resource, NativeResource, ResourceCore};
use crate::rhi::state::CompareFunction;

/// Texture filtering applied for minification, magnification and mip selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FilterMode {
    /// Point sampling everywhere.
    MinMagMipPoint,
    /// Point minification and magnification, linear between mipmaps.
    MinMagPointMipLinear,
    /// Linear minification and magnification, point mip selection.
    MinMagLinearMipPoint,
    /// Trilinear filtering.
    #[default]
    MinMagMipLinear,
    /// Anisotropic filtering.
    Anisotropic,
    /// Trilinear filtering with depth comparison.
    ComparisonMinMagMipLinear,
    /// Anisotropic filtering with depth comparison.
    ComparisonAnisotropic,
}

impl FilterMode {
    /// Whether the filter compares against a reference value.
    pub const fn is_comparison(self) -> bool {
        matches!(
            self,
            FilterMode::ComparisonMinMagMipLinear | FilterMode::ComparisonAnisotropic
        )
    }
}

/// Behaviour of texture coordinates outside [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextureAddressMode {
    /// Repeat the texture.
    #[default]
    Wrap,
    /// Repeat the texture, mirrored every other time.
    Mirror,
    /// Clamp to the edge texel.
    Clamp,
    /// Use the border color.
    Border,
    /// Mirror once, then clamp.
    MirrorOnce,
}

/// Describes how a texture is sampled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplerStateDescriptor {
    /// Filtering mode.
    pub filter: FilterMode,
    /// Addressing along U.
    pub address_u: TextureAddressMode,
    /// Addressing along V.
    pub address_v: TextureAddressMode,
    /// Addressing along W.
    pub address_w: TextureAddressMode,
    /// Offset added to the computed mip level.
    pub mip_lod_bias: f32,
    /// Maximum anisotropy, used by the anisotropic filters.
    pub max_anisotropy: u32,
    /// Comparison used by the comparison filters.
    pub comparison_function: CompareFunction,
    /// Border color for [`TextureAddressMode::Border`].
    pub border_color: [f32; 4],
    /// Lowest mip level that may be sampled.
    pub min_lod: f32,
    /// Highest mip level that may be sampled.
    pub max_lod: f32,
}

impl Default for SamplerStateDescriptor {
    fn default() -> Self {
        Self {
            filter: FilterMode::MinMagMipLinear,
            address_u: TextureAddressMode::Wrap,
            address_v: TextureAddressMode::Wrap,
            address_w: TextureAddressMode::Wrap,
            mip_lod_bias: 0.0,
            max_anisotropy: 16,
            comparison_function: CompareFunction::Never,
            border_color: [0.0; 4],
            min_lod: f32::MIN,
            max_lod: f32::MAX,
        }
    }
}

/// A created sampler state.
#[derive(Debug)]
pub struct SamplerState {
    core: ResourceCore,
    descriptor: SamplerStateDescriptor,
    native: Box<dyn NativeResource>,
}

impl SamplerState {
    /// Wraps a native sampler. Called by backends only.
    pub fn new(
        core: ResourceCore,
        descriptor: SamplerStateDescriptor,
        native: Box<dyn NativeResource>,
    ) -> Self {
        Self {
            core,
            descriptor,
            native,
        }
    }

    /// The sampling parameters.
    pub fn descriptor(&self) -> &SamplerStateDescriptor {
        &self.descriptor
    }

    /// The backend-private sampler object.
    pub fn native(&self) -> &dyn NativeResource {
        self.native.as_ref()
    }
}

impl_resource!(SamplerState);
