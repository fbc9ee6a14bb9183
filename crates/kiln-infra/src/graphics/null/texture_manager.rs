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

use super::resources::NullTexture;
use super::rhi::NullRhi;
use kiln_core::rhi::resource::{Texture, TextureDescriptor};
use kiln_core::rhi::validation;
use kiln_core::rhi::{ResourceError, Rhi, RhiId, TextureManager};
use std::sync::Arc;

/// Texture manager of the null backend.
#[derive(Debug)]
pub struct NullTextureManager {
    rhi: NullRhi,
}

impl NullTextureManager {
    /// Creates a manager for `rhi`.
    pub fn new(rhi: NullRhi) -> Self {
        Self { rhi }
    }
}

impl TextureManager for NullTextureManager {
    fn rhi_id(&self) -> RhiId {
        self.rhi.rhi_id()
    }

    fn create_texture(
        &self,
        descriptor: &TextureDescriptor<'_>,
    ) -> Result<Arc<Texture>, ResourceError> {
        validation::validate_texture(self.rhi.capabilities(), descriptor)?;
        log::debug!(
            "NullTextureManager: Creating {:?} texture '{}' ({}x{}x{}, {:?})",
            descriptor.dimension,
            descriptor.label_str(),
            descriptor.width,
            descriptor.height,
            descriptor.depth,
            descriptor.format
        );
        Ok(Arc::new(Texture::new(
            self.rhi.core(
                descriptor.dimension.resource_type(),
                descriptor.label_str(),
            ),
            descriptor,
            Box::new(NullTexture::new(
                descriptor.number_of_mipmaps(),
                descriptor.data,
            )),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiln_core::rhi::resource::{Resource, ResourceType, TextureFlags};
    use kiln_core::rhi::TextureFormat;
    use kiln_core::Context;

    #[test]
    fn dimension_helpers_pick_the_resource_kind() {
        let manager = NullTextureManager::new(NullRhi::new(Context::default()));

        let cube = manager
            .create_texture_cube(64, TextureFormat::Rgba8Unorm, None, TextureFlags::EMPTY, "sky")
            .unwrap();
        let volume = manager
            .create_texture_3d(8, 8, 8, TextureFormat::R8Unorm, None, TextureFlags::EMPTY, "fog")
            .unwrap();

        assert_eq!(cube.resource_type(), ResourceType::TextureCube);
        assert_eq!(cube.height(), 64);
        assert_eq!(volume.resource_type(), ResourceType::Texture3D);
    }

    #[test]
    fn generated_mipmap_chains_are_fully_sampled() {
        let manager = NullTextureManager::new(NullRhi::new(Context::default()));
        let texture = manager
            .create_texture_2d(
                256,
                128,
                TextureFormat::Rgba8Unorm,
                None,
                TextureFlags::GENERATE_MIPMAPS,
                "mipmapped",
            )
            .unwrap();

        let native = NullTexture::of(texture.native()).unwrap();
        assert_eq!(texture.number_of_mipmaps(), 9);
        assert_eq!(native.mipmap_range(), (0, 8));
    }
}
