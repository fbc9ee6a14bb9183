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

//! Render passes, framebuffers and swap chains.

use crate::rhi::device::Rhi;
use crate::rhi::error::ResourceError;
use crate::rhi::format::TextureFormat;
use crate::rhi::resource::{
    impl_resource, NativeResource, Resource, ResourceCore, ResourceId, Texture,
};
use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Describes the attachment formats of a render pass.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RenderPassDescriptor<'a> {
    /// Optional debug name.
    pub label: Option<Cow<'a, str>>,
    /// Formats of the color attachments, in attachment order.
    pub color_attachment_texture_formats: Vec<TextureFormat>,
    /// Format of the depth-stencil attachment, if any.
    pub depth_stencil_attachment_texture_format: Option<TextureFormat>,
    /// Number of multisamples of every attachment.
    pub number_of_multisamples: u8,
}

impl<'a> RenderPassDescriptor<'a> {
    /// A single-sampled render pass.
    pub fn new(
        color_attachment_texture_formats: Vec<TextureFormat>,
        depth_stencil_attachment_texture_format: Option<TextureFormat>,
    ) -> Self {
        Self {
            label: None,
            color_attachment_texture_formats,
            depth_stencil_attachment_texture_format,
            number_of_multisamples: 1,
        }
    }

    /// The debug name, empty when unset.
    pub fn label_str(&self) -> &str {
        self.label.as_deref().unwrap_or("")
    }
}

/// Attachment formats shared by framebuffers and pipeline states.
#[derive(Debug)]
pub struct RenderPass {
    core: ResourceCore,
    color_attachment_texture_formats: Vec<TextureFormat>,
    depth_stencil_attachment_texture_format: Option<TextureFormat>,
    number_of_multisamples: u8,
    native: Box<dyn NativeResource>,
}

impl RenderPass {
    /// Wraps a native render pass. Called by backends only.
    pub fn new(
        core: ResourceCore,
        descriptor: &RenderPassDescriptor<'_>,
        native: Box<dyn NativeResource>,
    ) -> Self {
        Self {
            core,
            color_attachment_texture_formats: descriptor.color_attachment_texture_formats.clone(),
            depth_stencil_attachment_texture_format: descriptor
                .depth_stencil_attachment_texture_format,
            number_of_multisamples: descriptor.number_of_multisamples,
            native,
        }
    }

    /// Formats of the color attachments.
    pub fn color_attachment_texture_formats(&self) -> &[TextureFormat] {
        &self.color_attachment_texture_formats
    }

    /// Number of color attachments.
    pub fn number_of_color_attachments(&self) -> u32 {
        self.color_attachment_texture_formats.len() as u32
    }

    /// Format of the depth-stencil attachment.
    pub fn depth_stencil_attachment_texture_format(&self) -> Option<TextureFormat> {
        self.depth_stencil_attachment_texture_format
    }

    /// Number of multisamples.
    pub fn number_of_multisamples(&self) -> u8 {
        self.number_of_multisamples
    }

    /// Whether pipelines built for `other` may render into targets of `self`.
    pub fn is_compatible_with(&self, other: &RenderPass) -> bool {
        self.color_attachment_texture_formats == other.color_attachment_texture_formats
            && self.depth_stencil_attachment_texture_format
                == other.depth_stencil_attachment_texture_format
            && self.number_of_multisamples == other.number_of_multisamples
    }

    /// The backend-private render pass object.
    pub fn native(&self) -> &dyn NativeResource {
        self.native.as_ref()
    }
}

/// One texture mipmap (and slice) bound as framebuffer attachment.
#[derive(Debug, Clone)]
pub struct FramebufferAttachment {
    /// The attached texture.
    pub texture: Arc<Texture>,
    /// The mipmap level rendered to.
    pub mipmap_index: u32,
    /// The array slice or cube face rendered to.
    pub layer_index: u32,
}

impl FramebufferAttachment {
    /// Attaches mipmap 0, layer 0.
    pub fn new(texture: Arc<Texture>) -> Self {
        Self {
            texture,
            mipmap_index: 0,
            layer_index: 0,
        }
    }
}

/// Describes a framebuffer.
#[derive(Debug, Clone)]
pub struct FramebufferDescriptor<'a> {
    /// Optional debug name.
    pub label: Option<Cow<'a, str>>,
    /// The render pass the attachments conform to.
    pub render_pass: Arc<RenderPass>,
    /// Color attachments, one per render pass color format.
    pub color_attachments: Vec<FramebufferAttachment>,
    /// Depth-stencil attachment, if the render pass has one.
    pub depth_stencil_attachment: Option<FramebufferAttachment>,
}

/// Textures rendered into by a render pass.
#[derive(Debug)]
pub struct Framebuffer {
    core: ResourceCore,
    render_pass: Arc<RenderPass>,
    color_attachments: Vec<FramebufferAttachment>,
    depth_stencil_attachment: Option<FramebufferAttachment>,
    width: u32,
    height: u32,
    native: Box<dyn NativeResource>,
}

impl Framebuffer {
    /// Wraps a native framebuffer. Called by backends only.
    pub fn new(
        core: ResourceCore,
        descriptor: &FramebufferDescriptor<'_>,
        width: u32,
        height: u32,
        native: Box<dyn NativeResource>,
    ) -> Self {
        Self {
            core,
            render_pass: Arc::clone(&descriptor.render_pass),
            color_attachments: descriptor.color_attachments.clone(),
            depth_stencil_attachment: descriptor.depth_stencil_attachment.clone(),
            width,
            height,
            native,
        }
    }

    /// The render pass the framebuffer conforms to.
    pub fn render_pass(&self) -> &Arc<RenderPass> {
        &self.render_pass
    }

    /// The color attachments.
    pub fn color_attachments(&self) -> &[FramebufferAttachment] {
        &self.color_attachments
    }

    /// The depth-stencil attachment.
    pub fn depth_stencil_attachment(&self) -> Option<&FramebufferAttachment> {
        self.depth_stencil_attachment.as_ref()
    }

    /// Width and height of the renderable area.
    pub fn width_and_height(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// The backend-private framebuffer object.
    pub fn native(&self) -> &dyn NativeResource {
        self.native.as_ref()
    }
}

/// Opaque native window handle a swap chain presents to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NativeWindowHandle(pub u64);

/// Describes a swap chain.
#[derive(Debug, Clone)]
pub struct SwapChainDescriptor<'a> {
    /// Optional debug name.
    pub label: Option<Cow<'a, str>>,
    /// The render pass of the back buffers.
    pub render_pass: Arc<RenderPass>,
    /// The window presented to.
    pub window: NativeWindowHandle,
    /// Initial back buffer width.
    pub width: u32,
    /// Initial back buffer height.
    pub height: u32,
    /// Synchronize presentation with the vertical blank.
    pub vertical_synchronization: bool,
}

/// The backend-private part of a swap chain.
pub trait NativeSwapChain: NativeResource {
    /// Presents the current back buffer.
    fn present(&self);
    /// Resizes the back buffers.
    fn resize_buffers(&self, width: u32, height: u32);
}

/// Back buffers presented to a window.
#[derive(Debug)]
pub struct SwapChain {
    core: ResourceCore,
    render_pass: Arc<RenderPass>,
    window: NativeWindowHandle,
    vertical_synchronization: bool,
    size: Mutex<(u32, u32)>,
    native: Box<dyn NativeSwapChain>,
}

impl SwapChain {
    /// Wraps a native swap chain. Called by backends only.
    pub fn new(
        core: ResourceCore,
        descriptor: &SwapChainDescriptor<'_>,
        native: Box<dyn NativeSwapChain>,
    ) -> Self {
        Self {
            core,
            render_pass: Arc::clone(&descriptor.render_pass),
            window: descriptor.window,
            vertical_synchronization: descriptor.vertical_synchronization,
            size: Mutex::new((descriptor.width, descriptor.height)),
            native,
        }
    }

    /// The render pass of the back buffers.
    pub fn render_pass(&self) -> &Arc<RenderPass> {
        &self.render_pass
    }

    /// The window presented to.
    pub fn window(&self) -> NativeWindowHandle {
        self.window
    }

    /// Whether presentation waits for the vertical blank.
    pub fn vertical_synchronization(&self) -> bool {
        self.vertical_synchronization
    }

    /// Current back buffer size.
    pub fn width_and_height(&self) -> (u32, u32) {
        self.size.lock().map(|size| *size).unwrap_or((0, 0))
    }

    /// Presents the current back buffer.
    pub fn present(&self) {
        self.native.present();
    }

    /// Resizes the back buffers, e.g. after the window was resized.
    pub fn resize_buffers(&self, width: u32, height: u32) {
        if let Ok(mut size) = self.size.lock() {
            *size = (width, height);
        }
        self.native.resize_buffers(width, height);
    }

    /// The backend-private swap chain object.
    pub fn native(&self) -> &dyn NativeSwapChain {
        self.native.as_ref()
    }
}

impl_resource!(RenderPass, Framebuffer, SwapChain);

/// Anything a render pass can render into.
#[derive(Debug, Clone)]
pub enum RenderTarget {
    /// A window's back buffer.
    SwapChain(Arc<SwapChain>),
    /// Offscreen textures.
    Framebuffer(Arc<Framebuffer>),
}

impl RenderTarget {
    /// The render pass of the target.
    pub fn render_pass(&self) -> &Arc<RenderPass> {
        match self {
            RenderTarget::SwapChain(swap_chain) => swap_chain.render_pass(),
            RenderTarget::Framebuffer(framebuffer) => framebuffer.render_pass(),
        }
    }

    /// Width and height of the target.
    pub fn width_and_height(&self) -> (u32, u32) {
        match self {
            RenderTarget::SwapChain(swap_chain) => swap_chain.width_and_height(),
            RenderTarget::Framebuffer(framebuffer) => framebuffer.width_and_height(),
        }
    }

    /// The target as a type-erased resource.
    pub fn as_resource(&self) -> &dyn Resource {
        match self {
            RenderTarget::SwapChain(swap_chain) => swap_chain.as_ref(),
            RenderTarget::Framebuffer(framebuffer) => framebuffer.as_ref(),
        }
    }

    /// The id of the underlying swap chain or framebuffer.
    pub fn id(&self) -> ResourceId {
        self.as_resource().id()
    }
}

impl From<Arc<SwapChain>> for RenderTarget {
    fn from(swap_chain: Arc<SwapChain>) -> Self {
        RenderTarget::SwapChain(swap_chain)
    }
}

impl From<Arc<Framebuffer>> for RenderTarget {
    fn from(framebuffer: Arc<Framebuffer>) -> Self {
        RenderTarget::Framebuffer(framebuffer)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct RenderPassKey {
    color_attachment_texture_formats: Vec<TextureFormat>,
    depth_stencil_attachment_texture_format: Option<TextureFormat>,
    number_of_multisamples: u8,
}

/// Shares render passes between everything rendering with the same formats.
///
/// Render passes are cheap to compare but not always cheap to create, and
/// pipeline states only match targets whose render pass is compatible, so
/// higher layers fetch them from one cache.
#[derive(Debug)]
pub struct RenderPassCache {
    rhi: Arc<dyn Rhi>,
    render_passes: Mutex<HashMap<RenderPassKey, Arc<RenderPass>>>,
}

impl RenderPassCache {
    /// Creates an empty cache for one RHI instance.
    pub fn new(rhi: Arc<dyn Rhi>) -> Self {
        Self {
            rhi,
            render_passes: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the render pass for the formats, creating it on first use.
    pub fn get_or_create(
        &self,
        color_attachment_texture_formats: &[TextureFormat],
        depth_stencil_attachment_texture_format: Option<TextureFormat>,
        number_of_multisamples: u8,
    ) -> Result<Arc<RenderPass>, ResourceError> {
        let key = RenderPassKey {
            color_attachment_texture_formats: color_attachment_texture_formats.to_vec(),
            depth_stencil_attachment_texture_format,
            number_of_multisamples,
        };
        let mut render_passes = self
            .render_passes
            .lock()
            .map_err(|_| ResourceError::BackendError("render pass cache poisoned".into()))?;
        if let Some(render_pass) = render_passes.get(&key) {
            return Ok(Arc::clone(render_pass));
        }

        let descriptor = RenderPassDescriptor {
            label: Some(Cow::Borrowed("Cached render pass")),
            color_attachment_texture_formats: key.color_attachment_texture_formats.clone(),
            depth_stencil_attachment_texture_format,
            number_of_multisamples,
        };
        let render_pass = self.rhi.create_render_pass(&descriptor)?;
        log::debug!(
            "RenderPassCache: Created render pass {:?} for {} color attachments",
            render_pass.id(),
            color_attachment_texture_formats.len()
        );
        render_passes.insert(key, Arc::clone(&render_pass));
        Ok(render_pass)
    }

    /// Number of cached render passes.
    pub fn len(&self) -> usize {
        self.render_passes.lock().map(|passes| passes.len()).unwrap_or(0)
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every cached render pass the cache alone keeps alive.
    pub fn clear_unused(&self) {
        if let Ok(mut render_passes) = self.render_passes.lock() {
            render_passes.retain(|_, render_pass| Arc::strong_count(render_pass) > 1);
        }
    }
}
