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

//! Fixed-function state baked into graphics pipeline states.

use crate::kiln_bitflags;

/// Maximum number of color render targets a blend state describes.
pub const MAXIMUM_NUMBER_OF_RENDER_TARGETS: usize = 8;

/// How vertices are assembled into primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PrimitiveTopology {
    /// Each vertex is a point.
    PointList,
    /// Each pair of vertices is a line.
    LineList,
    /// Consecutive vertices form a connected line.
    LineStrip,
    /// Each triple of vertices is a triangle.
    #[default]
    TriangleList,
    /// Consecutive vertices form connected triangles.
    TriangleStrip,
    /// Tessellation patches with the given number of control points (1..=32).
    PatchList(u8),
}

impl PrimitiveTopology {
    /// Number of control points when the topology is a patch list.
    pub const fn patch_control_points(self) -> Option<u8> {
        match self {
            PrimitiveTopology::PatchList(points) => Some(points),
            _ => None,
        }
    }
}

/// Polygon rasterization mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FillMode {
    /// Only edges are drawn.
    Wireframe,
    /// Polygons are filled.
    #[default]
    Solid,
}

/// Which faces are culled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CullMode {
    /// No culling.
    None,
    /// Cull front faces.
    Front,
    /// Cull back faces.
    #[default]
    Back,
}

/// Comparison used by depth tests, stencil tests and comparison samplers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CompareFunction {
    /// Never passes.
    Never,
    /// Passes if new < existing.
    #[default]
    Less,
    /// Passes if new == existing.
    Equal,
    /// Passes if new <= existing.
    LessEqual,
    /// Passes if new > existing.
    Greater,
    /// Passes if new != existing.
    NotEqual,
    /// Passes if new >= existing.
    GreaterEqual,
    /// Always passes.
    Always,
}

/// Stencil buffer update applied by a stencil test outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StencilOperation {
    /// Keep the current value.
    #[default]
    Keep,
    /// Set to zero.
    Zero,
    /// Replace with the reference value.
    Replace,
    /// Increment, clamping at the maximum.
    IncrementClamp,
    /// Decrement, clamping at zero.
    DecrementClamp,
    /// Bitwise invert.
    Invert,
    /// Increment, wrapping to zero.
    IncrementWrap,
    /// Decrement, wrapping to the maximum.
    DecrementWrap,
}

/// Factor applied to a blend operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum BlendFactor {
    Zero,
    One,
    SrcColor,
    InvSrcColor,
    SrcAlpha,
    InvSrcAlpha,
    DestAlpha,
    InvDestAlpha,
    DestColor,
    InvDestColor,
    SrcAlphaSat,
    BlendFactor,
    InvBlendFactor,
}

/// Operation combining the blend operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[allow(missing_docs)]
pub enum BlendOperation {
    #[default]
    Add,
    Subtract,
    ReverseSubtract,
    Min,
    Max,
}

kiln_bitflags! {
    /// A bitmask to enable or disable writes to individual color channels.
    pub struct ColorWrites: u8 {
        /// Enable writes to the Red channel.
        const R = 0b0001;
        /// Enable writes to the Green channel.
        const G = 0b0010;
        /// Enable writes to the Blue channel.
        const B = 0b0100;
        /// Enable writes to the Alpha channel.
        const A = 0b1000;
        /// Enable writes to all channels.
        const ALL = Self::R.bits() | Self::G.bits() | Self::B.bits() | Self::A.bits();
    }
}

/// Rasterizer configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterizerState {
    /// Polygon fill mode.
    pub fill_mode: FillMode,
    /// Face culling.
    pub cull_mode: CullMode,
    /// Counter-clockwise triangles are front facing when `true`.
    pub front_counter_clockwise: bool,
    /// Constant depth bias.
    pub depth_bias: i32,
    /// Maximum depth bias.
    pub depth_bias_clamp: f32,
    /// Slope-scaled depth bias.
    pub slope_scaled_depth_bias: f32,
    /// Clip against the near and far planes.
    pub depth_clip_enable: bool,
    /// Multisample rasterization.
    pub multisample_enable: bool,
    /// Line antialiasing.
    pub antialiased_line_enable: bool,
    /// Conservative rasterization.
    pub conservative_rasterization: bool,
    /// Enables the scissor test.
    pub scissor_enable: bool,
}

impl Default for RasterizerState {
    fn default() -> Self {
        Self {
            fill_mode: FillMode::Solid,
            cull_mode: CullMode::Back,
            front_counter_clockwise: false,
            depth_bias: 0,
            depth_bias_clamp: 0.0,
            slope_scaled_depth_bias: 0.0,
            depth_clip_enable: true,
            multisample_enable: false,
            antialiased_line_enable: false,
            conservative_rasterization: false,
            scissor_enable: false,
        }
    }
}

/// Stencil test and operations for one face orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StencilFaceState {
    /// Operation when the stencil test fails.
    pub fail_op: StencilOperation,
    /// Operation when the stencil test passes and the depth test fails.
    pub depth_fail_op: StencilOperation,
    /// Operation when both tests pass.
    pub pass_op: StencilOperation,
    /// The stencil comparison.
    pub compare: CompareFunction,
}

impl Default for StencilFaceState {
    fn default() -> Self {
        Self {
            fail_op: StencilOperation::Keep,
            depth_fail_op: StencilOperation::Keep,
            pass_op: StencilOperation::Keep,
            compare: CompareFunction::Always,
        }
    }
}

/// Depth and stencil testing configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DepthStencilState {
    /// Enables the depth test.
    pub depth_enable: bool,
    /// Depth values are written when `true`.
    pub depth_write_enable: bool,
    /// The depth comparison.
    pub depth_compare: CompareFunction,
    /// Enables the stencil test.
    pub stencil_enable: bool,
    /// Mask applied when reading the stencil buffer.
    pub stencil_read_mask: u8,
    /// Mask applied when writing the stencil buffer.
    pub stencil_write_mask: u8,
    /// Stencil state of front faces.
    pub front_face: StencilFaceState,
    /// Stencil state of back faces.
    pub back_face: StencilFaceState,
}

impl Default for DepthStencilState {
    fn default() -> Self {
        Self {
            depth_enable: true,
            depth_write_enable: true,
            depth_compare: CompareFunction::Greater,
            stencil_enable: false,
            stencil_read_mask: 0xff,
            stencil_write_mask: 0xff,
            front_face: StencilFaceState::default(),
            back_face: StencilFaceState::default(),
        }
    }
}

impl DepthStencilState {
    /// Depth testing and writing turned off.
    pub fn disabled() -> Self {
        Self {
            depth_enable: false,
            depth_write_enable: false,
            ..Self::default()
        }
    }
}

/// Blend configuration of one color render target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderTargetBlendState {
    /// Enables blending.
    pub blend_enable: bool,
    /// Source color factor.
    pub src_blend: BlendFactor,
    /// Destination color factor.
    pub dest_blend: BlendFactor,
    /// Color operation.
    pub blend_op: BlendOperation,
    /// Source alpha factor.
    pub src_blend_alpha: BlendFactor,
    /// Destination alpha factor.
    pub dest_blend_alpha: BlendFactor,
    /// Alpha operation.
    pub blend_op_alpha: BlendOperation,
    /// Channels written.
    pub render_target_write_mask: ColorWrites,
}

impl Default for RenderTargetBlendState {
    fn default() -> Self {
        Self {
            blend_enable: false,
            src_blend: BlendFactor::One,
            dest_blend: BlendFactor::Zero,
            blend_op: BlendOperation::Add,
            src_blend_alpha: BlendFactor::One,
            dest_blend_alpha: BlendFactor::Zero,
            blend_op_alpha: BlendOperation::Add,
            render_target_write_mask: ColorWrites::ALL,
        }
    }
}

impl RenderTargetBlendState {
    /// Classic `src * alpha + dest * (1 - alpha)` blending.
    pub fn alpha_blending() -> Self {
        Self {
            blend_enable: true,
            src_blend: BlendFactor::SrcAlpha,
            dest_blend: BlendFactor::InvSrcAlpha,
            ..Self::default()
        }
    }
}

/// Blend configuration of every color render target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BlendState {
    /// Use the alpha channel as coverage mask.
    pub alpha_to_coverage_enable: bool,
    /// Each render target uses its own entry when `true`, all use entry 0 otherwise.
    pub independent_blend_enable: bool,
    /// Per render target blend states.
    pub render_target: [RenderTargetBlendState; MAXIMUM_NUMBER_OF_RENDER_TARGETS],
}

impl BlendState {
    /// The blend state in effect for a render target index.
    pub fn for_render_target(&self, index: usize) -> &RenderTargetBlendState {
        if self.independent_blend_enable {
            &self.render_target[index.min(MAXIMUM_NUMBER_OF_RENDER_TARGETS - 1)]
        } else {
            &self.render_target[0]
        }
    }
}
