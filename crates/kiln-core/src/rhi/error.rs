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

//! Defines the hierarchy of error types for the RHI.

use crate::rhi::backend::{BackendType, RhiId};
use crate::rhi::resource::ResourceType;
use std::fmt;

/// An error returned when a resource cannot be created.
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceError {
    /// An argument is malformed (zero size, empty list, bad name...).
    InvalidArgument(String),
    /// The root parameter index does not exist in the root signature.
    InvalidRootParameter {
        /// The requested parameter index.
        root_parameter_index: u32,
        /// The number of parameters the root signature declares.
        number_of_parameters: usize,
    },
    /// The root parameter exists but resources cannot be grouped for it.
    NotADescriptorTable {
        /// The requested parameter index.
        root_parameter_index: u32,
    },
    /// The number of resources does not match the number of descriptor ranges.
    ArityMismatch {
        /// The root parameter the group targets.
        root_parameter_index: u32,
        /// The number of descriptor ranges of the parameter.
        expected: usize,
        /// The number of resources supplied.
        actual: usize,
    },
    /// A resource kind is not compatible with the descriptor range it fills.
    IncompatibleResource {
        /// The root parameter the group targets.
        root_parameter_index: u32,
        /// The index of the descriptor range within the parameter.
        range_index: usize,
        /// The kind the range declares.
        expected: ResourceType,
        /// The kind that was supplied.
        actual: ResourceType,
    },
    /// A requested size or count is larger than the device advertises.
    CapabilityExceeded {
        /// The name of the capability that was exceeded.
        capability: &'static str,
        /// The requested value.
        requested: u64,
        /// The maximum the device advertises.
        maximum: u64,
    },
    /// The device does not support a required feature.
    FeatureNotSupported(String),
    /// A resource created by another RHI instance was supplied.
    ForeignResource {
        /// The instance performing the creation.
        expected: RhiId,
        /// The instance that owns the supplied resource.
        actual: RhiId,
    },
    /// Supplied initial data does not agree with the declared size.
    DataSizeMismatch {
        /// The number of bytes the resource description implies.
        expected: u64,
        /// The number of bytes supplied.
        actual: u64,
    },
    /// Two descriptor ranges resolve to the same binding slot.
    BindingConflict(String),
    /// An error originating from the specific graphics backend implementation.
    BackendError(String),
}

impl fmt::Display for ResourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceError::InvalidArgument(msg) => write!(f, "Invalid argument: {msg}"),
            ResourceError::InvalidRootParameter {
                root_parameter_index,
                number_of_parameters,
            } => write!(
                f,
                "Root parameter index {root_parameter_index} is out of range (root signature has {number_of_parameters} parameters)"
            ),
            ResourceError::NotADescriptorTable {
                root_parameter_index,
            } => write!(
                f,
                "Root parameter {root_parameter_index} is not a descriptor table"
            ),
            ResourceError::ArityMismatch {
                root_parameter_index,
                expected,
                actual,
            } => write!(
                f,
                "Root parameter {root_parameter_index} expects {expected} resources, got {actual}"
            ),
            ResourceError::IncompatibleResource {
                root_parameter_index,
                range_index,
                expected,
                actual,
            } => write!(
                f,
                "Descriptor range {range_index} of root parameter {root_parameter_index} expects {expected:?}, got {actual:?}"
            ),
            ResourceError::CapabilityExceeded {
                capability,
                requested,
                maximum,
            } => write!(
                f,
                "Capability '{capability}' exceeded: requested {requested}, maximum is {maximum}"
            ),
            ResourceError::FeatureNotSupported(msg) => write!(f, "Feature not supported: {msg}"),
            ResourceError::ForeignResource { expected, actual } => write!(
                f,
                "Resource belongs to RHI instance {actual:?}, expected {expected:?}"
            ),
            ResourceError::DataSizeMismatch { expected, actual } => write!(
                f,
                "Initial data size mismatch: expected {expected} bytes, got {actual}"
            ),
            ResourceError::BindingConflict(msg) => write!(f, "Binding conflict: {msg}"),
            ResourceError::BackendError(msg) => {
                write!(f, "Backend-specific resource error: {msg}")
            }
        }
    }
}

impl std::error::Error for ResourceError {}

/// An error reported by a command factory while recording.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandError {
    /// A list argument (viewports, scissor rectangles, draws) was empty.
    EmptyList(&'static str),
    /// Uniform buffer copies need at least one byte.
    EmptyUniformData,
    /// More bytes were copied than the uniform buffer holds.
    UniformDataTooLarge {
        /// The size of the uniform buffer.
        buffer_size: u32,
        /// The number of bytes to copy.
        data_size: usize,
    },
    /// The indirect buffer cannot hold the requested draws.
    IndirectBufferOverrun {
        /// The byte offset of the first draw.
        offset: u32,
        /// The number of bytes the draws need.
        required: u64,
        /// The size of the indirect buffer.
        buffer_size: u32,
    },
    /// The indirect buffer was not created for this kind of draw.
    IndirectBufferUsage(&'static str),
    /// The values handed to a uniform block do not match its layout.
    UniformLayoutMismatch(String),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::EmptyList(what) => write!(f, "Command needs at least one {what}"),
            CommandError::EmptyUniformData => write!(f, "Uniform buffer copy without data"),
            CommandError::UniformDataTooLarge {
                buffer_size,
                data_size,
            } => write!(
                f,
                "Uniform buffer copy of {data_size} bytes exceeds the buffer size of {buffer_size} bytes"
            ),
            CommandError::IndirectBufferOverrun {
                offset,
                required,
                buffer_size,
            } => write!(
                f,
                "Indirect draw at offset {offset} needs {required} bytes, buffer holds {buffer_size}"
            ),
            CommandError::IndirectBufferUsage(msg) => {
                write!(f, "Indirect buffer usage mismatch: {msg}")
            }
            CommandError::UniformLayoutMismatch(msg) => {
                write!(f, "Uniform layout mismatch: {msg}")
            }
        }
    }
}

impl std::error::Error for CommandError {}

/// A high-level error from an RHI instance.
#[derive(Debug)]
pub enum RenderError {
    /// The backend could not be initialized.
    InitializationFailed(String),
    /// The requested backend is not compiled into this build.
    BackendUnavailable(BackendType),
    /// The backend name is not known.
    UnknownBackend(String),
    /// Query results could not be read back.
    QueryFailed(String),
    /// An error occurred while creating a resource.
    ResourceError(ResourceError),
    /// An unexpected internal error.
    Internal(String),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::InitializationFailed(msg) => {
                write!(f, "RHI initialization failed: {msg}")
            }
            RenderError::BackendUnavailable(backend) => {
                write!(f, "RHI backend {} is not available in this build", backend.name())
            }
            RenderError::UnknownBackend(name) => write!(f, "Unknown RHI backend '{name}'"),
            RenderError::QueryFailed(msg) => write!(f, "Query readback failed: {msg}"),
            RenderError::ResourceError(e) => write!(f, "Resource error: {e}"),
            RenderError::Internal(msg) => write!(f, "Internal RHI error: {msg}"),
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::ResourceError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ResourceError> for RenderError {
    fn from(err: ResourceError) -> Self {
        RenderError::ResourceError(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn render_error_wraps_resource_error_as_source() {
        let resource = ResourceError::ArityMismatch {
            root_parameter_index: 0,
            expected: 4,
            actual: 3,
        };
        let render: RenderError = resource.clone().into();

        assert!(render.to_string().contains("expects 4 resources, got 3"));
        let source = render.source().expect("resource error should be the source");
        assert_eq!(source.to_string(), resource.to_string());
    }

    #[test]
    fn capability_error_names_the_limit() {
        let err = ResourceError::CapabilityExceeded {
            capability: "maximum_texture_dimension",
            requested: 8192,
            maximum: 4096,
        };
        assert_eq!(
            err.to_string(),
            "Capability 'maximum_texture_dimension' exceeded: requested 8192, maximum is 4096"
        );
    }
}
