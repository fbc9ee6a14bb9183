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

//! Runtime selection of an RHI backend.

#[cfg(feature = "null")]
use crate::graphics::null::{NullRhi, NullRhiConfig};
use kiln_core::rhi::{BackendType, RenderError, Rhi};
use kiln_core::Context;
use std::sync::Arc;

/// Owns the RHI chosen at runtime.
///
/// The instance is the only place that knows concrete backend types. Every
/// other layer works with the `Arc<dyn Rhi>` returned by [`RhiInstance::rhi`].
#[derive(Debug, Clone)]
pub struct RhiInstance {
    rhi: Arc<dyn Rhi>,
}

impl RhiInstance {
    /// Creates the RHI of `backend`.
    ///
    /// Fails with [`RenderError::BackendUnavailable`] if the backend is not
    /// compiled into this build.
    pub fn new(backend: BackendType, context: Context) -> Result<Self, RenderError> {
        log::info!("Creating RHI instance for backend '{backend}'");
        match backend {
            #[cfg(feature = "null")]
            BackendType::Null => Ok(Self::from_rhi(Arc::new(NullRhi::new(context)))),
            other => {
                let _ = context;
                log::error!("RHI backend '{other}' is not available in this build");
                Err(RenderError::BackendUnavailable(other))
            }
        }
    }

    /// Creates a null RHI advertising the capabilities of `config`.
    #[cfg(feature = "null")]
    pub fn with_null_config(context: Context, config: &NullRhiConfig) -> Self {
        Self::from_rhi(Arc::new(NullRhi::with_config(context, config)))
    }

    /// Creates the RHI whose backend name is `name`, ignoring case.
    pub fn from_name(name: &str, context: Context) -> Result<Self, RenderError> {
        let backend = name
            .parse::<BackendType>()
            .map_err(RenderError::UnknownBackend)?;
        Self::new(backend, context)
    }

    fn from_rhi(rhi: Arc<dyn Rhi>) -> Self {
        log::info!(
            "RHI '{}' ready on '{}'",
            rhi.name(),
            rhi.capabilities().device_name
        );
        Self { rhi }
    }

    /// The backend of the held RHI.
    pub fn backend_type(&self) -> BackendType {
        self.rhi.backend_type()
    }

    /// The held RHI.
    pub fn rhi(&self) -> &Arc<dyn Rhi> {
        &self.rhi
    }

    /// Gives up the instance and returns the RHI.
    pub fn into_rhi(self) -> Arc<dyn Rhi> {
        self.rhi
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_names_are_reported_verbatim() {
        let result = RhiInstance::from_name("Metal", Context::default());
        assert!(matches!(result, Err(RenderError::UnknownBackend(name)) if name == "Metal"));
    }

    #[test]
    fn backends_without_an_implementation_are_unavailable() {
        let result = RhiInstance::new(BackendType::Vulkan, Context::default());
        assert!(matches!(
            result,
            Err(RenderError::BackendUnavailable(BackendType::Vulkan))
        ));
    }

    #[cfg(feature = "null")]
    #[test]
    fn null_backend_is_selected_by_name() {
        let instance = RhiInstance::from_name("null", Context::default()).unwrap();
        assert_eq!(instance.backend_type(), BackendType::Null);
        assert!(instance.rhi().is_initialized());
    }
}
