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

//! Services injected into an RHI instance at construction time.
//!
//! The RHI never reaches for global state: the assertion handler and the
//! debug-name policy travel with the [`Context`] handed to the backend.
//! Memory comes from Rust's global allocator, so a host that needs a custom
//! allocation strategy installs a `#[global_allocator]` instead of passing
//! one here.

use std::fmt;
use std::sync::{Arc, Mutex};

/// Receives contract violations detected by the RHI.
pub trait AssertHandler: Send + Sync + fmt::Debug {
    /// Called when an RHI assertion fails.
    ///
    /// Returns `true` when the caller should break (panic), `false` to let
    /// execution continue.
    fn handle_assert(&self, expression: &str, file: &str, line: u32, message: &str) -> bool;
}

/// Logs the violation at `error` level and asks the caller to break.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultAssertHandler;

impl AssertHandler for DefaultAssertHandler {
    fn handle_assert(&self, expression: &str, file: &str, line: u32, message: &str) -> bool {
        log::error!("RHI assertion `{expression}` failed at {file}:{line}: {message}");
        true
    }
}

/// Keeps every violation it sees and never breaks.
///
/// Useful for tools that want to surface all violations of a frame at once
/// and for tests that exercise contract violations without unwinding.
#[derive(Debug, Default)]
pub struct RecordingAssertHandler {
    failures: Mutex<Vec<String>>,
}

impl RecordingAssertHandler {
    /// Creates an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the recorded failure messages, oldest first.
    pub fn failures(&self) -> Vec<String> {
        self.failures
            .lock()
            .map(|failures| failures.clone())
            .unwrap_or_default()
    }

    /// Returns the number of recorded failures.
    pub fn failure_count(&self) -> usize {
        self.failures.lock().map(|f| f.len()).unwrap_or(0)
    }
}

impl AssertHandler for RecordingAssertHandler {
    fn handle_assert(&self, expression: &str, _file: &str, _line: u32, message: &str) -> bool {
        log::warn!("RecordingAssertHandler: `{expression}` failed: {message}");
        if let Ok(mut failures) = self.failures.lock() {
            failures.push(format!("{expression}: {message}"));
        }
        false
    }
}

/// The services an RHI instance is constructed with.
#[derive(Debug, Clone)]
pub struct Context {
    assert_handler: Arc<dyn AssertHandler>,
    keep_debug_names: bool,
}

impl Context {
    /// Creates a context around the given assertion handler.
    pub fn new(assert_handler: Arc<dyn AssertHandler>) -> Self {
        Self {
            assert_handler,
            keep_debug_names: cfg!(debug_assertions),
        }
    }

    /// Overrides whether resources keep their debug names.
    #[must_use]
    pub fn with_debug_names(mut self, keep_debug_names: bool) -> Self {
        self.keep_debug_names = keep_debug_names;
        self
    }

    /// Whether resources created under this context keep their debug names.
    pub fn keep_debug_names(&self) -> bool {
        self.keep_debug_names
    }

    /// The name a new resource keeps under the debug-name policy.
    pub fn retained_debug_name<'a>(&self, debug_name: &'a str) -> &'a str {
        if self.keep_debug_names {
            debug_name
        } else {
            ""
        }
    }

    /// The injected assertion handler.
    pub fn assert_handler(&self) -> &dyn AssertHandler {
        self.assert_handler.as_ref()
    }

    /// Reports a failed assertion. Called by [`rhi_assert!`](crate::rhi_assert).
    ///
    /// Panics in debug builds when the handler asks to break. Release builds
    /// only log, leaving the caller to skip the offending work.
    #[doc(hidden)]
    pub fn report_assertion(
        &self,
        expression: &str,
        file: &str,
        line: u32,
        message: fmt::Arguments<'_>,
    ) {
        let message = message.to_string();
        let break_requested = self
            .assert_handler
            .handle_assert(expression, file, line, &message);
        if break_requested && cfg!(debug_assertions) {
            panic!("RHI assertion `{expression}` failed: {message}");
        }
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new(Arc::new(DefaultAssertHandler))
    }
}

/// Checks an RHI contract through the context's assertion handler.
///
/// Evaluates to `true` when the condition held, so callers can skip the
/// violating operation when the handler lets execution continue.
///
/// ```
/// use kiln_core::{rhi_assert, Context};
///
/// let context = Context::default();
/// let bound = true;
/// if rhi_assert!(context, bound, "nothing bound") {
///     // issue the native call
/// }
/// ```
#[macro_export]
macro_rules! rhi_assert {
    ($context:expr, $condition:expr, $($arg:tt)+) => {{
        let held: bool = $condition;
        if !held {
            $context.report_assertion(
                stringify!($condition),
                file!(),
                line!(),
                format_args!($($arg)+),
            );
        }
        held
    }};
}
