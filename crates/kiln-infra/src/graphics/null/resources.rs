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

//! Native objects of the null backend.
//!
//! There is no GPU behind them: buffers and textures keep a CPU copy of
//! their contents, programs keep the last value of every uniform and query
//! pools keep their results, so tests can observe what a frame did.

use kiln_core::rhi::binding::{DescriptorTableLayout, SlotBinding};
use kiln_core::rhi::render_target::NativeSwapChain;
use kiln_core::rhi::resource::{
    NativeGraphicsProgram, NativeResource, UniformHandle, UniformValue,
};
use std::any::Any;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

macro_rules! impl_native_resource {
    ($($name:ty),+ $(,)?) => {
        $(
            impl NativeResource for $name {
                fn as_any(&self) -> &dyn Any {
                    self
                }
            }
        )+
    };
}

/// A native object without state (samplers, pipeline states, render passes...).
#[derive(Debug, Default)]
pub struct NullNativeObject;

/// CPU copy of a buffer.
#[derive(Debug)]
pub struct NullBuffer {
    data: Mutex<Vec<u8>>,
}

impl NullBuffer {
    /// A buffer of `number_of_bytes`, zero filled unless `data` is given.
    pub fn new(number_of_bytes: u32, data: Option<&[u8]>) -> Self {
        let data = match data {
            Some(data) => data.to_vec(),
            None => vec![0; number_of_bytes as usize],
        };
        Self {
            data: Mutex::new(data),
        }
    }

    /// Overwrites the buffer from its first byte.
    pub fn write(&self, data: &[u8]) {
        if let Ok(mut contents) = self.data.lock() {
            let length = data.len().min(contents.len());
            contents[..length].copy_from_slice(&data[..length]);
        }
    }

    /// A copy of the current contents.
    pub fn contents(&self) -> Vec<u8> {
        self.data
            .lock()
            .map(|contents| contents.clone())
            .unwrap_or_default()
    }

    /// Reads `length` bytes at `offset`, `None` if the range is outside the buffer.
    pub fn read(&self, offset: usize, length: usize) -> Option<Vec<u8>> {
        let contents = self.data.lock().ok()?;
        contents.get(offset..offset.checked_add(length)?).map(<[u8]>::to_vec)
    }

    /// Downcasts the native object of a buffer resource.
    pub fn of(native: &dyn NativeResource) -> Option<&NullBuffer> {
        native.as_any().downcast_ref::<NullBuffer>()
    }
}

/// CPU copy of a texture's initial data and its sampled mipmap range.
#[derive(Debug)]
pub struct NullTexture {
    data: Mutex<Vec<u8>>,
    mipmap_range: Mutex<(u32, u32)>,
}

impl NullTexture {
    /// A texture with `number_of_mipmaps` levels and optional initial data.
    pub fn new(number_of_mipmaps: u32, data: Option<&[u8]>) -> Self {
        Self {
            data: Mutex::new(data.map(<[u8]>::to_vec).unwrap_or_default()),
            mipmap_range: Mutex::new((0, number_of_mipmaps.saturating_sub(1))),
        }
    }

    /// A copy of the texture contents.
    pub fn contents(&self) -> Vec<u8> {
        self.data
            .lock()
            .map(|contents| contents.clone())
            .unwrap_or_default()
    }

    /// Replaces the contents with those of `source`.
    pub fn copy_from(&self, source: &NullTexture) {
        let contents = source.contents();
        if let Ok(mut data) = self.data.lock() {
            *data = contents;
        }
    }

    /// The lowest and highest mipmap index shaders may sample.
    pub fn mipmap_range(&self) -> (u32, u32) {
        self.mipmap_range.lock().map(|range| *range).unwrap_or((0, 0))
    }

    /// Restricts the sampled mipmap range.
    pub fn set_mipmap_range(&self, minimum_mipmap_index: u32, maximum_mipmap_index: u32) {
        if let Ok(mut range) = self.mipmap_range.lock() {
            *range = (minimum_mipmap_index, maximum_mipmap_index);
        }
    }

    /// Downcasts the native object of a texture.
    pub fn of(native: &dyn NativeResource) -> Option<&NullTexture> {
        native.as_any().downcast_ref::<NullTexture>()
    }
}

/// How a root signature lands on the emulated binding model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NullBindings {
    /// Slot of every range, per root parameter.
    Slots(Vec<Vec<SlotBinding>>),
    /// Heap placement of every descriptor table.
    DescriptorTables(Vec<DescriptorTableLayout>),
}

/// Resolved bindings of a root signature.
#[derive(Debug)]
pub struct NullRootSignature {
    bindings: NullBindings,
}

impl NullRootSignature {
    /// Wraps resolved bindings.
    pub fn new(bindings: NullBindings) -> Self {
        Self { bindings }
    }

    /// The resolved bindings.
    pub fn bindings(&self) -> &NullBindings {
        &self.bindings
    }

    /// Downcasts the native object of a root signature.
    pub fn of(native: &dyn NativeResource) -> Option<&NullRootSignature> {
        native.as_any().downcast_ref::<NullRootSignature>()
    }
}

/// A compiled shader: the individual uniforms its source declares.
#[derive(Debug, Default)]
pub struct NullShader {
    uniform_names: Vec<String>,
}

impl NullShader {
    /// Collects the `uniform <type> <name>;` declarations of a source.
    ///
    /// Uniform blocks are skipped, they are fed through uniform buffers.
    pub fn from_source(source_code: &str) -> Self {
        let uniform_names = source_code
            .split(';')
            .filter_map(|statement| {
                let statement = statement.trim();
                let declaration = statement.strip_prefix("uniform")?;
                if !declaration.starts_with(char::is_whitespace) || statement.contains('{') {
                    return None;
                }
                let name = declaration.split_whitespace().last()?;
                Some(name.split('[').next().unwrap_or(name).to_string())
            })
            .collect();
        Self { uniform_names }
    }

    /// The declared individual uniforms, in source order.
    pub fn uniform_names(&self) -> &[String] {
        &self.uniform_names
    }

    /// Downcasts the native object of a shader.
    pub fn of(native: &dyn NativeResource) -> Option<&NullShader> {
        native.as_any().downcast_ref::<NullShader>()
    }
}

/// A linked program and the last value written to each of its uniforms.
#[derive(Debug, Default)]
pub struct NullProgram {
    handles: HashMap<String, UniformHandle>,
    values: Mutex<HashMap<UniformHandle, UniformValue>>,
}

impl NullProgram {
    /// Assigns handles to `uniform_names` in order. Duplicates share a handle.
    pub fn new<'a>(uniform_names: impl IntoIterator<Item = &'a str>) -> Self {
        let mut handles = HashMap::new();
        for name in uniform_names {
            let next = UniformHandle(handles.len() as u32);
            handles.entry(name.to_string()).or_insert(next);
        }
        Self {
            handles,
            values: Mutex::new(HashMap::new()),
        }
    }

    /// Number of distinct uniforms.
    pub fn number_of_uniforms(&self) -> usize {
        self.handles.len()
    }

    /// Stores a uniform value. Returns `false` for unknown handles.
    pub fn set_uniform(&self, uniform_handle: UniformHandle, value: UniformValue) -> bool {
        if uniform_handle.0 as usize >= self.handles.len() {
            return false;
        }
        if let Ok(mut values) = self.values.lock() {
            values.insert(uniform_handle, value);
        }
        true
    }

    /// The last value set for a uniform.
    pub fn uniform(&self, uniform_handle: UniformHandle) -> Option<UniformValue> {
        self.values
            .lock()
            .ok()
            .and_then(|values| values.get(&uniform_handle).copied())
    }

    /// Downcasts the native object of a graphics program.
    pub fn of(native: &dyn NativeGraphicsProgram) -> Option<&NullProgram> {
        native.as_any().downcast_ref::<NullProgram>()
    }
}

impl NativeGraphicsProgram for NullProgram {
    fn uniform_handle(&self, name: &str) -> Option<UniformHandle> {
        self.handles.get(name).copied()
    }
}

/// Query results, `None` until a query was ended or written.
#[derive(Debug)]
pub struct NullQueryPool {
    results: Mutex<Vec<Option<u64>>>,
}

impl NullQueryPool {
    /// A pool of `number_of_queries` unwritten queries.
    pub fn new(number_of_queries: u32) -> Self {
        Self {
            results: Mutex::new(vec![None; number_of_queries as usize]),
        }
    }

    /// Marks a range of queries unwritten.
    pub fn reset(&self, first_query_index: u32, number_of_queries: u32) {
        if let Ok(mut results) = self.results.lock() {
            let first = first_query_index as usize;
            let end = (first + number_of_queries as usize).min(results.len());
            for result in results.iter_mut().take(end).skip(first) {
                *result = None;
            }
        }
    }

    /// Stores the result of one query.
    pub fn write(&self, query_index: u32, value: u64) {
        if let Ok(mut results) = self.results.lock() {
            if let Some(result) = results.get_mut(query_index as usize) {
                *result = Some(value);
            }
        }
    }

    /// The results of a range, `None` if any of them is unwritten.
    pub fn results(&self, first_query_index: u32, number_of_queries: u32) -> Option<Vec<u64>> {
        let results = self.results.lock().ok()?;
        let first = first_query_index as usize;
        results
            .get(first..first + number_of_queries as usize)?
            .iter()
            .copied()
            .collect()
    }

    /// Downcasts the native object of a query pool.
    pub fn of(native: &dyn NativeResource) -> Option<&NullQueryPool> {
        native.as_any().downcast_ref::<NullQueryPool>()
    }
}

/// A swap chain that counts presents instead of showing anything.
#[derive(Debug, Default)]
pub struct NullSwapChain {
    presents: AtomicU64,
}

impl NullSwapChain {
    /// Number of frames presented so far.
    pub fn number_of_presents(&self) -> u64 {
        self.presents.load(Ordering::Relaxed)
    }

    /// Downcasts the native object of a swap chain.
    pub fn of(native: &dyn NativeSwapChain) -> Option<&NullSwapChain> {
        native.as_any().downcast_ref::<NullSwapChain>()
    }
}

impl NativeSwapChain for NullSwapChain {
    fn present(&self) {
        self.presents.fetch_add(1, Ordering::Relaxed);
        log::trace!("NullSwapChain: Present");
    }

    fn resize_buffers(&self, width: u32, height: u32) {
        log::debug!("NullSwapChain: Resized to {width}x{height}");
    }
}

impl_native_resource!(
    NullNativeObject,
    NullBuffer,
    NullTexture,
    NullRootSignature,
    NullShader,
    NullProgram,
    NullQueryPool,
    NullSwapChain,
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shader_sources_declare_individual_uniforms() {
        let shader = NullShader::from_source(
            "uniform mat4 ObjectSpaceToClipSpaceMatrix;\n\
             uniform vec4 Colors[4];\n\
             uniform PassUniformBuffer { mat4 WorldToClip; };\n\
             uniformity_is_not_a_keyword x;\n\
             void main() { gl_Position = vec4(0.0); }",
        );
        assert_eq!(
            shader.uniform_names(),
            &["ObjectSpaceToClipSpaceMatrix".to_string(), "Colors".to_string()]
        );
    }

    #[test]
    fn programs_share_handles_for_duplicate_names() {
        let program = NullProgram::new(["Tint", "Time", "Tint"]);
        assert_eq!(program.number_of_uniforms(), 2);
        assert_eq!(program.uniform_handle("Time"), Some(UniformHandle(1)));

        assert!(program.set_uniform(UniformHandle(1), UniformValue::Float1(0.5)));
        assert!(!program.set_uniform(UniformHandle(7), UniformValue::Float1(0.5)));
        assert_eq!(
            program.uniform(UniformHandle(1)),
            Some(UniformValue::Float1(0.5))
        );
    }

    #[test]
    fn query_results_need_every_query_written() {
        let pool = NullQueryPool::new(4);
        pool.write(0, 10);
        pool.write(1, 20);
        assert_eq!(pool.results(0, 2), Some(vec![10, 20]));
        assert_eq!(pool.results(0, 3), None);

        pool.reset(0, 1);
        assert_eq!(pool.results(1, 1), Some(vec![20]));
        assert_eq!(pool.results(0, 1), None);
    }

    #[test]
    fn buffers_read_inside_their_bounds() {
        let buffer = NullBuffer::new(8, None);
        buffer.write(&[1, 2, 3]);
        assert_eq!(buffer.read(1, 2), Some(vec![2, 3]));
        assert_eq!(buffer.read(6, 4), None);
        assert_eq!(buffer.contents().len(), 8);
    }
}
