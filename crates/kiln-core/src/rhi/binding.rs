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

//! Translation of root signatures into native binding layouts.
//!
//! Bind-to-slot APIs receive one slot per range and stage. Table-based APIs
//! receive one table per descriptor table parameter, laid out in a heap.
//! Both are derived from the same root signature so resource groups stay
//! portable across backends.

use crate::rhi::error::ResourceError;
use crate::rhi::resource::ShaderStage;
use crate::rhi::root_signature::{
    DescriptorRangeType, RootParameter, RootSignatureDescriptor, ShaderVisibility,
};
use std::collections::HashMap;

/// Slot numbering namespace. Each has its own slots on bind-to-slot APIs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotNamespace {
    /// Uniform buffer binding points.
    UniformBuffer,
    /// Texture units and read-only buffer slots.
    ShaderResource,
    /// Read/write image and buffer slots.
    UnorderedAccess,
    /// Sampler slots.
    Sampler,
}

impl From<DescriptorRangeType> for SlotNamespace {
    fn from(range_type: DescriptorRangeType) -> Self {
        match range_type {
            DescriptorRangeType::Ubv => SlotNamespace::UniformBuffer,
            DescriptorRangeType::Srv => SlotNamespace::ShaderResource,
            DescriptorRangeType::Uav => SlotNamespace::UnorderedAccess,
            DescriptorRangeType::Sampler => SlotNamespace::Sampler,
        }
    }
}

/// Where one descriptor range lands on a bind-to-slot API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotBinding {
    /// Position of the range within its descriptor table.
    pub range_index: u32,
    /// Slot namespace.
    pub namespace: SlotNamespace,
    /// Stages the resource is bound for.
    pub visibility: ShaderVisibility,
    /// Slot number within the namespace.
    pub slot: u32,
}

/// Resolves the slot of every range, grouped by root parameter.
///
/// Static sampler parameters resolve to an empty list. Two ranges that claim
/// the same slot of the same namespace for a common stage are rejected.
pub fn resolve_slot_bindings(
    descriptor: &RootSignatureDescriptor,
) -> Result<Vec<Vec<SlotBinding>>, ResourceError> {
    let mut owners: HashMap<(SlotNamespace, ShaderStage, u32), (usize, usize)> = HashMap::new();
    let mut resolved = Vec::with_capacity(descriptor.parameters.len());

    for (parameter_index, parameter) in descriptor.parameters.iter().enumerate() {
        let Some(ranges) = parameter.descriptor_ranges() else {
            resolved.push(Vec::new());
            continue;
        };
        let mut bindings = Vec::with_capacity(ranges.len());
        for (range_index, range) in ranges.iter().enumerate() {
            let namespace = SlotNamespace::from(range.range_type);
            let slot = range.base_shader_register;
            for stage in range.shader_visibility.stages() {
                if let Some((other_parameter, other_range)) =
                    owners.insert((namespace, stage, slot), (parameter_index, range_index))
                {
                    return Err(ResourceError::BindingConflict(format!(
                        "{namespace:?} slot {slot} of {stage:?} is claimed by range {other_range} of parameter {other_parameter} and range {range_index} of parameter {parameter_index}"
                    )));
                }
            }
            bindings.push(SlotBinding {
                range_index: range_index as u32,
                namespace,
                visibility: range.shader_visibility,
                slot,
            });
        }
        resolved.push(bindings);
    }
    Ok(resolved)
}

/// Where one descriptor table lands on a table-based API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DescriptorTableLayout {
    /// The root parameter the table belongs to.
    pub root_parameter_index: u32,
    /// Whether the table lives in the sampler heap.
    pub sampler_heap: bool,
    /// First descriptor of the table in its heap.
    pub heap_offset: u32,
    /// Number of descriptors of the table.
    pub number_of_descriptors: u32,
}

/// Lays every descriptor table out in a resource heap and a sampler heap.
///
/// Samplers cannot share a table with other descriptors on table-based APIs,
/// so each table goes to exactly one heap.
pub fn resolve_descriptor_tables(
    descriptor: &RootSignatureDescriptor,
) -> Result<Vec<DescriptorTableLayout>, ResourceError> {
    let mut resource_heap_size = 0;
    let mut sampler_heap_size = 0;
    let mut tables = Vec::new();

    for (parameter_index, parameter) in descriptor.parameters.iter().enumerate() {
        let RootParameter::DescriptorTable(ranges) = parameter else {
            continue;
        };
        let samplers = ranges
            .iter()
            .filter(|range| range.range_type == DescriptorRangeType::Sampler)
            .count();
        if samplers != 0 && samplers != ranges.len() {
            return Err(ResourceError::BindingConflict(format!(
                "descriptor table {parameter_index} mixes samplers with other descriptors"
            )));
        }
        let number_of_descriptors: u32 = ranges.iter().map(|r| r.number_of_descriptors).sum();
        let sampler_heap = samplers != 0;
        let heap_size = if sampler_heap {
            &mut sampler_heap_size
        } else {
            &mut resource_heap_size
        };
        tables.push(DescriptorTableLayout {
            root_parameter_index: parameter_index as u32,
            sampler_heap,
            heap_offset: *heap_size,
            number_of_descriptors,
        });
        *heap_size += number_of_descriptors;
    }
    Ok(tables)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rhi::resource::ResourceType;
    use crate::rhi::root_signature::{DescriptorRange, StaticSampler};

    fn scene_root_signature() -> RootSignatureDescriptor {
        RootSignatureDescriptor::new()
            .with_descriptor_table(vec![
                DescriptorRange::new(
                    ResourceType::UniformBuffer,
                    0,
                    "UniformBlockDynamicVs",
                    ShaderVisibility::Vertex,
                ),
                DescriptorRange::new(
                    ResourceType::TextureBuffer,
                    0,
                    "InstanceTextureBuffer",
                    ShaderVisibility::Vertex,
                ),
                DescriptorRange::new(
                    ResourceType::Texture2D,
                    1,
                    "AlbedoMap",
                    ShaderVisibility::Fragment,
                ),
                DescriptorRange::new(
                    ResourceType::UniformBuffer,
                    0,
                    "UniformBlockDynamicFs",
                    ShaderVisibility::Fragment,
                ),
            ])
            .with_descriptor_table(vec![DescriptorRange::sampler(0, ShaderVisibility::Fragment)])
    }

    #[test]
    fn slots_follow_the_shader_registers() {
        let slots = resolve_slot_bindings(&scene_root_signature()).expect("no conflicts");
        assert_eq!(slots.len(), 2);
        assert_eq!(slots[0].len(), 4);
        assert_eq!(slots[0][2].slot, 1);
        assert_eq!(slots[0][2].namespace, SlotNamespace::ShaderResource);
        assert_eq!(slots[1][0].namespace, SlotNamespace::Sampler);
    }

    #[test]
    fn overlapping_slots_are_rejected() {
        let descriptor = RootSignatureDescriptor::new().with_descriptor_table(vec![
            DescriptorRange::new(ResourceType::Texture2D, 0, "A", ShaderVisibility::All),
            DescriptorRange::new(ResourceType::Texture2D, 0, "B", ShaderVisibility::Fragment),
        ]);
        assert!(matches!(
            resolve_slot_bindings(&descriptor),
            Err(ResourceError::BindingConflict(_))
        ));
    }

    #[test]
    fn tables_are_packed_per_heap() {
        let descriptor = scene_root_signature()
            .with_static_sampler(StaticSampler {
                sampler: Default::default(),
                shader_register: 1,
                register_space: 0,
                shader_visibility: ShaderVisibility::Fragment,
            })
            .with_descriptor_table(vec![DescriptorRange::new(
                ResourceType::UniformBuffer,
                2,
                "PassData",
                ShaderVisibility::All,
            )]);

        let tables = resolve_descriptor_tables(&descriptor).expect("valid tables");
        assert_eq!(tables.len(), 3);
        assert_eq!(tables[0].heap_offset, 0);
        assert_eq!(tables[0].number_of_descriptors, 4);
        assert!(tables[1].sampler_heap);
        assert_eq!(tables[1].heap_offset, 0);
        assert_eq!(tables[2].root_parameter_index, 3);
        assert_eq!(tables[2].heap_offset, 4);
    }

    #[test]
    fn mixed_sampler_tables_are_rejected() {
        let descriptor = RootSignatureDescriptor::new().with_descriptor_table(vec![
            DescriptorRange::new(ResourceType::Texture2D, 0, "A", ShaderVisibility::Fragment),
            DescriptorRange::sampler(0, ShaderVisibility::Fragment),
        ]);
        assert!(resolve_descriptor_tables(&descriptor).is_err());
    }
}
