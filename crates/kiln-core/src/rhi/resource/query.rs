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

//! Query pools.

use super::{impl_resource, NativeResource, ResourceCore};
use crate::kiln_bitflags;

/// What a query pool measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryType {
    /// Number of samples passing the depth and stencil tests.
    Occlusion,
    /// Pipeline statistics counters.
    PipelineStatistics,
    /// GPU timestamps.
    Timestamp,
}

kiln_bitflags! {
    /// Options of a `BeginQuery` command.
    pub struct QueryControlFlags: u32 {
        /// Occlusion queries must return exact sample counts.
        const PRECISE = 1 << 0;
    }
}

kiln_bitflags! {
    /// Options of a query result readback.
    pub struct QueryResultFlags: u32 {
        /// Block until the results are available.
        const WAIT = 1 << 0;
    }
}

/// A pool of queries of one type.
#[derive(Debug)]
pub struct QueryPool {
    core: ResourceCore,
    query_type: QueryType,
    number_of_queries: u32,
    native: Box<dyn NativeResource>,
}

impl QueryPool {
    /// Wraps a native query pool. Called by backends only.
    pub fn new(
        core: ResourceCore,
        query_type: QueryType,
        number_of_queries: u32,
        native: Box<dyn NativeResource>,
    ) -> Self {
        Self {
            core,
            query_type,
            number_of_queries,
            native,
        }
    }

    /// What the pool measures.
    pub fn query_type(&self) -> QueryType {
        self.query_type
    }

    /// Number of queries in the pool.
    pub fn number_of_queries(&self) -> u32 {
        self.number_of_queries
    }

    /// Whether `[first, first + count)` lies inside the pool.
    pub fn contains_range(&self, first_query_index: u32, number_of_queries: u32) -> bool {
        number_of_queries > 0
            && first_query_index
                .checked_add(number_of_queries)
                .is_some_and(|end| end <= self.number_of_queries)
    }

    /// The backend-private pool object.
    pub fn native(&self) -> &dyn NativeResource {
        self.native.as_ref()
    }
}

impl_resource!(QueryPool);
