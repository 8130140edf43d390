/*
 * Copyright 2020 Nikhil Marathe <nsm.nikhil@gmail.com>
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 *     http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

//! Longest job first.
//!
//! `make -j` starts independent prerequisites roughly in the order they are listed, so putting
//! the most expensive compiles first gets the long pole started early. Source size in bytes is
//! the cost estimate. It is a coarse one: macro expansion and template instantiation do not
//! show up in it.

use crate::ObjectTarget;
use makegen_metrics::scoped_metric;
use std::cmp::Reverse;

/// Sorts by source size, largest first. Equal sizes keep their relative order.
pub fn by_estimated_cost(mut objects: Vec<ObjectTarget>) -> Vec<ObjectTarget> {
    scoped_metric!("order");
    // sort_by_key is stable.
    objects.sort_by_key(|o| Reverse(o.source.size));
    objects
}
