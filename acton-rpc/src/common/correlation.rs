/*
 * Copyright (c) 2024. Govcraft
 *
 * Licensed under either of
 *   * Apache License, Version 2.0 (the "License");
 *     you may not use this file except in compliance with the License.
 *     You may obtain a copy of the License at http://www.apache.org/licenses/LICENSE-2.0
 *   * MIT license: http://opensource.org/licenses/MIT
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the applicable License for the specific language governing permissions and
 * limitations under that License.
 */

//! Correlation identifier generation.

use mti::prelude::*;

/// Prefix of every correlation id minted by this crate.
pub const CORRELATION_PREFIX: &str = "req";

/// Generates a new correlation id.
///
/// Ids use the MTI format (`req_<uuid_v7>`): time-ordered, generated locally
/// with no coordination, and random enough that concurrent calls across
/// processes do not collide.
#[must_use]
pub fn next_id() -> String {
    CORRELATION_PREFIX.create_type_id::<V7>().to_string()
}
