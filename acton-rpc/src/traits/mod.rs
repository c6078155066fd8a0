//! Defines the seams the RPC layer is written against.
//!
//! # Key Traits
//!
//! *   [`Transport`]: The publish-subscribe capability (publish, queue-group
//!     subscribe, timeout-bounded request) consumed by
//!     [`Rpc`](crate::common::Rpc). [`LocalTransport`](crate::common::LocalTransport)
//!     is the in-process implementation.

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

// --- Public Re-exports ---
pub use transport::{Transport, TransportError};

// --- Submodules ---

/// Defines the [`Transport`] trait and [`TransportError`].
mod transport;
