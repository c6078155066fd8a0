//! Provides the RPC runtime components.
//!
//! # Key Re-exported Components:
//!
//! *   [`Rpc`]: Registers responders (`add`) and issues calls (`act`, `call`).
//! *   [`Subscription`]: Handle to a registered responder.
//! *   [`LocalTransport`]: In-process implementation of the
//!     [`Transport`](crate::traits::Transport) trait.
//! *   [`RpcOptions`], [`RpcOption`], [`timeout`]: Construction-time options.
//! *   [`RpcConfig`]: File-based configuration defaults.

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
pub use config::{RpcConfig, TimeoutConfig, CONFIG, DEFAULT_ACT_TIMEOUT_MS};
pub use local_transport::{LocalTransport, LocalTransportStats, INBOX_PREFIX};
pub use options::{timeout, RpcOption, RpcOptions};
pub use rpc::{Rpc, DECODE_ERROR_CODE, DECODE_ERROR_NAME};
pub use subscription::Subscription;
pub use types::*;

// --- Submodules ---

/// Defines common type aliases.
mod types;

/// Correlation id generation.
pub mod correlation;
/// Defines [`RpcConfig`].
mod config;
/// Defines [`LocalTransport`].
mod local_transport;
/// Defines [`RpcOptions`] and the functional options.
mod options;
/// Defines [`Rpc`].
mod rpc;
/// Defines [`Subscription`].
mod subscription;
