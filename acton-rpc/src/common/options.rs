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

//! Construction-time options for [`Rpc`](crate::common::Rpc).

use std::time::Duration;

use crate::common::config::{RpcConfig, DEFAULT_ACT_TIMEOUT_MS};
use crate::message::RpcError;

/// Options an [`Rpc`](crate::common::Rpc) instance runs with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcOptions {
    /// How long `act` waits for a reply.
    pub timeout: Duration,
}

impl Default for RpcOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(DEFAULT_ACT_TIMEOUT_MS),
        }
    }
}

impl From<&RpcConfig> for RpcOptions {
    fn from(config: &RpcConfig) -> Self {
        Self {
            timeout: config.act_timeout(),
        }
    }
}

/// A function that adjusts [`RpcOptions`], possibly rejecting its input.
pub type RpcOption = Box<dyn FnOnce(&mut RpcOptions) -> Result<(), RpcError> + Send>;

/// Sets the `act` timeout.
///
/// Rejected with [`RpcError::InvalidOption`] if `duration` is zero.
#[must_use]
pub fn timeout(duration: Duration) -> RpcOption {
    Box::new(move |options: &mut RpcOptions| {
        if duration.is_zero() {
            return Err(RpcError::InvalidOption(
                "timeout must be greater than zero".to_string(),
            ));
        }
        options.timeout = duration;
        Ok(())
    })
}

impl RpcOptions {
    /// Applies `options` in order, stopping at the first rejection.
    ///
    /// # Errors
    ///
    /// The first error returned by an option.
    pub fn apply(mut self, options: impl IntoIterator<Item = RpcOption>) -> Result<Self, RpcError> {
        for option in options {
            option(&mut self)?;
        }
        Ok(self)
    }
}
