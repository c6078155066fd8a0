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

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::message::{RemoteError, RpcError};

/// Outcome of a completed round trip, as delivered to an `act` handler.
///
/// Application errors raised by the responder arrive here as
/// [`ActResponse::Error`]; they are not failures of the call itself.
#[derive(Clone, Debug, PartialEq)]
pub enum ActResponse {
    /// The responder replied with a result. `Value::Null` for an empty reply.
    Result(Value),
    /// The responder replied with an error.
    Error(RemoteError),
}

impl ActResponse {
    /// Returns `true` if the responder replied with an error.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// Returns the result payload, if any.
    #[must_use]
    pub const fn result(&self) -> Option<&Value> {
        match self {
            Self::Result(value) => Some(value),
            Self::Error(_) => None,
        }
    }

    /// Returns the remote error, if any.
    #[must_use]
    pub const fn error(&self) -> Option<&RemoteError> {
        match self {
            Self::Result(_) => None,
            Self::Error(err) => Some(err),
        }
    }

    /// Converts into a standard `Result`.
    pub fn into_result(self) -> Result<Value, RemoteError> {
        match self {
            Self::Result(value) => Ok(value),
            Self::Error(err) => Err(err),
        }
    }

    /// Deserializes the result payload into `T`.
    ///
    /// The outer `Result` reports a payload that does not fit `T`; the inner
    /// one carries the remote outcome.
    ///
    /// # Errors
    ///
    /// [`RpcError::Decode`] if the result cannot be deserialized as `T`.
    pub fn decode<T: DeserializeOwned>(self) -> Result<Result<T, RemoteError>, RpcError> {
        match self {
            Self::Result(value) => serde_json::from_value(value)
                .map(Ok)
                .map_err(|e| RpcError::Decode(e.to_string())),
            Self::Error(err) => Ok(Err(err)),
        }
    }
}
