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

use acton_rpc::prelude::*;
use tracing::info;

/// Reads an integer operand from a pattern, defaulting to zero.
pub fn operand(pattern: &Pattern, key: &str) -> i64 {
    pattern.get(key).and_then(serde_json::Value::as_i64).unwrap_or_default()
}

/// Registers a `math.add` responder replying `a + b`.
pub async fn add_math_add(rpc: &Rpc) -> anyhow::Result<Subscription> {
    let subscription = rpc
        .add(Pattern::with_topic("math.add"), |pattern, reply| async move {
            let sum = operand(&pattern, "a") + operand(&pattern, "b");
            info!(sum, "math.add");
            reply.ok(&sum).await.expect("reply published");
        })
        .await?;
    Ok(subscription)
}

/// Registers a `math.div` responder replying `a / b`, or a `DivByZero`
/// error when `b == 0`.
pub async fn add_math_div(rpc: &Rpc) -> anyhow::Result<Subscription> {
    let subscription = rpc
        .add(Pattern::with_topic("math.div"), |pattern, reply| async move {
            let a = operand(&pattern, "a");
            let b = operand(&pattern, "b");
            if b == 0 {
                reply
                    .error(RemoteError::new("DivByZero", "b=0", 400))
                    .await
                    .expect("reply published");
            } else {
                reply.ok(&(a / b)).await.expect("reply published");
            }
        })
        .await?;
    Ok(subscription)
}
