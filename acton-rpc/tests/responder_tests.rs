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

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use acton_rpc::prelude::*;
use serde_json::json;
use tokio::sync::{mpsc, Barrier};
use tracing::info;

use crate::setup::responders::{add_math_add, operand};
use crate::setup::{initialize_tracing, local_rpc};

mod setup;

/// Registers a `work` responder that counts the calls it serves.
async fn counting_responder(rpc: &Rpc, counter: Arc<AtomicUsize>) -> anyhow::Result<Subscription> {
    let subscription = rpc
        .add(Pattern::with_topic("work"), move |_pattern, reply| {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                reply.ok("done").await.expect("reply published");
            }
        })
        .await?;
    Ok(subscription)
}

#[tokio::test]
async fn test_add_without_topic_is_rejected() -> anyhow::Result<()> {
    initialize_tracing();
    let (transport, rpc) = local_rpc(Duration::from_millis(200))?;

    let result = rpc
        .add(Pattern::new().with("role", "math.add"), |_pattern, _reply| async {})
        .await;

    assert!(matches!(result, Err(RpcError::TopicRequired)));
    assert_eq!(transport.subscriber_count("math.add"), 0);
    Ok(())
}

#[tokio::test]
async fn test_subscription_handle_reports_topic() -> anyhow::Result<()> {
    initialize_tracing();
    let (transport, rpc) = local_rpc(Duration::from_millis(200))?;

    let subscription = add_math_add(&rpc).await?;
    assert_eq!(subscription.topic(), "math.add");
    assert_eq!(transport.subscriber_count("math.add"), 1);
    Ok(())
}

#[tokio::test]
async fn test_responders_on_one_topic_share_the_load() -> anyhow::Result<()> {
    initialize_tracing();
    let (_transport, rpc) = local_rpc(Duration::from_secs(2))?;
    let first = Arc::new(AtomicUsize::new(0));
    let second = Arc::new(AtomicUsize::new(0));
    let _first_subscription = counting_responder(&rpc, first.clone()).await?;
    let _second_subscription = counting_responder(&rpc, second.clone()).await?;

    for _ in 0..10 {
        let response = rpc.call(Envelope::request(Pattern::with_topic("work"))).await?;
        assert_eq!(response.into_result(), Ok(json!("done")));
    }

    info!(
        first = first.load(Ordering::SeqCst),
        second = second.load(Ordering::SeqCst),
        "Calls served"
    );
    assert_eq!(first.load(Ordering::SeqCst), 5);
    assert_eq!(second.load(Ordering::SeqCst), 5);
    Ok(())
}

#[tokio::test]
async fn test_undecodable_request_gets_decode_error_reply() -> anyhow::Result<()> {
    initialize_tracing();
    let (transport, rpc) = local_rpc(Duration::from_secs(2))?;
    let served = Arc::new(AtomicUsize::new(0));
    let _subscription = counting_responder(&rpc, served.clone()).await?;

    let reply_bytes = transport
        .request("work", b"{ not an envelope".to_vec(), Duration::from_secs(2))
        .await?;
    let reply = Envelope::from_bytes(&reply_bytes)?;

    let error = reply.error.expect("error reply");
    assert_eq!(error.name, DECODE_ERROR_NAME);
    assert_eq!(error.code, DECODE_ERROR_CODE);
    assert!(!error.message.is_empty());
    assert_eq!(reply.result, None);
    assert_eq!(reply.pattern, Pattern::with_topic("work"));
    assert_eq!(served.load(Ordering::SeqCst), 0);

    // The responder keeps serving well-formed calls.
    let response = rpc.call(Envelope::request(Pattern::with_topic("work"))).await?;
    assert_eq!(response.into_result(), Ok(json!("done")));
    assert_eq!(served.load(Ordering::SeqCst), 1);
    Ok(())
}

#[tokio::test]
async fn test_unsubscribed_responder_no_longer_answers() -> anyhow::Result<()> {
    initialize_tracing();
    let (transport, rpc) = local_rpc(Duration::from_millis(150))?;
    let subscription = add_math_add(&rpc).await?;

    let response = rpc
        .call(Envelope::request(
            Pattern::with_topic("math.add").with("a", 1).with("b", 2),
        ))
        .await?;
    assert_eq!(response.into_result(), Ok(json!(3)));

    subscription.unsubscribe().await?;
    assert_eq!(transport.subscriber_count("math.add"), 0);

    let result = rpc
        .act(Pattern::with_topic("math.add").with("a", 1).with("b", 2), |_| {})
        .await;
    assert_eq!(result, Err(RpcError::Timeout));
    Ok(())
}

#[tokio::test]
async fn test_unsubscribing_twice_fails() -> anyhow::Result<()> {
    initialize_tracing();
    let (_transport, rpc) = local_rpc(Duration::from_millis(150))?;
    let subscription = add_math_add(&rpc).await?;
    let copy = subscription.clone();

    subscription.unsubscribe().await?;
    let again = copy.unsubscribe().await;
    assert!(matches!(
        again,
        Err(RpcError::Transport(TransportError::UnknownSubscription(_)))
    ));
    Ok(())
}

#[tokio::test]
async fn test_calls_are_handled_concurrently() -> anyhow::Result<()> {
    initialize_tracing();
    let (_transport, rpc) = local_rpc(Duration::from_secs(2))?;
    let barrier = Arc::new(Barrier::new(2));
    let _subscription = rpc
        .add(Pattern::with_topic("rendezvous"), move |pattern, reply| {
            let barrier = barrier.clone();
            async move {
                // Both calls must be in flight at once to get past this point.
                barrier.wait().await;
                reply.ok(&operand(&pattern, "n")).await.expect("reply published");
            }
        })
        .await?;

    let (left, right) = tokio::join!(
        rpc.call(Envelope::request(Pattern::with_topic("rendezvous").with("n", 1))),
        rpc.call(Envelope::request(Pattern::with_topic("rendezvous").with("n", 2))),
    );

    assert_eq!(left?.into_result(), Ok(json!(1)));
    assert_eq!(right?.into_result(), Ok(json!(2)));
    Ok(())
}

#[tokio::test]
async fn test_reply_without_reply_address_is_reported() -> anyhow::Result<()> {
    initialize_tracing();
    let (transport, rpc) = local_rpc(Duration::from_secs(2))?;
    let (tx, mut rx) = mpsc::unbounded_channel();
    let _subscription = rpc
        .add(Pattern::with_topic("fire.and.forget"), move |_pattern, reply| {
            let tx = tx.clone();
            async move {
                let _ = tx.send(reply.ok("ignored").await);
            }
        })
        .await?;

    let envelope = Envelope::request(Pattern::with_topic("fire.and.forget"));
    transport
        .publish("fire.and.forget", envelope.to_bytes()?)
        .await?;

    let sent = tokio::time::timeout(Duration::from_secs(1), rx.recv())
        .await?
        .expect("responder ran");
    assert_eq!(sent, Err(RpcError::MissingReplyAddress));
    Ok(())
}

#[tokio::test]
async fn test_responder_that_never_replies_leaves_caller_to_time_out() -> anyhow::Result<()> {
    initialize_tracing();
    let (_transport, rpc) = local_rpc(Duration::from_millis(150))?;
    let _subscription = rpc
        .add(Pattern::with_topic("black.hole"), |_pattern, reply| async move {
            drop(reply);
        })
        .await?;

    let result = rpc
        .call(Envelope::request(Pattern::with_topic("black.hole")))
        .await;
    assert_eq!(result, Err(RpcError::Timeout));
    Ok(())
}

#[tokio::test]
async fn test_responder_sees_full_pattern() -> anyhow::Result<()> {
    initialize_tracing();
    let (_transport, rpc) = local_rpc(Duration::from_secs(2))?;
    let _subscription = rpc
        .add(Pattern::with_topic("reflect"), |pattern, reply| async move {
            reply.ok(&pattern).await.expect("reply published");
        })
        .await?;

    let pattern = Pattern::with_topic("reflect")
        .with("cmd", "sum")
        .with("values", json!([1, 2, 3]));
    let response = rpc.call(Envelope::request(pattern.clone())).await?;
    assert_eq!(
        response.into_result(),
        Ok(json!({ "topic": "reflect", "cmd": "sum", "values": [1, 2, 3] }))
    );
    Ok(())
}
