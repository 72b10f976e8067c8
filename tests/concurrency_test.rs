use async_trait::async_trait;
use nodekit::error::NodeError;
use nodekit::runtime::capability::{BlockingHandler, CapabilityDescriptor, CapabilityHandler};
use nodekit::runtime::context::ExecutionContext;
use nodekit::runtime::node::ModelNode;
use nodekit::runtime::registry::CapabilityRegistry;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Debug)]
struct SlowHandler;

#[async_trait]
impl CapabilityHandler for SlowHandler {
    async fn handle(&self, ctx: &ExecutionContext) -> Result<Value, NodeError> {
        // Suspends mid-execution; other requests must keep moving.
        tokio::time::sleep(Duration::from_millis(100)).await;
        Ok(json!({ "request": ctx.request_id }))
    }
}

struct TestNode {
    metadata: Value,
    registry: CapabilityRegistry,
}

#[async_trait]
impl ModelNode for TestNode {
    fn metadata(&self) -> &Value {
        &self.metadata
    }

    fn registry(&self) -> &CapabilityRegistry {
        &self.registry
    }
}

fn test_metadata() -> Value {
    json!({
        "model_id": "concurrent-node",
        "name": "Concurrent Node",
        "version": "0.1.0",
        "capabilities": ["slow", "blocking"],
        "endpoints": { "execute": "/execute" },
        "cost_per_call": 0.0
    })
}

fn build_node() -> Arc<TestNode> {
    let mut registry = CapabilityRegistry::new();
    registry
        .register(CapabilityDescriptor::new("slow"), Arc::new(SlowHandler))
        .expect("registration failed");
    registry
        .register(
            CapabilityDescriptor::new("blocking"),
            Arc::new(BlockingHandler::new(|ctx: &ExecutionContext| {
                std::thread::sleep(Duration::from_millis(100));
                Ok(json!({ "request": ctx.request_id }))
            })),
        )
        .expect("registration failed");

    Arc::new(TestNode {
        metadata: test_metadata(),
        registry,
    })
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_requests_complete_independently() {
    let node = build_node();
    let start = Instant::now();

    let mut handles = Vec::new();
    for i in 0..8 {
        let node = node.clone();
        handles.push(tokio::spawn(async move {
            let ctx = ExecutionContext::new("slow", json!({ "i": i }))
                .with_request_id(format!("r-{}", i));
            (i, node.execute(ctx).await)
        }));
    }

    for handle in handles {
        let (i, response) = handle.await.expect("task panicked");
        assert!(response.success, "request {} failed: {:?}", i, response.error);
        // Each request sees its own id, no cross-request interference
        assert_eq!(response.data, Some(json!({ "request": format!("r-{}", i) })));
    }

    // 8 requests at 100ms each: serial would take ~800ms
    let elapsed = start.elapsed();
    assert!(
        elapsed < Duration::from_millis(500),
        "requests were serialized: {:?}",
        elapsed
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_blocking_handler_does_not_stall_others() {
    let node = build_node();

    // Kick off a blocking request, then run an async one while it sleeps.
    let blocking = {
        let node = node.clone();
        tokio::spawn(async move {
            node.execute(ExecutionContext::new("blocking", json!({})).with_request_id("b-1"))
                .await
        })
    };

    let start = Instant::now();
    let fast = node
        .execute(ExecutionContext::new("slow", json!({})).with_request_id("f-1"))
        .await;
    assert!(fast.success);
    assert!(
        start.elapsed() < Duration::from_millis(200),
        "async request stalled behind blocking handler"
    );

    let blocked = blocking.await.expect("task panicked");
    assert!(blocked.success);
    assert_eq!(blocked.data, Some(json!({ "request": "b-1" })));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_blocking_requests() {
    let node = build_node();
    let start = Instant::now();

    let mut handles = Vec::new();
    for i in 0..4 {
        let node = node.clone();
        handles.push(tokio::spawn(async move {
            let ctx = ExecutionContext::new("blocking", json!({}))
                .with_request_id(format!("b-{}", i));
            (i, node.execute(ctx).await)
        }));
    }

    for handle in handles {
        let (i, response) = handle.await.expect("task panicked");
        assert!(response.success);
        assert_eq!(response.data, Some(json!({ "request": format!("b-{}", i) })));
    }

    let elapsed = start.elapsed();
    assert!(
        elapsed < Duration::from_millis(350),
        "blocking requests were serialized: {:?}",
        elapsed
    );
}
