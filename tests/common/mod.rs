#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};
use tokio::task::JoinHandle;
use url::Url;

use onchain_activity::activity::ActivityPipeline;
use onchain_activity::config::{AlchemyConfig, PipelineConfig};

/// Checksummed form of the queried wallet; the fake provider reports it lower-cased.
pub const ME: &str = "0xAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";
pub const ME_LOWER: &str = "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
pub const OTHER: &str = "0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb";

/// In-process stand-in for the Alchemy JSON-RPC endpoint.
#[derive(Default)]
pub struct FakeAlchemy {
    pub outbound_pages: Vec<Vec<Value>>,
    pub inbound_pages: Vec<Vec<Value>>,
    /// Lower-cased hash -> (gasUsed, effectiveGasPrice).
    pub receipts: HashMap<String, (String, String)>,
    pub outbound_status: Option<u16>,
    pub inbound_status: Option<u16>,
    pub rpc_error: Option<String>,
    pub endless_pages: bool,
    /// Receipt batch indices (0-based, in arrival order) that answer HTTP 500.
    pub failing_receipt_batches: Vec<usize>,
    /// Held before every transfer-listing answer.
    pub transfer_delay: Option<Duration>,
    /// Answer receipts without `transactionHash`, like some nodes do.
    pub omit_receipt_hash: bool,
    pub transfer_requests: Mutex<Vec<Value>>,
    pub receipt_batches: Mutex<Vec<Vec<String>>>,
    pub receipt_batch_counter: AtomicUsize,
}

impl FakeAlchemy {
    pub fn with_pages(outbound: Vec<Vec<Value>>, inbound: Vec<Vec<Value>>) -> Self {
        Self {
            outbound_pages: outbound,
            inbound_pages: inbound,
            ..Self::default()
        }
    }

    pub fn receipt(mut self, hash: &str, gas_used: &str, price: &str) -> Self {
        self.receipts.insert(
            hash.to_lowercase(),
            (gas_used.to_string(), price.to_string()),
        );
        self
    }

    pub fn requested_receipt_hashes(&self) -> Vec<String> {
        self.receipt_batches
            .lock()
            .unwrap()
            .iter()
            .flatten()
            .cloned()
            .collect()
    }

    fn asset_transfers(&self, call: Value) -> Response {
        let params = call["params"][0].clone();
        self.transfer_requests.lock().unwrap().push(params.clone());

        let outbound = params.get("fromAddress").is_some();
        let status = if outbound {
            self.outbound_status
        } else {
            self.inbound_status
        };
        if let Some(status) = status {
            let code = StatusCode::from_u16(status).unwrap();
            return (code, "upstream failure").into_response();
        }
        if let Some(message) = &self.rpc_error {
            return Json(json!({
                "jsonrpc": "2.0",
                "id": call["id"],
                "error": { "code": -32602, "message": message },
            }))
            .into_response();
        }
        if self.endless_pages {
            return Json(json!({
                "jsonrpc": "2.0",
                "id": call["id"],
                "result": { "transfers": [], "pageKey": "stuck" },
            }))
            .into_response();
        }

        let pages = if outbound {
            &self.outbound_pages
        } else {
            &self.inbound_pages
        };
        let index = params["pageKey"]
            .as_str()
            .and_then(|key| key.strip_prefix("page-"))
            .and_then(|n| n.parse::<usize>().ok())
            .unwrap_or(0);
        let transfers = pages.get(index).cloned().unwrap_or_default();

        let mut result = json!({ "transfers": transfers });
        if index + 1 < pages.len() {
            result["pageKey"] = json!(format!("page-{}", index + 1));
        }
        Json(json!({ "jsonrpc": "2.0", "id": call["id"], "result": result })).into_response()
    }

    fn receipt_batch(&self, calls: Vec<Value>) -> Response {
        let index = self.receipt_batch_counter.fetch_add(1, Ordering::SeqCst);
        let hashes: Vec<String> = calls
            .iter()
            .map(|c| c["params"][0].as_str().unwrap_or_default().to_string())
            .collect();
        self.receipt_batches.lock().unwrap().push(hashes);

        if self.failing_receipt_batches.contains(&index) {
            return (StatusCode::INTERNAL_SERVER_ERROR, "batch failure").into_response();
        }

        let results: Vec<Value> = calls
            .iter()
            .map(|call| {
                let hash = call["params"][0].as_str().unwrap_or_default();
                let result = match self.receipts.get(&hash.to_lowercase()) {
                    Some((gas_used, price)) => {
                        let mut receipt = json!({
                            "gasUsed": gas_used,
                            "effectiveGasPrice": price,
                            "status": "0x1",
                        });
                        if !self.omit_receipt_hash {
                            receipt["transactionHash"] = json!(hash);
                        }
                        receipt
                    }
                    None => Value::Null,
                };
                json!({ "jsonrpc": "2.0", "id": call["id"], "result": result })
            })
            .collect();
        Json(Value::Array(results)).into_response()
    }
}

async fn rpc(State(fake): State<Arc<FakeAlchemy>>, Json(body): Json<Value>) -> Response {
    match body {
        Value::Array(calls) => fake.receipt_batch(calls),
        call => {
            if let Some(delay) = fake.transfer_delay {
                tokio::time::sleep(delay).await;
            }
            fake.asset_transfers(call)
        }
    }
}

/// Serves `fake` on an ephemeral port; returns the JSON-RPC URL.
pub async fn spawn_fake(fake: FakeAlchemy) -> (Url, Arc<FakeAlchemy>, JoinHandle<()>) {
    let fake = Arc::new(fake);
    let app = Router::new()
        .route("/v2/:key", post(rpc))
        .with_state(fake.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    let server = axum::serve(listener, app);
    let handle = tokio::spawn(async move {
        let _ = server.await;
    });

    let url = Url::parse(&format!("http://{}/v2/test-key", addr)).unwrap();
    (url, fake, handle)
}

pub fn pipeline(rpc_url: Url, receipt_batch_size: usize, max_pages: u32) -> ActivityPipeline {
    pipeline_with_deadline(
        rpc_url,
        receipt_batch_size,
        max_pages,
        Some(Duration::from_secs(30)),
    )
}

pub fn pipeline_with_deadline(
    rpc_url: Url,
    receipt_batch_size: usize,
    max_pages: u32,
    deadline: Option<Duration>,
) -> ActivityPipeline {
    let alchemy = AlchemyConfig {
        rpc_url,
        page_size: 1000,
        max_pages,
        request_timeout: Duration::from_secs(5),
    };
    let config = PipelineConfig {
        receipt_batch_size,
        deadline,
    };
    ActivityPipeline::new(alchemy, config).unwrap()
}

/// Provider-shaped transfer record.
pub fn transfer(hash: &str, from: &str, to: &str, category: &str, value: Value, ts: &str) -> Value {
    let asset = if category == "external" { "ETH" } else { "TKN" };
    json!({
        "blockNum": "0x1",
        "uniqueId": format!("{}:{}", hash, category),
        "hash": hash,
        "from": from,
        "to": to,
        "value": value,
        "asset": asset,
        "category": category,
        "rawContract": { "value": null, "address": null, "decimal": null },
        "metadata": { "blockTimestamp": ts },
    })
}
