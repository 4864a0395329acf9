//! In-process gateway for transport and facade tests.
//!
//! Binds `127.0.0.1:0`, records every request it receives, and answers each
//! one with the same canned [`Reply`].

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use http_body_util::{BodyExt, Full};
use hyper::body::{Bytes, Incoming};
use hyper::header::HeaderMap;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use protocol::InstanceCredentials;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use crate::ClientConfig;

pub(crate) const PROXY_KEY: &str = "proxy-test-key";

/// Canned response served for every request.
#[derive(Debug, Clone)]
pub(crate) struct Reply {
    status: StatusCode,
    body: String,
    delay: Duration,
}

impl Reply {
    pub(crate) fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status: StatusCode::from_u16(status).unwrap(),
            body: body.into(),
            delay: Duration::ZERO,
        }
    }

    /// HTTP 200 with a JSON-RPC envelope around `result`.
    pub(crate) fn result(result: Value) -> Self {
        Self::new(
            200,
            json!({ "jsonrpc": "2.0", "id": "x", "result": result, "error": null }).to_string(),
        )
    }

    pub(crate) fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// One request as seen by the gateway.
#[derive(Debug, Clone)]
pub(crate) struct RecordedRequest {
    pub(crate) method: String,
    pub(crate) path: String,
    pub(crate) api_key: Option<String>,
    pub(crate) accept: Option<String>,
    pub(crate) content_type: Option<String>,
    pub(crate) body: Value,
}

struct GatewayState {
    reply: Reply,
    recorded: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl GatewayState {
    async fn handle(&self, req: Request<Incoming>) -> Response<Full<Bytes>> {
        let (parts, body) = req.into_parts();
        let raw = body
            .collect()
            .await
            .map(|collected| collected.to_bytes())
            .unwrap_or_default();

        self.recorded.lock().unwrap().push(RecordedRequest {
            method: parts.method.to_string(),
            path: parts.uri.path().to_owned(),
            api_key: header(&parts.headers, "x-api-key"),
            accept: header(&parts.headers, "accept"),
            content_type: header(&parts.headers, "content-type"),
            body: serde_json::from_slice(&raw).unwrap_or(Value::Null),
        });

        tokio::time::sleep(self.reply.delay).await;

        Response::builder()
            .status(self.reply.status)
            .header("content-type", "application/json")
            .body(Full::new(Bytes::from(self.reply.body.clone())))
            .unwrap()
    }
}

fn header(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
}

pub(crate) struct TestGateway {
    addr: SocketAddr,
    recorded: Arc<Mutex<Vec<RecordedRequest>>>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl TestGateway {
    pub(crate) async fn start(reply: Reply) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let recorded = Arc::new(Mutex::new(Vec::new()));
        let state = Arc::new(GatewayState {
            reply,
            recorded: Arc::clone(&recorded),
        });
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    accepted = listener.accept() => {
                        let Ok((stream, _)) = accepted else { continue };
                        let state = Arc::clone(&state);
                        tokio::spawn(async move {
                            let service = service_fn(move |req: Request<Incoming>| {
                                let state = Arc::clone(&state);
                                async move { Ok::<_, Infallible>(state.handle(req).await) }
                            });
                            let _ = http1::Builder::new()
                                .serve_connection(TokioIo::new(stream), service)
                                .await;
                        });
                    }
                    _ = &mut shutdown_rx => break,
                }
            }
        });

        Self {
            addr,
            recorded,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    pub(crate) fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Configuration pointing at this gateway.
    pub(crate) fn config(&self) -> ClientConfig {
        ClientConfig::new(instance(), PROXY_KEY).with_gateway_url(self.base_url())
    }

    pub(crate) fn requests(&self) -> Vec<RecordedRequest> {
        self.recorded.lock().unwrap().clone()
    }

    /// Body of the most recent request.
    pub(crate) fn last_body(&self) -> Value {
        self.requests()
            .last()
            .map(|r| r.body.clone())
            .expect("gateway received no request")
    }
}

impl Drop for TestGateway {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

pub(crate) fn instance() -> InstanceCredentials {
    InstanceCredentials::new("https://erp.example.com", 2, "prod", "backend-key")
}

/// A base URL nothing listens on.
pub(crate) async fn unreachable_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}
