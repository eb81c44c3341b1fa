//! Runs two overlapping searches against a local engine and a repeat of the
//! second one, showing supersession and the response cache.
//!
//! ```text
//! RUST_LOG=searchreq=debug cargo run --example search -- http://localhost:3002/api/as/v1/engines/docs search-key
//! ```

use searchreq::{DispatchOptions, Dispatcher, Envelope, TcpTransport};
use serde_json::json;
use tracing_subscriber::EnvFilter;

fn describe(label: &str, envelope: &Envelope) {
    match envelope.response.message() {
        Some(message) => println!("{label}: failed ({message})"),
        None => println!(
            "{label}: ok={} json={}",
            envelope.response.ok(),
            envelope.json.clone().unwrap_or_default()
        ),
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut args = std::env::args().skip(1);
    let endpoint = args
        .next()
        .unwrap_or_else(|| "http://localhost:3002/api/as/v1/engines/docs".to_owned());
    let key = args.next().unwrap_or_else(|| "search-key".to_owned());

    let dispatcher = Dispatcher::new(TcpTransport::new());

    let typing_params = json!({"query": "tok"});
    let typing = dispatcher.dispatch(
        &key,
        &endpoint,
        "/search",
        &typing_params,
        true,
        DispatchOptions::default(),
    );
    let settled = async {
        tokio::task::yield_now().await;
        dispatcher
            .dispatch(
                &key,
                &endpoint,
                "/search",
                &json!({"query": "tokio"}),
                true,
                DispatchOptions::default(),
            )
            .await
    };
    let (typing, settled) = tokio::join!(typing, settled);
    describe("\"tok\"", &typing);
    describe("\"tokio\"", &settled);

    let repeat = dispatcher
        .dispatch(
            &key,
            &endpoint,
            "/search",
            &json!({"query": "tokio"}),
            true,
            DispatchOptions::default(),
        )
        .await;
    describe("\"tokio\" again", &repeat);
    println!("cached entries: {}", dispatcher.cache().len());
}
