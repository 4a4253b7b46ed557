use std::collections::HashMap;
use std::sync::Arc;

use aws_config::BehaviorVersion;
use aws_sdk_lambda::primitives::Blob;
use aws_sdk_lambda::Client;
use clap::Parser;
use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tokio::time::Instant;

const COLORS: &[&str] = &[
    "red", "orange", "yellow", "green", "teal", "blue", "indigo", "violet", "black", "white",
];

#[derive(Default)]
struct Stats {
    success_count: usize,
    client_error_count: usize,
    error_count: usize,
    total_latency_ms: f64,
    submitted: HashMap<String, usize>,
}

/// The parts of an API Gateway proxy response we look at.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GatewayResponse {
    status_code: u16,
    #[serde(default)]
    body: Option<String>,
}

#[derive(Deserialize)]
struct StoredRecord {
    pk: String,
    colors: Vec<String>,
}

#[derive(Deserialize)]
struct SearchEnvelope {
    #[serde(default)]
    data: Vec<StoredRecord>,
}

#[derive(Parser, Debug)]
#[command(name = "invoke-test")]
#[command(about = "Invoke the color Lambda with concurrent random submissions")]
struct Args {
    /// Lambda function name
    function: String,

    /// Number of submissions to send
    #[arg(long, default_value = "1000")]
    iters: usize,

    /// Number of parallel tasks
    #[arg(long, default_value = "1")]
    threads: usize,

    /// Size of the name pool; small pools force same-name collisions
    #[arg(long, default_value = "5")]
    names: usize,

    /// Prefix for generated names, so runs do not mix with real data
    #[arg(long, default_value = "invoke-test")]
    prefix: String,

    /// After submitting, read every name back and compare color counts
    #[arg(long)]
    verify: bool,
}

fn gateway_event(method: &str, query: Value, body: Option<String>) -> Value {
    json!({
        "resource": "/colors",
        "path": "/colors",
        "httpMethod": method,
        "headers": {"content-type": "application/json"},
        "multiValueHeaders": {},
        "queryStringParameters": query,
        "multiValueQueryStringParameters": {},
        "pathParameters": {},
        "stageVariables": {},
        "requestContext": {
            "resourcePath": "/colors",
            "httpMethod": method,
            "path": "/colors",
            "stage": "test",
            "identity": {},
            "authorizer": {}
        },
        "body": body,
        "isBase64Encoded": false
    })
}

async fn invoke(client: &Client, function_name: &str, event: &Value) -> Result<GatewayResponse, String> {
    let payload = serde_json::to_vec(event).map_err(|e| e.to_string())?;
    let response = client
        .invoke()
        .function_name(function_name)
        .payload(Blob::new(payload))
        .send()
        .await
        .map_err(|e| e.to_string())?;

    let raw = response
        .payload()
        .map(|b| String::from_utf8_lossy(b.as_ref()).to_string())
        .unwrap_or_else(|| "No response".to_string());

    serde_json::from_str(&raw).map_err(|_| raw)
}

#[allow(clippy::too_many_arguments)]
async fn run_invocations(
    client: Arc<Client>,
    function_name: String,
    names: Arc<Vec<String>>,
    thread_id: usize,
    start: usize,
    end: usize,
    total: usize,
    stats: Arc<Mutex<Stats>>,
) {
    let mut rng = StdRng::from_entropy();

    for i in start..=end {
        let name = names[rng.gen_range(0..names.len())].clone();
        let color = COLORS.choose(&mut rng).copied().unwrap_or("blue");

        let body = json!({"name": name, "color": color}).to_string();
        let event = gateway_event("POST", Value::Null, Some(body));

        let started = Instant::now();
        let result = invoke(&client, &function_name, &event).await;
        let latency_ms = started.elapsed().as_secs_f64() * 1000.0;

        let mut stats = stats.lock().await;
        match result {
            Ok(response) if response.status_code == 201 => {
                stats.success_count += 1;
                stats.total_latency_ms += latency_ms;
                *stats.submitted.entry(name.clone()).or_default() += 1;
                println!(
                    "[Thread {}: {}/{}] {} likes {} => {} ({:.3}ms)",
                    thread_id, i, total, name, color, response.status_code, latency_ms
                );
            }
            Ok(response) if response.status_code < 500 => {
                stats.client_error_count += 1;
                println!(
                    "[Thread {}: {}/{}] {} likes {} => {} {}",
                    thread_id,
                    i,
                    total,
                    name,
                    color,
                    response.status_code,
                    response.body.unwrap_or_default()
                );
            }
            Ok(response) => {
                stats.error_count += 1;
                eprintln!(
                    "[Thread {}: {}/{}] {} likes {} => {}",
                    thread_id, i, total, name, color, response.status_code
                );
            }
            Err(e) => {
                stats.error_count += 1;
                eprintln!(
                    "[Thread {}: {}/{}] Error submitting {} for {}: {}",
                    thread_id, i, total, color, name, e
                );
            }
        }
    }
}

/// Reads each pooled name back and reports stored vs submitted color counts.
async fn verify(client: &Client, function_name: &str, names: &[String], submitted: &HashMap<String, usize>) {
    println!();
    println!("Verification:");
    let mut lost = 0;

    for name in names {
        let event = gateway_event("GET", json!({"name": name}), None);
        let response = match invoke(client, function_name, &event).await {
            Ok(response) if response.status_code == 200 => response,
            Ok(response) => {
                eprintln!("  {}: search returned {}", name, response.status_code);
                continue;
            }
            Err(e) => {
                eprintln!("  {}: search failed: {}", name, e);
                continue;
            }
        };

        let stored = response
            .body
            .as_deref()
            .and_then(|body| serde_json::from_str::<SearchEnvelope>(body).ok())
            .and_then(|envelope| envelope.data.into_iter().find(|r| &r.pk == name))
            .map(|record| record.colors.len())
            .unwrap_or(0);
        let sent = submitted.get(name).copied().unwrap_or(0);

        if stored < sent {
            lost += sent - stored;
        }
        println!("  {}: submitted {}, stored {}", name, sent, stored);
    }

    if lost > 0 {
        println!("  Lost updates: {}", lost);
    } else {
        println!("  No lost updates (counts include colors stored by earlier runs)");
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    let threads = args.threads.max(1);
    let names: Arc<Vec<String>> = Arc::new(
        (1..=args.names.max(1))
            .map(|i| format!("{}-{}", args.prefix, i))
            .collect(),
    );

    println!(
        "Running {} submissions across {} thread(s) for {} name(s)",
        args.iters,
        threads,
        names.len()
    );

    let config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let client = Arc::new(Client::new(&config));

    let stats = Arc::new(Mutex::new(Stats::default()));

    let iters_per_thread = args.iters / threads;
    let remainder = args.iters % threads;

    let mut tasks = JoinSet::new();

    let mut start = 1;
    for t in 1..=threads {
        let end = if t == threads {
            start + iters_per_thread - 1 + remainder
        } else {
            start + iters_per_thread - 1
        };
        if end < start {
            continue;
        }

        let client = Arc::clone(&client);
        let function_name = args.function.clone();
        let names = Arc::clone(&names);
        let stats = Arc::clone(&stats);
        let total = args.iters;

        tasks.spawn(async move {
            run_invocations(client, function_name, names, t, start, end, total, stats).await;
        });

        start = end + 1;
    }

    while let Some(result) = tasks.join_next().await {
        if let Err(e) = result {
            eprintln!("Task failed: {}", e);
        }
    }

    let stats = stats.lock().await;
    println!("Completed {} submissions", args.iters);
    println!();
    println!("Results:");
    println!("  Created:       {}", stats.success_count);
    println!("  Client errors: {}", stats.client_error_count);
    println!("  Errors:        {}", stats.error_count);
    if stats.success_count > 0 {
        let avg_latency = stats.total_latency_ms / stats.success_count as f64;
        println!("  Avg latency: {:.3}ms", avg_latency);
    }

    if args.verify {
        verify(&client, &args.function, &names, &stats.submitted).await;
    }
}
