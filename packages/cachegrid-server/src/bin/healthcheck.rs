//! Container health probe.
//!
//! Issues PUT/GET/DELETE on a synthetic key and exits 0 iff all three
//! succeed; falls back to a plain `GET /health` check on any error. Exit
//! codes: 0 healthy, 1 unhealthy.

use std::env;
use std::time::Duration;

use serde_json::json;

fn base_url() -> String {
    let host = env::var("CACHEGRID_HOST").unwrap_or_else(|_| "localhost".to_string());
    let port = env::var("CACHEGRID_PORT").unwrap_or_else(|_| "8080".to_string());
    format!("http://{host}:{port}")
}

async fn basic_health_check(client: &reqwest::Client, base_url: &str) -> bool {
    match client.get(format!("{base_url}/health")).send().await {
        Ok(resp) if resp.status().is_success() => {
            println!("health check passed");
            true
        }
        Ok(resp) => {
            eprintln!("health check failed: HTTP {}", resp.status());
            false
        }
        Err(err) => {
            eprintln!("health check failed: {err}");
            false
        }
    }
}

async fn advanced_health_check(client: &reqwest::Client, base_url: &str) -> bool {
    let test_key = format!("healthcheck_{}", env::var("HOSTNAME").unwrap_or_default());
    let cache_url = format!("{base_url}/cache/{test_key}");
    let body = json!({ "probe": true });

    let set_result = client.put(&cache_url).json(&body).send().await;
    let Ok(set_resp) = set_result else {
        eprintln!("SET operation failed, falling back to basic check");
        return basic_health_check(client, base_url).await;
    };
    if !set_resp.status().is_success() {
        eprintln!("SET operation failed: HTTP {}", set_resp.status());
        return basic_health_check(client, base_url).await;
    }

    let get_result = client.get(&cache_url).send().await;
    let passed = match get_result {
        Ok(get_resp) if get_resp.status().is_success() => {
            match get_resp.json::<serde_json::Value>().await {
                Ok(data) => data["exists"].as_bool().unwrap_or(false) && data["hit"].as_bool().unwrap_or(false),
                Err(_) => false,
            }
        }
        _ => false,
    };

    let _ = client.delete(&cache_url).send().await;

    if passed {
        println!("advanced health check passed: cache operations working");
        true
    } else {
        eprintln!("GET operation returned unexpected data, falling back to basic check");
        basic_health_check(client, base_url).await
    }
}

#[tokio::main]
async fn main() {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()
        .expect("failed to build HTTP client");
    let base_url = base_url();

    let healthy = advanced_health_check(&client, &base_url).await;
    std::process::exit(if healthy { 0 } else { 1 });
}
