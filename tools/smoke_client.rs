//! Smoke Test Client
//!
//! Posts a known-valid mushroom sample against a running service instance
//! and prints the verdict, for manual end-to-end checks.

use std::collections::HashMap;

use anyhow::{Context, Result};

/// A sample drawn from the training data's documentation.
const SAMPLE: [(&str, &str); 22] = [
    ("cap-shape", "x"),
    ("cap-surface", "s"),
    ("cap-color", "n"),
    ("bruises", "t"),
    ("odor", "p"),
    ("gill-attachment", "f"),
    ("gill-spacing", "c"),
    ("gill-size", "n"),
    ("gill-color", "k"),
    ("stalk-shape", "e"),
    ("stalk-root", "e"),
    ("stalk-surface-above-ring", "s"),
    ("stalk-surface-below-ring", "s"),
    ("stalk-color-above-ring", "w"),
    ("stalk-color-below-ring", "w"),
    ("veil-type", "p"),
    ("veil-color", "w"),
    ("ring-number", "o"),
    ("ring-type", "p"),
    ("spore-print-color", "k"),
    ("population", "s"),
    ("habitat", "u"),
];

#[tokio::main]
async fn main() -> Result<()> {
    let base_url = std::env::var("MUSHROOM_SERVICE_URL")
        .unwrap_or_else(|_| "http://127.0.0.1:8080".to_string());

    let form: HashMap<&str, &str> = SAMPLE.iter().copied().collect();

    let client = reqwest::Client::new();

    let health = client
        .get(format!("{base_url}/health"))
        .send()
        .await
        .context("Health check failed; is the service running?")?;
    println!("health: {}", health.status());

    let response = client
        .post(format!("{base_url}/predict"))
        .form(&form)
        .send()
        .await
        .context("Prediction request failed")?;

    let status = response.status();
    let body = response.text().await?;

    let verdict = if body.contains("Poisonous") {
        "Poisonous"
    } else if body.contains("Edible") {
        "Edible"
    } else {
        "<no verdict in response>"
    };

    println!("predict: {status} -> {verdict}");

    Ok(())
}
