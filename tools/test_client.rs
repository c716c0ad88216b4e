//! Test Prediction Client
//!
//! Sends a mix of valid and out-of-range prediction requests over NATS
//! request-reply and logs every reply.

use food_waste_prediction::producer::STATUS_HEADER;
use rand::Rng;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{info, warn};

/// Random request generator for testing
struct RequestGenerator {
    rng: rand::rngs::ThreadRng,
}

impl RequestGenerator {
    fn new() -> Self {
        Self {
            rng: rand::thread_rng(),
        }
    }

    /// All three estimates within bounds
    fn generate_valid(&mut self) -> Value {
        json!({
            "household_estimate": self.estimate(0.0..100.0),
            "retail_estimate": self.estimate(0.0..60.0),
            "food_service_estimate": self.estimate(0.0..50.0),
        })
    }

    /// At least one estimate out of bounds or missing
    fn generate_invalid(&mut self) -> Value {
        let mut request = self.generate_valid();
        let field = ["household_estimate", "retail_estimate", "food_service_estimate"]
            [self.rng.gen_range(0..3)];

        match self.rng.gen_range(0..3) {
            0 => request[field] = json!(self.estimate(100.1..500.0)),
            1 => request[field] = json!(-self.estimate(0.1..50.0)),
            _ => {
                if let Some(object) = request.as_object_mut() {
                    object.remove(field);
                }
            }
        }
        request
    }

    fn estimate(&mut self, range: std::ops::Range<f64>) -> f64 {
        (self.rng.gen_range(range) * 10.0).round() / 10.0
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("test_client=info".parse()?),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    let nats_url = args.get(1).map(|s| s.as_str()).unwrap_or("nats://localhost:4222");
    let count: u64 = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(20);
    let subject = args.get(3).map(|s| s.as_str()).unwrap_or("food_waste.predict");
    let invalid_rate: f64 = args.get(4).and_then(|s| s.parse().ok()).unwrap_or(0.2);

    info!(
        nats_url = %nats_url,
        subject = %subject,
        count = count,
        invalid_rate = invalid_rate,
        "Starting test prediction client"
    );

    let client = async_nats::connect(nats_url).await?;
    info!("Connected to NATS");

    let mut generator = RequestGenerator::new();
    let mut rng = rand::thread_rng();
    let mut by_status = [0u64; 3];

    for i in 0..count {
        let request = if rng.gen_bool(invalid_rate) {
            generator.generate_invalid()
        } else {
            generator.generate_valid()
        };

        let payload = serde_json::to_vec(&request)?;
        let reply = match tokio::time::timeout(
            Duration::from_secs(5),
            client.request(subject.to_string(), payload.into()),
        )
        .await
        {
            Ok(Ok(reply)) => reply,
            Ok(Err(e)) => {
                warn!(error = %e, "Request failed");
                continue;
            }
            Err(_) => {
                warn!("Request timed out");
                continue;
            }
        };

        let status = reply
            .headers
            .as_ref()
            .and_then(|h| h.get(STATUS_HEADER))
            .map(|v| v.as_str().to_string())
            .unwrap_or_else(|| "?".to_string());

        match status.as_str() {
            "200" => by_status[0] += 1,
            "422" => by_status[1] += 1,
            _ => by_status[2] += 1,
        }

        info!(
            n = i + 1,
            status = %status,
            request = %request,
            reply = %String::from_utf8_lossy(&reply.payload),
            "Reply received"
        );
    }

    info!(
        ok = by_status[0],
        rejected = by_status[1],
        other = by_status[2],
        "Completed"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use food_waste_prediction::validation::parse_request;

    #[test]
    fn test_generated_requests_match_their_kind() {
        let mut generator = RequestGenerator::new();
        for _ in 0..500 {
            assert!(parse_request(&generator.generate_valid()).is_ok());
            assert!(parse_request(&generator.generate_invalid()).is_err());
        }
    }
}
