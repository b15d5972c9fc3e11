//! Client for the remote prediction-serving endpoint.
//!
//! Builds one typed request per call (model name, signature, single
//! named input), enforces the configured deadline, and decodes the
//! named output tensors into a label plus confidence scores. Stateless
//! per call aside from the transient connection.

use crate::config::{ConnectionConfig, ConnectionStrategy};
use crate::error::PredictionError;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

/// Signature every request names on the served model.
pub const SIGNATURE_NAME: &str = "predict";
/// Input tensor slot the payload binds to.
pub const INPUT_NAME: &str = "inputs";
/// Output tensor carrying the predicted class labels.
pub const CLASSES_OUTPUT: &str = "classes";
/// Output tensor carrying per-class confidence scores.
pub const PROBABILITIES_OUTPUT: &str = "probabilities";

/// The served model is a binary classifier.
pub const CLASS_COUNT: usize = 2;
/// Fixed contract with the serving model: index 0 scores the negative
/// class, index 1 the positive class. Never inferred dynamically.
pub const FALSE_CLASS_INDEX: usize = 0;
pub const TRUE_CLASS_INDEX: usize = 1;

/// Decoded serving response: predicted label plus one confidence score
/// per class.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    /// First entry of the classes output tensor.
    pub label: String,
    /// Per-class confidence scores, length [`CLASS_COUNT`].
    pub scores: Vec<f64>,
}

/// Seam between the batch scorer and the network: scoring logic is
/// exercised in tests with a stub implementation.
#[async_trait]
pub trait PredictService: Send + Sync {
    /// Issue one bounded-timeout prediction request for an encoded row.
    async fn predict(&self, payload: &str) -> Result<Prediction, PredictionError>;
}

#[derive(Debug, Serialize)]
struct PredictRequestBody<'a> {
    signature_name: &'static str,
    inputs: PredictInputs<'a>,
}

#[derive(Debug, Serialize)]
struct PredictInputs<'a> {
    /// Single string tensor holding one CSV-encoded row.
    inputs: [&'a str; 1],
}

impl<'a> PredictRequestBody<'a> {
    fn new(payload: &'a str) -> Self {
        Self {
            signature_name: SIGNATURE_NAME,
            inputs: PredictInputs { inputs: [payload] },
        }
    }
}

/// Client for one serving endpoint. Connection policy is explicit: a
/// fresh client per call, or one cached client under the reuse strategy.
pub struct PredictionClient {
    config: ConnectionConfig,
    /// Populated only under [`ConnectionStrategy::Reuse`].
    shared: Option<reqwest::Client>,
}

impl PredictionClient {
    pub fn new(config: ConnectionConfig) -> Result<Self, PredictionError> {
        let shared = match config.strategy {
            ConnectionStrategy::Reuse => Some(build_http_client(&config)?),
            ConnectionStrategy::PerCall => None,
        };
        Ok(Self { config, shared })
    }

    /// URL of the predict call on the named model.
    pub fn endpoint_url(&self) -> String {
        format!(
            "http://{}:{}/v1/models/{}:predict",
            self.config.host, self.config.port, self.config.server_name
        )
    }

    fn http_client(&self) -> Result<reqwest::Client, PredictionError> {
        match &self.shared {
            Some(client) => Ok(client.clone()),
            None => build_http_client(&self.config),
        }
    }

    /// Validate the class-ordering contract with one probe request: the
    /// model must answer with exactly [`CLASS_COUNT`] confidence scores
    /// and a non-empty classes tensor. Run before a batch row loop so a
    /// misconfigured model fails loudly instead of mis-scoring every row.
    pub async fn contract_check(&self, probe_payload: &str) -> Result<(), PredictionError> {
        let prediction = self.predict(probe_payload).await?;
        if prediction.scores.len() != CLASS_COUNT {
            return Err(PredictionError::Protocol(format!(
                "contract check: expected {CLASS_COUNT} confidence scores, got {}",
                prediction.scores.len()
            )));
        }
        info!(
            classes = CLASS_COUNT,
            label = %prediction.label,
            "serving contract check passed"
        );
        Ok(())
    }
}

#[async_trait]
impl PredictService for PredictionClient {
    async fn predict(&self, payload: &str) -> Result<Prediction, PredictionError> {
        let url = self.endpoint_url();
        debug!(url = %url, "sending prediction request");

        let response = self
            .http_client()?
            .post(&url)
            .json(&PredictRequestBody::new(payload))
            .send()
            .await
            .map_err(|e| classify_transport_error(e, self.config.timeout_secs))?;

        if !response.status().is_success() {
            return Err(PredictionError::Protocol(format!(
                "serving endpoint returned status {}",
                response.status()
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| PredictionError::Protocol(format!("invalid response body: {e}")))?;

        decode_response(&body, CLASS_COUNT)
    }
}

/// Single-prediction entry point consumed by the demo front-end.
pub async fn get_prediction(
    payload: &str,
    host: &str,
    port: u16,
    timeout_secs: f64,
    server_name: &str,
) -> Result<(String, Vec<f64>), PredictionError> {
    let config = ConnectionConfig {
        host: host.to_string(),
        port,
        server_name: server_name.to_string(),
        timeout_secs,
        strategy: ConnectionStrategy::PerCall,
    };
    let client = PredictionClient::new(config)?;
    let prediction = client.predict(payload).await?;
    Ok((prediction.label, prediction.scores))
}

fn build_http_client(config: &ConnectionConfig) -> Result<reqwest::Client, PredictionError> {
    reqwest::Client::builder()
        .timeout(config.timeout())
        .build()
        .map_err(|e| PredictionError::Connection(format!("failed to build http client: {e}")))
}

fn classify_transport_error(err: reqwest::Error, timeout_secs: f64) -> PredictionError {
    if err.is_timeout() {
        PredictionError::Timeout(timeout_secs)
    } else {
        PredictionError::Connection(err.to_string())
    }
}

/// Decode the named output tensors. Missing fields or wrong arity are
/// protocol errors, never silently defaulted.
fn decode_response(body: &Value, expected_classes: usize) -> Result<Prediction, PredictionError> {
    let outputs = body
        .get("outputs")
        .ok_or_else(|| PredictionError::Protocol("response missing outputs".to_string()))?;

    let classes = outputs
        .get(CLASSES_OUTPUT)
        .and_then(Value::as_array)
        .ok_or_else(|| {
            PredictionError::Protocol(format!("response missing {CLASSES_OUTPUT} tensor"))
        })?;

    let label = classes
        .first()
        .and_then(|v| match v {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .ok_or_else(|| {
            PredictionError::Protocol(format!("{CLASSES_OUTPUT} tensor is empty"))
        })?;

    let probabilities = outputs
        .get(PROBABILITIES_OUTPUT)
        .and_then(Value::as_array)
        .ok_or_else(|| {
            PredictionError::Protocol(format!("response missing {PROBABILITIES_OUTPUT} tensor"))
        })?;

    let scores: Vec<f64> = probabilities
        .iter()
        .map(|v| {
            v.as_f64().ok_or_else(|| {
                PredictionError::Protocol(format!("non-numeric value in {PROBABILITIES_OUTPUT}"))
            })
        })
        .collect::<Result<_, _>>()?;

    if scores.len() != expected_classes {
        return Err(PredictionError::Protocol(format!(
            "expected {expected_classes} confidence scores, got {}",
            scores.len()
        )));
    }

    Ok(Prediction { label, scores })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn ok_body() -> Value {
        json!({
            "outputs": {
                "classes": ["1"],
                "probabilities": [0.3, 0.7]
            }
        })
    }

    async fn mount_predict(server: &MockServer, template: ResponseTemplate) {
        Mock::given(method("POST"))
            .and(path("/v1/models/kfdemo:predict"))
            .and(body_partial_json(json!({ "signature_name": "predict" })))
            .respond_with(template)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_get_prediction_decodes_stub_response() {
        let server = MockServer::start().await;
        mount_predict(&server, ResponseTemplate::new(200).set_body_json(ok_body())).await;

        let addr = server.address();
        let (label, scores) = get_prediction(
            "1.0,2.0",
            &addr.ip().to_string(),
            addr.port(),
            5.0,
            "kfdemo",
        )
        .await
        .unwrap();

        assert_eq!(label, "1");
        assert_eq!(scores, vec![0.3, 0.7]);
    }

    #[tokio::test]
    async fn test_request_body_binds_single_input_slot() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/models/kfdemo:predict"))
            .and(body_partial_json(json!({
                "signature_name": "predict",
                "inputs": { "inputs": ["5,6"] }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(ok_body()))
            .expect(1)
            .mount(&server)
            .await;

        let addr = server.address();
        get_prediction("5,6", &addr.ip().to_string(), addr.port(), 5.0, "kfdemo")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_missing_probabilities_is_protocol_error() {
        let server = MockServer::start().await;
        mount_predict(
            &server,
            ResponseTemplate::new(200).set_body_json(json!({
                "outputs": { "classes": ["1"] }
            })),
        )
        .await;

        let addr = server.address();
        let err = get_prediction("1,2", &addr.ip().to_string(), addr.port(), 5.0, "kfdemo")
            .await
            .unwrap_err();
        assert!(matches!(err, PredictionError::Protocol(_)));
    }

    #[tokio::test]
    async fn test_wrong_score_arity_is_protocol_error() {
        let server = MockServer::start().await;
        mount_predict(
            &server,
            ResponseTemplate::new(200).set_body_json(json!({
                "outputs": { "classes": ["1"], "probabilities": [0.9] }
            })),
        )
        .await;

        let addr = server.address();
        let err = get_prediction("1,2", &addr.ip().to_string(), addr.port(), 5.0, "kfdemo")
            .await
            .unwrap_err();
        assert!(matches!(err, PredictionError::Protocol(_)));
    }

    #[tokio::test]
    async fn test_empty_classes_is_protocol_error() {
        let server = MockServer::start().await;
        mount_predict(
            &server,
            ResponseTemplate::new(200).set_body_json(json!({
                "outputs": { "classes": [], "probabilities": [0.3, 0.7] }
            })),
        )
        .await;

        let addr = server.address();
        let err = get_prediction("1,2", &addr.ip().to_string(), addr.port(), 5.0, "kfdemo")
            .await
            .unwrap_err();
        assert!(matches!(err, PredictionError::Protocol(_)));
    }

    #[tokio::test]
    async fn test_deadline_expiry_is_timeout_error() {
        let server = MockServer::start().await;
        mount_predict(
            &server,
            ResponseTemplate::new(200)
                .set_body_json(ok_body())
                .set_delay(Duration::from_millis(500)),
        )
        .await;

        let addr = server.address();
        let err = get_prediction("1,2", &addr.ip().to_string(), addr.port(), 0.05, "kfdemo")
            .await
            .unwrap_err();
        assert!(matches!(err, PredictionError::Timeout(_)));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_connection_error() {
        // Port 1 is never bound in the test environment.
        let err = get_prediction("1,2", "127.0.0.1", 1, 5.0, "kfdemo")
            .await
            .unwrap_err();
        assert!(matches!(err, PredictionError::Connection(_)));
    }

    #[tokio::test]
    async fn test_contract_check_passes_on_binary_response() {
        let server = MockServer::start().await;
        mount_predict(&server, ResponseTemplate::new(200).set_body_json(ok_body())).await;

        let addr = server.address();
        let client = PredictionClient::new(ConnectionConfig {
            host: addr.ip().to_string(),
            port: addr.port(),
            server_name: "kfdemo".to_string(),
            timeout_secs: 5.0,
            strategy: ConnectionStrategy::Reuse,
        })
        .unwrap();

        client.contract_check("1,2").await.unwrap();
    }

    #[test]
    fn test_numeric_class_labels_are_stringified() {
        let body = json!({
            "outputs": { "classes": [1], "probabilities": [0.6, 0.4] }
        });
        let prediction = decode_response(&body, 2).unwrap();
        assert_eq!(prediction.label, "1");
    }
}
