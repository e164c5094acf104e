/*
FCM Push Adapter

Implements the push delivery port over the Firebase Cloud Messaging legacy HTTP
API. One POST per message, authorized with the server key; the JSON receipt is
returned verbatim so callers can surface it.

FCM answers 200 even for dead tokens and reports them per result, so a receipt
with `failure > 0` is treated as an invalid-token failure.
*/

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

use crate::application::ports::output::push_delivery_port::{
    DeliveryReceipt, DispatchError, PushDeliveryPort, PushMessage,
};

pub const FCM_SEND_ENDPOINT: &str = "https://fcm.googleapis.com/fcm/send";

/// Configuration for the FCM adapter
#[derive(Debug, Clone)]
pub struct FcmConfig {
    pub endpoint: String,
    pub server_key: String,
    pub timeout: Duration,
}

impl FcmConfig {
    pub fn new(server_key: impl Into<String>) -> Self {
        Self {
            endpoint: FCM_SEND_ENDPOINT.to_string(),
            server_key: server_key.into(),
            timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Serialize)]
struct FcmRequest<'a> {
    to: &'a str,
    notification: FcmNotification<'a>,
    data: &'a BTreeMap<String, String>,
    android: FcmAndroidConfig<'a>,
}

#[derive(Debug, Serialize)]
struct FcmNotification<'a> {
    title: &'a str,
    body: &'a str,
    sound: &'a str,
    priority: &'a str,
}

#[derive(Debug, Serialize)]
struct FcmAndroidConfig<'a> {
    priority: &'a str,
    notification: FcmAndroidNotification<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FcmAndroidNotification<'a> {
    channel_id: &'a str,
    full_screen_intent: bool,
    priority: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct FcmReceiptSummary {
    #[serde(default)]
    failure: u64,
    #[serde(default)]
    results: Vec<FcmMessageResult>,
}

#[derive(Debug, Deserialize)]
struct FcmMessageResult {
    error: Option<String>,
}

pub struct FcmPushAdapter {
    client: Client,
    config: FcmConfig,
}

impl FcmPushAdapter {
    pub fn new(config: FcmConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    fn build_request<'a>(&self, message: &'a PushMessage) -> FcmRequest<'a> {
        let hints = &message.hints;
        FcmRequest {
            to: &message.token,
            notification: FcmNotification {
                title: &message.title,
                body: &message.body,
                sound: &hints.sound,
                priority: &hints.priority,
            },
            data: &message.data,
            android: FcmAndroidConfig {
                priority: &hints.priority,
                notification: FcmAndroidNotification {
                    channel_id: &hints.android_channel_id,
                    full_screen_intent: hints.full_screen_intent,
                    priority: &hints.android_notification_priority,
                },
            },
        }
    }

    fn transport_error(&self, error: reqwest::Error) -> DispatchError {
        if error.is_timeout() {
            DispatchError::Timeout(self.config.timeout)
        } else {
            DispatchError::Transport(error.to_string())
        }
    }
}

/// The per-result error of a receipt that reports a failed delivery.
fn rejected_token(receipt: &serde_json::Value) -> Option<String> {
    let summary: FcmReceiptSummary = serde_json::from_value(receipt.clone()).unwrap_or_default();
    if summary.failure == 0 {
        return None;
    }
    let reason = summary
        .results
        .into_iter()
        .find_map(|result| result.error)
        .unwrap_or_else(|| "delivery reported as failed".to_string());
    Some(reason)
}

#[async_trait]
impl PushDeliveryPort for FcmPushAdapter {
    async fn send(&self, message: &PushMessage) -> Result<DeliveryReceipt, DispatchError> {
        let response = self
            .client
            .post(&self.config.endpoint)
            .header(AUTHORIZATION, format!("key={}", self.config.server_key))
            .json(&self.build_request(message))
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| self.transport_error(e))?;

        if !status.is_success() {
            return Err(DispatchError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let receipt: serde_json::Value = serde_json::from_str(&body)
            .map_err(|e| DispatchError::Transport(format!("Unreadable FCM receipt: {}", e)))?;

        if let Some(reason) = rejected_token(&receipt) {
            return Err(DispatchError::InvalidToken(reason));
        }

        Ok(DeliveryReceipt(receipt))
    }
}
