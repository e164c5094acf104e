/*
Dispatch Entities

The emergency push message sent to each nearby device, the per-recipient
outcome of sending it, and the aggregate returned to the reporter.
*/

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use thiserror::Error;

use super::emergency::EmergencyEvent;

pub const EMERGENCY_TITLE: &str = "🚨 EMERGENCY NEARBY";

/// Routing hint telling the mobile app to open its emergency screen.
pub const CLICK_ACTION: &str = "FLUTTER_NOTIFICATION_CLICK";

/// Per-recipient push failure. Recorded on that recipient's outcome only.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DispatchError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Push delivery timed out after {0:?}")]
    Timeout(Duration),

    #[error("Push service rejected the request with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Invalid push token: {0}")]
    InvalidToken(String),

    #[error("Dispatch abandoned: fan-out deadline elapsed")]
    Abandoned,
}

/// Delivery hints for the receiving platform.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlatformHints {
    pub sound: String,
    pub priority: String,
    pub android_channel_id: String,
    pub full_screen_intent: bool,
    pub android_notification_priority: String,
}

impl PlatformHints {
    /// Loud, full-screen, highest-priority delivery.
    pub fn emergency() -> Self {
        Self {
            sound: "emergency_alarm".to_string(),
            priority: "high".to_string(),
            android_channel_id: "emergency_fcm_channel".to_string(),
            full_screen_intent: true,
            android_notification_priority: "max".to_string(),
        }
    }
}

/// A push notification addressed to one device token.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PushMessage {
    pub token: String,
    pub title: String,
    pub body: String,
    pub data: BTreeMap<String, String>,
    pub hints: PlatformHints,
}

impl PushMessage {
    pub fn emergency(event: &EmergencyEvent, token: &str) -> Self {
        let mut data = BTreeMap::new();
        data.insert("emergency_id".to_string(), event.id.clone());
        data.insert("type".to_string(), event.kind.clone());
        data.insert("lat".to_string(), event.location.lat.to_string());
        data.insert("lng".to_string(), event.location.lng.to_string());
        data.insert("click_action".to_string(), CLICK_ACTION.to_string());

        Self {
            token: token.to_string(),
            title: EMERGENCY_TITLE.to_string(),
            body: format!("{} emergency within 500m! Tap to respond.", event.kind),
            data,
            hints: PlatformHints::emergency(),
        }
    }
}

/// Receipt returned by the push transport, kept verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeliveryReceipt(pub serde_json::Value);

/// Result of the single push attempt made for one recipient.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchOutcome {
    pub user_id: String,
    pub success: bool,
    pub error_detail: Option<String>,
    pub receipt: Option<DeliveryReceipt>,
}

impl DispatchOutcome {
    pub fn delivered(user_id: impl Into<String>, receipt: DeliveryReceipt) -> Self {
        Self {
            user_id: user_id.into(),
            success: true,
            error_detail: None,
            receipt: Some(receipt),
        }
    }

    pub fn failed(user_id: impl Into<String>, error: &DispatchError) -> Self {
        Self {
            user_id: user_id.into(),
            success: false,
            error_detail: Some(error.to_string()),
            receipt: None,
        }
    }

    pub fn from_result(user_id: impl Into<String>, result: Result<DeliveryReceipt, DispatchError>) -> Self {
        match result {
            Ok(receipt) => Self::delivered(user_id, receipt),
            Err(error) => Self::failed(user_id, &error),
        }
    }
}

/// Aggregate of one fan-out. Outcomes are in candidate order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FanoutResult {
    pub sent_count: usize,
    pub failed_count: usize,
    pub outcomes: Vec<DispatchOutcome>,
}

impl FanoutResult {
    pub fn from_outcomes(outcomes: Vec<DispatchOutcome>) -> Self {
        let sent_count = outcomes.iter().filter(|outcome| outcome.success).count();
        Self {
            sent_count,
            failed_count: outcomes.len() - sent_count,
            outcomes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::emergency::GeoPoint;

    fn event() -> EmergencyEvent {
        EmergencyEvent::new("em-42", "reporter", "Fire", GeoPoint { lat: 23.8103, lng: 90.4125 })
    }

    #[test]
    fn test_emergency_message_shape() {
        let message = PushMessage::emergency(&event(), "device-token");

        assert_eq!(message.token, "device-token");
        assert_eq!(message.title, EMERGENCY_TITLE);
        assert_eq!(message.body, "Fire emergency within 500m! Tap to respond.");
        assert_eq!(message.data["emergency_id"], "em-42");
        assert_eq!(message.data["type"], "Fire");
        assert_eq!(message.data["lat"], "23.8103");
        assert_eq!(message.data["lng"], "90.4125");
        assert_eq!(message.data["click_action"], CLICK_ACTION);
        assert!(message.hints.full_screen_intent);
    }

    #[test]
    fn test_counts_follow_outcomes() {
        let receipt = DeliveryReceipt(serde_json::json!({"success": 1}));
        let result = FanoutResult::from_outcomes(vec![
            DispatchOutcome::delivered("a", receipt.clone()),
            DispatchOutcome::failed("b", &DispatchError::InvalidToken("NotRegistered".to_string())),
            DispatchOutcome::delivered("c", receipt),
        ]);

        assert_eq!(result.sent_count, 2);
        assert_eq!(result.failed_count, 1);
        assert_eq!(
            result.outcomes[1].error_detail.as_deref(),
            Some("Invalid push token: NotRegistered")
        );
    }
}
