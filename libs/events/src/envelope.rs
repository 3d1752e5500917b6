//! Push-channel payloads and their envelope.

use chrono::{DateTime, Utc};
use relief_id::CampId;
use serde::{Deserialize, Serialize};

use crate::{EventError, Severity};

/// Channel names as they appear in [`PushFrame::channel`].
pub mod channels {
    pub const BROADCAST_ALERT: &str = "broadcast-alert";
    pub const INVENTORY_ALERT: &str = "inventory-alert";
}

/// An operator broadcast. Exists only while it is being delivered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertEvent {
    pub message: String,
    pub severity: Severity,
    pub timestamp: DateTime<Utc>,
}

impl AlertEvent {
    /// Stamps a new alert with the current time.
    pub fn now(message: impl Into<String>, severity: Severity) -> Self {
        Self {
            message: message.into(),
            severity,
            timestamp: Utc::now(),
        }
    }
}

/// A field-reported inventory change, relayed as information only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryNotice {
    pub camp_id: CampId,
    pub message: String,
}

impl InventoryNotice {
    /// Builds the relay text for a change of `item` at `camp_name`.
    pub fn item_changed(camp_id: CampId, camp_name: &str, item: &str) -> Self {
        Self {
            camp_id,
            message: format!("Alert: {item} level changed at {camp_name}"),
        }
    }
}

/// Envelope written to listeners: `{"channel": "...", "data": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "channel", content = "data", rename_all = "kebab-case")]
pub enum PushFrame {
    BroadcastAlert(AlertEvent),
    InventoryAlert(InventoryNotice),
}

impl PushFrame {
    pub fn channel(&self) -> &'static str {
        match self {
            Self::BroadcastAlert(_) => channels::BROADCAST_ALERT,
            Self::InventoryAlert(_) => channels::INVENTORY_ALERT,
        }
    }

    pub fn to_json(&self) -> Result<String, EventError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Frames a listener may send on the push channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientFrame {
    /// A field agent changed stock at a camp; tell everyone else.
    UpdateInventory {
        camp_id: CampId,
        camp_name: String,
        item: String,
    },
}

impl ClientFrame {
    pub fn from_json(text: &str) -> Result<Self, EventError> {
        Ok(serde_json::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_broadcast_frame_shape() {
        let frame = PushFrame::BroadcastAlert(AlertEvent::now("Flood", Severity::Critical));
        let value: serde_json::Value = serde_json::from_str(&frame.to_json().unwrap()).unwrap();

        assert_eq!(value["channel"], channels::BROADCAST_ALERT);
        assert_eq!(value["data"]["message"], "Flood");
        assert_eq!(value["data"]["severity"], "critical");
        assert!(value["data"]["timestamp"].is_string());
    }

    #[test]
    fn test_inventory_notice_message() {
        let camp_id = CampId::new();
        let notice = InventoryNotice::item_changed(camp_id, "Relief Camp A", "Water");
        assert_eq!(notice.message, "Alert: Water level changed at Relief Camp A");

        let frame = PushFrame::InventoryAlert(notice);
        assert_eq!(frame.channel(), channels::INVENTORY_ALERT);
        let value: serde_json::Value = serde_json::from_str(&frame.to_json().unwrap()).unwrap();
        assert_eq!(value["data"]["camp_id"], camp_id.to_string());
    }

    #[test]
    fn test_client_frame_parse() {
        let camp_id = CampId::new();
        let text = format!(
            r#"{{"type":"update-inventory","camp_id":"{camp_id}","camp_name":"Camp B","item":"Blankets"}}"#
        );
        let frame = ClientFrame::from_json(&text).unwrap();
        assert_eq!(
            frame,
            ClientFrame::UpdateInventory {
                camp_id,
                camp_name: "Camp B".to_string(),
                item: "Blankets".to_string(),
            }
        );
    }

    #[test]
    fn test_client_frame_rejects_unknown_type() {
        let err = ClientFrame::from_json(r#"{"type":"delete-camp"}"#).unwrap_err();
        assert!(matches!(err, EventError::InvalidFrame(_)));
    }
}
