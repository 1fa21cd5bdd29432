//! JSON frame codec for the realtime channel.
//!
//! The service speaks Phoenix-style channels: every WebSocket text frame
//! is one [`Frame`] with a topic, an event name, a payload, and a client
//! reference. The codec is transport-independent; the socket handling
//! lives in the parent module.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use store::{ChangeEvent, Task};

/// Topic reserved for connection heartbeats.
pub const HEARTBEAT_TOPIC: &str = "phoenix";
/// Event name of row-change notifications.
pub const CHANGES_EVENT: &str = "postgres_changes";

/// One WebSocket text frame, in either direction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub topic: String,
    pub event: String,
    pub payload: Value,
    #[serde(rename = "ref")]
    pub reference: Option<String>,
}

/// Channel topic carrying one user's task-row changes.
pub fn tasks_topic(user_id: &str) -> String {
    format!("realtime:tasks:{user_id}")
}

impl Frame {
    /// Join frame subscribing to task-row changes for one user.
    pub fn join(topic: &str, user_id: &str, reference: u64) -> Frame {
        Frame {
            topic: topic.to_string(),
            event: "phx_join".to_string(),
            payload: json!({
                "config": {
                    "postgres_changes": [{
                        "event": "*",
                        "schema": "public",
                        "table": "tasks",
                        "filter": format!("user_id=eq.{user_id}"),
                    }],
                },
            }),
            reference: Some(reference.to_string()),
        }
    }

    pub fn heartbeat(reference: u64) -> Frame {
        Frame {
            topic: HEARTBEAT_TOPIC.to_string(),
            event: "heartbeat".to_string(),
            payload: json!({}),
            reference: Some(reference.to_string()),
        }
    }

    pub fn leave(topic: &str, reference: u64) -> Frame {
        Frame {
            topic: topic.to_string(),
            event: "phx_leave".to_string(),
            payload: json!({}),
            reference: Some(reference.to_string()),
        }
    }

    pub fn encode(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    pub fn decode(text: &str) -> Option<Frame> {
        serde_json::from_str(text).ok()
    }

    /// Decode a row-change frame into a [`ChangeEvent`]. `None` for
    /// everything else: join acks, heartbeat replies, presence noise.
    pub fn change_event(&self) -> Option<ChangeEvent> {
        if self.event != CHANGES_EVENT {
            return None;
        }
        change_from_data(self.payload.get("data")?)
    }
}

fn change_from_data(data: &Value) -> Option<ChangeEvent> {
    match data.get("type")?.as_str()? {
        "INSERT" => Some(ChangeEvent::Inserted {
            task: row(data.get("record")?)?,
        }),
        "UPDATE" => Some(ChangeEvent::Updated {
            task: row(data.get("record")?)?,
        }),
        // Delete notifications may carry only the replica identity
        // columns, so only the id is read.
        "DELETE" => Some(ChangeEvent::Deleted {
            id: data.get("old_record")?.get("id")?.as_str()?.to_string(),
        }),
        _ => None,
    }
}

fn row(value: &Value) -> Option<Task> {
    serde_json::from_value(value.clone()).ok()
}
