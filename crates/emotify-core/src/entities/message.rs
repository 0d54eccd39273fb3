//! Message entity - a single entry in a container's history

use serde::{Deserialize, Serialize};

use crate::value_objects::Snowflake;

/// Message entity
///
/// Only the id is needed to react; the rest of the payload is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: Snowflake,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<Snowflake>,
}

impl Message {
    /// Create a new Message
    pub fn new(id: Snowflake) -> Self {
        Self {
            id,
            channel_id: None,
        }
    }
}
