//! Event - ingestion output
//!
//! One analytics record as reported by a client application.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Analytics event
///
/// Opaque to the dispatch core: only encoders look inside.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Hashed device identifier
    pub device_id: String,

    /// Client (application) identifier
    pub client_id: String,

    /// Session identifier
    pub session: String,

    /// Sequence number within the session
    pub nr: u64,

    /// Operating system version
    #[serde(default)]
    pub system_version: String,

    /// Application version
    #[serde(default)]
    pub product_version: String,

    /// Time the event happened on the client
    pub at: DateTime<Utc>,

    /// Event name
    pub event: String,

    /// Operating system name
    #[serde(default)]
    pub system: String,

    /// Application build hash
    #[serde(default)]
    pub product_git_hash: String,

    /// Optional user identifier
    #[serde(default)]
    pub user_id: Option<String>,

    /// Remote address the event was received from
    #[serde(default)]
    pub ip: String,

    /// Free-form parameters (JSON text)
    #[serde(default)]
    pub parameters: Option<String>,

    /// Marks events produced by test builds
    #[serde(default)]
    pub is_testing: bool,
}

impl Event {
    /// Create an event with the identifying fields set and the rest empty
    pub fn new(
        device_id: impl Into<String>,
        client_id: impl Into<String>,
        session: impl Into<String>,
        nr: u64,
        event: impl Into<String>,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            device_id: device_id.into(),
            client_id: client_id.into(),
            session: session.into(),
            nr,
            system_version: String::new(),
            product_version: String::new(),
            at,
            event: event.into(),
            system: String::new(),
            product_git_hash: String::new(),
            user_id: None,
            ip: String::new(),
            parameters: None,
            is_testing: false,
        }
    }
}
