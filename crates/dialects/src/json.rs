//! JSON dialect

use bytes::Bytes;
use contracts::{ContractError, Encoder, Event, Payload};

/// Serializes each event as a single-line JSON object
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonEncoder;

impl Encoder for JsonEncoder {
    fn name(&self) -> &str {
        "json"
    }

    fn extension(&self) -> &str {
        "json"
    }

    fn encode(&self, event: &Event) -> Result<Payload, ContractError> {
        serde_json::to_vec(event)
            .map(Bytes::from)
            .map_err(|e| ContractError::encode("json", e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn sample() -> Event {
        let at = Utc.with_ymd_and_hms(2016, 2, 5, 15, 5, 4).unwrap();
        let mut event = Event::new("a73b1c37", "ios", "s-1", 423432, "Client.CreateUser", at);
        event.parameters = Some(r#"{"a":1}"#.to_string());
        event
    }

    #[test]
    fn test_encode_is_single_line_and_parses_back() {
        let payload = JsonEncoder.encode(&sample()).unwrap();
        assert!(!payload.contains(&b'\n'));

        let decoded: Event = serde_json::from_slice(&payload).unwrap();
        assert_eq!(decoded, sample());
    }

    #[test]
    fn test_encode_is_deterministic() {
        let event = sample();
        assert_eq!(
            JsonEncoder.encode(&event).unwrap(),
            JsonEncoder.encode(&event).unwrap()
        );
    }
}
