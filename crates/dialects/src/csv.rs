//! CSV dialect
//!
//! Column order is fixed by [`CSV_COLUMNS`]. Fields containing a comma,
//! quote or line break are quoted, with embedded quotes doubled.

use chrono::SecondsFormat;
use contracts::{ContractError, Encoder, Event, Payload};

/// Column order of an encoded row
pub const CSV_COLUMNS: [&str; 14] = [
    "device_id",
    "client_id",
    "session",
    "nr",
    "system_version",
    "product_version",
    "at",
    "event",
    "system",
    "product_git_hash",
    "user_id",
    "ip",
    "parameters",
    "is_testing",
];

/// Serializes each event as one CSV row without a trailing newline
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvEncoder;

impl CsvEncoder {
    /// Header row matching the encoded column order
    pub fn header() -> String {
        CSV_COLUMNS.join(",")
    }

    fn push_field(row: &mut String, value: &str) {
        if !row.is_empty() {
            row.push(',');
        }
        if value.contains([',', '"', '\n', '\r']) {
            row.push('"');
            row.push_str(&value.replace('"', "\"\""));
            row.push('"');
        } else {
            row.push_str(value);
        }
    }
}

impl Encoder for CsvEncoder {
    fn name(&self) -> &str {
        "csv"
    }

    fn extension(&self) -> &str {
        "csv"
    }

    fn encode(&self, event: &Event) -> Result<Payload, ContractError> {
        if event.device_id.is_empty() {
            return Err(ContractError::encode("csv", "device_id is empty"));
        }

        let nr = event.nr.to_string();
        let at = event.at.to_rfc3339_opts(SecondsFormat::Secs, true);
        let is_testing = event.is_testing.to_string();
        let fields = [
            event.device_id.as_str(),
            event.client_id.as_str(),
            event.session.as_str(),
            nr.as_str(),
            event.system_version.as_str(),
            event.product_version.as_str(),
            at.as_str(),
            event.event.as_str(),
            event.system.as_str(),
            event.product_git_hash.as_str(),
            event.user_id.as_deref().unwrap_or(""),
            event.ip.as_str(),
            event.parameters.as_deref().unwrap_or(""),
            is_testing.as_str(),
        ];

        let mut row = String::new();
        for field in fields {
            Self::push_field(&mut row, field);
        }
        Ok(Payload::from(row))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn sample() -> Event {
        let at = Utc.with_ymd_and_hms(2016, 2, 5, 15, 5, 4).unwrap();
        Event::new("a73b1c37", "ios", "s-1", 7643329, "Client.CreateUser", at)
    }

    #[test]
    fn test_encode_plain_row() {
        let payload = CsvEncoder.encode(&sample()).unwrap();
        assert_eq!(
            &payload[..],
            b"a73b1c37,ios,s-1,7643329,,,2016-02-05T15:05:04Z,Client.CreateUser,,,,,,false"
        );
    }

    #[test]
    fn test_encode_quotes_special_fields() {
        let mut event = sample();
        event.parameters = Some(r#"{"a":1,"b":"x"}"#.to_string());
        event.user_id = Some("42".to_string());
        event.is_testing = true;

        let payload = CsvEncoder.encode(&event).unwrap();
        let row = std::str::from_utf8(&payload).unwrap();
        assert!(row.ends_with(r#",42,,"{""a"":1,""b"":""x""}",true"#), "{row}");
    }

    #[test]
    fn test_header_matches_column_count() {
        let header = CsvEncoder::header();
        assert_eq!(header.split(',').count(), CSV_COLUMNS.len());
        assert!(header.starts_with("device_id,client_id"));
    }

    #[test]
    fn test_empty_device_id_is_rejected() {
        let mut event = sample();
        event.device_id.clear();
        assert!(matches!(
            CsvEncoder.encode(&event),
            Err(ContractError::Encode { .. })
        ));
    }
}
