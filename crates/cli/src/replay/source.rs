//! Event input - newline-delimited JSON from a file or stdin.

use std::path::Path;

use contracts::Event;
use tokio::io::{AsyncBufRead, BufReader};

use crate::error::CliError;

/// Buffered reader over the event input
pub type EventInput = Box<dyn AsyncBufRead + Unpin + Send>;

/// Open `path`, or stdin when no path is given
pub async fn open_input(path: Option<&Path>) -> Result<EventInput, CliError> {
    match path {
        Some(path) => {
            let file = tokio::fs::File::open(path)
                .await
                .map_err(|source| CliError::InputOpen {
                    path: path.display().to_string(),
                    source,
                })?;
            Ok(Box::new(BufReader::new(file)))
        }
        None => Ok(Box::new(BufReader::new(tokio::io::stdin()))),
    }
}

/// Parse one input line into an event
///
/// Returns `Ok(None)` for blank lines.
pub fn parse_event(line_no: u64, line: &str) -> Result<Option<Event>, CliError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let event: Event =
        serde_json::from_str(line).map_err(|e| CliError::invalid_event(line_no, e.to_string()))?;
    if event.device_id.is_empty() {
        return Err(CliError::invalid_event(line_no, "device_id is empty"));
    }
    Ok(Some(event))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tokio::io::AsyncBufReadExt;

    const LINE: &str = r#"{"device_id":"a73b1c37","client_id":"ios","session":"f0ee0c1e","nr":1,"at":"2016-02-05T15:05:04Z","event":"Client.CreateUser"}"#;

    #[test]
    fn test_parse_event() {
        let event = parse_event(1, LINE).unwrap().unwrap();
        assert_eq!(event.device_id, "a73b1c37");
        assert_eq!(event.nr, 1);
        assert_eq!(event.event, "Client.CreateUser");
    }

    #[test]
    fn test_blank_line_skipped() {
        assert!(parse_event(1, "   ").unwrap().is_none());
    }

    #[test]
    fn test_invalid_line_reports_line_number() {
        let err = parse_event(7, "{not json").unwrap_err();
        assert!(matches!(err, CliError::InvalidEvent { line: 7, .. }));
    }

    #[tokio::test]
    async fn test_open_file_input() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{LINE}").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "{LINE}").unwrap();

        let input = open_input(Some(file.path())).await.unwrap();
        let mut lines = input.lines();
        let mut events = 0;
        let mut line_no = 0;
        while let Some(line) = lines.next_line().await.unwrap() {
            line_no += 1;
            if parse_event(line_no, &line).unwrap().is_some() {
                events += 1;
            }
        }
        assert_eq!(events, 2);
    }

    #[tokio::test]
    async fn test_open_missing_input() {
        let result = open_input(Some(Path::new("/nonexistent/events.ndjson"))).await;
        assert!(matches!(result, Err(CliError::InputOpen { .. })));
    }
}
