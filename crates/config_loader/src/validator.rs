//! Config validation
//!
//! Rules:
//! - max_workers >= 1
//! - queue_capacity >= 1
//! - buffered backends need buffer_size >= 1
//! - file backend needs `base_path`

use contracts::{BackendKind, ContractError, ForwarderConfig};

/// Validate a ForwarderConfig
///
/// Returns the first error found, or Ok(()).
pub fn validate(config: &ForwarderConfig) -> Result<(), ContractError> {
    validate_pool(config)?;
    validate_buffer(config)?;
    validate_backend(config)?;
    Ok(())
}

fn validate_pool(config: &ForwarderConfig) -> Result<(), ContractError> {
    if config.dispatcher.max_workers == 0 {
        return Err(ContractError::config_validation(
            "dispatcher.max_workers",
            "max_workers must be >= 1",
        ));
    }
    if config.dispatcher.queue_capacity == 0 {
        return Err(ContractError::config_validation(
            "dispatcher.queue_capacity",
            "queue_capacity must be >= 1",
        ));
    }
    Ok(())
}

fn validate_buffer(config: &ForwarderConfig) -> Result<(), ContractError> {
    if config.backend.buffered && config.worker.buffer_size == 0 {
        return Err(ContractError::config_validation(
            "worker.buffer_size",
            "buffer_size must be >= 1 for a buffered backend",
        ));
    }
    Ok(())
}

fn validate_backend(config: &ForwarderConfig) -> Result<(), ContractError> {
    if config.backend.kind == BackendKind::File
        && config
            .backend
            .params
            .get("base_path")
            .is_none_or(|p| p.is_empty())
    {
        return Err(ContractError::config_validation(
            "backend.params.base_path",
            "file backend requires a base_path",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_toml;

    fn config(content: &str) -> ForwarderConfig {
        parse_toml(content).unwrap()
    }

    #[test]
    fn test_valid_config() {
        let config = config(
            r#"
[dispatcher]
max_workers = 2

[backend]
kind = "log"
"#,
        );
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_zero_workers_rejected() {
        let config = config(
            r#"
[dispatcher]
max_workers = 0

[backend]
kind = "log"
"#,
        );
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("max_workers"));
    }

    #[test]
    fn test_zero_buffer_rejected_when_buffered() {
        let config = config(
            r#"
[worker]
buffer_size = 0

[backend]
kind = "memory"
buffered = true
"#,
        );
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("buffer_size"));
    }

    #[test]
    fn test_zero_buffer_allowed_for_pass_through() {
        let config = config(
            r#"
[worker]
buffer_size = 0

[backend]
kind = "memory"
"#,
        );
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_file_backend_requires_base_path() {
        let config = config(
            r#"
[backend]
kind = "file"
"#,
        );
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("base_path"));
    }
}
