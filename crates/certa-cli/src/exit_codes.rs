//! Exit codes for the certa CLI. Part of the public contract.

pub const SUCCESS: i32 = 0;
pub const INTERNAL_ERROR: i32 = 1; // Unexpected failure (I/O, serialization)
pub const CONFIG_ERROR: i32 = 2; // Invalid configuration, rejected before any provider call
pub const API_ERROR: i32 = 3; // Completion failed after retries, or non-retryable provider error

/// Map an error chain to an exit code.
pub fn for_error(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<certa_core::Error>() {
        Some(certa_core::Error::Config(_)) => CONFIG_ERROR,
        Some(certa_core::Error::Api(_)) => API_ERROR,
        None => INTERNAL_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_errors_keep_their_codes() {
        let config: anyhow::Error =
            certa_core::Error::from(certa_core::ConfigError::InvalidReflections(0)).into();
        assert_eq!(for_error(&config), CONFIG_ERROR);

        let api: anyhow::Error = certa_core::Error::from(certa_core::ApiError::NonRetryable(
            certa_core::ProviderError::Network {
                message: "reset".into(),
            },
        ))
        .into();
        assert_eq!(for_error(&api), API_ERROR);

        assert_eq!(for_error(&anyhow::anyhow!("disk full")), INTERNAL_ERROR);
    }
}
