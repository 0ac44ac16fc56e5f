//! AWS error classification
//!
//! Maps AWS error codes onto [`FetchError`] using the `.code()` metadata of
//! SDK errors, falling back to scanning the Debug form for wrapped errors.

use crate::fetch::FetchError;
use aws_smithy_types::error::ErrorMetadata;
use aws_smithy_types::error::metadata::ProvideErrorMetadata;

/// Known AWS error codes for "not found" conditions
const NOT_FOUND_CODES: &[&str] = &[
    "ResourceNotFoundException",
    "GlobalClusterNotFoundFault",
    "DBClusterNotFoundFault",
    "EntityDoesNotExistException",
    "DirectoryDoesNotExistException",
    "NotFoundException",
    "NoSuchEntity",
];

/// Known AWS error codes for throttling/rate limiting
const THROTTLING_CODES: &[&str] = &[
    "Throttling",
    "ThrottlingException",
    "ThrottledException",
    "RequestLimitExceeded",
    "TooManyRequestsException",
    "ClientLimitExceededException",
];

/// Check whether `code` means "not found"
pub fn is_not_found_code(code: &str) -> bool {
    NOT_FOUND_CODES.contains(&code)
}

/// Check whether `code` means the request was throttled
pub fn is_throttling_code(code: &str) -> bool {
    THROTTLING_CODES.contains(&code)
}

/// Classify an AWS error code and message.
pub fn classify_aws_error(code: Option<&str>, message: Option<&str>) -> FetchError {
    let message = message.unwrap_or("Unknown error").to_string();

    match code {
        Some(c) if is_not_found_code(c) => FetchError::NotFound { message },
        Some(c) => FetchError::transport_with_code(c, anyhow::anyhow!(message)),
        None => FetchError::transport(anyhow::anyhow!(message)),
    }
}

/// Classify an SDK error that exposes AWS error metadata.
///
/// Not-found codes become [`FetchError::NotFound`]; anything else keeps the
/// original error as the transport failure's source.
pub fn classify_sdk_error<E>(error: E) -> FetchError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
{
    let code = error.code().map(str::to_string);
    match code {
        Some(c) if is_not_found_code(&c) => FetchError::NotFound {
            message: error
                .message()
                .map(str::to_string)
                .unwrap_or_else(|| error.to_string()),
        },
        code => FetchError::Transport {
            code,
            source: error.into(),
        },
    }
}

/// Classify an error from an anyhow::Error by extracting the AWS error code.
///
/// Walks the error chain looking for [`ErrorMetadata`]. Falls back to string
/// matching on the Debug representation if no typed error is found.
pub fn classify_anyhow_error(error: anyhow::Error) -> FetchError {
    let code = error
        .chain()
        .find_map(|cause| cause.downcast_ref::<ErrorMetadata>())
        .and_then(|meta| meta.code().map(str::to_string))
        .or_else(|| extract_error_code(&format!("{:?}", error)));

    match code {
        Some(c) if is_not_found_code(&c) => FetchError::NotFound {
            message: format!("{error:#}"),
        },
        code => FetchError::Transport {
            code,
            source: error,
        },
    }
}

/// Extract an AWS error code from a debug string representation
fn extract_error_code(debug_str: &str) -> Option<String> {
    for code in NOT_FOUND_CODES.iter().chain(THROTTLING_CODES) {
        if debug_str.contains(code) {
            return Some((*code).to_string());
        }
    }

    // Try to extract any code from `code: Some("...")` pattern
    if let Some(start) = debug_str.find("code: Some(\"") {
        let rest = &debug_str[start + 12..];
        if let Some(end) = rest.find('"') {
            return Some(rest[..end].to_string());
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_codes() {
        for code in NOT_FOUND_CODES {
            let err = classify_aws_error(Some(code), Some("some message"));
            assert!(err.is_not_found(), "Expected NotFound for code: {code}");
        }
    }

    #[test]
    fn throttling_codes() {
        for code in THROTTLING_CODES {
            let err = classify_aws_error(Some(code), Some("msg"));
            assert!(err.is_retryable(), "Expected retryable for code: {code}");
            assert!(!err.is_not_found());
        }
    }

    #[test]
    fn unknown_and_missing_codes() {
        let err = classify_aws_error(Some("SomeNewError"), Some("details"));
        assert!(matches!(err, FetchError::Transport { code: Some(_), .. }));
        assert!(!err.is_retryable());

        let err2 = classify_aws_error(None, Some("something failed"));
        assert!(matches!(err2, FetchError::Transport { code: None, .. }));
        assert!(err2.to_string().contains("something failed"));
    }

    #[test]
    fn sdk_error_metadata() {
        let meta = ErrorMetadata::builder()
            .code("GlobalClusterNotFoundFault")
            .message("GlobalCluster gc-1 not found")
            .build();
        match classify_sdk_error(meta) {
            FetchError::NotFound { message } => assert!(message.contains("gc-1")),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn anyhow_chain_with_metadata() {
        let meta = ErrorMetadata::builder()
            .code("ThrottlingException")
            .message("Rate exceeded")
            .build();
        let err = anyhow::Error::new(meta).context("describing schedule group");
        let classified = classify_anyhow_error(err);
        assert_eq!(classified.code(), Some("ThrottlingException"));
        assert!(classified.is_retryable());
    }

    #[test]
    fn anyhow_debug_string_fallback() {
        let err = anyhow::anyhow!(r#"ServiceError {{ code: Some("ResourceNotFoundException") }}"#);
        assert!(classify_anyhow_error(err).is_not_found());

        let err = anyhow::anyhow!(r#"SdkError {{ code: Some("SomeRandomCode"), message: "fail" }}"#);
        assert_eq!(classify_anyhow_error(err).code(), Some("SomeRandomCode"));
    }

    #[test]
    fn extract_none_from_unrelated_string() {
        assert!(extract_error_code("connection refused").is_none());
    }
}
