use thiserror::Error;

#[derive(Error, Debug)]
pub enum LookupError {
    #[error("Malformed case identifier '{input}': {reason}")]
    MalformedIdentifier { input: String, reason: String },

    #[error("Case sequence {sequence} does not fit in 6 digits")]
    SequenceOverflow { sequence: u32 },

    #[error("Court office code is empty")]
    MissingCourtOffice,

    #[error("Unknown court: {name}")]
    UnknownCourt { name: String },

    #[error("Network failure calling {endpoint}: {reason}")]
    NetworkFailure {
        endpoint: String,
        request_body: String,
        reason: String,
        timed_out: bool,
    },

    #[error("Upstream error from {endpoint}: {message}")]
    UpstreamError {
        endpoint: String,
        request_body: String,
        status: Option<u16>,
        message: String,
    },

    #[error("Lookup cancelled")]
    Cancelled,

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Network,
    Upstream,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl LookupError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            LookupError::MalformedIdentifier { .. }
            | LookupError::SequenceOverflow { .. }
            | LookupError::MissingCourtOffice
            | LookupError::UnknownCourt { .. } => ErrorCategory::Validation,
            LookupError::NetworkFailure { .. } | LookupError::Cancelled => ErrorCategory::Network,
            LookupError::UpstreamError { .. } => ErrorCategory::Upstream,
            LookupError::ConfigError { .. } | LookupError::InvalidConfigValue { .. } => {
                ErrorCategory::Configuration
            }
            LookupError::IoError(_) | LookupError::SerializationError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            LookupError::Cancelled => ErrorSeverity::Low,
            LookupError::NetworkFailure { .. } => ErrorSeverity::Medium,
            LookupError::MalformedIdentifier { .. }
            | LookupError::SequenceOverflow { .. }
            | LookupError::MissingCourtOffice
            | LookupError::UnknownCourt { .. } => ErrorSeverity::High,
            LookupError::UpstreamError { .. }
            | LookupError::ConfigError { .. }
            | LookupError::InvalidConfigValue { .. }
            | LookupError::IoError(_)
            | LookupError::SerializationError(_) => ErrorSeverity::Critical,
        }
    }

    /// 只有網路層的暫時性錯誤值得由呼叫端重試
    pub fn is_retryable(&self) -> bool {
        matches!(self, LookupError::NetworkFailure { .. })
    }

    /// 給 UI / CLI 顯示的訊息（韓文，面向終端使用者）
    pub fn user_friendly_message(&self) -> String {
        match self {
            LookupError::MalformedIdentifier { input, .. } => {
                format!("사건번호 형식이 올바르지 않습니다: '{}' (예: 2024타경12345)", input)
            }
            LookupError::SequenceOverflow { sequence } => {
                format!("사건 번호가 너무 깁니다: {} (최대 6자리)", sequence)
            }
            LookupError::MissingCourtOffice => "법원을 선택해 주세요.".to_string(),
            LookupError::UnknownCourt { name } => format!("알 수 없는 법원입니다: {}", name),
            LookupError::NetworkFailure { timed_out: true, .. } => {
                "법원경매 사이트 응답 시간이 초과되었습니다.".to_string()
            }
            LookupError::NetworkFailure { .. } => {
                "법원경매 사이트에 연결할 수 없습니다.".to_string()
            }
            LookupError::UpstreamError { .. } => {
                "법원경매 사이트 응답을 해석할 수 없습니다. 사이트 구조가 변경되었을 수 있습니다."
                    .to_string()
            }
            LookupError::Cancelled => "조회가 취소되었습니다.".to_string(),
            LookupError::ConfigError { message } => format!("설정 오류: {}", message),
            LookupError::InvalidConfigValue { field, reason, .. } => {
                format!("설정값 오류 ({}): {}", field, reason)
            }
            LookupError::IoError(e) => format!("파일 입출력 오류: {}", e),
            LookupError::SerializationError(e) => format!("데이터 변환 오류: {}", e),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Validation => "사건번호와 법원을 확인한 뒤 다시 입력하세요.",
            ErrorCategory::Network => "잠시 후 다시 시도하세요.",
            ErrorCategory::Upstream => {
                "잠시 후 다시 시도하고, 계속 실패하면 API 엔드포인트 변경 여부를 확인하세요."
            }
            ErrorCategory::Configuration => "설정 파일과 명령행 옵션을 확인하세요.",
            ErrorCategory::System => "파일 경로와 권한을 확인하세요.",
        }
    }
}

pub type Result<T> = std::result::Result<T, LookupError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_are_not_retryable() {
        let err = LookupError::MalformedIdentifier {
            input: "24타경123".to_string(),
            reason: "year must be 4 digits".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Validation);
        assert!(!err.is_retryable());
        assert!(err.user_friendly_message().contains("24타경123"));
    }

    #[test]
    fn test_network_failure_is_retryable() {
        let err = LookupError::NetworkFailure {
            endpoint: "http://localhost/x.on".to_string(),
            request_body: "{}".to_string(),
            reason: "timed out".to_string(),
            timed_out: true,
        };
        assert!(err.is_retryable());
        assert_eq!(err.severity(), ErrorSeverity::Medium);
        assert!(err.to_string().contains("http://localhost/x.on"));
    }

    #[test]
    fn test_upstream_error_is_critical_and_not_retryable() {
        let err = LookupError::UpstreamError {
            endpoint: "http://localhost/x.on".to_string(),
            request_body: "{}".to_string(),
            status: Some(502),
            message: "HTTP 502".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Upstream);
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert!(!err.is_retryable());
    }
}
