use thiserror::Error;

pub type Result<T> = std::result::Result<T, EngineError>;

/// Stable error kinds for callers that need to branch on failure class
/// without matching on message text. The presentation layer maps these
/// 1:1 onto transport status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    NotFound,
    InvalidState,
    Validation,
    OrderNotConfirmed,
    GatewayNotFound,
    GatewayConfig,
    PaymentFailed,
}

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: u64 },
    #[error("invalid state: {0}")]
    InvalidState(String),
    #[error("validation error: {0}")]
    Validation(String),
    #[error("payments can only be processed for confirmed orders")]
    OrderNotConfirmed,
    #[error("active payment gateway '{0}' not found")]
    GatewayNotFound(String),
    #[error("gateway configuration error: {0}")]
    GatewayConfig(String),
    #[error("payment processing failed: {0}")]
    PaymentFailed(String),
}

impl EngineError {
    pub fn not_found(entity: &'static str, id: u64) -> Self {
        Self::NotFound { entity, id }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Self::NotFound { .. } => ErrorCode::NotFound,
            Self::InvalidState(_) => ErrorCode::InvalidState,
            Self::Validation(_) => ErrorCode::Validation,
            Self::OrderNotConfirmed => ErrorCode::OrderNotConfirmed,
            Self::GatewayNotFound(_) => ErrorCode::GatewayNotFound,
            Self::GatewayConfig(_) => ErrorCode::GatewayConfig,
            Self::PaymentFailed(_) => ErrorCode::PaymentFailed,
        }
    }
}
