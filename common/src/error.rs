use actix_web::HttpResponse;
use log::{error, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type Res<T> = std::result::Result<T, AppError>;

/// A single problem reported by the billing provider, e.g. a `userErrors` entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillingUserError {
    #[serde(default)]
    pub field: Option<Vec<String>>,
    #[serde(default)]
    pub message: Option<String>,
}

impl BillingUserError {
    pub fn message(message: impl Into<String>) -> Self {
        BillingUserError {
            field: None,
            message: Some(message.into()),
        }
    }
}

/// Failure of a call to the billing provider.
///
/// Covers transport problems (network, timeout, unexpected HTTP status) as well as
/// rejections reported by the provider itself, which arrive as a list of
/// field/message pairs.
#[derive(Error, Debug)]
#[error("{message}")]
pub struct BillingError {
    pub message: String,
    pub errors: Vec<BillingUserError>,
}

impl BillingError {
    pub fn new(message: impl Into<String>) -> Self {
        BillingError {
            message: message.into(),
            errors: Vec::new(),
        }
    }

    pub fn with_errors(message: impl Into<String>, errors: Vec<BillingUserError>) -> Self {
        BillingError {
            message: message.into(),
            errors,
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Best-effort description of the first reported error: its message,
    /// otherwise the field it refers to.
    pub fn first_error(&self) -> Option<String> {
        let first = self.errors.first()?;
        let text = first
            .message
            .as_deref()
            .filter(|m| !m.is_empty())
            .map(str::to_string)
            .or_else(|| {
                first
                    .field
                    .as_ref()
                    .filter(|f| !f.is_empty())
                    .map(|f| f.join("."))
            })
            .unwrap_or_else(|| "Unknown error".to_string());
        Some(text)
    }
}

impl From<reqwest::Error> for BillingError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            BillingError::new("Billing provider request timed out")
        } else {
            BillingError::new(format!("Billing provider request failed: {}", error))
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    // === CONVERSION ERRORS ===
    #[error("JWT error: {0}")]
    JWT(#[from] jsonwebtoken::errors::Error),

    #[error("Reqwest error: {0}")]
    Reqwest(#[from] reqwest::Error),

    // === APPLICATION ERRORS ===
    #[error("No valid Shopify session found")]
    NoSession,

    #[error("Invalid plan ID")]
    InvalidPlan(String),

    #[error("{context}: {source}")]
    Billing {
        context: String,
        #[source]
        source: BillingError,
    },

    #[error("Authorization error: {0}")]
    Unauthorized(String),

}

impl From<BillingError> for AppError {
    fn from(source: BillingError) -> Self {
        AppError::Billing {
            context: "Billing provider request failed".to_string(),
            source,
        }
    }
}

impl AppError {
    /// Replaces the client-facing summary of a billing failure.
    /// Other variants are returned untouched.
    pub fn context(self, context: &str) -> Self {
        match self {
            AppError::Billing { source, .. } => AppError::Billing {
                context: context.to_string(),
                source,
            },
            other => other,
        }
    }

    pub fn to_http_response(&self) -> HttpResponse {
        let json_response = serde_json::json!({ "error": self.to_string() });
        let unexpected = || {
            HttpResponse::InternalServerError()
                .json(serde_json::json!({ "error": "An unexpected error occurred" }))
        };

        match self {
            // === CONVERSION ERRORS ===
            AppError::JWT(error) => {
                error!("JWT error: {}", error);
                unexpected()
            }
            AppError::Reqwest(error) => {
                error!("Reqwest error: {}", error);
                unexpected()
            }

            // === APPLICATION ERRORS ===
            AppError::NoSession => HttpResponse::Unauthorized().json(json_response),
            AppError::InvalidPlan(plan_id) => {
                warn!("Rejected unknown plan id: {:?}", plan_id);
                HttpResponse::BadRequest().json(json_response)
            }
            AppError::Billing { context, source } => {
                error!("{}: {} {:?}", context, source, source.errors);
                HttpResponse::InternalServerError().json(serde_json::json!({
                    "error": context,
                    "message": source.first_error().unwrap_or_else(|| source.message.clone()),
                }))
            }
            AppError::Unauthorized(_) => HttpResponse::Unauthorized().json(json_response),
        }
    }
}

impl actix_web::ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        self.to_http_response()
    }
}
