//! Unified application error types for Licman.
//!
//! All crates map their internal errors into [`AppError`] for consistent
//! propagation through the ? operator. Callers dispatch on
//! [`AppError::kind`] to react to specific ledger failures.

use std::fmt;
use thiserror::Error;

/// Top-level error kind categorization used across the entire application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// Input validation failed (e.g. an empty pool name).
    Validation,
    /// A license pool with the same name already exists.
    DuplicateName,
    /// A pool was created with a negative total capacity.
    InvalidCapacity,
    /// The named license pool does not exist.
    UnknownPool,
    /// A checkout requested a non-positive quantity.
    InvalidQuantity,
    /// Granting the checkout would overcommit the pool.
    CapacityExceeded,
    /// An identical checkout tuple is already active.
    DuplicateCheckout,
    /// No active checkout matches the release request.
    CheckoutNotFound,
    /// The persistence collaborator failed or returned inconsistent state.
    Storage,
    /// A configuration error occurred.
    Configuration,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation => write!(f, "VALIDATION"),
            Self::DuplicateName => write!(f, "DUPLICATE_NAME"),
            Self::InvalidCapacity => write!(f, "INVALID_CAPACITY"),
            Self::UnknownPool => write!(f, "UNKNOWN_POOL"),
            Self::InvalidQuantity => write!(f, "INVALID_QUANTITY"),
            Self::CapacityExceeded => write!(f, "CAPACITY_EXCEEDED"),
            Self::DuplicateCheckout => write!(f, "DUPLICATE_CHECKOUT"),
            Self::CheckoutNotFound => write!(f, "CHECKOUT_NOT_FOUND"),
            Self::Storage => write!(f, "STORAGE"),
            Self::Configuration => write!(f, "CONFIGURATION"),
        }
    }
}

/// The unified application error used throughout Licman.
///
/// Every ledger operation returns `AppError` with the precise [`ErrorKind`]
/// so that a transport collaborator can translate each kind into its own
/// user-facing response.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create a duplicate-pool-name error.
    pub fn duplicate_name(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::DuplicateName, message)
    }

    /// Create an invalid-capacity error.
    pub fn invalid_capacity(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidCapacity, message)
    }

    /// Create an unknown-pool error.
    pub fn unknown_pool(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnknownPool, message)
    }

    /// Create an invalid-quantity error.
    pub fn invalid_quantity(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidQuantity, message)
    }

    /// Create a capacity-exceeded error.
    pub fn capacity_exceeded(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::CapacityExceeded, message)
    }

    /// Create a duplicate-checkout error.
    pub fn duplicate_checkout(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::DuplicateCheckout, message)
    }

    /// Create a checkout-not-found error.
    pub fn checkout_not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::CheckoutNotFound, message)
    }

    /// Create a storage error.
    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Storage, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Storage,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}
