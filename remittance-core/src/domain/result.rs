//! Result and error types for the core library

use std::collections::HashMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::AccountId;

/// Core library error type
///
/// Precondition variants carry the exact message shown to the caller.
/// Store failures are wrapped transparently so callers see the store's
/// own message and source chain.
#[derive(Error, Debug)]
pub enum Error {
    /// A required account argument was absent
    #[error("{0}")]
    NullReference(String),

    /// Same-account transfer or non-positive amount
    #[error("{0}")]
    InvalidArgument(String),

    #[error("Insufficient funds on account {account}: balance {balance}, requested {requested}")]
    InsufficientFunds {
        account: AccountId,
        balance: i64,
        requested: i64,
    },

    #[error("Account not found: {0}")]
    NotFound(AccountId),

    #[error(transparent)]
    Store(anyhow::Error),
}

/// Stable, serializable error classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NullReference,
    InvalidArgument,
    InsufficientFunds,
    NotFound,
    Store,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NullReference => "null_reference",
            ErrorKind::InvalidArgument => "invalid_argument",
            ErrorKind::InsufficientFunds => "insufficient_funds",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Store => "store",
        }
    }
}

impl FromStr for ErrorKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "null_reference" => Ok(ErrorKind::NullReference),
            "invalid_argument" => Ok(ErrorKind::InvalidArgument),
            "insufficient_funds" => Ok(ErrorKind::InsufficientFunds),
            "not_found" => Ok(ErrorKind::NotFound),
            "store" => Ok(ErrorKind::Store),
            other => Err(format!("Unknown error kind: {}", other)),
        }
    }
}

impl Error {
    /// Create a null reference error
    pub fn null_reference(msg: impl Into<String>) -> Self {
        Self::NullReference(msg.into())
    }

    /// Create an invalid argument error
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Wrap a store failure without altering it
    pub fn store(err: anyhow::Error) -> Self {
        Self::Store(err)
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::NullReference(_) => ErrorKind::NullReference,
            Error::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Error::InsufficientFunds { .. } => ErrorKind::InsufficientFunds,
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::Store(_) => ErrorKind::Store,
        }
    }
}

/// Core library result type
pub type Result<T> = std::result::Result<T, Error>;

/// Operation result with optional context (for JSON output)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationResult<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    pub context: Option<HashMap<String, serde_json::Value>>,
}

impl<T> OperationResult<T> {
    /// Create a successful result
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            context: None,
        }
    }

    /// Create a failed result with context
    pub fn fail_with_context(
        error: impl Into<String>,
        context: HashMap<String, serde_json::Value>,
    ) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            context: Some(context),
        }
    }
}

impl<T> From<Result<T>> for OperationResult<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(e) => {
                let mut context = HashMap::new();
                context.insert(
                    "kind".to_string(),
                    serde_json::Value::from(e.kind().as_str()),
                );
                Self::fail_with_context(e.to_string(), context)
            }
        }
    }
}
