use std::fmt;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use serde::{Deserialize, Serialize};

#[derive(Debug)]
pub enum LibraryError {
    Database {
        message: String,
        reason_code: Option<String>,
        retryable: bool,
    },
    AccessDenied {
        message: String,
        reason_code: Option<String>,
    },
    NotGranted {
        message: String,
        reason_code: Option<String>,
    },
    DuplicateKey {
        message: String,
    },
    NotFound {
        message: String,
    },
    // This is a retry-able error, which indicates that the asset being changed is locked by
    // another transition or that the store rejected a stale version of the record.
    // The caller can retry the operation with or without a backoff.
    CurrentlyUnavailable {
        message: String,
        reason_code: Option<String>,
        retryable: bool,
    },
    Validation {
        message: String,
        reason_code: Option<String>,
    },
    Serialization {
        message: String,
    },
    Runtime {
        message: String,
        reason_code: Option<String>,
    },
}

impl LibraryError {
    pub fn database(message: &str, reason_code: Option<String>, retryable: bool) -> LibraryError {
        LibraryError::Database { message: message.to_string(), reason_code, retryable }
    }

    pub fn access_denied(message: &str, reason_code: Option<String>) -> LibraryError {
        LibraryError::AccessDenied { message: message.to_string(), reason_code }
    }

    pub fn not_granted(message: &str, reason_code: Option<String>) -> LibraryError {
        LibraryError::NotGranted { message: message.to_string(), reason_code }
    }

    pub fn duplicate_key(message: &str) -> LibraryError {
        LibraryError::DuplicateKey { message: message.to_string() }
    }

    pub fn not_found(message: &str) -> LibraryError {
        LibraryError::NotFound { message: message.to_string() }
    }

    pub fn unavailable(message: &str, reason_code: Option<String>, retryable: bool) -> LibraryError {
        LibraryError::CurrentlyUnavailable { message: message.to_string(), reason_code, retryable }
    }

    pub fn database_or_unavailable(message: &str, reason: Option<String>, retryable: bool) -> LibraryError {
        if retryable {
            LibraryError::unavailable(
                format!("ddb database unavailable error {:?} {:?}", message, reason).as_str(), reason, true)
        } else if let Some(ref reason_val) = reason {
            if reason_val.as_str().contains("404") {
                LibraryError::not_found(
                    format!("not found error {:?} {:?}", message, reason).as_str())
            } else if reason_val.as_str().contains("400") {
                LibraryError::access_denied(
                    format!("access-denied error {:?} {:?}", message, reason).as_str(), reason)
            } else {
                LibraryError::database(
                    format!("ddb database error {:?} {:?}", message, reason).as_str(), reason, false)
            }
        } else {
            LibraryError::database(
                format!("ddb database error {:?} {:?}", message, reason).as_str(), reason, false)
        }
    }

    pub fn validation(message: &str, reason_code: Option<String>) -> LibraryError {
        LibraryError::Validation { message: message.to_string(), reason_code }
    }

    pub fn serialization(message: &str) -> LibraryError {
        LibraryError::Serialization { message: message.to_string() }
    }

    pub fn runtime(message: &str, reason_code: Option<String>) -> LibraryError {
        LibraryError::Runtime { message: message.to_string(), reason_code }
    }

    pub fn retryable(&self) -> bool {
        match self {
            LibraryError::Database { retryable, .. } => { *retryable }
            LibraryError::AccessDenied { .. } => { false }
            LibraryError::NotGranted { .. } => { false }
            LibraryError::DuplicateKey { .. } => { false }
            LibraryError::NotFound { .. } => { false }
            LibraryError::CurrentlyUnavailable { retryable, .. } => { *retryable }
            LibraryError::Validation { .. } => { false }
            LibraryError::Serialization { .. } => { false }
            LibraryError::Runtime { .. } => { false }
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, LibraryError::NotFound { .. })
    }
}

impl From<std::io::Error> for LibraryError {
    fn from(err: std::io::Error) -> Self {
        LibraryError::runtime(
            format!("serde io {:?}", err).as_str(), None)
    }
}

impl From<serde_json::Error> for LibraryError {
    fn from(err: serde_json::Error) -> Self {
        LibraryError::serialization(
            format!("serde json parsing {:?}", err).as_str())
    }
}

impl From<String> for LibraryError {
    fn from(err: String) -> Self {
        LibraryError::serialization(
            format!("serde parsing {:?}", err).as_str())
    }
}

impl Display for LibraryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            LibraryError::Database { message, reason_code, retryable } => {
                write!(f, "{} {:?} {}", message, reason_code, retryable)
            }
            LibraryError::AccessDenied { message, reason_code } => {
                write!(f, "{} {:?}", message, reason_code)
            }
            LibraryError::NotGranted { message, reason_code } => {
                write!(f, "{} {:?}", message, reason_code)
            }
            LibraryError::DuplicateKey { message } => {
                write!(f, "{}", message)
            }
            LibraryError::NotFound { message } => {
                write!(f, "{}", message)
            }
            LibraryError::CurrentlyUnavailable { message, reason_code, retryable } => {
                write!(f, "{} {:?} {}", message, reason_code, retryable)
            }
            LibraryError::Validation { message, reason_code } => {
                write!(f, "{} {:?}", message, reason_code)
            }
            LibraryError::Serialization { message } => {
                write!(f, "{}", message)
            }
            LibraryError::Runtime { message, reason_code } => {
                write!(f, "{} {:?}", message, reason_code)
            }
        }
    }
}

impl std::error::Error for LibraryError {}

/// A specialized Result type for Repository .
pub type LibraryResult<T> = Result<T, LibraryError>;

/// Turns a NotFound lookup into `Ok(None)`, other errors are kept.
pub fn found<T>(res: LibraryResult<T>) -> LibraryResult<Option<T>> {
    match res {
        Ok(val) => Ok(Some(val)),
        Err(err) if err.is_not_found() => Ok(None),
        Err(err) => Err(err),
    }
}

// It defines abstraction for paginated result
#[derive(Debug, Clone)]
pub struct PaginatedResult<T> {
    // The page number or token
    pub page: Option<String>,
    // page size
    pub page_size: usize,
    // Next page if available
    pub next_page: Option<String>,
    // list of records
    pub records: Vec<T>,
}

impl<T> PaginatedResult<T> {
    pub(crate) fn new(page: Option<&str>, page_size: usize,
                      next_page: Option<String>, records: Vec<T>) -> Self {
        PaginatedResult {
            page: page.map(str::to_string),
            page_size,
            next_page,
            records,
        }
    }
}

/// Circulation state of an asset.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub enum AssetStatus {
    Available,
    CheckedOut,
    OnHold,
    Lost,
}

/// Input to the asset state machine.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum CirculationEvent {
    CheckOut,
    CheckIn { holds_pending: bool },
    PlaceHold,
    MarkLost,
    MarkFound,
}

impl AssetStatus {
    /// Returns the status an asset moves to when `event` is applied.
    ///
    /// A hold only moves an `Available` asset, every other status is kept. The
    /// check-out no-op for assets with an active loan is decided by the engine,
    /// not here, because it depends on the checkout record and not on the status.
    pub fn on(self, event: CirculationEvent) -> AssetStatus {
        match (self, event) {
            (_, CirculationEvent::CheckOut) => AssetStatus::CheckedOut,
            (_, CirculationEvent::CheckIn { holds_pending: true }) => AssetStatus::CheckedOut,
            (_, CirculationEvent::CheckIn { holds_pending: false }) => AssetStatus::Available,
            (AssetStatus::Available, CirculationEvent::PlaceHold) => AssetStatus::OnHold,
            (current, CirculationEvent::PlaceHold) => current,
            (_, CirculationEvent::MarkLost) => AssetStatus::Lost,
            (_, CirculationEvent::MarkFound) => AssetStatus::Available,
        }
    }
}

impl FromStr for AssetStatus {
    type Err = LibraryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // the spaced names are what older catalog rows carry
        match s {
            "Available" => Ok(AssetStatus::Available),
            "CheckedOut" | "Checked Out" => Ok(AssetStatus::CheckedOut),
            "OnHold" | "On Hold" => Ok(AssetStatus::OnHold),
            "Lost" => Ok(AssetStatus::Lost),
            _ => Err(LibraryError::validation(
                format!("unknown asset status {}", s).as_str(), Some("400".to_string()))),
        }
    }
}

impl Display for AssetStatus {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            AssetStatus::Available => write!(f, "Available"),
            AssetStatus::CheckedOut => write!(f, "CheckedOut"),
            AssetStatus::OnHold => write!(f, "OnHold"),
            AssetStatus::Lost => write!(f, "Lost"),
        }
    }
}

/// Public circulation operations, recorded on each transition result.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub enum TransitionKind {
    CheckOut,
    CheckIn,
    PlaceHold,
    MarkLost,
    MarkFound,
}

impl TransitionKind {
    // name of the domain event published for the transition
    pub fn event_name(&self) -> &'static str {
        match self {
            TransitionKind::CheckOut => "asset_checked_out",
            TransitionKind::CheckIn => "asset_checked_in",
            TransitionKind::PlaceHold => "asset_hold_placed",
            TransitionKind::MarkLost => "asset_marked_lost",
            TransitionKind::MarkFound => "asset_marked_found",
        }
    }
}

impl Display for TransitionKind {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            TransitionKind::CheckOut => write!(f, "CheckOut"),
            TransitionKind::CheckIn => write!(f, "CheckIn"),
            TransitionKind::PlaceHold => write!(f, "PlaceHold"),
            TransitionKind::MarkLost => write!(f, "MarkLost"),
            TransitionKind::MarkFound => write!(f, "MarkFound"),
        }
    }
}
