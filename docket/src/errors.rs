use backtrace::Backtrace;
use parking_lot::Mutex;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::result::Result;
use std::sync::Arc;

/// Error kinds for repository operations
///
/// Each kind names one category of failure so callers can branch on what went
/// wrong without parsing messages.
///
/// # Examples
///
/// ```rust,ignore
/// use docket::errors::{DocketError, ErrorKind, DocketResult};
///
/// fn example() -> DocketResult<()> {
///     Err(DocketError::new("Entity not found", ErrorKind::NotFound))
/// }
/// ```
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ErrorKind {
    // Construction Errors
    /// Missing or invalid configuration (connection entry, collection name)
    ConfigurationError,
    /// The connection target could not be resolved or reached
    ConnectionError,

    // ID and Identity Errors
    /// A key could not be converted to the stored identifier representation
    InvalidId,
    /// No document matched an identifier lookup
    NotFound,
    /// More than one document matched a lookup that must match exactly one
    NotUnique,

    // Data Encoding Errors
    /// Error mapping an entity to or from a document
    ObjectMappingError,

    // Filter Errors
    /// Error during filter evaluation or rendering
    FilterError,

    // Store Errors
    /// Error reported by the underlying document store; the store's own
    /// error is attached unchanged as the cause
    BackendError,
    /// A store round-trip exceeded the configured operation timeout
    Timeout,
    /// A store round-trip was cancelled through a cancellation token
    Cancelled,

    // Operation Errors
    /// The operation is not valid in the current context
    InvalidOperation,

    // Generic/Internal Errors
    /// Internal error (usually indicates a bug)
    InternalError,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::ConfigurationError => write!(f, "Configuration error"),
            ErrorKind::ConnectionError => write!(f, "Connection error"),
            ErrorKind::InvalidId => write!(f, "Invalid ID"),
            ErrorKind::NotFound => write!(f, "Not found"),
            ErrorKind::NotUnique => write!(f, "Not unique"),
            ErrorKind::ObjectMappingError => write!(f, "Object mapping error"),
            ErrorKind::FilterError => write!(f, "Filter error"),
            ErrorKind::BackendError => write!(f, "Backend error"),
            ErrorKind::Timeout => write!(f, "Timeout"),
            ErrorKind::Cancelled => write!(f, "Cancelled"),
            ErrorKind::InvalidOperation => write!(f, "Invalid operation"),
            ErrorKind::InternalError => write!(f, "Internal error"),
        }
    }
}

/// Error type shared by every docket crate.
///
/// `DocketError` carries a message, an [`ErrorKind`], an optional cause and a
/// backtrace captured at construction. Errors coming out of a store driver are
/// never rewritten: they are attached as the cause of a
/// [`ErrorKind::BackendError`] and can be recovered with
/// [`DocketError::cause_as`].
///
/// # Examples
///
/// ```rust,ignore
/// use docket::errors::{DocketError, ErrorKind};
///
/// let err = DocketError::new("Entity not found", ErrorKind::NotFound);
///
/// let cause = std::io::Error::other("socket closed");
/// let err = DocketError::new_with_cause("Insert failed", ErrorKind::BackendError, cause);
/// ```
#[derive(Clone)]
pub struct DocketError {
    message: String,
    error_kind: ErrorKind,
    cause: Option<Arc<dyn Error + Send + Sync + 'static>>,
    backtrace: Arc<Mutex<Backtrace>>,
}

impl DocketError {
    /// Creates a new `DocketError` with the specified message and error kind.
    pub fn new(message: &str, error_kind: ErrorKind) -> Self {
        DocketError {
            message: message.to_string(),
            error_kind,
            cause: None,
            backtrace: Arc::new(Mutex::new(Backtrace::new_unresolved())),
        }
    }

    /// Creates a new `DocketError` wrapping `cause`.
    ///
    /// The cause is kept as-is so that its concrete type stays reachable
    /// through [`Error::source`] and [`DocketError::cause_as`].
    pub fn new_with_cause<E>(message: &str, error_kind: ErrorKind, cause: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        DocketError {
            message: message.to_string(),
            error_kind,
            cause: Some(Arc::new(cause)),
            backtrace: Arc::new(Mutex::new(Backtrace::new_unresolved())),
        }
    }

    /// Wraps an error reported by a document store driver.
    pub fn backend<E>(operation: &str, cause: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        let message = format!("{} failed: {}", operation, cause);
        DocketError::new_with_cause(&message, ErrorKind::BackendError, cause)
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.error_kind
    }

    pub fn cause(&self) -> Option<&(dyn Error + Send + Sync + 'static)> {
        self.cause.as_deref()
    }

    /// Returns the cause downcast to a concrete error type, if it is one.
    pub fn cause_as<E: Error + 'static>(&self) -> Option<&E> {
        self.cause.as_deref().and_then(|cause| cause.downcast_ref::<E>())
    }
}

impl Display for DocketError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Debug for DocketError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // print error message with stack trace followed by cause
        match &self.cause {
            Some(cause) => write!(f, "{}\nCaused by: {:?}", self.message, cause),
            None => {
                let mut backtrace = self.backtrace.lock();
                backtrace.resolve();
                write!(f, "{}\n{:?}", self.message, backtrace)
            }
        }
    }
}

impl Error for DocketError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.cause {
            Some(cause) => Some(cause.as_ref()),
            None => None,
        }
    }
}

/// A result type alias for repository operations.
pub type DocketResult<T> = Result<T, DocketError>;

impl From<bson::ser::Error> for DocketError {
    fn from(err: bson::ser::Error) -> Self {
        let message = format!("Failed to serialize entity: {}", err);
        DocketError::new_with_cause(&message, ErrorKind::ObjectMappingError, err)
    }
}

impl From<bson::de::Error> for DocketError {
    fn from(err: bson::de::Error) -> Self {
        let message = format!("Failed to deserialize document: {}", err);
        DocketError::new_with_cause(&message, ErrorKind::ObjectMappingError, err)
    }
}

impl From<bson::oid::Error> for DocketError {
    fn from(err: bson::oid::Error) -> Self {
        let message = format!("Invalid object id: {}", err);
        DocketError::new_with_cause(&message, ErrorKind::InvalidId, err)
    }
}

impl From<regex::Error> for DocketError {
    fn from(err: regex::Error) -> Self {
        let message = format!("Invalid regex pattern: {}", err);
        DocketError::new_with_cause(&message, ErrorKind::FilterError, err)
    }
}

impl From<std::io::Error> for DocketError {
    fn from(err: std::io::Error) -> Self {
        let message = format!("IO error: {}", err);
        DocketError::new_with_cause(&message, ErrorKind::ConnectionError, err)
    }
}

impl From<String> for DocketError {
    fn from(msg: String) -> Self {
        DocketError::new(&msg, ErrorKind::InternalError)
    }
}

impl From<&str> for DocketError {
    fn from(msg: &str) -> Self {
        DocketError::new(msg, ErrorKind::InternalError)
    }
}
