use backtrace::Backtrace;
use galaxy_router_spatial::SpatialError;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::result::Result;

/// Error kinds for routing operations
///
/// Each kind names one category of failure so callers can tell bad input
/// data apart from misuse of the API. "No path found" is not an error: it
/// is an empty [`crate::RouteResult`].
///
/// # Examples
///
/// ```rust
/// use galaxy_router::errors::{ErrorKind, RouterError, RouterResult};
///
/// fn lookup(id64: u64) -> RouterResult<()> {
///     Err(RouterError::new(&format!("system {} not loaded", id64), ErrorKind::NotFound))
/// }
///
/// assert_eq!(lookup(7).unwrap_err().kind(), &ErrorKind::NotFound);
/// ```
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ErrorKind {
    // Data integrity errors, detected at load time
    /// Two records share the same id64
    DuplicateId,

    // Lookup errors
    /// A query referenced an id64 that is not in the loaded dataset
    NotFound,

    // Region map errors
    /// The region table is internally inconsistent
    MalformedTable,

    // Usage errors
    /// An argument violates the operation's contract
    InvalidArgument,
    /// A query was issued before any dataset was loaded
    NotLoaded,
    /// The operation was aborted through its cancellation token
    Cancelled,

    // IO and encoding errors, from snapshot and record loading
    /// Generic IO error
    IOError,
    /// Error encoding or decoding data
    EncodingError,

    // Generic/Internal Errors - used as fallback
    /// Internal error (usually indicates a bug)
    InternalError,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::DuplicateId => write!(f, "Duplicate id"),
            ErrorKind::NotFound => write!(f, "Not found"),
            ErrorKind::MalformedTable => write!(f, "Malformed table"),
            ErrorKind::InvalidArgument => write!(f, "Invalid argument"),
            ErrorKind::NotLoaded => write!(f, "Not loaded"),
            ErrorKind::Cancelled => write!(f, "Cancelled"),
            ErrorKind::IOError => write!(f, "IO error"),
            ErrorKind::EncodingError => write!(f, "Encoding error"),
            ErrorKind::InternalError => write!(f, "Internal error"),
        }
    }
}

/// Error type for routing operations.
///
/// `RouterError` carries a message, an [`ErrorKind`], an optional cause and
/// the backtrace captured where it was created.
#[derive(Clone)]
pub struct RouterError {
    message: String,
    error_kind: ErrorKind,
    cause: Option<Box<RouterError>>,
    backtrace: Backtrace,
}

impl RouterError {
    /// Creates a new `RouterError` with the specified message and error kind.
    pub fn new(message: &str, error_kind: ErrorKind) -> Self {
        RouterError {
            message: message.to_string(),
            error_kind,
            cause: None,
            backtrace: Backtrace::new(),
        }
    }

    /// Creates a new `RouterError` wrapping the error that caused it.
    pub fn new_with_cause(message: &str, error_kind: ErrorKind, cause: RouterError) -> Self {
        RouterError {
            message: message.to_string(),
            error_kind,
            cause: Some(Box::new(cause)),
            backtrace: Backtrace::new(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.error_kind
    }

    pub fn cause(&self) -> Option<&RouterError> {
        self.cause.as_deref()
    }
}

impl Display for RouterError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Debug for RouterError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // print error message with stack trace followed by cause
        match &self.cause {
            Some(cause) => write!(f, "{}: {}\nCaused by: {:?}", self.error_kind, self.message, cause),
            None => write!(f, "{}: {}\n{:?}", self.error_kind, self.message, self.backtrace),
        }
    }
}

impl Error for RouterError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.cause {
            Some(cause) => Some(cause.as_ref()),
            None => None,
        }
    }
}

/// A result type alias for routing operations.
pub type RouterResult<T> = Result<T, RouterError>;

impl From<SpatialError> for RouterError {
    fn from(err: SpatialError) -> Self {
        let kind = match &err {
            SpatialError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            SpatialError::DuplicateId(_) => ErrorKind::DuplicateId,
            SpatialError::Io(_) => ErrorKind::IOError,
            SpatialError::Serialization(_) | SpatialError::Corrupted(_) => {
                ErrorKind::EncodingError
            }
        };
        RouterError::new(&err.to_string(), kind)
    }
}

impl From<std::io::Error> for RouterError {
    fn from(err: std::io::Error) -> Self {
        RouterError::new(&format!("IO error: {}", err), ErrorKind::IOError)
    }
}
