//! Error taxonomy for the runtime core

use thiserror::Error;

use crate::value::Integer;

/// The closed set of error kinds a script can observe.
///
/// The discriminants are stable: scripts name error kinds by these integers
/// when installing handlers, and the core library exports them as `ERR_*`
/// constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ErrorKind {
    /// Placeholder kind; never raised
    Null = 0,
    /// Success; never raised
    Ok = 1,
    /// Unconditional script termination
    Terminate = 2,
    /// A value could not be converted to the requested type
    IllegalCast = 3,
    /// Mutation of a locked value
    ValueLocked = 4,
    /// Structure member lookup failed
    NoSuchMember = 5,
    /// A name was declared twice in the same table
    DuplicateSymbol = 6,
    /// Symbol lookup failed
    NoSuchSymbol = 7,
    /// Division by zero in a library routine
    DivideByZero = 8,
    /// Argument outside the mathematical domain of a routine
    DomainError = 9,
    /// Index outside an array's range, or mismatched array lengths
    RangeError = 10,
    /// Reference to a handle that is not open
    IllegalHandle = 11,
    /// A value outside the allowable range of its declared type
    IllegalValue = 12,
    /// The environment stack exceeded its configured depth
    StackOverflowError = 13,
}

impl ErrorKind {
    /// Every kind, ordered by index.
    pub const ALL: [ErrorKind; 14] = [
        ErrorKind::Null,
        ErrorKind::Ok,
        ErrorKind::Terminate,
        ErrorKind::IllegalCast,
        ErrorKind::ValueLocked,
        ErrorKind::NoSuchMember,
        ErrorKind::DuplicateSymbol,
        ErrorKind::NoSuchSymbol,
        ErrorKind::DivideByZero,
        ErrorKind::DomainError,
        ErrorKind::RangeError,
        ErrorKind::IllegalHandle,
        ErrorKind::IllegalValue,
        ErrorKind::StackOverflowError,
    ];

    /// The stable integer index of this kind.
    pub fn index(self) -> Integer {
        self as Integer
    }

    /// Look up a kind by its integer index.
    pub fn from_index(index: Integer) -> Option<Self> {
        usize::try_from(index)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
    }

    /// The kind's name as shown in diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            ErrorKind::Null => "Null",
            ErrorKind::Ok => "Ok",
            ErrorKind::Terminate => "Terminate",
            ErrorKind::IllegalCast => "IllegalCast",
            ErrorKind::ValueLocked => "ValueLocked",
            ErrorKind::NoSuchMember => "NoSuchMember",
            ErrorKind::DuplicateSymbol => "DuplicateSymbol",
            ErrorKind::NoSuchSymbol => "NoSuchSymbol",
            ErrorKind::DivideByZero => "DivideByZero",
            ErrorKind::DomainError => "DomainError",
            ErrorKind::RangeError => "RangeError",
            ErrorKind::IllegalHandle => "IllegalHandle",
            ErrorKind::IllegalValue => "IllegalValue",
            ErrorKind::StackOverflowError => "StackOverflowError",
        }
    }

    /// The name of the base-table constant carrying this kind's index.
    pub fn constant_name(self) -> &'static str {
        match self {
            ErrorKind::Null => "ERR_NULL",
            ErrorKind::Ok => "ERR_OK",
            ErrorKind::Terminate => "ERR_TERMINATE",
            ErrorKind::IllegalCast => "ERR_ILLEGAL_CAST",
            ErrorKind::ValueLocked => "ERR_VALUE_LOCKED",
            ErrorKind::NoSuchMember => "ERR_NO_SUCH_MEMBER",
            ErrorKind::DuplicateSymbol => "ERR_DUPLICATE_SYMBOL",
            ErrorKind::NoSuchSymbol => "ERR_NO_SUCH_SYMBOL",
            ErrorKind::DivideByZero => "ERR_DIVIDE_BY_ZERO",
            ErrorKind::DomainError => "ERR_DOMAIN_ERROR",
            ErrorKind::RangeError => "ERR_RANGE_ERROR",
            ErrorKind::IllegalHandle => "ERR_ILLEGAL_HANDLE",
            ErrorKind::IllegalValue => "ERR_ILLEGAL_VALUE",
            ErrorKind::StackOverflowError => "ERR_STACK_OVERFLOW",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Errors raised by the runtime core.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RuntimeError {
    /// Script requested termination; bypasses every error handler
    #[error("{message}")]
    Terminate {
        /// Reason for termination
        message: String,
    },

    /// Conversion between value types failed
    #[error("{message}")]
    IllegalCast {
        /// Description of the failed conversion
        message: String,
    },

    /// Attempted mutation of a locked value
    #[error("Cannot modify a locked value.")]
    ValueLocked,

    /// Structure member does not exist
    #[error("The member '{member}' does not exist.")]
    NoSuchMember {
        /// Requested member name
        member: String,
    },

    /// Symbol, member, or parameter declared twice
    #[error("{message}")]
    DuplicateSymbol {
        /// Description of the collision
        message: String,
    },

    /// Symbol lookup failed
    #[error("The symbol '{symbol}' does not exist.")]
    NoSuchSymbol {
        /// Requested symbol (mangled when looking up an overload)
        symbol: String,
    },

    /// Division by zero
    #[error("{message}")]
    DivideByZero {
        /// Description of the operation
        message: String,
    },

    /// Argument outside a routine's domain
    #[error("{message}")]
    DomainError {
        /// Description of the violation
        message: String,
    },

    /// Index or shape outside an array's range
    #[error("{message}")]
    RangeError {
        /// Description of the violation
        message: String,
    },

    /// Use of a handle that is not open
    #[error("{message}")]
    IllegalHandle {
        /// Description of the handle
        message: String,
    },

    /// Value outside the range of its declared type
    #[error("{message}")]
    IllegalValue {
        /// Description of the violation
        message: String,
    },

    /// Environment stack exceeded its maximum depth
    #[error("Stack overflow: depth {depth} exceeds the maximum of {max}.")]
    StackOverflow {
        /// Depth that was requested
        depth: usize,
        /// Configured maximum
        max: usize,
    },
}

impl RuntimeError {
    /// The taxonomy kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            RuntimeError::Terminate { .. } => ErrorKind::Terminate,
            RuntimeError::IllegalCast { .. } => ErrorKind::IllegalCast,
            RuntimeError::ValueLocked => ErrorKind::ValueLocked,
            RuntimeError::NoSuchMember { .. } => ErrorKind::NoSuchMember,
            RuntimeError::DuplicateSymbol { .. } => ErrorKind::DuplicateSymbol,
            RuntimeError::NoSuchSymbol { .. } => ErrorKind::NoSuchSymbol,
            RuntimeError::DivideByZero { .. } => ErrorKind::DivideByZero,
            RuntimeError::DomainError { .. } => ErrorKind::DomainError,
            RuntimeError::RangeError { .. } => ErrorKind::RangeError,
            RuntimeError::IllegalHandle { .. } => ErrorKind::IllegalHandle,
            RuntimeError::IllegalValue { .. } => ErrorKind::IllegalValue,
            RuntimeError::StackOverflow { .. } => ErrorKind::StackOverflowError,
        }
    }

    /// The human-readable message, without the kind prefix.
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Whether a script-installed handler may intercept this error.
    pub fn is_catchable(&self) -> bool {
        self.kind() != ErrorKind::Terminate
    }

    /// Diagnostic line naming both kind and message.
    pub fn diagnostic(&self) -> String {
        format!("{}: {}", self.kind(), self)
    }

    // ═══════════════════════════════════════════════════════════════════
    // Constructors
    // ═══════════════════════════════════════════════════════════════════

    /// Build a `Terminate` error.
    pub fn terminate(message: impl Into<String>) -> Self {
        RuntimeError::Terminate {
            message: message.into(),
        }
    }

    /// Build an `IllegalCast` error.
    pub fn illegal_cast(message: impl Into<String>) -> Self {
        RuntimeError::IllegalCast {
            message: message.into(),
        }
    }

    /// `IllegalCast` for converting a value of kind `from` into `to`.
    pub fn cannot_cast(from: &str, to: &str) -> Self {
        Self::illegal_cast(format!("Cannot cast a value of type {from} to {to}."))
    }

    /// Build a `NoSuchMember` error.
    pub fn no_such_member(member: impl Into<String>) -> Self {
        RuntimeError::NoSuchMember {
            member: member.into(),
        }
    }

    /// Build a `DuplicateSymbol` error.
    pub fn duplicate_symbol(message: impl Into<String>) -> Self {
        RuntimeError::DuplicateSymbol {
            message: message.into(),
        }
    }

    /// Build a `NoSuchSymbol` error.
    pub fn no_such_symbol(symbol: impl Into<String>) -> Self {
        RuntimeError::NoSuchSymbol {
            symbol: symbol.into(),
        }
    }

    /// Build a `DivideByZero` error.
    pub fn divide_by_zero(message: impl Into<String>) -> Self {
        RuntimeError::DivideByZero {
            message: message.into(),
        }
    }

    /// Build a `DomainError`.
    pub fn domain(message: impl Into<String>) -> Self {
        RuntimeError::DomainError {
            message: message.into(),
        }
    }

    /// Build a `RangeError`.
    pub fn range(message: impl Into<String>) -> Self {
        RuntimeError::RangeError {
            message: message.into(),
        }
    }

    /// `RangeError` for an index outside `[start, finish]`.
    pub fn index_out_of_range(index: Integer, start: Integer, finish: Integer) -> Self {
        Self::range(format!(
            "The specified index, {index}, does not fall within [{start}, {finish}]."
        ))
    }

    /// Build an `IllegalHandle` error.
    pub fn illegal_handle(message: impl Into<String>) -> Self {
        RuntimeError::IllegalHandle {
            message: message.into(),
        }
    }

    /// Build an `IllegalValue` error.
    pub fn illegal_value(message: impl Into<String>) -> Self {
        RuntimeError::IllegalValue {
            message: message.into(),
        }
    }
}

/// Result type alias for runtime operations
pub type Result<T> = std::result::Result<T, RuntimeError>;
