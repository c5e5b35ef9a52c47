//! Error types for switch configuration operations.
//!
//! Every fallible call into a switch driver or the registry returns a
//! [`SwConfigError`]. The subsystem that sits above the drivers speaks kernel
//! errno values, so each variant also maps onto one via [`SwConfigError::errno`].

use thiserror::Error;

/// Result type alias for switch configuration operations.
pub type SwResult<T> = Result<T, SwConfigError>;

/// Errors that can occur during switch configuration operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SwConfigError {
    /// An index or value supplied by the caller is out of range.
    ///
    /// Returned before any state is touched.
    #[error("Invalid argument {field}: {message}")]
    InvalidArgument {
        /// The argument that failed validation.
        field: String,
        /// Error message.
        message: String,
    },

    /// Allocation of driver or registry state failed.
    #[error("Out of memory while allocating {what}")]
    OutOfMemory {
        /// What was being allocated.
        what: String,
    },

    /// The subsystem refused to register a switch.
    #[error("Failed to register switch '{name}': {message}")]
    Registration {
        /// The switch name.
        name: String,
        /// Error message.
        message: String,
    },

    /// A switch with the same name is already registered.
    #[error("Switch '{name}' is already registered")]
    AlreadyRegistered {
        /// The switch name.
        name: String,
    },

    /// A hardware command did not complete in time.
    ///
    /// Drivers log this condition; it is not propagated to callers of the
    /// switch operations.
    #[error("Hardware timeout waiting on register {register:#06x} after {polls} polls")]
    HardwareTimeout {
        /// The polled register address.
        register: u32,
        /// Number of polls performed.
        polls: u32,
    },

    /// The switch does not expose an attribute with this name.
    #[error("Unknown attribute '{name}'")]
    UnknownAttribute {
        /// The attribute name.
        name: String,
    },

    /// No switch is registered under this name.
    #[error("Switch '{name}' not found")]
    SwitchNotFound {
        /// The switch name.
        name: String,
    },

    /// Configuration file could not be read or parsed.
    #[error("Invalid configuration: {message}")]
    Config {
        /// Error message.
        message: String,
    },
}

/// Kernel errno values the switch subsystem reports.
pub mod errno {
    /// Cannot allocate memory.
    pub const ENOMEM: i32 = 12;
    /// File exists.
    pub const EEXIST: i32 = 17;
    /// No such device.
    pub const ENODEV: i32 = 19;
    /// Invalid argument.
    pub const EINVAL: i32 = 22;
    /// Operation not supported.
    pub const EOPNOTSUPP: i32 = 95;
    /// Connection timed out.
    pub const ETIMEDOUT: i32 = 110;
}

impl SwConfigError {
    /// Creates an invalid argument error.
    pub fn invalid_argument(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Creates an out of memory error.
    pub fn out_of_memory(what: impl Into<String>) -> Self {
        Self::OutOfMemory { what: what.into() }
    }

    /// Creates a registration error.
    pub fn registration(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Registration {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Creates a hardware timeout error.
    pub fn hardware_timeout(register: u32, polls: u32) -> Self {
        Self::HardwareTimeout { register, polls }
    }

    /// Creates an unknown attribute error.
    pub fn unknown_attribute(name: impl Into<String>) -> Self {
        Self::UnknownAttribute { name: name.into() }
    }

    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Returns the negative errno value reported to the subsystem.
    pub fn errno(&self) -> i32 {
        -match self {
            SwConfigError::InvalidArgument { .. } | SwConfigError::Config { .. } => errno::EINVAL,
            SwConfigError::Registration { .. } => errno::EINVAL,
            SwConfigError::OutOfMemory { .. } => errno::ENOMEM,
            SwConfigError::AlreadyRegistered { .. } => errno::EEXIST,
            SwConfigError::HardwareTimeout { .. } => errno::ETIMEDOUT,
            SwConfigError::UnknownAttribute { .. } => errno::EOPNOTSUPP,
            SwConfigError::SwitchNotFound { .. } => errno::ENODEV,
        }
    }

    /// Returns true if this error aborted a switch registration.
    pub fn is_registration_failure(&self) -> bool {
        matches!(
            self,
            SwConfigError::Registration { .. }
                | SwConfigError::AlreadyRegistered { .. }
                | SwConfigError::OutOfMemory { .. }
        )
    }
}
