//! Error types used by logvisor setup and delivery.
//!
//! This module defines three error enums:
//!
//! - [`ConfigError`]: invalid observer configuration, detected eagerly at setup.
//! - [`DeliveryError`]: a batch processor failed to deliver a batch.
//! - [`SetupError`]: assembling a [`LogSystem`](crate::LogSystem) failed.
//!
//! None of them ever reaches the code that emitted a log event: configuration
//! and setup errors are returned from setup calls, delivery errors are reported
//! to the [`StatusChannel`](crate::StatusChannel) and the batch is dropped.
//!
//! All provide an `as_label` helper for diagnostics.

use thiserror::Error;

/// # Errors produced while reading observer configuration.
///
/// These are fatal to the setup of the observer being configured; they are
/// never raised at flush time.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A value could not be parsed as an ISO-8601 duration (`PT5S`, `PT1M`, `P1D`).
    #[error("invalid duration for {key}: {value:?}")]
    InvalidDuration {
        /// Full configuration key.
        key: String,
        /// Offending value.
        value: String,
    },

    /// A throttle schedule contained no durations.
    #[error("empty throttle schedule for marker {marker}")]
    EmptySchedule {
        /// Marker the schedule was configured for.
        marker: String,
    },

    /// A value could not be parsed as a level.
    #[error("invalid level for {key}: {value:?}")]
    InvalidLevel {
        /// Full configuration key.
        key: String,
        /// Offending value.
        value: String,
    },

    /// A value could not be parsed as a boolean.
    #[error("invalid boolean for {key}: {value:?}")]
    InvalidBool {
        /// Full configuration key.
        key: String,
        /// Offending value.
        value: String,
    },

    /// A value was not one of the accepted choices.
    #[error("invalid value for {key}: {value:?} (expected one of {expected})")]
    InvalidValue {
        /// Full configuration key.
        key: String,
        /// Offending value.
        value: String,
        /// Accepted choices, for the message.
        expected: &'static str,
    },

    /// A required key was absent.
    #[error("missing required key {key}")]
    Missing {
        /// Full configuration key.
        key: String,
    },

    /// Keys under the observer prefix that no component consumed.
    #[error("unknown configuration keys: {fields:?}")]
    UnknownFields {
        /// Full keys that were never read.
        fields: Vec<String>,
    },
}

impl ConfigError {
    /// Returns a short stable label (snake_case) for diagnostics.
    ///
    /// # Example
    /// ```
    /// use logvisor::ConfigError;
    ///
    /// let err = ConfigError::EmptySchedule { marker: "AUDIT".into() };
    /// assert_eq!(err.as_label(), "config_empty_schedule");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ConfigError::InvalidDuration { .. } => "config_invalid_duration",
            ConfigError::EmptySchedule { .. } => "config_empty_schedule",
            ConfigError::InvalidLevel { .. } => "config_invalid_level",
            ConfigError::InvalidBool { .. } => "config_invalid_bool",
            ConfigError::InvalidValue { .. } => "config_invalid_value",
            ConfigError::Missing { .. } => "config_missing",
            ConfigError::UnknownFields { .. } => "config_unknown_fields",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        self.to_string()
    }
}

/// # Errors produced by batch delivery.
///
/// Returned by [`BatchProcessor::process_batch`](crate::BatchProcessor::process_batch).
/// The batching engine reports them and drops the batch; retrying is left to
/// the processor itself.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    /// The sink could not be reached.
    #[error("sink unavailable: {reason}")]
    Unavailable {
        /// Underlying transport message.
        reason: String,
    },

    /// The sink was reached but refused the batch.
    #[error("sink rejected batch: {reason}")]
    Rejected {
        /// Reason reported by the sink.
        reason: String,
    },

    /// The batch could not be rendered into the sink's payload format.
    #[error("failed to format batch: {reason}")]
    Format {
        /// Formatter message.
        reason: String,
    },
}

impl DeliveryError {
    /// Returns a short stable label (snake_case) for diagnostics.
    ///
    /// # Example
    /// ```
    /// use logvisor::DeliveryError;
    ///
    /// let err = DeliveryError::Rejected { reason: "413".into() };
    /// assert_eq!(err.as_label(), "delivery_rejected");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            DeliveryError::Unavailable { .. } => "delivery_unavailable",
            DeliveryError::Rejected { .. } => "delivery_rejected",
            DeliveryError::Format { .. } => "delivery_format",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            DeliveryError::Unavailable { reason } => format!("unavailable: {reason}"),
            DeliveryError::Rejected { reason } => format!("rejected: {reason}"),
            DeliveryError::Format { reason } => format!("format: {reason}"),
        }
    }

    /// Indicates whether a processor could reasonably retry the same batch.
    ///
    /// Returns `true` for [`DeliveryError::Unavailable`] only.
    pub fn is_transient(&self) -> bool {
        matches!(self, DeliveryError::Unavailable { .. })
    }
}

/// # Errors produced while assembling a [`LogSystem`](crate::LogSystem).
///
/// Unlike [`ConfigError`] this may wrap I/O failures (starting the scheduler
/// runtime, registering signal handlers), so it is neither `Clone` nor `Eq`.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum SetupError {
    /// Invalid configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A logger was bound to an observer name nobody registered.
    #[error("unknown observer {name:?} for logger {logger:?}")]
    UnknownObserver {
        /// Observer name as written in the configuration.
        name: String,
        /// Logger it was bound to (empty for root).
        logger: String,
    },

    /// The scheduler runtime or a signal handler could not be started.
    #[error("runtime setup failed: {0}")]
    Io(#[from] std::io::Error),
}

impl SetupError {
    /// Returns a short stable label (snake_case) for diagnostics.
    pub fn as_label(&self) -> &'static str {
        match self {
            SetupError::Config(e) => e.as_label(),
            SetupError::UnknownObserver { .. } => "setup_unknown_observer",
            SetupError::Io(_) => "setup_io",
        }
    }
}
