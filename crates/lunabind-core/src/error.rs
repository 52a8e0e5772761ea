//! Error types for identity validation and extraction.
//!
//! The taxonomy distinguishes three kinds of failure with three fates:
//!
//! ```text
//! BindError (unified wrapper)
//! ├── ExtractError - script-side, recoverable: the script handed over the
//! │                  wrong kind of object; surfaced as a catchable failure
//! └── CallerError  - binding-author mistake: validating against a type that
//!                    was never registered; fatal to the calling operation
//!
//! FinalizeFault    - recorded, never raised: a panic during a finalize hook
//!                    is swallowed at the collection boundary
//! ```
//!
//! Every condition is specific and distinguishable; nothing collapses into
//! a generic "invalid".

use std::fmt;
use thiserror::Error;

// ============================================================================
// Script-Side Errors
// ============================================================================

/// A recoverable extraction failure caused by script-side input.
///
/// These are expected conditions (a script passed the wrong kind of object)
/// and are meant to be converted into the runtime's native error-raising
/// mechanism so script code can catch them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    /// The block carries no descriptor record at all - it is not an opaque
    /// object of this binding layer.
    #[error("userdata has no metatable attached")]
    MissingMetatable,

    /// The handle refers to a block that has already been collected.
    #[error("stale userdata: block at index {index} has been collected")]
    StaleObject {
        /// The index of the collected block.
        index: u32,
    },

    /// The block's descriptor is not the record registered for the expected
    /// type.
    #[error("type mismatch: userdata is not a '{expected}'")]
    TypeMismatch {
        /// Display name of the expected host type.
        expected: &'static str,
    },

    /// A shared handle whose referent has already been released.
    #[error("shared handle to '{type_name}' is empty")]
    EmptyHandle {
        /// Display name of the host type behind the handle.
        type_name: &'static str,
    },
}

// ============================================================================
// Caller Errors
// ============================================================================

/// A binding-author mistake, fatal to the calling operation.
///
/// Unlike [`ExtractError`], these do not originate from script input and
/// must not be surfaced to scripts as catchable type errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CallerError {
    /// A validation was requested against a type that has no registry record.
    /// You cannot validate against a type you never registered.
    #[error("type '{0}' was never registered")]
    TypeNotRegistered(&'static str),
}

// ============================================================================
// Unified Error Type
// ============================================================================

/// The unified error type for binding-layer operations.
///
/// Each variant uses `#[from]` so phase-specific errors convert with `?`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindError {
    /// A script-side, recoverable extraction failure.
    #[error(transparent)]
    Extract(#[from] ExtractError),

    /// A binding-author mistake.
    #[error(transparent)]
    Caller(#[from] CallerError),
}

impl BindError {
    /// Check if this is a recoverable script-side failure.
    pub fn is_extract(&self) -> bool {
        matches!(self, BindError::Extract(_))
    }

    /// Check if this is a caller programming error.
    pub fn is_caller(&self) -> bool {
        matches!(self, BindError::Caller(_))
    }
}

// ============================================================================
// Finalization Faults
// ============================================================================

/// A fault captured while running a finalize hook during collection.
///
/// The collector has no recovery path for an error raised mid-finalization,
/// so faults are swallowed at the boundary and recorded on the heap for the
/// embedder to inspect. This is a diagnostic record, not an error value that
/// propagates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalizeFault {
    /// Display name of the type whose finalizer faulted.
    pub type_name: &'static str,
    /// The captured panic message, if one could be extracted.
    pub message: String,
}

impl fmt::Display for FinalizeFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "finalizer for '{}' faulted: {}", self.type_name, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_error_display() {
        let err = ExtractError::TypeMismatch { expected: "Point" };
        assert_eq!(format!("{err}"), "type mismatch: userdata is not a 'Point'");

        let err = ExtractError::StaleObject { index: 7 };
        assert_eq!(
            format!("{err}"),
            "stale userdata: block at index 7 has been collected"
        );
    }

    #[test]
    fn caller_error_display() {
        let err = CallerError::TypeNotRegistered("Point");
        assert_eq!(format!("{err}"), "type 'Point' was never registered");
    }

    #[test]
    fn bind_error_from_extract() {
        let err: BindError = ExtractError::MissingMetatable.into();
        assert!(err.is_extract());
        assert!(!err.is_caller());
    }

    #[test]
    fn bind_error_from_caller() {
        let err: BindError = CallerError::TypeNotRegistered("Point").into();
        assert!(err.is_caller());
        assert!(!err.is_extract());
    }

    #[test]
    fn bind_error_transparent_display() {
        let err: BindError = ExtractError::EmptyHandle { type_name: "Texture" }.into();
        assert_eq!(format!("{err}"), "shared handle to 'Texture' is empty");
    }

    #[test]
    fn finalize_fault_display() {
        let fault = FinalizeFault {
            type_name: "Point",
            message: "boom".to_string(),
        };
        assert_eq!(format!("{fault}"), "finalizer for 'Point' faulted: boom");
    }
}
