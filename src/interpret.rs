//! Natural-language interpretation contract.
//!
//! Turning free text into parameters is an external service's job; this
//! module owns only the client-side seam. The [`Interpreter`] trait is the
//! pluggable boundary, [`request_context`] shapes what a service receives,
//! and [`parse_response`] applies the tolerant JSON rules to whatever comes
//! back. No transport ships with the crate; demos and callers provide their
//! own implementation.
//!
//! # Usage
//!
//! ```ignore
//! use lumina::{Interpreter, InterpretError, ParamSet, ParamUpdate};
//!
//! struct Canned;
//!
//! impl Interpreter for Canned {
//!     fn interpret(&self, _prompt: &str, _current: &ParamSet)
//!         -> Result<ParamUpdate, InterpretError>
//!     {
//!         lumina::interpret::parse_response(r#"{"mode": "vortex", "speed": 2.0}"#)
//!     }
//! }
//! ```

use std::fmt;

use crate::params::{ParamSet, ParamUpdate};

/// Translates a free-text request into a partial parameter update.
///
/// Implementations receive the current parameters so relative requests
/// ("faster", "more of them") have something to be relative to. Calls run
/// on a worker thread, never on the frame loop.
pub trait Interpreter: Send + Sync {
    fn interpret(&self, prompt: &str, current: &ParamSet) -> Result<ParamUpdate, InterpretError>;
}

/// Why an interpretation attempt produced no update.
///
/// The two cases stay distinguishable for logs even though the user-facing
/// surface collapses them into one generic message.
#[derive(Debug)]
pub enum InterpretError {
    /// The service could not be reached at all.
    Unreachable(String),
    /// The service answered, but not with a usable parameter object.
    Parse(serde_json::Error),
}

impl fmt::Display for InterpretError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InterpretError::Unreachable(msg) => {
                write!(f, "Interpretation service unreachable: {}", msg)
            }
            InterpretError::Parse(e) => write!(f, "Unusable service response: {}", e),
        }
    }
}

impl std::error::Error for InterpretError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            InterpretError::Parse(e) => Some(e),
            InterpretError::Unreachable(_) => None,
        }
    }
}

impl From<serde_json::Error> for InterpretError {
    fn from(e: serde_json::Error) -> Self {
        InterpretError::Parse(e)
    }
}

/// Build the context string an interpretation service receives: the current
/// state as JSON and the verbatim user request.
pub fn request_context(prompt: &str, current: &ParamSet) -> String {
    let state = serde_json::to_string(current).expect("parameter snapshot serializes");
    format!(
        "Current state: {}. User wants: \"{}\". \
         Translate this into a new configuration for a 3D particle system.",
        state, prompt
    )
}

/// Parse a raw service response into an update.
///
/// Surrounding whitespace is tolerated; anything that is not a JSON object
/// is a [`InterpretError::Parse`]. Field-level problems inside the object
/// are handled leniently by [`ParamUpdate::from_json`].
pub fn parse_response(text: &str) -> Result<ParamUpdate, InterpretError> {
    Ok(ParamUpdate::from_json(text.trim())?)
}
