//! Mirror lifecycle
//!
//! `Absent -> Building -> Ready`; a ready mirror is destroyed back to
//! `Absent` or rebuilt through `Building`. A failed build falls back to
//! `Absent`.

use crate::error::{TreeError, TreeResult};
use std::fmt;

/// Lifecycle state of one mirror name
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum MirrorState {
    /// No mirror under the name
    #[default]
    Absent,
    /// Mirror is being (re)built
    Building,
    /// Mirror is open and displayed
    Ready,
}

impl fmt::Display for MirrorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Absent => "absent",
            Self::Building => "building",
            Self::Ready => "ready",
        })
    }
}

/// States reachable from `from`
#[must_use]
pub fn allowed_transitions(from: MirrorState) -> Vec<MirrorState> {
    use MirrorState::{Absent, Building, Ready};
    match from {
        Absent => vec![Building],
        Building => vec![Ready, Absent],
        Ready => vec![Absent, Building],
    }
}

/// Validate a transition of mirror `name`
///
/// # Errors
/// Returns `IllegalTransition` when `to` is not reachable from `from`
pub fn validate_transition(name: &str, from: MirrorState, to: MirrorState) -> TreeResult<()> {
    if allowed_transitions(from).contains(&to) {
        Ok(())
    } else {
        Err(TreeError::IllegalTransition {
            name: name.to_string(),
            from,
            to,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle() {
        assert!(validate_transition("t", MirrorState::Absent, MirrorState::Building).is_ok());
        assert!(validate_transition("t", MirrorState::Building, MirrorState::Ready).is_ok());
        assert!(validate_transition("t", MirrorState::Ready, MirrorState::Building).is_ok());
        assert!(validate_transition("t", MirrorState::Ready, MirrorState::Absent).is_ok());
    }

    #[test]
    fn rejects_skipping_build() {
        let err = validate_transition("t", MirrorState::Absent, MirrorState::Ready).unwrap_err();
        assert!(matches!(
            err,
            TreeError::IllegalTransition {
                from: MirrorState::Absent,
                to: MirrorState::Ready,
                ..
            }
        ));
        assert!(validate_transition("t", MirrorState::Building, MirrorState::Building).is_err());
    }
}
