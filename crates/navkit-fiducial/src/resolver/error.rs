use crate::assign::AssignError;
use navkit_core::RegistrationError;

/// Errors returned by the fiducial resolver.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ResolveError {
    #[error("no marker candidates extracted (scale guard tripped: {scale_guard_tripped})")]
    NoCandidates { scale_guard_tripped: bool },
    #[error(transparent)]
    Assign(#[from] AssignError),
    #[error("final registration failed: {0}")]
    Registration(#[from] RegistrationError),
}
