use crate::Posture;

/// Errors returned by frame couple operations.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameError {
    #[error("frame relationship is already initialized")]
    AlreadyInitialized,
    #[error("frame relationship is not initialized")]
    NotInitialized,
    #[error("cup axis projection vanishes in the {0:?} posture")]
    DegenerateAxis(Posture),
}
