use engine_core::GraphicsError;
use input::InputError;
use thiserror::Error;

/// Why a scene could not be created.
///
/// Creation never leaves a partial scene behind: everything allocated before
/// the failing step has been released by the time one of these is returned.
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("mount point is not attached")]
    MountDetached,
    #[error("viewport has no area ({width}x{height})")]
    EmptyViewport { width: f32, height: f32 },
    #[error(transparent)]
    Graphics(#[from] GraphicsError),
    #[error(transparent)]
    Input(#[from] InputError),
}
