use thiserror::Error;

/// Failures while bringing up the window, drawing surface or logger.
/// All of these abort startup.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("failed to create event loop: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),

    #[error("software surface error: {0}")]
    Surface(#[from] softbuffer::SoftBufferError),

    #[error("failed to install logger: {0}")]
    Logger(#[from] log::SetLoggerError),
}

/// Raised only by the bounded generator used to catch regressions in tests.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GenerateError {
    #[error("no traversable layout after {attempts} attempts")]
    Exhausted { attempts: usize },
}
