/// Failures the shell itself recognises.
#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    /// The host could not provide the render target. Fatal at startup.
    #[error("render target {0:?} not found on the host")]
    RenderTargetMissing(String),
}

/// Frame driver state errors.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FrameError {
    #[error("frame driver is already running")]
    AlreadyRunning,
}
