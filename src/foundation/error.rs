pub type DockwarpResult<T> = Result<T, DockwarpError>;

#[derive(thiserror::Error, Debug)]
pub enum DockwarpError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("render error: {0}")]
    Render(String),

    /// GPU program/context failure. Carries the full compiler/linker
    /// diagnostic text so the failure is diagnosable from logs alone.
    #[error("gpu error: {0}")]
    Gpu(String),

    #[error("media error: {0}")]
    Media(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DockwarpError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    pub fn gpu(msg: impl Into<String>) -> Self {
        Self::Gpu(msg.into())
    }

    pub fn media(msg: impl Into<String>) -> Self {
        Self::Media(msg.into())
    }
}
