/// Convenience alias for results produced by this crate.
pub type OvertypeResult<T> = Result<T, OvertypeError>;

/// Error taxonomy for the engine.
///
/// Failures inside the render path are swallowed locally (a degenerate path
/// renders nothing, a malformed tag is skipped), so these errors surface only
/// from construction and configuration APIs.
#[derive(thiserror::Error, Debug)]
pub enum OvertypeError {
    /// Degenerate or malformed geometry that cannot be rasterized.
    #[error("geometry error: {0}")]
    Geometry(String),

    /// An override tag body that could not be interpreted.
    #[error("tag parse error: {0}")]
    TagParse(String),

    /// A buffer or cache allocation that could not be satisfied.
    #[error("resource error: {0}")]
    Resource(String),

    /// A compositing target that cannot be written.
    #[error("compositing error: {0}")]
    Compositing(String),

    /// Invalid configuration or document input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Any other error, preserved with its source chain.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl OvertypeError {
    /// Build an [`OvertypeError::Geometry`] value.
    pub fn geometry(msg: impl Into<String>) -> Self {
        Self::Geometry(msg.into())
    }

    /// Build an [`OvertypeError::TagParse`] value.
    pub fn tag_parse(msg: impl Into<String>) -> Self {
        Self::TagParse(msg.into())
    }

    /// Build an [`OvertypeError::Resource`] value.
    pub fn resource(msg: impl Into<String>) -> Self {
        Self::Resource(msg.into())
    }

    /// Build an [`OvertypeError::Compositing`] value.
    pub fn compositing(msg: impl Into<String>) -> Self {
        Self::Compositing(msg.into())
    }

    /// Build an [`OvertypeError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}
