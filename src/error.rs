pub type LoopsmithResult<T> = Result<T, LoopsmithError>;

#[derive(thiserror::Error, Debug)]
pub enum LoopsmithError {
    #[error("no usable images: {0}")]
    EmptyResult(String),

    #[error("decode error: {0}")]
    Decode(String),

    #[error("no images provided for artifact assembly")]
    NoImages,

    #[error("runtime asset unavailable: {0}")]
    AssetUnavailable(String),

    #[error("serialization error: {0}")]
    Serde(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl LoopsmithError {
    pub fn empty_result(msg: impl Into<String>) -> Self {
        Self::EmptyResult(msg.into())
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    pub fn asset_unavailable(msg: impl Into<String>) -> Self {
        Self::AssetUnavailable(msg.into())
    }

    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}
