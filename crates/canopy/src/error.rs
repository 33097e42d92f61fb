#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid layout options: {message}")]
    InvalidOptions { message: String },

    #[error("invalid color `{value}` (expected #rgb or #rrggbb)")]
    InvalidColor { value: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
