use thiserror::Error;

#[derive(Debug, Error)]
pub enum FrontendError {
    #[error("SDL error: {0}")]
    Sdl(String),

    #[error("unknown backend \"{name}\" (available: {available})")]
    UnknownBackend { name: String, available: String },
}
