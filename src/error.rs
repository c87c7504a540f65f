#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum PsfError {
    #[error("{axis} should be at least {min}, got {value}")]
    InvalidGeometry {
        axis: &'static str,
        min: usize,
        value: usize,
    },
    #[error("Invalid optical parameter: {0}")]
    InvalidOptics(String),
}

pub type Result<T> = std::result::Result<T, PsfError>;
