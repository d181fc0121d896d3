use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("validation error: {0}")]
    Validation(String),
}

impl ModelError {
    pub fn required(entity: &str, field: &str) -> Self {
        Self::Validation(format!("{entity}.{field} is required"))
    }
}
