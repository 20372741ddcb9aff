use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum OrderError {
    #[error("Invalid column name: {0}")]
    InvalidColumn(String),

    #[error("Invalid sort direction '{direction}' for column '{column}'")]
    InvalidDirection { column: String, direction: String },
}
