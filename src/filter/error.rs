use thiserror::Error;

#[derive(Error, Debug)]
pub enum FilterError {
    #[error("Invalid field: {0}")]
    InvalidColumn(String),

    #[error("Unsupported operator: {0}")]
    UnsupportedOperator(String),

    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    #[error("Invalid operator data: {0}")]
    InvalidOperatorData(String),
}
