use thiserror::Error;

/// Failures surfaced by the extract and transform stages.
#[derive(Debug, Error)]
pub enum EtlError {
    /// Transport failure or non-success HTTP status.
    #[error("Request error! {0}")]
    Request(String),

    /// The API answered, but not with the shape we read from.
    #[error("Malformed response: {what}: {detail}")]
    MalformedResponse { what: String, detail: String },

    /// Two foods carry the same `fdcId`, so the nutrient join would be ambiguous.
    #[error("Duplicate fdcId {0} in food table")]
    DuplicateFdcId(String),
}

impl EtlError {
    pub fn malformed(what: impl Into<String>, detail: impl Into<String>) -> Self {
        EtlError::MalformedResponse {
            what: what.into(),
            detail: detail.into(),
        }
    }
}
