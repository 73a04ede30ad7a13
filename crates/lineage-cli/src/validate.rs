use crate::output::CliError;
use lineage_core::error::ErrorCode;

pub const MAX_NODE_ID_LEN: usize = 128;
pub const MAX_LABEL_LEN: usize = 200;
pub const MAX_COLLECTION_LEN: usize = 64;

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub field: &'static str,
    pub value: String,
    pub reason: String,
    pub suggestion: String,
    pub code: &'static str,
}

impl ValidationError {
    pub fn new(
        field: &'static str,
        value: impl Into<String>,
        reason: impl Into<String>,
        suggestion: impl Into<String>,
        code: &'static str,
    ) -> Self {
        Self {
            field,
            value: value.into(),
            reason: reason.into(),
            suggestion: suggestion.into(),
            code,
        }
    }

    pub fn to_cli_error(&self) -> CliError {
        CliError::with_details(
            format!("invalid {} '{}': {}", self.field, self.value, self.reason),
            self.suggestion.clone(),
            self.code,
        )
    }
}

/// Node IDs are opaque, but must be usable as a single shell word.
pub fn validate_node_id(field: &'static str, s: &str) -> Result<(), ValidationError> {
    let code = ErrorCode::InvalidNodeId.code();
    if s.is_empty() {
        return Err(ValidationError::new(
            field,
            s,
            "must not be empty",
            "provide a non-empty ID",
            code,
        ));
    }
    if s.chars().count() > MAX_NODE_ID_LEN {
        return Err(ValidationError::new(
            field,
            s,
            format!("must be <= {MAX_NODE_ID_LEN} characters"),
            "use a shorter ID",
            code,
        ));
    }
    if s.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(ValidationError::new(
            field,
            s,
            "must not contain whitespace or control characters",
            "use an ID without spaces, e.g. acme-holdings",
            code,
        ));
    }
    Ok(())
}

/// Parse a `--parent` value: `none` (any case) detaches, anything else must
/// be a valid node ID.
pub fn parse_parent(s: &str) -> Result<Option<String>, ValidationError> {
    if s.eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    validate_node_id("parent", s)?;
    Ok(Some(s.to_string()))
}

pub fn validate_label(s: &str) -> Result<(), ValidationError> {
    if s.trim().is_empty() {
        return Err(ValidationError::new(
            "label",
            s,
            "must not be blank",
            "omit --label or provide text",
            "invalid_label",
        ));
    }
    if s.chars().count() > MAX_LABEL_LEN {
        return Err(ValidationError::new(
            "label",
            s,
            format!("must be <= {MAX_LABEL_LEN} characters"),
            "shorten the label",
            "invalid_label",
        ));
    }
    if s.chars().any(char::is_control) {
        return Err(ValidationError::new(
            "label",
            s,
            "must not contain control characters",
            "remove control characters from the label",
            "invalid_label",
        ));
    }
    Ok(())
}

pub fn validate_collection(s: &str) -> Result<(), ValidationError> {
    let valid_chars = s
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-');
    if s.is_empty() || s.len() > MAX_COLLECTION_LEN || !valid_chars {
        return Err(ValidationError::new(
            "collection",
            s,
            format!("must be 1-{MAX_COLLECTION_LEN} chars of [a-z0-9_-]"),
            "use a collection name like companies or pipeline_stages",
            "invalid_collection",
        ));
    }
    Ok(())
}
