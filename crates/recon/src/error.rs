use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum ReconError {
    /// Input source missing, unreadable, or undecodable.
    Resource { path: String, message: String },
    /// Row with a field count other than 4 (strict mode only).
    MalformedRow { source: String, line: u64, field_count: usize },
    /// Non-numeric price or stock (strict mode only).
    InvalidNumber { source: String, line: u64, field: String, value: String },
    /// Field bytes that are not valid UTF-8 (strict mode only).
    InvalidEncoding { source: String, line: u64, field: String },
    /// Same SKU seen twice under `DuplicatePolicy::Error`.
    DuplicateSku { source: String, sku: String, first_line: u64, line: u64 },
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (empty path, bad delimiter, etc.).
    ConfigValidation(String),
}

impl ReconError {
    pub fn resource(path: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Resource {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// True for the "source does not exist or cannot be read" category.
    pub fn is_resource(&self) -> bool {
        matches!(self, Self::Resource { .. })
    }

    /// True for errors raised by strict loading rules.
    pub fn is_malformed_input(&self) -> bool {
        matches!(
            self,
            Self::MalformedRow { .. }
                | Self::InvalidNumber { .. }
                | Self::InvalidEncoding { .. }
                | Self::DuplicateSku { .. }
        )
    }
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resource { path, message } => {
                write!(f, "file not found or is not readable: {path} ({message})")
            }
            Self::MalformedRow { source, line, field_count } => {
                write!(f, "{source}, line {line}: expected 4 fields, found {field_count}")
            }
            Self::InvalidNumber { source, line, field, value } => {
                write!(f, "{source}, line {line}: cannot parse {field} '{value}'")
            }
            Self::InvalidEncoding { source, line, field } => {
                write!(f, "{source}, line {line}: {field} is not valid UTF-8")
            }
            Self::DuplicateSku { source, sku, first_line, line } => {
                write!(
                    f,
                    "{source}, line {line}: duplicate SKU '{sku}' (first seen on line {first_line})"
                )
            }
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
        }
    }
}

impl std::error::Error for ReconError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_message_names_path() {
        let err = ReconError::resource("inv1.csv", "No such file or directory");
        assert!(err.is_resource());
        assert!(!err.is_malformed_input());
        assert!(err.to_string().contains("inv1.csv"));
    }

    #[test]
    fn malformed_row_message() {
        let err = ReconError::MalformedRow {
            source: "inv2.csv".into(),
            line: 7,
            field_count: 3,
        };
        assert!(err.is_malformed_input());
        assert_eq!(err.to_string(), "inv2.csv, line 7: expected 4 fields, found 3");
    }
}
