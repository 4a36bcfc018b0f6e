use serde::{Deserialize, Serialize};
use std::fmt;

pub use serde_json::Value;

/// Declared type tag of a setting.
///
/// Informational for callers; handlers may use it to reject values before they
/// reach the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    #[serde(alias = "str")]
    String,
    #[serde(alias = "int", alias = "dword", alias = "qword")]
    Integer,
    #[serde(alias = "double", alias = "number")]
    Real,
    #[serde(alias = "bool")]
    Boolean,
    #[serde(alias = "object", alias = "any")]
    Json,
}

impl DataType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Real => "real",
            Self::Boolean => "boolean",
            Self::Json => "json",
        }
    }

    /// Returns `true` when `value` is representable as this type without coercion.
    #[must_use]
    pub fn accepts(self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Integer => value.is_i64() || value.is_u64(),
            Self::Real => value.is_number(),
            Self::Boolean => value.is_boolean(),
            Self::Json => true,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_matches_json_shape() {
        assert!(DataType::String.accepts(&json!("abc")));
        assert!(!DataType::String.accepts(&json!(1)));
        assert!(DataType::Integer.accepts(&json!(-4)));
        assert!(!DataType::Integer.accepts(&json!(1.5)));
        assert!(DataType::Real.accepts(&json!(1.5)));
        assert!(DataType::Real.accepts(&json!(2)));
        assert!(DataType::Boolean.accepts(&json!(true)));
        assert!(DataType::Json.accepts(&json!({ "a": [1, 2] })));
    }

    #[test]
    fn aliases_deserialize() {
        let ty: DataType = serde_json::from_value(json!("dword")).expect("alias");
        assert_eq!(ty, DataType::Integer);
        let ty: DataType = serde_json::from_value(json!("bool")).expect("alias");
        assert_eq!(ty, DataType::Boolean);
        assert!(serde_json::from_value::<DataType>(json!("blob")).is_err());
    }
}
