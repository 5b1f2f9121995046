//! Models shared by several actions.

use serde::{Deserialize, Serialize};

/// Key/value pair used for workflow parameters and listener properties.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ParamInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub param_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub param_value: Option<String>,
}

/// `{"Status": bool}` payload returned by update and delete actions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct BoolStatus {
    #[serde(rename = "Status")]
    pub status: Option<bool>,
}

/// Drop empty strings, which the API treats differently from absent fields.
pub fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_param_info_skips_absent_fields() {
        let param = ParamInfo {
            param_key: Some("k".into()),
            param_value: None,
        };
        assert_eq!(serde_json::to_value(&param).unwrap(), json!({"ParamKey": "k"}));
    }

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty(Some(String::new())), None);
        assert_eq!(non_empty(Some("x".into())), Some("x".into()));
        assert_eq!(non_empty(None), None);
    }
}
