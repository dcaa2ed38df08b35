//! Paginated response envelope

use crate::error::{CatalogError, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// `{items, total, pages, limit, offset}` envelope
#[derive(Debug, Clone, Deserialize)]
pub struct Page<T> {
    /// Rows on this page
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    /// Total rows across all pages
    #[serde(default)]
    pub total: u64,
    /// Page count
    #[serde(default)]
    pub pages: u64,
    /// Page size the server applied
    #[serde(default)]
    pub limit: u64,
    /// Offset of the first row
    #[serde(default)]
    pub offset: u64,
}

/// A catalog page body: envelope, or a bare array of rows
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PageBody<T> {
    /// Unpaginated array; the whole catalog in one response
    Bare(Vec<T>),
    /// Paginated envelope
    Envelope(Page<T>),
}

impl<T: DeserializeOwned> PageBody<T> {
    /// Decode a raw response body
    ///
    /// # Errors
    /// - `CatalogError::Json` if the body is not JSON or rows fail to decode
    /// - `CatalogError::InvalidResponse` if the body is neither an object nor an array
    pub fn decode(body: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(body)?;
        if !(value.is_array() || value.is_object()) {
            return Err(CatalogError::InvalidResponse(format!(
                "expected page envelope or array, got {}",
                json_kind(&value)
            )));
        }
        Ok(serde_json::from_value(value)?)
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scf_model::ScfRisk;

    #[test]
    fn decodes_envelope() {
        let body = r#"{"items":[{"object_id":"R-AC-1"}],"total":3,"pages":3,"limit":1,"offset":0}"#;
        match PageBody::<ScfRisk>::decode(body).unwrap() {
            PageBody::Envelope(page) => {
                assert_eq!(page.items.len(), 1);
                assert_eq!(page.total, 3);
            }
            PageBody::Bare(_) => panic!("expected envelope"),
        }
    }

    #[test]
    fn decodes_bare_array() {
        let body = r#"[{"object_id":"R-AC-1"},{"object_id":"R-AC-2"}]"#;
        match PageBody::<ScfRisk>::decode(body).unwrap() {
            PageBody::Bare(items) => assert_eq!(items.len(), 2),
            PageBody::Envelope(_) => panic!("expected bare array"),
        }
    }

    #[test]
    fn rejects_scalar_body() {
        let err = PageBody::<ScfRisk>::decode(r#""maintenance""#).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidResponse(_)));

        let err = PageBody::<ScfRisk>::decode("<html>").unwrap_err();
        assert!(matches!(err, CatalogError::Json(_)));
    }
}
