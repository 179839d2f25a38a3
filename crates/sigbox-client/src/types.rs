//! Data shapes exchanged with a SigBox server.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A seal template registered on the server.
///
/// The listing endpoint reports more fields than the service contract
/// pins down; everything beyond `id` and `name` is kept verbatim in
/// `extra` so callers can still reach it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub id: u64,
    pub name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Envelope the server wraps template listings in.
#[derive(Debug, Deserialize)]
pub(crate) struct TemplateListResponse {
    #[serde(rename = "templateList")]
    pub template_list: Vec<Template>,
}

/// Where a seal is stamped on a document page.
///
/// Coordinates and dimensions are in the server's user-space units,
/// `page` counts the way the server counts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SealPlacement {
    pub page: u32,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// A signed document pulled off the server.
///
/// Retrieval is destructive, so this value is the only copy the caller
/// will ever get. `file_name` is the name the server suggested via
/// `Content-Disposition`, when it suggested one.
#[derive(Debug, Clone, PartialEq)]
pub struct SignedDocument {
    pub content: Vec<u8>,
    pub file_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_template_keeps_unknown_listing_fields() {
        let json = r#"{"id":7,"name":"Default seal","created":"2024-01-01","pages":3}"#;
        let template: Template = serde_json::from_str(json).unwrap();

        assert_eq!(template.id, 7);
        assert_eq!(template.name, "Default seal");
        assert_eq!(
            template.extra.get("created").and_then(Value::as_str),
            Some("2024-01-01")
        );
        assert_eq!(template.extra.get("pages").and_then(Value::as_u64), Some(3));
    }

    #[test]
    fn test_template_listing_requires_envelope_field() {
        let err = serde_json::from_str::<TemplateListResponse>(r#"{"templates":[]}"#).unwrap_err();
        assert!(err.to_string().contains("templateList"));
    }

    #[test]
    fn test_template_round_trips_through_json() {
        let mut extra = Map::new();
        extra.insert("owner".into(), Value::String("legal".into()));
        let template = Template {
            id: 12,
            name: "Countersign".into(),
            extra,
        };

        let encoded = serde_json::to_string(&template).unwrap();
        let decoded: Template = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, template);
    }
}
