//! Request and response bodies
//!
//! Field names follow the wire format the web client already speaks
//! (`currentId`, `ts`, flat template fields).

use placeholder_engine::{FieldValues, Placeholder, Segment};
use serde::{Deserialize, Serialize};
use shared_types::{ExportRecord, Template, VersionEntry, VersionSummary, STARTER_TITLE};

/// Current template plus the id of the version it matches
#[derive(Debug, Serialize)]
pub struct TemplateResponse {
    #[serde(flatten)]
    pub template: Template,
    #[serde(rename = "currentId")]
    pub current_id: Option<String>,
}

/// Template sent by the editor; a missing title falls back to the starter title
#[derive(Debug, Default, Deserialize)]
pub struct TemplatePayload {
    pub title: Option<String>,
    pub body: Option<String>,
    pub signer1: Option<String>,
    pub signer2: Option<String>,
}

impl TemplatePayload {
    pub fn into_template(self) -> Template {
        Template {
            title: self.title.unwrap_or_else(|| STARTER_TITLE.to_string()),
            body: self.body.unwrap_or_default(),
            signer1: self.signer1.unwrap_or_default(),
            signer2: self.signer2.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EntryResponse {
    pub ok: bool,
    pub entry: VersionEntry,
}

#[derive(Debug, Serialize)]
pub struct VersionsResponse {
    #[serde(rename = "currentId")]
    pub current_id: Option<String>,
    pub versions: Vec<VersionSummary>,
}

#[derive(Debug, Deserialize)]
pub struct IdRequest {
    pub id: String,
}

#[derive(Debug, Serialize)]
pub struct OkResponse {
    pub ok: bool,
}

/// Placeholders of the current template and the values the form starts with
#[derive(Debug, Serialize)]
pub struct PlaceholdersResponse {
    pub placeholders: Vec<Placeholder>,
    pub values: FieldValues,
}

#[derive(Debug, Default, Deserialize)]
pub struct ValuesRequest {
    #[serde(default)]
    pub values: FieldValues,
}

/// Resolved fields split into tagged segments, for live previews
#[derive(Debug, Serialize)]
pub struct PreviewResponse<'a> {
    pub title: Vec<Segment<'a>>,
    pub body: Vec<Segment<'a>>,
    pub signer1: Vec<Segment<'a>>,
    pub signer2: Vec<Segment<'a>>,
    pub filename: String,
    pub unresolved: Vec<&'a str>,
}

#[derive(Debug, Serialize)]
pub struct ExportResponse {
    pub ok: bool,
    pub entry: ExportRecord,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub code: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub auth: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_payload_defaults() {
        let payload: TemplatePayload = serde_json::from_str(r#"{"body": "Corpo"}"#).unwrap();
        assert_eq!(
            payload.into_template(),
            Template::new(STARTER_TITLE, "Corpo", "", "")
        );
    }

    #[test]
    fn test_template_response_is_flat() {
        let response = TemplateResponse {
            template: Template::new("T", "B", "S1", "S2"),
            current_id: None,
        };
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "title": "T",
                "body": "B",
                "signer1": "S1",
                "signer2": "S2",
                "currentId": null,
            })
        );
    }
}
