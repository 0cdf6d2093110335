use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Title used when nothing has been persisted yet
pub const STARTER_TITLE: &str = "Termo de Mudança";

/// Authoritative document content.
///
/// All four fields are always present; a partially written JSON object
/// deserializes with the missing fields set to the empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Template {
    pub title: String,
    pub body: String,
    pub signer1: String,
    pub signer2: String,
}

impl Template {
    pub fn new(
        title: impl Into<String>,
        body: impl Into<String>,
        signer1: impl Into<String>,
        signer2: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            signer1: signer1.into(),
            signer2: signer2.into(),
        }
    }

    /// Template served from a cold store
    pub fn starter() -> Self {
        Self {
            title: STARTER_TITLE.to_string(),
            ..Self::default()
        }
    }

    /// The four fields in canonical order (title, body, signer1, signer2)
    pub fn fields(&self) -> [&str; 4] {
        [&self.title, &self.body, &self.signer1, &self.signer2]
    }
}

/// Immutable, timestamped snapshot of a [`Template`].
///
/// Serialized flat (`{id, ts, title, body, signer1, signer2}`) so history
/// files stay readable by hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionEntry {
    pub id: String,
    /// Creation time in Unix milliseconds
    pub ts: i64,
    #[serde(flatten)]
    pub template: Template,
}

impl VersionEntry {
    /// Snapshot `template` under a fresh id and the current time
    pub fn new(template: Template) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            ts: Utc::now().timestamp_millis(),
            template,
        }
    }

    /// Field-wise equality with a template; ids and timestamps are ignored
    pub fn matches(&self, template: &Template) -> bool {
        self.template == *template
    }

    pub fn summary(&self) -> VersionSummary {
        VersionSummary {
            id: self.id.clone(),
            ts: self.ts,
            title: self.template.title.clone(),
        }
    }
}

/// Lightweight projection used for version listings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionSummary {
    pub id: String,
    pub ts: i64,
    pub title: String,
}

/// A template with every placeholder substituted
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolvedDocument {
    pub title: String,
    pub body: String,
    pub signer1: String,
    pub signer2: String,
}

impl ResolvedDocument {
    pub fn fields(&self) -> [&str; 4] {
        [&self.title, &self.body, &self.signer1, &self.signer2]
    }
}
