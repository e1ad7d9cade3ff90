//! Value types shared by the `SyncEngine` and its caller (file parsing,
//! conflict resolution) — spec §4.5.

use serde::{Deserialize, Serialize};
use serde_json::Value;

define_string_enum! {
    /// On-disk work-item file encoding, inferred from extension.
    pub enum FileFormat {
        Json => "json",
        Yaml => "yaml",
    }
}

impl FileFormat {
    /// Infer a format from a file extension (without the leading dot).
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "json" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            _ => None,
        }
    }

    /// The canonical extension (without the leading dot) for this format.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Yaml => "yaml",
        }
    }
}

/// A work-item file after parsing, before validation (spec §4.5 File→Store
/// step 1). Required fields (`id`, `title`, `type`) are surfaced explicitly;
/// everything else travels as the raw JSON value for the validator to check.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct ParsedWorkItem {
    /// The file format the content was parsed from.
    pub format: FileFormat,
    /// The parsed document, with defaults applied
    /// (`status=not_started`, `priority=medium`) for fields missing on disk.
    pub document: Value,
}

define_string_enum! {
    /// Resolution policy applied when a File→Store sync finds conflicting
    /// fields between the incoming file and the stored record (spec §4.5.1).
    pub enum MergeStrategy {
        FileWins => "file_wins",
        DatabaseWins => "database_wins",
        AutoMerge => "auto_merge",
        ManualResolution => "manual_resolution",
        /// Reserved; always downgrades to `ManualResolution` at resolution
        /// time (SPEC_FULL §11.2).
        CreateBranch => "create_branch",
    }
}

/// One field that differs between the incoming file and the stored record.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct ConflictField {
    /// The field name that differs.
    pub field: String,
    /// The value on disk.
    pub file_value: Value,
    /// The value currently in the Store.
    pub store_value: Value,
}

/// The set of conflicting fields detected between an incoming file and the
/// stored record it targets (spec §4.5.1 detection).
#[derive(Debug, Clone, Default, Serialize, Deserialize, schemars::JsonSchema)]
pub struct SyncConflict {
    /// Every field that differs, in a stable, deterministic order.
    pub fields: Vec<ConflictField>,
    /// Present when a `create_branch` request was downgraded
    /// (SPEC_FULL §11.2): `Some("create_branch")`.
    pub downgraded_from: Option<String>,
}

impl SyncConflict {
    /// `true` iff no field differs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
