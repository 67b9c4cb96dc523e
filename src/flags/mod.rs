//! Feature flags describing which optional SDK capabilities are needed.
//!
//! Every question the operator answers maps to a [`FlagKey`]. Answers arrive
//! from three places (interactive prompts, `auto` arguments, an answers file)
//! and are collected as [`RawAnswers`]. [`FeatureFlags::from_raw`] turns them
//! into the immutable structure the planner consumes.

pub mod config;

use anyhow::{bail, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// A yes/no answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Answer {
    Yes,
    No,
}

impl Answer {
    pub fn is_yes(self) -> bool {
        self == Answer::Yes
    }

    pub fn is_no(self) -> bool {
        self == Answer::No
    }

    /// Parse `y`, `n`, `yes`, `no` (case-insensitive).
    ///
    /// Returns `Ok(None)` for an empty value so callers can apply the key's
    /// default.
    pub fn parse(value: &str) -> Result<Option<Self>> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" => Ok(None),
            "y" | "yes" => Ok(Some(Answer::Yes)),
            "n" | "no" => Ok(Some(Answer::No)),
            other => bail!("answer must be 'y' or 'n', got '{}'", other),
        }
    }
}

impl From<bool> for Answer {
    fn from(value: bool) -> Self {
        if value {
            Answer::Yes
        } else {
            Answer::No
        }
    }
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Answer::Yes => write!(f, "y"),
            Answer::No => write!(f, "n"),
        }
    }
}

/// The fixed option set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagKey {
    Backup,
    WebViewerServer,
    ConvertToXod,
    Office,
    LegacyOffice,
    FullApi,
    PdfnetProd,
    ContentEdit,
    OfficeEditor,
    SpreadsheetEditor,
    Salesforce,
    ExcludeOptimizedWorkers,
    SourceMap,
    WebComponent,
    DeleteUnused,
}

impl FlagKey {
    pub const ALL: [FlagKey; 15] = [
        FlagKey::Backup,
        FlagKey::WebViewerServer,
        FlagKey::ConvertToXod,
        FlagKey::Office,
        FlagKey::LegacyOffice,
        FlagKey::FullApi,
        FlagKey::PdfnetProd,
        FlagKey::ContentEdit,
        FlagKey::OfficeEditor,
        FlagKey::SpreadsheetEditor,
        FlagKey::Salesforce,
        FlagKey::ExcludeOptimizedWorkers,
        FlagKey::SourceMap,
        FlagKey::WebComponent,
        FlagKey::DeleteUnused,
    ];

    /// Name used in answers files and plan output.
    pub fn name(self) -> &'static str {
        match self {
            FlagKey::Backup => "backup",
            FlagKey::WebViewerServer => "web_viewer_server",
            FlagKey::ConvertToXod => "convert_to_xod",
            FlagKey::Office => "office",
            FlagKey::LegacyOffice => "legacy_office",
            FlagKey::FullApi => "full_api",
            FlagKey::PdfnetProd => "pdfnet_prod",
            FlagKey::ContentEdit => "content_edit",
            FlagKey::OfficeEditor => "office_editor",
            FlagKey::SpreadsheetEditor => "spreadsheet_editor",
            FlagKey::Salesforce => "salesforce",
            FlagKey::ExcludeOptimizedWorkers => "exclude_optimized_workers",
            FlagKey::SourceMap => "source_map",
            FlagKey::WebComponent => "web_component",
            FlagKey::DeleteUnused => "delete_unused",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        FlagKey::ALL.into_iter().find(|key| key.name() == name)
    }

    /// Value used when the key was never answered.
    ///
    /// Only the deletion confirmation defaults to yes.
    pub fn default_answer(self) -> Answer {
        match self {
            FlagKey::DeleteUnused => Answer::Yes,
            _ => Answer::No,
        }
    }
}

impl fmt::Display for FlagKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Answers as collected, before defaults are applied.
pub type RawAnswers = BTreeMap<FlagKey, Option<Answer>>;

/// Resolved, immutable feature flags for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FeatureFlags {
    pub backup: Answer,
    pub web_viewer_server: Answer,
    pub convert_to_xod: Answer,
    pub office: Answer,
    pub legacy_office: Answer,
    pub full_api: Answer,
    pub pdfnet_prod: Answer,
    pub content_edit: Answer,
    pub office_editor: Answer,
    pub spreadsheet_editor: Answer,
    pub salesforce: Answer,
    pub exclude_optimized_workers: Answer,
    pub source_map: Answer,
    pub web_component: Answer,
    pub delete_unused: Answer,
    /// Installed package vs. direct download. Passed through untouched.
    pub installed_package: bool,
}

impl FeatureFlags {
    /// Apply defaults to raw answers.
    ///
    /// Absent and empty answers become `No`, except `delete_unused` which
    /// becomes `Yes`. `installed_package` is taken as given.
    pub fn from_raw(raw: &RawAnswers, installed_package: bool) -> Self {
        let get = |key: FlagKey| {
            raw.get(&key)
                .copied()
                .flatten()
                .unwrap_or_else(|| key.default_answer())
        };

        Self {
            backup: get(FlagKey::Backup),
            web_viewer_server: get(FlagKey::WebViewerServer),
            convert_to_xod: get(FlagKey::ConvertToXod),
            office: get(FlagKey::Office),
            legacy_office: get(FlagKey::LegacyOffice),
            full_api: get(FlagKey::FullApi),
            pdfnet_prod: get(FlagKey::PdfnetProd),
            content_edit: get(FlagKey::ContentEdit),
            office_editor: get(FlagKey::OfficeEditor),
            spreadsheet_editor: get(FlagKey::SpreadsheetEditor),
            salesforce: get(FlagKey::Salesforce),
            exclude_optimized_workers: get(FlagKey::ExcludeOptimizedWorkers),
            source_map: get(FlagKey::SourceMap),
            web_component: get(FlagKey::WebComponent),
            delete_unused: get(FlagKey::DeleteUnused),
            installed_package,
        }
    }

    pub fn get(&self, key: FlagKey) -> Answer {
        match key {
            FlagKey::Backup => self.backup,
            FlagKey::WebViewerServer => self.web_viewer_server,
            FlagKey::ConvertToXod => self.convert_to_xod,
            FlagKey::Office => self.office,
            FlagKey::LegacyOffice => self.legacy_office,
            FlagKey::FullApi => self.full_api,
            FlagKey::PdfnetProd => self.pdfnet_prod,
            FlagKey::ContentEdit => self.content_edit,
            FlagKey::OfficeEditor => self.office_editor,
            FlagKey::SpreadsheetEditor => self.spreadsheet_editor,
            FlagKey::Salesforce => self.salesforce,
            FlagKey::ExcludeOptimizedWorkers => self.exclude_optimized_workers,
            FlagKey::SourceMap => self.source_map,
            FlagKey::WebComponent => self.web_component,
            FlagKey::DeleteUnused => self.delete_unused,
        }
    }

    /// Reject flag combinations the archival target cannot package.
    ///
    /// Archives need the optimized worker of the surviving PDF tier, which
    /// excluding optimized workers or full document conversion deletes.
    pub fn check_archival(&self) -> Result<()> {
        if self.salesforce.is_no() {
            return Ok(());
        }
        if self.exclude_optimized_workers.is_yes() {
            bail!(
                "'{}' cannot be combined with '{}': the optimized worker is needed for the archives",
                FlagKey::Salesforce,
                FlagKey::ExcludeOptimizedWorkers
            );
        }
        if self.convert_to_xod.is_yes() && self.web_viewer_server.is_no() {
            bail!(
                "'{}' cannot be combined with '{}': converted documents drop the PDF engine the archives need",
                FlagKey::Salesforce,
                FlagKey::ConvertToXod
            );
        }
        Ok(())
    }

    /// Name of the PDF tier that survives pruning.
    pub fn pdf_tier(&self) -> &'static str {
        if self.full_api.is_yes() {
            "full"
        } else {
            "lean"
        }
    }
}
