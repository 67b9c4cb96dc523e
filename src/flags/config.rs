use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

use super::{Answer, FlagKey, RawAnswers};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct AnswersToml {
    answers: AnswersTable,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct AnswersTable {
    backup: Option<AnswerValue>,
    web_viewer_server: Option<AnswerValue>,
    convert_to_xod: Option<AnswerValue>,
    office: Option<AnswerValue>,
    legacy_office: Option<AnswerValue>,
    full_api: Option<AnswerValue>,
    pdfnet_prod: Option<AnswerValue>,
    content_edit: Option<AnswerValue>,
    office_editor: Option<AnswerValue>,
    spreadsheet_editor: Option<AnswerValue>,
    salesforce: Option<AnswerValue>,
    exclude_optimized_workers: Option<AnswerValue>,
    source_map: Option<AnswerValue>,
    web_component: Option<AnswerValue>,
    delete_unused: Option<AnswerValue>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AnswerValue {
    Bool(bool),
    Text(String),
}

/// Load preset answers from a TOML answers file.
///
/// ```toml
/// [answers]
/// web_viewer_server = "n"
/// full_api = true
/// ```
///
/// Keys present in the file become presets; an empty string is kept as an
/// explicit empty answer and coerced to the key default later.
pub fn load_answers_file(path: &Path) -> Result<RawAnswers> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading answers file '{}'", path.display()))?;
    parse_answers(&text).with_context(|| format!("parsing answers file '{}'", path.display()))
}

pub(crate) fn parse_answers(text: &str) -> Result<RawAnswers> {
    let parsed: AnswersToml = toml::from_str(text)?;
    let table = parsed.answers;

    let entries = [
        (FlagKey::Backup, table.backup),
        (FlagKey::WebViewerServer, table.web_viewer_server),
        (FlagKey::ConvertToXod, table.convert_to_xod),
        (FlagKey::Office, table.office),
        (FlagKey::LegacyOffice, table.legacy_office),
        (FlagKey::FullApi, table.full_api),
        (FlagKey::PdfnetProd, table.pdfnet_prod),
        (FlagKey::ContentEdit, table.content_edit),
        (FlagKey::OfficeEditor, table.office_editor),
        (FlagKey::SpreadsheetEditor, table.spreadsheet_editor),
        (FlagKey::Salesforce, table.salesforce),
        (FlagKey::ExcludeOptimizedWorkers, table.exclude_optimized_workers),
        (FlagKey::SourceMap, table.source_map),
        (FlagKey::WebComponent, table.web_component),
        (FlagKey::DeleteUnused, table.delete_unused),
    ];

    let mut raw = RawAnswers::new();
    for (key, value) in entries {
        let Some(value) = value else {
            continue;
        };
        let answer = match value {
            AnswerValue::Bool(b) => Some(Answer::from(b)),
            AnswerValue::Text(text) => {
                Answer::parse(&text).with_context(|| format!("invalid value for '{}'", key))?
            }
        };
        raw.insert(key, answer);
    }

    Ok(raw)
}
