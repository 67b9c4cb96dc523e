use anyhow::Result;
use std::collections::BTreeMap;
use tracing::debug;

use super::{Question, QuestionGraph};
use crate::flags::{Answer, FlagKey, RawAnswers};
use crate::prompt::Prompter;

/// How a flag got its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Supplied up front (auto arguments or answers file). `None` is an
    /// explicitly empty value.
    Preset(Option<Answer>),
    /// Answered at a prompt.
    Asked(Answer),
    /// Not shown; falls back to the key default.
    Hidden,
}

impl Resolution {
    /// The answer this resolution provides, if the flag was actually answered.
    fn answered(self, key: FlagKey) -> Option<Answer> {
        match self {
            Resolution::Preset(answer) => Some(answer.unwrap_or_else(|| key.default_answer())),
            Resolution::Asked(answer) => Some(answer),
            Resolution::Hidden => None,
        }
    }
}

/// Facts about the tree that affect which questions are shown.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResolveContext {
    pub backup_exists: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ResolvedAnswers {
    entries: BTreeMap<FlagKey, Resolution>,
}

impl ResolvedAnswers {
    pub fn get(&self, key: FlagKey) -> Option<Resolution> {
        self.entries.get(&key).copied()
    }

    /// Keys that were asked at a prompt, in key order.
    pub fn asked(&self) -> Vec<FlagKey> {
        self.entries
            .iter()
            .filter(|(_, r)| matches!(r, Resolution::Asked(_)))
            .map(|(k, _)| *k)
            .collect()
    }

    /// Answers ready for [`crate::flags::FeatureFlags::from_raw`].
    ///
    /// Hidden questions are left out so they take their key default.
    pub fn to_raw(&self) -> RawAnswers {
        self.entries
            .iter()
            .filter_map(|(key, resolution)| match resolution {
                Resolution::Preset(answer) => Some((*key, *answer)),
                Resolution::Asked(answer) => Some((*key, Some(*answer))),
                Resolution::Hidden => None,
            })
            .collect()
    }

    fn is_satisfied(&self, question: &Question) -> bool {
        question.requires.iter().all(|req| {
            self.entries
                .get(&req.key)
                .and_then(|r| r.answered(req.key))
                == Some(req.answer)
        })
    }
}

/// Resolve every question of `graph` in topological order.
///
/// A preset answer is never asked. A question is shown only when all of its
/// requirements were answered with the required value. Presets for keys
/// outside the graph (such as `delete_unused`) are carried through.
pub fn resolve(
    graph: &QuestionGraph,
    presets: &RawAnswers,
    context: ResolveContext,
    prompter: &mut dyn Prompter,
) -> Result<ResolvedAnswers> {
    let mut resolved = ResolvedAnswers::default();

    for (key, answer) in presets {
        resolved.entries.insert(*key, Resolution::Preset(*answer));
    }

    for question in graph.ordered() {
        if resolved.entries.contains_key(&question.key) {
            continue;
        }

        let visible = resolved.is_satisfied(question)
            && !(question.hidden_if_backup_exists && context.backup_exists);

        let resolution = if visible {
            Resolution::Asked(prompter.ask(question.key, question.prompt)?)
        } else {
            debug!(question = %question.key, "question hidden");
            Resolution::Hidden
        };
        resolved.entries.insert(question.key, resolution);
    }

    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::FeatureFlags;
    use crate::prompt::ScriptedPrompter;
    use crate::flags::Answer::{No, Yes};

    fn standard() -> QuestionGraph {
        QuestionGraph::standard().unwrap()
    }

    #[test]
    fn test_client_side_walkthrough() {
        // backup, server, xod, office, legacy, full, prod, content, office
        // editor, spreadsheet, salesforce, exclude workers, source map, wc
        let mut prompter = ScriptedPrompter::new([
            No, No, No, Yes, No, Yes, Yes, No, No, No, No, No, No, Yes,
        ]);

        let resolved = resolve(
            &standard(),
            &RawAnswers::new(),
            ResolveContext::default(),
            &mut prompter,
        )
        .unwrap();

        assert_eq!(prompter.asked().len(), 14);
        assert_eq!(prompter.asked()[3], FlagKey::Office);
        assert_eq!(prompter.asked()[4], FlagKey::LegacyOffice);

        let flags = FeatureFlags::from_raw(&resolved.to_raw(), false);
        assert_eq!(flags.office, Yes);
        assert_eq!(flags.pdfnet_prod, Yes);
        assert_eq!(flags.web_component, Yes);
        assert_eq!(flags.delete_unused, Yes);
    }

    #[test]
    fn test_server_hides_client_side_questions() {
        // backup, server, xod, full api
        let mut prompter = ScriptedPrompter::new([No, Yes, No, No]);

        let resolved = resolve(
            &standard(),
            &RawAnswers::new(),
            ResolveContext::default(),
            &mut prompter,
        )
        .unwrap();

        assert_eq!(
            prompter.asked(),
            &[
                FlagKey::Backup,
                FlagKey::WebViewerServer,
                FlagKey::ConvertToXod,
                FlagKey::FullApi,
            ]
        );
        assert_eq!(resolved.get(FlagKey::Salesforce), Some(Resolution::Hidden));
        // Salesforce was never answered, so its dependents stay hidden too.
        assert_eq!(resolved.get(FlagKey::SourceMap), Some(Resolution::Hidden));
        assert_eq!(resolved.get(FlagKey::WebComponent), Some(Resolution::Hidden));
    }

    #[test]
    fn test_salesforce_hides_ui_questions() {
        // server, xod, office, full, content, office editor, spreadsheet, salesforce
        let mut prompter = ScriptedPrompter::new([No, No, No, No, No, No, No, Yes]);

        let resolved = resolve(
            &standard(),
            &RawAnswers::new(),
            ResolveContext {
                backup_exists: true,
            },
            &mut prompter,
        )
        .unwrap();

        assert!(!prompter.asked().contains(&FlagKey::Backup));
        assert!(!prompter.asked().contains(&FlagKey::ExcludeOptimizedWorkers));
        assert!(!prompter.asked().contains(&FlagKey::WebComponent));
        assert_eq!(prompter.asked().len(), 8);
        assert_eq!(resolved.asked().len(), 8);
    }

    #[test]
    fn test_presets_skip_questions() {
        let mut presets = RawAnswers::new();
        presets.insert(FlagKey::Backup, Some(No));
        presets.insert(FlagKey::WebViewerServer, Some(No));
        presets.insert(FlagKey::ConvertToXod, Some(No));
        presets.insert(FlagKey::Office, Some(Yes));
        presets.insert(FlagKey::DeleteUnused, Some(No));

        // legacy office, full api, content, office editor, spreadsheet,
        // salesforce, exclude workers, source map, web component
        let mut prompter = ScriptedPrompter::new([No, No, No, No, No, No, No, No, No]);
        let resolved = resolve(
            &standard(),
            &presets,
            ResolveContext::default(),
            &mut prompter,
        )
        .unwrap();

        assert_eq!(prompter.asked()[0], FlagKey::LegacyOffice);
        assert_eq!(resolved.get(FlagKey::Office), Some(Resolution::Preset(Some(Yes))));
        assert_eq!(
            resolved.to_raw().get(&FlagKey::DeleteUnused),
            Some(&Some(No))
        );
    }

    #[test]
    fn test_empty_preset_counts_as_default_answer() {
        let mut presets = RawAnswers::new();
        presets.insert(FlagKey::FullApi, None);

        let resolved = resolve(
            &QuestionGraph::new(vec![
                Question::new(FlagKey::FullApi, "full?"),
                Question::new(FlagKey::PdfnetProd, "prod?").requires(FlagKey::FullApi, Yes),
                Question::new(FlagKey::SourceMap, "maps?").requires(FlagKey::FullApi, No),
            ])
            .unwrap(),
            &presets,
            ResolveContext::default(),
            &mut ScriptedPrompter::new([Yes]),
        )
        .unwrap();

        assert_eq!(resolved.get(FlagKey::PdfnetProd), Some(Resolution::Hidden));
        assert_eq!(resolved.get(FlagKey::SourceMap), Some(Resolution::Asked(Yes)));
    }

    #[test]
    fn test_fully_preset_asks_nothing() {
        let presets: RawAnswers = FlagKey::ALL.iter().map(|k| (*k, Some(No))).collect();
        let mut prompter = ScriptedPrompter::new([]);

        let resolved = resolve(
            &standard(),
            &presets,
            ResolveContext::default(),
            &mut prompter,
        )
        .unwrap();

        assert!(prompter.asked().is_empty());
        assert!(resolved.asked().is_empty());
    }
}
