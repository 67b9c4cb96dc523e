//! The question graph.
//!
//! Each question resolves one [`FlagKey`]. A question may require earlier
//! answers (e.g. the legacy office question only makes sense once office
//! support was requested). Requirements form a directed acyclic graph which
//! is evaluated in topological order by [`resolve::resolve`].
//!
//! # Example
//!
//! ```rust
//! use dist_pruner::flags::{Answer, FlagKey};
//! use dist_pruner::questions::{Question, QuestionGraph};
//!
//! let graph = QuestionGraph::new(vec![
//!     Question::new(FlagKey::Office, "Office support?"),
//!     Question::new(FlagKey::LegacyOffice, "Legacy office support?")
//!         .requires(FlagKey::Office, Answer::Yes),
//! ])
//! .unwrap();
//!
//! let order: Vec<FlagKey> = graph.ordered().map(|q| q.key).collect();
//! assert_eq!(order, vec![FlagKey::Office, FlagKey::LegacyOffice]);
//! ```

pub mod resolve;

pub use resolve::{resolve, Resolution, ResolveContext, ResolvedAnswers};

use anyhow::{bail, Result};
use std::collections::{BTreeMap, VecDeque};

use crate::flags::{Answer, FlagKey};

/// "`key` was answered with `answer`".
///
/// Only an actual answer (asked or preset) satisfies a requirement; a hidden
/// question never does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Requirement {
    pub key: FlagKey,
    pub answer: Answer,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub key: FlagKey,
    pub prompt: &'static str,
    pub requires: Vec<Requirement>,
    /// Hidden when a backup of the package folder already exists.
    pub hidden_if_backup_exists: bool,
}

impl Question {
    pub fn new(key: FlagKey, prompt: &'static str) -> Self {
        Self {
            key,
            prompt,
            requires: Vec::new(),
            hidden_if_backup_exists: false,
        }
    }

    pub fn requires(mut self, key: FlagKey, answer: Answer) -> Self {
        self.requires.push(Requirement { key, answer });
        self
    }

    pub fn hidden_if_backup_exists(mut self) -> Self {
        self.hidden_if_backup_exists = true;
        self
    }
}

/// Questions plus a precomputed topological order.
#[derive(Debug, Clone)]
pub struct QuestionGraph {
    questions: Vec<Question>,
    order: Vec<usize>,
}

impl QuestionGraph {
    /// Build a graph, rejecting duplicate keys, requirements on unknown
    /// questions and cycles.
    ///
    /// The order is Kahn's algorithm with ties broken by declaration order,
    /// so the same question list always yields the same order.
    pub fn new(questions: Vec<Question>) -> Result<Self> {
        let mut index: BTreeMap<FlagKey, usize> = BTreeMap::new();
        for (i, question) in questions.iter().enumerate() {
            if index.insert(question.key, i).is_some() {
                bail!("duplicate question for '{}'", question.key);
            }
        }

        let mut in_degree = vec![0usize; questions.len()];
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); questions.len()];
        for (i, question) in questions.iter().enumerate() {
            for req in &question.requires {
                let Some(&parent) = index.get(&req.key) else {
                    bail!(
                        "question '{}' requires '{}', which is not a question",
                        question.key,
                        req.key
                    );
                };
                dependents[parent].push(i);
                in_degree[i] += 1;
            }
        }

        // Ready set kept sorted by declaration index.
        let mut ready: VecDeque<usize> = (0..questions.len())
            .filter(|&i| in_degree[i] == 0)
            .collect();
        let mut order = Vec::with_capacity(questions.len());
        while let Some(next) = ready.pop_front() {
            order.push(next);
            for &dependent in &dependents[next] {
                in_degree[dependent] -= 1;
                if in_degree[dependent] == 0 {
                    let pos = ready.partition_point(|&i| i < dependent);
                    ready.insert(pos, dependent);
                }
            }
        }

        if order.len() != questions.len() {
            let stuck: Vec<String> = (0..questions.len())
                .filter(|&i| in_degree[i] > 0)
                .map(|i| questions[i].key.to_string())
                .collect();
            bail!("question requirements form a cycle: {}", stuck.join(", "));
        }

        Ok(Self { questions, order })
    }

    /// The standard optimizer questionnaire.
    ///
    /// The deletion confirmation is not part of the graph; it is asked after
    /// the deletion list has been shown.
    pub fn standard() -> Result<Self> {
        use crate::flags::Answer::{No, Yes};
        use crate::flags::FlagKey::*;

        Self::new(vec![
            Question::new(Backup, "Do you want to back up your files before optimizing?")
                .hidden_if_backup_exists(),
            Question::new(
                WebViewerServer,
                "Will you be using WebViewer Server for document processing?",
            ),
            Question::new(ConvertToXod, "Will you be converting all your documents to XOD?"),
            Question::new(
                Office,
                "Do you need client side office support (docx, pptx, xlsx)?",
            )
            .requires(ConvertToXod, No)
            .requires(WebViewerServer, No),
            Question::new(
                LegacyOffice,
                "Do you need client side office support for legacy office files (doc, ppt, xls)?",
            )
            .requires(Office, Yes),
            Question::new(
                FullApi,
                "Do you need the full PDF API? (most users do not need this option)",
            ),
            Question::new(
                PdfnetProd,
                "Do you want to use the production version of PDFNet.js? \
                 It has no type checking or console messages and is much smaller.",
            )
            .requires(FullApi, Yes),
            Question::new(
                ContentEdit,
                "Do you need the content editing feature (editing page content in the viewer)?",
            )
            .requires(ConvertToXod, No)
            .requires(WebViewerServer, No),
            Question::new(
                OfficeEditor,
                "Do you need the office editing feature (editing docx files in the viewer)?",
            )
            .requires(ConvertToXod, No)
            .requires(WebViewerServer, No),
            Question::new(
                SpreadsheetEditor,
                "Do you need the spreadsheet editing feature (editing xlsx files in the viewer)?",
            )
            .requires(ConvertToXod, No)
            .requires(WebViewerServer, No),
            Question::new(
                Salesforce,
                "Do you need to deploy to Salesforce? (most users do not need this option)",
            )
            .requires(ConvertToXod, No)
            .requires(WebViewerServer, No),
            Question::new(
                ExcludeOptimizedWorkers,
                "Do you want to exclude the optimized worker files? If so, pass \
                 'enableOptimizedWorkers: false' to the WebViewer constructor.",
            )
            .requires(Salesforce, No),
            Question::new(
                SourceMap,
                "Do you need the source map for the WebViewer UI (debugging unminified code)?",
            )
            .requires(Salesforce, No),
            Question::new(
                WebComponent,
                "Would you like to use the web component version of WebViewer instead of the iframe?",
            )
            .requires(SpreadsheetEditor, No)
            .requires(Salesforce, No),
        ])
    }

    /// Questions in evaluation order.
    pub fn ordered(&self) -> impl Iterator<Item = &Question> {
        self.order.iter().map(|&i| &self.questions[i])
    }

    pub fn get(&self, key: FlagKey) -> Option<&Question> {
        self.questions.iter().find(|q| q.key == key)
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position(graph: &QuestionGraph, key: FlagKey) -> usize {
        graph.ordered().position(|q| q.key == key).unwrap()
    }

    #[test]
    fn test_standard_graph_is_acyclic() {
        let graph = QuestionGraph::standard().unwrap();
        assert_eq!(graph.len(), 14);
        assert!(graph.get(FlagKey::DeleteUnused).is_none());
    }

    #[test]
    fn test_standard_order_respects_requirements() {
        let graph = QuestionGraph::standard().unwrap();
        for question in graph.ordered() {
            for req in &question.requires {
                assert!(
                    position(&graph, req.key) < position(&graph, question.key),
                    "{} must come before {}",
                    req.key,
                    question.key
                );
            }
        }
    }

    #[test]
    fn test_order_keeps_declaration_order_for_ties() {
        let graph = QuestionGraph::new(vec![
            Question::new(FlagKey::WebComponent, "c").requires(FlagKey::Salesforce, Answer::No),
            Question::new(FlagKey::Salesforce, "s"),
            Question::new(FlagKey::FullApi, "f"),
        ])
        .unwrap();

        let order: Vec<FlagKey> = graph.ordered().map(|q| q.key).collect();
        assert_eq!(
            order,
            vec![FlagKey::Salesforce, FlagKey::WebComponent, FlagKey::FullApi]
        );
    }

    #[test]
    fn test_cycle_rejected() {
        let result = QuestionGraph::new(vec![
            Question::new(FlagKey::Office, "o").requires(FlagKey::LegacyOffice, Answer::Yes),
            Question::new(FlagKey::LegacyOffice, "l").requires(FlagKey::Office, Answer::Yes),
        ]);

        let err = result.unwrap_err();
        assert!(err.to_string().contains("cycle"));
    }

    #[test]
    fn test_unknown_requirement_rejected() {
        let result = QuestionGraph::new(vec![
            Question::new(FlagKey::LegacyOffice, "l").requires(FlagKey::Office, Answer::Yes)
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_duplicate_question_rejected() {
        let result = QuestionGraph::new(vec![
            Question::new(FlagKey::Office, "a"),
            Question::new(FlagKey::Office, "b"),
        ]);
        assert!(result.unwrap_err().to_string().contains("duplicate"));
    }
}
