//! Host-facing capabilities
//!
//! The host owns the widgets and the prompt text. Lookups hand their result to
//! a [`Presenter`]; inserting keywords goes through a [`PromptSink`].

use crate::lookup::{DisplayResult, KeywordResolver};
use crate::normalize::join_keywords;
use std::io::Write;
use std::sync::Mutex;

/// Receives one result per lookup
pub trait Presenter: Send + Sync {
    fn present(&self, selection: &str, result: &DisplayResult);
}

/// Host prompt that keywords can be appended to
pub trait PromptSink: Send + Sync {
    fn append(&self, text: &str);
}

/// Resolve a selection and hand the result to the presenter
pub async fn resolve_and_present(
    resolver: &KeywordResolver,
    selection: &str,
    presenter: &dyn Presenter,
) -> DisplayResult {
    let result = resolver.resolve(selection).await;
    presenter.present(selection, &result);
    result
}

/// Append a result's keywords to the prompt. Non-keyword outcomes leave it alone.
pub fn insert_keywords(result: &DisplayResult, sink: &dyn PromptSink) -> bool {
    match result {
        DisplayResult::Keywords(keywords) => {
            sink.append(&join_keywords(keywords));
            true
        }
        _ => false,
    }
}

/// Join `addition` onto an existing prompt
///
/// Empty prompts take the addition as-is. A prompt ending in whitespace is
/// joined directly, one ending in a comma gets a space, anything else `", "`.
pub fn append_to_prompt(prompt: &str, addition: &str) -> String {
    if addition.is_empty() {
        return prompt.to_string();
    }
    if prompt.trim().is_empty() {
        return addition.to_string();
    }

    let separator = if prompt.ends_with(char::is_whitespace) {
        ""
    } else if prompt.ends_with(',') {
        " "
    } else {
        ", "
    };
    format!("{prompt}{separator}{addition}")
}

/// Writes `selection: text` lines to stdout
#[derive(Debug, Default)]
pub struct StdoutPresenter;

impl Presenter for StdoutPresenter {
    fn present(&self, selection: &str, result: &DisplayResult) {
        let mut out = std::io::stdout().lock();
        let _ = writeln!(out, "{}: {}", selection, result.text());
    }
}

/// Prompt text held in memory
#[derive(Debug, Default)]
pub struct PromptBuffer {
    text: Mutex<String>,
}

impl PromptBuffer {
    pub fn new(initial: impl Into<String>) -> Self {
        Self {
            text: Mutex::new(initial.into()),
        }
    }

    pub fn text(&self) -> String {
        self.text
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl PromptSink for PromptBuffer {
    fn append(&self, text: &str) {
        let mut prompt = self
            .text
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *prompt = append_to_prompt(&prompt, text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::mocks::MockCache;
    use crate::client::mocks::{MockRegistry, MockReply};
    use crate::hasher::hash_bytes;
    use std::sync::Arc;

    /// Presenter that remembers what it was shown
    #[derive(Default)]
    struct RecordingPresenter {
        shown: Mutex<Vec<(String, String)>>,
    }

    impl Presenter for RecordingPresenter {
        fn present(&self, selection: &str, result: &DisplayResult) {
            self.shown
                .lock()
                .unwrap()
                .push((selection.to_string(), result.text()));
        }
    }

    #[test]
    fn test_append_to_prompt() {
        assert_eq!(append_to_prompt("", "ink"), "ink");
        assert_eq!(append_to_prompt("   ", "ink"), "ink");
        assert_eq!(append_to_prompt("portrait", "ink"), "portrait, ink");
        assert_eq!(append_to_prompt("portrait,", "ink"), "portrait, ink");
        assert_eq!(append_to_prompt("portrait, ", "ink"), "portrait, ink");
        assert_eq!(append_to_prompt("portrait", ""), "portrait");
    }

    #[test]
    fn test_insert_only_keywords() {
        let prompt = PromptBuffer::new("portrait");

        assert!(!insert_keywords(&DisplayResult::NoKeywords, &prompt));
        assert!(!insert_keywords(
            &DisplayResult::LookupFailed("down".to_string()),
            &prompt
        ));
        assert_eq!(prompt.text(), "portrait");

        let result = DisplayResult::Keywords(vec!["a, b".to_string(), "c".to_string()]);
        assert!(insert_keywords(&result, &prompt));
        assert_eq!(prompt.text(), "portrait, a, b, c");
    }

    #[tokio::test]
    async fn test_resolve_and_present_hands_over_result() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("ink.pt"), b"ink").unwrap();
        let registry = Arc::new(MockRegistry::new());
        registry
            .set_reply(&hash_bytes(b"ink"), MockReply::Words(vec!["ink".to_string()]))
            .await;
        let resolver = KeywordResolver::new(
            dir.path().to_path_buf(),
            Arc::new(MockCache::new()),
            registry,
        );
        let presenter = RecordingPresenter::default();

        let result = resolve_and_present(&resolver, "ink.pt", &presenter).await;
        resolve_and_present(&resolver, "", &presenter).await;

        assert_eq!(result.text(), "ink");
        let shown = presenter.shown.lock().unwrap();
        assert_eq!(
            *shown,
            vec![
                ("ink.pt".to_string(), "ink".to_string()),
                (String::new(), String::new()),
            ]
        );
    }
}
