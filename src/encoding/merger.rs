//! Merge orchestration and its extension points.
//!
//! [`merge_encodings`] runs three steps, in order, exactly once:
//! 1. the `before_merged` hook sees the freshly loaded document
//! 2. the registry's effective mapping is applied
//! 3. the `when_merged` hook sees the merged document
//!
//! A failing hook stops the sequence and the error reaches the caller, so
//! nothing is written for that generation.

use crate::Result;
use crate::encoding::document::EncodingDocument;
use crate::encoding::registry::EncodingRegistry;
use serde::{Deserialize, Serialize};

/// Callback that may freely rewrite the document.
pub type MergeHook = Box<dyn FnMut(&mut EncodingDocument) -> Result<()>>;

/// Text post-processing step applied to the serialized file.
pub type TextAction = Box<dyn Fn(String) -> String>;

/// Line ending used for the written file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineEnding {
    /// `\n` (default)
    #[default]
    Lf,
    /// `\r\n`
    Crlf,
    /// Platform line ending
    Native,
}

impl LineEnding {
    /// Parse from string, case-insensitive.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "lf" => Some(LineEnding::Lf),
            "crlf" => Some(LineEnding::Crlf),
            "native" => Some(LineEnding::Native),
            _ => None,
        }
    }

    /// Convert to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            LineEnding::Lf => "lf",
            LineEnding::Crlf => "crlf",
            LineEnding::Native => "native",
        }
    }

    /// Rewrite every line break in `text` to this ending.
    pub fn apply(&self, text: &str) -> String {
        let lf = text.replace("\r\n", "\n");
        let crlf = match self {
            LineEnding::Lf => false,
            LineEnding::Crlf => true,
            LineEnding::Native => cfg!(windows),
        };
        if crlf { lf.replace('\n', "\r\n") } else { lf }
    }
}

impl std::fmt::Display for LineEnding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Ordered text actions applied to the serialized file before writing.
#[derive(Default)]
pub struct TextTransformer {
    actions: Vec<TextAction>,
}

impl std::fmt::Debug for TextTransformer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextTransformer")
            .field("actions", &self.actions.len())
            .finish()
    }
}

impl TextTransformer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an action. Actions run in insertion order.
    pub fn add_action(&mut self, action: impl Fn(String) -> String + 'static) {
        self.actions.push(Box::new(action));
    }

    /// Append a line-ending normalization action.
    pub fn add_line_ending(&mut self, ending: LineEnding) {
        self.add_action(move |text| ending.apply(&text));
    }

    pub fn transform(&self, text: String) -> String {
        self.actions.iter().fold(text, |acc, action| action(acc))
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

/// Declarative document edit, usable as a hook from config files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum HookAction {
    /// Set `key` to `value`
    Set { key: String, value: String },
    /// Remove `key` if present
    Remove { key: String },
}

impl HookAction {
    pub fn apply(&self, document: &mut EncodingDocument) {
        match self {
            HookAction::Set { key, value } => {
                document.set(key.clone(), value.clone());
            }
            HookAction::Remove { key } => {
                document.remove(key);
            }
        }
    }
}

/// Hooks and output transformer for one generated file.
#[derive(Default)]
pub struct PropertiesFileMerger {
    before_merged: Option<MergeHook>,
    when_merged: Option<MergeHook>,
    transformer: TextTransformer,
}

impl std::fmt::Debug for PropertiesFileMerger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PropertiesFileMerger")
            .field("before_merged", &self.before_merged.is_some())
            .field("when_merged", &self.when_merged.is_some())
            .field("transformer", &self.transformer)
            .finish()
    }
}

impl PropertiesFileMerger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a merger whose hooks replay declarative actions.
    pub fn from_actions(before: Vec<HookAction>, when: Vec<HookAction>) -> Self {
        let mut merger = Self::new();
        if !before.is_empty() {
            merger.set_before_merged(move |doc: &mut EncodingDocument| {
                before.iter().for_each(|action| action.apply(doc));
                Ok(())
            });
        }
        if !when.is_empty() {
            merger.set_when_merged(move |doc: &mut EncodingDocument| {
                when.iter().for_each(|action| action.apply(doc));
                Ok(())
            });
        }
        merger
    }

    /// Install the hook run after loading, before the registry is applied.
    pub fn set_before_merged(
        &mut self,
        hook: impl FnMut(&mut EncodingDocument) -> Result<()> + 'static,
    ) {
        self.before_merged = Some(Box::new(hook));
    }

    /// Install the hook run after the registry is applied.
    pub fn set_when_merged(
        &mut self,
        hook: impl FnMut(&mut EncodingDocument) -> Result<()> + 'static,
    ) {
        self.when_merged = Some(Box::new(hook));
    }

    pub fn transformer(&self) -> &TextTransformer {
        &self.transformer
    }

    pub fn transformer_mut(&mut self) -> &mut TextTransformer {
        &mut self.transformer
    }

    fn run_before_merged(&mut self, document: &mut EncodingDocument) -> Result<()> {
        match self.before_merged.as_mut() {
            Some(hook) => hook(document),
            None => Ok(()),
        }
    }

    fn run_when_merged(&mut self, document: &mut EncodingDocument) -> Result<()> {
        match self.when_merged.as_mut() {
            Some(hook) => hook(document),
            None => Ok(()),
        }
    }
}

/// Run the before hook, apply the registry, run the after hook.
pub fn merge_encodings(
    registry: &EncodingRegistry,
    document: &mut EncodingDocument,
    merger: &mut PropertiesFileMerger,
) -> Result<()> {
    merger.run_before_merged(document)?;

    let effective = registry.effective_mapping();
    tracing::debug!(entries = effective.len(), "applying effective encodings");
    document.configure(&effective);

    merger.run_when_merged(document)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use crate::encoding::registry::EncodingMap;
    use std::cell::RefCell;
    use std::rc::Rc;

    // ==================== LineEnding Tests ====================

    #[test]
    fn test_line_ending_parse() {
        assert_eq!(LineEnding::parse("LF"), Some(LineEnding::Lf));
        assert_eq!(LineEnding::parse("crlf"), Some(LineEnding::Crlf));
        assert_eq!(LineEnding::parse("native"), Some(LineEnding::Native));
        assert_eq!(LineEnding::parse("cr"), None);
    }

    #[test]
    fn test_line_ending_apply() {
        assert_eq!(LineEnding::Crlf.apply("a=1\nb=2\n"), "a=1\r\nb=2\r\n");
        assert_eq!(LineEnding::Lf.apply("a=1\r\nb=2\n"), "a=1\nb=2\n");
        // Already CRLF text is not doubled
        assert_eq!(LineEnding::Crlf.apply("a=1\r\n"), "a=1\r\n");
    }

    // ==================== TextTransformer Tests ====================

    #[test]
    fn test_transformer_runs_actions_in_order() {
        let mut transformer = TextTransformer::new();
        assert!(transformer.is_empty());
        transformer.add_action(|text| format!("{}b", text));
        transformer.add_action(|text| format!("{}c", text));

        assert_eq!(transformer.transform("a".to_string()), "abc");
    }

    #[test]
    fn test_transformer_line_ending_action() {
        let mut transformer = TextTransformer::new();
        transformer.add_line_ending(LineEnding::Crlf);
        assert_eq!(transformer.transform("x=1\n".to_string()), "x=1\r\n");
    }

    // ==================== Merge Sequence Tests ====================

    #[test]
    fn test_merge_with_no_hooks_applies_registry() {
        let mut registry = EncodingRegistry::new();
        let mut defaults = EncodingMap::new();
        defaults.insert("encoding//src/main/java".to_string(), Some("UTF-8".to_string()));
        registry.set_default_encodings(defaults);
        registry.record_project_encoding("ISO-8859-1");

        let mut doc = EncodingDocument::new();
        merge_encodings(&registry, &mut doc, &mut PropertiesFileMerger::new()).unwrap();

        assert_eq!(doc.len(), 3);
        assert_eq!(doc.get("eclipse.preferences.version"), Some("1"));
        assert_eq!(doc.get("encoding//src/main/java"), Some("UTF-8"));
        assert_eq!(doc.get("encoding/<project>"), Some("ISO-8859-1"));
    }

    #[test]
    fn test_hooks_run_in_order_around_configure() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut registry = EncodingRegistry::new();
        registry.record_project_encoding("UTF-8");

        let mut merger = PropertiesFileMerger::new();
        let before_seen = Rc::clone(&seen);
        merger.set_before_merged(move |doc| {
            before_seen
                .borrow_mut()
                .push(format!("before:{:?}", doc.get("encoding/<project>")));
            Ok(())
        });
        let when_seen = Rc::clone(&seen);
        merger.set_when_merged(move |doc| {
            when_seen
                .borrow_mut()
                .push(format!("when:{:?}", doc.get("encoding/<project>")));
            Ok(())
        });

        let mut doc = EncodingDocument::new();
        merge_encodings(&registry, &mut doc, &mut merger).unwrap();

        assert_eq!(
            *seen.borrow(),
            vec!["before:None".to_string(), "when:Some(\"UTF-8\")".to_string()]
        );
    }

    #[test]
    fn test_registry_overrides_before_hook_edits() {
        let mut registry = EncodingRegistry::new();
        registry.record_project_encoding("UTF-8");

        let mut merger = PropertiesFileMerger::new();
        merger.set_before_merged(|doc| {
            doc.set("encoding/<project>", "Cp1252");
            doc.set("hand.edited", "yes");
            Ok(())
        });

        let mut doc = EncodingDocument::new();
        merge_encodings(&registry, &mut doc, &mut merger).unwrap();

        assert_eq!(doc.get("encoding/<project>"), Some("UTF-8"));
        assert_eq!(doc.get("hand.edited"), Some("yes"));
    }

    #[test]
    fn test_when_merged_has_final_say() {
        let mut registry = EncodingRegistry::new();
        registry.record_resource_encoding(Some("gen"), "UTF-8");

        let mut merger = PropertiesFileMerger::new();
        merger.set_when_merged(|doc| {
            doc.remove("encoding//gen");
            Ok(())
        });

        let mut doc = EncodingDocument::new();
        merge_encodings(&registry, &mut doc, &mut merger).unwrap();

        assert!(!doc.contains_key("encoding//gen"));
    }

    #[test]
    fn test_failing_before_hook_aborts_sequence() {
        let when_ran = Rc::new(RefCell::new(false));
        let mut registry = EncodingRegistry::new();
        registry.record_project_encoding("UTF-8");

        let mut merger = PropertiesFileMerger::new();
        merger.set_before_merged(|_| Err(Error::Hook("refusing to merge".to_string())));
        let flag = Rc::clone(&when_ran);
        merger.set_when_merged(move |_| {
            *flag.borrow_mut() = true;
            Ok(())
        });

        let mut doc = EncodingDocument::new();
        let result = merge_encodings(&registry, &mut doc, &mut merger);

        assert!(matches!(result, Err(Error::Hook(_))));
        assert!(!*when_ran.borrow());
        // Registry mapping was never applied
        assert!(!doc.contains_key("encoding/<project>"));
    }

    #[test]
    fn test_failing_when_hook_propagates() {
        let registry = EncodingRegistry::new();
        let mut merger = PropertiesFileMerger::new();
        merger.set_when_merged(|_| Err(Error::Hook("boom".to_string())));

        let result = merge_encodings(&registry, &mut EncodingDocument::new(), &mut merger);
        assert!(result.unwrap_err().to_string().contains("boom"));
    }

    // ==================== HookAction Tests ====================

    #[test]
    fn test_from_actions_replays_declarative_edits() {
        let mut registry = EncodingRegistry::new();
        registry.record_resource_encoding(Some("old"), "UTF-8");

        let mut merger = PropertiesFileMerger::from_actions(
            vec![HookAction::Set {
                key: "encoding//old".to_string(),
                value: "Cp1252".to_string(),
            }],
            vec![HookAction::Remove {
                key: "encoding//old".to_string(),
            }],
        );

        let mut doc = EncodingDocument::new();
        merge_encodings(&registry, &mut doc, &mut merger).unwrap();

        assert!(!doc.contains_key("encoding//old"));
        assert_eq!(doc.len(), 1);
    }

    #[test]
    fn test_from_actions_empty_installs_no_hooks() {
        let merger = PropertiesFileMerger::from_actions(Vec::new(), Vec::new());
        assert!(format!("{:?}", merger).contains("before_merged: false"));
    }
}
