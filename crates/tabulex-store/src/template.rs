//! Named-slot prompt templates loaded from disk.
//!
//! Template content is opaque to the core; the only contract is that every
//! required `{slot}` occurs in the text. Slot names are plain identifiers,
//! substituted verbatim — there is no escaping, so template authors cannot
//! use literal braces around a known slot name.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::StoreError;

#[derive(Debug, Clone)]
pub struct PromptTemplate {
    path: PathBuf,
    text: String,
}

impl PromptTemplate {
    /// Load a template and verify every required slot occurs in it.
    pub fn load(path: impl AsRef<Path>, required_slots: &[&str]) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            return Err(StoreError::NotFound(path));
        }
        let text = fs::read_to_string(&path)?;
        let template = Self { path, text };
        template.verify_slots(required_slots)?;
        Ok(template)
    }

    /// Build a template from an in-memory string (embedded defaults, tests).
    pub fn from_text(text: impl Into<String>, required_slots: &[&str]) -> Result<Self, StoreError> {
        let template = Self {
            path: PathBuf::from("<inline>"),
            text: text.into(),
        };
        template.verify_slots(required_slots)?;
        Ok(template)
    }

    fn verify_slots(&self, required_slots: &[&str]) -> Result<(), StoreError> {
        for slot in required_slots {
            if !self.text.contains(&format!("{{{slot}}}")) {
                return Err(StoreError::MissingSlot {
                    path: self.path.clone(),
                    slot: slot.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Substitute `{name}` occurrences with the paired values.
    pub fn render(&self, vars: &[(&str, &str)]) -> String {
        let mut out = self.text.clone();
        for (name, value) in vars {
            out = out.replace(&format!("{{{name}}}"), value);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_slots() {
        let t = PromptTemplate::from_text("文件：\n{core}\n\n請填表。", &["core"]).unwrap();
        assert_eq!(t.render(&[("core", "判決內容")]), "文件：\n判決內容\n\n請填表。");
    }

    #[test]
    fn renders_multiple_slots() {
        let t = PromptTemplate::from_text("{query} / {table} / {core} / {statute}",
            &["table", "query", "core", "statute"]).unwrap();
        let out = t.render(&[
            ("query", "q"),
            ("table", "t"),
            ("core", "c"),
            ("statute", "s"),
        ]);
        assert_eq!(out, "q / t / c / s");
    }

    #[test]
    fn missing_slot_fails_at_load() {
        let err = PromptTemplate::from_text("no slots here", &["core"]).unwrap_err();
        assert!(matches!(err, StoreError::MissingSlot { slot, .. } if slot == "core"));
    }

    #[test]
    fn load_missing_file_is_not_found() {
        let tmp = tempfile::TempDir::new().unwrap();
        let err = PromptTemplate::load(tmp.path().join("absent.txt"), &[]).unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[test]
    fn load_from_disk() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("t.txt");
        std::fs::write(&path, "表格：{table}").unwrap();
        let t = PromptTemplate::load(&path, &["table"]).unwrap();
        assert_eq!(t.render(&[("table", "| a |")]), "表格：| a |");
    }
}
