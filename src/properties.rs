//! Section-delimited properties files (`input.properties`, `backend.properties`).
//!
//! The format is the familiar INI dialect: `[section]` headers followed by
//! `key = value` or `key: value` entries. Keys are case-insensitive and stored
//! lowercased; section names are kept verbatim.
use anyhow::{anyhow, Context, Result};
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

type Section = BTreeMap<String, String>;

/// Parsed properties, serialized as `{section: {key: value}}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Properties {
    sections: BTreeMap<String, Section>,
}

fn section_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\[(?P<name>[^\]]+)\]\s*$").expect("valid section regex"))
}

fn entry_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?P<key>[^=:\s][^=:]*?)\s*[=:]\s*(?P<value>.*)$").expect("valid entry regex")
    })
}

impl Properties {
    /// Read and parse a properties file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("read properties {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("parse properties {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self> {
        let mut props = Properties::default();
        let mut current: Option<String> = None;
        let mut last_key: Option<String> = None;

        for (idx, raw) in text.lines().enumerate() {
            let line_no = idx + 1;
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                last_key = None;
                continue;
            }
            if trimmed.starts_with('#') || trimmed.starts_with(';') {
                continue;
            }

            // Indented lines continue the previous value.
            if raw.starts_with([' ', '\t']) {
                if let (Some(section), Some(key)) = (current.as_ref(), last_key.as_ref()) {
                    if let Some(value) = props
                        .sections
                        .get_mut(section)
                        .and_then(|entries| entries.get_mut(key))
                    {
                        if !value.is_empty() {
                            value.push('\n');
                        }
                        value.push_str(trimmed);
                        continue;
                    }
                }
            }

            if let Some(caps) = section_re().captures(trimmed) {
                let name = caps["name"].trim().to_string();
                if props.sections.contains_key(&name) {
                    return Err(anyhow!("line {line_no}: duplicate section [{name}]"));
                }
                props.sections.insert(name.clone(), Section::new());
                current = Some(name);
                last_key = None;
                continue;
            }

            let caps = entry_re()
                .captures(trimmed)
                .ok_or_else(|| anyhow!("line {line_no}: expected `key = value`, got {trimmed:?}"))?;
            let section = current
                .as_ref()
                .ok_or_else(|| anyhow!("line {line_no}: entry appears before any [section]"))?;
            let key = caps["key"].trim().to_ascii_lowercase();
            let value = caps["value"].trim().to_string();
            props
                .sections
                .entry(section.clone())
                .or_default()
                .insert(key.clone(), value);
            last_key = Some(key);
        }
        Ok(props)
    }

    /// Look up a required value.
    pub fn get(&self, section: &str, key: &str) -> Result<&str> {
        let entries = self
            .sections
            .get(section)
            .ok_or_else(|| anyhow!("missing section [{section}]"))?;
        entries
            .get(&key.to_ascii_lowercase())
            .map(String::as_str)
            .ok_or_else(|| anyhow!("missing {key} in section [{section}]"))
    }

    /// Look up a value that may be absent.
    pub fn get_optional(&self, section: &str, key: &str) -> Option<&str> {
        self.sections
            .get(section)
            .and_then(|entries| entries.get(&key.to_ascii_lowercase()))
            .map(String::as_str)
    }

    /// Look up a value, treating absent and blank the same.
    pub fn get_nonempty(&self, section: &str, key: &str) -> Option<&str> {
        self.get_optional(section, key)
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }

    /// Set a value, creating the section when needed.
    #[cfg(test)]
    pub fn set(&mut self, section: &str, key: &str, value: impl Into<String>) {
        self.sections
            .entry(section.to_string())
            .or_default()
            .insert(key.to_ascii_lowercase(), value.into());
    }
}
