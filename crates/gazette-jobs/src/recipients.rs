// SPDX-FileCopyrightText: 2026 Gazette Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Recipient resolution from named groups plus free-form extras.

use std::collections::BTreeMap;

use gazette_config::model::EmailConfig;

/// Named recipient groups.
#[derive(Debug, Clone, Default)]
pub struct RecipientDirectory {
    groups: BTreeMap<String, Vec<String>>,
}

impl RecipientDirectory {
    pub fn new(groups: BTreeMap<String, Vec<String>>) -> Self {
        Self { groups }
    }

    pub fn from_config(config: &EmailConfig) -> Self {
        Self::new(config.groups.clone())
    }

    pub fn group_names(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    /// The group's members followed by the extras, first occurrence wins.
    ///
    /// An unknown group contributes nothing.
    pub fn resolve(&self, group: &str, extra_csv: &str) -> Vec<String> {
        let base = self.groups.get(group).map(Vec::as_slice).unwrap_or(&[]);
        let mut resolved: Vec<String> = Vec::with_capacity(base.len());
        for address in base.iter().cloned().chain(parse_emails(extra_csv)) {
            if !resolved.contains(&address) {
                resolved.push(address);
            }
        }
        resolved
    }
}

/// Split a comma-separated list, keeping trimmed entries that contain `@`.
pub fn parse_emails(csv: &str) -> Vec<String> {
    csv.split(',')
        .map(str::trim)
        .filter(|e| e.contains('@'))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory() -> RecipientDirectory {
        let mut groups = BTreeMap::new();
        groups.insert("all".to_string(), Vec::new());
        groups.insert(
            "ops".to_string(),
            vec!["ops@example.com".to_string(), "oncall@example.com".to_string()],
        );
        RecipientDirectory::new(groups)
    }

    #[test]
    fn empty_group_and_blank_extras_resolve_to_nothing() {
        assert!(directory().resolve("all", "").is_empty());
    }

    #[test]
    fn unknown_group_is_empty() {
        assert_eq!(
            directory().resolve("marketing", "a@example.com"),
            vec!["a@example.com"]
        );
    }

    #[test]
    fn group_then_extras_deduplicated_in_order() {
        let resolved = directory().resolve(
            "ops",
            " new@example.com , ops@example.com,not-an-address,, new@example.com",
        );
        assert_eq!(
            resolved,
            vec!["ops@example.com", "oncall@example.com", "new@example.com"]
        );
    }

    #[test]
    fn parse_emails_trims_and_filters() {
        assert_eq!(parse_emails(" a@b.c ,x, d@e.f"), vec!["a@b.c", "d@e.f"]);
        assert!(parse_emails("").is_empty());
    }

    #[test]
    fn default_config_groups_are_listed() {
        let directory = RecipientDirectory::from_config(&EmailConfig::default());
        let names: Vec<&str> = directory.group_names().collect();
        assert_eq!(names, vec!["all", "eng", "ops"]);
    }
}
