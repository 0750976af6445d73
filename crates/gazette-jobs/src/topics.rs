// SPDX-FileCopyrightText: 2026 Gazette Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The catalog of newsletter sections and slug normalization.

use gazette_config::model::TopicConfig;
use gazette_core::{TopicDefinition, TopicId};

/// Normalize a user-supplied slug: trimmed, hyphens become underscores.
pub fn canonicalize_slug(raw: &str) -> TopicId {
    TopicId(raw.trim().replace('-', "_"))
}

/// Configured sections in display order.
#[derive(Debug, Clone, Default)]
pub struct TopicCatalog {
    topics: Vec<TopicDefinition>,
}

impl TopicCatalog {
    pub fn new(topics: Vec<TopicDefinition>) -> Self {
        Self { topics }
    }

    pub fn from_config(topics: &[TopicConfig]) -> Self {
        Self::new(
            topics
                .iter()
                .map(|t| TopicDefinition {
                    slug: canonicalize_slug(&t.slug),
                    label: t.label.clone(),
                    icon: t.icon.clone(),
                })
                .collect(),
        )
    }

    pub fn all(&self) -> &[TopicDefinition] {
        &self.topics
    }

    pub fn get(&self, slug: &TopicId) -> Option<&TopicDefinition> {
        self.topics.iter().find(|t| &t.slug == slug)
    }

    pub fn contains(&self, slug: &TopicId) -> bool {
        self.get(slug).is_some()
    }

    /// Known topics among `raw`, canonicalized, in catalog order. Unknown
    /// slugs and repeats are dropped.
    pub fn select<S: AsRef<str>>(&self, raw: &[S]) -> Vec<TopicDefinition> {
        let wanted: Vec<TopicId> = raw.iter().map(|s| canonicalize_slug(s.as_ref())).collect();
        self.topics
            .iter()
            .filter(|t| wanted.contains(&t.slug))
            .cloned()
            .collect()
    }

    /// [`TopicCatalog::select`] over a comma-separated list.
    pub fn parse_selected(&self, csv: &str) -> Vec<TopicDefinition> {
        let parts: Vec<&str> = csv.split(',').collect();
        self.select(&parts)
    }
}

#[cfg(test)]
mod tests {
    use gazette_config::model::GazetteConfig;

    use super::*;

    fn catalog() -> TopicCatalog {
        TopicCatalog::from_config(&GazetteConfig::default().topics)
    }

    #[test]
    fn hyphens_become_underscores() {
        assert_eq!(canonicalize_slug("tech-trends").as_str(), "tech_trends");
        assert_eq!(canonicalize_slug(" it_hacks ").as_str(), "it_hacks");
    }

    #[test]
    fn default_catalog_has_five_sections() {
        let catalog = catalog();
        let slugs: Vec<&str> = catalog.all().iter().map(|t| t.slug.as_str()).collect();
        assert_eq!(
            slugs,
            vec!["ai_at_work", "it_hacks", "o365_updates", "tech_discovery", "tech_trends"]
        );
    }

    #[test]
    fn parse_selected_keeps_known_in_catalog_order() {
        let picked = catalog().parse_selected("tech-trends,unknown,ai_at_work,tech_trends");
        let slugs: Vec<&str> = picked.iter().map(|t| t.slug.as_str()).collect();
        assert_eq!(slugs, vec!["ai_at_work", "tech_trends"]);
        assert_eq!(picked[1].label, "Tech Trends");
    }

    #[test]
    fn nothing_known_selects_nothing() {
        assert!(catalog().parse_selected("").is_empty());
        assert!(catalog().select(&["crypto"]).is_empty());
    }
}
