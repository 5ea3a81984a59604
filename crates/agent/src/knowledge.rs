use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// One concept the bot knows about, keyed by the phrase that makes it
/// relevant to a context string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Concept {
    pub keyword: String,
    pub category: String,
    pub summary: String,
    pub relevance: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct KnowledgeStats {
    pub total_concepts: usize,
    pub categories: HashMap<String, usize>,
}

/// Read-side of the knowledge base the scorer consults.
///
/// Ingestion (documents, web) happens elsewhere; this holds whatever has
/// been learned and answers bounded relevance queries.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeBase {
    concepts: Vec<Concept>,
}

impl KnowledgeBase {
    /// At most this many concepts come back from a relevance query.
    pub const MAX_RELEVANT: usize = 5;

    pub fn new() -> Self {
        Self::default()
    }

    /// A base seeded with the standard trading vocabulary.
    pub fn seeded() -> Self {
        let seed = [
            ("Martingale", "Risk Management"),
            ("Fibonacci", "Technical Levels"),
            ("Bollinger Bands", "Indicators"),
            ("Japanese Candlesticks", "Patterns"),
            ("Economic News", "Fundamental Analysis"),
            ("Support and Resistance", "Technical Levels"),
        ];

        Self {
            concepts: seed
                .iter()
                .map(|(keyword, category)| Concept {
                    keyword: keyword.to_string(),
                    category: category.to_string(),
                    summary: format!("{keyword} in the context of {category}."),
                    relevance: 0.8,
                })
                .collect(),
        }
    }

    pub fn add(&mut self, concept: Concept) {
        self.concepts.push(concept);
    }

    /// Concepts whose keyword appears in `context`, case-insensitive,
    /// capped at `MAX_RELEVANT`.
    pub fn relevant(&self, context: &str) -> Vec<Concept> {
        let context = context.to_lowercase();
        self.concepts
            .iter()
            .filter(|c| context.contains(&c.keyword.to_lowercase()))
            .take(Self::MAX_RELEVANT)
            .cloned()
            .collect()
    }

    pub fn stats(&self) -> KnowledgeStats {
        let mut categories: HashMap<String, usize> = HashMap::new();
        for concept in &self.concepts {
            *categories.entry(concept.category.clone()).or_default() += 1;
        }
        KnowledgeStats {
            total_concepts: self.concepts.len(),
            categories,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_base_answers_nothing() {
        let kb = KnowledgeBase::new();
        assert!(kb.relevant("bollinger bands squeeze").is_empty());
    }

    #[test]
    fn relevance_is_case_insensitive() {
        let kb = KnowledgeBase::seeded();
        let hits = kb.relevant("watching BOLLINGER BANDS on EURUSD");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].category, "Indicators");
    }

    #[test]
    fn results_are_capped() {
        let mut kb = KnowledgeBase::new();
        for i in 0..10 {
            kb.add(Concept {
                keyword: "rsi".into(),
                category: format!("cat{i}"),
                summary: String::new(),
                relevance: 0.5,
            });
        }
        assert_eq!(kb.relevant("rsi divergence").len(), KnowledgeBase::MAX_RELEVANT);
    }

    #[test]
    fn stats_group_by_category() {
        let kb = KnowledgeBase::seeded();
        let stats = kb.stats();
        assert_eq!(stats.total_concepts, 6);
        assert_eq!(stats.categories.get("Technical Levels"), Some(&2));
    }
}
