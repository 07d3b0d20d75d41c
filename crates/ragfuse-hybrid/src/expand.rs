//! Query expansion: one query in, an ordered list of distinct variants out.

use std::collections::HashSet;

use anyhow::Result;
use regex::{NoExpand, Regex, RegexBuilder};
use tracing::{debug, warn};

use ragfuse_core::config::SynonymGroup;
use ragfuse_core::traits::VariantGenerator;

/// Wraps an optional [`VariantGenerator`]. The original query is always the
/// first variant; generator output is appended in order, skipping blanks and
/// exact duplicates. A failing generator degrades to the original query alone.
#[derive(Default)]
pub struct QueryExpander {
    generator: Option<Box<dyn VariantGenerator>>,
}

impl QueryExpander {
    pub fn new(generator: Box<dyn VariantGenerator>) -> Self {
        Self { generator: Some(generator) }
    }

    pub fn passthrough() -> Self {
        Self::default()
    }

    pub fn expand(&self, query: &str) -> Vec<String> {
        let mut out = vec![query.to_string()];
        let Some(generator) = &self.generator else { return out };
        let extra = match generator.variants(query) {
            Ok(extra) => extra,
            Err(e) => {
                warn!(error = %e, "query variant generator failed; using original query only");
                return out;
            }
        };
        let mut seen: HashSet<String> = HashSet::from([query.to_string()]);
        for variant in extra {
            if variant.trim().is_empty() || !seen.insert(variant.clone()) {
                continue;
            }
            out.push(variant);
        }
        debug!(variants = out.len(), "query expanded");
        out
    }
}

/// Rewrites whole-word, case-insensitive mentions of a synonym group's
/// aliases into each alias in turn.
#[derive(Debug, Clone)]
pub struct SynonymExpander {
    groups: Vec<CompiledGroup>,
}

#[derive(Debug, Clone)]
struct CompiledGroup {
    pattern: Regex,
    aliases: Vec<String>,
    canonical: String,
    note: String,
}

impl SynonymExpander {
    pub fn new(groups: &[SynonymGroup]) -> Result<Self> {
        let mut compiled = Vec::new();
        for group in groups {
            let aliases: Vec<String> =
                group.aliases.iter().filter(|a| !a.trim().is_empty()).cloned().collect();
            if aliases.is_empty() {
                continue;
            }
            let alternation = aliases.iter().map(|a| regex::escape(a)).collect::<Vec<_>>().join("|");
            let pattern = RegexBuilder::new(&format!(r"\b({})\b", alternation))
                .case_insensitive(true)
                .build()?;
            compiled.push(CompiledGroup {
                pattern,
                aliases,
                canonical: group.canonical.clone(),
                note: group.note.trim().to_string(),
            });
        }
        Ok(Self { groups: compiled })
    }

    /// Glossary lines for the groups `query` mentions, in configuration
    /// order. Groups without a note contribute nothing.
    pub fn glossary(&self, query: &str) -> Vec<String> {
        self.groups
            .iter()
            .filter(|g| !g.note.is_empty() && g.pattern.is_match(query))
            .map(|g| format!("Glossary ({}): {}", g.canonical, g.note))
            .collect()
    }
}

impl VariantGenerator for SynonymExpander {
    fn variants(&self, query: &str) -> Result<Vec<String>> {
        let mut variants = vec![query.to_string()];
        for group in &self.groups {
            let mut next = Vec::new();
            for value in &variants {
                if group.pattern.is_match(value) {
                    for alias in &group.aliases {
                        next.push(group.pattern.replace_all(value, NoExpand(alias)).into_owned());
                    }
                } else {
                    next.push(value.clone());
                }
            }
            let mut seen = HashSet::new();
            next.retain(|v| seen.insert(v.clone()));
            variants = next;
        }
        Ok(variants)
    }
}
