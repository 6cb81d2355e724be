// 🔗 Matcher - pair source records with target records
// Three tiers per source record: Exact Id → Exact Name → Fuzzy Name
//
// Each target can be claimed once. Tiers only look at unclaimed targets, so
// a target never appears in two Match/Mismatch verdicts.

use crate::config::MatchConfig;
use crate::differ::Differ;
use crate::record::ProductRecord;
use crate::similarity::{char_counts, length_bound, multiset_bound, normalize_name, ratio_chars};
use crate::verdict::{MatchMethod, MatchResult};
use std::collections::{HashMap, HashSet};

// ============================================================================
// TARGET INDEX
// ============================================================================

/// One distinct normalized target name, with every target carrying it
struct NameEntry {
    chars: Vec<char>,
    counts: HashMap<char, usize>,
    indices: Vec<usize>,
}

struct TargetIndex {
    by_id: HashMap<String, Vec<usize>>,
    by_name: HashMap<String, usize>,
    /// Insertion order = fuzzy scan order
    names: Vec<NameEntry>,
    normalized: Vec<String>,
}

impl TargetIndex {
    fn build(targets: &[ProductRecord]) -> Self {
        let mut by_id: HashMap<String, Vec<usize>> = HashMap::new();
        let mut by_name: HashMap<String, usize> = HashMap::new();
        let mut names: Vec<NameEntry> = Vec::new();
        let mut normalized = Vec::with_capacity(targets.len());

        for (index, target) in targets.iter().enumerate() {
            let id = target.id.trim().to_lowercase();
            if !id.is_empty() {
                by_id.entry(id).or_default().push(index);
            }

            let name = normalize_name(&target.name);
            if !name.is_empty() {
                match by_name.get(&name) {
                    Some(&entry) => names[entry].indices.push(index),
                    None => {
                        let chars: Vec<char> = name.chars().collect();
                        by_name.insert(name.clone(), names.len());
                        names.push(NameEntry {
                            counts: char_counts(&chars),
                            chars,
                            indices: vec![index],
                        });
                    }
                }
            }
            normalized.push(name);
        }

        TargetIndex {
            by_id,
            by_name,
            names,
            normalized,
        }
    }
}

fn first_unclaimed(indices: &[usize], claimed: &[bool]) -> Option<usize> {
    indices.iter().copied().find(|&i| !claimed[i])
}

// ============================================================================
// MATCHER
// ============================================================================

pub struct Matcher {
    config: MatchConfig,
    differ: Differ,
}

impl Matcher {
    pub fn new(config: MatchConfig, differ: Differ) -> Self {
        Matcher { config, differ }
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    pub fn differ(&self) -> &Differ {
        &self.differ
    }

    /// Produce one verdict per source record (in source order), followed by
    /// `TargetOnly` verdicts for leftover targets (in target order).
    ///
    /// Cost: O(N×M) similarity computations in the worst case, when no source
    /// record finds an id or exact-name match. Length and character-multiset
    /// bounds prune most fuzzy candidates before the full ratio is computed.
    ///
    /// Empty ids and empty normalized names never key a tier, and they are
    /// left out of the source id/name sets that decide `TargetOnly`. This
    /// departs from plain exact-name matching on purpose: two nameless
    /// records (or names made only of stop words) are not the same product.
    pub fn match_batches<'a>(
        &self,
        sources: &'a [ProductRecord],
        targets: &'a [ProductRecord],
    ) -> Vec<MatchResult<'a>> {
        let index = TargetIndex::build(targets);
        let mut claimed = vec![false; targets.len()];
        let mut verdicts = Vec::with_capacity(sources.len());

        for source in sources {
            let name = normalize_name(&source.name);

            let paired = self
                .match_id(source, &index, &claimed)
                .map(|i| (i, MatchMethod::Id))
                .or_else(|| self.match_name(&name, &index, &claimed).map(|i| (i, MatchMethod::ExactName)))
                .or_else(|| {
                    self.match_fuzzy(&name, &index, &claimed)
                        .map(|(i, score)| (i, MatchMethod::Fuzzy { score }))
                });

            let verdict = match paired {
                Some((target_index, method)) => {
                    claimed[target_index] = true;
                    self.classify(source, &targets[target_index], method)
                }
                None => MatchResult::MissingFromTarget { source },
            };
            verdicts.push(verdict);
        }

        verdicts.extend(self.target_only(sources, targets, &index, &claimed));
        verdicts
    }

    /// Tier 1: case-insensitive id
    fn match_id(&self, source: &ProductRecord, index: &TargetIndex, claimed: &[bool]) -> Option<usize> {
        let id = source.id.trim().to_lowercase();
        if id.is_empty() {
            return None;
        }
        index
            .by_id
            .get(&id)
            .and_then(|indices| first_unclaimed(indices, claimed))
    }

    /// Tier 2: exact normalized name
    fn match_name(&self, name: &str, index: &TargetIndex, claimed: &[bool]) -> Option<usize> {
        if name.is_empty() {
            return None;
        }
        index
            .by_name
            .get(name)
            .and_then(|&entry| first_unclaimed(&index.names[entry].indices, claimed))
    }

    /// Tier 3: best similarity at or above the threshold; first maximum wins
    fn match_fuzzy(&self, name: &str, index: &TargetIndex, claimed: &[bool]) -> Option<(usize, f64)> {
        if name.is_empty() {
            return None;
        }

        let threshold = self.config.fuzzy_threshold;
        let chars: Vec<char> = name.chars().collect();
        let counts = char_counts(&chars);
        let mut best: Option<(usize, f64)> = None;

        for entry in &index.names {
            let Some(candidate) = first_unclaimed(&entry.indices, claimed) else {
                continue;
            };

            // A bound that cannot reach the threshold or beat the best is skipped
            let beatable = |bound: f64| {
                bound >= threshold && best.map_or(true, |(_, score)| bound > score)
            };

            if !beatable(length_bound(chars.len(), entry.chars.len())) {
                continue;
            }
            if !beatable(multiset_bound(&counts, chars.len(), &entry.counts, entry.chars.len())) {
                continue;
            }

            let score = ratio_chars(&chars, &entry.chars);
            if beatable(score) {
                best = Some((candidate, score));
            }
        }

        best
    }

    fn classify<'a>(
        &self,
        source: &'a ProductRecord,
        target: &'a ProductRecord,
        method: MatchMethod,
    ) -> MatchResult<'a> {
        let differences = self.differ.diff(source, target);

        if differences.is_empty() {
            MatchResult::Match {
                source,
                target,
                method,
            }
        } else {
            MatchResult::Mismatch {
                source,
                target,
                method,
                differences,
            }
        }
    }

    /// Unclaimed targets whose id and name are both unknown to the source batch
    fn target_only<'a>(
        &self,
        sources: &'a [ProductRecord],
        targets: &'a [ProductRecord],
        index: &TargetIndex,
        claimed: &[bool],
    ) -> Vec<MatchResult<'a>> {
        let source_ids: HashSet<String> = sources
            .iter()
            .map(|s| s.id.trim().to_lowercase())
            .filter(|id| !id.is_empty())
            .collect();
        let source_names: HashSet<String> = sources
            .iter()
            .map(|s| normalize_name(&s.name))
            .filter(|name| !name.is_empty())
            .collect();

        targets
            .iter()
            .enumerate()
            .filter(|(i, target)| {
                !claimed[*i]
                    && !source_ids.contains(&target.id.trim().to_lowercase())
                    && !source_names.contains(&index.normalized[*i])
            })
            .map(|(_, target)| MatchResult::TargetOnly { target })
            .collect()
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::new(MatchConfig::default(), Differ::default())
    }
}

// ============================================================================
// TESTS
// ============================================================================
