//! Frequency counting over a record subset

use std::collections::HashMap;

use crate::extract::Combination;

/// Per-component usage counts, each sorted by descending count
#[derive(Debug, Clone, Default)]
pub struct ComponentCounts {
    pub blades: Vec<(String, usize)>,
    pub ratchets: Vec<(String, usize)>,
    pub bits: Vec<(String, usize)>,
}

fn counted<'a, I>(values: I) -> Vec<(String, usize)>
where
    I: Iterator<Item = &'a str>,
{
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for value in values {
        *counts.entry(value).or_insert(0) += 1;
    }

    let mut sorted: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(name, count)| (name.to_string(), count))
        .collect();
    // descending by count, name as tie-breaker for stable output
    sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    sorted
}

/// Count how often each blade, ratchet, and bit appears in the subset
pub fn component_counts(records: &[&Combination]) -> ComponentCounts {
    ComponentCounts {
        blades: counted(records.iter().map(|r| r.blade.as_str())),
        ratchets: counted(records.iter().map(|r| r.ratchet.as_str())),
        bits: counted(records.iter().map(|r| r.bit.as_str())),
    }
}

/// Count how often each full combination appears in the subset, sorted by
/// descending count
pub fn combination_counts(records: &[&Combination]) -> Vec<((String, String, String), usize)> {
    let mut counts: HashMap<(&str, &str, &str), usize> = HashMap::new();
    for record in records {
        *counts
            .entry((
                record.blade.as_str(),
                record.ratchet.as_str(),
                record.bit.as_str(),
            ))
            .or_insert(0) += 1;
    }

    let mut sorted: Vec<((String, String, String), usize)> = counts
        .into_iter()
        .map(|((b, r, t), count)| ((b.to_string(), r.to_string(), t.to_string()), count))
        .collect();
    sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    sorted
}
