//! Reductions over offer and redemption histories

use crate::core::{OfferRecord, RedemptionRecord};
use serde::Serialize;
use std::collections::HashMap;

/// Label used for offers without a category
pub const UNCATEGORIZED: &str = "Other";

/// Label used for redemptions without an offer title
pub const UNTITLED: &str = "Unknown";

/// Placeholder shown when a breakdown has nothing to chart
pub const NO_DATA: &str = "No Data";

/// Labels and counts ready for a pie or bar chart
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub data: Vec<u64>,
}

/// Offer counts per category, in first-seen order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CategoryBreakdown {
    entries: Vec<(String, u64)>,
}

impl CategoryBreakdown {
    pub fn from_offers<'a, I>(offers: I) -> Self
    where
        I: IntoIterator<Item = &'a OfferRecord>,
    {
        let mut entries: Vec<(String, u64)> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for offer in offers {
            let category = match offer.category.as_deref() {
                Some(c) if !c.is_empty() => c,
                _ => UNCATEGORIZED,
            };
            match index.get(category) {
                Some(&i) => entries[i].1 += 1,
                None => {
                    index.insert(category.to_string(), entries.len());
                    entries.push((category.to_string(), 1));
                }
            }
        }

        Self { entries }
    }

    pub fn get(&self, category: &str) -> Option<u64> {
        self.entries
            .iter()
            .find(|(name, _)| name == category)
            .map(|(_, count)| *count)
    }

    pub fn entries(&self) -> &[(String, u64)] {
        &self.entries
    }

    pub fn total(&self) -> u64 {
        self.entries.iter().map(|(_, count)| count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// An empty breakdown charts as a single `"No Data"` slice of 1
    pub fn to_chart(&self) -> ChartSeries {
        if self.entries.is_empty() {
            return ChartSeries {
                labels: vec![NO_DATA.to_string()],
                data: vec![1],
            };
        }
        ChartSeries {
            labels: self.entries.iter().map(|(name, _)| name.clone()).collect(),
            data: self.entries.iter().map(|(_, count)| *count).collect(),
        }
    }
}

/// One leaderboard line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedEntry {
    pub title: String,
    pub count: u64,
    pub rank: usize,
}

/// Most frequently redeemed offers
///
/// Ties keep the order in which titles first appeared in the input.
#[derive(Debug, Clone, Copy)]
pub struct TopNRanker {
    n: usize,
}

impl Default for TopNRanker {
    fn default() -> Self {
        Self::new(5)
    }
}

impl TopNRanker {
    pub fn new(n: usize) -> Self {
        Self { n }
    }

    pub fn limit(&self) -> usize {
        self.n
    }

    pub fn rank<'a, I>(&self, redemptions: I) -> Vec<RankedEntry>
    where
        I: IntoIterator<Item = &'a RedemptionRecord>,
    {
        let mut groups: Vec<(String, u64)> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for redemption in redemptions {
            let title = match redemption.offer_title.as_deref() {
                Some(t) if !t.is_empty() => t,
                _ => UNTITLED,
            };
            match index.get(title) {
                Some(&i) => groups[i].1 += 1,
                None => {
                    index.insert(title.to_string(), groups.len());
                    groups.push((title.to_string(), 1));
                }
            }
        }

        // sort_by is stable
        groups.sort_by(|a, b| b.1.cmp(&a.1));
        groups.truncate(self.n);

        groups
            .into_iter()
            .enumerate()
            .map(|(i, (title, count))| RankedEntry {
                title,
                count,
                rank: i + 1,
            })
            .collect()
    }
}
