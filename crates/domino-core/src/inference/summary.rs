use super::estimate::Estimate;
use crate::model::item::Item;
use crate::model::party::Party;
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::ToPrimitive;
use serde::{Deserialize, Serialize};

/// Serializable view of an [`Estimate`], with exact values kept as `n/d` strings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EstimateSummary {
    pub total_weight: String,
    pub branch_count: u64,
    pub parties: Vec<PartySummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PartySummary {
    pub party: Party,
    pub hand_size: usize,
    pub attributes: Vec<AttributeSummary>,
    pub top_compositions: Vec<CompositionSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AttributeSummary {
    pub attribute: String,
    pub probability: String,
    pub percent: f64,
    pub expected_count: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompositionSummary {
    pub composition: String,
    pub probability: String,
    pub percent: f64,
}

impl EstimateSummary {
    /// Keeps at most `top` compositions per party.
    pub fn capture<T: Item>(estimate: &Estimate<T>, top: usize) -> Self {
        let parties = estimate
            .parties
            .iter()
            .map(|(party, detail)| PartySummary {
                party: *party,
                hand_size: detail.hand_size,
                attributes: detail
                    .attributes
                    .iter()
                    .map(|(attribute, probability)| {
                        let expected = detail.expected_counts.get(attribute);
                        AttributeSummary {
                            attribute: attribute.to_string(),
                            probability: probability.to_string(),
                            percent: Estimate::<T>::percent(probability),
                            expected_count: expected.map(fixed).unwrap_or(0.0),
                        }
                    })
                    .collect(),
                top_compositions: detail
                    .compositions
                    .iter()
                    .take(top)
                    .map(|(split, probability)| CompositionSummary {
                        composition: split.to_string(),
                        probability: probability.to_string(),
                        percent: Estimate::<T>::percent(probability),
                    })
                    .collect(),
            })
            .collect();

        Self {
            total_weight: estimate.total_weight().to_string(),
            branch_count: estimate.branch_count(),
            parties,
        }
    }

    pub fn party(&self, party: Party) -> Option<&PartySummary> {
        self.parties.iter().find(|summary| summary.party == party)
    }

    pub fn to_json<T: Item>(estimate: &Estimate<T>, top: usize) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&Self::capture(estimate, top))
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

/// `value` truncated to four decimal places.
fn fixed(value: &BigRational) -> f64 {
    let scaled = value.numer() * BigInt::from(10_000u32) / value.denom();
    scaled.to_f64().unwrap_or(0.0) / 10_000.0
}

/// Parses a probability written by [`EstimateSummary`] back into an exact value.
pub fn parse_probability(text: &str) -> Option<BigRational> {
    text.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::ProbabilityEstimator;
    use crate::model::hands::HandTargets;
    use crate::model::pool::Pool;
    use crate::model::tile::Tile;
    use crate::zone::ZonePartition;

    fn estimate() -> Estimate<Tile> {
        let parties = Party::seats(2);
        let mut partition = ZonePartition::new();
        partition
            .initialize(Pool::with_max_pip(2).tiles().iter().copied(), &parties)
            .unwrap();
        partition.shrink(|tile| tile.has(2), Party::new(1));
        let snapshot = partition.snapshot();
        ProbabilityEstimator::new(&snapshot, &HandTargets::uniform(&parties, 2))
            .run()
            .unwrap()
    }

    #[test]
    fn summary_serializes_exact_and_percent_values() {
        let json = EstimateSummary::to_json(&estimate(), 3).unwrap();
        assert!(json.contains("\"branch_count\""));
        assert!(json.contains("\"party\": 0"));
        assert!(json.contains("\"probability\": \"1\""));
    }

    #[test]
    fn summary_roundtrips_through_json() {
        let summary = EstimateSummary::capture(&estimate(), 2);
        let json = serde_json::to_string(&summary).unwrap();
        let restored = EstimateSummary::from_json(&json).unwrap();
        assert_eq!(restored.total_weight, summary.total_weight);
        assert_eq!(restored.branch_count, summary.branch_count);
        assert_eq!(restored.parties.len(), 2);
        let p1 = restored.party(Party::new(1)).unwrap();
        assert!(p1.top_compositions.len() <= 2);
        let pip_two = p1
            .attributes
            .iter()
            .find(|entry| entry.attribute == "2")
            .unwrap();
        assert_eq!(pip_two.percent, 0.0);
        assert_eq!(
            parse_probability(&pip_two.probability),
            Some(BigRational::from_integer(0.into()))
        );
    }
}
