//! Diversity Balancer: truncates the admitted set to N with per-bucket share caps.
//!
//! Algorithm:
//! 1. Rank candidates by appeal (or value) score, descending, stable
//! 2. First pass: admit unless the candidate's country, continent or price tier
//!    already hit its cap, where cap = max(1, ceil(fraction × N))
//! 3. If fewer than N were admitted, second pass over the cap-skipped
//!    candidates in rank order with every cap multiplied by `relax_factor`
//! 4. Output in rank order, never more than N
//!
//! Runs on one thread over the whole admitted set; counts are local to a call.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::curation::geo::{resolve_country, Continent};
use crate::errors::{ensure, CurationError};
use crate::models::candidate::{CurationCandidate, RejectedCandidate, Rejection};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum PriceTier {
    Budget,
    Mid,
    Luxury,
    UltraLuxury,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum RankBy {
    #[default]
    Appeal,
    Value,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiversityConfig {
    /// N: final set size.
    pub target_size: usize,
    pub country_cap: f64,
    pub continent_cap: f64,
    pub price_tier_cap: f64,
    /// Cap multiplier for the second pass.
    pub relax_factor: f64,
    /// Upper bounds (exclusive) for budget, mid and luxury; anything above is ultra-luxury.
    pub budget_max: f64,
    pub mid_max: f64,
    pub luxury_max: f64,
    /// Tier used when a candidate has no price.
    pub default_tier: PriceTier,
    pub rank_by: RankBy,
}

impl Default for DiversityConfig {
    fn default() -> Self {
        Self {
            target_size: 50,
            country_cap: 0.15,
            continent_cap: 0.40,
            price_tier_cap: 0.50,
            relax_factor: 2.0,
            budget_max: 150.0,
            mid_max: 350.0,
            luxury_max: 800.0,
            default_tier: PriceTier::Mid,
            rank_by: RankBy::Appeal,
        }
    }
}

impl DiversityConfig {
    pub fn validate(&self) -> Result<(), CurationError> {
        ensure(self.target_size > 0, || {
            "target_size (N) must be at least 1".to_string()
        })?;
        for (name, cap) in [
            ("country_cap", self.country_cap),
            ("continent_cap", self.continent_cap),
            ("price_tier_cap", self.price_tier_cap),
        ] {
            ensure(cap.is_finite() && cap > 0.0 && cap <= 1.0, || {
                format!("{name} must be in (0, 1], got {cap}")
            })?;
        }
        ensure(self.relax_factor.is_finite() && self.relax_factor >= 1.0, || {
            format!("relax_factor must be >= 1, got {}", self.relax_factor)
        })?;
        ensure(
            0.0 < self.budget_max && self.budget_max < self.mid_max && self.mid_max < self.luxury_max,
            || "price tier bounds must be increasing and positive".to_string(),
        )
    }

    pub fn tier_for(&self, price: Option<f64>) -> PriceTier {
        match price {
            None => self.default_tier,
            Some(p) if p < self.budget_max => PriceTier::Budget,
            Some(p) if p < self.mid_max => PriceTier::Mid,
            Some(p) if p < self.luxury_max => PriceTier::Luxury,
            Some(_) => PriceTier::UltraLuxury,
        }
    }
}

/// `max(1, ceil(fraction × n))`, tolerant of float noise like 0.15 × 20.
pub fn cap_for(fraction: f64, n: usize) -> usize {
    let raw = fraction * n as f64;
    ((raw - 1e-9).ceil() as usize).max(1)
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DiversityBucket {
    pub continent: Continent,
    pub country: String,
    pub tier: PriceTier,
}

impl DiversityBucket {
    pub fn for_candidate(candidate: &CurationCandidate, config: &DiversityConfig) -> Self {
        let country = resolve_country(&candidate.record.country);
        Self {
            continent: country.continent,
            country: country.key,
            tier: config.tier_for(candidate.record.positive_price()),
        }
    }

    pub fn label(&self) -> String {
        format!("{:?}/{}/{:?}", self.continent, self.country, self.tier)
    }
}

#[derive(Debug, Clone, Copy)]
struct Caps {
    country: usize,
    continent: usize,
    tier: usize,
}

impl Caps {
    fn scaled(config: &DiversityConfig, factor: f64) -> Self {
        let n = config.target_size;
        Self {
            country: cap_for(config.country_cap * factor, n),
            continent: cap_for(config.continent_cap * factor, n),
            tier: cap_for(config.price_tier_cap * factor, n),
        }
    }
}

#[derive(Default)]
struct Counts {
    buckets: BTreeMap<DiversityBucket, usize>,
    countries: HashMap<String, usize>,
    continents: HashMap<Continent, usize>,
    tiers: HashMap<PriceTier, usize>,
}

impl Counts {
    /// Names the first cap the bucket has reached, if any.
    fn blocking_cap(&self, bucket: &DiversityBucket, caps: &Caps) -> Option<String> {
        let country = self.countries.get(&bucket.country).copied().unwrap_or(0);
        if country >= caps.country {
            return Some(format!("country {} at cap {}", bucket.country, caps.country));
        }
        let continent = self.continents.get(&bucket.continent).copied().unwrap_or(0);
        if continent >= caps.continent {
            return Some(format!(
                "continent {:?} at cap {}",
                bucket.continent, caps.continent
            ));
        }
        let tier = self.tiers.get(&bucket.tier).copied().unwrap_or(0);
        if tier >= caps.tier {
            return Some(format!("tier {:?} at cap {}", bucket.tier, caps.tier));
        }
        None
    }

    fn admit(&mut self, bucket: &DiversityBucket) {
        *self.buckets.entry(bucket.clone()).or_insert(0) += 1;
        *self.countries.entry(bucket.country.clone()).or_insert(0) += 1;
        *self.continents.entry(bucket.continent).or_insert(0) += 1;
        *self.tiers.entry(bucket.tier).or_insert(0) += 1;
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceOutcome {
    /// At most N candidates, in rank order.
    pub selected: Vec<CurationCandidate>,
    pub first_pass_count: usize,
    pub relaxed_count: usize,
    pub excluded: Vec<RejectedCandidate>,
    /// Final per-bucket counts.
    pub buckets: Vec<(DiversityBucket, usize)>,
}

#[derive(Debug, Clone)]
pub struct DiversityBalancer {
    config: DiversityConfig,
}

impl DiversityBalancer {
    pub fn new(config: DiversityConfig) -> Result<Self, CurationError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &DiversityConfig {
        &self.config
    }

    fn rank_key(&self, c: &CurationCandidate) -> f64 {
        match self.config.rank_by {
            RankBy::Appeal => c.appeal_score,
            RankBy::Value => c.value_score,
        }
    }

    pub fn balance(&self, candidates: Vec<CurationCandidate>) -> BalanceOutcome {
        let n = self.config.target_size;

        let mut ranked: Vec<CurationCandidate> = candidates;
        ranked.sort_by(|a, b| {
            self.rank_key(b)
                .partial_cmp(&self.rank_key(a))
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        let buckets: Vec<DiversityBucket> = ranked
            .iter()
            .map(|c| DiversityBucket::for_candidate(c, &self.config))
            .collect();

        let mut counts = Counts::default();
        let mut admitted = vec![false; ranked.len()];
        let mut cap_reason: Vec<Option<String>> = vec![None; ranked.len()];
        let mut total = 0usize;

        let strict = Caps::scaled(&self.config, 1.0);
        for (i, bucket) in buckets.iter().enumerate() {
            if total == n {
                break;
            }
            match counts.blocking_cap(bucket, &strict) {
                Some(reason) => cap_reason[i] = Some(reason),
                None => {
                    counts.admit(bucket);
                    admitted[i] = true;
                    total += 1;
                }
            }
        }
        let first_pass_count = total;

        let mut relaxed_count = 0usize;
        if total < n {
            let relaxed = Caps::scaled(&self.config, self.config.relax_factor);
            for (i, bucket) in buckets.iter().enumerate() {
                if total == n {
                    break;
                }
                if admitted[i] || cap_reason[i].is_none() {
                    continue;
                }
                match counts.blocking_cap(bucket, &relaxed) {
                    Some(reason) => cap_reason[i] = Some(reason),
                    None => {
                        counts.admit(bucket);
                        admitted[i] = true;
                        total += 1;
                        relaxed_count += 1;
                    }
                }
            }
        }

        let mut selected = Vec::with_capacity(total);
        let mut excluded = Vec::new();
        for (rank, ((candidate, bucket), is_admitted)) in
            ranked.into_iter().zip(buckets).zip(admitted).enumerate()
        {
            if is_admitted {
                selected.push(candidate);
                continue;
            }
            let rejection = match cap_reason[rank].take() {
                Some(reason) => Rejection::DiversityCap {
                    bucket: format!("{} ({reason})", bucket.label()),
                },
                None => Rejection::BelowCutoff { rank },
            };
            debug!(hotel = %candidate.name(), reason = %rejection.tag(), "not selected");
            excluded.push(RejectedCandidate::new(&candidate.record, rejection));
        }

        info!(
            target_size = n,
            first_pass_count,
            relaxed_count,
            excluded = excluded.len(),
            "diversity balancing complete"
        );

        BalanceOutcome {
            selected,
            first_pass_count,
            relaxed_count,
            excluded,
            buckets: counts.buckets.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::hotel::Price;
    use crate::test_support::candidate;

    fn balancer(n: usize) -> DiversityBalancer {
        DiversityBalancer::new(DiversityConfig {
            target_size: n,
            ..DiversityConfig::default()
        })
        .unwrap()
    }

    /// Spreads candidates over the four price tiers so tier caps stay out of the way.
    fn priced(mut c: CurationCandidate, i: usize) -> CurationCandidate {
        let amount = [100.0, 200.0, 500.0, 1000.0][i % 4];
        c.record.price = Some(Price::new(amount, "USD"));
        c
    }

    fn french_pool(count: usize) -> Vec<CurationCandidate> {
        (0..count)
            .map(|i| candidate(&format!("Maison {i}"), "Paris", "FR", 90.0 - i as f64, 5))
            .collect()
    }

    #[test]
    fn test_cap_for_rounds_up_and_tolerates_float_noise() {
        assert_eq!(cap_for(0.15, 20), 3);
        assert_eq!(cap_for(0.15, 10), 2);
        assert_eq!(cap_for(0.40, 20), 8);
        assert_eq!(cap_for(0.01, 5), 1);
    }

    #[test]
    fn test_single_country_capped_in_first_pass() {
        let outcome = balancer(20).balance(french_pool(50));
        assert_eq!(outcome.first_pass_count, 3);
        // Relaxed pass doubles the country cap to 6.
        assert_eq!(outcome.relaxed_count, 3);
        assert_eq!(outcome.selected.len(), 6);
        assert_eq!(outcome.selected[0].name(), "Maison 0");
        assert_eq!(outcome.excluded.len(), 44);
        assert!(outcome
            .excluded
            .iter()
            .all(|e| e.rejection.tag() == "diversity cap"));
    }

    #[test]
    fn test_first_pass_respects_every_cap() {
        let mut pool = Vec::new();
        let countries = ["FR", "IT", "ES", "JP", "TH", "MX", "US", "PE", "AU", "MA"];
        for (ci, country) in countries.iter().enumerate() {
            for j in 0..6 {
                let mut c = candidate(
                    &format!("Hotel {country} {j}"),
                    "City",
                    country,
                    (100 - ci * 3 - j) as f64,
                    5,
                );
                c.record.price = Some(Price::new(200.0 + 150.0 * j as f64, "USD"));
                pool.push(c);
            }
        }
        let b = balancer(20);
        let outcome = b.balance(pool);
        assert!(outcome.selected.len() <= 20);
        assert_eq!(outcome.relaxed_count, 0, "diverse pool should fill in first pass");

        let mut per_country: HashMap<String, usize> = HashMap::new();
        let mut per_continent: HashMap<Continent, usize> = HashMap::new();
        for c in &outcome.selected {
            let bucket = DiversityBucket::for_candidate(c, b.config());
            *per_country.entry(bucket.country).or_default() += 1;
            *per_continent.entry(bucket.continent).or_default() += 1;
        }
        assert!(per_country.values().all(|&v| v <= cap_for(0.15, 20)));
        assert!(per_continent.values().all(|&v| v <= cap_for(0.40, 20)));
    }

    #[test]
    fn test_never_exceeds_target_size() {
        let pool: Vec<_> = ["FR", "IT", "JP", "US", "BR", "AU", "MA", "MX"]
            .iter()
            .enumerate()
            .map(|(i, c)| priced(candidate(&format!("H{i}"), "X", c, 50.0, 5), i))
            .collect();
        let outcome = balancer(5).balance(pool);
        assert_eq!(outcome.selected.len(), 5);
        assert_eq!(outcome.relaxed_count, 0);
        assert!(outcome
            .excluded
            .iter()
            .all(|e| e.rejection.tag() == "below cutoff"));
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let pool: Vec<_> = ["FR", "IT", "JP", "US"]
            .iter()
            .enumerate()
            .map(|(i, c)| priced(candidate(&format!("H{i}"), "X", c, 50.0, 5), i))
            .collect();
        let names: Vec<String> = balancer(4)
            .balance(pool)
            .selected
            .iter()
            .map(|c| c.name().to_string())
            .collect();
        assert_eq!(names, vec!["H0", "H1", "H2", "H3"]);
    }

    #[test]
    fn test_value_ranking_prefers_cheaper_equal_appeal() {
        let mut pricey = candidate("Pricey", "X", "FR", 40.0, 5);
        pricey.value_score = 40.0 / 1000.0;
        let mut cheap = candidate("Cheap", "X", "IT", 40.0, 5);
        cheap.value_score = 40.0 / 200.0;

        let b = DiversityBalancer::new(DiversityConfig {
            target_size: 1,
            rank_by: RankBy::Value,
            ..DiversityConfig::default()
        })
        .unwrap();
        let outcome = b.balance(vec![pricey, cheap]);
        assert_eq!(outcome.selected[0].name(), "Cheap");
    }

    #[test]
    fn test_price_tiers() {
        let config = DiversityConfig::default();
        assert_eq!(config.tier_for(Some(90.0)), PriceTier::Budget);
        assert_eq!(config.tier_for(Some(200.0)), PriceTier::Mid);
        assert_eq!(config.tier_for(Some(500.0)), PriceTier::Luxury);
        assert_eq!(config.tier_for(Some(1500.0)), PriceTier::UltraLuxury);
        assert_eq!(config.tier_for(None), PriceTier::Mid);
    }

    #[test]
    fn test_balancing_is_deterministic() {
        let b = balancer(20);
        let first = b.balance(french_pool(30));
        let second = b.balance(french_pool(30));
        assert_eq!(first.selected, second.selected);
        assert_eq!(first.buckets, second.buckets);
    }

    #[test]
    fn test_invalid_cap_rejected() {
        let config = DiversityConfig {
            country_cap: 0.0,
            ..DiversityConfig::default()
        };
        assert!(DiversityBalancer::new(config).is_err());
    }
}
