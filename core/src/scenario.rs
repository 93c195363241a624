//! Synthetic cardholder activity with injected fraud patterns.
//!
//! Used by the runner's demo mode and by the determinism tests.
//! The same seed and config always produce the same scenario.

use crate::{
    error::{FraudError, FraudResult},
    rng::ScenarioRng,
    transaction::{MerchantCategory, Transaction, TransactionType},
};
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// (city, latitude, longitude, country)
const CITIES: &[(&str, f64, f64, &str)] = &[
    ("San Francisco", 37.7749, -122.4194, "USA"),
    ("New York", 40.7128, -74.0060, "USA"),
    ("Chicago", 41.8781, -87.6298, "USA"),
    ("Toronto", 43.6532, -79.3832, "CAN"),
    ("London", 51.5074, -0.1278, "GBR"),
    ("Paris", 48.8566, 2.3522, "FRA"),
    ("Berlin", 52.5200, 13.4050, "DEU"),
    ("Tokyo", 35.6762, 139.6503, "JPN"),
    ("Sydney", -33.8688, 151.2093, "AUS"),
];

/// (merchant, category, mcc)
const MERCHANTS: &[(&str, MerchantCategory, &str)] = &[
    ("Whole Foods Market", MerchantCategory::Grocery, "5411"),
    ("Safeway", MerchantCategory::Grocery, "5411"),
    ("Starbucks", MerchantCategory::Restaurant, "5814"),
    ("Italian Restaurant", MerchantCategory::Restaurant, "5812"),
    ("Shell Gas Station", MerchantCategory::Gas, "5542"),
    ("Target", MerchantCategory::Retail, "5310"),
    ("City Utilities", MerchantCategory::Utilities, "4900"),
    ("AMC Theatres", MerchantCategory::Entertainment, "7832"),
];

const ONLINE_MERCHANTS: &[(&str, MerchantCategory, &str)] = &[
    ("QuickPay Digital Goods", MerchantCategory::OnlineRetail, "5818"),
    ("GiftCardz Online", MerchantCategory::OnlineRetail, "5999"),
];

const HIGH_VALUE_MERCHANTS: &[(&str, MerchantCategory, &str)] = &[
    ("MegaElectronics", MerchantCategory::Electronics, "5732"),
    ("Lucky Star Casino", MerchantCategory::Casino, "7995"),
    ("Luxury Watches Intl", MerchantCategory::Retail, "5944"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FraudPattern {
    AmountSpike,
    CardTestingBurst,
    ImpossibleTravel,
    ForeignCountry,
}

impl FraudPattern {
    const ALL: [FraudPattern; 4] = [
        FraudPattern::AmountSpike,
        FraudPattern::CardTestingBurst,
        FraudPattern::ImpossibleTravel,
        FraudPattern::ForeignCountry,
    ];
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioConfig {
    pub cardholders: usize,
    /// Days of baseline activity per cardholder.
    pub days: i64,
    /// Probability that a cardholder's incoming activity carries a fraud pattern.
    pub fraud_rate: f64,
    pub start: DateTime<Utc>,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            cardholders: 50,
            days: 30,
            fraud_rate: 0.2,
            // 2025-01-01T00:00:00Z
            start: Utc.timestamp_opt(1_735_689_600, 0).single().unwrap_or_default(),
        }
    }
}

/// A transaction to be scored, with the pattern it was generated from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioTransaction {
    pub transaction: Transaction,
    pub pattern: Option<FraudPattern>,
}

#[derive(Debug, Clone)]
pub struct Scenario {
    /// Baseline activity, to be recorded before scoring.
    pub history: Vec<Transaction>,
    /// Incoming activity, chronological per cardholder.
    pub incoming: Vec<ScenarioTransaction>,
}

struct Profile {
    cardholder_id: String,
    home: usize,
    merchants: Vec<usize>,
    usual_hour: i64,
    mean_amount: f64,
}

pub struct ScenarioGenerator {
    seed: u64,
    config: ScenarioConfig,
}

impl ScenarioGenerator {
    pub fn new(seed: u64, config: ScenarioConfig) -> Self {
        Self { seed, config }
    }

    /// Fails only when the configured calendar runs outside the
    /// representable date range.
    pub fn generate(&self) -> FraudResult<Scenario> {
        // Bound check on the last incoming instant, before any work is done.
        self.at(self.config.days, 24, 120)?;

        let mut history = Vec::new();
        let mut incoming = Vec::new();

        for index in 0..self.config.cardholders {
            let mut rng = ScenarioRng::new(self.seed, index as u64);
            let profile = Self::profile(index, &mut rng);
            let mut seq = 0usize;

            for day in 0..self.config.days {
                let count = rng.range_inclusive(0, 2);
                let mut hours: Vec<i64> = (0..count)
                    .map(|_| (profile.usual_hour + rng.range_inclusive(-2, 2)).clamp(0, 23))
                    .collect();
                hours.sort_unstable();
                for hour in hours {
                    let at = self.at(day, hour, rng.range_inclusive(0, 59))?;
                    history.push(self.routine(&profile, &mut rng, &mut seq, at));
                }
            }

            let pattern = if rng.chance(self.config.fraud_rate) {
                rng.pick(&FraudPattern::ALL).copied()
            } else {
                None
            };
            incoming.extend(self.incoming(&profile, &mut rng, &mut seq, pattern)?);
        }

        log::debug!(
            "scenario: seed={} generated {} baseline and {} incoming transactions",
            self.seed,
            history.len(),
            incoming.len()
        );
        Ok(Scenario { history, incoming })
    }

    fn profile(index: usize, rng: &mut ScenarioRng) -> Profile {
        // Home cities are drawn from North America so foreign travel is meaningful.
        let home = rng.next_u64_below(4) as usize;
        let merchants = (0..4)
            .map(|_| rng.next_u64_below(MERCHANTS.len() as u64) as usize)
            .collect();
        Profile {
            cardholder_id: format!("CH{index:04}"),
            home,
            merchants,
            usual_hour: rng.range_inclusive(9, 18),
            mean_amount: 30.0 + rng.next_f64() * 120.0,
        }
    }

    /// `start + day + hour + minute`; minutes may run past the hour.
    fn at(&self, day: i64, hour: i64, minute: i64) -> FraudResult<DateTime<Utc>> {
        Duration::try_days(day)
            .and_then(|d| Duration::try_hours(hour).and_then(|h| d.checked_add(&h)))
            .and_then(|dh| Duration::try_minutes(minute).and_then(|m| dh.checked_add(&m)))
            .and_then(|offset| self.config.start.checked_add_signed(offset))
            .ok_or_else(|| FraudError::InvalidConfig {
                reason: format!(
                    "scenario day {day} from {} is outside the representable date range",
                    self.config.start
                ),
            })
    }

    fn next_id(profile: &Profile, seq: &mut usize) -> String {
        *seq += 1;
        format!("{}-TX{:05}", profile.cardholder_id, seq)
    }

    fn base(
        profile: &Profile,
        seq: &mut usize,
        at: DateTime<Utc>,
        amount: f64,
        merchant: (&str, MerchantCategory, &str),
        city: usize,
    ) -> Transaction {
        let (_, lat, lon, country) = CITIES[city];
        let id = Self::next_id(profile, seq);
        Transaction::new(id, profile.cardholder_id.clone(), round_cents(amount), at)
            .with_merchant(merchant.0, merchant.1)
            .with_mcc(merchant.2)
            .with_location(lat, lon)
            .with_country(country)
    }

    fn routine(
        &self,
        profile: &Profile,
        rng: &mut ScenarioRng,
        seq: &mut usize,
        at: DateTime<Utc>,
    ) -> Transaction {
        let merchant = rng
            .pick(&profile.merchants)
            .map(|&i| MERCHANTS[i])
            .unwrap_or(MERCHANTS[0]);
        let amount = rng
            .normal(profile.mean_amount, profile.mean_amount * 0.2)
            .max(1.0);
        Self::base(profile, seq, at, amount, merchant, profile.home)
    }

    fn foreign_city(profile: &Profile, rng: &mut ScenarioRng) -> usize {
        let home_country = CITIES[profile.home].3;
        let candidates: Vec<usize> = (0..CITIES.len())
            .filter(|&i| CITIES[i].3 != home_country)
            .collect();
        rng.pick(&candidates).copied().unwrap_or(CITIES.len() - 1)
    }

    fn incoming(
        &self,
        profile: &Profile,
        rng: &mut ScenarioRng,
        seq: &mut usize,
        pattern: Option<FraudPattern>,
    ) -> FraudResult<Vec<ScenarioTransaction>> {
        let day = self.config.days;
        let hour = profile.usual_hour;
        let minute = rng.range_inclusive(0, 29);
        let at = self.at(day, hour, minute)?;
        let routine = self.routine(profile, rng, seq, at);

        let Some(pattern) = pattern else {
            return Ok(vec![ScenarioTransaction {
                transaction: routine,
                pattern: None,
            }]);
        };

        let mut out = Vec::new();
        let tagged = |transaction| ScenarioTransaction {
            transaction,
            pattern: Some(pattern),
        };
        match pattern {
            FraudPattern::AmountSpike => {
                let merchant = pick_or_first(rng, HIGH_VALUE_MERCHANTS);
                let amount = profile.mean_amount * (25.0 + rng.next_f64() * 25.0);
                out.push(tagged(Self::base(profile, seq, at, amount, merchant, profile.home)));
            }
            FraudPattern::CardTestingBurst => {
                let merchant = pick_or_first(rng, ONLINE_MERCHANTS);
                for i in 0..5 {
                    let amount = 1.0 + rng.next_f64() * 4.0;
                    let burst_at = self.at(day, hour, minute + i)?;
                    let tx = Self::base(profile, seq, burst_at, amount, merchant, profile.home)
                        .with_type(TransactionType::Online);
                    out.push(tagged(tx));
                }
            }
            FraudPattern::ImpossibleTravel => {
                out.push(ScenarioTransaction {
                    transaction: routine,
                    pattern: None,
                });
                let city = Self::foreign_city(profile, rng);
                let merchant = pick_or_first(rng, HIGH_VALUE_MERCHANTS);
                let later = self.at(day, hour, minute + rng.range_inclusive(5, 45))?;
                let amount = profile.mean_amount * 4.0;
                let tx = Self::base(profile, seq, later, amount, merchant, city)
                    .with_type(TransactionType::International);
                out.push(tagged(tx));
            }
            FraudPattern::ForeignCountry => {
                let city = Self::foreign_city(profile, rng);
                let merchant = pick_or_first(rng, HIGH_VALUE_MERCHANTS);
                let amount = profile.mean_amount * 3.0;
                let abroad_at = self.at(day, hour + 3, minute)?;
                let tx = Self::base(profile, seq, abroad_at, amount, merchant, city)
                    .with_type(TransactionType::International);
                out.push(tagged(tx));
            }
        }
        Ok(out)
    }
}

type Merchant = (&'static str, MerchantCategory, &'static str);

fn pick_or_first(rng: &mut ScenarioRng, merchants: &[Merchant]) -> Merchant {
    rng.pick(merchants).copied().unwrap_or(merchants[0])
}

fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}
