//! The seven sub-scorers. Each maps raw record fields to a 0-100 sub-score and
//! falls back to a neutral default on missing or malformed input.

use chrono::NaiveDate;

use super::dates::{parse_date, years_between};
use super::rules::{Band, Rule, RuleTable, TextMatch};

use TextMatch::{ContainsAny, ContainsWithout, SegmentsOver};

pub const MISSING_METHODOLOGY: f64 = 20.0;
pub const UNKNOWN_METHODOLOGY: f64 = 45.0;
pub const DEFAULT_SIZE: f64 = 50.0;
pub const DEFAULT_STATUS: f64 = 50.0;
pub const DEFAULT_VINTAGE: f64 = 50.0;
pub const DEFAULT_PROJECT_TYPE: f64 = 55.0;
pub const DEFAULT_GEOGRAPHY: f64 = 50.0;
pub const DEFAULT_CREDITING_PERIOD: f64 = 70.0;

/// Methodology codes, matched against the upper-cased field.
/// ACM0016 sits in both the industrial gas and transport families; the
/// industrial gas entry comes first and wins.
static METHODOLOGY: RuleTable<TextMatch> = RuleTable::new(
    &[
        // Biochar
        Rule { when: ContainsAny(&["VM0044"]), score: 95.0 },
        // Cookstoves, current methodology
        Rule { when: ContainsAny(&["VM0050"]), score: 90.0 },
        // Renewable energy
        Rule {
            when: ContainsAny(&["AMS-I.D", "AMS-I.F", "ACM0002", "AM0019", "AM0026"]),
            score: 85.0,
        },
        // Industrial gas destruction
        Rule { when: ContainsAny(&["AM0001", "AM0023", "ACM0016"]), score: 80.0 },
        // Waste management
        Rule {
            when: ContainsAny(&["AMS-III.D", "AMS-III.E", "AMS-III.F", "ACM0022"]),
            score: 75.0,
        },
        // Energy efficiency
        Rule { when: ContainsAny(&["VM0008", "AMS-II"]), score: 72.0 },
        // Transport
        Rule { when: ContainsAny(&["AMS-III.C", "AM0031", "ACM0016"]), score: 65.0 },
        // Agricultural land management
        Rule { when: ContainsAny(&["VM0042"]), score: 60.0 },
        // Cookstoves, older methodologies
        Rule {
            when: ContainsAny(&["VMR0006", "VMR0011", "AMS-I.E", "AMS-II.G"]),
            score: 55.0,
        },
        // Improved forest management
        Rule { when: ContainsAny(&["VM0003", "VM0010", "VM0012"]), score: 40.0 },
        // Afforestation / reforestation
        Rule { when: ContainsAny(&["AR-ACM", "AR-AMS", "VM0005"]), score: 35.0 },
        // Avoided deforestation outside REDD+
        Rule { when: ContainsAny(&["VM0015"]), score: 30.0 },
        // REDD+
        Rule { when: ContainsAny(&["VM0007", "VM0006", "VM0048"]), score: 15.0 },
        Rule { when: SegmentsOver { separator: ';', count: 2 }, score: 25.0 },
    ],
    UNKNOWN_METHODOLOGY,
);

/// Estimated annual emission reductions, tCO2e/year.
static PROJECT_SIZE: RuleTable<Band> = RuleTable::new(
    &[
        Rule { when: Band::AtLeast(1_000_000.0), score: 95.0 },
        Rule { when: Band::AtLeast(500_000.0), score: 85.0 },
        Rule { when: Band::AtLeast(100_000.0), score: 75.0 },
        Rule { when: Band::AtLeast(50_000.0), score: 65.0 },
        Rule { when: Band::AtLeast(10_000.0), score: 55.0 },
        Rule { when: Band::AtLeast(1_000.0), score: 45.0 },
    ],
    35.0,
);

static STATUS: RuleTable<TextMatch> = RuleTable::new(
    &[
        Rule { when: ContainsWithout { needle: "registered", without: "inactive" }, score: 90.0 },
        Rule { when: ContainsAny(&["under verification"]), score: 75.0 },
        Rule { when: ContainsAny(&["under validation"]), score: 60.0 },
        Rule { when: ContainsAny(&["inactive", "withdrawn"]), score: 20.0 },
        Rule { when: ContainsAny(&["rejected"]), score: 10.0 },
    ],
    DEFAULT_STATUS,
);

/// Project age in years.
static VINTAGE: RuleTable<Band> = RuleTable::new(
    &[
        Rule { when: Band::AtMost(1.0), score: 95.0 },
        Rule { when: Band::AtMost(3.0), score: 85.0 },
        Rule { when: Band::AtMost(5.0), score: 75.0 },
        Rule { when: Band::AtMost(8.0), score: 65.0 },
        Rule { when: Band::AtMost(12.0), score: 50.0 },
    ],
    35.0,
);

static PROJECT_TYPE: RuleTable<TextMatch> = RuleTable::new(
    &[
        Rule { when: ContainsAny(&["renewable", "energy industries"]), score: 90.0 },
        Rule { when: ContainsAny(&["waste"]), score: 80.0 },
        Rule { when: ContainsAny(&["chemical", "manufacturing"]), score: 75.0 },
        Rule { when: ContainsAny(&["transport"]), score: 70.0 },
        Rule { when: ContainsWithout { needle: "agriculture", without: "forestry" }, score: 60.0 },
        Rule { when: ContainsAny(&["afolu", "forestry"]), score: 40.0 },
        Rule { when: ContainsAny(&["fugitive"]), score: 65.0 },
    ],
    DEFAULT_PROJECT_TYPE,
);

static COUNTRY: RuleTable<TextMatch> = RuleTable::new(
    &[
        // High governance, low risk
        Rule {
            when: ContainsAny(&[
                "germany", "switzerland", "norway", "denmark", "sweden", "finland",
                "netherlands", "canada", "australia", "new zealand", "japan",
                "singapore", "united kingdom", "france", "austria", "belgium",
            ]),
            score: 85.0,
        },
        // Medium risk
        Rule {
            when: ContainsAny(&[
                "united states", "south korea", "israel", "chile", "uruguay",
                "costa rica", "poland", "czech republic", "estonia", "spain",
                "portugal", "italy", "greece", "turkey", "mexico", "china",
            ]),
            score: 65.0,
        },
    ],
    DEFAULT_GEOGRAPHY,
);

static REGION: RuleTable<TextMatch> = RuleTable::new(
    &[
        Rule { when: ContainsAny(&["europe"]), score: 75.0 },
        Rule { when: ContainsAny(&["north america"]), score: 70.0 },
        Rule { when: ContainsAny(&["asia"]), score: 55.0 },
        Rule { when: ContainsAny(&["latin america"]), score: 50.0 },
        Rule { when: ContainsAny(&["africa"]), score: 45.0 },
    ],
    DEFAULT_GEOGRAPHY,
);

/// Crediting period length in years.
static CREDITING_PERIOD: RuleTable<Band> = RuleTable::new(
    &[
        Rule { when: Band::Between(7.0, 10.0), score: 90.0 },
        Rule { when: Band::Between(5.0, 15.0), score: 80.0 },
        Rule { when: Band::Between(3.0, 20.0), score: 70.0 },
        // Permanence risk
        Rule { when: Band::Above(20.0), score: 50.0 },
    ],
    60.0,
);

pub fn score_methodology(methodology: &str) -> f64 {
    let methodology = methodology.trim();
    if methodology.is_empty() {
        return MISSING_METHODOLOGY;
    }
    METHODOLOGY.evaluate(methodology.to_uppercase().as_str())
}

/// Parse an emissions figure such as `"1,250,000"`.
/// Negative and non-finite values are treated as unparseable.
pub fn parse_emissions(raw: &str) -> Option<f64> {
    let cleaned = raw.replace(',', "");
    let value: f64 = cleaned.trim().parse().ok()?;
    (value.is_finite() && value >= 0.0).then_some(value)
}

pub fn score_project_size(emissions: &str) -> f64 {
    match parse_emissions(emissions) {
        Some(value) => PROJECT_SIZE.evaluate(&value),
        None => DEFAULT_SIZE,
    }
}

pub fn score_status(status: &str) -> f64 {
    let status = status.trim();
    if status.is_empty() {
        return DEFAULT_STATUS;
    }
    STATUS.evaluate(status.to_lowercase().as_str())
}

/// Score project age relative to `today`. Uses the registration date when it
/// parses, otherwise the crediting period start.
pub fn score_vintage(registration: &str, crediting_start: &str, today: NaiveDate) -> f64 {
    let Some(project_date) = parse_date(registration).or_else(|| parse_date(crediting_start))
    else {
        return DEFAULT_VINTAGE;
    };
    VINTAGE.evaluate(&years_between(project_date, today))
}

pub fn score_project_type(project_type: &str) -> f64 {
    PROJECT_TYPE.evaluate(project_type.to_lowercase().as_str())
}

/// Country first, region as fallback. Country names match by substring.
pub fn score_geographic_risk(country: &str, region: &str) -> f64 {
    let country = country.trim();
    let region = region.trim();
    if country.is_empty() && region.is_empty() {
        return DEFAULT_GEOGRAPHY;
    }
    if let Some(rule) = COUNTRY.matched(country.to_lowercase().as_str()) {
        return rule.score;
    }
    REGION.evaluate(region.to_lowercase().as_str())
}

pub fn score_crediting_period(start: &str, end: &str) -> f64 {
    match (parse_date(start), parse_date(end)) {
        (Some(start), Some(end)) => CREDITING_PERIOD.evaluate(&years_between(start, end)),
        _ => DEFAULT_CREDITING_PERIOD,
    }
}
