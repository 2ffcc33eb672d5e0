use chrono::{NaiveDate, Utc};

use super::criteria;
use crate::catalog::{Column, ProjectRecord};

/// The seven scoring criteria, in order of weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Criterion {
    Methodology,
    ProjectSize,
    Status,
    Vintage,
    ProjectType,
    GeographicRisk,
    CreditingPeriod,
}

impl Criterion {
    pub const ALL: [Criterion; 7] = [
        Criterion::Methodology,
        Criterion::ProjectSize,
        Criterion::Status,
        Criterion::Vintage,
        Criterion::ProjectType,
        Criterion::GeographicRisk,
        Criterion::CreditingPeriod,
    ];

    /// Share of the total score. Weights sum to 1.0.
    pub fn weight(self) -> f64 {
        match self {
            Criterion::Methodology => 0.50,
            Criterion::ProjectSize => 0.15,
            Criterion::Status => 0.10,
            Criterion::Vintage => 0.10,
            Criterion::ProjectType => 0.08,
            Criterion::GeographicRisk => 0.04,
            Criterion::CreditingPeriod => 0.03,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Criterion::Methodology => "Methodology",
            Criterion::ProjectSize => "Project size",
            Criterion::Status => "Status",
            Criterion::Vintage => "Vintage",
            Criterion::ProjectType => "Project type",
            Criterion::GeographicRisk => "Geographic risk",
            Criterion::CreditingPeriod => "Crediting period",
        }
    }

    /// Raw 0-100 sub-score for this criterion.
    pub fn evaluate(self, record: &ProjectRecord, today: NaiveDate) -> f64 {
        match self {
            Criterion::Methodology => criteria::score_methodology(record.get(Column::Methodology)),
            Criterion::ProjectSize => {
                criteria::score_project_size(record.get(Column::EstimatedEmissions))
            }
            Criterion::Status => criteria::score_status(record.get(Column::Status)),
            Criterion::Vintage => criteria::score_vintage(
                record.get(Column::RegistrationDate),
                record.get(Column::CreditingPeriodStart),
                today,
            ),
            Criterion::ProjectType => criteria::score_project_type(record.get(Column::ProjectType)),
            Criterion::GeographicRisk => criteria::score_geographic_risk(
                record.get(Column::Country),
                record.get(Column::Region),
            ),
            Criterion::CreditingPeriod => criteria::score_crediting_period(
                record.get(Column::CreditingPeriodStart),
                record.get(Column::CreditingPeriodEnd),
            ),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CriterionScore {
    pub criterion: Criterion,
    pub score: f64, // 0-100 before weighting
}

impl CriterionScore {
    pub fn contribution(&self) -> f64 {
        self.score * self.criterion.weight()
    }
}

#[derive(Debug, Clone)]
pub struct ScoreBreakdown {
    pub criteria: Vec<CriterionScore>,
    pub total: f64,
}

impl ScoreBreakdown {
    pub fn get(&self, criterion: Criterion) -> Option<f64> {
        self.criteria
            .iter()
            .find(|c| c.criterion == criterion)
            .map(|c| c.score)
    }
}

/// Score every criterion for `record` as of `today`.
pub fn breakdown_at(record: &ProjectRecord, today: NaiveDate) -> ScoreBreakdown {
    let criteria: Vec<CriterionScore> = Criterion::ALL
        .iter()
        .map(|&criterion| CriterionScore {
            criterion,
            score: criterion.evaluate(record, today),
        })
        .collect();

    let total: f64 = criteria.iter().map(CriterionScore::contribution).sum();

    ScoreBreakdown {
        criteria,
        total: total.clamp(0.0, 100.0),
    }
}

/// Quality score in [0, 100] as of `today`.
pub fn score_at(record: &ProjectRecord, today: NaiveDate) -> f64 {
    breakdown_at(record, today).total
}

/// Quality score in [0, 100] using the current UTC date for vintage.
pub fn score(record: &ProjectRecord) -> f64 {
    score_at(record, Utc::now().date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    fn biochar_project() -> ProjectRecord {
        ProjectRecord::default()
            .with(Column::Id, "1")
            .with(Column::Name, "Test Biochar")
            .with(Column::ProjectType, "Waste handling and disposal")
            .with(Column::Methodology, "VM0044")
            .with(Column::Status, "Registered")
            .with(Column::Country, "Germany")
            .with(Column::EstimatedEmissions, "50,000")
            .with(Column::Region, "Europe")
            .with(Column::RegistrationDate, "2023-01-01")
            .with(Column::CreditingPeriodStart, "2023-01-01")
            .with(Column::CreditingPeriodEnd, "2030-01-01")
    }

    fn redd_project() -> ProjectRecord {
        ProjectRecord::default()
            .with(Column::Id, "2")
            .with(Column::ProjectType, "Agriculture Forestry and Other Land Use")
            .with(Column::AfoluActivities, "ARR")
            .with(Column::Methodology, "VM0007")
            .with(Column::Status, "Registered")
            .with(Column::Country, "Brazil")
            .with(Column::EstimatedEmissions, "2,000,000")
            .with(Column::Region, "Latin America")
            .with(Column::RegistrationDate, "2015-01-01")
            .with(Column::CreditingPeriodStart, "2015-01-01")
            .with(Column::CreditingPeriodEnd, "2035-01-01")
    }

    #[test]
    fn test_weights_sum_to_one() {
        let sum: f64 = Criterion::ALL.iter().map(|c| c.weight()).sum();
        assert_relative_eq!(sum, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_high_quality_breakdown() {
        let breakdown = breakdown_at(&biochar_project(), today());
        assert_eq!(breakdown.get(Criterion::Methodology), Some(95.0));
        assert_eq!(breakdown.get(Criterion::ProjectSize), Some(65.0));
        assert_eq!(breakdown.get(Criterion::Status), Some(90.0));
        assert_eq!(breakdown.get(Criterion::Vintage), Some(85.0));
        assert_eq!(breakdown.get(Criterion::ProjectType), Some(80.0));
        assert_eq!(breakdown.get(Criterion::GeographicRisk), Some(85.0));
        assert_eq!(breakdown.get(Criterion::CreditingPeriod), Some(90.0));
    }

    #[test]
    fn test_high_quality_total() {
        // 47.5 + 9.75 + 9 + 8.5 + 6.4 + 3.4 + 2.7
        assert_relative_eq!(score_at(&biochar_project(), today()), 87.25, epsilon = 1e-9);
    }

    #[test]
    fn test_redd_dominated_by_methodology() {
        let breakdown = breakdown_at(&redd_project(), today());
        assert_eq!(breakdown.get(Criterion::Methodology), Some(15.0));
        assert_eq!(breakdown.get(Criterion::ProjectSize), Some(95.0));
        assert!(breakdown.total < 50.0);
        // 7.5 + 14.25 + 9 + 5 + 3.2 + 2 + 2.1
        assert_relative_eq!(breakdown.total, 43.05, epsilon = 1e-9);
    }

    #[test]
    fn test_all_defaults() {
        let record = ProjectRecord::default().with(Column::Id, "3");
        let expected = 20.0 * 0.5 + 50.0 * 0.15 + 50.0 * 0.1 + 50.0 * 0.1
            + 55.0 * 0.08
            + 50.0 * 0.04
            + 70.0 * 0.03;
        assert_relative_eq!(score_at(&record, today()), expected, epsilon = 1e-9);
        assert_relative_eq!(expected, 36.0, epsilon = 1e-9);
    }

    #[test]
    fn test_short_row_scores_like_empty_fields() {
        let short = ProjectRecord::new(vec!["4".to_string(), "Name only".to_string()]);
        let empty = ProjectRecord::default().with(Column::Id, "4");
        assert_eq!(score_at(&short, today()), score_at(&empty, today()));
    }

    #[test]
    fn test_scoring_is_deterministic() {
        let record = biochar_project();
        let first = score_at(&record, today());
        for _ in 0..10 {
            assert_eq!(score_at(&record, today()), first);
        }
    }

    #[test]
    fn test_score_always_in_range() {
        let values = ["", "VM0044", "garbage", "-5", "1e308", "Registered", "2099-12-31"];
        for v in values {
            let mut record = ProjectRecord::default().with(Column::Id, "5");
            for column in Column::ALL {
                record = record.with(column, v);
            }
            let total = score(&record);
            assert!((0.0..=100.0).contains(&total), "{} out of range for {:?}", total, v);
        }
    }

    #[test]
    fn test_contributions_add_up_to_total() {
        let breakdown = breakdown_at(&redd_project(), today());
        let sum: f64 = breakdown.criteria.iter().map(|c| c.contribution()).sum();
        assert_relative_eq!(sum, breakdown.total, epsilon = 1e-9);
    }
}
