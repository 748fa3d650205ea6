use std::collections::BTreeMap;

use serde::Serialize;

use crate::core::{FeasibilityReport, MultiGoalOutcome, RecommendationTier};

pub const SINGLE_GOAL_KEY: &str = "Goal";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Report {
    SingleGoal(SingleGoalReport),
    MultiGoal(MultiGoalReport),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SingleGoalReport {
    #[serde(flatten)]
    pub report: FeasibilityReport,
    pub recommendation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalEntry {
    #[serde(flatten)]
    pub report: FeasibilityReport,
    pub recommendation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiGoalReport {
    pub goals: BTreeMap<String, GoalEntry>,
    pub failures: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalSummary {
    pub initial_investment: f64,
    pub goal_amount: f64,
    pub probability_of_success: f64,
    pub median_projection: f64,
    pub projection_range: (f64, f64),
    pub recommendation: String,
}

impl Report {
    pub fn single(report: FeasibilityReport) -> Self {
        Report::SingleGoal(SingleGoalReport {
            recommendation: single_goal_message(report.feasibility.tier).to_string(),
            report,
        })
    }

    pub fn multi(outcome: MultiGoalOutcome) -> Self {
        let goals = outcome
            .reports
            .into_iter()
            .map(|(name, report)| {
                let entry = GoalEntry {
                    recommendation: multi_goal_message(report.feasibility.tier).to_string(),
                    report,
                };
                (name, entry)
            })
            .collect();
        Report::MultiGoal(MultiGoalReport {
            goals,
            failures: outcome.failures,
        })
    }

    pub fn recommendations(&self) -> BTreeMap<String, String> {
        match self {
            Report::SingleGoal(single) => {
                BTreeMap::from([(SINGLE_GOAL_KEY.to_string(), single.recommendation.clone())])
            }
            Report::MultiGoal(multi) => multi
                .goals
                .iter()
                .map(|(name, entry)| (name.clone(), entry.recommendation.clone()))
                .collect(),
        }
    }

    pub fn summaries(&self) -> BTreeMap<String, GoalSummary> {
        match self {
            Report::SingleGoal(single) => BTreeMap::from([(
                SINGLE_GOAL_KEY.to_string(),
                summarize(&single.report, &single.recommendation),
            )]),
            Report::MultiGoal(multi) => multi
                .goals
                .iter()
                .map(|(name, entry)| (name.clone(), summarize(&entry.report, &entry.recommendation)))
                .collect(),
        }
    }
}

fn summarize(report: &FeasibilityReport, recommendation: &str) -> GoalSummary {
    GoalSummary {
        initial_investment: report.initial_investment,
        goal_amount: report.feasibility.goal_amount,
        probability_of_success: report.feasibility.success_probability,
        median_projection: report.feasibility.median_projection,
        projection_range: report.feasibility.projection_range,
        recommendation: recommendation.to_string(),
    }
}

pub fn single_goal_message(tier: RecommendationTier) -> &'static str {
    match tier {
        RecommendationTier::Achievable => "Your goal is feasible with the current setup!",
        RecommendationTier::MedianAboveGoal => {
            "Your median projection is above the goal, but success probability is low. \
             Consider adjusting risk allocation slightly."
        }
        RecommendationTier::NotOnTrack => {
            "Your goal may not be achievable with the current parameters. Consider increasing \
             your initial investment, extending your timeline, or adjusting risk tolerance."
        }
    }
}

pub fn multi_goal_message(tier: RecommendationTier) -> &'static str {
    match tier {
        RecommendationTier::Achievable => "Goal is achievable.",
        RecommendationTier::MedianAboveGoal => {
            "Median outcome clears this goal but with low confidence. \
             Consider a smaller risk tilt for this goal."
        }
        RecommendationTier::NotOnTrack => "Increase investment or extend timeline.",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Feasibility, Priority};

    fn report(probability: f64, median: f64, goal: f64, tier: RecommendationTier) -> FeasibilityReport {
        FeasibilityReport {
            initial_investment: 50_000.0,
            timeline_years: 15,
            priority: Some(Priority::High),
            feasibility: Feasibility {
                goal_amount: goal,
                success_probability: probability,
                median_projection: median,
                projection_range: (median * 0.8, median * 1.2),
                tier,
            },
        }
    }

    #[test]
    fn single_goal_report_keys_recommendation_as_goal() {
        let single = Report::single(report(80.0, 2_200_000.0, 2_000_000.0, RecommendationTier::Achievable));
        let recs = single.recommendations();
        assert_eq!(recs.len(), 1);
        assert_eq!(recs["Goal"], single_goal_message(RecommendationTier::Achievable));
    }

    #[test]
    fn multi_goal_report_uses_contextual_wording_per_tier() {
        let mut outcome = MultiGoalOutcome::default();
        outcome.reports.insert(
            "House".to_string(),
            report(80.0, 2_200_000.0, 2_000_000.0, RecommendationTier::Achievable),
        );
        outcome.reports.insert(
            "Retirement".to_string(),
            report(60.0, 10_500_000.0, 10_000_000.0, RecommendationTier::MedianAboveGoal),
        );
        outcome.reports.insert(
            "Education".to_string(),
            report(10.0, 800_000.0, 1_000_000.0, RecommendationTier::NotOnTrack),
        );
        outcome
            .failures
            .insert("Boat".to_string(), "invalid configuration: timeline".to_string());

        let multi = Report::multi(outcome);
        let recs = multi.recommendations();
        assert_eq!(recs.len(), 3);
        assert_eq!(recs["House"], "Goal is achievable.");
        assert!(recs["Retirement"].contains("low confidence"));
        assert_eq!(recs["Education"], "Increase investment or extend timeline.");

        let Report::MultiGoal(inner) = &multi else {
            panic!("expected multi-goal report");
        };
        assert_eq!(inner.failures.len(), 1);
    }

    #[test]
    fn summaries_carry_report_fields() {
        let single = Report::single(report(10.0, 800_000.0, 1_000_000.0, RecommendationTier::NotOnTrack));
        let summary = &single.summaries()["Goal"];
        assert_eq!(summary.goal_amount, 1_000_000.0);
        assert_eq!(summary.initial_investment, 50_000.0);
        assert_eq!(summary.probability_of_success, 10.0);
        assert_eq!(summary.projection_range, (640_000.0, 960_000.0));
        assert!(summary.recommendation.starts_with("Your goal may not be achievable"));
    }

    #[test]
    fn serialized_report_is_tagged_by_kind() {
        let single = Report::single(report(80.0, 2_200_000.0, 2_000_000.0, RecommendationTier::Achievable));
        let json = serde_json::to_string(&single).expect("report should serialize");
        assert!(json.contains("\"kind\":\"single-goal\""));
        assert!(json.contains("\"successProbability\":80.0"));
        assert!(json.contains("\"tier\":\"achievable\""));
        assert!(json.contains("\"priority\":\"high\""));

        let multi = Report::multi(MultiGoalOutcome::default());
        let json = serde_json::to_string(&multi).expect("report should serialize");
        assert!(json.contains("\"kind\":\"multi-goal\""));
        assert!(json.contains("\"goals\":{}"));
    }
}
