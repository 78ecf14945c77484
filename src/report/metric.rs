//! Efficiency Metric Module
//! TRMNS: total revenue per minute spent, per sales method.
//!
//! The minutes come from configuration (`TimeCosts`), never from the data:
//! `trmns = total_revenue / (minutes_per_interaction * count)`.

use crate::config::TimeCosts;
use crate::stats::{MethodStateSummary, MethodSummary};
use serde::Serialize;
use std::cmp::Ordering;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MetricError {
    #[error("no time cost configured for sales method {0:?}")]
    UnknownMethod(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct MethodEfficiency {
    pub sales_method: String,
    pub count: usize,
    pub total_revenue: f64,
    pub minutes_spent: f64,
    pub trmns: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct StateEfficiency {
    pub state: String,
    pub sales_method: String,
    pub count: usize,
    pub total_revenue: f64,
    pub minutes_spent: f64,
    pub trmns: f64,
}

pub struct EfficiencyMetric;

impl EfficiencyMetric {
    /// Rank methods by TRMNS, best first. Only observed groups appear, so the
    /// time denominator is always positive.
    pub fn rank_methods(
        summaries: &[MethodSummary],
        costs: &TimeCosts,
    ) -> Result<Vec<MethodEfficiency>, MetricError> {
        let mut ranked = summaries
            .iter()
            .map(|s| {
                let minutes_spent = Self::minutes_spent(&s.sales_method, s.count, costs)?;
                Ok(MethodEfficiency {
                    sales_method: s.sales_method.clone(),
                    count: s.count,
                    total_revenue: s.total_revenue,
                    minutes_spent,
                    trmns: s.total_revenue / minutes_spent,
                })
            })
            .collect::<Result<Vec<_>, MetricError>>()?;

        ranked.sort_by(|a, b| {
            Self::descending(a.trmns, b.trmns)
                .then_with(|| a.sales_method.cmp(&b.sales_method))
        });
        Ok(ranked)
    }

    /// Per-state ranking: states in order, methods ranked within each state.
    pub fn rank_states(
        summaries: &[MethodStateSummary],
        costs: &TimeCosts,
    ) -> Result<Vec<StateEfficiency>, MetricError> {
        let mut ranked = summaries
            .iter()
            .map(|s| {
                let minutes_spent = Self::minutes_spent(&s.sales_method, s.count, costs)?;
                Ok(StateEfficiency {
                    state: s.state.clone(),
                    sales_method: s.sales_method.clone(),
                    count: s.count,
                    total_revenue: s.total_revenue,
                    minutes_spent,
                    trmns: s.total_revenue / minutes_spent,
                })
            })
            .collect::<Result<Vec<_>, MetricError>>()?;

        ranked.sort_by(|a, b| {
            a.state
                .cmp(&b.state)
                .then_with(|| Self::descending(a.trmns, b.trmns))
                .then_with(|| a.sales_method.cmp(&b.sales_method))
        });
        Ok(ranked)
    }

    fn minutes_spent(method: &str, count: usize, costs: &TimeCosts) -> Result<f64, MetricError> {
        let per_interaction = costs
            .minutes_for(method)
            .ok_or_else(|| MetricError::UnknownMethod(method.to_string()))?;
        Ok(per_interaction * count as f64)
    }

    fn descending(a: f64, b: f64) -> Ordering {
        b.partial_cmp(&a).unwrap_or(Ordering::Equal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(method: &str, count: usize, total_revenue: f64) -> MethodSummary {
        MethodSummary {
            sales_method: method.to_string(),
            count,
            total_revenue,
            mean_revenue: total_revenue / count as f64,
            mean_nb_sold: 1.0,
        }
    }

    #[test]
    fn ranks_methods_by_revenue_per_minute() {
        let costs = TimeCosts::default();
        // email: 900 / (1 * 90)  = 10.0
        // call:  600 / (30 * 10) = 2.0
        // email_and_call: 3000 / (10 * 20) = 15.0
        let summaries = vec![
            summary("email", 90, 900.0),
            summary("call", 10, 600.0),
            summary("email_and_call", 20, 3000.0),
        ];

        let ranked = EfficiencyMetric::rank_methods(&summaries, &costs).unwrap();
        let order: Vec<&str> = ranked.iter().map(|e| e.sales_method.as_str()).collect();
        assert_eq!(order, vec!["email_and_call", "email", "call"]);
        assert!((ranked[0].trmns - 15.0).abs() < 1e-9);
        assert!((ranked[1].trmns - 10.0).abs() < 1e-9);
        assert!((ranked[2].trmns - 2.0).abs() < 1e-9);
    }

    #[test]
    fn empty_groups_never_reach_the_metric() {
        let ranked = EfficiencyMetric::rank_methods(&[], &TimeCosts::default()).unwrap();
        assert!(ranked.is_empty());
    }

    #[test]
    fn ties_break_by_method_name() {
        let costs = TimeCosts {
            email_minutes: 1.0,
            call_minutes: 1.0,
            email_and_call_minutes: 1.0,
        };
        let summaries = vec![summary("email", 10, 100.0), summary("call", 10, 100.0)];
        let ranked = EfficiencyMetric::rank_methods(&summaries, &costs).unwrap();
        assert_eq!(ranked[0].sales_method, "call");
        assert_eq!(ranked[1].sales_method, "email");
    }

    #[test]
    fn unknown_method_is_an_error() {
        let err =
            EfficiencyMetric::rank_methods(&[summary("fax", 1, 1.0)], &TimeCosts::default())
                .unwrap_err();
        assert!(matches!(err, MetricError::UnknownMethod(m) if m == "fax"));
    }

    #[test]
    fn state_rankings_group_by_state_then_rank() {
        let costs = TimeCosts::default();
        let summaries = vec![
            MethodStateSummary {
                sales_method: "call".to_string(),
                state: "Texas".to_string(),
                count: 2,
                total_revenue: 120.0,
                mean_revenue: 60.0,
                mean_nb_sold: 1.0,
            },
            MethodStateSummary {
                sales_method: "email".to_string(),
                state: "Texas".to_string(),
                count: 3,
                total_revenue: 90.0,
                mean_revenue: 30.0,
                mean_nb_sold: 1.0,
            },
            MethodStateSummary {
                sales_method: "email".to_string(),
                state: "Ohio".to_string(),
                count: 1,
                total_revenue: 10.0,
                mean_revenue: 10.0,
                mean_nb_sold: 1.0,
            },
        ];

        let ranked = EfficiencyMetric::rank_states(&summaries, &costs).unwrap();
        assert_eq!(ranked[0].state, "Ohio");
        // Texas: email 90/(1*3)=30 beats call 120/(30*2)=2
        assert_eq!(ranked[1].state, "Texas");
        assert_eq!(ranked[1].sales_method, "email");
        assert_eq!(ranked[2].sales_method, "call");
    }
}
