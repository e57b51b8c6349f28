//! Explain plan output
//!
//! Produces deterministic, human-readable explain output.

use std::fmt;

use serde::Serialize;

use super::errors::QueryError;
use super::planner::{AccessPath, QueryPlan};

/// Explain plan output
#[derive(Debug, Clone, Serialize)]
pub struct ExplainPlan {
    /// Whether planning succeeded
    pub accepted: bool,
    /// Selected index (if any)
    pub selected_index: Option<String>,
    /// Scan type description
    pub scan_type: Option<String>,
    /// Index bounds, e.g. `["George Orwell"]` or `[1900, +inf]`
    pub index_bounds: Option<String>,
    /// List of predicates
    pub predicates: Vec<String>,
    /// Sort description
    pub sort: Option<String>,
    /// Skip
    pub skip: Option<u64>,
    /// Limit
    pub limit: Option<u64>,
    /// Rejection reason (if rejected)
    pub rejection_reason: Option<String>,
    /// Rejection error code (if rejected)
    pub rejection_code: Option<String>,
}

impl ExplainPlan {
    /// Creates an explain plan from a successful query plan
    pub fn from_plan(plan: &QueryPlan) -> Self {
        let predicates = plan
            .predicates
            .iter()
            .map(|p| format!("{} {} {}", p.field, p.op.op_name(), p.op.operand()))
            .collect();

        let sort = plan
            .sort
            .as_ref()
            .map(|s| format!("{} {}", s.field, s.direction.as_str()));

        let index_bounds = match &plan.access {
            AccessPath::CollectionScan => None,
            AccessPath::IndexEq { value, .. } => Some(format!("[{}]", value)),
            AccessPath::IndexRange { lower, upper, .. } => Some(format!(
                "[{}, {}]",
                lower.as_ref().map_or("-inf".to_string(), |v| v.to_string()),
                upper.as_ref().map_or("+inf".to_string(), |v| v.to_string()),
            )),
        };

        Self {
            accepted: true,
            selected_index: plan.access.index_name().map(str::to_string),
            scan_type: Some(plan.scan_type.as_str().to_string()),
            index_bounds,
            predicates,
            sort,
            skip: (plan.skip > 0).then_some(plan.skip),
            limit: plan.limit,
            rejection_reason: None,
            rejection_code: None,
        }
    }

    /// Creates an explain plan from a planning error
    pub fn from_error(err: &QueryError) -> Self {
        Self {
            accepted: false,
            selected_index: None,
            scan_type: None,
            index_bounds: None,
            predicates: Vec::new(),
            sort: None,
            skip: None,
            limit: None,
            rejection_reason: Some(err.message().to_string()),
            rejection_code: Some(err.code().code().to_string()),
        }
    }
}

impl fmt::Display for ExplainPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== EXPLAIN PLAN ===")?;

        if self.accepted {
            writeln!(f, "Status: ACCEPTED")?;
            if let Some(scan) = &self.scan_type {
                writeln!(f, "Scan Type: {}", scan)?;
            }
            if let Some(idx) = &self.selected_index {
                writeln!(f, "Index: {}", idx)?;
            }
            if let Some(bounds) = &self.index_bounds {
                writeln!(f, "Bounds: {}", bounds)?;
            }
            if !self.predicates.is_empty() {
                writeln!(f, "Predicates:")?;
                for pred in &self.predicates {
                    writeln!(f, "  - {}", pred)?;
                }
            }
            if let Some(sort) = &self.sort {
                writeln!(f, "Sort: {}", sort)?;
            }
            if let Some(skip) = self.skip {
                writeln!(f, "Skip: {}", skip)?;
            }
            if let Some(limit) = self.limit {
                writeln!(f, "Limit: {}", limit)?;
            }
        } else {
            writeln!(f, "Status: REJECTED")?;
            if let Some(code) = &self.rejection_code {
                writeln!(f, "Error Code: {}", code)?;
            }
            if let Some(reason) = &self.rejection_reason {
                writeln!(f, "Reason: {}", reason)?;
            }
        }

        Ok(())
    }
}
