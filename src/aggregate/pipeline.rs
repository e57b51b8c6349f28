//! Aggregation pipeline
//!
//! A pipeline is validated in full before any stage runs. Stages then run
//! in order over an in-memory document stream; input order is natural
//! order, and every stage preserves the relative order of what it keeps.

use std::collections::{BTreeMap, HashSet};

use serde_json::{Map, Number, Value};

use crate::executor::{values_equal, PredicateFilter, ResultSorter};
use crate::index::IndexKey;

use super::errors::{AggregateError, AggregateResult};
use super::stage::{Accumulator, GroupKey, ProjectField, Stage};

/// Ordered list of stages
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pipeline {
    stages: Vec<Stage>,
}

impl Pipeline {
    /// Creates an empty pipeline
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a stage
    pub fn with_stage(mut self, stage: Stage) -> Self {
        self.stages.push(stage);
        self
    }

    /// Stages in execution order
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Checks every stage without running anything
    pub fn validate(&self) -> AggregateResult<()> {
        for (pos, stage) in self.stages.iter().enumerate() {
            validate_stage(pos, stage)?;
        }
        Ok(())
    }

    /// Runs the pipeline over `documents`
    pub fn run<D>(&self, documents: D) -> AggregateResult<Vec<Value>>
    where
        D: IntoIterator<Item = Value>,
    {
        self.validate()?;

        let mut docs: Vec<Value> = documents.into_iter().collect();
        for stage in &self.stages {
            docs = match stage {
                Stage::Match(predicates) => docs
                    .into_iter()
                    .filter(|d| PredicateFilter::matches(d, predicates))
                    .collect(),
                Stage::Group { key, accumulators } => group(docs, key, accumulators),
                Stage::Sort(specs) => {
                    ResultSorter::sort_values(&mut docs, specs);
                    docs
                }
                Stage::Limit(n) => {
                    let n = usize::try_from(*n).unwrap_or(usize::MAX);
                    docs.truncate(n);
                    docs
                }
                Stage::Project { fields, include_id } => docs
                    .iter()
                    .map(|d| project(d, fields, *include_id))
                    .collect(),
            };
        }
        Ok(docs)
    }
}

fn validate_stage(pos: usize, stage: &Stage) -> AggregateResult<()> {
    match stage {
        Stage::Match(predicates) => {
            if predicates.iter().any(|p| p.field.is_empty()) {
                return Err(AggregateError::invalid_stage(pos, "$match field name is empty"));
            }
        }
        Stage::Group { key, accumulators } => {
            if key.field().is_empty() {
                return Err(AggregateError::invalid_stage(pos, "$group key field is empty"));
            }
            let mut seen = HashSet::new();
            for (name, acc) in accumulators {
                if name.is_empty() || name == "_id" {
                    return Err(AggregateError::invalid_stage(
                        pos,
                        format!("invalid accumulator name '{}'", name),
                    ));
                }
                if !seen.insert(name.as_str()) {
                    return Err(AggregateError::invalid_stage(
                        pos,
                        format!("duplicate accumulator '{}'", name),
                    ));
                }
                if let Accumulator::Avg(field) = acc {
                    if field.is_empty() {
                        return Err(AggregateError::invalid_stage(pos, "$avg field is empty"));
                    }
                }
            }
        }
        Stage::Sort(specs) => {
            if specs.is_empty() {
                return Err(AggregateError::invalid_stage(pos, "$sort needs at least one key"));
            }
            if specs.iter().any(|s| s.field.is_empty()) {
                return Err(AggregateError::invalid_stage(pos, "$sort field name is empty"));
            }
        }
        Stage::Limit(n) => {
            if *n == 0 {
                return Err(AggregateError::invalid_stage(pos, "$limit must be positive"));
            }
        }
        Stage::Project { fields, include_id } => {
            if fields.is_empty() && !include_id {
                return Err(AggregateError::invalid_stage(pos, "$project keeps no fields"));
            }
            if fields
                .iter()
                .any(|f| f.output().is_empty() || f.source().is_empty())
            {
                return Err(AggregateError::invalid_stage(pos, "$project field name is empty"));
            }
        }
    }
    Ok(())
}

/// Running state of one group
struct GroupState {
    key: Value,
    count: u64,
    sums: Vec<(f64, u64)>,
}

fn group(docs: Vec<Value>, key: &GroupKey, accumulators: &[(String, Accumulator)]) -> Vec<Value> {
    // First-seen order of keys
    let mut groups: Vec<GroupState> = Vec::new();
    // Scalar keys resolve through the map; arrays and objects are compared
    // one by one
    let mut positions: BTreeMap<IndexKey, usize> = BTreeMap::new();

    for doc in &docs {
        let k = key.evaluate(doc);
        let scalar = IndexKey::from_json(&k);
        let found = match &scalar {
            Some(index_key) => positions.get(index_key).copied(),
            None => groups.iter().position(|g| values_equal(&g.key, &k)),
        };
        let pos = match found {
            Some(p) => p,
            None => {
                groups.push(GroupState {
                    key: k,
                    count: 0,
                    sums: vec![(0.0, 0); accumulators.len()],
                });
                let p = groups.len() - 1;
                if let Some(index_key) = scalar {
                    positions.insert(index_key, p);
                }
                p
            }
        };

        let state = &mut groups[pos];
        state.count += 1;
        for (slot, (_, acc)) in state.sums.iter_mut().zip(accumulators) {
            if let Accumulator::Avg(field) = acc {
                if let Some(v) = doc.get(field).and_then(Value::as_f64) {
                    slot.0 += v;
                    slot.1 += 1;
                }
            }
        }
    }

    groups
        .into_iter()
        .map(|g| {
            let mut out = Map::new();
            out.insert("_id".to_string(), g.key);
            for ((name, acc), (sum, n)) in accumulators.iter().zip(g.sums) {
                let value = match acc {
                    Accumulator::Count => Value::from(g.count),
                    Accumulator::Avg(_) if n == 0 => Value::Null,
                    Accumulator::Avg(_) => Number::from_f64(sum / n as f64)
                        .map(Value::Number)
                        .unwrap_or(Value::Null),
                };
                out.insert(name.clone(), value);
            }
            Value::Object(out)
        })
        .collect()
}

fn project(doc: &Value, fields: &[ProjectField], include_id: bool) -> Value {
    let mut out = Map::new();
    if include_id {
        if let Some(id) = doc.get("_id") {
            out.insert("_id".to_string(), id.clone());
        }
    }
    for field in fields {
        if let Some(v) = doc.get(field.source()) {
            out.insert(field.output().to_string(), v.clone());
        }
    }
    Value::Object(out)
}
