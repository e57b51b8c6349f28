//! Inclusion projection applied to result documents

use serde_json::{Map, Value};

use crate::index::DocumentId;
use crate::query::Projection;

/// Applies projections to document bodies
pub struct Projector;

impl Projector {
    /// Keeps only the projected fields, in projection order.
    ///
    /// `_id` comes first when included. Fields absent from the document are
    /// omitted rather than emitted as null.
    pub fn apply(projection: &Projection, id: DocumentId, body: &Value) -> Value {
        let mut out = Map::new();

        if projection.include_id {
            out.insert("_id".to_string(), Value::from(id));
        }

        for field in &projection.fields {
            if field == "_id" {
                continue;
            }
            if let Some(value) = body.get(field) {
                out.insert(field.clone(), value.clone());
            }
        }

        Value::Object(out)
    }
}
