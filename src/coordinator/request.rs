//! Write request shared by every replica attempt

use crate::common::{ConsistencyLevel, Point};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Points destined for one database / retention policy, with the
/// consistency the caller requires. Immutable once built; the coordinator
/// shares one instance read-only across all writer attempts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WriteRequest {
    id: Uuid,
    database: String,
    #[serde(default)]
    retention_policy: String,
    consistency: ConsistencyLevel,
    points: Vec<Point>,
}

impl WriteRequest {
    pub fn new(
        database: impl Into<String>,
        retention_policy: impl Into<String>,
        consistency: ConsistencyLevel,
        points: Vec<Point>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            database: database.into(),
            retention_policy: retention_policy.into(),
            consistency,
            points,
        }
    }

    /// Correlates log lines across the coordinator and replicas.
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    pub fn retention_policy(&self) -> &str {
        &self.retention_policy
    }

    pub fn consistency(&self) -> ConsistencyLevel {
        self.consistency
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_shape() {
        let request = WriteRequest::new(
            "metrics",
            "",
            ConsistencyLevel::Quorum,
            vec![Point::new("cpu").with_field("value", 1.0)],
        );
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["database"], "metrics");
        assert_eq!(json["consistency"], "quorum");
        assert_eq!(json["points"].as_array().map(Vec::len), Some(1));

        let decoded: WriteRequest = serde_json::from_value(json).unwrap();
        assert_eq!(decoded.id(), request.id());
    }
}
