use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::{Result, RouteComputeError};

/// Combination rule and orientation of one cost component.
///
/// `*Min` kinds prefer smaller values, `*Max` kinds prefer larger ones.
/// Additive kinds sum along a path; concave kinds keep the min (`ConcaveMin`)
/// or the max (`ConcaveMax`) of the two operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    AdditiveMin,
    AdditiveMax,
    ConcaveMin,
    ConcaveMax,
}

impl MetricKind {
    pub fn is_additive(self) -> bool {
        matches!(self, Self::AdditiveMin | Self::AdditiveMax)
    }

    pub fn prefers_smaller(self) -> bool {
        matches!(self, Self::AdditiveMin | Self::ConcaveMin)
    }

    pub fn combine(self, a: f64, b: f64) -> f64 {
        match self {
            Self::AdditiveMin | Self::AdditiveMax => a + b,
            Self::ConcaveMin => a.min(b),
            Self::ConcaveMax => a.max(b),
        }
    }

    /// Identity element of [`MetricKind::combine`], used to seed the root.
    pub fn neutral(self) -> f64 {
        match self {
            Self::AdditiveMin | Self::AdditiveMax => 0.0,
            Self::ConcaveMin => f64::INFINITY,
            Self::ConcaveMax => f64::NEG_INFINITY,
        }
    }

    /// `x` is strictly more favorable than `y`.
    pub fn favors(self, x: f64, y: f64) -> bool {
        if self.prefers_smaller() {
            x < y
        } else {
            x > y
        }
    }

    /// Total order where `Less` means `x` is the better value.
    pub fn order(self, x: f64, y: f64) -> Ordering {
        if self.prefers_smaller() {
            x.total_cmp(&y)
        } else {
            y.total_cmp(&x)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cost {
    pub value: f64,
    pub kind: MetricKind,
}

impl Cost {
    pub fn new(value: f64, kind: MetricKind) -> Self {
        Self { value, kind }
    }
}

/// Positional cost components of an edge or an accumulated path.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CostVector(Vec<Cost>);

impl CostVector {
    pub fn new(components: Vec<Cost>) -> Self {
        Self(components)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn components(&self) -> &[Cost] {
        &self.0
    }

    pub fn value(&self, position: usize) -> Option<f64> {
        self.0.get(position).map(|cost| cost.value)
    }

    pub fn kinds(&self) -> impl Iterator<Item = MetricKind> + '_ {
        self.0.iter().map(|cost| cost.kind)
    }

    fn check_compatible(&self, other: &CostVector) -> Result<()> {
        if self.len() != other.len() {
            return Err(RouteComputeError::MetricSchemaMismatch {
                expected: self.len(),
                found: other.len(),
            });
        }
        for (position, (a, b)) in self.0.iter().zip(&other.0).enumerate() {
            if a.kind != b.kind {
                return Err(RouteComputeError::MetricKindMismatch {
                    position,
                    expected: a.kind,
                    found: b.kind,
                });
            }
        }
        Ok(())
    }

    /// Per-position combination under each component's rule.
    pub fn combine(&self, other: &CostVector) -> Result<CostVector> {
        self.check_compatible(other)?;
        Ok(CostVector(
            self.0
                .iter()
                .zip(&other.0)
                .map(|(a, b)| Cost::new(a.kind.combine(a.value, b.value), a.kind))
                .collect(),
        ))
    }

    /// True on the first position where `self` is strictly more favorable
    /// than `other`. Not a strict weak ordering: two vectors can each favor
    /// the other on different positions.
    pub fn favors(&self, other: &CostVector) -> bool {
        self.0
            .iter()
            .zip(&other.0)
            .any(|(x, y)| x.kind.favors(x.value, y.value))
    }

    /// Lexicographic order by position priority, oriented per kind.
    /// `Less` means `self` is the better cost.
    pub fn lexicographic_cmp(&self, other: &CostVector) -> Ordering {
        for (x, y) in self.0.iter().zip(&other.0) {
            let ord = x.kind.order(x.value, y.value);
            if ord != Ordering::Equal {
                return ord;
            }
        }
        self.len().cmp(&other.len())
    }

    pub fn is_better_than(&self, other: &CostVector) -> bool {
        self.lexicographic_cmp(other).is_lt()
    }
}

/// Per-position kinds every cost vector of a topology must follow.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetricSchema {
    kinds: Vec<MetricKind>,
}

impl MetricSchema {
    pub fn new(kinds: Vec<MetricKind>) -> Self {
        Self { kinds }
    }

    /// cost, delay, bandwidth, quality.
    pub fn standard() -> Self {
        Self::new(vec![
            MetricKind::AdditiveMin,
            MetricKind::AdditiveMin,
            MetricKind::ConcaveMax,
            MetricKind::AdditiveMin,
        ])
    }

    /// cost first, then bandwidth.
    pub fn widest_shortest() -> Self {
        Self::new(vec![MetricKind::AdditiveMin, MetricKind::ConcaveMax])
    }

    /// bandwidth first, then cost.
    pub fn shortest_widest() -> Self {
        Self::new(vec![MetricKind::ConcaveMax, MetricKind::AdditiveMin])
    }

    pub fn kinds(&self) -> &[MetricKind] {
        &self.kinds
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    pub fn neutral(&self) -> CostVector {
        CostVector(
            self.kinds
                .iter()
                .map(|kind| Cost::new(kind.neutral(), *kind))
                .collect(),
        )
    }

    /// Tags raw values with this schema's kinds.
    pub fn tag(&self, values: &[f64]) -> Result<CostVector> {
        if values.len() != self.kinds.len() {
            return Err(RouteComputeError::MetricSchemaMismatch {
                expected: self.kinds.len(),
                found: values.len(),
            });
        }
        let cost = CostVector(
            self.kinds
                .iter()
                .zip(values)
                .map(|(kind, value)| Cost::new(*value, *kind))
                .collect(),
        );
        self.validate(&cost)?;
        Ok(cost)
    }

    pub fn validate(&self, cost: &CostVector) -> Result<()> {
        if cost.len() != self.kinds.len() {
            return Err(RouteComputeError::MetricSchemaMismatch {
                expected: self.kinds.len(),
                found: cost.len(),
            });
        }
        for (position, (expected, component)) in self.kinds.iter().zip(cost.components()).enumerate()
        {
            if component.kind != *expected {
                return Err(RouteComputeError::MetricKindMismatch {
                    position,
                    expected: *expected,
                    found: component.kind,
                });
            }
            let value = component.value;
            let unsupported = value.is_nan()
                || (component.kind.is_additive() && (!value.is_finite() || value < 0.0));
            if unsupported {
                return Err(RouteComputeError::InvalidMetricValue { position, value });
            }
        }
        Ok(())
    }
}

/// Admission bounds on accumulated path costs, one optional bound per position.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Limits {
    bounds: Vec<Option<f64>>,
}

impl Limits {
    pub fn new(values: &[f64]) -> Self {
        Self {
            bounds: values.iter().copied().map(Some).collect(),
        }
    }

    pub fn set(&mut self, values: &[f64]) {
        self.bounds = values.iter().copied().map(Some).collect();
    }

    pub fn reset(&mut self) {
        self.bounds.clear();
    }

    pub fn is_unbounded(&self) -> bool {
        self.bounds.iter().all(Option::is_none)
    }

    pub fn bound(&self, position: usize) -> Option<f64> {
        self.bounds.get(position).copied().flatten()
    }

    /// Rejects a cost that is less favorable than its bound on any position.
    pub fn admits(&self, cost: &CostVector) -> bool {
        cost.components()
            .iter()
            .zip(&self.bounds)
            .all(|(component, bound)| match bound {
                Some(limit) => !component.kind.favors(*limit, component.value),
                None => true,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cv(values: &[(f64, MetricKind)]) -> CostVector {
        CostVector::new(values.iter().map(|(v, k)| Cost::new(*v, *k)).collect())
    }

    #[test]
    fn combine_follows_each_rule() {
        use MetricKind::*;
        let a = cv(&[(1.0, AdditiveMin), (2.0, AdditiveMax), (5.0, ConcaveMin), (5.0, ConcaveMax)]);
        let b = cv(&[(2.0, AdditiveMin), (3.0, AdditiveMax), (3.0, ConcaveMin), (3.0, ConcaveMax)]);
        let out = a.combine(&b).expect("compatible vectors");
        let values: Vec<f64> = out.components().iter().map(|c| c.value).collect();
        assert_eq!(values, vec![3.0, 5.0, 3.0, 5.0]);
    }

    #[test]
    fn combine_rejects_mismatched_vectors() {
        use MetricKind::*;
        let a = cv(&[(1.0, AdditiveMin), (2.0, ConcaveMax)]);
        let short = cv(&[(1.0, AdditiveMin)]);
        let swapped = cv(&[(1.0, AdditiveMin), (2.0, ConcaveMin)]);

        assert_eq!(
            a.combine(&short),
            Err(RouteComputeError::MetricSchemaMismatch { expected: 2, found: 1 })
        );
        assert!(matches!(
            a.combine(&swapped),
            Err(RouteComputeError::MetricKindMismatch { position: 1, .. })
        ));
    }

    #[test]
    fn favors_is_not_antisymmetric() {
        use MetricKind::*;
        let x = cv(&[(1.0, AdditiveMin), (1.0, ConcaveMax)]);
        let y = cv(&[(2.0, AdditiveMin), (5.0, ConcaveMax)]);
        assert!(x.favors(&y));
        assert!(y.favors(&x));
        assert!(x.is_better_than(&y));
        assert!(!y.is_better_than(&x));
    }

    #[test]
    fn lexicographic_order_respects_orientation() {
        use MetricKind::*;
        let wide = cv(&[(10.0, ConcaveMax), (4.0, AdditiveMin)]);
        let narrow = cv(&[(2.0, ConcaveMax), (1.0, AdditiveMin)]);
        assert_eq!(wide.lexicographic_cmp(&narrow), Ordering::Less);

        let cheap = cv(&[(10.0, ConcaveMax), (3.0, AdditiveMin)]);
        assert_eq!(cheap.lexicographic_cmp(&wide), Ordering::Less);
        assert_eq!(wide.lexicographic_cmp(&wide.clone()), Ordering::Equal);
    }

    #[test]
    fn neutral_is_identity_of_combine() {
        let schema = MetricSchema::standard();
        let edge = schema.tag(&[3.0, 0.5, 100.0, 1.0]).expect("valid edge");
        let combined = schema.neutral().combine(&edge).expect("same schema");
        assert_eq!(combined, edge);
    }

    #[test]
    fn schema_rejects_bad_values() {
        let schema = MetricSchema::widest_shortest();
        assert!(matches!(
            schema.tag(&[-1.0, 10.0]),
            Err(RouteComputeError::InvalidMetricValue { position: 0, .. })
        ));
        assert!(matches!(
            schema.tag(&[1.0, f64::NAN]),
            Err(RouteComputeError::InvalidMetricValue { position: 1, .. })
        ));
        assert!(schema.tag(&[1.0, f64::INFINITY]).is_ok());
        assert!(matches!(
            schema.tag(&[1.0]),
            Err(RouteComputeError::MetricSchemaMismatch { expected: 2, found: 1 })
        ));
    }

    #[test]
    fn limits_reject_less_favorable_positions() {
        let schema = MetricSchema::widest_shortest();
        let mut limits = Limits::default();
        assert!(limits.is_unbounded());

        limits.set(&[5.0, 10.0]);
        assert!(limits.admits(&schema.tag(&[5.0, 10.0]).unwrap()));
        assert!(limits.admits(&schema.tag(&[4.0, 20.0]).unwrap()));
        assert!(!limits.admits(&schema.tag(&[6.0, 20.0]).unwrap()));
        assert!(!limits.admits(&schema.tag(&[1.0, 9.0]).unwrap()));

        limits.reset();
        assert!(limits.admits(&schema.tag(&[600.0, 0.0]).unwrap()));
    }

    #[test]
    fn partial_limits_leave_trailing_positions_open() {
        let schema = MetricSchema::standard();
        let limits = Limits::new(&[10.0]);
        assert!(limits.admits(&schema.tag(&[9.0, 1e9, 0.0, 1e9]).unwrap()));
        assert!(!limits.admits(&schema.tag(&[11.0, 0.0, 1e9, 0.0]).unwrap()));
    }
}
