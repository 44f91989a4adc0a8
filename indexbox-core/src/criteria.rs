//! Criteria model of a derived query.
//!
//! An [`OperationChain`] describes *what* to look for, independent of how the
//! lookup is executed:
//!
//! - an AND group of [`PathAndValue`] predicates, answered by intersecting
//!   index sets,
//! - an OR group of [`PathAndValue`] predicates, answered by a union of index
//!   sets,
//! - at most one [`NearPath`] geo-proximity predicate.
//!
//! ```
//! use indexbox_core::{Distance, Metric, OperationChain, Point};
//!
//! let chain = OperationChain::new()
//!     .and("firstname", "rand")
//!     .and("lastname", "al'thor")
//!     .or("age", 20)
//!     .near("address.location", Point::new(13.361389, 38.115556), Distance::new(200.0, Metric::Kilometers));
//!
//! assert_eq!(chain.and_group().len(), 2);
//! assert_eq!(chain.or_group().len(), 1);
//! assert!(chain.near_path().is_some());
//! assert!(OperationChain::new().is_empty());
//! ```

use bytes::Bytes;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::fmt;

/// On-wire byte form of a predicate value.
///
/// Strings are stored as raw UTF-8, numbers and booleans by their textual
/// representation, so `IndexValue::from(42)` and `IndexValue::from("42")`
/// address the same index set.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IndexValue(Bytes);

impl IndexValue {
    /// Wraps raw bytes without conversion.
    #[inline]
    pub fn from_bytes(bytes: impl Into<Bytes>) -> Self {
        Self(bytes.into())
    }

    /// Returns the underlying bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Returns a cheap clone of the underlying buffer.
    #[inline]
    pub fn to_bytes(&self) -> Bytes {
        self.0.clone()
    }
}

impl fmt::Debug for IndexValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match std::str::from_utf8(&self.0) {
            Ok(s) => f.debug_tuple("IndexValue").field(&s).finish(),
            Err(_) => f.debug_tuple("IndexValue").field(&self.0).finish(),
        }
    }
}

impl From<&str> for IndexValue {
    fn from(value: &str) -> Self {
        Self(Bytes::copy_from_slice(value.as_bytes()))
    }
}

impl From<String> for IndexValue {
    fn from(value: String) -> Self {
        Self(Bytes::from(value))
    }
}

impl From<&String> for IndexValue {
    fn from(value: &String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<SmolStr> for IndexValue {
    fn from(value: SmolStr) -> Self {
        Self::from(value.as_str())
    }
}

impl From<Bytes> for IndexValue {
    fn from(value: Bytes) -> Self {
        Self(value)
    }
}

impl From<bool> for IndexValue {
    fn from(value: bool) -> Self {
        Self(Bytes::from_static(if value { b"true" } else { b"false" }))
    }
}

macro_rules! index_value_from_display {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for IndexValue {
                fn from(value: $ty) -> Self {
                    Self(Bytes::from(value.to_string()))
                }
            }
        )*
    };
}

index_value_from_display!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, char);

/// A single "path = value" predicate.
///
/// Holding more than one value turns the predicate into a membership test:
/// each value addresses its own index set.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathAndValue {
    path: SmolStr,
    values: Vec<IndexValue>,
}

impl PathAndValue {
    /// Creates a predicate matching a single value.
    pub fn new(path: impl Into<SmolStr>, value: impl Into<IndexValue>) -> Self {
        Self {
            path: path.into(),
            values: vec![value.into()],
        }
    }

    /// Creates a predicate matching any of the given values.
    pub fn any_of<V>(path: impl Into<SmolStr>, values: impl IntoIterator<Item = V>) -> Self
    where
        V: Into<IndexValue>,
    {
        Self {
            path: path.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Dotted property path, e.g. `address.city`.
    #[inline]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// All values of the predicate.
    #[inline]
    pub fn values(&self) -> &[IndexValue] {
        &self.values
    }

    /// First value, if any.
    #[inline]
    pub fn first_value(&self) -> Option<&IndexValue> {
        self.values.first()
    }
}

/// Geographic coordinate, `x` is the longitude and `y` the latitude.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Longitude.
    pub x: f64,
    /// Latitude.
    pub y: f64,
}

impl Point {
    /// Creates a point from longitude and latitude.
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Distance unit understood by the store's geo commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Metric {
    /// Meters (`m`).
    #[default]
    Meters,
    /// Kilometers (`km`).
    Kilometers,
    /// Miles (`mi`).
    Miles,
    /// Feet (`ft`).
    Feet,
}

impl Metric {
    /// Unit token used on the wire.
    pub const fn unit(&self) -> &'static str {
        match self {
            Metric::Meters => "m",
            Metric::Kilometers => "km",
            Metric::Miles => "mi",
            Metric::Feet => "ft",
        }
    }

    /// Number of meters in one unit.
    pub const fn meters(&self) -> f64 {
        match self {
            Metric::Meters => 1.0,
            Metric::Kilometers => 1000.0,
            Metric::Miles => 1609.34,
            Metric::Feet => 0.3048,
        }
    }
}

/// A distance in some [`Metric`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Distance {
    /// Magnitude.
    pub value: f64,
    /// Unit of `value`.
    pub metric: Metric,
}

impl Distance {
    /// Creates a new distance.
    #[inline]
    pub const fn new(value: f64, metric: Metric) -> Self {
        Self { value, metric }
    }

    /// The distance expressed in meters.
    #[inline]
    pub fn in_meters(&self) -> f64 {
        self.value * self.metric.meters()
    }
}

/// Search area of a geo-radius lookup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    /// Center of the circle.
    pub center: Point,
    /// Radius of the circle.
    pub radius: Distance,
}

impl Circle {
    /// Creates a new circle.
    #[inline]
    pub const fn new(center: Point, radius: Distance) -> Self {
        Self { center, radius }
    }
}

/// Geo-proximity predicate: entities whose `path` lies within `distance` of `point`.
#[derive(Debug, Clone, PartialEq)]
pub struct NearPath {
    path: SmolStr,
    point: Point,
    distance: Distance,
}

impl NearPath {
    /// Creates a new near predicate.
    pub fn new(path: impl Into<SmolStr>, point: Point, distance: Distance) -> Self {
        Self {
            path: path.into(),
            point,
            distance,
        }
    }

    /// Dotted path of the geo-indexed property.
    #[inline]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Center point.
    #[inline]
    pub fn point(&self) -> Point {
        self.point
    }

    /// Search radius.
    #[inline]
    pub fn distance(&self) -> Distance {
        self.distance
    }

    /// The search area as a [`Circle`].
    #[inline]
    pub fn circle(&self) -> Circle {
        Circle::new(self.point, self.distance)
    }
}

/// Criteria of a derived query.
///
/// Predicates keep insertion order; adding the same predicate twice to a
/// group has no effect. An empty chain means "no filtering".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OperationChain {
    sismember: IndexSet<PathAndValue>,
    or_sismember: IndexSet<PathAndValue>,
    near: Option<NearPath>,
}

impl OperationChain {
    /// Creates an empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an equality predicate to the AND group.
    #[must_use]
    pub fn and(mut self, path: impl Into<SmolStr>, value: impl Into<IndexValue>) -> Self {
        self.sismember.insert(PathAndValue::new(path, value));
        self
    }

    /// Adds a prebuilt predicate to the AND group.
    #[must_use]
    pub fn and_predicate(mut self, predicate: PathAndValue) -> Self {
        self.sismember.insert(predicate);
        self
    }

    /// Adds an equality predicate to the OR group.
    #[must_use]
    pub fn or(mut self, path: impl Into<SmolStr>, value: impl Into<IndexValue>) -> Self {
        self.or_sismember.insert(PathAndValue::new(path, value));
        self
    }

    /// Adds a prebuilt predicate to the OR group.
    #[must_use]
    pub fn or_predicate(mut self, predicate: PathAndValue) -> Self {
        self.or_sismember.insert(predicate);
        self
    }

    /// Sets the geo-proximity predicate, replacing any previous one.
    #[must_use]
    pub fn near(mut self, path: impl Into<SmolStr>, point: Point, distance: Distance) -> Self {
        self.near = Some(NearPath::new(path, point, distance));
        self
    }

    /// Predicates combined by intersection.
    #[inline]
    pub fn and_group(&self) -> &IndexSet<PathAndValue> {
        &self.sismember
    }

    /// Predicates combined by union.
    #[inline]
    pub fn or_group(&self) -> &IndexSet<PathAndValue> {
        &self.or_sismember
    }

    /// The geo-proximity predicate, if any.
    #[inline]
    pub fn near_path(&self) -> Option<&NearPath> {
        self.near.as_ref()
    }

    /// True when the chain filters nothing.
    pub fn is_empty(&self) -> bool {
        self.sismember.is_empty() && self.or_sismember.is_empty() && self.near.is_none()
    }
}
