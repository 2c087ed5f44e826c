//! Workspace geometry: points, bounding boxes and component footprints.

use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::numeric::{Real, ensure_finite};
use crate::singlevec::SingleVec;
use crate::units::Length;
use crate::{CoreError, CoreResult};

/// A 2D point on the workspace plane.
///
/// Serialized as a two-element array of unit-suffixed lengths,
/// e.g. `["3.2m", "10mm"]`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    pub x: Length,
    pub y: Length,
}

impl Point {
    pub const fn new(x: Length, y: Length) -> Self {
        Self { x, y }
    }

    /// Euclidean distance, displayed in the unit of `self.x`.
    pub fn distance(&self, other: &Point) -> Length {
        let dx = self.x.normalized() - other.x.normalized();
        let dy = self.y.normalized() - other.y.normalized();
        Length::from_normalized(dx.hypot(dy)).to(self.x.unit())
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl AddAssign for Point {
    fn add_assign(&mut self, rhs: Point) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl SubAssign for Point {
    fn sub_assign(&mut self, rhs: Point) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl Neg for Point {
    type Output = Point;

    fn neg(self) -> Point {
        Point::new(-self.x, -self.y)
    }
}

impl Mul<Real> for Point {
    type Output = Point;

    fn mul(self, scale: Real) -> Point {
        Point::new(self.x * scale, self.y * scale)
    }
}

impl Div<Real> for Point {
    type Output = Point;

    fn div(self, scale: Real) -> Point {
        Point::new(self.x / scale, self.y / scale)
    }
}

impl Serialize for Point {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (self.x, self.y).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Point {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let (x, y) = <(Length, Length)>::deserialize(deserializer)?;
        Ok(Point::new(x, y))
    }
}

/// Axis-aligned bounding box, `min <= max` componentwise once non-empty.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Point,
    pub max: Point,
}

impl Aabb {
    /// A box containing nothing: the first [`expand`](Self::expand)
    /// establishes real bounds.
    pub fn empty() -> Self {
        Self {
            min: Point::new(
                Length::from_normalized(Real::INFINITY),
                Length::from_normalized(Real::INFINITY),
            ),
            max: Point::new(
                Length::from_normalized(Real::NEG_INFINITY),
                Length::from_normalized(Real::NEG_INFINITY),
            ),
        }
    }

    pub fn new(min: Point, max: Point) -> CoreResult<Self> {
        if min.x > max.x || min.y > max.y {
            return Err(CoreError::InvalidArg {
                what: "AABB min must not exceed max",
            });
        }
        Ok(Self { min, max })
    }

    /// Box spanning `(0, 0)` to `(width, height)`.
    pub fn from_size(width: Length, height: Length) -> CoreResult<Self> {
        Self::new(Point::default(), Point::new(width, height))
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y
    }

    /// Grow to include `p`.
    pub fn expand(&mut self, p: Point) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
    }

    /// Inclusive point-in-box test.
    pub fn contains_point(&self, p: &Point) -> bool {
        self.min.x <= p.x && self.min.y <= p.y && self.max.x >= p.x && self.max.y >= p.y
    }

    /// Inclusive box-in-box test.
    pub fn contains(&self, other: &Aabb) -> bool {
        self.min.x <= other.min.x
            && self.min.y <= other.min.y
            && self.max.x >= other.max.x
            && self.max.y >= other.max.y
    }

    pub fn width(&self) -> Length {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> Length {
        self.max.y - self.min.y
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::empty()
    }
}

/// Translate the box by `offset`.
impl Add<Point> for Aabb {
    type Output = Aabb;

    fn add(self, offset: Point) -> Aabb {
        Aabb {
            min: self.min + offset,
            max: self.max + offset,
        }
    }
}

impl FromIterator<Point> for Aabb {
    fn from_iter<I: IntoIterator<Item = Point>>(iter: I) -> Self {
        let mut aabb = Aabb::empty();
        for p in iter {
            aabb.expand(p);
        }
        aabb
    }
}

/// Closed polygonal outline of a component; the last point connects back
/// to the first.
///
/// The bounding box is derived from the points and recomputed whenever the
/// point sequence is replaced.
#[derive(Debug, Clone, PartialEq)]
pub struct Footprint {
    pts: SingleVec<Point>,
    aabb: Aabb,
}

impl Footprint {
    pub fn new(pts: SingleVec<Point>) -> CoreResult<Self> {
        let mut fp = Self {
            pts: SingleVec::new(Point::default()),
            aabb: Aabb::empty(),
        };
        fp.set_points(pts)?;
        Ok(fp)
    }

    /// Replace the outline and recompute the bounding box.
    pub fn set_points(&mut self, pts: SingleVec<Point>) -> CoreResult<()> {
        if pts.is_empty() {
            return Err(CoreError::InvalidArg {
                what: "footprint needs at least one point",
            });
        }
        for p in &pts {
            ensure_finite(p.x.normalized(), "footprint x")?;
            ensure_finite(p.y.normalized(), "footprint y")?;
        }
        self.aabb = pts.iter().copied().collect();
        self.pts = pts;
        Ok(())
    }

    pub fn first(&self) -> &Point {
        self.pts.first()
    }

    pub fn points(&self) -> &[Point] {
        self.pts.as_slice()
    }

    pub fn aabb(&self) -> &Aabb {
        &self.aabb
    }

    /// Polygon sides as `(from, to)` pairs, including the closing side.
    pub fn sides(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        let pts = self.points();
        pts.iter()
            .zip(pts.iter().cycle().skip(1))
            .map(|(a, b)| (*a, *b))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Point> {
        self.pts.iter()
    }
}

impl<'a> IntoIterator for &'a Footprint {
    type Item = &'a Point;
    type IntoIter = std::slice::Iter<'a, Point>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl Serialize for Footprint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.pts.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Footprint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let pts = SingleVec::<Point>::deserialize(deserializer)?;
        Footprint::new(pts).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::{LengthUnit, m, mm};

    fn pt(x: Real, y: Real) -> Point {
        Point::new(m(x), m(y))
    }

    #[test]
    fn point_arithmetic_is_componentwise() {
        assert_eq!(pt(1.0, 2.0) + pt(0.5, -1.0), pt(1.5, 1.0));
        assert_eq!(pt(1.0, 2.0) - pt(1.0, 1.0), pt(0.0, 1.0));
        assert_eq!(-pt(1.0, -2.0), pt(-1.0, 2.0));
        assert_eq!(pt(1.0, 2.0) * 2.0, pt(2.0, 4.0));
    }

    #[test]
    fn distance_uses_first_operand_unit() {
        let a = Point::new(mm(0.0), mm(0.0));
        let d = a.distance(&pt(3.0, 4.0));
        assert_eq!(d.unit(), LengthUnit::Millimeters);
        assert!((d.value() - 5000.0).abs() < 1e-6);
    }

    #[test]
    fn empty_aabb_takes_first_point() {
        let mut aabb = Aabb::empty();
        assert!(aabb.is_empty());
        aabb.expand(pt(1.0, 1.0));
        assert_eq!(aabb.min, pt(1.0, 1.0));
        assert_eq!(aabb.max, pt(1.0, 1.0));
        aabb.expand(pt(-1.0, 3.0));
        assert_eq!(aabb.min, pt(-1.0, 1.0));
        assert_eq!(aabb.max, pt(1.0, 3.0));
    }

    #[test]
    fn contains_is_inclusive() {
        let aabb = Aabb::from_size(m(2.0), m(1.0)).unwrap();
        assert!(aabb.contains_point(&pt(2.0, 1.0)));
        assert!(aabb.contains_point(&pt(0.0, 0.0)));
        assert!(!aabb.contains_point(&pt(2.1, 0.5)));
        assert!(aabb.contains(&aabb));
        assert!(!aabb.contains(&(aabb + pt(0.5, 0.0))));
    }

    #[test]
    fn aabb_rejects_inverted_bounds() {
        assert!(Aabb::new(pt(1.0, 0.0), pt(0.0, 1.0)).is_err());
    }

    #[test]
    fn footprint_from_json() {
        let fp: Footprint = serde_json::from_str(r#"[[0, "0m"], ["1m", "0m"], ["1m", "50cm"]]"#).unwrap();
        assert_eq!(fp.points().len(), 3);
        assert_eq!(fp.aabb().max, pt(1.0, 0.5));
        assert_eq!(fp.sides().count(), 3);
        assert_eq!(fp.sides().last(), Some((pt(1.0, 0.5), pt(0.0, 0.0))));

        let err = serde_json::from_str::<Footprint>("[]").unwrap_err();
        assert!(err.to_string().contains("at least one point"));
    }

    #[test]
    fn footprint_recomputes_on_set() {
        let mut fp = Footprint::new(SingleVec::new(pt(0.0, 0.0))).unwrap();
        let mut pts = SingleVec::new(pt(-2.0, 0.0));
        pts.push(pt(2.0, 3.0));
        fp.set_points(pts).unwrap();
        assert_eq!(fp.aabb().min, pt(-2.0, 0.0));
        assert_eq!(fp.aabb().max, pt(2.0, 3.0));
    }

    #[test]
    fn point_serializes_with_units() {
        let p = Point::new(mm(5.0), m(1.0));
        assert_eq!(serde_json::to_string(&p).unwrap(), r#"["5mm","1m"]"#);
    }
}
