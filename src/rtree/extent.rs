// Copyright (c) 2024-present, grid-index
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use std::fmt::Debug;
use std::ops::{Add, Sub};

/// Coordinate type for R-tree points and extents.
///
/// Area, margin and distance computations run in `f64` regardless of the
/// key type, so narrow integer keys cannot overflow and float keys need no
/// total order. `NaN` coordinates are unsupported.
pub trait Coord:
    Copy + PartialOrd + PartialEq + Default + Debug + Add<Output = Self> + Sub<Output = Self>
{
    /// Lossy widening into `f64` for geometric math.
    fn to_f64(self) -> f64;
}

macro_rules! impl_coord {
    ($($t:ty),+) => {
        $(impl Coord for $t {
            #[allow(clippy::cast_lossless)]
            fn to_f64(self) -> f64 {
                self as f64
            }
        })+
    };
}

impl_coord!(i16, i32, i64, f32, f64);

/// A point in `D`-dimensional key space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointN<K, const D: usize> {
    /// One coordinate per dimension
    pub d: [K; D],
}

impl<K: Coord, const D: usize> PointN<K, D> {
    /// Creates a point from its coordinates.
    #[must_use]
    pub fn new(d: [K; D]) -> Self {
        Self { d }
    }

    /// The point's coordinates as `f64`.
    #[must_use]
    pub fn to_f64(&self) -> [f64; D] {
        self.d.map(Coord::to_f64)
    }
}

impl<K: Coord, const D: usize> Default for PointN<K, D> {
    fn default() -> Self {
        Self {
            d: [K::default(); D],
        }
    }
}

impl<K: Coord, const D: usize> From<[K; D]> for PointN<K, D> {
    fn from(d: [K; D]) -> Self {
        Self { d }
    }
}

impl<K: Coord, const D: usize> std::fmt::Display for PointN<K, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(")?;

        for (i, value) in self.d.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }

            write!(f, "{value:?}")?;
        }

        write!(f, ")")
    }
}

/// An axis-aligned `D`-dimensional box, closed on both ends.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Extent<K, const D: usize> {
    /// Low corner (componentwise minimum)
    pub start: PointN<K, D>,

    /// High corner (componentwise maximum)
    pub end: PointN<K, D>,
}

impl<K: Coord, const D: usize> Default for Extent<K, D> {
    fn default() -> Self {
        Self {
            start: PointN::default(),
            end: PointN::default(),
        }
    }
}

impl<K: Coord, const D: usize> From<(PointN<K, D>, PointN<K, D>)> for Extent<K, D> {
    fn from((start, end): (PointN<K, D>, PointN<K, D>)) -> Self {
        Self { start, end }
    }
}

impl<K: Coord, const D: usize> From<([K; D], [K; D])> for Extent<K, D> {
    fn from((start, end): ([K; D], [K; D])) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }
}

impl<K: Coord, const D: usize> std::fmt::Display for Extent<K, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {}", self.start, self.end)
    }
}

impl<K: Coord, const D: usize> Extent<K, D> {
    /// Creates an extent from its two corners.
    #[must_use]
    pub fn new(start: impl Into<PointN<K, D>>, end: impl Into<PointN<K, D>>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    /// The degenerate extent covering exactly one point.
    #[must_use]
    pub fn from_point(point: impl Into<PointN<K, D>>) -> Self {
        let point = point.into();

        Self {
            start: point,
            end: point,
        }
    }

    /// Whether start and end coincide.
    #[must_use]
    pub fn is_point(&self) -> bool {
        self.start == self.end
    }

    /// Whether the point lies inside the extent (boundary included).
    #[must_use]
    pub fn contains(&self, point: &PointN<K, D>) -> bool {
        (0..D).all(|i| self.start.d[i] <= point.d[i] && point.d[i] <= self.end.d[i])
    }

    /// Whether `other` lies fully inside this extent.
    #[must_use]
    pub fn contains_extent(&self, other: &Self) -> bool {
        self.contains(&other.start) && self.contains(&other.end)
    }

    /// Whether the extents overlap, boundary touches included.
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        (0..D).all(|i| {
            !(other.end.d[i] < self.start.d[i] || self.end.d[i] < other.start.d[i])
        })
    }

    /// Grows this extent to the componentwise union with `other`.
    pub fn extend_to(&mut self, other: &Self) {
        for i in 0..D {
            if other.start.d[i] < self.start.d[i] {
                self.start.d[i] = other.start.d[i];
            }

            if other.end.d[i] > self.end.d[i] {
                self.end.d[i] = other.end.d[i];
            }
        }
    }

    /// Componentwise union of two extents.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        let mut merged = *self;
        merged.extend_to(other);
        merged
    }

    /// Hyper-volume of the extent.
    #[must_use]
    pub fn area(&self) -> f64 {
        (0..D)
            .map(|i| self.end.d[i].to_f64() - self.start.d[i].to_f64())
            .product()
    }

    /// Sum of the edge lengths.
    #[must_use]
    pub fn margin(&self) -> f64 {
        (0..D)
            .map(|i| self.end.d[i].to_f64() - self.start.d[i].to_f64())
            .sum()
    }

    /// Midpoint of the extent in `f64` space.
    #[must_use]
    pub fn center(&self) -> [f64; D] {
        let mut center = [0.0; D];

        for (i, slot) in center.iter_mut().enumerate() {
            *slot = (self.start.d[i].to_f64() + self.end.d[i].to_f64()) / 2.0;
        }

        center
    }
}

/// Length of the overlap of two extents along one dimension; zero-length
/// when they merely touch, `None` when they are apart in that dimension.
#[must_use]
pub fn linear_intersection<K: Coord, const D: usize>(
    a: &Extent<K, D>,
    b: &Extent<K, D>,
    dim: usize,
) -> Option<K> {
    let start = if a.start.d[dim] < b.start.d[dim] {
        b.start.d[dim]
    } else {
        a.start.d[dim]
    };

    let end = if a.end.d[dim] < b.end.d[dim] {
        a.end.d[dim]
    } else {
        b.end.d[dim]
    };

    if end < start {
        return None;
    }

    Some(end - start)
}

/// Intersection box of two extents, `None` when they do not overlap.
#[must_use]
pub fn intersection<K: Coord, const D: usize>(
    a: &Extent<K, D>,
    b: &Extent<K, D>,
) -> Option<Extent<K, D>> {
    if !a.intersects(b) {
        return None;
    }

    let mut result = *a;

    for i in 0..D {
        if b.start.d[i] > result.start.d[i] {
            result.start.d[i] = b.start.d[i];
        }

        if b.end.d[i] < result.end.d[i] {
            result.end.d[i] = b.end.d[i];
        }
    }

    Some(result)
}

/// Area of the overlap of two extents (zero when they do not overlap).
#[must_use]
pub fn overlap_area<K: Coord, const D: usize>(a: &Extent<K, D>, b: &Extent<K, D>) -> f64 {
    intersection(a, b).map_or(0.0, |x| x.area())
}

/// Squared euclidean distance between two points in `f64` space.
#[must_use]
pub fn square_distance<const D: usize>(a: &[f64; D], b: &[f64; D]) -> f64 {
    (0..D).map(|i| (a[i] - b[i]) * (a[i] - b[i])).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    type Box2 = Extent<i16, 2>;

    #[test]
    fn extent_union_and_area() {
        let a = Box2::new([0, 0], [2, 2]);
        let b = Box2::new([3, 3], [5, 5]);

        let merged = a.union(&b);
        assert_eq!(Box2::new([0, 0], [5, 5]), merged);
        assert_eq!(25.0, merged.area());
        assert_eq!(10.0, merged.margin());
    }

    #[test]
    fn extent_containment() {
        let outer = Box2::new([0, 0], [10, 10]);
        let inner = Box2::new([2, 2], [3, 8]);

        assert!(outer.contains_extent(&inner));
        assert!(!inner.contains_extent(&outer));
        assert!(outer.contains(&[10, 10].into()));
        assert!(!outer.contains(&[11, 10].into()));
    }

    #[test]
    fn extent_linear_intersection_lengths() {
        struct Check {
            bb1: Box2,
            bb2: Box2,
            expected: [Option<i16>; 2],
        }

        let checks = [
            Check {
                bb1: Box2::new([0, 0], [3, 6]),
                bb2: Box2::new([1, 2], [7, 5]),
                expected: [Some(2), Some(3)],
            },
            Check {
                bb1: Box2::new([3, 2], [7, 10]),
                bb2: Box2::new([1, 10], [10, 11]),
                expected: [Some(4), Some(0)],
            },
            Check {
                bb1: Box2::new([3, 2], [7, 6]),
                bb2: Box2::new([5, 4], [11, 8]),
                expected: [Some(2), Some(2)],
            },
            Check {
                bb1: Box2::new([-2, -8], [2, -5]),
                bb2: Box2::new([0, -10], [8, -1]),
                expected: [Some(2), Some(3)],
            },
            Check {
                bb1: Box2::new([0, 0], [6, 6]),
                bb2: Box2::new([0, 0], [2, 3]),
                expected: [Some(2), Some(3)],
            },
            Check {
                bb1: Box2::new([0, 0], [1, 1]),
                bb2: Box2::new([5, 0], [6, 1]),
                expected: [None, Some(1)],
            },
        ];

        for (i, check) in checks.iter().enumerate() {
            for dim in 0..2 {
                assert_eq!(
                    check.expected[dim],
                    linear_intersection(&check.bb1, &check.bb2, dim),
                    "check {i}, dimension {dim}",
                );
            }
        }
    }

    #[test]
    fn extent_intersection_box() {
        let a = Box2::new([0, 0], [3, 6]);
        let b = Box2::new([1, 2], [7, 5]);

        assert_eq!(Some(Box2::new([1, 2], [3, 5])), intersection(&a, &b));
        assert_eq!(6.0, overlap_area(&a, &b));

        let apart = Box2::new([10, 10], [12, 12]);
        assert_eq!(None, intersection(&a, &apart));
        assert_eq!(0.0, overlap_area(&a, &apart));
    }

    #[test]
    fn extent_square_distance() {
        let a = [0.0, 0.0];
        let b = [3.0, 4.0];

        assert_eq!(25.0, square_distance(&a, &b));
        assert_eq!(0.0, square_distance(&a, &a));
    }

    #[test]
    fn extent_display_format() {
        let e = Box2::new([-2, -2], [2, 2]);
        assert_eq!("(-2, -2) - (2, 2)", e.to_string());
    }
}
