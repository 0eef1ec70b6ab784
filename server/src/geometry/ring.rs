//! Closed coordinate rings and winding-order normalization
//!
//! The geofencing backend only accepts polygons whose outer ring is wound
//! counter-clockwise (right-hand rule). Rings drawn by users can come in
//! either direction, so every ring is normalized before it is submitted.

use serde::{Deserialize, Serialize};

use super::types::{BoundingBox, Coordinate, GeometryError, Orientation};

/// Minimum number of positions in a closed ring (a triangle plus the closing point)
pub const MIN_RING_LEN: usize = 4;

/// A ring whose |signed area| is at or below this fraction of its bounding-box
/// area is treated as degenerate.
pub const AREA_EPSILON: f64 = 1e-9;

/// A closed sequence of coordinates bounding a polygon.
///
/// Invariants: at least [`MIN_RING_LEN`] coordinates, first == last, no two
/// consecutive coordinates equal, every coordinate finite and within
/// longitude/latitude range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Coordinate>", into = "Vec<Coordinate>")]
pub struct Ring(Vec<Coordinate>);

impl Ring {
    /// Build a ring, enforcing every ring invariant
    pub fn new(coordinates: Vec<Coordinate>) -> Result<Self, GeometryError> {
        if coordinates.len() < MIN_RING_LEN {
            return Err(GeometryError::TooFewCoordinates {
                count: coordinates.len(),
            });
        }

        for (index, c) in coordinates.iter().enumerate() {
            if !c.is_finite() {
                return Err(GeometryError::NonFiniteCoordinate { index });
            }
            if !c.in_range() {
                return Err(GeometryError::OutOfRange {
                    index,
                    lon: c.lon,
                    lat: c.lat,
                });
            }
        }

        if coordinates.first() != coordinates.last() {
            return Err(GeometryError::NotClosed);
        }

        if let Some(index) = coordinates
            .windows(2)
            .position(|pair| pair[0] == pair[1])
        {
            return Err(GeometryError::RepeatedCoordinate { index: index + 1 });
        }

        Ok(Self(coordinates))
    }

    /// Build a ring from the raw vertex list of a drawing tool.
    ///
    /// Consecutive duplicate vertices are dropped and an open ring is closed
    /// before the usual invariants are checked.
    pub fn from_drawn(mut coordinates: Vec<Coordinate>) -> Result<Self, GeometryError> {
        coordinates.dedup();

        let closed = coordinates.len() > 1 && coordinates.first() == coordinates.last();
        if !closed && let Some(&first) = coordinates.first() {
            coordinates.push(first);
        }

        Self::new(coordinates)
    }

    pub fn coordinates(&self) -> &[Coordinate] {
        &self.0
    }

    pub fn into_coordinates(self) -> Vec<Coordinate> {
        self.0
    }

    /// Number of distinct vertices (the closing position is not counted twice)
    pub fn vertex_count(&self) -> usize {
        self.0.len() - 1
    }

    /// Signed area by the shoelace formula, positive for counter-clockwise rings.
    ///
    /// Coordinates are taken relative to the first vertex and the terms are
    /// accumulated with Neumaier summation, which keeps small rings far from
    /// the origin from cancelling to noise.
    pub fn signed_area(&self) -> f64 {
        let origin = self.0[0];
        let mut sum = 0.0_f64;
        let mut compensation = 0.0_f64;

        for pair in self.0.windows(2) {
            let (ax, ay) = (pair[0].lon - origin.lon, pair[0].lat - origin.lat);
            let (bx, by) = (pair[1].lon - origin.lon, pair[1].lat - origin.lat);
            let term = ax * by - bx * ay;

            let t = sum + term;
            if sum.abs() >= term.abs() {
                compensation += (sum - t) + term;
            } else {
                compensation += (term - t) + sum;
            }
            sum = t;
        }

        0.5 * (sum + compensation)
    }

    pub fn bounding_box(&self) -> BoundingBox {
        let mut bbox = BoundingBox {
            min_lon: f64::INFINITY,
            min_lat: f64::INFINITY,
            max_lon: f64::NEG_INFINITY,
            max_lat: f64::NEG_INFINITY,
        };
        for c in &self.0 {
            bbox.min_lon = bbox.min_lon.min(c.lon);
            bbox.min_lat = bbox.min_lat.min(c.lat);
            bbox.max_lon = bbox.max_lon.max(c.lon);
            bbox.max_lat = bbox.max_lat.max(c.lat);
        }
        bbox
    }

    /// Winding direction, or `Degenerate` when the area is indistinguishable from zero
    pub fn orientation(&self) -> Result<Orientation, GeometryError> {
        let area = self.signed_area();
        let tolerance = AREA_EPSILON * self.bounding_box().area();

        if area.abs() <= tolerance {
            Err(GeometryError::Degenerate { area })
        } else if area > 0.0 {
            Ok(Orientation::CounterClockwise)
        } else {
            Ok(Orientation::Clockwise)
        }
    }

    /// The same ring traversed in the opposite direction
    pub fn reversed(&self) -> Self {
        let mut coordinates = self.0.clone();
        coordinates.reverse();
        Self(coordinates)
    }
}

impl TryFrom<Vec<Coordinate>> for Ring {
    type Error = GeometryError;

    fn try_from(coordinates: Vec<Coordinate>) -> Result<Self, Self::Error> {
        Self::new(coordinates)
    }
}

impl From<Ring> for Vec<Coordinate> {
    fn from(ring: Ring) -> Self {
        ring.0
    }
}

/// Return `ring` wound counter-clockwise, as the backend requires for outer rings.
///
/// Clockwise rings are reversed, counter-clockwise rings are returned as an
/// equal copy. Degenerate rings are rejected.
pub fn normalize_orientation(ring: &Ring) -> Result<Ring, GeometryError> {
    match ring.orientation()? {
        Orientation::CounterClockwise => Ok(ring.clone()),
        Orientation::Clockwise => Ok(ring.reversed()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    fn ring(points: &[(f64, f64)]) -> Ring {
        Ring::new(points.iter().copied().map(Coordinate::from).collect()).unwrap()
    }

    /// Random star-shaped (hence simple) ring, counter-clockwise by construction
    fn random_star_ring(rng: &mut ChaCha8Rng) -> Ring {
        let n = rng.random_range(3..24);
        let center_lon = rng.random_range(-170.0..170.0);
        let center_lat = rng.random_range(-80.0..80.0);
        let scale = rng.random_range(0.001..5.0);
        let step = std::f64::consts::TAU / n as f64;

        let mut coordinates: Vec<Coordinate> = (0..n)
            .map(|i| {
                let angle = step * i as f64 + rng.random_range(0.0..step * 0.5);
                let radius = scale * rng.random_range(0.5..1.0);
                Coordinate::new(
                    center_lon + radius * angle.cos(),
                    center_lat + radius * angle.sin(),
                )
            })
            .collect();
        coordinates.push(coordinates[0]);
        Ring::new(coordinates).unwrap()
    }

    #[test]
    fn test_unit_square_clockwise() {
        let cw = ring(&[(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0), (0.0, 0.0)]);
        assert_eq!(cw.signed_area(), -1.0);
        assert_eq!(cw.orientation().unwrap(), Orientation::Clockwise);

        let normalized = normalize_orientation(&cw).unwrap();
        assert_eq!(
            normalized,
            ring(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0), (0.0, 0.0)])
        );
        assert_eq!(normalized.signed_area(), 1.0);
    }

    #[test]
    fn test_counter_clockwise_unchanged() {
        let ccw = ring(&[(0.0, 0.0), (2.0, 0.0), (1.0, 2.0), (0.0, 0.0)]);
        assert_eq!(normalize_orientation(&ccw).unwrap(), ccw);
    }

    #[test]
    fn test_collinear_ring_is_degenerate() {
        let line = ring(&[(0.0, 0.0), (1.0, 1.0), (2.0, 2.0), (0.0, 0.0)]);
        assert!(matches!(
            normalize_orientation(&line),
            Err(GeometryError::Degenerate { .. })
        ));

        let flat = ring(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (0.0, 0.0)]);
        assert!(matches!(
            flat.orientation(),
            Err(GeometryError::Degenerate { .. })
        ));
    }

    #[test]
    fn test_small_ring_far_from_origin_keeps_orientation() {
        let d = 1e-6;
        let (x, y) = (179.9, 89.9);
        let cw = ring(&[(x, y), (x, y + d), (x + d, y + d), (x + d, y), (x, y)]);
        assert_eq!(cw.orientation().unwrap(), Orientation::Clockwise);
        assert_eq!(
            normalize_orientation(&cw).unwrap().orientation().unwrap(),
            Orientation::CounterClockwise
        );
    }

    #[test]
    fn test_ring_invariants() {
        let open = vec![
            Coordinate::new(0.0, 0.0),
            Coordinate::new(1.0, 0.0),
            Coordinate::new(1.0, 1.0),
            Coordinate::new(0.0, 1.0),
        ];
        assert_eq!(Ring::new(open.clone()), Err(GeometryError::NotClosed));

        assert_eq!(
            Ring::new(open[..2].to_vec()),
            Err(GeometryError::TooFewCoordinates { count: 2 })
        );

        let repeated: Vec<Coordinate> = [(0.0, 0.0), (1.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 0.0)]
            .into_iter()
            .map(Coordinate::from)
            .collect();
        assert_eq!(
            Ring::new(repeated),
            Err(GeometryError::RepeatedCoordinate { index: 2 })
        );

        let nan: Vec<Coordinate> = [(0.0, 0.0), (f64::NAN, 0.0), (1.0, 1.0), (0.0, 0.0)]
            .into_iter()
            .map(Coordinate::from)
            .collect();
        assert_eq!(
            Ring::new(nan),
            Err(GeometryError::NonFiniteCoordinate { index: 1 })
        );

        let out: Vec<Coordinate> = [(0.0, 0.0), (181.0, 0.0), (1.0, 1.0), (0.0, 0.0)]
            .into_iter()
            .map(Coordinate::from)
            .collect();
        assert!(matches!(
            Ring::new(out),
            Err(GeometryError::OutOfRange { index: 1, .. })
        ));
    }

    #[test]
    fn test_from_drawn_closes_and_dedups() {
        let drawn: Vec<Coordinate> = [(0.0, 0.0), (1.0, 0.0), (1.0, 0.0), (1.0, 1.0)]
            .into_iter()
            .map(Coordinate::from)
            .collect();
        let r = Ring::from_drawn(drawn).unwrap();
        assert_eq!(
            r,
            ring(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 0.0)])
        );
        assert_eq!(r.vertex_count(), 3);

        assert_eq!(
            Ring::from_drawn(vec![]),
            Err(GeometryError::TooFewCoordinates { count: 0 })
        );
    }

    #[test]
    fn test_ring_serde_as_positions() {
        let r = ring(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 0.0)]);
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json, serde_json::json!([[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]));

        let bad: Result<Ring, _> = serde_json::from_str("[[0,0],[1,0],[1,1]]");
        assert!(bad.is_err());
    }

    #[test]
    fn test_normalize_random_rings() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        for _ in 0..500 {
            let ccw = random_star_ring(&mut rng);
            let input = if rng.random_bool(0.5) { ccw.reversed() } else { ccw.clone() };

            let once = normalize_orientation(&input).unwrap();
            assert!(once.signed_area() > 0.0);
            assert_eq!(normalize_orientation(&once).unwrap(), once);
            assert_eq!(once, ccw);
            assert_eq!(once.coordinates().first(), input.coordinates().first());
        }
    }
}
