//! Hit-testing and outlines for shapes, shared by the painters.

use std::f64::consts::TAU;

use crate::backend::{Point, Shape};

/// Segments used to approximate a full circle.
const CIRCLE_SEGMENTS: usize = 64;

impl Shape {
    /// Whether `point` lies inside the filled area of the shape.
    pub fn contains(&self, point: Point) -> bool {
        match self {
            Self::Rect {
                x,
                y,
                width,
                height,
            } => point.x >= *x && point.x <= x + width && point.y >= *y && point.y <= y + height,
            Self::Polygon { rings } => {
                rings
                    .iter()
                    .filter(|ring| ring_contains(ring, point))
                    .count()
                    % 2
                    == 1
            }
            Self::Arc {
                center,
                inner_radius,
                outer_radius,
                start_angle,
                end_angle,
            } => {
                let dx = point.x - center.x;
                let dy = point.y - center.y;
                let radius = dx.hypot(dy);
                if radius < *inner_radius || radius > *outer_radius {
                    return false;
                }
                let angle = dx.atan2(-dy).rem_euclid(TAU);
                angle >= *start_angle && angle <= *end_angle
            }
            Self::Path { .. } => false,
        }
    }

    /// Axis-aligned bounds as `(min, max)`.
    pub fn bounds(&self) -> Option<(Point, Point)> {
        match self {
            Self::Rect {
                x,
                y,
                width,
                height,
            } => Some((Point::new(*x, *y), Point::new(x + width, y + height))),
            _ => bounds(self.outline().iter().flatten()),
        }
    }

    /// Stroke outline as a list of polylines.
    pub fn outline(&self) -> Vec<Vec<Point>> {
        match self {
            Self::Rect {
                x,
                y,
                width,
                height,
            } => vec![vec![
                Point::new(*x, *y),
                Point::new(x + width, *y),
                Point::new(x + width, y + height),
                Point::new(*x, y + height),
                Point::new(*x, *y),
            ]],
            Self::Path { points } => vec![points.clone()],
            Self::Polygon { rings } => rings.clone(),
            Self::Arc {
                center,
                inner_radius,
                outer_radius,
                start_angle,
                end_angle,
            } => {
                let mut outline = arc_points(*center, *outer_radius, *start_angle, *end_angle);
                let mut inner = arc_points(*center, *inner_radius, *start_angle, *end_angle);
                inner.reverse();
                outline.extend(inner);
                if let Some(first) = outline.first().copied() {
                    outline.push(first);
                }
                vec![outline]
            }
        }
    }

    /// Copy of an arc with its outer radius scaled; other shapes are unchanged.
    #[must_use]
    pub fn enlarged(&self, factor: f64) -> Self {
        match self {
            Self::Arc {
                center,
                inner_radius,
                outer_radius,
                start_angle,
                end_angle,
            } => Self::Arc {
                center: *center,
                inner_radius: *inner_radius,
                outer_radius: outer_radius * factor,
                start_angle: *start_angle,
                end_angle: *end_angle,
            },
            other => other.clone(),
        }
    }

    /// Grid points inside the shape, sampled every `step` units.
    pub fn fill_points(&self, step: f64) -> Vec<Point> {
        let Some((min, max)) = self.bounds() else {
            return Vec::new();
        };
        if step <= 0.0 || !step.is_finite() {
            return Vec::new();
        }

        let mut points = Vec::new();
        let mut y = (min.y / step).floor() * step;
        while y <= max.y {
            let mut x = (min.x / step).floor() * step;
            while x <= max.x {
                let sample = Point::new(x, y);
                if self.contains(sample) {
                    points.push(sample);
                }
                x += step;
            }
            y += step;
        }
        points
    }
}

/// Bounds of a set of points, ignoring non-finite coordinates.
pub fn bounds<'a>(points: impl IntoIterator<Item = &'a Point>) -> Option<(Point, Point)> {
    points
        .into_iter()
        .filter(|point| point.x.is_finite() && point.y.is_finite())
        .fold(None, |acc, point| match acc {
            None => Some((*point, *point)),
            Some((min, max)) => Some((
                Point::new(min.x.min(point.x), min.y.min(point.y)),
                Point::new(max.x.max(point.x), max.y.max(point.y)),
            )),
        })
}

fn ring_contains(ring: &[Point], point: Point) -> bool {
    let mut inside = false;
    let mut previous = match ring.last() {
        Some(last) => *last,
        None => return false,
    };
    for current in ring {
        if (current.y > point.y) != (previous.y > point.y) {
            let cross = (previous.x - current.x) * (point.y - current.y)
                / (previous.y - current.y)
                + current.x;
            if point.x < cross {
                inside = !inside;
            }
        }
        previous = *current;
    }
    inside
}

fn arc_points(center: Point, radius: f64, start: f64, end: f64) -> Vec<Point> {
    if radius <= 0.0 {
        return vec![center];
    }
    let sweep = (end - start).abs();
    let segments = ((sweep / TAU) * CIRCLE_SEGMENTS as f64).ceil().max(1.0) as usize;
    (0..=segments)
        .map(|i| {
            let angle = (end - start).mul_add(i as f64 / segments as f64, start);
            Point::new(
                radius.mul_add(angle.sin(), center.x),
                radius.mul_add(-angle.cos(), center.y),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::f64::consts::PI;

    use super::*;

    fn square(x: f64, y: f64, size: f64) -> Vec<Point> {
        vec![
            Point::new(x, y),
            Point::new(x + size, y),
            Point::new(x + size, y + size),
            Point::new(x, y + size),
            Point::new(x, y),
        ]
    }

    #[test]
    fn polygon_holes_use_even_odd_rule() {
        let shape = Shape::Polygon {
            rings: vec![square(0.0, 0.0, 10.0), square(3.0, 3.0, 4.0)],
        };
        assert!(shape.contains(Point::new(1.0, 1.0)));
        assert!(!shape.contains(Point::new(5.0, 5.0)));
        assert!(!shape.contains(Point::new(11.0, 5.0)));
    }

    #[test]
    fn arc_contains_respects_clockwise_angles() {
        let quarter = Shape::Arc {
            center: Point::new(0.0, 0.0),
            inner_radius: 0.0,
            outer_radius: 10.0,
            start_angle: 0.0,
            end_angle: PI / 2.0,
        };
        // twelve to three o'clock is the upper right quadrant (negative y)
        assert!(quarter.contains(Point::new(3.0, -3.0)));
        assert!(!quarter.contains(Point::new(-3.0, -3.0)));
        assert!(!quarter.contains(Point::new(3.0, 3.0)));
        assert!(!quarter.contains(Point::new(9.0, -9.0)));
    }

    #[test]
    fn fill_points_stay_inside_bounds() {
        let rect = Shape::Rect {
            x: 0.0,
            y: 0.0,
            width: 4.0,
            height: 2.0,
        };
        let points = rect.fill_points(1.0);
        assert_eq!(points.len(), 15);
        assert!(points.iter().all(|p| rect.contains(*p)));
    }

    #[test]
    fn enlarged_only_changes_arcs() {
        let arc = Shape::Arc {
            center: Point::new(0.0, 0.0),
            inner_radius: 0.0,
            outer_radius: 10.0,
            start_angle: 0.0,
            end_angle: 1.0,
        };
        let Shape::Arc { outer_radius, .. } = arc.enlarged(1.1) else {
            panic!("expected arc");
        };
        assert!((outer_radius - 11.0).abs() < 1e-9);

        let path = Shape::Path { points: vec![] };
        assert_eq!(path.enlarged(2.0), path);
    }
}
