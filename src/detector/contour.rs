/// Boundary contours of labelled components
///
/// Tracing walks the outer boundary of one label with Moore-neighbour
/// tracing; [`Contour::reduce`] collapses near-collinear runs with
/// Douglas-Peucker so shape tests can count corners.
use crate::models::{Matrix, PointI};

/// Moore neighbourhood, clockwise from east (y grows downward)
const NEIGHBOURS: [(i32, i32); 8] = [
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
];

/// Index of west in [`NEIGHBOURS`]
const WEST: usize = 4;

/// Ordered boundary points of one component
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Contour {
    points: Vec<PointI>,
}

impl Contour {
    /// Wrap an ordered point list
    pub fn new(points: Vec<PointI>) -> Self {
        Self { points }
    }

    /// Boundary points in tracing order
    pub fn points(&self) -> &[PointI] {
        &self.points
    }

    /// Number of points
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True for a contour with no points
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Trace the outer boundary of `label`, clockwise
    ///
    /// `start` must be the label's first pixel in raster order, so its west
    /// neighbour is known to be outside the component. Tracing stops when
    /// the walk re-enters `start` from the same side it first left (Jacob's
    /// criterion). An isolated pixel yields a one-point contour.
    pub fn trace(labels: &Matrix<i32>, label: i32, start: PointI) -> Contour {
        let (w, h) = (labels.width() as i32, labels.height() as i32);
        let inside = |p: PointI| {
            p.x >= 0 && p.y >= 0 && p.x < w && p.y < h && labels.get(p.x as usize, p.y as usize) == label
        };

        let mut points = vec![start];
        let mut current = start;
        let mut backtrack = WEST;
        // Every boundary pixel is entered at most once per neighbour
        let max_steps = 8 * (w as usize) * (h as usize) + 8;

        for _ in 0..max_steps {
            let Some(dir) = (1..=8)
                .map(|i| (backtrack + i) % 8)
                .find(|&d| inside(step(current, d)))
            else {
                break;
            };

            let next = step(current, dir);
            let previous_ring = step(current, (dir + 7) % 8);
            let next_backtrack = direction_between(next, previous_ring);

            if next == start && next_backtrack == WEST {
                break;
            }
            points.push(next);
            current = next;
            backtrack = next_backtrack;
        }

        Contour { points }
    }

    /// Simplify the closed contour with Douglas-Peucker
    ///
    /// The contour is split at its first point and the point farthest from
    /// it; each half keeps its endpoints and every point that deviates more
    /// than `tolerance` from the chord of its current span.
    pub fn reduce(&self, tolerance: f64) -> Contour {
        let n = self.points.len();
        if n <= 2 {
            return self.clone();
        }

        let origin = self.points[0];
        let far = (1..n)
            .max_by_key(|&i| self.points[i].distance_squared(&origin))
            .unwrap_or(0);
        if self.points[far] == origin {
            return Contour::new(vec![origin]);
        }

        let mut closed = self.points.clone();
        closed.push(origin);

        let first = simplify_open(&closed[..=far], tolerance);
        let second = simplify_open(&closed[far..], tolerance);

        let mut points = first;
        points.extend_from_slice(&second[1..second.len() - 1]);
        Contour::new(points)
    }
}

#[inline]
fn step(p: PointI, dir: usize) -> PointI {
    let (dx, dy) = NEIGHBOURS[dir];
    PointI::new(p.x + dx, p.y + dy)
}

/// Direction index from `from` to an adjacent `to`
fn direction_between(from: PointI, to: PointI) -> usize {
    let delta = (to.x - from.x, to.y - from.y);
    NEIGHBOURS.iter().position(|&d| d == delta).unwrap_or(WEST)
}

/// Douglas-Peucker on an open polyline, iterative over a span stack
fn simplify_open(points: &[PointI], tolerance: f64) -> Vec<PointI> {
    let n = points.len();
    if n <= 2 {
        return points.to_vec();
    }

    let mut keep = vec![false; n];
    keep[0] = true;
    keep[n - 1] = true;

    let mut spans = vec![(0usize, n - 1)];
    while let Some((lo, hi)) = spans.pop() {
        if hi <= lo + 1 {
            continue;
        }
        let (a, b) = (points[lo], points[hi]);
        let mut split = lo;
        let mut max_distance = 0.0f64;
        for (i, p) in points.iter().enumerate().take(hi).skip(lo + 1) {
            let d = p.distance_to_line(&a, &b);
            if d > max_distance {
                max_distance = d;
                split = i;
            }
        }
        if max_distance > tolerance {
            keep[split] = true;
            spans.push((lo, split));
            spans.push((split, hi));
        }
    }

    points
        .iter()
        .zip(&keep)
        .filter_map(|(&p, &k)| k.then_some(p))
        .collect()
}
