//! Connected-component labelling of binary images
//! Two-pass union-find labelling; every surviving component gets compact
//! statistics and a traced boundary contour

use tracing::debug;

use crate::detector::contour::Contour;
use crate::error::{MrzError, Result};
use crate::models::{BoundingBox, Matrix, Pixel, PointI};

/// Pixel adjacency used when growing components
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Connectivity {
    /// Edge neighbours only
    Four,
    /// Edge and corner neighbours
    #[default]
    Eight,
}

/// Union-Find data structure over provisional labels
pub struct UnionFind {
    parent: Vec<u32>,
}

impl UnionFind {
    /// Capacity hint for `n` provisional labels
    pub fn new(n: usize) -> Self {
        Self {
            parent: (0..n as u32).collect(),
        }
    }

    /// Allocate a fresh singleton set and return its id
    pub fn make_set(&mut self) -> u32 {
        let id = self.parent.len() as u32;
        self.parent.push(id);
        id
    }

    /// Root of the set containing `x`
    pub fn find(&mut self, mut x: u32) -> u32 {
        while self.parent[x as usize] != x {
            let grandparent = self.parent[self.parent[x as usize] as usize];
            self.parent[x as usize] = grandparent;
            x = grandparent;
        }
        x
    }

    /// Merge two sets; the smaller root wins so labels stay in raster order
    pub fn union(&mut self, x: u32, y: u32) {
        let root_x = self.find(x);
        let root_y = self.find(y);
        if root_x < root_y {
            self.parent[root_y as usize] = root_x;
        } else if root_y < root_x {
            self.parent[root_x as usize] = root_y;
        }
    }
}

/// Statistics for one labelled component
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectInfo {
    /// Label value in the map's label buffer (never 0)
    pub label: i32,
    /// Number of pixels carrying the label
    pub pixel_count: usize,
    /// Bounding box left edge
    pub x: usize,
    /// Bounding box top edge
    pub y: usize,
    /// Bounding box width
    pub width: usize,
    /// Bounding box height
    pub height: usize,
    /// Outer boundary, clockwise from the first pixel in raster order
    pub contour: Contour,
}

impl ObjectInfo {
    /// Bounding box in label-map coordinates
    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::new(self.x, self.y, self.width, self.height)
    }

    /// `width / height`
    pub fn aspect_ratio(&self) -> f64 {
        self.bounding_box().aspect_ratio()
    }
}

/// Label buffer plus per-object records, built once from a binary image
#[derive(Debug, Clone)]
pub struct ObjectMap {
    labels: Matrix<i32>,
    objects: Vec<ObjectInfo>,
}

impl ObjectMap {
    /// Label every non-zero pixel of `binary`
    ///
    /// Labels are `1..=n` in raster order of each component's first pixel;
    /// background is 0.
    pub fn build<T: Pixel>(binary: &Matrix<T>, connectivity: Connectivity) -> ObjectMap {
        let (width, height) = (binary.width(), binary.height());
        let zero = T::default();
        let fg: Vec<bool> = binary.to_vec().into_iter().map(|v| v != zero).collect();
        let mut provisional = vec![0u32; width * height];
        // Set 0 is the background
        let mut uf = UnionFind::new(1);

        // First pass: provisional labels and equivalences
        for y in 0..height {
            for x in 0..width {
                let idx = y * width + x;
                if !fg[idx] {
                    continue;
                }

                let mut neighbours = [0u32; 4];
                let mut count = 0;
                let mut push = |label: u32| {
                    if label != 0 {
                        neighbours[count] = label;
                        count += 1;
                    }
                };

                if x > 0 {
                    push(provisional[idx - 1]);
                }
                if y > 0 {
                    push(provisional[idx - width]);
                    if connectivity == Connectivity::Eight {
                        if x > 0 {
                            push(provisional[idx - width - 1]);
                        }
                        if x + 1 < width {
                            push(provisional[idx - width + 1]);
                        }
                    }
                }

                let found = &neighbours[..count];
                match found.iter().min() {
                    None => provisional[idx] = uf.make_set(),
                    Some(&min_label) => {
                        provisional[idx] = min_label;
                        for &l in found {
                            uf.union(min_label, l);
                        }
                    }
                }
            }
        }

        // Second pass: resolve roots to compact labels and accumulate stats
        let mut compact = vec![0i32; uf.parent.len()];
        let mut accumulators: Vec<Accumulator> = Vec::new();
        let mut labels = Vec::with_capacity(width * height);

        for y in 0..height {
            for x in 0..width {
                let provisional_label = provisional[y * width + x];
                if provisional_label == 0 {
                    labels.push(0);
                    continue;
                }
                let root = uf.find(provisional_label) as usize;
                if compact[root] == 0 {
                    accumulators.push(Accumulator::new(x, y));
                    compact[root] = accumulators.len() as i32;
                }
                let label = compact[root];
                accumulators[label as usize - 1].add(x, y);
                labels.push(label);
            }
        }

        let labels = Matrix::from_fn(width, height, |x, y| labels[y * width + x]);
        let objects: Vec<ObjectInfo> = accumulators
            .iter()
            .enumerate()
            .map(|(i, acc)| {
                let label = i as i32 + 1;
                let start = PointI::new(acc.first.0 as i32, acc.first.1 as i32);
                ObjectInfo {
                    label,
                    pixel_count: acc.count,
                    x: acc.min_x,
                    y: acc.min_y,
                    width: acc.max_x - acc.min_x + 1,
                    height: acc.max_y - acc.min_y + 1,
                    contour: Contour::trace(&labels, label, start),
                }
            })
            .collect();

        debug!(width, height, objects = objects.len(), ?connectivity, "object map built");
        ObjectMap { labels, objects }
    }

    /// Per-pixel labels, 0 for background
    pub fn labels(&self) -> &Matrix<i32> {
        &self.labels
    }

    /// Objects in label order
    pub fn objects(&self) -> &[ObjectInfo] {
        &self.objects
    }

    /// Number of objects
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// True when the binary image had no set pixels
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Look up an object by label
    pub fn object(&self, label: i32) -> Option<&ObjectInfo> {
        if label < 1 {
            return None;
        }
        self.objects.get(label as usize - 1)
    }

    /// Objects ordered by descending pixel count (ties by label)
    pub fn sorted_by_size(&self) -> Vec<&ObjectInfo> {
        let mut sorted: Vec<&ObjectInfo> = self.objects.iter().collect();
        sorted.sort_by(|a, b| b.pixel_count.cmp(&a.pixel_count).then(a.label.cmp(&b.label)));
        sorted
    }

    /// The bounding-box window of `label` inside `source`
    pub fn extract<T: Pixel>(&self, label: i32, source: &Matrix<T>) -> Result<Matrix<T>> {
        self.extract_with_offset(label, source, 0, 0)
    }

    /// Like [`ObjectMap::extract`] for a source whose origin sits
    /// `(dx, dy)` pixels before this map's origin
    pub fn extract_with_offset<T: Pixel>(
        &self,
        label: i32,
        source: &Matrix<T>,
        dx: usize,
        dy: usize,
    ) -> Result<Matrix<T>> {
        let object = self
            .object(label)
            .ok_or_else(|| MrzError::invalid(format!("unknown object label {}", label)))?;
        source.region(object.x + dx, object.y + dy, object.width, object.height)
    }
}

struct Accumulator {
    first: (usize, usize),
    count: usize,
    min_x: usize,
    min_y: usize,
    max_x: usize,
    max_y: usize,
}

impl Accumulator {
    fn new(x: usize, y: usize) -> Self {
        Self {
            first: (x, y),
            count: 0,
            min_x: x,
            min_y: y,
            max_x: x,
            max_y: y,
        }
    }

    fn add(&mut self, x: usize, y: usize) {
        self.count += 1;
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
    }
}
