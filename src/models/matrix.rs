//! Strided buffer views over shared storage

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::error::{MrzError, Result};
use crate::models::Pixel;

/// Backing storage shared by every view derived from the same allocation
pub type SharedBuffer<T> = Rc<RefCell<Vec<T>>>;

/// Strided 2-D view over a shared numeric buffer
///
/// A view is `(buffer, start, row_stride, width, height)`: element `[x, y]`
/// lives at `start + y * row_stride + x`. Regions re-parameterize the same
/// buffer without copying, so a write through one view is visible through
/// every other view over that buffer. `Clone` produces another view of the
/// same storage; use [`Matrix::deep_copy`] for an independent buffer.
///
/// Views are single-threaded (`!Send`). Process independent images on
/// separate threads by moving owned `Vec`s, see [`crate::batch`].
pub struct Matrix<T> {
    width: usize,
    height: usize,
    start: usize,
    row_stride: usize,
    data: SharedBuffer<T>,
}

impl<T> Clone for Matrix<T> {
    fn clone(&self) -> Self {
        Self {
            width: self.width,
            height: self.height,
            start: self.start,
            row_stride: self.row_stride,
            data: Rc::clone(&self.data),
        }
    }
}

impl<T: Pixel> Matrix<T> {
    /// Create a zero-filled matrix over a fresh buffer
    pub fn new(width: usize, height: usize) -> Self {
        Self::filled(width, height, T::default())
    }

    /// Create a matrix over a fresh buffer with every element set to `value`
    pub fn filled(width: usize, height: usize, value: T) -> Self {
        Self {
            width,
            height,
            start: 0,
            row_stride: width,
            data: Rc::new(RefCell::new(vec![value; width * height])),
        }
    }

    /// Create a matrix by evaluating `f(x, y)` for every element
    pub fn from_fn<F: FnMut(usize, usize) -> T>(width: usize, height: usize, mut f: F) -> Self {
        let mut data = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            start: 0,
            row_stride: width,
            data: Rc::new(RefCell::new(data)),
        }
    }

    /// Take ownership of a row-major buffer of exactly `width * height` elements
    pub fn from_vec(width: usize, height: usize, data: Vec<T>) -> Result<Self> {
        let expected = width
            .checked_mul(height)
            .ok_or_else(|| MrzError::invalid("matrix dimensions overflow"))?;
        if data.len() != expected {
            return Err(MrzError::invalid(format!(
                "buffer holds {} elements, {}x{} needs {}",
                data.len(),
                width,
                height,
                expected
            )));
        }
        Ok(Self {
            width,
            height,
            start: 0,
            row_stride: width,
            data: Rc::new(RefCell::new(data)),
        })
    }

    /// Alias an existing buffer with an explicit offset and stride
    pub fn from_shared(
        data: SharedBuffer<T>,
        start: usize,
        row_stride: usize,
        width: usize,
        height: usize,
    ) -> Result<Self> {
        if height > 1 && row_stride < width {
            return Err(MrzError::invalid(format!(
                "row stride {} is smaller than width {}",
                row_stride, width
            )));
        }
        let needed = min_required_len(width, height, row_stride)
            .and_then(|len| if len == 0 { Some(0) } else { start.checked_add(len) })
            .ok_or_else(|| MrzError::invalid("view geometry overflows"))?;
        let available = data.borrow().len();
        if needed > available {
            return Err(MrzError::invalid(format!(
                "view needs {} elements but the buffer holds {}",
                needed, available
            )));
        }
        Ok(Self {
            width,
            height,
            start,
            row_stride,
            data,
        })
    }

    /// Logical width
    pub fn width(&self) -> usize {
        self.width
    }

    /// Logical height
    pub fn height(&self) -> usize {
        self.height
    }

    /// Offset of element `[0, 0]` in the backing buffer
    pub fn start(&self) -> usize {
        self.start
    }

    /// Elements to advance one row
    pub fn row_stride(&self) -> usize {
        self.row_stride
    }

    /// Number of visible elements
    pub fn len(&self) -> usize {
        self.width * self.height
    }

    /// True when the view has no visible elements
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// True when the rows are packed back to back
    pub fn is_contiguous(&self) -> bool {
        self.row_stride == self.width || self.height <= 1
    }

    /// Handle to the backing buffer
    pub fn buffer(&self) -> SharedBuffer<T> {
        Rc::clone(&self.data)
    }

    /// True when both views alias the same backing buffer
    pub fn shares_buffer(&self, other: &Matrix<T>) -> bool {
        Rc::ptr_eq(&self.data, &other.data)
    }

    pub(crate) fn same_allocation<U>(&self, other: &Matrix<U>) -> bool {
        std::ptr::eq(
            Rc::as_ptr(&self.data) as *const (),
            Rc::as_ptr(&other.data) as *const (),
        )
    }

    #[inline]
    fn offset(&self, x: usize, y: usize) -> usize {
        debug_assert!(
            x < self.width && y < self.height,
            "index ({}, {}) outside {}x{} view",
            x,
            y,
            self.width,
            self.height
        );
        self.start + y * self.row_stride + x
    }

    /// Read element `[x, y]`
    ///
    /// Bounds are asserted in debug builds; use [`Matrix::try_get`] for a
    /// checked read.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> T {
        let idx = self.offset(x, y);
        self.data.borrow()[idx]
    }

    /// Read element `[x, y]`, or `None` outside the view
    pub fn try_get(&self, x: usize, y: usize) -> Option<T> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.get(x, y))
    }

    /// Write element `[x, y]`
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: T) {
        let idx = self.offset(x, y);
        self.data.borrow_mut()[idx] = value;
    }

    /// Zero-copy window into this view
    ///
    /// Fails with [`MrzError::OutOfBounds`] unless the window lies entirely
    /// inside the view.
    pub fn region(&self, x: usize, y: usize, width: usize, height: usize) -> Result<Matrix<T>> {
        let fits_x = x.checked_add(width).is_some_and(|end| end <= self.width);
        let fits_y = y.checked_add(height).is_some_and(|end| end <= self.height);
        if !fits_x || !fits_y {
            return Err(MrzError::OutOfBounds {
                x,
                y,
                width,
                height,
                source_width: self.width,
                source_height: self.height,
            });
        }
        Ok(Matrix {
            width,
            height,
            start: self.start + y * self.row_stride + x,
            row_stride: self.row_stride,
            data: Rc::clone(&self.data),
        })
    }

    /// Visit every row as a slice
    pub fn for_each_row<F: FnMut(usize, &[T])>(&self, mut f: F) {
        let data = self.data.borrow();
        let mut offset = self.start;
        for y in 0..self.height {
            f(y, &data[offset..offset + self.width]);
            offset += self.row_stride;
        }
    }

    /// Visit every row as a mutable slice
    pub fn for_each_row_mut<F: FnMut(usize, &mut [T])>(&mut self, mut f: F) {
        let mut data = self.data.borrow_mut();
        let mut offset = self.start;
        for y in 0..self.height {
            f(y, &mut data[offset..offset + self.width]);
            offset += self.row_stride;
        }
    }

    /// Visit matching rows of `self` (mutable) and `other`
    ///
    /// Both views must have the same extent. If they alias one buffer, `other`
    /// is detached first so the rows can be borrowed independently.
    pub fn zip_rows_mut<U: Pixel, F: FnMut(&mut [T], &[U])>(
        &mut self,
        other: &Matrix<U>,
        mut f: F,
    ) -> Result<()> {
        if self.width != other.width || self.height != other.height {
            return Err(MrzError::invalid(format!(
                "extent mismatch: {}x{} vs {}x{}",
                self.width, self.height, other.width, other.height
            )));
        }
        if self.same_allocation(other) {
            let detached = other.deep_copy();
            return self.zip_rows_mut(&detached, f);
        }

        let src = other.data.borrow();
        let mut dst = self.data.borrow_mut();
        let mut dst_offset = self.start;
        let mut src_offset = other.start;
        for _ in 0..self.height {
            f(
                &mut dst[dst_offset..dst_offset + self.width],
                &src[src_offset..src_offset + self.width],
            );
            dst_offset += self.row_stride;
            src_offset += other.row_stride;
        }
        Ok(())
    }

    /// Element-wise map into a new, contiguous matrix
    pub fn map<U: Pixel, F: FnMut(T) -> U>(&self, mut f: F) -> Matrix<U> {
        let mut out = Vec::with_capacity(self.len());
        self.for_each_row(|_, row| out.extend(row.iter().map(|&v| f(v))));
        Matrix {
            width: self.width,
            height: self.height,
            start: 0,
            row_stride: self.width,
            data: Rc::new(RefCell::new(out)),
        }
    }

    /// Copy the visible elements into a row-major `Vec`
    pub fn to_vec(&self) -> Vec<T> {
        let mut out = Vec::with_capacity(self.len());
        self.for_each_row(|_, row| out.extend_from_slice(row));
        out
    }

    /// Copy the visible elements into a fresh, unshared buffer
    pub fn deep_copy(&self) -> Matrix<T> {
        self.map(|v| v)
    }

    /// Copy into a fresh `f32` matrix
    pub fn to_f32(&self) -> Matrix<f32> {
        self.map(|v| v.to_f64() as f32)
    }
}

impl<T: Pixel> PartialEq for Matrix<T> {
    /// Views are equal when their extents and visible elements match
    fn eq(&self, other: &Self) -> bool {
        if self.width != other.width || self.height != other.height {
            return false;
        }
        if self.shares_buffer(other)
            && self.start == other.start
            && self.row_stride == other.row_stride
        {
            return true;
        }
        self.to_vec() == other.to_vec()
    }
}

impl<T: Pixel> fmt::Debug for Matrix<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Matrix")
            .field("kind", &T::KIND)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("start", &self.start)
            .field("row_stride", &self.row_stride)
            .finish()
    }
}

impl<T: Pixel> Default for Matrix<T> {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

fn min_required_len(width: usize, height: usize, stride: usize) -> Option<usize> {
    if width == 0 || height == 0 {
        return Some(0);
    }
    (height - 1).checked_mul(stride)?.checked_add(width)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_matrix() {
        let m = Matrix::<u8>::new(4, 3);
        assert_eq!(m.width(), 4);
        assert_eq!(m.height(), 3);
        assert_eq!(m.row_stride(), 4);
        assert!(m.to_vec().iter().all(|&v| v == 0));
    }

    #[test]
    fn test_from_vec_rejects_wrong_length() {
        assert!(Matrix::from_vec(3, 3, vec![0u8; 8]).is_err());
        assert!(Matrix::from_vec(3, 3, vec![0u8; 9]).is_ok());
    }

    #[test]
    fn test_region_aliases_parent() {
        let mut parent = Matrix::<i32>::new(6, 5);
        let mut region = parent.region(2, 1, 3, 3).unwrap();
        assert_eq!(region.row_stride(), 6);
        assert!(region.shares_buffer(&parent));

        region.set(1, 2, 42);
        assert_eq!(parent.get(3, 3), 42);

        parent.set(4, 1, -7);
        assert_eq!(region.get(2, 0), -7);
    }

    #[test]
    fn test_region_out_of_bounds() {
        let m = Matrix::<u8>::new(4, 4);
        let err = m.region(2, 2, 3, 1).unwrap_err();
        assert!(matches!(err, MrzError::OutOfBounds { x: 2, width: 3, .. }));
        assert!(m.region(0, 0, 4, 4).is_ok());
        assert!(m.region(4, 4, 0, 0).is_ok());
        assert!(m.region(usize::MAX, 0, 2, 1).is_err());
    }

    #[test]
    fn test_nested_region() {
        let m = Matrix::from_fn(8, 8, |x, y| (y * 8 + x) as u8);
        let outer = m.region(1, 1, 6, 6).unwrap();
        let inner = outer.region(2, 3, 2, 2).unwrap();
        assert_eq!(inner.get(0, 0), (4 * 8 + 3) as u8);
        assert_eq!(inner.to_vec(), vec![35, 36, 43, 44]);
    }

    #[test]
    fn test_from_shared_validates_geometry() {
        let buffer = Rc::new(RefCell::new(vec![0f32; 20]));
        assert!(Matrix::from_shared(Rc::clone(&buffer), 3, 5, 3, 4).is_err());
        let view = Matrix::from_shared(Rc::clone(&buffer), 1, 5, 3, 4).unwrap();
        assert_eq!(view.len(), 12);
        assert!(Matrix::from_shared(buffer, 0, 2, 3, 2).is_err());
    }

    #[test]
    fn test_try_get() {
        let m = Matrix::filled(2, 2, 9u8);
        assert_eq!(m.try_get(1, 1), Some(9));
        assert_eq!(m.try_get(2, 0), None);
    }

    #[test]
    fn test_deep_copy_detaches() {
        let m = Matrix::filled(3, 3, 1u8);
        let mut copy = m.deep_copy();
        copy.set(0, 0, 5);
        assert_eq!(m.get(0, 0), 1);
        assert!(!copy.shares_buffer(&m));
    }

    #[test]
    fn test_zip_rows_mut_with_aliased_source() {
        let m = Matrix::from_fn(4, 1, |x, _| x as f32);
        let mut left = m.region(0, 0, 2, 1).unwrap();
        let right = m.region(2, 0, 2, 1).unwrap();
        left.zip_rows_mut(&right, |dst, src| {
            for (d, s) in dst.iter_mut().zip(src) {
                *d += *s;
            }
        })
        .unwrap();
        assert_eq!(m.to_vec(), vec![2.0, 4.0, 2.0, 3.0]);
    }

    #[test]
    fn test_equality_compares_visible_elements() {
        let a = Matrix::from_fn(5, 5, |x, y| (x + y) as u8);
        let b = a.region(1, 1, 2, 2).unwrap();
        let c = Matrix::from_vec(2, 2, vec![2u8, 3, 3, 4]).unwrap();
        assert_eq!(b, c);
        assert_ne!(a, c);
    }
}
