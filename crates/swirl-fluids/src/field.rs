use std::ops::{Add, Index, IndexMut, Mul, Neg, Sub};

use glam::{UVec2, Vec2, Vec3};
use ndarray::{parallel::prelude::*, s, Array2, ArrayView2, ArrayViewMut2, Zip};

use crate::error::GridError;

/// A value that can be stored in a [`Field`] and blended linearly.
pub trait Sample:
    Copy
    + Default
    + Send
    + Sync
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<f32, Output = Self>
    + Neg<Output = Self>
{
    fn is_finite(self) -> bool;

    /// Replaces subnormal components with zero.
    fn flush_subnormal(self) -> Self;
}

impl Sample for f32 {
    #[inline]
    fn is_finite(self) -> bool {
        f32::is_finite(self)
    }

    #[inline]
    fn flush_subnormal(self) -> Self {
        if self.is_subnormal() {
            0.0
        } else {
            self
        }
    }
}

impl Sample for Vec3 {
    #[inline]
    fn is_finite(self) -> bool {
        Vec3::is_finite(self)
    }

    #[inline]
    fn flush_subnormal(self) -> Self {
        Vec3::new(
            self.x.flush_subnormal(),
            self.y.flush_subnormal(),
            self.z.flush_subnormal(),
        )
    }
}

/// A 2D grid of samples surrounded by a one cell halo.
///
/// Interior cells are addressed `1..=width` × `1..=height`. The halo cells at index `0` and
/// `width + 1` (resp. `height + 1`) encode boundary conditions and are rewritten by
/// [`enforce`](crate::boundary::enforce) after every mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct Field<T> {
    /// Number of interior cells in the X direction.
    width: usize,
    /// Number of interior cells in the Y direction.
    height: usize,
    /// Samples including the halo, shape `(width + 2, height + 2)`.
    data: Array2<T>,
}

impl<T: Sample> Field<T> {
    /// Allocates a zeroed field, reporting allocation failure instead of aborting.
    pub fn new(width: usize, height: usize) -> Result<Self, GridError> {
        if width == 0 || height == 0 {
            return Err(GridError::ZeroSize { width, height });
        }

        let overflow = GridError::Overflow { width, height };
        let (w, h) = width.checked_add(2).zip(height.checked_add(2)).ok_or(overflow.clone())?;
        let cells = w.checked_mul(h).ok_or(overflow.clone())?;

        let mut samples = Vec::new();
        samples
            .try_reserve_exact(cells)
            .map_err(|_| GridError::Allocation { cells })?;
        samples.resize(cells, T::default());

        let data = Array2::from_shape_vec((w, h), samples).map_err(|_| overflow)?;

        Ok(Self { width, height, data })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn size(&self) -> UVec2 {
        UVec2::new(self.width as u32, self.height as u32)
    }

    /// All samples, halo included.
    #[inline]
    pub fn data(&self) -> &Array2<T> {
        &self.data
    }

    #[inline]
    pub fn data_mut(&mut self) -> &mut Array2<T> {
        &mut self.data
    }

    #[inline]
    pub fn interior(&self) -> ArrayView2<'_, T> {
        self.data.slice(s![1..-1, 1..-1])
    }

    #[inline]
    pub fn interior_mut(&mut self) -> ArrayViewMut2<'_, T> {
        self.data.slice_mut(s![1..-1, 1..-1])
    }

    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }

    /// Multiplies every sample, halo included, by `factor`.
    pub fn scale(&mut self, factor: f32) {
        self.data.par_mapv_inplace(|x| x * factor);
    }

    /// Normalized position of the center of cell `(i, j)`.
    #[inline]
    pub fn uv(&self, i: usize, j: usize) -> Vec2 {
        Vec2::new(
            (i as f32 - 0.5) / self.width as f32,
            (j as f32 - 0.5) / self.height as f32,
        )
    }

    /// Bilinearly samples the field at grid coordinates, where the center of cell `i` lies at
    /// `x = i`. Coordinates are clamped to `[0.5, width + 0.5] × [0.5, height + 0.5]`.
    pub fn sample(&self, x: f32, y: f32) -> T {
        let x = x.clamp(0.5, self.width as f32 + 0.5);
        let y = y.clamp(0.5, self.height as f32 + 0.5);

        let i0 = x.floor() as usize;
        let j0 = y.floor() as usize;
        let i1 = (i0 + 1).min(self.width + 1);
        let j1 = (j0 + 1).min(self.height + 1);

        let s1 = x - i0 as f32;
        let s0 = 1.0 - s1;
        let t1 = y - j0 as f32;
        let t0 = 1.0 - t1;

        (self.data[(i0, j0)] * t0 + self.data[(i0, j1)] * t1) * s0
            + (self.data[(i1, j0)] * t0 + self.data[(i1, j1)] * t1) * s1
    }

    /// Bilinearly samples the field at a normalized position in `[0, 1]²`.
    #[inline]
    pub fn sample_uv(&self, uv: Vec2) -> T {
        self.sample(
            uv.x * self.width as f32 + 0.5,
            uv.y * self.height as f32 + 0.5,
        )
    }

    /// Sum over the interior cells.
    pub fn sum(&self) -> T {
        self.interior().iter().fold(T::default(), |acc, &x| acc + x)
    }

    pub fn is_finite(&self) -> bool {
        self.data.par_iter().all(|&x| x.is_finite())
    }

    /// Resamples the interior into a new field of the given size. The halo of the result is left
    /// at zero; callers enforce the appropriate boundary.
    pub fn resampled(&self, width: usize, height: usize) -> Result<Self, GridError> {
        let mut out = Self::new(width, height)?;
        let inv_size = Vec2::new(width as f32, height as f32).recip();

        Zip::indexed(out.interior_mut()).par_for_each(|(i, j), x| {
            let uv = (Vec2::new(i as f32, j as f32) + 0.5) * inv_size;
            *x = self.sample_uv(uv);
        });

        Ok(out)
    }
}

impl Field<f32> {
    /// Largest absolute value over the interior cells.
    pub fn max_abs(&self) -> f32 {
        self.interior().iter().fold(0.0, |m, x| m.max(x.abs()))
    }
}

impl Field<Vec3> {
    /// Largest channel value over the interior cells.
    pub fn max_channel(&self) -> f32 {
        self.interior().iter().fold(0.0, |m, c| m.max(c.max_element()))
    }
}

impl<T> Index<(usize, usize)> for Field<T> {
    type Output = T;

    #[inline]
    fn index(&self, index: (usize, usize)) -> &T {
        &self.data[index]
    }
}

impl<T> IndexMut<(usize, usize)> for Field<T> {
    #[inline]
    fn index_mut(&mut self, index: (usize, usize)) -> &mut T {
        &mut self.data[index]
    }
}
