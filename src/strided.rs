/*
 * // Copyright (c) Radzivon Bartoshyk 10/2025. All rights reserved.
 * //
 * // Redistribution and use in source and binary forms, with or without modification,
 * // are permitted provided that the following conditions are met:
 * //
 * // 1.  Redistributions of source code must retain the above copyright notice, this
 * // list of conditions and the following disclaimer.
 * //
 * // 2.  Redistributions in binary form must reproduce the above copyright notice,
 * // this list of conditions and the following disclaimer in the documentation
 * // and/or other materials provided with the distribution.
 * //
 * // 3.  Neither the name of the copyright holder nor the names of its
 * // contributors may be used to endorse or promote products derived from
 * // this software without specific prior written permission.
 * //
 * // THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS "AS IS"
 * // AND ANY EXPRESS OR IMPLIED WARRANTIES, INCLUDING, BUT NOT LIMITED TO, THE
 * // IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR A PARTICULAR PURPOSE ARE
 * // DISCLAIMED. IN NO EVENT SHALL THE COPYRIGHT HOLDER OR CONTRIBUTORS BE LIABLE
 * // FOR ANY DIRECT, INDIRECT, INCIDENTAL, SPECIAL, EXEMPLARY, OR CONSEQUENTIAL
 * // DAMAGES (INCLUDING, BUT NOT LIMITED TO, PROCUREMENT OF SUBSTITUTE GOODS OR
 * // SERVICES; LOSS OF USE, DATA, OR PROFITS; OR BUSINESS INTERRUPTION) HOWEVER
 * // CAUSED AND ON ANY THEORY OF LIABILITY, WHETHER IN CONTRACT, STRICT LIABILITY,
 * // OR TORT (INCLUDING NEGLIGENCE OR OTHERWISE) ARISING IN ANY WAY OUT OF THE USE
 * // OF THIS SOFTWARE, EVEN IF ADVISED OF THE POSSIBILITY OF SUCH DAMAGE.
 */
use crate::err::LiftletError;
use std::marker::PhantomData;

/// Byte distances between neighbouring samples of a 2-D layout.
///
/// `stride_x` moves from one row to the next, `stride_y` from one column to the
/// next, so the sample at `(y, x)` lives at `base + y * stride_x + x * stride_y`.
/// Negative strides are allowed and describe flipped layouts.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Strides {
    pub stride_x: isize,
    pub stride_y: isize,
}

impl Strides {
    pub fn new(stride_x: isize, stride_y: isize) -> Strides {
        Strides { stride_x, stride_y }
    }

    /// Row-major layout without padding.
    pub fn packed<T>(width: usize) -> Strides {
        let size = size_of::<T>() as isize;
        Strides {
            stride_x: width as isize * size,
            stride_y: size,
        }
    }

    /// Row-major layout with a padded row pitch.
    ///
    /// The pitch is rounded up to 16 bytes, and bumped by another 16 bytes
    /// when it lands on a multiple of 512 so consecutive rows do not map onto
    /// the same cache sets.
    pub fn cache_optimized<T>(width: usize) -> Strides {
        const ALIGN: usize = 16;
        let size = size_of::<T>();
        let mut pitch = (width * size).div_ceil(ALIGN) * ALIGN;
        if pitch % 512 == 0 {
            pitch += ALIGN;
        }
        Strides {
            stride_x: pitch as isize,
            stride_y: size as isize,
        }
    }

    /// Number of `T` elements a row occupies, padding included.
    pub fn row_elements<T>(&self) -> Result<usize, LiftletError> {
        Ok(element_stride::<T>(self.stride_x)?.unsigned_abs())
    }
}

pub(crate) fn element_stride<T>(bytes: isize) -> Result<isize, LiftletError> {
    let size = size_of::<T>();
    if bytes == 0 {
        return Err(LiftletError::ZeroStride);
    }
    if bytes % size as isize != 0 {
        return Err(LiftletError::StrideNotAligned(bytes, size));
    }
    Ok(bytes / size as isize)
}

/// One line of samples inside a validated view.
///
/// Lines of one view never share samples, so distinct lines may be handed to
/// different threads.
#[derive(Debug)]
pub(crate) struct StridedLine<T> {
    ptr: *mut T,
    stride: isize,
    len: usize,
}

impl<T> Clone for StridedLine<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for StridedLine<T> {}

unsafe impl<T: Send> Send for StridedLine<T> {}
unsafe impl<T: Send> Sync for StridedLine<T> {}

impl<T: Copy> StridedLine<T> {
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// # Safety
    ///
    /// `i` must be less than `len()` and no other thread may write the sample.
    #[inline(always)]
    pub(crate) unsafe fn read(&self, i: usize) -> T {
        debug_assert!(i < self.len);
        unsafe { *self.ptr.offset(i as isize * self.stride) }
    }

    /// # Safety
    ///
    /// `i` must be less than `len()` and the line must not be accessed from
    /// another thread concurrently.
    #[inline(always)]
    pub(crate) unsafe fn write(&self, i: usize, value: T) {
        debug_assert!(i < self.len);
        unsafe {
            *self.ptr.offset(i as isize * self.stride) = value;
        }
    }

    /// Whether samples are adjacent in memory in increasing order.
    #[inline]
    pub(crate) fn is_contiguous(&self) -> bool {
        self.stride == 1
    }

    /// # Safety
    ///
    /// The line must be contiguous and `start + count <= len()`.
    #[inline(always)]
    pub(crate) unsafe fn slice_mut(&self, start: usize, count: usize) -> &mut [T] {
        debug_assert!(self.stride == 1 && start + count <= self.len);
        unsafe { std::slice::from_raw_parts_mut(self.ptr.add(start), count) }
    }
}

/// Mutable 2-D view over a buffer with arbitrary row and column strides.
pub struct StridedImage<'a, T> {
    base: *mut T,
    row_stride: isize,
    col_stride: isize,
    width: usize,
    height: usize,
    strides: Strides,
    _marker: PhantomData<&'a mut [T]>,
}

unsafe impl<T: Send> Send for StridedImage<'_, T> {}
unsafe impl<T: Sync> Sync for StridedImage<'_, T> {}

impl<'a, T: Copy> StridedImage<'a, T> {
    /// Creates a view of `width x height` samples whose top-left sample is
    /// `data[offset]`.
    ///
    /// Every addressed sample must be inside `data` and no two coordinates may
    /// map onto the same sample.
    pub fn new(
        data: &'a mut [T],
        offset: usize,
        strides: Strides,
        width: usize,
        height: usize,
    ) -> Result<Self, LiftletError> {
        if width == 0 || height == 0 {
            return Err(LiftletError::EmptyExtent(width, height));
        }
        let row = element_stride::<T>(strides.stride_x)?;
        let col = element_stride::<T>(strides.stride_y)?;

        if width > 1 && height > 1 {
            let rows_apart = row.unsigned_abs() >= col.unsigned_abs().saturating_mul(width);
            let cols_apart = col.unsigned_abs() >= row.unsigned_abs().saturating_mul(height);
            if !rows_apart && !cols_apart {
                return Err(LiftletError::OverlappingStrides(
                    strides.stride_x,
                    strides.stride_y,
                ));
            }
        }

        let last_y = (height - 1) as isize;
        let last_x = (width - 1) as isize;
        for (y, x) in [(0, 0), (0, last_x), (last_y, 0), (last_y, last_x)] {
            let index = y
                .checked_mul(row)
                .zip(x.checked_mul(col))
                .and_then(|(dy, dx)| dy.checked_add(dx))
                .and_then(|d| d.checked_add(offset as isize))
                .ok_or(LiftletError::OutOfBounds(isize::MAX, data.len()))?;
            if index < 0 || index as usize >= data.len() {
                return Err(LiftletError::OutOfBounds(index, data.len()));
            }
        }

        Ok(StridedImage {
            base: unsafe { data.as_mut_ptr().add(offset) },
            row_stride: row,
            col_stride: col,
            width,
            height,
            strides,
            _marker: PhantomData,
        })
    }

    /// View over a packed row-major image.
    pub fn packed(data: &'a mut [T], width: usize, height: usize) -> Result<Self, LiftletError> {
        Self::new(data, 0, Strides::packed::<T>(width), width, height)
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
    pub fn strides(&self) -> Strides {
        self.strides
    }

    #[inline(always)]
    fn element_offset(&self, y: usize, x: usize) -> isize {
        y as isize * self.row_stride + x as isize * self.col_stride
    }

    /// Sample at row `y`, column `x`.
    pub fn get(&self, y: usize, x: usize) -> T {
        assert!(
            y < self.height && x < self.width,
            "Coordinates ({y}, {x}) are out of view {}x{}",
            self.width,
            self.height
        );
        unsafe { *self.base.offset(self.element_offset(y, x)) }
    }

    pub fn set(&mut self, y: usize, x: usize, value: T) {
        assert!(
            y < self.height && x < self.width,
            "Coordinates ({y}, {x}) are out of view {}x{}",
            self.width,
            self.height
        );
        unsafe {
            *self.base.offset(self.element_offset(y, x)) = value;
        }
    }

    /// Copies the view into a packed row-major vector.
    pub fn to_vec(&self) -> Vec<T> {
        let mut dst = Vec::with_capacity(self.width * self.height);
        for y in 0..self.height {
            for x in 0..self.width {
                dst.push(self.get(y, x));
            }
        }
        dst
    }

    /// Row `y` limited to the first `len` columns.
    #[inline]
    pub(crate) fn row_line(&mut self, y: usize, len: usize) -> StridedLine<T> {
        assert!(y < self.height && len <= self.width);
        StridedLine {
            ptr: unsafe { self.base.offset(self.element_offset(y, 0)) },
            stride: self.col_stride,
            len,
        }
    }

    /// Column `x` limited to the first `len` rows.
    #[inline]
    pub(crate) fn column_line(&mut self, x: usize, len: usize) -> StridedLine<T> {
        assert!(x < self.width && len <= self.height);
        StridedLine {
            ptr: unsafe { self.base.offset(self.element_offset(0, x)) },
            stride: self.row_stride,
            len,
        }
    }
}

/// Mutable 1-D view over a buffer with an arbitrary stride.
pub struct StridedSignal<'a, T> {
    line: StridedLine<T>,
    _marker: PhantomData<&'a mut [T]>,
}

impl<'a, T: Copy> StridedSignal<'a, T> {
    /// `len` samples starting at `data[offset]`, `stride` bytes apart.
    pub fn new(
        data: &'a mut [T],
        offset: usize,
        stride: isize,
        len: usize,
    ) -> Result<Self, LiftletError> {
        if len == 0 {
            return Err(LiftletError::EmptyExtent(len, 1));
        }
        let step = element_stride::<T>(stride)?;
        let last = (len as isize - 1)
            .checked_mul(step)
            .and_then(|v| v.checked_add(offset as isize))
            .ok_or(LiftletError::OutOfBounds(isize::MAX, data.len()))?;
        for index in [offset as isize, last] {
            if index < 0 || index as usize >= data.len() {
                return Err(LiftletError::OutOfBounds(index, data.len()));
            }
        }
        Ok(StridedSignal {
            line: StridedLine {
                ptr: unsafe { data.as_mut_ptr().add(offset) },
                stride: step,
                len,
            },
            _marker: PhantomData,
        })
    }

    /// Whole slice as a unit stride signal.
    pub fn contiguous(data: &'a mut [T]) -> Result<Self, LiftletError> {
        let len = data.len();
        Self::new(data, 0, size_of::<T>() as isize, len)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.line.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.line.len == 0
    }

    pub fn get(&self, i: usize) -> T {
        assert!(i < self.line.len, "Index {i} is out of signal length {}", self.line.len);
        unsafe { self.line.read(i) }
    }

    pub fn to_vec(&self) -> Vec<T> {
        (0..self.len()).map(|i| self.get(i)).collect()
    }

    #[inline]
    pub(crate) fn line(&mut self) -> StridedLine<T> {
        self.line
    }
}
