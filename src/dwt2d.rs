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
use crate::coefficients::WaveletFamily;
use crate::dispatch::{Acceleration, LanePass, LiftConfig, LinePass};
use crate::err::{LiftletError, try_vec};
use crate::log::{ldebug, ltrace};
use crate::pipeline::CoreVariant;
use crate::sample::LiftingSample;
use crate::strided::{StridedImage, StridedLine};
use crate::tile;
use crate::util::{ceil_div_pow2, ceil_log2, floor_div_pow2};
use rayon::prelude::*;

/// Width and height of a rectangle, in samples.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct Extent {
    pub width: usize,
    pub height: usize,
}

impl Extent {
    pub fn new(width: usize, height: usize) -> Extent {
        Extent { width, height }
    }

    /// Extent after `j` halvings, rounding up.
    pub fn ceil_level(self, j: usize) -> Extent {
        Extent::new(ceil_div_pow2(self.width, j), ceil_div_pow2(self.height, j))
    }

    /// Extent after `j` halvings, rounding down.
    pub fn floor_level(self, j: usize) -> Extent {
        Extent::new(floor_div_pow2(self.width, j), floor_div_pow2(self.height, j))
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Requested number of decomposition levels.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum Levels {
    /// As many levels as the extents allow.
    #[default]
    Full,
    /// At most this many levels; larger requests are clamped.
    Count(usize),
}

/// Multi-level 2-D decomposition parameters.
///
/// The outer extent is the allocated rectangle whose halvings position the
/// bands, the active extent is the part holding signal. Each level writes the
/// low band at the origin and the high band at half the outer extent.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Decomposition {
    pub outer: Extent,
    pub active: Extent,
    pub levels: Levels,
    /// Keep decomposing while the larger active side can be halved instead of
    /// stopping at the smaller one.
    pub decompose_one: bool,
    /// Zero the gap between active and outer extents of every band.
    pub zero_padding: bool,
}

impl Decomposition {
    /// Full decomposition of a fully active `extent`.
    pub fn new(extent: Extent) -> Decomposition {
        Decomposition {
            outer: extent,
            active: extent,
            levels: Levels::Full,
            decompose_one: false,
            zero_padding: false,
        }
    }

    pub fn with_active(mut self, active: Extent) -> Self {
        self.active = active;
        self
    }

    pub fn with_levels(mut self, levels: Levels) -> Self {
        self.levels = levels;
        self
    }

    pub fn with_decompose_one(mut self, decompose_one: bool) -> Self {
        self.decompose_one = decompose_one;
        self
    }

    pub fn with_zero_padding(mut self, zero_padding: bool) -> Self {
        self.zero_padding = zero_padding;
        self
    }

    /// Largest number of levels the active extent allows.
    pub fn level_limit(&self) -> usize {
        let side = if self.decompose_one {
            self.active.width.max(self.active.height)
        } else {
            self.active.width.min(self.active.height)
        };
        ceil_log2(side)
    }

    /// Number of levels a transform with these parameters performs.
    pub fn resolved_levels(&self) -> usize {
        let limit = self.level_limit();
        match self.levels {
            Levels::Full => limit,
            Levels::Count(count) => count.min(limit),
        }
    }

    pub(crate) fn validate<T: Copy>(&self, image: &StridedImage<'_, T>) -> Result<(), LiftletError> {
        if self.active.is_empty() {
            return Err(LiftletError::EmptyExtent(self.active.width, self.active.height));
        }
        if self.active.width > self.outer.width || self.active.height > self.outer.height {
            return Err(LiftletError::ActiveExceedsOuter(
                self.active.width,
                self.active.height,
                self.outer.width,
                self.outer.height,
            ));
        }
        if self.outer.width > image.width() || self.outer.height > image.height() {
            return Err(LiftletError::OuterExceedsView(
                self.outer.width,
                self.outer.height,
                image.width(),
                image.height(),
            ));
        }
        Ok(())
    }
}

/// Extents involved in decomposing level `j` into level `j + 1`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) struct LevelGeometry {
    pub(crate) src_outer: Extent,
    pub(crate) dst_outer: Extent,
    pub(crate) src_active: Extent,
}

impl LevelGeometry {
    pub(crate) fn new(d: &Decomposition, j: usize) -> LevelGeometry {
        LevelGeometry {
            src_outer: d.outer.ceil_level(j),
            dst_outer: d.outer.ceil_level(j + 1),
            src_active: d.active.ceil_level(j),
        }
    }
}

/// Position of interleaved sample `i` in the split layout.
#[inline(always)]
pub(crate) fn split_index(i: usize, h_offset: usize) -> usize {
    if i % 2 == 0 { i / 2 } else { h_offset + i / 2 }
}

/// Indices of the low band followed by the high band of a split line.
pub(crate) fn band_indices(n: usize, h_offset: usize) -> impl Iterator<Item = usize> {
    (0..n.div_ceil(2)).chain(h_offset..h_offset + n / 2)
}

fn reach(n: usize, h_offset: Option<usize>) -> usize {
    h_offset.map_or(n, |h| n.max(h + n / 2))
}

/// Copies `n` samples into `dst`, from the split layout when `h_offset` is set.
pub(crate) fn read_line<T: Copy>(
    line: &StridedLine<T>,
    n: usize,
    h_offset: Option<usize>,
    dst: &mut [T],
) {
    assert!(line.len() >= reach(n, h_offset) && dst.len() >= n);
    for (i, v) in dst.iter_mut().enumerate().take(n) {
        let src = h_offset.map_or(i, |h| split_index(i, h));
        // Safety: bounds checked above, lines of one pass are disjoint.
        *v = unsafe { line.read(src) };
    }
}

/// Copies `n` samples back, into the split layout when `h_offset` is set.
pub(crate) fn write_line<T: Copy>(
    line: &StridedLine<T>,
    n: usize,
    h_offset: Option<usize>,
    src: &[T],
) {
    assert!(line.len() >= reach(n, h_offset) && src.len() >= n);
    for (i, &v) in src.iter().enumerate().take(n) {
        let dst = h_offset.map_or(i, |h| split_index(i, h));
        unsafe { line.write(dst, v) };
    }
}

/// What happens to every line of a pass.
#[derive(Copy, Clone)]
pub(crate) enum LineOp<'a, T> {
    Forward(&'a dyn LinePass<T>, WaveletFamily),
    Inverse(&'a dyn LinePass<T>, WaveletFamily),
    /// Moves interleaved samples into the split layout.
    Split,
    /// Moves split samples back into the interleaved layout.
    Interleave,
}

impl<'a, T> LineOp<'a, T> {
    fn lanes(&self) -> usize {
        match self {
            LineOp::Forward(pass, _) | LineOp::Inverse(pass, _) => pass.lanes(),
            LineOp::Split | LineOp::Interleave => 1,
        }
    }

    fn reads_split(&self) -> bool {
        matches!(self, LineOp::Inverse(..) | LineOp::Interleave)
    }

    fn writes_split(&self) -> bool {
        matches!(self, LineOp::Forward(..) | LineOp::Split)
    }

    fn with_pass(self, pass: &'a dyn LinePass<T>) -> Self {
        match self {
            LineOp::Forward(_, family) => LineOp::Forward(pass, family),
            LineOp::Inverse(_, family) => LineOp::Inverse(pass, family),
            op => op,
        }
    }

    fn apply(&self, buf: &mut [T], n: usize) {
        match self {
            LineOp::Forward(pass, family) => pass.forward(*family, buf, n),
            LineOp::Inverse(pass, family) => pass.inverse(*family, buf, n),
            LineOp::Split | LineOp::Interleave => {}
        }
    }
}

/// Runs `f` for every index in `0..count`, over the configured pool when
/// there is one. Each worker owns one scratch buffer of `scratch_len`.
pub(crate) fn for_each_line<T, F>(
    config: &LiftConfig,
    count: usize,
    scratch_len: usize,
    f: F,
) -> Result<(), LiftletError>
where
    T: Copy + Default + Send,
    F: Fn(usize, &mut [T]) + Send + Sync,
{
    // Workers clone the checked scratch.
    let mut scratch = try_vec![T::default(); scratch_len];
    match config.pool() {
        Some(pool) if count > 1 => pool.install(|| {
            (0..count)
                .into_par_iter()
                .for_each_with(scratch, |scratch, i| f(i, scratch));
        }),
        _ => {
            for i in 0..count {
                f(i, &mut scratch);
            }
        }
    }
    Ok(())
}

/// Loads `lines` into `scratch` with lanes interleaved, applies `op`, and
/// writes the result back.
fn transform_group<T: Copy>(
    lines: &[StridedLine<T>],
    n: usize,
    h_offset: usize,
    op: &LineOp<'_, T>,
    scratch: &mut [T],
) {
    let lanes = lines.len();
    let scratch = &mut scratch[..n * lanes];
    let (reads_split, writes_split) = (op.reads_split(), op.writes_split());
    for (l, line) in lines.iter().enumerate() {
        if lanes == 1 && !reads_split && line.is_contiguous() {
            // Safety: the pass checked that every line holds the samples it touches.
            scratch.copy_from_slice(unsafe { line.slice_mut(0, n) });
            continue;
        }
        for i in 0..n {
            let src = if reads_split { split_index(i, h_offset) } else { i };
            // Safety: the pass checked bounds and lines of one pass are disjoint.
            scratch[i * lanes + l] = unsafe { line.read(src) };
        }
    }
    op.apply(scratch, n);
    for (l, line) in lines.iter().enumerate() {
        if lanes == 1 && !writes_split && line.is_contiguous() {
            unsafe { line.slice_mut(0, n) }.copy_from_slice(scratch);
            continue;
        }
        for i in 0..n {
            let dst = if writes_split { split_index(i, h_offset) } else { i };
            unsafe { line.write(dst, scratch[i * lanes + l]) };
        }
    }
}

/// Applies `op` to every line of `n` samples, high band at `h_offset`.
pub(crate) fn run_lines<T: LiftingSample>(
    config: &LiftConfig,
    lines: &[StridedLine<T>],
    n: usize,
    h_offset: usize,
    op: LineOp<'_, T>,
) -> Result<(), LiftletError> {
    if n == 0 || lines.is_empty() {
        return Ok(());
    }
    let reach = if op.reads_split() || op.writes_split() {
        n.max(h_offset + n / 2)
    } else {
        n
    };
    for line in lines {
        assert!(
            line.len() >= reach,
            "Line of {} samples can't hold {reach} samples",
            line.len()
        );
    }

    let lanes = op.lanes();
    let groups = lines.len() / lanes;
    for_each_line(config, groups, n * lanes, |g, scratch| {
        transform_group(&lines[g * lanes..(g + 1) * lanes], n, h_offset, &op, scratch)
    })?;

    let tail = &lines[groups * lanes..];
    if !tail.is_empty() {
        ltrace!(
            "{} trailing lines of {} take the scalar pass",
            tail.len(),
            lines.len()
        );
        let scalar = LanePass::<T>::new(CoreVariant::DoubleLoop);
        let tail_op = op.with_pass(&scalar);
        for_each_line(config, tail.len(), n, |i, scratch| {
            transform_group(&tail[i..i + 1], n, h_offset, &tail_op, scratch)
        })?;
    }
    Ok(())
}

/// Separable multi-level driver over one family and one pipeline variant.
pub(crate) struct Driver<'a, T> {
    pub(crate) family: WaveletFamily,
    pub(crate) config: &'a LiftConfig,
    pub(crate) pass: &'a dyn LinePass<T>,
}

impl<'a, T: LiftingSample> Driver<'a, T> {
    /// Rows `0..count`, each `n` samples long.
    pub(crate) fn rows(
        &self,
        image: &mut StridedImage<'_, T>,
        count: usize,
        n: usize,
        h_offset: usize,
        op: LineOp<'_, T>,
    ) -> Result<(), LiftletError> {
        let reach = n.max(h_offset + n / 2);
        let lines: Vec<StridedLine<T>> = (0..count).map(|y| image.row_line(y, reach)).collect();
        run_lines(self.config, &lines, n, h_offset, op)
    }

    /// The given columns, each `n` samples long.
    pub(crate) fn columns(
        &self,
        image: &mut StridedImage<'_, T>,
        columns: impl Iterator<Item = usize>,
        n: usize,
        h_offset: usize,
        op: LineOp<'_, T>,
    ) -> Result<(), LiftletError> {
        let reach = n.max(h_offset + n / 2);
        let lines: Vec<StridedLine<T>> = columns.map(|x| image.column_line(x, reach)).collect();
        run_lines(self.config, &lines, n, h_offset, op)
    }

    fn fused(&self) -> bool {
        self.config.acceleration() == Acceleration::Tile4x4
    }

    fn forward_level(
        &self,
        image: &mut StridedImage<'_, T>,
        g: &LevelGeometry,
    ) -> Result<(), LiftletError> {
        let (a, h) = (g.src_active, g.dst_outer);
        let fused = self.fused() && tile::forward_tiles(self.family, image, a)?;
        let (row_op, column_op) = if fused {
            (LineOp::Split, LineOp::Split)
        } else {
            (
                LineOp::Forward(self.pass, self.family),
                LineOp::Forward(self.pass, self.family),
            )
        };
        self.rows(image, a.height, a.width, h.width, row_op)?;
        let columns = band_indices(a.width, h.width);
        self.columns(image, columns, a.height, h.height, column_op)
    }

    fn inverse_level(
        &self,
        image: &mut StridedImage<'_, T>,
        g: &LevelGeometry,
    ) -> Result<(), LiftletError> {
        let (a, h) = (g.src_active, g.dst_outer);
        let fused = self.fused() && tile::supports(a);
        let (column_op, row_op) = if fused {
            (LineOp::Interleave, LineOp::Interleave)
        } else {
            (
                LineOp::Inverse(self.pass, self.family),
                LineOp::Inverse(self.pass, self.family),
            )
        };
        let columns = band_indices(a.width, h.width);
        self.columns(image, columns, a.height, h.height, column_op)?;
        self.rows(image, a.height, a.width, h.width, row_op)?;
        if fused {
            tile::inverse_tiles(self.family, image, a)?;
        }
        Ok(())
    }

    /// Multi-level forward transform, returns the number of levels done.
    pub(crate) fn forward_2d(
        &self,
        image: &mut StridedImage<'_, T>,
        d: &Decomposition,
    ) -> Result<usize, LiftletError> {
        d.validate(image)?;
        let levels = d.resolved_levels();
        for j in 0..levels {
            let g = LevelGeometry::new(d, j);
            ldebug!(
                "{} forward level {j}: active {}x{}, outer {}x{}",
                self.family,
                g.src_active.width,
                g.src_active.height,
                g.src_outer.width,
                g.src_outer.height
            );
            self.forward_level(image, &g)?;
            if d.zero_padding {
                zero_padding(image, &g);
            }
        }
        Ok(levels)
    }

    /// Multi-level inverse transform, returns the number of levels undone.
    pub(crate) fn inverse_2d(
        &self,
        image: &mut StridedImage<'_, T>,
        d: &Decomposition,
    ) -> Result<usize, LiftletError> {
        d.validate(image)?;
        let levels = d.resolved_levels();
        for j in (0..levels).rev() {
            let g = LevelGeometry::new(d, j);
            ldebug!(
                "{} inverse level {j}: active {}x{}, outer {}x{}",
                self.family,
                g.src_active.width,
                g.src_active.height,
                g.src_outer.width,
                g.src_outer.height
            );
            self.inverse_level(image, &g)?;
        }
        Ok(levels)
    }

    /// One level over the rows of the active rectangle only.
    pub(crate) fn rows_only(
        &self,
        image: &mut StridedImage<'_, T>,
        d: &Decomposition,
        inverse: bool,
    ) -> Result<(), LiftletError> {
        d.validate(image)?;
        let g = LevelGeometry::new(d, 0);
        let op = self.op(inverse);
        self.rows(image, g.src_active.height, g.src_active.width, g.dst_outer.width, op)
    }

    /// One level over the columns of the active rectangle only.
    pub(crate) fn columns_only(
        &self,
        image: &mut StridedImage<'_, T>,
        d: &Decomposition,
        inverse: bool,
    ) -> Result<(), LiftletError> {
        d.validate(image)?;
        let g = LevelGeometry::new(d, 0);
        let op = self.op(inverse);
        self.columns(
            image,
            0..g.src_active.width,
            g.src_active.height,
            g.dst_outer.height,
            op,
        )
    }

    fn op(&self, inverse: bool) -> LineOp<'a, T> {
        if inverse {
            LineOp::Inverse(self.pass, self.family)
        } else {
            LineOp::Forward(self.pass, self.family)
        }
    }
}

#[inline]
fn in_band(i: usize, active: usize, h_offset: usize) -> bool {
    i < active.div_ceil(2) || (i >= h_offset && i < h_offset + active / 2)
}

/// Zeroes every sample of the level's outer rectangle that lies outside the
/// active part of its band.
pub(crate) fn zero_padding<T: LiftingSample>(image: &mut StridedImage<'_, T>, g: &LevelGeometry) {
    let (a, h, o) = (g.src_active, g.dst_outer, g.src_outer);
    let mut zeroed = 0usize;
    for y in 0..o.height {
        let row_inside = in_band(y, a.height, h.height);
        for x in 0..o.width {
            if !(row_inside && in_band(x, a.width, h.width)) {
                image.set(y, x, T::default());
                zeroed += 1;
            }
        }
    }
    ltrace!("Zero padding cleared {} samples", zeroed);
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::dispatch::select_line_pass;
    use crate::subband::{Band, subband_extents};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    pub(crate) fn config_for(acceleration: Acceleration, threads: usize) -> LiftConfig {
        LiftConfig::new()
            .with_acceleration(acceleration)
            .with_workers(acceleration.required_workers().unwrap_or(1))
            .unwrap()
            .with_threads(threads)
            .unwrap()
    }

    pub(crate) const LOCAL_ACCELERATIONS: [Acceleration; 7] = [
        Acceleration::Scalar,
        Acceleration::Shifted2,
        Acceleration::Shifted3,
        Acceleration::Shifted6,
        Acceleration::MultiWorker,
        Acceleration::Simd4,
        Acceleration::Tile4x4,
    ];

    fn transform<T: LiftingSample>(
        family: WaveletFamily,
        config: &LiftConfig,
        data: &mut [T],
        extent: Extent,
        d: &Decomposition,
        inverse: bool,
    ) -> usize {
        let pass = select_line_pass::<T>(config).unwrap();
        let driver = Driver {
            family,
            config,
            pass: pass.as_ref(),
        };
        let mut image = StridedImage::packed(data, extent.width, extent.height).unwrap();
        if inverse {
            driver.inverse_2d(&mut image, d).unwrap()
        } else {
            driver.forward_2d(&mut image, d).unwrap()
        }
    }

    const EXTENTS: [(usize, usize); 9] = [
        (1, 1),
        (1, 7),
        (7, 1),
        (2, 3),
        (5, 5),
        (13, 9),
        (9, 13),
        (32, 17),
        (40, 40),
    ];

    #[test]
    fn test_round_trip_all_accelerations() {
        let mut rng = StdRng::seed_from_u64(2024);
        for family in WaveletFamily::ALL {
            for acceleration in LOCAL_ACCELERATIONS {
                for threads in [1, 3] {
                    let config = config_for(acceleration, threads);
                    for (w, h) in EXTENTS {
                        let extent = Extent::new(w, h);
                        let original: Vec<f64> =
                            (0..w * h).map(|_| rng.gen_range(-100.0..100.0)).collect();
                        let d = Decomposition::new(extent);
                        let mut data = original.clone();
                        let levels = transform(family, &config, &mut data, extent, &d, false);
                        assert_eq!(levels, d.level_limit());
                        transform(family, &config, &mut data, extent, &d, true);
                        for (i, (&a, &b)) in data.iter().zip(original.iter()).enumerate() {
                            assert!(
                                (a - b).abs() < 1e-8,
                                "{family} {acceleration} {w}x{h}: {a} at {i}, expected {b}"
                            );
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_integer_round_trip_is_exact() {
        let mut rng = StdRng::seed_from_u64(77);
        for family in WaveletFamily::ALL {
            for acceleration in LOCAL_ACCELERATIONS {
                let config = config_for(acceleration, 1);
                for (w, h) in EXTENTS {
                    let extent = Extent::new(w, h);
                    let original: Vec<i32> = (0..w * h).map(|_| rng.gen_range(0..256)).collect();
                    let d = Decomposition::new(extent).with_decompose_one(true);
                    let mut data = original.clone();
                    transform(family, &config, &mut data, extent, &d, false);
                    transform(family, &config, &mut data, extent, &d, true);
                    assert_eq!(data, original, "{family} {acceleration} {w}x{h}");
                }
            }
        }
    }

    #[test]
    fn test_accelerations_agree() {
        let mut rng = StdRng::seed_from_u64(5);
        for family in WaveletFamily::ALL {
            for (w, h) in [(6, 6), (23, 11), (48, 37)] {
                let extent = Extent::new(w, h);
                let original: Vec<f32> = (0..w * h).map(|_| rng.gen_range(0.0..1.0)).collect();
                let d = Decomposition::new(extent);
                let mut expected = original.clone();
                transform(family, &LiftConfig::new(), &mut expected, extent, &d, false);
                for acceleration in LOCAL_ACCELERATIONS {
                    let mut actual = original.clone();
                    let config = config_for(acceleration, 2);
                    transform(family, &config, &mut actual, extent, &d, false);
                    for (i, (&a, &e)) in actual.iter().zip(expected.iter()).enumerate() {
                        assert!(
                            (a - e).abs() <= 1e-4 * e.abs().max(1.),
                            "{family} {acceleration} {w}x{h}: {a} at {i}, expected {e}"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_level_count() {
        let d = Decomposition::new(Extent::new(512, 512));
        assert_eq!(d.resolved_levels(), 9);
        assert_eq!(d.with_levels(Levels::Count(20)).resolved_levels(), 9);
        assert_eq!(d.with_levels(Levels::Count(3)).resolved_levels(), 3);
        let d = Decomposition::new(Extent::new(16, 4));
        assert_eq!(d.resolved_levels(), 2);
        assert_eq!(d.with_decompose_one(true).resolved_levels(), 4);

        let extent = Extent::new(16, 4);
        let mut data = vec![1f32; 64];
        let levels = transform(
            WaveletFamily::Cdf53,
            &LiftConfig::new(),
            &mut data,
            extent,
            &Decomposition::new(extent).with_levels(Levels::Count(7)),
            false,
        );
        assert_eq!(levels, 2);
    }

    #[test]
    fn test_smooth_surface_one_level() {
        let extent = Extent::new(512, 512);
        let original: Vec<f32> = (0..512 * 512)
            .map(|i| {
                let (x, y) = ((i % 512) as f32, (i / 512) as f32);
                2. * x * y / (x * x + y * y + 1.)
            })
            .collect();
        let d = Decomposition::new(extent).with_levels(Levels::Count(1));
        let config = LiftConfig::new();
        let mut data = original.clone();
        assert_eq!(
            transform(WaveletFamily::Cdf97, &config, &mut data, extent, &d, false),
            1
        );
        for band in Band::ALL {
            let g = subband_extents(extent, extent, 1, band).unwrap();
            assert_eq!(
                (g.width, g.height),
                (256, 256),
                "{band:?} of a 512x512 surface should be 256x256"
            );
        }
        let (mut low, mut high) = (0f64, 0f64);
        for y in 0..512 {
            for x in 0..512 {
                let v = data[y * 512 + x] as f64;
                if x < 256 && y < 256 {
                    low += v * v;
                } else {
                    high += v * v;
                }
            }
        }
        assert!(
            high < low * 1e-2,
            "Smooth surface should keep its energy in LL: low {low}, high {high}"
        );
        transform(WaveletFamily::Cdf97, &config, &mut data, extent, &d, true);
        for (i, (&a, &b)) in data.iter().zip(original.iter()).enumerate() {
            assert!((a - b).abs() < 1e-3, "Restored {a} at {i}, expected {b}");
        }
    }

    #[test]
    fn test_line_scratch_is_checked_before_workers_start() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        for threads in [1, 3] {
            let config = LiftConfig::new().with_threads(threads).unwrap();
            let visited = AtomicUsize::new(0);
            for_each_line::<f32, _>(&config, 37, 9, |_, scratch| {
                assert_eq!(scratch.len(), 9);
                visited.fetch_add(1, Ordering::Relaxed);
            })
            .unwrap();
            assert_eq!(visited.load(Ordering::Relaxed), 37, "threads {threads}");

            let result = for_each_line::<f32, _>(&config, 4, usize::MAX, |_, _| {
                panic!("No line should run without scratch")
            });
            assert!(
                matches!(result, Err(LiftletError::OutOfMemory(usize::MAX))),
                "threads {threads}"
            );
        }
    }

    #[test]
    fn test_inverse_must_mirror_pass_order() {
        let mut rng = StdRng::seed_from_u64(31337);
        let (w, h) = (13usize, 9usize);
        let original: Vec<i32> = (0..w * h).map(|_| rng.gen_range(-1000..1000)).collect();
        let config = LiftConfig::new();
        let pass = select_line_pass::<i32>(&config).unwrap();
        let driver = Driver {
            family: WaveletFamily::Cdf53,
            config: &config,
            pass: pass.as_ref(),
        };
        let d = Decomposition::new(Extent::new(w, h)).with_levels(Levels::Count(1));
        let g = LevelGeometry::new(&d, 0);
        let (a, hd) = (g.src_active, g.dst_outer);
        let inverse = LineOp::Inverse(pass.as_ref(), WaveletFamily::Cdf53);

        let mut data = original.clone();
        let mut image = StridedImage::packed(&mut data, w, h).unwrap();
        driver.forward_2d(&mut image, &d).unwrap();
        driver
            .rows(&mut image, a.height, a.width, hd.width, inverse)
            .unwrap();
        driver
            .columns(&mut image, band_indices(a.width, hd.width), a.height, hd.height, inverse)
            .unwrap();
        assert_ne!(data, original, "Rows before columns should not invert");

        let mut data = original.clone();
        let mut image = StridedImage::packed(&mut data, w, h).unwrap();
        driver.forward_2d(&mut image, &d).unwrap();
        driver.inverse_2d(&mut image, &d).unwrap();
        assert_eq!(data, original);
    }

    #[test]
    fn test_zero_padding_and_sparse_layout() {
        let mut rng = StdRng::seed_from_u64(9);
        let outer = Extent::new(16, 16);
        let active = Extent::new(11, 9);
        let d = Decomposition::new(outer)
            .with_active(active)
            .with_zero_padding(true)
            .with_levels(Levels::Count(1));
        let mut data = vec![0f64; 256];
        for y in 0..active.height {
            for x in 0..active.width {
                data[y * 16 + x] = rng.gen_range(1.0..2.0);
            }
        }
        let original = data.clone();
        // Garbage outside the active rectangle must not leak into the bands.
        for y in active.height..16 {
            data[y * 16] = 1000.;
        }
        transform(WaveletFamily::Cdf97, &LiftConfig::new(), &mut data, outer, &d, false);
        for y in 0..16 {
            for x in 0..16 {
                let inside = in_band(y, 9, 8) && in_band(x, 11, 8);
                if !inside {
                    assert_eq!(data[y * 16 + x], 0., "Padding at ({y}, {x}) not zeroed");
                }
            }
        }
        transform(WaveletFamily::Cdf97, &LiftConfig::new(), &mut data, outer, &d, true);
        for y in 0..active.height {
            for x in 0..active.width {
                let (a, b) = (data[y * 16 + x], original[y * 16 + x]);
                assert!((a - b).abs() < 1e-9, "Restored {a} at ({y}, {x}), expected {b}");
            }
        }
    }

    #[test]
    fn test_rejects_invalid_decomposition() {
        let mut data = vec![0f32; 64];
        let image = StridedImage::packed(&mut data, 8, 8).unwrap();
        let d = Decomposition::new(Extent::new(8, 8)).with_active(Extent::new(9, 2));
        assert_eq!(
            d.validate(&image),
            Err(LiftletError::ActiveExceedsOuter(9, 2, 8, 8))
        );
        let d = Decomposition::new(Extent::new(16, 8));
        assert_eq!(
            d.validate(&image),
            Err(LiftletError::OuterExceedsView(16, 8, 8, 8))
        );
        let d = Decomposition::new(Extent::new(8, 8)).with_active(Extent::new(0, 3));
        assert_eq!(d.validate(&image), Err(LiftletError::EmptyExtent(0, 3)));
    }
}
