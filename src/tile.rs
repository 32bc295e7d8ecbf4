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
//! Fused 2-D lifting over 4x4 tiles.
//!
//! One sweep over the image runs the horizontal and the vertical lifting
//! pipelines together. A tile feeds four rows into the horizontal lifter
//! (lanes are rows), transposes the four finished columns, and feeds them
//! into the vertical lifter of its column group (lanes are columns). The
//! inverse runs the stages the other way around. The result is interleaved in
//! both directions.

use crate::coefficients::{LiftingCoefficients, WaveletFamily};
use crate::dwt2d::Extent;
use crate::err::{LiftletError, try_vec};
use crate::kernel::{Direction, Forward, GENERAL_MIN_LEN, Inverse, Lifter, Phases, lift_line};
use crate::log::ltrace;
use crate::pipeline::CoreVariant;
use crate::sample::{LiftLane, LiftingSample};
use crate::strided::{StridedImage, StridedLine};

/// Whether the active rectangle is large enough for the fused sweep.
pub(crate) fn supports(active: Extent) -> bool {
    active.width >= GENERAL_MIN_LEN && active.height >= GENERAL_MIN_LEN
}

/// Transforms the active rectangle in place, leaving both axes interleaved.
///
/// Returns `false` without touching the image when the rectangle is too small.
pub(crate) fn forward_tiles<T: LiftingSample>(
    family: WaveletFamily,
    image: &mut StridedImage<'_, T>,
    active: Extent,
) -> Result<bool, LiftletError> {
    if !supports(active) {
        ltrace!(
            "Active {}x{} is too small for tiles, using separable passes",
            active.width,
            active.height
        );
        return Ok(false);
    }
    let c = family.coefficients();
    match c.steps.len() {
        4 => fused::<T, T::Simd4, Forward, 4>(image, active, &c)?,
        _ => fused::<T, T::Simd4, Forward, 2>(image, active, &c)?,
    }
    Ok(true)
}

/// Inverse of [`forward_tiles`], expects both axes interleaved.
pub(crate) fn inverse_tiles<T: LiftingSample>(
    family: WaveletFamily,
    image: &mut StridedImage<'_, T>,
    active: Extent,
) -> Result<(), LiftletError> {
    assert!(supports(active), "Tiles need at least {GENERAL_MIN_LEN} samples per side");
    let c = family.coefficients();
    match c.steps.len() {
        4 => fused::<T, T::Simd4, Inverse, 4>(image, active, &c),
        _ => fused::<T, T::Simd4, Inverse, 2>(image, active, &c),
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Phase {
    Prolog,
    Core,
    Epilog,
}

impl Phase {
    /// Phase of the iteration pair `(k0, k0 + 1)` a tile covers on one axis.
    fn of(phases: &Phases, k0: usize) -> Phase {
        if phases.is_core(k0) && phases.is_core(k0 + 1) {
            Phase::Core
        } else if k0 < phases.core_start {
            Phase::Prolog
        } else {
            Phase::Epilog
        }
    }
}

/// Part of the tile grid a tile belongs to.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Region {
    Interior,
    Top,
    Bottom,
    Left,
    Right,
    Corner,
}

impl Region {
    fn of(horizontal: Phase, vertical: Phase) -> Region {
        match (horizontal, vertical) {
            (Phase::Core, Phase::Core) => Region::Interior,
            (Phase::Core, Phase::Prolog) => Region::Top,
            (Phase::Core, Phase::Epilog) => Region::Bottom,
            (Phase::Prolog, Phase::Core) => Region::Left,
            (Phase::Epilog, Phase::Core) => Region::Right,
            _ => Region::Corner,
        }
    }

    fn horizontal_core(self) -> bool {
        matches!(self, Region::Interior | Region::Top | Region::Bottom)
    }

    fn vertical_core(self) -> bool {
        matches!(self, Region::Interior | Region::Left | Region::Right)
    }
}

/// Two lifter iterations over a block of four lane groups.
#[inline(always)]
fn run_pair<T, V: LiftLane<T>, D: Direction, const S: usize>(
    lifter: &mut Lifter<'_, T, V, D, S>,
    k0: usize,
    n: usize,
    core: bool,
    x: [V; 4],
) -> [V; 4] {
    let mut out = [V::zero(); 4];
    for i in 0..2 {
        let (a, b) = if core {
            lifter.core(x[2 * i], x[2 * i + 1])
        } else {
            lifter.boundary(k0 + i, n, x[2 * i], x[2 * i + 1])
        };
        out[2 * i] = a;
        out[2 * i + 1] = b;
    }
    out
}

/// Reads four samples of `line` from `x0`, zero past `len`.
#[inline(always)]
fn load_lanes<T: LiftingSample, V: LiftLane<T>>(line: &StridedLine<T>, x0: usize, len: usize) -> V {
    if x0 + 4 <= len && line.is_contiguous() {
        // Safety: the four samples are inside the line.
        return V::load(unsafe { line.slice_mut(x0, 4) });
    }
    let mut lanes = [T::default(); 4];
    for (c, dst) in lanes.iter_mut().enumerate() {
        if x0 + c < len {
            *dst = unsafe { line.read(x0 + c) };
        }
    }
    V::load(&lanes)
}

/// Writes the lanes of `v` that fall inside `0..len`, starting at `x0`.
#[inline(always)]
fn store_lanes<T: LiftingSample, V: LiftLane<T>>(line: &StridedLine<T>, x0: isize, len: usize, v: V) {
    if x0 >= 0 && x0 as usize + 4 <= len && line.is_contiguous() {
        v.store(unsafe { line.slice_mut(x0 as usize, 4) });
        return;
    }
    let mut lanes = [T::default(); 4];
    v.store(&mut lanes);
    for (c, &value) in lanes.iter().enumerate() {
        let x = x0 + c as isize;
        if x >= 0 && (x as usize) < len {
            unsafe { line.write(x as usize, value) };
        }
    }
}

fn fused<T: LiftingSample, V: LiftLane<T>, D: Direction, const S: usize>(
    image: &mut StridedImage<'_, T>,
    active: Extent,
    c: &LiftingCoefficients,
) -> Result<(), LiftletError> {
    let (w, h) = (active.width, active.height);
    let horizontal_first = D::SHIFT == 1;
    let plan = D::plan::<T, V, S>(c);
    let rows: Vec<StridedLine<T>> = (0..h).map(|y| image.row_line(y, w)).collect();

    if horizontal_first {
        // The vertical lifters start from row zero, which has to be finished
        // horizontally before the sweep.
        let scalar_plan = D::plan::<T, T, S>(c);
        let mut row = try_vec![T::default(); w];
        for (x, dst) in row.iter_mut().enumerate() {
            *dst = unsafe { rows[0].read(x) };
        }
        lift_line::<T, T, D, S>(&mut row, w, &scalar_plan, CoreVariant::DoubleLoop);
        for (x, &v) in row.iter().enumerate() {
            unsafe { rows[0].write(x, v) };
        }
    }

    let phases_x = Phases::new(w, D::SHIFT, S);
    let phases_y = Phases::new(h, D::SHIFT, S);
    let tiles_x = phases_x.last / 2 + 1;
    let tiles_y = phases_y.last / 2 + 1;
    // Tile `m` finishes samples `4m + lag..4m + lag + 4`.
    let lag = D::SHIFT as isize + 1 - S as isize;

    let mut vertical: Vec<Lifter<'_, T, V, D, S>> = (0..tiles_x)
        .map(|m| {
            let first = if horizontal_first {
                let c0 = 4 * m as isize + lag;
                let mut lanes = [T::default(); 4];
                for (i, dst) in lanes.iter_mut().enumerate() {
                    let x = c0 + i as isize;
                    if x >= 0 && (x as usize) < w {
                        *dst = unsafe { rows[0].read(x as usize) };
                    }
                }
                V::load(&lanes)
            } else {
                V::zero()
            };
            Lifter::new(&plan, first)
        })
        .collect();

    let mut interior = 0usize;
    for g in 0..tiles_y {
        let y0 = 4 * g + D::SHIFT;
        let out_y0 = 4 * g as isize + lag;
        let vertical_phase = Phase::of(&phases_y, 2 * g);

        let first = if horizontal_first {
            let mut lanes = [T::default(); 4];
            for (i, dst) in lanes.iter_mut().enumerate() {
                if y0 + i < h {
                    *dst = unsafe { rows[y0 + i].read(0) };
                }
            }
            V::load(&lanes)
        } else {
            V::zero()
        };
        let mut horizontal = Lifter::<T, V, D, S>::new(&plan, first);

        for (m, column_lifter) in vertical.iter_mut().enumerate() {
            let x0 = 4 * m + D::SHIFT;
            let region = Region::of(Phase::of(&phases_x, 2 * m), vertical_phase);
            if region == Region::Interior {
                interior += 1;
            }

            let block: [V; 4] = std::array::from_fn(|i| {
                if y0 + i < h {
                    load_lanes(&rows[y0 + i], x0, w)
                } else {
                    V::zero()
                }
            });

            let out = if horizontal_first {
                let columns = V::transpose4(block);
                let columns =
                    run_pair(&mut horizontal, 2 * m, w, region.horizontal_core(), columns);
                let rows_block = V::transpose4(columns);
                run_pair(column_lifter, 2 * g, h, region.vertical_core(), rows_block)
            } else {
                let rows_block = run_pair(column_lifter, 2 * g, h, region.vertical_core(), block);
                let columns = V::transpose4(rows_block);
                let columns =
                    run_pair(&mut horizontal, 2 * m, w, region.horizontal_core(), columns);
                V::transpose4(columns)
            };

            let out_x0 = 4 * m as isize + lag;
            for (i, &v) in out.iter().enumerate() {
                let y = out_y0 + i as isize;
                if y >= 0 && (y as usize) < h {
                    store_lanes(&rows[y as usize], out_x0, w, v);
                }
            }
        }
    }
    ltrace!(
        "Swept {}x{} tiles, {} interior",
        tiles_x,
        tiles_y,
        interior
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::{LanePass, LinePass};
    use crate::kernel::tests::reference_forward;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    /// Rows then columns with the reference lifting, both axes interleaved.
    fn reference_2d(family: WaveletFamily, data: &[f64], w: usize, h: usize) -> Vec<f64> {
        let mut out = data.to_vec();
        for y in 0..h {
            let row = reference_forward(family, &out[y * w..(y + 1) * w]);
            out[y * w..(y + 1) * w].copy_from_slice(&row);
        }
        for x in 0..w {
            let column: Vec<f64> = (0..h).map(|y| out[y * w + x]).collect();
            for (y, v) in reference_forward(family, &column).into_iter().enumerate() {
                out[y * w + x] = v;
            }
        }
        out
    }

    #[test]
    fn test_regions() {
        let p = Phases::new(20, 1, 4);
        assert_eq!(Phase::of(&p, 0), Phase::Prolog);
        assert_eq!(Phase::of(&p, 2), Phase::Core);
        assert_eq!(Phase::of(&p, 8), Phase::Epilog);
        assert_eq!(Region::of(Phase::Core, Phase::Core), Region::Interior);
        assert_eq!(Region::of(Phase::Core, Phase::Prolog), Region::Top);
        assert_eq!(Region::of(Phase::Epilog, Phase::Core), Region::Right);
        assert_eq!(Region::of(Phase::Prolog, Phase::Epilog), Region::Corner);
    }

    #[test]
    fn test_fused_matches_separable_reference() {
        let mut rng = StdRng::seed_from_u64(404);
        for family in WaveletFamily::ALL {
            for (w, h) in [(5, 5), (6, 9), (11, 7), (16, 16), (29, 18), (33, 40)] {
                let original: Vec<f64> = (0..w * h).map(|_| rng.gen_range(-50.0..50.0)).collect();
                let expected = reference_2d(family, &original, w, h);
                let mut data = original.clone();
                let mut image = StridedImage::packed(&mut data, w, h).unwrap();
                assert!(forward_tiles(family, &mut image, Extent::new(w, h)).unwrap());
                for (i, (&a, &e)) in data.iter().zip(expected.iter()).enumerate() {
                    assert!(
                        (a - e).abs() < 1e-9,
                        "{family} {w}x{h}: {a} at ({}, {}), expected {e}",
                        i / w,
                        i % w
                    );
                }
                let mut image = StridedImage::packed(&mut data, w, h).unwrap();
                inverse_tiles(family, &mut image, Extent::new(w, h)).unwrap();
                for (i, (&a, &e)) in data.iter().zip(original.iter()).enumerate() {
                    assert!((a - e).abs() < 1e-9, "{family} {w}x{h}: restored {a} at {i}, expected {e}");
                }
            }
        }
    }

    #[test]
    fn test_fused_on_strided_view() {
        // Columns of a padded buffer, read through a transposed view.
        let (w, h, pitch) = (12usize, 9usize, 16usize);
        let mut rng = StdRng::seed_from_u64(8);
        let mut buffer = vec![0f32; pitch * w];
        for v in buffer.iter_mut() {
            *v = rng.gen_range(0.0..1.0);
        }
        let original = buffer.clone();
        let strides = crate::Strides::new(4, pitch as isize * 4);
        let mut image = StridedImage::new(&mut buffer, 0, strides, w, h).unwrap();
        assert!(forward_tiles(WaveletFamily::Cdf97, &mut image, Extent::new(w, h)).unwrap());

        let scalar = LanePass::<f32>::new(CoreVariant::DoubleLoop);
        let mut expected = original.clone();
        let mut view = StridedImage::new(&mut expected, 0, strides, w, h).unwrap();
        let mut line = vec![0f32; w.max(h)];
        for y in 0..h {
            for x in 0..w {
                line[x] = view.get(y, x);
            }
            scalar.forward(WaveletFamily::Cdf97, &mut line, w);
            for x in 0..w {
                view.set(y, x, line[x]);
            }
        }
        for x in 0..w {
            for y in 0..h {
                line[y] = view.get(y, x);
            }
            scalar.forward(WaveletFamily::Cdf97, &mut line, h);
            for y in 0..h {
                view.set(y, x, line[y]);
            }
        }
        assert_eq!(buffer, expected);
    }

    #[test]
    fn test_too_small_is_declined() {
        let mut data = vec![1f32; 16];
        let mut image = StridedImage::packed(&mut data, 4, 4).unwrap();
        assert!(!forward_tiles(WaveletFamily::Cdf53, &mut image, Extent::new(4, 4)).unwrap());
        assert!(data.iter().all(|&v| v == 1.));
    }
}
