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
//! Core phase variants. All of them evaluate the same operations in the same
//! order per sample, so their results are bit-identical.

use crate::kernel::{Direction, Lifter, get, put};
use crate::sample::LiftLane;
use std::ops::Range;

/// How the Core iterations are scheduled.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub(crate) enum CoreVariant {
    /// One iteration at a time, all steps fused.
    DoubleLoop,
    /// Blocks of 2 iterations swept step by step.
    Shifted2,
    /// Blocks of 3 iterations swept step by step.
    Shifted3,
    /// Blocks of 6 iterations swept step by step.
    Shifted6,
}

/// Cores with fewer iterations always take the double loop.
pub(crate) const MIN_SHIFTED_ITERATIONS: usize = 3;

pub(crate) fn run_core<T, V: LiftLane<T>, D: Direction, const S: usize>(
    variant: CoreVariant,
    buf: &mut [T],
    lifter: &mut Lifter<'_, T, V, D, S>,
    ks: Range<usize>,
) {
    if ks.len() < MIN_SHIFTED_ITERATIONS {
        double_loop(buf, lifter, ks);
        return;
    }
    match variant {
        CoreVariant::DoubleLoop => double_loop(buf, lifter, ks),
        CoreVariant::Shifted2 => shifted::<T, V, D, S, 2>(buf, lifter, ks),
        CoreVariant::Shifted3 => shifted::<T, V, D, S, 3>(buf, lifter, ks),
        CoreVariant::Shifted6 => shifted::<T, V, D, S, 6>(buf, lifter, ks),
    }
}

#[inline(always)]
fn double_loop<T, V: LiftLane<T>, D: Direction, const S: usize>(
    buf: &mut [T],
    lifter: &mut Lifter<'_, T, V, D, S>,
    ks: Range<usize>,
) {
    for k in ks {
        let base = 2 * k + D::SHIFT;
        let (a, b) = lifter.core(get(buf, base), get(buf, base + 1));
        let j = base + 1 - S;
        put(buf, j, a);
        put(buf, j + 1, b);
    }
}

/// Loads `U` pairs, sweeps every step across them, then stores `U` pairs.
fn shifted<T, V: LiftLane<T>, D: Direction, const S: usize, const U: usize>(
    buf: &mut [T],
    lifter: &mut Lifter<'_, T, V, D, S>,
    ks: Range<usize>,
) {
    let blocks = ks.len() / U;
    let mut k = ks.start;
    for _ in 0..blocks {
        let u: [V; U] = std::array::from_fn(|i| get(buf, 2 * (k + i) + D::SHIFT));
        let v: [V; U] = std::array::from_fn(|i| get(buf, 2 * (k + i) + D::SHIFT + 1));
        let (a, b) = lifter.core_block::<U>(u, v);
        for i in 0..U {
            let j = 2 * (k + i) + D::SHIFT + 1 - S;
            put(buf, j, a[i]);
            put(buf, j + 1, b[i]);
        }
        k += U;
    }
    double_loop(buf, lifter, k..ks.end);
}
