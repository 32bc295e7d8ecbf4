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
//! Fused single-loop lifting kernel.
//!
//! Every iteration `k` reads the sample pair `(2k + shift, 2k + shift + 1)`
//! and runs all lifting steps once, each step lagging one sample behind the
//! previous one. Step `s` updates sample `2k + shift - s`; the last two steps
//! finish the pair `(2k + shift + 1 - S, 2k + shift + 2 - S)`. The first and
//! last few iterations touch the signal borders and run with mirrored
//! neighbours (Prolog and Epilog), everything in between runs the Core.

use crate::coefficients::{LiftingCoefficients, WaveletFamily};
use crate::pipeline::{CoreVariant, run_core};
use crate::sample::LiftLane;
use std::marker::PhantomData;

/// Shortest signal handled by the Prolog/Core/Epilog path.
pub(crate) const GENERAL_MIN_LEN: usize = 5;

/// Lifting coefficients prepared for one lane type and direction.
pub(crate) struct LiftingPlan<C, const S: usize> {
    pub(crate) steps: [C; S],
    pub(crate) even_scale: C,
    pub(crate) odd_scale: C,
}

pub(crate) trait Direction: Copy + Send + Sync + 'static {
    /// Index of the first sample read by iteration zero, minus one.
    const SHIFT: usize;

    fn plan<T, V: LiftLane<T>, const S: usize>(
        c: &LiftingCoefficients,
    ) -> LiftingPlan<V::Coeff, S>;

    fn step<T, V: LiftLane<T>>(target: V, c: V::Coeff, left: V, right: V) -> V;

    /// Applied to every sample when it enters the kernel.
    fn load<T, V: LiftLane<T>, const S: usize>(
        plan: &LiftingPlan<V::Coeff, S>,
        x: V,
        even: bool,
    ) -> V;

    /// Applied to every sample when it leaves the kernel.
    fn store<T, V: LiftLane<T>, const S: usize>(
        plan: &LiftingPlan<V::Coeff, S>,
        x: V,
        even: bool,
    ) -> V;
}

#[derive(Debug, Copy, Clone, Default)]
pub(crate) struct Forward;

#[derive(Debug, Copy, Clone, Default)]
pub(crate) struct Inverse;

impl Direction for Forward {
    const SHIFT: usize = 1;

    fn plan<T, V: LiftLane<T>, const S: usize>(
        c: &LiftingCoefficients,
    ) -> LiftingPlan<V::Coeff, S> {
        assert_eq!(c.steps.len(), S, "Plan expects {S} lifting steps");
        LiftingPlan {
            steps: std::array::from_fn(|s| V::coeff(c.steps[s])),
            even_scale: V::coeff(c.zeta),
            odd_scale: V::coeff(1. / c.zeta),
        }
    }

    #[inline(always)]
    fn step<T, V: LiftLane<T>>(target: V, c: V::Coeff, left: V, right: V) -> V {
        target.lift(c, left, right)
    }

    #[inline(always)]
    fn load<T, V: LiftLane<T>, const S: usize>(
        _: &LiftingPlan<V::Coeff, S>,
        x: V,
        _: bool,
    ) -> V {
        x
    }

    #[inline(always)]
    fn store<T, V: LiftLane<T>, const S: usize>(
        plan: &LiftingPlan<V::Coeff, S>,
        x: V,
        even: bool,
    ) -> V {
        x.scale(if even { plan.even_scale } else { plan.odd_scale })
    }
}

impl Direction for Inverse {
    const SHIFT: usize = 0;

    fn plan<T, V: LiftLane<T>, const S: usize>(
        c: &LiftingCoefficients,
    ) -> LiftingPlan<V::Coeff, S> {
        assert_eq!(c.steps.len(), S, "Plan expects {S} lifting steps");
        LiftingPlan {
            steps: std::array::from_fn(|s| V::coeff(c.steps[S - 1 - s])),
            even_scale: V::coeff(1. / c.zeta),
            odd_scale: V::coeff(c.zeta),
        }
    }

    #[inline(always)]
    fn step<T, V: LiftLane<T>>(target: V, c: V::Coeff, left: V, right: V) -> V {
        target.unlift(c, left, right)
    }

    #[inline(always)]
    fn load<T, V: LiftLane<T>, const S: usize>(
        plan: &LiftingPlan<V::Coeff, S>,
        x: V,
        even: bool,
    ) -> V {
        x.scale(if even { plan.even_scale } else { plan.odd_scale })
    }

    #[inline(always)]
    fn store<T, V: LiftLane<T>, const S: usize>(
        _: &LiftingPlan<V::Coeff, S>,
        x: V,
        _: bool,
    ) -> V {
        x
    }
}

/// Iteration ranges of the three phases for a signal of `n >= 5` samples.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) struct Phases {
    pub(crate) core_start: usize,
    pub(crate) core_end: usize,
    pub(crate) last: usize,
}

impl Phases {
    pub(crate) fn new(n: usize, shift: usize, steps: usize) -> Phases {
        debug_assert!(n >= GENERAL_MIN_LEN);
        let core_start = (steps - shift).div_ceil(2);
        let core_end = ((n - 2 - shift) / 2 + 1).max(core_start);
        let last = (n + steps - 2 - shift) / 2;
        Phases {
            core_start,
            core_end,
            last,
        }
    }

    #[inline]
    pub(crate) fn is_core(&self, k: usize) -> bool {
        k >= self.core_start && k < self.core_end
    }
}

/// Streaming state of one lifting pipeline: the values each step still needs
/// from the previous iteration.
pub(crate) struct Lifter<'p, T, V: LiftLane<T>, D, const S: usize> {
    pub(crate) plan: &'p LiftingPlan<V::Coeff, S>,
    pub(crate) l: [V; S],
    _phantom: PhantomData<(fn() -> T, D)>,
}

impl<'p, T, V: LiftLane<T>, D: Direction, const S: usize> Lifter<'p, T, V, D, S> {
    /// Whether the first sample read by an iteration is an even one.
    pub(crate) const U_EVEN: bool = D::SHIFT == 0;
    /// Whether the first sample finished by an iteration is an even one.
    pub(crate) const OUT_EVEN: bool = (D::SHIFT + 1 + S) % 2 == 0;

    /// `first` is sample `shift - 1`, unused for the inverse direction.
    pub(crate) fn new(plan: &'p LiftingPlan<V::Coeff, S>, first: V) -> Self {
        let mut l = [V::zero(); S];
        l[0] = D::load(plan, first, true);
        Lifter {
            plan,
            l,
            _phantom: PhantomData,
        }
    }

    #[inline(always)]
    fn shift(&mut self, v: V, t: &[V; S]) {
        self.l[0] = v;
        for s in 1..S {
            self.l[s] = t[s - 1];
        }
    }

    #[inline(always)]
    fn emit(&self, t: &[V; S]) -> (V, V) {
        (
            D::store(self.plan, t[S - 1], Self::OUT_EVEN),
            D::store(self.plan, t[S - 2], !Self::OUT_EVEN),
        )
    }

    /// One iteration away from the borders.
    #[inline(always)]
    pub(crate) fn core(&mut self, u: V, v: V) -> (V, V) {
        let u = D::load(self.plan, u, Self::U_EVEN);
        let v = D::load(self.plan, v, !Self::U_EVEN);
        let mut t = [V::zero(); S];
        t[0] = D::step(u, self.plan.steps[0], self.l[0], v);
        for s in 1..S {
            t[s] = D::step(self.l[s - 1], self.plan.steps[s], self.l[s], t[s - 1]);
        }
        self.shift(v, &t);
        self.emit(&t)
    }

    /// One iteration that may touch either border of a signal of `n` samples.
    ///
    /// Targets outside the signal are skipped, targets on the border take the
    /// single existing neighbour twice. Inputs past the end are ignored.
    #[inline]
    pub(crate) fn boundary(&mut self, k: usize, n: usize, u: V, v: V) -> (V, V) {
        let u = D::load(self.plan, u, Self::U_EVEN);
        let v = D::load(self.plan, v, !Self::U_EVEN);
        let base = (2 * k + D::SHIFT) as isize;
        let n = n as isize;
        let mut t = [V::zero(); S];
        for s in 0..S {
            let (target, left, right) = if s == 0 {
                (u, self.l[0], v)
            } else {
                (self.l[s - 1], self.l[s], t[s - 1])
            };
            let j = base - s as isize;
            let c = self.plan.steps[s];
            t[s] = if j < 0 || j >= n {
                target
            } else if j == 0 {
                D::step(target, c, right, right)
            } else if j == n - 1 {
                D::step(target, c, left, left)
            } else {
                D::step(target, c, left, right)
            };
        }
        self.shift(v, &t);
        self.emit(&t)
    }

    /// `U` core iterations evaluated step by step across the block.
    #[inline(always)]
    pub(crate) fn core_block<const U: usize>(
        &mut self,
        u: [V; U],
        v: [V; U],
    ) -> ([V; U], [V; U]) {
        let u: [V; U] = std::array::from_fn(|i| D::load(self.plan, u[i], Self::U_EVEN));
        let v: [V; U] = std::array::from_fn(|i| D::load(self.plan, v[i], !Self::U_EVEN));
        let mut t = [[V::zero(); U]; S];
        for s in 0..S {
            let c = self.plan.steps[s];
            for i in 0..U {
                let (target, left) = match (s, i) {
                    (0, 0) => (u[0], self.l[0]),
                    (0, _) => (u[i], v[i - 1]),
                    (_, 0) => (self.l[s - 1], self.l[s]),
                    (1, _) => (v[i - 1], t[0][i - 1]),
                    (_, _) => (t[s - 2][i - 1], t[s - 1][i - 1]),
                };
                let right = if s == 0 { v[i] } else { t[s - 1][i] };
                t[s][i] = D::step(target, c, left, right);
            }
        }
        self.l[0] = v[U - 1];
        for s in 1..S {
            self.l[s] = t[s - 1][U - 1];
        }
        (
            std::array::from_fn(|i| D::store(self.plan, t[S - 1][i], Self::OUT_EVEN)),
            std::array::from_fn(|i| D::store(self.plan, t[S - 2][i], !Self::OUT_EVEN)),
        )
    }
}

#[inline(always)]
pub(crate) fn get<T, V: LiftLane<T>>(buf: &[T], i: usize) -> V {
    V::load(&buf[i * V::LANES..])
}

#[inline(always)]
pub(crate) fn put<T, V: LiftLane<T>>(buf: &mut [T], i: usize, v: V) {
    v.store(&mut buf[i * V::LANES..])
}

/// Transforms `n` samples of `V::LANES` interleaved lines in place.
///
/// Sample `i` of lane `l` lives at `buf[i * V::LANES + l]`. The result is
/// interleaved: approximation at even positions, details at odd positions.
pub(crate) fn lift_line<T, V, D, const S: usize>(
    buf: &mut [T],
    n: usize,
    plan: &LiftingPlan<V::Coeff, S>,
    core: CoreVariant,
) where
    V: LiftLane<T>,
    D: Direction,
{
    assert!(
        buf.len() >= n * V::LANES,
        "Buffer of {} can't hold {n} samples of {} lanes",
        buf.len(),
        V::LANES
    );
    if n < GENERAL_MIN_LEN {
        lift_short::<T, V, D, S>(buf, n, plan);
        return;
    }
    let phases = Phases::new(n, D::SHIFT, S);
    let first = if D::SHIFT > 0 {
        get::<T, V>(buf, D::SHIFT - 1)
    } else {
        V::zero()
    };
    let mut lifter = Lifter::<T, V, D, S>::new(plan, first);

    for k in 0..phases.core_start {
        boundary_iteration(buf, n, &mut lifter, k);
    }
    run_core(core, buf, &mut lifter, phases.core_start..phases.core_end);
    for k in phases.core_end..=phases.last {
        boundary_iteration(buf, n, &mut lifter, k);
    }
}

#[inline]
fn boundary_iteration<T, V: LiftLane<T>, D: Direction, const S: usize>(
    buf: &mut [T],
    n: usize,
    lifter: &mut Lifter<'_, T, V, D, S>,
    k: usize,
) {
    let base = 2 * k + D::SHIFT;
    let fetch = |i: usize| if i < n { get::<T, V>(buf, i) } else { V::zero() };
    let (u, v) = (fetch(base), fetch(base + 1));
    let (a, b) = lifter.boundary(k, n, u, v);
    let j = (base + 1) as isize - S as isize;
    if j >= 0 && (j as usize) < n {
        put(buf, j as usize, a);
    }
    if j + 1 >= 0 && ((j + 1) as usize) < n {
        put(buf, (j + 1) as usize, b);
    }
}

/// Signals shorter than [`GENERAL_MIN_LEN`] run whole steps one after another.
///
/// A single sample is left untouched.
fn lift_short<T, V: LiftLane<T>, D: Direction, const S: usize>(
    buf: &mut [T],
    n: usize,
    plan: &LiftingPlan<V::Coeff, S>,
) {
    if n < 2 {
        return;
    }
    let mut x = [V::zero(); GENERAL_MIN_LEN - 1];
    for (i, dst) in x.iter_mut().enumerate().take(n) {
        *dst = D::load(plan, get::<T, V>(buf, i), i % 2 == 0);
    }
    for (s, &c) in plan.steps.iter().enumerate() {
        let mut i = (D::SHIFT + s) % 2;
        while i < n {
            let left = if i > 0 { x[i - 1] } else { x[i + 1] };
            let right = if i + 1 < n { x[i + 1] } else { x[i - 1] };
            x[i] = D::step(x[i], c, left, right);
            i += 2;
        }
    }
    for (i, &v) in x.iter().enumerate().take(n) {
        put(buf, i, D::store(plan, v, i % 2 == 0));
    }
}

/// Runs one direction of `family` over interleaved lanes, choosing the plan
/// width from the number of lifting steps.
pub(crate) fn lift_family<T, V: LiftLane<T>, D: Direction>(
    family: WaveletFamily,
    buf: &mut [T],
    n: usize,
    core: CoreVariant,
) {
    let coefficients = family.coefficients();
    match coefficients.steps.len() {
        4 => lift_line::<T, V, D, 4>(buf, n, &D::plan::<T, V, 4>(&coefficients), core),
        _ => lift_line::<T, V, D, 2>(buf, n, &D::plan::<T, V, 2>(&coefficients), core),
    }
}
