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
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LiftletError {
    OutOfMemory(usize),
    ZeroStride,
    StrideNotAligned(isize, usize),
    OverlappingStrides(isize, isize),
    OutOfBounds(isize, usize),
    EmptyExtent(usize, usize),
    ActiveExceedsOuter(usize, usize, usize, usize),
    OuterExceedsView(usize, usize, usize, usize),
    InvalidWorkerCount(usize),
    WorkersMismatch(usize, usize),
    InvalidThreadCount,
    ThreadPoolCreation(String),
    UnknownAcceleration(i32),
    UnsupportedAcceleration(Acceleration),
    OffloadUnavailable,
    InOutSizesMismatch(usize, usize),
    ApproxSizeNotMatches(usize, usize),
    DetailsSizeNotMatches(usize, usize),
    WeightsMismatch(usize, usize),
    MissingWeightsLevel(usize),
    LevelOutOfRange(usize, usize),
}

impl Error for LiftletError {}

impl std::fmt::Display for LiftletError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            LiftletError::OutOfMemory(length) => {
                f.write_fmt(format_args!("Cannot allocate {length} bytes to vector",))
            }
            LiftletError::ZeroStride => f.write_str("Strides must not be zero"),
            LiftletError::StrideNotAligned(stride, size) => f.write_fmt(format_args!(
                "Stride {stride} bytes is not a multiple of element size {size}"
            )),
            LiftletError::OverlappingStrides(stride_x, stride_y) => f.write_fmt(format_args!(
                "Strides {stride_x}x{stride_y} address the same element from different coordinates"
            )),
            LiftletError::OutOfBounds(index, length) => f.write_fmt(format_args!(
                "View reaches element {index}, but buffer length is {length}"
            )),
            LiftletError::EmptyExtent(width, height) => f.write_fmt(format_args!(
                "Extents must be non zero, but they were {width}x{height}"
            )),
            LiftletError::ActiveExceedsOuter(aw, ah, ow, oh) => f.write_fmt(format_args!(
                "Active extent {aw}x{ah} exceeds outer extent {ow}x{oh}"
            )),
            LiftletError::OuterExceedsView(ow, oh, vw, vh) => f.write_fmt(format_args!(
                "Outer extent {ow}x{oh} exceeds image view {vw}x{vh}"
            )),
            LiftletError::InvalidWorkerCount(workers) => f.write_fmt(format_args!(
                "Worker count must be 1 or 4, but it was {workers}"
            )),
            LiftletError::WorkersMismatch(required, configured) => f.write_fmt(format_args!(
                "Selected acceleration requires {required} workers, but {configured} configured"
            )),
            LiftletError::InvalidThreadCount => f.write_str("Thread count must be at least one"),
            LiftletError::ThreadPoolCreation(reason) => {
                f.write_fmt(format_args!("Cannot create thread pool: {reason}"))
            }
            LiftletError::UnknownAcceleration(id) => {
                f.write_fmt(format_args!("Unknown acceleration id {id}"))
            }
            LiftletError::UnsupportedAcceleration(acceleration) => f.write_fmt(format_args!(
                "{acceleration} acceleration is not supported by edge-adaptive lifting"
            )),
            LiftletError::OffloadUnavailable => {
                f.write_str("Offload acceleration requires a registered f32 backend")
            }
            LiftletError::InOutSizesMismatch(input_size, output_size) => f.write_fmt(
                format_args!("Input size {input_size} does not match output size {output_size}"),
            ),
            LiftletError::ApproxSizeNotMatches(current_size, required_size) => {
                f.write_fmt(format_args!(
                    "Approximate size {current_size} does not match required size {required_size}"
                ))
            }
            LiftletError::DetailsSizeNotMatches(current_size, required_size) => {
                f.write_fmt(format_args!(
                    "Details size {current_size} does not match required size {required_size}"
                ))
            }
            LiftletError::WeightsMismatch(current_size, required_size) => f.write_fmt(
                format_args!("Weights size {current_size} does not match required size {required_size}"),
            ),
            LiftletError::MissingWeightsLevel(level) => {
                f.write_fmt(format_args!("No edge weights were recorded for level {level}"))
            }
            LiftletError::LevelOutOfRange(level, max_level) => f.write_fmt(format_args!(
                "Level {level} is out of range 1..={max_level}"
            )),
        }
    }
}

macro_rules! try_vec {
    () => {
        Vec::new()
    };
    ($elem:expr; $n:expr) => {{
        let mut v = Vec::new();
        v.try_reserve_exact($n)
            .map_err(|_| crate::err::LiftletError::OutOfMemory($n))?;
        v.resize($n, $elem);
        v
    }};
}

use crate::dispatch::Acceleration;
use std::error::Error;
use std::fmt::Formatter;
pub(crate) use try_vec;
