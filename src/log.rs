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
//! Transform diagnostics. With the `logging` feature they reach the `log`
//! crate under the `liftlet` target; without it only the arguments are
//! borrowed so call sites compile the same way.

macro_rules! lift_log {
    ($level:ident, $fmt:literal $(, $arg:expr)* $(,)?) => {{
        #[cfg(feature = "logging")]
        if ::log::log_enabled!(target: "liftlet", ::log::Level::$level) {
            ::log::log!(target: "liftlet", ::log::Level::$level, $fmt $(, $arg)*);
        };
        #[cfg(not(feature = "logging"))]
        let _ = ($(&$arg,)*);
    }};
}

/// Per-transform events: level counts, decomposition shape.
macro_rules! ldebug {
    ($($t:tt)*) => {
        $crate::log::lift_log!(Debug, $($t)*)
    };
}

/// Per-pass events: selected pipelines, tile schedules, padding.
macro_rules! ltrace {
    ($($t:tt)*) => {
        $crate::log::lift_log!(Trace, $($t)*)
    };
}

pub(crate) use ldebug;
pub(crate) use lift_log;
pub(crate) use ltrace;
