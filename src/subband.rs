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
use crate::dwt2d::Extent;
use crate::err::LiftletError;
use crate::strided::StridedImage;
use crate::util::ceil_log2;
use std::fmt::{Display, Formatter};

/// Quadrant of one decomposition level.
///
/// The first letter is the horizontal filter, the second the vertical one.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub enum Band {
    LL,
    HL,
    LH,
    HH,
}

impl Band {
    pub const ALL: [Band; 4] = [Band::LL, Band::HL, Band::LH, Band::HH];

    #[inline]
    fn high_x(self) -> bool {
        matches!(self, Band::HL | Band::HH)
    }

    #[inline]
    fn high_y(self) -> bool {
        matches!(self, Band::LH | Band::HH)
    }
}

impl Display for Band {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Band::LL => f.write_str("LL"),
            Band::HL => f.write_str("HL"),
            Band::LH => f.write_str("LH"),
            Band::HH => f.write_str("HH"),
        }
    }
}

/// Position and size of a band inside the transformed buffer.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct SubbandGeometry {
    /// First column.
    pub x: usize,
    /// First row.
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

/// Locates `band` of decomposition level `level` (1 is the first level).
///
/// Offsets follow the outer extents, sizes follow the active extents.
pub fn subband_extents(
    outer: Extent,
    active: Extent,
    level: usize,
    band: Band,
) -> Result<SubbandGeometry, LiftletError> {
    if active.is_empty() {
        return Err(LiftletError::EmptyExtent(active.width, active.height));
    }
    if active.width > outer.width || active.height > outer.height {
        return Err(LiftletError::ActiveExceedsOuter(
            active.width,
            active.height,
            outer.width,
            outer.height,
        ));
    }
    let max_level = ceil_log2(outer.width.max(outer.height)).max(1);
    if level == 0 || level > max_level {
        return Err(LiftletError::LevelOutOfRange(level, max_level));
    }

    let outer = outer.ceil_level(level - 1);
    let active = active.ceil_level(level - 1);
    let (x, width) = if band.high_x() {
        (outer.width.div_ceil(2), active.width / 2)
    } else {
        (0, active.width.div_ceil(2))
    };
    let (y, height) = if band.high_y() {
        (outer.height.div_ceil(2), active.height / 2)
    } else {
        (0, active.height.div_ceil(2))
    };
    Ok(SubbandGeometry {
        x,
        y,
        width,
        height,
    })
}

/// Read-only view of one band of a transformed image.
pub struct Subband<'v, 'a, T> {
    image: &'v StridedImage<'a, T>,
    geometry: SubbandGeometry,
    band: Band,
}

impl<'a, T: Copy> StridedImage<'a, T> {
    /// View of `band` at `level` of an image transformed with the given
    /// outer and active extents.
    pub fn subband(
        &self,
        outer: Extent,
        active: Extent,
        level: usize,
        band: Band,
    ) -> Result<Subband<'_, 'a, T>, LiftletError> {
        if outer.width > self.width() || outer.height > self.height() {
            return Err(LiftletError::OuterExceedsView(
                outer.width,
                outer.height,
                self.width(),
                self.height(),
            ));
        }
        let geometry = subband_extents(outer, active, level, band)?;
        Ok(Subband {
            image: self,
            geometry,
            band,
        })
    }
}

impl<T: Copy> Subband<'_, '_, T> {
    pub fn band(&self) -> Band {
        self.band
    }

    pub fn geometry(&self) -> SubbandGeometry {
        self.geometry
    }

    /// `(row, column)` of the band's first sample in the image.
    pub fn origin(&self) -> (usize, usize) {
        (self.geometry.y, self.geometry.x)
    }

    pub fn width(&self) -> usize {
        self.geometry.width
    }

    pub fn height(&self) -> usize {
        self.geometry.height
    }

    pub fn is_empty(&self) -> bool {
        self.geometry.width == 0 || self.geometry.height == 0
    }

    /// Sample at row `y`, column `x` of the band.
    pub fn get(&self, y: usize, x: usize) -> T {
        assert!(
            y < self.geometry.height && x < self.geometry.width,
            "Coordinates ({y}, {x}) are out of {} band {}x{}",
            self.band,
            self.geometry.width,
            self.geometry.height
        );
        self.image.get(self.geometry.y + y, self.geometry.x + x)
    }

    pub fn row(&self, y: usize) -> impl Iterator<Item = T> + '_ {
        (0..self.geometry.width).map(move |x| self.get(y, x))
    }

    pub fn rows(&self) -> impl Iterator<Item = impl Iterator<Item = T> + '_> + '_ {
        (0..self.geometry.height).map(move |y| self.row(y))
    }

    /// Copies the band into a packed row-major vector.
    pub fn to_vec(&self) -> Vec<T> {
        self.rows().flatten().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quadrants() {
        let outer = Extent::new(16, 12);
        let active = Extent::new(13, 11);
        let ll = subband_extents(outer, active, 1, Band::LL).unwrap();
        let hl = subband_extents(outer, active, 1, Band::HL).unwrap();
        let lh = subband_extents(outer, active, 1, Band::LH).unwrap();
        let hh = subband_extents(outer, active, 1, Band::HH).unwrap();
        assert_eq!(ll, SubbandGeometry { x: 0, y: 0, width: 7, height: 6 });
        assert_eq!(hl, SubbandGeometry { x: 8, y: 0, width: 6, height: 6 });
        assert_eq!(lh, SubbandGeometry { x: 0, y: 6, width: 7, height: 5 });
        assert_eq!(hh, SubbandGeometry { x: 8, y: 6, width: 6, height: 5 });
        let ll2 = subband_extents(outer, active, 2, Band::HH).unwrap();
        assert_eq!(ll2, SubbandGeometry { x: 4, y: 3, width: 3, height: 3 });
    }

    #[test]
    fn test_bands_tile_every_level() {
        for (w, h) in [(512, 512), (37, 20), (1, 9), (64, 3)] {
            let extent = Extent::new(w, h);
            let max_level = ceil_log2(w.max(h)).max(1);
            let mut parent = w * h;
            for level in 1..=max_level {
                let bands: Vec<SubbandGeometry> = Band::ALL
                    .iter()
                    .map(|&b| subband_extents(extent, extent, level, b).unwrap())
                    .collect();
                let area: usize = bands.iter().map(|g| g.width * g.height).sum();
                assert_eq!(area, parent, "{w}x{h} level {level}");
                // The next level lives inside this level's LL quadrant.
                let ll = bands[0];
                if level < max_level {
                    for band in Band::ALL {
                        let g = subband_extents(extent, extent, level + 1, band).unwrap();
                        assert!(g.x + g.width <= ll.width && g.y + g.height <= ll.height);
                    }
                }
                assert_eq!(
                    subband_extents(extent, extent, level, Band::HL).unwrap(),
                    bands[1]
                );
                parent = ll.width * ll.height;
            }
        }
    }

    #[test]
    fn test_level_range() {
        let e = Extent::new(8, 8);
        assert_eq!(
            subband_extents(e, e, 0, Band::LL),
            Err(LiftletError::LevelOutOfRange(0, 3))
        );
        assert_eq!(
            subband_extents(e, e, 4, Band::LL),
            Err(LiftletError::LevelOutOfRange(4, 3))
        );
    }

    #[test]
    fn test_view_reads_quadrant() {
        let mut data: Vec<i32> = (0..64).collect();
        let image = StridedImage::packed(&mut data, 8, 8).unwrap();
        let e = Extent::new(8, 8);
        let hh = image.subband(e, e, 1, Band::HH).unwrap();
        assert_eq!(hh.origin(), (4, 4));
        assert_eq!(hh.get(0, 0), 36);
        assert_eq!(hh.row(1).collect::<Vec<_>>(), vec![44, 45, 46, 47]);
        assert_eq!(hh.to_vec().len(), 16);
        let ll3 = image.subband(e, e, 3, Band::LL).unwrap();
        assert_eq!(ll3.to_vec(), vec![0]);
    }
}
