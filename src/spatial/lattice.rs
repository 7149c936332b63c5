//! Tile lattice geometry
//!
//! A tiling places patch boxes at `offset + (row, col) * stride` where
//! `stride = patch_size + spacing`. Enumeration is row-major and every
//! downstream artifact (duplicate lists, table rows, atlas cells) relies on
//! that order.

use crate::io::error::{Result, invalid_parameter};
use crate::spatial::tiling::TilingConfig;
use serde::{Deserialize, Serialize};

/// Integer (row, col) place of a tile in a tiling's grid
///
/// Persisted as a `[row, col]` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "[i32; 2]", into = "[i32; 2]")]
pub struct LatticePos {
    /// Row index, counted from the tiling offset downwards
    pub row: i32,
    /// Column index, counted from the tiling offset rightwards
    pub col: i32,
}

impl LatticePos {
    /// Create a lattice position
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }
}

impl From<[i32; 2]> for LatticePos {
    fn from([row, col]: [i32; 2]) -> Self {
        Self { row, col }
    }
}

impl From<LatticePos> for [i32; 2] {
    fn from(pos: LatticePos) -> Self {
        [pos.row, pos.col]
    }
}

/// Axis-aligned pixel rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PixelRect {
    /// Left edge
    pub x: u32,
    /// Top edge
    pub y: u32,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl PixelRect {
    /// Create a rectangle from origin and size
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Exclusive right edge
    pub const fn right(&self) -> u64 {
        self.x as u64 + self.width as u64
    }

    /// Exclusive bottom edge
    pub const fn bottom(&self) -> u64 {
        self.y as u64 + self.height as u64
    }

    /// Covered pixel count
    pub const fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Overlapping part of two rectangles, if any
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        let left = u64::from(self.x.max(other.x));
        let top = u64::from(self.y.max(other.y));
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        (left < right && top < bottom).then(|| {
            Self::new(
                left as u32,
                top as u32,
                (right - left) as u32,
                (bottom - top) as u32,
            )
        })
    }
}

/// A validated tiling, ready for enumeration and coordinate mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileLattice {
    offset: [u32; 2],
    patch_size: [u32; 2],
    stride: [u32; 2],
    size_cap: [u32; 2],
}

impl TileLattice {
    /// Validate a tiling configuration
    ///
    /// # Errors
    ///
    /// Returns an invalid parameter error if:
    /// - a patch size component is below 1
    /// - an offset, spacing or size cap component is negative
    pub fn new(config: &TilingConfig) -> Result<Self> {
        let offset_x = non_negative("offset_x", config.offset_x)?;
        let offset_y = non_negative("offset_y", config.offset_y)?;
        let spacing_x = non_negative("spacing_x", config.spacing_x)?;
        let spacing_y = non_negative("spacing_y", config.spacing_y)?;
        let size_x = non_negative("size_x", config.size_x)?;
        let size_y = non_negative("size_y", config.size_y)?;
        let patch_x = positive("patch_size_x", config.patch_size_x)?;
        let patch_y = positive("patch_size_y", config.patch_size_y)?;

        let stride_x = patch_x
            .checked_add(spacing_x)
            .ok_or_else(|| invalid_parameter("spacing_x", &spacing_x, &"stride overflows"))?;
        let stride_y = patch_y
            .checked_add(spacing_y)
            .ok_or_else(|| invalid_parameter("spacing_y", &spacing_y, &"stride overflows"))?;

        Ok(Self {
            offset: [offset_x, offset_y],
            patch_size: [patch_x, patch_y],
            stride: [stride_x, stride_y],
            size_cap: [size_x, size_y],
        })
    }

    /// Distance between neighbouring tile origins as `[x, y]`
    pub const fn stride(&self) -> [u32; 2] {
        self.stride
    }

    /// Tile box size as `[x, y]`
    pub const fn patch_size(&self) -> [u32; 2] {
        self.patch_size
    }

    /// Number of (rows, cols) that fit into an image of the given size
    pub fn dimensions(&self, image_width: u32, image_height: u32) -> (u32, u32) {
        let [offset_x, offset_y] = self.offset;
        let [patch_x, patch_y] = self.patch_size;
        let [stride_x, stride_y] = self.stride;
        let [cap_x, cap_y] = self.size_cap;

        let rows = fitting_count(image_height, offset_y, patch_y, stride_y, cap_y);
        let cols = fitting_count(image_width, offset_x, patch_x, stride_x, cap_x);
        (rows, cols)
    }

    /// Pixel box of the tile at a lattice position
    ///
    /// Positions are not checked against an image; negative positions yield `None`.
    pub fn rect_at(&self, pos: LatticePos) -> Option<PixelRect> {
        let row = u32::try_from(pos.row).ok()?;
        let col = u32::try_from(pos.col).ok()?;
        let x = self.offset[0].checked_add(col.checked_mul(self.stride[0])?)?;
        let y = self.offset[1].checked_add(row.checked_mul(self.stride[1])?)?;
        Some(PixelRect::new(x, y, self.patch_size[0], self.patch_size[1]))
    }

    /// All tiles fully inside the image, in row-major order
    pub fn enumerate(&self, image_width: u32, image_height: u32) -> Vec<(PixelRect, LatticePos)> {
        let (rows, cols) = self.dimensions(image_width, image_height);
        let mut tiles = Vec::with_capacity(rows as usize * cols as usize);

        for row in 0..rows {
            for col in 0..cols {
                let pos = LatticePos::new(row as i32, col as i32);
                if let Some(rect) = self.rect_at(pos) {
                    tiles.push((rect, pos));
                }
            }
        }

        tiles
    }

    /// Lattice position containing a pixel
    ///
    /// Floor division, so pixels above or left of the offset map to negative
    /// rows/cols. Exact inverse of [`Self::rect_at`] on tile origins.
    pub fn to_lattice_pos(&self, pixel_y: i64, pixel_x: i64) -> LatticePos {
        let row = (pixel_y - i64::from(self.offset[1])).div_euclid(i64::from(self.stride[1]));
        let col = (pixel_x - i64::from(self.offset[0])).div_euclid(i64::from(self.stride[0]));
        LatticePos::new(
            row.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32,
            col.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32,
        )
    }

    /// Part of a viewport not covered by the stride cell of any tile of the image
    ///
    /// A stride cell spans a tile box plus its trailing spacing, so spacing
    /// between tiles counts as covered. Returned as disjoint rectangles, built
    /// band by band from top to bottom and left to right within each band.
    pub fn outside_region(
        &self,
        image_width: u32,
        image_height: u32,
        viewport: PixelRect,
    ) -> Vec<PixelRect> {
        if viewport.area() == 0 {
            return Vec::new();
        }

        let covered: Vec<PixelRect> = self
            .cells_in_view(image_width, image_height, viewport)
            .filter_map(|rect| rect.intersection(&viewport))
            .collect();

        let mut edges: Vec<u64> = vec![u64::from(viewport.y), viewport.bottom()];
        for rect in &covered {
            edges.push(u64::from(rect.y));
            edges.push(rect.bottom());
        }
        edges.sort_unstable();
        edges.dedup();

        let mut region = Vec::new();
        for band in edges.windows(2) {
            let (Some(&top), Some(&bottom)) = (band.first(), band.get(1)) else {
                continue;
            };

            let mut spans: Vec<(u64, u64)> = covered
                .iter()
                .filter(|rect| u64::from(rect.y) <= top && rect.bottom() >= bottom)
                .map(|rect| (u64::from(rect.x), rect.right()))
                .collect();
            spans.sort_unstable();

            let mut cursor = u64::from(viewport.x);
            for (start, end) in spans {
                if start > cursor {
                    region.push(band_rect(cursor, start, top, bottom));
                }
                cursor = cursor.max(end);
            }
            if cursor < viewport.right() {
                region.push(band_rect(cursor, viewport.right(), top, bottom));
            }
        }

        region
    }

    // Stride cells of the lattice rows/cols that can touch the viewport
    fn cells_in_view(
        &self,
        image_width: u32,
        image_height: u32,
        viewport: PixelRect,
    ) -> impl Iterator<Item = PixelRect> + '_ {
        let (rows, cols) = self.dimensions(image_width, image_height);
        let first = self.to_lattice_pos(i64::from(viewport.y), i64::from(viewport.x));
        let last = self.to_lattice_pos(viewport.bottom() as i64, viewport.right() as i64);

        let row_range = first.row.max(0)..=last.row.min(rows as i32 - 1);
        let col_range = first.col.max(0)..=last.col.min(cols as i32 - 1);

        let [stride_x, stride_y] = self.stride;
        row_range.flat_map(move |row| {
            col_range.clone().filter_map(move |col| {
                self.rect_at(LatticePos::new(row, col))
                    .map(|rect| PixelRect::new(rect.x, rect.y, stride_x, stride_y))
            })
        })
    }
}

fn band_rect(left: u64, right: u64, top: u64, bottom: u64) -> PixelRect {
    PixelRect::new(
        left as u32,
        top as u32,
        (right - left) as u32,
        (bottom - top) as u32,
    )
}

// Count of k >= 0 with offset + k * stride + patch <= extent, truncated by a non-zero cap
fn fitting_count(extent: u32, offset: u32, patch: u32, stride: u32, cap: u32) -> u32 {
    let needed = u64::from(offset) + u64::from(patch);
    let extent = u64::from(extent);
    if needed > extent {
        return 0;
    }

    let count = (extent - needed) / u64::from(stride) + 1;
    let count = u32::try_from(count).unwrap_or(u32::MAX);
    if cap > 0 { count.min(cap) } else { count }
}

fn non_negative(parameter: &'static str, value: i32) -> Result<u32> {
    u32::try_from(value)
        .ok()
        .ok_or_else(|| invalid_parameter(parameter, &value, &"must not be negative"))
}

fn positive(parameter: &'static str, value: i32) -> Result<u32> {
    match u32::try_from(value) {
        Ok(v) if v >= 1 => Ok(v),
        _ => Err(invalid_parameter(parameter, &value, &"must be at least 1")),
    }
}
