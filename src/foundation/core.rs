use crate::foundation::error::{AttackError, AttackResult};

/// Half-extent of a median window along each spatial axis.
///
/// A bandwidth of `(rows, cols)` covers `2 * rows + 1` rows and `2 * cols + 1` columns before
/// clipping to the image border.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct Bandwidth {
    /// Half-height of the window.
    pub rows: usize,
    /// Half-width of the window.
    pub cols: usize,
}

impl Bandwidth {
    /// Create a bandwidth from half-height and half-width.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    /// Window centred on `(row, col)`, clipped to a `height x width` grid.
    pub fn window_at(self, row: usize, col: usize, height: usize, width: usize) -> WindowBounds {
        WindowBounds {
            row_start: row.saturating_sub(self.rows),
            row_end: row.saturating_add(self.rows).saturating_add(1).min(height),
            col_start: col.saturating_sub(self.cols),
            col_end: col.saturating_add(self.cols).saturating_add(1).min(width),
        }
    }
}

/// Rectangular index range into a row-major grid. End bounds are exclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WindowBounds {
    /// First row (inclusive).
    pub row_start: usize,
    /// Last row (exclusive).
    pub row_end: usize,
    /// First column (inclusive).
    pub col_start: usize,
    /// Last column (exclusive).
    pub col_end: usize,
}

impl WindowBounds {
    /// Number of rows covered.
    pub fn height(self) -> usize {
        self.row_end.saturating_sub(self.row_start)
    }

    /// Number of columns covered.
    pub fn width(self) -> usize {
        self.col_end.saturating_sub(self.col_start)
    }

    /// Number of cells covered.
    pub fn len(self) -> usize {
        self.height() * self.width()
    }

    /// Return `true` when the window covers no cells.
    pub fn is_empty(self) -> bool {
        self.len() == 0
    }

    /// Return `true` when the absolute coordinate lies inside the window.
    pub fn contains(self, row: usize, col: usize) -> bool {
        (self.row_start..self.row_end).contains(&row) && (self.col_start..self.col_end).contains(&col)
    }

    /// Map a window-local coordinate back to the enclosing grid.
    pub fn to_absolute(self, local_row: usize, local_col: usize) -> (usize, usize) {
        (self.row_start + local_row, self.col_start + local_col)
    }

    /// Absolute coordinates of every cell, in row-major scan order.
    pub fn cells(self) -> impl Iterator<Item = (usize, usize)> {
        (self.row_start..self.row_end)
            .flat_map(move |r| (self.col_start..self.col_end).map(move |c| (r, c)))
    }
}

/// A single 8-bit channel, row-major and tightly packed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Plane {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl Plane {
    /// Wrap a row-major buffer of `width * height` intensities.
    pub fn new(width: usize, height: usize, data: Vec<u8>) -> AttackResult<Self> {
        let expected = checked_area(width, height)?;
        if data.len() != expected {
            return Err(AttackError::image(format!(
                "plane buffer holds {} values, expected {width}x{height} = {expected}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// A plane where every pixel has the same intensity.
    pub fn filled(width: usize, height: usize, value: u8) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }

    /// Build a plane by evaluating `f(row, col)` for every pixel.
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> u8) -> Self {
        let mut data = Vec::with_capacity(width * height);
        for r in 0..height {
            for c in 0..width {
                data.push(f(r, c));
            }
        }
        Self {
            width,
            height,
            data,
        }
    }

    /// Width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Intensity at `(row, col)`.
    ///
    /// Panics when the coordinate is outside the plane.
    pub fn get(&self, row: usize, col: usize) -> u8 {
        self.data[row * self.width + col]
    }

    /// Overwrite the intensity at `(row, col)`.
    ///
    /// Panics when the coordinate is outside the plane.
    pub fn set(&mut self, row: usize, col: usize, value: u8) {
        self.data[row * self.width + col] = value;
    }

    /// Row-major pixel data.
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Consume the plane and return its row-major buffer.
    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }
}

/// An 8-bit image with one or more interleaved channels.
///
/// One channel corresponds to a grayscale (2D) image; three or four channels to colour images.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttackImage {
    width: usize,
    height: usize,
    channels: usize,
    data: Vec<u8>,
}

impl AttackImage {
    /// Wrap an interleaved row-major buffer (`height * width * channels` bytes).
    pub fn new(width: usize, height: usize, channels: usize, data: Vec<u8>) -> AttackResult<Self> {
        if channels == 0 {
            return Err(AttackError::image("image must have at least one channel"));
        }
        let expected = checked_area(width, height)?
            .checked_mul(channels)
            .ok_or_else(|| AttackError::image("image buffer size overflow"))?;
        if data.len() != expected {
            return Err(AttackError::image(format!(
                "image buffer holds {} values, expected {width}x{height}x{channels} = {expected}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            channels,
            data,
        })
    }

    /// A single-channel image backed by `plane`.
    pub fn gray(plane: Plane) -> Self {
        Self {
            width: plane.width,
            height: plane.height,
            channels: 1,
            data: plane.data,
        }
    }

    /// Interleave equally sized planes into one image.
    pub fn from_planes(mut planes: Vec<Plane>) -> AttackResult<Self> {
        let Some(first) = planes.first() else {
            return Err(AttackError::image("cannot assemble an image from zero planes"));
        };
        let (width, height) = (first.width, first.height);
        if planes.iter().any(|p| p.width != width || p.height != height) {
            return Err(AttackError::image("all planes must share the same dimensions"));
        }
        if planes.len() == 1 {
            return Ok(Self::gray(planes.remove(0)));
        }

        let channels = planes.len();
        let mut data = vec![0u8; width * height * channels];
        for (ch, plane) in planes.iter().enumerate() {
            for (px, &v) in plane.data.iter().enumerate() {
                data[px * channels + ch] = v;
            }
        }
        Ok(Self {
            width,
            height,
            channels,
            data,
        })
    }

    /// Width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of interleaved channels.
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Interleaved row-major pixel data.
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Copy channel `ch` out into its own plane.
    pub fn plane(&self, ch: usize) -> AttackResult<Plane> {
        if ch >= self.channels {
            return Err(AttackError::validation(format!(
                "channel {ch} out of range for {}-channel image",
                self.channels
            )));
        }
        Ok(self.extract(ch))
    }

    /// Split the image into one plane per channel.
    pub fn planes(&self) -> Vec<Plane> {
        (0..self.channels).map(|ch| self.extract(ch)).collect()
    }

    fn extract(&self, ch: usize) -> Plane {
        Plane {
            width: self.width,
            height: self.height,
            data: self
                .data
                .iter()
                .skip(ch)
                .step_by(self.channels)
                .copied()
                .collect(),
        }
    }
}

/// Boolean grid marking attacker-controlled pixels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TargetMask {
    width: usize,
    height: usize,
    bits: Vec<bool>,
}

impl TargetMask {
    /// Wrap a row-major boolean buffer.
    pub fn new(width: usize, height: usize, bits: Vec<bool>) -> AttackResult<Self> {
        let expected = checked_area(width, height)?;
        if bits.len() != expected {
            return Err(AttackError::validation(format!(
                "mask holds {} entries, expected {width}x{height} = {expected}",
                bits.len()
            )));
        }
        Ok(Self {
            width,
            height,
            bits,
        })
    }

    /// A mask with nothing marked.
    pub fn empty(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            bits: vec![false; width * height],
        }
    }

    /// Build a mask by evaluating `f(row, col)` for every pixel.
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> bool) -> Self {
        let mut bits = Vec::with_capacity(width * height);
        for r in 0..height {
            for c in 0..width {
                bits.push(f(r, c));
            }
        }
        Self {
            width,
            height,
            bits,
        }
    }

    /// Normalise a marker plane into a mask: every pixel that differs from `unmarked` is marked.
    ///
    /// The reference detector paints untouched pixels white, so `unmarked` is usually `255`.
    pub fn from_marker_plane(plane: &Plane, unmarked: u8) -> Self {
        Self {
            width: plane.width,
            height: plane.height,
            bits: plane.data.iter().map(|&v| v != unmarked).collect(),
        }
    }

    /// Width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Return `true` when `(row, col)` is marked.
    ///
    /// Panics when the coordinate is outside the mask.
    pub fn is_marked(&self, row: usize, col: usize) -> bool {
        self.bits[row * self.width + col]
    }

    /// Mark or unmark `(row, col)`.
    pub fn set(&mut self, row: usize, col: usize, marked: bool) {
        self.bits[row * self.width + col] = marked;
    }

    /// Number of marked pixels.
    pub fn marked_count(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }

    /// Marked coordinates in row-major order.
    pub fn marked_positions(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let width = self.width.max(1);
        self.bits
            .iter()
            .enumerate()
            .filter(|(_, b)| **b)
            .map(move |(i, _)| (i / width, i % width))
    }

    pub(crate) fn as_slice(&self) -> &[bool] {
        &self.bits
    }

    /// Fail unless the mask covers exactly a `width x height` grid.
    pub fn ensure_shape(&self, width: usize, height: usize) -> AttackResult<()> {
        if self.width != width || self.height != height {
            return Err(AttackError::validation(format!(
                "mask is {}x{} but image is {width}x{height}",
                self.width, self.height
            )));
        }
        Ok(())
    }
}

fn checked_area(width: usize, height: usize) -> AttackResult<usize> {
    width
        .checked_mul(height)
        .ok_or_else(|| AttackError::image("pixel count overflow"))
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
