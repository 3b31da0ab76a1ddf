//! Bin regions in image coordinates.
//!
//! A [`Region`] is a fixed rectangle of the camera frame mapped to one
//! physical disposal bin. The kiosk's regions form an ordered [`RegionSet`]
//! whose order is the detection priority: when several regions change in the
//! same poll, the first one wins.
//!
//! Rectangles use half-open bounds: `x_min..x_max` by `y_min..y_max`.
//!
//! # Example
//!
//! ```
//! use binwatch::region::{Rect, RegionSet};
//!
//! let regions = RegionSet::new(
//!     vec![
//!         ("compost".to_string(), "0,90,290,450".parse().unwrap()),
//!         ("recycling".to_string(), Rect::new(100, 190, 290, 450).unwrap()),
//!     ],
//!     1000,
//!     1000,
//! )
//! .unwrap();
//!
//! assert_eq!(regions.len(), 2);
//! assert_eq!(regions.get(1).unwrap().bin_name(), "recycling");
//! ```

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Errors raised while building the region set.
///
/// All of these are startup failures: a degenerate or off-frame region
/// would make the motion ratio undefined.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegionError {
    /// Rectangle has zero or negative width or height.
    #[error("degenerate region {0}: bounds must satisfy min < max")]
    Degenerate(Rect),

    /// Rectangle extends past the frame.
    #[error("region {rect} lies outside the {width}x{height} frame")]
    OutOfBounds { rect: Rect, width: u32, height: u32 },

    /// Rectangle text could not be parsed.
    #[error("invalid region '{0}': expected x_min,x_max,y_min,y_max")]
    InvalidSyntax(String),

    /// A region was configured without a bin name.
    #[error("region {0} has an empty bin name")]
    EmptyBinName(Rect),

    /// No regions were configured.
    #[error("no bin regions configured")]
    Empty,
}

/// Axis-aligned rectangle with half-open bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rect {
    x_min: u32,
    x_max: u32,
    y_min: u32,
    y_max: u32,
}

impl Rect {
    /// Create a rectangle, rejecting empty extents.
    pub fn new(x_min: u32, x_max: u32, y_min: u32, y_max: u32) -> Result<Self, RegionError> {
        let rect = Self {
            x_min,
            x_max,
            y_min,
            y_max,
        };
        if x_min >= x_max || y_min >= y_max {
            return Err(RegionError::Degenerate(rect));
        }
        Ok(rect)
    }

    /// Rectangle covering a whole `width`x`height` frame.
    pub fn full_frame(width: u32, height: u32) -> Result<Self, RegionError> {
        Self::new(0, width, 0, height)
    }

    pub fn x_min(&self) -> u32 {
        self.x_min
    }

    pub fn x_max(&self) -> u32 {
        self.x_max
    }

    pub fn y_min(&self) -> u32 {
        self.y_min
    }

    pub fn y_max(&self) -> u32 {
        self.y_max
    }

    pub fn width(&self) -> u32 {
        self.x_max - self.x_min
    }

    pub fn height(&self) -> u32 {
        self.y_max - self.y_min
    }

    /// Pixel count of the rectangle. Never zero.
    pub fn area(&self) -> u64 {
        self.width() as u64 * self.height() as u64
    }

    /// Whether the pixel at `(x, y)` lies inside the rectangle.
    pub fn contains(&self, x: u32, y: u32) -> bool {
        (self.x_min..self.x_max).contains(&x) && (self.y_min..self.y_max).contains(&y)
    }

    /// Whether the rectangle fits entirely inside a `width`x`height` frame.
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.x_max <= width && self.y_max <= height
    }

    /// Whether two rectangles share at least one pixel.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x_min < other.x_max
            && other.x_min < self.x_max
            && self.y_min < other.y_max
            && other.y_min < self.y_max
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{}",
            self.x_min, self.x_max, self.y_min, self.y_max
        )
    }
}

impl FromStr for Rect {
    type Err = RegionError;

    /// Parses `x_min,x_max,y_min,y_max`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bounds = s
            .split(',')
            .map(|part| part.trim().parse::<u32>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| RegionError::InvalidSyntax(s.to_string()))?;

        match bounds.as_slice() {
            [x_min, x_max, y_min, y_max] => Rect::new(*x_min, *x_max, *y_min, *y_max),
            _ => Err(RegionError::InvalidSyntax(s.to_string())),
        }
    }
}

/// A rectangle of the frame mapped to one disposal bin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    id: usize,
    bin_name: String,
    rect: Rect,
}

impl Region {
    /// Create a standalone region (not part of a set).
    pub fn new(id: usize, bin_name: impl Into<String>, rect: Rect) -> Self {
        Self {
            id,
            bin_name: bin_name.into(),
            rect,
        }
    }

    /// Stable index of the region within its set.
    pub fn id(&self) -> usize {
        self.id
    }

    /// Name of the bin this region watches.
    pub fn bin_name(&self) -> &str {
        &self.bin_name
    }

    pub fn rect(&self) -> &Rect {
        &self.rect
    }

    /// Whether this region watches the named bin (case-insensitive).
    pub fn is_bin(&self, bin_name: &str) -> bool {
        self.bin_name.trim().eq_ignore_ascii_case(bin_name.trim())
    }
}

/// Ordered, validated collection of bin regions.
///
/// Region ids are their positions in the set, so `get(id)` is stable for
/// the lifetime of the set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionSet {
    regions: Vec<Region>,
    frame_width: u32,
    frame_height: u32,
}

impl RegionSet {
    /// Validate `(bin_name, rect)` pairs against the frame size.
    ///
    /// # Errors
    ///
    /// Returns an error if the list is empty, a bin name is blank, or a
    /// rectangle does not fit in the frame.
    pub fn new(
        entries: Vec<(String, Rect)>,
        frame_width: u32,
        frame_height: u32,
    ) -> Result<Self, RegionError> {
        if entries.is_empty() {
            return Err(RegionError::Empty);
        }

        let mut regions = Vec::with_capacity(entries.len());
        for (id, (bin_name, rect)) in entries.into_iter().enumerate() {
            if bin_name.trim().is_empty() {
                return Err(RegionError::EmptyBinName(rect));
            }
            if !rect.fits_within(frame_width, frame_height) {
                return Err(RegionError::OutOfBounds {
                    rect,
                    width: frame_width,
                    height: frame_height,
                });
            }
            regions.push(Region::new(id, bin_name.trim(), rect));
        }

        Ok(Self {
            regions,
            frame_width,
            frame_height,
        })
    }

    pub fn get(&self, id: usize) -> Option<&Region> {
        self.regions.get(id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Region> {
        self.regions.iter()
    }

    pub fn as_slice(&self) -> &[Region] {
        &self.regions
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Frame dimensions the set was validated against.
    pub fn frame_size(&self) -> (u32, u32) {
        (self.frame_width, self.frame_height)
    }

    /// Distinct bin names in region order.
    pub fn bin_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for region in &self.regions {
            if !names.iter().any(|n| n.eq_ignore_ascii_case(region.bin_name())) {
                names.push(region.bin_name());
            }
        }
        names
    }
}

impl<'a> IntoIterator for &'a RegionSet {
    type Item = &'a Region;
    type IntoIter = std::slice::Iter<'a, Region>;

    fn into_iter(self) -> Self::IntoIter {
        self.regions.iter()
    }
}
