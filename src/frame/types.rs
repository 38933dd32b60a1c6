//! Common types for the frame module

use std::fmt;

/// Half-open axis-aligned rectangle `[min_x, max_x) x [min_y, max_y)`.
///
/// Coordinates are signed so that margin expansion can step outside the
/// image before [`Frame::intersect`] clamps it back to the image bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Frame {
    pub min_x: i64,
    pub min_y: i64,
    pub max_x: i64,
    pub max_y: i64,
}

impl Frame {
    /// The canonical empty rectangle at the origin
    pub const EMPTY: Frame = Frame {
        min_x: 0,
        min_y: 0,
        max_x: 0,
        max_y: 0,
    };

    /// Create a frame from its corners
    pub const fn new(min_x: i64, min_y: i64, max_x: i64, max_y: i64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Full bounds of a `width` x `height` image
    pub const fn from_dimensions(width: u32, height: u32) -> Self {
        Self::new(0, 0, width as i64, height as i64)
    }

    /// Zero-area frame sitting at the center of `self`
    pub fn collapsed_to_center(&self) -> Self {
        let cx = self.min_x + (self.max_x - self.min_x) / 2;
        let cy = self.min_y + (self.max_y - self.min_y) / 2;
        Self::new(cx, cy, cx, cy)
    }

    pub fn width(&self) -> u32 {
        u32::try_from((self.max_x - self.min_x).max(0)).unwrap_or(u32::MAX)
    }

    pub fn height(&self) -> u32 {
        u32::try_from((self.max_y - self.min_y).max(0)).unwrap_or(u32::MAX)
    }

    /// Width and height as a tuple
    pub fn size(&self) -> (u32, u32) {
        (self.width(), self.height())
    }

    pub fn is_empty(&self) -> bool {
        self.min_x >= self.max_x || self.min_y >= self.max_y
    }

    /// Grow the frame by `margin` pixels on every side
    #[must_use]
    pub fn expand(&self, margin: u32) -> Self {
        let m = i64::from(margin);
        Self::new(
            self.min_x - m,
            self.min_y - m,
            self.max_x + m,
            self.max_y + m,
        )
    }

    /// Largest frame contained by both `self` and `other`.
    ///
    /// An empty intersection is normalized to [`Frame::EMPTY`].
    #[must_use]
    pub fn intersect(&self, other: &Frame) -> Self {
        let result = Self::new(
            self.min_x.max(other.min_x),
            self.min_y.max(other.min_y),
            self.max_x.min(other.max_x),
            self.max_y.min(other.max_y),
        );
        if result.is_empty() {
            Self::EMPTY
        } else {
            result
        }
    }

    /// Whether `other` lies within `self`. Empty frames are contained everywhere.
    pub fn contains_frame(&self, other: &Frame) -> bool {
        other.is_empty()
            || (self.min_x <= other.min_x
                && self.min_y <= other.min_y
                && other.max_x <= self.max_x
                && other.max_y <= self.max_y)
    }

    /// Edge coordinate for one side
    pub fn edge(&self, edge: Edge) -> i64 {
        match edge {
            Edge::Top => self.min_y,
            Edge::Bottom => self.max_y,
            Edge::Left => self.min_x,
            Edge::Right => self.max_x,
        }
    }

    pub(crate) fn set_edge(&mut self, edge: Edge, value: i64) {
        match edge {
            Edge::Top => self.min_y = value,
            Edge::Bottom => self.max_y = value,
            Edge::Left => self.min_x = value,
            Edge::Right => self.max_x = value,
        }
    }

    /// Distance between each side of `self` and the matching side of `outer`
    pub fn inset_from(&self, outer: &Frame) -> Margins {
        if self.is_empty() {
            return Margins {
                top: outer.height(),
                bottom: 0,
                left: outer.width(),
                right: 0,
            };
        }
        let gap = |d: i64| u32::try_from(d.max(0)).unwrap_or(u32::MAX);
        Margins {
            top: gap(self.min_y - outer.min_y),
            bottom: gap(outer.max_y - self.max_y),
            left: gap(self.min_x - outer.min_x),
            right: gap(outer.max_x - self.max_x),
        }
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({},{})-({},{})",
            self.min_x, self.min_y, self.max_x, self.max_y
        )
    }
}

/// Image edge, in scan order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edge {
    Top,
    Bottom,
    Left,
    Right,
}

impl Edge {
    /// All edges in the order they are scanned
    pub fn all() -> [Edge; 4] {
        [Edge::Top, Edge::Bottom, Edge::Left, Edge::Right]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Edge::Top => "top",
            Edge::Bottom => "bottom",
            Edge::Left => "left",
            Edge::Right => "right",
        }
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Pixels removed from each side of an image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Margins {
    pub top: u32,
    pub bottom: u32,
    pub left: u32,
    pub right: u32,
}

impl Margins {
    /// Same value on all four sides
    pub fn uniform(value: u32) -> Self {
        Self {
            top: value,
            bottom: value,
            left: value,
            right: value,
        }
    }

    pub fn total_horizontal(&self) -> u32 {
        self.left + self.right
    }

    pub fn total_vertical(&self) -> u32 {
        self.top + self.bottom
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }
}

impl fmt::Display for Margins {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "top={} bottom={} left={} right={}",
            self.top, self.bottom, self.left, self.right
        )
    }
}

/// Result of a frame detection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameDetection {
    /// Source image dimensions
    pub image_size: (u32, u32),
    /// Control color as 16-bit-per-channel RGB
    pub control: [u32; 3],
    /// Region holding non-border content, before margin
    pub content: Frame,
    /// Content expanded by the margin and clamped to the image
    pub frame: Frame,
    /// True when every pixel matched the control color
    pub blank: bool,
}

impl FrameDetection {
    /// Full bounds of the source image
    pub fn bounds(&self) -> Frame {
        Frame::from_dimensions(self.image_size.0, self.image_size.1)
    }

    /// Dimensions of the cropped output
    pub fn output_size(&self) -> (u32, u32) {
        self.frame.size()
    }

    /// Pixels trimmed from each side of the source
    pub fn trimmed(&self) -> Margins {
        self.frame.inset_from(&self.bounds())
    }

    /// Whether cropping would return the whole image
    pub fn is_full_image(&self) -> bool {
        self.frame == self.bounds()
    }
}
