// THEORY:
// `Point` and `Rect` are the geometric vocabulary of the region selector. Pointer
// coordinates arrive in window space and may run negative (or past the frame edge)
// when the user drags outside the window, so positions are signed. Sizes are never
// negative: a rectangle is always described by its top-left corner and an unsigned
// extent, no matter which direction the user dragged in.
//
// "No region selected" is modelled as `Option<Rect>::None` by the callers. A `Rect`
// itself may be degenerate (zero width or height) while a drag is in progress; the
// selector decides when a degenerate rectangle collapses to `None`.

/// A 2D integer position in window/frame pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle with a signed origin and a non-negative size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    /// Left edge, in pixels.
    pub x: i32,
    /// Top edge, in pixels.
    pub y: i32,
    /// Horizontal extent, in pixels.
    pub width: u32,
    /// Vertical extent, in pixels.
    pub height: u32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The normalized rectangle spanning two corner points.
    ///
    /// The origin is the component-wise minimum of the two points and the size is
    /// the absolute distance between them, so `spanning(a, b) == spanning(b, a)`.
    pub fn spanning(p0: Point, p1: Point) -> Self {
        Self {
            x: p0.x.min(p1.x),
            y: p0.y.min(p1.y),
            width: p0.x.abs_diff(p1.x),
            height: p0.y.abs_diff(p1.y),
        }
    }

    /// A rectangle with zero width or height covers no pixels.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// `Some(self)` unless the rectangle is degenerate.
    pub fn non_empty(self) -> Option<Self> {
        (!self.is_empty()).then_some(self)
    }

    /// Number of pixels covered.
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Intersects the rectangle with a `frame_width` x `frame_height` image anchored at
    /// the origin. Returns `None` when nothing of the rectangle lies inside the image.
    pub fn clip_to(&self, frame_width: u32, frame_height: u32) -> Option<Self> {
        let left = (self.x as i64).max(0);
        let top = (self.y as i64).max(0);
        let right = (self.x as i64 + self.width as i64).min(frame_width as i64);
        let bottom = (self.y as i64 + self.height as i64).min(frame_height as i64);

        if right <= left || bottom <= top {
            return None;
        }

        Some(Self {
            x: left as i32,
            y: top as i32,
            width: (right - left) as u32,
            height: (bottom - top) as u32,
        })
    }
}
