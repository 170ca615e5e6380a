// Tooltip content and placement
//
// The tooltip is drawn above its anchor and centred horizontally on it. The
// positioner turns a pointer position or a curve into an anchor and then
// clamps so that the whole measured box stays inside the surface.

use crate::geo::{CurveDescriptor, SurfacePoint, SurfaceSize};

/// What the tooltip anchors to while hovered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FollowMode {
    /// Follow the pointer
    #[default]
    Cursor,
    /// Sit on the arc's midpoint
    Midpoint,
}

impl FollowMode {
    pub fn toggled(self) -> Self {
        match self {
            FollowMode::Cursor => FollowMode::Midpoint,
            FollowMode::Midpoint => FollowMode::Cursor,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FollowMode::Cursor => "cursor",
            FollowMode::Midpoint => "midpoint",
        }
    }
}

/// Payload produced by a content renderer
#[derive(Debug, Clone, PartialEq)]
pub enum TooltipContent {
    /// Plain text, one entry per line
    Text(String),
    /// Host-native rich content, passed through to the surface untouched
    Markup(String),
    Structured {
        title: String,
        subtitle: Option<String>,
        lines: Vec<String>,
    },
}

impl TooltipContent {
    /// Content flattened to text lines, for hosts that can only print text
    pub fn text_lines(&self) -> Vec<String> {
        match self {
            TooltipContent::Text(text) | TooltipContent::Markup(text) => {
                text.lines().map(str::to_string).collect()
            }
            TooltipContent::Structured {
                title,
                subtitle,
                lines,
            } => {
                let mut out = Vec::with_capacity(lines.len() + 2);
                out.push(title.clone());
                if let Some(sub) = subtitle {
                    out.push(sub.clone());
                }
                out.extend(lines.iter().cloned());
                out
            }
        }
    }
}

/// Shared tooltip overlay state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TooltipState {
    pub visible: bool,
    pub content: Option<TooltipContent>,
    /// Anchor after clamping
    pub anchor: Option<SurfacePoint>,
    pub pinned: bool,
    /// Connection the tooltip currently describes
    pub owner: Option<usize>,
    /// Last measured size of the content
    pub size: SurfaceSize,
}

/// Final box of the tooltip in surface coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TooltipPlacement {
    /// Point the box is centred above
    pub anchor: SurfacePoint,
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl TooltipPlacement {
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

/// Anchor computation and clamping
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TooltipPositioner {
    pub offset: (f64, f64),
    pub padding: f64,
}

impl TooltipPositioner {
    pub fn new(offset: (f64, f64), padding: f64) -> Self {
        Self { offset, padding }
    }

    /// Anchor for a pointer position: offset right and up from the pointer
    pub fn anchor_for_pointer(&self, pointer: SurfacePoint) -> SurfacePoint {
        SurfacePoint::new(pointer.x + self.offset.0, pointer.y - self.offset.1)
    }

    /// Anchor for a curve: just above its arc-length midpoint
    pub fn anchor_for_curve(&self, curve: &CurveDescriptor) -> SurfacePoint {
        let mid = curve.midpoint();
        SurfacePoint::new(mid.x, mid.y - self.offset.1)
    }

    /// Clamp `anchor` so a `tooltip`-sized box drawn above it fits in `surface`
    ///
    /// Horizontal bounds keep half the width clear of each edge. Vertically the
    /// box hangs above the anchor, so the anchor's lower bound is
    /// `padding + height` and its upper bound is `surface.height - padding`.
    /// A tooltip larger than the surface is pinned to the top-left padding.
    pub fn place(
        &self,
        anchor: SurfacePoint,
        tooltip: SurfaceSize,
        surface: SurfaceSize,
    ) -> TooltipPlacement {
        let half = tooltip.width / 2.0;
        let x = clamp_axis(
            anchor.x,
            self.padding + half,
            surface.width - self.padding - half,
        );
        let y = clamp_axis(
            anchor.y,
            self.padding + tooltip.height,
            surface.height - self.padding,
        );

        TooltipPlacement {
            anchor: SurfacePoint::new(x, y),
            left: x - half,
            top: y - tooltip.height,
            width: tooltip.width,
            height: tooltip.height,
        }
    }
}

/// Clamp without panicking on NaN or on an empty range
fn clamp_axis(v: f64, lo: f64, hi: f64) -> f64 {
    if lo > hi {
        return lo;
    }
    v.max(lo).min(hi)
}
