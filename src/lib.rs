// arcmap - curved route overlays on Mercator maps
//
// The library is host-agnostic: `ArcMap` drives any `SurfaceAdapter`.
// `surface::terminal::TerminalSurface` is the surface used by the bundled
// terminal front end.

pub mod animation;
pub mod engine;
pub mod error;
pub mod geo;
pub mod interaction;
pub mod routes;
pub mod surface;
pub mod tooltip;

pub use animation::{Clock, ManualClock, SystemClock};
pub use engine::config::{ArcColors, ArcMapOptions, OptionsPatch, TooltipOptions};
pub use engine::ArcMap;
pub use error::{ArcMapError, Result};
pub use geo::{GeoPoint, SurfacePoint, SurfaceSize};
pub use routes::Connection;
pub use tooltip::{FollowMode, TooltipContent};
