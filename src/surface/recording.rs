// Test double that records every surface call

use std::collections::BTreeMap;

use super::{
    HitRegion, ListenerId, MarkerStyle, ObserverId, PathStyle, PrimitiveId, SurfaceAdapter,
};
use crate::geo::{CurveDescriptor, SurfacePoint, SurfaceSize};
use crate::tooltip::{TooltipContent, TooltipPlacement};

#[derive(Debug, Clone)]
pub(crate) enum Recorded {
    Path {
        curve: CurveDescriptor,
        style: PathStyle,
        reveal: f64,
    },
    Hit {
        region: HitRegion,
    },
    Marker {
        center: SurfacePoint,
        style: MarkerStyle,
    },
}

#[derive(Debug, Clone)]
pub(crate) struct ShownTooltip {
    pub content: TooltipContent,
    pub placement: TooltipPlacement,
    pub pinned: bool,
    pub class: Option<String>,
}

/// Surface that keeps its scene in memory
#[derive(Debug)]
pub(crate) struct RecordingSurface {
    pub container: &'static str,
    pub size: SurfaceSize,
    pub tooltip_size: SurfaceSize,
    pub primitives: BTreeMap<PrimitiveId, Recorded>,
    pub tooltip: Option<ShownTooltip>,
    pub listeners: Vec<ListenerId>,
    pub observers: Vec<ObserverId>,
    pub frame_requests: usize,
    pub measure_calls: usize,
    next_id: u64,
}

impl RecordingSurface {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            container: "#map",
            size: SurfaceSize::new(width, height),
            tooltip_size: SurfaceSize::new(120.0, 48.0),
            primitives: BTreeMap::new(),
            tooltip: None,
            listeners: Vec::new(),
            observers: Vec::new(),
            frame_requests: 0,
            measure_calls: 0,
            next_id: 1,
        }
    }

    fn alloc(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn paths(&self) -> Vec<(PrimitiveId, &PathStyle, f64)> {
        self.primitives
            .iter()
            .filter_map(|(id, p)| match p {
                Recorded::Path { style, reveal, .. } => Some((*id, style, *reveal)),
                _ => None,
            })
            .collect()
    }

    pub fn hit_regions(&self) -> Vec<&HitRegion> {
        self.primitives
            .values()
            .filter_map(|p| match p {
                Recorded::Hit { region } => Some(region),
                _ => None,
            })
            .collect()
    }

    pub fn markers(&self, kind: super::MarkerKind) -> Vec<SurfacePoint> {
        self.primitives
            .values()
            .filter_map(|p| match p {
                Recorded::Marker { center, style } if style.kind == kind => Some(*center),
                _ => None,
            })
            .collect()
    }
}

impl SurfaceAdapter for RecordingSurface {
    fn resolve_container(&mut self, container: &str) -> Option<SurfaceSize> {
        (container == self.container).then_some(self.size)
    }

    fn create_path(&mut self, curve: &CurveDescriptor, style: &PathStyle) -> PrimitiveId {
        let id = PrimitiveId(self.alloc());
        self.primitives.insert(
            id,
            Recorded::Path {
                curve: curve.clone(),
                style: style.clone(),
                reveal: 1.0,
            },
        );
        id
    }

    fn restyle_path(&mut self, id: PrimitiveId, new_style: &PathStyle) {
        if let Some(Recorded::Path { style, .. }) = self.primitives.get_mut(&id) {
            *style = new_style.clone();
        }
    }

    fn set_reveal(&mut self, id: PrimitiveId, progress: f64) {
        if let Some(Recorded::Path { reveal, .. }) = self.primitives.get_mut(&id) {
            *reveal = progress;
        }
    }

    fn create_hit_region(&mut self, _curve: &CurveDescriptor, region: &HitRegion) -> PrimitiveId {
        let id = PrimitiveId(self.alloc());
        self.primitives.insert(
            id,
            Recorded::Hit {
                region: region.clone(),
            },
        );
        id
    }

    fn create_marker(&mut self, center: SurfacePoint, style: &MarkerStyle) -> PrimitiveId {
        let id = PrimitiveId(self.alloc());
        self.primitives.insert(
            id,
            Recorded::Marker {
                center,
                style: style.clone(),
            },
        );
        id
    }

    fn move_marker(&mut self, id: PrimitiveId, to: SurfacePoint) {
        if let Some(Recorded::Marker { center, .. }) = self.primitives.get_mut(&id) {
            *center = to;
        }
    }

    fn remove(&mut self, id: PrimitiveId) {
        self.primitives.remove(&id);
    }

    fn measure_tooltip(&mut self, _content: &TooltipContent, _class: Option<&str>) -> SurfaceSize {
        self.measure_calls += 1;
        self.tooltip_size
    }

    fn show_tooltip(
        &mut self,
        content: &TooltipContent,
        placement: &TooltipPlacement,
        pinned: bool,
        class: Option<&str>,
    ) {
        self.tooltip = Some(ShownTooltip {
            content: content.clone(),
            placement: *placement,
            pinned,
            class: class.map(str::to_string),
        });
    }

    fn hide_tooltip(&mut self) {
        self.tooltip = None;
    }

    fn observe_resize(&mut self) -> ObserverId {
        let id = ObserverId(self.alloc());
        self.observers.push(id);
        id
    }

    fn disconnect_resize(&mut self, id: ObserverId) {
        self.observers.retain(|o| *o != id);
    }

    fn watch_outside_pointer(&mut self) -> ListenerId {
        let id = ListenerId(self.alloc());
        self.listeners.push(id);
        id
    }

    fn unwatch_outside_pointer(&mut self, id: ListenerId) {
        self.listeners.retain(|l| *l != id);
    }

    fn request_frame(&mut self) {
        self.frame_requests += 1;
    }
}
