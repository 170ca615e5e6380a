// Route model
//
// Holds the caller's connections, their projected endpoints and curves, and
// the de-duplicated set of endpoint markers. Everything is rebuilt wholesale
// on replacement or resize; nothing is diffed.

use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::geo::{build_arc, project, CurveDescriptor, GeoPoint, SurfacePoint, SurfaceSize};

// ============================================================================
// Connection input
// ============================================================================

/// Title/subtitle pair shown in the tooltip
#[derive(Debug, Clone, PartialEq)]
pub struct RouteLabel {
    pub title: String,
    pub subtitle: Option<String>,
}

/// A single route between two geographic points
///
/// Owned by the caller. The engine only reads it; every optional field falls
/// back to the corresponding engine option when absent.
#[derive(Debug, Clone, PartialEq)]
pub struct Connection {
    pub id: Option<String>,
    pub from: GeoPoint,
    pub to: GeoPoint,
    pub label: Option<RouteLabel>,
    pub color: Option<String>,
    pub stroke_width: Option<f64>,
    pub curvature: Option<f64>,
    pub show_marker: Option<bool>,
    pub hover_color: Option<String>,
    pub hover_width: Option<f64>,
}

impl Connection {
    pub fn new(from: GeoPoint, to: GeoPoint) -> Self {
        Self {
            id: None,
            from,
            to,
            label: None,
            color: None,
            stroke_width: None,
            curvature: None,
            show_marker: None,
            hover_color: None,
            hover_width: None,
        }
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        let subtitle = self.label.take().and_then(|l| l.subtitle);
        self.label = Some(RouteLabel {
            title: title.into(),
            subtitle,
        });
        self
    }

    pub fn subtitle(mut self, subtitle: impl Into<String>) -> Self {
        let title = self.label.take().map(|l| l.title).unwrap_or_default();
        self.label = Some(RouteLabel {
            title,
            subtitle: Some(subtitle.into()),
        });
        self
    }

    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn stroke_width(mut self, width: f64) -> Self {
        self.stroke_width = Some(width);
        self
    }

    pub fn curvature(mut self, curvature: f64) -> Self {
        self.curvature = Some(curvature);
        self
    }

    pub fn show_marker(mut self, show: bool) -> Self {
        self.show_marker = Some(show);
        self
    }

    pub fn hover(mut self, color: impl Into<String>, width: f64) -> Self {
        self.hover_color = Some(color.into());
        self.hover_width = Some(width);
        self
    }
}

// ============================================================================
// Identity
// ============================================================================

/// Stable identity of a connection across rebuilds
///
/// Explicit ids survive reordering. Connections without an id are known by
/// their position, which only survives a rebuild if the list keeps its order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ConnectionKey {
    Explicit(String),
    Positional(usize),
}

impl fmt::Display for ConnectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionKey::Explicit(id) => write!(f, "{}", id),
            ConnectionKey::Positional(idx) => write!(f, "route-{}", idx + 1),
        }
    }
}

// ============================================================================
// Unique endpoint set
// ============================================================================

/// Exact latitude/longitude key
///
/// Built from the raw bit patterns, except that `-0.0` folds into `0.0` and
/// every NaN folds into one value, so the key behaves like the decimal text
/// of the pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PointKey(u64, u64);

impl PointKey {
    pub fn of(point: &GeoPoint) -> Self {
        PointKey(canonical_bits(point.latitude), canonical_bits(point.longitude))
    }
}

fn canonical_bits(v: f64) -> u64 {
    if v.is_nan() {
        f64::NAN.to_bits()
    } else if v == 0.0 {
        0.0f64.to_bits()
    } else {
        v.to_bits()
    }
}

/// One endpoint marker
#[derive(Debug, Clone, PartialEq)]
pub struct UniquePoint {
    pub key: PointKey,
    pub position: SurfacePoint,
    /// Label of the first connection endpoint that named this location
    pub label: Option<String>,
    /// Index of the first connection that named this location
    pub owner: usize,
}

/// Endpoint markers keyed by exact coordinate pair, first-seen wins
#[derive(Debug, Clone, Default)]
pub struct UniquePointSet {
    points: Vec<UniquePoint>,
    index: HashMap<PointKey, usize>,
}

impl UniquePointSet {
    /// Record an endpoint. Returns `false` if the key was already present, in
    /// which case the stored point is left untouched.
    pub fn insert(&mut self, geo: &GeoPoint, position: SurfacePoint, owner: usize) -> bool {
        let key = PointKey::of(geo);
        if self.index.contains_key(&key) {
            return false;
        }
        self.index.insert(key, self.points.len());
        self.points.push(UniquePoint {
            key,
            position,
            label: geo.label.clone(),
            owner,
        });
        true
    }

    pub fn get(&self, geo: &GeoPoint) -> Option<&UniquePoint> {
        self.index
            .get(&PointKey::of(geo))
            .and_then(|&idx| self.points.get(idx))
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &UniquePoint> {
        self.points.iter()
    }

    fn clear(&mut self) {
        self.points.clear();
        self.index.clear();
    }
}

// ============================================================================
// Route model
// ============================================================================

/// Derived geometry for one connection
#[derive(Debug, Clone)]
pub struct RouteEntry {
    pub key: ConnectionKey,
    pub from: SurfacePoint,
    pub to: SurfacePoint,
    pub curve: CurveDescriptor,
}

/// The active connection set and everything derived from it
#[derive(Debug, Clone)]
pub struct RouteModel {
    connections: Vec<Connection>,
    entries: Vec<RouteEntry>,
    points: UniquePointSet,
    size: SurfaceSize,
    default_curvature: f64,
}

impl RouteModel {
    pub fn new(size: SurfaceSize, default_curvature: f64) -> Self {
        Self {
            connections: Vec::new(),
            entries: Vec::new(),
            points: UniquePointSet::default(),
            size,
            default_curvature,
        }
    }

    /// Replace every connection and rebuild
    pub fn set_connections(&mut self, connections: Vec<Connection>) {
        self.connections = connections;
        self.rebuild();
    }

    /// Change the surface size and rebuild
    pub fn resize(&mut self, size: SurfaceSize) {
        self.size = size;
        self.rebuild();
    }

    /// Apply several changes at once with a single rebuild
    pub fn reconfigure(
        &mut self,
        size: SurfaceSize,
        default_curvature: f64,
        connections: Option<Vec<Connection>>,
    ) {
        self.size = size;
        self.default_curvature = default_curvature;
        if let Some(connections) = connections {
            self.connections = connections;
        }
        self.rebuild();
    }

    /// Recompute projections, curves and the unique endpoint set
    ///
    /// Input order is preserved: it is both the drawing order (later routes
    /// on top) and the marker stagger order.
    pub fn rebuild(&mut self) {
        self.entries.clear();
        self.points.clear();
        let mut seen_ids = HashSet::new();

        for (idx, conn) in self.connections.iter().enumerate() {
            let from = project(&conn.from, self.size);
            let to = project(&conn.to, self.size);
            let curvature = conn.curvature.unwrap_or(self.default_curvature);

            self.points.insert(&conn.from, from, idx);
            self.points.insert(&conn.to, to, idx);

            self.entries.push(RouteEntry {
                key: Self::key_for(conn, idx, &mut seen_ids),
                from,
                to,
                curve: build_arc(from, to, curvature),
            });
        }
    }

    /// Identity of the connection at `idx`
    ///
    /// A repeated id keeps only its first occurrence explicit; later ones are
    /// known by position so no two entries share a key.
    fn key_for<'a>(
        conn: &'a Connection,
        idx: usize,
        seen_ids: &mut HashSet<&'a str>,
    ) -> ConnectionKey {
        match &conn.id {
            Some(id) if seen_ids.insert(id.as_str()) => ConnectionKey::Explicit(id.clone()),
            Some(id) => {
                tracing::warn!(index = idx, id = %id, "Duplicate connection id, keyed by position");
                ConnectionKey::Positional(idx)
            }
            None => ConnectionKey::Positional(idx),
        }
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn connection(&self, idx: usize) -> Option<&Connection> {
        self.connections.get(idx)
    }

    pub fn entries(&self) -> &[RouteEntry] {
        &self.entries
    }

    pub fn entry(&self, idx: usize) -> Option<&RouteEntry> {
        self.entries.get(idx)
    }

    pub fn points(&self) -> &UniquePointSet {
        &self.points
    }

    pub fn size(&self) -> SurfaceSize {
        self.size
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    pub fn keys(&self) -> Vec<ConnectionKey> {
        self.entries.iter().map(|e| e.key.clone()).collect()
    }

    /// Text label for the connection's focusable hit region
    ///
    /// The title when there is one, otherwise the connection's identity.
    pub fn accessible_label(&self, idx: usize) -> String {
        let Some(conn) = self.connections.get(idx) else {
            return String::new();
        };
        match &conn.label {
            Some(label) if !label.title.is_empty() => label.title.clone(),
            _ => match &conn.id {
                Some(id) => id.clone(),
                None => format!("Route {}", idx + 1),
            },
        }
    }
}
