//! Document model: canvas elements, their bodies, and the in-memory store.
//!
//! This module defines the core data types that describe what is on the canvas
//! (`CanvasElement`, `ElementBody`), the identifier newtype they are keyed by
//! (`ElementId`), the shared style presets elements may point at
//! (`StylePreset`), and the runtime store that owns all live elements
//! (`DocStore`).
//!
//! Geometry, text, `props` and edge points are owned values, so cloning an
//! element yields an independent copy of them. A `StylePreset` is an immutable
//! shared resource held in an `Arc`; clones point at the same preset.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::consts::DEFAULT_FONT_SIZE;

/// Unique identifier for a canvas element.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(String);

impl ElementId {
    /// Wrap a raw identifier string.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Borrow the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` for the empty identifier, which never names an element.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ElementId {
    fn from(raw: &str) -> Self {
        Self(raw.to_owned())
    }
}

impl From<String> for ElementId {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

impl From<Uuid> for ElementId {
    fn from(id: Uuid) -> Self {
        Self(id.to_string())
    }
}

impl AsRef<str> for ElementId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ElementId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// A point in world coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Named fill/stroke preset shared between elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StylePreset {
    /// Display name of the preset.
    pub name: String,
    /// Fill color as a CSS color string.
    pub fill: String,
    /// Stroke color as a CSS color string.
    pub stroke: String,
    /// Stroke width in world units.
    pub stroke_width: f64,
}

/// Body of a node shape. Shapes may carry an attached text label.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShapeBody {
    /// Id of the text element labelling this shape, if any.
    #[serde(default, alias = "labelId", skip_serializing_if = "Option::is_none")]
    pub label_id: Option<ElementId>,
}

/// Body of a text element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBody {
    /// Text content.
    #[serde(default)]
    pub text: String,
    /// Font size in world units.
    #[serde(default = "default_font_size")]
    pub font_size: f64,
    /// Id of the element this text labels, if any.
    #[serde(default, alias = "labelId", skip_serializing_if = "Option::is_none")]
    pub label_id: Option<ElementId>,
}

impl Default for TextBody {
    fn default() -> Self {
        Self { text: String::new(), font_size: DEFAULT_FONT_SIZE, label_id: None }
    }
}

fn default_font_size() -> f64 {
    DEFAULT_FONT_SIZE
}

/// Body of a line or arrow: a polyline in world coordinates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EdgeBody {
    /// Polyline vertices; the first is the tail, the last the head.
    #[serde(default)]
    pub points: Vec<Point>,
}

/// The kind-specific part of an element, tagged by `"type"` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ElementBody {
    /// Axis-aligned rectangle.
    Rect(ShapeBody),
    /// Ellipse inscribed within the bounding box.
    Ellipse(ShapeBody),
    /// Diamond with vertices at bounding-box edge midpoints.
    Diamond(ShapeBody),
    /// Five-point star inscribed within the bounding box.
    Star(ShapeBody),
    /// Text block.
    Text(TextBody),
    /// Straight or bent line segment.
    Line(EdgeBody),
    /// Line with an arrowhead at its last point.
    Arrow(EdgeBody),
}

impl ElementBody {
    /// Wire name of the variant (`"rect"`, `"text"`, ...).
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Rect(_) => "rect",
            Self::Ellipse(_) => "ellipse",
            Self::Diamond(_) => "diamond",
            Self::Star(_) => "star",
            Self::Text(_) => "text",
            Self::Line(_) => "line",
            Self::Arrow(_) => "arrow",
        }
    }

    /// Whether this variant has a `label_id` field at all.
    #[must_use]
    pub fn supports_label(&self) -> bool {
        !matches!(self, Self::Line(_) | Self::Arrow(_))
    }

    /// The label back-reference, if this variant carries one and it is set.
    #[must_use]
    pub fn label_id(&self) -> Option<&ElementId> {
        match self {
            Self::Rect(s) | Self::Ellipse(s) | Self::Diamond(s) | Self::Star(s) => s.label_id.as_ref(),
            Self::Text(t) => t.label_id.as_ref(),
            Self::Line(_) | Self::Arrow(_) => None,
        }
    }

    /// Mutable access to the label slot. `None` for variants without one.
    pub fn label_slot_mut(&mut self) -> Option<&mut Option<ElementId>> {
        match self {
            Self::Rect(s) | Self::Ellipse(s) | Self::Diamond(s) | Self::Star(s) => Some(&mut s.label_id),
            Self::Text(t) => Some(&mut t.label_id),
            Self::Line(_) | Self::Arrow(_) => None,
        }
    }
}

/// A canvas element as stored in the document and on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasElement {
    /// Unique identifier for this element.
    pub id: ElementId,
    /// Variant-specific data, flattened next to the common fields.
    #[serde(flatten)]
    pub body: ElementBody,
    /// Left edge of the bounding box in world coordinates.
    #[serde(default)]
    pub x: f64,
    /// Top edge of the bounding box in world coordinates.
    #[serde(default)]
    pub y: f64,
    /// Width of the bounding box in world coordinates.
    #[serde(default)]
    pub width: f64,
    /// Height of the bounding box in world coordinates.
    #[serde(default)]
    pub height: f64,
    /// Clockwise rotation in degrees around the bounding-box center.
    #[serde(default)]
    pub rotation: f64,
    /// Stacking order; lower values are drawn beneath higher values.
    #[serde(default)]
    pub z_index: i64,
    /// Open-ended per-element properties.
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub props: serde_json::Value,
    /// Shared style preset, if the element uses one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<Arc<StylePreset>>,
}

impl CanvasElement {
    /// Build an element with zeroed geometry and no props or style.
    #[must_use]
    pub fn new(id: impl Into<ElementId>, body: ElementBody) -> Self {
        Self {
            id: id.into(),
            body,
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
            rotation: 0.0,
            z_index: 0,
            props: serde_json::Value::Null,
            style: None,
        }
    }

    /// Move the element by `(dx, dy)` world units, edge points included.
    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.x += dx;
        self.y += dy;
        if let ElementBody::Line(edge) | ElementBody::Arrow(edge) = &mut self.body {
            for point in &mut edge.points {
                point.x += dx;
                point.y += dy;
            }
        }
    }
}

/// In-memory store of canvas elements.
#[derive(Debug, Clone, Default)]
pub struct DocStore {
    elements: HashMap<ElementId, CanvasElement>,
}

impl DocStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self { elements: HashMap::new() }
    }

    /// Insert or replace an element. If an element with the same `id` already
    /// exists it is overwritten and returned.
    pub fn insert(&mut self, element: CanvasElement) -> Option<CanvasElement> {
        self.elements.insert(element.id.clone(), element)
    }

    /// Remove an element by id, returning it if it was present.
    ///
    /// Labels elsewhere that point at the removed element are left as they are.
    pub fn remove(&mut self, id: &str) -> Option<CanvasElement> {
        self.elements.remove(id)
    }

    /// Return a reference to an element by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&CanvasElement> {
        self.elements.get(id)
    }

    /// Returns `true` if an element with this id is present.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.elements.contains_key(id)
    }

    /// Replace all elements with a full snapshot. Later duplicates of an id win.
    pub fn load_snapshot(&mut self, elements: Vec<CanvasElement>) {
        self.elements.clear();
        for element in elements {
            self.elements.insert(element.id.clone(), element);
        }
    }

    /// Return all elements sorted by `(z_index, id)` for draw-order.
    #[must_use]
    pub fn sorted_elements(&self) -> Vec<&CanvasElement> {
        let mut elements: Vec<&CanvasElement> = self.elements.values().collect();
        elements.sort_by(|a, b| a.z_index.cmp(&b.z_index).then_with(|| a.id.cmp(&b.id)));
        elements
    }

    /// Clone the elements named by `ids` in draw order. Unknown ids are skipped.
    #[must_use]
    pub fn collect(&self, ids: &[ElementId]) -> Vec<CanvasElement> {
        let mut picked: Vec<&CanvasElement> = ids.iter().filter_map(|id| self.elements.get(id)).collect();
        picked.sort_by(|a, b| a.z_index.cmp(&b.z_index).then_with(|| a.id.cmp(&b.id)));
        picked.dedup_by(|a, b| a.id == b.id);
        picked.into_iter().cloned().collect()
    }

    /// Highest z-index in the store, or `None` when empty.
    #[must_use]
    pub fn max_z_index(&self) -> Option<i64> {
        self.elements.values().map(|e| e.z_index).max()
    }

    /// Number of elements currently in the store.
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Returns `true` if the store contains no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}
