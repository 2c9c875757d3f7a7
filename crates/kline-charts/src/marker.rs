//! # marker
//!
//! Per-frame registry of annotation shapes with hover that survives the
//! frame-to-frame rebuild.
//!
//! Marker boxes are stored in world X (scroll independent) and canvas Y
//! (pane top already added), the same space the interaction layer hit tests
//! in.

use crate::analysis::VolumePriceRelation;
use indexmap::IndexMap;
use kline_core::Rect;
use serde::{Deserialize, Serialize};

/// Default hit-test slop in logical pixels
pub const HIT_PADDING: f64 = 3.0;

/// Semantic family of a marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarkerKind {
    VolumePrice,
}

/// Stable marker identity: the same logical marker gets the same id every
/// frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MarkerId {
    pub kind: MarkerKind,
    pub index: usize,
}

impl MarkerId {
    pub const fn new(kind: MarkerKind, index: usize) -> Self {
        Self { kind, index }
    }

    pub const fn volume_price(index: usize) -> Self {
        Self::new(MarkerKind::VolumePrice, index)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarkerShape {
    Triangle,
    Circle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerState {
    Normal,
    Hovered,
}

/// One hit-testable annotation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerEntity {
    pub id: MarkerId,
    pub shape: MarkerShape,
    /// Semantic label, e.g. the volume/price relation name
    pub marker_type: String,
    /// Bounding box
    pub bounds: Rect,
    pub data_index: usize,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

// ============================================================================
// REGISTRY
// ============================================================================

/// Markers visible in the current frame, in registration order
#[derive(Debug, Clone)]
pub struct MarkerRegistry {
    markers: IndexMap<MarkerId, MarkerEntity>,
    hovered: Option<MarkerId>,
    last_hovered: Option<MarkerId>,
    /// `marker_type` -> human label, survives `clear`
    descriptions: IndexMap<String, String>,
}

impl Default for MarkerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkerRegistry {
    /// Empty registry with the volume/price relation labels preloaded
    pub fn new() -> Self {
        let descriptions = VolumePriceRelation::ALL
            .iter()
            .filter(|relation| relation.is_marked())
            .map(|relation| (relation.name().to_string(), relation.description().to_string()))
            .collect();

        Self {
            markers: IndexMap::new(),
            hovered: None,
            last_hovered: None,
            descriptions,
        }
    }

    /// Add or replace the label shown for a `marker_type`
    pub fn register_description(&mut self, marker_type: impl Into<String>, description: impl Into<String>) {
        self.descriptions.insert(marker_type.into(), description.into());
    }

    pub fn description(&self, marker_type: &str) -> Option<&str> {
        self.descriptions.get(marker_type).map(String::as_str)
    }

    /// Drop every marker. Hover is kept.
    pub fn clear(&mut self) {
        self.markers.clear();
    }

    /// Insert or replace by id
    pub fn register(&mut self, marker: MarkerEntity) {
        self.markers.insert(marker.id, marker);
    }

    pub fn state(&self, id: MarkerId) -> MarkerState {
        if self.hovered == Some(id) {
            MarkerState::Hovered
        } else {
            MarkerState::Normal
        }
    }

    /// First marker, in registration order, whose box grown by `padding`
    /// contains the point
    pub fn hit_test(&self, x: f64, y: f64, padding: f64) -> Option<&MarkerEntity> {
        self.markers
            .values()
            .find(|marker| marker.bounds.contains_padded(x, y, padding))
    }

    pub fn set_hover(&mut self, id: Option<MarkerId>) {
        self.hovered = id;
        self.last_hovered = id;
    }

    /// Forget a hover whose marker was not re-registered this frame.
    /// Call once after all `register` calls of a frame.
    pub fn validate_hover_state(&mut self) {
        if let Some(id) = self.hovered {
            if !self.markers.contains_key(&id) {
                tracing::trace!(?id, "hovered marker left the viewport");
                self.hovered = None;
            }
        }
    }

    pub fn hovered_id(&self) -> Option<MarkerId> {
        self.hovered
    }

    pub fn hovered_marker(&self) -> Option<&MarkerEntity> {
        self.hovered.and_then(|id| self.markers.get(&id))
    }

    /// Last id passed to [`set_hover`](Self::set_hover), for enter/leave detection
    pub fn last_hover_id(&self) -> Option<MarkerId> {
        self.last_hovered
    }

    pub fn all_markers(&self) -> impl Iterator<Item = &MarkerEntity> {
        self.markers.values()
    }

    pub fn get(&self, id: MarkerId) -> Option<&MarkerEntity> {
        self.markers.get(&id)
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marker(index: usize, x: f64) -> MarkerEntity {
        MarkerEntity {
            id: MarkerId::volume_price(index),
            shape: MarkerShape::Triangle,
            marker_type: "rise_with_volume".to_string(),
            bounds: Rect::new(x, 50.0, 8.0, 7.0),
            data_index: index,
            metadata: serde_json::Value::Null,
        }
    }

    #[test]
    fn test_hover_survives_clear_and_reregister() {
        let mut registry = MarkerRegistry::new();
        registry.register(marker(3, 30.0));
        registry.set_hover(Some(MarkerId::volume_price(3)));

        registry.clear();
        registry.register(marker(3, 31.0));
        registry.validate_hover_state();

        let hovered = registry.hovered_marker().unwrap();
        assert_eq!(hovered.id, MarkerId::volume_price(3));
        assert_eq!(hovered.bounds.x, 31.0);
        assert_eq!(registry.state(MarkerId::volume_price(3)), MarkerState::Hovered);
    }

    #[test]
    fn test_hover_dropped_when_not_reregistered() {
        let mut registry = MarkerRegistry::new();
        registry.register(marker(3, 30.0));
        registry.set_hover(Some(MarkerId::volume_price(3)));

        registry.clear();
        registry.register(marker(4, 40.0));
        registry.validate_hover_state();

        assert!(registry.hovered_marker().is_none());
        assert_eq!(registry.hovered_id(), None);
        // last hover id is only changed by set_hover
        assert_eq!(registry.last_hover_id(), Some(MarkerId::volume_price(3)));
    }

    #[test]
    fn test_hit_test_padding_and_order() {
        let mut registry = MarkerRegistry::new();
        registry.register(marker(1, 10.0));
        registry.register(marker(2, 14.0));

        // overlapping boxes: first registered wins
        assert_eq!(registry.hit_test(15.0, 52.0, HIT_PADDING).unwrap().data_index, 1);
        assert_eq!(registry.hit_test(8.0, 48.0, HIT_PADDING).unwrap().data_index, 1);
        assert!(registry.hit_test(8.0, 48.0, 0.0).is_none());
        assert!(registry.hit_test(100.0, 52.0, HIT_PADDING).is_none());
    }

    #[test]
    fn test_descriptions_preloaded_and_extensible() {
        let mut registry = MarkerRegistry::new();
        assert_eq!(registry.description("rise_with_volume"), Some("Rising on expanding volume"));
        assert_eq!(registry.description("others"), None);
        assert_eq!(registry.description("gap_up"), None);

        registry.register_description("gap_up", "Opened above the prior high");
        registry.register_description("rise_with_volume", "Breakout");
        registry.clear();
        assert_eq!(registry.description("gap_up"), Some("Opened above the prior high"));
        assert_eq!(registry.description("rise_with_volume"), Some("Breakout"));
    }

    #[test]
    fn test_register_upserts() {
        let mut registry = MarkerRegistry::new();
        registry.register(marker(1, 10.0));
        registry.register(marker(1, 20.0));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get(MarkerId::volume_price(1)).unwrap().bounds.x, 20.0);
        assert_eq!(registry.all_markers().count(), 1);
    }
}
