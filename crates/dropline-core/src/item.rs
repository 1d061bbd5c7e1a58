#![forbid(unsafe_code)]

//! The dragged item.

use std::collections::BTreeMap;

use crate::id::{ItemId, ZoneId};

/// Item being dragged.
///
/// Built once when a drag starts and never mutated afterwards; the store
/// drops it when the drag ends.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DragItem {
    id: ItemId,
    item_type: String,
    metadata: BTreeMap<String, String>,
    source_zone: Option<ZoneId>,
}

impl DragItem {
    /// Create an item of `item_type` with no metadata and no source zone.
    pub fn new(id: impl Into<ItemId>, item_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            item_type: item_type.into(),
            metadata: BTreeMap::new(),
            source_zone: None,
        }
    }

    /// Set the zone the item is dragged out of.
    #[must_use]
    pub fn with_source_zone(mut self, zone: impl Into<ZoneId>) -> Self {
        self.source_zone = Some(zone.into());
        self
    }

    /// Attach an opaque metadata entry.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    #[inline]
    pub fn id(&self) -> &ItemId {
        &self.id
    }

    /// Type tag matched against drop-target `accepts` sets.
    #[inline]
    pub fn item_type(&self) -> &str {
        &self.item_type
    }

    #[inline]
    pub fn metadata(&self) -> &BTreeMap<String, String> {
        &self.metadata
    }

    /// Look up a single metadata value.
    pub fn meta(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }

    #[inline]
    pub fn source_zone(&self) -> Option<&ZoneId> {
        self.source_zone.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_fields() {
        let item = DragItem::new("card-1", "card")
            .with_source_zone("backlog")
            .with_metadata("title", "Write docs");
        assert_eq!(item.id().as_str(), "card-1");
        assert_eq!(item.item_type(), "card");
        assert_eq!(item.source_zone().map(ZoneId::as_str), Some("backlog"));
        assert_eq!(item.meta("title"), Some("Write docs"));
        assert_eq!(item.meta("missing"), None);
    }
}
