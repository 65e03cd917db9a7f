use std::collections::HashMap;

use tracing::warn;

use crate::content::{EntityTag, LevelDescriptor, LevelId, MapLayout, SpawnRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyValue {
    Int(i32),
    Bool(bool),
}

/// The current level's descriptor plus named scalar properties that live
/// only as long as that level.
#[derive(Debug, Default)]
pub struct LevelDataStore {
    descriptor: Option<LevelDescriptor>,
    properties: HashMap<String, PropertyValue>,
    generation: u64,
}

impl LevelDataStore {
    /// Replaces the descriptor and drops every property.
    pub fn reset(&mut self, descriptor: LevelDescriptor) {
        self.descriptor = Some(descriptor);
        self.properties.clear();
        self.generation = self.generation.saturating_add(1);
    }

    /// Number of resets so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn descriptor(&self) -> Option<&LevelDescriptor> {
        self.descriptor.as_ref()
    }

    pub fn level_id(&self) -> Option<&LevelId> {
        self.descriptor.as_ref().map(LevelDescriptor::id)
    }

    pub fn map(&self) -> Option<&MapLayout> {
        self.descriptor.as_ref().map(LevelDescriptor::map)
    }

    pub fn tile_count(&self) -> (u32, u32) {
        self.map()
            .map(|map| (map.width(), map.height()))
            .unwrap_or((0, 0))
    }

    pub fn records(&self, tag: EntityTag) -> &[SpawnRecord] {
        match self.descriptor.as_ref() {
            Some(descriptor) => descriptor.records(tag),
            None => &[],
        }
    }

    /// Runtime override of the loaded descriptor (synthetic spawns, armed
    /// teleporters, scripted waves).
    pub fn insert_record(&mut self, tag: EntityTag, record: SpawnRecord) {
        match self.descriptor.as_mut() {
            Some(descriptor) => descriptor.push_record(tag, record),
            None => warn!(tag = tag.as_str(), "record_insert_without_level_ignored"),
        }
    }

    pub fn erase_records(&mut self, tag: EntityTag) {
        if let Some(descriptor) = self.descriptor.as_mut() {
            descriptor.erase(tag);
        }
    }

    pub fn set_property(&mut self, key: &str, value: PropertyValue) {
        self.properties.insert(key.to_string(), value);
    }

    pub fn property(&self, key: &str) -> Option<PropertyValue> {
        self.properties.get(key).copied()
    }

    pub fn set_int(&mut self, key: &str, value: i32) {
        self.set_property(key, PropertyValue::Int(value));
    }

    pub fn int(&self, key: &str) -> Option<i32> {
        match self.property(key)? {
            PropertyValue::Int(value) => Some(value),
            PropertyValue::Bool(_) => None,
        }
    }

    pub fn set_bool(&mut self, key: &str, value: bool) {
        self.set_property(key, PropertyValue::Bool(value));
    }

    pub fn bool(&self, key: &str) -> Option<bool> {
        match self.property(key)? {
            PropertyValue::Bool(value) => Some(value),
            PropertyValue::Int(_) => None,
        }
    }
}
