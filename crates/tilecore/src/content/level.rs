use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

use crate::world::GridPoint;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LevelId(String);

impl LevelId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LevelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Entity type tag used to slice a level descriptor per pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityTag {
    Player,
    Decoration,
    Interactable,
    Teleporter,
    Slime,
}

impl EntityTag {
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "player" => Some(Self::Player),
            "decoration" => Some(Self::Decoration),
            "interactable" => Some(Self::Interactable),
            "teleporter" => Some(Self::Teleporter),
            "slime" => Some(Self::Slime),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Player => "player",
            Self::Decoration => "decoration",
            Self::Interactable => "interactable",
            Self::Teleporter => "teleporter",
            Self::Slime => "slime",
        }
    }
}

/// One entry of a level descriptor; instantiates exactly one entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpawnRecord {
    Generic {
        coords: GridPoint,
    },
    Decoration {
        coords: GridPoint,
        sprite: String,
    },
    Interactable {
        coords: GridPoint,
        sprite: String,
        lines: Vec<String>,
    },
    Teleporter {
        coords: GridPoint,
        target_level: LevelId,
        target_coords: GridPoint,
    },
}

impl SpawnRecord {
    pub fn coords(&self) -> GridPoint {
        match self {
            Self::Generic { coords }
            | Self::Decoration { coords, .. }
            | Self::Interactable { coords, .. }
            | Self::Teleporter { coords, .. } => *coords,
        }
    }

    pub fn variant_name(&self) -> &'static str {
        match self {
            Self::Generic { .. } => "generic",
            Self::Decoration { .. } => "decoration",
            Self::Interactable { .. } => "interactable",
            Self::Teleporter { .. } => "teleporter",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MapLayoutError {
    #[error("map dimensions must be non-zero, got {width}x{height}")]
    EmptyDimensions { width: u32, height: u32 },
    #[error("tile count mismatch: expected {expected}, got {actual}")]
    TileCountMismatch { expected: usize, actual: usize },
}

/// Row-major tile grid. Tile id `0` is void; every other id is floor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapLayout {
    width: u32,
    height: u32,
    tiles: Vec<u16>,
}

pub const VOID_TILE: u16 = 0;

impl MapLayout {
    pub fn new(width: u32, height: u32, tiles: Vec<u16>) -> Result<Self, MapLayoutError> {
        if width == 0 || height == 0 {
            return Err(MapLayoutError::EmptyDimensions { width, height });
        }
        let expected = width as usize * height as usize;
        if tiles.len() != expected {
            return Err(MapLayoutError::TileCountMismatch {
                expected,
                actual: tiles.len(),
            });
        }
        Ok(Self {
            width,
            height,
            tiles,
        })
    }

    pub fn filled(width: u32, height: u32, fill: u16) -> Result<Self, MapLayoutError> {
        Self::new(width, height, vec![fill; width as usize * height as usize])
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn contains(&self, point: GridPoint) -> bool {
        point.x >= 0 && point.y >= 0 && (point.x as u32) < self.width && (point.y as u32) < self.height
    }

    pub fn tile_at(&self, point: GridPoint) -> Option<u16> {
        if !self.contains(point) {
            return None;
        }
        let index = point.y as usize * self.width as usize + point.x as usize;
        self.tiles.get(index).copied()
    }

    pub fn is_walkable(&self, point: GridPoint) -> bool {
        self.tile_at(point).is_some_and(|tile| tile != VOID_TILE)
    }
}

/// Static description of one level: its map plus spawn records grouped by
/// entity tag. Records keep file order inside each tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelDescriptor {
    id: LevelId,
    map: MapLayout,
    records: BTreeMap<EntityTag, Vec<SpawnRecord>>,
}

impl LevelDescriptor {
    pub fn new(id: LevelId, map: MapLayout) -> Self {
        Self {
            id,
            map,
            records: BTreeMap::new(),
        }
    }

    pub fn id(&self) -> &LevelId {
        &self.id
    }

    pub fn map(&self) -> &MapLayout {
        &self.map
    }

    pub fn records(&self, tag: EntityTag) -> &[SpawnRecord] {
        self.records.get(&tag).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn push_record(&mut self, tag: EntityTag, record: SpawnRecord) {
        self.records.entry(tag).or_default().push(record);
    }

    pub fn erase(&mut self, tag: EntityTag) {
        self.records.remove(&tag);
    }

    pub fn with_record(mut self, tag: EntityTag, record: SpawnRecord) -> Self {
        self.push_record(tag, record);
        self
    }

    pub fn record_count(&self) -> usize {
        self.records.values().map(Vec::len).sum()
    }
}
