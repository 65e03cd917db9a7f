mod catalog;
mod level;
mod loader;

pub use catalog::LevelCatalog;
pub use level::{
    EntityTag, LevelDescriptor, LevelId, MapLayout, MapLayoutError, SpawnRecord, VOID_TILE,
};
pub use loader::{load_level_file, parse_level_document, LevelLoadError};
