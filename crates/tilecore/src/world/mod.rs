mod context;
mod events;
mod grid;
mod level_store;
mod pool;
mod singleton;
mod viewport;

pub use context::EngineContext;
pub use events::EventBus;
pub use grid::{Direction, GridPoint, PixelRect};
pub use level_store::{LevelDataStore, PropertyValue};
pub use pool::{
    EntityId, EntityIdAllocator, EntityPool, LevelAware, PoolMember, Renderable, SpawnError,
    WindowAware,
};
pub use singleton::SingletonSlot;
pub use viewport::{CameraMode, TileWindow, ViewportController};
