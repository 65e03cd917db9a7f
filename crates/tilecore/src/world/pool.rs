use thiserror::Error;
use tracing::warn;

use crate::app::Canvas;
use crate::content::SpawnRecord;

use super::{EngineContext, ViewportController};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u64);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpawnError {
    #[error("{pool} pool cannot spawn from a '{found}' record")]
    UnexpectedRecord {
        pool: &'static str,
        found: &'static str,
    },
}

/// An entity type that can live in an [`EntityPool`].
pub trait PoolMember: Sized {
    const KIND: &'static str;

    fn spawn(id: EntityId, record: &SpawnRecord) -> Result<Self, SpawnError>;

    fn id(&self) -> EntityId;

    /// Members flag themselves instead of removing themselves; the pool
    /// sweeps flagged members in [`EntityPool::handle_termination`].
    fn is_terminated(&self) -> bool {
        false
    }
}

/// Recomputes pixel placement from grid state and the current viewport.
pub trait WindowAware {
    fn on_window_change(&mut self, viewport: &ViewportController);
}

/// Takes fresh grid state from a level descriptor slice.
pub trait LevelAware {
    fn on_level_change(&mut self, record: &SpawnRecord);
}

pub trait Renderable {
    fn render(&self, canvas: &mut dyn Canvas, ctx: &EngineContext);
}

#[derive(Debug, Default)]
pub struct EntityIdAllocator {
    next: u64,
}

impl EntityIdAllocator {
    pub fn allocate(&mut self) -> EntityId {
        let id = EntityId(self.next);
        self.next = self.next.saturating_add(1);
        id
    }
}

/// Owning, insertion-ordered collection of one entity type.
#[derive(Debug)]
pub struct EntityPool<T> {
    members: Vec<T>,
    allocator: EntityIdAllocator,
}

impl<T> Default for EntityPool<T> {
    fn default() -> Self {
        Self {
            members: Vec::new(),
            allocator: EntityIdAllocator::default(),
        }
    }
}

impl<T: PoolMember> EntityPool<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawns one member. A record the member type rejects is a
    /// configuration error: it is logged and skipped.
    pub fn instantiate(&mut self, record: &SpawnRecord) -> Option<EntityId> {
        let id = self.allocator.allocate();
        match T::spawn(id, record) {
            Ok(member) => {
                self.members.push(member);
                Some(id)
            }
            Err(error) => {
                warn!(
                    pool = T::KIND,
                    coords = ?record.coords(),
                    error = %error,
                    "spawn_record_skipped"
                );
                None
            }
        }
    }

    /// Replaces every member with fresh instances built from `records`.
    pub fn on_level_change_all(&mut self, records: &[SpawnRecord]) -> usize {
        self.clear();
        records
            .iter()
            .filter_map(|record| self.instantiate(record))
            .count()
    }

    pub fn for_each(&mut self, mut f: impl FnMut(&mut T)) {
        for member in &mut self.members {
            f(member);
        }
    }

    pub fn for_each_with_arg<A: ?Sized>(&mut self, mut f: impl FnMut(&mut T, &A), arg: &A) {
        for member in &mut self.members {
            f(member, arg);
        }
    }

    /// Drops every member that flagged itself as terminated.
    pub fn handle_termination(&mut self) -> usize {
        let before = self.members.len();
        self.members.retain(|member| !member.is_terminated());
        before - self.members.len()
    }

    pub fn clear(&mut self) {
        self.members.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.members.iter()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut T> {
        self.members.iter_mut().find(|member| member.id() == id)
    }
}

impl<T: PoolMember + WindowAware> EntityPool<T> {
    pub fn on_window_change_all(&mut self, viewport: &ViewportController) {
        self.for_each_with_arg(T::on_window_change, viewport);
    }
}

impl<T: PoolMember + Renderable> EntityPool<T> {
    pub fn render_all(&self, canvas: &mut dyn Canvas, ctx: &EngineContext) {
        for member in &self.members {
            member.render(canvas, ctx);
        }
    }
}
