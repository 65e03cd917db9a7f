use tilecore::{Direction, GridPoint, MapLayout, PixelRect, ViewportController};

/// Tile-to-tile movement. A move sets `next`; the destination rect slides
/// toward it over the move duration and `coords` jumps on arrival.
#[derive(Debug, Clone)]
pub(crate) struct GridMotion {
    coords: GridPoint,
    next: Option<GridPoint>,
    facing: Direction,
    elapsed: u32,
    walk_ticks: u32,
    running: bool,
}

impl GridMotion {
    pub(crate) fn new(coords: GridPoint, walk_ticks: u32) -> Self {
        Self {
            coords,
            next: None,
            facing: Direction::default(),
            elapsed: 0,
            walk_ticks: walk_ticks.max(1),
            running: false,
        }
    }

    /// Places the entity on `coords` with no move in flight.
    pub(crate) fn reset(&mut self, coords: GridPoint) {
        self.coords = coords;
        self.next = None;
        self.elapsed = 0;
        self.running = false;
        self.facing = Direction::default();
    }

    pub(crate) fn coords(&self) -> GridPoint {
        self.coords
    }

    pub(crate) fn next(&self) -> Option<GridPoint> {
        self.next
    }

    /// Where the entity will be once the current move ends.
    pub(crate) fn target(&self) -> GridPoint {
        self.next.unwrap_or(self.coords)
    }

    pub(crate) fn occupies(&self, point: GridPoint) -> bool {
        self.coords == point || self.next == Some(point)
    }

    pub(crate) fn is_moving(&self) -> bool {
        self.next.is_some()
    }

    pub(crate) fn facing(&self) -> Direction {
        self.facing
    }

    pub(crate) fn face(&mut self, direction: Direction) {
        self.facing = direction;
    }

    pub(crate) fn is_running(&self) -> bool {
        self.running
    }

    pub(crate) fn set_running(&mut self, running: bool) {
        self.running = running;
    }

    fn duration(&self) -> u32 {
        if self.running {
            (self.walk_ticks / 2).max(1)
        } else {
            self.walk_ticks
        }
    }

    /// Turns toward `direction` and starts a move if idle and the tile is
    /// free.
    pub(crate) fn try_begin(
        &mut self,
        direction: Direction,
        map: &MapLayout,
        blocked: impl Fn(GridPoint) -> bool,
    ) -> bool {
        self.facing = direction;
        if self.is_moving() {
            return false;
        }
        let target = self.coords.offset(direction);
        if !map.is_walkable(target) || blocked(target) {
            return false;
        }
        self.next = Some(target);
        self.elapsed = 0;
        true
    }

    /// Returns true on the tick the move completes.
    pub(crate) fn advance(&mut self) -> bool {
        let Some(next) = self.next else {
            return false;
        };
        self.elapsed += 1;
        if self.elapsed < self.duration() {
            return false;
        }
        self.coords = next;
        self.next = None;
        self.elapsed = 0;
        true
    }

    /// Cancels the move in flight; the entity snaps back to `coords`.
    pub(crate) fn invalidate(&mut self) {
        self.next = None;
        self.elapsed = 0;
    }

    /// Drops any move in flight and puts the entity on `coords`, keeping
    /// facing and run state.
    pub(crate) fn warp_to(&mut self, coords: GridPoint) {
        self.coords = coords;
        self.invalidate();
    }

    pub(crate) fn dest_rect(&self, viewport: &ViewportController) -> PixelRect {
        let from = viewport.dest_rect(self.coords);
        let Some(next) = self.next else {
            return from;
        };
        let to = viewport.dest_rect(next);
        let duration = self.duration() as i32;
        let elapsed = self.elapsed as i32;
        PixelRect::new(
            from.x + (to.x - from.x) * elapsed / duration,
            from.y + (to.y - from.y) * elapsed / duration,
            from.w,
            from.h,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tilecore::CameraMode;

    fn open_map() -> MapLayout {
        MapLayout::filled(5, 5, 1).expect("map")
    }

    #[test]
    fn move_completes_after_duration() {
        let map = open_map();
        let mut motion = GridMotion::new(GridPoint::new(2, 2), 4);
        assert!(motion.try_begin(Direction::East, &map, |_| false));
        assert!(!motion.advance());
        assert!(!motion.advance());
        assert!(!motion.advance());
        assert!(motion.advance());
        assert_eq!(motion.coords(), GridPoint::new(3, 2));
        assert!(!motion.is_moving());
    }

    #[test]
    fn running_halves_duration() {
        let map = open_map();
        let mut motion = GridMotion::new(GridPoint::new(2, 2), 4);
        motion.set_running(true);
        motion.try_begin(Direction::North, &map, |_| false);
        assert!(!motion.advance());
        assert!(motion.advance());
    }

    #[test]
    fn void_and_blocked_tiles_refuse_the_move_but_turn() {
        let map = MapLayout::new(2, 1, vec![1, 0]).expect("map");
        let mut motion = GridMotion::new(GridPoint::new(0, 0), 4);
        assert!(!motion.try_begin(Direction::East, &map, |_| false));
        assert_eq!(motion.facing(), Direction::East);

        let map = open_map();
        let mut motion = GridMotion::new(GridPoint::new(0, 0), 4);
        assert!(!motion.try_begin(Direction::South, &map, |point| point == GridPoint::new(0, 1)));
    }

    #[test]
    fn dest_rect_interpolates_toward_next() {
        let map = open_map();
        let mut viewport = ViewportController::new(5.0, CameraMode::FollowTarget);
        viewport.on_window_change((400, 400));
        let mut motion = GridMotion::new(GridPoint::new(1, 1), 4);
        motion.try_begin(Direction::East, &map, |_| false);
        motion.advance();
        motion.advance();

        let rect = motion.dest_rect(&viewport);
        assert_eq!(rect.x, 80 + 40);
        assert_eq!(rect.y, 80);
    }
}
