use std::collections::HashSet;

use thiserror::Error;
use tilecore::{
    CameraMode, Canvas, Direction, EngineContext, EntityPool, EntityTag, EventBus, Game,
    GameState, GridPoint, InputEvent, InputSnapshot, LevelAware, LevelCatalog, LevelId,
    Renderable, Rgba, SingletonSlot, SpawnRecord, WindowAware,
};
use tracing::{debug, info, warn};

use super::animation::AnimationType;
use super::dialogue::DialogueBox;
use super::director::{DirectorEffect, LevelDirector, PlayerView};
use super::entities::{
    Combatant, Decoration, Interactable, Player, Projectile, Slime, Teleporter,
};
use super::events::GameEvent;
use super::interaction::{self, HitOutcome};
use super::listener::LevelListener;
use super::map::MapHandler;
use super::screens;
use super::stats::{Stats, PROJECTILE_ATTACK};

const DIALOGUE_TEST_LINES: [&str; 3] = [
    "... (Testing, testing.)",
    "... (Is this thing on?)",
    "... (Press [E] to close.)",
];

#[derive(Debug, Error)]
pub(crate) enum SceneError {
    #[error("start level '{level}' is not in the level catalog (known: {known})")]
    UnknownStartLevel { level: LevelId, known: String },
}

#[derive(Debug, Clone)]
pub(crate) struct SceneSettings {
    pub(crate) start_level: LevelId,
    pub(crate) tile_count_height: f64,
    pub(crate) camera_mode: CameraMode,
    pub(crate) loading_idle_frames: u32,
    /// Frames the tutorial waits after entry before its first beat.
    pub(crate) tutorial_entry_delay: i32,
}

/// Root of the running game: owns every pool, the level store and the
/// viewport, and runs the lifecycle broadcasts in a fixed order.
pub(crate) struct SceneOrchestrator {
    ctx: EngineContext,
    catalog: LevelCatalog,
    settings: SceneSettings,
    current_level: LevelId,
    map: SingletonSlot<MapHandler>,
    player: SingletonSlot<Player>,
    decorations: EntityPool<Decoration>,
    interactables: EntityPool<Interactable>,
    teleporters: EntityPool<Teleporter>,
    slimes: EntityPool<Slime>,
    projectiles: EntityPool<Projectile>,
    dialogue: DialogueBox,
    director: LevelDirector,
    events: EventBus<GameEvent>,
    listener: Box<dyn LevelListener>,
    /// Player spawn carried from a teleport into the next level load.
    pending_spawn: Option<GridPoint>,
    loading_frames_left: u32,
}

impl SceneOrchestrator {
    pub(crate) fn new(
        catalog: LevelCatalog,
        settings: SceneSettings,
        listener: Box<dyn LevelListener>,
    ) -> Result<Self, SceneError> {
        if !catalog.contains(&settings.start_level) {
            let known = catalog
                .ids()
                .map(LevelId::as_str)
                .collect::<Vec<_>>()
                .join(", ");
            return Err(SceneError::UnknownStartLevel {
                level: settings.start_level.clone(),
                known,
            });
        }

        let mut scene = Self {
            ctx: EngineContext::new(settings.tile_count_height, settings.camera_mode),
            current_level: settings.start_level.clone(),
            director: LevelDirector::new(settings.tutorial_entry_delay),
            catalog,
            settings,
            map: SingletonSlot::new("map handler"),
            player: SingletonSlot::new("player"),
            decorations: EntityPool::new(),
            interactables: EntityPool::new(),
            teleporters: EntityPool::new(),
            slimes: EntityPool::new(),
            projectiles: EntityPool::new(),
            dialogue: DialogueBox::default(),
            events: EventBus::default(),
            listener,
            pending_spawn: None,
            loading_frames_left: 0,
        };
        scene.map.install(MapHandler::default());
        scene.player.install(Player::new());
        Ok(scene)
    }

    /// Loads `current_level` fresh from the catalog and hands every pool its
    /// slice of the descriptor: map, player, decorations, interactables,
    /// teleporters, slimes, then projectiles (always emptied).
    pub(crate) fn on_level_change(&mut self) {
        let Some(descriptor) = self.catalog.get(&self.current_level).cloned() else {
            warn!(level = %self.current_level, "level_missing_from_catalog");
            return;
        };
        self.ctx.level.reset(descriptor);
        self.events.clear();

        self.map.get_mut().on_level_change(&self.ctx.level);
        self.ctx.viewport.on_level_change(self.ctx.level.tile_count());
        self.director.on_level_entry(&mut self.ctx.level);

        if let Some(coords) = self.pending_spawn.take() {
            self.ctx.level.erase_records(EntityTag::Player);
            self.ctx
                .level
                .insert_record(EntityTag::Player, SpawnRecord::Generic { coords });
        }

        let player_record = match self.ctx.level.records(EntityTag::Player).first() {
            Some(record) => record.clone(),
            None => {
                warn!(level = %self.current_level, "player_spawn_missing_using_origin");
                SpawnRecord::Generic {
                    coords: GridPoint::default(),
                }
            }
        };
        self.player.get_mut().on_level_change(&player_record);

        let level = &self.ctx.level;
        let decorations = self
            .decorations
            .on_level_change_all(level.records(EntityTag::Decoration));
        let interactables = self
            .interactables
            .on_level_change_all(level.records(EntityTag::Interactable));
        let teleporters = self
            .teleporters
            .on_level_change_all(level.records(EntityTag::Teleporter));
        let slimes = self.slimes.on_level_change_all(level.records(EntityTag::Slime));
        self.projectiles.clear();

        self.listener.on_level_change(&self.current_level);
        info!(
            level = %self.current_level,
            generation = level.generation(),
            player = ?player_record.coords(),
            decorations,
            interactables,
            teleporters,
            slimes,
            "level_changed"
        );
    }

    /// Re-derives every destination rect from grid state; same order as
    /// `on_level_change`. Safe to repeat.
    pub(crate) fn broadcast_window_change(&mut self) {
        let viewport = &self.ctx.viewport;
        self.player.get_mut().on_window_change(viewport);
        self.decorations.on_window_change_all(viewport);
        self.interactables.on_window_change_all(viewport);
        self.teleporters.on_window_change_all(viewport);
        self.slimes.on_window_change_all(viewport);
        self.projectiles.on_window_change_all(viewport);
        self.dialogue.on_window_change(viewport.window_size());
        self.refresh_camera();
    }

    fn refresh_camera(&mut self) {
        let focus = self.player.get().dest_rect();
        self.ctx.camera = self.ctx.viewport.camera_offset(focus);
    }

    fn set_state(&mut self, state: GameState) {
        if self.ctx.state != state {
            debug!(from = self.ctx.state.as_str(), to = state.as_str(), "game_state_changed");
            self.ctx.state = state;
        }
    }

    fn start_game(&mut self) {
        self.current_level = self.settings.start_level.clone();
        self.pending_spawn = None;
        self.dialogue.clear();
        self.set_state(GameState::IngamePlaying);
        self.on_level_change();
        self.broadcast_window_change();
    }

    fn begin_loading(&mut self) {
        self.loading_frames_left = self.settings.loading_idle_frames;
        self.dialogue.clear();
        self.set_state(GameState::Loading);
    }

    fn open_dialogue(&mut self, lines: Vec<String>) {
        if !self.dialogue.enqueue(lines) {
            return;
        }
        debug!(lines = self.dialogue.pending_lines(), "dialogue_opened");
        if self.ctx.state == GameState::IngamePlaying {
            self.set_state(GameState::IngameDialogue);
        }
    }

    fn teleport(&mut self, target_level: LevelId, target_coords: GridPoint) {
        if !self.catalog.contains(&target_level) {
            warn!(level = %target_level, "teleport_target_unknown_ignored");
            return;
        }
        info!(
            from = %self.current_level,
            to = %target_level,
            coords = ?target_coords,
            "teleport_triggered"
        );
        self.current_level = target_level;
        self.pending_spawn = Some(target_coords);
        self.on_level_change();
        self.broadcast_window_change();
    }

    fn step_loading(&mut self) {
        if self.loading_frames_left == 0 {
            self.set_state(GameState::Menu);
        } else {
            self.loading_frames_left -= 1;
        }
    }

    fn step_playing(&mut self, input: &InputSnapshot) {
        self.update_entities(input);
        self.resolve_interactions();
        self.run_director();
        self.drain_events();
        self.slimes.handle_termination();
        self.refresh_camera();
    }

    /// Movement and animation for every pool, player first.
    fn update_entities(&mut self, input: &InputSnapshot) {
        let Some(map) = self.ctx.level.map() else {
            return;
        };
        let viewport = &self.ctx.viewport;
        let solid: HashSet<GridPoint> = self.interactables.iter().map(Interactable::coords).collect();
        let slime_cells: HashSet<GridPoint> = self
            .slimes
            .iter()
            .filter(|slime| slime.is_alive())
            .flat_map(|slime| [Some(slime.coords()), slime.motion().next()])
            .flatten()
            .collect();

        let player = self.player.get_mut();
        player.handle_input(
            input,
            map,
            |point| solid.contains(&point) || slime_cells.contains(&point),
            &mut self.events,
        );
        player.initiate_animation();
        player.update(viewport, &mut self.events);

        self.decorations.for_each(Decoration::update_animation);
        self.interactables.for_each(Interactable::update_animation);
        self.teleporters.for_each(Teleporter::update_animation);

        let player_target = player.motion().target();
        let mut occupied = solid;
        occupied.extend(slime_cells);
        occupied.insert(player.coords());
        occupied.insert(player_target);
        self.slimes.for_each(|slime| {
            slime.calculate_move(player_target, map, &mut occupied);
            slime.initiate_animation();
            slime.update(viewport);
        });

        self.projectiles.handle_termination();
        self.projectiles
            .for_each(|projectile| projectile.update(map, viewport));
    }

    fn resolve_interactions(&mut self) {
        let tile_px = self.ctx.viewport.tile_px();
        let player = self.player.get_mut();

        if let Some(teleporter) = interaction::teleporter_hit(player, &self.teleporters) {
            self.events.post(GameEvent::Teleport {
                target_level: teleporter.target_level().clone(),
                target_coords: teleporter.target_coords(),
            });
            return;
        }

        if let Some(slime_id) = interaction::slime_contact(player, &self.slimes, tile_px) {
            debug!(slime = slime_id.0, "player_slime_contact");
            player.halt();
        }

        self.slimes.for_each(|slime| {
            if !slime.is_alive() {
                return;
            }
            if interaction::initiates_attack(slime, &*player, tile_px) {
                slime.face_toward(player.coords());
                slime.animator_mut().request(AnimationType::Attack);
            }
            if interaction::registers_hit(&*player, &*slime, tile_px) {
                let outcome = apply_hit(player.stats(), player.animator().current(), &mut *slime);
                debug!(damage = outcome.damage, hp = slime.stats().hp, "slime_hit");
            }
            if interaction::registers_hit(&*slime, &*player, tile_px) {
                let outcome = apply_hit(slime.stats(), slime.animator().current(), &mut *player);
                debug!(
                    damage = outcome.damage,
                    hp = player.stats().hp,
                    max_hp = player.stats().max_hp,
                    "player_hit"
                );
            }
        });

        let projectile_stats = Stats::new(1, PROJECTILE_ATTACK, 0);
        for (projectile_id, slime_id) in interaction::projectile_hits(&self.projectiles, &self.slimes) {
            if let Some(projectile) = self.projectiles.get_mut(projectile_id) {
                projectile.terminate();
            }
            if let Some(slime) = self.slimes.get_mut(slime_id) {
                let outcome = apply_hit(&projectile_stats, AnimationType::Attack, slime);
                debug!(damage = outcome.damage, hp = slime.stats().hp, "slime_hit_by_projectile");
            }
        }
    }

    fn run_director(&mut self) {
        let view = {
            let motion = self.player.get().motion();
            PlayerView {
                coords: motion.coords(),
                next: motion.next(),
            }
        };
        let effects = self
            .director
            .step(&mut self.ctx.level, view, &self.ctx.viewport);
        for effect in effects {
            match effect {
                DirectorEffect::Dialogue(lines) => self.open_dialogue(lines),
                DirectorEffect::HaltPlayer => self.player.get_mut().halt(),
                DirectorEffect::ReplaceSlimes => {
                    self.slimes
                        .on_level_change_all(self.ctx.level.records(EntityTag::Slime));
                    self.broadcast_window_change();
                }
                DirectorEffect::ArmTeleporter => {
                    self.teleporters
                        .on_level_change_all(self.ctx.level.records(EntityTag::Teleporter));
                    self.broadcast_window_change();
                }
                DirectorEffect::WrapPlayer(coords) => {
                    let player = self.player.get_mut();
                    player.motion_mut().warp_to(coords);
                    player.on_window_change(&self.ctx.viewport);
                }
            }
        }
    }

    fn spawn_projectile(&mut self, origin: GridPoint, direction: Direction) {
        self.projectiles.handle_termination();
        let Some(id) = self.projectiles.instantiate(&SpawnRecord::Generic { coords: origin }) else {
            return;
        };
        if let Some(projectile) = self.projectiles.get_mut(id) {
            projectile.launch(direction, &self.ctx.viewport);
        }
        debug!(origin = ?origin, direction = ?direction, "projectile_spawned");
    }

    /// Single consumption point for everything entities posted this step.
    fn drain_events(&mut self) {
        while let Some(event) = self.events.pop() {
            debug!(event = event.name(), "game_event");
            match event {
                GameEvent::Teleport {
                    target_level,
                    target_coords,
                } => self.teleport(target_level, target_coords),
                GameEvent::DeathPending => self.map.get_mut().set_grayscale(true),
                GameEvent::DeathFinalized => {
                    self.map.get_mut().set_grayscale(false);
                    self.dialogue.clear();
                    self.set_state(GameState::GameOver);
                    info!(level = %self.current_level, "player_died");
                }
                GameEvent::ProjectileRequested { origin, direction } => {
                    self.spawn_projectile(origin, direction)
                }
                GameEvent::InteractRequested { lines } => self.open_dialogue(lines),
            }
        }
    }

    fn interact(&mut self) {
        let player = self.player.get();
        if let Some(target) = interaction::facing_interactable(player, &self.interactables) {
            if !target.lines().is_empty() {
                self.events.post(GameEvent::InteractRequested {
                    lines: target.lines().to_vec(),
                });
            }
        }
    }

    fn render_world(&self, canvas: &mut dyn Canvas) {
        let player = self.player.get();
        self.map.get().render(canvas, &self.ctx, player.coords());
        self.decorations.render_all(canvas, &self.ctx);
        self.interactables.render_all(canvas, &self.ctx);
        self.teleporters.render_all(canvas, &self.ctx);
        self.slimes.render_all(canvas, &self.ctx);
        self.projectiles.render_all(canvas, &self.ctx);
        player.render(canvas, &self.ctx);
    }
}

/// Applies the combat outcome of one hit to `defender`.
fn apply_hit<D: Combatant>(
    attacker_stats: &Stats,
    attacker_animation: AnimationType,
    defender: &mut D,
) -> HitOutcome {
    let outcome = interaction::resolve_hit(attacker_stats, attacker_animation, defender.stats());
    defender.stats_mut().take_damage(outcome.damage);
    defender.animator_mut().force(outcome.animation);
    outcome
}

impl Game for SceneOrchestrator {
    fn handle_input(&mut self, event: InputEvent) {
        match (self.ctx.state, event) {
            (_, InputEvent::Quit) => self.set_state(GameState::Exit),
            (GameState::Menu, InputEvent::MouseDown { .. }) => self.start_game(),
            (GameState::GameOver, InputEvent::MouseDown { .. }) => self.set_state(GameState::Menu),
            (
                GameState::IngamePlaying | GameState::IngameDialogue,
                InputEvent::ReturnToMenu,
            ) => self.begin_loading(),
            (GameState::IngamePlaying, InputEvent::ResetLevel) => {
                self.on_level_change();
                self.broadcast_window_change();
            }
            (GameState::IngamePlaying, InputEvent::DialogueTest) => {
                self.open_dialogue(DIALOGUE_TEST_LINES.iter().map(|line| line.to_string()).collect())
            }
            (GameState::IngamePlaying, InputEvent::ToggleCamera) => {
                self.ctx.viewport.switch_camera_mode();
                self.broadcast_window_change();
            }
            (GameState::IngamePlaying, InputEvent::Interact) => self.interact(),
            (GameState::IngameDialogue, InputEvent::Interact) => {
                if !self.dialogue.advance() {
                    self.set_state(GameState::IngamePlaying);
                }
            }
            _ => {}
        }
    }

    fn step_frame(&mut self, input: &InputSnapshot) {
        self.ctx.frame = self.ctx.frame.wrapping_add(1);
        match self.ctx.state {
            GameState::Loading => self.step_loading(),
            GameState::IngamePlaying => self.step_playing(input),
            GameState::IngameDialogue => self.dialogue.update_progress(),
            GameState::Menu | GameState::GameOver | GameState::Exit => {}
        }
    }

    fn render_frame(&self, canvas: &mut dyn Canvas) {
        canvas.clear(Rgba::BLACK);
        let window_size = self.ctx.viewport.window_size();
        match self.ctx.state {
            GameState::Menu => screens::render_menu(canvas, window_size),
            GameState::Loading => screens::render_loading(canvas, window_size),
            GameState::IngamePlaying => self.render_world(canvas),
            GameState::IngameDialogue => {
                self.render_world(canvas);
                self.dialogue.render(canvas);
            }
            GameState::GameOver => screens::render_game_over(canvas, window_size),
            GameState::Exit => {}
        }
        canvas.present();
    }

    fn on_window_change(&mut self, window_size: (u32, u32)) {
        self.ctx.viewport.on_window_change(window_size);
        self.broadcast_window_change();
        debug!(
            width = window_size.0,
            height = window_size.1,
            tile_px = self.ctx.viewport.tile_px(),
            "window_changed"
        );
    }

    fn state(&self) -> GameState {
        self.ctx.state
    }

    fn debug_summary(&self) -> Option<String> {
        self.ctx.is_ingame().then(|| {
            format!(
                "level={} slimes={} projectiles={} frame={}",
                self.current_level,
                self.slimes.len(),
                self.projectiles.len(),
                self.ctx.frame
            )
        })
    }

    fn shutdown(&mut self) {
        info!(
            frames = self.ctx.frame,
            events_posted = self.events.posted_total(),
            "scene_shutdown"
        );
    }
}

#[cfg(test)]
impl SceneOrchestrator {
    pub(crate) fn context(&self) -> &EngineContext {
        &self.ctx
    }

    pub(crate) fn player(&self) -> &Player {
        self.player.get()
    }

    pub(crate) fn player_mut(&mut self) -> &mut Player {
        self.player.get_mut()
    }

    pub(crate) fn slimes(&self) -> &EntityPool<Slime> {
        &self.slimes
    }

    pub(crate) fn slimes_mut(&mut self) -> &mut EntityPool<Slime> {
        &mut self.slimes
    }

    pub(crate) fn teleporters(&self) -> &EntityPool<Teleporter> {
        &self.teleporters
    }

    pub(crate) fn projectiles(&self) -> &EntityPool<Projectile> {
        &self.projectiles
    }

    pub(crate) fn dialogue(&self) -> &DialogueBox {
        &self.dialogue
    }

    pub(crate) fn map_is_grayscale(&self) -> bool {
        self.map.get().is_grayscale()
    }

    pub(crate) fn current_level(&self) -> &LevelId {
        &self.current_level
    }

    pub(crate) fn post_event(&mut self, event: GameEvent) {
        self.events.post(event);
    }
}
