use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use pixels::Error as PixelsError;
use thiserror::Error;
use tracing::{debug, info, warn};
use winit::dpi::LogicalSize;
use winit::error::{EventLoopError, OsError};
use winit::event::{ElementState, Event, MouseButton, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::WindowBuilder;

use super::metrics::MetricsAccumulator;
use super::{ActionStates, Game, GameState, InputAction, InputEvent, InputSnapshot, Renderer};

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub window_title: String,
    pub window_width: u32,
    pub window_height: u32,
    pub target_tps: u32,
    pub max_frame_delta: Duration,
    pub max_ticks_per_frame: u32,
    pub metrics_log_interval: Duration,
    pub max_render_fps: Option<u32>,
    pub sprites_dir: PathBuf,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            window_title: "tilegame".to_string(),
            window_width: 1280,
            window_height: 720,
            target_tps: 60,
            max_frame_delta: Duration::from_millis(250),
            max_ticks_per_frame: 5,
            metrics_log_interval: Duration::from_secs(1),
            max_render_fps: Some(60),
            sprites_dir: PathBuf::from("assets/sprites"),
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to create event loop: {0}")]
    CreateEventLoop(#[source] EventLoopError),
    #[error("failed to create application window: {0}")]
    CreateWindow(#[source] OsError),
    #[error("failed to initialize renderer: {0}")]
    CreateRenderer(#[source] PixelsError),
    #[error("event loop failed: {0}")]
    EventLoopRun(#[source] EventLoopError),
}

/// Opens the window and drives `game` until it reaches [`GameState::Exit`]
/// or the window is closed.
pub fn run_app(config: LoopConfig, mut game: Box<dyn Game>) -> Result<(), AppError> {
    let event_loop = EventLoop::new().map_err(AppError::CreateEventLoop)?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(config.window_title.clone())
            .with_inner_size(LogicalSize::new(
                config.window_width as f64,
                config.window_height as f64,
            ))
            .build(&event_loop)
            .map_err(AppError::CreateWindow)?,
    );
    let mut renderer = Renderer::new(Arc::clone(&window), config.sprites_dir.clone())
        .map_err(AppError::CreateRenderer)?;

    event_loop.set_control_flow(ControlFlow::Poll);

    let target_tps = config.target_tps.max(1);
    let max_frame_delta =
        normalize_non_zero_duration(config.max_frame_delta, Duration::from_millis(250));
    let max_ticks_per_frame = config.max_ticks_per_frame.max(1);
    let metrics_log_interval =
        normalize_non_zero_duration(config.metrics_log_interval, Duration::from_secs(1));
    let fixed_dt = Duration::from_secs_f64(1.0 / target_tps as f64);
    let render_cap = config.max_render_fps.filter(|fps| *fps > 0);
    let render_frame_target = target_frame_duration(render_cap);

    let initial_size = window.inner_size();
    let mut input = InputCollector::new(initial_size.width, initial_size.height);
    game.on_window_change((initial_size.width, initial_size.height));

    info!(
        target_tps,
        max_frame_delta_ms = max_frame_delta.as_millis() as u64,
        max_ticks_per_frame,
        metrics_log_interval_ms = metrics_log_interval.as_millis() as u64,
        render_fps_cap = ?render_cap,
        sprites_dir = %config.sprites_dir.display(),
        "loop_config"
    );

    let mut accumulator = Duration::ZERO;
    let mut last_frame_instant = Instant::now();
    let mut last_present_instant = Instant::now();
    let mut metrics = MetricsAccumulator::new(metrics_log_interval, Instant::now());
    let window_for_loop = Arc::clone(&window);

    event_loop
        .run(move |event, window_target| match event {
            Event::WindowEvent { window_id, event } if window_id == window_for_loop.id() => {
                match event {
                    WindowEvent::CloseRequested => {
                        info!(reason = "window_close", "shutdown_requested");
                        input.push_event(InputEvent::Quit);
                    }
                    WindowEvent::Resized(new_size) => {
                        apply_resize(
                            &mut renderer,
                            &mut input,
                            game.as_mut(),
                            (new_size.width, new_size.height),
                        );
                    }
                    WindowEvent::ScaleFactorChanged { .. } => {
                        let size = window_for_loop.inner_size();
                        apply_resize(
                            &mut renderer,
                            &mut input,
                            game.as_mut(),
                            (size.width, size.height),
                        );
                    }
                    WindowEvent::CursorMoved { position, .. } => {
                        input.set_cursor_position_px(position.x as f32, position.y as f32);
                    }
                    WindowEvent::MouseInput { state, button, .. } => {
                        input.handle_mouse_input(button, state);
                    }
                    WindowEvent::KeyboardInput { event, .. } => {
                        input.handle_key(event.physical_key, event.state);
                    }
                    WindowEvent::RedrawRequested => {
                        for pending in input.drain_events() {
                            game.handle_input(pending);
                        }
                        if game.state() == GameState::Exit {
                            window_target.exit();
                            return;
                        }

                        let now = Instant::now();
                        let raw_frame_dt = now.saturating_duration_since(last_frame_instant);
                        last_frame_instant = now;
                        let clamped_frame_dt = clamp_frame_delta(raw_frame_dt, max_frame_delta);
                        accumulator = accumulator.saturating_add(clamped_frame_dt);

                        let step_plan = plan_sim_steps(accumulator, fixed_dt, max_ticks_per_frame);
                        for _ in 0..step_plan.ticks_to_run {
                            game.step_frame(&input.snapshot_for_tick());
                            metrics.record_tick();
                        }
                        accumulator = step_plan.remaining_accumulator;
                        if step_plan.dropped_backlog > Duration::ZERO {
                            warn!(
                                dropped_backlog_ms = step_plan.dropped_backlog.as_millis() as u64,
                                max_ticks_per_frame, "sim_clamp_triggered"
                            );
                        }

                        let cap_sleep = compute_cap_sleep(
                            Instant::now().saturating_duration_since(last_present_instant),
                            render_frame_target,
                        );
                        if cap_sleep > Duration::ZERO {
                            thread::sleep(cap_sleep);
                        }

                        game.render_frame(&mut renderer);
                        last_present_instant = Instant::now();
                        if let Some(error) = renderer.take_error() {
                            warn!(error = %error, "renderer_present_failed");
                            window_target.exit();
                            return;
                        }

                        metrics.record_frame(raw_frame_dt);
                        if let Some(snapshot) = metrics.maybe_snapshot(now) {
                            let title = snapshot.window_title(&config.window_title);
                            window_for_loop.set_title(&title);
                            info!(
                                fps = snapshot.fps,
                                tps = snapshot.tps,
                                frame_time_ms = snapshot.frame_time_ms,
                                state = game.state().as_str(),
                                summary = game.debug_summary().unwrap_or_default(),
                                "loop_metrics"
                            );
                        }

                        if game.state() == GameState::Exit {
                            window_target.exit();
                        }
                    }
                    _ => {}
                }
            }
            Event::AboutToWait => {
                window_for_loop.request_redraw();
            }
            Event::LoopExiting => {
                game.shutdown();
                info!("shutdown");
            }
            _ => {}
        })
        .map_err(AppError::EventLoopRun)
}

fn apply_resize(
    renderer: &mut Renderer,
    input: &mut InputCollector,
    game: &mut dyn Game,
    (width, height): (u32, u32),
) {
    if width == 0 || height == 0 {
        debug!(width, height, "window_minimized_resize_ignored");
        return;
    }
    input.set_window_size(width, height);
    if let Err(error) = renderer.resize(width, height) {
        warn!(error = %error, "renderer_resize_failed");
    }
    game.on_window_change((width, height));
}

/// Turns raw window events into an ordered queue of discrete
/// [`InputEvent`]s plus a continuous [`ActionStates`] snapshot.
#[derive(Debug, Default)]
struct InputCollector {
    action_states: ActionStates,
    keys_down: HashSet<KeyCode>,
    pending_events: Vec<InputEvent>,
    cursor_position_px: Option<(f32, f32)>,
    left_mouse_is_down: bool,
    window_width: u32,
    window_height: u32,
}

impl InputCollector {
    fn new(window_width: u32, window_height: u32) -> Self {
        Self {
            window_width,
            window_height,
            ..Self::default()
        }
    }

    fn push_event(&mut self, event: InputEvent) {
        self.pending_events.push(event);
    }

    fn drain_events(&mut self) -> Vec<InputEvent> {
        std::mem::take(&mut self.pending_events)
    }

    fn handle_key(&mut self, key: PhysicalKey, state: ElementState) {
        let PhysicalKey::Code(code) = key else {
            return;
        };
        let is_pressed = state == ElementState::Pressed;
        if let Some(action) = InputAction::from_key(code) {
            self.action_states.set(action, is_pressed);
        }
        if !is_pressed {
            self.keys_down.remove(&code);
            return;
        }
        let is_new_press = self.keys_down.insert(code);
        if is_new_press {
            if let Some(event) = InputEvent::from_key(code) {
                self.push_event(event);
            }
        }
    }

    fn handle_mouse_input(&mut self, button: MouseButton, state: ElementState) {
        if button != MouseButton::Left {
            return;
        }
        match state {
            ElementState::Pressed => {
                if !self.left_mouse_is_down {
                    let (x, y) = self.cursor_position_px.unwrap_or_default();
                    self.push_event(InputEvent::MouseDown { x, y });
                }
                self.left_mouse_is_down = true;
            }
            ElementState::Released => self.left_mouse_is_down = false,
        }
    }

    fn set_cursor_position_px(&mut self, x: f32, y: f32) {
        self.cursor_position_px = Some((x, y));
    }

    fn set_window_size(&mut self, width: u32, height: u32) {
        self.window_width = width;
        self.window_height = height;
    }

    fn snapshot_for_tick(&self) -> InputSnapshot {
        InputSnapshot::new(self.action_states, (self.window_width, self.window_height))
    }
}

#[derive(Debug, Clone, Copy)]
struct StepPlan {
    ticks_to_run: u32,
    remaining_accumulator: Duration,
    dropped_backlog: Duration,
}

fn plan_sim_steps(
    mut accumulator: Duration,
    fixed_dt: Duration,
    max_ticks_per_frame: u32,
) -> StepPlan {
    let mut ticks_to_run = 0u32;

    while accumulator >= fixed_dt && ticks_to_run < max_ticks_per_frame {
        accumulator = accumulator.saturating_sub(fixed_dt);
        ticks_to_run = ticks_to_run.saturating_add(1);
    }

    let dropped_backlog = if accumulator >= fixed_dt {
        std::mem::take(&mut accumulator)
    } else {
        Duration::ZERO
    };
    StepPlan {
        ticks_to_run,
        remaining_accumulator: accumulator,
        dropped_backlog,
    }
}

fn clamp_frame_delta(frame_dt: Duration, max_frame_delta: Duration) -> Duration {
    frame_dt.min(max_frame_delta)
}

fn normalize_non_zero_duration(value: Duration, fallback: Duration) -> Duration {
    if value.is_zero() {
        fallback
    } else {
        value
    }
}

fn target_frame_duration(max_render_fps: Option<u32>) -> Option<Duration> {
    max_render_fps.map(|fps| Duration::from_secs_f64(1.0 / fps as f64))
}

fn compute_cap_sleep(elapsed: Duration, target: Option<Duration>) -> Duration {
    match target {
        Some(frame_target) if elapsed < frame_target => frame_target - elapsed,
        _ => Duration::ZERO,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(input: &mut InputCollector, code: KeyCode) {
        input.handle_key(PhysicalKey::Code(code), ElementState::Pressed);
    }

    fn release(input: &mut InputCollector, code: KeyCode) {
        input.handle_key(PhysicalKey::Code(code), ElementState::Released);
    }

    #[test]
    fn clamp_frame_delta_caps_large_frame() {
        let max_frame_delta = Duration::from_millis(250);
        assert_eq!(
            clamp_frame_delta(Duration::from_millis(600), max_frame_delta),
            max_frame_delta
        );
    }

    #[test]
    fn plan_sim_steps_runs_expected_ticks_without_drop() {
        let fixed_dt = Duration::from_millis(16);
        let result = plan_sim_steps(Duration::from_millis(48), fixed_dt, 5);

        assert_eq!(result.ticks_to_run, 3);
        assert_eq!(result.remaining_accumulator, Duration::ZERO);
        assert_eq!(result.dropped_backlog, Duration::ZERO);
    }

    #[test]
    fn plan_sim_steps_keeps_partial_tick() {
        let fixed_dt = Duration::from_millis(16);
        let result = plan_sim_steps(Duration::from_millis(20), fixed_dt, 5);

        assert_eq!(result.ticks_to_run, 1);
        assert_eq!(result.remaining_accumulator, Duration::from_millis(4));
    }

    #[test]
    fn plan_sim_steps_drops_backlog_when_tick_cap_hit() {
        let fixed_dt = Duration::from_millis(16);
        let result = plan_sim_steps(Duration::from_millis(120), fixed_dt, 3);

        assert_eq!(result.ticks_to_run, 3);
        assert_eq!(result.remaining_accumulator, Duration::ZERO);
        assert_eq!(result.dropped_backlog, Duration::from_millis(72));
    }

    #[test]
    fn discrete_key_is_queued_once_per_press() {
        let mut input = InputCollector::new(1280, 720);

        press(&mut input, KeyCode::KeyR);
        press(&mut input, KeyCode::KeyR);
        assert_eq!(input.drain_events(), vec![InputEvent::ResetLevel]);

        release(&mut input, KeyCode::KeyR);
        press(&mut input, KeyCode::KeyR);
        assert_eq!(input.drain_events(), vec![InputEvent::ResetLevel]);
        assert!(input.drain_events().is_empty());
    }

    #[test]
    fn discrete_events_keep_arrival_order() {
        let mut input = InputCollector::new(1280, 720);
        press(&mut input, KeyCode::KeyT);
        press(&mut input, KeyCode::KeyM);
        press(&mut input, KeyCode::Escape);

        assert_eq!(
            input.drain_events(),
            vec![
                InputEvent::DialogueTest,
                InputEvent::ReturnToMenu,
                InputEvent::Quit
            ]
        );
    }

    #[test]
    fn wasd_and_arrow_keys_map_to_actions() {
        let mut input = InputCollector::default();
        press(&mut input, KeyCode::KeyW);
        press(&mut input, KeyCode::ArrowLeft);
        press(&mut input, KeyCode::ShiftLeft);

        let snapshot = input.snapshot_for_tick();
        assert!(snapshot.is_down(InputAction::MoveUp));
        assert!(snapshot.is_down(InputAction::MoveLeft));
        assert!(snapshot.is_down(InputAction::Run));
        assert!(input.drain_events().is_empty());
    }

    #[test]
    fn key_release_clears_action_state() {
        let mut input = InputCollector::default();
        press(&mut input, KeyCode::KeyD);
        release(&mut input, KeyCode::KeyD);

        assert!(!input.snapshot_for_tick().is_down(InputAction::MoveRight));
    }

    #[test]
    fn left_click_queues_mouse_down_at_cursor_once() {
        let mut input = InputCollector::new(1280, 720);
        input.set_cursor_position_px(100.0, 200.0);
        input.handle_mouse_input(MouseButton::Left, ElementState::Pressed);
        input.handle_mouse_input(MouseButton::Left, ElementState::Pressed);
        input.handle_mouse_input(MouseButton::Right, ElementState::Pressed);

        assert_eq!(
            input.drain_events(),
            vec![InputEvent::MouseDown { x: 100.0, y: 200.0 }]
        );
    }

    #[test]
    fn snapshot_carries_window_size() {
        let mut input = InputCollector::new(1280, 720);
        input.set_window_size(800, 600);
        assert_eq!(input.snapshot_for_tick().window_size(), (800, 600));
    }

    #[test]
    fn compute_cap_sleep_zero_when_over_budget() {
        let sleep = compute_cap_sleep(Duration::from_millis(20), target_frame_duration(Some(60)));
        assert_eq!(sleep, Duration::ZERO);
    }

    #[test]
    fn compute_cap_sleep_positive_when_under_budget() {
        let sleep = compute_cap_sleep(Duration::from_millis(5), target_frame_duration(Some(60)));
        assert!(sleep > Duration::ZERO);
    }
}
