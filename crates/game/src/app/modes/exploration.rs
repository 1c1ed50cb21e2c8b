use strata_engine::{
    world_to_screen, Camera2D, Canvas, ExplorationSession, InputAction, InputSnapshot, Key,
    KeyEvent, Mode, ModeCommand, ModeHandler, ObjectKind, ResourceCache, Rgba, ScreenRect,
    TextureHandle, TickEvent, TileKind, Vec2, Viewport, BASE_LAYER,
};
use tracing::{debug, info};

const LEVEL_MUSIC: &str = "audio/exploration.wav";
const NOTICE_SECONDS: f32 = 2.0;

const SKY_COLOR: Rgba = Rgba([92, 148, 252, 255]);
const ACTOR_COLOR: Rgba = Rgba([232, 80, 64, 255]);
const ITEM_COLOR: Rgba = Rgba([250, 214, 60, 255]);
const ENEMY_COLOR: Rgba = Rgba([140, 30, 140, 255]);
const PORTAL_COLOR: Rgba = Rgba([80, 220, 220, 255]);
const RETURN_COLOR: Rgba = Rgba([220, 220, 220, 255]);
const COLLISION_COLOR: Rgba = Rgba([255, 0, 0, 255]);
const HUD_BACKING: Rgba = Rgba([0, 0, 0, 140]);
const HUD_TEXT: Rgba = Rgba::WHITE;
const NOTICE_TEXT: Rgba = Rgba([255, 240, 160, 255]);
const HUD_SCALE: i32 = 2;

fn tile_color(kind: TileKind) -> Option<Rgba> {
    match kind {
        TileKind::Empty => None,
        TileKind::Wall => Some(Rgba::opaque(110, 104, 96)),
        TileKind::Grass => Some(Rgba::opaque(72, 168, 64)),
        TileKind::Dirt => Some(Rgba::opaque(136, 92, 52)),
        TileKind::Water => Some(Rgba::new(40, 90, 200, 220)),
    }
}

/// Non-base layers are tinted so they read as a separate plane.
fn layer_tint(color: Rgba, layer: usize) -> Rgba {
    if layer == BASE_LAYER {
        return color;
    }
    let [r, g, b, a] = color.0;
    Rgba([r / 2 + 64, g / 2 + 64, b / 2 + 96, a])
}

#[derive(Debug, Clone, PartialEq)]
struct Notice {
    text: String,
    remaining: f32,
}

/// Side-scrolling play over the shared exploration session.
pub(crate) struct ExplorationMode {
    resources: ResourceCache,
    background: Option<TextureHandle>,
    show_collision: bool,
    notice: Option<Notice>,
}

impl ExplorationMode {
    pub(crate) fn new(resources: ResourceCache) -> Self {
        Self {
            resources,
            background: None,
            show_collision: false,
            notice: None,
        }
    }

    fn refresh_background(&mut self, session: &ExplorationSession) {
        self.background = session
            .registry()
            .current()
            .and_then(|level| level.background.as_deref())
            .map(|path| self.resources.load_texture(path))
            .filter(|handle| !handle.is_placeholder());
    }

    fn show_notice(&mut self, text: String) {
        self.notice = Some(Notice {
            text,
            remaining: NOTICE_SECONDS,
        });
    }

    fn apply_event(&mut self, event: TickEvent, session: &ExplorationSession) {
        match event {
            TickEvent::LayerSwitched { to, .. } => self.show_notice(format!("Layer {to}")),
            TickEvent::ItemCollected { name, count } => {
                self.show_notice(format!("Picked up {name} ({count})"))
            }
            TickEvent::EnemyHit => self.show_notice("Ouch!".to_string()),
            TickEvent::LevelLoaded { id } => {
                self.refresh_background(session);
                self.show_notice(format!("Entered {id}"));
            }
            TickEvent::LevelLoadFailed { id } => {
                self.show_notice(format!("Level {id} unavailable"))
            }
        }
    }

    fn render_layer(
        &self,
        canvas: &mut dyn Canvas,
        session: &ExplorationSession,
        layer: usize,
        camera: &Camera2D,
    ) {
        let grid = session.grid();
        let tile_size = grid.tile_size();
        let size = tile_size.ceil() as i32;
        for ty in 0..grid.height() as i64 {
            for tx in 0..grid.width() as i64 {
                let Some(color) = grid
                    .tile_at(layer, tx, ty)
                    .and_then(TileKind::from_id)
                    .and_then(tile_color)
                else {
                    continue;
                };
                let world = Vec2::new(tx as f32 * tile_size, ty as f32 * tile_size);
                let (x, y) = world_to_screen(world, camera);
                canvas.fill_rect(ScreenRect::new(x, y, size, size), layer_tint(color, layer));
            }
        }
    }

    fn render_collision(
        &self,
        canvas: &mut dyn Canvas,
        session: &ExplorationSession,
        camera: &Camera2D,
    ) {
        let grid = session.grid();
        let tile_size = grid.tile_size();
        let size = tile_size.ceil() as i32;
        for ty in 0..grid.height() as i64 {
            for tx in 0..grid.width() as i64 {
                if !grid.is_solid_tile(tx, ty) {
                    continue;
                }
                let world = Vec2::new(tx as f32 * tile_size, ty as f32 * tile_size);
                let (x, y) = world_to_screen(world, camera);
                canvas.stroke_rect(ScreenRect::new(x, y, size, size), COLLISION_COLOR);
            }
        }
        canvas.stroke_rect(actor_rect(session, camera), COLLISION_COLOR);
    }

    fn render_hud(&self, canvas: &mut dyn Canvas, session: &ExplorationSession) {
        let hud = format!(
            "Level: {}  Layer: {}  Items: {}",
            session.current_level_id().unwrap_or("-"),
            session.grid().active_layer(),
            session.inventory().total()
        );
        let (width, height) = canvas.measure_text(&hud, HUD_SCALE);
        canvas.fill_rect(ScreenRect::new(4, 4, width + 8, height + 8), HUD_BACKING);
        canvas.draw_text(&hud, 8, 8, HUD_SCALE, HUD_TEXT);

        if let Some(notice) = &self.notice {
            canvas.draw_text(&notice.text, 8, height + 20, HUD_SCALE, NOTICE_TEXT);
        }
    }
}

fn actor_rect(session: &ExplorationSession, camera: &Camera2D) -> ScreenRect {
    let actor = session.actor();
    let (x, y) = world_to_screen(actor.position(), camera);
    let size = actor.size();
    ScreenRect::new(x, y, size.x.round() as i32, size.y.round() as i32)
}

impl ModeHandler for ExplorationMode {
    fn load(&mut self, session: &mut ExplorationSession) {
        self.notice = None;
        if !session.restart() {
            info!("exploration_started_without_level");
        }
        self.refresh_background(session);
        self.resources.play_audio(LEVEL_MUSIC, true);
    }

    fn update(
        &mut self,
        fixed_dt_seconds: f32,
        input: &InputSnapshot,
        session: &mut ExplorationSession,
    ) -> ModeCommand {
        session.set_move_intent(
            input.is_down(InputAction::MoveLeft),
            input.is_down(InputAction::MoveRight),
        );
        for event in session.tick() {
            self.apply_event(event, session);
        }
        if let Some(notice) = &mut self.notice {
            notice.remaining -= fixed_dt_seconds;
            if notice.remaining <= 0.0 {
                self.notice = None;
            }
        }
        ModeCommand::None
    }

    fn render(&mut self, canvas: &mut dyn Canvas, session: &ExplorationSession) {
        let (width, height) = canvas.size();
        canvas.clear(SKY_COLOR);
        if let Some(handle) = self.background {
            canvas.draw_texture(
                self.resources.texture(handle),
                ScreenRect::new(0, 0, width as i32, height as i32),
            );
        }

        let grid = session.grid();
        let camera = Camera2D::follow(
            session.actor().center(),
            Viewport { width, height },
            grid.world_size(),
        );
        let active = grid.active_layer();
        if grid.is_layer_visible(BASE_LAYER) {
            self.render_layer(canvas, session, BASE_LAYER, &camera);
        }
        if active != BASE_LAYER && grid.is_layer_visible(active) {
            self.render_layer(canvas, session, active, &camera);
        }

        for object in grid.objects_on_layer(active) {
            let color = match object.kind {
                ObjectKind::Item { .. } => ITEM_COLOR,
                ObjectKind::Enemy => ENEMY_COLOR,
                ObjectKind::LayerPortal { .. } => PORTAL_COLOR,
                ObjectKind::LayerReturn => RETURN_COLOR,
            };
            let (x, y) = world_to_screen(object.position, &camera);
            canvas.fill_rect(
                ScreenRect::new(
                    x,
                    y,
                    object.size.x.round() as i32,
                    object.size.y.round() as i32,
                ),
                color,
            );
        }

        canvas.fill_rect(actor_rect(session, &camera), ACTOR_COLOR);
        if self.show_collision {
            self.render_collision(canvas, session, &camera);
        }
        self.render_hud(canvas, session);
    }

    fn handle_input(&mut self, event: KeyEvent, session: &mut ExplorationSession) -> ModeCommand {
        if !event.is_press() {
            return ModeCommand::None;
        }
        match event.key {
            Key::Space => {
                session.request_jump();
                ModeCommand::None
            }
            Key::Escape | Key::P => ModeCommand::Pause,
            Key::V => ModeCommand::SwitchTo(Mode::Dialogue),
            Key::C => {
                self.show_collision = !self.show_collision;
                debug!(enabled = self.show_collision, "collision_view_toggled");
                ModeCommand::None
            }
            _ => ModeCommand::None,
        }
    }

    fn unload(&mut self, session: &mut ExplorationSession) {
        session.set_move_intent(false, false);
        self.background = None;
        self.notice = None;
        self.resources.release();
    }

    fn debug_title(&self, session: &ExplorationSession) -> Option<String> {
        let position = session.actor().position();
        Some(format!(
            "{} layer {} at {:.0},{:.0}",
            session.current_level_id().unwrap_or("-"),
            session.grid().active_layer(),
            position.x,
            position.y
        ))
    }
}
