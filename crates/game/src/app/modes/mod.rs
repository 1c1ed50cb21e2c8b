mod dialogue;
mod exploration;
mod frontend;
mod menu;
mod pause;

use std::path::Path;

use strata_engine::{Canvas, ModeHandlers, ResourceCache, Rgba, SilentAudio, StoryScript};

pub(crate) use dialogue::DialogueMode;
pub(crate) use exploration::ExplorationMode;
pub(crate) use frontend::FrontendMode;
pub(crate) use pause::PauseMode;

pub(crate) fn build_handlers(asset_root: &Path, story: StoryScript) -> ModeHandlers {
    ModeHandlers {
        frontend: Box::new(FrontendMode::new(new_cache(asset_root))),
        exploration: Box::new(ExplorationMode::new(new_cache(asset_root))),
        dialogue: Box::new(DialogueMode::new(story, new_cache(asset_root))),
        paused: Box::new(PauseMode::new()),
    }
}

/// Each mode gets its own cache, released when the mode unloads.
fn new_cache(asset_root: &Path) -> ResourceCache {
    ResourceCache::new(asset_root, Box::new(SilentAudio::default()))
}

fn draw_centered_text(canvas: &mut dyn Canvas, text: &str, y: i32, scale: i32, color: Rgba) {
    let (width, _) = canvas.size();
    let (text_width, _) = canvas.measure_text(text, scale);
    canvas.draw_text(text, (width as i32 - text_width) / 2, y, scale, color);
}
