use super::canvas::{Canvas, Rgba, ScreenRect};
use crate::app::metrics::LoopMetricsSnapshot;
use crate::app::mode::Mode;

const TEXT_SCALE: i32 = 2;
const LINE_ADVANCE: i32 = 7 * TEXT_SCALE;
const OVERLAY_PADDING: i32 = 6 * TEXT_SCALE;
const OVERLAY_PANEL_INSET_X: i32 = 4 * TEXT_SCALE;
const OVERLAY_PANEL_INSET_Y: i32 = 3 * TEXT_SCALE;
const OVERLAY_TEXT_PRIMARY_COLOR: Rgba = Rgba([244, 248, 252, 255]);
const OVERLAY_TEXT_DIM_COLOR: Rgba = Rgba([176, 198, 220, 255]);
const OVERLAY_PANEL_BG_COLOR: Rgba = Rgba([10, 12, 16, 210]);
const OVERLAY_PANEL_BORDER_COLOR: Rgba = Rgba([92, 106, 126, 255]);
const PERF_SECTION_LABEL: &str = "Perf";
const MODE_SECTION_LABEL: &str = "Mode";

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct OverlayData {
    pub metrics: LoopMetricsSnapshot,
    pub update_rate_hz: u32,
    pub render_rate_hz: u32,
    pub mode: Mode,
    pub suspended: Mode,
    pub title: Option<String>,
}

pub(crate) fn draw_overlay(canvas: &mut dyn Canvas, data: &OverlayData) {
    let (width, height) = canvas.size();
    if width == 0 || height == 0 {
        return;
    }

    let lines = build_overlay_lines(data);
    let panel_width = lines
        .iter()
        .map(|line| canvas.measure_text(line, TEXT_SCALE).0)
        .max()
        .unwrap_or(0)
        + OVERLAY_PANEL_INSET_X * 2;
    let panel_height = lines.len() as i32 * LINE_ADVANCE + OVERLAY_PANEL_INSET_Y * 2;
    let panel = ScreenRect::new(
        OVERLAY_PADDING - OVERLAY_PANEL_INSET_X,
        OVERLAY_PADDING - OVERLAY_PANEL_INSET_Y,
        panel_width,
        panel_height,
    );
    canvas.fill_rect(panel, OVERLAY_PANEL_BG_COLOR);
    canvas.stroke_rect(panel, OVERLAY_PANEL_BORDER_COLOR);

    let mut y = OVERLAY_PADDING;
    for line in &lines {
        canvas.draw_text(line, OVERLAY_PADDING, y, TEXT_SCALE, overlay_line_color(line));
        y += LINE_ADVANCE;
    }
}

fn build_overlay_lines(data: &OverlayData) -> Vec<String> {
    let mut lines = vec![
        PERF_SECTION_LABEL.to_string(),
        format_fps_line(data.metrics.fps, data.render_rate_hz),
        format!("TPS: {:.1} / {}", data.metrics.tps, data.update_rate_hz),
        format!("Frame: {:.2} ms", data.metrics.frame_time_ms),
        format!("Faults: {}", data.metrics.faults),
        String::new(),
        MODE_SECTION_LABEL.to_string(),
    ];
    if data.mode == Mode::Paused {
        lines.push(format!("{} (over {})", data.mode, data.suspended));
    } else {
        lines.push(data.mode.to_string());
    }
    if let Some(title) = &data.title {
        lines.push(title.clone());
    }
    lines
}

fn overlay_line_color(line: &str) -> Rgba {
    if matches!(line, PERF_SECTION_LABEL | MODE_SECTION_LABEL) {
        OVERLAY_TEXT_DIM_COLOR
    } else {
        OVERLAY_TEXT_PRIMARY_COLOR
    }
}

fn format_fps_line(current_fps: f32, render_rate_hz: u32) -> String {
    format!("FPS: {:.0} / {}", current_fps, render_rate_hz)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::resources::Texture;

    #[derive(Default)]
    struct RecordingCanvas {
        fills: Vec<(ScreenRect, Rgba)>,
        texts: Vec<String>,
    }

    impl Canvas for RecordingCanvas {
        fn size(&self) -> (u32, u32) {
            (320, 180)
        }
        fn clear(&mut self, _color: Rgba) {}
        fn fill_rect(&mut self, rect: ScreenRect, color: Rgba) {
            self.fills.push((rect, color));
        }
        fn stroke_rect(&mut self, _rect: ScreenRect, _color: Rgba) {}
        fn draw_texture(&mut self, _texture: &Texture, _dest: ScreenRect) {}
        fn draw_text(&mut self, text: &str, _x: i32, _y: i32, _scale: i32, _color: Rgba) {
            self.texts.push(text.to_string());
        }
    }

    fn data(mode: Mode) -> OverlayData {
        OverlayData {
            metrics: LoopMetricsSnapshot {
                fps: 59.6,
                tps: 60.0,
                frame_time_ms: 16.5,
                faults: 0,
            },
            update_rate_hz: 60,
            render_rate_hz: 60,
            mode,
            suspended: Mode::Exploration,
            title: Some("level1 layer 0".to_string()),
        }
    }

    #[test]
    fn draws_backing_plate_before_text() {
        let mut canvas = RecordingCanvas::default();
        draw_overlay(&mut canvas, &data(Mode::Exploration));

        assert_eq!(canvas.fills.len(), 1);
        assert_eq!(canvas.fills[0].1, OVERLAY_PANEL_BG_COLOR);
        assert!(canvas.fills[0].0.width > 0);
        assert_eq!(canvas.texts[1], "FPS: 60 / 60");
        assert_eq!(canvas.texts.last().map(String::as_str), Some("level1 layer 0"));
    }

    #[test]
    fn paused_line_names_interrupted_mode() {
        let lines = build_overlay_lines(&data(Mode::Paused));
        assert!(lines.contains(&"paused (over exploration)".to_string()));
    }

    #[test]
    fn section_labels_are_dimmed() {
        assert_eq!(overlay_line_color("Perf"), OVERLAY_TEXT_DIM_COLOR);
        assert_eq!(overlay_line_color("TPS: 60.0 / 60"), OVERLAY_TEXT_PRIMARY_COLOR);
    }
}
