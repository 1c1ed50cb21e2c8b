use crate::world::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

/// Top-left of the visible world rectangle; world and screen are both y-down.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Camera2D {
    pub position: Vec2,
}

impl Camera2D {
    /// Centres `target`, clamped so the view stays inside `world_size` when it fits.
    pub fn follow(target: Vec2, viewport: Viewport, world_size: Vec2) -> Self {
        let axis = |target: f32, view: f32, world: f32| {
            if world <= view {
                (world - view) * 0.5
            } else {
                (target - view * 0.5).clamp(0.0, world - view)
            }
        };
        Self {
            position: Vec2 {
                x: axis(target.x, viewport.width as f32, world_size.x),
                y: axis(target.y, viewport.height as f32, world_size.y),
            },
        }
    }
}

pub fn world_to_screen(world: Vec2, camera: &Camera2D) -> (i32, i32) {
    (
        (world.x - camera.position.x).round() as i32,
        (world.y - camera.position.y).round() as i32,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: Viewport = Viewport {
        width: 800,
        height: 600,
    };

    #[test]
    fn camera_offset_shifts_screen_position() {
        let camera = Camera2D {
            position: Vec2 { x: 10.0, y: -5.0 },
        };
        assert_eq!(world_to_screen(Vec2 { x: 12.0, y: -4.0 }, &camera), (2, 1));
    }

    #[test]
    fn follow_centres_target_inside_large_world() {
        let camera = Camera2D::follow(
            Vec2::new(1000.0, 700.0),
            VIEWPORT,
            Vec2::new(3200.0, 1600.0),
        );
        assert_eq!(camera.position, Vec2::new(600.0, 400.0));
        assert_eq!(world_to_screen(Vec2::new(1000.0, 700.0), &camera), (400, 300));
    }

    #[test]
    fn follow_clamps_at_world_edges() {
        let world = Vec2::new(3200.0, 1600.0);
        let near_origin = Camera2D::follow(Vec2::new(10.0, 10.0), VIEWPORT, world);
        assert_eq!(near_origin.position, Vec2::ZERO);
        let far_corner = Camera2D::follow(Vec2::new(3190.0, 1590.0), VIEWPORT, world);
        assert_eq!(far_corner.position, Vec2::new(2400.0, 1000.0));
    }

    #[test]
    fn small_world_is_centred_in_viewport() {
        let camera = Camera2D::follow(Vec2::new(50.0, 50.0), VIEWPORT, Vec2::new(400.0, 600.0));
        assert_eq!(camera.position, Vec2::new(-200.0, 0.0));
    }
}
