//! Pure scene construction: a state snapshot and the wall clock in,
//! draw commands out. Nothing here mutates simulation state.

use crate::game::{Airplane, GameState, Obstacle, ObstacleKind, CANVAS_HEIGHT, CANVAS_WIDTH};

/// RGBA color; alpha runs 0.0..=1.0
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }
}

mod palette {
    use super::Color;

    pub const SKY: Color = Color::rgb(0x1e, 0x40, 0xaf);
    pub const CLOUD: Color = Color::rgba(0xff, 0xff, 0xff, 0.2);
    pub const FUSELAGE: Color = Color::rgb(0x9c, 0xa3, 0xaf);
    pub const WINDOW: Color = Color::rgb(0x3b, 0x82, 0xf6);
    pub const WING: Color = Color::rgb(0xdc, 0x26, 0x26);
    pub const ENGINE: Color = Color::rgb(0x37, 0x41, 0x51);
    pub const PROPELLER: Color = Color::rgba(0x64, 0x74, 0x8b, 0.7);
    pub const HUB: Color = Color::rgb(0x1f, 0x29, 0x37);
    pub const BIRD_BODY: Color = Color::rgb(0x78, 0x35, 0x0f);
    pub const BIRD_WING: Color = Color::rgb(0x92, 0x40, 0x0e);
    pub const BIRD_BEAK: Color = Color::rgb(0xfe, 0xf3, 0xc7);
    pub const THUNDER: Color = Color::rgb(0xfb, 0xbf, 0x24);
    pub const STORM_CLOUD: Color = Color::rgb(0x94, 0xa3, 0xb8);
    pub const UFO_SAUCER: Color = Color::rgb(0x63, 0x66, 0xf1);
    pub const UFO_DOME: Color = Color::rgb(0xa5, 0xb4, 0xfc);
    pub const UFO_LIGHTS: [Color; 4] = [
        Color::rgb(0xef, 0x44, 0x44),
        Color::rgb(0x22, 0xc5, 0x5e),
        Color::rgb(0x3b, 0x82, 0xf6),
        Color::rgb(0xfb, 0xbf, 0x24),
    ];
    pub const PANEL: Color = Color::rgba(0x0f, 0x17, 0x2a, 0.85);
    pub const PANEL_EDGE: Color = Color::rgb(0x3b, 0x82, 0xf6);
    pub const WHITE: Color = Color::rgb(0xff, 0xff, 0xff);
    pub const MUTED: Color = Color::rgb(0x94, 0xa3, 0xb8);
    pub const GOLD: Color = Color::rgb(0xfb, 0xbf, 0x24);
    pub const SPEED_BADGE: Color = Color::rgba(0x10, 0xb9, 0x81, 0.9);
    pub const OVERLAY: Color = Color::rgba(0x0f, 0x17, 0x2a, 0.82);
    pub const GAME_OVER: Color = Color::rgb(0xef, 0x44, 0x44);
    pub const ERROR_BAND: Color = Color::rgba(0x7f, 0x1d, 0x1d, 0.9);
}

/// One primitive for the presentation layer to draw, in order
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCmd {
    Clear {
        color: Color,
    },
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: Color,
    },
    Circle {
        cx: f32,
        cy: f32,
        radius: f32,
        color: Color,
    },
    Ellipse {
        cx: f32,
        cy: f32,
        rx: f32,
        ry: f32,
        rotation: f32,
        color: Color,
    },
    Polygon {
        points: Vec<[f32; 2]>,
        color: Color,
    },
    Line {
        from: [f32; 2],
        to: [f32; 2],
        width: f32,
        color: Color,
    },
    Text {
        x: f32,
        y: f32,
        size: f32,
        text: String,
        color: Color,
    },
}

/// Everything the scene shows that is not simulation state
#[derive(Debug, Clone, Default)]
pub struct Hud {
    pub high_score: u32,
    /// True when the just-finished round set a new high score
    pub new_high_score: bool,
    /// Transient last-command indicator, already expired-checked
    pub last_command: Option<String>,
    /// Input device ready; gates the pre-start prompt wording
    pub ready: bool,
    pub error: Option<String>,
}

/// Build the scene for one frame.
pub fn render(state: &GameState, hud: &Hud, now_ms: u64) -> Vec<DrawCmd> {
    let mut out = Vec::new();

    out.push(DrawCmd::Clear {
        color: palette::SKY,
    });
    draw_clouds(&mut out, now_ms);
    draw_airplane(&mut out, &state.airplane, now_ms);
    for obstacle in &state.obstacles {
        draw_obstacle(&mut out, obstacle, now_ms);
    }
    draw_panel(&mut out, state, hud);

    if state.is_active() {
        if let Some(text) = &hud.last_command {
            draw_last_command(&mut out, text);
        }
    }
    if state.game_over {
        draw_game_over(&mut out, state, hud);
    }
    if !state.game_started && !state.game_over {
        draw_prompt(&mut out, hud);
    }
    if let Some(error) = &hud.error {
        draw_error(&mut out, error);
    }

    out
}

/// Background parallax, driven purely by the wall clock.
fn draw_clouds(out: &mut Vec<DrawCmd>, now_ms: u64) {
    for i in 0..6 {
        let drift =
            (i as f32 * 180.0 + now_ms as f32 * 0.015) % (CANVAS_WIDTH + 150.0) - 75.0;
        let y = 60.0 + i as f32 * 25.0;
        for (dx, dy, radius) in [(0.0, 0.0, 22.0), (25.0, -5.0, 28.0), (50.0, 0.0, 22.0)] {
            out.push(DrawCmd::Circle {
                cx: drift + dx,
                cy: y + dy,
                radius,
                color: palette::CLOUD,
            });
        }
    }
}

/// Fixed visual decomposition of the airplane. Only the propeller
/// animates, spun by the wall clock, not by movement.
fn draw_airplane(out: &mut Vec<DrawCmd>, plane: &Airplane, now_ms: u64) {
    let (px, py) = (plane.x, plane.y);

    out.push(DrawCmd::Ellipse {
        cx: px + 40.0,
        cy: py + 17.0,
        rx: 38.0,
        ry: 16.0,
        rotation: 0.0,
        color: palette::FUSELAGE,
    });
    out.push(DrawCmd::Ellipse {
        cx: px + 58.0,
        cy: py + 15.0,
        rx: 12.0,
        ry: 8.0,
        rotation: 0.0,
        color: palette::WINDOW,
    });

    // Upper and lower main wings, then the tail fin
    out.push(DrawCmd::Polygon {
        points: vec![
            [px + 25.0, py + 17.0],
            [px - 8.0, py - 2.0],
            [px - 2.0, py + 10.0],
            [px + 5.0, py + 17.0],
        ],
        color: palette::WING,
    });
    out.push(DrawCmd::Polygon {
        points: vec![
            [px + 25.0, py + 17.0],
            [px - 8.0, py + 36.0],
            [px - 2.0, py + 24.0],
            [px + 5.0, py + 17.0],
        ],
        color: palette::WING,
    });
    out.push(DrawCmd::Polygon {
        points: vec![
            [px + 8.0, py + 17.0],
            [px - 2.0, py + 5.0],
            [px + 3.0, py + 8.0],
            [px + 10.0, py + 14.0],
        ],
        color: palette::WING,
    });

    out.push(DrawCmd::Ellipse {
        cx: px + 72.0,
        cy: py + 17.0,
        rx: 8.0,
        ry: 10.0,
        rotation: 0.0,
        color: palette::ENGINE,
    });

    let spin = now_ms as f32 * 0.03;
    for rotation in [spin, spin + std::f32::consts::FRAC_PI_2] {
        out.push(DrawCmd::Ellipse {
            cx: px + 78.0,
            cy: py + 17.0,
            rx: 22.0,
            ry: 3.0,
            rotation,
            color: palette::PROPELLER,
        });
    }
    out.push(DrawCmd::Circle {
        cx: px + 78.0,
        cy: py + 17.0,
        radius: 4.0,
        color: palette::HUB,
    });

    out.push(DrawCmd::Line {
        from: [px + 15.0, py + 17.0],
        to: [px + 55.0, py + 17.0],
        width: 3.0,
        color: palette::WING,
    });
}

fn draw_obstacle(out: &mut Vec<DrawCmd>, obstacle: &Obstacle, now_ms: u64) {
    let (x, y) = (obstacle.x, obstacle.y);
    match obstacle.kind {
        ObstacleKind::Bird => {
            // Wing flap is phase-shifted by id so a flock desyncs
            let flap = (now_ms as f32 * 0.015 + obstacle.id as f32).sin() * 6.0;
            out.push(DrawCmd::Ellipse {
                cx: x + 25.0,
                cy: y + 20.0,
                rx: 14.0,
                ry: 10.0,
                rotation: 0.0,
                color: palette::BIRD_BODY,
            });
            for (cx, rotation) in [(x + 8.0, -0.4), (x + 42.0, 0.4)] {
                out.push(DrawCmd::Ellipse {
                    cx,
                    cy: y + 18.0 + flap,
                    rx: 18.0,
                    ry: 7.0,
                    rotation,
                    color: palette::BIRD_WING,
                });
            }
            out.push(DrawCmd::Polygon {
                points: vec![
                    [x + 32.0, y + 22.0],
                    [x + 38.0, y + 24.0],
                    [x + 32.0, y + 26.0],
                ],
                color: palette::BIRD_BEAK,
            });
        }
        ObstacleKind::Thunder => {
            out.push(DrawCmd::Polygon {
                points: vec![
                    [x + 15.0, y],
                    [x + 22.0, y + 25.0],
                    [x + 12.0, y + 25.0],
                    [x + 18.0, y + 45.0],
                    [x + 10.0, y + 45.0],
                    [x + 15.0, y + 70.0],
                    [x + 8.0, y + 40.0],
                    [x + 16.0, y + 40.0],
                    [x + 10.0, y + 20.0],
                ],
                color: palette::THUNDER,
            });
        }
        ObstacleKind::Cloud => {
            for (cx, cy, radius) in [
                (x + 12.0, y + 20.0, 15.0),
                (x + 28.0, y + 14.0, 18.0),
                (x + 42.0, y + 20.0, 15.0),
            ] {
                out.push(DrawCmd::Circle {
                    cx,
                    cy,
                    radius,
                    color: palette::STORM_CLOUD,
                });
            }
        }
        ObstacleKind::Ufo => {
            out.push(DrawCmd::Ellipse {
                cx: x + 25.0,
                cy: y + 20.0,
                rx: 24.0,
                ry: 10.0,
                rotation: 0.0,
                color: palette::UFO_SAUCER,
            });
            out.push(DrawCmd::Circle {
                cx: x + 25.0,
                cy: y + 14.0,
                radius: 14.0,
                color: palette::UFO_DOME,
            });
            for (i, color) in palette::UFO_LIGHTS.iter().enumerate() {
                out.push(DrawCmd::Circle {
                    cx: x + 10.0 + i as f32 * 10.0,
                    cy: y + 24.0,
                    radius: 3.0,
                    color: *color,
                });
            }
        }
    }
}

fn draw_panel(out: &mut Vec<DrawCmd>, state: &GameState, hud: &Hud) {
    out.push(DrawCmd::Rect {
        x: 10.0,
        y: 10.0,
        width: 220.0,
        height: 120.0,
        color: palette::PANEL,
    });
    out.push(DrawCmd::Line {
        from: [10.0, 130.0],
        to: [230.0, 130.0],
        width: 2.0,
        color: palette::PANEL_EDGE,
    });
    out.push(DrawCmd::Text {
        x: 25.0,
        y: 50.0,
        size: 32.0,
        text: state.score.to_string(),
        color: palette::WHITE,
    });
    out.push(DrawCmd::Text {
        x: 25.0,
        y: 70.0,
        size: 14.0,
        text: "SCORE".to_string(),
        color: palette::MUTED,
    });
    out.push(DrawCmd::Text {
        x: 25.0,
        y: 100.0,
        size: 24.0,
        text: hud.high_score.to_string(),
        color: palette::GOLD,
    });
    out.push(DrawCmd::Text {
        x: 25.0,
        y: 115.0,
        size: 12.0,
        text: "HIGH SCORE".to_string(),
        color: palette::MUTED,
    });

    out.push(DrawCmd::Rect {
        x: CANVAS_WIDTH - 160.0,
        y: 15.0,
        width: 145.0,
        height: 35.0,
        color: palette::SPEED_BADGE,
    });
    out.push(DrawCmd::Text {
        x: CANVAS_WIDTH - 150.0,
        y: 40.0,
        size: 18.0,
        text: format!("{:.2}x", state.game_speed),
        color: palette::WHITE,
    });
}

fn draw_last_command(out: &mut Vec<DrawCmd>, text: &str) {
    out.push(DrawCmd::Rect {
        x: CANVAS_WIDTH / 2.0 - 110.0,
        y: 20.0,
        width: 220.0,
        height: 40.0,
        color: palette::PANEL,
    });
    out.push(DrawCmd::Text {
        x: CANVAS_WIDTH / 2.0 - 95.0,
        y: 46.0,
        size: 20.0,
        text: text.to_uppercase(),
        color: palette::GOLD,
    });
}

fn draw_game_over(out: &mut Vec<DrawCmd>, state: &GameState, hud: &Hud) {
    out.push(DrawCmd::Rect {
        x: 0.0,
        y: 0.0,
        width: CANVAS_WIDTH,
        height: CANVAS_HEIGHT,
        color: palette::OVERLAY,
    });
    out.push(DrawCmd::Text {
        x: CANVAS_WIDTH / 2.0 - 140.0,
        y: 200.0,
        size: 48.0,
        text: "GAME OVER".to_string(),
        color: palette::GAME_OVER,
    });
    out.push(DrawCmd::Text {
        x: CANVAS_WIDTH / 2.0 - 80.0,
        y: 260.0,
        size: 28.0,
        text: format!("Score: {}", state.score),
        color: palette::WHITE,
    });
    out.push(DrawCmd::Text {
        x: CANVAS_WIDTH / 2.0 - 80.0,
        y: 300.0,
        size: 22.0,
        text: format!("High Score: {}", hud.high_score),
        color: palette::GOLD,
    });
    if hud.new_high_score {
        out.push(DrawCmd::Text {
            x: CANVAS_WIDTH / 2.0 - 110.0,
            y: 345.0,
            size: 26.0,
            text: "NEW HIGH SCORE!".to_string(),
            color: palette::GOLD,
        });
    }
}

fn draw_prompt(out: &mut Vec<DrawCmd>, hud: &Hud) {
    out.push(DrawCmd::Rect {
        x: 0.0,
        y: 0.0,
        width: CANVAS_WIDTH,
        height: CANVAS_HEIGHT,
        color: palette::OVERLAY,
    });
    let text = if hud.ready {
        "Press start to fly"
    } else {
        "Waiting for camera..."
    };
    out.push(DrawCmd::Text {
        x: CANVAS_WIDTH / 2.0 - 120.0,
        y: CANVAS_HEIGHT / 2.0,
        size: 28.0,
        text: text.to_string(),
        color: palette::WHITE,
    });
}

fn draw_error(out: &mut Vec<DrawCmd>, error: &str) {
    out.push(DrawCmd::Rect {
        x: 0.0,
        y: CANVAS_HEIGHT - 60.0,
        width: CANVAS_WIDTH,
        height: 60.0,
        color: palette::ERROR_BAND,
    });
    out.push(DrawCmd::Text {
        x: 20.0,
        y: CANVAS_HEIGHT - 25.0,
        size: 16.0,
        text: error.to_string(),
        color: palette::WHITE,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Obstacle, ObstacleKind};

    fn running_state() -> GameState {
        GameState {
            game_started: true,
            ..GameState::default()
        }
    }

    fn texts(scene: &[DrawCmd]) -> Vec<&str> {
        scene
            .iter()
            .filter_map(|cmd| match cmd {
                DrawCmd::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn render_is_pure() {
        let mut state = running_state();
        state.obstacles.push(Obstacle {
            id: 4,
            x: 400.0,
            y: 120.0,
            width: 50.0,
            height: 50.0,
            speed: 3.5,
            kind: ObstacleKind::Bird,
        });
        let hud = Hud {
            high_score: 90,
            last_command: Some("up".to_string()),
            ready: true,
            ..Hud::default()
        };
        assert_eq!(render(&state, &hud, 12_345), render(&state, &hud, 12_345));
    }

    #[test]
    fn clouds_stay_inside_the_wrap_band() {
        for now in [0u64, 1_000, 999_999, 123_456_789] {
            for cmd in render(&GameState::default(), &Hud::default(), now) {
                if let DrawCmd::Circle { cx, color, .. } = cmd {
                    if color == palette::CLOUD {
                        assert!(cx >= -75.0 && cx <= CANVAS_WIDTH + 125.0, "cloud at {cx}");
                    }
                }
            }
        }
    }

    #[test]
    fn game_over_overlay_appears_only_when_over() {
        let hud = Hud::default();
        let scene = render(&running_state(), &hud, 0);
        assert!(!texts(&scene).contains(&"GAME OVER"));

        let mut state = running_state();
        state.game_over = true;
        state.score = 120;
        let scene = render(&state, &hud, 0);
        let texts = texts(&scene);
        assert!(texts.contains(&"GAME OVER"));
        assert!(texts.contains(&"Score: 120"));
        assert!(!texts.contains(&"NEW HIGH SCORE!"));
    }

    #[test]
    fn new_high_score_banner_follows_the_flag() {
        let mut state = running_state();
        state.game_over = true;
        let hud = Hud {
            high_score: 120,
            new_high_score: true,
            ..Hud::default()
        };
        let scene = render(&state, &hud, 0);
        let texts = texts(&scene);
        assert!(texts.contains(&"NEW HIGH SCORE!"));
        assert!(texts.contains(&"High Score: 120"));
    }

    #[test]
    fn prompt_wording_tracks_readiness() {
        let state = GameState::default();
        let scene = render(&state, &Hud::default(), 0);
        assert!(texts(&scene).contains(&"Waiting for camera..."));

        let ready = Hud {
            ready: true,
            ..Hud::default()
        };
        let scene = render(&state, &ready, 0);
        assert!(texts(&scene).contains(&"Press start to fly"));

        // No prompt once the round has started
        let scene = render(&running_state(), &ready, 0);
        assert!(!texts(&scene).contains(&"Press start to fly"));
    }

    #[test]
    fn last_command_shows_only_during_a_round() {
        let hud = Hud {
            last_command: Some("left".to_string()),
            ready: true,
            ..Hud::default()
        };
        let scene = render(&running_state(), &hud, 0);
        assert!(texts(&scene).contains(&"LEFT"));

        let scene = render(&GameState::default(), &hud, 0);
        assert!(!texts(&scene).contains(&"LEFT"));
    }

    #[test]
    fn error_banner_carries_the_message() {
        let hud = Hud {
            error: Some("microphone permission denied".to_string()),
            ..Hud::default()
        };
        let scene = render(&GameState::default(), &hud, 0);
        assert!(texts(&scene).contains(&"microphone permission denied"));
    }

    #[test]
    fn obstacle_kinds_render_distinct_shapes() {
        let mut state = running_state();
        state.obstacles.push(Obstacle {
            id: 1,
            x: 300.0,
            y: 100.0,
            width: 30.0,
            height: 70.0,
            speed: 3.5,
            kind: ObstacleKind::Thunder,
        });
        let scene = render(&state, &Hud::default(), 0);
        assert!(scene.iter().any(|cmd| matches!(
            cmd,
            DrawCmd::Polygon { color, .. } if *color == palette::THUNDER
        )));

        state.obstacles[0].kind = ObstacleKind::Ufo;
        let scene = render(&state, &Hud::default(), 0);
        assert!(scene.iter().any(|cmd| matches!(
            cmd,
            DrawCmd::Ellipse { color, .. } if *color == palette::UFO_SAUCER
        )));
    }
}
