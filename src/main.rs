// Air Sketch demo.
// • Left mouse draws with the selected tool (pointer mode).
// • H switches to hand mode: the mouse steers a synthetic hand that goes
//   through the full smoother + gesture classifier. Hold LMB to point,
//   Shift to pinch, neither for a fist.
// • 1-6 pick DRAW / ERASE / LINE / RECT / CIRCLE / SELECT.
// • U undoes the last stroke, C clears, [ and ] change the brush width.
// • ESC quits.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Parser;
use minifb::Key;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use air_sketch::config::Config;
use air_sketch::error::Result;
use air_sketch::history::UndoOutcome;
use air_sketch::puppet::{HandPose, HandPuppet};
use air_sketch::raster::RasterSurface;
use air_sketch::sketchpad::Sketchpad;
use air_sketch::surface::DrawingSurface;
use air_sketch::types::{FrameBuffer, Gesture, LandmarkFrame, StrokePoint, Tool};
use air_sketch::window::{draw_crosshair, draw_ring, draw_text_5x7, Drawer};

#[derive(Parser, Debug)]
#[command(name = "air-sketch", version, about = "Draw in the air with hand gestures")]
struct Cli {
    /// TOML file overriding any subset of the defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Canvas width in logical pixels
    #[arg(long)]
    width: Option<usize>,

    /// Canvas height in logical pixels
    #[arg(long)]
    height: Option<usize>,

    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long)]
    verbose: bool,
}

const WIDTH_STEP: f32 = 1.0;
const MAX_WIDTH: f32 = 64.0;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    /* --- Config: defaults, then file, then flags --- */
    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(w) = cli.width {
        config.canvas.width = w;
    }
    if let Some(h) = cli.height {
        config.canvas.height = h;
    }
    config.validate()?;

    /* --- Surface + window --- */
    let ratio = config.canvas.pixel_ratio;
    let surface = RasterSurface::from_config(&config.canvas);
    let (dw, dh) = (surface.framebuffer().width, surface.framebuffer().height);
    let mut pad = Sketchpad::new(&config, surface);
    let mut drawer = Drawer::new("Air Sketch", dw, dh, 60)?;
    let mut screen = FrameBuffer::filled(dw, dh, 0);
    info!(width = config.canvas.width, height = config.canvas.height, ratio, "canvas ready");

    let puppet = HandPuppet::default();
    let mut hand_mode = false;
    let mut mouse_was_down = false;
    let mut warned_minimized = false;

    let mut last_fps_time = Instant::now();
    let mut frames_this_second: u32 = 0;
    let mut hud_fps_text = String::from("FPS: 0.0");

    /* ------------------------------ Main loop ------------------------------ */
    while drawer.is_open() && !drawer.esc_pressed() {
        let now = Instant::now();

        /* 1) Follow the window size. A minimized window reports 0x0. */
        let (ww, wh) = drawer.size();
        if ww == 0 || wh == 0 {
            if !warned_minimized {
                warn!("window has no client area, skipping frames");
                warned_minimized = true;
            }
            drawer.present(&screen)?;
            continue;
        }
        warned_minimized = false;
        let logical = ((ww as f32 / ratio) as usize).max(1);
        let logical_h = ((wh as f32 / ratio) as usize).max(1);
        if pad.surface().map(|s| s.size()) != Some((logical as f32, logical_h as f32)) {
            pad.resize(logical, logical_h);
            debug!(width = logical, height = logical_h, "canvas follows window");
        }

        /* 2) Commands */
        if let Some(tool) = drawer.tool_key() {
            pad.select_tool(tool);
        }
        if drawer.pressed_once(Key::H) {
            pad.pointer_up();
            pad.on_landmarks(None);
            hand_mode = !hand_mode;
            info!(hand_mode, "input mode switched");
        }
        if drawer.pressed_once(Key::U) {
            let outcome = match pad.undo() {
                UndoOutcome::NothingToUndo => "nothing to undo",
                UndoOutcome::Restored(_) => "restored previous stroke",
                UndoOutcome::Blanked(_) => "canvas blank",
            };
            info!(outcome, depth = pad.history().len(), "undo");
        }
        if drawer.pressed_once(Key::C) {
            pad.clear();
            info!("canvas cleared");
        }
        let style = pad.stroke_style();
        if drawer.pressed_once(Key::LeftBracket) {
            pad.set_stroke_style(style.color, (style.width - WIDTH_STEP).max(1.0));
        }
        if drawer.pressed_once(Key::RightBracket) {
            pad.set_stroke_style(style.color, (style.width + WIDTH_STEP).min(MAX_WIDTH));
        }

        /* 3) Input: mouse as pointer, or mouse as a hand */
        let mouse = drawer.mouse_pos().map(|(mx, my)| (mx / ratio, my / ratio));
        let mouse_down = drawer.left_mouse_down();
        if hand_mode {
            let frame = mouse.map(|(x, y)| {
                let pose = if mouse_down {
                    HandPose::Point
                } else if drawer.shift_down() {
                    HandPose::Pinch
                } else {
                    HandPose::Fist
                };
                hand_frame(&puppet, pose, x, y, (logical, logical_h), config.canvas.mirror_x)
            });
            pad.on_landmarks(frame.as_ref());
        } else if let Some((x, y)) = mouse {
            let p = StrokePoint::new(x, y);
            match (mouse_was_down, mouse_down) {
                (false, true) => pad.pointer_down(p),
                (true, true) => pad.pointer_move(p),
                (true, false) => pad.pointer_up(),
                (false, false) => {}
            }
        }
        mouse_was_down = mouse_down;

        /* 4) One render step per refresh */
        pad.render_frame();

        /* 5) Compose canvas + cursor + HUD */
        if let Some(surface) = pad.surface() {
            screen.clone_from(surface.framebuffer());
        }
        if let Some((mx, my)) = drawer.mouse_pos() {
            let erasing = pad.tool() == Tool::Erase || pad.active_gesture() == Gesture::Erasing;
            if erasing {
                let r = config.stroke.eraser_radius * ratio;
                draw_ring(&mut screen, mx as i32, my as i32, r as i32, 0x00_E0_40_40);
            } else {
                draw_crosshair(&mut screen, mx as i32, my as i32, 10, 0x00_33_66_FF);
            }
        }

        let mode = if hand_mode { "HAND" } else { "MOUSE" };
        let gesture = if hand_mode { pad.hand_gesture() } else { pad.active_gesture() };
        let hud = format!(
            "{} | {} | {} | W: {:.0} | 1-6 H U C [ ] | {}",
            mode,
            pad.tool().label(),
            gesture.label(),
            pad.stroke_style().width,
            hud_fps_text
        );
        draw_text_5x7(&mut screen, 8, 8, &hud, 0x00_30_30_30);

        drawer.present(&screen)?;

        /* 6) FPS, refreshed once per second */
        frames_this_second += 1;
        let elapsed = now.duration_since(last_fps_time);
        if elapsed >= Duration::from_secs(1) {
            let fps = frames_this_second as f32 / elapsed.as_secs_f32();
            debug!(fps, "frame rate");
            hud_fps_text = format!("FPS: {:.1}", fps);
            frames_this_second = 0;
            last_fps_time = now;
        }
    }

    info!(strokes = pad.history().len(), bytes = pad.history().byte_size(), "bye");
    Ok(())
}

/// Synthetic hand whose index fingertip lands under the cursor once mapped back
/// to canvas pixels.
fn hand_frame(
    puppet: &HandPuppet,
    pose: HandPose,
    x: f32,
    y: f32,
    (width, height): (usize, usize),
    mirror_x: bool,
) -> LandmarkFrame {
    let nx = x / width as f32;
    let tip_x = if mirror_x { 1.0 - nx } else { nx };
    puppet.frame(pose, tip_x, y / height as f32)
}
