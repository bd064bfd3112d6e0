use anyhow::Result;
use log::info;
use std::time::{Duration, Instant};

use pose_feedback::config::Config;
use pose_feedback::pose::Topology;
use pose_feedback::render::{OverlayWindow, Size};
use pose_feedback::replay::read_frames;
use pose_feedback::rules::ActiveRules;
use pose_feedback::technique::spawn_catalog_fetch;
use pose_feedback::OverlaySession;

const CONFIG_PATH: &str = "config.toml";

/// 再生速度
const TARGET_FPS: f64 = 30.0;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config_path = std::env::args().nth(1).unwrap_or_else(|| CONFIG_PATH.to_string());
    let config = Config::load_or_default(&config_path);

    info!("Overlay Viewer ({})", env!("GIT_VERSION"));
    info!("Press ESC to exit");

    let topology = Topology::blaze_pose();
    let active = ActiveRules::default();
    let mut session = OverlaySession::new(&config.overlay, topology.clone(), active.clone())?;

    // ウィンドウ表示中に読み込みが終わればそこから色が付く
    let _fetch = spawn_catalog_fetch(
        config.technique.catalog_source(),
        config.technique.key(),
        config.overlay.tolerance,
        topology,
        active,
    );

    let frames = read_frames(&config.replay.input)?;
    if frames.is_empty() {
        anyhow::bail!("No frames in {}", config.replay.input.display());
    }

    let viewport = Size::new(config.replay.viewport_width, config.replay.viewport_height);
    let mut window = OverlayWindow::new(
        "Pose Feedback",
        viewport.width as usize,
        viewport.height as usize,
        config.replay.background_color,
    )?;

    let frame_duration = Duration::from_secs_f64(1.0 / TARGET_FPS);
    let mut index = 0usize;
    let mut frame_count = 0u32;
    let mut fps_timer = Instant::now();

    while window.is_open() {
        let frame_start = Instant::now();

        let plan = session.render(&frames[index], viewport);
        window.show(&plan)?;

        let out = plan.out_of_tolerance().count();
        window.set_title(&format!(
            "Pose Feedback - frame {}/{} - {} joint(s) out of range",
            index + 1,
            frames.len(),
            out
        ));

        index = (index + 1) % frames.len();

        frame_count += 1;
        let elapsed = fps_timer.elapsed().as_secs_f32();
        if elapsed >= 1.0 {
            info!("FPS: {:.1}", frame_count as f32 / elapsed);
            frame_count = 0;
            fps_timer = Instant::now();
        }

        if let Some(rest) = frame_duration.checked_sub(frame_start.elapsed()) {
            std::thread::sleep(rest);
        }
    }

    info!("Shutting down...");
    Ok(())
}
