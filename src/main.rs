use anyhow::{Context, Result};
use log::{debug, info, warn};

use pose_feedback::config::Config;
use pose_feedback::pose::{PoseLandmark, Topology};
use pose_feedback::render::{PixelCanvas, Size};
use pose_feedback::replay::{read_frames, save_png};
use pose_feedback::rules::ActiveRules;
use pose_feedback::technique::spawn_catalog_fetch;
use pose_feedback::OverlaySession;

const CONFIG_PATH: &str = "config.toml";

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config_path = std::env::args().nth(1).unwrap_or_else(|| CONFIG_PATH.to_string());
    let config = Config::load_or_default(&config_path);

    info!("Pose Feedback ({})", env!("GIT_VERSION"));
    info!("Technique: {}", config.technique.key());
    info!("Tolerance: {}°", config.overlay.tolerance);
    info!(
        "Viewport: {}x{}",
        config.replay.viewport_width, config.replay.viewport_height
    );

    let topology = Topology::blaze_pose();
    let active = ActiveRules::default();
    let mut session = OverlaySession::new(&config.overlay, topology.clone(), active.clone())?;

    // ルールの読み込みは別スレッド。完了前のフレームはルールなしで描画される
    let fetch = spawn_catalog_fetch(
        config.technique.catalog_source(),
        config.technique.key(),
        config.overlay.tolerance,
        topology,
        active,
    );

    let frames = read_frames(&config.replay.input)?;
    info!("Loaded {} frames from {}", frames.len(), config.replay.input.display());

    match fetch.join() {
        Ok(Ok(generation)) => info!("Rule set ready (generation {})", generation),
        Ok(Err(e)) => return Err(e.context("Failed to load technique rules")),
        Err(_) => anyhow::bail!("Rule loader thread panicked"),
    }

    let viewport = Size::new(config.replay.viewport_width, config.replay.viewport_height);
    let mut canvas = PixelCanvas::new(
        viewport.width.max(0.0) as usize,
        viewport.height.max(0.0) as usize,
        config.replay.background_color,
    );

    let mut out_of_tolerance_frames = 0usize;
    for (i, frame) in frames.iter().enumerate() {
        if frame.is_empty() {
            warn!("frame {}: no pose detected", i);
            continue;
        }

        let plan = session.render(frame, viewport);
        if plan.is_empty() {
            warn!("frame {}: nothing to draw", i);
            continue;
        }

        for e in &plan.evaluations {
            info!(
                "frame {} rule #{} {}: {:.1}° (expected {:.0}°, deviation {:.1}°){}",
                i,
                e.rule_index,
                joint_names(e.rule.joints()),
                e.angle,
                e.rule.expected_angle(),
                e.deviation,
                if e.within_tolerance { "" } else { " OUT OF RANGE" }
            );
        }
        for label in &plan.labels {
            debug!(
                "frame {} label {} at ({:.0}, {:.0})",
                i, label.text, label.anchor.x, label.anchor.y
            );
        }
        if plan.out_of_tolerance().next().is_some() {
            out_of_tolerance_frames += 1;
        }

        canvas.clear(config.replay.background_color);
        plan.paint(&mut canvas);
    }

    info!(
        "{} of {} frames had joints out of range",
        out_of_tolerance_frames,
        frames.len()
    );

    if let Some(output) = &config.replay.output {
        save_png(&canvas, output)
            .with_context(|| format!("Failed to save overlay to {}", output.display()))?;
        info!("Saved last frame to {}", output.display());
    }

    Ok(())
}

/// ログ用に関節インデックスを名前にする
fn joint_names(joints: [usize; 3]) -> String {
    joints
        .iter()
        .map(|&j| match PoseLandmark::from_index(j) {
            Some(landmark) => format!("{:?}", landmark),
            None => j.to_string(),
        })
        .collect::<Vec<_>>()
        .join("-")
}
