//! Blobvectors - headless driver for the blob formation engine
//!
//! Runs a scene against a paced frame loop, fed by live, recorded or
//! synthetic audio, and reports frames as log lines or JSON.

mod cli;

use std::io::{self, Write};

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

use blobvectors::animation::LiveTransform;
use blobvectors::audio::{AudioSource, AudioSystem};
use blobvectors::camera::CameraState;
use blobvectors::formation::FormationKind;
use blobvectors::frame_loop::{FrameLoop, LoopHandle};
use blobvectors::params::{preset_names, AnalyzerConfig};
use blobvectors::scene::{FrameOutput, Scene};
use blobvectors::surface::Shape;

use cli::Args;

/// One line of `--json` output
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FrameRecord<'a> {
    elapsed: f32,
    group_yaw: f32,
    camera: &'a CameraState,
    elements: &'a [LiveTransform],
}

impl<'a> From<&'a FrameOutput> for FrameRecord<'a> {
    fn from(output: &'a FrameOutput) -> Self {
        Self {
            elapsed: output.elapsed,
            group_yaw: output.frame.group_yaw,
            camera: &output.camera,
            elements: &output.frame.transforms,
        }
    }
}

fn print_catalog() {
    println!("Presets:");
    for name in preset_names() {
        println!("  {}", name);
    }
    println!("Shapes:");
    for shape in Shape::all() {
        println!("  {}", shape);
    }
    println!("Formations:");
    for kind in FormationKind::ALL {
        println!("  {}", kind);
    }
}

/// Stop the frame loop on Ctrl-C so audio shuts down and stats are logged.
fn install_interrupt_handler(handle: LoopHandle) -> Result<()> {
    ctrlc::set_handler(move || {
        log::info!("Interrupted, stopping");
        handle.cancel();
    })
    .context("Failed to install Ctrl-C handler")
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    if args.list {
        print_catalog();
        return Ok(());
    }

    let config = args.scene_config()?;
    let mut scene =
        Scene::new(config, args.scene_options()).context("Invalid scene configuration")?;

    if let Some(path) = &args.export_mesh {
        let mesh = scene.mesh();
        let name = scene.config().shape.name();
        std::fs::write(path, mesh.to_obj(name))
            .with_context(|| format!("Failed to write mesh to {}", path.display()))?;
        log::info!(
            "Wrote {} ({} vertices, {} triangles)",
            path.display(),
            mesh.vertices.len(),
            mesh.triangle_count()
        );
    }

    let mut audio = AudioSystem::start(AnalyzerConfig::default(), args.parse_audio_mode())
        .context("Failed to start audio")?;
    let slot = (audio.source() != AudioSource::Off).then(|| audio.slot());

    let frame_loop = FrameLoop::new(args.loop_config());
    let handle = frame_loop.handle();
    install_interrupt_handler(handle.clone())?;
    let report_every = args.fps.max(1.0).round() as u64;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut write_error: Option<io::Error> = None;
    let mut frame_index: u64 = 0;

    let stats = frame_loop.run(&mut scene, slot.as_ref(), |output| {
        if args.json {
            let result = serde_json::to_writer(&mut out, &FrameRecord::from(output))
                .map_err(io::Error::from)
                .and_then(|_| writeln!(out));
            if let Err(e) = result {
                // Stdout closed (e.g. piped into head): stop cleanly
                write_error = Some(e);
                handle.cancel();
            }
        } else if frame_index % report_every == 0 {
            let eye = output.camera.eye;
            log::info!(
                "t={:.1}s yaw={:.2} elements={} eye=({:.1}, {:.1}, {:.1})",
                output.elapsed,
                output.frame.group_yaw,
                output.frame.transforms.len(),
                eye.x,
                eye.y,
                eye.z
            );
        }
        frame_index += 1;
    });

    audio.stop();

    if let Some(e) = write_error {
        if e.kind() != io::ErrorKind::BrokenPipe {
            return Err(e).context("Failed to write frame output");
        }
    }

    out.flush().context("Failed to flush output")?;
    log::info!(
        "Done: {} frames, {:.1}s of scene time",
        stats.frames,
        stats.last_elapsed
    );

    Ok(())
}
