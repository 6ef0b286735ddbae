//! Check the media engine and configuration.

use std::sync::Arc;

use clipforge_common::config::{config_file_path, AppConfig};
use clipforge_orchestrator::Orchestrator;
use clipforge_render_engine::FfmpegInvoker;

pub fn run(config: &AppConfig) -> anyhow::Result<()> {
    println!("Clipforge System Check");
    println!("{}", "=".repeat(50));

    let render = &config.render;
    let orchestrator = Orchestrator::new(
        render.clone(),
        Arc::new(FfmpegInvoker::new(render.ffmpeg_bin.clone())),
    );

    let engine_ok = orchestrator.check_available();
    if engine_ok {
        println!("[OK] Engine: {}", render.ffmpeg_bin.display());
    } else {
        println!(
            "[FAIL] Engine: {} could not be started (install ffmpeg or set render.ffmpeg_bin)",
            render.ffmpeg_bin.display()
        );
    }

    let config_ok = match render.validate() {
        Ok(()) => {
            println!("[OK] Configuration");
            true
        }
        Err(e) => {
            println!("[FAIL] Configuration: {e}");
            false
        }
    };

    println!();
    println!("  Config file: {}", config_file_path().display());
    println!("  Output dir:  {}", render.output_dir.display());
    println!("  Work dir:    {}", render.work_dir.display());
    println!("  Workers:     {}", orchestrator.pool().bound());
    println!(
        "  Encoding:    {} (preset {}, crf {}), audio {} @ {}",
        render.encode.video_codec,
        render.encode.preset,
        render.encode.crf,
        render.encode.audio_codec,
        render.encode.audio_bitrate
    );

    println!();
    if engine_ok && config_ok {
        println!("Clipforge is ready.");
        Ok(())
    } else {
        anyhow::bail!("Clipforge is not ready. See above for fixes.")
    }
}
