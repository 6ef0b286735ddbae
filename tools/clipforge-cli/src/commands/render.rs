//! Render a request and wait for the result.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clipforge_common::config::AppConfig;
use clipforge_job_model::JobState;
use clipforge_orchestrator::Orchestrator;
use clipforge_render_engine::FfmpegInvoker;

use super::load_request;

pub async fn run(config: &AppConfig, path: PathBuf, poll_ms: u64) -> anyhow::Result<()> {
    config.render.validate()?;
    let request = load_request(&path)?;

    let orchestrator = Orchestrator::new(
        config.render.clone(),
        Arc::new(FfmpegInvoker::new(config.render.ffmpeg_bin.clone())),
    );
    if !orchestrator.check_available() {
        tracing::warn!(
            engine = %config.render.ffmpeg_bin.display(),
            "Engine check failed, the render will likely fail"
        );
    }

    println!("Rendering request at: {}", path.display());
    let receipt = orchestrator.submit(request)?;
    println!("  Job: {}", receipt.job_id);

    let status = orchestrator
        .watch(&receipt.job_id, Duration::from_millis(poll_ms.max(1)), |s| {
            print!("\r  {:<10} {:>3}%  ", s.state.as_str(), s.progress);
            let _ = std::io::stdout().flush();
        })
        .await?;
    println!();

    match status.state {
        JobState::Completed => {
            let output = orchestrator.fetch_output_location(&receipt.job_id)?;
            println!("Render complete: {}", output.display());
            println!(
                "  Took {:.1}s (submitted {})",
                status.elapsed().num_milliseconds() as f64 / 1000.0,
                status.created_at.format("%Y-%m-%d %H:%M:%S UTC")
            );
            Ok(())
        }
        _ => {
            let detail = status
                .error_detail
                .clone()
                .unwrap_or_else(|| "no detail recorded".to_string());
            anyhow::bail!(
                "Render failed at {}% after {:.1}s: {detail}",
                status.progress,
                status.elapsed().num_milliseconds() as f64 / 1000.0
            )
        }
    }
}
