//! Print the stage chain of a request without running it.

use std::path::PathBuf;
use std::sync::Arc;

use clipforge_common::config::AppConfig;
use clipforge_orchestrator::Orchestrator;
use clipforge_render_engine::FfmpegInvoker;

use super::load_request;

pub fn run(config: &AppConfig, path: PathBuf, json: bool) -> anyhow::Result<()> {
    let request = load_request(&path)?;
    let orchestrator = Orchestrator::new(
        config.render.clone(),
        Arc::new(FfmpegInvoker::new(config.render.ffmpeg_bin.clone())),
    );
    let plan = orchestrator
        .plan(&request)
        .map_err(|e| anyhow::anyhow!("Cannot plan {}: {e}", path.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    println!("Plan for: {}", path.display());
    println!("  Work dir: {}", plan.work_dir.display());
    println!("  Output:   {}", plan.output.display());
    for stage in &plan.stages {
        println!();
        println!("Stage {} ({})", stage.index, stage.label());
        for input in &stage.inputs {
            println!("  in:  {}", input.display());
        }
        println!("  out: {}", stage.output.display());
        println!("  {}", stage.invocation);
    }
    Ok(())
}
