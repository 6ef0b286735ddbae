//! Validate a render request.

use std::path::PathBuf;

use super::load_request;

pub fn run(path: PathBuf) -> anyhow::Result<()> {
    println!("Validating request at: {}", path.display());

    let request = load_request(&path)?;

    println!("  Name: {}", request.name);
    println!("  Clips: {}", request.clips.len());
    println!("  Overlays: {}", request.overlays.len());
    println!("  Resolution: {}", request.resolution);
    println!("  FPS: {}", request.fps);
    println!("  Duration: {:.2}s", request.total_duration());

    if let Err(e) = request.validate() {
        println!("\nValidation failed: {e}");
        anyhow::bail!("request is invalid");
    }

    let missing: Vec<_> = request
        .clips
        .iter()
        .filter(|c| !c.source.is_file())
        .map(|c| c.source.display().to_string())
        .collect();
    if missing.is_empty() {
        println!("  Sources: All present");
    } else {
        println!("\nMissing sources (the render will fail):");
        for source in &missing {
            println!("  - {source}");
        }
    }

    println!("\nRequest is valid ({} stage(s)).", request.stage_count());
    Ok(())
}
