//! Write a template render request.

use std::path::PathBuf;

use clipforge_job_model::{ClipTrim, OverlaySpec, RenderRequest, Resolution};

pub fn run(path: PathBuf, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }

    let request = RenderRequest::new(vec![
        ClipTrim::new("media/intro.mp4", 0.0, 5.0),
        ClipTrim::new("media/main.mp4", 12.5, 30.0),
    ])
    .with_overlays(vec![
        OverlaySpec::new("Welcome", 0.0, 4.0),
        OverlaySpec::new("Thanks for watching", 30.0, 35.0).with_style(36, "yellow"),
    ])
    .with_output(Resolution::default(), 30)
    .with_name("my-render");

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, serde_json::to_string_pretty(&request)?)?;

    println!("Request template written to {}", path.display());
    println!("  Clips: {}", request.clips.len());
    println!("  Overlays: {}", request.overlays.len());
    println!("  Edit the clip sources, then run: clipforge render {}", path.display());
    Ok(())
}
