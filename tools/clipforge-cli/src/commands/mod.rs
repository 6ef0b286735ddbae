pub mod check;
pub mod init;
pub mod plan;
pub mod render;
pub mod validate;

use std::path::Path;

use clipforge_job_model::RenderRequest;

/// Read a render request from a JSON file.
pub(crate) fn load_request(path: &Path) -> anyhow::Result<RenderRequest> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read request {}: {e}", path.display()))?;
    serde_json::from_str(&content)
        .map_err(|e| anyhow::anyhow!("Failed to parse request {}: {e}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_request_applies_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("request.json");
        std::fs::write(
            &path,
            r#"{"clips": [{"source": "a.mp4", "duration": 2.5}], "resolution": "1280x720"}"#,
        )
        .unwrap();

        let request = load_request(&path).unwrap();
        assert_eq!(request.name, "render");
        assert_eq!(request.fps, 30);
        assert_eq!(request.clips[0].start, 0.0);
        assert_eq!(request.resolution.to_string(), "1280x720");
        assert!(request.overlays.is_empty());
    }

    #[test]
    fn test_load_request_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("request.json");
        std::fs::write(&path, r#"{"clips": [], "resolution": "wide"}"#).unwrap();

        let err = load_request(&path).unwrap_err().to_string();
        assert!(err.contains("Failed to parse request"));
        assert!(load_request(&dir.path().join("missing.json")).is_err());
    }

    #[test]
    fn test_init_template_is_valid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("request.json");
        init::run(path.clone(), false).unwrap();

        let request = load_request(&path).unwrap();
        assert!(request.validate().is_ok());
        assert!(init::run(path, false).is_err());
    }
}
