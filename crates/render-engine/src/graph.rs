//! Filter graph construction.
//!
//! Compiles clip and overlay descriptors into filtergraph text for the
//! media engine. Everything here is pure: identical inputs give
//! byte-identical graphs, and no path, timestamp or random value ever
//! appears in the graph text. File paths travel separately in
//! [`GraphSpec::inputs`], whose order matches the `[i:v]`/`[i:a]` labels.

use std::path::{Path, PathBuf};

use serde::Serialize;

use clipforge_common::error::{ClipforgeError, ClipforgeResult};
use clipforge_job_model::{ClipTrim, OverlaySpec, Resolution};

/// Distance between the bottom of overlay text and the frame edge, in pixels.
const OVERLAY_BOTTOM_MARGIN: u32 = 50;

/// Label of the final video stream in every graph.
pub const VIDEO_OUT: &str = "[outv]";

/// Label of the concatenated audio stream.
pub const AUDIO_OUT: &str = "[outa]";

/// How the audio stream leaves a stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioRoute {
    /// Audio produced by the graph under this label; re-encoded.
    Graph(String),
    /// Audio taken straight from the first input and stream-copied.
    /// Optional, so inputs without audio still render.
    Passthrough,
}

/// A compiled filter graph and the inputs it refers to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphSpec {
    /// Input files; index `i` is addressed as `[i:v]` / `[i:a]`. Never re-sorted.
    pub inputs: Vec<PathBuf>,

    /// Filtergraph text for `-filter_complex`.
    pub filter_complex: String,

    /// Label of the video output.
    pub video_label: String,

    pub audio: AudioRoute,
}

/// Compile an ordered clip list into one trim/normalize/scale/pad/concat graph.
///
/// Each clip's video is trimmed to `[start, start + duration)`, re-based to
/// zero, resampled to `fps`, scaled to fit `resolution` preserving aspect
/// ratio and padded to exactly `resolution`, centered. Its audio gets the same
/// trim and re-base. Video and audio are then concatenated separately, in
/// input order.
pub fn build_concat_graph(
    clips: &[ClipTrim],
    resolution: Resolution,
    fps: u32,
) -> ClipforgeResult<GraphSpec> {
    if clips.is_empty() {
        return Err(ClipforgeError::invalid_input(
            "concatenation needs at least one clip",
        ));
    }
    if fps == 0 {
        return Err(ClipforgeError::invalid_input("frame rate must be positive"));
    }
    if resolution.width == 0 || resolution.height == 0 {
        return Err(ClipforgeError::invalid_input(format!(
            "invalid resolution {resolution}"
        )));
    }
    for (index, clip) in clips.iter().enumerate() {
        clip.validate()
            .map_err(|e| ClipforgeError::invalid_input(format!("clip {index}: {e}")))?;
    }

    let (w, h) = (resolution.width, resolution.height);
    let mut chains = Vec::with_capacity(clips.len() * 2 + 2);

    for (i, clip) in clips.iter().enumerate() {
        let start = seconds(clip.start);
        let duration = seconds(clip.duration);
        chains.push(format!(
            "[{i}:v]trim=start={start}:duration={duration},setpts=PTS-STARTPTS,fps={fps},\
             scale={w}:{h}:force_original_aspect_ratio=decrease,\
             pad={w}:{h}:(ow-iw)/2:(oh-ih)/2,setsar=1[v{i}]"
        ));
        chains.push(format!(
            "[{i}:a]atrim=start={start}:duration={duration},asetpts=PTS-STARTPTS[a{i}]"
        ));
    }

    let n = clips.len();
    let video_pads: String = (0..n).map(|i| format!("[v{i}]")).collect();
    let audio_pads: String = (0..n).map(|i| format!("[a{i}]")).collect();
    chains.push(format!("{video_pads}concat=n={n}:v=1:a=0{VIDEO_OUT}"));
    chains.push(format!("{audio_pads}concat=n={n}:v=0:a=1{AUDIO_OUT}"));

    Ok(GraphSpec {
        inputs: clips.iter().map(|c| c.source.clone()).collect(),
        filter_complex: chains.join(";"),
        video_label: VIDEO_OUT.to_string(),
        audio: AudioRoute::Graph(AUDIO_OUT.to_string()),
    })
}

/// Compile one overlay into a graph that draws its text on `input`.
///
/// The text is horizontally centered, sits [`OVERLAY_BOTTOM_MARGIN`] pixels
/// above the bottom edge, and is visible only while `start <= t < end`.
/// Audio is passed through untouched.
pub fn build_overlay_graph(input: &Path, overlay: &OverlaySpec) -> ClipforgeResult<GraphSpec> {
    overlay
        .validate()
        .map_err(|e| ClipforgeError::invalid_input(format!("overlay: {e}")))?;

    let text = escape_graph_value(&escape_option_value(&overlay.text));
    let start = seconds(overlay.start);
    let end = seconds(overlay.end);

    let filter_complex = format!(
        "[0:v]drawtext=text={text}:expansion=none:fontsize={size}:fontcolor={color}:\
         x=(w-text_w)/2:y=h-text_h-{margin}:enable='gte(t,{start})*lt(t,{end})'{VIDEO_OUT}",
        size = overlay.font_size,
        color = overlay.color,
        margin = OVERLAY_BOTTOM_MARGIN,
    );

    Ok(GraphSpec {
        inputs: vec![input.to_path_buf()],
        filter_complex,
        video_label: VIDEO_OUT.to_string(),
        audio: AudioRoute::Passthrough,
    })
}

/// First escaping level: a value inside a filter's `key=value` option list.
fn escape_option_value(raw: &str) -> String {
    escape_chars(raw, &['\\', '\'', ':'])
}

/// Second escaping level: a filter description inside a filtergraph.
fn escape_graph_value(raw: &str) -> String {
    escape_chars(raw, &['\\', '\'', '[', ']', ',', ';'])
}

fn escape_chars(raw: &str, special: &[char]) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if special.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Seconds as the shortest decimal that round-trips, e.g. `1.5`, `2`.
fn seconds(value: f64) -> String {
    format!("{value}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clips() -> Vec<ClipTrim> {
        vec![
            ClipTrim::new("a.mp4", 0.0, 2.0),
            ClipTrim::new("b.mp4", 1.5, 3.0),
        ]
    }

    #[test]
    fn test_concat_graph_text() {
        let res = Resolution::new(1280, 720).unwrap();
        let graph = build_concat_graph(&clips(), res, 24).unwrap();

        let expected = [
            "[0:v]trim=start=0:duration=2,setpts=PTS-STARTPTS,fps=24,\
             scale=1280:720:force_original_aspect_ratio=decrease,\
             pad=1280:720:(ow-iw)/2:(oh-ih)/2,setsar=1[v0]",
            "[0:a]atrim=start=0:duration=2,asetpts=PTS-STARTPTS[a0]",
            "[1:v]trim=start=1.5:duration=3,setpts=PTS-STARTPTS,fps=24,\
             scale=1280:720:force_original_aspect_ratio=decrease,\
             pad=1280:720:(ow-iw)/2:(oh-ih)/2,setsar=1[v1]",
            "[1:a]atrim=start=1.5:duration=3,asetpts=PTS-STARTPTS[a1]",
            "[v0][v1]concat=n=2:v=1:a=0[outv]",
            "[a0][a1]concat=n=2:v=0:a=1[outa]",
        ]
        .join(";");

        assert_eq!(graph.filter_complex, expected);
        assert_eq!(
            graph.inputs,
            vec![PathBuf::from("a.mp4"), PathBuf::from("b.mp4")]
        );
        assert_eq!(graph.video_label, "[outv]");
        assert_eq!(graph.audio, AudioRoute::Graph("[outa]".to_string()));
    }

    #[test]
    fn test_concat_graph_rejects_empty_input() {
        let err = build_concat_graph(&[], Resolution::default(), 30).unwrap_err();
        assert!(matches!(err, ClipforgeError::InvalidInput { .. }));
    }

    #[test]
    fn test_concat_graph_rejects_bad_clip() {
        let bad = vec![ClipTrim::new("a.mp4", 0.0, 0.0)];
        assert!(matches!(
            build_concat_graph(&bad, Resolution::default(), 30),
            Err(ClipforgeError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_concat_graph_keeps_duplicate_sources_separate() {
        let clips = vec![
            ClipTrim::new("a.mp4", 0.0, 1.0),
            ClipTrim::new("a.mp4", 4.0, 1.0),
        ];
        let graph = build_concat_graph(&clips, Resolution::default(), 30).unwrap();
        assert_eq!(graph.inputs.len(), 2);
        assert!(graph.filter_complex.contains("[1:v]trim=start=4:duration=1"));
    }

    #[test]
    fn test_overlay_graph_text() {
        let overlay = OverlaySpec::new("Hello", 1.0, 3.5).with_style(32, "yellow");
        let graph = build_overlay_graph(Path::new("stage-0.mp4"), &overlay).unwrap();

        assert_eq!(
            graph.filter_complex,
            "[0:v]drawtext=text=Hello:expansion=none:fontsize=32:fontcolor=yellow:\
             x=(w-text_w)/2:y=h-text_h-50:enable='gte(t,1)*lt(t,3.5)'[outv]"
        );
        assert_eq!(graph.inputs, vec![PathBuf::from("stage-0.mp4")]);
        assert_eq!(graph.audio, AudioRoute::Passthrough);
        assert!(!graph.filter_complex.contains("stage-0.mp4"));
    }

    #[test]
    fn test_overlay_text_is_escaped_for_both_levels() {
        let overlay = OverlaySpec::new("it's 5:00 [a], b; c\\d", 0.0, 1.0);
        let graph = build_overlay_graph(Path::new("in.mp4"), &overlay).unwrap();
        let text = graph
            .filter_complex
            .strip_prefix("[0:v]drawtext=text=")
            .and_then(|rest| rest.split_once(":expansion=none"))
            .map(|(text, _)| text)
            .unwrap();

        assert_eq!(text, r"it\\\'s 5\\:00 \[a\]\, b\; c\\\\d");
    }

    #[test]
    fn test_overlay_text_cannot_inject_filters() {
        let overlay = OverlaySpec::new("x[outv];[0:v]null", 0.0, 1.0);
        let graph = build_overlay_graph(Path::new("in.mp4"), &overlay).unwrap();
        // The only unescaped ';' or '[' belong to the graph itself.
        let unescaped_semicolons = graph
            .filter_complex
            .match_indices(';')
            .filter(|(i, _)| !graph.filter_complex[..*i].ends_with('\\'))
            .count();
        assert_eq!(unescaped_semicolons, 0);
        assert!(graph.filter_complex.ends_with("[outv]"));
    }

    #[test]
    fn test_overlay_graph_rejects_empty_window() {
        let overlay = OverlaySpec::new("x", 5.0, 5.0);
        assert!(matches!(
            build_overlay_graph(Path::new("in.mp4"), &overlay),
            Err(ClipforgeError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_seconds_formatting_is_plain_decimal() {
        assert_eq!(seconds(0.0), "0");
        assert_eq!(seconds(2.25), "2.25");
        assert_eq!(seconds(0.0000001), "0.0000001");
        assert_eq!(seconds(3600.0), "3600");
    }
}
