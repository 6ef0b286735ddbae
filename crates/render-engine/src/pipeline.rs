//! Stage chain execution.
//!
//! A job renders as an explicit chain of stages. Stage 0 concatenates the
//! clips; stage `k` (k >= 1) draws overlay `k - 1` onto stage `k - 1`'s
//! output. Each stage declares its inputs and its output, so the data
//! dependency is visible in the plan rather than implied by file names.
//!
//! Intermediate files live in a per-job directory under the configured work
//! directory and are owned by an [`IntermediateFiles`] guard which removes
//! them however execution ends. Source clips are never registered with the
//! guard and are never modified.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;

use clipforge_common::config::{EncodeSettings, RenderConfig};
use clipforge_common::error::{ClipforgeError, ClipforgeResult};
use clipforge_job_model::{JobId, RenderRequest};

use crate::command::{stage_invocation, Invocation};
use crate::graph::{build_concat_graph, build_overlay_graph};
use crate::invoker::{diagnostic_tail, ProcessInvoker};

/// Progress reported when stage 0 starts.
pub const PROGRESS_CONCAT_STARTED: u8 = 30;

/// Progress reported when stage 0's engine process returns.
pub const PROGRESS_CONCAT_DONE: u8 = 60;

/// Progress reached when the last overlay stage's engine process returns.
pub const PROGRESS_OVERLAYS_DONE: u8 = 90;

/// What a stage does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StageKind {
    Concat { clips: usize },
    Overlay { overlay: usize },
}

/// One engine run within a job.
#[derive(Debug, Clone, Serialize)]
pub struct Stage {
    pub index: usize,
    pub kind: StageKind,
    pub inputs: Vec<PathBuf>,
    pub output: PathBuf,
    pub invocation: Invocation,
}

impl Stage {
    /// Short name for logs and error messages.
    pub fn label(&self) -> String {
        match self.kind {
            StageKind::Concat { .. } => "concat".to_string(),
            StageKind::Overlay { overlay } => format!("overlay {}", overlay + 1),
        }
    }
}

/// The full chain for one job.
#[derive(Debug, Clone, Serialize)]
pub struct StagePlan {
    pub job_id: JobId,
    /// Per-job scratch directory holding every intermediate.
    pub work_dir: PathBuf,
    pub stages: Vec<Stage>,
    /// Where the last stage's output is placed.
    pub output: PathBuf,
}

/// Outcome of one stage, consumed immediately to continue or abort.
#[derive(Debug, Clone)]
struct StageResult {
    success: bool,
    exit_code: Option<i32>,
    diagnostic: Option<String>,
}

/// Progress after stage `index` of a chain with `overlays` overlay stages.
pub fn stage_done_progress(index: usize, overlays: usize) -> u8 {
    if index == 0 || overlays == 0 {
        return PROGRESS_CONCAT_DONE;
    }
    let span = (PROGRESS_OVERLAYS_DONE - PROGRESS_CONCAT_DONE) as usize;
    let done = index.min(overlays);
    PROGRESS_CONCAT_DONE + (span * done / overlays) as u8
}

/// Compile a request into its stage chain without running anything.
pub fn plan_stages(
    job_id: JobId,
    request: &RenderRequest,
    program: &Path,
    encode: &EncodeSettings,
    work_root: &Path,
    output: &Path,
) -> ClipforgeResult<StagePlan> {
    request
        .validate()
        .map_err(|e| ClipforgeError::invalid_input(e.to_string()))?;

    let work_dir = work_root.join(job_id.to_string());
    let mut stages = Vec::with_capacity(request.stage_count());

    let concat = build_concat_graph(&request.clips, request.resolution, request.fps)?;
    let concat_output = work_dir.join("stage-0.mp4");
    stages.push(Stage {
        index: 0,
        kind: StageKind::Concat {
            clips: request.clips.len(),
        },
        inputs: concat.inputs.clone(),
        invocation: stage_invocation(program, &concat, encode, &concat_output),
        output: concat_output,
    });

    for (overlay_index, overlay) in request.overlays.iter().enumerate() {
        let index = overlay_index + 1;
        let input = stages[index - 1].output.clone();
        let graph = build_overlay_graph(&input, overlay)?;
        let stage_output = work_dir.join(format!("stage-{index}.mp4"));
        stages.push(Stage {
            index,
            kind: StageKind::Overlay {
                overlay: overlay_index,
            },
            inputs: graph.inputs.clone(),
            invocation: stage_invocation(program, &graph, encode, &stage_output),
            output: stage_output,
        });
    }

    for clip in &request.clips {
        let collides = clip.source == output || stages.iter().any(|s| s.output == clip.source);
        if collides {
            return Err(ClipforgeError::invalid_input(format!(
                "source {} would be overwritten by the render",
                clip.source.display()
            )));
        }
    }

    Ok(StagePlan {
        job_id,
        work_dir,
        stages,
        output: output.to_path_buf(),
    })
}

/// Runs a job's stage chain through a [`ProcessInvoker`].
pub struct StageChainExecutor {
    invoker: Arc<dyn ProcessInvoker>,
    program: PathBuf,
    encode: EncodeSettings,
    work_root: PathBuf,
    max_diagnostic_bytes: usize,
}

impl StageChainExecutor {
    pub fn new(config: &RenderConfig, invoker: Arc<dyn ProcessInvoker>) -> Self {
        Self {
            invoker,
            program: config.ffmpeg_bin.clone(),
            encode: config.encode.clone(),
            work_root: config.work_dir.clone(),
            max_diagnostic_bytes: config.max_diagnostic_bytes,
        }
    }

    pub fn invoker(&self) -> &Arc<dyn ProcessInvoker> {
        &self.invoker
    }

    pub fn plan(
        &self,
        job_id: JobId,
        request: &RenderRequest,
        output: &Path,
    ) -> ClipforgeResult<StagePlan> {
        plan_stages(
            job_id,
            request,
            &self.program,
            &self.encode,
            &self.work_root,
            output,
        )
    }

    /// Run every stage in order and place the final file at `output`.
    ///
    /// `progress` receives 30 before stage 0, 60 when stage 0's process
    /// returns, and an even share of 60..=90 as each overlay stage's process
    /// returns. The first failure aborts the chain. Intermediates are
    /// removed before this returns, on success and on failure.
    pub fn execute(
        &self,
        job_id: JobId,
        request: &RenderRequest,
        output: &Path,
        progress: &dyn Fn(u8),
    ) -> ClipforgeResult<PathBuf> {
        let plan = self.plan(job_id, request, output)?;
        preflight(request, &plan)?;

        std::fs::create_dir_all(&plan.work_dir).map_err(|e| {
            ClipforgeError::Other(anyhow::anyhow!(
                "failed to create work directory {}: {e}",
                plan.work_dir.display()
            ))
        })?;
        let mut intermediates = IntermediateFiles::new(plan.work_dir.clone());

        tracing::info!(
            job_id = %job_id,
            stages = plan.stages.len(),
            invoker = self.invoker.name(),
            "Starting stage chain"
        );
        progress(PROGRESS_CONCAT_STARTED);

        let overlays = request.overlays.len();
        for stage in &plan.stages {
            intermediates.register(stage.output.clone());

            let result = self.run_stage(job_id, stage)?;
            progress(stage_done_progress(stage.index, overlays));

            if !result.success {
                tracing::warn!(
                    job_id = %job_id,
                    stage = stage.index,
                    exit_code = ?result.exit_code,
                    "Stage failed, aborting chain"
                );
                return Err(ClipforgeError::stage_failure(
                    stage.label(),
                    result.exit_code,
                    result
                        .diagnostic
                        .unwrap_or_else(|| "engine produced no diagnostic output".to_string()),
                ));
            }
        }

        let last = plan
            .stages
            .last()
            .map(|s| s.output.clone())
            .ok_or_else(|| ClipforgeError::invalid_input("render plan has no stages"))?;
        place_output(&last, &plan.output)?;
        drop(intermediates);

        tracing::info!(job_id = %job_id, output = %plan.output.display(), "Stage chain finished");
        Ok(plan.output)
    }

    fn run_stage(&self, job_id: JobId, stage: &Stage) -> ClipforgeResult<StageResult> {
        tracing::info!(
            job_id = %job_id,
            stage = stage.index,
            kind = %stage.label(),
            inputs = stage.inputs.len(),
            "Running stage"
        );

        let outcome = self.invoker.invoke(&stage.invocation)?;
        let diagnostic = Some(diagnostic_tail(&outcome.stderr, self.max_diagnostic_bytes))
            .filter(|d| !d.is_empty());

        if !outcome.success() {
            return Ok(StageResult {
                success: false,
                exit_code: outcome.exit_code,
                diagnostic,
            });
        }

        if !stage.output.is_file() {
            return Ok(StageResult {
                success: false,
                exit_code: outcome.exit_code,
                diagnostic: Some(format!(
                    "engine exited successfully but did not write {}",
                    stage.output.display()
                )),
            });
        }

        tracing::debug!(job_id = %job_id, stage = stage.index, "Stage succeeded");
        Ok(StageResult {
            success: true,
            exit_code: outcome.exit_code,
            diagnostic,
        })
    }
}

/// Setup checks that need the filesystem.
fn preflight(request: &RenderRequest, plan: &StagePlan) -> ClipforgeResult<()> {
    for clip in &request.clips {
        if !clip.source.is_file() {
            return Err(ClipforgeError::FileNotFound {
                path: clip.source.clone(),
            });
        }
    }
    if let Some(parent) = plan.output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Move the finished file to its canonical location. Falls back to a copy
/// when the rename fails (e.g. across filesystems).
fn place_output(from: &Path, to: &Path) -> ClipforgeResult<()> {
    place_output_with(from, to, |src, dst| std::fs::copy(src, dst).map(|_| ()))
}

/// The copy lands in a `.partial` sibling of `to` and is renamed into place
/// only once complete, so `to` never holds a truncated file.
fn place_output_with<F>(from: &Path, to: &Path, copy: F) -> ClipforgeResult<()>
where
    F: Fn(&Path, &Path) -> std::io::Result<()>,
{
    if std::fs::rename(from, to).is_ok() {
        return Ok(());
    }

    let mut partial = to.as_os_str().to_os_string();
    partial.push(".partial");
    let partial = PathBuf::from(partial);

    let placed = copy(from, &partial).and_then(|()| std::fs::rename(&partial, to));
    if let Err(e) = placed {
        if let Err(err) = std::fs::remove_file(&partial) {
            if err.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(error = %err, path = %partial.display(), "Failed to remove partial output");
            }
        }
        return Err(ClipforgeError::Other(anyhow::anyhow!(
            "failed to place output {} -> {}: {e}",
            from.display(),
            to.display()
        )));
    }

    if let Err(err) = std::fs::remove_file(from) {
        tracing::warn!(error = %err, path = %from.display(), "Failed to remove staged output");
    }
    Ok(())
}

/// Owns one job's intermediate files and removes them on drop.
#[derive(Debug)]
pub struct IntermediateFiles {
    dir: PathBuf,
    files: Vec<PathBuf>,
}

impl IntermediateFiles {
    pub fn new(dir: PathBuf) -> Self {
        Self {
            dir,
            files: Vec::new(),
        }
    }

    /// Take ownership of a path a stage is about to write.
    pub fn register(&mut self, path: PathBuf) {
        self.files.push(path);
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.files
    }

    fn cleanup(&mut self) {
        for path in self.files.drain(..) {
            match std::fs::remove_file(&path) {
                Ok(()) => tracing::debug!(path = %path.display(), "Removed intermediate"),
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
                Err(err) => {
                    tracing::warn!(error = %err, path = %path.display(), "Failed to remove intermediate")
                }
            }
        }
        match std::fs::remove_dir(&self.dir) {
            Ok(()) => {}
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => {
                tracing::warn!(error = %err, dir = %self.dir.display(), "Failed to remove work directory")
            }
        }
    }
}

impl Drop for IntermediateFiles {
    fn drop(&mut self) {
        self.cleanup();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ScriptedInvoker, ScriptedOutcome};
    use clipforge_job_model::{ClipTrim, OverlaySpec};
    use std::sync::Mutex;

    struct Fixture {
        _root: tempfile::TempDir,
        config: RenderConfig,
        sources: Vec<PathBuf>,
    }

    impl Fixture {
        fn new(clips: usize) -> Self {
            let root = tempfile::tempdir().unwrap();
            let media = root.path().join("media");
            std::fs::create_dir_all(&media).unwrap();
            let sources = (0..clips)
                .map(|i| {
                    let path = media.join(format!("clip{i}.mp4"));
                    std::fs::write(&path, format!("source {i}")).unwrap();
                    path
                })
                .collect();
            let config = RenderConfig {
                output_dir: root.path().join("out"),
                work_dir: root.path().join("out").join(".work"),
                ..RenderConfig::default()
            };
            Self {
                _root: root,
                config,
                sources,
            }
        }

        fn request(&self, overlays: usize) -> RenderRequest {
            let clips = self
                .sources
                .iter()
                .map(|s| ClipTrim::new(s.clone(), 0.0, 1.0))
                .collect();
            let overlays = (0..overlays)
                .map(|i| OverlaySpec::new(format!("caption {i}"), 0.0, 1.0))
                .collect();
            RenderRequest::new(clips).with_overlays(overlays)
        }

        fn output(&self) -> PathBuf {
            self.config.output_dir.join("final.mp4")
        }

        fn work_is_empty(&self) -> bool {
            match std::fs::read_dir(&self.config.work_dir) {
                Ok(mut entries) => entries.next().is_none(),
                Err(_) => true,
            }
        }

        fn sources_untouched(&self) -> bool {
            self.sources.iter().enumerate().all(|(i, s)| {
                std::fs::read_to_string(s).map(|c| c == format!("source {i}")).unwrap_or(false)
            })
        }
    }

    fn run(
        fixture: &Fixture,
        invoker: Arc<ScriptedInvoker>,
        request: &RenderRequest,
    ) -> (ClipforgeResult<PathBuf>, Vec<u8>) {
        let executor = StageChainExecutor::new(&fixture.config, invoker);
        let seen = Mutex::new(Vec::new());
        let record = |p: u8| seen.lock().unwrap().push(p);
        let result = executor.execute(JobId::new(), request, &fixture.output(), &record);
        (result, seen.into_inner().unwrap())
    }

    fn request() -> RenderRequest {
        RenderRequest::new(vec![ClipTrim::new("/media/a.mp4", 0.0, 2.0)]).with_overlays(vec![
            OverlaySpec::new("one", 0.0, 1.0),
            OverlaySpec::new("two", 1.0, 2.0),
        ])
    }

    #[test]
    fn test_progress_schedule() {
        assert_eq!(stage_done_progress(0, 0), 60);
        assert_eq!(stage_done_progress(0, 2), 60);
        assert_eq!(stage_done_progress(1, 2), 75);
        assert_eq!(stage_done_progress(2, 2), 90);
        assert_eq!(stage_done_progress(1, 3), 70);
        assert_eq!(stage_done_progress(3, 3), 90);
        assert_eq!(stage_done_progress(7, 7), 90);
    }

    #[test]
    fn test_plan_chains_outputs_into_inputs() {
        let id = JobId::new();
        let plan = plan_stages(
            id,
            &request(),
            Path::new("ffmpeg"),
            &EncodeSettings::default(),
            Path::new("/work"),
            Path::new("/out/final.mp4"),
        )
        .unwrap();

        let work = PathBuf::from("/work").join(id.to_string());
        assert_eq!(plan.work_dir, work);
        assert_eq!(plan.stages.len(), 3);
        assert_eq!(plan.stages[0].kind, StageKind::Concat { clips: 1 });
        assert_eq!(plan.stages[0].inputs, vec![PathBuf::from("/media/a.mp4")]);
        assert_eq!(plan.stages[0].output, work.join("stage-0.mp4"));
        assert_eq!(plan.stages[1].inputs, vec![work.join("stage-0.mp4")]);
        assert_eq!(plan.stages[2].inputs, vec![work.join("stage-1.mp4")]);
        assert_eq!(plan.stages[2].output, work.join("stage-2.mp4"));
        assert_eq!(plan.stages[2].label(), "overlay 2");
        assert_eq!(
            plan.stages[1].invocation.output(),
            Some(work.join("stage-1.mp4").as_path())
        );
    }

    #[test]
    fn test_plan_serializes_for_dry_runs() {
        let plan = plan_stages(
            JobId::new(),
            &request(),
            Path::new("ffmpeg"),
            &EncodeSettings::default(),
            Path::new("/work"),
            Path::new("/out/final.mp4"),
        )
        .unwrap();
        let value = serde_json::to_value(&plan).unwrap();
        assert_eq!(value["stages"][0]["kind"]["kind"], "concat");
        assert_eq!(value["stages"][1]["kind"]["overlay"], 0);
        assert_eq!(value["stages"][0]["invocation"]["args"][0], "-hide_banner");
    }

    #[test]
    fn test_plan_rejects_invalid_request() {
        let bad = RenderRequest::new(vec![]);
        let err = plan_stages(
            JobId::new(),
            &bad,
            Path::new("ffmpeg"),
            &EncodeSettings::default(),
            Path::new("/work"),
            Path::new("/out/final.mp4"),
        )
        .unwrap_err();
        assert!(matches!(err, ClipforgeError::InvalidInput { .. }));
    }

    #[test]
    fn test_plan_refuses_to_overwrite_a_source() {
        let request = RenderRequest::new(vec![ClipTrim::new("/out/final.mp4", 0.0, 1.0)]);
        let err = plan_stages(
            JobId::new(),
            &request,
            Path::new("ffmpeg"),
            &EncodeSettings::default(),
            Path::new("/work"),
            Path::new("/out/final.mp4"),
        )
        .unwrap_err();
        assert!(matches!(err, ClipforgeError::InvalidInput { .. }));
    }

    #[test]
    fn test_concat_only_runs_one_stage() {
        let fixture = Fixture::new(2);
        let invoker = Arc::new(ScriptedInvoker::new());
        let (result, progress) = run(&fixture, invoker.clone(), &fixture.request(0));

        assert_eq!(result.unwrap(), fixture.output());
        assert!(fixture.output().is_file());
        assert_eq!(invoker.call_count(), 1);
        assert_eq!(progress, vec![30, 60]);
        assert!(fixture.work_is_empty());
        assert!(fixture.sources_untouched());
    }

    #[test]
    fn test_overlays_run_one_stage_each_in_order() {
        let fixture = Fixture::new(1);
        let invoker = Arc::new(ScriptedInvoker::new());
        let (result, progress) = run(&fixture, invoker.clone(), &fixture.request(2));

        assert!(result.is_ok());
        assert_eq!(progress, vec![30, 60, 75, 90]);

        let calls = invoker.calls();
        assert_eq!(calls.len(), 3);
        // Each overlay stage reads the previous stage's output.
        for pair in calls.windows(2) {
            let previous_output = pair[0].output().unwrap();
            let expected = format!("file:{}", previous_output.display());
            assert!(pair[1].args.iter().any(|a| a.to_string_lossy() == expected));
        }
        let overlay_graphs: Vec<String> = calls[1..]
            .iter()
            .map(|c| c.args.iter().map(|a| a.to_string_lossy().into_owned()).collect())
            .collect();
        assert!(overlay_graphs[0].contains("caption 0"));
        assert!(overlay_graphs[1].contains("caption 1"));
        assert!(fixture.work_is_empty());
        assert!(fixture.sources_untouched());
    }

    #[test]
    fn test_failed_concat_stops_chain_at_sixty() {
        let fixture = Fixture::new(1);
        let invoker = Arc::new(ScriptedInvoker::new().fail_call(0, 1, "Invalid data found"));
        let (result, progress) = run(&fixture, invoker.clone(), &fixture.request(2));

        match result.unwrap_err() {
            ClipforgeError::StageFailure {
                stage,
                exit_code,
                diagnostic,
            } => {
                assert_eq!(stage, "concat");
                assert_eq!(exit_code, Some(1));
                assert!(diagnostic.contains("Invalid data found"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(progress, vec![30, 60]);
        assert_eq!(invoker.call_count(), 1);
        assert!(!fixture.output().exists());
        assert!(fixture.work_is_empty());
    }

    #[test]
    fn test_failed_overlay_cleans_up_earlier_stages() {
        let fixture = Fixture::new(2);
        let invoker = Arc::new(ScriptedInvoker::new().fail_call(2, 234, ""));
        let (result, progress) = run(&fixture, invoker.clone(), &fixture.request(3));

        let err = result.unwrap_err();
        assert!(err.to_string().contains("overlay 2"));
        assert!(err.to_string().contains("no diagnostic"));
        assert_eq!(progress, vec![30, 60, 70, 80]);
        assert_eq!(invoker.call_count(), 3);
        assert!(!fixture.output().exists());
        assert!(fixture.work_is_empty());
        assert!(fixture.sources_untouched());
    }

    #[test]
    fn test_dispatch_error_keeps_start_progress() {
        let fixture = Fixture::new(1);
        let invoker = Arc::new(
            ScriptedInvoker::new().on_call(0, ScriptedOutcome::Dispatch("not found".into())),
        );
        let (result, progress) = run(&fixture, invoker, &fixture.request(0));

        assert!(result.unwrap_err().is_dispatch());
        assert_eq!(progress, vec![30]);
        assert!(fixture.work_is_empty());
    }

    #[test]
    fn test_missing_output_counts_as_failure() {
        let fixture = Fixture::new(1);
        let invoker =
            Arc::new(ScriptedInvoker::new().on_call(0, ScriptedOutcome::SucceedWithoutOutput));
        let (result, _) = run(&fixture, invoker, &fixture.request(0));

        assert!(matches!(
            result,
            Err(ClipforgeError::StageFailure { exit_code: Some(0), .. })
        ));
    }

    #[test]
    fn test_missing_source_fails_before_any_stage() {
        let fixture = Fixture::new(1);
        let request = RenderRequest::new(vec![ClipTrim::new(
            fixture.config.output_dir.join("missing.mp4"),
            0.0,
            1.0,
        )]);
        let invoker = Arc::new(ScriptedInvoker::new());
        let (result, progress) = run(&fixture, invoker.clone(), &request);

        assert!(matches!(result, Err(ClipforgeError::FileNotFound { .. })));
        assert!(progress.is_empty());
        assert_eq!(invoker.call_count(), 0);
    }

    #[test]
    fn test_interrupted_copy_leaves_nothing_at_output() {
        use std::io::Write;

        let root = tempfile::tempdir().unwrap();
        // Not present, so the rename fails and the copy path runs.
        let from = root.path().join("work").join("stage-0.mp4");
        let to = root.path().join("render_abcd1234.mp4");

        let result = place_output_with(&from, &to, |_, dst| {
            let mut file = std::fs::File::create(dst)?;
            file.write_all(&[0u8; 4096])?;
            Err(std::io::Error::other("file size limit exceeded"))
        });

        assert!(result.is_err());
        assert!(!to.exists());
        assert!(!root.path().join("render_abcd1234.mp4.partial").exists());
    }

    #[test]
    fn test_copy_fallback_places_complete_file() {
        let root = tempfile::tempdir().unwrap();
        let from = root.path().join("stage-0.mp4");
        let to = root.path().join("out").join("final.mp4");
        std::fs::create_dir_all(to.parent().unwrap()).unwrap();
        std::fs::write(&from, b"rendered").unwrap();

        // A directory at `to` makes the rename fail; clear it before the copy.
        std::fs::create_dir(&to).unwrap();
        place_output_with(&from, &to, |src, dst| {
            std::fs::remove_dir(&to)?;
            std::fs::copy(src, dst).map(|_| ())
        })
        .unwrap();

        assert_eq!(std::fs::read(&to).unwrap(), b"rendered");
        assert!(!from.exists());
        assert!(!root.path().join("out").join("final.mp4.partial").exists());
    }

    #[test]
    fn test_intermediate_guard_removes_files_and_directory() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("job");
        std::fs::create_dir_all(&dir).unwrap();
        let a = dir.join("stage-0.mp4");
        let b = dir.join("stage-1.mp4");
        std::fs::write(&a, b"a").unwrap();
        std::fs::write(&b, b"b").unwrap();

        {
            let mut guard = IntermediateFiles::new(dir.clone());
            guard.register(a.clone());
            guard.register(b.clone());
            // Registered but never written.
            guard.register(dir.join("stage-2.mp4"));
            assert_eq!(guard.paths().len(), 3);
        }

        assert!(!a.exists());
        assert!(!b.exists());
        assert!(!dir.exists());
    }
}
