//! Engine argument lists.
//!
//! Arguments are kept as a literal list all the way to process creation.
//! Nothing here is ever joined into a shell command string.

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Serialize, Serializer};

use clipforge_common::config::EncodeSettings;

use crate::graph::{AudioRoute, GraphSpec};

/// One fully specified engine run: program plus ordered arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Invocation {
    pub program: PathBuf,
    #[serde(serialize_with = "serialize_lossy")]
    pub args: Vec<OsString>,
}

fn serialize_lossy<S: Serializer>(args: &[OsString], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(args.iter().map(|a| a.to_string_lossy()))
}

impl Invocation {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(&mut self, arg: impl AsRef<OsStr>) -> &mut Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn args<I, S>(&mut self, args: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        for arg in args {
            self.arg(arg);
        }
        self
    }

    /// The last argument, which for stage invocations is the output file.
    pub fn output(&self) -> Option<&Path> {
        self.args.last().map(Path::new)
    }
}

/// Human-readable rendering for logs and dry runs. Not a shell command.
impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {:?}", arg)?;
        }
        Ok(())
    }
}

/// Build the engine invocation for one stage.
///
/// Layout: global flags, inputs in graph order, the graph, stream maps,
/// encoder flags, output path last.
pub fn stage_invocation(
    program: &Path,
    graph: &GraphSpec,
    encode: &EncodeSettings,
    output: &Path,
) -> Invocation {
    let mut inv = Invocation::new(program);
    inv.args(["-hide_banner", "-nostdin", "-y"]);

    for input in &graph.inputs {
        inv.arg("-i").arg(file_input(input));
    }

    inv.arg("-filter_complex").arg(&graph.filter_complex);
    inv.arg("-map").arg(&graph.video_label);
    match &graph.audio {
        AudioRoute::Graph(label) => {
            inv.arg("-map").arg(label);
        }
        AudioRoute::Passthrough => {
            inv.arg("-map").arg("0:a?");
        }
    }

    inv.arg("-c:v")
        .arg(&encode.video_codec)
        .arg("-preset")
        .arg(&encode.preset)
        .arg("-crf")
        .arg(encode.crf.to_string());

    match &graph.audio {
        AudioRoute::Graph(_) => {
            inv.arg("-c:a")
                .arg(&encode.audio_codec)
                .arg("-b:a")
                .arg(&encode.audio_bitrate);
        }
        AudioRoute::Passthrough => {
            inv.arg("-c:a").arg("copy");
        }
    }

    inv.arg(output);
    inv
}

/// Pin an input to the file protocol so names like `concat:a|b`, `pipe:0`
/// or `subfile,,...` are read as plain paths.
fn file_input(path: &Path) -> OsString {
    let mut arg = OsString::from("file:");
    arg.push(path.as_os_str());
    arg
}
