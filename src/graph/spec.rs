// SYNOID Reels Filter Spec
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// A fully-resolved ffmpeg invocation: inputs with their per-input options,
// the filter graph, stream maps and output flags. Building one is pure;
// running one is the Job Runner's business.

use crate::process::safe_arg_path;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// One `-i` input with the options that must precede it.
#[derive(Debug, Clone, PartialEq)]
pub struct InputSpec {
    pub options: Vec<String>,
    pub path: PathBuf,
}

impl InputSpec {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            options: Vec::new(),
            path: path.into(),
        }
    }

    /// Loop the input forever; the graph decides when to stop.
    pub fn looped(path: impl Into<PathBuf>) -> Self {
        Self {
            options: vec!["-stream_loop".into(), "-1".into()],
            path: path.into(),
        }
    }

    /// A lavfi source such as `color=c=black:s=1080x1920:d=3`.
    pub fn lavfi(source: &str) -> Self {
        Self {
            options: vec!["-f".into(), "lavfi".into()],
            path: PathBuf::from(source),
        }
    }

    pub fn with_option(mut self, flag: &str, value: impl ToString) -> Self {
        self.options.push(flag.to_string());
        self.options.push(value.to_string());
        self
    }

    /// Options that must come first (e.g. `-hwaccel`).
    pub fn with_leading(mut self, args: Vec<String>) -> Self {
        let mut opts = args;
        opts.extend(self.options);
        self.options = opts;
        self
    }

    fn is_lavfi(&self) -> bool {
        self.options.windows(2).any(|w| w[0] == "-f" && w[1] == "lavfi")
    }
}

/// Everything needed to render one output file.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilterSpec {
    pub inputs: Vec<InputSpec>,
    pub filter_complex: Option<String>,
    pub maps: Vec<String>,
    pub output_args: Vec<String>,
}

impl FilterSpec {
    /// Index the next pushed input will have.
    pub fn next_input_index(&self) -> usize {
        self.inputs.len()
    }

    pub fn push_input(&mut self, input: InputSpec) -> usize {
        self.inputs.push(input);
        self.inputs.len() - 1
    }

    /// True if any input reads `path`.
    pub fn references(&self, path: &Path) -> bool {
        self.inputs.iter().any(|i| i.path == path)
    }

    /// Flags that drop every piece of source container metadata.
    pub fn strip_metadata_args() -> Vec<String> {
        [
            "-map_metadata",
            "-1",
            "-map_chapters",
            "-1",
            "-fflags",
            "+bitexact",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    /// Full ffmpeg argument vector writing to `output`.
    pub fn to_args(&self, output: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["-y".into(), "-hide_banner".into(), "-nostdin".into()];

        for input in &self.inputs {
            args.extend(input.options.iter().map(OsString::from));
            args.push("-i".into());
            if input.is_lavfi() {
                args.push(input.path.clone().into_os_string());
            } else {
                args.push(safe_arg_path(&input.path).into_os_string());
            }
        }

        if let Some(graph) = &self.filter_complex {
            args.push("-filter_complex".into());
            args.push(graph.into());
        }

        for map in &self.maps {
            args.push("-map".into());
            args.push(map.into());
        }

        args.extend(self.output_args.iter().map(OsString::from));
        args.push(safe_arg_path(output).into_os_string());
        args
    }

    /// Human-readable command line for logs and dry runs.
    pub fn display_command(&self, program: &str, output: &Path) -> String {
        let mut line = program.to_string();
        for arg in self.to_args(output) {
            let arg = arg.to_string_lossy();
            if arg.contains(' ') || arg.contains(';') || arg.contains('[') {
                line.push_str(&format!(" \"{}\"", arg));
            } else {
                line.push(' ');
                line.push_str(&arg);
            }
        }
        line
    }
}
