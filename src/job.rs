//! Running a settings aggregate against a document.
//!
//! A [`Job`] binds one input file to a [`JobSettings`] and executes the
//! enabled operations as a fixed pipeline: merge, delete, compress, split.
//! Merge runs first so page expressions address the combined document;
//! split runs last because it fans out into many files. Stages in between
//! pass a single in-memory document along, so intermediate results never
//! touch the disk.

use crate::error::{Error, Result};
use crate::ops;
use crate::pages::PageSet;
use crate::settings::{CompressionLevel, JobSettings};
use crossbeam_channel::Sender;
use lopdf::Document;
use rayon::prelude::*;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStage {
    Merge,
    Delete,
    Compress,
    Split,
}

impl JobStage {
    /// Stage name as it appears in logs and progress output.
    pub fn name(&self) -> &'static str {
        match self {
            JobStage::Merge => "merge",
            JobStage::Delete => "delete",
            JobStage::Compress => "compress",
            JobStage::Split => "split",
        }
    }
}

impl fmt::Display for JobStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Outcome of one pipeline stage.
#[derive(Debug, Clone, Serialize)]
pub struct StageReport {
    pub stage: JobStage,
    pub input_pages: u32,
    pub output_pages: u32,
    pub elapsed_ms: u64,
}

/// Outcome of a whole job.
#[derive(Debug, Clone, Serialize)]
pub struct JobReport {
    pub input: PathBuf,
    pub outputs: Vec<PathBuf>,
    pub input_bytes: u64,
    pub output_bytes: u64,
    pub stages: Vec<StageReport>,
    pub elapsed_ms: u64,
}

/// Events emitted while a job runs.
#[derive(Debug, Clone)]
pub enum JobEvent {
    /// The job has started; `stages` lists what will run, in order.
    JobStarted {
        input: PathBuf,
        stages: Vec<JobStage>,
    },
    /// A stage is starting.
    StageStarted { stage: JobStage },
    /// A stage has finished.
    StageFinished { report: StageReport },
    /// The job has finished and all outputs are on disk.
    JobFinished { outputs: Vec<PathBuf> },
}

impl JobEvent {
    /// The stage this event concerns, if any.
    pub fn stage(&self) -> Option<JobStage> {
        match self {
            JobEvent::StageStarted { stage } => Some(*stage),
            JobEvent::StageFinished { report } => Some(report.stage),
            _ => None,
        }
    }

    /// Check if this is the final event of a job.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobEvent::JobFinished { .. })
    }
}

/// A processing job: one input document plus the settings describing what
/// to do with it.
#[derive(Debug, Clone)]
pub struct Job {
    input: PathBuf,
    settings: JobSettings,
}

impl Job {
    /// Create a job for the given input file.
    pub fn new(input: impl Into<PathBuf>, settings: JobSettings) -> Self {
        Self {
            input: input.into(),
            settings,
        }
    }

    /// The input path.
    pub fn input(&self) -> &Path {
        &self.input
    }

    /// The settings driving this job.
    pub fn settings(&self) -> &JobSettings {
        &self.settings
    }

    /// The stages this job will run, in order.
    pub fn stages(&self) -> Vec<JobStage> {
        let settings = &self.settings;
        let mut stages = Vec::new();
        if settings
            .merge_options
            .as_ref()
            .is_some_and(|options| !options.append.is_empty())
        {
            stages.push(JobStage::Merge);
        }
        if settings
            .delete_pages
            .as_deref()
            .is_some_and(|expr| !expr.trim().is_empty())
        {
            stages.push(JobStage::Delete);
        }
        if settings
            .compression_level
            .is_some_and(|level| level != CompressionLevel::None)
        {
            stages.push(JobStage::Compress);
        }
        if settings.split_options.is_some() {
            stages.push(JobStage::Split);
        }
        stages
    }

    /// Run the job.
    pub fn run(&self) -> Result<JobReport> {
        self.execute(None)
    }

    /// Run the job, emitting [`JobEvent`]s over the channel as stages
    /// start and finish. A dropped receiver does not abort the job.
    pub fn run_with_events(&self, events: Sender<JobEvent>) -> Result<JobReport> {
        self.execute(Some(events))
    }

    fn execute(&self, events: Option<Sender<JobEvent>>) -> Result<JobReport> {
        if self.settings.is_empty() {
            return Err(Error::EmptyJob);
        }

        let start = Instant::now();
        let stages = self.stages();
        emit(
            &events,
            JobEvent::JobStarted {
                input: self.input.clone(),
                stages: stages.clone(),
            },
        );
        log::debug!(
            "job on {}: stages {:?}",
            self.input.display(),
            stages.iter().map(JobStage::name).collect::<Vec<_>>()
        );

        let mut input_bytes = ops::file_size(&self.input);
        let mut working = ops::load_document(&self.input)?;
        let mut reports: Vec<StageReport> = Vec::with_capacity(stages.len());
        let mut outputs: Vec<PathBuf> = Vec::new();
        let mut output_bytes: u64 = 0;
        let mut split_ran = false;

        for stage in stages {
            emit(&events, JobEvent::StageStarted { stage });
            let stage_start = Instant::now();
            let pages_before = ops::page_count(&working);
            let mut pages_after = pages_before;

            match stage {
                JobStage::Merge => {
                    if let Some(options) = &self.settings.merge_options {
                        input_bytes += options
                            .append
                            .iter()
                            .map(|path| ops::file_size(path))
                            .sum::<u64>();
                        let appended: Vec<Document> = options
                            .append
                            .par_iter()
                            .map(|path| ops::load_document(path))
                            .collect::<Result<_>>()?;

                        let mut documents = Vec::with_capacity(1 + appended.len());
                        documents.push(working);
                        documents.extend(appended);
                        working = ops::merge_documents(documents, options.keep_metadata)?;
                        pages_after = ops::page_count(&working);
                    }
                }
                JobStage::Delete => {
                    let expr = self.settings.delete_pages.as_deref().unwrap_or("");
                    let set = PageSet::parse(expr)?;
                    ops::delete_pages(&mut working, &set)?;
                    pages_after = ops::page_count(&working);
                }
                JobStage::Compress => {
                    let level = self.settings.compression_level.unwrap_or_default();
                    ops::compress_document(&mut working, level)?;
                }
                JobStage::Split => {
                    if let Some(options) = &self.settings.split_options {
                        let dir = self.split_output_dir();
                        let parts =
                            ops::write_parts(&working, options, &self.stem(), &dir)?;
                        pages_after = parts.iter().map(|(_, _, pages)| pages).sum();
                        output_bytes = parts.iter().map(|(_, bytes, _)| bytes).sum();
                        outputs = parts.into_iter().map(|(path, _, _)| path).collect();
                        split_ran = true;
                    }
                }
            }

            let report = StageReport {
                stage,
                input_pages: pages_before,
                output_pages: pages_after,
                elapsed_ms: stage_start.elapsed().as_millis() as u64,
            };
            emit(
                &events,
                JobEvent::StageFinished {
                    report: report.clone(),
                },
            );
            reports.push(report);
        }

        if !split_ran {
            let output = self.single_output_path();
            output_bytes = ops::save_document(&mut working, &output)?;
            outputs = vec![output];
        }

        emit(
            &events,
            JobEvent::JobFinished {
                outputs: outputs.clone(),
            },
        );

        Ok(JobReport {
            input: self.input.clone(),
            outputs,
            input_bytes,
            output_bytes,
            stages: reports,
            elapsed_ms: start.elapsed().as_millis() as u64,
        })
    }

    fn stem(&self) -> String {
        self.input
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("output")
            .to_string()
    }

    /// Where a single (non-split) result lands: the configured output
    /// path, or `{stem}_processed.pdf` next to the input. A configured
    /// path naming an existing directory gets the derived name inside it.
    fn single_output_path(&self) -> PathBuf {
        let derived = format!("{}_processed.pdf", self.stem());
        match &self.settings.output_path {
            Some(path) if path.is_dir() => path.join(derived),
            Some(path) => path.clone(),
            None => self.input_dir().join(derived),
        }
    }

    /// Where split parts land: the configured output path as a directory,
    /// or the input's directory.
    fn split_output_dir(&self) -> PathBuf {
        match &self.settings.output_path {
            Some(path) => path.clone(),
            None => self.input_dir(),
        }
    }

    fn input_dir(&self) -> PathBuf {
        self.input
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

fn emit(events: &Option<Sender<JobEvent>>, event: JobEvent) {
    if let Some(sender) = events {
        // a hung-up listener is not the job's problem
        sender.send(event).ok();
    }
}
