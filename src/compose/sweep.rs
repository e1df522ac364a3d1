//! Parameter sweeps: every combination of comma-separated choices
//!
//! `data=mnist,cifar` and `trainer.max_epochs=5,10` expand to four jobs.
//! Axes keep their declared order and the last axis varies fastest. Commas
//! inside brackets or quotes do not split (`callbacks=[a,b]` is one choice).

use rayon::prelude::*;

use super::assign::{assignments_to_node, Assignment};
use super::directive::OverrideDirective;
use super::Composer;
use crate::document::Document;
use crate::domain::{ComposeError, ExperimentConfig, Result};
use crate::registry::Registry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AxisKind {
    Group,
    Key,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Axis {
    kind: AxisKind,
    lhs: String,
    choices: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SweepJob {
    pub index: usize,
    pub overrides: Vec<OverrideDirective>,
    pub assignments: Vec<Assignment>,
    labels: Vec<String>,
}

impl SweepJob {
    /// The job's concrete selections, e.g. `data=mnist trainer.max_epochs=5`.
    pub fn label(&self) -> String {
        self.labels.join(" ")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sweep {
    axes: Vec<Axis>,
}

impl Sweep {
    pub fn parse<S: AsRef<str>>(directives: &[S], assignments: &[S]) -> Result<Self> {
        let mut axes = Vec::with_capacity(directives.len() + assignments.len());
        for raw in directives {
            axes.push(parse_axis(raw.as_ref(), AxisKind::Group)?);
        }
        for raw in assignments {
            axes.push(parse_axis(raw.as_ref(), AxisKind::Key)?);
        }
        Ok(Self { axes })
    }

    /// Number of jobs the sweep expands to.
    pub fn len(&self) -> usize {
        self.axes.iter().map(|axis| axis.choices.len()).product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn jobs(&self) -> Result<Vec<SweepJob>> {
        let total = self.len();
        let mut jobs = Vec::with_capacity(total);
        let mut cursor = vec![0usize; self.axes.len()];

        for index in 0..total {
            let mut job =
                SweepJob { index, overrides: Vec::new(), assignments: Vec::new(), labels: Vec::new() };
            for (axis, &pick) in self.axes.iter().zip(&cursor) {
                let raw = format!("{}={}", axis.lhs, axis.choices[pick]);
                match axis.kind {
                    AxisKind::Group => job.overrides.push(OverrideDirective::parse(&raw)?),
                    AxisKind::Key => job.assignments.push(Assignment::parse(&raw)?),
                }
                job.labels.push(raw);
            }
            jobs.push(job);

            // odometer: bump the last axis, carry leftwards
            for (slot, axis) in cursor.iter_mut().zip(&self.axes).rev() {
                *slot += 1;
                if *slot < axis.choices.len() {
                    break;
                }
                *slot = 0;
            }
        }
        Ok(jobs)
    }

    /// Compose every job in parallel. Results keep expansion order; the
    /// first failing job's error is returned.
    pub fn run<R: Registry>(
        &self,
        composer: &Composer<R>,
        base_name: &str,
        document: &Document,
    ) -> Result<Vec<(SweepJob, ExperimentConfig)>> {
        let jobs = self.jobs()?;
        tracing::debug!("Sweeping {} job(s) over '{}'", jobs.len(), base_name);
        let outcomes: Vec<Result<(SweepJob, ExperimentConfig)>> = jobs
            .into_par_iter()
            .map(|job| {
                let inline = assignments_to_node(&job.assignments);
                composer
                    .compose_document(base_name, document, &job.overrides, Some(&inline))
                    .map(|config| (job, config))
            })
            .collect();
        // sequential fold so the lowest-index failure is the one reported
        outcomes.into_iter().collect()
    }
}

fn parse_axis(raw: &str, kind: AxisKind) -> Result<Axis> {
    let Some((lhs, rhs)) = raw.split_once('=') else {
        return Err(ComposeError::InvalidDocument {
            source_name: raw.to_string(),
            reason: "expected 'name=choice[,choice...]'".to_string(),
        });
    };
    let choices = split_choices(rhs);
    if choices.iter().any(|choice| choice.is_empty()) {
        return Err(ComposeError::InvalidDocument {
            source_name: raw.to_string(),
            reason: "empty sweep choice".to_string(),
        });
    }
    Ok(Axis { kind, lhs: lhs.trim().to_string(), choices })
}

/// Split on commas that are not nested in brackets, braces or quotes.
fn split_choices(raw: &str) -> Vec<String> {
    let mut choices = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;

    for c in raw.chars() {
        match (quote, c) {
            (Some(q), _) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"') => quote = Some(c),
            (None, '[' | '{') => depth += 1,
            (None, ']' | '}') => depth = depth.saturating_sub(1),
            (None, ',') if depth == 0 => {
                choices.push(current.trim().to_string());
                current.clear();
                continue;
            }
            _ => {}
        }
        current.push(c);
    }
    choices.push(current.trim().to_string());
    choices
}
