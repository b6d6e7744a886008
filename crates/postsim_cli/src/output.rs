//! JSON reports of stacked ensembles

use std::fs::File;
use std::io::{self, BufWriter, Write};

use ndarray::Array3;
use postsim_core::traits::ShockSpec;
use postsim_engine::{DrawFailure, IrfEnsemble, SimulationEnsemble};
use serde::Serialize;

use crate::Result;

/// `[draw][period][column]`
pub type Nested = Vec<Vec<Vec<f64>>>;

/// Converts a stacked array to nested vectors (NaN serialises as `null`)
pub fn nested(array: &Array3<f64>) -> Nested {
    array
        .outer_iter()
        .map(|draw| draw.outer_iter().map(|row| row.to_vec()).collect())
        .collect()
}

/// A draw skipped under the best-effort policy
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailedDraw {
    pub index: usize,
    pub error: String,
}

fn failed_draws(failures: &[DrawFailure]) -> Vec<FailedDraw> {
    failures
        .iter()
        .map(|f| FailedDraw {
            index: f.index,
            error: f.error.to_string(),
        })
        .collect()
}

/// Output of `postsim simulate`
#[derive(Debug, Serialize)]
pub struct SimulationReport {
    pub draws: usize,
    pub variables: Vec<String>,
    pub shocks: Vec<String>,
    pub draw_indices: Vec<usize>,
    pub failed_draws: Vec<FailedDraw>,
    pub observables: Nested,
    pub states: Nested,
    pub simulated_shocks: Nested,
    pub residuals: Nested,
}

impl SimulationReport {
    pub fn new(ensemble: &SimulationEnsemble, variables: &[String], shocks: &[String]) -> Self {
        Self {
            draws: ensemble.n_draws(),
            variables: variables.to_vec(),
            shocks: shocks.to_vec(),
            draw_indices: ensemble.draw_indices.clone(),
            failed_draws: failed_draws(&ensemble.failures),
            observables: nested(&ensemble.observables),
            states: nested(&ensemble.states),
            simulated_shocks: nested(&ensemble.shocks),
            residuals: nested(&ensemble.residuals),
        }
    }
}

/// Output of `postsim irfs`
#[derive(Debug, Serialize)]
pub struct IrfReport {
    pub draws: usize,
    pub horizon: usize,
    pub impulses: Vec<ShockSpec>,
    pub labels: Vec<String>,
    pub draw_indices: Vec<usize>,
    pub failed_draws: Vec<FailedDraw>,
    pub paths: Nested,
    pub observables: Nested,
    pub shocks: Nested,
}

impl IrfReport {
    pub fn new(ensemble: &IrfEnsemble, impulses: &[ShockSpec], horizon: usize) -> Self {
        Self {
            draws: ensemble.n_draws(),
            horizon,
            impulses: impulses.to_vec(),
            labels: ensemble.labels.clone(),
            draw_indices: ensemble.draw_indices.clone(),
            failed_draws: failed_draws(&ensemble.failures),
            paths: nested(&ensemble.paths),
            observables: nested(&ensemble.observables),
            shocks: nested(&ensemble.shocks),
        }
    }
}

/// Writes `report` as pretty JSON to `path`, or stdout when `None`
pub fn write_json<T: Serialize>(path: Option<&str>, report: &T) -> Result<()> {
    match path {
        Some(path) => {
            let mut writer = BufWriter::new(File::create(path)?);
            serde_json::to_writer_pretty(&mut writer, report)?;
            writer.flush()?;
        }
        None => {
            let stdout = io::stdout();
            let mut writer = stdout.lock();
            serde_json::to_writer_pretty(&mut writer, report)?;
            writeln!(writer)?;
        }
    }
    Ok(())
}
