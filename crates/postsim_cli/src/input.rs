//! Input loading
//!
//! - Posterior: JSON `{ chain, tune, par_fix, prior_arg, prior_names? }`
//! - Observed data and innovation masks: headered CSV, empty cell = NaN
//! - Shock specifications: `name[:size[:period]]`

use std::fs::File;
use std::io::Read;
use std::path::Path;

use ndarray::{Array1, Array2, Array3};
use postsim_core::traits::ShockSpec;
use postsim_core::types::{Chain, ParameterLayout, Posterior};
use serde::Deserialize;

use crate::{CliError, Result};

/// Posterior as stored on disk
#[derive(Debug, Clone, Deserialize)]
pub struct PosteriorFile {
    /// `[walker][iteration][parameter]`
    pub chain: Vec<Vec<Vec<f64>>>,
    pub tune: usize,
    pub par_fix: Vec<f64>,
    pub prior_arg: Vec<usize>,
    #[serde(default)]
    pub prior_names: Option<Vec<String>>,
}

impl PosteriorFile {
    /// Converts to a validated [`Posterior`]
    pub fn into_posterior(self, source: &str) -> Result<Posterior> {
        let walkers = self.chain.len();
        let iterations = self.chain.first().map_or(0, Vec::len);
        let params = self
            .chain
            .first()
            .and_then(|w| w.first())
            .map_or(self.prior_arg.len(), Vec::len);

        let mut flat = Vec::with_capacity(walkers * iterations * params);
        for (w, walker) in self.chain.into_iter().enumerate() {
            if walker.len() != iterations {
                return Err(CliError::input(
                    source,
                    format!(
                        "walker {} has {} iteration(s), expected {}",
                        w,
                        walker.len(),
                        iterations
                    ),
                ));
            }
            for (i, row) in walker.into_iter().enumerate() {
                if row.len() != params {
                    return Err(CliError::input(
                        source,
                        format!(
                            "chain[{}][{}] has {} value(s), expected {}",
                            w,
                            i,
                            row.len(),
                            params
                        ),
                    ));
                }
                flat.extend(row);
            }
        }

        let draws = Array3::from_shape_vec((walkers, iterations, params), flat)
            .map_err(|e| CliError::input(source, e.to_string()))?;
        let layout = ParameterLayout::new(Array1::from(self.par_fix), self.prior_arg)?;
        let posterior = Posterior::new(Chain::new(draws), self.tune, layout)?;
        match self.prior_names {
            Some(names) => Ok(posterior.with_prior_names(names)?),
            None => Ok(posterior),
        }
    }
}

fn open(path: &str) -> Result<File> {
    if !Path::new(path).exists() {
        return Err(CliError::FileNotFound(path.to_string()));
    }
    Ok(File::open(path)?)
}

/// Parses a posterior JSON document
pub fn parse_posterior<R: Read>(reader: R, source: &str) -> Result<Posterior> {
    let file: PosteriorFile = serde_json::from_reader(reader)?;
    file.into_posterior(source)
}

/// Reads a posterior JSON file
pub fn read_posterior(path: &str) -> Result<Posterior> {
    parse_posterior(open(path)?, path)
}

/// Numeric table with column names
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub values: Array2<f64>,
}

/// Parses a headered CSV table; empty cells become NaN
pub fn parse_table<R: Read>(reader: R, source: &str) -> Result<Table> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
    let ncols = headers.len();

    let mut data = Vec::new();
    let mut nrows = 0;
    for (row, record) in rdr.records().enumerate() {
        let record = record?;
        if record.len() != ncols {
            return Err(CliError::input(
                source,
                format!(
                    "row {} has {} field(s), expected {}",
                    row + 1,
                    record.len(),
                    ncols
                ),
            ));
        }
        for (col, field) in record.iter().enumerate() {
            let value = if field.is_empty() || field.eq_ignore_ascii_case("nan") {
                f64::NAN
            } else {
                field.parse::<f64>().map_err(|_| {
                    CliError::input(
                        source,
                        format!(
                            "row {}, column '{}': '{}' is not a number",
                            row + 1,
                            headers[col],
                            field
                        ),
                    )
                })?
            };
            data.push(value);
        }
        nrows += 1;
    }

    let values = Array2::from_shape_vec((nrows, ncols), data)
        .map_err(|e| CliError::input(source, e.to_string()))?;
    Ok(Table { headers, values })
}

/// Reads a headered CSV file
pub fn read_table(path: &str) -> Result<Table> {
    parse_table(open(path)?, path)
}

/// Parses `name[:size[:period]]`
pub fn parse_shock(spec: &str) -> Result<ShockSpec> {
    let invalid = |reason: &str| CliError::InvalidArgument(format!("shock '{}': {}", spec, reason));

    let mut parts = spec.split(':');
    let name = parts
        .next()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or_else(|| invalid("missing name"))?;
    let size = match parts.next() {
        Some(s) => s.trim().parse().map_err(|_| invalid("size is not a number"))?,
        None => 1.0,
    };
    let period = match parts.next() {
        Some(p) => p
            .trim()
            .parse()
            .map_err(|_| invalid("period is not a non-negative integer"))?,
        None => 0,
    };
    if parts.next().is_some() {
        return Err(invalid("expected name[:size[:period]]"));
    }
    Ok(ShockSpec::new(name, size, period))
}
