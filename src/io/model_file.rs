//! Flat-text model file reader and writer.
//!
//! Layout, one value per line with blank separator lines:
//!
//! ```text
//! Input size <d>
//!
//! <weight_0>
//! ...
//! <weight_{d-1}>
//!
//! <bias>
//!
//! <threshold>
//! ```
//!
//! Lines are whitespace-trimmed; blank lines are skipped and carry no
//! meaning. The header words are matched case-insensitively. Exactly
//! `d + 2` value lines must follow the header, and the threshold must lie
//! in [0, 1].
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::error::LogRegError;
use crate::math::Array1;
use crate::models::ModelParams;

/// Write fitted parameters to `path` in the flat text layout.
///
/// Values are printed with Rust's shortest round-trip `f64` formatting, so
/// a subsequent [`read_model`] reproduces them exactly.
pub fn write_model<P: AsRef<Path>>(path: P, params: &ModelParams) -> Result<(), LogRegError> {
    let mut writer = BufWriter::new(File::create(path)?);
    writeln!(writer, "Input size {}", params.weights.len())?;
    writeln!(writer)?;
    for weight in params.weights.iter() {
        writeln!(writer, "{}", weight)?;
    }
    writeln!(writer)?;
    writeln!(writer, "{}", params.bias)?;
    writeln!(writer)?;
    writeln!(writer, "{}", params.threshold)?;
    writer.flush()?;
    Ok(())
}

/// Parse a model file into a fresh `ModelParams`.
///
/// The value is built up locally and returned only on full success, so a
/// corrupt file never leaves a caller with partially overwritten state.
/// Slots a truncated file did not reach keep their canonical defaults
/// (zero weights, zero bias, threshold 0.5) while parsing, but a file with
/// fewer than `d + 2` value lines still fails at end-of-parse.
pub fn read_model<P: AsRef<Path>>(path: P) -> Result<ModelParams, LogRegError> {
    let reader = BufReader::new(File::open(path)?);
    let mut scratch: Option<ModelParams> = None;
    let mut input_size = 0usize;
    let mut parsed_values = 0usize;

    for line in reader.lines() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        match scratch.as_mut() {
            None => {
                input_size = parse_header(trimmed)?;
                scratch = Some(ModelParams {
                    bias: 0.0,
                    weights: Array1::zeros(input_size),
                    threshold: 0.5,
                });
            }
            Some(params) => {
                if parsed_values > input_size + 1 {
                    return Err(LogRegError::CorruptFile(format!(
                        "more than {} value lines after the header",
                        input_size + 2
                    )));
                }
                let value = parse_value(trimmed)?;
                if parsed_values < input_size {
                    params.weights[parsed_values] = value;
                } else if parsed_values == input_size {
                    params.bias = value;
                } else {
                    if !(0.0..=1.0).contains(&value) {
                        return Err(LogRegError::CorruptFile(format!(
                            "threshold {} outside [0, 1]",
                            value
                        )));
                    }
                    params.threshold = value;
                }
                parsed_values += 1;
            }
        }
    }

    let params = scratch
        .ok_or_else(|| LogRegError::CorruptFile("missing 'Input size' header line".to_string()))?;
    if parsed_values <= input_size + 1 {
        return Err(LogRegError::CorruptFile(format!(
            "expected {} value lines after the header, found {}",
            input_size + 2,
            parsed_values
        )));
    }
    Ok(params)
}

/// Parse the `Input size <d>` header, returning the declared feature count.
fn parse_header(line: &str) -> Result<usize, LogRegError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() != 3
        || !tokens[0].eq_ignore_ascii_case("input")
        || !tokens[1].eq_ignore_ascii_case("size")
    {
        return Err(LogRegError::CorruptFile(format!(
            "malformed header line: '{}'",
            line
        )));
    }
    let size: usize = tokens[2].parse().map_err(|_| {
        LogRegError::CorruptFile(format!("invalid input size: '{}'", tokens[2]))
    })?;
    if size == 0 {
        return Err(LogRegError::CorruptFile(
            "declared input size must be positive".to_string(),
        ));
    }
    Ok(size)
}

fn parse_value(line: &str) -> Result<f64, LogRegError> {
    line.parse()
        .map_err(|_| LogRegError::CorruptFile(format!("invalid numeric value: '{}'", line)))
}
