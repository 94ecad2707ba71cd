use crate::core::components::Phase;
use crate::core::streams::{Composite, Stream};
use serde::Serialize;
use std::fmt;
use std::io::Write;
use std::path::Path;
use thiserror::Error;

/// Flows at or below this magnitude (g/hr) are treated as zero in summaries.
pub const NONZERO_THRESHOLD: f64 = 1e-12;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("CSV error for '{path}': {source}")]
    File { path: String, source: csv::Error },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Snapshot of a stream for printing.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamSummary {
    pub label: String,
    pub id: String,
    pub phase: Phase,
    pub total_mass_kg_h: f64,
    /// Liquid concentrations in mg/L; empty for gas streams.
    pub concentrations: Vec<(Composite, f64)>,
    /// Components with a mass flow above [`NONZERO_THRESHOLD`], in g/hr.
    pub components: Vec<(String, f64)>,
}

impl StreamSummary {
    pub fn new(label: &str, stream: &Stream) -> Self {
        let concentrations = Composite::CONCENTRATION_METRICS
            .iter()
            .filter_map(|q| stream.concentration(*q).map(|c| (*q, c)))
            .collect();
        let components = stream
            .flows()
            .filter(|(_, m)| m.abs() > NONZERO_THRESHOLD)
            .map(|(id, m)| (id.to_string(), m))
            .collect();
        Self {
            label: label.to_string(),
            id: stream.id().to_string(),
            phase: stream.phase(),
            total_mass_kg_h: stream.f_mass() / 1000.0,
            concentrations,
            components,
        }
    }

    pub fn concentration(&self, quantity: Composite) -> Option<f64> {
        self.concentrations
            .iter()
            .find(|(q, _)| *q == quantity)
            .map(|(_, c)| *c)
    }
}

impl fmt::Display for StreamSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- {} ---", self.label)?;
        writeln!(f, "ID: {}", self.id)?;
        writeln!(f, "Total mass flow: {} kg/hr", format_sig(self.total_mass_kg_h, 6))?;
        writeln!(f, "Phase: {}", self.phase)?;
        for (q, c) in &self.concentrations {
            writeln!(f, "{}: {} mg/L", q, format_sig(*c, 6))?;
        }
        writeln!(f, "Component mass rates (g/hr):")?;
        if self.components.is_empty() {
            write!(f, "  (all components ~0)")?;
        } else {
            let lines: Vec<String> = self
                .components
                .iter()
                .map(|(id, m)| format!("  {}: {}", id, format_sig(*m, 6)))
                .collect();
            write!(f, "{}", lines.join("\n"))?;
        }
        Ok(())
    }
}

/// Formats `value` with `digits` significant digits, dropping trailing zeros.
///
/// Very small or very large magnitudes switch to scientific notation.
pub fn format_sig(value: f64, digits: usize) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value == 0.0 || value.is_infinite() {
        return format!("{value}");
    }
    let digits = digits.max(1);
    // The exponent is taken after rounding, so 999999.95 becomes 1e+06.
    let sci = format!("{:.*e}", digits - 1, value);
    let Some((mantissa, exp)) = sci.split_once('e') else {
        return sci;
    };
    let exponent: i32 = match exp.parse() {
        Ok(e) => e,
        Err(_) => return sci,
    };
    if exponent < -4 || exponent >= digits as i32 {
        let sign = if exponent < 0 { '-' } else { '+' };
        return format!("{}e{}{:02}", trim_zeros(mantissa), sign, exponent.abs());
    }
    let decimals = (digits as i32 - 1 - exponent).max(0) as usize;
    trim_zeros(&format!("{:.*}", decimals, value)).to_string()
}

fn trim_zeros(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

/// Percent removal of a concentration metric between two streams.
///
/// `None` when the influent value is zero or either concentration is undefined.
pub fn percent_removal(influent: &Stream, effluent: &Stream, metric: Composite) -> Option<f64> {
    let vin = influent.concentration(metric)?;
    let vout = effluent.concentration(metric)?;
    if vin == 0.0 {
        return None;
    }
    Some(100.0 * (vin - vout) / vin)
}

#[derive(Serialize)]
struct StreamRow<'a> {
    stream: &'a str,
    phase: String,
    component: &'a str,
    mass_g_per_hr: f64,
}

/// Writes a long-format table with one row per stream and component.
pub fn write_stream_table<W: Write>(streams: &[&Stream], writer: W) -> Result<(), ReportError> {
    let mut wtr = csv::Writer::from_writer(writer);
    for stream in streams {
        let phase = stream.phase().to_string();
        for (component, mass) in stream.flows() {
            wtr.serialize(StreamRow {
                stream: stream.id(),
                phase: phase.clone(),
                component,
                mass_g_per_hr: mass,
            })?;
        }
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_stream_table_to_path(streams: &[&Stream], path: &Path) -> Result<(), ReportError> {
    let file = std::fs::File::create(path)?;
    write_stream_table(streams, file).map_err(|e| match e {
        ReportError::Csv(source) => ReportError::File {
            path: path.to_string_lossy().to_string(),
            source,
        },
        other => other,
    })
}

/// Writes any serializable records (e.g. sweep points) as CSV with a header row.
pub fn write_records<T: Serialize, W: Write>(records: &[T], writer: W) -> Result<(), ReportError> {
    let mut wtr = csv::Writer::from_writer(writer);
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_records_to_path<T: Serialize>(records: &[T], path: &Path) -> Result<(), ReportError> {
    let file = std::fs::File::create(path)?;
    write_records(records, file).map_err(|e| match e {
        ReportError::Csv(source) => ReportError::File {
            path: path.to_string_lossy().to_string(),
            source,
        },
        other => other,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::components::{ComponentSet, household};
    use crate::core::streams::make_greywater;
    use std::sync::Arc;
    use tempfile::tempdir;

    fn components() -> Arc<ComponentSet> {
        Arc::new(household().unwrap())
    }

    #[test]
    fn format_sig_matches_general_format() {
        assert_eq!(format_sig(19583.333333, 6), "19583.3");
        assert_eq!(format_sig(0.5, 6), "0.5");
        assert_eq!(format_sig(1234567.0, 6), "1.23457e+06");
        assert_eq!(format_sig(0.00001234, 6), "1.234e-05");
        assert_eq!(format_sig(1.5e123, 6), "1.5e+123");
        assert_eq!(format_sig(0.0, 6), "0");
        assert_eq!(format_sig(-2.5, 6), "-2.5");
        assert_eq!(format_sig(f64::NAN, 6), "nan");
    }

    #[test]
    fn format_sig_rounds_before_choosing_notation() {
        assert_eq!(format_sig(999999.95, 6), "1e+06");
        assert_eq!(format_sig(999999.4, 6), "999999");
        assert_eq!(format_sig(0.000099999999, 6), "0.0001");
        assert_eq!(format_sig(-123456.7, 6), "-123457");
    }

    #[test]
    fn summary_lists_nonzero_components_and_concentrations() {
        let gw = make_greywater(10_000.0, components()).unwrap();
        let summary = StreamSummary::new("Influent Greywater", &gw);
        assert_eq!(summary.id, "Greywater");
        assert!(summary.components.iter().any(|(id, _)| id == "S_F"));
        assert!(summary.components.iter().all(|(id, _)| id != "Iome"));
        assert!(summary.concentration(Composite::Cod).is_some());

        let text = summary.to_string();
        assert!(text.starts_with("--- Influent Greywater ---\nID: Greywater\n"));
        assert!(text.contains("COD: "));
        assert!(text.contains("Phase: l"));
    }

    #[test]
    fn empty_gas_stream_prints_placeholder() {
        let mut biogas = Stream::new("biogas", components());
        biogas.set_phase(Phase::Gas);
        let summary = StreamSummary::new("AD Biogas", &biogas);
        assert!(summary.concentrations.is_empty());
        let text = summary.to_string();
        assert!(text.ends_with("(all components ~0)"));
        assert!(!text.contains("mg/L"));
    }

    #[test]
    fn percent_removal_is_none_for_zero_influent() {
        let components = components();
        let gw = make_greywater(100.0, components.clone()).unwrap();
        let mut treated = gw.clone();
        treated.set_imass("S_F", 0.0).unwrap();
        treated.set_imass("X_B_Subst", 0.0).unwrap();

        let r = percent_removal(&gw, &treated, Composite::Cod).unwrap();
        assert!((r - 100.0).abs() < 1e-9);
        assert_eq!(percent_removal(&treated, &gw, Composite::Cod), None);
        assert_eq!(percent_removal(&gw, &gw, Composite::Cod), Some(0.0));
    }

    #[test]
    fn stream_table_has_one_row_per_component() {
        let components = components();
        let gw = make_greywater(10.0, components.clone()).unwrap();
        let mut buf = Vec::new();
        write_stream_table(&[&gw], &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("stream,phase,component,mass_g_per_hr"));
        assert_eq!(lines.count(), components.len());
        assert!(text.contains("Greywater,l,S_F,"));
    }

    #[test]
    fn records_are_written_to_a_file() {
        #[derive(Serialize)]
        struct Row {
            population: f64,
            cod_removal_pct: Option<f64>,
        }
        let dir = tempdir().unwrap();
        let path = dir.path().join("sweep.csv");
        let rows = [
            Row { population: 10.0, cod_removal_pct: Some(85.0) },
            Row { population: 20.0, cod_removal_pct: None },
        ];
        write_records_to_path(&rows, &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "population,cod_removal_pct\n10.0,85.0\n20.0,\n");
    }
}
