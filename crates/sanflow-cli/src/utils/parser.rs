use thiserror::Error;

/// Upper bound on the number of points a population range may expand to.
const MAX_SWEEP_POINTS: usize = 10_000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Invalid KEY=VALUE pair '{0}'. Expected e.g. 'mbr.cod-removal=0.9'.")]
    InvalidKeyValue(String),

    #[error("Invalid population '{0}'. Expected a positive number.")]
    InvalidPopulation(String),

    #[error("Invalid population range '{0}'. Expected 'START..=END:STEP' or 'START..END:STEP' (e.g. '1000..=10000:1000').")]
    InvalidRange(String),

    #[error("Population range '{0}' expands to more than {max} points.", max = MAX_SWEEP_POINTS)]
    RangeTooLarge(String),

    #[error("Population list is empty.")]
    Empty,
}

/// Splits `KEY=VALUE` at the first `=`, trimming the key.
pub fn parse_key_value(input: &str) -> Result<(&str, &str), ParseError> {
    match input.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => Ok((key.trim(), value)),
        _ => Err(ParseError::InvalidKeyValue(input.to_string())),
    }
}

fn parse_population(token: &str) -> Result<f64, ParseError> {
    token
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|p| p.is_finite() && *p > 0.0)
        .ok_or_else(|| ParseError::InvalidPopulation(token.trim().to_string()))
}

/// Parses a comma-separated population list or a stepped range.
///
/// `a..=b:s` includes `b` when it lies on the grid; `a..b:s` excludes it.
pub fn parse_populations(input: &str) -> Result<Vec<f64>, ParseError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(ParseError::Empty);
    }
    if !input.contains("..") {
        return input.split(',').map(parse_population).collect();
    }

    let invalid = || ParseError::InvalidRange(input.to_string());
    let (bounds, step) = input.split_once(':').ok_or_else(invalid)?;
    let (start, end, inclusive) = if let Some((a, b)) = bounds.split_once("..=") {
        (a, b, true)
    } else if let Some((a, b)) = bounds.split_once("..") {
        (a, b, false)
    } else {
        return Err(invalid());
    };
    let start = parse_population(start).map_err(|_| invalid())?;
    let end = parse_population(end).map_err(|_| invalid())?;
    let step = parse_population(step).map_err(|_| invalid())?;
    if end < start {
        return Err(invalid());
    }

    let eps = step * 1e-9;
    let mut points = Vec::new();
    for i in 0.. {
        let value = start + i as f64 * step;
        let in_range = if inclusive {
            value <= end + eps
        } else {
            value < end - eps
        };
        if !in_range {
            break;
        }
        if points.len() == MAX_SWEEP_POINTS {
            return Err(ParseError::RangeTooLarge(input.to_string()));
        }
        points.push(value);
    }
    if points.is_empty() {
        return Err(invalid());
    }
    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_value_splits_at_first_equals() {
        assert_eq!(parse_key_value("a.b=1=2"), Ok(("a.b", "1=2")));
        assert_eq!(parse_key_value(" population =10"), Ok(("population", "10")));
        assert!(matches!(parse_key_value("novalue"), Err(ParseError::InvalidKeyValue(_))));
        assert!(matches!(parse_key_value("=3"), Err(ParseError::InvalidKeyValue(_))));
    }

    #[test]
    fn population_lists_are_parsed_in_order() {
        assert_eq!(parse_populations("5000, 1000,250.5").unwrap(), vec![5000.0, 1000.0, 250.5]);
        assert_eq!(
            parse_populations("1000,-5"),
            Err(ParseError::InvalidPopulation("-5".to_string()))
        );
        assert!(parse_populations("1000,,2000").is_err());
        assert_eq!(parse_populations("  "), Err(ParseError::Empty));
    }

    #[test]
    fn inclusive_and_exclusive_ranges() {
        assert_eq!(
            parse_populations("1000..=3000:1000").unwrap(),
            vec![1000.0, 2000.0, 3000.0]
        );
        assert_eq!(parse_populations("1000..3000:1000").unwrap(), vec![1000.0, 2000.0]);
        assert_eq!(parse_populations("1..=2:0.5").unwrap(), vec![1.0, 1.5, 2.0]);
        assert_eq!(parse_populations("100..=250:100").unwrap(), vec![100.0, 200.0]);
    }

    #[test]
    fn malformed_ranges_are_rejected() {
        for bad in ["1000..=3000", "3000..=1000:10", "1000..=2000:0", "a..=b:1", "10..10:1"] {
            assert!(
                matches!(parse_populations(bad), Err(ParseError::InvalidRange(_))),
                "{bad}"
            );
        }
        assert!(matches!(
            parse_populations("1..=1000000:1"),
            Err(ParseError::RangeTooLarge(_))
        ));
    }
}
