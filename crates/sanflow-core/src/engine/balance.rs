use super::error::EngineError;
use crate::core::streams::{Composite, Stream};
use serde::Serialize;

/// Relative tolerance used when none is configured.
pub const DEFAULT_BALANCE_TOLERANCE: f64 = 1e-9;

/// Inflow and outflow of one conserved composite across one unit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BalanceCheck {
    pub unit: String,
    pub quantity: Composite,
    pub inflow: f64,
    pub outflow: f64,
}

impl BalanceCheck {
    /// `|in - out| / max(|in|, |out|)`, or zero when both sides are zero.
    pub fn relative_error(&self) -> f64 {
        let scale = self.inflow.abs().max(self.outflow.abs());
        if scale == 0.0 {
            return 0.0;
        }
        (self.inflow - self.outflow).abs() / scale
    }

    pub fn is_within(&self, tolerance: f64) -> bool {
        self.relative_error() <= tolerance
    }
}

/// Computes a check for every quantity in `conserved` and fails on the first
/// one outside `tolerance`.
pub fn verify(
    unit: &str,
    conserved: &[Composite],
    ins: &[&Stream],
    outs: &[Stream],
    tolerance: f64,
) -> Result<Vec<BalanceCheck>, EngineError> {
    conserved
        .iter()
        .map(|&quantity| {
            let check = BalanceCheck {
                unit: unit.to_string(),
                quantity,
                inflow: ins.iter().map(|s| s.composite(quantity)).sum(),
                outflow: outs.iter().map(|s| s.composite(quantity)).sum(),
            };
            if check.is_within(tolerance) {
                Ok(check)
            } else {
                Err(EngineError::MassBalance {
                    unit: check.unit,
                    quantity,
                    inflow: check.inflow,
                    outflow: check.outflow,
                })
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::components::household;
    use crate::core::streams::make_greywater;
    use std::sync::Arc;

    fn check(inflow: f64, outflow: f64) -> BalanceCheck {
        BalanceCheck {
            unit: "U".to_string(),
            quantity: Composite::Cod,
            inflow,
            outflow,
        }
    }

    #[test]
    fn relative_error_is_scaled_by_the_larger_side() {
        assert_eq!(check(0.0, 0.0).relative_error(), 0.0);
        assert!((check(100.0, 99.0).relative_error() - 0.01).abs() < 1e-15);
        assert!((check(99.0, 100.0).relative_error() - 0.01).abs() < 1e-15);
        assert!(check(100.0, 100.0 + 1e-8).is_within(1e-9));
        assert!(!check(100.0, 100.1).is_within(1e-9));
    }

    #[test]
    fn verify_reports_the_violating_quantity() {
        let components = Arc::new(household().unwrap());
        let gw = make_greywater(100.0, components.clone()).unwrap();
        let mut leaky = gw.clone();
        leaky.set_imass("S_F", 0.0).unwrap();

        let ok = verify("U", &[Composite::Cod], &[&gw], &[gw.clone()], 1e-9).unwrap();
        assert_eq!(ok.len(), 1);

        let err = verify(
            "U",
            &[Composite::Nitrogen, Composite::Cod],
            &[&gw],
            &[leaky],
            1e-9,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            EngineError::MassBalance { quantity: Composite::Cod, .. }
        ));
    }
}
