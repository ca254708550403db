mod affordability;
mod amortization;
mod dscr;
mod programs;
mod types;
mod va_purchase;
mod va_refinance;
pub mod validation;

use serde::{Deserialize, Serialize};

pub use affordability::{
    AffordabilityBreakdown, AffordabilityInputs, affordability_breakdown, calculate_affordability,
};
pub use amortization::{
    AmortizationYear, MAX_TERM_YEARS, MONTHS_PER_YEAR, amortization_schedule, monthly_payment,
    payment_factor, remaining_balance, term_months, total_interest,
};
pub use dscr::{
    DscrBreakdown, DscrInputs, DscrQualification, MARGINAL_DSCR, MIN_QUALIFYING_DSCR, STRONG_DSCR,
    calculate_dscr, dscr_breakdown,
};
pub use programs::{
    DtiLimits, FHA_HIGH_BALANCE_LIMIT, LoanProgram, ProgramOverlay, VaLoanPurpose, VaUsage,
    conventional_pmi_percent, fha_annual_mip_percent, va_funding_fee_percent,
};
pub use types::{CalculatorResult, ResultFormat, ensure_finite, find_result};
pub use va_purchase::{
    VaPurchaseBreakdown, VaPurchaseInputs, calculate_va_purchase, default_funding_fee_percent,
    va_purchase_breakdown,
};
pub use va_refinance::{
    VaRefinanceBreakdown, VaRefinanceInputs, VaRefinanceType, calculate_va_refinance,
    default_refinance_funding_fee_percent, va_refinance_breakdown,
};
pub use validation::{FieldRange, Validate, ValidationErrors};

use crate::error::CalculatorError;

/// The calculators the site exposes.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Calculator {
    Affordability,
    #[serde(alias = "vaPurchase", alias = "va_purchase")]
    VaPurchase,
    #[serde(alias = "vaRefinance", alias = "va_refinance")]
    VaRefinance,
    #[serde(alias = "DSCR")]
    Dscr,
}

impl Calculator {
    pub const ALL: [Calculator; 4] = [
        Calculator::Affordability,
        Calculator::VaPurchase,
        Calculator::VaRefinance,
        Calculator::Dscr,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            Calculator::Affordability => "affordability",
            Calculator::VaPurchase => "va-purchase",
            Calculator::VaRefinance => "va-refinance",
            Calculator::Dscr => "dscr",
        }
    }

    /// Accepts the canonical slug plus the camelCase and snake_case spellings.
    pub fn from_slug(slug: &str) -> Option<Self> {
        let normalized = slug.trim().to_ascii_lowercase().replace('_', "-");
        match normalized.as_str() {
            "affordability" => Some(Calculator::Affordability),
            "va-purchase" | "vapurchase" => Some(Calculator::VaPurchase),
            "va-refinance" | "varefinance" | "va-refi" => Some(Calculator::VaRefinance),
            "dscr" => Some(Calculator::Dscr),
            _ => None,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Calculator::Affordability => "Home Affordability Calculator",
            Calculator::VaPurchase => "VA Purchase Calculator",
            Calculator::VaRefinance => "VA Refinance Calculator",
            Calculator::Dscr => "DSCR Investment Calculator",
        }
    }

    pub fn summary(self) -> &'static str {
        match self {
            Calculator::Affordability => {
                "Estimate the most home your income supports under each loan program's debt-to-income limits."
            }
            Calculator::VaPurchase => {
                "See your monthly payment on a VA home loan, including the financed funding fee."
            }
            Calculator::VaRefinance => {
                "Compare your current payment with a VA streamline (IRRRL) or cash-out refinance."
            }
            Calculator::Dscr => {
                "Check whether a rental property's income covers its mortgage payment for a DSCR loan."
            }
        }
    }

    pub fn default_inputs(self) -> CalculatorInputs {
        match self {
            Calculator::Affordability => {
                CalculatorInputs::Affordability(AffordabilityInputs::default())
            }
            Calculator::VaPurchase => CalculatorInputs::VaPurchase(VaPurchaseInputs::default()),
            Calculator::VaRefinance => CalculatorInputs::VaRefinance(VaRefinanceInputs::default()),
            Calculator::Dscr => CalculatorInputs::Dscr(DscrInputs::default()),
        }
    }
}

/// Inputs for one calculator call, tagged by calculator.
#[derive(Debug, Clone, PartialEq)]
pub enum CalculatorInputs {
    Affordability(AffordabilityInputs),
    VaPurchase(VaPurchaseInputs),
    VaRefinance(VaRefinanceInputs),
    Dscr(DscrInputs),
}

impl CalculatorInputs {
    pub fn calculator(&self) -> Calculator {
        match self {
            CalculatorInputs::Affordability(_) => Calculator::Affordability,
            CalculatorInputs::VaPurchase(_) => Calculator::VaPurchase,
            CalculatorInputs::VaRefinance(_) => Calculator::VaRefinance,
            CalculatorInputs::Dscr(_) => Calculator::Dscr,
        }
    }

    pub fn calculate(&self) -> Result<Vec<CalculatorResult>, CalculatorError> {
        match self {
            CalculatorInputs::Affordability(inputs) => calculate_affordability(inputs),
            CalculatorInputs::VaPurchase(inputs) => calculate_va_purchase(inputs),
            CalculatorInputs::VaRefinance(inputs) => calculate_va_refinance(inputs),
            CalculatorInputs::Dscr(inputs) => calculate_dscr(inputs),
        }
    }

    /// Yearly amortization of the loan the calculation finances; empty when
    /// nothing is borrowed.
    pub fn schedule(&self) -> Result<Vec<AmortizationYear>, CalculatorError> {
        let (principal, rate, term) = match self {
            CalculatorInputs::Affordability(inputs) => (
                affordability_breakdown(inputs)?.total_loan,
                inputs.interest_rate,
                inputs.loan_term_years,
            ),
            CalculatorInputs::VaPurchase(inputs) => (
                va_purchase_breakdown(inputs)?.total_loan,
                inputs.interest_rate,
                inputs.loan_term_years,
            ),
            CalculatorInputs::VaRefinance(inputs) => (
                va_refinance_breakdown(inputs)?.new_loan,
                inputs.new_interest_rate,
                inputs.new_loan_term_years,
            ),
            CalculatorInputs::Dscr(inputs) => (
                dscr_breakdown(inputs)?.loan_amount,
                inputs.interest_rate,
                inputs.loan_term_years,
            ),
        };
        Ok(amortization_schedule(principal, rate, term))
    }
}

impl Validate for CalculatorInputs {
    fn validate(&self) -> Result<(), ValidationErrors> {
        match self {
            CalculatorInputs::Affordability(inputs) => inputs.validate(),
            CalculatorInputs::VaPurchase(inputs) => inputs.validate(),
            CalculatorInputs::VaRefinance(inputs) => inputs.validate(),
            CalculatorInputs::Dscr(inputs) => inputs.validate(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugs_round_trip() {
        for calculator in Calculator::ALL {
            assert_eq!(Calculator::from_slug(calculator.slug()), Some(calculator));
        }
        assert_eq!(Calculator::from_slug("va_refinance"), Some(Calculator::VaRefinance));
        assert_eq!(Calculator::from_slug("VaPurchase"), Some(Calculator::VaPurchase));
        assert_eq!(Calculator::from_slug("fha"), None);
    }

    #[test]
    fn every_default_form_validates_and_calculates() {
        for calculator in Calculator::ALL {
            let inputs = calculator.default_inputs();
            assert_eq!(inputs.calculator(), calculator);
            assert!(inputs.validate().is_ok(), "{} defaults invalid", calculator.slug());
            let results = inputs.calculate().expect("defaults calculate");
            assert!(!results.is_empty());
            assert!(results.iter().any(|r| r.highlight));
        }
    }

    #[test]
    fn schedule_follows_the_financed_loan() {
        let inputs = Calculator::VaPurchase.default_inputs();
        let rows = inputs.schedule().expect("defaults");
        assert_eq!(rows.len(), 30);
        let repaid: f64 = rows.iter().map(|r| r.principal_paid).sum();
        assert!((repaid - 408_600.0).abs() < 1e-4, "repaid {repaid}");

        let all_cash = CalculatorInputs::Dscr(DscrInputs {
            down_payment: 500_000.0,
            ..DscrInputs::default()
        });
        assert!(all_cash.schedule().expect("valid").is_empty());

        let invalid = CalculatorInputs::Dscr(DscrInputs {
            loan_term_years: 0,
            ..DscrInputs::default()
        });
        assert!(matches!(invalid.schedule(), Err(CalculatorError::Validation(_))));
    }

    #[test]
    fn calculator_serializes_as_slug() {
        assert_eq!(
            serde_json::to_string(&Calculator::VaPurchase).expect("serialize"),
            "\"va-purchase\""
        );
        let parsed: Calculator = serde_json::from_str("\"vaRefinance\"").expect("alias");
        assert_eq!(parsed, Calculator::VaRefinance);
    }
}
