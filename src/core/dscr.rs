use serde::Serialize;

use super::amortization::{monthly_payment, payment_factor};
use super::types::{CalculatorResult, ensure_finite};
use super::va_purchase::ensure_down_payment_within_price;
use super::validation::{
    INTEREST_RATE, LOAN_TERM_YEARS, MONTHLY_EXPENSES, MONTHLY_RENT, PROPERTY_PRICE, VACANCY_RATE,
    Validate, ValidationErrors, check_down_payment_field, check_term,
};
use crate::error::CalculatorError;

pub const STRONG_DSCR: f64 = 1.25;
pub const MIN_QUALIFYING_DSCR: f64 = 1.0;
pub const MARGINAL_DSCR: f64 = 0.75;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DscrQualification {
    Strong,
    Qualifies,
    Marginal,
    DoesNotQualify,
}

impl DscrQualification {
    pub fn from_ratio(dscr: f64) -> Self {
        if dscr >= STRONG_DSCR {
            DscrQualification::Strong
        } else if dscr >= MIN_QUALIFYING_DSCR {
            DscrQualification::Qualifies
        } else if dscr >= MARGINAL_DSCR {
            DscrQualification::Marginal
        } else {
            DscrQualification::DoesNotQualify
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            DscrQualification::Strong => {
                "Strong: rent comfortably covers the payment; best pricing available"
            }
            DscrQualification::Qualifies => "Qualifies: rent covers the full mortgage payment",
            DscrQualification::Marginal => {
                "Marginal: may qualify with a larger down payment or higher rate"
            }
            DscrQualification::DoesNotQualify => {
                "Does not qualify: rent does not cover enough of the payment"
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DscrInputs {
    pub property_price: f64,
    pub down_payment: f64,
    pub interest_rate: f64,
    pub loan_term_years: u32,
    pub monthly_rent: f64,
    /// Taxes, insurance, HOA, management and maintenance.
    pub monthly_expenses: f64,
    pub vacancy_rate: f64,
}

impl Default for DscrInputs {
    fn default() -> Self {
        Self {
            property_price: 500_000.0,
            down_payment: 125_000.0,
            interest_rate: 7.5,
            loan_term_years: 30,
            monthly_rent: 4_000.0,
            monthly_expenses: 800.0,
            vacancy_rate: 0.0,
        }
    }
}

impl Validate for DscrInputs {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check_range(PROPERTY_PRICE, self.property_price);
        check_down_payment_field(&mut errors, self.down_payment, self.property_price);
        errors.check_range(INTEREST_RATE, self.interest_rate);
        check_term(&mut errors, LOAN_TERM_YEARS, self.loan_term_years);
        errors.check_range(MONTHLY_RENT, self.monthly_rent);
        errors.check_range(MONTHLY_EXPENSES, self.monthly_expenses);
        errors.check_range(VACANCY_RATE, self.vacancy_rate);
        errors.into_result()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DscrBreakdown {
    pub loan_amount: f64,
    pub debt_service: f64,
    pub effective_rent: f64,
    pub net_operating_income: f64,
    /// `None` for an all-cash purchase: there is no debt to cover.
    pub dscr: Option<f64>,
    pub qualification: Option<DscrQualification>,
    pub monthly_cash_flow: f64,
    pub annual_cash_flow: f64,
    pub cash_on_cash_return: Option<f64>,
    pub cap_rate: f64,
    pub down_payment_percent: f64,
    pub max_loan_at_strong_dscr: Option<f64>,
}

pub fn dscr_breakdown(inputs: &DscrInputs) -> Result<DscrBreakdown, CalculatorError> {
    ensure_down_payment_within_price(inputs.down_payment, inputs.property_price)?;
    inputs.validate()?;

    let loan_amount = inputs.property_price - inputs.down_payment;
    let debt_service = monthly_payment(loan_amount, inputs.interest_rate, inputs.loan_term_years);
    let effective_rent = inputs.monthly_rent * (1.0 - inputs.vacancy_rate / 100.0);
    let net_operating_income = effective_rent - inputs.monthly_expenses;

    let dscr = (debt_service > 0.0).then(|| net_operating_income / debt_service);
    let monthly_cash_flow = net_operating_income - debt_service;
    let annual_cash_flow = monthly_cash_flow * 12.0;

    let max_loan_at_strong_dscr = (net_operating_income > 0.0).then(|| {
        net_operating_income / STRONG_DSCR
            / payment_factor(inputs.interest_rate, inputs.loan_term_years)
    });

    Ok(DscrBreakdown {
        loan_amount,
        debt_service,
        effective_rent,
        net_operating_income,
        dscr,
        qualification: dscr.map(DscrQualification::from_ratio),
        monthly_cash_flow,
        annual_cash_flow,
        cash_on_cash_return: (inputs.down_payment > 0.0)
            .then(|| annual_cash_flow / inputs.down_payment * 100.0),
        cap_rate: net_operating_income * 12.0 / inputs.property_price * 100.0,
        down_payment_percent: inputs.down_payment / inputs.property_price * 100.0,
        max_loan_at_strong_dscr,
    })
}

pub fn calculate_dscr(inputs: &DscrInputs) -> Result<Vec<CalculatorResult>, CalculatorError> {
    let b = dscr_breakdown(inputs)?;

    let noi_line = CalculatorResult::currency("Net Operating Income", b.net_operating_income);
    let noi_line = if b.dscr.is_some() {
        noi_line.with_description("Monthly rent after vacancy, less operating expenses")
    } else {
        noi_line.with_description("All-cash purchase: there is no mortgage payment, so DSCR does not apply")
    };

    let mut results = vec![
        CalculatorResult::currency("Loan Amount", b.loan_amount),
        CalculatorResult::currency("Monthly Debt Service", b.debt_service)
            .with_description("Principal and interest"),
        CalculatorResult::currency("Effective Monthly Rent", b.effective_rent),
        noi_line,
    ];

    if let (Some(dscr), Some(qualification)) = (b.dscr, b.qualification) {
        results.push(
            CalculatorResult::number("DSCR", dscr)
                .highlighted()
                .with_description(qualification.description()),
        );
    }

    results.extend([
        CalculatorResult::currency("Monthly Cash Flow", b.monthly_cash_flow).highlighted(),
        CalculatorResult::currency("Annual Cash Flow", b.annual_cash_flow),
    ]);
    if let Some(coc) = b.cash_on_cash_return {
        results.push(
            CalculatorResult::percentage("Cash-on-Cash Return", coc)
                .with_description("Annual cash flow divided by the down payment"),
        );
    }
    results.extend([
        CalculatorResult::percentage("Cap Rate", b.cap_rate),
        CalculatorResult::percentage("Down Payment Percent", b.down_payment_percent),
    ]);
    if let Some(max_loan) = b.max_loan_at_strong_dscr {
        results.push(
            CalculatorResult::currency("Maximum Loan at 1.25 DSCR", max_loan)
                .with_description("Largest loan this rent supports at a 1.25 coverage ratio"),
        );
    }

    ensure_finite(&results)?;
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::find_result;
    use proptest::prelude::{prop_assert, proptest};

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn dscr_is_noi_over_debt_service() {
        let inputs = DscrInputs::default();
        let b = dscr_breakdown(&inputs).expect("valid");
        assert_approx(b.loan_amount, 375_000.0);
        assert_approx(b.debt_service, monthly_payment(375_000.0, 7.5, 30));
        assert_approx(b.net_operating_income, 3_200.0);
        let dscr = b.dscr.expect("financed purchase");
        assert_approx(dscr, 3_200.0 / b.debt_service);
        assert_eq!(b.qualification, Some(DscrQualification::Qualifies));
    }

    #[test]
    fn qualification_thresholds() {
        assert_eq!(DscrQualification::from_ratio(1.25), DscrQualification::Strong);
        assert_eq!(DscrQualification::from_ratio(1.2499), DscrQualification::Qualifies);
        assert_eq!(DscrQualification::from_ratio(1.0), DscrQualification::Qualifies);
        assert_eq!(DscrQualification::from_ratio(0.75), DscrQualification::Marginal);
        assert_eq!(DscrQualification::from_ratio(0.7499), DscrQualification::DoesNotQualify);
        assert_eq!(DscrQualification::from_ratio(-2.0), DscrQualification::DoesNotQualify);
    }

    #[test]
    fn vacancy_reduces_effective_rent() {
        let inputs = DscrInputs {
            vacancy_rate: 5.0,
            ..DscrInputs::default()
        };
        let b = dscr_breakdown(&inputs).expect("valid");
        assert_approx(b.effective_rent, 3_800.0);
        assert_approx(b.net_operating_income, 3_000.0);
    }

    #[test]
    fn all_cash_purchase_has_no_ratio() {
        let inputs = DscrInputs {
            down_payment: 500_000.0,
            ..DscrInputs::default()
        };
        let results = calculate_dscr(&inputs).expect("valid");
        assert!(find_result(&results, "DSCR").is_none());
        let noi = find_result(&results, "Net Operating Income").expect("noi line");
        assert!(noi.description.as_deref().is_some_and(|d| d.contains("All-cash")));
        assert!(results.iter().all(|r| r.value.is_finite()));
        assert_approx(
            find_result(&results, "Monthly Cash Flow").map(|r| r.value).unwrap_or_default(),
            3_200.0,
        );
    }

    #[test]
    fn max_loan_at_strong_ratio_hits_exactly_one_point_two_five() {
        let inputs = DscrInputs::default();
        let b = dscr_breakdown(&inputs).expect("valid");
        let max_loan = b.max_loan_at_strong_dscr.expect("positive noi");
        let payment = monthly_payment(max_loan, inputs.interest_rate, inputs.loan_term_years);
        assert_approx(b.net_operating_income / payment, STRONG_DSCR);
    }

    #[test]
    fn negative_noi_omits_max_loan() {
        let inputs = DscrInputs {
            monthly_rent: 500.0,
            monthly_expenses: 900.0,
            ..DscrInputs::default()
        };
        let results = calculate_dscr(&inputs).expect("valid");
        assert!(find_result(&results, "Maximum Loan at 1.25 DSCR").is_none());
        let dscr = find_result(&results, "DSCR").expect("ratio line");
        assert!(dscr.value < 0.0);
        assert!(dscr.description.as_deref().is_some_and(|d| d.starts_with("Does not qualify")));
    }

    #[test]
    fn down_payment_above_price_is_rejected() {
        let inputs = DscrInputs {
            down_payment: 600_000.0,
            ..DscrInputs::default()
        };
        assert!(matches!(
            calculate_dscr(&inputs),
            Err(CalculatorError::DownPaymentExceedsPrice { .. })
        ));
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(64))]

        #[test]
        fn prop_dscr_relationship_holds(
            price in 50_000u32..5_000_000,
            down_pct in 0u32..100,
            rate_bp in 0u32..=2_000,
            term in 1u32..=40,
            rent in 0u32..50_000,
            expenses in 0u32..20_000,
            vacancy in 0u32..=100,
        ) {
            let price = price as f64;
            let inputs = DscrInputs {
                property_price: price,
                down_payment: price * down_pct as f64 / 100.0,
                interest_rate: rate_bp as f64 / 100.0,
                loan_term_years: term,
                monthly_rent: rent as f64,
                monthly_expenses: expenses as f64,
                vacancy_rate: vacancy as f64,
            };
            let results = calculate_dscr(&inputs).expect("valid inputs");
            prop_assert!(results.iter().all(|r| r.value.is_finite()));

            let b = dscr_breakdown(&inputs).expect("valid inputs");
            prop_assert!(b.debt_service > 0.0);
            let dscr = b.dscr.expect("financed purchase");
            prop_assert!((dscr * b.debt_service - b.net_operating_income).abs() < 1e-6);
            prop_assert!((b.monthly_cash_flow - (b.net_operating_income - b.debt_service)).abs() < 1e-9);
        }
    }
}
