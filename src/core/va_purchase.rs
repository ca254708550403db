use serde::Serialize;

use super::amortization::{monthly_payment, total_interest};
use super::programs::{VaLoanPurpose, VaUsage, va_funding_fee_percent};
use super::types::{CalculatorResult, ensure_finite};
use super::validation::{
    ANNUAL_INSURANCE, FUNDING_FEE_PERCENT, HOME_PRICE, INTEREST_RATE, LOAN_TERM_YEARS,
    MONTHLY_HOA, PROPERTY_TAX_RATE, Validate, ValidationErrors, check_down_payment_field,
    check_term,
};
use crate::error::CalculatorError;

#[derive(Debug, Clone, PartialEq)]
pub struct VaPurchaseInputs {
    pub home_price: f64,
    pub down_payment: f64,
    pub interest_rate: f64,
    pub loan_term_years: u32,
    pub funding_fee_percent: f64,
    pub disability_exempt: bool,
    pub property_tax_rate: f64,
    pub annual_insurance: f64,
    pub monthly_hoa: f64,
}

impl Default for VaPurchaseInputs {
    fn default() -> Self {
        Self {
            home_price: 400_000.0,
            down_payment: 0.0,
            interest_rate: 6.25,
            loan_term_years: 30,
            funding_fee_percent: 2.15,
            disability_exempt: false,
            property_tax_rate: 1.0,
            annual_insurance: 1_500.0,
            monthly_hoa: 0.0,
        }
    }
}

impl Validate for VaPurchaseInputs {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check_range(HOME_PRICE, self.home_price);
        check_down_payment_field(&mut errors, self.down_payment, self.home_price);
        errors.check_range(INTEREST_RATE, self.interest_rate);
        check_term(&mut errors, LOAN_TERM_YEARS, self.loan_term_years);
        errors.check_range(FUNDING_FEE_PERCENT, self.funding_fee_percent);
        errors.check_range(PROPERTY_TAX_RATE, self.property_tax_rate);
        errors.check_range(ANNUAL_INSURANCE, self.annual_insurance);
        errors.check_range(MONTHLY_HOA, self.monthly_hoa);
        errors.into_result()
    }
}

/// Funding fee percent for a purchase when the caller does not supply one.
pub fn default_funding_fee_percent(usage: VaUsage, home_price: f64, down_payment: f64) -> f64 {
    let down_percent = if home_price > 0.0 {
        down_payment / home_price * 100.0
    } else {
        0.0
    };
    va_funding_fee_percent(VaLoanPurpose::Purchase, usage, down_percent, false)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VaPurchaseBreakdown {
    pub base_loan: f64,
    pub funding_fee: f64,
    pub total_loan: f64,
    pub principal_and_interest: f64,
    pub property_tax: f64,
    pub insurance: f64,
    pub hoa: f64,
    pub total_monthly_payment: f64,
    pub down_payment_percent: f64,
    pub loan_to_value: f64,
    pub total_interest: f64,
}

/// Purchase calculators reject a down payment above the price before any
/// other validation runs.
pub(crate) fn ensure_down_payment_within_price(
    down_payment: f64,
    price: f64,
) -> Result<(), CalculatorError> {
    if down_payment > price {
        return Err(CalculatorError::DownPaymentExceedsPrice {
            down_payment,
            price,
        });
    }
    Ok(())
}

pub fn va_purchase_breakdown(
    inputs: &VaPurchaseInputs,
) -> Result<VaPurchaseBreakdown, CalculatorError> {
    ensure_down_payment_within_price(inputs.down_payment, inputs.home_price)?;
    inputs.validate()?;

    let base_loan = inputs.home_price - inputs.down_payment;
    let funding_fee = if inputs.disability_exempt {
        0.0
    } else {
        base_loan * inputs.funding_fee_percent / 100.0
    };
    let total_loan = base_loan + funding_fee;
    let principal_and_interest =
        monthly_payment(total_loan, inputs.interest_rate, inputs.loan_term_years);
    let property_tax = inputs.home_price * inputs.property_tax_rate / 100.0 / 12.0;
    let insurance = inputs.annual_insurance / 12.0;

    Ok(VaPurchaseBreakdown {
        base_loan,
        funding_fee,
        total_loan,
        principal_and_interest,
        property_tax,
        insurance,
        hoa: inputs.monthly_hoa,
        total_monthly_payment: principal_and_interest + property_tax + insurance + inputs.monthly_hoa,
        down_payment_percent: inputs.down_payment / inputs.home_price * 100.0,
        loan_to_value: base_loan / inputs.home_price * 100.0,
        total_interest: total_interest(total_loan, inputs.interest_rate, inputs.loan_term_years),
    })
}

pub fn calculate_va_purchase(
    inputs: &VaPurchaseInputs,
) -> Result<Vec<CalculatorResult>, CalculatorError> {
    let b = va_purchase_breakdown(inputs)?;

    let fee_description = if inputs.disability_exempt {
        "Waived for veterans receiving VA disability compensation".to_string()
    } else {
        format!(
            "{}% of the base loan, financed into the loan",
            inputs.funding_fee_percent
        )
    };

    let results = vec![
        CalculatorResult::currency("Base Loan Amount", b.base_loan),
        CalculatorResult::currency("VA Funding Fee", b.funding_fee).with_description(fee_description),
        CalculatorResult::currency("Total Loan Amount", b.total_loan),
        CalculatorResult::currency("Monthly Principal & Interest", b.principal_and_interest),
        CalculatorResult::currency("Monthly Property Tax", b.property_tax),
        CalculatorResult::currency("Monthly Home Insurance", b.insurance),
        CalculatorResult::currency("Monthly HOA", b.hoa),
        CalculatorResult::currency("Total Monthly Payment", b.total_monthly_payment)
            .highlighted()
            .with_description("No monthly mortgage insurance on VA loans"),
        CalculatorResult::percentage("Down Payment Percent", b.down_payment_percent),
        CalculatorResult::percentage("Loan-to-Value", b.loan_to_value),
        CalculatorResult::currency("Total Interest", b.total_interest)
            .with_description(format!("Over {} years", inputs.loan_term_years)),
    ];

    ensure_finite(&results)?;
    Ok(results)
}
