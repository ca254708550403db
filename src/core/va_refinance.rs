use serde::{Deserialize, Serialize};

use super::amortization::{MONTHS_PER_YEAR, monthly_payment, total_interest};
use super::programs::{VaLoanPurpose, VaUsage, va_funding_fee_percent};
use super::types::{CalculatorResult, ensure_finite};
use super::validation::{
    CASH_OUT_AMOUNT, CLOSING_COSTS, CURRENT_BALANCE, CURRENT_INTEREST_RATE, FUNDING_FEE_PERCENT,
    HOME_VALUE, LOAN_TERM_YEARS, NEW_INTEREST_RATE, REMAINING_TERM_YEARS, Validate,
    ValidationErrors, check_term,
};
use crate::error::CalculatorError;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VaRefinanceType {
    /// Interest Rate Reduction Refinance Loan: rate-and-term only.
    #[serde(alias = "IRRRL", alias = "streamline")]
    Irrrl,
    #[serde(alias = "cashOut", alias = "cash_out")]
    CashOut,
}

impl VaRefinanceType {
    pub fn purpose(self) -> VaLoanPurpose {
        match self {
            VaRefinanceType::Irrrl => VaLoanPurpose::Irrrl,
            VaRefinanceType::CashOut => VaLoanPurpose::CashOut,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VaRefinanceInputs {
    pub refinance_type: VaRefinanceType,
    pub home_value: f64,
    pub current_balance: f64,
    pub current_interest_rate: f64,
    pub remaining_term_years: u32,
    pub new_interest_rate: f64,
    pub new_loan_term_years: u32,
    pub cash_out_amount: f64,
    pub funding_fee_percent: f64,
    pub disability_exempt: bool,
    pub closing_costs: f64,
}

impl Default for VaRefinanceInputs {
    fn default() -> Self {
        Self {
            refinance_type: VaRefinanceType::Irrrl,
            home_value: 425_000.0,
            current_balance: 310_000.0,
            current_interest_rate: 7.25,
            remaining_term_years: 28,
            new_interest_rate: 6.0,
            new_loan_term_years: 30,
            cash_out_amount: 0.0,
            funding_fee_percent: 0.5,
            disability_exempt: false,
            closing_costs: 4_000.0,
        }
    }
}

impl Validate for VaRefinanceInputs {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check_range(HOME_VALUE, self.home_value);
        errors.check_range(CURRENT_BALANCE, self.current_balance);
        errors.check_range(CURRENT_INTEREST_RATE, self.current_interest_rate);
        check_term(&mut errors, REMAINING_TERM_YEARS, self.remaining_term_years);
        errors.check_range(NEW_INTEREST_RATE, self.new_interest_rate);
        check_term(&mut errors, LOAN_TERM_YEARS, self.new_loan_term_years);
        errors.check_range(CASH_OUT_AMOUNT, self.cash_out_amount);
        errors.check_range(FUNDING_FEE_PERCENT, self.funding_fee_percent);
        errors.check_range(CLOSING_COSTS, self.closing_costs);

        match self.refinance_type {
            VaRefinanceType::Irrrl => {
                if self.cash_out_amount > 0.0 {
                    errors.add(
                        CASH_OUT_AMOUNT.field,
                        "Cash out is not available with a VA streamline (IRRRL) refinance",
                    );
                }
            }
            VaRefinanceType::CashOut => errors.check_at_most(
                CASH_OUT_AMOUNT.field,
                self.current_balance + self.cash_out_amount,
                self.home_value,
                "Cash out cannot take the loan above 100% of the home value",
            ),
        }
        errors.into_result()
    }
}

/// Statutory funding fee for the refinance when the caller leaves it blank.
pub fn default_refinance_funding_fee_percent(refinance_type: VaRefinanceType, usage: VaUsage) -> f64 {
    va_funding_fee_percent(refinance_type.purpose(), usage, 0.0, false)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VaRefinanceBreakdown {
    pub base_loan: f64,
    pub funding_fee: f64,
    pub new_loan: f64,
    pub cash_out: f64,
    pub current_payment: f64,
    pub new_payment: f64,
    pub monthly_savings: f64,
    pub break_even_months: Option<f64>,
    pub loan_to_value: f64,
    pub current_remaining_interest: f64,
    pub new_total_interest: f64,
    pub lifetime_interest_savings: f64,
}

pub fn va_refinance_breakdown(
    inputs: &VaRefinanceInputs,
) -> Result<VaRefinanceBreakdown, CalculatorError> {
    inputs.validate()?;

    let cash_out = match inputs.refinance_type {
        VaRefinanceType::Irrrl => 0.0,
        VaRefinanceType::CashOut => inputs.cash_out_amount,
    };
    let base_loan = inputs.current_balance + cash_out;
    let funding_fee = if inputs.disability_exempt {
        0.0
    } else {
        base_loan * inputs.funding_fee_percent / 100.0
    };
    let new_loan = base_loan + funding_fee;

    let current_payment = monthly_payment(
        inputs.current_balance,
        inputs.current_interest_rate,
        inputs.remaining_term_years,
    );
    let new_payment = monthly_payment(new_loan, inputs.new_interest_rate, inputs.new_loan_term_years);
    let monthly_savings = current_payment - new_payment;
    let break_even_months = (monthly_savings > 0.0 && inputs.closing_costs > 0.0)
        .then(|| inputs.closing_costs / monthly_savings);

    let current_remaining_interest = total_interest(
        inputs.current_balance,
        inputs.current_interest_rate,
        inputs.remaining_term_years,
    );
    let new_total_interest =
        total_interest(new_loan, inputs.new_interest_rate, inputs.new_loan_term_years);

    Ok(VaRefinanceBreakdown {
        base_loan,
        funding_fee,
        new_loan,
        cash_out,
        current_payment,
        new_payment,
        monthly_savings,
        break_even_months,
        loan_to_value: new_loan / inputs.home_value * 100.0,
        current_remaining_interest,
        new_total_interest,
        lifetime_interest_savings: current_remaining_interest - new_total_interest,
    })
}

pub fn calculate_va_refinance(
    inputs: &VaRefinanceInputs,
) -> Result<Vec<CalculatorResult>, CalculatorError> {
    let b = va_refinance_breakdown(inputs)?;

    let fee_line = CalculatorResult::currency("VA Funding Fee", b.funding_fee).with_description(
        if inputs.disability_exempt {
            "Waived for veterans receiving VA disability compensation".to_string()
        } else {
            format!("{}% of the new base loan", inputs.funding_fee_percent)
        },
    );

    let mut results = vec![
        CalculatorResult::currency("New Loan Amount", b.new_loan),
        fee_line,
    ];
    if inputs.refinance_type == VaRefinanceType::CashOut {
        results.push(CalculatorResult::currency("Cash Out", b.cash_out));
    }

    let savings_line = CalculatorResult::currency("Monthly Savings", b.monthly_savings).highlighted();
    let savings_line = if b.monthly_savings < 0.0 {
        savings_line.with_description("The new payment is higher than the current payment")
    } else {
        savings_line
    };

    results.extend([
        CalculatorResult::currency("Current Monthly Payment", b.current_payment),
        CalculatorResult::currency("New Monthly Payment", b.new_payment).highlighted(),
        savings_line,
    ]);
    if let Some(months) = b.break_even_months {
        let years = months / MONTHS_PER_YEAR as f64;
        results.push(
            CalculatorResult::number("Break-Even (Months)", months)
                .with_description(format!("Closing costs recovered in about {years:.1} years")),
        );
    }
    results.extend([
        CalculatorResult::percentage("Loan-to-Value", b.loan_to_value),
        CalculatorResult::currency("Lifetime Interest Savings", b.lifetime_interest_savings)
            .with_description("Remaining interest on the current loan minus interest on the new loan"),
    ]);

    ensure_finite(&results)?;
    Ok(results)
}
