use serde::Serialize;

use super::amortization::{monthly_payment, payment_factor};
use super::programs::{LoanProgram, ProgramOverlay};
use super::types::{CalculatorResult, ensure_finite};
use super::validation::{
    ANNUAL_INCOME, ANNUAL_INSURANCE, BACK_END_RATIO, DOWN_PAYMENT, FRONT_END_RATIO, INTEREST_RATE,
    LOAN_TERM_YEARS, MONTHLY_DEBTS, MONTHLY_HOA, PROPERTY_TAX_RATE, Validate, ValidationErrors,
    check_term,
};
use crate::error::CalculatorError;

/// Overlays depend on the price being solved for; refinement stops once the
/// overlay is stable or after this many solves.
const MAX_OVERLAY_PASSES: usize = 8;
const BUDGET_EPS: f64 = 1e-6;

#[derive(Debug, Clone, PartialEq)]
pub struct AffordabilityInputs {
    pub annual_income: f64,
    pub monthly_debts: f64,
    pub down_payment: f64,
    pub interest_rate: f64,
    pub loan_term_years: u32,
    pub property_tax_rate: f64,
    pub annual_insurance: f64,
    pub monthly_hoa: f64,
    pub loan_program: LoanProgram,
    pub front_end_ratio: f64,
    pub back_end_ratio: f64,
    pub va_funding_fee_exempt: bool,
}

impl Default for AffordabilityInputs {
    fn default() -> Self {
        let limits = LoanProgram::Conventional.dti_limits();
        Self {
            annual_income: 120_000.0,
            monthly_debts: 500.0,
            down_payment: 60_000.0,
            interest_rate: 6.75,
            loan_term_years: 30,
            property_tax_rate: 1.1,
            annual_insurance: 1_800.0,
            monthly_hoa: 0.0,
            loan_program: LoanProgram::Conventional,
            front_end_ratio: limits.front_end,
            back_end_ratio: limits.back_end,
            va_funding_fee_exempt: false,
        }
    }
}

impl Validate for AffordabilityInputs {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check_range(ANNUAL_INCOME, self.annual_income);
        errors.check_range(MONTHLY_DEBTS, self.monthly_debts);
        errors.check_range(DOWN_PAYMENT, self.down_payment);
        errors.check_range(INTEREST_RATE, self.interest_rate);
        check_term(&mut errors, LOAN_TERM_YEARS, self.loan_term_years);
        errors.check_range(PROPERTY_TAX_RATE, self.property_tax_rate);
        errors.check_range(ANNUAL_INSURANCE, self.annual_insurance);
        errors.check_range(MONTHLY_HOA, self.monthly_hoa);
        errors.check_range(FRONT_END_RATIO, self.front_end_ratio);
        errors.check_range(BACK_END_RATIO, self.back_end_ratio);
        errors.into_result()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AffordabilityBreakdown {
    pub max_home_price: f64,
    pub base_loan: f64,
    pub upfront_fee: f64,
    pub total_loan: f64,
    pub down_payment: f64,
    pub down_payment_percent: f64,
    pub principal_and_interest: f64,
    pub property_tax: f64,
    pub insurance: f64,
    pub mortgage_insurance: f64,
    pub hoa: f64,
    pub total_monthly_payment: f64,
    pub max_housing_payment: f64,
    pub front_end_dti: f64,
    pub back_end_dti: f64,
    pub overlay: ProgramOverlay,
}

impl AffordabilityInputs {
    fn monthly_income(&self) -> f64 {
        self.annual_income / 12.0
    }

    /// Largest housing payment both DTI limits allow, taxes and insurance included.
    pub fn max_housing_payment(&self) -> f64 {
        let income = self.monthly_income();
        let front_cap = income * self.front_end_ratio / 100.0;
        let back_cap = income * self.back_end_ratio / 100.0 - self.monthly_debts;
        front_cap.min(back_cap).max(0.0)
    }

    fn price_dependent_budget(&self) -> f64 {
        self.max_housing_payment() - self.annual_insurance / 12.0 - self.monthly_hoa
    }

    fn monthly_tax_rate(&self) -> f64 {
        self.property_tax_rate / 100.0 / 12.0
    }

    /// Closed-form price for a fixed overlay: `p·t + (p − D)·k = budget`.
    fn solve_price(&self, budget: f64, overlay: ProgramOverlay) -> f64 {
        if budget <= 0.0 {
            return 0.0;
        }
        let t = self.monthly_tax_rate();
        let k = (1.0 + overlay.upfront_fee_percent / 100.0)
            * payment_factor(self.interest_rate, self.loan_term_years)
            + overlay.annual_insurance_percent / 100.0 / 12.0;
        let down = self.down_payment;

        if t > 0.0 && down * t >= budget {
            // the down payment alone buys more house than the taxes allow
            return budget / t;
        }
        (budget + down * k) / (t + k)
    }

    fn breakdown_at(&self, price: f64, overlay: ProgramOverlay) -> AffordabilityBreakdown {
        let down_payment = self.down_payment.min(price);
        let base_loan = (price - down_payment).max(0.0);
        let upfront_fee = overlay.upfront_fee(base_loan);
        let total_loan = base_loan + upfront_fee;
        let principal_and_interest =
            monthly_payment(total_loan, self.interest_rate, self.loan_term_years);
        let property_tax = price * self.monthly_tax_rate();
        let insurance = if price > 0.0 {
            self.annual_insurance / 12.0
        } else {
            0.0
        };
        let hoa = if price > 0.0 { self.monthly_hoa } else { 0.0 };
        let mortgage_insurance = overlay.monthly_insurance(base_loan);
        let total_monthly_payment =
            principal_and_interest + property_tax + insurance + mortgage_insurance + hoa;

        let income = self.monthly_income();
        AffordabilityBreakdown {
            max_home_price: price,
            base_loan,
            upfront_fee,
            total_loan,
            down_payment,
            down_payment_percent: if price > 0.0 {
                down_payment / price * 100.0
            } else {
                0.0
            },
            principal_and_interest,
            property_tax,
            insurance,
            mortgage_insurance,
            hoa,
            total_monthly_payment,
            max_housing_payment: self.max_housing_payment(),
            front_end_dti: total_monthly_payment / income * 100.0,
            back_end_dti: (total_monthly_payment + self.monthly_debts) / income * 100.0,
            overlay,
        }
    }
}

pub fn affordability_breakdown(
    inputs: &AffordabilityInputs,
) -> Result<AffordabilityBreakdown, CalculatorError> {
    inputs.validate()?;

    let budget = inputs.price_dependent_budget();
    if budget <= 0.0 {
        return Ok(inputs.breakdown_at(0.0, ProgramOverlay::NONE));
    }

    let housing_cap = inputs.max_housing_payment();
    let mut overlay = ProgramOverlay::worst_case(inputs.loan_program, inputs.va_funding_fee_exempt);
    let mut best: Option<AffordabilityBreakdown> = None;

    for _ in 0..MAX_OVERLAY_PASSES {
        let price = inputs.solve_price(budget, overlay);
        let actual = ProgramOverlay::for_purchase(
            inputs.loan_program,
            price,
            inputs.down_payment,
            inputs.loan_term_years,
            inputs.va_funding_fee_exempt,
        );
        let candidate = inputs.breakdown_at(price, actual);
        let fits = candidate.total_monthly_payment <= housing_cap + BUDGET_EPS;
        if fits && best.is_none_or(|b| candidate.max_home_price > b.max_home_price) {
            best = Some(candidate);
        }
        if actual == overlay {
            break;
        }
        overlay = actual;
    }

    // The first solve uses the worst-case overlay, so some candidate always fits.
    Ok(best.unwrap_or_else(|| inputs.breakdown_at(0.0, ProgramOverlay::NONE)))
}

pub fn calculate_affordability(
    inputs: &AffordabilityInputs,
) -> Result<Vec<CalculatorResult>, CalculatorError> {
    let b = affordability_breakdown(inputs)?;
    let program = inputs.loan_program;

    let mut price_line = CalculatorResult::currency("Maximum Home Price", b.max_home_price)
        .highlighted()
        .with_description(format!(
            "Based on a {:.0}/{:.0} debt-to-income limit for {} financing",
            inputs.front_end_ratio,
            inputs.back_end_ratio,
            program.name()
        ));
    if b.max_home_price <= 0.0 {
        price_line = price_line
            .with_description("Current debts and fixed costs leave no room for a housing payment");
    }

    let mut down_percent_line =
        CalculatorResult::percentage("Down Payment Percent", b.down_payment_percent);
    let minimum = program.minimum_down_payment_percent();
    if b.max_home_price > 0.0 && b.down_payment_percent + 1e-9 < minimum {
        down_percent_line = down_percent_line.with_description(format!(
            "Below the {minimum}% minimum down payment for {} loans",
            program.name()
        ));
    }

    let mut results = vec![
        price_line,
        CalculatorResult::currency("Loan Amount", b.total_loan),
        CalculatorResult::currency("Down Payment", b.down_payment),
        down_percent_line,
        CalculatorResult::currency("Monthly Principal & Interest", b.principal_and_interest),
        CalculatorResult::currency("Monthly Property Tax", b.property_tax),
        CalculatorResult::currency("Monthly Home Insurance", b.insurance),
        CalculatorResult::currency(program.insurance_label(), b.mortgage_insurance),
        CalculatorResult::currency("Monthly HOA", b.hoa),
        CalculatorResult::currency("Total Monthly Payment", b.total_monthly_payment)
            .highlighted()
            .with_description(format!(
                "Housing budget of {}",
                super::ResultFormat::Currency.render(b.max_housing_payment)
            )),
        CalculatorResult::percentage("Front-End DTI", b.front_end_dti),
        CalculatorResult::percentage("Back-End DTI", b.back_end_dti),
    ];
    if b.upfront_fee > 0.0 {
        results.push(
            CalculatorResult::currency(program.upfront_fee_label(), b.upfront_fee)
                .with_description("Financed into the loan amount"),
        );
    }

    ensure_finite(&results)?;
    Ok(results)
}
