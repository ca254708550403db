use serde::Serialize;

pub const MONTHS_PER_YEAR: u32 = 12;

/// Longest term the formulas accept; longer terms are treated as this one.
pub const MAX_TERM_YEARS: u32 = 40;

const ZERO_RATE_EPS: f64 = 1e-12;

/// Periodic (monthly) rate for an annual percentage rate, e.g. 6.0 -> 0.005.
pub fn monthly_rate(annual_rate_percent: f64) -> f64 {
    annual_rate_percent / 100.0 / MONTHS_PER_YEAR as f64
}

/// Number of monthly payments, with the term clamped to [`MAX_TERM_YEARS`].
pub fn term_months(term_years: u32) -> u32 {
    term_years.min(MAX_TERM_YEARS) * MONTHS_PER_YEAR
}

/// Level payment per unit of principal for a fixed-rate loan.
pub fn payment_factor(annual_rate_percent: f64, term_years: u32) -> f64 {
    let n = term_months(term_years);
    if n == 0 {
        return 1.0;
    }
    let r = monthly_rate(annual_rate_percent);
    if r.abs() < ZERO_RATE_EPS {
        return 1.0 / n as f64;
    }
    let growth = (1.0 + r).powi(n as i32);
    r * growth / (growth - 1.0)
}

/// Standard amortizing payment `P·r(1+r)^n / ((1+r)^n − 1)`, or `P/n` at a zero rate.
pub fn monthly_payment(principal: f64, annual_rate_percent: f64, term_years: u32) -> f64 {
    if principal <= 0.0 {
        return 0.0;
    }
    principal * payment_factor(annual_rate_percent, term_years)
}

pub fn total_interest(principal: f64, annual_rate_percent: f64, term_years: u32) -> f64 {
    if principal <= 0.0 {
        return 0.0;
    }
    let n = term_months(term_years) as f64;
    let paid = monthly_payment(principal, annual_rate_percent, term_years) * n;
    (paid - principal).max(0.0)
}

/// Outstanding balance after `months_paid` level payments.
pub fn remaining_balance(
    principal: f64,
    annual_rate_percent: f64,
    term_years: u32,
    months_paid: u32,
) -> f64 {
    if principal <= 0.0 {
        return 0.0;
    }
    let n = term_months(term_years);
    if months_paid >= n {
        return 0.0;
    }
    let payment = monthly_payment(principal, annual_rate_percent, term_years);
    let r = monthly_rate(annual_rate_percent);
    if r.abs() < ZERO_RATE_EPS {
        return (principal - payment * months_paid as f64).max(0.0);
    }
    let growth = (1.0 + r).powi(months_paid as i32);
    (principal * growth - payment * (growth - 1.0) / r).max(0.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AmortizationYear {
    pub year: u32,
    pub principal_paid: f64,
    pub interest_paid: f64,
    pub ending_balance: f64,
}

/// Year-by-year summary of a fixed-rate loan.
pub fn amortization_schedule(
    principal: f64,
    annual_rate_percent: f64,
    term_years: u32,
) -> Vec<AmortizationYear> {
    let years = term_years.min(MAX_TERM_YEARS);
    if principal <= 0.0 || years == 0 {
        return Vec::new();
    }
    let yearly_payments =
        monthly_payment(principal, annual_rate_percent, years) * MONTHS_PER_YEAR as f64;

    let mut opening = principal;
    let mut rows = Vec::with_capacity(years as usize);
    for year in 1..=years {
        let ending_balance =
            remaining_balance(principal, annual_rate_percent, years, year * MONTHS_PER_YEAR);
        let principal_paid = opening - ending_balance;
        rows.push(AmortizationYear {
            year,
            principal_paid,
            interest_paid: (yearly_payments - principal_paid).max(0.0),
            ending_balance,
        });
        opening = ending_balance;
    }
    rows
}
