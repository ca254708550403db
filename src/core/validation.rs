use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// Inclusive numeric bounds for one input field. `field` is the camelCase
/// name used on the wire and as the key of validation messages.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FieldRange {
    pub field: &'static str,
    pub label: &'static str,
    pub min: f64,
    pub max: f64,
}

impl FieldRange {
    pub const fn new(field: &'static str, label: &'static str, min: f64, max: f64) -> Self {
        Self {
            field,
            label,
            min,
            max,
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        value.is_finite() && value >= self.min && value <= self.max
    }
}

pub const MIN_PROPERTY_PRICE: f64 = 1_000.0;
pub const MAX_PROPERTY_PRICE: f64 = 100_000_000.0;

pub const HOME_PRICE: FieldRange =
    FieldRange::new("homePrice", "Home price", MIN_PROPERTY_PRICE, MAX_PROPERTY_PRICE);
pub const PROPERTY_PRICE: FieldRange = FieldRange::new(
    "propertyPrice",
    "Property price",
    MIN_PROPERTY_PRICE,
    MAX_PROPERTY_PRICE,
);
pub const HOME_VALUE: FieldRange =
    FieldRange::new("homeValue", "Home value", MIN_PROPERTY_PRICE, MAX_PROPERTY_PRICE);
pub const DOWN_PAYMENT: FieldRange =
    FieldRange::new("downPayment", "Down payment", 0.0, MAX_PROPERTY_PRICE);
pub const INTEREST_RATE: FieldRange = FieldRange::new("interestRate", "Interest rate", 0.0, 20.0);
pub const CURRENT_INTEREST_RATE: FieldRange =
    FieldRange::new("currentInterestRate", "Current interest rate", 0.0, 20.0);
pub const NEW_INTEREST_RATE: FieldRange =
    FieldRange::new("newInterestRate", "New interest rate", 0.0, 20.0);
pub const LOAN_TERM_YEARS: FieldRange = FieldRange::new("loanTermYears", "Loan term", 1.0, 40.0);
pub const REMAINING_TERM_YEARS: FieldRange =
    FieldRange::new("remainingTermYears", "Remaining term", 1.0, 40.0);
pub const ANNUAL_INCOME: FieldRange =
    FieldRange::new("annualIncome", "Annual income", 1_000.0, 100_000_000.0);
pub const MONTHLY_DEBTS: FieldRange =
    FieldRange::new("monthlyDebts", "Monthly debts", 0.0, 1_000_000.0);
pub const PROPERTY_TAX_RATE: FieldRange =
    FieldRange::new("propertyTaxRate", "Property tax rate", 0.0, 10.0);
pub const ANNUAL_INSURANCE: FieldRange =
    FieldRange::new("annualInsurance", "Annual home insurance", 0.0, 1_000_000.0);
pub const MONTHLY_HOA: FieldRange = FieldRange::new("monthlyHoa", "Monthly HOA", 0.0, 100_000.0);
pub const FUNDING_FEE_PERCENT: FieldRange =
    FieldRange::new("fundingFeePercent", "Funding fee", 0.0, 5.0);
pub const MONTHLY_RENT: FieldRange =
    FieldRange::new("monthlyRent", "Monthly rent", 0.0, 10_000_000.0);
pub const MONTHLY_EXPENSES: FieldRange =
    FieldRange::new("monthlyExpenses", "Monthly expenses", 0.0, 10_000_000.0);
pub const VACANCY_RATE: FieldRange = FieldRange::new("vacancyRate", "Vacancy rate", 0.0, 100.0);
pub const CURRENT_BALANCE: FieldRange = FieldRange::new(
    "currentBalance",
    "Current loan balance",
    MIN_PROPERTY_PRICE,
    MAX_PROPERTY_PRICE,
);
pub const CASH_OUT_AMOUNT: FieldRange =
    FieldRange::new("cashOutAmount", "Cash out amount", 0.0, MAX_PROPERTY_PRICE);
pub const CLOSING_COSTS: FieldRange =
    FieldRange::new("closingCosts", "Closing costs", 0.0, 1_000_000.0);
pub const FRONT_END_RATIO: FieldRange =
    FieldRange::new("frontEndRatio", "Housing ratio", 1.0, 65.0);
pub const BACK_END_RATIO: FieldRange =
    FieldRange::new("backEndRatio", "Debt-to-income ratio", 1.0, 65.0);

const ALL_RANGES: [FieldRange; 23] = [
    HOME_PRICE,
    PROPERTY_PRICE,
    HOME_VALUE,
    DOWN_PAYMENT,
    INTEREST_RATE,
    CURRENT_INTEREST_RATE,
    NEW_INTEREST_RATE,
    LOAN_TERM_YEARS,
    REMAINING_TERM_YEARS,
    ANNUAL_INCOME,
    MONTHLY_DEBTS,
    PROPERTY_TAX_RATE,
    ANNUAL_INSURANCE,
    MONTHLY_HOA,
    FUNDING_FEE_PERCENT,
    MONTHLY_RENT,
    MONTHLY_EXPENSES,
    VACANCY_RATE,
    CURRENT_BALANCE,
    CASH_OUT_AMOUNT,
    CLOSING_COSTS,
    FRONT_END_RATIO,
    BACK_END_RATIO,
];

/// Looks up a numeric field by its wire name.
pub fn field_range(field: &str) -> Option<FieldRange> {
    ALL_RANGES.into_iter().find(|range| range.field == field)
}

/// Field-keyed validation messages, collected rather than fail-fast.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    errors: BTreeMap<String, String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps the first message reported for a field.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.entry(field.into()).or_insert_with(|| message.into());
    }

    pub fn check_range(&mut self, range: FieldRange, value: f64) {
        if !value.is_finite() {
            self.add(range.field, format!("{} must be a number", range.label));
        } else if value < range.min {
            self.add(
                range.field,
                format!("{} must be at least {}", range.label, trim_number(range.min)),
            );
        } else if value > range.max {
            self.add(
                range.field,
                format!("{} must be at most {}", range.label, trim_number(range.max)),
            );
        }
    }

    pub fn check_at_most(&mut self, field: &str, value: f64, limit: f64, message: &str) {
        if value.is_finite() && limit.is_finite() && value > limit {
            self.add(field, message);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.errors.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Adds `other`'s messages for fields that have none yet.
    pub fn merge(&mut self, other: ValidationErrors) {
        for (field, message) in other.errors {
            self.add(field, message);
        }
    }

    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in &self.errors {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

pub trait Validate {
    fn validate(&self) -> Result<(), ValidationErrors>;
}

pub fn check_term(errors: &mut ValidationErrors, range: FieldRange, years: u32) {
    errors.check_range(range, years as f64);
}

/// Converts a term sent as a plain number into whole years, reporting range
/// and fractional values under the field's key.
pub fn whole_years(errors: &mut ValidationErrors, range: FieldRange, value: f64) -> Option<u32> {
    let mut found = ValidationErrors::new();
    found.check_range(range, value);
    if found.is_empty() && value.fract() != 0.0 {
        found.add(range.field, format!("{} must be a whole number of years", range.label));
    }
    if found.is_empty() {
        // range bounds keep the value inside u32
        return Some(value as u32);
    }
    errors.merge(found);
    None
}

pub fn check_down_payment_field(errors: &mut ValidationErrors, down_payment: f64, price: f64) {
    errors.check_range(DOWN_PAYMENT, down_payment);
    errors.check_at_most(
        DOWN_PAYMENT.field,
        down_payment,
        price,
        "Down payment cannot exceed the purchase price",
    );
}

fn trim_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() >= 1_000.0 {
        crate::core::ResultFormat::Number
            .render(value)
            .trim_end_matches(".00")
            .to_string()
    } else {
        format!("{value}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_messages_name_the_bound() {
        let mut errors = ValidationErrors::new();
        errors.check_range(HOME_PRICE, 999.0);
        errors.check_range(INTEREST_RATE, 20.5);
        errors.check_range(MONTHLY_HOA, f64::NAN);

        assert_eq!(errors.len(), 3);
        assert_eq!(errors.get("homePrice"), Some("Home price must be at least 1,000"));
        assert_eq!(errors.get("interestRate"), Some("Interest rate must be at most 20"));
        assert_eq!(errors.get("monthlyHoa"), Some("Monthly HOA must be a number"));
    }

    #[test]
    fn bounds_are_inclusive() {
        let mut errors = ValidationErrors::new();
        errors.check_range(HOME_PRICE, 1_000.0);
        errors.check_range(HOME_PRICE, 100_000_000.0);
        errors.check_range(INTEREST_RATE, 0.0);
        errors.check_range(INTEREST_RATE, 20.0);
        assert!(errors.into_result().is_ok());
    }

    #[test]
    fn first_message_per_field_wins() {
        let mut errors = ValidationErrors::new();
        check_down_payment_field(&mut errors, -1.0, 0.0);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get("downPayment"), Some("Down payment must be at least 0"));
    }

    #[test]
    fn down_payment_above_price_is_a_field_error() {
        let mut errors = ValidationErrors::new();
        check_down_payment_field(&mut errors, 300_000.0, 250_000.0);
        let err = errors.into_result().expect_err("down payment above price");
        assert!(err.to_string().starts_with("downPayment: "));
    }

    #[test]
    fn terms_must_be_whole_years_in_range() {
        let mut errors = ValidationErrors::new();
        assert_eq!(whole_years(&mut errors, LOAN_TERM_YEARS, 30.0), Some(30));
        assert!(errors.is_empty());

        assert_eq!(whole_years(&mut errors, LOAN_TERM_YEARS, 29.5), None);
        assert_eq!(
            errors.get("loanTermYears"),
            Some("Loan term must be a whole number of years")
        );
        assert_eq!(whole_years(&mut errors, REMAINING_TERM_YEARS, -5.0), None);
        assert_eq!(
            errors.get("remainingTermYears"),
            Some("Remaining term must be at least 1")
        );
    }

    #[test]
    fn merge_keeps_existing_messages() {
        let mut first = ValidationErrors::new();
        first.add("loanTermYears", "first");
        let mut second = ValidationErrors::new();
        second.add("loanTermYears", "second");
        second.add("interestRate", "rate");
        first.merge(second);
        assert_eq!(first.get("loanTermYears"), Some("first"));
        assert_eq!(first.get("interestRate"), Some("rate"));
        assert_eq!(field_range("monthlyRent"), Some(MONTHLY_RENT));
        assert_eq!(field_range("loanProgram"), None);
    }

    #[test]
    fn serializes_as_a_flat_map() {
        let mut errors = ValidationErrors::new();
        errors.add("monthlyRent", "bad");
        let json = serde_json::to_string(&errors).expect("serializes");
        assert_eq!(json, r#"{"monthlyRent":"bad"}"#);
    }
}
