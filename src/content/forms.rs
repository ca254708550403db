use serde::Serialize;

use crate::core::validation::{
    ANNUAL_INCOME, ANNUAL_INSURANCE, BACK_END_RATIO, CASH_OUT_AMOUNT, CLOSING_COSTS,
    CURRENT_BALANCE, CURRENT_INTEREST_RATE, DOWN_PAYMENT, FRONT_END_RATIO, FUNDING_FEE_PERCENT,
    HOME_PRICE, HOME_VALUE, INTEREST_RATE, LOAN_TERM_YEARS, MONTHLY_DEBTS, MONTHLY_EXPENSES,
    MONTHLY_HOA, MONTHLY_RENT, NEW_INTEREST_RATE, PROPERTY_PRICE, PROPERTY_TAX_RATE,
    REMAINING_TERM_YEARS, VACANCY_RATE,
};
use crate::core::{
    AffordabilityInputs, Calculator, DscrInputs, FieldRange, LoanProgram, VaPurchaseInputs,
    VaRefinanceInputs, VaRefinanceType, VaUsage,
};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Currency,
    Percent,
    Years,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FieldKind {
    Number {
        min: f64,
        max: f64,
        step: f64,
        unit: Unit,
    },
    Select {
        options: Vec<SelectOption>,
    },
    Checkbox,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SelectOption {
    pub value: &'static str,
    pub label: &'static str,
}

/// One input on a calculator form. `name` is the camelCase key the API accepts.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormField {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub default_value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help: Option<&'static str>,
}

impl FormField {
    fn number(range: FieldRange, step: f64, unit: Unit, default: f64) -> Self {
        Self {
            name: range.field,
            label: range.label,
            kind: FieldKind::Number {
                min: range.min,
                max: range.max,
                step,
                unit,
            },
            default_value: format!("{default}"),
            help: None,
        }
    }

    fn checkbox(name: &'static str, label: &'static str, checked: bool) -> Self {
        Self {
            name,
            label,
            kind: FieldKind::Checkbox,
            default_value: checked.to_string(),
            help: None,
        }
    }

    fn select(
        name: &'static str,
        label: &'static str,
        options: Vec<SelectOption>,
        default: &'static str,
    ) -> Self {
        Self {
            name,
            label,
            kind: FieldKind::Select { options },
            default_value: default.to_string(),
            help: None,
        }
    }

    /// Starts empty so the API fills in its own default.
    fn blank(mut self) -> Self {
        self.default_value.clear();
        self
    }

    fn with_help(mut self, help: &'static str) -> Self {
        self.help = Some(help);
        self
    }
}

fn money(range: FieldRange, default: f64) -> FormField {
    FormField::number(range, 1_000.0, Unit::Currency, default)
}

fn small_money(range: FieldRange, default: f64) -> FormField {
    FormField::number(range, 10.0, Unit::Currency, default)
}

fn percent(range: FieldRange, default: f64) -> FormField {
    FormField::number(range, 0.125, Unit::Percent, default)
}

fn years(range: FieldRange, default: u32) -> FormField {
    FormField::number(range, 1.0, Unit::Years, default as f64)
}

fn program_value(program: LoanProgram) -> &'static str {
    match program {
        LoanProgram::Conventional => "conventional",
        LoanProgram::Fha => "fha",
        LoanProgram::Va => "va",
        LoanProgram::Usda => "usda",
    }
}

fn usage_value(usage: VaUsage) -> &'static str {
    match usage {
        VaUsage::FirstUse => "first-use",
        VaUsage::SubsequentUse => "subsequent-use",
    }
}

fn va_usage_select() -> FormField {
    let options = vec![
        SelectOption {
            value: usage_value(VaUsage::FirstUse),
            label: "First use",
        },
        SelectOption {
            value: usage_value(VaUsage::SubsequentUse),
            label: "Subsequent use",
        },
    ];
    FormField::select(
        "vaUsage",
        "VA loan usage",
        options,
        usage_value(VaUsage::FirstUse),
    )
}

fn refinance_value(kind: VaRefinanceType) -> &'static str {
    match kind {
        VaRefinanceType::Irrrl => "irrrl",
        VaRefinanceType::CashOut => "cash-out",
    }
}

/// Form inputs, in display order, pre-filled with the calculator's defaults.
pub fn calculator_form(calculator: Calculator) -> Vec<FormField> {
    match calculator {
        Calculator::Affordability => {
            let d = AffordabilityInputs::default();
            let programs = LoanProgram::ALL
                .into_iter()
                .map(|p| SelectOption {
                    value: program_value(p),
                    label: p.name(),
                })
                .collect();
            vec![
                money(ANNUAL_INCOME, d.annual_income),
                small_money(MONTHLY_DEBTS, d.monthly_debts)
                    .with_help("Car, student loan, credit card and other monthly payments"),
                money(DOWN_PAYMENT, d.down_payment),
                percent(INTEREST_RATE, d.interest_rate),
                years(LOAN_TERM_YEARS, d.loan_term_years),
                percent(PROPERTY_TAX_RATE, d.property_tax_rate),
                small_money(ANNUAL_INSURANCE, d.annual_insurance),
                small_money(MONTHLY_HOA, d.monthly_hoa),
                FormField::select(
                    "loanProgram",
                    "Loan program",
                    programs,
                    program_value(d.loan_program),
                )
                .with_help("Changing the program resets the DTI ratios to its limits"),
                FormField::number(FRONT_END_RATIO, 1.0, Unit::Percent, d.front_end_ratio),
                FormField::number(BACK_END_RATIO, 1.0, Unit::Percent, d.back_end_ratio),
                FormField::checkbox(
                    "vaFundingFeeExempt",
                    "Exempt from the VA funding fee",
                    d.va_funding_fee_exempt,
                ),
            ]
        }
        Calculator::VaPurchase => {
            let d = VaPurchaseInputs::default();
            vec![
                money(HOME_PRICE, d.home_price),
                money(DOWN_PAYMENT, d.down_payment),
                percent(INTEREST_RATE, d.interest_rate),
                years(LOAN_TERM_YEARS, d.loan_term_years),
                va_usage_select(),
                FormField::number(FUNDING_FEE_PERCENT, 0.05, Unit::Percent, d.funding_fee_percent)
                    .blank()
                    .with_help("Leave blank to use the VA rate for your usage and down payment"),
                FormField::checkbox(
                    "disabilityExempt",
                    "Receiving VA disability compensation",
                    d.disability_exempt,
                ),
                percent(PROPERTY_TAX_RATE, d.property_tax_rate),
                small_money(ANNUAL_INSURANCE, d.annual_insurance),
                small_money(MONTHLY_HOA, d.monthly_hoa),
            ]
        }
        Calculator::VaRefinance => {
            let d = VaRefinanceInputs::default();
            let kinds = vec![
                SelectOption {
                    value: refinance_value(VaRefinanceType::Irrrl),
                    label: "Streamline (IRRRL)",
                },
                SelectOption {
                    value: refinance_value(VaRefinanceType::CashOut),
                    label: "Cash-out",
                },
            ];
            vec![
                FormField::select(
                    "refinanceType",
                    "Refinance type",
                    kinds,
                    refinance_value(d.refinance_type),
                ),
                money(HOME_VALUE, d.home_value),
                money(CURRENT_BALANCE, d.current_balance),
                percent(CURRENT_INTEREST_RATE, d.current_interest_rate),
                years(REMAINING_TERM_YEARS, d.remaining_term_years),
                percent(NEW_INTEREST_RATE, d.new_interest_rate),
                years(LOAN_TERM_YEARS, d.new_loan_term_years),
                money(CASH_OUT_AMOUNT, d.cash_out_amount).with_help("Cash-out refinances only"),
                va_usage_select(),
                FormField::number(FUNDING_FEE_PERCENT, 0.05, Unit::Percent, d.funding_fee_percent)
                    .blank()
                    .with_help("Leave blank for 0.5% on a streamline, 2.15% or 3.3% on cash-out"),
                FormField::checkbox(
                    "disabilityExempt",
                    "Receiving VA disability compensation",
                    d.disability_exempt,
                ),
                small_money(CLOSING_COSTS, d.closing_costs),
            ]
        }
        Calculator::Dscr => {
            let d = DscrInputs::default();
            vec![
                money(PROPERTY_PRICE, d.property_price),
                money(DOWN_PAYMENT, d.down_payment),
                percent(INTEREST_RATE, d.interest_rate),
                years(LOAN_TERM_YEARS, d.loan_term_years),
                small_money(MONTHLY_RENT, d.monthly_rent),
                small_money(MONTHLY_EXPENSES, d.monthly_expenses)
                    .with_help("Taxes, insurance, HOA, management and maintenance"),
                FormField::number(VACANCY_RATE, 1.0, Unit::Percent, d.vacancy_rate),
            ]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn field_names_are_unique_per_form() {
        for calculator in Calculator::ALL {
            let form = calculator_form(calculator);
            let names: HashSet<_> = form.iter().map(|f| f.name).collect();
            assert_eq!(names.len(), form.len(), "{}", calculator.slug());
        }
    }

    #[test]
    fn number_defaults_sit_inside_their_range() {
        for calculator in Calculator::ALL {
            for field in calculator_form(calculator) {
                if let FieldKind::Number { min, max, .. } = field.kind {
                    if field.default_value.is_empty() {
                        continue;
                    }
                    let value: f64 = field.default_value.parse().expect("numeric default");
                    assert!(
                        (min..=max).contains(&value),
                        "{} default {value} outside {min}..={max}",
                        field.name
                    );
                }
            }
        }
    }

    #[test]
    fn affordability_form_offers_every_program() {
        let form = calculator_form(Calculator::Affordability);
        let program = form.iter().find(|f| f.name == "loanProgram").expect("select");
        let FieldKind::Select { options } = &program.kind else {
            panic!("loanProgram should be a select");
        };
        assert_eq!(options.len(), LoanProgram::ALL.len());
        assert_eq!(program.default_value, "conventional");
    }

    #[test]
    fn va_forms_leave_the_fee_to_the_usage_default() {
        for calculator in [Calculator::VaPurchase, Calculator::VaRefinance] {
            let form = calculator_form(calculator);
            let usage = form.iter().find(|f| f.name == "vaUsage").expect("usage select");
            assert_eq!(usage.default_value, "first-use");
            let fee = form
                .iter()
                .find(|f| f.name == "fundingFeePercent")
                .expect("fee field");
            assert!(fee.default_value.is_empty());
            for option in ["first-use", "subsequent-use"] {
                let parsed: VaUsage =
                    serde_json::from_str(&format!("\"{option}\"")).expect("usage value");
                assert_eq!(usage_value(parsed), option);
            }
        }
    }
}
