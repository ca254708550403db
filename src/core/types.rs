use serde::{Deserialize, Serialize};

use crate::error::CalculatorError;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultFormat {
    Currency,
    Percentage,
    Number,
}

impl ResultFormat {
    pub fn render(self, value: f64) -> String {
        match self {
            ResultFormat::Currency => {
                let grouped = group_thousands(value, 2);
                match grouped.strip_prefix('-') {
                    Some(magnitude) => format!("-${magnitude}"),
                    None => format!("${grouped}"),
                }
            }
            ResultFormat::Percentage => format!("{value:.2}%"),
            ResultFormat::Number => group_thousands(value, 2),
        }
    }
}

/// One labelled line of calculator output. Order within a result list is
/// presentation order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculatorResult {
    pub label: String,
    pub value: f64,
    pub format: ResultFormat,
    #[serde(skip_serializing_if = "is_false")]
    pub highlight: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl CalculatorResult {
    fn new(label: impl Into<String>, value: f64, format: ResultFormat) -> Self {
        Self {
            label: label.into(),
            value,
            format,
            highlight: false,
            description: None,
        }
    }

    pub fn currency(label: impl Into<String>, value: f64) -> Self {
        Self::new(label, value, ResultFormat::Currency)
    }

    pub fn percentage(label: impl Into<String>, value: f64) -> Self {
        Self::new(label, value, ResultFormat::Percentage)
    }

    pub fn number(label: impl Into<String>, value: f64) -> Self {
        Self::new(label, value, ResultFormat::Number)
    }

    pub fn highlighted(mut self) -> Self {
        self.highlight = true;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn display_value(&self) -> String {
        self.format.render(self.value)
    }
}

/// Rejects a result list that carries NaN or an infinity anywhere.
pub fn ensure_finite(results: &[CalculatorResult]) -> Result<(), CalculatorError> {
    match results.iter().find(|r| !r.value.is_finite()) {
        Some(bad) => Err(CalculatorError::NonFinite {
            label: bad.label.clone(),
        }),
        None => Ok(()),
    }
}

pub fn find_result<'a>(results: &'a [CalculatorResult], label: &str) -> Option<&'a CalculatorResult> {
    results.iter().find(|r| r.label == label)
}

fn group_thousands(value: f64, decimals: usize) -> String {
    let formatted = format!("{:.*}", decimals, value.abs());
    let (whole, fraction) = match formatted.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (formatted.as_str(), None),
    };

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && formatted.chars().any(|c| c != '0' && c != '.') {
        "-"
    } else {
        ""
    };
    match fraction {
        Some(fraction) => format!("{sign}{grouped}.{fraction}"),
        None => format!("{sign}{grouped}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_render_groups_thousands_and_keeps_cents() {
        assert_eq!(ResultFormat::Currency.render(1_234_567.891), "$1,234,567.89");
        assert_eq!(ResultFormat::Currency.render(999.0), "$999.00");
        assert_eq!(ResultFormat::Currency.render(-1_500.5), "-$1,500.50");
    }

    #[test]
    fn percentage_and_number_render() {
        assert_eq!(ResultFormat::Percentage.render(6.5), "6.50%");
        assert_eq!(ResultFormat::Number.render(1.2345), "1.23");
        assert_eq!(ResultFormat::Number.render(12_000.0), "12,000.00");
        assert_eq!(ResultFormat::Number.render(-0.001), "0.00");
    }

    #[test]
    fn serialization_omits_default_highlight_and_description() {
        let plain = serde_json::to_string(&CalculatorResult::currency("Loan Amount", 1.0))
            .expect("serializes");
        assert_eq!(plain, r#"{"label":"Loan Amount","value":1.0,"format":"currency"}"#);

        let rich = serde_json::to_string(
            &CalculatorResult::number("DSCR", 1.3)
                .highlighted()
                .with_description("Strong"),
        )
        .expect("serializes");
        assert!(rich.contains(r#""highlight":true"#));
        assert!(rich.contains(r#""description":"Strong""#));
    }

    #[test]
    fn ensure_finite_names_the_offending_line() {
        let results = vec![
            CalculatorResult::currency("Ok", 1.0),
            CalculatorResult::number("Ratio", f64::INFINITY),
        ];
        let err = ensure_finite(&results).expect_err("infinity must be rejected");
        assert_eq!(
            err,
            CalculatorError::NonFinite {
                label: "Ratio".to_string()
            }
        );
    }
}
