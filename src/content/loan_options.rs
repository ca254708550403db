use serde::Serialize;

use crate::core::{Calculator, LoanProgram};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanOption {
    pub slug: &'static str,
    pub name: &'static str,
    pub tagline: &'static str,
    pub summary: &'static str,
    pub highlights: &'static [&'static str],
    pub ideal_for: &'static str,
    /// Program rules used by the affordability calculator, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub program: Option<LoanProgram>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calculator: Option<Calculator>,
}

impl LoanOption {
    pub fn path(&self) -> String {
        format!("/loan-options/{}", self.slug)
    }

    pub fn minimum_down_payment_percent(&self) -> Option<f64> {
        self.program.map(LoanProgram::minimum_down_payment_percent)
    }
}

pub static LOAN_OPTIONS: &[LoanOption] = &[
    LoanOption {
        slug: "conventional",
        name: "Conventional Loans",
        tagline: "Flexible financing with as little as 3% down",
        summary: "Conventional mortgages follow Fannie Mae and Freddie Mac guidelines. \
                  Borrowers who put down less than 20% pay private mortgage insurance, \
                  which can be removed once enough equity builds up.",
        highlights: &[
            "Down payments from 3%",
            "PMI can be cancelled at 20% equity",
            "Primary, second home and investment properties",
            "Fixed and adjustable rate options",
        ],
        ideal_for: "Borrowers with solid credit who want the widest choice of terms",
        program: Some(LoanProgram::Conventional),
        calculator: Some(Calculator::Affordability),
    },
    LoanOption {
        slug: "fha",
        name: "FHA Loans",
        tagline: "Government-insured loans with relaxed credit requirements",
        summary: "FHA loans are insured by the Federal Housing Administration. They allow \
                  3.5% down and higher debt-to-income ratios, in exchange for an upfront \
                  and annual mortgage insurance premium.",
        highlights: &[
            "3.5% minimum down payment",
            "Debt-to-income ratios up to 43% and beyond with compensating factors",
            "Gift funds allowed for the down payment",
            "1.75% upfront MIP can be financed",
        ],
        ideal_for: "First-time buyers and borrowers rebuilding credit",
        program: Some(LoanProgram::Fha),
        calculator: Some(Calculator::Affordability),
    },
    LoanOption {
        slug: "va-purchase",
        name: "VA Purchase Loans",
        tagline: "Zero down home loans for veterans and service members",
        summary: "VA loans are guaranteed by the Department of Veterans Affairs. Eligible \
                  veterans, active-duty service members and surviving spouses can buy with \
                  no down payment and no monthly mortgage insurance.",
        highlights: &[
            "No down payment required",
            "No monthly mortgage insurance",
            "Funding fee waived with a service-connected disability",
            "Competitive rates and limited closing costs",
        ],
        ideal_for: "Veterans and active-duty buyers with a Certificate of Eligibility",
        program: Some(LoanProgram::Va),
        calculator: Some(Calculator::VaPurchase),
    },
    LoanOption {
        slug: "va-irrrl",
        name: "VA Streamline Refinance (IRRRL)",
        tagline: "Lower your VA rate with minimal paperwork",
        summary: "The Interest Rate Reduction Refinance Loan replaces an existing VA loan \
                  with a new one at a lower rate. No appraisal or income verification is \
                  usually required and the funding fee is only 0.5%.",
        highlights: &[
            "0.5% funding fee",
            "Usually no appraisal required",
            "Closing costs can be rolled into the loan",
            "Cash-out option available as a separate VA refinance",
        ],
        ideal_for: "Homeowners with a VA loan who want a lower payment",
        program: Some(LoanProgram::Va),
        calculator: Some(Calculator::VaRefinance),
    },
    LoanOption {
        slug: "usda",
        name: "USDA Loans",
        tagline: "No down payment financing for eligible rural areas",
        summary: "USDA Rural Development guaranteed loans offer 100% financing on homes in \
                  eligible areas for households within the income limits. A 1% upfront \
                  guarantee fee and 0.35% annual fee replace traditional mortgage insurance.",
        highlights: &[
            "No down payment required",
            "1% upfront guarantee fee, financed",
            "0.35% annual fee",
            "Household income limits apply",
        ],
        ideal_for: "Moderate-income buyers outside major metro areas",
        program: Some(LoanProgram::Usda),
        calculator: Some(Calculator::Affordability),
    },
    LoanOption {
        slug: "dscr",
        name: "DSCR Investment Loans",
        tagline: "Qualify on the property's rent, not your tax returns",
        summary: "Debt service coverage ratio loans qualify rental properties on their \
                  income. Lenders compare the rent, less vacancy and expenses, with the \
                  mortgage payment; a ratio of 1.25 or more earns the best pricing.",
        highlights: &[
            "No personal income documentation",
            "Qualifies at a DSCR of 1.0, some lenders lower",
            "Close in an LLC",
            "Typically 20-25% down",
        ],
        ideal_for: "Real estate investors growing a rental portfolio",
        program: None,
        calculator: Some(Calculator::Dscr),
    },
    LoanOption {
        slug: "jumbo",
        name: "Jumbo Loans",
        tagline: "Financing above the conforming loan limit",
        summary: "Jumbo mortgages cover loan amounts above the conforming limit set each \
                  year. They typically need stronger credit, larger reserves and a down \
                  payment of 10-20%.",
        highlights: &[
            "Loan amounts above the conforming limit",
            "Fixed and adjustable rate options",
            "Down payments from 10%",
            "Reserves of 6-12 months usually required",
        ],
        ideal_for: "Buyers in high-cost markets",
        program: None,
        calculator: None,
    },
];

pub fn loan_options() -> &'static [LoanOption] {
    LOAN_OPTIONS
}

pub fn find_loan_option(slug: &str) -> Option<&'static LoanOption> {
    LOAN_OPTIONS.iter().find(|option| option.slug == slug)
}

/// Loan options that link to the given calculator.
pub fn options_for_calculator(calculator: Calculator) -> impl Iterator<Item = &'static LoanOption> {
    LOAN_OPTIONS
        .iter()
        .filter(move |option| option.calculator == Some(calculator))
}
