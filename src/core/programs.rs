//! Loan-program overlays: the fee and insurance tables that sit on top of the
//! plain amortization formula.

use serde::{Deserialize, Serialize};

/// FHA loans above this base amount use the high-balance MIP table.
pub const FHA_HIGH_BALANCE_LIMIT: f64 = 726_200.0;
pub const FHA_UPFRONT_MIP_PERCENT: f64 = 1.75;
pub const USDA_UPFRONT_GUARANTEE_PERCENT: f64 = 1.0;
pub const USDA_ANNUAL_FEE_PERCENT: f64 = 0.35;
pub const VA_IRRRL_FUNDING_FEE_PERCENT: f64 = 0.5;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LoanProgram {
    #[serde(alias = "conv")]
    Conventional,
    #[serde(alias = "FHA")]
    Fha,
    #[serde(alias = "VA")]
    Va,
    #[serde(alias = "USDA")]
    Usda,
}

/// Housing (front-end) and total-debt (back-end) ratio limits, in percent of
/// gross monthly income.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DtiLimits {
    pub front_end: f64,
    pub back_end: f64,
}

impl LoanProgram {
    pub const ALL: [LoanProgram; 4] = [
        LoanProgram::Conventional,
        LoanProgram::Fha,
        LoanProgram::Va,
        LoanProgram::Usda,
    ];

    pub fn name(self) -> &'static str {
        match self {
            LoanProgram::Conventional => "Conventional",
            LoanProgram::Fha => "FHA",
            LoanProgram::Va => "VA",
            LoanProgram::Usda => "USDA",
        }
    }

    pub fn minimum_down_payment_percent(self) -> f64 {
        match self {
            LoanProgram::Conventional => 3.0,
            LoanProgram::Fha => 3.5,
            LoanProgram::Va | LoanProgram::Usda => 0.0,
        }
    }

    pub fn dti_limits(self) -> DtiLimits {
        let (front_end, back_end) = match self {
            LoanProgram::Conventional => (28.0, 36.0),
            LoanProgram::Fha => (31.0, 43.0),
            // VA underwrites on residual income and total DTI only
            LoanProgram::Va => (41.0, 41.0),
            LoanProgram::Usda => (29.0, 41.0),
        };
        DtiLimits {
            front_end,
            back_end,
        }
    }

    pub fn insurance_label(self) -> &'static str {
        match self {
            LoanProgram::Conventional => "Monthly PMI",
            LoanProgram::Fha => "Monthly FHA MIP",
            LoanProgram::Va => "Monthly Mortgage Insurance",
            LoanProgram::Usda => "Monthly USDA Annual Fee",
        }
    }

    pub fn upfront_fee_label(self) -> &'static str {
        match self {
            LoanProgram::Conventional => "Upfront Fee",
            LoanProgram::Fha => "Upfront FHA MIP",
            LoanProgram::Va => "VA Funding Fee",
            LoanProgram::Usda => "USDA Guarantee Fee",
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VaLoanPurpose {
    Purchase,
    #[serde(alias = "IRRRL")]
    Irrrl,
    #[serde(alias = "cashOut", alias = "cash_out")]
    CashOut,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VaUsage {
    #[serde(alias = "firstUse", alias = "first_use", alias = "first")]
    FirstUse,
    #[serde(alias = "subsequentUse", alias = "subsequent_use", alias = "subsequent")]
    SubsequentUse,
}

/// VA funding fee as a percent of the base loan.
pub fn va_funding_fee_percent(
    purpose: VaLoanPurpose,
    usage: VaUsage,
    down_payment_percent: f64,
    exempt: bool,
) -> f64 {
    if exempt {
        return 0.0;
    }
    match purpose {
        VaLoanPurpose::Irrrl => VA_IRRRL_FUNDING_FEE_PERCENT,
        VaLoanPurpose::CashOut => match usage {
            VaUsage::FirstUse => 2.15,
            VaUsage::SubsequentUse => 3.3,
        },
        VaLoanPurpose::Purchase => {
            if down_payment_percent >= 10.0 {
                1.25
            } else if down_payment_percent >= 5.0 {
                1.5
            } else {
                match usage {
                    VaUsage::FirstUse => 2.15,
                    VaUsage::SubsequentUse => 3.3,
                }
            }
        }
    }
}

/// Annual FHA mortgage insurance premium, percent of the base loan.
pub fn fha_annual_mip_percent(base_loan: f64, ltv_percent: f64, term_years: u32) -> f64 {
    let high_balance = base_loan > FHA_HIGH_BALANCE_LIMIT;
    if term_years > 15 {
        match (high_balance, ltv_percent > 95.0) {
            (false, true) => 0.55,
            (false, false) => 0.50,
            (true, true) => 0.75,
            (true, false) => 0.70,
        }
    } else if !high_balance {
        if ltv_percent > 90.0 { 0.40 } else { 0.15 }
    } else if ltv_percent > 90.0 {
        0.65
    } else if ltv_percent > 78.0 {
        0.40
    } else {
        0.15
    }
}

/// Annual private mortgage insurance for conventional loans, percent of the loan.
pub fn conventional_pmi_percent(ltv_percent: f64) -> f64 {
    if ltv_percent > 95.0 {
        0.90
    } else if ltv_percent > 90.0 {
        0.70
    } else if ltv_percent > 85.0 {
        0.50
    } else if ltv_percent > 80.0 {
        0.30
    } else {
        0.0
    }
}

/// Fee and insurance rates a program applies to one purchase.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramOverlay {
    /// One-time fee financed into the loan, percent of the base loan.
    pub upfront_fee_percent: f64,
    /// Recurring insurance or guarantee fee, annual percent of the base loan.
    pub annual_insurance_percent: f64,
}

impl ProgramOverlay {
    pub const NONE: ProgramOverlay = ProgramOverlay {
        upfront_fee_percent: 0.0,
        annual_insurance_percent: 0.0,
    };

    /// Highest fee and insurance the program can charge on a first-use purchase.
    pub fn worst_case(program: LoanProgram, va_exempt: bool) -> Self {
        match program {
            LoanProgram::Conventional => ProgramOverlay {
                upfront_fee_percent: 0.0,
                annual_insurance_percent: conventional_pmi_percent(100.0),
            },
            LoanProgram::Fha => ProgramOverlay {
                upfront_fee_percent: FHA_UPFRONT_MIP_PERCENT,
                annual_insurance_percent: 0.75,
            },
            LoanProgram::Va => ProgramOverlay {
                upfront_fee_percent: va_funding_fee_percent(
                    VaLoanPurpose::Purchase,
                    VaUsage::FirstUse,
                    0.0,
                    va_exempt,
                ),
                annual_insurance_percent: 0.0,
            },
            LoanProgram::Usda => ProgramOverlay {
                upfront_fee_percent: USDA_UPFRONT_GUARANTEE_PERCENT,
                annual_insurance_percent: USDA_ANNUAL_FEE_PERCENT,
            },
        }
    }

    pub fn for_purchase(
        program: LoanProgram,
        price: f64,
        down_payment: f64,
        term_years: u32,
        va_exempt: bool,
    ) -> Self {
        let base_loan = (price - down_payment).max(0.0);
        if base_loan <= 0.0 || price <= 0.0 {
            return ProgramOverlay::NONE;
        }
        let ltv = base_loan / price * 100.0;
        let down_percent = down_payment / price * 100.0;

        match program {
            LoanProgram::Conventional => ProgramOverlay {
                upfront_fee_percent: 0.0,
                annual_insurance_percent: conventional_pmi_percent(ltv),
            },
            LoanProgram::Fha => ProgramOverlay {
                upfront_fee_percent: FHA_UPFRONT_MIP_PERCENT,
                annual_insurance_percent: fha_annual_mip_percent(base_loan, ltv, term_years),
            },
            LoanProgram::Va => ProgramOverlay {
                upfront_fee_percent: va_funding_fee_percent(
                    VaLoanPurpose::Purchase,
                    VaUsage::FirstUse,
                    down_percent,
                    va_exempt,
                ),
                annual_insurance_percent: 0.0,
            },
            LoanProgram::Usda => ProgramOverlay {
                upfront_fee_percent: USDA_UPFRONT_GUARANTEE_PERCENT,
                annual_insurance_percent: USDA_ANNUAL_FEE_PERCENT,
            },
        }
    }

    pub fn upfront_fee(&self, base_loan: f64) -> f64 {
        base_loan * self.upfront_fee_percent / 100.0
    }

    pub fn monthly_insurance(&self, base_loan: f64) -> f64 {
        base_loan * self.annual_insurance_percent / 100.0 / 12.0
    }
}
