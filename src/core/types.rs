use serde::Serialize;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StepType {
    Percent,
    Fixed,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContributionTiming {
    StartOfMonth,
    EndOfMonth,
}

impl ContributionTiming {
    pub fn label(self) -> &'static str {
        match self {
            ContributionTiming::StartOfMonth => "Start of Month",
            ContributionTiming::EndOfMonth => "End of Month",
        }
    }
}

/// Inputs for one projection. Rates are annual percentages (12 = 12%).
///
/// Values are expected to be sanitized by the input layer; the engine only
/// guards against a zero step interval.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanParameters {
    pub start_contribution: f64,
    pub step_type: StepType,
    pub step_value: f64,
    pub step_interval_months: u32,
    pub annual_return_pct: f64,
    pub annual_inflation_pct: f64,
    pub years: u32,
    pub timing: ContributionTiming,
}

impl Default for PlanParameters {
    fn default() -> Self {
        Self {
            start_contribution: 3_000.0,
            step_type: StepType::Percent,
            step_value: 10.0,
            step_interval_months: 6,
            annual_return_pct: 12.0,
            annual_inflation_pct: 6.0,
            years: 20,
            timing: ContributionTiming::EndOfMonth,
        }
    }
}

/// Longest horizon the input boundary accepts. The engine assumes callers
/// have already clamped `years` to this.
pub const MAX_YEARS: u32 = 60;

impl PlanParameters {
    pub fn total_months(&self) -> u32 {
        self.years.saturating_mul(12)
    }

    pub fn monthly_return_rate(&self) -> f64 {
        self.annual_return_pct / 100.0 / 12.0
    }

    pub fn monthly_inflation_rate(&self) -> f64 {
        self.annual_inflation_pct / 100.0 / 12.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthRow {
    pub month: u32,
    pub year: u32,
    pub month_label: &'static str,
    pub contribution: f64,
    pub start_balance: f64,
    pub interest: f64,
    pub end_balance: f64,
    pub inflation_index: f64,
    pub end_balance_real: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearRow {
    pub year: u32,
    pub start_balance: f64,
    pub contribution: f64,
    pub end_balance: f64,
    pub return_earned: f64,
    pub start_contribution: f64,
    pub end_contribution: f64,
    pub end_balance_real: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    pub total_contributed: f64,
    pub final_nominal: f64,
    pub final_real: f64,
    pub gain: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartPoint {
    pub label: String,
    pub nominal_end_balance: f64,
    pub real_end_balance: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    pub schedule: Vec<MonthRow>,
    pub yearly: Vec<YearRow>,
    pub totals: Totals,
    pub chart: Vec<ChartPoint>,
}
