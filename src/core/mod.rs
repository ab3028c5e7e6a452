mod engine;
mod format;
mod types;

pub use engine::{
    MONTH_LABELS, aggregate_years, build_schedule, chart_series, run_projection, totals,
};
pub use format::{
    CurrencyFormat, DigitGrouping, MAX_FRACTION_DIGITS, format_index, format_inr, format_number,
};
pub use types::{
    ChartPoint, ContributionTiming, MAX_YEARS, MonthRow, PlanParameters, Projection, StepType,
    Totals, YearRow,
};
