use crate::core::{CurrencyFormat, PlanParameters, Projection, StepType, format_index};

pub(super) fn render_report(
    params: &PlanParameters,
    projection: &Projection,
    fmt: &CurrencyFormat,
    include_monthly: bool,
) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n\n", plan_description(params, fmt)));

    let totals = &projection.totals;
    for (label, value) in [
        ("Final Corpus (Nominal)", totals.final_nominal),
        ("Final Corpus (Real, today)", totals.final_real),
        ("Total Invested", totals.total_contributed),
        ("Wealth Gain (Nominal)", totals.gain),
    ] {
        out.push_str(&format!("{label:<28}{:>20}\n", fmt.format_value(value)));
    }

    out.push_str("\nYear-by-Year Summary\n");
    out.push_str(&format!(
        "{:>4} {:>16} {:>16} {:>16} {:>16} {:>12} {:>12} {:>16}\n",
        "Year", "Start", "Contribution", "End (Nominal)", "Return", "Start SIP", "End SIP",
        "End (Real)"
    ));
    for y in &projection.yearly {
        out.push_str(&format!(
            "{:>4} {:>16} {:>16} {:>16} {:>16} {:>12} {:>12} {:>16}\n",
            y.year,
            fmt.format_value(y.start_balance),
            fmt.format_value(y.contribution),
            fmt.format_value(y.end_balance),
            fmt.format_value(y.return_earned),
            fmt.format_value(y.start_contribution),
            fmt.format_value(y.end_contribution),
            fmt.format_value(y.end_balance_real),
        ));
    }

    if include_monthly {
        out.push_str("\nMonth-by-Month Details\n");
        out.push_str(&format!(
            "{:>5} {:>4} {:>4} {:>12} {:>16} {:>14} {:>16} {:>10} {:>16}\n",
            "Month", "Year", "Mon", "SIP", "Start", "Interest", "End (Nominal)", "Index",
            "End (Real)"
        ));
        for r in &projection.schedule {
            out.push_str(&format!(
                "{:>5} {:>4} {:>4} {:>12} {:>16} {:>14} {:>16} {:>10} {:>16}\n",
                r.month,
                r.year,
                r.month_label,
                fmt.format_value(r.contribution),
                fmt.format_value(r.start_balance),
                fmt.format_value(r.interest),
                fmt.format_value(r.end_balance),
                format_index(r.inflation_index),
                fmt.format_value(r.end_balance_real),
            ));
        }
    }

    out
}

fn plan_description(params: &PlanParameters, fmt: &CurrencyFormat) -> String {
    let step = match params.step_type {
        StepType::Percent => format!("{}%", params.step_value),
        StepType::Fixed => fmt.format_value(params.step_value),
    };
    format!(
        "Step-up SIP: {} per month, +{} every {} months, {}% return, {}% inflation, {} years, {}",
        fmt.format_value(params.start_contribution),
        step,
        params.step_interval_months,
        params.annual_return_pct,
        params.annual_inflation_pct,
        params.years,
        params.timing.label().to_lowercase(),
    )
}
