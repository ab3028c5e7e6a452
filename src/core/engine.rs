use super::types::{
    ChartPoint, ContributionTiming, MonthRow, PlanParameters, Projection, StepType, Totals, YearRow,
};

pub const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

#[derive(Debug, Clone, Copy)]
struct MonthFlow {
    start_balance: f64,
    interest: f64,
    end_balance: f64,
}

pub fn run_projection(params: &PlanParameters) -> Projection {
    let schedule = build_schedule(params);
    let yearly = aggregate_years(&schedule, params.years);
    let totals = totals(&schedule);
    let chart = chart_series(&schedule);

    Projection {
        schedule,
        yearly,
        totals,
        chart,
    }
}

/// One row per month for `years * 12` months.
///
/// `params.years` must already be bounded by the caller (see [`MAX_YEARS`](super::MAX_YEARS));
/// the row buffer is allocated up front and month numbers are used as `i32`
/// exponents, so unbounded horizons are not supported.
pub fn build_schedule(params: &PlanParameters) -> Vec<MonthRow> {
    let total_months = params.total_months();
    let monthly_rate = params.monthly_return_rate();
    let monthly_inflation = params.monthly_inflation_rate();
    let step_interval = params.step_interval_months.max(1);

    let mut rows = Vec::with_capacity(total_months as usize);
    let mut prev_end = 0.0;
    for month in 1..=total_months {
        let steps = (month - 1) / step_interval;
        let contribution = stepped_contribution(params, steps);
        let flow = accrue_month(params.timing, prev_end, contribution, monthly_rate);
        let inflation_index = (1.0 + monthly_inflation).powi(month as i32);

        rows.push(MonthRow {
            month,
            year: year_of_month(month),
            month_label: MONTH_LABELS[((month - 1) % 12) as usize],
            contribution,
            start_balance: flow.start_balance,
            interest: flow.interest,
            end_balance: flow.end_balance,
            inflation_index,
            end_balance_real: flow.end_balance / inflation_index,
        });
        prev_end = flow.end_balance;
    }
    rows
}

/// Rolls monthly rows into one row per plan year, grouped by each row's
/// `year` field. Years with no rows carry the previous balance forward as the
/// start and report zeros for everything else.
///
/// `years` is expected to be bounded like [`build_schedule`]'s horizon; one
/// bucket is allocated per year.
pub fn aggregate_years(schedule: &[MonthRow], years: u32) -> Vec<YearRow> {
    let mut groups: Vec<Vec<&MonthRow>> = (0..years).map(|_| Vec::with_capacity(12)).collect();
    for row in schedule {
        if (1..=years).contains(&row.year) {
            groups[(row.year - 1) as usize].push(row);
        }
    }

    let mut out = Vec::with_capacity(groups.len());
    let mut carried_balance = 0.0;
    for (idx, rows) in groups.into_iter().enumerate() {
        let start_balance = carried_balance;
        let contribution = rows.iter().map(|r| r.contribution).sum::<f64>();
        let first = rows.first();
        let last = rows.last();
        let end_balance = last.map_or(0.0, |r| r.end_balance);

        out.push(YearRow {
            year: idx as u32 + 1,
            start_balance,
            contribution,
            end_balance,
            return_earned: end_balance - start_balance - contribution,
            start_contribution: first.map_or(0.0, |r| r.contribution),
            end_contribution: last.map_or(0.0, |r| r.contribution),
            end_balance_real: last.map_or(0.0, |r| r.end_balance_real),
        });
        carried_balance = end_balance;
    }
    out
}

pub fn totals(schedule: &[MonthRow]) -> Totals {
    let total_contributed = schedule.iter().map(|r| r.contribution).sum::<f64>();
    let Some(last) = schedule.last() else {
        return Totals::default();
    };

    Totals {
        total_contributed,
        final_nominal: last.end_balance,
        final_real: last.end_balance_real,
        gain: last.end_balance - total_contributed,
    }
}

pub fn chart_series(schedule: &[MonthRow]) -> Vec<ChartPoint> {
    schedule
        .iter()
        .map(|r| ChartPoint {
            label: format!("Y{}-{}", r.year, r.month_label),
            nominal_end_balance: r.end_balance.round(),
            real_end_balance: r.end_balance_real.round(),
        })
        .collect()
}

fn year_of_month(month: u32) -> u32 {
    (month - 1) / 12 + 1
}

fn stepped_contribution(params: &PlanParameters, steps: u32) -> f64 {
    match params.step_type {
        StepType::Percent => {
            params.start_contribution * (1.0 + params.step_value / 100.0).powi(steps as i32)
        }
        StepType::Fixed => params.start_contribution + params.step_value * steps as f64,
    }
}

fn accrue_month(
    timing: ContributionTiming,
    prev_end: f64,
    contribution: f64,
    monthly_rate: f64,
) -> MonthFlow {
    match timing {
        ContributionTiming::EndOfMonth => {
            let start_balance = prev_end;
            let interest = start_balance * monthly_rate;
            MonthFlow {
                start_balance,
                interest,
                end_balance: start_balance + interest + contribution,
            }
        }
        ContributionTiming::StartOfMonth => {
            let start_balance = prev_end + contribution;
            let interest = start_balance * monthly_rate;
            MonthFlow {
                start_balance,
                interest,
                end_balance: start_balance + interest,
            }
        }
    }
}
