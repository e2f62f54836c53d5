// Plain-text report rendering.
//
// Every function here is pure: it takes engine output and returns the text
// to print, so the layout can be tested without a terminal.

use std::collections::BTreeMap;

use rax_core::model::{month_name, pass_level_label, Fighter, MAX_PASS_LEVEL, MIN_PASS_LEVEL};
use rax_core::tiers::TierTable;
use rax_core::valuation::annual::{LeaderboardRow, Valuation};
use rax_core::valuation::normalize::{monthly_totals, normalize};
use rax_core::valuation::TeamReport;

const BAR_WIDTH: usize = 20;

// ---------------------------------------------------------------------------
// Formatting helpers
// ---------------------------------------------------------------------------

/// Round to a whole number and group thousands: `12345.6` -> `"12,346"`.
pub fn format_value(value: f64) -> String {
    let rounded = value.round();
    let digits = format!("{}", rounded.abs() as u64);
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if rounded < 0.0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Tier label for a multiplier, or the bare multiplier when it is not in
/// the table.
pub fn tier_label(tiers: &TierTable, multiplier: f64) -> String {
    match tiers.find(multiplier) {
        Some(tier) => format!("{} ({}x)", tier.label, tier.multiplier),
        None => format!("{multiplier}x"),
    }
}

fn status(active: bool) -> &'static str {
    if active {
        "active"
    } else {
        "retired"
    }
}

fn bar(count: u32, max: u32) -> String {
    if max == 0 {
        return String::new();
    }
    let len = ((count as f64 / max as f64) * BAR_WIDTH as f64).round() as usize;
    "#".repeat(len.max(usize::from(count > 0)))
}

/// Join rendered lines, ending with a newline.
fn finish(lines: Vec<String>) -> String {
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

// ---------------------------------------------------------------------------
// Leaderboard
// ---------------------------------------------------------------------------

/// Render leaderboard rows, optionally filtered by a name query. Ranks come
/// from the unfiltered list.
pub fn render_leaderboard(rows: &[LeaderboardRow], search: Option<&str>, limit: usize) -> String {
    let needle = search.map(|q| q.trim().to_lowercase());
    let shown: Vec<&LeaderboardRow> = rows
        .iter()
        .filter(|r| {
            needle
                .as_deref()
                .map_or(true, |q| r.name.to_lowercase().contains(q))
        })
        .take(limit)
        .collect();

    let mut lines = vec![format!(
        "{:>5}  {:<28} {:<8} {:>12}",
        "Rank", "Fighter", "Status", "Rax"
    )];
    lines.extend(shown.iter().map(|row| {
        format!(
            "{:>5}  {:<28} {:<8} {:>12}",
            row.rank,
            row.name,
            status(row.active),
            format_value(row.display_value)
        )
    }));
    if shown.is_empty() {
        lines.push("  (no fighters match)".to_string());
    }
    finish(lines)
}

// ---------------------------------------------------------------------------
// Fighter detail
// ---------------------------------------------------------------------------

fn cap_text(valuation: &Valuation) -> String {
    let cap = valuation
        .cap
        .map(format_value)
        .unwrap_or_else(|| "none".to_string());
    let capped = if valuation.capped() { ", capped" } else { "" };
    format!("{} (cap {cap}{capped})", format_value(valuation.raw_total))
}

pub fn render_fighter(fighter: &Fighter, valuation: &Valuation, tiers: &TierTable) -> String {
    let mut lines = vec![
        fighter.name.clone(),
        format!("  status:        {}", status(fighter.active)),
    ];
    if let Some(age) = fighter.age_years {
        lines.push(format!("  age:           {age:.0}"));
    }
    if let Some(last) = fighter.last_event() {
        lines.push(format!("  last event:    {last}"));
    }
    lines.push(format!("  owned passes:  {}", fighter.owned_passes));
    lines.push(format!("  tier:          {}", tier_label(tiers, valuation.multiplier)));
    lines.push(format!("  annual rax:    {}", format_value(valuation.value)));
    lines.push(format!("  raw total:     {}", cap_text(valuation)));

    let months = monthly_totals(&normalize(&fighter.scores, valuation.multiplier));
    if !months.is_empty() {
        lines.push(String::new());
        lines.push("  Monthly".to_string());
        lines.extend(
            months
                .into_iter()
                .map(|(month, total)| format!("    {:<10} {:>10}", month_name(month), format_value(total))),
        );
    }

    let dist = &fighter.pass_distribution;
    if !dist.is_empty() {
        lines.push(String::new());
        lines.push("  Pass distribution".to_string());
        let max = dist.max_count();
        lines.extend((MIN_PASS_LEVEL..=MAX_PASS_LEVEL).rev().map(|level| {
            let count = dist.count(level);
            format!(
                "    {:<10} {:>6}  {}",
                pass_level_label(level),
                count,
                bar(count, max)
            )
        }));
    }
    finish(lines)
}

// ---------------------------------------------------------------------------
// Comparison
// ---------------------------------------------------------------------------

/// Two fighters side by side: headline values, then monthly totals for every
/// month either fighter scored in, with the left-minus-right difference.
pub fn render_compare(
    left: (&Fighter, &Valuation),
    right: (&Fighter, &Valuation),
    tiers: &TierTable,
) -> String {
    let (lf, lv) = left;
    let (rf, rv) = right;
    let row = |label: &str, l: String, r: String| format!("  {label:<14} {l:>20} {r:>20}");

    let mut lines = vec![
        row("", lf.name.clone(), rf.name.clone()),
        row("status", status(lf.active).into(), status(rf.active).into()),
        row(
            "tier",
            tier_label(tiers, lv.multiplier),
            tier_label(tiers, rv.multiplier),
        ),
        row("owned passes", lf.owned_passes.to_string(), rf.owned_passes.to_string()),
        row("annual rax", format_value(lv.value), format_value(rv.value)),
        row("raw total", format_value(lv.raw_total), format_value(rv.raw_total)),
    ];

    // month -> (left, right)
    let mut months: BTreeMap<u8, (f64, f64)> = BTreeMap::new();
    for (month, total) in monthly_totals(&normalize(&lf.scores, lv.multiplier)) {
        months.entry(month).or_default().0 = total;
    }
    for (month, total) in monthly_totals(&normalize(&rf.scores, rv.multiplier)) {
        months.entry(month).or_default().1 = total;
    }

    if !months.is_empty() {
        lines.push(String::new());
        lines.push(format!(
            "  {:<14} {:>20} {:>20} {:>10}",
            "Monthly", "", "", "diff"
        ));
        lines.extend(months.into_iter().map(|(month, (l, r))| {
            format!(
                "  {:<14} {:>20} {:>20} {:>10}",
                month_name(month),
                format_value(l),
                format_value(r),
                format_value(l - r)
            )
        }));
    }
    finish(lines)
}

// ---------------------------------------------------------------------------
// Team
// ---------------------------------------------------------------------------

pub fn render_team(report: &TeamReport, tiers: &TierTable, daily: bool) -> String {
    let mut lines = vec![format!(
        "{:<28} {:<18} {:>10} {:>10} {:>10}",
        "Fighter", "Tier", "Annual", "Adjusted", "Lost"
    )];
    lines.extend(report.valuations.iter().zip(&report.adjusted).map(|(valuation, adjusted)| {
        format!(
            "{:<28} {:<18} {:>10} {:>10} {:>10}",
            valuation.name,
            tier_label(tiers, valuation.multiplier),
            format_value(valuation.value),
            format_value(adjusted.adjusted_value),
            format_value(adjusted.lost_value)
        )
    }));
    lines.push(String::new());
    lines.push(format!("Total: {}", format_value(report.aggregate.total)));
    lines.push(String::new());

    if report.conflicts.is_empty() {
        lines.push("No conflicts.".to_string());
    } else {
        lines.push(format!("Conflicts ({})", report.conflicts.len()));
        lines.extend(report.conflicts.iter().map(|conflict| {
            let losers: Vec<String> = conflict
                .losers()
                .iter()
                .map(|c| format!("{} ({})", c.name, format_value(c.value)))
                .collect();
            format!(
                "  {}  {} claims, lost {}: {}",
                conflict.month_day,
                conflict.ranked_claims.len(),
                format_value(conflict.lost_value),
                losers.join(", ")
            )
        }));
    }
    lines.push(String::new());

    if daily {
        lines.push("Daily".to_string());
        lines.extend(report.aggregate.by_day.iter().map(|day| {
            let names: Vec<&str> = day.fighters.iter().map(|s| s.name.as_str()).collect();
            format!(
                "  {}  {:>10}  {}",
                day.month_day,
                format_value(day.total),
                names.join(", ")
            )
        }));
    } else {
        lines.push("Monthly".to_string());
        lines.extend(report.aggregate.by_month.iter().map(|month| {
            let top = month.fighters.first().map(|s| s.name.as_str()).unwrap_or("");
            format!(
                "  {:<10} {:>10}  top: {}",
                month_name(month.month),
                format_value(month.total),
                top
            )
        }));
    }

    if !report.recommendations.is_empty() {
        lines.push(String::new());
        lines.push("Recommendations".to_string());
        lines.extend(report.recommendations.iter().enumerate().map(|(i, rec)| {
            let scarcity = rec
                .scarcity_score
                .map(format_value)
                .unwrap_or_else(|| "-".to_string());
            format!(
                "  {:>2}. {:<28} {:>10}  lost {:>8}  scarcity {:>8}{}",
                i + 1,
                rec.name,
                format_value(rec.adjusted_value),
                format_value(rec.lost_value),
                scarcity,
                if rec.active { "" } else { "  (retired)" }
            )
        }));
    }
    finish(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rax_core::model::{PassDistribution, ScoreEvent};
    use rax_core::selection::{MultiplierChoices, Selection};
    use rax_core::valuation::annual::{leaderboard, value_fighter};
    use std::collections::HashSet;

    fn fighter(name: &str, base_value: f64, scores: &[(&str, f64)]) -> Fighter {
        Fighter {
            name: name.into(),
            base_value,
            scores: scores
                .iter()
                .map(|(d, v)| ScoreEvent::new(NaiveDate::parse_from_str(d, "%Y-%m-%d").unwrap(), *v))
                .collect(),
            active: true,
            owned_passes: 9,
            id: None,
            pass_distribution: PassDistribution::default(),
            age_years: None,
        }
    }

    fn test_config() -> rax_core::config::Config {
        rax_core::config::Config {
            policy: rax_core::config::Policy::default(),
            tiers: TierTable::default(),
            data_paths: rax_core::config::DataPaths {
                roster: "data/processed_fighters.json".into(),
                fighter_values: None,
                fight_history: None,
                owned_passes: None,
            },
            active_overrides: Default::default(),
        }
    }

    #[test]
    fn format_value_groups_thousands() {
        assert_eq!(format_value(0.0), "0");
        assert_eq!(format_value(999.4), "999");
        assert_eq!(format_value(1000.0), "1,000");
        assert_eq!(format_value(1234567.8), "1,234,568");
        assert_eq!(format_value(-4200.0), "-4,200");
    }

    #[test]
    fn tier_label_falls_back_to_multiplier() {
        let tiers = TierTable::default();
        assert_eq!(tier_label(&tiers, 1.6), "Rare (1.6x)");
        assert_eq!(tier_label(&tiers, 1.3), "1.3x");
    }

    #[test]
    fn leaderboard_filter_keeps_ranks() {
        let roster = vec![
            fighter("Alpha", 300.0, &[]),
            fighter("Bravo", 200.0, &[]),
            fighter("Charlie", 100.0, &[]),
        ];
        let rows = leaderboard(&roster, &MultiplierChoices::new(1.2));
        let text = render_leaderboard(&rows, Some("char"), 10);
        assert!(text.contains("Charlie"));
        assert!(!text.contains("Alpha"));
        assert!(text.lines().nth(1).unwrap().trim_start().starts_with('3'));
        assert!(text.ends_with('\n'));

        let none = render_leaderboard(&rows, Some("zzz"), 10);
        assert!(none.contains("no fighters match"));
    }

    #[test]
    fn fighter_detail_lists_months_and_passes() {
        let mut f = fighter("Alpha", 300.0, &[("2023-03-01", 100.0), ("2024-07-04", 50.0)]);
        let mut counts = BTreeMap::new();
        counts.insert(3, 10);
        counts.insert(7, 1);
        f.pass_distribution = PassDistribution::new(counts);

        let tiers = TierTable::default();
        let valuation = value_fighter(&f, 1.2, &tiers);
        let text = render_fighter(&f, &valuation, &tiers);
        assert!(text.contains("annual rax:    180"));
        assert!(text.contains("raw total:     180 (cap 1,500)"));
        assert!(text.contains("March"));
        assert!(text.contains("July"));
        assert!(text.contains("Iconic"));
        assert!(text.contains("Common (1.2x)"));
    }

    #[test]
    fn compare_lists_union_of_months_with_difference() {
        let left = fighter("Alpha", 0.0, &[("2023-03-01", 100.0), ("2024-03-01", 150.0)]);
        let right = fighter("Bravo", 0.0, &[("2022-03-10", 50.0), ("2022-08-01", 40.0)]);
        let tiers = TierTable::default();
        let lv = value_fighter(&left, 1.2, &tiers);
        let rv = value_fighter(&right, 2.0, &tiers);

        let text = render_compare((&left, &lv), (&right, &rv), &tiers);
        assert!(text.lines().next().unwrap().contains("Alpha"));
        assert!(text.lines().next().unwrap().contains("Bravo"));
        assert!(text.contains("Epic (2x)"));

        // March: 180 vs 100; August only on the right.
        let march = text.lines().find(|l| l.contains("March")).unwrap();
        let cols: Vec<&str> = march.split_whitespace().collect();
        assert_eq!(cols, vec!["March", "180", "100", "80"]);
        let august = text.lines().find(|l| l.contains("August")).unwrap();
        let cols: Vec<&str> = august.split_whitespace().collect();
        assert_eq!(cols, vec!["August", "0", "80", "-80"]);
        assert!(!text.contains("July"));
    }

    #[test]
    fn compare_without_history_has_no_monthly_block() {
        let left = fighter("Alpha", 0.0, &[]);
        let right = fighter("Bravo", 0.0, &[]);
        let tiers = TierTable::default();
        let lv = value_fighter(&left, 1.2, &tiers);
        let rv = value_fighter(&right, 1.2, &tiers);
        let text = render_compare((&left, &lv), (&right, &rv), &tiers);
        assert!(!text.contains("Monthly"));
    }

    #[test]
    fn team_report_shows_conflicts_and_recommendations() {
        let roster = vec![
            fighter("Top", 0.0, &[("2021-05-10", 300.0)]),
            fighter("Mid", 0.0, &[("2022-05-10", 250.0)]),
            fighter("Low", 0.0, &[("2023-05-10", 200.0)]),
            fighter("Bench", 0.0, &[("2023-06-01", 10.0)]),
        ];
        let mut selection = Selection::new(15);
        for f in &roster[..3] {
            selection.add(f.clone()).unwrap();
        }
        let mut config = test_config();
        config.policy.max_concurrent_claims = 2;
        let choices = MultiplierChoices::new(1.2);

        let report = rax_core::valuation::evaluate_team(
            &roster,
            &selection,
            &choices,
            &HashSet::new(),
            &config,
        );
        let text = render_team(&report, &config.tiers, false);
        assert!(text.contains("Conflicts (1)"));
        assert!(text.contains("05-10"));
        assert!(text.contains("Low (240)"));
        assert!(text.contains("May"));
        assert!(text.contains("Bench"));

        let daily = render_team(&report, &config.tiers, true);
        assert!(daily.contains("Daily"));
        assert!(daily.contains("Top, Mid"));
    }
}
