//! Reporting and export: CSV, JSON, and plain-text tables.
//!
//! - **CSV**: unified records with KPIs, and aggregate summary rows
//! - **JSON**: the same data, full KPI precision, money as exact decimal strings
//! - **Text**: aligned tables and headline/insight reports for the terminal
//!
//! Unavailable KPIs are an empty CSV cell, `null` in JSON and `n/a` in text.

use std::path::Path;

use adlens_core::kpi::{Kpis, MeasuredRecord};
use anyhow::{bail, Context, Result};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::aggregate::{Dimension, GroupBy, SummaryRow};
use crate::headline::Headline;
use crate::insights::Insights;

const KPI_COLUMNS: [&str; 5] = ["ctr", "cpc", "cpa", "roas", "cpm"];

// ─── JSON export ────────────────────────────────────────────────────

pub fn records_json(records: &[MeasuredRecord]) -> Result<String> {
    serde_json::to_string_pretty(records).context("failed to serialize records to JSON")
}

pub fn summary_json(rows: &[SummaryRow]) -> Result<String> {
    serde_json::to_string_pretty(rows).context("failed to serialize summary rows to JSON")
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Unified dataset with KPIs, one row per record.
pub fn records_csv(records: &[MeasuredRecord]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    let mut header = vec![
        "platform",
        "date",
        "campaign_id",
        "campaign_name",
        "subgroup_id",
        "subgroup_name",
        "impressions",
        "clicks",
        "conversions",
        "cost",
        "conversion_value",
    ];
    header.extend(KPI_COLUMNS);
    header.extend([
        "video_views",
        "engagement_rate",
        "reach",
        "frequency",
        "quality_score",
        "video_completion_rate",
        "social_engagement",
    ]);
    wtr.write_record(&header)?;

    for m in records {
        let r = &m.record;
        let x = &r.extras;
        let mut row = vec![
            r.platform.to_string(),
            r.date.to_string(),
            r.campaign_id.clone(),
            r.campaign_name.clone(),
            r.subgroup_id.clone(),
            r.subgroup_name.clone(),
            r.impressions.to_string(),
            r.clicks.to_string(),
            r.conversions.to_string(),
            r.cost.to_string(),
            r.conversion_value.to_string(),
        ];
        row.extend(kpi_cells(&m.kpis));
        row.extend([
            opt_cell(x.video_views),
            opt_cell(x.engagement_rate),
            opt_cell(x.reach),
            opt_cell(x.frequency),
            opt_cell(x.quality_score),
            opt_cell(x.video_completion_rate),
            opt_cell(x.social_engagement),
        ]);
        wtr.write_record(&row)?;
    }

    finish(wtr)
}

/// Aggregate rows; key columns are the dimensions that were grouped on.
pub fn summary_csv(rows: &[SummaryRow], group_by: &GroupBy) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    let mut header = key_headers(group_by);
    header.extend([
        "impressions",
        "clicks",
        "conversions",
        "cost",
        "conversion_value",
        "records",
    ]);
    header.extend(KPI_COLUMNS);
    wtr.write_record(&header)?;

    for row in rows {
        let mut cells = key_cells(row, group_by);
        let t = &row.totals;
        cells.extend([
            t.impressions.to_string(),
            t.clicks.to_string(),
            t.conversions.to_string(),
            t.cost.to_string(),
            t.conversion_value.to_string(),
            t.rows.to_string(),
        ]);
        cells.extend(kpi_cells(&row.kpis));
        wtr.write_record(&cells)?;
    }

    finish(wtr)
}

/// Write the unified dataset to `path`; format follows the extension.
pub fn write_records(path: &Path, records: &[MeasuredRecord]) -> Result<()> {
    let body = match path.extension().and_then(|e| e.to_str()) {
        Some("csv") => records_csv(records)?,
        Some("json") => records_json(records)?,
        _ => bail!(
            "cannot infer export format from {} (use .csv or .json)",
            path.display()
        ),
    };
    std::fs::write(path, body).with_context(|| format!("failed to write {}", path.display()))
}

fn finish(wtr: csv::Writer<Vec<u8>>) -> Result<String> {
    let bytes = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(bytes).context("CSV output is not UTF-8")
}

fn kpi_cells(k: &Kpis) -> [String; 5] {
    [k.ctr(), k.cpc(), k.cpa(), k.roas(), k.cpm()]
        .map(|v| v.map(|v| format!("{v:.2}")).unwrap_or_default())
}

fn opt_cell<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn key_headers(group_by: &GroupBy) -> Vec<&'static str> {
    let mut headers = Vec::new();
    if group_by.keys_platform() {
        headers.push("platform");
    }
    if group_by.contains(Dimension::Campaign) {
        headers.push("campaign_name");
    }
    if group_by.contains(Dimension::Subgroup) {
        headers.extend(["subgroup_id", "subgroup_name"]);
    }
    if group_by.contains(Dimension::Date) {
        headers.push("date");
    }
    headers
}

fn key_cells(row: &SummaryRow, group_by: &GroupBy) -> Vec<String> {
    let k = &row.key;
    let mut cells = Vec::new();
    if group_by.keys_platform() {
        cells.push(opt_cell(k.platform));
    }
    if group_by.contains(Dimension::Campaign) {
        cells.push(k.campaign_name.clone().unwrap_or_default());
    }
    if group_by.contains(Dimension::Subgroup) {
        cells.push(k.subgroup_id.clone().unwrap_or_default());
        cells.push(row.subgroup_name.clone().unwrap_or_default());
    }
    if group_by.contains(Dimension::Date) {
        cells.push(opt_cell(k.date));
    }
    cells
}

// ─── Text reports ───────────────────────────────────────────────────

/// Aligned plain-text table of summary rows.
pub fn summary_table(rows: &[SummaryRow], group_by: &GroupBy) -> String {
    let mut header: Vec<&str> = key_headers(group_by);
    let key_width = header.len();
    header.extend([
        "spend",
        "impressions",
        "clicks",
        "conversions",
        "conv_value",
    ]);
    header.extend(KPI_COLUMNS);

    let body: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            let t = &row.totals;
            let k = &row.kpis;
            let mut cells = key_cells(row, group_by);
            cells.extend([
                money(t.cost),
                thousands(t.impressions),
                thousands(t.clicks),
                thousands(t.conversions),
                money(t.conversion_value),
                kpi(k.ctr()),
                kpi(k.cpc()),
                kpi(k.cpa()),
                kpi(k.roas()),
                kpi(k.cpm()),
            ]);
            cells
        })
        .collect();

    if body.is_empty() {
        return "(no rows)\n".to_string();
    }
    render_table(&header, &body, key_width)
}

pub fn headline_report(headline: &Headline) -> String {
    let mut out = String::with_capacity(256);
    out.push_str(&format!("Spend            ${}\n", money(headline.spend)));
    out.push_str(&format!(
        "Impressions      {}\n",
        thousands(headline.impressions)
    ));
    out.push_str(&format!("Clicks           {}\n", thousands(headline.clicks)));
    out.push_str(&format!(
        "Conversions      {}\n",
        thousands(headline.conversions)
    ));
    out.push_str(&format!(
        "Conversion value ${}\n",
        money(headline.conversion_value)
    ));
    out.push_str(&format!("ROAS             {}\n", pct(headline.roas)));
    out
}

pub fn insights_report(insights: &Insights) -> String {
    if insights.is_empty() {
        return "No data in the selected view.\n".to_string();
    }

    let mut out = String::with_capacity(512);
    if let Some(best) = &insights.best_roas_platform {
        out.push_str(&format!(
            "Best ROAS platform: {} delivers {:.1}% ROAS with ${} in conversion value from ${} spend.\n",
            best.platform,
            best.roas,
            whole_money(best.conversion_value),
            whole_money(best.cost),
        ));
    }
    if let Some(leader) = &insights.most_conversions {
        out.push_str(&format!(
            "Most conversions: {} generated {} conversions, {} of all conversions.\n",
            leader.platform,
            thousands(leader.conversions),
            leader
                .share
                .map(|s| format!("{s:.1}%"))
                .unwrap_or_else(|| "n/a".to_string()),
        ));
    }
    if let Some(top) = &insights.top_campaign {
        out.push_str(&format!(
            "Top campaign: {} on {} achieved {:.1}% ROAS with {} conversions.\n",
            top.campaign_name,
            top.platform,
            top.roas,
            thousands(top.conversions),
        ));
    }
    out
}

fn render_table(header: &[&str], body: &[Vec<String>], left_aligned: usize) -> String {
    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for row in body {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let mut out = render_line(header.iter().copied(), &widths, left_aligned);
    let rule: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    out.push_str(&render_line(rule.iter().map(String::as_str), &widths, left_aligned));
    for row in body {
        out.push_str(&render_line(row.iter().map(String::as_str), &widths, left_aligned));
    }
    out
}

fn render_line<'a>(
    cells: impl Iterator<Item = &'a str>,
    widths: &[usize],
    left_aligned: usize,
) -> String {
    let parts: Vec<String> = cells
        .zip(widths)
        .enumerate()
        .map(|(i, (cell, &w))| {
            if i < left_aligned {
                format!("{cell:<w$}")
            } else {
                format!("{cell:>w$}")
            }
        })
        .collect();
    let mut line = parts.join("  ").trim_end().to_string();
    line.push('\n');
    line
}

fn kpi(value: Option<f64>) -> String {
    value
        .map(|v| format!("{v:.2}"))
        .unwrap_or_else(|| "n/a".to_string())
}

fn pct(value: Option<f64>) -> String {
    value
        .map(|v| format!("{v:.1}%"))
        .unwrap_or_else(|| "n/a".to_string())
}

fn money(value: Decimal) -> String {
    let rounded = value.round_dp(2);
    let whole = rounded.abs().trunc();
    let cents = ((rounded.abs() - whole) * Decimal::from(100))
        .to_u32()
        .unwrap_or_default();
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{sign}{}.{cents:02}", group_digits(&whole.to_string()))
}

fn whole_money(value: Decimal) -> String {
    group_digits(&value.round().abs().to_string())
}

fn thousands(value: u64) -> String {
    group_digits(&value.to_string())
}

fn group_digits(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
