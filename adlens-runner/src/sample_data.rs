//! Synthetic platform exports for demos and tests.
//!
//! Each platform file is written in its native schema (Facebook without a
//! revenue column, Google with native conversion value, TikTok with video and
//! social columns). The RNG for each platform is seeded from BLAKE3 of the seed
//! string and platform, so output is byte-identical for identical inputs.

use adlens_core::domain::Platform;
use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::ops::Range;
use std::path::{Path, PathBuf};
use tracing::info;

struct Campaign {
    id: &'static str,
    name: &'static str,
    subgroups: &'static [(&'static str, &'static str)],
}

const FACEBOOK_CAMPAIGNS: &[Campaign] = &[
    Campaign {
        id: "FB_C001",
        name: "Spring Sale 2024",
        subgroups: &[("FB_AS001", "Lookalike 1%"), ("FB_AS002", "Interest - Fitness")],
    },
    Campaign {
        id: "FB_C002",
        name: "Retargeting - Cart",
        subgroups: &[("FB_AS003", "Cart Abandoners 7d")],
    },
];

const GOOGLE_CAMPAIGNS: &[Campaign] = &[
    Campaign {
        id: "GG_C001",
        name: "Brand Search",
        subgroups: &[("GG_AG001", "Exact Match"), ("GG_AG002", "Phrase Match")],
    },
    Campaign {
        id: "GG_C002",
        name: "Shopping - All Products",
        subgroups: &[("GG_AG003", "All Products")],
    },
];

const TIKTOK_CAMPAIGNS: &[Campaign] = &[
    Campaign {
        id: "TT_C001",
        name: "Creator Collab",
        subgroups: &[("TT_AG001", "Gen Z 18-24")],
    },
    Campaign {
        id: "TT_C002",
        name: "Spring Sale 2024",
        subgroups: &[("TT_AG002", "Broad 18-44")],
    },
];

/// What `generate_sample` wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleSummary {
    pub files: BTreeMap<Platform, PathBuf>,
    pub rows: BTreeMap<Platform, usize>,
}

/// Write all three platform exports into `out_dir` under their default names.
pub fn generate_sample(
    out_dir: &Path,
    start: NaiveDate,
    days: u32,
    seed: &str,
) -> Result<SampleSummary> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create {}", out_dir.display()))?;

    let mut files = BTreeMap::new();
    let mut rows = BTreeMap::new();
    for platform in Platform::ALL {
        let path = out_dir.join(platform.default_file_name());
        let mut rng = platform_rng(seed, platform);
        let body = match platform {
            Platform::Facebook => facebook_csv(&mut rng, start, days)?,
            Platform::Google => google_csv(&mut rng, start, days)?,
            Platform::TikTok => tiktok_csv(&mut rng, start, days)?,
        };
        std::fs::write(&path, &body.text)
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!(platform = %platform, rows = body.rows, path = %path.display(), "wrote sample export");
        files.insert(platform, path);
        rows.insert(platform, body.rows);
    }

    Ok(SampleSummary { files, rows })
}

fn platform_rng(seed: &str, platform: Platform) -> StdRng {
    let hash = blake3::hash(format!("{seed}:{}", platform.as_str()).as_bytes());
    StdRng::from_seed(*hash.as_bytes())
}

struct Body {
    text: String,
    rows: usize,
}

/// Traffic shared by every platform: impressions, clicks, cost, conversions.
struct Traffic {
    impressions: u64,
    clicks: u64,
    cost: Decimal,
    conversions: u64,
}

fn traffic(
    rng: &mut StdRng,
    impressions: Range<u64>,
    ctr: Range<f64>,
    cpc: Range<f64>,
) -> Traffic {
    let impressions = rng.gen_range(impressions);
    let clicks = (impressions as f64 * rng.gen_range(ctr)).round() as u64;
    let cost_cents = (clicks as f64 * rng.gen_range(cpc) * 100.0).round() as i64;
    let conversions = (clicks as f64 * rng.gen_range(0.02..0.10)).round() as u64;
    Traffic {
        impressions,
        clicks,
        cost: Decimal::new(cost_cents, 2),
        conversions,
    }
}

fn scaled(rng: &mut StdRng, base: u64, factor: Range<f64>) -> u64 {
    (base as f64 * rng.gen_range(factor)).round() as u64
}

fn each_row(
    start: NaiveDate,
    days: u32,
    campaigns: &[Campaign],
    mut row: impl FnMut(NaiveDate, &Campaign, &str, &str) -> Vec<String>,
) -> Vec<Vec<String>> {
    let mut out = Vec::new();
    for offset in 0..days {
        let date = start + Duration::days(i64::from(offset));
        for campaign in campaigns {
            for (sub_id, sub_name) in campaign.subgroups {
                out.push(row(date, campaign, sub_id, sub_name));
            }
        }
    }
    out
}

fn write_csv(header: &[&str], rows: Vec<Vec<String>>) -> Result<Body> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(header)?;
    let count = rows.len();
    for row in rows {
        wtr.write_record(&row)?;
    }
    let bytes = wtr.into_inner().context("failed to flush CSV writer")?;
    Ok(Body {
        text: String::from_utf8(bytes).context("CSV output is not UTF-8")?,
        rows: count,
    })
}

fn facebook_csv(rng: &mut StdRng, start: NaiveDate, days: u32) -> Result<Body> {
    let rows = each_row(start, days, FACEBOOK_CAMPAIGNS, |date, campaign, sub_id, sub_name| {
        let t = traffic(rng, 5_000..40_000, 0.008..0.030, 0.40..1.80);
        let frequency: f64 = rng.gen_range(1.05..2.20);
        vec![
            date.to_string(),
            campaign.id.to_string(),
            campaign.name.to_string(),
            sub_id.to_string(),
            sub_name.to_string(),
            t.impressions.to_string(),
            t.clicks.to_string(),
            t.cost.to_string(),
            t.conversions.to_string(),
            scaled(rng, t.impressions, 0.10..0.40).to_string(),
            format!("{:.4}", rng.gen_range(0.010..0.060)),
            ((t.impressions as f64 / frequency).round() as u64).to_string(),
            format!("{frequency:.2}"),
        ]
    });
    write_csv(
        &[
            "date",
            "campaign_id",
            "campaign_name",
            "ad_set_id",
            "ad_set_name",
            "impressions",
            "clicks",
            "spend",
            "conversions",
            "video_views",
            "engagement_rate",
            "reach",
            "frequency",
        ],
        rows,
    )
}

fn google_csv(rng: &mut StdRng, start: NaiveDate, days: u32) -> Result<Body> {
    let rows = each_row(start, days, GOOGLE_CAMPAIGNS, |date, campaign, sub_id, sub_name| {
        let t = traffic(rng, 1_000..15_000, 0.030..0.090, 0.80..3.50);
        let order_value_cents = rng.gen_range(4_000..12_000i64);
        let value = Decimal::new(order_value_cents * t.conversions as i64, 2);
        vec![
            date.to_string(),
            campaign.id.to_string(),
            campaign.name.to_string(),
            sub_id.to_string(),
            sub_name.to_string(),
            t.impressions.to_string(),
            t.clicks.to_string(),
            t.cost.to_string(),
            t.conversions.to_string(),
            value.to_string(),
            rng.gen_range(3..=10u8).to_string(),
        ]
    });
    write_csv(
        &[
            "date",
            "campaign_id",
            "campaign_name",
            "ad_group_id",
            "ad_group_name",
            "impressions",
            "clicks",
            "cost",
            "conversions",
            "conversion_value",
            "quality_score",
        ],
        rows,
    )
}

fn tiktok_csv(rng: &mut StdRng, start: NaiveDate, days: u32) -> Result<Body> {
    let rows = each_row(start, days, TIKTOK_CAMPAIGNS, |date, campaign, sub_id, sub_name| {
        let t = traffic(rng, 10_000..60_000, 0.005..0.020, 0.20..1.20);
        let views = scaled(rng, t.impressions, 0.30..0.70);
        let watch_25 = scaled(rng, views, 0.60..0.80);
        let watch_50 = scaled(rng, watch_25, 0.60..0.80);
        let watch_75 = scaled(rng, watch_50, 0.60..0.80);
        let watch_100 = scaled(rng, watch_75, 0.60..0.80);
        vec![
            date.to_string(),
            campaign.id.to_string(),
            campaign.name.to_string(),
            sub_id.to_string(),
            sub_name.to_string(),
            t.impressions.to_string(),
            t.clicks.to_string(),
            t.cost.to_string(),
            t.conversions.to_string(),
            views.to_string(),
            watch_25.to_string(),
            watch_50.to_string(),
            watch_75.to_string(),
            watch_100.to_string(),
            scaled(rng, views, 0.02..0.08).to_string(),
            scaled(rng, views, 0.002..0.010).to_string(),
            scaled(rng, views, 0.001..0.006).to_string(),
        ]
    });
    write_csv(
        &[
            "date",
            "campaign_id",
            "campaign_name",
            "adgroup_id",
            "adgroup_name",
            "impressions",
            "clicks",
            "cost",
            "conversions",
            "video_views",
            "video_watch_25",
            "video_watch_50",
            "video_watch_75",
            "video_watch_100",
            "likes",
            "shares",
            "comments",
        ],
        rows,
    )
}
