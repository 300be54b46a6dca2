//! Presentation layer
//!
//! Renders immutable snapshots into a [`DisplaySurface`]. Surfaces may carry
//! only a subset of fields; writes to absent fields are skipped.

mod memory;
mod terminal;

pub use memory::MemorySurface;
pub use terminal::TerminalSurface;

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::app::UserPosition;
use crate::stats::{DemoValues, StatsSnapshot};

/// Share of TVL shown as the 24h volume estimate
const VOLUME_TVL_SHARE: f64 = 0.1;
/// Transactions per staker in the 24h estimate
const TXS_PER_STAKER: f64 = 3.6;

/// Named output fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayField {
    UsdtRubRate,
    RateChange,
    ArubPrice,
    TotalBought,
    TotalStakedUsdt,
    TotalStakedArub,
    TotalTvl,
    TotalSupply,
    StakersCount,
    CurrentApy,
    MarketCap,
    Volume24h,
    Transactions24h,
    UniqueWallets,
    LastUpdate,
    UserStaked,
    UserRewards,
}

impl DisplayField {
    /// Public statistics fields, in display order
    pub const STATISTICS: [DisplayField; 15] = [
        DisplayField::UsdtRubRate,
        DisplayField::RateChange,
        DisplayField::ArubPrice,
        DisplayField::TotalBought,
        DisplayField::TotalStakedUsdt,
        DisplayField::TotalStakedArub,
        DisplayField::TotalTvl,
        DisplayField::TotalSupply,
        DisplayField::StakersCount,
        DisplayField::CurrentApy,
        DisplayField::MarketCap,
        DisplayField::Volume24h,
        DisplayField::Transactions24h,
        DisplayField::UniqueWallets,
        DisplayField::LastUpdate,
    ];

    /// Per-account fields
    pub const POSITION: [DisplayField; 2] = [DisplayField::UserStaked, DisplayField::UserRewards];

    /// Stable identifier, used as the JSON key
    pub fn id(&self) -> &'static str {
        match self {
            DisplayField::UsdtRubRate => "usdt_rub_rate",
            DisplayField::RateChange => "rate_change",
            DisplayField::ArubPrice => "arub_price",
            DisplayField::TotalBought => "total_bought",
            DisplayField::TotalStakedUsdt => "total_staked_usdt",
            DisplayField::TotalStakedArub => "total_staked_arub",
            DisplayField::TotalTvl => "total_tvl",
            DisplayField::TotalSupply => "total_supply",
            DisplayField::StakersCount => "stakers_count",
            DisplayField::CurrentApy => "current_apy",
            DisplayField::MarketCap => "market_cap",
            DisplayField::Volume24h => "volume_24h",
            DisplayField::Transactions24h => "transactions_24h",
            DisplayField::UniqueWallets => "unique_wallets",
            DisplayField::LastUpdate => "last_update",
            DisplayField::UserStaked => "user_staked",
            DisplayField::UserRewards => "user_rewards",
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            DisplayField::UsdtRubRate => "USDT/RUB",
            DisplayField::RateChange => "Rate change",
            DisplayField::ArubPrice => "ARUB price",
            DisplayField::TotalBought => "Total bought",
            DisplayField::TotalStakedUsdt => "Staked USDT",
            DisplayField::TotalStakedArub => "Staked ARUB",
            DisplayField::TotalTvl => "TVL",
            DisplayField::TotalSupply => "Total supply",
            DisplayField::StakersCount => "Stakers",
            DisplayField::CurrentApy => "APY",
            DisplayField::MarketCap => "Market cap",
            DisplayField::Volume24h => "Volume 24h",
            DisplayField::Transactions24h => "Transactions 24h",
            DisplayField::UniqueWallets => "Wallets",
            DisplayField::LastUpdate => "Updated",
            DisplayField::UserStaked => "Your stake",
            DisplayField::UserRewards => "Est. rewards",
        }
    }
}

/// A set of named output fields
pub trait DisplaySurface {
    /// Write a field. Returns `false` when the surface has no such field.
    fn set(&mut self, field: DisplayField, text: String) -> bool;

    /// Push pending writes to the output
    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Render a live snapshot. Returns the number of fields written.
pub fn render_snapshot(
    surface: &mut dyn DisplaySurface,
    snapshot: &StatsSnapshot,
    rate: f64,
    rate_change: f64,
    now: DateTime<Local>,
) -> usize {
    use DisplayField::*;

    let volume = snapshot.tvl * VOLUME_TVL_SHARE;
    let transactions = (snapshot.stakers_count as f64 * TXS_PER_STAKER).floor() as u64;

    let fields = [
        (UsdtRubRate, format!("{:.2}", rate)),
        (RateChange, format_change(rate_change)),
        (ArubPrice, format_usd(snapshot.current_price)),
        (TotalBought, format_amount(snapshot.total_bought)),
        (TotalStakedUsdt, format_amount(snapshot.total_staked_stable)),
        (TotalStakedArub, format_amount(snapshot.total_staked_token)),
        (TotalTvl, format_usd_whole(snapshot.tvl)),
        (TotalSupply, format_amount(snapshot.total_supply)),
        (StakersCount, snapshot.stakers_count.to_string()),
        (CurrentApy, format!("{}%", snapshot.current_apy)),
        (MarketCap, format_usd_whole(snapshot.market_cap)),
        (Volume24h, format_usd_whole(volume)),
        (Transactions24h, transactions.to_string()),
        (UniqueWallets, snapshot.stakers_count.to_string()),
        (LastUpdate, now.format("%H:%M:%S").to_string()),
    ];

    write_all(surface, fields)
}

/// Render the demo table, marking the timestamp as demo data
pub fn render_demo(surface: &mut dyn DisplaySurface, demo: &DemoValues, now: DateTime<Local>) -> usize {
    let mut fields: Vec<_> = demo.table().into_iter().collect();
    fields.push((
        DisplayField::LastUpdate,
        format!("{} (DEMO)", now.format("%H:%M:%S")),
    ));
    write_all(surface, fields)
}

/// Render the connected account's position
pub fn render_position(surface: &mut dyn DisplaySurface, position: &UserPosition) -> usize {
    let fields = [
        (
            DisplayField::UserStaked,
            format!(
                "{:.2} USDT + {:.2} ARUB",
                position.stable_staked, position.token_staked
            ),
        ),
        (
            DisplayField::UserRewards,
            format!("{:.2} ARUB", position.estimated_rewards),
        ),
    ];
    write_all(surface, fields)
}

fn write_all(
    surface: &mut dyn DisplaySurface,
    fields: impl IntoIterator<Item = (DisplayField, String)>,
) -> usize {
    let mut written = 0;
    for (field, text) in fields {
        if surface.set(field, text) {
            written += 1;
        } else {
            tracing::trace!(field = field.id(), "Surface has no field, skipping");
        }
    }
    written
}

/// `$12.35`
pub fn format_usd(value: f64) -> String {
    format!("${:.2}", value)
}

/// `$1,250`
pub fn format_usd_whole(value: f64) -> String {
    format!("${}", group_thousands(&format!("{:.0}", value)))
}

/// Thousands-grouped amount with up to three decimals: `125,430.5`
pub fn format_amount(value: f64) -> String {
    let fixed = format!("{:.3}", value);
    let (whole, frac) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let frac = frac.trim_end_matches('0');
    if frac.is_empty() {
        group_thousands(whole)
    } else {
        format!("{}.{}", group_thousands(whole), frac)
    }
}

/// `↑ 2.34%` / `↓ 0.50%`
pub fn format_change(percent: f64) -> String {
    let arrow = if percent >= 0.0 { '↑' } else { '↓' };
    format!("{} {:.2}%", arrow, percent.abs())
}

fn group_thousands(digits: &str) -> String {
    let (sign, digits) = match digits.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", digits),
    };
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    format!("{}{}", sign, out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::ApyTiers;
    use chrono::TimeZone;

    fn noon() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 1, 12, 0, 5).unwrap()
    }

    #[test]
    fn number_formats() {
        assert_eq!(format_usd(99.5), "$99.50");
        assert_eq!(format_usd_whole(1_250.4), "$1,250");
        assert_eq!(format_usd_whole(99_500_000.0), "$99,500,000");
        assert_eq!(format_usd_whole(0.0), "$0");
        assert_eq!(format_amount(125_430.0), "125,430");
        assert_eq!(format_amount(1_234.5), "1,234.5");
        assert_eq!(format_amount(0.25), "0.25");
        assert_eq!(format_amount(999.0), "999");
        assert_eq!(format_change(2.34), "↑ 2.34%");
        assert_eq!(format_change(-0.5), "↓ 0.50%");
    }

    #[test]
    fn snapshot_renders_estimates() {
        let snapshot = StatsSnapshot::derive(1_000.0, 100.0, 500.0, 100.0, &ApyTiers::default());
        let mut surface = MemorySurface::new();

        let written = render_snapshot(&mut surface, &snapshot, 100.0, 0.0, noon());
        assert_eq!(written, DisplayField::STATISTICS.len());

        // tvl = 10_500, stakers = 28
        assert_eq!(surface.get(DisplayField::TotalTvl), Some("$10,500"));
        assert_eq!(surface.get(DisplayField::CurrentApy), Some("16%"));
        assert_eq!(surface.get(DisplayField::StakersCount), Some("28"));
        assert_eq!(surface.get(DisplayField::Volume24h), Some("$1,050"));
        assert_eq!(surface.get(DisplayField::Transactions24h), Some("100"));
        assert_eq!(surface.get(DisplayField::UniqueWallets), Some("28"));
        assert_eq!(surface.get(DisplayField::ArubPrice), Some("$100.00"));
        assert_eq!(surface.get(DisplayField::LastUpdate), Some("12:00:05"));
    }

    #[test]
    fn absent_fields_are_skipped() {
        let snapshot = StatsSnapshot::derive(1_000.0, 100.0, 0.0, 0.0, &ApyTiers::default());
        let mut surface =
            MemorySurface::with_fields([DisplayField::ArubPrice, DisplayField::TotalSupply]);

        let written = render_snapshot(&mut surface, &snapshot, 100.0, 0.0, noon());
        assert_eq!(written, 2);
        assert_eq!(surface.get(DisplayField::TotalSupply), Some("1,000"));
        assert_eq!(surface.get(DisplayField::TotalTvl), None);
    }

    #[test]
    fn demo_marks_timestamp() {
        let mut surface = MemorySurface::new();
        render_demo(&mut surface, &DemoValues::default(), noon());

        assert_eq!(surface.get(DisplayField::LastUpdate), Some("12:00:05 (DEMO)"));
        assert_eq!(surface.get(DisplayField::StakersCount), Some("3"));
    }

    #[test]
    fn position_text() {
        let position = UserPosition {
            stable_staked: 12.5,
            token_staked: 100.0,
            staked_at: 0,
            last_claim_at: 0,
            estimated_rewards: 8.0,
        };
        let mut surface = MemorySurface::new();
        render_position(&mut surface, &position);

        assert_eq!(
            surface.get(DisplayField::UserStaked),
            Some("12.50 USDT + 100.00 ARUB")
        );
        assert_eq!(surface.get(DisplayField::UserRewards), Some("8.00 ARUB"));
    }
}
