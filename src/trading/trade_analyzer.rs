use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::core::{round1, round2};
use crate::models::{StreakType, TradeDirection};
use crate::trading::trade_record::{ClosedTrade, TradeFilter};

pub const DEFAULT_HISTOGRAM_BUCKETS: usize = 10;

/// Per-group tally. Wire names follow the journal's `{trades, wins, pnl, win_rate}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BucketStats {
    #[serde(rename = "trades")]
    pub trade_count: usize,
    #[serde(rename = "wins")]
    pub win_count: usize,
    #[serde(rename = "pnl")]
    pub total_pnl: f64,
    pub win_rate: f64,
}

impl BucketStats {
    fn add(&mut self, pnl: f64) {
        self.trade_count += 1;
        self.total_pnl += pnl;
        if pnl > 0.0 {
            self.win_count += 1;
        }
    }

    fn finish(&mut self) {
        self.win_rate = if self.trade_count > 0 {
            round1(self.win_count as f64 / self.trade_count as f64 * 100.0)
        } else {
            0.0
        };
        self.total_pnl = round2(self.total_pnl);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyPnl {
    pub month: String,
    pub pnl: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PnlBucket {
    pub range: String,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatisticsReport {
    pub total_trades: usize,
    pub closed_trades: usize,
    pub open_trades: usize,
    pub win_rate: f64,
    pub total_pnl: f64,
    pub avg_pnl: f64,
    pub avg_win: f64,
    pub avg_loss: f64,
    pub largest_win: f64,
    pub largest_loss: f64,
    pub profit_factor: f64,
    pub expectancy: f64,
    pub avg_rr: f64,
    pub best_asset: Option<String>,
    pub worst_asset: Option<String>,
    pub best_timeframe: Option<String>,
    pub win_streak: usize,
    pub loss_streak: usize,
    pub current_streak: usize,
    pub current_streak_type: Option<StreakType>,
    pub by_asset: BTreeMap<String, BucketStats>,
    pub by_timeframe: BTreeMap<String, BucketStats>,
    pub by_direction: BTreeMap<String, BucketStats>,
    pub by_day: BTreeMap<String, BucketStats>,
    pub monthly_pnl: Vec<MonthlyPnl>,
    pub pnl_distribution: Vec<PnlBucket>,
}

impl StatisticsReport {
    pub fn print_summary(&self) {
        println!("\n{}", "=".repeat(70));
        println!("  TRADE STATISTICS");
        println!("{}", "=".repeat(70));
        println!(
            "  Trades:      {} ({} closed, {} open)",
            self.total_trades, self.closed_trades, self.open_trades
        );
        println!();
        println!("  PERFORMANCE");
        println!("  ───────────────────────────────────");
        println!("  PnL:         ${:+.2}", self.total_pnl);
        println!("  Win Rate:    {:.1}%", self.win_rate);
        println!("  Avg Trade:   ${:+.2}", self.avg_pnl);
        println!("  Avg Win:     ${:+.2}", self.avg_win);
        println!("  Avg Loss:    ${:+.2}", self.avg_loss);
        println!("  Best:        ${:+.2}", self.largest_win);
        println!("  Worst:       ${:+.2}", self.largest_loss);
        println!("  Profit Factor: {:.2}", self.profit_factor);
        println!("  Expectancy:  ${:+.2}", self.expectancy);
        println!("  Avg R:R:     {:.2}", self.avg_rr);
        println!();
        println!("  STREAKS");
        println!("  ───────────────────────────────────");
        println!("  Best run:    {} wins", self.win_streak);
        println!("  Worst run:   {} losses", self.loss_streak);
        match self.current_streak_type {
            Some(StreakType::Win) => println!("  Current:     {} wins", self.current_streak),
            Some(StreakType::Loss) => println!("  Current:     {} losses", self.current_streak),
            None => println!("  Current:     -"),
        }

        for (title, buckets) in [
            ("BY ASSET", &self.by_asset),
            ("BY TIMEFRAME", &self.by_timeframe),
            ("BY DIRECTION", &self.by_direction),
            ("BY DAY", &self.by_day),
        ] {
            if buckets.is_empty() {
                continue;
            }
            println!();
            println!("  {}", title);
            println!("  ───────────────────────────────────");
            for (key, b) in buckets {
                println!(
                    "  {:>10}: {} trades | WR {:.0}% | PnL ${:+.2}",
                    key, b.trade_count, b.win_rate, b.total_pnl
                );
            }
        }

        if !self.monthly_pnl.is_empty() {
            println!();
            println!("  MONTHLY");
            println!("  ───────────────────────────────────");
            for m in &self.monthly_pnl {
                println!("  {}: ${:+.2}", m.month, m.pnl);
            }
        }
        println!("{}", "=".repeat(70));
    }
}

/// One day's activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRecap {
    pub date: NaiveDate,
    pub trades_count: usize,
    pub pnl: f64,
    pub wins: usize,
    pub losses: usize,
    pub win_rate: f64,
}

impl DailyRecap {
    pub fn for_date(trades: &[ClosedTrade], date: NaiveDate) -> Self {
        let today: Vec<&ClosedTrade> = trades
            .iter()
            .filter(|t| t.created_at.date_naive() == date)
            .collect();
        let pnl: f64 = today.iter().map(|t| t.pnl_or_zero()).sum();
        let wins = today.iter().filter(|t| t.is_win()).count();
        let losses = today.iter().filter(|t| t.is_loss()).count();
        let decided = wins + losses;

        Self {
            date,
            trades_count: today.len(),
            pnl: round2(pnl),
            wins,
            losses,
            win_rate: if decided > 0 {
                round1(wins as f64 / decided as f64 * 100.0)
            } else {
                0.0
            },
        }
    }
}

pub struct TradeAnalyzer {
    pub histogram_buckets: usize,
}

impl Default for TradeAnalyzer {
    fn default() -> Self {
        Self::new(DEFAULT_HISTOGRAM_BUCKETS)
    }
}

impl TradeAnalyzer {
    pub fn new(histogram_buckets: usize) -> Self {
        Self {
            histogram_buckets: histogram_buckets.max(1),
        }
    }

    /// Pure aggregation over the trades passing `filter`. Every degenerate
    /// case (no trades, no losses, flat PnL) resolves to a defined value.
    pub fn analyze(&self, trades: &[ClosedTrade], filter: Option<&TradeFilter>) -> StatisticsReport {
        let selected: Vec<&ClosedTrade> = match filter {
            Some(f) => f.apply(trades),
            None => trades.iter().collect(),
        };

        let mut closed: Vec<&ClosedTrade> = selected.iter().copied().filter(|t| t.is_closed()).collect();
        // Stable: trades sharing a timestamp keep journal order.
        closed.sort_by_key(|t| t.created_at);

        let pnls: Vec<f64> = closed.iter().map(|t| t.pnl_or_zero()).collect();
        let wins: Vec<f64> = pnls.iter().copied().filter(|p| *p > 0.0).collect();
        let losses: Vec<f64> = pnls.iter().copied().filter(|p| *p < 0.0).collect();

        let n = pnls.len() as f64;
        let mean = |v: &[f64]| if v.is_empty() { 0.0 } else { v.iter().sum::<f64>() / v.len() as f64 };

        let total_pnl: f64 = pnls.iter().sum();
        let avg_win = mean(&wins);
        let avg_loss = mean(&losses);
        let gross_profit: f64 = wins.iter().sum();
        let gross_loss = losses.iter().sum::<f64>().abs();

        let profit_factor = if gross_loss > 0.0 {
            gross_profit / gross_loss
        } else {
            gross_profit
        };
        let (win_frac, loss_frac) = if pnls.is_empty() {
            (0.0, 0.0)
        } else {
            (wins.len() as f64 / n, losses.len() as f64 / n)
        };
        let expectancy = win_frac * avg_win + loss_frac * avg_loss;

        let rrs: Vec<f64> = closed.iter().filter_map(|t| t.planned_rr()).collect();

        let (win_streak, loss_streak) = longest_streaks(&pnls);
        let (current_streak, current_streak_type) = current_streak(&pnls);

        let mut by_asset: BTreeMap<String, BucketStats> = BTreeMap::new();
        let mut by_timeframe: BTreeMap<String, BucketStats> = BTreeMap::new();
        let mut by_direction: BTreeMap<String, BucketStats> = [TradeDirection::Buy, TradeDirection::Sell]
            .iter()
            .map(|d| (d.as_str().to_string(), BucketStats::default()))
            .collect();
        let mut by_day: BTreeMap<String, BucketStats> = BTreeMap::new();
        let mut monthly: BTreeMap<String, f64> = BTreeMap::new();

        for t in &closed {
            let pnl = t.pnl_or_zero();
            by_asset.entry(t.asset_type.as_str().to_string()).or_default().add(pnl);
            by_timeframe.entry(t.timeframe.clone()).or_default().add(pnl);
            by_direction.entry(t.direction.as_str().to_string()).or_default().add(pnl);
            by_day
                .entry(t.created_at.format("%A").to_string())
                .or_default()
                .add(pnl);
            *monthly.entry(t.created_at.format("%Y-%m").to_string()).or_default() += pnl;
        }

        let best_asset = pick_key(&by_asset, |b| b.total_pnl, |a, b| a > b);
        let worst_asset = pick_key(&by_asset, |b| b.total_pnl, |a, b| a < b);

        for map in [&mut by_asset, &mut by_timeframe, &mut by_direction, &mut by_day] {
            map.values_mut().for_each(BucketStats::finish);
        }
        let best_timeframe = pick_key(&by_timeframe, |b| b.win_rate, |a, b| a > b);

        StatisticsReport {
            total_trades: selected.len(),
            closed_trades: closed.len(),
            open_trades: selected.len() - closed.len(),
            win_rate: if pnls.is_empty() {
                0.0
            } else {
                round1(wins.len() as f64 / n * 100.0)
            },
            total_pnl: round2(total_pnl),
            avg_pnl: round2(mean(&pnls)),
            avg_win: round2(avg_win),
            avg_loss: round2(avg_loss),
            largest_win: round2(wins.iter().copied().fold(0.0, f64::max)),
            largest_loss: round2(losses.iter().copied().fold(0.0, f64::min)),
            profit_factor: round2(profit_factor),
            expectancy: round2(expectancy),
            avg_rr: round2(mean(&rrs)),
            best_asset,
            worst_asset,
            best_timeframe,
            win_streak,
            loss_streak,
            current_streak,
            current_streak_type,
            by_asset,
            by_timeframe,
            by_direction,
            by_day,
            monthly_pnl: monthly
                .into_iter()
                .map(|(month, pnl)| MonthlyPnl { month, pnl: round2(pnl) })
                .collect(),
            pnl_distribution: self.histogram(&pnls),
        }
    }

    /// Equal-width buckets over [min, max]. Each PnL lands in exactly one
    /// bucket; the last also takes the maximum. Flat or empty input has no histogram.
    fn histogram(&self, pnls: &[f64]) -> Vec<PnlBucket> {
        let Some(min) = pnls.iter().copied().reduce(f64::min) else {
            return Vec::new();
        };
        let max = pnls.iter().copied().fold(min, f64::max);
        if min == max {
            return Vec::new();
        }

        let n = self.histogram_buckets;
        let width = (max - min) / n as f64;
        let mut counts = vec![0usize; n];
        for &p in pnls {
            let idx = (((p - min) / width) as usize).min(n - 1);
            counts[idx] += 1;
        }

        let edge = |i: usize| min + i as f64 * width;
        counts
            .into_iter()
            .enumerate()
            .map(|(i, count)| PnlBucket {
                range: format!("{}-{}", edge(i).round() as i64, edge(i + 1).round() as i64),
                count,
            })
            .collect()
    }
}

/// Longest win and loss runs; a zero-PnL trade breaks both.
fn longest_streaks(pnls: &[f64]) -> (usize, usize) {
    let (mut best_win, mut best_loss, mut run_win, mut run_loss) = (0, 0, 0, 0);
    for &p in pnls {
        if p > 0.0 {
            run_win += 1;
            run_loss = 0;
            best_win = best_win.max(run_win);
        } else if p < 0.0 {
            run_loss += 1;
            run_win = 0;
            best_loss = best_loss.max(run_loss);
        } else {
            run_win = 0;
            run_loss = 0;
        }
    }
    (best_win, best_loss)
}

/// Run length ending at the most recent decided trade. Breakeven trades
/// after the last decided one are passed over; one inside the run ends it.
fn current_streak(pnls: &[f64]) -> (usize, Option<StreakType>) {
    let mut kind: Option<StreakType> = None;
    let mut count = 0;
    for &p in pnls.iter().rev() {
        let this = if p > 0.0 {
            Some(StreakType::Win)
        } else if p < 0.0 {
            Some(StreakType::Loss)
        } else {
            None
        };
        match (kind, this) {
            (None, None) => continue,
            (None, Some(k)) => {
                kind = Some(k);
                count = 1;
            }
            (Some(k), Some(t)) if k == t => count += 1,
            _ => break,
        }
    }
    (count, kind)
}

/// First key (in map order) whose metric beats every earlier one.
fn pick_key(
    map: &BTreeMap<String, BucketStats>,
    metric: impl Fn(&BucketStats) -> f64,
    better: impl Fn(f64, f64) -> bool,
) -> Option<String> {
    let mut best: Option<(&String, f64)> = None;
    for (key, stats) in map {
        let v = metric(stats);
        match best {
            Some((_, b)) if !better(v, b) => {}
            _ => best = Some((key, v)),
        }
    }
    best.map(|(k, _)| k.clone())
}
