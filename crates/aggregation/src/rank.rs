//! Top/bottom sector ranking and the summary card built on it.

use crate::engine::FlowViews;
use crate::summary::SectorNetSummary;
use flow_core::{config::RankConfig, Amount, Error, InvestorCategory, Result};
use ordered_float::OrderedFloat;
use serde::Serialize;

/// A sector with its net flow.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedSector {
    pub sector: String,
    pub net: Amount,
}

/// Result of a top/bottom query.
///
/// Both lists are slices of the same ranking (descending net flow, ties by
/// ascending sector label). They overlap when the category has fewer than
/// `2 * n` sectors.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TopBottom {
    /// First `n` entries of the ranking.
    pub top: Vec<RankedSector>,
    /// Last `n` entries of the ranking, in ranking order.
    pub bottom: Vec<RankedSector>,
}

/// Rank every sector of a category by descending net flow.
pub fn rank_sectors(summary: &SectorNetSummary, category: InvestorCategory) -> Vec<RankedSector> {
    let mut ranked: Vec<RankedSector> = summary
        .for_category(category)
        .map(|(sector, net)| RankedSector {
            sector: sector.to_string(),
            net,
        })
        .collect();

    ranked.sort_by(|a, b| {
        OrderedFloat(b.net)
            .cmp(&OrderedFloat(a.net))
            .then_with(|| a.sector.cmp(&b.sector))
    });

    ranked
}

/// Top and bottom `n` sectors of a category.
pub fn top_bottom(summary: &SectorNetSummary, category: InvestorCategory, n: usize) -> Result<TopBottom> {
    if n == 0 {
        return Err(Error::config("top/bottom size must be positive"));
    }

    let ranked = rank_sectors(summary, category);
    let top = ranked.iter().take(n).cloned().collect();
    let bottom = ranked[ranked.len().saturating_sub(n)..].to_vec();

    Ok(TopBottom { top, bottom })
}

/// Most bought / most sold sectors of one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryLeaders {
    pub category: InvestorCategory,
    pub most_bought: Vec<String>,
    pub most_sold: Vec<String>,
}

/// The dashboard summary card.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowSummary {
    /// Net flow of every category, zero when absent.
    pub net_totals: Vec<(InvestorCategory, Amount)>,
    /// Leaders of each configured category.
    pub leaders: Vec<CategoryLeaders>,
}

impl FlowSummary {
    /// Build the summary card from a set of views.
    pub fn build(views: &FlowViews, config: &RankConfig) -> Result<Self> {
        let net_totals = InvestorCategory::ALL
            .into_iter()
            .map(|c| (c, views.total_net_by_type.get(c).unwrap_or(0.0)))
            .collect();

        let leaders = config
            .summary_categories
            .iter()
            .map(|&category| {
                let ranks = top_bottom(&views.sector_summary, category, config.default_n)?;
                Ok(CategoryLeaders {
                    category,
                    most_bought: ranks.top.into_iter().map(|r| r.sector).collect(),
                    most_sold: ranks.bottom.into_iter().map(|r| r.sector).collect(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { net_totals, leaders })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Aggregator;
    use flow_core::{CanonicalTradeRow, TradeDate};

    fn row(sector: &str, category: InvestorCategory, net: f64) -> CanonicalTradeRow {
        CanonicalTradeRow {
            trade_date: TradeDate::from_ymd_opt(2024, 3, 1).unwrap(),
            sector: sector.to_string(),
            sub_sector: "Others".to_string(),
            segment: "Others".to_string(),
            category,
            buy_amount: net.max(0.0),
            sell_amount: (-net).max(0.0),
            net_amount: net,
            total_amount: net.abs(),
        }
    }

    fn views() -> FlowViews {
        use InvestorCategory::*;
        let rows = vec![
            row("BANK", Locals, 5_000_000.0),
            row("ENERGY", Locals, -2_000_000.0),
            row("MINING", Locals, 3_000_000.0),
            row("RETAIL_CO", Locals, -7_000_000.0),
            row("TELECOM", Locals, 1_000_000.0),
            row("UTILITIES", Locals, 3_000_000.0),
            row("BANK", Foreigners, -1_000_000.0),
            row("ENERGY", Foreigners, 4_000_000.0),
        ];
        Aggregator::default().aggregate(&rows)
    }

    fn names(list: &[RankedSector]) -> Vec<&str> {
        list.iter().map(|r| r.sector.as_str()).collect()
    }

    #[test]
    fn test_top_bottom_ordering() {
        let views = views();
        let tb = top_bottom(&views.sector_summary, InvestorCategory::Locals, 3).unwrap();

        // MINING and UTILITIES tie at 3.0; label order breaks the tie.
        assert_eq!(names(&tb.top), vec!["BANK", "MINING", "UTILITIES"]);
        assert_eq!(names(&tb.bottom), vec!["TELECOM", "ENERGY", "RETAIL_CO"]);

        for pair in tb.top.windows(2).chain(tb.bottom.windows(2)) {
            assert!(pair[0].net >= pair[1].net);
        }
    }

    #[test]
    fn test_fewer_sectors_than_n_overlap() {
        let views = views();
        let tb = top_bottom(&views.sector_summary, InvestorCategory::Foreigners, 3).unwrap();

        assert_eq!(names(&tb.top), vec!["ENERGY", "BANK"]);
        assert_eq!(tb.top, tb.bottom);
    }

    #[test]
    fn test_partial_overlap() {
        let views = views();
        let tb = top_bottom(&views.sector_summary, InvestorCategory::Locals, 4).unwrap();

        assert_eq!(tb.top.len(), 4);
        assert_eq!(names(&tb.bottom), vec!["UTILITIES", "TELECOM", "ENERGY", "RETAIL_CO"]);
    }

    #[test]
    fn test_empty_category() {
        let views = views();
        let tb = top_bottom(&views.sector_summary, InvestorCategory::Retail, 3).unwrap();
        assert!(tb.top.is_empty());
        assert!(tb.bottom.is_empty());
    }

    #[test]
    fn test_len_is_min_of_n_and_sector_count() {
        let views = views();
        for category in InvestorCategory::ALL {
            let count = views.sector_summary.sector_count(category);
            for n in 1..8 {
                let tb = top_bottom(&views.sector_summary, category, n).unwrap();
                assert_eq!(tb.top.len(), n.min(count));
                assert_eq!(tb.bottom.len(), n.min(count));
            }
        }
    }

    #[test]
    fn test_zero_n_rejected() {
        let views = views();
        assert!(top_bottom(&views.sector_summary, InvestorCategory::Locals, 0).is_err());
    }

    #[test]
    fn test_flow_summary() {
        let views = views();
        let summary = FlowSummary::build(&views, &RankConfig::default()).unwrap();

        assert_eq!(
            summary.net_totals,
            vec![
                (InvestorCategory::Locals, 3.0),
                (InvestorCategory::Foreigners, 3.0),
                (InvestorCategory::Retail, 0.0),
            ]
        );
        assert_eq!(summary.leaders.len(), 2);
        assert_eq!(summary.leaders[0].category, InvestorCategory::Locals);
        assert_eq!(summary.leaders[0].most_bought, vec!["BANK", "MINING", "UTILITIES"]);
        assert_eq!(summary.leaders[0].most_sold, vec!["TELECOM", "ENERGY", "RETAIL_CO"]);
        assert_eq!(summary.leaders[1].most_sold, vec!["ENERGY", "BANK"]);
    }
}
