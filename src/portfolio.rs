// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::Investment;
use crate::utils::percent_of;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssetTypeSummary {
    pub asset_type: String,
    pub positions: usize,
    pub invested: Decimal,
    pub current_value: Decimal,
    pub gain: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InvestmentSummary {
    pub total_invested: Decimal,
    pub total_current_value: Decimal,
    pub gain: Decimal,
    /// Gain relative to the invested amount, one decimal.
    pub gain_pct: Decimal,
    /// Sorted by current value, largest first.
    pub by_asset_type: Vec<AssetTypeSummary>,
}

pub fn summarize_investments(investments: &[Investment]) -> InvestmentSummary {
    let mut rows: Vec<AssetTypeSummary> = Vec::new();
    let mut index_by_type: HashMap<&str, usize> = HashMap::new();

    for inv in investments {
        let idx = *index_by_type
            .entry(inv.asset_type.as_str())
            .or_insert_with(|| {
                rows.push(AssetTypeSummary {
                    asset_type: inv.asset_type.clone(),
                    positions: 0,
                    invested: Decimal::ZERO,
                    current_value: Decimal::ZERO,
                    gain: Decimal::ZERO,
                });
                rows.len() - 1
            });
        let row = &mut rows[idx];
        row.positions += 1;
        row.invested += inv.amount_invested;
        row.current_value += inv.current_value;
        row.gain = row.current_value - row.invested;
    }

    rows.sort_by(|a, b| b.current_value.cmp(&a.current_value));

    let total_invested: Decimal = rows.iter().map(|r| r.invested).sum();
    let total_current_value: Decimal = rows.iter().map(|r| r.current_value).sum();
    let gain = total_current_value - total_invested;
    InvestmentSummary {
        total_invested,
        total_current_value,
        gain,
        gain_pct: percent_of(gain, total_invested),
        by_asset_type: rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn inv(asset_type: &str, invested: Decimal, current: Decimal) -> Investment {
        Investment {
            id: 0,
            asset_type: asset_type.into(),
            symbol: None,
            amount_invested: invested,
            current_value: current,
            date: "2024-01-01".into(),
            notes: None,
        }
    }

    #[test]
    fn groups_by_asset_type_and_sorts_by_value() {
        let s = summarize_investments(&[
            inv("Stock", dec!(100), dec!(150)),
            inv("Crypto", dec!(500), dec!(400)),
            inv("Stock", dec!(200), dec!(210)),
        ]);
        assert_eq!(s.total_invested, dec!(800));
        assert_eq!(s.total_current_value, dec!(760));
        assert_eq!(s.gain, dec!(-40));
        assert_eq!(s.gain_pct, dec!(-5.0));
        assert_eq!(s.by_asset_type[0].asset_type, "Crypto");
        assert_eq!(s.by_asset_type[1].asset_type, "Stock");
        assert_eq!(s.by_asset_type[1].positions, 2);
        assert_eq!(s.by_asset_type[1].gain, dec!(60));
    }

    #[test]
    fn empty_portfolio_has_zero_gain_pct() {
        let s = summarize_investments(&[]);
        assert_eq!(s.gain_pct, Decimal::ZERO);
        assert!(s.by_asset_type.is_empty());
    }
}
