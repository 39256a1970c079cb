use crate::event::info::{BarInfo, PriceInfo};
use chrono::Duration;

/// Which offset schedule a bar slicer applies between open and close.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SliceMode {
    /// `(+570, +690, +780, +900)` minutes, for whole trading-day bars.
    Day,
    /// `(+0, +15, +30, +45)` seconds, for one-minute bars.
    Minute,
}

impl SliceMode {
    fn offsets(self) -> [Duration; 4] {
        match self {
            SliceMode::Day => [
                Duration::minutes(570),
                Duration::minutes(690),
                Duration::minutes(780),
                Duration::minutes(900),
            ],
            SliceMode::Minute => [
                Duration::seconds(0),
                Duration::seconds(15),
                Duration::seconds(30),
                Duration::seconds(45),
            ],
        }
    }
}

/// Slices a [`BarInfo`] into exactly four [`PriceInfo`] points at the
/// offsets of `mode`, approximating the intrabar path with a monotone
/// excursion consistent with the bar's open/close direction:
/// `open <= close` visits `(O, L, H, C)`, otherwise `(O, H, L, C)`.
pub fn slice_bar(bar: &BarInfo, mode: SliceMode) -> [PriceInfo; 4] {
    let offsets = mode.offsets();
    let prices = if bar.open <= bar.close {
        [bar.open, bar.low, bar.high, bar.close]
    } else {
        [bar.open, bar.high, bar.low, bar.close]
    };

    let mut last_price = prices[0];
    std::array::from_fn(|i| {
        let info = PriceInfo {
            symbol: bar.symbol,
            timestamp: bar.timestamp + offsets[i],
            current_price: prices[i],
            last_price,
            volume: bar.volume,
        };
        last_price = prices[i];
        info
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn bar(open: rust_decimal::Decimal, close: rust_decimal::Decimal) -> BarInfo {
        BarInfo {
            symbol: "X",
            timestamp: Utc.with_ymd_and_hms(2021, 1, 1, 9, 0, 0).unwrap(),
            open,
            high: dec!(5.20),
            low: dec!(4.90),
            close,
            volume: dec!(0),
            turnover: dec!(0),
        }
    }

    #[test]
    fn minute_mode_slices_in_open_low_high_close_order_when_open_le_close() {
        let bar = bar(dec!(5.00), dec!(5.10));
        let prices = slice_bar(&bar, SliceMode::Minute);

        let expected_prices = [dec!(5.00), dec!(4.90), dec!(5.20), dec!(5.10)];
        let expected_offsets = [0, 15, 30, 45];

        for (i, price_event) in prices.iter().enumerate() {
            assert_eq!(price_event.current_price, expected_prices[i]);
            assert_eq!(price_event.timestamp, bar.timestamp + Duration::seconds(expected_offsets[i]));
        }
    }

    #[test]
    fn minute_mode_slices_in_open_high_low_close_order_when_open_gt_close() {
        let bar = bar(dec!(5.15), dec!(5.05));
        let prices = slice_bar(&bar, SliceMode::Minute);
        let expected = [dec!(5.15), dec!(5.20), dec!(4.90), dec!(5.05)];

        for (i, price_event) in prices.iter().enumerate() {
            assert_eq!(price_event.current_price, expected[i]);
        }
    }

    #[test]
    fn day_mode_uses_cumulative_minute_offsets() {
        let bar = bar(dec!(5.00), dec!(5.10));
        let prices = slice_bar(&bar, SliceMode::Day);
        let expected_minutes = [570, 690, 780, 900];

        for (i, price_event) in prices.iter().enumerate() {
            assert_eq!(price_event.timestamp, bar.timestamp + Duration::minutes(expected_minutes[i]));
        }
    }

    #[test]
    fn produces_exactly_four_strictly_non_decreasing_timestamps() {
        let bar = bar(dec!(5.00), dec!(5.10));
        let prices = slice_bar(&bar, SliceMode::Minute);
        assert_eq!(prices.len(), 4);
        assert!(prices.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
    }
}
