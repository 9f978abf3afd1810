//! Conversion arithmetic, quick stats and display formatting

use crate::core::currency::CurrencyCode;
use crate::core::rates::RateTable;
use thiserror::Error;

/// Shown wherever a rate is not available.
pub const PLACEHOLDER: &str = "---";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConversionResult {
    pub amount: f64,
    pub converted_amount: f64,
    pub rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("No rate for target currency {0}")]
pub struct UnsupportedTargetError(pub CurrencyCode);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuickStat {
    pub code: CurrencyCode,
    pub rate: Option<f64>,
}

impl QuickStat {
    /// Four-decimal rate, or the placeholder when the rate is missing.
    pub fn display_rate(&self) -> String {
        self.rate.map_or(PLACEHOLDER.to_string(), format_rate)
    }
}

/// `amount * rates[target]`, or `0.0` when the table has no rate for `target`.
pub fn convert(amount: f64, rates: &RateTable, target: CurrencyCode) -> f64 {
    try_convert(amount, rates, target).unwrap_or(0.0)
}

pub fn try_convert(
    amount: f64,
    rates: &RateTable,
    target: CurrencyCode,
) -> Result<f64, UnsupportedTargetError> {
    rates
        .get(target.code())
        .map(|rate| amount * rate)
        .ok_or(UnsupportedTargetError(target))
}

/// Builds a [`ConversionResult`] whose rate is the one used for the product.
pub fn conversion_result(amount: f64, rates: &RateTable, target: CurrencyCode) -> ConversionResult {
    let rate = rates.get(target.code()).copied().unwrap_or(0.0);
    ConversionResult {
        amount,
        converted_amount: convert(amount, rates, target),
        rate,
    }
}

pub fn quick_stats(rates: &RateTable, codes: &[CurrencyCode]) -> Vec<QuickStat> {
    codes
        .iter()
        .map(|&code| QuickStat {
            code,
            rate: rates.get(code.code()).copied(),
        })
        .collect()
}

/// Amount entered by the user; anything non-finite counts as zero.
pub fn sanitize_amount(amount: f64) -> f64 {
    if amount.is_finite() { amount } else { 0.0 }
}

pub fn format_rate(rate: f64) -> String {
    format!("{rate:.4}")
}

/// Two decimals with thousands separators, e.g. `12,345.60`.
pub fn format_amount(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (whole, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if value < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{sign}{grouped}.{fraction}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usd_rates() -> RateTable {
        [
            ("JOD", 0.709),
            ("SAR", 3.75),
            ("AED", 3.67),
            ("EUR", 0.92),
            ("GBP", 0.78),
        ]
        .into_iter()
        .map(|(c, r)| (c.to_string(), r))
        .collect()
    }

    #[test]
    fn test_convert_multiplies_by_target_rate() {
        let rates = usd_rates();
        for amount in [0.0, 1.0, 100.0, 2500.5] {
            assert_eq!(
                convert(amount, &rates, CurrencyCode::Sar),
                amount * 3.75
            );
        }
        assert_eq!(format_amount(convert(100.0, &rates, CurrencyCode::Jod)), "70.90");
    }

    #[test]
    fn test_convert_absent_target_is_zero() {
        let rates = usd_rates();
        assert_eq!(convert(100.0, &rates, CurrencyCode::Kwd), 0.0);
        assert_eq!(
            try_convert(100.0, &rates, CurrencyCode::Kwd),
            Err(UnsupportedTargetError(CurrencyCode::Kwd))
        );
    }

    #[test]
    fn test_conversion_result_uses_target_rate() {
        let result = conversion_result(100.0, &usd_rates(), CurrencyCode::Eur);
        assert_eq!(result.rate, 0.92);
        assert_eq!(result.converted_amount, 100.0 * 0.92);
        assert_eq!(result.amount, 100.0);
    }

    #[test]
    fn test_quick_stats_keep_order_and_format() {
        let codes = [
            CurrencyCode::Sar,
            CurrencyCode::Aed,
            CurrencyCode::Eur,
            CurrencyCode::Gbp,
        ];
        let shown: Vec<String> = quick_stats(&usd_rates(), &codes)
            .iter()
            .map(|s| format!("{} {}", s.code, s.display_rate()))
            .collect();
        assert_eq!(
            shown,
            vec!["SAR 3.7500", "AED 3.6700", "EUR 0.9200", "GBP 0.7800"]
        );
    }

    #[test]
    fn test_quick_stats_missing_code_is_placeholder() {
        let stats = quick_stats(&RateTable::new(), &[CurrencyCode::Qar, CurrencyCode::Bhd]);
        assert_eq!(stats.len(), 2);
        assert!(stats.iter().all(|s| s.display_rate() == PLACEHOLDER));
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(0.0), "0.00");
        assert_eq!(format_amount(999.999), "1,000.00");
        assert_eq!(format_amount(1234567.891), "1,234,567.89");
        assert_eq!(format_amount(-4200.5), "-4,200.50");
        assert_eq!(format_amount(-0.001), "0.00");
    }

    #[test]
    fn test_sanitize_amount() {
        assert_eq!(sanitize_amount(f64::NAN), 0.0);
        assert_eq!(sanitize_amount(f64::INFINITY), 0.0);
        assert_eq!(sanitize_amount(12.5), 12.5);
    }
}
