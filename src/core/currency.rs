//! Supported currency catalog

use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CurrencyCode {
    Usd,
    Jod,
    Sar,
    Aed,
    Qar,
    Omr,
    Eur,
    Gbp,
    Bhd,
    Kwd,
}

impl CurrencyCode {
    /// Every supported currency, in selector order.
    pub const ALL: [CurrencyCode; 10] = [
        CurrencyCode::Usd,
        CurrencyCode::Jod,
        CurrencyCode::Sar,
        CurrencyCode::Aed,
        CurrencyCode::Qar,
        CurrencyCode::Omr,
        CurrencyCode::Eur,
        CurrencyCode::Gbp,
        CurrencyCode::Bhd,
        CurrencyCode::Kwd,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            CurrencyCode::Usd => "USD",
            CurrencyCode::Jod => "JOD",
            CurrencyCode::Sar => "SAR",
            CurrencyCode::Aed => "AED",
            CurrencyCode::Qar => "QAR",
            CurrencyCode::Omr => "OMR",
            CurrencyCode::Eur => "EUR",
            CurrencyCode::Gbp => "GBP",
            CurrencyCode::Bhd => "BHD",
            CurrencyCode::Kwd => "KWD",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            CurrencyCode::Usd => "US Dollar",
            CurrencyCode::Jod => "Jordanian Dinar",
            CurrencyCode::Sar => "Saudi Riyal",
            CurrencyCode::Aed => "UAE Dirham",
            CurrencyCode::Qar => "Qatari Riyal",
            CurrencyCode::Omr => "Omani Rial",
            CurrencyCode::Eur => "Euro",
            CurrencyCode::Gbp => "British Pound",
            CurrencyCode::Bhd => "Bahraini Dinar",
            CurrencyCode::Kwd => "Kuwaiti Dinar",
        }
    }

    /// Selector label, e.g. `USD - US Dollar`.
    pub fn label(&self) -> String {
        format!("{} - {}", self.code(), self.display_name())
    }
}

impl Display for CurrencyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for CurrencyCode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_uppercase();
        CurrencyCode::ALL
            .into_iter()
            .find(|c| c.code() == wanted)
            .ok_or_else(|| anyhow::anyhow!("Unsupported currency: {}", s.trim()))
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> String {
        code.code().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("usd".parse::<CurrencyCode>().unwrap(), CurrencyCode::Usd);
        assert_eq!(" Jod ".parse::<CurrencyCode>().unwrap(), CurrencyCode::Jod);
        assert_eq!("KWD".parse::<CurrencyCode>().unwrap(), CurrencyCode::Kwd);
    }

    #[test]
    fn test_parse_rejects_unknown_code() {
        let err = "JPY".parse::<CurrencyCode>().unwrap_err();
        assert_eq!(err.to_string(), "Unsupported currency: JPY");
    }

    #[test]
    fn test_catalog_round_trips_through_display() {
        for code in CurrencyCode::ALL {
            assert_eq!(code.to_string().parse::<CurrencyCode>().unwrap(), code);
        }
        assert_eq!(CurrencyCode::Aed.label(), "AED - UAE Dirham");
    }

    #[test]
    fn test_serde_uses_upper_case_code() {
        let code: CurrencyCode = serde_yaml::from_str("gbp").unwrap();
        assert_eq!(code, CurrencyCode::Gbp);
        assert_eq!(serde_json::to_string(&CurrencyCode::Omr).unwrap(), "\"OMR\"");
    }
}
