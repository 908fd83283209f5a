/// 금액 및 통화 모델
/// 금액은 소수점 두 자리 고정 소수로, 최소 단위(센트) 정수로 보관한다.
// region:    --- Imports
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// endregion: --- Imports

// region:    --- Amount
/// 정수부 최대 자릿수 (전체 14자리 중 소수 2자리 제외)
const MAX_INTEGER_DIGITS: usize = 12;

/// 소수점 두 자리 금액
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(i64);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid amount: {0:?}")]
pub struct InvalidAmount(pub String);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    pub fn from_minor_units(cents: i64) -> Result<Self, InvalidAmount> {
        if cents < 0 || cents >= 10_i64.pow(MAX_INTEGER_DIGITS as u32 + 2) {
            return Err(InvalidAmount(cents.to_string()));
        }
        Ok(Amount(cents))
    }

    pub fn minor_units(self) -> i64 {
        self.0
    }
}

impl FromStr for Amount {
    type Err = InvalidAmount;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidAmount(s.to_string());
        let trimmed = s.trim();
        let (int_part, frac_part) = match trimmed.split_once('.') {
            Some((i, f)) => (i, f),
            None => (trimmed, ""),
        };

        if int_part.is_empty()
            || int_part.len() > MAX_INTEGER_DIGITS
            || frac_part.len() > 2
            || !int_part.bytes().all(|b| b.is_ascii_digit())
            || !frac_part.bytes().all(|b| b.is_ascii_digit())
            || (trimmed.ends_with('.'))
        {
            return Err(invalid());
        }

        let units: i64 = int_part.parse().map_err(|_| invalid())?;
        let cents: i64 = match frac_part.len() {
            0 => 0,
            1 => frac_part.parse::<i64>().map_err(|_| invalid())? * 10,
            _ => frac_part.parse().map_err(|_| invalid())?,
        };
        Ok(Amount(units * 100 + cents))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// 문자열("5.50") 또는 JSON 숫자(5.5) 모두 허용
#[derive(Deserialize)]
#[serde(untagged)]
enum AmountRepr {
    Text(String),
    Number(serde_json::Number),
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = match AmountRepr::deserialize(deserializer)? {
            AmountRepr::Text(s) => s,
            AmountRepr::Number(n) => n.to_string(),
        };
        text.parse().map_err(serde::de::Error::custom)
    }
}
// endregion: --- Amount

// region:    --- Currency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Usd,
    Eur,
    Gbp,
    Cad,
    Aud,
    Chf,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown currency: {0:?}")]
pub struct UnknownCurrency(pub String);

impl Currency {
    pub fn code(self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Gbp => "GBP",
            Currency::Cad => "CAD",
            Currency::Aud => "AUD",
            Currency::Chf => "CHF",
        }
    }
}

impl FromStr for Currency {
    type Err = UnknownCurrency;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "USD" => Ok(Currency::Usd),
            "EUR" => Ok(Currency::Eur),
            "GBP" => Ok(Currency::Gbp),
            "CAD" => Ok(Currency::Cad),
            "AUD" => Ok(Currency::Aud),
            "CHF" => Ok(Currency::Chf),
            _ => Err(UnknownCurrency(s.to_string())),
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
// endregion: --- Currency

// region:    --- Money
/// 통화가 지정된 금액
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    pub amount: Amount,
    pub currency: Currency,
}

impl Money {
    pub fn new(amount: Amount, currency: Currency) -> Self {
        Self { amount, currency }
    }

    pub fn zero(currency: Currency) -> Self {
        Self::new(Amount::ZERO, currency)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount, self.currency)
    }
}
// endregion: --- Money

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_whole_and_fractional_amounts() {
        assert_eq!("5".parse::<Amount>().unwrap().minor_units(), 500);
        assert_eq!("5.5".parse::<Amount>().unwrap().minor_units(), 550);
        assert_eq!("5.05".parse::<Amount>().unwrap().minor_units(), 505);
        assert_eq!(" 12.00 ".parse::<Amount>().unwrap().to_string(), "12.00");
    }

    #[test]
    fn rejects_malformed_amounts() {
        for bad in ["2x", "", "-1", "1.234", ".5", "5.", "1e3", "1234567890123"] {
            assert!(bad.parse::<Amount>().is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn deserializes_from_string_or_number() {
        let a: Amount = serde_json::from_str("\"6.00\"").unwrap();
        let b: Amount = serde_json::from_str("6").unwrap();
        let c: Amount = serde_json::from_str("5.5").unwrap();
        assert_eq!(a, b);
        assert_eq!(c.minor_units(), 550);
        assert_eq!(serde_json::to_string(&a).unwrap(), "\"6.00\"");
    }

    #[test]
    fn currency_codes() {
        assert_eq!("usd".parse::<Currency>().unwrap(), Currency::Usd);
        assert_eq!(Currency::default().to_string(), "USD");
        assert!("XYZ".parse::<Currency>().is_err());
        assert_eq!(serde_json::to_string(&Currency::Eur).unwrap(), "\"EUR\"");
    }
}
