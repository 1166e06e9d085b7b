use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Balance of one exchange account (one currency).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountBalance {
    #[serde(default)]
    pub id: String,
    pub currency: String,
    pub balance: Decimal,
    pub available: Decimal,
    #[serde(default)]
    pub hold: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_deserialize_exchange_payload() {
        // Exchange reports amounts as strings
        let payload = r#"[
            {"id": "a1", "currency": "USD", "balance": "1500.25", "available": "1200.00", "hold": "300.25", "profile_id": "p"},
            {"currency": "BTC", "balance": "0.5", "available": "0.5"}
        ]"#;

        let accounts: Vec<AccountBalance> = serde_json::from_str(payload).unwrap();
        assert_eq!(accounts.len(), 2);
        assert_eq!(accounts[0].currency, "USD");
        assert_eq!(accounts[0].available, dec!(1200.00));
        assert_eq!(accounts[0].hold, dec!(300.25));
        assert_eq!(accounts[1].id, "");
        assert_eq!(accounts[1].hold, Decimal::ZERO);
    }
}
