use crate::config::{Config, Mode};
use crate::domain::errors::TrackerError;
use crate::domain::market::Granularity;
use std::collections::HashMap;

fn config_from(pairs: &[(&str, &str)]) -> Result<Config, TrackerError> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    Config::from_lookup(|key| vars.get(key).cloned())
}

#[test]
fn test_config_defaults() {
    let config = config_from(&[("PRICE_CACHE_SIZE", "200")]).unwrap();

    assert_eq!(config.mode, Mode::Mock);
    assert_eq!(config.products, vec!["BTC-USD".to_string()]);
    assert_eq!(
        config.granularities,
        vec![
            Granularity::ONE_MINUTE,
            Granularity::FIVE_MINUTES,
            Granularity::FIFTEEN_MINUTES
        ]
    );
    assert_eq!(config.price_cache_size.get(), 200);
    assert_eq!(config.indicators.ema_periods, vec![12, 26]);
    assert_eq!(config.indicators.rsi_period, 14);
    assert_eq!(config.exchange.api_url, "https://api.exchange.coinbase.com");
    assert!(!config.exchange.has_credentials());
    assert!(config.observability.enabled);
    assert_eq!(config.observability.interval_secs, 60);
    assert_eq!(config.pair_count(), 3);
}

#[test]
fn test_missing_cache_size_is_configuration_error() {
    let err = config_from(&[]).unwrap_err();
    assert!(matches!(err, TrackerError::Configuration { .. }));
    assert!(err.to_string().contains("PRICE_CACHE_SIZE"));
}

#[test]
fn test_invalid_cache_sizes() {
    for raw in ["0", "-5", "abc", "12.5", ""] {
        let err = config_from(&[("PRICE_CACHE_SIZE", raw)]).unwrap_err();
        assert!(
            matches!(err, TrackerError::Configuration { .. }),
            "'{}' should be rejected",
            raw
        );
    }
}

#[test]
fn test_lists_are_parsed_and_deduplicated() {
    let config = config_from(&[
        ("PRICE_CACHE_SIZE", "50"),
        ("MODE", "Exchange"),
        ("PRODUCTS", " btc-usd, ETH-USD ,,BTC-USD"),
        ("GRANULARITIES", "1m, 3600, 60"),
        ("EMA_PERIODS", "9,21"),
    ])
    .unwrap();

    assert_eq!(config.mode, Mode::Exchange);
    assert_eq!(config.products, vec!["BTC-USD", "ETH-USD"]);
    assert_eq!(
        config.granularities,
        vec![Granularity::ONE_MINUTE, Granularity::ONE_HOUR]
    );
    assert_eq!(config.indicators.ema_periods, vec![9, 21]);
    assert_eq!(config.pair_count(), 4);
}

#[test]
fn test_invalid_lists_are_rejected() {
    let cases: &[(&str, &str)] = &[
        ("GRANULARITIES", "0"),
        ("GRANULARITIES", "fortnightly"),
        ("PRODUCTS", " , "),
        ("EMA_PERIODS", "12,0"),
        ("RSI_PERIOD", "0"),
        ("MACD_FAST_PERIOD", "30"),
        ("MODE", "paper"),
        ("OBSERVABILITY_INTERVAL", "soon"),
    ];

    for (key, value) in cases {
        let result = config_from(&[("PRICE_CACHE_SIZE", "50"), (key, value)]);
        assert!(
            matches!(result, Err(TrackerError::Configuration { .. })),
            "{}={} should be rejected",
            key,
            value
        );
    }
}

#[test]
fn test_cli_overrides() {
    let config = config_from(&[("PRICE_CACHE_SIZE", "50")])
        .unwrap()
        .with_products("eth-usd,sol-usd")
        .unwrap()
        .with_granularities("5m")
        .unwrap();

    assert_eq!(config.products, vec!["ETH-USD", "SOL-USD"]);
    assert_eq!(config.granularities, vec![Granularity::FIVE_MINUTES]);

    let base = config_from(&[("PRICE_CACHE_SIZE", "50")]).unwrap();
    assert!(base.with_granularities("0").is_err());
}

#[test]
fn test_credentials_are_not_logged() {
    let config = config_from(&[
        ("PRICE_CACHE_SIZE", "50"),
        ("EXCHANGE_API_KEY", "key"),
        ("EXCHANGE_API_SECRET", "c2VjcmV0"),
        ("EXCHANGE_API_PASSPHRASE", "hunter2"),
    ])
    .unwrap();

    assert!(config.exchange.has_credentials());
    let debug = format!("{:?}", config);
    assert!(!debug.contains("hunter2"));
    assert!(!debug.contains("c2VjcmV0"));
}
