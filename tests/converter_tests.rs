use chrono::NaiveDate;
use ctc::error::CtcError;
use ctc::importers::{
    load_transactions, normalize_to_ctc_csv, ConverterDefaults, CtcConverter, SkipReason,
    SAMPLE_CTC_CSV,
};
use ctc::tax::{assign_average_cost_basis, compute_tax, TransactionType};
use rust_decimal_macros::dec;

#[test]
fn test_canonical_rows_round_trip() {
    let raw = "date,type,asset,amount,price\n\
               2024-01-01,buy,BTC,0.5,50000\n\
               2024-02-01,sell,BTC,0.2,60000\n";

    let normalized = normalize_to_ctc_csv(raw).unwrap();
    assert_eq!(
        normalized,
        "date,type,asset,amount,price\n\
         2024-01-01,buy,BTC,0.50,50000.00\n\
         2024-02-01,sell,BTC,0.20,60000.00\n"
    );
    assert_eq!(normalize_to_ctc_csv(&normalized).unwrap(), normalized);
}

#[test]
fn test_unrecognised_type_drops_exactly_one_row() {
    let raw = "Date,Action,Coin,Qty,Price\n\
               2024-01-01,buy,BTC,1,100\n\
               2024-01-02,transfer,BTC,1,100\n\
               2024-01-03,sell,BTC,1,120\n";

    let conversion = CtcConverter::default().convert(raw).unwrap();
    assert_eq!(conversion.rows.len(), 2);
    assert_eq!(conversion.skipped.len(), 1);
    assert_eq!(conversion.skipped[0].line, 3);
    assert_eq!(conversion.skipped[0].reason, SkipReason::MissingType);
}

#[test]
fn test_fallback_type_and_defaults() {
    let raw = "Description,Quantity,Price\n\
               Market Purchase,2,10\n\
               Sale,1,12\n";
    let defaults = ConverterDefaults {
        default_date: NaiveDate::from_ymd_opt(2023, 4, 1).unwrap(),
        default_asset: "eth".to_string(),
    };

    let conversion = CtcConverter::new(defaults).convert(raw).unwrap();
    assert_eq!(
        conversion.csv,
        "date,type,asset,amount,price\n\
         2023-04-01,buy,ETH,2.00,10.00\n\
         2023-04-01,sell,ETH,1.00,12.00\n"
    );
}

#[test]
fn test_header_only_is_format_error() {
    for raw in ["", "\n\n", "date,type,asset,amount,price\n"] {
        let err = normalize_to_ctc_csv(raw).unwrap_err();
        assert!(
            matches!(err, CtcError::FormatError(_)),
            "expected format error for {:?}",
            raw
        );
    }
}

#[test]
fn test_sample_feeds_the_batch_calculator() {
    let txs = assign_average_cost_basis(&load_transactions(SAMPLE_CTC_CSV).unwrap());
    assert_eq!(txs.len(), 4);
    assert!(txs
        .iter()
        .filter(|tx| tx.transaction_type == TransactionType::Sell)
        .all(|tx| tx.cost_basis.is_some()));

    // BTC: 0.2 * (60000 - 50000) = 2000; ETH: 1 * (35000 - 30000) = 5000
    let result = compute_tax(&txs);
    assert_eq!(result.total_gains, dec!(7000));
    assert_eq!(result.total_losses, dec!(0));
    assert_eq!(result.tax_amount, dec!(2100));
    // 1% of 12000 + 35000
    assert_eq!(result.tds_amount, dec!(470));
    assert_eq!(result.total_tax, dec!(2570));
}

#[test]
fn test_converted_output_loads_as_transactions() {
    let raw = "Pair,Side,Executed,Price,Date(UTC)\n\
               ETH,SELL,1.5,3200.5,2024-05-02 08:00:00\n";
    let converted = normalize_to_ctc_csv(raw).unwrap();
    let txs = load_transactions(&converted).unwrap();

    assert_eq!(txs.len(), 1);
    assert_eq!(txs[0].asset, "ETH");
    assert_eq!(txs[0].amount, dec!(1.50));
    assert_eq!(txs[0].price, dec!(3200.50));
    assert_eq!(txs[0].date, NaiveDate::from_ymd_opt(2024, 5, 2).unwrap());
}

#[test]
fn test_oversized_values_never_panic_the_batch() {
    let raw = "date,type,asset,amount,price\n\
               2024-01-01,buy,BTC,1e15,1e15\n\
               2024-02-01,sell,BTC,1,1\n";

    let txs = assign_average_cost_basis(&load_transactions(raw).unwrap());
    let result = compute_tax(&txs);

    // The sell has no purchase history left to match, so nothing is taxed
    assert_eq!(txs.len(), 1);
    assert_eq!(txs[0].cost_basis, None);
    assert_eq!(result.total_tax, dec!(0));
}
