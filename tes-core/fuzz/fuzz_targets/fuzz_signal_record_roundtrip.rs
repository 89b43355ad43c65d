//! Builds a `SignalRecord` from arbitrary bytes and checks that converting
//! it to a domain `Signal` (§3) never panics and, when it succeeds, carries
//! the same side/price/quantity/sequence the wire record held.

#![no_main]

use libfuzzer_sys::fuzz_target;
use tes_core::ring::signal::{SignalRecord, WireSignalType};
use tes_core::Signal;

fuzz_target!(|data: &[u8]| {
    if data.len() < 49 {
        return;
    }

    let sequence_id = u64::from_le_bytes(data[0..8].try_into().unwrap());
    let timestamp_ns = u64::from_le_bytes(data[8..16].try_into().unwrap());
    let mut symbol = [0u8; 32];
    symbol.copy_from_slice(&data[16..48]);
    let signal_type = data[48];
    let target_price = if data.len() >= 57 {
        f64::from_le_bytes(data[49..57].try_into().unwrap())
    } else {
        0.0
    };
    let target_volume = if data.len() >= 65 {
        i64::from_le_bytes(data[57..65].try_into().unwrap())
    } else {
        0
    };

    let record = SignalRecord {
        sequence_id,
        timestamp_ns,
        instrument_symbol: symbol,
        signal_type,
        _pad: [0; 7],
        target_price,
        target_volume,
    };

    let symbol_str = record.symbol();
    let _ = symbol_str.len();

    match Signal::try_from(record) {
        Ok(signal) => {
            let expected_side = WireSignalType::from_u8(signal_type).and_then(WireSignalType::to_side);
            assert_eq!(Some(signal.side), expected_side);
            assert_eq!(signal.sequence_id, sequence_id);
            assert_eq!(signal.timestamp_ns, timestamp_ns);
            assert!((signal.target_quantity - target_volume as f64 / 1_000_000.0).abs() < 1e-6);
        }
        Err(()) => {
            assert!(WireSignalType::from_u8(signal_type).and_then(WireSignalType::to_side).is_none());
        }
    }
});
