//! Drives a small `SignalRing` with an arbitrary sequence of pushes and pops
//! derived from the input bytes, checking the ring's two invariants from
//! spec §5 ("Ordering guarantees"): pop never returns a record that wasn't
//! pushed first, and pops come back in the order they were pushed (no
//! reordering, no duplication).

#![no_main]

use libfuzzer_sys::fuzz_target;
use tes_core::core::Side;
use tes_core::ring::signal::SignalRecord;
use tes_core::ring::SignalRing;

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    let tag = format!("fuzz_{}_{}", std::process::id(), data.len());
    let ring = match SignalRing::create(&tag, 16) {
        Ok(r) => r,
        Err(_) => return,
    };

    let mut pushed = std::collections::VecDeque::new();
    let mut next_seq: u64 = 0;

    for &byte in data {
        // Even bytes push, odd bytes pop; the low bits of the byte pick
        // side/price/quantity so different inputs exercise different
        // wire values without needing more bytes per record.
        if byte % 2 == 0 {
            let side = if byte % 4 == 0 { Side::Buy } else { Side::Sell };
            let record = SignalRecord::new(next_seq, next_seq * 1000, "BTCUSDT", side, 100.0 + byte as f64, 1.0);
            if ring.push(record) {
                pushed.push_back(next_seq);
            }
            next_seq += 1;
        } else if let Some(popped) = ring.pop() {
            let expected = pushed.pop_front().expect("ring yielded a record nothing pushed");
            assert_eq!(popped.sequence_id, expected);
        }
    }

    while let Some(popped) = ring.pop() {
        let expected = pushed.pop_front().expect("ring yielded a record nothing pushed");
        assert_eq!(popped.sequence_id, expected);
    }

    assert!(pushed.is_empty(), "ring dropped records without popping them back out");
});
