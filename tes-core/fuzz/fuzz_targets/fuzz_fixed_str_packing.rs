//! `pack_fixed_str`/`unpack_fixed_str` back a fixed-layout wire record
//! (spec §6: "no internal pointers; strings are fixed-length or indexed").
//! Arbitrary input must never panic and must round-trip exactly when it
//! fits and contains no NUL byte.

#![no_main]

use libfuzzer_sys::fuzz_target;
use tes_core::ring::record::{pack_fixed_str, unpack_fixed_str};

fuzz_target!(|data: &[u8]| {
    let s = String::from_utf8_lossy(data);
    let packed: [u8; 32] = pack_fixed_str(&s);
    let unpacked = unpack_fixed_str(&packed);

    if s.len() <= 32 && !s.as_bytes().contains(&0) {
        assert_eq!(unpacked, s);
    }
});
