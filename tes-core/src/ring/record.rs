//! Marker trait for plain-old-data ring records (spec §6: "no internal
//! pointers; strings are fixed-length or indexed").

/// Implemented only for `#[repr(C)]`, `Copy` structs with no heap pointers,
/// so it is safe to `memcpy` them into and out of shared memory.
///
/// # Safety
/// Implementors must be `#[repr(C)]` (or `#[repr(C, packed)]`), `Copy`, and
/// free of any field that owns heap memory or a process-local pointer.
pub unsafe trait RingRecord: Copy {}

/// Copies `src` into a fixed-size `NUL`-padded byte array, truncating if
/// `src` is longer than `N`.
pub fn pack_fixed_str<const N: usize>(src: &str) -> [u8; N] {
    let mut buf = [0u8; N];
    let bytes = src.as_bytes();
    let len = bytes.len().min(N);
    buf[..len].copy_from_slice(&bytes[..len]);
    buf
}

/// Inverse of [`pack_fixed_str`]: reads up to the first NUL (or the whole
/// buffer) as UTF-8, lossily replacing invalid sequences.
pub fn unpack_fixed_str<const N: usize>(buf: &[u8; N]) -> String {
    let end = buf.iter().position(|&b| b == 0).unwrap_or(N);
    String::from_utf8_lossy(&buf[..end]).into_owned()
}
