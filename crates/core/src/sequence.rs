//! Gap-filling sequence allocation.
//!
//! The "next sequence" is never stored. It is derived from a snapshot of
//! every existing asset code, so sequences freed by deletions are reused
//! before the counter grows past the historical maximum. These functions are
//! pure: the caller is responsible for reading the snapshot and persisting
//! the consuming rows inside one transaction.

use std::collections::HashSet;

use crate::code::AssetCode;

/// Extract the sequence number from a code. Malformed codes yield `None`.
pub fn parse_sequence(code: &str) -> Option<u32> {
    code.parse::<AssetCode>().ok().map(|c| c.sequence)
}

/// Set of sequence numbers occupied by well-formed codes.
pub fn occupied_sequences<I, S>(codes: I) -> HashSet<u32>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    codes
        .into_iter()
        .filter_map(|code| parse_sequence(code.as_ref()))
        .collect()
}

/// First sequence `>= 1` not used by any existing code.
pub fn next_sequence<I, S>(codes: I) -> Option<u32>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    next_sequence_range(codes, 1)
}

/// First sequence `s >= 1` such that `s..s + count` are all free, or `None`
/// when no such window fits below `u32::MAX`.
///
/// A `count` of zero is treated as one.
pub fn next_sequence_range<I, S>(codes: I, count: u32) -> Option<u32>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    first_free_window(&occupied_sequences(codes), count)
}

/// Last sequence of the window of `count` starting at `first`, or `None` if
/// it would overflow.
pub fn window_end(first: u32, count: u32) -> Option<u32> {
    first.checked_add(count.max(1) - 1)
}

/// Sweep the occupied set in order for the first gap wide enough for `count`.
pub fn first_free_window(occupied: &HashSet<u32>, count: u32) -> Option<u32> {
    let count = count.max(1);
    let mut taken: Vec<u32> = occupied.iter().copied().filter(|s| *s >= 1).collect();
    taken.sort_unstable();

    let mut start = 1u32;
    for s in taken {
        if s < start {
            continue;
        }
        if s - start >= count {
            break;
        }
        // Any window containing `s` is blocked; resume just past it.
        start = s.checked_add(1)?;
    }
    window_end(start, count).map(|_| start)
}

/// Whether every sequence in `first..first + count` is free. Windows that
/// start at zero or run past `u32::MAX` are never free.
pub fn range_is_free(occupied: &HashSet<u32>, first: u32, count: u32) -> bool {
    match window_end(first, count) {
        Some(last) if first >= 1 => !occupied.iter().any(|s| (first..=last).contains(s)),
        _ => false,
    }
}
