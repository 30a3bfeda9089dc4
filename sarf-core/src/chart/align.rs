//! Shared segment-index grid across competing analyses

use crate::lexicon::Part;

use super::AnalysisRow;

/// Pad every row to the longest row's length, then re-express segment
/// character spans as indices on a grid shared by all rows
pub(super) fn align(rows: &mut [AnalysisRow]) {
    let max_len = rows.iter().map(|r| r.char_len).max().unwrap_or(0);

    for row in rows.iter_mut() {
        pad(row, max_len - row.char_len);
    }

    // boundary[p] is set when any row has a segment edge at character p
    let mut boundary = vec![false; max_len + 1];
    boundary[0] = true;
    boundary[max_len] = true;
    for seg in rows.iter().flat_map(|r| &r.segments) {
        boundary[seg.char_start] = true;
        boundary[seg.char_end] = true;
    }

    // index[p] counts the boundaries strictly before p
    let mut index = vec![0usize; max_len + 1];
    let mut counter = 0;
    for p in 0..=max_len {
        index[p] = counter;
        if boundary[p] {
            counter += 1;
        }
    }

    for seg in rows.iter_mut().flat_map(|r| r.segments.iter_mut()) {
        seg.seg_start = index[seg.char_start];
        seg.seg_end = index[seg.char_end];
    }
}

/// Stretch the first STEM segment (the last segment when there is none) by
/// `extra` characters, shifting everything after it
fn pad(row: &mut AnalysisRow, extra: usize) {
    if extra == 0 || row.segments.is_empty() {
        return;
    }
    let target = row
        .segments
        .iter()
        .position(|s| s.part == Part::Stem)
        .unwrap_or(row.segments.len() - 1);

    row.segments[target].char_end += extra;
    for seg in &mut row.segments[target + 1..] {
        seg.char_start += extra;
        seg.char_end += extra;
    }
}
