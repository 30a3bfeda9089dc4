//! Clitic merging within one aligned analysis

use crate::error::{MorphError, Result};
use crate::lexicon::Part;

use super::merge_rules::MergeRules;
use super::{AnalysisRow, ChartSegment, MergedUnit};

fn unit_from(seg: &ChartSegment) -> Result<MergedUnit> {
    let features = seg.entry.require_features()?;
    Ok(MergedUnit {
        surface: seg.surface.clone(),
        seg_start: seg.seg_start,
        seg_end: seg.seg_end,
        start: 0,
        end: 0,
        part: seg.part,
        category: features.category.clone(),
        part_of_speech: features.part_of_speech.clone(),
        entries: vec![seg.entry.clone()],
    })
}

/// Append `seg` to the end of `unit`
fn absorb(unit: &mut MergedUnit, seg: &ChartSegment, max_chars: usize) -> Result<()> {
    unit.surface.push_str(&seg.surface);
    unit.seg_end = seg.seg_end;
    unit.entries.push(seg.entry.clone());
    check_len(unit, max_chars)
}

fn check_len(unit: &MergedUnit, max_chars: usize) -> Result<()> {
    if unit.surface.chars().count() > max_chars {
        return Err(MorphError::capacity("merged segment characters", max_chars));
    }
    Ok(())
}

/// Merge bound clitics of one analysis into their hosts
///
/// Offsets of the returned units are left at zero.
pub(super) fn merge_row(row: &AnalysisRow, rules: &MergeRules, max_chars: usize) -> Result<Vec<MergedUnit>> {
    let Some((first, rest)) = row.segments.split_first() else {
        return Ok(Vec::new());
    };

    if row.retokenized {
        let top = row.analysis.require_features()?;
        let mut unit = unit_from(first)?;
        unit.part = Part::Stem;
        unit.category = top.category.clone();
        unit.part_of_speech = top.part_of_speech.clone();
        check_len(&unit, max_chars)?;
        for seg in rest {
            absorb(&mut unit, seg, max_chars)?;
        }
        return Ok(vec![unit]);
    }

    let mut units: Vec<MergedUnit> = Vec::with_capacity(row.segments.len());
    // run of prefix inflections waiting for their host
    let mut pending: Option<MergedUnit> = None;

    for seg in &row.segments {
        let features = seg.entry.require_features()?;
        let pos = features.part_of_speech.as_str();

        if rules.is_prefix_inflection(seg.part, pos) {
            match pending.as_mut() {
                Some(buffer) => absorb(buffer, seg, max_chars)?,
                None => {
                    let unit = unit_from(seg)?;
                    check_len(&unit, max_chars)?;
                    pending = Some(unit);
                }
            }
            continue;
        }

        if pending.is_none() && rules.is_suffix_inflection(seg.part, features.category.as_str(), pos) {
            if let Some(last) = units.last_mut() {
                absorb(last, seg, max_chars)?;
                continue;
            }
        }

        let mut unit = unit_from(seg)?;
        if let Some(mut buffer) = pending.take() {
            buffer.surface.push_str(&unit.surface);
            unit.surface = buffer.surface;
            unit.seg_start = buffer.seg_start;
            buffer.entries.append(&mut unit.entries);
            unit.entries = buffer.entries;
        }
        check_len(&unit, max_chars)?;
        units.push(unit);
    }

    if let Some(buffer) = pending {
        units.push(buffer);
    }
    Ok(units)
}
