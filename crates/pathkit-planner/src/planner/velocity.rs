//! Trapezoidal velocity planning
//!
//! Every group starts and ends at rest. Planning runs in three passes:
//! a forward pass bounds each peak by what can be reached from the start,
//! a backward pass bounds it by what can still be stopped before the end,
//! and a final pass turns the resulting junction speeds into
//! accelerate / cruise / decelerate phases.
//!
//! All speeds are squared. A fragment reaching squared speed `v²` from rest
//! under acceleration `a` needs a distance of `v² / 2a`; `accel_len` and
//! `decel_len` are these virtual distances for the entry and exit speeds.

use tracing::trace;

use super::{Fragment, Group, RunFragment, SpeedType};

/// Fragments shorter than this carry no speed profile
const MIN_PLANNED_LENGTH: f32 = 1e-9;

/// Plan the speed profile of every fragment in `group`
pub fn plan_group(group: &mut Group) {
    let fragments = &mut group.fragments;
    if fragments.is_empty() {
        return;
    }

    limit_speed(fragments.iter_mut(), SpeedType::Accel);
    limit_speed(fragments.iter_mut().rev(), SpeedType::Decel);

    let peaks: Vec<f32> = fragments.iter().map(|f| f.squared_speed).collect();
    let last = peaks.len() - 1;
    for (i, fragment) in fragments.iter_mut().enumerate() {
        let entry = if i > 0 { peaks[i - 1].min(peaks[i]) } else { 0.0 };
        let exit = if i < last { peaks[i + 1].min(peaks[i]) } else { 0.0 };
        segment_fragment(fragment, entry, exit);
    }

    trace!(
        "Planned group of {} fragments, {:.4}s",
        group.fragments.len(),
        group.duration()
    );
}

/// One pass over the group, lowering peaks to what the ramp can reach
///
/// `direction` is [`SpeedType::Accel`] for the forward pass (records
/// `accel_len`) and [`SpeedType::Decel`] for the backward pass (records
/// `decel_len`).
fn limit_speed<'a>(fragments: impl Iterator<Item = &'a mut Fragment>, direction: SpeedType) {
    let mut previous_sq: Option<f32> = None;
    for fragment in fragments {
        let boundary = previous_sq.map_or(0.0, |prev| prev.min(fragment.squared_speed));
        let two_a = 2.0 * fragment.max_accel;
        let ramp_len = if two_a > 0.0 { boundary / two_a } else { 0.0 };
        fragment.squared_speed = fragment
            .squared_speed
            .min(two_a * (ramp_len + fragment.length));
        match direction {
            SpeedType::Decel => fragment.decel_len = ramp_len,
            _ => fragment.accel_len = ramp_len,
        }
        previous_sq = Some(fragment.squared_speed);
    }
}

/// Split a fragment into speed phases given its entry and exit squared speeds
fn segment_fragment(fragment: &mut Fragment, entry_sq: f32, exit_sq: f32) {
    fragment.run_fragments.clear();
    fragment.duration = 0.0;

    let accel = fragment.max_accel;
    let length = fragment.length;
    if length <= MIN_PLANNED_LENGTH || accel <= 0.0 {
        fragment.accel_len = 0.0;
        fragment.decel_len = 0.0;
        return;
    }

    let two_a = 2.0 * accel;
    let accel_len = entry_sq / two_a;
    let decel_len = exit_sq / two_a;
    fragment.accel_len = accel_len;
    fragment.decel_len = decel_len;

    // Where the ramp up from the entry meets the ramp down to the exit
    let meeting = (decel_len + length - accel_len) / 2.0;
    let meet_sq = two_a * (accel_len + meeting);

    let (peak, accel_end, decel_start) =
        if (0.0..=length).contains(&meeting) && meet_sq <= fragment.squared_speed {
            (meet_sq, meeting, meeting)
        } else {
            let peak = fragment.squared_speed;
            (
                peak,
                (peak - two_a * accel_len) / two_a,
                (two_a * (decel_len + length) - peak) / two_a,
            )
        };

    let accel_end = accel_end.clamp(0.0, length);
    let decel_start = decel_start.clamp(accel_end, length);
    let entry_sq = entry_sq.min(peak);
    let exit_sq = exit_sq.min(peak);
    fragment.squared_speed = peak;

    if accel_end > 0.0 {
        push_run(fragment, SpeedType::Accel, 0.0, accel_end, entry_sq, peak, peak);
    }
    if decel_start > accel_end {
        push_run(fragment, SpeedType::Const, accel_end, decel_start, peak, peak, peak);
    }
    if decel_start < length {
        push_run(fragment, SpeedType::Decel, decel_start, length, peak, exit_sq, peak);
    }
}

fn push_run(
    fragment: &mut Fragment,
    speed_type: SpeedType,
    start_x: f32,
    stop_x: f32,
    from_sq_speed: f32,
    to_sq_speed: f32,
    squared_speed: f32,
) {
    let duration = match speed_type {
        SpeedType::Const => {
            let speed = squared_speed.sqrt();
            if speed > 0.0 {
                (stop_x - start_x) / speed
            } else {
                0.0
            }
        }
        SpeedType::Accel | SpeedType::Decel => {
            (from_sq_speed.sqrt() - to_sq_speed.sqrt()).abs() / fragment.max_accel
        }
    };

    fragment.duration += duration;
    fragment.run_fragments.push(RunFragment {
        speed_type,
        start_x,
        stop_x,
        from_sq_speed,
        to_sq_speed,
        squared_speed,
        duration,
    });
}
