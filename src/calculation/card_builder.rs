//! Building time-cards from clock punches and work-slot templates.
//!
//! Both paths end in the same shape: start/end as `(HH:MM, next_day)` pairs
//! and break minutes split into the part outside and the part inside the
//! late-night window.

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};

use crate::error::{EngineError, EngineResult};
use crate::models::{
    BreakSlot, ContractId, DailyTimeCard, MonthId, TimeOfDay, TimeRecord, WorkSlot, WorkType,
};
use crate::policy::{Edge, TimePunch};

use super::rounding::round_edge_seconds;
use super::time_arithmetic::{AXIS_END, MINUTES_PER_DAY, MinuteSpan, late_night_minutes};

/// Converts a position on the two-day axis back into a clock value.
pub fn time_of_day_at(minute: u32) -> EngineResult<TimeOfDay> {
    if minute >= AXIS_END {
        return Err(EngineError::invalid_interval(format!(
            "minute {minute} cannot be expressed as a same-day or next-day time"
        )));
    }
    let within_day = minute % MINUTES_PER_DAY;
    let time = TimeOfDay::hm(within_day / 60, within_day % 60)?;
    Ok(if minute >= MINUTES_PER_DAY {
        time.on_next_day()
    } else {
        time
    })
}

/// Seconds from local midnight of `work_date` to an instant, in the civil offset.
fn axis_seconds(
    instant: DateTime<Utc>,
    work_date: NaiveDate,
    offset: FixedOffset,
) -> EngineResult<u32> {
    let local = instant.with_timezone(&offset).naive_local();
    let seconds = (local - work_date.and_time(chrono::NaiveTime::MIN)).num_seconds();
    u32::try_from(seconds)
        .ok()
        .filter(|s| *s < AXIS_END * 60)
        .ok_or_else(|| {
            EngineError::invalid_interval(format!(
                "punch at {local} is outside the two days starting {work_date}"
            ))
        })
}

/// The last minute a clock value can name is 23:59 of the next day; an end
/// rounded up onto the axis end is held there.
fn clamp_to_clock(minute: u32) -> u32 {
    minute.min(AXIS_END - 1)
}

/// Splits a set of break spans into `(normal, late_night)` minutes.
fn split_breaks(spans: &[MinuteSpan]) -> (u32, u32) {
    spans.iter().fold((0, 0), |(normal, late), span| {
        let in_window = late_night_minutes(*span);
        (normal + span.len() - in_window, late + in_window)
    })
}

/// Builds a work-day time-card from raw clock punches.
///
/// Punches are shifted into the tenant's civil offset, placed on the axis of
/// the record's work date and rounded edge by edge with the rounding policy.
///
/// # Errors
///
/// [`EngineError::InvalidInterval`] when a punch falls outside the two-day
/// axis or a rounded span runs backwards.
pub fn card_from_record(
    record: &TimeRecord,
    month_id: MonthId,
    offset: FixedOffset,
    punch: Option<&TimePunch>,
) -> EngineResult<DailyTimeCard> {
    let date = record.work_date;
    let start = clamp_to_clock(round_edge_seconds(
        axis_seconds(record.clock_in, date, offset)?,
        Edge::Start,
        punch,
    ));
    let end = clamp_to_clock(round_edge_seconds(
        axis_seconds(record.clock_out, date, offset)?,
        Edge::End,
        punch,
    ));
    let work = MinuteSpan::new(start, end)?;

    let breaks = record
        .breaks
        .iter()
        .map(|b| {
            let s = round_edge_seconds(axis_seconds(b.start, date, offset)?, Edge::BreakStart, punch);
            let e = round_edge_seconds(axis_seconds(b.end, date, offset)?, Edge::BreakEnd, punch);
            MinuteSpan::new(s, e)
        })
        .collect::<EngineResult<Vec<_>>>()?;
    let (normal, late) = split_breaks(&breaks);

    Ok(DailyTimeCard::new(month_id, record.contract_id, date, WorkType::Work)
        .with_times(time_of_day_at(work.start)?, time_of_day_at(work.end)?)
        .with_breaks(normal, late))
}

/// Pre-fills a work-day time-card from a work-time pattern slot.
pub fn card_from_slot(
    slot: &WorkSlot,
    month_id: MonthId,
    contract_id: ContractId,
    work_date: NaiveDate,
) -> EngineResult<DailyTimeCard> {
    // Validates the slot's own span
    MinuteSpan::from_times(&slot.start, &slot.end)?;

    let breaks = slot
        .breaks
        .iter()
        .map(|BreakSlot { start, end }| MinuteSpan::from_times(start, end))
        .collect::<EngineResult<Vec<_>>>()?;
    let (normal, late) = split_breaks(&breaks);

    Ok(DailyTimeCard::new(month_id, contract_id, work_date, WorkType::Work)
        .with_times(slot.start, slot.end)
        .with_breaks(normal, late))
}
