use crate::calendar::{Calendar, CalendarResult, Material};
use chrono::NaiveDate;
use tracing::{info, warn};

/// Bind `material` to the slot dated `today`.
///
/// Last write wins: a second submission on the same day replaces the first,
/// and the replaced material is handed back. The calendar is only changed in
/// memory; persisting it is the caller's job.
pub fn assign(
    calendar: &mut Calendar,
    today: NaiveDate,
    material: Material,
) -> CalendarResult<Option<Material>> {
    material.validate()?;
    let slot = calendar.slot_for_date_mut(today)?;
    let previous = slot.material.replace(material);
    match &previous {
        Some(old) => warn!(
            index = slot.index,
            %today,
            replaced_subject = %old.subject,
            replaced_topic = %old.topic,
            "overwrote material already submitted today"
        ),
        None => info!(index = slot.index, %today, "assigned material"),
    }
    Ok(previous)
}
