use std::{future::Future, sync::Arc};

use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};
use time::{Duration, OffsetDateTime, UtcOffset};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use super::client::AvailabilityClient;
use super::repo::ScheduleStore;
use super::repo_types::{MealDetail, ScheduleEntry};
use crate::errors::AppError;

/// Sentinel larger than any hour distance within one day.
const MAX_HOUR_DISTANCE: i32 = 24;

pub trait Clock: Send + Sync {
    fn now(&self) -> OffsetDateTime;
}

/// Wall clock viewed through a fixed UTC offset, which defines "today".
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    offset: UtcOffset,
}

impl SystemClock {
    pub fn new(offset: UtcOffset) -> Self {
        Self { offset }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc().to_offset(self.offset)
    }
}

fn is_same_day(at: OffsetDateTime, now: OffsetDateTime) -> bool {
    at.to_offset(now.offset()).date() == now.date()
}

/// A schedule is actual when at least one entry falls on today's date.
pub fn is_actual(entries: &[ScheduleEntry], now: OffsetDateTime) -> bool {
    entries.iter().any(|e| is_same_day(e.eat_at, now))
}

/// Picks today's entry with the smallest signed hour distance to `now`.
///
/// The distance is `entry.hour - now.hour`, so an entry earlier today (negative distance)
/// wins over any upcoming one. Equal distances keep the first entry seen.
pub fn find_closest_meal(
    entries: &[ScheduleEntry],
    now: OffsetDateTime,
) -> Result<&ScheduleEntry, AppError> {
    let mut min_dist = MAX_HOUR_DISTANCE;
    let mut closest = None;
    for entry in entries {
        let local = entry.eat_at.to_offset(now.offset());
        if local.date() != now.date() {
            continue;
        }
        let dist = i32::from(local.hour()) - i32::from(now.hour());
        if dist < min_dist {
            min_dist = dist;
            closest = Some(entry);
        }
    }
    closest.ok_or(AppError::InvalidSchedule)
}

/// Shuffles the timestamps across entries and moves every one of them a week ahead.
///
/// Ids and meal types stay with their entry; only the time slot is reassigned. A slot that
/// cannot be moved a week ahead makes the whole schedule invalid.
pub fn reschedule<R: Rng + ?Sized>(
    entries: &[ScheduleEntry],
    rng: &mut R,
) -> Result<Vec<ScheduleEntry>, AppError> {
    let mut slots: Vec<OffsetDateTime> = entries.iter().map(|e| e.eat_at).collect();
    slots.shuffle(rng);
    entries
        .iter()
        .zip(slots)
        .map(|(entry, slot)| {
            let eat_at = slot.checked_add(Duration::days(7)).ok_or_else(|| {
                warn!(meal_id = %entry.meal_id, %slot, "slot cannot move a week ahead");
                AppError::InvalidSchedule
            })?;
            Ok(ScheduleEntry {
                meal_id: entry.meal_id.clone(),
                eat_at,
                meal_type: entry.meal_type,
            })
        })
        .collect()
}

/// Runs one I/O step unless the request is already cancelled, aborting it on cancellation.
async fn cancellable<T, F>(cancel: &CancellationToken, step: F) -> Result<T, AppError>
where
    F: Future<Output = Result<T, AppError>>,
{
    if cancel.is_cancelled() {
        return Err(AppError::Cancelled);
    }
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(AppError::Cancelled),
        res = step => res,
    }
}

/// Picks the user's next meal and builds its shopping list.
pub struct Scheduler {
    store: Arc<dyn ScheduleStore>,
    client: Arc<dyn AvailabilityClient>,
    clock: Arc<dyn Clock>,
    seed: Option<u64>,
}

impl Scheduler {
    pub fn new(
        store: Arc<dyn ScheduleStore>,
        client: Arc<dyn AvailabilityClient>,
        clock: Arc<dyn Clock>,
        seed: Option<u64>,
    ) -> Self {
        Self {
            store,
            client,
            clock,
            seed,
        }
    }

    fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    /// Meal detail of the closest meal today plus the products still to buy for it.
    #[instrument(skip(self, cancel))]
    pub async fn get_meal(
        &self,
        user_id: &str,
        cancel: &CancellationToken,
    ) -> Result<(MealDetail, String), AppError> {
        let mut entries = cancellable(cancel, self.store.load_schedule(user_id)).await?;
        let now = self.clock.now();

        if !is_actual(&entries, now) {
            entries = self.reschedule_menu(user_id, &entries, cancel).await?;
        }

        let meal_id = match find_closest_meal(&entries, now) {
            Ok(entry) => entry.meal_id.clone(),
            Err(e) => {
                warn!(%user_id, entries = entries.len(), "no meal scheduled for today");
                return Err(e);
            }
        };
        debug!(%user_id, %meal_id, "closest meal selected");

        let meal = cancellable(cancel, self.store.load_meal_detail(&meal_id)).await?;
        let shopping_list = cancellable(cancel, self.client.get_missing_products(&meal.recipes))
            .await
            .map_err(|e| e.with_id(&meal_id))?;

        info!(%user_id, %meal_id, dishes = meal.dish_ids.len(), "meal fulfilled");
        Ok((meal, shopping_list))
    }

    async fn reschedule_menu(
        &self,
        user_id: &str,
        current: &[ScheduleEntry],
        cancel: &CancellationToken,
    ) -> Result<Vec<ScheduleEntry>, AppError> {
        let updated = reschedule(current, &mut self.rng())?;
        cancellable(cancel, self.store.update_schedule(user_id, &updated)).await?;
        info!(%user_id, entries = updated.len(), "stale schedule moved a week ahead");
        Ok(updated)
    }
}
