//! In-memory stand-ins for the schedule store, the availability service and the clock.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use time::OffsetDateTime;

use super::client::AvailabilityClient;
use super::repo::ScheduleStore;
use super::repo_types::{MealDetail, ScheduleEntry};
use super::services::Clock;
use crate::errors::AppError;

pub struct FixedClock(pub OffsetDateTime);

impl Clock for FixedClock {
    fn now(&self) -> OffsetDateTime {
        self.0
    }
}

/// Schedule store that records every call as `"<operation>:<id>"`.
#[derive(Default)]
pub struct MemoryScheduleStore {
    schedules: Mutex<HashMap<String, Vec<ScheduleEntry>>>,
    meals: Mutex<HashMap<String, MealDetail>>,
    calls: Mutex<Vec<String>>,
    fail_updates: Mutex<bool>,
}

impl MemoryScheduleStore {
    pub fn set_schedule(&self, user_id: &str, entries: Vec<ScheduleEntry>) {
        self.schedules
            .lock()
            .unwrap()
            .insert(user_id.to_owned(), entries);
    }

    pub fn set_meal(&self, meal: MealDetail) {
        self.meals
            .lock()
            .unwrap()
            .insert(meal.meal_id.clone(), meal);
    }

    pub fn fail_updates(&self) {
        *self.fail_updates.lock().unwrap() = true;
    }

    pub fn schedule(&self, user_id: &str) -> Vec<ScheduleEntry> {
        self.schedules
            .lock()
            .unwrap()
            .get(user_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, op: &str, id: &str) {
        self.calls.lock().unwrap().push(format!("{op}:{id}"));
    }
}

#[async_trait]
impl ScheduleStore for MemoryScheduleStore {
    async fn load_schedule(&self, user_id: &str) -> Result<Vec<ScheduleEntry>, AppError> {
        self.record("load_schedule", user_id);
        self.schedules
            .lock()
            .unwrap()
            .get(user_id)
            .cloned()
            .ok_or_else(|| AppError::not_found("user", user_id))
    }

    async fn load_meal_detail(&self, meal_id: &str) -> Result<MealDetail, AppError> {
        self.record("load_meal_detail", meal_id);
        self.meals
            .lock()
            .unwrap()
            .get(meal_id)
            .cloned()
            .ok_or_else(|| AppError::not_found("meal", meal_id))
    }

    async fn update_schedule(
        &self,
        user_id: &str,
        entries: &[ScheduleEntry],
    ) -> Result<(), AppError> {
        self.record("update_schedule", user_id);
        if *self.fail_updates.lock().unwrap() {
            return Err(AppError::io(
                "update_schedule",
                user_id,
                anyhow::anyhow!("transaction rolled back"),
            ));
        }
        self.schedules
            .lock()
            .unwrap()
            .insert(user_id.to_owned(), entries.to_vec());
        Ok(())
    }
}

enum Reply {
    List(String),
    Fail,
    Hang,
}

/// Availability service answering every request the same way.
pub struct StaticAvailability {
    reply: Reply,
    requests: Mutex<Vec<Vec<String>>>,
}

impl StaticAvailability {
    pub fn replying(list: &str) -> Self {
        Self::with(Reply::List(list.to_owned()))
    }

    pub fn failing() -> Self {
        Self::with(Reply::Fail)
    }

    pub fn hanging() -> Self {
        Self::with(Reply::Hang)
    }

    fn with(reply: Reply) -> Self {
        Self {
            reply,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<Vec<String>> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl AvailabilityClient for StaticAvailability {
    async fn get_missing_products(&self, recipes: &[String]) -> Result<String, AppError> {
        self.requests.lock().unwrap().push(recipes.to_vec());
        match &self.reply {
            Reply::List(list) => Ok(list.clone()),
            Reply::Fail => Err(AppError::io(
                "get_missing_products",
                "barn",
                anyhow::anyhow!("connection refused"),
            )),
            Reply::Hang => std::future::pending().await,
        }
    }
}
