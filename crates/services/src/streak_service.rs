use std::sync::Arc;

use quiz_core::model::StreakRecord;
use storage::repository::{PreferenceStore, PreferenceValue, keys};

use crate::Clock;
use crate::error::StreakServiceError;

/// Daily play streak backed by the preference store.
#[derive(Clone)]
pub struct StreakService {
    clock: Clock,
    preferences: Arc<dyn PreferenceStore>,
}

impl StreakService {
    #[must_use]
    pub fn new(clock: Clock, preferences: Arc<dyn PreferenceStore>) -> Self {
        Self { clock, preferences }
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    /// Read the persisted streak. Missing keys yield an empty record.
    ///
    /// # Errors
    ///
    /// Returns `StreakServiceError` on storage failures or malformed values.
    pub async fn load(&self) -> Result<StreakRecord, StreakServiceError> {
        let count = self.preferences.get_int(keys::STREAK).await?;
        let last_played = self.preferences.get_string(keys::LAST_PLAYED_DATE).await?;
        Ok(StreakRecord::from_persisted(count, last_played.as_deref())?)
    }

    /// Persist both streak fields in one write.
    ///
    /// # Errors
    ///
    /// Returns `StreakServiceError::Storage` if the write fails. The stored
    /// count and date are then both left as they were.
    pub async fn save(&self, record: &StreakRecord) -> Result<(), StreakServiceError> {
        let mut entries = vec![(
            keys::STREAK,
            PreferenceValue::Int(i64::from(record.streak_count())),
        )];
        if let Some(date) = record.last_played_iso() {
            entries.push((keys::LAST_PLAYED_DATE, PreferenceValue::Text(date)));
        }
        self.preferences.set_many(&entries).await?;
        Ok(())
    }

    /// Count today's play and persist the result when it changes.
    ///
    /// Never fails: unreadable state starts a fresh streak and a failed write
    /// leaves the returned record in memory only.
    pub async fn record_play(&self) -> StreakRecord {
        let current = match self.load().await {
            Ok(record) => record,
            Err(err) => {
                tracing::warn!(error = %err, "could not load streak; starting fresh");
                StreakRecord::default()
            }
        };

        let update = current.advance(self.clock.today());
        if update.changed {
            if let Err(err) = self.save(&update.record).await {
                tracing::warn!(error = %err, "could not persist streak; keeping it in memory");
            }
        }

        tracing::debug!(
            streak = update.record.streak_count(),
            changed = update.changed,
            "streak updated"
        );
        update.record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use quiz_core::time::fixed_now;
    use storage::repository::InMemoryRepository;

    fn service(repo: &InMemoryRepository) -> StreakService {
        StreakService::new(Clock::fixed(fixed_now()), Arc::new(repo.clone()))
    }

    fn iso(days_ago: i64) -> String {
        (fixed_now() - Duration::days(days_ago))
            .date_naive()
            .format("%Y-%m-%d")
            .to_string()
    }

    #[tokio::test]
    async fn first_play_persists_one_and_today() {
        let repo = InMemoryRepository::new();
        let record = service(&repo).record_play().await;

        assert_eq!(record.streak_count(), 1);
        assert_eq!(repo.get_int(keys::STREAK).await.unwrap(), Some(1));
        assert_eq!(
            repo.get_string(keys::LAST_PLAYED_DATE).await.unwrap(),
            Some(iso(0))
        );
    }

    #[tokio::test]
    async fn yesterday_increments_by_one() {
        let repo = InMemoryRepository::new();
        repo.set_int(keys::STREAK, 6).await.unwrap();
        repo.set_string(keys::LAST_PLAYED_DATE, &iso(1)).await.unwrap();

        let record = service(&repo).record_play().await;

        assert_eq!(record.streak_count(), 7);
        assert_eq!(repo.get_int(keys::STREAK).await.unwrap(), Some(7));
        assert_eq!(
            repo.get_string(keys::LAST_PLAYED_DATE).await.unwrap(),
            Some(iso(0))
        );
    }

    #[tokio::test]
    async fn three_day_gap_resets_to_one() {
        let repo = InMemoryRepository::new();
        repo.set_int(keys::STREAK, 6).await.unwrap();
        repo.set_string(keys::LAST_PLAYED_DATE, &iso(3)).await.unwrap();

        let record = service(&repo).record_play().await;

        assert_eq!(record.streak_count(), 1);
        assert_eq!(repo.get_int(keys::STREAK).await.unwrap(), Some(1));
    }

    #[tokio::test]
    async fn same_day_replay_changes_nothing() {
        let repo = InMemoryRepository::new();
        let svc = service(&repo);
        svc.record_play().await;
        let again = svc.record_play().await;

        assert_eq!(again.streak_count(), 1);
        assert_eq!(repo.get_int(keys::STREAK).await.unwrap(), Some(1));
    }

    #[tokio::test]
    async fn malformed_date_starts_fresh() {
        let repo = InMemoryRepository::new();
        repo.set_int(keys::STREAK, 12).await.unwrap();
        repo.set_string(keys::LAST_PLAYED_DATE, "yesterday")
            .await
            .unwrap();

        let record = service(&repo).record_play().await;

        assert_eq!(record.streak_count(), 1);
        assert_eq!(
            repo.get_string(keys::LAST_PLAYED_DATE).await.unwrap(),
            Some(iso(0))
        );
    }
}
