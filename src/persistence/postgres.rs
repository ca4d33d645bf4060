//! PostgreSQL implementation of the persistence layer.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};

use super::models::{
    AttackEventRow, CampaignStatusRow, DefendEventRow, FactionStatusRow, OngoingEventRow,
    StatisticsRow,
};
use super::{OngoingEventRegistry, SnapshotStore};
use crate::domain::{DefendEvent, EventCategory, EventId, OngoingEvent, Snapshot};
use crate::error::HeraldError;

const DEFEND_COLUMNS: &str = "season, event_id, start_time, end_time, enemy, points_max, \
     points, status, region, players_at_start";

/// PostgreSQL-backed persistence layer using `sqlx::PgPool`.
///
/// Every multi-statement operation runs in its own transaction, so a failed
/// call leaves the prior state intact.
#[derive(Debug, Clone)]
pub struct PostgresPersistence {
    pool: PgPool,
}

impl PostgresPersistence {
    /// Creates a new persistence layer with the given connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns the underlying connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn load_snapshot(&self, row: CampaignStatusRow) -> Result<Snapshot, HeraldError> {
        let faction_status = sqlx::query_as::<_, FactionStatusRow>(
            "SELECT season, points, points_taken, points_max, status, introduction_order \
             FROM faction_status WHERE time = $1 ORDER BY introduction_order",
        )
        .bind(row.time)
        .fetch_all(&self.pool)
        .await?;

        let defend_event = sqlx::query_as::<_, DefendEventRow>(&format!(
            "SELECT {DEFEND_COLUMNS} FROM defend_events WHERE time = $1"
        ))
        .bind(row.time)
        .fetch_optional(&self.pool)
        .await?;

        let attack_events = sqlx::query_as::<_, AttackEventRow>(
            "SELECT season, event_id, start_time, end_time, enemy, points_max, points, status, \
             players_at_start, max_event_id FROM attack_events WHERE time = $1 ORDER BY event_id",
        )
        .bind(row.time)
        .fetch_all(&self.pool)
        .await?;

        let statistics = sqlx::query_as::<_, StatisticsRow>(
            "SELECT season, season_duration, enemy, players, total_unique_players, missions, \
             successful_missions, total_mission_difficulty, completed_planets, defend_events, \
             successful_defend_events, attack_events, successful_attack_events, deaths, kills, \
             accidentals, shots, hits FROM statistics WHERE time = $1 ORDER BY enemy",
        )
        .bind(row.time)
        .fetch_all(&self.pool)
        .await?;

        Ok(Snapshot {
            observed_at: row.time,
            error_code: row.error,
            faction_status: faction_status.into_iter().map(Into::into).collect(),
            defend_event: defend_event.map(Into::into),
            attack_events: attack_events.into_iter().map(Into::into).collect(),
            statistics: statistics.into_iter().map(Into::into).collect(),
        })
    }
}

/// Returns the live record of `category`, locking it for the transaction.
async fn occupant(
    conn: &mut PgConnection,
    category: EventCategory,
) -> Result<Option<OngoingEvent>, HeraldError> {
    let row = sqlx::query_as::<_, OngoingEventRow>(
        "SELECT event_id, category, tracked_since FROM ongoing_events \
         WHERE category = $1 FOR UPDATE",
    )
    .bind(category.as_str())
    .fetch_optional(conn)
    .await?;
    row.map(OngoingEvent::try_from).transpose()
}

/// Inserts `record` unless its category is already taken.
async fn insert_ongoing(
    conn: &mut PgConnection,
    record: &OngoingEvent,
) -> Result<(), HeraldError> {
    match occupant(&mut *conn, record.category).await? {
        Some(held) if held.event_id == record.event_id => return Ok(()),
        Some(held) => {
            return Err(HeraldError::RegistryConflict {
                category: record.category,
                held: held.event_id,
                requested: record.event_id,
            });
        }
        None => {}
    }

    sqlx::query(
        "INSERT INTO ongoing_events (event_id, category, tracked_since) VALUES ($1, $2, $3) \
         ON CONFLICT (event_id, category) DO NOTHING",
    )
    .bind(record.event_id.get())
    .bind(record.category.as_str())
    .bind(record.tracked_since)
    .execute(conn)
    .await?;
    Ok(())
}

#[async_trait]
impl SnapshotStore for PostgresPersistence {
    async fn append_snapshot(&self, snapshot: &Snapshot) -> Result<bool, HeraldError> {
        let mut tx = self.pool.begin().await?;
        let time = snapshot.observed_at;

        let inserted = sqlx::query(
            "INSERT INTO campaign_status (time, error) VALUES ($1, $2) \
             ON CONFLICT (time) DO NOTHING",
        )
        .bind(time)
        .bind(snapshot.error_code)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if inserted == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        for f in &snapshot.faction_status {
            sqlx::query(
                "INSERT INTO faction_status \
                 (time, season, points, points_taken, points_max, status, introduction_order) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7)",
            )
            .bind(time)
            .bind(f.season)
            .bind(f.points)
            .bind(f.points_taken)
            .bind(f.points_max)
            .bind(&f.status)
            .bind(f.introduction_order)
            .execute(&mut *tx)
            .await?;
        }

        if let Some(e) = &snapshot.defend_event {
            sqlx::query(&format!(
                "INSERT INTO defend_events (time, {DEFEND_COLUMNS}) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)"
            ))
            .bind(time)
            .bind(e.season)
            .bind(e.event_id.get())
            .bind(e.start_time)
            .bind(e.end_time)
            .bind(e.enemy)
            .bind(e.points_max)
            .bind(e.points)
            .bind(e.status.as_str())
            .bind(e.region)
            .bind(e.players_at_start)
            .execute(&mut *tx)
            .await?;
        }

        for a in &snapshot.attack_events {
            sqlx::query(
                "INSERT INTO attack_events (time, season, event_id, start_time, end_time, enemy, \
                 points_max, points, status, players_at_start, max_event_id) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
            )
            .bind(time)
            .bind(a.season)
            .bind(a.event_id.get())
            .bind(a.start_time)
            .bind(a.end_time)
            .bind(a.enemy)
            .bind(a.points_max)
            .bind(a.points)
            .bind(a.status.as_str())
            .bind(a.players_at_start)
            .bind(a.max_event_id)
            .execute(&mut *tx)
            .await?;
        }

        for s in &snapshot.statistics {
            sqlx::query(
                "INSERT INTO statistics (time, season, season_duration, enemy, players, \
                 total_unique_players, missions, successful_missions, total_mission_difficulty, \
                 completed_planets, defend_events, successful_defend_events, attack_events, \
                 successful_attack_events, deaths, kills, accidentals, shots, hits) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, \
                 $17, $18, $19)",
            )
            .bind(time)
            .bind(s.season)
            .bind(s.season_duration)
            .bind(s.enemy)
            .bind(s.players)
            .bind(s.total_unique_players)
            .bind(s.missions)
            .bind(s.successful_missions)
            .bind(s.total_mission_difficulty)
            .bind(s.completed_planets)
            .bind(s.defend_events)
            .bind(s.successful_defend_events)
            .bind(s.attack_events)
            .bind(s.successful_attack_events)
            .bind(s.deaths)
            .bind(s.kills)
            .bind(s.accidentals)
            .bind(s.shots)
            .bind(s.hits)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(true)
    }

    async fn latest_snapshot(&self) -> Result<Option<Snapshot>, HeraldError> {
        let row = sqlx::query_as::<_, CampaignStatusRow>(
            "SELECT time, error FROM campaign_status ORDER BY time DESC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(self.load_snapshot(row).await?)),
            None => Ok(None),
        }
    }

    async fn latest_snapshot_for(
        &self,
        at: DateTime<Utc>,
    ) -> Result<Option<Snapshot>, HeraldError> {
        let row = sqlx::query_as::<_, CampaignStatusRow>(
            "SELECT time, error FROM campaign_status WHERE time <= $1 ORDER BY time DESC LIMIT 1",
        )
        .bind(at)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(self.load_snapshot(row).await?)),
            None => Ok(None),
        }
    }

    async fn lookup_event_detail(
        &self,
        event_id: EventId,
        category: EventCategory,
    ) -> Result<Option<DefendEvent>, HeraldError> {
        match category {
            EventCategory::Defend => {
                let row = sqlx::query_as::<_, DefendEventRow>(&format!(
                    "SELECT {DEFEND_COLUMNS} FROM defend_events WHERE event_id = $1 \
                     ORDER BY time DESC LIMIT 1"
                ))
                .bind(event_id.get())
                .fetch_optional(&self.pool)
                .await?;
                Ok(row.map(Into::into))
            }
        }
    }
}

#[async_trait]
impl OngoingEventRegistry for PostgresPersistence {
    async fn upsert(&self, record: &OngoingEvent) -> Result<(), HeraldError> {
        let mut tx = self.pool.begin().await?;
        insert_ongoing(&mut *tx, record).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn remove(
        &self,
        event_id: EventId,
        category: EventCategory,
    ) -> Result<(), HeraldError> {
        sqlx::query("DELETE FROM ongoing_events WHERE event_id = $1 AND category = $2")
            .bind(event_id.get())
            .bind(category.as_str())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn replace(&self, old: &OngoingEvent, new: &OngoingEvent) -> Result<(), HeraldError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM ongoing_events WHERE event_id = $1 AND category = $2")
            .bind(old.event_id.get())
            .bind(old.category.as_str())
            .execute(&mut *tx)
            .await?;
        insert_ongoing(&mut *tx, new).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn find(&self, category: EventCategory) -> Result<Option<OngoingEvent>, HeraldError> {
        let row = sqlx::query_as::<_, OngoingEventRow>(
            "SELECT event_id, category, tracked_since FROM ongoing_events WHERE category = $1",
        )
        .bind(category.as_str())
        .fetch_optional(&self.pool)
        .await?;
        row.map(OngoingEvent::try_from).transpose()
    }

    async fn find_by_id(
        &self,
        event_id: EventId,
        category: EventCategory,
    ) -> Result<Option<OngoingEvent>, HeraldError> {
        let row = sqlx::query_as::<_, OngoingEventRow>(
            "SELECT event_id, category, tracked_since FROM ongoing_events \
             WHERE event_id = $1 AND category = $2",
        )
        .bind(event_id.get())
        .bind(category.as_str())
        .fetch_optional(&self.pool)
        .await?;
        row.map(OngoingEvent::try_from).transpose()
    }

    async fn list(&self) -> Result<Vec<OngoingEvent>, HeraldError> {
        let rows = sqlx::query_as::<_, OngoingEventRow>(
            "SELECT event_id, category, tracked_since FROM ongoing_events ORDER BY event_id",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(OngoingEvent::try_from).collect()
    }
}
