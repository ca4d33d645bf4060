//! Database row models for snapshots and registry records.
//!
//! Rows mirror the tables created by `migrations/`. Every snapshot table
//! carries the `time` of the `campaign_status` row it belongs to.

use chrono::{DateTime, Utc};

use crate::domain::{
    AttackEvent, DefendEvent, EventCategory, EventId, EventStatus, FactionStatus, OngoingEvent,
    Statistics,
};
use crate::error::HeraldError;

/// A row of the `campaign_status` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CampaignStatusRow {
    /// Snapshot observation time (primary key).
    pub time: DateTime<Utc>,
    /// Upstream error code.
    pub error: i32,
}

/// A row of the `faction_status` table.
#[derive(Debug, Clone, sqlx::FromRow)]
#[allow(missing_docs)]
pub struct FactionStatusRow {
    pub season: i32,
    pub points: i32,
    pub points_taken: i32,
    pub points_max: i32,
    pub status: String,
    pub introduction_order: i32,
}

impl From<FactionStatusRow> for FactionStatus {
    fn from(row: FactionStatusRow) -> Self {
        Self {
            season: row.season,
            points: row.points,
            points_taken: row.points_taken,
            points_max: row.points_max,
            status: row.status,
            introduction_order: row.introduction_order,
        }
    }
}

/// A row of the `defend_events` table.
#[derive(Debug, Clone, sqlx::FromRow)]
#[allow(missing_docs)]
pub struct DefendEventRow {
    pub season: i32,
    pub event_id: i32,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub enemy: i32,
    pub points_max: i32,
    pub points: i32,
    pub status: String,
    pub region: i32,
    pub players_at_start: i32,
}

impl From<DefendEventRow> for DefendEvent {
    fn from(row: DefendEventRow) -> Self {
        Self {
            season: row.season,
            event_id: EventId::new(row.event_id),
            start_time: row.start_time,
            end_time: row.end_time,
            enemy: row.enemy,
            points_max: row.points_max,
            points: row.points,
            status: parse_status(&row.status),
            region: row.region,
            players_at_start: row.players_at_start,
        }
    }
}

/// A row of the `attack_events` table.
#[derive(Debug, Clone, sqlx::FromRow)]
#[allow(missing_docs)]
pub struct AttackEventRow {
    pub season: i32,
    pub event_id: i32,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub enemy: i32,
    pub points_max: i32,
    pub points: i32,
    pub status: String,
    pub players_at_start: i32,
    pub max_event_id: i32,
}

impl From<AttackEventRow> for AttackEvent {
    fn from(row: AttackEventRow) -> Self {
        Self {
            season: row.season,
            event_id: EventId::new(row.event_id),
            start_time: row.start_time,
            end_time: row.end_time,
            enemy: row.enemy,
            points_max: row.points_max,
            points: row.points,
            status: parse_status(&row.status),
            players_at_start: row.players_at_start,
            max_event_id: row.max_event_id,
        }
    }
}

/// A row of the `statistics` table. Same columns as [`Statistics`].
#[derive(Debug, Clone, sqlx::FromRow)]
#[allow(missing_docs)]
pub struct StatisticsRow {
    pub season: i32,
    pub season_duration: i64,
    pub enemy: i32,
    pub players: i64,
    pub total_unique_players: i64,
    pub missions: i64,
    pub successful_missions: i64,
    pub total_mission_difficulty: i64,
    pub completed_planets: i64,
    pub defend_events: i64,
    pub successful_defend_events: i64,
    pub attack_events: i64,
    pub successful_attack_events: i64,
    pub deaths: i64,
    pub kills: i64,
    pub accidentals: i64,
    pub shots: i64,
    pub hits: i64,
}

impl From<StatisticsRow> for Statistics {
    fn from(row: StatisticsRow) -> Self {
        Self {
            season: row.season,
            season_duration: row.season_duration,
            enemy: row.enemy,
            players: row.players,
            total_unique_players: row.total_unique_players,
            missions: row.missions,
            successful_missions: row.successful_missions,
            total_mission_difficulty: row.total_mission_difficulty,
            completed_planets: row.completed_planets,
            defend_events: row.defend_events,
            successful_defend_events: row.successful_defend_events,
            attack_events: row.attack_events,
            successful_attack_events: row.successful_attack_events,
            deaths: row.deaths,
            kills: row.kills,
            accidentals: row.accidentals,
            shots: row.shots,
            hits: row.hits,
        }
    }
}

/// A row of the `ongoing_events` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OngoingEventRow {
    /// Upstream event id.
    pub event_id: i32,
    /// Category column (`"defend"`).
    pub category: String,
    /// When the record was written.
    pub tracked_since: DateTime<Utc>,
}

impl TryFrom<OngoingEventRow> for OngoingEvent {
    type Error = HeraldError;

    fn try_from(row: OngoingEventRow) -> Result<Self, Self::Error> {
        let category = row
            .category
            .parse::<EventCategory>()
            .map_err(HeraldError::Persistence)?;
        Ok(Self::new(
            EventId::new(row.event_id),
            category,
            row.tracked_since,
        ))
    }
}

fn parse_status(raw: &str) -> EventStatus {
    raw.parse().unwrap_or(EventStatus::Unknown)
}
