// src/models/mod.rs

pub mod leveling;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Closed set of XP ledger reasons. Kept as an enum (not free-form strings)
/// so daily-cap queries and reporting stay robust.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Eq, PartialEq, Hash, sqlx::Type)]
#[sqlx(type_name = "TEXT")]
#[sqlx(rename_all = "snake_case")]
pub enum XpReason {
    Quiz,
    Onboarding,
    Homework,
    Contest,
    Poll,
    Vote,
    Daily,
    ChallengeSubmit,
}

impl fmt::Display for XpReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            XpReason::Quiz => "quiz",
            XpReason::Onboarding => "onboarding",
            XpReason::Homework => "homework",
            XpReason::Contest => "contest",
            XpReason::Poll => "poll",
            XpReason::Vote => "vote",
            XpReason::Daily => "daily",
            XpReason::ChallengeSubmit => "challenge_submit",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for XpReason {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "quiz" => Ok(XpReason::Quiz),
            "onboarding" => Ok(XpReason::Onboarding),
            "homework" => Ok(XpReason::Homework),
            "contest" => Ok(XpReason::Contest),
            "poll" => Ok(XpReason::Poll),
            "vote" => Ok(XpReason::Vote),
            "daily" => Ok(XpReason::Daily),
            "challenge_submit" => Ok(XpReason::ChallengeSubmit),
            _ => Err(format!("Unknown xp reason: {}", s)),
        }
    }
}

/// Outcome of a single XP award.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XpAward {
    pub new_total: i64,
    pub new_level: i32,
    pub leveled_up: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
pub struct User {
    pub telegram_id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub display_name: Option<String>,
    pub lang: String,
    pub onboarding_complete: bool,
    pub xp: i64,
    pub xp_level: i32,
    pub joined_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
pub struct XpLogEntry {
    pub id: i64,
    pub user_id: i64,
    pub amount: i64,
    pub reason: XpReason,
    pub reference_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Who a broadcast goes to. Parsed from the `audience` / `topic_slug`
/// columns on `scheduled_messages`.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Audience {
    All,
    Completed,
    Topic(String),
}

impl Audience {
    pub fn from_columns(audience: &str, topic_slug: Option<&str>) -> Self {
        match audience {
            "completed" => Audience::Completed,
            "topic" => match topic_slug {
                Some(slug) => Audience::Topic(slug.to_string()),
                None => Audience::All,
            },
            _ => Audience::All,
        }
    }

    pub fn as_columns(&self) -> (&'static str, Option<&str>) {
        match self {
            Audience::All => ("all", None),
            Audience::Completed => ("completed", None),
            Audience::Topic(slug) => ("topic", Some(slug.as_str())),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, Eq, PartialEq, sqlx::Type)]
#[sqlx(type_name = "TEXT")]
#[sqlx(rename_all = "lowercase")]
pub enum MessageStatus {
    Pending,
    Sending,
    Sent,
    Cancelled,
}

impl fmt::Display for MessageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MessageStatus::Pending => "pending",
            MessageStatus::Sending => "sending",
            MessageStatus::Sent => "sent",
            MessageStatus::Cancelled => "cancelled",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
pub struct ScheduledMessage {
    pub id: i64,
    pub text: String,
    pub audience: String,
    pub topic_slug: Option<String>,
    pub send_at: DateTime<Utc>,
    pub status: MessageStatus,
    pub sent_count: i64,
    pub created_by: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl ScheduledMessage {
    pub fn audience_selector(&self) -> Audience {
        Audience::from_columns(&self.audience, self.topic_slug.as_deref())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, Eq, PartialEq, Hash, sqlx::Type)]
#[sqlx(type_name = "TEXT")]
#[sqlx(rename_all = "lowercase")]
pub enum ContestType {
    Poll,
    Quiz,
    Challenge,
}

impl fmt::Display for ContestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ContestType::Poll => "poll",
            ContestType::Quiz => "quiz",
            ContestType::Challenge => "challenge",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for ContestType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "poll" => Ok(ContestType::Poll),
            "quiz" => Ok(ContestType::Quiz),
            "challenge" => Ok(ContestType::Challenge),
            _ => Err(format!("Unknown contest type: {}", s)),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, Eq, PartialEq, Hash, sqlx::Type)]
#[sqlx(type_name = "TEXT")]
#[sqlx(rename_all = "lowercase")]
pub enum ContestStatus {
    Pending,
    Active,
    Voting,
    Closed,
}

impl ContestStatus {
    /// Lifecycle moves only forward: pending -> active -> voting -> closed.
    /// `voting` is reachable only for challenge contests; the type check
    /// lives in the contest service.
    pub fn can_transition_to(self, next: ContestStatus) -> bool {
        use ContestStatus::*;
        matches!(
            (self, next),
            (Pending, Active)
                | (Pending, Closed)
                | (Active, Voting)
                | (Active, Closed)
                | (Voting, Closed)
        )
    }

    pub fn is_open(self) -> bool {
        !matches!(self, ContestStatus::Closed)
    }
}

impl fmt::Display for ContestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ContestStatus::Pending => "pending",
            ContestStatus::Active => "active",
            ContestStatus::Voting => "voting",
            ContestStatus::Closed => "closed",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
pub struct Contest {
    pub id: i64,
    pub contest_type: ContestType,
    pub title: String,
    pub description: Option<String>,
    pub status: ContestStatus,
    pub config: Option<String>,
    pub deadline: Option<DateTime<Utc>>,
    pub xp_first: i64,
    pub xp_second: i64,
    pub xp_third: i64,
    pub xp_participate: i64,
    pub created_by: Option<i64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewContest {
    pub contest_type: ContestType,
    pub title: String,
    pub description: Option<String>,
    pub config: Option<String>,
    pub deadline: Option<DateTime<Utc>>,
    pub xp_first: i64,
    pub xp_second: i64,
    pub xp_third: i64,
    pub xp_participate: i64,
    pub created_by: Option<i64>,
}

impl NewContest {
    pub fn new(contest_type: ContestType, title: impl Into<String>) -> Self {
        Self {
            contest_type,
            title: title.into(),
            description: None,
            config: None,
            deadline: None,
            xp_first: 50,
            xp_second: 30,
            xp_third: 15,
            xp_participate: 5,
            created_by: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
pub struct ContestEntry {
    pub id: i64,
    pub contest_id: i64,
    pub user_id: i64,
    pub answer: Option<String>,
    pub is_correct: Option<bool>,
    pub score: i64,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
pub struct ContestVote {
    pub id: i64,
    pub contest_id: i64,
    pub voter_id: i64,
    pub entry_id: i64,
    pub created_at: DateTime<Utc>,
}

/// One ranked row of a finished (or in-progress) contest.
#[derive(Debug, Clone)]
pub struct ContestResult {
    pub entry: ContestEntry,
    pub votes: i64,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, Eq, PartialEq, sqlx::Type)]
#[sqlx(type_name = "TEXT")]
#[sqlx(rename_all = "lowercase")]
pub enum HomeworkStatus {
    Active,
    Closed,
}

impl fmt::Display for HomeworkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HomeworkStatus::Active => write!(f, "active"),
            HomeworkStatus::Closed => write!(f, "closed"),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
pub struct Homework {
    pub id: i64,
    pub title: String,
    /// Comma-separated topic slugs, as the operator entered them.
    pub topic_slugs: String,
    pub deadline: Option<DateTime<Utc>>,
    pub xp_reward: i64,
    pub status: HomeworkStatus,
    pub created_by: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl Homework {
    pub fn topics(&self) -> Vec<&str> {
        self.topic_slugs.split(',').filter(|s| !s.is_empty()).collect()
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
pub struct HomeworkProgress {
    pub id: i64,
    pub homework_id: i64,
    pub user_id: i64,
    pub topic_slug: String,
    pub completed_at: DateTime<Utc>,
}

/// Leaderboard row: user identity plus cumulative XP.
#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
pub struct LeaderboardRow {
    pub telegram_id: i64,
    pub display_name: Option<String>,
    pub first_name: Option<String>,
    pub username: Option<String>,
    pub xp: i64,
    pub xp_level: i32,
}
