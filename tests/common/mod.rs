// Shared in-memory test doubles. Each mock implements a repository (or
// transport) trait over plain mutex-guarded state, mirroring what the
// Postgres implementations do at the row level: the same uniqueness
// conflicts, the same status-gated updates.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};

use kursbot::models::leveling::level_for;
use kursbot::models::{
    Audience, Contest, ContestEntry, ContestStatus, ContestType, Homework, HomeworkProgress,
    HomeworkStatus, LeaderboardRow, MessageStatus, ScheduledMessage, User, XpAward, XpReason,
};
use kursbot::platforms::{Messaging, TransportError};
use kursbot::repositories::{
    ContestRepo, GroupLogRepo, HomeworkRepo, ScheduledMessageRepo, SubscriptionRepo, UserRepo,
    XpRepo,
};
use kursbot::Error;

// ---------------------------------------------------------------- transport

#[derive(Default)]
pub struct MockTransport {
    pub sent: Mutex<Vec<(i64, String)>>,
    blocked: Mutex<HashSet<i64>>,
    failing: Mutex<HashSet<i64>>,
    next_message_id: AtomicI64,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a recipient as having blocked the bot (every send returns
    /// TransportError::Blocked).
    pub fn block(&self, chat_id: i64) {
        self.blocked.lock().unwrap().insert(chat_id);
    }

    /// Mark a recipient as transiently failing.
    pub fn fail(&self, chat_id: i64) {
        self.failing.lock().unwrap().insert(chat_id);
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub fn sent_to(&self, chat_id: i64) -> usize {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|(id, _)| *id == chat_id)
            .count()
    }

    pub fn last_text(&self) -> Option<String> {
        self.sent.lock().unwrap().last().map(|(_, t)| t.clone())
    }
}

#[async_trait::async_trait]
impl Messaging for MockTransport {
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<i64, TransportError> {
        if self.blocked.lock().unwrap().contains(&chat_id) {
            return Err(TransportError::Blocked);
        }
        if self.failing.lock().unwrap().contains(&chat_id) {
            return Err(TransportError::Other("boom".into()));
        }
        self.sent.lock().unwrap().push((chat_id, text.to_string()));
        Ok(self.next_message_id.fetch_add(1, Ordering::SeqCst) + 1)
    }

    async fn edit_message_text(
        &self,
        _chat_id: i64,
        _message_id: i64,
        _text: &str,
    ) -> Result<(), TransportError> {
        Ok(())
    }

    async fn delete_message(&self, _chat_id: i64, _message_id: i64) -> Result<(), TransportError> {
        Ok(())
    }
}

// ----------------------------------------------------------------- xp ledger

struct XpState {
    // telegram_id -> (xp total, stored level)
    users: HashMap<i64, (i64, i32)>,
    ledger: Vec<(i64, i64, XpReason, Option<String>)>,
}

pub struct MockXpRepo {
    state: Mutex<XpState>,
}

impl MockXpRepo {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(XpState {
                users: HashMap::new(),
                ledger: Vec::new(),
            }),
        }
    }

    pub fn total(&self, user_id: i64) -> i64 {
        self.state
            .lock()
            .unwrap()
            .users
            .get(&user_id)
            .map(|(xp, _)| *xp)
            .unwrap_or(0)
    }

    pub fn level(&self, user_id: i64) -> i32 {
        self.state
            .lock()
            .unwrap()
            .users
            .get(&user_id)
            .map(|(_, lvl)| *lvl)
            .unwrap_or(1)
    }

    pub fn ledger_len(&self) -> usize {
        self.state.lock().unwrap().ledger.len()
    }

    /// (amount, reason) rows for one user, in award order.
    pub fn awards_for(&self, user_id: i64) -> Vec<(i64, XpReason)> {
        self.state
            .lock()
            .unwrap()
            .ledger
            .iter()
            .filter(|(uid, _, _, _)| *uid == user_id)
            .map(|(_, amount, reason, _)| (*amount, *reason))
            .collect()
    }
}

#[async_trait::async_trait]
impl XpRepo for MockXpRepo {
    async fn award(
        &self,
        user_id: i64,
        amount: i64,
        reason: XpReason,
        reference_id: Option<&str>,
    ) -> Result<XpAward, Error> {
        // One lock span stands in for the transaction: ledger append and
        // total increment land together or not at all.
        let mut state = self.state.lock().unwrap();
        state
            .ledger
            .push((user_id, amount, reason, reference_id.map(String::from)));
        let entry = state.users.entry(user_id).or_insert((0, 1));
        entry.0 += amount;
        let new_total = entry.0;
        let new_level = level_for(new_total);
        let leveled_up = new_level != entry.1;
        entry.1 = new_level;
        Ok(XpAward {
            new_total,
            new_level,
            leveled_up,
        })
    }

    async fn daily_count(&self, user_id: i64, reason: XpReason) -> Result<i64, Error> {
        let state = self.state.lock().unwrap();
        Ok(state
            .ledger
            .iter()
            .filter(|(uid, _, r, _)| *uid == user_id && *r == reason)
            .count() as i64)
    }

    async fn breakdown(&self, user_id: i64) -> Result<Vec<(XpReason, i64)>, Error> {
        let state = self.state.lock().unwrap();
        let mut totals: HashMap<XpReason, i64> = HashMap::new();
        for (uid, amount, reason, _) in &state.ledger {
            if *uid == user_id {
                *totals.entry(*reason).or_insert(0) += amount;
            }
        }
        let mut out: Vec<(XpReason, i64)> = totals.into_iter().collect();
        out.sort_by(|a, b| b.1.cmp(&a.1));
        Ok(out)
    }
}

// ------------------------------------------------------------------ contests

struct ContestState {
    contests: HashMap<i64, Contest>,
    entries: Vec<ContestEntry>,
    // (contest_id, voter_id, entry_id)
    votes: Vec<(i64, i64, i64)>,
    next_entry_id: i64,
    next_contest_id: i64,
    fail_upserts: u32,
}

pub struct MockContestRepo {
    state: Mutex<ContestState>,
}

/// A contest with default podium rewards (50/30/15, 5 to participate).
pub fn make_contest(id: i64, contest_type: ContestType, status: ContestStatus) -> Contest {
    Contest {
        id,
        contest_type,
        title: format!("contest {}", id),
        description: None,
        status,
        config: None,
        deadline: None,
        xp_first: 50,
        xp_second: 30,
        xp_third: 15,
        xp_participate: 5,
        created_by: None,
        created_at: Utc::now(),
    }
}

impl MockContestRepo {
    pub fn new() -> Self {
        Self::with(Vec::new())
    }

    pub fn with(contests: Vec<Contest>) -> Self {
        let next = contests.iter().map(|c| c.id).max().unwrap_or(0) + 1;
        Self {
            state: Mutex::new(ContestState {
                contests: contests.into_iter().map(|c| (c.id, c)).collect(),
                entries: Vec::new(),
                votes: Vec::new(),
                next_entry_id: 1,
                next_contest_id: next,
                fail_upserts: 0,
            }),
        }
    }

    pub fn status_of(&self, id: i64) -> Option<ContestStatus> {
        self.state.lock().unwrap().contests.get(&id).map(|c| c.status)
    }

    pub fn entry_count(&self, contest_id: i64) -> usize {
        self.state
            .lock()
            .unwrap()
            .entries
            .iter()
            .filter(|e| e.contest_id == contest_id)
            .count()
    }

    /// Make the next quiz entry upsert fail with a storage error.
    pub fn fail_next_upsert(&self) {
        self.state.lock().unwrap().fail_upserts += 1;
    }

    pub fn score_of(&self, contest_id: i64, user_id: i64) -> Option<i64> {
        self.state
            .lock()
            .unwrap()
            .entries
            .iter()
            .find(|e| e.contest_id == contest_id && e.user_id == user_id)
            .map(|e| e.score)
    }
}

#[async_trait::async_trait]
impl ContestRepo for MockContestRepo {
    async fn create(&self, contest: &kursbot::models::NewContest) -> Result<i64, Error> {
        let mut state = self.state.lock().unwrap();
        let id = state.next_contest_id;
        state.next_contest_id += 1;
        state.contests.insert(
            id,
            Contest {
                id,
                contest_type: contest.contest_type,
                title: contest.title.clone(),
                description: contest.description.clone(),
                status: ContestStatus::Pending,
                config: contest.config.clone(),
                deadline: contest.deadline,
                xp_first: contest.xp_first,
                xp_second: contest.xp_second,
                xp_third: contest.xp_third,
                xp_participate: contest.xp_participate,
                created_by: contest.created_by,
                created_at: Utc::now(),
            },
        );
        Ok(id)
    }

    async fn get(&self, id: i64) -> Result<Option<Contest>, Error> {
        Ok(self.state.lock().unwrap().contests.get(&id).cloned())
    }

    async fn set_status(&self, id: i64, status: ContestStatus) -> Result<(), Error> {
        if let Some(c) = self.state.lock().unwrap().contests.get_mut(&id) {
            c.status = status;
        }
        Ok(())
    }

    async fn open_contests(&self) -> Result<Vec<Contest>, Error> {
        let state = self.state.lock().unwrap();
        Ok(state
            .contests
            .values()
            .filter(|c| c.status.is_open())
            .cloned()
            .collect())
    }

    async fn open_past_deadline(&self, now: DateTime<Utc>) -> Result<Vec<Contest>, Error> {
        let state = self.state.lock().unwrap();
        Ok(state
            .contests
            .values()
            .filter(|c| c.status.is_open() && c.deadline.is_some_and(|d| d <= now))
            .cloned()
            .collect())
    }

    async fn insert_entry(
        &self,
        contest_id: i64,
        user_id: i64,
        answer: &str,
        is_correct: Option<bool>,
        score: i64,
    ) -> Result<(), Error> {
        let mut state = self.state.lock().unwrap();
        if state
            .entries
            .iter()
            .any(|e| e.contest_id == contest_id && e.user_id == user_id)
        {
            return Err(Error::Conflict(format!(
                "user {} already entered contest {}",
                user_id, contest_id
            )));
        }
        let id = state.next_entry_id;
        state.next_entry_id += 1;
        state.entries.push(ContestEntry {
            id,
            contest_id,
            user_id,
            answer: Some(answer.to_string()),
            is_correct,
            score,
            submitted_at: Utc::now() + Duration::milliseconds(id),
        });
        Ok(())
    }

    async fn upsert_quiz_entry(
        &self,
        contest_id: i64,
        user_id: i64,
        answer: &str,
        is_correct: bool,
        score_delta: i64,
    ) -> Result<(), Error> {
        let mut state = self.state.lock().unwrap();
        if state.fail_upserts > 0 {
            state.fail_upserts -= 1;
            return Err(Error::Transport("connection reset".into()));
        }
        if let Some(entry) = state
            .entries
            .iter_mut()
            .find(|e| e.contest_id == contest_id && e.user_id == user_id)
        {
            entry.answer = Some(answer.to_string());
            entry.is_correct = Some(is_correct);
            entry.score += score_delta;
            return Ok(());
        }
        let id = state.next_entry_id;
        state.next_entry_id += 1;
        state.entries.push(ContestEntry {
            id,
            contest_id,
            user_id,
            answer: Some(answer.to_string()),
            is_correct: Some(is_correct),
            score: score_delta,
            submitted_at: Utc::now() + Duration::milliseconds(id),
        });
        Ok(())
    }

    async fn user_entry(
        &self,
        contest_id: i64,
        user_id: i64,
    ) -> Result<Option<ContestEntry>, Error> {
        let state = self.state.lock().unwrap();
        Ok(state
            .entries
            .iter()
            .find(|e| e.contest_id == contest_id && e.user_id == user_id)
            .cloned())
    }

    async fn entries_by_score(&self, contest_id: i64) -> Result<Vec<ContestEntry>, Error> {
        let state = self.state.lock().unwrap();
        let mut entries: Vec<ContestEntry> = state
            .entries
            .iter()
            .filter(|e| e.contest_id == contest_id)
            .cloned()
            .collect();
        entries.sort_by(|a, b| b.score.cmp(&a.score).then(a.submitted_at.cmp(&b.submitted_at)));
        Ok(entries)
    }

    async fn insert_vote(
        &self,
        contest_id: i64,
        voter_id: i64,
        entry_id: i64,
    ) -> Result<(), Error> {
        let mut state = self.state.lock().unwrap();
        if state
            .votes
            .iter()
            .any(|(c, v, _)| *c == contest_id && *v == voter_id)
        {
            return Err(Error::Conflict(format!(
                "user {} already voted in contest {}",
                voter_id, contest_id
            )));
        }
        state.votes.push((contest_id, voter_id, entry_id));
        Ok(())
    }

    async fn vote_counts(&self, contest_id: i64) -> Result<Vec<(i64, i64)>, Error> {
        let state = self.state.lock().unwrap();
        let mut counts: HashMap<i64, i64> = HashMap::new();
        for (c, _, entry_id) in &state.votes {
            if *c == contest_id {
                *counts.entry(*entry_id).or_insert(0) += 1;
            }
        }
        let mut out: Vec<(i64, i64)> = counts.into_iter().collect();
        out.sort_by(|a, b| b.1.cmp(&a.1));
        Ok(out)
    }
}

// ------------------------------------------------------------------ homework

struct HomeworkState {
    homeworks: HashMap<i64, Homework>,
    // (homework_id, user_id, topic_slug)
    progress: Vec<(i64, i64, String)>,
    next_id: i64,
}

pub struct MockHomeworkRepo {
    state: Mutex<HomeworkState>,
}

pub fn make_homework(
    id: i64,
    topic_slugs: &str,
    deadline: Option<DateTime<Utc>>,
    status: HomeworkStatus,
) -> Homework {
    Homework {
        id,
        title: format!("homework {}", id),
        topic_slugs: topic_slugs.to_string(),
        deadline,
        xp_reward: 20,
        status,
        created_by: None,
        created_at: Utc::now(),
    }
}

impl MockHomeworkRepo {
    pub fn new() -> Self {
        Self::with(Vec::new())
    }

    pub fn with(homeworks: Vec<Homework>) -> Self {
        let next = homeworks.iter().map(|h| h.id).max().unwrap_or(0) + 1;
        Self {
            state: Mutex::new(HomeworkState {
                homeworks: homeworks.into_iter().map(|h| (h.id, h)).collect(),
                progress: Vec::new(),
                next_id: next,
            }),
        }
    }

    pub fn status_of(&self, id: i64) -> Option<HomeworkStatus> {
        self.state.lock().unwrap().homeworks.get(&id).map(|h| h.status)
    }

    pub fn progress_len(&self) -> usize {
        self.state.lock().unwrap().progress.len()
    }
}

#[async_trait::async_trait]
impl HomeworkRepo for MockHomeworkRepo {
    async fn create(
        &self,
        title: &str,
        topic_slugs: &[&str],
        deadline: Option<DateTime<Utc>>,
        xp_reward: i64,
        created_by: Option<i64>,
    ) -> Result<i64, Error> {
        let mut state = self.state.lock().unwrap();
        let id = state.next_id;
        state.next_id += 1;
        state.homeworks.insert(
            id,
            Homework {
                id,
                title: title.to_string(),
                topic_slugs: topic_slugs.join(","),
                deadline,
                xp_reward,
                status: HomeworkStatus::Active,
                created_by,
                created_at: Utc::now(),
            },
        );
        Ok(id)
    }

    async fn get(&self, id: i64) -> Result<Option<Homework>, Error> {
        Ok(self.state.lock().unwrap().homeworks.get(&id).cloned())
    }

    async fn active(&self) -> Result<Vec<Homework>, Error> {
        let state = self.state.lock().unwrap();
        Ok(state
            .homeworks
            .values()
            .filter(|h| h.status == HomeworkStatus::Active)
            .cloned()
            .collect())
    }

    async fn overdue(&self, now: DateTime<Utc>) -> Result<Vec<Homework>, Error> {
        let state = self.state.lock().unwrap();
        Ok(state
            .homeworks
            .values()
            .filter(|h| h.status == HomeworkStatus::Active && h.deadline.is_some_and(|d| d < now))
            .cloned()
            .collect())
    }

    async fn close(&self, id: i64) -> Result<bool, Error> {
        let mut state = self.state.lock().unwrap();
        match state.homeworks.get_mut(&id) {
            Some(h) if h.status == HomeworkStatus::Active => {
                h.status = HomeworkStatus::Closed;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn mark_complete(
        &self,
        homework_id: i64,
        user_id: i64,
        topic_slug: &str,
    ) -> Result<(), Error> {
        let mut state = self.state.lock().unwrap();
        if state
            .progress
            .iter()
            .any(|(h, u, t)| *h == homework_id && *u == user_id && t == topic_slug)
        {
            return Err(Error::Conflict(format!(
                "topic '{}' of homework {} already completed by user {}",
                topic_slug, homework_id, user_id
            )));
        }
        state
            .progress
            .push((homework_id, user_id, topic_slug.to_string()));
        Ok(())
    }

    async fn user_progress(
        &self,
        homework_id: i64,
        user_id: i64,
    ) -> Result<Vec<HomeworkProgress>, Error> {
        let state = self.state.lock().unwrap();
        Ok(state
            .progress
            .iter()
            .enumerate()
            .filter(|(_, (h, u, _))| *h == homework_id && *u == user_id)
            .map(|(i, (h, u, t))| HomeworkProgress {
                id: i as i64 + 1,
                homework_id: *h,
                user_id: *u,
                topic_slug: t.clone(),
                completed_at: Utc::now(),
            })
            .collect())
    }

    async fn completed_user_count(&self, homework_id: i64) -> Result<i64, Error> {
        let state = self.state.lock().unwrap();
        let users: HashSet<i64> = state
            .progress
            .iter()
            .filter(|(h, _, _)| *h == homework_id)
            .map(|(_, u, _)| *u)
            .collect();
        Ok(users.len() as i64)
    }
}

// --------------------------------------------------------- scheduled messages

pub struct MockMessageRepo {
    messages: Mutex<HashMap<i64, ScheduledMessage>>,
    next_id: AtomicI64,
}

impl MockMessageRepo {
    pub fn new() -> Self {
        Self {
            messages: Mutex::new(HashMap::new()),
            next_id: AtomicI64::new(1),
        }
    }

    pub fn add_pending(&self, text: &str, audience: &Audience, send_at: DateTime<Utc>) -> i64 {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let (audience_col, topic_slug) = audience.as_columns();
        self.messages.lock().unwrap().insert(
            id,
            ScheduledMessage {
                id,
                text: text.to_string(),
                audience: audience_col.to_string(),
                topic_slug: topic_slug.map(String::from),
                send_at,
                status: MessageStatus::Pending,
                sent_count: 0,
                created_by: None,
                created_at: Utc::now(),
            },
        );
        id
    }

    pub fn status_of(&self, id: i64) -> Option<MessageStatus> {
        self.messages.lock().unwrap().get(&id).map(|m| m.status)
    }

    pub fn sent_count_of(&self, id: i64) -> Option<i64> {
        self.messages.lock().unwrap().get(&id).map(|m| m.sent_count)
    }
}

#[async_trait::async_trait]
impl ScheduledMessageRepo for MockMessageRepo {
    async fn create(
        &self,
        text: &str,
        audience: &Audience,
        send_at: DateTime<Utc>,
        _created_by: Option<i64>,
    ) -> Result<i64, Error> {
        Ok(self.add_pending(text, audience, send_at))
    }

    async fn get(&self, id: i64) -> Result<Option<ScheduledMessage>, Error> {
        Ok(self.messages.lock().unwrap().get(&id).cloned())
    }

    async fn due_pending(&self, now: DateTime<Utc>) -> Result<Vec<ScheduledMessage>, Error> {
        let messages = self.messages.lock().unwrap();
        let mut due: Vec<ScheduledMessage> = messages
            .values()
            .filter(|m| m.status == MessageStatus::Pending && m.send_at <= now)
            .cloned()
            .collect();
        due.sort_by_key(|m| m.send_at);
        Ok(due)
    }

    async fn claim_for_sending(&self, id: i64) -> Result<bool, Error> {
        let mut messages = self.messages.lock().unwrap();
        match messages.get_mut(&id) {
            Some(m) if m.status == MessageStatus::Pending => {
                m.status = MessageStatus::Sending;
                Ok(true)
            }
            Some(_) => Ok(false),
            None => Ok(false),
        }
    }

    async fn mark_sent(&self, id: i64, sent_count: i64) -> Result<(), Error> {
        let mut messages = self.messages.lock().unwrap();
        if let Some(m) = messages.get_mut(&id) {
            m.status = MessageStatus::Sent;
            m.sent_count = sent_count;
        }
        Ok(())
    }

    async fn cancel(&self, id: i64) -> Result<bool, Error> {
        let mut messages = self.messages.lock().unwrap();
        match messages.get_mut(&id) {
            Some(m) if m.status == MessageStatus::Pending => {
                m.status = MessageStatus::Cancelled;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn upcoming(&self, limit: i64) -> Result<Vec<ScheduledMessage>, Error> {
        let messages = self.messages.lock().unwrap();
        let mut pending: Vec<ScheduledMessage> = messages
            .values()
            .filter(|m| m.status == MessageStatus::Pending)
            .cloned()
            .collect();
        pending.sort_by_key(|m| m.send_at);
        pending.truncate(limit as usize);
        Ok(pending)
    }
}

// --------------------------------------------------- users and subscriptions

pub struct MockUserRepo {
    all: Vec<i64>,
    completed: Vec<i64>,
}

impl MockUserRepo {
    pub fn new(all: Vec<i64>, completed: Vec<i64>) -> Self {
        Self { all, completed }
    }
}

#[async_trait::async_trait]
impl UserRepo for MockUserRepo {
    async fn get(&self, _telegram_id: i64) -> Result<Option<User>, Error> {
        Ok(None)
    }

    async fn all_user_ids(&self) -> Result<Vec<i64>, Error> {
        Ok(self.all.clone())
    }

    async fn completed_user_ids(&self) -> Result<Vec<i64>, Error> {
        Ok(self.completed.clone())
    }

    async fn leaderboard(&self, _limit: i64) -> Result<Vec<LeaderboardRow>, Error> {
        Ok(Vec::new())
    }

    async fn rank(&self, _telegram_id: i64) -> Result<i64, Error> {
        Ok(1)
    }
}

pub struct MockSubscriptionRepo {
    subscribers: HashMap<String, Vec<i64>>,
}

impl MockSubscriptionRepo {
    pub fn new(subscribers: HashMap<String, Vec<i64>>) -> Self {
        Self { subscribers }
    }

    pub fn empty() -> Self {
        Self {
            subscribers: HashMap::new(),
        }
    }
}

#[async_trait::async_trait]
impl SubscriptionRepo for MockSubscriptionRepo {
    async fn subscriber_ids(&self, topic_slug: &str) -> Result<Vec<i64>, Error> {
        Ok(self
            .subscribers
            .get(topic_slug)
            .cloned()
            .unwrap_or_default())
    }
}

// ----------------------------------------------------------------- group log

#[derive(Default)]
pub struct MockGroupLogRepo {
    rows: Mutex<Vec<DateTime<Utc>>>,
    pub last_cutoff: Mutex<Option<DateTime<Utc>>>,
}

impl MockGroupLogRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, received_at: DateTime<Utc>) {
        self.rows.lock().unwrap().push(received_at);
    }

    pub fn row_count(&self) -> usize {
        self.rows.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl GroupLogRepo for MockGroupLogRepo {
    async fn record(
        &self,
        _chat_id: i64,
        _message_id: i64,
        _thread_id: Option<i64>,
        _user_id: i64,
        _username: Option<&str>,
        _first_name: Option<&str>,
        _text: Option<&str>,
    ) -> Result<(), Error> {
        self.rows.lock().unwrap().push(Utc::now());
        Ok(())
    }

    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64, Error> {
        *self.last_cutoff.lock().unwrap() = Some(cutoff);
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|t| *t >= cutoff);
        Ok((before - rows.len()) as u64)
    }
}
