// src/services/quiz_runner.rs
//
// Live quiz contests: a timer-driven question sequencer held only in
// process memory. The registry is rebuilt empty on restart — scores
// already recorded in contest_entries survive, but an in-flight quiz will
// not resume (an operator has to close it).

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::content::{QuestionSource, QuizQuestion};
use crate::models::{Contest, ContestStatus, ContestType, XpReason};
use crate::repositories::ContestRepo;
use crate::services::XpService;
use crate::Error;

pub const POINTS_PER_CORRECT: i64 = 10;

#[derive(Debug, Clone, Copy)]
pub struct QuizTiming {
    /// How long one question stays open for answers.
    pub question_window: Duration,
    /// Delay between the intro announcement and the first question.
    pub intro_pause: Duration,
    /// Pause between announcing an answer and posting the next question.
    pub between_questions: Duration,
}

impl Default for QuizTiming {
    fn default() -> Self {
        Self {
            question_window: Duration::from_secs(30),
            intro_pause: Duration::from_secs(2),
            between_questions: Duration::from_secs(3),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub correct: bool,
    pub points: i64,
}

struct LiveQuiz {
    chat_id: i64,
    questions: Vec<QuizQuestion>,
    current: usize,
    scores: HashMap<i64, i64>,
    /// Users who already answered the current question. Reset on every
    /// post; the per-contest mutex makes check-and-mark atomic.
    answered: HashSet<i64>,
    window_timer: Option<JoinHandle<()>>,
}

/// In-process registry of running quiz contests, keyed by contest id.
pub struct QuizRunner {
    contests: Arc<dyn ContestRepo>,
    xp: Arc<XpService>,
    transport: Arc<dyn crate::platforms::Messaging>,
    source: Option<Arc<dyn QuestionSource>>,
    live: DashMap<i64, Arc<Mutex<LiveQuiz>>>,
    timing: QuizTiming,
}

impl QuizRunner {
    pub fn new(
        contests: Arc<dyn ContestRepo>,
        xp: Arc<XpService>,
        transport: Arc<dyn crate::platforms::Messaging>,
        timing: QuizTiming,
    ) -> Self {
        Self {
            contests,
            xp,
            transport,
            source: None,
            live: DashMap::new(),
            timing,
        }
    }

    /// Attach a question source so runs can be started by question count.
    pub fn with_source(mut self, source: Arc<dyn QuestionSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Draw `count` questions from the attached source and begin the run.
    pub async fn start_from_bank(
        self: &Arc<Self>,
        contest: &Contest,
        chat_id: i64,
        count: usize,
    ) -> Result<(), Error> {
        let source = self
            .source
            .as_ref()
            .ok_or_else(|| Error::InvalidState("no question source attached".into()))?;
        let questions = source.draw(count);
        self.start(contest, chat_id, questions).await
    }

    pub fn is_live(&self, contest_id: i64) -> bool {
        self.live.contains_key(&contest_id)
    }

    fn state(&self, contest_id: i64) -> Option<Arc<Mutex<LiveQuiz>>> {
        self.live.get(&contest_id).map(|e| e.value().clone())
    }

    /// Begin a quiz run: announce it, then post the first question after a
    /// short pause. The contest must be an active quiz and the question
    /// list non-empty.
    pub async fn start(
        self: &Arc<Self>,
        contest: &Contest,
        chat_id: i64,
        questions: Vec<QuizQuestion>,
    ) -> Result<(), Error> {
        if contest.contest_type != ContestType::Quiz {
            return Err(Error::InvalidState(format!(
                "contest {} is not a quiz",
                contest.id
            )));
        }
        if contest.status != ContestStatus::Active {
            return Err(Error::InvalidState(format!(
                "contest {} is not active (status: {})",
                contest.id, contest.status
            )));
        }
        if questions.is_empty() {
            return Err(Error::InvalidState("no quiz questions available".into()));
        }
        if self.is_live(contest.id) {
            return Err(Error::Conflict(format!(
                "contest {} is already running",
                contest.id
            )));
        }

        let total = questions.len();
        self.live.insert(
            contest.id,
            Arc::new(Mutex::new(LiveQuiz {
                chat_id,
                questions,
                current: 0,
                scores: HashMap::new(),
                answered: HashSet::new(),
                window_timer: None,
            })),
        );

        let intro = format!(
            "🧠 <b>Quiz contest starts!</b> {} questions, {}s each.",
            total,
            self.timing.question_window.as_secs()
        );
        if let Err(e) = self.transport.send_message(chat_id, &intro).await {
            warn!("failed to announce quiz contest {}: {}", contest.id, e);
        }

        let runner = Arc::clone(self);
        let contest_id = contest.id;
        let pause = self.timing.intro_pause;
        tokio::spawn(async move {
            tokio::time::sleep(pause).await;
            runner.post_question(contest_id).await;
        });

        info!("quiz contest #{} started with {} questions", contest.id, total);
        Ok(())
    }

    /// Answer admission for the current question. Late answers to an
    /// already-advanced question are rejected as expired; repeat answers
    /// from the same user are rejected as conflicts. The check-and-mark
    /// runs under the per-contest lock, so two simultaneous taps cannot
    /// both score.
    pub async fn answer(
        &self,
        contest_id: i64,
        question_index: usize,
        user_id: i64,
        option_index: usize,
    ) -> Result<AnswerOutcome, Error> {
        let state = self
            .state(contest_id)
            .ok_or_else(|| Error::InvalidState(format!("no live quiz for contest {}", contest_id)))?;
        let mut quiz = state.lock().await;

        if quiz.current != question_index || quiz.current >= quiz.questions.len() {
            return Err(Error::InvalidState("question expired".into()));
        }
        if quiz.answered.contains(&user_id) {
            return Err(Error::Conflict("already answered this question".into()));
        }

        let question = &quiz.questions[question_index];
        let correct = option_index == question.correct_index;
        let points = if correct { POINTS_PER_CORRECT } else { 0 };
        let answer_text = question
            .options
            .get(option_index)
            .cloned()
            .unwrap_or_else(|| format!("option {}", option_index + 1));

        // Persist before marking. A failed write leaves the user free to
        // retry; the per-contest lock is held across the await, so the
        // check-and-mark stays atomic against a second simultaneous tap.
        self.contests
            .upsert_quiz_entry(contest_id, user_id, &answer_text, correct, points)
            .await?;

        quiz.answered.insert(user_id);
        *quiz.scores.entry(user_id).or_insert(0) += points;

        Ok(AnswerOutcome { correct, points })
    }

    /// Drop the live state and any pending question timer. Used when a
    /// contest is closed early (operator or deadline).
    pub fn cancel(&self, contest_id: i64) {
        if let Some((_, state)) = self.live.remove(&contest_id) {
            // try_lock is fine here: the only long-lived holders are
            // answer() and advance(), both brief.
            if let Ok(mut quiz) = state.try_lock() {
                if let Some(timer) = quiz.window_timer.take() {
                    timer.abort();
                }
            }
            info!("live quiz for contest #{} cancelled", contest_id);
        }
    }

    // Boxed because `post_question` and `advance` schedule each other via
    // spawned timers; the boxed future breaks the opaque-type cycle so the
    // compiler can prove `Send`.
    fn post_question(
        self: Arc<Self>,
        contest_id: i64,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = ()> + Send>> {
        Box::pin(async move {
            let state = match self.state(contest_id) {
                Some(s) => s,
                None => return,
            };
            let mut quiz = state.lock().await;
    
            let index = quiz.current;
            let total = quiz.questions.len();
            let question = match quiz.questions.get(index) {
                Some(q) => q.clone(),
                None => return,
            };
            quiz.answered.clear();
    
            let mut text = format!("❓ <b>Question {}/{}</b>\n\n{}", index + 1, total, question.text);
            for (i, opt) in question.options.iter().enumerate() {
                text.push_str(&format!("\n{}. {}", i + 1, opt));
            }
    
            if let Err(e) = self.transport.send_message(quiz.chat_id, &text).await {
                error!("failed to post question {} of contest {}: {}", index + 1, contest_id, e);
            }
    
            let runner = Arc::clone(&self);
            let window = self.timing.question_window;
            quiz.window_timer = Some(tokio::spawn(async move {
                tokio::time::sleep(window).await;
                runner.advance(contest_id).await;
            }));
        })
    }

    /// Question window elapsed: announce the answer, then move on or
    /// finish the contest.
    async fn advance(self: Arc<Self>, contest_id: i64) {
        let state = match self.state(contest_id) {
            Some(s) => s,
            None => return,
        };
        let mut quiz = state.lock().await;

        if let Some(question) = quiz.questions.get(quiz.current) {
            let correct = question
                .options
                .get(question.correct_index)
                .cloned()
                .unwrap_or_default();
            let text = format!("✅ Answer: <b>{}</b>", correct);
            if let Err(e) = self.transport.send_message(quiz.chat_id, &text).await {
                warn!("failed to announce answer for contest {}: {}", contest_id, e);
            }
        }

        quiz.current += 1;

        if quiz.current >= quiz.questions.len() {
            let chat_id = quiz.chat_id;
            let scores = quiz.scores.clone();
            drop(quiz);
            self.finish(contest_id, chat_id, scores).await;
        } else {
            let runner = Arc::clone(&self);
            let pause = self.timing.between_questions;
            quiz.window_timer = Some(tokio::spawn(async move {
                tokio::time::sleep(pause).await;
                runner.post_question(contest_id).await;
            }));
        }
    }

    /// All questions exhausted: close the contest, award the podium, and
    /// announce the final ranking.
    async fn finish(&self, contest_id: i64, chat_id: i64, scores: HashMap<i64, i64>) {
        if let Err(e) = self.contests.set_status(contest_id, ContestStatus::Closed).await {
            error!("failed to close quiz contest {}: {}", contest_id, e);
        }

        let contest = match self.contests.get(contest_id).await {
            Ok(Some(c)) => c,
            Ok(None) => {
                error!("quiz contest {} vanished before results", contest_id);
                self.live.remove(&contest_id);
                return;
            }
            Err(e) => {
                error!("failed to load quiz contest {} for results: {}", contest_id, e);
                self.live.remove(&contest_id);
                return;
            }
        };

        let mut ranking: Vec<(i64, i64)> = scores.into_iter().collect();
        // Deterministic order: score desc, then user id for ties.
        ranking.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

        let podium = [contest.xp_first, contest.xp_second, contest.xp_third];
        let reference = format!("contest:{}", contest_id);

        let mut text = String::from("🏆 <b>Quiz contest results:</b>\n");
        for (place, (user_id, score)) in ranking.iter().enumerate().take(10) {
            text.push_str(&format!("\n{}. user {} — {} pts", place + 1, user_id, score));
            // A podium place with zero points stays unrewarded.
            if place < 3 && podium[place] > 0 && *score > 0 {
                match self
                    .xp
                    .award_xp(*user_id, podium[place], XpReason::Contest, Some(&reference))
                    .await
                {
                    Ok(_) => text.push_str(&format!(" (+{} XP)", podium[place])),
                    Err(e) => error!(
                        "failed to award contest XP to user {} in contest {}: {}",
                        user_id, contest_id, e
                    ),
                }
            }
        }
        if ranking.is_empty() {
            text.push_str("\nNo one answered.");
        }

        if let Err(e) = self.transport.send_message(chat_id, &text).await {
            warn!("failed to announce results of contest {}: {}", contest_id, e);
        }

        self.live.remove(&contest_id);
        info!("quiz contest #{} finished ({} participants)", contest_id, ranking.len());
    }
}
