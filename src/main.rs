// src/main.rs

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::FmtSubscriber;

use kursbot::config::Config;
use kursbot::content::JsonQuestionBank;
use kursbot::platforms::TelegramApi;
use kursbot::repositories::postgres::{
    PostgresContestRepository, PostgresGroupLogRepository, PostgresHomeworkRepository,
    PostgresScheduledMessageRepository, PostgresSubscriptionRepository,
    PostgresXpRepository, UserRepository,
};
use kursbot::services::quiz_runner::QuizTiming;
use kursbot::services::{AudienceResolver, Dispatcher, QuizRunner, XpService};
use kursbot::tasks::Scheduler;
use kursbot::Database;

/// Command-line arguments. Everything can also come from the environment
/// (or a .env file); flags win.
#[derive(Parser, Debug, Clone)]
#[command(name = "kursbot")]
#[command(author, version, about = "Community-engagement core: broadcasts, contests, homework, XP")]
struct Args {
    /// Postgres connection string (defaults to DATABASE_URL)
    #[arg(long)]
    database_url: Option<String>,

    /// Scheduler tick period in seconds
    #[arg(long)]
    tick_secs: Option<u64>,

    /// Path to a quiz question bank JSON file
    #[arg(long)]
    question_bank: Option<String>,
}

fn init_tracing() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(tracing::Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set global default subscriber");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_tracing();

    let args = Args::parse();
    let mut config = Config::from_env()?;
    if let Some(url) = args.database_url {
        config.database_url = url;
    }
    if let Some(secs) = args.tick_secs {
        config.tick_secs = secs;
    }
    if let Some(path) = args.question_bank {
        config.question_bank = Some(path);
    }

    info!("kursbot starting; tick every {}s", config.tick_secs);

    let db = Database::new(&config.database_url).await?;
    db.migrate().await?;
    let pool = db.pool().clone();

    let user_repo = Arc::new(UserRepository::new(pool.clone()));
    let xp_repo = Arc::new(PostgresXpRepository::new(pool.clone()));
    let subscription_repo = Arc::new(PostgresSubscriptionRepository::new(pool.clone()));
    let message_repo = Arc::new(PostgresScheduledMessageRepository::new(pool.clone()));
    let contest_repo = Arc::new(PostgresContestRepository::new(pool.clone()));
    let homework_repo = Arc::new(PostgresHomeworkRepository::new(pool.clone()));
    let group_log_repo = Arc::new(PostgresGroupLogRepository::new(pool.clone()));

    let transport = Arc::new(TelegramApi::new(&config.bot_token));
    let xp = Arc::new(XpService::new(xp_repo));
    let audience = Arc::new(AudienceResolver::new(user_repo, subscription_repo));
    let dispatcher = Arc::new(Dispatcher::new(transport.clone()));
    let mut quiz_runner = QuizRunner::new(
        contest_repo.clone(),
        xp.clone(),
        transport.clone(),
        QuizTiming::default(),
    );
    if let Some(path) = &config.question_bank {
        match JsonQuestionBank::from_path(Path::new(path)) {
            Ok(bank) => {
                info!("loaded question bank with {} questions", bank.len());
                quiz_runner = quiz_runner.with_source(Arc::new(bank));
            }
            Err(e) => warn!("could not load question bank from {}: {}", path, e),
        }
    }
    let quiz_runner = Arc::new(quiz_runner);

    let scheduler = Arc::new(Scheduler {
        messages: message_repo,
        homework: homework_repo,
        contests: contest_repo,
        group_log: group_log_repo,
        audience,
        dispatcher,
        quiz_runner,
    });
    let handle = scheduler.spawn(Duration::from_secs(config.tick_secs));

    tokio::signal::ctrl_c().await?;
    info!("shutdown signal received, stopping scheduler");
    handle.abort();

    Ok(())
}
