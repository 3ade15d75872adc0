// src/repositories/postgres/mod.rs

pub mod contests;
pub mod group_log;
pub mod homework;
pub mod scheduled_messages;
pub mod subscriptions;
pub mod user;
pub mod xp_log;

pub use contests::PostgresContestRepository;
pub use group_log::PostgresGroupLogRepository;
pub use homework::PostgresHomeworkRepository;
pub use scheduled_messages::PostgresScheduledMessageRepository;
pub use subscriptions::PostgresSubscriptionRepository;
pub use user::UserRepository;
pub use xp_log::PostgresXpRepository;
