// src/repositories/mod.rs

pub mod postgres;

pub use postgres::contests::ContestRepo;
pub use postgres::group_log::GroupLogRepo;
pub use postgres::homework::HomeworkRepo;
pub use postgres::scheduled_messages::ScheduledMessageRepo;
pub use postgres::subscriptions::SubscriptionRepo;
pub use postgres::user::UserRepo;
pub use postgres::xp_log::XpRepo;
