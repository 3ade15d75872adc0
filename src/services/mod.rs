// src/services/mod.rs

pub mod audience;
pub mod contest_service;
pub mod dispatcher;
pub mod homework_service;
pub mod quiz_runner;
pub mod xp_service;

pub use audience::AudienceResolver;
pub use contest_service::ContestService;
pub use dispatcher::{DispatchReport, Dispatcher};
pub use homework_service::HomeworkService;
pub use quiz_runner::QuizRunner;
pub use xp_service::XpService;
