// src/tasks/mod.rs

pub mod scheduler;

pub use scheduler::Scheduler;
