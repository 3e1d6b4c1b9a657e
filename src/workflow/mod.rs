pub mod practice_flow;

pub use practice_flow::{Command, PracticeFlow};
