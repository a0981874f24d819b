pub mod agent;
pub mod board;
pub mod replay;
pub mod runner;
pub mod strategy;
pub mod util;
