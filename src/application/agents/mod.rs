// Agent modules - background monitor and UI-facing user agent
pub mod monitor;
pub mod user_agent;
