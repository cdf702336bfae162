pub mod health;
pub mod metrics;
pub mod swap_agent;
