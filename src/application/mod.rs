// Agent modules - the monitor actor and the shell-side state holder
pub mod agents;

// System orchestrator
pub mod client;
pub mod system;
