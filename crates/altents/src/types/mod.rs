pub mod intents;
pub mod rpc;
pub mod tokens;
