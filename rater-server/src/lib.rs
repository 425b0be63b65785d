pub mod conversation;
pub mod http;
pub mod poller;
pub mod router;
pub mod scope;
pub mod subsystems;
pub mod telegram;
pub mod transport;
