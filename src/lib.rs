//! Clipfeed — touch interaction core for a short-form video client.
//!
//! The swipe-to-act gesture tracker lives in [`mobile::touch`]; the
//! remaining modules carry the client-side state that sits around it.

pub mod mobile;
pub mod rate_limit;
pub mod realtime;
pub mod settings;
pub mod watch_party;
