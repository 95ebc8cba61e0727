pub mod commit_policy;
pub mod watch_loop;
pub mod watch_state;
