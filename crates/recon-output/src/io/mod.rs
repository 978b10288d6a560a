//! File I/O: atomic writes and session files.

mod atomic;
mod session;

pub use atomic::write_atomic;
pub use session::{load_session, save_session};
