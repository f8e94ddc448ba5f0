pub mod session;

pub use session::{CallData, HttpCallInfo, SessionItem, SessionPath};
