pub mod machine;
pub mod state;

pub use machine::{PreviewError, Session};
pub use state::{SessionState, SessionView, Tab};
