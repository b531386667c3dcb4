pub mod logging;
pub mod paths;
pub mod progress;
pub mod resources;
pub mod server;
pub mod state;
pub mod tools;

pub use paths::EchidnaPaths;
pub use progress::{LogProgress, NoProgress, ProgressReporter};
pub use server::{serve_stdio, EchidnaMcpServer};
pub use state::{ToolDispatcher, ToolResponse};
pub use tools::ToolName;
