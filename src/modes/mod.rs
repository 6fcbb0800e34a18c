pub mod pipe;
pub mod session;
pub mod simulate;
pub mod ws;

pub use pipe::{PipeMode, run_session};
pub use session::play;
pub use simulate::{SimulateMode, SimulationReport};
pub use ws::WsMode;
