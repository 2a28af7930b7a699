mod bus;
mod handlers;
mod types;

pub use bus::{EventBus, EventReceiver};
pub use handlers::LoggingEventHandler;
pub use types::{EventSequence, IntakeEvent, IntakeEventPayload};
