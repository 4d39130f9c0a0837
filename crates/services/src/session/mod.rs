mod coordinator;
mod view;

pub use coordinator::{
    Activity, EngineEvent, Epoch, EventDisposition, PageChange, SessionCoordinator, ToggleOutcome,
};
pub use view::{SentenceVerdict, SentenceView, SessionSnapshot};
