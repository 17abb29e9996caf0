//! Token counter core: pure state machine for the live status-bar count.
mod effect;
mod msg;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use msg::{EventKind, Msg};
pub use state::{CountPolicy, Generation, TextSnapshot, ViewId, ViewState, WidgetState};
pub use update::update;
pub use view_model::{StatusViewModel, CALCULATING_TEXT, CALCULATING_TOOLTIP};
