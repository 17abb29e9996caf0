//! Status-bar token counter: wires the core state machine to a host editor.
mod command;
mod config;
mod controller;
mod descriptor;
mod effects;
mod error;
mod host;

pub use command::{count_tokens_now, CountNowReport, CountScope};
pub use config::{load_config, parse_config, WidgetConfig};
pub use controller::Controller;
pub use descriptor::{WidgetDescriptor, DESCRIPTOR};
pub use error::{ConfigError, HostError, WidgetError};
pub use host::{EditorHost, StatusDisplay, Subscription, UiScheduler};
pub use tokencount_core::{StatusViewModel, TextSnapshot, ViewId};
