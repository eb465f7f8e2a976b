//! Embedded widget client.
//!
//! [`DisplayState`] is a pure reducer over poll and simulator events;
//! [`Widget`] drives it from two timers and renders into a [`RenderSink`].

mod error;
pub use error::FetchError;

mod state;
pub use state::{DisplayState, Event, Frame, Phase, PollOutcome};

mod widget;
pub use widget::{
    ConsoleSink, HttpStatusSource, POLL_INTERVAL, RenderSink, SIMULATION_INTERVAL, StatusSource,
    Widget, WidgetReport,
};
