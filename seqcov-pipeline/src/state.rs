use std::fmt::{self, Display};

use serde::Serialize;

///
/// Stage reached by a run. Stages only move forward.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum State {
    Configured,
    Windowed,
    Split,
    Aggregated,
    Written,
    Done,
}

impl State {
    pub fn next(&self) -> Option<State> {
        match self {
            State::Configured => Some(State::Windowed),
            State::Windowed => Some(State::Split),
            State::Split => Some(State::Aggregated),
            State::Aggregated => Some(State::Written),
            State::Written => Some(State::Done),
            State::Done => None,
        }
    }
}

impl Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            State::Configured => "configured",
            State::Windowed => "windowed",
            State::Split => "split",
            State::Aggregated => "aggregated",
            State::Written => "written",
            State::Done => "done",
        };
        write!(f, "{}", name)
    }
}
