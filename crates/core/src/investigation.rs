//! Investigation records.

use crate::Time;
use serde::{Deserialize, Serialize};

/// A backend record that someone has claimed a breakage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Investigation {
    /// When the investigation was opened
    pub start_time: Time,

    /// Whether it is still being investigated
    pub under_investigation: bool,

    /// Who took it, if the backend says
    #[serde(default)]
    pub assignee: Option<String>,
}

impl Investigation {
    /// Create a new investigation record.
    pub fn new(start_time: Time, under_investigation: bool) -> Self {
        Self {
            start_time,
            under_investigation,
            assignee: None,
        }
    }

    /// Whether this investigation claims a failure that started at `build_start`.
    ///
    /// It must have been opened after the build started and still be open.
    pub fn covers(&self, build_start: Time) -> bool {
        self.under_investigation && self.start_time > build_start
    }
}
