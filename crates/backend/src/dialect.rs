//! Translation of backend status codes into [`Status`].
//!
//! Each CI system encodes status its own way. These tables are the only
//! place such codes are interpreted.
//!
//! Jenkins ball colour (an `_anime` suffix means a build is running):
//!
//! | colour                      | status     |
//! |-----------------------------|------------|
//! | `blue`, missing (blank)     | `Green`    |
//! | `disabled`                  | `Disabled` |
//! | `grey`, `notbuilt`, `aborted` | `Unknown`  |
//! | `red`, `yellow`, anything else | `Broken` |
//!
//! TeamCity build status:
//!
//! | code                | status    |
//! |---------------------|-----------|
//! | `SUCCESS`           | `Green`   |
//! | `FAILURE`, `ERROR`  | `Broken`  |
//! | anything else       | `Unknown` |

use buildwatch_core::Status;
use serde::{Deserialize, Serialize};

const ANIME_SUFFIX: &str = "_anime";

/// Status code dialect of a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// Jenkins ball colours
    Jenkins,
    /// TeamCity status codes
    TeamCity,
}

impl Dialect {
    /// Translate a raw code of this dialect.
    pub fn status_of(self, code: &str) -> Status {
        match self {
            Dialect::Jenkins => jenkins_status(code),
            Dialect::TeamCity => teamcity_status(code),
        }
    }
}

/// Translate a Jenkins ball colour.
pub fn jenkins_status(color: &str) -> Status {
    let color = color.trim().to_ascii_lowercase();
    match color.strip_suffix(ANIME_SUFFIX).unwrap_or(&color) {
        "" | "blue" => Status::Green,
        "disabled" => Status::Disabled,
        "grey" | "notbuilt" | "aborted" => Status::Unknown,
        _ => Status::Broken,
    }
}

/// Whether a Jenkins ball colour says a build is running.
pub fn jenkins_is_building(color: &str) -> bool {
    color.trim().to_ascii_lowercase().ends_with(ANIME_SUFFIX)
}

/// Translate a TeamCity build status.
pub fn teamcity_status(code: &str) -> Status {
    match code.trim().to_ascii_uppercase().as_str() {
        "SUCCESS" => Status::Green,
        "FAILURE" | "ERROR" => Status::Broken,
        _ => Status::Unknown,
    }
}
