//! Engine configuration.
//!
//! Built explicitly and handed to the engine builder; there is no global
//! configuration instance.
use std::env;

use crate::constants::DEFAULT_SYSTEM_ACTOR;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Actor recorded on checklist items the engine pre-checks.
    pub system_actor: String,
    /// Validate a session's artifacts on the rayon pool instead of inline.
    pub parallel_validation: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { system_actor: DEFAULT_SYSTEM_ACTOR.to_string(),
               parallel_validation: true }
    }
}

impl EngineConfig {
    /// Reads `REVFLOW_SYSTEM_ACTOR` and `REVFLOW_PARALLEL_VALIDATION`; unset or
    /// unparsable values keep their defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let system_actor = env::var("REVFLOW_SYSTEM_ACTOR").ok()
                                                           .map(|v| v.trim().to_string())
                                                           .filter(|v| !v.is_empty())
                                                           .unwrap_or(defaults.system_actor);
        let parallel_validation = env::var("REVFLOW_PARALLEL_VALIDATION").ok()
                                                                         .and_then(|v| parse_flag(&v))
                                                                         .unwrap_or(defaults.parallel_validation);
        Self { system_actor,
               parallel_validation }
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_parse_common_spellings() {
        assert_eq!(parse_flag(" TRUE "), Some(true));
        assert_eq!(parse_flag("off"), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }
}
