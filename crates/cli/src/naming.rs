//! Post-capture naming countdown.
//!
//! After a capture the user gets a few seconds to type a title. The
//! countdown is a plain state value advanced by [`NamingEvent`]s; the
//! driver owns the clock and the input source.

/// Default seconds offered for naming.
pub const DEFAULT_NAMING_SECONDS: u32 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Naming {
    Idle,
    Counting { hash: String, remaining: u32 },
    /// A non-blank title was entered before the countdown ran out.
    Submitted { hash: String, title: String },
    /// Input was blank; keep the captured title.
    Skipped { hash: String },
    Expired { hash: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamingEvent {
    Start { hash: String, seconds: u32 },
    Tick,
    Input(String),
}

impl Naming {
    /// Advance the countdown.
    ///
    /// Finished states ignore further events; a new `Start` while counting
    /// replaces the pending capture.
    pub fn handle(self, event: NamingEvent) -> Naming {
        match (self, event) {
            (Naming::Idle | Naming::Counting { .. }, NamingEvent::Start { hash, seconds }) => {
                if seconds == 0 {
                    Naming::Expired { hash }
                } else {
                    Naming::Counting { hash, remaining: seconds }
                }
            }
            (Naming::Counting { hash, remaining }, NamingEvent::Tick) => {
                if remaining <= 1 {
                    Naming::Expired { hash }
                } else {
                    Naming::Counting { hash, remaining: remaining - 1 }
                }
            }
            (Naming::Counting { hash, .. }, NamingEvent::Input(text)) => {
                let title = text.trim();
                if title.is_empty() {
                    Naming::Skipped { hash }
                } else {
                    Naming::Submitted { hash, title: title.to_string() }
                }
            }
            (state, _) => state,
        }
    }

    pub fn remaining(&self) -> Option<u32> {
        match self {
            Naming::Counting { remaining, .. } => Some(*remaining),
            _ => None,
        }
    }

    /// The `(hash, title)` rename to apply, if a title was submitted.
    pub fn rename(&self) -> Option<(&str, &str)> {
        match self {
            Naming::Submitted { hash, title } => Some((hash, title)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start(seconds: u32) -> Naming {
        Naming::Idle.handle(NamingEvent::Start { hash: "abcdefabcdef".into(), seconds })
    }

    #[test]
    fn test_start_counts_down() {
        let state = start(3);
        assert_eq!(state.remaining(), Some(3));
        let state = state.handle(NamingEvent::Tick);
        assert_eq!(state.remaining(), Some(2));
    }

    #[test]
    fn test_expires_after_last_tick() {
        let state = start(2).handle(NamingEvent::Tick).handle(NamingEvent::Tick);
        assert_eq!(state, Naming::Expired { hash: "abcdefabcdef".into() });
        assert!(state.rename().is_none());
    }

    #[test]
    fn test_zero_seconds_expires_immediately() {
        assert!(matches!(start(0), Naming::Expired { .. }));
    }

    #[test]
    fn test_submit_trims_title() {
        let state = start(5).handle(NamingEvent::Input("  My title \n".into()));
        assert_eq!(state.rename(), Some(("abcdefabcdef", "My title")));
        assert!(state.remaining().is_none());
    }

    #[test]
    fn test_blank_input_skips() {
        let state = start(5).handle(NamingEvent::Input("\n".into()));
        assert_eq!(state, Naming::Skipped { hash: "abcdefabcdef".into() });
    }

    #[test]
    fn test_finished_ignores_events() {
        let expired = start(1).handle(NamingEvent::Tick);
        let after = expired.clone().handle(NamingEvent::Input("late".into()));
        assert_eq!(after, expired);

        let after = expired.clone().handle(NamingEvent::Start { hash: "other".into(), seconds: 5 });
        assert_eq!(after, expired);
    }

    #[test]
    fn test_idle_ignores_tick_and_input() {
        assert_eq!(Naming::Idle.handle(NamingEvent::Tick), Naming::Idle);
        assert_eq!(Naming::Idle.handle(NamingEvent::Input("x".into())), Naming::Idle);
    }

    #[test]
    fn test_restart_replaces_pending() {
        let state = start(5).handle(NamingEvent::Start { hash: "123456123456".into(), seconds: 4 });
        assert_eq!(state, Naming::Counting { hash: "123456123456".into(), remaining: 4 });
    }
}
