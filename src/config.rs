//! Runtime switches.
//!
//! `FSLINALG_REBRACKET=0` (or `false`/`off`) disables automatic matrix-chain
//! rebracketing for the whole process. Products are then evaluated exactly as
//! written. The variable is read once, on first use. [`with_rebracketing`]
//! overrides the process setting for a closure on the current thread.

use std::cell::Cell;
use std::sync::OnceLock;

const REBRACKET_VAR: &str = "FSLINALG_REBRACKET";

thread_local! {
    static SCOPED_REBRACKET: Cell<Option<bool>> = const { Cell::new(None) };
}

/// Whether product chains are re-associated into their cheapest bracketing.
pub fn rebracketing_enabled() -> bool {
    if let Some(enabled) = SCOPED_REBRACKET.with(Cell::get) {
        return enabled;
    }
    static ENABLED: OnceLock<bool> = OnceLock::new();
    *ENABLED.get_or_init(|| parse_flag(std::env::var(REBRACKET_VAR).ok().as_deref()))
}

/// Run `f` with rebracketing switched on or off for the current thread.
/// Nested calls restore the enclosing setting when they return or unwind.
pub fn with_rebracketing<R>(enabled: bool, f: impl FnOnce() -> R) -> R {
    struct Restore(Option<bool>);

    impl Drop for Restore {
        fn drop(&mut self) {
            SCOPED_REBRACKET.with(|s| s.set(self.0));
        }
    }

    let _restore = Restore(SCOPED_REBRACKET.with(|s| s.replace(Some(enabled))));
    f()
}

/// Unset and unrecognized values leave the switch on.
fn parse_flag(value: Option<&str>) -> bool {
    match value {
        Some(v) => !matches!(
            v.trim().to_ascii_lowercase().as_str(),
            "0" | "false" | "off"
        ),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag(None));
        assert!(parse_flag(Some("1")));
        assert!(parse_flag(Some("yes")));
        assert!(!parse_flag(Some("0")));
        assert!(!parse_flag(Some(" OFF ")));
        assert!(!parse_flag(Some("False")));
    }

    #[test]
    fn test_scoped_override_nests_and_restores() {
        let process = rebracketing_enabled();
        with_rebracketing(false, || {
            assert!(!rebracketing_enabled());
            with_rebracketing(true, || assert!(rebracketing_enabled()));
            assert!(!rebracketing_enabled());
        });
        assert_eq!(rebracketing_enabled(), process);
    }
}
