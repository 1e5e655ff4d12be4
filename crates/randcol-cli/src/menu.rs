//! Interactive console menu

use std::io::{self, BufRead, Write};

use randcol::ValueRange;

/// Work the user can pick from the menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Dry run over the first few files
    Analyze,
    /// Randomize every file
    ApplyAll,
    /// Randomize the first file only
    Smoke,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuState {
    Main,
    Settings,
    /// Menu finished, with the chosen action if any
    Done(Option<Action>),
}

/// Move from `state` given one line of input (`None` at end of input).
///
/// Leaving `Settings` with a yes answer flips `preserve_timestamps`.
pub fn transition(state: MenuState, input: Option<&str>, preserve_timestamps: &mut bool) -> MenuState {
    let Some(line) = input else {
        return match state {
            MenuState::Settings => MenuState::Main,
            _ => MenuState::Done(None),
        };
    };

    match state {
        MenuState::Main => match line.trim() {
            "1" => MenuState::Done(Some(Action::Analyze)),
            "2" => MenuState::Done(Some(Action::ApplyAll)),
            "3" => MenuState::Done(Some(Action::Smoke)),
            "4" => MenuState::Settings,
            _ => MenuState::Done(None),
        },
        MenuState::Settings => {
            if is_yes(line) {
                *preserve_timestamps = !*preserve_timestamps;
            }
            MenuState::Main
        }
        done @ MenuState::Done(_) => done,
    }
}

/// Accepts y/yes and the Russian д/да, in any case
pub fn is_yes(answer: &str) -> bool {
    matches!(
        answer.trim().to_lowercase().as_str(),
        "y" | "yes" | "д" | "да"
    )
}

/// Drive the menu until an action is chosen or input runs out
pub fn run<R: BufRead, W: Write>(
    mut input: R,
    mut out: W,
    range: &ValueRange,
    sample_size: usize,
    preserve_timestamps: &mut bool,
) -> io::Result<Option<Action>> {
    let mut state = MenuState::Main;

    loop {
        match state {
            MenuState::Done(action) => return Ok(action),
            MenuState::Main => {
                writeln!(out)?;
                writeln!(out, "Choose a mode:")?;
                writeln!(out, "1. Test mode (analyze the first {} files)", sample_size)?;
                writeln!(out, "2. Process all files")?;
                writeln!(out, "3. Test a single file")?;
                writeln!(out, "4. Settings")?;
                write!(out, "Your choice (1-4): ")?;
            }
            MenuState::Settings => {
                writeln!(out)?;
                writeln!(out, "Current settings:")?;
                writeln!(out, "  value range: [{}, {}]", range.min(), range.max())?;
                writeln!(out, "  decimals: {}", range.decimals())?;
                writeln!(
                    out,
                    "  preserve timestamps: {}",
                    if *preserve_timestamps { "yes" } else { "no" }
                )?;
                write!(out, "Toggle timestamp preservation? (y/n): ")?;
            }
        }
        out.flush()?;

        let mut line = String::new();
        let read = input.read_line(&mut line)?;
        let line = (read > 0).then_some(line.as_str());

        let next = transition(state, line, preserve_timestamps);
        if state == MenuState::Main && next == MenuState::Done(None) && line.is_some() {
            writeln!(out, "Invalid choice")?;
        }
        if state == MenuState::Settings && line.is_some() {
            writeln!(
                out,
                "Timestamp preservation {}",
                if *preserve_timestamps { "on" } else { "off" }
            )?;
        }
        state = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    fn run_with(input: &str, preserve: &mut bool) -> (Option<Action>, String) {
        let mut out = Vec::new();
        let action = run(
            Cursor::new(input),
            &mut out,
            &ValueRange::default(),
            5,
            preserve,
        )
        .unwrap();
        (action, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_transition_main() {
        let mut preserve = true;
        let cases = [
            ("1", MenuState::Done(Some(Action::Analyze))),
            ("2\n", MenuState::Done(Some(Action::ApplyAll))),
            (" 3 ", MenuState::Done(Some(Action::Smoke))),
            ("4", MenuState::Settings),
            ("5", MenuState::Done(None)),
            ("", MenuState::Done(None)),
        ];
        for (input, expected) in cases {
            assert_eq!(transition(MenuState::Main, Some(input), &mut preserve), expected);
        }
        assert!(preserve);
    }

    #[test]
    fn test_transition_settings_toggles_on_yes() {
        let mut preserve = true;
        assert_eq!(
            transition(MenuState::Settings, Some("да\n"), &mut preserve),
            MenuState::Main
        );
        assert!(!preserve);

        assert_eq!(
            transition(MenuState::Settings, Some("n"), &mut preserve),
            MenuState::Main
        );
        assert!(!preserve);
    }

    #[test]
    fn test_transition_end_of_input() {
        let mut preserve = true;
        assert_eq!(transition(MenuState::Main, None, &mut preserve), MenuState::Done(None));
        assert_eq!(transition(MenuState::Settings, None, &mut preserve), MenuState::Main);
    }

    #[test]
    fn test_is_yes() {
        for answer in ["y", "YES", " Да ", "д"] {
            assert!(is_yes(answer), "{}", answer);
        }
        for answer in ["n", "no", "нет", ""] {
            assert!(!is_yes(answer), "{}", answer);
        }
    }

    #[test]
    fn test_run_settings_then_action() {
        let mut preserve = true;
        let (action, output) = run_with("4\nyes\n2\n", &mut preserve);

        assert_eq!(action, Some(Action::ApplyAll));
        assert!(!preserve);
        assert!(output.contains("value range: [20.9, 22.1]"));
        assert!(output.contains("Timestamp preservation off"));
        assert_eq!(output.matches("Choose a mode:").count(), 2);
    }

    #[test]
    fn test_run_invalid_choice() {
        let mut preserve = true;
        let (action, output) = run_with("9\n", &mut preserve);

        assert_eq!(action, None);
        assert!(output.contains("Invalid choice"));
    }

    #[test]
    fn test_run_end_of_input() {
        let mut preserve = true;
        let (action, output) = run_with("", &mut preserve);

        assert_eq!(action, None);
        assert!(!output.contains("Invalid choice"));
    }
}
