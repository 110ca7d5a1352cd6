//! `pocket-ide console`.

use pocket_console::{Console, EntryKind, Submission, TranscriptEntry};

use crate::prompt;
use crate::style;

pub fn run_console() -> anyhow::Result<()> {
    let mut console = Console::new();
    let interactive = prompt::is_interactive();
    print_entries(console.transcript().entries(), false);

    while let Some(line) = prompt::read_command()? {
        if line.trim().eq_ignore_ascii_case("exit") {
            break;
        }
        let submission = console.submit(&line);
        // The interactive prompt already shows what was typed.
        let skip_input = interactive && submission != Submission::Reset;
        print_entries(console.changed(submission), skip_input);
    }
    Ok(())
}

fn print_entries(entries: &[TranscriptEntry], skip_input: bool) {
    for entry in entries {
        if skip_input && entry.kind == EntryKind::Input {
            continue;
        }
        for line in entry.lines() {
            println!("{}", style::entry(entry.kind, line));
        }
    }
}
