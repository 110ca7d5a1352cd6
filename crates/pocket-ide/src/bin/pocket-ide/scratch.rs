//! `pocket-ide scratch`.

use std::path::{Path, PathBuf};

use anyhow::Context;
use pocket_playground::ScratchEditor;

use crate::style;

/// Print or save the scratch buffer, optionally loaded from `input` first.
///
/// A directory `output` receives the buffer under its download name.
pub fn run_scratch(input: Option<&Path>, output: Option<PathBuf>) -> anyhow::Result<()> {
    let mut editor = ScratchEditor::new();
    if let Some(path) = input {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        editor.set_text(text);
    }
    let (file_name, text) = editor.export();

    let Some(output) = output else {
        print!("{text}");
        return Ok(());
    };
    let target = if output.is_dir() {
        output.join(file_name)
    } else {
        output
    };
    std::fs::write(&target, text)
        .with_context(|| format!("failed to write {}", target.display()))?;
    eprintln!("{}", style::accent(format!("Wrote {}", target.display())));
    Ok(())
}
