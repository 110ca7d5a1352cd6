//! Console line input.

use std::io::{self, IsTerminal};

use dialoguer::{theme::ColorfulTheme, Input};

pub(crate) fn is_interactive() -> bool {
    std::io::stdin().is_terminal() && std::io::stdout().is_terminal()
}

/// Next console line, or `None` at end of input.
pub(crate) fn read_command() -> anyhow::Result<Option<String>> {
    if is_interactive() {
        let theme = ColorfulTheme::default();
        let input = Input::<String>::with_theme(&theme)
            .with_prompt("$")
            .allow_empty(true)
            .interact_text()?;
        return Ok(Some(input));
    }
    let mut line = String::new();
    if io::stdin().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\n', '\r']).to_string()))
}
