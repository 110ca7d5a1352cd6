//! `pocket-ide render`.

use std::path::{Path, PathBuf};

use anyhow::Context;
use pocket_ide::web::playground::PlaygroundRequest;
use pocket_playground::{Playground, EXPORT_FILE_NAME};

use crate::style;

pub struct RenderArgs {
    pub template: Option<String>,
    pub html: Option<PathBuf>,
    pub css: Option<PathBuf>,
    pub js: Option<PathBuf>,
    pub export: bool,
    pub output: Option<PathBuf>,
}

pub fn run_render(args: RenderArgs) -> anyhow::Result<()> {
    if let Some(id) = args.template.as_deref() {
        crate::templates::lookup(id)?;
    }
    let request = PlaygroundRequest {
        html: read_optional(args.html.as_deref())?,
        css: read_optional(args.css.as_deref())?,
        js: read_optional(args.js.as_deref())?,
        template: args.template,
    };
    let playground = Playground::with_buffers(request.into_buffers()?);
    let document = if args.export {
        playground.export_standalone()
    } else {
        playground.render().into_string()
    };

    let Some(output) = args.output else {
        print!("{document}");
        return Ok(());
    };
    let target = if args.export && output.is_dir() {
        output.join(EXPORT_FILE_NAME)
    } else {
        output
    };
    std::fs::write(&target, document)
        .with_context(|| format!("failed to write {}", target.display()))?;
    eprintln!("{}", style::accent(format!("Wrote {}", target.display())));
    Ok(())
}

fn read_optional(path: Option<&Path>) -> anyhow::Result<Option<String>> {
    path.map(|path| {
        std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
    })
    .transpose()
}
