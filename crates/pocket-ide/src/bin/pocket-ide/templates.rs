//! `pocket-ide templates`.

use anyhow::Context;
use pocket_playground::templates::{self, TemplateDescriptor};
use pocket_playground::BufferKind;

use crate::cli::TemplatesAction;
use crate::style;

pub fn run_templates(action: TemplatesAction) -> anyhow::Result<()> {
    match action {
        TemplatesAction::List => {
            for template in templates::catalog() {
                println!(
                    "{}  {} - {}",
                    style::accent(format!("{:<12}", template.id)),
                    template.name,
                    template.description
                );
            }
        }
        TemplatesAction::Show { id } => {
            let template = lookup(&id)?;
            let buffers = template.buffers();
            println!("{}", style::heading(template.name));
            for kind in BufferKind::ALL {
                println!();
                println!("{}", style::accent(format!("--- {} ---", kind.file_name())));
                println!("{}", buffers.get(kind));
            }
        }
        TemplatesAction::Snippet { id } => {
            println!("{}", lookup(&id)?.snippet());
        }
    }
    Ok(())
}

pub fn lookup(id: &str) -> anyhow::Result<&'static TemplateDescriptor> {
    templates::find(id).with_context(|| {
        let known = templates::catalog()
            .iter()
            .map(|template| template.id)
            .collect::<Vec<_>>()
            .join(", ");
        format!("unknown template '{id}' (available: {known})")
    })
}
