//! List command - show the registered codemods

use ciseau_atelier::CodemodRegistry;
use clap::Args;
use serde::Serialize;

use super::OutputFormat;

#[derive(Args)]
pub struct ListArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CodemodEntry {
    name: &'static str,
    description: &'static str,
    paths: &'static [&'static str],
    module_api_change: bool,
}

pub fn run(args: ListArgs) {
    let registry = CodemodRegistry::builtin();
    let entries: Vec<CodemodEntry> = registry
        .codemods()
        .iter()
        .map(|codemod| {
            let meta = codemod.meta();
            CodemodEntry {
                name: meta.name,
                description: meta.description,
                paths: meta.paths,
                module_api_change: meta.module_api_change,
            }
        })
        .collect();

    match args.format {
        OutputFormat::Json => match serde_json::to_string_pretty(&entries) {
            Ok(json) => println!("{json}"),
            Err(e) => eprintln!("Error serializing codemod list: {e}"),
        },
        OutputFormat::Text => {
            let width = entries.iter().map(|entry| entry.name.len()).max().unwrap_or(0);
            for entry in &entries {
                let order = if entry.module_api_change {
                    "runs first"
                } else {
                    "runs last "
                };
                println!("{:width$}  [{order}]  {}", entry.name, entry.description);
                if !entry.paths.is_empty() {
                    println!("{:width$}  paths: {}", "", entry.paths.join(", "));
                }
            }
        }
    }
}
