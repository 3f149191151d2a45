use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;

use mailframe::model::Project;
use mailframe::style::{self, ResolvedStyle};
use mailframe::{scope, ExportConfig};

#[derive(Parser, Debug)]
#[command(name = "mailframe", version, about = "Email section style resolution and export tooling", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the resolved style and stylesheet of one section
    Resolve {
        /// Project JSON with `sections` and an optional `template`
        #[arg(long)]
        project: PathBuf,
        /// Section id
        #[arg(long)]
        section: String,
    },
    /// Confine CSS to one section. Reads stdin when no file is given.
    Scope {
        #[arg(long)]
        id: String,
        file: Option<PathBuf>,
    },
    /// Validate an export config and print it with defaults filled in
    Config {
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ResolveOutput<'a> {
    section_id: &'a str,
    style: &'a ResolvedStyle,
    stylesheet: String,
}

fn read_input(path: Option<&PathBuf>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display())),
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf).context("reading stdin")?;
            Ok(buf)
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Resolve { project, section } => {
            let json = read_input(Some(&project))?;
            let project = Project::from_json(&json)?;
            let found = project
                .section(&section)
                .with_context(|| format!("no section with id {:?}", section))?;
            let resolved = style::resolve(found, project.template.as_ref());
            let out = ResolveOutput {
                section_id: &found.id,
                style: &resolved,
                stylesheet: resolved.stylesheet(&found.id),
            };
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Commands::Scope { id, file } => {
            let css = read_input(file.as_ref())?;
            println!("{}", scope::scope_css(&css, &id));
        }
        Commands::Config { config } => {
            let cfg = match config {
                Some(path) => ExportConfig::from_json(&read_input(Some(&path))?)
                    .with_context(|| format!("loading {}", path.display()))?,
                None => ExportConfig::default(),
            };
            println!("{}", serde_json::to_string_pretty(&cfg)?);
        }
    }

    Ok(())
}
