//! mogrify CLI - prune an annotated control sequence document by selections

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use doc_model::DocumentTree;
use mogrify::{parse_directive, scan, Mogrifier, MogrifyConfig, NameMap, Selections};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "mogrify")]
#[command(version)]
#[command(about = "Resolve conditional annotations in a control sequence document", long_about = None)]
struct Cli {
    /// Engine configuration (JSON); defaults apply when omitted
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply selections and write the pruned document
    Run {
        /// Document tree (JSON)
        #[arg(short, long, value_name = "FILE")]
        document: PathBuf,

        /// Short-name to long-name map (CSV)
        #[arg(short, long, value_name = "FILE")]
        name_map: PathBuf,

        /// Selections (JSON object; stdin if not specified)
        #[arg(short, long, value_name = "FILE")]
        selections: Option<PathBuf>,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Write the run report (JSON) here
        #[arg(long, value_name = "FILE")]
        report: Option<PathBuf>,
    },

    /// List the annotations found in a document and flag malformed ones
    Scan {
        /// Document tree (JSON)
        #[arg(value_name = "FILE")]
        document: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => MogrifyConfig::from_json_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => MogrifyConfig::default(),
    };

    match cli.command {
        Commands::Run { document, name_map, selections, output, report } => {
            run(config, &document, &name_map, selections.as_deref(), output.as_deref(), report.as_deref())
        }
        Commands::Scan { document } => scan_document(&config, &document),
    }
}

fn run(
    config: MogrifyConfig,
    document: &Path,
    name_map: &Path,
    selections: Option<&Path>,
    output: Option<&Path>,
    report_path: Option<&Path>,
) -> Result<()> {
    let mut tree = load_document(document)?;
    let name_map = NameMap::from_csv_file(name_map, &config.name_map)
        .with_context(|| format!("loading name map {}", name_map.display()))?;
    let selections = match selections {
        Some(path) => Selections::from_json_file(path)
            .with_context(|| format!("loading selections {}", path.display()))?,
        None => {
            let mut input = String::new();
            io::stdin().read_to_string(&mut input).context("reading selections from stdin")?;
            Selections::from_json_str(&input).context("parsing selections from stdin")?
        }
    };

    let report = Mogrifier::new(name_map, config).mogrify(&mut tree, &selections);
    tracing::info!("{}", report.summary);

    let json = tree.to_json().context("serializing document")?;
    match output {
        Some(path) => fs::write(path, json).with_context(|| format!("writing {}", path.display()))?,
        None => println!("{json}"),
    }
    if let Some(path) = report_path {
        let json = serde_json::to_string_pretty(&report)?;
        fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    }
    Ok(())
}

fn scan_document(config: &MogrifyConfig, document: &Path) -> Result<()> {
    let tree = load_document(document)?;
    let result = scan(&tree, &config.annotation_style);
    for structure in &result.structures {
        match parse_directive(&structure.raw_text) {
            Ok(_) => println!("{}", structure.raw_text),
            Err(err) => println!("{}  <-- {err}", structure.raw_text),
        }
    }
    eprintln!("{} annotations", result.len());
    Ok(())
}

fn load_document(path: &Path) -> Result<DocumentTree> {
    let json = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    DocumentTree::from_json(&json).with_context(|| format!("parsing document {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use doc_model::{Paragraph, Run};

    #[test]
    fn test_cli_parses_run() {
        let cli = Cli::try_parse_from([
            "mogrify", "run", "-d", "doc.json", "-n", "names.csv", "-s", "sel.json",
        ])
        .unwrap();
        match cli.command {
            Commands::Run { selections, output, .. } => {
                assert_eq!(selections, Some(PathBuf::from("sel.json")));
                assert!(output.is_none());
            }
            Commands::Scan { .. } => panic!("expected run"),
        }
    }

    #[test]
    fn test_run_writes_output_and_report() {
        let dir = tempfile::tempdir().unwrap();
        let mut tree = DocumentTree::new();
        let root = tree.root_id();
        let para = tree.insert_paragraph(Paragraph::with_paragraph_style("Heading 2"), root, None).unwrap();
        tree.insert_run(Run::with_character_style("[NO a]", "Toggle"), para, None).unwrap();
        tree.insert_run(Run::new("Gone"), para, None).unwrap();

        let doc = dir.path().join("doc.json");
        fs::write(&doc, tree.to_json().unwrap()).unwrap();
        let names = dir.path().join("names.csv");
        fs::write(&names, "Short ID,Modelica Path\na,Long.a\n").unwrap();
        let sel = dir.path().join("sel.json");
        fs::write(&sel, r#"{"Long.a": true}"#).unwrap();
        let out = dir.path().join("out.json");
        let report = dir.path().join("report.json");

        run(MogrifyConfig::default(), &doc, &names, Some(&sel), Some(&out), Some(&report)).unwrap();

        let result = DocumentTree::from_json(&fs::read_to_string(&out).unwrap()).unwrap();
        assert!(result.get_paragraph(para).is_none());
        let report: serde_json::Value = serde_json::from_str(&fs::read_to_string(&report).unwrap()).unwrap();
        assert_eq!(report["sections_removed"], 1);
    }

    #[test]
    fn test_missing_document_has_context() {
        let err = load_document(Path::new("/nonexistent/doc.json")).unwrap_err();
        assert!(err.to_string().contains("reading"));
    }
}
