//! projgraph CLI - PERT/CPM project scheduling engine
//!
//! Command-line interface for parsing `.pgraph` project files and
//! scheduling them with the critical path method.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use projgraph_core::Project;

#[derive(Parser)]
#[command(name = "projgraph")]
#[command(author, version, about = "PERT/CPM project scheduling engine", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a `.pgraph` file and print the resulting project
    Parse {
        /// Input file path
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Parse a `.pgraph` file and schedule it with CPM
    Schedule {
        /// Input file path
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,

        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::registry().with(fmt::layer()).with(EnvFilter::from_default_env()).init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Parse { file, format }) => cmd_parse(&file, &format),
        Some(Commands::Schedule { file, format, output }) => cmd_schedule(&file, &format, output.as_deref()),
        None => {
            println!("projgraph - PERT/CPM project scheduling engine");
            println!();
            println!("Usage: projgraph <COMMAND>");
            println!();
            println!("Commands:");
            println!("  parse      Parse a .pgraph file and print the resulting project");
            println!("  schedule   Parse and schedule a .pgraph file with CPM");
            println!();
            println!("Run 'projgraph --help' for more information");
            Ok(())
        }
    }
}

fn load_project(file: &std::path::Path) -> Result<Project> {
    let ast = projgraph_parser::parse_file(file)
        .with_context(|| format!("failed to parse {}", file.display()))?;
    let mut project = Project::new(project_name_from_path(file));
    projgraph_interp::interpret(&ast, &mut project)
        .with_context(|| format!("failed to interpret {}", file.display()))?;
    Ok(project)
}

fn project_name_from_path(file: &std::path::Path) -> String {
    file.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_else(|| "project".to_string())
}

/// Parse command: parse and interpret a `.pgraph` file, with no scheduling.
fn cmd_parse(file: &std::path::Path, format: &str) -> Result<()> {
    tracing::info!(file = %file.display(), "parsing project");
    let project = load_project(file)?;

    match format {
        "json" => {
            let json = serde_json::to_string_pretty(&project).context("failed to serialise project")?;
            println!("{json}");
        }
        _ => {
            println!("Project: {}", project.name);
            println!("  tasks:        {}", project.tasks.len());
            println!("  milestones:   {}", project.milestones.len());
            println!("  resources:    {}", project.resources.len());
            println!("  dependencies: {}", project.dependencies.len());
        }
    }
    Ok(())
}

/// Schedule command: parse, interpret, and run CPM over a `.pgraph` file.
fn cmd_schedule(file: &std::path::Path, format: &str, output: Option<&std::path::Path>) -> Result<()> {
    tracing::info!(file = %file.display(), "scheduling project");
    let project = load_project(file)?;
    let chart = projgraph_solver::schedule_project(&project).context("CPM scheduling failed")?;

    let rendered = match format {
        "json" => serde_json::to_string_pretty(&chart).context("failed to serialise chart")?,
        _ => format_text(&chart),
    };

    match output {
        Some(path) => std::fs::write(path, rendered).with_context(|| format!("failed to write {}", path.display()))?,
        None => println!("{rendered}"),
    }
    Ok(())
}

fn format_text(chart: &projgraph_solver::Chart) -> String {
    let mut out = String::new();
    out.push_str(&format!("Schedule: {}\n", chart.title));
    out.push_str(&format!("Project finish: {}\n\n", chart.project_finish()));
    out.push_str(&format!(
        "{:<12} {:>8} {:>8} {:>8} {:>8} {:>7}  critical\n",
        "id", "ES", "EF", "LS", "LF", "slack"
    ));
    for node in &chart.nodes {
        out.push_str(&format!(
            "{:<12} {:>8} {:>8} {:>8} {:>8} {:>7}  {}\n",
            node.id,
            node.earliest_start,
            node.earliest_finish,
            node.latest_start,
            node.latest_finish,
            node.slack,
            if node.is_critical() { "*" } else { "" },
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".pgraph").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn load_project_parses_and_interprets() {
        let file = write_temp("A\nB\nA > B\n");
        let project = load_project(file.path()).unwrap();
        assert_eq!(project.tasks.len(), 2);
        assert_eq!(project.dependencies.len(), 1);
    }

    #[test]
    fn cmd_schedule_writes_json_to_output_file() {
        let input = write_temp("A(duration: 3)\nB(duration: 4)\nA > B\n");
        let output = tempfile::NamedTempFile::new().unwrap();
        cmd_schedule(input.path(), "json", Some(output.path())).unwrap();
        let contents = std::fs::read_to_string(output.path()).unwrap();
        assert!(contents.contains("\"nodes\""));
        assert!(contents.contains("\"criticalPath\""));
    }

    #[test]
    fn format_text_marks_critical_nodes() {
        let mut project = Project::new("p");
        project.task_upsert(projgraph_core::Task::new("A").with_attr("duration", "5"));
        let chart = projgraph_solver::schedule_project(&project).unwrap();
        let text = format_text(&chart);
        assert!(text.contains('*'));
    }

    #[test]
    fn load_project_reports_missing_file() {
        let err = load_project(std::path::Path::new("/nonexistent/file.pgraph")).unwrap_err();
        assert!(format!("{err:#}").contains("failed to parse"));
    }
}
