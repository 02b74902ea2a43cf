use anyhow::Context;
use clap::Parser;
use proteus::adapters::fake_provider::FakeProvider;
use proteus::adapters::schema_loader::load_document;
use proteus::cli::Cli;
use proteus::config::Settings;
use proteus::domain::SchemaGraph;
use tracing::info;

fn main() -> anyhow::Result<()> {
    // Generated JSON goes to stdout, logs to stderr
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();

    if cli.list_generators {
        for method in FakeProvider::methods() {
            println!("{}", method);
        }
        return Ok(());
    }

    let settings = Settings::new_with_cli(&cli)?;

    let schema_path = cli
        .schema
        .as_deref()
        .context("--schema is required")?;
    let document = load_document(schema_path)
        .with_context(|| format!("Failed to read schema {}", schema_path.display()))?;
    let graph = SchemaGraph::from_document(&document, &cli.pointer)
        .with_context(|| format!("Failed to resolve schema at '{}'", cli.pointer))?;

    info!(
        "Generating {} value(s) from {} ({} nodes)",
        settings.output.count,
        schema_path.display(),
        graph.len()
    );

    let options = settings.generation_options();
    let value = proteus::generate_batch(&graph, &options, settings.output.count)?;

    let rendered = if settings.output.pretty {
        serde_json::to_string_pretty(&value)?
    } else {
        serde_json::to_string(&value)?
    };
    println!("{}", rendered);

    Ok(())
}
