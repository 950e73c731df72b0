mod cli;

use selfref::document::{Document, Format, WriteOptions};
use selfref::resolve::{MissingReferencePolicy, ResolveOptions, Resolver};

fn main() {
    use clap::Parser;
    let cli = cli::Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_env("SELFREF_LOG"))
        .with_writer(std::io::stderr)
        .init();

    for new_path in cli.directory.iter() {
        match new_path.canonicalize() {
            Err(e) => {
                eprintln!(
                    "Failed to resolve path for -C/--directory {}\n{}",
                    new_path.display(),
                    e
                );
                std::process::exit(1);
            }
            Ok(cwd) => {
                if let Err(err) = std::env::set_current_dir(&cwd) {
                    eprintln!("Failed to set work directory to {}\n{}", cwd.display(), err,);
                    std::process::exit(1);
                }

                tracing::info!(directory=%cwd.display(), "Changed working directory");
            }
        }
    }

    let command_result = match cli.command {
        cli::Command::Resolve(resolve_cli) => resolve(resolve_cli),
        cli::Command::Get(get_cli) => get(get_cli),
    };

    if let Err(e) = command_result {
        for error in e.chain() {
            eprintln!("{error}")
        }
        std::process::exit(1);
    }
}

pub fn resolve(cli: cli::ResolveCommand) -> anyhow::Result<()> {
    let mut document = load(&cli.input)?;

    if !cli.no_resolve {
        let report = document.resolve_references_with(&resolver(&cli.resolver))?;
        tracing::debug!(?report, "resolved");
    }

    output(&cli.output, &document)
}

pub fn get(cli: cli::GetCommand) -> anyhow::Result<()> {
    let mut document = load(&cli.input)?;
    document.resolve_references_with(&resolver(&cli.resolver))?;

    let Some(value) = document.get_path(&cli.path) else {
        anyhow::bail!("Path `{}` does not exist", cli.path);
    };

    let options = write_options(&cli.output);
    let rendered = selfref::document::render(value, &options)?;

    match &cli.output.output_file {
        Some(path) => selfref::document::write_file(path, &rendered)?,
        None => print_rendered(&rendered),
    }

    Ok(())
}

fn resolver(args: &cli::ResolverArgs) -> Resolver {
    let missing = match args.missing {
        cli::MissingReference::Undefined => MissingReferencePolicy::Undefined,
        cli::MissingReference::Empty => MissingReferencePolicy::Empty,
        cli::MissingReference::Error => MissingReferencePolicy::Error,
    };

    Resolver::new(ResolveOptions {
        missing,
        max_depth: args.max_depth,
        ..Default::default()
    })
}

fn load(input: &cli::InputArgs) -> anyhow::Result<Document> {
    let mut documents = selfref::inputs::InputDocuments::default();

    if input.files.is_empty() && input.directories.is_empty() {
        let stdin = std::io::read_to_string(std::io::stdin())?;
        documents.load_str(&stdin, None)?;
        return Ok(documents.build());
    }

    for file_path in &input.files {
        documents.load_file(file_path)?;
    }

    for dir_path in &input.directories {
        documents.load_directory(dir_path)?;
    }

    anyhow::ensure!(documents.source_count() > 0, "No files loaded");

    Ok(documents.build())
}

fn write_options(output: &cli::OutputArgs) -> WriteOptions {
    let format = match output.format {
        cli::OutputFormat::Json => Format::Json,
        cli::OutputFormat::Yaml => Format::Yaml,
    };

    WriteOptions {
        format,
        indent: output.indent,
    }
}

fn output(output: &cli::OutputArgs, document: &Document) -> anyhow::Result<()> {
    let options = write_options(output);

    match &output.output_file {
        Some(path) => document.write_file(path, &options)?,
        None => print_rendered(&document.render(&options)?),
    }

    Ok(())
}

/// yaml already ends with a line break, json does not
fn print_rendered(rendered: &str) {
    if rendered.ends_with('\n') {
        print!("{rendered}");
    } else {
        println!("{rendered}");
    }
}
