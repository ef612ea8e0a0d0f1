use clap::{Parser, Subcommand};
use corpus_forge::ids::UuidIds;
use corpus_forge::{config, logging, output, pipeline};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "corpus-forge")]
#[command(about = "Build a multilingual, paginated scripture corpus")]
#[command(long_about = "\
Build a multilingual, paginated scripture corpus

Merges an original text with positionally aligned translations, localized
section titles and a page boundary index into two JSON documents.

Corpus structure:

  assets/
  ├── corpus.toml              # Build config (optional)
  ├── quran-simple.xml         # Original text
  ├── quran-data.xml           # Page boundary index
  ├── translations/
  │   ├── ru.abuadel.xml       # Locale \"ru\" (file name up to the first dot)
  │   └── en.sahih.xml         # Locale \"en\"
  └── titles/
      └── ru.json              # Section titles for \"ru\"

Outputs (paths relative to the corpus root):
  quran.json         {copyright, corpus: {sections}}  verses carry pageNumber
  quran-pages.json   {copyright, corpus: {pages}}

Run 'corpus-forge gen-config' to generate a documented corpus.toml.")]
#[command(version)]
struct Cli {
    /// Corpus root directory
    #[arg(long, default_value = "assets", global = true)]
    source: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build both corpus documents
    Build,
    /// Run the full pipeline without writing anything
    Check,
    /// Print a stock corpus.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();

    let cli = Cli::parse();

    match cli.command {
        Command::Build => {
            let config = config::load_config(&cli.source)?;
            println!("==> Building {}", cli.source.display());
            let build = pipeline::run(&cli.source, &config, &mut UuidIds)?;
            output::print_build_output(&build, &cli.source);
            output::print_diagnostics(&build.diagnostics);
            let (sections_path, pages_path) = pipeline::output_paths(&cli.source, &config);
            output::print_written(&[sections_path.as_path(), pages_path.as_path()], &cli.source);
            println!("==> Build complete");
        }
        Command::Check => {
            let config = config::load_config(&cli.source)?;
            println!("==> Checking {}", cli.source.display());
            let build = pipeline::build(&cli.source, &config, &mut UuidIds)?;
            output::print_build_output(&build, &cli.source);
            output::print_diagnostics(&build.diagnostics);
            println!("==> Corpus is valid");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}
