use clap::{Parser, Subcommand};
use page_weaver::site::Site;
use page_weaver::{config, output};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "page-weaver", version)]
#[command(about = "Static site generator for markdown pages and minijinja templates")]
#[command(long_about = "\
Static site generator for markdown pages and minijinja templates

Every markdown file becomes one HTML page. Pages share a navigation list
built from all pages, get a breadcrumb trail from their URL, and are
rendered through a template that can link to any other page with url().

Site structure:

  site/
  ├── config.toml          # Site config (optional)
  ├── globals.yaml         # Data available to every template (optional)
  ├── messages/
  │   ├── en.yaml          # Texts for the trans filter, one file per language
  │   └── fr.yaml
  ├── templates/
  │   ├── page.html        # Default template (built-in layout when missing)
  │   └── doc.html         # Chosen with `layout: doc.html` in front matter
  └── pages/
      ├── index.md         # → index.html
      └── team/
          └── about.md     # → team/about.html

Output placement (first available wins):
  output.path  front matter, used verbatim
  output.url   or url, with .html appended
  source path  with the extension replaced by .html

Run 'page-weaver gen-config' to generate a documented config.toml.")]
struct Cli {
    /// Site root directory
    #[arg(long, default_value = ".", global = true)]
    root: PathBuf,

    /// Output directory (default: build.output_dir from config, under the root)
    #[arg(long, global = true)]
    output: Option<PathBuf>,

    /// Log each rendered page
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render every page into the output directory
    Build {
        /// Write every page, even when its output is unchanged
        #[arg(long)]
        no_cache: bool,

        /// Read page records from a JSON file instead of the pages directory
        #[arg(long, value_name = "MANIFEST")]
        pages: Option<PathBuf>,
    },
    /// Read pages and assemble global data without writing anything
    Check,
    /// Print all page records as JSON
    Pages,
    /// Print the navigation list
    Nav,
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Build { no_cache, pages } => {
            let site = Site::load_with_pages(&cli.root, pages.as_deref())?;
            let output_dir = cli.output.unwrap_or_else(|| site.default_output_dir());
            println!("==> Building {} pages → {}", site.pages().len(), output_dir.display());
            let report = site.build(&output_dir, !no_cache)?;
            output::print_build_report(&report);
            println!("Pages: {}", report.stats);
            println!("==> Build complete: {}", output_dir.display());
        }
        Command::Check => {
            println!("==> Checking {}", cli.root.display());
            let site = Site::load(&cli.root)?;
            output::print_check_output(site.pages(), site.context());
            println!("==> Site is valid");
        }
        Command::Pages => {
            let site = Site::load(&cli.root)?;
            println!("{}", serde_json::to_string_pretty(site.pages())?);
        }
        Command::Nav => {
            let site = Site::load(&cli.root)?;
            output::print_navigation(site.context().navigation());
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}
