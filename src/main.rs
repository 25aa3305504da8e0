use clap::{Parser, Subcommand};
use folio::config::{self, SiteConfig};
use folio::index::navigation_for;
use folio::render::Renderer;
use folio::toc::collect_toc_entries;
use folio::{check, generate, output, telemetry};
use std::path::PathBuf;

fn version_string() -> &'static str {
    let on_tag = env!("FOLIO_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("FOLIO_GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "folio")]
#[command(about = "Markdown blog engine for personal portfolio sites")]
#[command(long_about = "\
Markdown blog engine for personal portfolio sites

Every markdown file is a post. Front matter carries the metadata; the
filename is the URL slug. Collections are directories listed in config.toml.

Content structure:

  content/
  ├── config.toml                  # Site config (optional)
  ├── posts/                       # Collection \"writing\" (clamping prev/next)
  │   ├── hello-world.md           # slug: hello-world
  │   ├── 2023/
  │   │   └── year-in-review.md    # Subdirectories are walked
  │   └── .draft.md                # Hidden files are ignored
  └── projects/                    # Collection \"projects\" (wrapping prev/next)
      └── folio.md

Front matter (YAML between --- fences, or TOML between +++):
  title, date, excerpt, category, tags, image, thumbnail, imageFit, thumbnailFit

Run 'folio gen-config' to generate a documented config.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Content directory
    #[arg(long, default_value = "content", global = true)]
    source: PathBuf,

    /// Output directory
    #[arg(long, default_value = "dist", global = true)]
    output: PathBuf,

    /// Log level, overriding [logging] level in config.toml
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List every collection's posts, newest first
    List,
    /// Show metadata, navigation, and contents for one post
    Show {
        /// Post slug (the filename without extension)
        slug: String,
        /// Only look in this collection
        #[arg(long)]
        collection: Option<String>,
    },
    /// Load and render all content, reporting problems
    Check,
    /// Generate the static site
    Build,
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::List => {
            let site_config = setup(&cli)?;
            let collections = generate::load_collections(&cli.source, &site_config)?;
            output::print_list(&collections);
        }
        Command::Show {
            ref slug,
            ref collection,
        } => {
            let site_config = setup(&cli)?;
            show(&cli.source, &site_config, slug, collection.as_deref())?;
        }
        Command::Check => {
            let site_config = setup(&cli)?;
            println!("==> Checking {}", cli.source.display());
            let report = check::check(&cli.source, &site_config)?;
            output::print_check(&report);
            if report.has_errors() {
                return Err(format!(
                    "content check failed with {} error(s)",
                    report.count(check::Severity::Error)
                )
                .into());
            }
        }
        Command::Build => {
            let site_config = setup(&cli)?;
            println!(
                "==> Building {} \u{2192} {}",
                cli.source.display(),
                cli.output.display()
            );
            let summary = generate::generate(&cli.source, &cli.output, &site_config)?;
            output::print_build(&summary);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Load config from the content directory and install logging.
fn setup(cli: &Cli) -> Result<SiteConfig, Box<dyn std::error::Error>> {
    let mut site_config = config::load_config(&cli.source)?;
    if let Some(level) = &cli.log_level {
        site_config.logging.level = level.clone();
    }
    telemetry::init(&site_config.logging)?;
    Ok(site_config)
}

/// Find `slug` in the requested collection, or the first one that has it.
fn show(
    source: &std::path::Path,
    site_config: &SiteConfig,
    slug: &str,
    only: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(name) = only
        && site_config.collection(name).is_none()
    {
        return Err(format!("unknown collection '{name}'").into());
    }

    let (collection, post) = generate::locate_post(source, site_config, slug, only)?;

    let rendered = Renderer::from_config(&site_config.render).render(&post.markdown);
    let toc = collect_toc_entries(&rendered.headings, &site_config.toc.reserved_titles);
    let nav = navigation_for(
        collection.config.navigation,
        collection.index.posts(),
        &post.slug,
    );
    output::print_show(&collection.config, &post, nav.as_ref(), &toc);
    Ok(())
}
