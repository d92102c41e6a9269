// ABOUTME: Main entry point for lsky-uploader CLI
// ABOUTME: Parses commands and runs the image actions against a Markdown file

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use lsky_uploader::actions::{self, Action, ClipboardItem};
use lsky_uploader::config::{default_config_path, SettingError, Settings};
use lsky_uploader::editor::DocumentEditor;
use lsky_uploader::host::{Cursor, Editor, StdoutNotifier};
use lsky_uploader::i18n::{LangPack, Locale};
use lsky_uploader::vault::FsVault;
use lsky_uploader::Result;
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lsky-uploader")]
#[command(about = "Move images referenced in Markdown to and from a Lsky Pro image host", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Settings file (default: <config dir>/lsky-uploader/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct SelectionArgs {
    /// Markdown file to process
    file: PathBuf,
    /// Only process these lines, e.g. 3:10 or 7 (1-based, inclusive)
    #[arg(long)]
    lines: Option<String>,
    /// Vault root used to resolve local images
    #[arg(long, default_value = ".")]
    vault: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload images referenced in a file and rewrite the links
    Upload(SelectionArgs),
    /// Delete hosted images whose URLs appear in a file
    Delete(SelectionArgs),
    /// Download hosted images into the vault download folder
    Download(SelectionArgs),
    /// Upload an image file as if pasted into a document
    Paste {
        /// Image file to upload
        image: PathBuf,
        /// Markdown file to insert the link into
        #[arg(long)]
        into: PathBuf,
        /// Line to insert at (1-based, default: end of file)
        #[arg(long)]
        line: Option<usize>,
    },
    /// List the commands enabled in settings
    Commands,
    /// Settings management commands
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print current settings
    Show,
    /// Print the settings file path
    Path,
    /// Set a single setting
    Set {
        /// Setting key, e.g. api_base_url
        key: String,
        /// New value
        value: String,
    },
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("lsky_uploader=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn parse_lines(range: &str) -> Result<(usize, usize)> {
    let parse = |s: &str| {
        s.trim()
            .parse::<usize>()
            .with_context(|| format!("Invalid line number: {}", s))
    };

    match range.split_once(':') {
        Some((first, last)) => Ok((parse(first)?, parse(last)?)),
        None => {
            let line = parse(range)?;
            Ok((line, line))
        }
    }
}

fn toggle_key(action: Action) -> &'static str {
    match action {
        Action::Upload => "show_upload_button",
        Action::Delete => "show_delete_button",
        Action::Download => "show_download_button",
    }
}

async fn cmd_action(action: Action, settings: &Settings, lang: &LangPack, args: SelectionArgs) -> Result<()> {
    if !action.is_enabled(settings) {
        bail!(
            "Command '{}' is disabled. Enable it with:\n  lsky-uploader config set {} true",
            action.id(),
            toggle_key(action)
        );
    }

    let original = fs::read_to_string(&args.file)
        .with_context(|| format!("Failed to read {}", args.file.display()))?;

    let mut editor = DocumentEditor::new(original.clone());
    if let Some(lines) = &args.lines {
        let (first, last) = parse_lines(lines)?;
        editor.select_lines(first, last)?;
    }

    let vault = FsVault::new(args.vault.clone());
    actions::execute(action, settings, lang, &mut editor, &vault, &StdoutNotifier).await;

    if editor.text() != original {
        fs::write(&args.file, editor.text())
            .with_context(|| format!("Failed to write {}", args.file.display()))?;
        println!("✓ Updated {}", args.file.display());
    }

    Ok(())
}

async fn cmd_paste(
    settings: &Settings,
    lang: &LangPack,
    image: PathBuf,
    into: PathBuf,
    line: Option<usize>,
) -> Result<()> {
    let original = fs::read_to_string(&into)
        .with_context(|| format!("Failed to read {}", into.display()))?;
    let bytes = fs::read(&image)
        .with_context(|| format!("Failed to read {}", image.display()))?;
    let mime_type = mime_guess::from_path(&image).first_or_octet_stream();

    let mut editor = DocumentEditor::new(original.clone());
    if let Some(line) = line {
        editor.set_cursor(Cursor {
            line: line.saturating_sub(1),
            ch: 0,
        });
    }

    let item = ClipboardItem {
        mime_type: mime_type.essence_str().to_string(),
        bytes,
    };

    let handled = actions::handle_paste(settings, lang, &mut editor, vec![item], &StdoutNotifier).await;
    if !handled {
        bail!(
            "Nothing uploaded: clipboard upload is off or {} is not an image.\n  Enable it with: lsky-uploader config set upload_clipboard true",
            image.display()
        );
    }

    if editor.text() != original {
        fs::write(&into, editor.text())
            .with_context(|| format!("Failed to write {}", into.display()))?;
        println!("✓ Updated {}", into.display());
    }

    Ok(())
}

fn cmd_config(command: ConfigCommands, path: PathBuf, mut settings: Settings, lang: &LangPack) -> Result<()> {
    match command {
        ConfigCommands::Show => {
            if !settings.token.is_empty() {
                settings.token = "********".to_string();
            }
            print!("{}", toml::to_string_pretty(&settings).context("Failed to serialize config")?);
        }
        ConfigCommands::Path => println!("{}", path.display()),
        ConfigCommands::Set { key, value } => {
            match settings.set(&key, &value) {
                Ok(()) => {}
                Err(e @ SettingError::InvalidNumber { .. }) => {
                    bail!("{} ({})", lang.general.invalid_number, e)
                }
                Err(e) => bail!(e),
            }
            settings.save_to(&path)?;
            println!("✓ Set {}", key);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config_path = match cli.config {
        Some(path) => path,
        None => default_config_path()?,
    };
    let settings = Settings::load_from(&config_path)?;
    let lang = LangPack::for_locale(Locale::detect(settings.language.as_deref()));

    match cli.command {
        Commands::Upload(args) => cmd_action(Action::Upload, &settings, &lang, args).await,
        Commands::Delete(args) => cmd_action(Action::Delete, &settings, &lang, args).await,
        Commands::Download(args) => cmd_action(Action::Download, &settings, &lang, args).await,
        Commands::Paste { image, into, line } => cmd_paste(&settings, &lang, image, into, line).await,
        Commands::Commands => {
            for action in Action::enabled(&settings) {
                println!("  {:<16} {}", action.id(), action.title(&lang));
            }
            Ok(())
        }
        Commands::Config(command) => cmd_config(command, config_path, settings, &lang),
    }
}
