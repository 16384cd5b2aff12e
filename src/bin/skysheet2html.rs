//! skysheet2html: convert a SkySheet file into a printable HTML page.
//!
//! The HTML is written beside the input as `<stem>.html`. A failed
//! conversion writes nothing and exits with a status naming the error kind.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use skysheet::{suggested_layout, BuiltinLayout, ConvertError, ConvertOptions, Converter, LayoutSelector, Translations};

/// File looked up next to the executable for `--layout custom`.
const CUSTOM_LAYOUT_FILE: &str = "custom.xml";
/// Directory of `<locale>.xml` translation files next to the executable.
const LANG_DIR: &str = "lang";

#[derive(Parser, Debug)]
#[command(name = "skysheet2html")]
#[command(about = "Convert SkySheet songs into printable HTML key sheets")]
#[command(version)]
struct Args {
    /// SkySheet file (.skysheet, .txt or .json)
    input: PathBuf,

    /// Keyboard layout: QWERTZ, QWERTY, AZERTY, ARABIC, JIS, RUSSIAN or CUSTOM.
    /// Defaults to the usual layout for the locale.
    #[arg(short, long, env = "SKYSHEET_LAYOUT")]
    layout: Option<String>,

    /// Custom layout file (XML or JSON); implies `--layout custom`
    #[arg(long, env = "SKYSHEET_CUSTOM_LAYOUT")]
    custom_layout: Option<PathBuf>,

    /// UI language of the generated page
    #[arg(short = 'L', long, default_value = skysheet::DEFAULT_LOCALE, env = "SKYSHEET_LOCALE")]
    locale: String,

    /// Directory holding `<locale>.xml` translation files
    #[arg(long, env = "SKYSHEET_LANG_DIR")]
    lang_dir: Option<PathBuf>,

    /// TOML file with parse, pagination and render options
    #[arg(short, long, env = "SKYSHEET_CONFIG")]
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "skysheet=info,skysheet2html=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    match run(&args) {
        Ok(output) => {
            println!("HTML file generated: {}", output.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Conversion error: {e:#}");
            let code = e.downcast_ref::<ConvertError>().map_or(1, ConvertError::exit_code);
            ExitCode::from(u8::try_from(code).unwrap_or(1))
        }
    }
}

fn run(args: &Args) -> Result<PathBuf> {
    if !args.input.is_file() {
        anyhow::bail!("File not found: {}", args.input.display());
    }

    let options = match &args.config {
        Some(path) => load_options(path)?,
        None => ConvertOptions::default(),
    };

    let translations = match lang_dir(args) {
        Some(dir) => Translations::load_dir(&dir)?,
        None => Translations::new(),
    };

    let layout = select_layout(args)?;
    info!(input = %args.input.display(), locale = %args.locale, ?layout, "converting");

    let converter = Converter::new(options, translations)?;
    Ok(converter.convert_to_file(&args.input, &layout, &args.locale)?)
}

fn load_options(path: &Path) -> Result<ConvertOptions> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let options: ConvertOptions = toml::from_str(&text)
        .map_err(|e| ConvertError::Config(format!("{}: {e}", path.display())))?;
    debug!(?options, "options loaded");
    Ok(options)
}

fn select_layout(args: &Args) -> Result<LayoutSelector> {
    if let Some(path) = &args.custom_layout {
        return Ok(LayoutSelector::CustomFile(path.clone()));
    }
    match args.layout.as_deref() {
        Some(name) if name.eq_ignore_ascii_case("custom") => {
            Ok(custom_or_default(beside_executable(CUSTOM_LAYOUT_FILE)))
        }
        Some(name) => Ok(LayoutSelector::Builtin(name.parse::<BuiltinLayout>()?)),
        None => Ok(LayoutSelector::Builtin(suggested_layout(&args.locale))),
    }
}

/// The custom layout at `candidate`, or the default built-in when no file is there.
fn custom_or_default(candidate: Option<PathBuf>) -> LayoutSelector {
    match candidate.filter(|p| p.is_file()) {
        Some(path) => LayoutSelector::CustomFile(path),
        None => {
            let fallback = BuiltinLayout::default();
            warn!(
                "custom layout file missing: create '{CUSTOM_LAYOUT_FILE}' next to the application; using {fallback}"
            );
            LayoutSelector::Builtin(fallback)
        }
    }
}

fn lang_dir(args: &Args) -> Option<PathBuf> {
    args.lang_dir
        .clone()
        .or_else(|| beside_executable(LANG_DIR).filter(|p| p.is_dir()))
}

fn beside_executable(name: &str) -> Option<PathBuf> {
    let exe = std::env::current_exe().ok()?;
    Some(exe.parent()?.join(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_custom_file_falls_back_to_default_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CUSTOM_LAYOUT_FILE);

        assert_eq!(
            custom_or_default(Some(path.clone())),
            LayoutSelector::Builtin(BuiltinLayout::Qwertz)
        );
        assert_eq!(custom_or_default(None), LayoutSelector::Builtin(BuiltinLayout::Qwertz));

        std::fs::write(&path, "<layout/>").unwrap();
        assert_eq!(custom_or_default(Some(path.clone())), LayoutSelector::CustomFile(path));
    }

    #[test]
    fn explicit_custom_layout_path_is_kept() {
        let args = Args::parse_from(["skysheet2html", "song.json", "--custom-layout", "/nowhere/custom.xml"]);
        assert_eq!(
            select_layout(&args).unwrap(),
            LayoutSelector::CustomFile(PathBuf::from("/nowhere/custom.xml"))
        );
    }
}
