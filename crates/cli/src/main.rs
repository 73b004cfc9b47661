//! CLI tool for populating a template slide with images and values
//! extracted from data files.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use slidefill_core::config::default_template;
use slidefill_core::{
    format_number, FileResolver, ImageLayout, LayoutModeStore, LineExtractor, Session,
    SessionEvent, StoreConfig, TextLayout, CUSTOM_MODE,
};
use std::path::{Path, PathBuf};

/// Insert images and extracted values into a template slide.
#[derive(Parser, Debug)]
#[command(name = "slidefill")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory holding the saved layout modes (default: ~/.slidefill)
    #[arg(long, global = true, env = "SLIDEFILL_CONFIG_DIR")]
    config_dir: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build a one-slide presentation from a layout mode
    Generate(BatchArgs),

    /// Add a mode's text boxes to a slide of the template, keeping all slides
    Fill(BatchArgs),

    /// Print the formatted value read from one line of a data file
    Extract {
        /// Directory containing the data files
        #[arg(short, long)]
        workdir: PathBuf,

        /// Substring of the data file name (default: first text file)
        #[arg(short, long, default_value = "")]
        keyword: String,

        /// 1-based line number
        #[arg(short, long, default_value_t = 1)]
        line: usize,

        /// Comma-separated 1-based column numbers
        #[arg(short, long, default_value = "1")]
        cols: String,
    },

    /// Show which data file a keyword selects
    Resolve {
        /// Directory containing the data files
        #[arg(short, long)]
        workdir: PathBuf,

        /// Substring of the data file name (default: first text file)
        #[arg(default_value = "")]
        keyword: String,
    },

    /// Format numbers the way inserted values are formatted
    Format {
        #[arg(required = true)]
        values: Vec<String>,
    },

    /// List the slides of a template with their text
    Slides {
        /// Template presentation (default: bundled template)
        template: Option<PathBuf>,
    },

    /// Manage saved layout modes
    Modes {
        #[command(subcommand)]
        action: ModesCommand,
    },
}

#[derive(clap::Args, Debug)]
struct BatchArgs {
    /// Layout mode to apply
    #[arg(short, long, default_value = CUSTOM_MODE)]
    mode: String,

    /// Directory holding the images and data files; output is written here
    #[arg(short, long)]
    workdir: PathBuf,

    /// Template presentation (default: the mode's template)
    #[arg(short, long)]
    template: Option<PathBuf>,

    /// 0-based template slide (default: the mode's slide)
    #[arg(short, long)]
    slide: Option<usize>,

    /// Assign the working directory's images to the image entries by name order
    #[arg(long)]
    fill_images: bool,

    #[command(flatten)]
    entries: EntryArgs,
}

#[derive(clap::Args, Debug)]
struct EntryArgs {
    /// Extra image entry in cm: [FILE@]LEFT,TOP[,WIDTH[,HEIGHT]]
    #[arg(long = "image", value_name = "SPEC")]
    images: Vec<String>,

    /// Extra text entry: LINE:COLS:LEFT,TOP[:KEYWORD]
    #[arg(long = "text", value_name = "SPEC")]
    texts: Vec<String>,
}

#[derive(Subcommand, Debug)]
enum ModesCommand {
    /// List saved modes
    List,

    /// Print a mode as JSON
    Show { name: String },

    /// Save the given entries as a mode
    Save {
        name: String,

        /// Template presentation stored with the mode
        #[arg(short, long)]
        template: Option<PathBuf>,

        /// 0-based template slide stored with the mode
        #[arg(short, long)]
        slide: Option<usize>,

        #[command(flatten)]
        entries: EntryArgs,
    },

    /// Delete a saved mode
    Delete { name: String },
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    match &args.command {
        Command::Generate(batch) => run_batch(&args, batch, false),
        Command::Fill(batch) => run_batch(&args, batch, true),
        Command::Extract {
            workdir,
            keyword,
            line,
            cols,
        } => {
            let path = FileResolver::new(workdir).resolve_path(keyword)?;
            let value = LineExtractor::new()
                .extract(&path, *line, cols)
                .with_context(|| format!("Failed to extract from {}", path.display()))?;
            log::debug!("Line {}: {}", line, value.line);
            println!("{}", value.text);
            Ok(())
        }
        Command::Resolve { workdir, keyword } => {
            println!("{}", FileResolver::new(workdir).resolve(keyword)?);
            Ok(())
        }
        Command::Format { values } => {
            for value in values {
                println!("{}", format_number(value));
            }
            Ok(())
        }
        Command::Slides { template } => {
            let template = template
                .clone()
                .or_else(default_template)
                .context("No template given and no bundled template found")?;
            for slide in slidefill_pptx::list_slides(&template)? {
                println!("{} (index {}): {}", slide.number, slide.number - 1, slide.lines.join(" | "));
            }
            Ok(())
        }
        Command::Modes { action } => run_modes(&args, action),
    }
}

fn open_store(args: &Args) -> LayoutModeStore {
    let config = match &args.config_dir {
        Some(dir) => StoreConfig::new(dir),
        None => StoreConfig::default_location(),
    };
    log::debug!("Layout modes file: {}", config.modes_file().display());
    LayoutModeStore::open(config)
}

/// Apply a mode plus command-line entries to a session and run generate or fill.
fn run_batch(args: &Args, batch: &BatchArgs, fill: bool) -> Result<()> {
    let store = open_store(args);
    let mode = store.require(&batch.mode)?.clone();

    let mut session = Session::new();
    session.subscribe(log_event);
    session.set_work_dir(&batch.workdir);
    session.apply_mode(&mode);
    match &batch.template {
        Some(template) => session.set_template(Some(template.clone())),
        None if session.template().is_none() => session.set_template(default_template()),
        None => {}
    }
    add_entries(&mut session, &batch.entries)?;

    if batch.fill_images {
        let found = session.fill_images_from_dir()?;
        eprintln!("Found {} images in {}", found, batch.workdir.display());
    }

    let slide = batch.slide.unwrap_or(mode.slide_index);
    let report = if fill {
        slidefill_pptx::fill(&session, slide)?
    } else {
        slidefill_pptx::generate(&session, slide)?
    };

    println!("{}", report.status_message());
    Ok(())
}

fn run_modes(args: &Args, action: &ModesCommand) -> Result<()> {
    let mut store = open_store(args);

    match action {
        ModesCommand::List => {
            for mode in store.modes() {
                println!("{}\t{}", mode.name, mode.description);
            }
        }
        ModesCommand::Show { name } => {
            let mode = store.require(name)?;
            println!("{}", serde_json::to_string_pretty(mode)?);
        }
        ModesCommand::Save {
            name,
            template,
            slide,
            entries,
        } => {
            let mut session = Session::new();
            session.set_template(template.clone());
            add_entries(&mut session, entries)?;
            let mode = session.capture_mode(name, *slide)?;
            let description = mode.description.clone();
            store.upsert(mode)?;
            store.save().context("Failed to save layout modes")?;
            println!("Saved '{}': {}", name.trim(), description);
        }
        ModesCommand::Delete { name } => {
            store.delete(name)?;
            store.save().context("Failed to save layout modes")?;
            println!("Deleted '{}'", name);
        }
    }

    Ok(())
}

fn add_entries(session: &mut Session, entries: &EntryArgs) -> Result<()> {
    for spec in &entries.images {
        session.push_image(parse_image(spec)?);
    }
    for spec in &entries.texts {
        session.push_text(parse_text(spec)?);
    }
    Ok(())
}

/// Parse `[FILE@]LEFT,TOP[,WIDTH[,HEIGHT]]`.
fn parse_image(spec: &str) -> Result<ImageLayout> {
    let (filename, coords) = match spec.rsplit_once('@') {
        Some((file, coords)) => (file, coords),
        None => ("", spec),
    };
    let numbers = parse_numbers(coords).with_context(|| format!("Invalid image entry '{}'", spec))?;

    let layout = match numbers.as_slice() {
        [left, top] => ImageLayout::at(*left, *top),
        [left, top, width] => ImageLayout::at(*left, *top).with_size(Some(*width), None),
        [left, top, width, height] => {
            ImageLayout::at(*left, *top).with_size(Some(*width), Some(*height))
        }
        _ => bail!("Invalid image entry '{}': expected LEFT,TOP[,WIDTH[,HEIGHT]]", spec),
    };
    Ok(layout.with_filename(filename))
}

/// Parse `LINE:COLS:LEFT,TOP[:KEYWORD]`.
fn parse_text(spec: &str) -> Result<TextLayout> {
    let mut parts = spec.splitn(4, ':');
    let (Some(line), Some(cols), Some(position)) = (parts.next(), parts.next(), parts.next()) else {
        bail!("Invalid text entry '{}': expected LINE:COLS:LEFT,TOP[:KEYWORD]", spec);
    };
    let keyword = parts.next().unwrap_or("");

    let line: usize = line
        .trim()
        .parse()
        .with_context(|| format!("Invalid line number in text entry '{}'", spec))?;
    let numbers = parse_numbers(position).with_context(|| format!("Invalid text entry '{}'", spec))?;
    let [left, top] = numbers.as_slice() else {
        bail!("Invalid text entry '{}': expected LEFT,TOP", spec);
    };

    Ok(TextLayout::new(line, cols.trim())
        .at(*left, *top)
        .with_keyword(keyword))
}

fn parse_numbers(text: &str) -> Result<Vec<f64>> {
    text.split(',')
        .map(|n| {
            n.trim()
                .parse::<f64>()
                .with_context(|| format!("'{}' is not a number", n.trim()))
        })
        .collect()
}

fn log_event(event: &SessionEvent) {
    match event {
        SessionEvent::ModeApplied {
            name,
            images,
            texts,
        } => log::info!("Applied mode '{}' ({} images, {} texts)", name, images, texts),
        SessionEvent::TemplateChanged(template) => {
            log::debug!("Template: {}", display_path(template.as_deref()))
        }
        SessionEvent::WorkDirChanged(dir) => log::debug!("Working directory: {}", dir.display()),
        SessionEvent::ImagesFilled { found, total } => {
            log::info!("Assigned {} images to {} entries", found, total)
        }
        other => log::debug!("{:?}", other),
    }
}

fn display_path(path: Option<&Path>) -> String {
    path.map(|p| p.display().to_string())
        .unwrap_or_else(|| "(none)".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_image_specs() {
        let layout = parse_image("a.png@1.5,2").unwrap();
        assert_eq!(layout.filename, "a.png");
        assert_eq!((layout.left, layout.top), (1.5, 2.0));
        assert_eq!(layout.size_cm(), None);

        let layout = parse_image("0,0,8").unwrap();
        assert_eq!(layout.filename, "");
        assert_eq!(layout.size_cm(), Some((8.0, 6.0)));

        assert!(parse_image("1").is_err());
        assert!(parse_image("x,1").is_err());
    }

    #[test]
    fn test_parse_text_specs() {
        let layout = parse_text("2:1,3:4.5,6:temp").unwrap();
        assert_eq!(layout.line_number, 2);
        assert_eq!(layout.file_cols, "1,3");
        assert_eq!((layout.left, layout.top), (4.5, 6.0));
        assert_eq!(layout.keyword, "temp");

        let layout = parse_text("1:2:0,0").unwrap();
        assert_eq!(layout.keyword, "");

        assert!(parse_text("1:2").is_err());
        assert!(parse_text("one:2:0,0").is_err());
        assert!(parse_text("1:2:0").is_err());
    }

    #[test]
    fn test_cli_parses_generate() {
        let args = Args::try_parse_from([
            "slidefill",
            "generate",
            "--workdir",
            "/tmp/run",
            "--slide",
            "2",
            "--image",
            "a.png@1,1",
        ])
        .unwrap();
        match args.command {
            Command::Generate(batch) => {
                assert_eq!(batch.mode, CUSTOM_MODE);
                assert_eq!(batch.slide, Some(2));
                assert_eq!(batch.entries.images, vec!["a.png@1,1"]);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
