//! domwalk - navigate an HTML document from a starting element

use std::io::Read;
use std::process::ExitCode;

use clap::Parser;
use log::{LevelFilter, debug};
use serde::Serialize;

use domwalk::{ElementRef, Error, Path, Selector, parse_html};

#[derive(Parser)]
#[command(name = "domwalk")]
#[command(version, about = "Navigate an HTML document from a starting element", long_about = None)]
#[command(after_help = "PATH STEPS:
    parent, first, last, next, prev, closest(<selector>)

EXAMPLES:
    domwalk page.html -s '.card.featured' -p parent
    domwalk page.html -s '.tasks .task' -p 'next/next'
    domwalk page.html -s button -p 'closest(.card)' --children --json")]
struct Cli {
    /// Input HTML file, or `-` for stdin
    #[arg(value_name = "INPUT")]
    input: String,

    /// Selector for the starting element (first match in document order)
    #[arg(short, long, value_name = "SELECTOR")]
    start: String,

    /// Navigation path applied from the starting element
    #[arg(short, long, value_name = "PATH")]
    path: Option<String>,

    /// Print the element children of the result instead of the result
    #[arg(short, long)]
    children: bool,

    /// Emit JSON
    #[arg(long)]
    json: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

/// Printable summary of one element.
#[derive(Serialize)]
struct ElementInfo {
    tag: String,
    id: Option<String>,
    classes: Vec<String>,
    index: usize,
}

impl From<ElementRef<'_>> for ElementInfo {
    fn from(el: ElementRef<'_>) -> Self {
        Self {
            tag: el.local_name().to_string(),
            id: el.element_id().map(str::to_string),
            classes: el.classes().to_vec(),
            index: el.index(),
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(cli: &Cli) {
    let level = if cli.quiet {
        LevelFilter::Error
    } else {
        match cli.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn run(cli: &Cli) -> Result<(), Error> {
    let start = Selector::parse(&cli.start)?;
    let path = cli.path.as_deref().map(Path::parse).transpose()?;

    let html = read_input(&cli.input)?;
    let dom = parse_html(&html);

    let origin = start
        .first_match(&dom)
        .ok_or_else(|| Error::NoMatch(start.to_string()))?;
    debug!("starting at {origin}");

    let target = match &path {
        Some(path) => path.apply(origin),
        None => Some(origin),
    };

    let output =
        render(target, cli.children, cli.json).map_err(|e| Error::Io(std::io::Error::from(e)))?;
    println!("{output}");
    Ok(())
}

fn read_input(input: &str) -> Result<String, Error> {
    if input == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        Ok(std::fs::read_to_string(input)?)
    }
}

fn render(
    target: Option<ElementRef<'_>>,
    children: bool,
    json: bool,
) -> serde_json::Result<String> {
    let Some(target) = target else {
        return Ok("null".to_string());
    };

    if children {
        let kids: Vec<ElementRef<'_>> = target.children().into_iter().collect();
        if json {
            let infos: Vec<ElementInfo> = kids.into_iter().map(ElementInfo::from).collect();
            return serde_json::to_string_pretty(&infos);
        }
        let lines: Vec<String> = kids.iter().map(ToString::to_string).collect();
        return Ok(lines.join("\n"));
    }

    if json {
        serde_json::to_string_pretty(&ElementInfo::from(target))
    } else {
        Ok(target.to_string())
    }
}
