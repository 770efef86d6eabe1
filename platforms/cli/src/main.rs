use clap::Parser;
use dfanim::types::{DEFAULT_CANVAS_HEIGHT, DEFAULT_CANVAS_WIDTH};
use dfanim::{
    Automaton, Descriptor, DescriptorLoader, ExampleLibrary, Halt, Recorder, Step, SvgSurface,
    Theme,
};
use log::info;
use std::error::Error;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::{fs, process};

/// Steps a DFA through an input string and renders its diagram.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
#[clap(after_help = "EXAMPLES:
  dfanim --example 2 --input 110 --debug
  dfanim --automaton parity.json --input 1011 --svg parity.svg
  dfanim --example 1 --input abab --frames frames/
  cat parity.json | dfanim --input 11 --commands")]
struct Cli {
    /// Automaton descriptor file (JSON). Can also be piped via stdin.
    #[clap(short, long)]
    automaton: Option<PathBuf>,

    /// Index of a built-in example. Without it, piped stdin or example 0 is used.
    #[clap(short, long)]
    example: Option<usize>,

    /// List the built-in examples and exit
    #[clap(short, long)]
    list: bool,

    /// The input string to run
    #[clap(short, long, default_value = "")]
    input: String,

    /// Print each step of the execution
    #[clap(short = 'd', long)]
    debug: bool,

    /// Write the final diagram to an SVG file
    #[clap(long)]
    svg: Option<PathBuf>,

    /// Write one SVG per step of the run into this directory
    #[clap(long)]
    frames: Option<PathBuf>,

    /// Print the final diagram as JSON draw commands
    #[clap(long)]
    commands: bool,

    /// Surface width used for rendering
    #[clap(long, default_value_t = DEFAULT_CANVAS_WIDTH)]
    width: f64,

    /// Surface height used for rendering
    #[clap(long, default_value_t = DEFAULT_CANVAS_HEIGHT)]
    height: f64,

    /// JSON file overriding the default colours
    #[clap(long)]
    theme: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    if cli.list {
        list_examples();
        return Ok(());
    }

    let descriptor = match load_descriptor(&cli) {
        Ok(descriptor) => descriptor,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };
    let theme = match &cli.theme {
        Some(path) => serde_json::from_str::<Theme>(&fs::read_to_string(path)?)?,
        None => Theme::default(),
    };

    let mut automaton = Automaton::new(descriptor);
    if let Some(language) = automaton.language() {
        println!("language: {}", language);
    }

    let status = if automaton.is_valid() {
        simulate(&mut automaton, &cli)
    } else {
        eprintln!("invalid dfa");
        for problem in automaton.diagnostics() {
            eprintln!("  {}", problem);
        }
        2
    };

    if let (Some(dir), 0) = (&cli.frames, status) {
        write_frames(&mut automaton, dir, &cli, &theme)?;
    }

    if let Some(path) = &cli.svg {
        let mut surface = SvgSurface::new(cli.width, cli.height);
        automaton.draw_with(&mut surface, &theme);
        fs::write(path, surface.finish())?;
        info!("Wrote {}", path.display());
    }

    if cli.commands {
        let mut recorder = Recorder::new(cli.width, cli.height);
        automaton.draw_with(&mut recorder, &theme);
        println!("{}", serde_json::to_string_pretty(recorder.commands())?);
    }

    if status != 0 {
        process::exit(status);
    }

    Ok(())
}

/// Where the descriptor comes from.
#[derive(Debug, PartialEq)]
enum Source<'a> {
    File(&'a Path),
    Example(usize),
    Stdin,
}

/// Picks the descriptor source: a file or an explicit example first, then
/// piped stdin, and finally the first built-in example.
fn descriptor_source(cli: &Cli, stdin_piped: bool) -> Source<'_> {
    match (&cli.automaton, cli.example) {
        (Some(path), _) => Source::File(path),
        (None, Some(index)) => Source::Example(index),
        (None, None) if stdin_piped => Source::Stdin,
        (None, None) => Source::Example(0),
    }
}

fn load_descriptor(cli: &Cli) -> Result<Descriptor, String> {
    match descriptor_source(cli, atty::isnt(atty::Stream::Stdin)) {
        Source::File(path) => DescriptorLoader::load_descriptor(path).map_err(|e| e.to_string()),
        Source::Example(index) => ExampleLibrary::get_by_index(index).map_err(|e| e.to_string()),
        Source::Stdin => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .map_err(|e| format!("Failed to read from stdin: {}", e))?;
            DescriptorLoader::load_descriptor_from_string(&buffer).map_err(|e| e.to_string())
        }
    }
}

/// Replays the run from the start and writes `frame-000.svg`, `frame-001.svg`, ...
/// into `dir`: the initial state, then one frame per step.
fn write_frames(
    automaton: &mut Automaton,
    dir: &Path,
    cli: &Cli,
    theme: &Theme,
) -> Result<(), Box<dyn Error>> {
    automaton.reset();
    let frames = automaton.animate(|| SvgSurface::new(cli.width, cli.height), theme)?;

    fs::create_dir_all(dir)?;
    for (index, frame) in frames.iter().enumerate() {
        fs::write(dir.join(format!("frame-{:03}.svg", index)), frame.finish())?;
    }

    info!("Wrote {} frames to {}", frames.len(), dir.display());
    Ok(())
}

fn list_examples() {
    for index in 0..ExampleLibrary::count() {
        if let Ok(info) = ExampleLibrary::info(index) {
            println!(
                "{:>2}  {}{}",
                info.index,
                info.language,
                if info.valid { "" } else { "  (invalid)" }
            );
        }
    }
}

/// Runs the input string and returns the process exit status.
fn simulate(automaton: &mut Automaton, cli: &Cli) -> i32 {
    if let Err(e) = automaton.enter_string(&cli.input) {
        eprintln!("invalid string: {}", e);
        return 1;
    }

    let print_state = |automaton: &Automaton| {
        let (before, current, after) = automaton.input_window();
        let input = if automaton.input_string().is_empty() {
            "ε".to_string()
        } else if current.is_empty() {
            before
        } else {
            format!("{}[{}]{}", before, current, after)
        };

        println!(
            "Step: {}, State: {}, Input: {}, Accepts: {}",
            automaton.input_index().unwrap_or(0),
            automaton.current_state(),
            input,
            automaton.accepts()
        );
    };

    if cli.debug {
        print_state(automaton);
    }

    loop {
        let step = automaton.step();
        if cli.debug {
            print_state(automaton);
        }

        match step {
            Step::Continue => continue,
            Step::Halt(Halt::Accept) | Step::Halt(Halt::Reject) => break,
            Step::Halt(Halt::Err(e)) => {
                eprintln!("Automaton error: {}", e);
                return 1;
            }
        }
    }

    println!("accepts: {}", automaton.accepts());
    0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_example_wins_over_piped_stdin() {
        let cli = Cli::parse_from(["dfanim", "--example", "2", "--input", "110"]);

        assert_eq!(descriptor_source(&cli, true), Source::Example(2));
        assert_eq!(descriptor_source(&cli, false), Source::Example(2));
    }

    #[test]
    fn test_descriptor_source_order() {
        let cli = Cli::parse_from(["dfanim", "--automaton", "dfa.json", "--example", "1"]);
        assert_eq!(descriptor_source(&cli, true), Source::File(Path::new("dfa.json")));

        let cli = Cli::parse_from(["dfanim"]);
        assert_eq!(descriptor_source(&cli, true), Source::Stdin);
        assert_eq!(descriptor_source(&cli, false), Source::Example(0));
    }
}
