// dsviz: animated data structure visualizations in the terminal

mod engine;
mod structures;
mod ui;

use std::io;

use crossterm::{
    cursor::Show,
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};

use structures::{ArrayViz, HashChainViz, HeapViz, ListViz, Module, StackViz};
use ui::{App, TermHost};

const STRUCTURES: [(&str, &str); 5] = [
    ("array", "fixed-size array with shifting delete"),
    ("stack", "stack of strings growing upward"),
    ("heap", "max-heap in a growing array"),
    ("list", "singly linked list with head insertion"),
    ("hash", "chaining hash table with prime-sized growth"),
];

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command-line arguments
    let args: Vec<String> = std::env::args().collect();
    let program_name = args.first().map(|s| s.as_str()).unwrap_or("dsviz").to_string();

    let Some(structure) = args.get(1).map(|s| s.as_str()) else {
        eprintln!("Error: No structure name provided");
        eprintln!();
        usage(&program_name);
        std::process::exit(1);
    };

    if !STRUCTURES.iter().any(|(name, _)| *name == structure) {
        eprintln!("Error: Unknown structure '{}'", structure);
        eprintln!();
        usage(&program_name);
        std::process::exit(1);
    }

    // Set up terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    let mut host = TermHost::new(terminal);

    // Create and run the app for the chosen structure
    let res = match structure {
        "array" => {
            let module = ArrayViz::new(&mut host);
            run_app(host, module)
        }
        "stack" => {
            let module = StackViz::new(&mut host);
            run_app(host, module)
        }
        "heap" => {
            let module = HeapViz::new(&mut host);
            run_app(host, module)
        }
        "list" => {
            let module = ListViz::new(&mut host);
            run_app(host, module)
        }
        _ => {
            let module = HashChainViz::new(&mut host);
            run_app(host, module)
        }
    };

    // Restore terminal
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture, Show)?;

    if let Err(err) = res {
        eprintln!("Error: {:?}", err);
    }

    Ok(())
}

fn run_app<M: Module<TermHost>>(host: TermHost, module: M) -> io::Result<()> {
    let mut app = App::new(host, module);
    app.run()
}

fn usage(program_name: &str) {
    eprintln!("Usage: {} <structure>", program_name);
    eprintln!();
    eprintln!("Structures:");
    for (name, blurb) in STRUCTURES {
        eprintln!("  {:<8} {}", name, blurb);
    }
    eprintln!();
    eprintln!("Keys: digits trigger operations, Space pauses, s single-steps,");
    eprintln!("x stops the animation, q quits. Click a value to recall it into");
    eprintln!("the argument slot.");
}
