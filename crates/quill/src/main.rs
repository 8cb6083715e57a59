use clap::Parser;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use quill_core::Error;
use quill_eval::Interpreter;

#[derive(Parser)]
#[command(name = "quill", about = "Quill: an interpreter for a small Scheme dialect", version)]
struct Cli {
    /// Source file to run non-interactively
    file: Option<String>,

    /// Evaluate an expression and print the result
    #[arg(short, long)]
    eval: Option<String>,

    /// Load file(s) before entering the REPL or running FILE
    #[arg(short, long = "load", action = clap::ArgAction::Append)]
    load: Vec<String>,

    /// Suppress the REPL banner
    #[arg(short, long)]
    quiet: bool,
}

fn main() {
    let cli = Cli::parse();
    let interpreter = Interpreter::new();

    for path in &cli.load {
        run_file(&interpreter, path);
    }

    if let Some(expr) = &cli.eval {
        match interpreter.eval_str(expr) {
            Ok(val) => println!("{val}"),
            Err(e) => exit_with(e),
        }
        return;
    }

    if let Some(file) = &cli.file {
        run_file(&interpreter, file);
        return;
    }

    repl(interpreter, cli.quiet);
}

/// Terminate with the error's classwise status; `exit` carries its own.
fn exit_with(e: Error) -> ! {
    if !matches!(e, Error::Exit(_)) {
        eprintln!("{e}");
    }
    std::process::exit(e.exit_code());
}

fn run_file(interpreter: &Interpreter, path: &str) {
    let file = match std::fs::File::open(path) {
        Ok(f) => f,
        Err(_) => exit_with(Error::interpreter(format!("Open file \"{path}\" failed"))),
    };
    let mut reader = quill_reader::Reader::new(std::io::BufReader::new(file));

    // Read every top-level form first: a syntax error terminates before
    // anything is evaluated.
    let mut forms = Vec::new();
    loop {
        match reader.read() {
            Ok(Some(form)) => forms.push(form),
            Ok(None) => break,
            Err(e) => exit_with(e),
        }
    }
    for form in &forms {
        if let Err(e) = interpreter.eval(form) {
            exit_with(e);
        }
    }
}

fn repl(interpreter: Interpreter, quiet: bool) {
    let mut rl = DefaultEditor::new().expect("failed to create editor");
    let history_path = history_dir().join("history.txt");
    let _ = rl.load_history(&history_path);

    if !quiet {
        println!("Quill v{} — a small Scheme dialect", env!("CARGO_PKG_VERSION"));
        println!("Press Ctrl-D to exit\n");
    }

    let mut buffer = String::new();
    let mut in_multiline = false;

    loop {
        let prompt = if in_multiline { "... " } else { ">>> " };
        match rl.readline(prompt) {
            Ok(line) => {
                if in_multiline {
                    buffer.push('\n');
                    buffer.push_str(&line);
                } else {
                    buffer = line;
                }

                if !is_balanced(&buffer) {
                    in_multiline = true;
                    continue;
                }
                in_multiline = false;
                let input = std::mem::take(&mut buffer);
                if input.trim().is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(input.trim());

                match interpreter.eval_str_all(&input) {
                    Ok(results) => {
                        for value in results {
                            println!("{value}");
                        }
                    }
                    Err(e @ Error::Exit(_)) => {
                        save_history(&mut rl, &history_path);
                        exit_with(e);
                    }
                    // Report, drop pending input, keep going.
                    Err(e) => eprintln!("{e}"),
                }
            }
            Err(ReadlineError::Interrupted) => {
                buffer.clear();
                in_multiline = false;
                println!("^C");
            }
            Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("Error: {e}");
                break;
            }
        }
    }

    save_history(&mut rl, &history_path);
}

fn save_history(rl: &mut DefaultEditor, path: &std::path::Path) {
    let _ = std::fs::create_dir_all(history_dir());
    let _ = rl.save_history(path);
}

fn history_dir() -> std::path::PathBuf {
    std::env::var("HOME")
        .map(std::path::PathBuf::from)
        .unwrap_or_else(|_| std::path::PathBuf::from("."))
        .join(".quill")
}

/// Whether every paren is closed (outside string literals), so the REPL
/// knows when to stop asking for continuation lines.
fn is_balanced(input: &str) -> bool {
    let mut depth = 0i32;
    let mut in_string = false;
    let mut escape = false;
    let mut in_comment = false;
    for ch in input.chars() {
        if in_comment {
            if ch == '\n' {
                in_comment = false;
            }
            continue;
        }
        if escape {
            escape = false;
            continue;
        }
        if in_string {
            match ch {
                '\\' => escape = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            ';' => in_comment = true,
            '(' => depth += 1,
            ')' => depth -= 1,
            _ => {}
        }
    }
    depth <= 0 && !in_string
}
