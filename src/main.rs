use clap::Parser;
use std::io::Read;

use loom::interp::host::InMemoryHost;
use loom::{EngineLimits, Interpreter};

#[derive(Parser)]
#[command(name = "loomsh")]
#[command(about = "Run scripts against the loom command-language engine")]
#[command(version)]
struct Cli {
    /// Execute the script from command line argument
    #[arg(short = 'c')]
    script: Option<String>,

    /// Output the completion code and result as JSON
    #[arg(long = "json")]
    json: bool,

    /// Script file to execute
    #[arg()]
    script_file: Option<String>,
}

fn main() {
    let cli = Cli::parse();

    let script = if let Some(s) = cli.script {
        s
    } else if let Some(ref file) = cli.script_file {
        match std::fs::read_to_string(file) {
            Ok(content) => content,
            Err(e) => {
                eprintln!("Error: cannot read script file: {file}: {e}");
                std::process::exit(1);
            }
        }
    } else {
        use std::io::IsTerminal;
        if std::io::stdin().is_terminal() {
            eprintln!("Error: no script provided. Use -c 'script', a script file, or pipe via stdin.");
            std::process::exit(1);
        }
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf).unwrap_or_default();
        buf
    };

    let mut interp = Interpreter::new(Box::new(InMemoryHost::new()), EngineLimits::default());
    let (code, value) = interp.eval(&script);

    if cli.json {
        println!(
            "{}",
            serde_json::json!({
                "completionCode": code.as_i32(),
                "result": value.as_str().to_string(),
            })
        );
    } else if code == loom::CompletionCode::Error {
        eprintln!("{}", value.as_str());
    } else {
        println!("{}", value.as_str());
    }

    std::process::exit(if code == loom::CompletionCode::Error { 1 } else { 0 });
}
