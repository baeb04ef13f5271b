use anyhow::{bail, Context, Result};
use clap::Parser;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use myt::utils::{read_sql_script, write_sql_file, SqlValidator};
use myt::{RuleTable, TransformationConfig, Translation, Translator};

#[derive(Parser)]
#[command(name = "myt")]
#[command(about = "MySQL to SQLite Transpiler")]
#[command(version = "0.1.0")]
struct Cli {
    /// Input files; `-` or nothing reads standard input
    inputs: Vec<PathBuf>,

    /// Write the translation here instead of standard output
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// TOML configuration file (defaults come from MYT_* variables)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the rewritten statements without layout
    #[arg(long)]
    no_format: bool,

    /// Parse the output as SQLite and report syntax errors
    #[arg(long)]
    validate: bool,

    /// Emit translation, diagnostics and applied rules as JSON
    #[cfg(feature = "json_output")]
    #[arg(long)]
    json: bool,

    /// Read statements interactively
    #[arg(short, long)]
    interactive: bool,

    /// Print the rule table in application order and exit
    #[arg(long)]
    list_rules: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(long)]
    quiet: bool,
}

fn main() {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.quiet);

    if let Err(e) = run(&cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool, quiet: bool) {
    if quiet {
        return;
    }

    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::new().filter_level(level).init();
}

fn load_config(cli: &Cli) -> Result<TransformationConfig> {
    let mut config = match &cli.config {
        Some(path) => TransformationConfig::from_file(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => TransformationConfig::from_env(),
    };
    if cli.no_format {
        config.formatting.enabled = false;
    }
    Ok(config)
}

fn run(cli: &Cli) -> Result<()> {
    if cli.list_rules {
        list_rules();
        return Ok(());
    }

    let translator = Translator::new(load_config(cli)?)?;

    if cli.interactive {
        return interactive_command(&translator, cli.quiet);
    }

    let script = read_inputs(&cli.inputs)?;
    let translation = translator.translate_script(&script);

    if !cli.quiet {
        for diagnostic in &translation.diagnostics {
            log::warn!("{}", diagnostic);
        }
    }

    let rendered = render(cli, &translation)?;
    match &cli.output {
        Some(path) => write_sql_file(path, &rendered)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => println!("{}", rendered),
    }

    if cli.validate {
        validate_output(&translation.sql)?;
    }

    Ok(())
}

fn list_rules() {
    for rule in RuleTable::standard().rules() {
        println!("{:<28} {:<12} {}", rule.name, format!("{:?}", rule.group), rule.description);
    }
}

fn read_inputs(inputs: &[PathBuf]) -> Result<String> {
    let stdin_only = inputs.is_empty() || inputs.iter().all(|p| p.as_os_str() == "-");
    if stdin_only {
        let mut script = String::new();
        io::stdin()
            .read_to_string(&mut script)
            .context("failed to read standard input")?;
        return Ok(script);
    }

    if inputs.iter().any(|p| p.as_os_str() == "-") {
        bail!("`-` cannot be combined with input files");
    }
    Ok(read_sql_script(inputs)?)
}

#[cfg(feature = "json_output")]
fn render(cli: &Cli, translation: &Translation) -> Result<String> {
    if cli.json {
        return Ok(translation.to_json()?);
    }
    Ok(translation.sql.clone())
}

#[cfg(not(feature = "json_output"))]
fn render(_cli: &Cli, translation: &Translation) -> Result<String> {
    Ok(translation.sql.clone())
}

fn validate_output(sql: &str) -> Result<()> {
    let result = SqlValidator::new().validate_target_syntax(sql);
    for warning in &result.warnings {
        log::warn!("{}", warning);
    }
    if !result.is_valid {
        for error in &result.errors {
            eprintln!("{}", error);
        }
        bail!("translated output is not valid SQLite syntax");
    }
    Ok(())
}

fn interactive_command(translator: &Translator, quiet: bool) -> Result<()> {
    if !quiet {
        println!("MySQL to SQLite - Interactive Mode");
        println!("Enter SQL, press Enter twice (Ctrl+D to exit)");
        println!();
    }

    loop {
        print!("mysql> ");
        io::stdout().flush()?;

        let mut input = String::new();
        let mut line = String::new();

        // Read input until empty line
        loop {
            line.clear();
            match io::stdin().read_line(&mut line) {
                Ok(0) => return Ok(()), // EOF
                Ok(_) => {
                    if line.trim().is_empty() && !input.trim().is_empty() {
                        break;
                    }
                    input.push_str(&line);
                }
                Err(e) => {
                    eprintln!("Error reading input: {}", e);
                    continue;
                }
            }
        }

        if input.trim().is_empty() {
            continue;
        }

        let translation = translator.translate_script(&input);
        println!("SQLITE:");
        println!("{}", translation.sql);
        for diagnostic in &translation.diagnostics {
            println!("  {}", diagnostic);
        }
        println!();
    }
}
