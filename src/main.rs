use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::{generate, Shell};
use std::io;
use std::path::PathBuf;
use subchk::cli::output::OutputFormat;
use subchk::{checker, cli, rules, Config};

#[derive(Parser, Debug)]
#[command(name = "subchk")]
#[command(version, about = "A rule-driven proofreading CLI for subtitles and transcripts", long_about = None)]
struct Cli {
    /// Files to check
    #[arg(value_name = "FILES")]
    files: Vec<PathBuf>,

    /// Apply corrections in place
    #[arg(short, long)]
    fix: bool,

    /// Confirm each correction interactively
    #[arg(short, long, requires = "fix")]
    interactive: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Exit with code 0 even if flagged terms are found
    #[arg(long)]
    no_fail: bool,

    /// Rule document to check against
    #[arg(short, long)]
    rules: Option<PathBuf>,

    /// Personal rules file, merged over the rule document
    #[arg(long)]
    personal_rules: Option<PathBuf>,

    /// Rule key pattern to ignore (regex)
    #[arg(long)]
    ignore_key: Vec<String>,

    /// Output format (text, json)
    #[arg(short = 'o', long, default_value = "text")]
    format: OutputFormat,

    /// Generate shell completion script
    #[arg(long, value_name = "SHELL")]
    completion: Option<Shell>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Parser, Debug)]
enum Commands {
    /// Rule document management
    Rules {
        #[command(subcommand)]
        action: RulesCommands,
    },
}

#[derive(Parser, Debug)]
enum RulesCommands {
    /// Fetch a rule document from a URL or Google Doc id
    Fetch {
        /// URL or Google Doc id
        source: String,
        /// Name to install the document under
        #[arg(long, default_value = "default")]
        name: String,
        /// Save to the data directory instead of printing
        #[arg(long)]
        save: bool,
    },
    /// List installed rule documents
    List,
    /// Re-fetch every installed rule document
    Update,
    /// Show rule document info
    Info {
        /// Document name
        name: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Handle shell completion generation
    if let Some(shell) = cli.completion {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "subchk", &mut io::stdout());
        return Ok(());
    }

    // Handle subcommands
    if let Some(command) = cli.command {
        return handle_command(command);
    }

    // Load configuration
    let config = Config::load(
        cli.rules.clone(),
        cli.personal_rules.clone(),
        cli.ignore_key.clone(),
    )?;

    // Validate input files
    if cli.files.is_empty() {
        anyhow::bail!("No files specified. Use --help for usage information.");
    }

    // Initialize checker
    let checker = checker::Proofreader::new(&config)?;

    // Process files
    let mut total_flagged = 0;
    let mut total_fixed = 0;

    for file_path in &cli.files {
        if !file_path.exists() {
            eprintln!("Error: File not found: {}", file_path.display());
            continue;
        }

        let result = if cli.fix {
            if cli.interactive {
                checker.fix_interactive(file_path, &config, !cli.no_color)?
            } else {
                checker.fix_auto(file_path)?
            }
        } else {
            checker.check(file_path, !cli.no_color, &cli.format)?
        };

        total_flagged += result.flagged_count;
        total_fixed += result.fixed_count;
    }

    // Print summary
    if cli.fix {
        cli::output::print_fix_summary(total_fixed, &cli.files, !cli.no_color);
    } else {
        cli::output::print_check_summary(total_flagged, &cli.files, !cli.no_color);
    }

    // Exit with appropriate code
    if total_flagged > 0 && !cli.no_fail && !cli.fix {
        std::process::exit(1);
    }

    Ok(())
}

fn handle_command(command: Commands) -> Result<()> {
    match command {
        Commands::Rules { action } => match action {
            RulesCommands::Fetch { source, name, save } => {
                rules::remote::fetch(&source, &name, save)?;
            }
            RulesCommands::List => {
                rules::remote::list()?;
            }
            RulesCommands::Update => {
                rules::remote::update()?;
            }
            RulesCommands::Info { name } => {
                rules::remote::show_info(&name)?;
            }
        },
    }
    Ok(())
}
