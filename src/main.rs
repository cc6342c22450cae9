//! CLI tool to format pipeline queries and migrate deprecated syntax.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use lsp_types::{DiagnosticSeverity, NumberOrString};
use supersql_tools::{
    Error, FormatOptions, apply_edits, fix_all_edits, format, rules, scan_migrations, tokenize,
};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "spq", bin_name = "spq", version)]
#[command(about = "Format pipeline queries and migrate deprecated syntax")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Format query files and print them to stdout
    #[command(after_help = r"EXAMPLES:
  spq fmt query.spq
  spq fmt --check --indent 4 *.spq
  spq fmt --config editor.json query.spq")]
    Fmt {
        /// Report unformatted files instead of printing
        #[arg(long)]
        check: bool,

        /// Spaces per indentation level
        #[arg(long, value_name = "N")]
        indent: Option<usize>,

        /// Indent with tabs
        #[arg(long)]
        tabs: bool,

        /// JSON file with formatter options
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Report deprecated syntax
    Lint {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Apply every available migration fix
    Fix {
        /// Write fixed files in place instead of printing
        #[arg(long)]
        write: bool,

        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// List the migration rules
    Rules,

    /// Dump the token stream of a file
    Tokens { file: PathBuf },
}

fn main() -> ExitCode {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("warning: logging disabled: {e}");
    }

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Fmt {
            check,
            indent,
            tabs,
            config,
            files,
        } => format_options(config.as_deref(), indent, tabs).map(|options| {
            for_each_file(&files, |path, content| fmt(path, content, &options, check))
        }),
        Command::Lint { files } => Ok(for_each_file(&files, lint)),
        Command::Fix { write, files } => {
            let ok = for_each_file(&files, |path, content| fix(path, content, write));
            Ok(ok)
        }
        Command::Rules => {
            print_rules();
            Ok(true)
        }
        Command::Tokens { file } => read(&file).map(|content| {
            print_tokens(&content);
            true
        }),
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn read(path: &Path) -> Result<String, Error> {
    fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn format_options(
    config: Option<&Path>,
    indent: Option<usize>,
    tabs: bool,
) -> Result<FormatOptions, Error> {
    let mut options = match config {
        Some(path) => FormatOptions::from_json(&read(path)?)?,
        None => FormatOptions::default(),
    };
    if let Some(width) = indent {
        options = options.with_indent_width(width);
    }
    if tabs {
        options = options.with_tabs();
    }
    Ok(options)
}

/// Run `command` over every file. Returns `false` if any file failed to
/// read or the command reported a problem with it.
fn for_each_file(
    files: &[PathBuf],
    mut command: impl FnMut(&Path, &str) -> Result<bool, Error>,
) -> bool {
    let mut ok = true;
    for path in files {
        let outcome = read(path).and_then(|content| command(path, &content));
        match outcome {
            Ok(clean) => ok &= clean,
            Err(e) => {
                eprintln!("{e}");
                ok = false;
            }
        }
    }
    ok
}

#[allow(clippy::unnecessary_wraps)]
fn fmt(
    path: &Path,
    content: &str,
    options: &FormatOptions,
    check: bool,
) -> Result<bool, Error> {
    let formatted = format(content, options);
    if !check {
        print!("{formatted}");
        return Ok(true);
    }
    if formatted == content {
        eprintln!("{}: formatted", path.display());
        Ok(true)
    } else {
        eprintln!("{}: not formatted", path.display());
        Ok(false)
    }
}

#[allow(clippy::unnecessary_wraps)]
fn lint(path: &Path, content: &str) -> Result<bool, Error> {
    let found = scan_migrations(content);
    for finding in &found {
        let diagnostic = &finding.diagnostic;
        let severity = if diagnostic.severity == Some(DiagnosticSeverity::ERROR) {
            "error"
        } else {
            "warning"
        };
        let code = match &diagnostic.code {
            Some(NumberOrString::String(code)) => code.clone(),
            Some(NumberOrString::Number(code)) => code.to_string(),
            None => String::new(),
        };
        println!(
            "{}:{}:{}: {severity}[{code}]: {}",
            path.display(),
            diagnostic.range.start.line + 1,
            diagnostic.range.start.character + 1,
            diagnostic.message
        );
    }
    Ok(found.is_empty())
}

fn fix(path: &Path, content: &str, write: bool) -> Result<bool, Error> {
    let edits = fix_all_edits(content);
    let fixed = apply_edits(content, &edits)?;
    let remaining = scan_migrations(&fixed).len();

    if write {
        if fixed != content {
            fs::write(path, &fixed).map_err(|source| Error::Io {
                path: path.to_path_buf(),
                source,
            })?;
        }
        eprintln!(
            "{}: applied {} fix(es), {remaining} finding(s) remain",
            path.display(),
            edits.len()
        );
    } else {
        print!("{fixed}");
    }
    Ok(true)
}

fn print_rules() {
    for rule in rules() {
        let after = rule.after.unwrap_or("(removed)");
        println!("{:<28} {} -> {}", rule.code, rule.before, after);
    }
}

fn print_tokens(content: &str) {
    for token in tokenize(content) {
        println!(
            "{}:{} {:?} {:?}",
            token.span.line + 1,
            token.span.column + 1,
            token.kind,
            token.text
        );
    }
}
