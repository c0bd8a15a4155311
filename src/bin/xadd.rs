//! Thin CLI front-end over `xadd_core`: load, combine, prune, and evaluate
//! diagrams expressed in the textual format, without writing any Rust.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use xadd_core::manager::XaddContext;
use xadd_core::{ApplyOp, UnaryOp};

#[derive(Parser)]
#[command(name = "xadd", about = "Inspect and manipulate XADD diagrams from the command line")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Combine two diagrams with a binary operator and print the result.
    Apply {
        op: String,
        lhs_file: PathBuf,
        rhs_file: PathBuf,
    },
    /// Apply a unary operator to a diagram and print the result.
    Unary { op: String, file: PathBuf },
    /// Prune infeasible branches against assumed preconditions.
    ReduceLp {
        file: PathBuf,
        /// Additional linear precondition, e.g. "x + y <= 0"; may repeat.
        #[arg(long = "assume")]
        assume: Vec<String>,
    },
    /// Evaluate a diagram under a full variable assignment.
    Eval {
        file: PathBuf,
        #[arg(long = "bool", value_parser = parse_bool_binding)]
        bool_bindings: Vec<(String, bool)>,
        #[arg(long = "cont", value_parser = parse_cont_binding)]
        cont_bindings: Vec<(String, f64)>,
        /// Fail instead of printing nothing if a binding is missing.
        #[arg(long)]
        strict: bool,
    },
    /// Print a diagram's node count and normalized textual form.
    Print { file: PathBuf },
}

fn parse_bool_binding(s: &str) -> Result<(String, bool), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{s}'"))?;
    let value = value
        .parse::<bool>()
        .map_err(|e| format!("invalid boolean '{value}': {e}"))?;
    Ok((name.to_string(), value))
}

fn parse_cont_binding(s: &str) -> Result<(String, f64), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{s}'"))?;
    let value = value
        .parse::<f64>()
        .map_err(|e| format!("invalid number '{value}': {e}"))?;
    Ok((name.to_string(), value))
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();
    match run(cli.command) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> Result<String, Box<dyn std::error::Error>> {
    let ctx = XaddContext::new();
    match command {
        Command::Apply { op, lhs_file, rhs_file } => {
            let op: ApplyOp = op.parse()?;
            let lhs = load(&ctx, &lhs_file)?;
            let rhs = load(&ctx, &rhs_file)?;
            let result = ctx.apply(lhs, rhs, op)?;
            Ok(ctx.print(result))
        }
        Command::Unary { op, file } => {
            let op: UnaryOp = op.parse()?;
            let id = load(&ctx, &file)?;
            let result = ctx.unary(id, &op)?;
            Ok(ctx.print(result))
        }
        Command::ReduceLp { file, assume } => {
            let id = load(&ctx, &file)?;
            let preconditions = assume
                .iter()
                .map(|text| parse_precondition(text))
                .collect::<Result<Vec<_>, _>>()?;
            let result = ctx.reduce_lp_default(id, &preconditions);
            Ok(ctx.print(result))
        }
        Command::Eval {
            file,
            bool_bindings,
            cont_bindings,
            strict,
        } => {
            let id = load(&ctx, &file)?;
            let bool_assign: BTreeMap<String, bool> = bool_bindings.into_iter().collect();
            let cont_assign: BTreeMap<String, f64> = cont_bindings.into_iter().collect();
            match ctx.evaluate(id, &bool_assign, &cont_assign, strict)? {
                Some(v) => Ok(v.to_string()),
                None => Ok("<partial: missing bindings>".to_string()),
            }
        }
        Command::Print { file } => {
            let id = load(&ctx, &file)?;
            Ok(format!("{} nodes\n{}", ctx.node_count(), ctx.print(id)))
        }
    }
}

fn load(ctx: &XaddContext, path: &PathBuf) -> Result<xadd_core::NodeId, Box<dyn std::error::Error>> {
    let text = fs::read_to_string(path)?;
    Ok(ctx.parse(text.trim())?)
}

/// Parse a CLI precondition string of the form "lhs <= rhs" (or any of the
/// relation operators the textual grammar accepts) into its linear form.
fn parse_precondition(text: &str) -> Result<xadd_core::expr::LinearForm, Box<dyn std::error::Error>> {
    // Reuse the same ad hoc split the textual importer uses for decisions,
    // then fold the inequality into "lhs - rhs <= 0" form directly.
    for (symbol, flip) in [("<=", false), ("<", false), (">=", true), (">", true)] {
        if let Some(at) = text.find(symbol) {
            let lhs: xadd_core::Expr = text[..at].trim().parse()?;
            let rhs: xadd_core::Expr = text[at + symbol.len()..].trim().parse()?;
            let diff = if flip { rhs.sub(&lhs) } else { lhs.sub(&rhs) };
            return diff
                .linear_form()
                .ok_or_else(|| format!("precondition '{text}' is not linear").into());
        }
    }
    Err(format!("precondition '{text}' has no recognised relation operator").into())
}
