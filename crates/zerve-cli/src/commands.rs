use anyhow::Context;
use chrono::{DateTime, Utc};
use colored::Colorize;
use serde_json::{json, Value};
use zerve_core::{store_reducers, CoreConfig, CoreData, HandlerRegistry, LogEntry, Timestamp};

use crate::cli::*;

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = CoreConfig::load(cli.config.as_deref())?.with_data_dir(cli.data_dir.clone());
    let core = CoreData::open(config, store_reducers(), HandlerRegistry::new())
        .await
        .context("opening data directory")?;
    let format = cli.format;

    match cli.command {
        Command::Init => cmd_init(&core, format),
        Command::Dispatch(args) => cmd_dispatch(&core, args, format).await,
        Command::Eval(args) => cmd_eval(&core, args, format).await,
        Command::Append(args) => cmd_append(&core, args, format).await,
        Command::Log(args) => cmd_log(&core, args, format).await,
        Command::Blocks => cmd_list(&core, "ListBlocks", format).await,
        Command::Docs => cmd_list(&core, "ListDocs", format).await,
    }
}

fn parse_json(label: &str, text: &str) -> anyhow::Result<Value> {
    serde_json::from_str(text).with_context(|| format!("{label} is not valid JSON: {text}"))
}

fn print_json(value: &Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn render_time(time: Timestamp) -> String {
    i64::try_from(time.as_millis())
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .map(|t| t.format("%Y-%m-%d %H:%M:%S%.3f UTC").to_string())
        .unwrap_or_else(|| format!("{} ms", time.as_millis()))
}

fn cmd_init(core: &CoreData, format: OutputFormat) -> anyhow::Result<()> {
    let layout = core.layout();
    if format == OutputFormat::Json {
        return print_json(&json!({
            "dataDir": layout.root().display().to_string(),
            "blocks": layout.blocks_dir().display().to_string(),
            "docs": layout.docs_dir().display().to_string(),
            "trash": layout.trash_dir().display().to_string(),
        }));
    }
    println!(
        "{} Initialized data directory {}",
        "✓".green().bold(),
        layout.root().display().to_string().bold()
    );
    println!("  blocks: {}", layout.blocks_dir().display());
    println!("  docs:   {}", layout.docs_dir().display());
    println!("  trash:  {}", layout.trash_dir().display());
    Ok(())
}

async fn cmd_dispatch(core: &CoreData, args: DispatchArgs, format: OutputFormat) -> anyhow::Result<()> {
    let payload = parse_json("payload", &args.payload)?;
    let response = core.dispatch(&args.action, payload).await?;
    if format == OutputFormat::Text {
        println!("{} {}", "✓".green().bold(), args.action.cyan());
    }
    print_json(&response)
}

async fn cmd_eval(core: &CoreData, args: EvalArgs, format: OutputFormat) -> anyhow::Result<()> {
    match core.get_eval(&args.path).await? {
        Some(value) => print_json(&value),
        None if format == OutputFormat::Json => print_json(&Value::Null),
        None => {
            println!("{} {}", "no value at".dimmed(), args.path.yellow());
            Ok(())
        }
    }
}

async fn cmd_append(core: &CoreData, args: AppendArgs, format: OutputFormat) -> anyhow::Result<()> {
    let value = parse_json("value", &args.value)?;
    let mut payload = json!({ "name": args.doc, "value": value });
    if let Some(message) = args.message {
        payload["message"] = Value::String(message);
    }
    let response = core.dispatch("AppendChain", payload).await?;
    if format == OutputFormat::Json {
        return print_json(&response);
    }

    let commit = response["commitId"].as_str().unwrap_or_default();
    println!("{} Appended to {}", "✓".green().bold(), args.doc.bold());
    println!("  Commit: {}", commit.yellow());
    match response["on"].as_str() {
        Some(on) => println!("  On:     {}", on.dimmed()),
        None => println!("  On:     {}", "(genesis)".dimmed()),
    }
    Ok(())
}

async fn cmd_log(core: &CoreData, args: LogArgs, format: OutputFormat) -> anyhow::Result<()> {
    let Some(entries) = core.dispatcher().chain_log(&args.doc).await? else {
        anyhow::bail!("doc {:?} does not exist", args.doc);
    };
    let entries: Vec<LogEntry> = entries.into_iter().take(args.limit).collect();

    if format == OutputFormat::Json {
        return print_json(&serde_json::to_value(&entries)?);
    }
    for entry in &entries {
        let action = entry.commit.action_type().unwrap_or("(untyped)");
        println!(
            "{}  {}  {}",
            entry.id.short_hex().yellow().bold(),
            render_time(entry.commit.time).dimmed(),
            action.cyan()
        );
        if let Some(message) = &entry.commit.message {
            println!("    {message}");
        }
    }
    Ok(())
}

async fn cmd_list(core: &CoreData, action: &str, format: OutputFormat) -> anyhow::Result<()> {
    let response = core.dispatch(action, json!({})).await?;
    if format == OutputFormat::Json {
        return print_json(&response);
    }
    let children = response["children"].as_array().cloned().unwrap_or_default();
    if children.is_empty() {
        println!("{}", "(none)".dimmed());
    }
    for child in children {
        println!("{}", child.as_str().unwrap_or_default());
    }
    Ok(())
}
