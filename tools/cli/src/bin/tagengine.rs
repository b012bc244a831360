use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tag_engine::storage;
use tag_engine::upgrade::plans;
use tag_engine::version::TAG_HEADER_CHECKSUM_OFFSET;
use tag_engine::{
    dump, read_tag_auto, registry, upgrade, write_tag_bytes, Engine, ReadOutcome, Tag,
    TagGroupDef, ToolConfig, UpgradePlan, UpgradeReport,
};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

#[derive(Parser)]
#[command(author, version, about = "Read, dump, convert and upgrade game tag files")]
struct Cli {
    /// Config file; defaults to ./tagengine.toml when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Log at info level instead of warn (RUST_LOG overrides).
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the header and read diagnostics of a tag.
    Inspect { tag: PathBuf },
    /// Print the fixed-body layout of a tag group's root struct.
    Layout {
        /// Group code or name, e.g. `scnr` or `scenario`.
        group: String,
        #[arg(long)]
        engine: Option<Engine>,
        #[arg(long)]
        version: Option<u16>,
    },
    /// Render a tag as XML.
    Dump {
        tag: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Check that a tag reads cleanly and rewrites to identical bytes.
    Verify {
        tag: PathBuf,
        #[arg(long, default_value_t = false)]
        strict: bool,
    },
    /// Export a tag graph as JSON.
    Export {
        tag: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Build a tag file from an exported JSON graph.
    Import {
        json: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Upgrade one tag to the next engine generation.
    Upgrade {
        tag: PathBuf,
        /// Plan name; inferred from the tag group when omitted.
        #[arg(long)]
        plan: Option<String>,
        /// Tag already authored for the target engine to take missing fields from.
        #[arg(long)]
        donor: Option<PathBuf>,
        #[arg(short, long)]
        output: PathBuf,
        #[arg(long, default_value_t = false)]
        strict: bool,
    },
    /// Upgrade every matching tag under a directory.
    BatchUpgrade {
        /// Defaults to `tags.root` from the config.
        root: Option<PathBuf>,
        #[arg(long)]
        plan: String,
        #[arg(short, long)]
        output: PathBuf,
        /// Write a YAML report of every file handled.
        #[arg(long)]
        report: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let config = ToolConfig::load_or_default(cli.config.as_deref()).context("load config")?;
    match cli.command {
        Command::Inspect { tag } => inspect(&tag),
        Command::Layout {
            group,
            engine,
            version,
        } => print_layout(&group, engine.unwrap_or(config.tags.engine), version),
        Command::Dump { tag, output } => dump_tag(&config, &tag, output.as_deref()),
        Command::Verify { tag, strict } => verify(&tag, strict || config.upgrade.strict),
        Command::Export { tag, output } => export(&tag, &output),
        Command::Import { json, output } => import(&json, &output),
        Command::Upgrade {
            tag,
            plan,
            donor,
            output,
            strict,
        } => upgrade_one(
            &tag,
            plan.as_deref(),
            donor.as_deref(),
            &output,
            strict || config.upgrade.strict,
        ),
        Command::BatchUpgrade {
            root,
            plan,
            output,
            report,
        } => {
            let root = root.unwrap_or_else(|| config.tags.root.clone());
            batch_upgrade(&config, &root, &plan, &output, report.as_deref())
        }
    }
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read(path: &Path) -> Result<ReadOutcome> {
    storage::read_tag_file_auto(path).with_context(|| format!("read {}", path.display()))
}

fn write_output(path: &Path, contents: impl AsRef<[u8]>) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents).with_context(|| format!("write {}", path.display()))
}

fn inspect(path: &Path) -> Result<()> {
    let outcome = read(path)?;
    let header = &outcome.tag.header;
    println!("group       {} ({})", header.group, outcome.group.name);
    println!("engine      {}", header.engine);
    println!("version     {}", header.version);
    println!("name        {}", header.name);
    println!("data        {} bytes at {}", header.data_length, header.data_offset);
    println!("checksum    {:#010x}", header.checksum);
    println!("warnings    {}", outcome.warnings.len());
    for warning in &outcome.warnings {
        println!("  - {warning}");
    }
    Ok(())
}

fn print_layout(group: &str, engine: Engine, version: Option<u16>) -> Result<()> {
    let def = registry::find(engine, group)
        .ok_or_else(|| anyhow!("no {engine} schema for tag group '{group}'"))?;
    print!("{}", def.root.layout(engine, version.unwrap_or(def.version)));
    Ok(())
}

fn dump_tag(config: &ToolConfig, path: &Path, output: Option<&Path>) -> Result<()> {
    let outcome = read(path)?;
    let xml = dump::render_with(&outcome.tag, outcome.group, config.dump.options())?;
    match output {
        Some(output) => write_output(output, xml),
        None => {
            println!("{xml}");
            Ok(())
        }
    }
}

fn verify(path: &Path, strict: bool) -> Result<()> {
    let mut bytes = fs::read(path).with_context(|| format!("read {}", path.display()))?;
    let outcome = read_tag_auto(&bytes)?;
    let (rewritten, _) = write_tag_bytes(&outcome.tag, outcome.group)?;
    for warning in &outcome.warnings {
        println!("warning: {warning}");
    }
    if outcome.tag.header.checksum == 0 {
        // the writer always fills in the checksum
        let checksum = TAG_HEADER_CHECKSUM_OFFSET..TAG_HEADER_CHECKSUM_OFFSET + 4;
        if let (Some(original), Some(filled)) =
            (bytes.get_mut(checksum.clone()), rewritten.get(checksum))
        {
            original.copy_from_slice(filled);
            println!("note: header checksum was 0, rewrite fills it in");
        }
    }
    if rewritten != bytes {
        let first = rewritten
            .iter()
            .zip(&bytes)
            .position(|(left, right)| left != right)
            .unwrap_or(rewritten.len().min(bytes.len()));
        bail!(
            "{} does not rewrite identically (first difference at byte {first}, {} vs {} bytes)",
            path.display(),
            rewritten.len(),
            bytes.len()
        );
    }
    if strict && !outcome.warnings.is_empty() {
        bail!("{} read with {} warnings", path.display(), outcome.warnings.len());
    }
    println!("{} ok", path.display());
    Ok(())
}

fn export(path: &Path, output: &Path) -> Result<()> {
    let outcome = read(path)?;
    write_output(output, outcome.tag.to_json()?)
}

fn import(path: &Path, output: &Path) -> Result<()> {
    let raw = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let tag = Tag::from_json(&raw).context("parse tag json")?;
    let group = registry::lookup(tag.header.engine, tag.header.group).ok_or_else(|| {
        anyhow!(
            "no {} schema for tag group {}",
            tag.header.engine,
            tag.header.group
        )
    })?;
    let report = storage::write_tag_file(output, &tag, group)?;
    for warning in &report.warnings {
        println!("warning: {warning}");
    }
    println!("wrote {} bytes to {}", report.bytes_written, output.display());
    Ok(())
}

fn resolve_plan(name: Option<&str>, source: &'static TagGroupDef) -> Result<&'static UpgradePlan> {
    match name {
        Some(name) => plans::find(name).ok_or_else(|| anyhow!("unknown upgrade plan '{name}'")),
        None => plans::for_source(source.engine, source.code)
            .next()
            .ok_or_else(|| anyhow!("no upgrade plan for {} {}", source.engine, source.code)),
    }
}

fn read_donor(path: &Path, plan: &UpgradePlan) -> Result<Tag> {
    let outcome = storage::read_tag_file_with_recovery(path, plan.target)
        .with_context(|| format!("read donor {}", path.display()))?;
    Ok(outcome.tag)
}

fn print_report(report: &UpgradeReport) {
    println!(
        "plan '{}': {} copied, {} defaulted, {} dropped, {} donated",
        report.plan,
        report.copied.len(),
        report.defaulted.len(),
        report.dropped.len(),
        report.donated.len()
    );
    for warning in &report.warnings {
        println!("warning: {warning}");
    }
}

fn upgrade_one(
    path: &Path,
    plan: Option<&str>,
    donor: Option<&Path>,
    output: &Path,
    strict: bool,
) -> Result<()> {
    let source = read(path)?;
    let plan = resolve_plan(plan, source.group)?;
    let donor = donor.map(|donor| read_donor(donor, plan)).transpose()?;
    let outcome = upgrade(&source.tag, plan, donor.as_ref())?;
    print_report(&outcome.report);
    if strict && !outcome.report.warnings.is_empty() {
        bail!(
            "upgrade of {} produced {} warnings",
            path.display(),
            outcome.report.warnings.len()
        );
    }
    storage::write_tag_file(output, &outcome.tag, plan.target)?;
    Ok(())
}

#[derive(Debug, Default, Serialize)]
struct BatchReport {
    plan: String,
    upgraded: Vec<BatchEntry>,
    skipped: Vec<String>,
    failed: Vec<BatchFailure>,
}

#[derive(Debug, Serialize)]
struct BatchEntry {
    path: String,
    donor: Option<String>,
    report: UpgradeReport,
}

#[derive(Debug, Serialize)]
struct BatchFailure {
    path: String,
    error: String,
}

fn batch_upgrade(
    config: &ToolConfig,
    root: &Path,
    plan_name: &str,
    output: &Path,
    report_path: Option<&Path>,
) -> Result<()> {
    let plan = plans::find(plan_name).ok_or_else(|| anyhow!("unknown upgrade plan '{plan_name}'"))?;
    let mut batch = BatchReport {
        plan: plan.name.to_string(),
        ..BatchReport::default()
    };

    fs::create_dir_all(output).with_context(|| format!("create {}", output.display()))?;
    let output_dir = output
        .canonicalize()
        .with_context(|| format!("resolve {}", output.display()))?;
    // Upgraded files must not be picked up again when the output sits under the root.
    let walker = WalkDir::new(root).into_iter().filter_entry(|entry| {
        !(entry.file_type().is_dir()
            && entry
                .path()
                .canonicalize()
                .is_ok_and(|dir| dir.starts_with(&output_dir)))
    });
    for entry in walker.filter_map(Result::ok) {
        let path = entry.path();
        if path.is_dir() || storage::is_sidecar(path) {
            continue;
        }
        let relative = path.strip_prefix(root).unwrap_or(path);
        let label = relative.to_string_lossy().replace('\\', "/");
        match upgrade_entry(config, plan, path, relative, output) {
            Ok(Some(entry)) => batch.upgraded.push(BatchEntry {
                path: label,
                ..entry
            }),
            Ok(None) => batch.skipped.push(label),
            Err(err) => {
                tracing::warn!(path = %label, "upgrade failed: {err:#}");
                batch.failed.push(BatchFailure {
                    path: label,
                    error: format!("{err:#}"),
                });
            }
        }
    }

    println!(
        "plan '{}': {} upgraded, {} skipped, {} failed",
        batch.plan,
        batch.upgraded.len(),
        batch.skipped.len(),
        batch.failed.len()
    );
    if let Some(report_path) = report_path {
        write_output(report_path, serde_yaml::to_string(&batch)?)?;
    }
    let strict_failures = config.upgrade.strict
        && batch
            .upgraded
            .iter()
            .any(|entry| !entry.report.warnings.is_empty());
    if !batch.failed.is_empty() || strict_failures {
        bail!("batch upgrade finished with problems");
    }
    Ok(())
}

/// Upgrades one file; `None` when it is not a tag of the plan's source group.
fn upgrade_entry(
    config: &ToolConfig,
    plan: &'static UpgradePlan,
    path: &Path,
    relative: &Path,
    output: &Path,
) -> Result<Option<BatchEntry>> {
    let bytes = fs::read(path).with_context(|| format!("read {}", path.display()))?;
    let Ok(engine) = registry::detect_engine(&bytes) else {
        return Ok(None);
    };
    if engine != plan.source.engine {
        return Ok(None);
    }
    let source = read_tag_auto(&bytes);
    let source = match source {
        Ok(outcome) if std::ptr::eq(outcome.group, plan.source) => outcome,
        Ok(_) | Err(tag_engine::TagError::UnknownGroup { .. }) => return Ok(None),
        Err(err) => return Err(err.into()),
    };

    let donor_path = config
        .upgrade
        .donor_root
        .as_ref()
        .map(|donor_root| donor_root.join(relative))
        .filter(|candidate| candidate.is_file());
    let donor = donor_path
        .as_deref()
        .map(|donor| read_donor(donor, plan))
        .transpose()?;

    let outcome = upgrade(&source.tag, plan, donor.as_ref())?;
    storage::write_tag_file(&output.join(relative), &outcome.tag, plan.target)?;
    Ok(Some(BatchEntry {
        path: relative.display().to_string(),
        donor: donor_path.map(|donor| donor.display().to_string()),
        report: outcome.report,
    }))
}
