mod audit;
mod backup;
mod db;
mod error;
mod markup;
mod passes;
mod pipeline;
mod report;
mod settings;
mod tables;

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use chrono::Local;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

use db::{PostStore, SqliteStore};
use markup::RegexMarkup;
use pipeline::Pipeline;
use settings::Settings;
use tables::SeoTables;

#[derive(Parser)]
#[command(name = "seo_fixer", about = "Fix heading structure, internal links, FAQs and thin content in blog posts")]
struct Cli {
    /// SQLite database holding the posts (overrides SEO_DB_PATH)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every content pass over the target posts
    Run {
        /// Report what would change without writing anything
        #[arg(long)]
        dry_run: bool,
        /// Process only this post
        #[arg(short, long)]
        slug: Option<String>,
        /// Snapshot the database before writing
        #[arg(long)]
        backup: bool,
    },
    /// SEO structure table and score for the target posts
    Audit {
        /// Audit only this post
        #[arg(short, long)]
        slug: Option<String>,
    },
    /// Create, list or restore database backups
    Backup {
        /// List existing backups
        #[arg(long, conflicts_with = "restore")]
        list: bool,
        /// Restore the named backup file (a safety backup is taken first)
        #[arg(long, value_name = "FILE")]
        restore: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let mut settings = Settings::load()?;
    if let Some(db) = cli.db {
        settings.db_path = db;
    }

    let result = match cli.command {
        Commands::Run { dry_run, slug, backup } => run_cmd(&settings, dry_run, slug, backup),
        Commands::Audit { slug } => audit_cmd(&settings, slug),
        Commands::Backup { list, restore } => backup_cmd(&settings, list, restore),
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {:.1}s", elapsed.as_secs_f64());
    }

    result
}

fn load_tables(settings: &Settings) -> anyhow::Result<SeoTables> {
    let tables = match &settings.tables_path {
        Some(path) => SeoTables::from_path(path)?,
        None => SeoTables::builtin()?,
    };
    Ok(tables)
}

fn target_slugs(tables: &SeoTables, slug: Option<String>) -> Vec<String> {
    match slug {
        Some(s) => vec![s],
        None => tables.target_slugs.clone(),
    }
}

fn run_cmd(settings: &Settings, dry_run: bool, slug: Option<String>, backup: bool) -> anyhow::Result<()> {
    let tables = load_tables(settings)?;
    let store = SqliteStore::open(&settings.db_path).context("Cannot open blog database")?;

    if backup && !dry_run {
        let path = backup::create(store.path(), &settings.backup_dir, Local::now())?;
        println!("Backup written to {}", path.display());
    }

    let slugs = target_slugs(&tables, slug);
    println!(
        "{} {} posts...",
        if dry_run { "Checking (dry run)" } else { "Processing" },
        slugs.len()
    );

    let pb = ProgressBar::new(slugs.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .context("Invalid progress template")?
            .progress_chars("#>-"),
    );

    let pipeline = Pipeline::new(&store, &tables, &RegexMarkup, &settings.base_url, dry_run);
    let results = pipeline.process_all(&slugs, |r| {
        pb.set_message(r.slug.clone());
        pb.inc(1);
    });
    pb.finish_and_clear();

    let now = Local::now();
    let text = report::render(&results, dry_run, now);
    println!("{text}");
    let path = report::save(&settings.report_dir, &text, now)?;
    println!("Report saved to {}", path.display());
    Ok(())
}

fn audit_cmd(settings: &Settings, slug: Option<String>) -> anyhow::Result<()> {
    let tables = load_tables(settings)?;
    let store = SqliteStore::open(&settings.db_path).context("Cannot open blog database")?;
    let slugs = target_slugs(&tables, slug);
    let posts = store.get_all(Some(&slugs))?;
    if posts.is_empty() {
        println!("No matching posts found.");
        return Ok(());
    }

    println!(
        "{:>3} | {:<48} | {:>2} | {:>2} | {:>2} | {:>4} | {:>5} | {:<3} | {:<3} | {:<3} | {:>5} | {:>5}",
        "#", "Slug", "H1", "H2", "H3", "Sect", "Links", "FAQ", "End", "Rel", "Words", "Score"
    );
    println!("{}", "-".repeat(119));

    let yes_no = |b: bool| if b { "yes" } else { "no" };
    let mut total = 0u32;
    for (i, post) in posts.iter().enumerate() {
        let a = audit::analyze(&RegexMarkup, &post.content, &settings.base_url);
        let score = a.score();
        total += u32::from(score);
        println!(
            "{:>3} | {:<48} | {:>2} | {:>2} | {:>2} | {:>4} | {:>5} | {:<3} | {:<3} | {:<3} | {:>5} | {:>5}",
            i + 1,
            truncate(&post.slug, 48),
            a.h1_count,
            a.h2_count,
            a.h3_count,
            a.section_count,
            a.internal_links,
            yes_no(a.has_faq),
            yes_no(a.has_conclusion),
            yes_no(a.has_related),
            a.word_count,
            score
        );
    }

    let missing: Vec<_> = slugs
        .iter()
        .filter(|s| !posts.iter().any(|p| &p.slug == *s))
        .collect();
    if !missing.is_empty() {
        println!("\n--- Not in database ---");
        for s in missing {
            println!("  {s}");
        }
    }

    println!(
        "\n{} posts | average score {:.1}/100",
        posts.len(),
        f64::from(total) / posts.len() as f64
    );
    Ok(())
}

fn backup_cmd(settings: &Settings, list: bool, restore: Option<String>) -> anyhow::Result<()> {
    if list {
        let backups = backup::list(&settings.backup_dir)?;
        if backups.is_empty() {
            println!("No backups found in {}", settings.backup_dir.display());
            return Ok(());
        }
        println!("Available backups ({}):", backups.len());
        for b in &backups {
            println!(
                "  {}  {:>8.1} KB  {}",
                b.file_name(),
                b.size as f64 / 1024.0,
                b.modified.format("%Y-%m-%d %H:%M:%S")
            );
        }
        return Ok(());
    }

    if let Some(name) = restore {
        let safety = backup::restore(&settings.db_path, &settings.backup_dir, &name, Local::now())?;
        println!("Restored {name} (previous database saved as {})", safety.display());
        return Ok(());
    }

    let path = backup::create(&settings.db_path, &settings.backup_dir, Local::now())?;
    println!("Backup written to {}", path.display());
    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}...", truncated)
    }
}
