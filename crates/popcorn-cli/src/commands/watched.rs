use super::context::AppContext;
use super::{prompts, spinner};
use crate::output::Output;
use crate::WatchedCommands;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use comfy_table::{Cell, Table};
use owo_colors::OwoColorize;
use popcorn_core::{DetailsFetcher, WatchedList};
use popcorn_models::{WatchedEntry, WatchedSummary};
use serde_json::json;

pub async fn run_watched(cmd: WatchedCommands, output: &Output) -> Result<()> {
    let ctx = AppContext::load()?;
    let mut watched = ctx.watched();

    match cmd {
        WatchedCommands::List => list(&watched, output),
        WatchedCommands::Summary => summary(&watched, output),
        WatchedCommands::Add { imdb_id, rating } => add(&ctx, &mut watched, &imdb_id, rating, output).await,
        WatchedCommands::Remove { imdb_id } => remove(&mut watched, &imdb_id, output),
        WatchedCommands::Clear { yes } => clear(&ctx, &mut watched, yes, output),
    }
}

fn list(watched: &WatchedList, output: &Output) -> Result<()> {
    if !output.is_human() {
        output.json(&json!({
            "count": watched.len(),
            "entries": watched.entries(),
        }));
        return Ok(());
    }
    if output.is_quiet() {
        return Ok(());
    }
    if watched.is_empty() {
        output.info("Your watched list is empty");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec![
        Cell::new("IMDb ID").add_attribute(comfy_table::Attribute::Bold),
        Cell::new("Title").add_attribute(comfy_table::Attribute::Bold),
        Cell::new("⭐ IMDb").add_attribute(comfy_table::Attribute::Bold),
        Cell::new("🌟 Yours").add_attribute(comfy_table::Attribute::Bold),
        Cell::new("⏳ Runtime").add_attribute(comfy_table::Attribute::Bold),
    ]);
    for entry in watched.entries() {
        table.add_row(vec![
            Cell::new(&entry.imdb_id),
            Cell::new(format!("{} ({})", entry.title, entry.year)),
            Cell::new(entry.imdb_rating),
            Cell::new(entry.user_rating),
            Cell::new(format!("{} min", entry.runtime)),
        ]);
    }
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
    println!("{}", table);
    println!("{}", summary_line(&watched.summary()));
    Ok(())
}

/// "#️⃣ 3 movies ⭐ 7.50 🌟 8.00 ⏳ 121 min"
pub fn summary_line(summary: &WatchedSummary) -> String {
    format!(
        "#️⃣ {} movies  ⭐ {:.2}  🌟 {:.2}  ⏳ {:.0} min",
        summary.count, summary.mean_imdb_rating, summary.mean_user_rating, summary.mean_runtime
    )
}

fn summary(watched: &WatchedList, output: &Output) -> Result<()> {
    let summary = watched.summary();
    if output.is_human() {
        if !output.is_quiet() {
            println!("{}", "Movies you watched".bright_cyan().bold());
            println!("{}", summary_line(&summary));
        }
    } else {
        output.json(&json!(summary));
    }
    Ok(())
}

async fn add(ctx: &AppContext, watched: &mut WatchedList, imdb_id: &str, rating: u8, output: &Output) -> Result<()> {
    // Checked before the fetch so a duplicate costs no request
    if watched.contains(imdb_id) {
        output.warn(format!("'{}' is already in the watched list", imdb_id));
        return Ok(());
    }
    ctx.require_api_key()?;

    let fetcher = DetailsFetcher::new(ctx.source.clone());
    let spinner = spinner::start(output, format!("Loading {}...", imdb_id));
    fetcher.observe(Some(imdb_id));
    let state = fetcher.wait_idle().await;
    spinner.finish_and_clear();

    if let Some(error) = state.error {
        output.error(&error);
        return Err(eyre!("Could not load details for {}", imdb_id));
    }
    let details = state
        .details
        .ok_or_else(|| eyre!("No details returned for {}", imdb_id))?;

    let entry = WatchedEntry::from_details(&details, f64::from(rating));
    watched.add(entry).map_err(|e| eyre!("{}", e))?;
    output.success(format!("Added '{}' ({}) with rating {}", details.title, details.year, rating));
    Ok(())
}

fn remove(watched: &mut WatchedList, imdb_id: &str, output: &Output) -> Result<()> {
    if watched.remove(imdb_id) == 0 {
        output.warn(format!("'{}' is not in the watched list", imdb_id));
    } else {
        output.success(format!("Removed '{}' from the watched list", imdb_id));
    }
    Ok(())
}

fn clear(ctx: &AppContext, watched: &mut WatchedList, yes: bool, output: &Output) -> Result<()> {
    if watched.is_empty() {
        output.info("Your watched list is already empty");
        return Ok(());
    }

    let confirmed = yes || prompts::prompt_yes_no(&format!("Remove all {} watched movies?", watched.len()), false)?;
    if !confirmed {
        output.info("Nothing removed");
        return Ok(());
    }

    let count = watched.len();
    watched.clear();
    output.success(format!(
        "Cleared {} watched movies from {}",
        count,
        ctx.paths.storage_dir().display()
    ));
    Ok(())
}
