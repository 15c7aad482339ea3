use super::context::AppContext;
use super::spinner;
use crate::output::Output;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use comfy_table::{Cell, Table};
use owo_colors::OwoColorize;
use popcorn_core::{display_title, DetailsFetcher};
use popcorn_models::MovieDetails;
use serde_json::json;

pub async fn run_details(imdb_id: &str, output: &Output) -> Result<()> {
    let ctx = AppContext::load()?;
    ctx.require_api_key()?;
    let watched = ctx.watched();

    let fetcher = DetailsFetcher::new(ctx.source.clone());
    let spinner = spinner::start(output, format!("Loading {}...", imdb_id));
    fetcher.observe(Some(imdb_id));
    let state = fetcher.wait_idle().await;
    spinner.finish_and_clear();

    if let Some(error) = &state.error {
        output.error(error);
        return Err(eyre!("Could not load details for {}", imdb_id));
    }
    let details = state
        .details
        .as_ref()
        .ok_or_else(|| eyre!("No details returned for {}", imdb_id))?;
    let user_rating = watched.user_rating(&details.imdb_id);

    if output.is_human() {
        if output.is_quiet() {
            return Ok(());
        }
        println!("{}", display_title(&state).bright_cyan().bold());
        println!("{}", details_table(details));
        if !details.plot.is_empty() {
            println!("\n{}\n", details.plot.italic());
        }
        match user_rating {
            Some(rating) => println!("You rated this movie {} ⭐", rating),
            None => println!("{}", "Not in your watched list yet".bright_black()),
        }
    } else {
        output.json(&json!({
            "details": details,
            "user_rating": user_rating,
        }));
    }

    Ok(())
}

pub fn details_table(details: &MovieDetails) -> Table {
    let imdb_rating = details
        .imdb_rating
        .map(|r| format!("{} ⭐ IMDb rating", r))
        .unwrap_or_else(|| "N/A".to_string());

    let mut table = Table::new();
    table.set_header(vec![
        Cell::new(&details.title)
            .fg(comfy_table::Color::Cyan)
            .add_attribute(comfy_table::Attribute::Bold),
        Cell::new(&details.year),
    ]);
    table.add_row(vec![Cell::new("Released"), Cell::new(format!("{} • {}", details.released, details.runtime_label()))]);
    table.add_row(vec![Cell::new("Genre"), Cell::new(&details.genre)]);
    table.add_row(vec![Cell::new("Rating"), Cell::new(imdb_rating)]);
    table.add_row(vec![Cell::new("Starring"), Cell::new(&details.actors)]);
    table.add_row(vec![Cell::new("Directed by"), Cell::new(&details.director)]);
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
    table
}
