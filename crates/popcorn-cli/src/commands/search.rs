use super::context::AppContext;
use super::spinner;
use crate::output::Output;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use comfy_table::{Cell, Table};
use owo_colors::OwoColorize;
use popcorn_core::SearchFetcher;
use serde_json::json;

pub async fn run_search(query: &str, output: &Output) -> Result<()> {
    let ctx = AppContext::load()?;
    ctx.require_api_key()?;
    let watched = ctx.watched();

    let fetcher = SearchFetcher::new(ctx.source.clone());
    let spinner = spinner::start(output, format!("Searching for '{}'...", query.trim()));
    fetcher.observe(query);
    let state = fetcher.wait_idle().await;
    spinner.finish_and_clear();

    if let Some(error) = state.error {
        output.error(&error);
        return Err(eyre!("Search for '{}' failed", query.trim()));
    }

    if output.is_human() {
        if output.is_quiet() {
            return Ok(());
        }
        if state.results.is_empty() {
            output.info("Type a title to search");
            return Ok(());
        }

        let shown = state.results.len().min(ctx.config.browse.max_results_shown);
        let mut table = Table::new();
        table.set_header(vec![
            Cell::new("IMDb ID").add_attribute(comfy_table::Attribute::Bold),
            Cell::new("Title").add_attribute(comfy_table::Attribute::Bold),
            Cell::new("Year").add_attribute(comfy_table::Attribute::Bold),
            Cell::new("Watched").add_attribute(comfy_table::Attribute::Bold),
        ]);
        for result in &state.results[..shown] {
            let watched_cell = match watched.user_rating(&result.imdb_id) {
                Some(rating) => format!("{} {}", "✓".green(), rating),
                None => String::new(),
            };
            table.add_row(vec![
                Cell::new(&result.imdb_id),
                Cell::new(&result.title),
                Cell::new(&result.year),
                Cell::new(watched_cell),
            ]);
        }
        table.load_preset(comfy_table::presets::UTF8_FULL);
        table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);

        println!("{}", table);
        println!("Found {} results", state.results.len().to_string().bold());
    } else {
        let results: Vec<_> = state
            .results
            .iter()
            .map(|result| {
                json!({
                    "imdb_id": result.imdb_id,
                    "title": result.title,
                    "year": result.year,
                    "poster": result.poster,
                    "user_rating": watched.user_rating(&result.imdb_id),
                })
            })
            .collect();
        output.json(&json!({
            "query": state.query,
            "count": results.len(),
            "results": results,
        }));
    }

    Ok(())
}
