//! Lookup commands backed by public APIs: `/weather`, `/define`,
//! `/translate`.

use std::sync::Arc;

use serenity::model::application::CommandInteraction;
use serenity::prelude::Context;

use botones_api::{ApiError, DictionaryEntry};

use crate::context::BotContext;
use crate::reply::{defer, edit_chunked, opt_str, respond_ephemeral};

pub async fn handle_weather(
    app: &Arc<BotContext>,
    ctx: &Context,
    command: &CommandInteraction,
) -> Result<(), serenity::Error> {
    let place = opt_str(command, "place").unwrap_or("").trim().to_string();
    if place.is_empty() {
        respond_ephemeral(ctx, command, "Give me a place name.").await;
        return Ok(());
    }

    defer(ctx, command, false).await?;

    let text = match app.api.weather(&place).await {
        Ok(report) => format!(
            "**{}**: {}, {:.1} \u{00b0}C (feels like {:.1} \u{00b0}C), humidity {:.0}%, wind {:.1} km/h",
            report.place,
            report.description,
            report.temperature_c,
            report.feels_like_c,
            report.humidity_pct,
            report.wind_kmh,
        ),
        Err(ApiError::NoMatch { what }) => format!("No results for {what}."),
        Err(e) => format!("\u{26a0}\u{fe0f} weather lookup failed: {e}"),
    };

    edit_chunked(ctx, command, &text).await
}

pub async fn handle_define(
    app: &Arc<BotContext>,
    ctx: &Context,
    command: &CommandInteraction,
) -> Result<(), serenity::Error> {
    let word = opt_str(command, "word").unwrap_or("").trim().to_string();
    if word.is_empty() {
        respond_ephemeral(ctx, command, "Give me a word to define.").await;
        return Ok(());
    }
    let language = opt_str(command, "language").unwrap_or("en");
    let alternate = if language == "en" { "es" } else { "en" };

    defer(ctx, command, false).await?;

    let text = match app.api.define(&word, language, alternate).await {
        Ok((answered_in, entry)) => format_definition(&entry, &answered_in, language),
        Err(ApiError::NoMatch { what }) => format!("No definition found for {what}."),
        Err(e) => format!("\u{26a0}\u{fe0f} dictionary lookup failed: {e}"),
    };

    edit_chunked(ctx, command, &text).await
}

fn format_definition(entry: &DictionaryEntry, answered_in: &str, asked_in: &str) -> String {
    let mut text = format!("**{}**", entry.word);
    if let Some(ref phonetic) = entry.phonetic {
        text.push_str(&format!(" {phonetic}"));
    }
    if answered_in != asked_in {
        text.push_str(&format!(" (found in the `{answered_in}` dictionary)"));
    }

    for meaning in entry.meanings.iter().take(2) {
        text.push_str(&format!("\n_{}_", meaning.part_of_speech));
        for (i, definition) in meaning.definitions.iter().take(2).enumerate() {
            text.push_str(&format!("\n{}. {}", i + 1, definition.definition));
            if let Some(ref example) = definition.example {
                text.push_str(&format!("\n   \u{201c}{example}\u{201d}"));
            }
        }
    }
    text
}

pub async fn handle_translate(
    app: &Arc<BotContext>,
    ctx: &Context,
    command: &CommandInteraction,
) -> Result<(), serenity::Error> {
    let text = opt_str(command, "text").unwrap_or("").trim().to_string();
    let from = opt_str(command, "from").unwrap_or("").trim().to_lowercase();
    let to = opt_str(command, "to").unwrap_or("").trim().to_lowercase();
    if text.is_empty() || from.is_empty() || to.is_empty() {
        respond_ephemeral(ctx, command, "I need the text and both language codes.").await;
        return Ok(());
    }

    defer(ctx, command, false).await?;

    let reply = match app.api.translate(&text, &from, &to).await {
        Ok(translation) => format!("[{}] {}", translation.langpair, translation.text),
        Err(ApiError::NoMatch { what }) => format!("No translation found for {what}."),
        Err(e) => format!("\u{26a0}\u{fe0f} translation failed: {e}"),
    };

    edit_chunked(ctx, command, &reply).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use botones_api::lookup::{Definition, Meaning};

    fn entry() -> DictionaryEntry {
        DictionaryEntry {
            word: "errand".to_string(),
            phonetic: Some("/\u{02c8}e.r\u{0259}nd/".to_string()),
            meanings: vec![Meaning {
                part_of_speech: "noun".to_string(),
                definitions: vec![Definition {
                    definition: "A trip to accomplish a small mission.".to_string(),
                    example: Some("I have a few errands to run.".to_string()),
                }],
            }],
        }
    }

    #[test]
    fn definition_includes_word_and_meaning() {
        let text = format_definition(&entry(), "en", "en");
        assert!(text.starts_with("**errand**"));
        assert!(text.contains("_noun_"));
        assert!(text.contains("small mission"));
        assert!(!text.contains("dictionary)"));
    }

    #[test]
    fn alternate_language_answer_is_flagged() {
        let text = format_definition(&entry(), "es", "en");
        assert!(text.contains("(found in the `es` dictionary)"));
    }
}
