//! Dictionary definitions and translations, each with a single
//! alternate-parameter retry that fires only on a structured miss.

use crate::{
    client::ApiClient,
    error::{ApiError, Result},
};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

const DICTIONARY_ENDPOINT: &str = "dictionaryapi.dev";
const TRANSLATE_ENDPOINT: &str = "mymemory";

// ---------------------------------------------------------------------------
// Dictionary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct DictionaryEntry {
    pub word: String,
    #[serde(default)]
    pub phonetic: Option<String>,
    #[serde(default)]
    pub meanings: Vec<Meaning>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Meaning {
    #[serde(rename = "partOfSpeech")]
    pub part_of_speech: String,
    #[serde(default)]
    pub definitions: Vec<Definition>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Definition {
    pub definition: String,
    #[serde(default)]
    pub example: Option<String>,
}

impl ApiClient {
    /// Look `word` up in `lang`. When the primary lookup reports a
    /// structured miss the single retry uses `alternate`; any other failure
    /// is returned as-is. The returned string is the language that answered.
    pub async fn define(
        &self,
        word: &str,
        lang: &str,
        alternate: &str,
    ) -> Result<(String, DictionaryEntry)> {
        match self.define_in(word, lang).await {
            Err(ApiError::NoMatch { .. }) if alternate != lang => {
                debug!(word, lang, alternate, "dictionary miss, trying alternate");
                let entry = self.define_in(word, alternate).await?;
                Ok((alternate.to_string(), entry))
            }
            Ok(entry) => Ok((lang.to_string(), entry)),
            Err(e) => Err(e),
        }
    }

    async fn define_in(&self, word: &str, lang: &str) -> Result<DictionaryEntry> {
        let url = format!(
            "https://api.dictionaryapi.dev/api/v2/entries/{lang}/{}",
            urlencoding::encode(word)
        );
        // The service reports "no such word" as a 404 with a JSON body.
        match self
            .get_json::<Vec<DictionaryEntry>>(DICTIONARY_ENDPOINT, &url)
            .await
        {
            Ok(entries) => entries
                .into_iter()
                .next()
                .ok_or_else(|| no_definitions(word, lang)),
            Err(ApiError::Status { status: 404, .. }) => Err(no_definitions(word, lang)),
            Err(e) => Err(e),
        }
    }
}

fn no_definitions(word: &str, lang: &str) -> ApiError {
    ApiError::NoMatch {
        what: format!("no definitions found for \"{word}\" ({lang})"),
    }
}

// ---------------------------------------------------------------------------
// Translation
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct MyMemoryResponse {
    #[serde(rename = "responseData")]
    response_data: Option<MyMemoryData>,
    // The service switches between a number and a string here.
    #[serde(rename = "responseStatus", default)]
    response_status: Value,
}

#[derive(Debug, Deserialize)]
struct MyMemoryData {
    #[serde(rename = "translatedText", default)]
    translated_text: String,
}

/// A completed translation, tagged with the pair that actually answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translation {
    pub text: String,
    pub langpair: String,
}

impl ApiClient {
    /// Translate `text` from `from` to `to`. A structured miss (unusable
    /// pair, empty result) triggers one retry with the pair swapped.
    pub async fn translate(&self, text: &str, from: &str, to: &str) -> Result<Translation> {
        match self.translate_pair(text, from, to).await {
            Err(ApiError::NoMatch { .. }) => {
                debug!(from, to, "translation miss, trying swapped pair");
                self.translate_pair(text, to, from).await
            }
            other => other,
        }
    }

    async fn translate_pair(&self, text: &str, from: &str, to: &str) -> Result<Translation> {
        let url = format!(
            "https://api.mymemory.translated.net/get?q={}&langpair={}",
            urlencoding::encode(text),
            urlencoding::encode(&format!("{from}|{to}")),
        );
        let resp: MyMemoryResponse = self.get_json(TRANSLATE_ENDPOINT, &url).await?;
        extract_translation(resp, from, to)
    }
}

/// Classify a MyMemory response: a usable translation, or a structured miss.
///
/// The service loves answering HTTP 200 with an error sentence in the
/// translation slot, so the text itself is inspected too.
fn extract_translation(resp: MyMemoryResponse, from: &str, to: &str) -> Result<Translation> {
    let status_ok = match &resp.response_status {
        Value::Number(n) => n.as_i64() == Some(200),
        Value::String(s) => s == "200",
        _ => false,
    };
    let translated = resp
        .response_data
        .map(|d| d.translated_text)
        .unwrap_or_default();

    if !status_ok || translated.trim().is_empty() || looks_like_service_error(&translated) {
        return Err(ApiError::NoMatch {
            what: format!("no translation found for pair {from}|{to}"),
        });
    }

    Ok(Translation {
        text: translated,
        langpair: format!("{from}|{to}"),
    })
}

fn looks_like_service_error(text: &str) -> bool {
    let upper = text.to_uppercase();
    upper.contains("INVALID SOURCE LANGUAGE")
        || upper.contains("INVALID TARGET LANGUAGE")
        || upper.contains("INVALID LANGUAGE PAIR")
        || upper.contains("NO QUERY SPECIFIED")
        || upper.contains("PLEASE SELECT TWO DISTINCT LANGUAGES")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dictionary_entry_parses() {
        let json = r#"[{
            "word": "hola",
            "phonetic": "/ˈo.la/",
            "meanings": [{
                "partOfSpeech": "interjection",
                "definitions": [
                    {"definition": "hello, hi", "example": "¡Hola! ¿Cómo estás?"}
                ]
            }]
        }]"#;
        let entries: Vec<DictionaryEntry> = serde_json::from_str(json).unwrap();
        assert_eq!(entries[0].word, "hola");
        assert_eq!(entries[0].meanings[0].part_of_speech, "interjection");
        assert_eq!(entries[0].meanings[0].definitions[0].definition, "hello, hi");
    }

    #[test]
    fn mymemory_numeric_status_is_accepted() {
        let resp: MyMemoryResponse = serde_json::from_str(
            r#"{"responseData": {"translatedText": "buenos días"}, "responseStatus": 200}"#,
        )
        .unwrap();
        let t = extract_translation(resp, "en", "es").unwrap();
        assert_eq!(t.text, "buenos días");
        assert_eq!(t.langpair, "en|es");
    }

    #[test]
    fn mymemory_string_status_is_accepted() {
        let resp: MyMemoryResponse = serde_json::from_str(
            r#"{"responseData": {"translatedText": "gato"}, "responseStatus": "200"}"#,
        )
        .unwrap();
        assert!(extract_translation(resp, "en", "es").is_ok());
    }

    #[test]
    fn mymemory_error_status_is_a_miss() {
        let resp: MyMemoryResponse = serde_json::from_str(
            r#"{"responseData": {"translatedText": "x"}, "responseStatus": "403"}"#,
        )
        .unwrap();
        let err = extract_translation(resp, "en", "es").unwrap_err();
        assert!(matches!(err, ApiError::NoMatch { .. }));
    }

    #[test]
    fn mymemory_error_sentence_is_a_miss() {
        let resp: MyMemoryResponse = serde_json::from_str(
            r#"{"responseData":
                {"translatedText": "INVALID TARGET LANGUAGE. EXAMPLE: LANGPAIR=EN|IT"},
                "responseStatus": 200}"#,
        )
        .unwrap();
        let err = extract_translation(resp, "en", "xx").unwrap_err();
        assert!(matches!(err, ApiError::NoMatch { .. }));
    }

    #[test]
    fn mymemory_empty_translation_is_a_miss() {
        let resp: MyMemoryResponse =
            serde_json::from_str(r#"{"responseData": {"translatedText": "  "}, "responseStatus": 200}"#)
                .unwrap();
        assert!(extract_translation(resp, "en", "es").is_err());
    }
}
