//! Local text utilities: `/hash`, `/hmac`, `/b64`. Pure computation, so
//! these reply immediately without deferring.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use hmac::{Hmac, Mac};
use serenity::model::application::CommandInteraction;
use serenity::prelude::Context;
use sha2::{Digest, Sha256, Sha512};

use crate::reply::{opt_str, respond_ephemeral, respond_text};

fn digest_hex(algorithm: &str, text: &str) -> String {
    match algorithm {
        "sha512" => hex::encode(Sha512::digest(text.as_bytes())),
        _ => hex::encode(Sha256::digest(text.as_bytes())),
    }
}

fn hmac_hex(key: &str, text: &str) -> Option<String> {
    let mut mac = Hmac::<Sha256>::new_from_slice(key.as_bytes()).ok()?;
    mac.update(text.as_bytes());
    Some(hex::encode(mac.finalize().into_bytes()))
}

pub async fn handle_hash(
    ctx: &Context,
    command: &CommandInteraction,
) -> Result<(), serenity::Error> {
    let text = opt_str(command, "text").unwrap_or("");
    let algorithm = opt_str(command, "algorithm").unwrap_or("sha256");
    if text.is_empty() {
        respond_ephemeral(ctx, command, "Nothing to hash.").await;
        return Ok(());
    }

    let digest = digest_hex(algorithm, text);
    respond_text(ctx, command, &format!("{algorithm}: `{digest}`")).await
}

pub async fn handle_hmac(
    ctx: &Context,
    command: &CommandInteraction,
) -> Result<(), serenity::Error> {
    let key = opt_str(command, "key").unwrap_or("");
    let text = opt_str(command, "text").unwrap_or("");
    if key.is_empty() || text.is_empty() {
        respond_ephemeral(ctx, command, "Both key and text are required.").await;
        return Ok(());
    }

    // The key is a secret, so the reply stays between us and the invoker.
    let reply = match hmac_hex(key, text) {
        Some(tag) => format!("HMAC-SHA256: `{tag}`"),
        None => "That key cannot be used.".to_string(),
    };
    respond_ephemeral(ctx, command, &reply).await;
    Ok(())
}

pub async fn handle_b64(
    ctx: &Context,
    command: &CommandInteraction,
) -> Result<(), serenity::Error> {
    let mode = opt_str(command, "mode").unwrap_or("encode");
    let text = opt_str(command, "text").unwrap_or("");
    if text.is_empty() {
        respond_ephemeral(ctx, command, "Nothing to convert.").await;
        return Ok(());
    }

    let reply = match mode {
        "decode" => match STANDARD.decode(text.trim()) {
            Ok(bytes) => match String::from_utf8(bytes) {
                Ok(decoded) => format!("```\n{decoded}\n```"),
                Err(_) => "Decoded, but the result is not UTF-8 text.".to_string(),
            },
            Err(e) => format!("Not valid base64: {e}"),
        },
        _ => format!("`{}`", STANDARD.encode(text.as_bytes())),
    };

    respond_text(ctx, command, &reply).await
}
