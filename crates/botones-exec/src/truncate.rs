//! Output truncation helpers.
//!
//! Chat replies have hard message limits and command output can be
//! arbitrarily large (`whois` on a busy registrar, a chatty ffmpeg run).
//! Middle-omission truncation preserves both the start of the output (what
//! the tool printed first) and the end (the final result or error), which
//! head-only or tail-only truncation would lose.

/// Truncate `output` to at most `max_chars` characters using middle-omission.
///
/// If `output` fits within `max_chars`, it is returned as-is. Otherwise the
/// first and last `max_chars / 2` characters are kept around an omission
/// marker. Splitting is done on character boundaries, so multi-byte
/// sequences are never broken.
pub fn truncate_output(output: &str, max_chars: usize) -> String {
    if output.len() <= max_chars {
        // Byte length bounds char count, no need to count chars.
        return output.to_owned();
    }

    let chars: Vec<char> = output.chars().collect();
    let total = chars.len();

    if total <= max_chars {
        return output.to_owned();
    }

    let half = max_chars / 2;
    let head: String = chars[..half].iter().collect();
    let tail: String = chars[total - half..].iter().collect();
    let omitted = total - max_chars;

    format!("{head}\n… [{omitted} chars omitted] …\n{tail}")
}

/// Return the last `max_chars` characters of `s` (char-boundary safe).
///
/// Used for diagnostic excerpts where only the end of a tool's output
/// matters, such as the ffmpeg stderr tail embedded in a failure reply.
pub fn tail_chars(s: &str, max_chars: usize) -> String {
    if s.len() <= max_chars {
        return s.to_owned();
    }
    let total = s.chars().count();
    if total <= max_chars {
        return s.to_owned();
    }
    s.chars().skip(total - max_chars).collect()
}
