//! Helpers for sanitizing data before it reaches span attributes or prompts.
//!
//! Archive entry names can carry directory structure from the uploader's
//! machine, and document text is untrusted input that ends up inside an LLM
//! prompt.

/// Returns only the final component of an archive entry name.
///
/// Handles both `/` and `\` separators since archives built on Windows may
/// use either.
pub fn redact_name(name: &str) -> String {
    let base = name
        .rsplit(['/', '\\'])
        .find(|part| !part.is_empty())
        .unwrap_or("");
    if base.is_empty() {
        "<unknown>".to_string()
    } else {
        base.to_string()
    }
}

/// Neutralizes chat-template control tokens so document text cannot pose as
/// a new instruction block.
pub fn sanitize_for_prompt(text: &str) -> String {
    text.replace("<|", "< |")
        .replace("|>", "| >")
        .replace("<s>", "< s >")
        .replace("</s>", "< / s >")
        .replace("[INST]", "[ INST ]")
        .replace("[/INST]", "[ / INST ]")
        .replace("<<SYS>>", "< < SYS > >")
        .replace("<</SYS>>", "< < / SYS > >")
}

/// Masks the middle of a secret for log output, keeping at most four
/// trailing characters.
pub fn mask_secret(secret: &str) -> String {
    let count = secret.chars().count();
    if count <= 8 {
        return "****".to_string();
    }
    let tail: String = secret.chars().skip(count - 4).collect();
    format!("****{}", tail)
}
