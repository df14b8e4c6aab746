const FENCE: &str = "```";

/// Lists the places an array may hide in: the body of every markdown code fence, then the full text.
/// An unterminated fence runs to the end of the text.
pub fn sources(text: &str) -> Vec<&str> {
    let mut sources = Vec::new();
    let mut rest = text;

    while let Some(open) = rest.find(FENCE) {
        let after = &rest[open + FENCE.len()..];
        let info = after.find(|c: char| !c.is_ascii_alphanumeric()).unwrap_or(after.len());
        let body = &after[info..];
        match body.find(FENCE) {
            Some(close) => {
                sources.push(&body[..close]);
                rest = &body[close + FENCE.len()..];
            }
            None => {
                sources.push(body);
                break;
            }
        }
    }

    sources.push(text);
    sources
}
