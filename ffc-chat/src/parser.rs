use ffc_catalog::{Material, SizeClass};

/// Specs pulled out of a customer's free-text reply. Parsing is
/// best-effort: nothing the customer types can fail the turn. `ambiguous`
/// is set whenever material or size fell back to a default, so callers can
/// log the guess.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedDetails {
    pub material: Material,
    pub size: SizeClass,
    pub color: String,
    pub rush: bool,
    pub cad_design: bool,
    pub ambiguous: bool,
}

/// Tokens that are never a color: the material/size vocabulary itself,
/// add-on keywords, chat filler, and bare quantities.
const STOP_WORDS: &[&str] = &[
    "pla", "pla+", "petg", "small", "medium", "large", "full", "drawer", "size", "color",
    "colour", "material", "rush", "cad", "the", "and", "with", "please", "want", "would",
    "like", "need", "for", "my", "in", "it", "is", "of", "to", "thanks", "quote", "me",
    "one", "an", "1", "2", "3",
];

pub fn parse_details(text: &str) -> ParsedDetails {
    let lower = text.to_lowercase();
    let mut ambiguous = false;

    // PETG outranks PLA+ outranks PLA: "pla" is a substring of both of the
    // stronger matches, so priority order matters.
    let material = if lower.contains("petg") {
        Material::Petg
    } else if lower.contains("pla+") {
        Material::PlaPlus
    } else if lower.contains("pla") {
        Material::Pla
    } else {
        ambiguous = true;
        Material::Pla
    };

    let size = if lower.contains("full") || lower.contains("drawer") {
        SizeClass::FullDrawer
    } else if lower.contains("small") {
        SizeClass::Small
    } else if lower.contains("medium") {
        SizeClass::Medium
    } else if lower.contains("large") {
        SizeClass::FullDrawer
    } else {
        ambiguous = true;
        SizeClass::Medium
    };

    let color_tokens: Vec<&str> = lower
        .split(|c: char| c.is_whitespace() || c == ',' || c == '.' || c == '/')
        .filter(|t| t.len() > 1)
        .filter(|t| !STOP_WORDS.contains(t))
        .collect();

    let color = if color_tokens.is_empty() {
        "black".to_string()
    } else {
        color_tokens.join(" ")
    };

    ParsedDetails {
        material,
        size,
        color,
        rush: lower.contains("rush"),
        cad_design: lower.contains("cad"),
        ambiguous,
    }
}

/// Three-way fork on a quote reply. YES-words are checked before NO-words;
/// anything matching neither re-prompts without mutating order or stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteReply {
    Accepted,
    Declined,
    Unclear,
}

pub fn parse_quote_reply(text: &str) -> QuoteReply {
    let upper = text.to_uppercase();
    if ["YES", "CONFIRM", "APPROVE"].iter().any(|k| upper.contains(k)) {
        QuoteReply::Accepted
    } else if ["NO", "CANCEL"].iter().any(|k| upper.contains(k)) {
        QuoteReply::Declined
    } else {
        QuoteReply::Unclear
    }
}

pub fn wants_cloud(text: &str) -> bool {
    text.to_uppercase().contains("CLOUD")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_details_parse() {
        let parsed = parse_details("PETG, red, small");
        assert_eq!(parsed.material, Material::Petg);
        assert_eq!(parsed.size, SizeClass::Small);
        assert_eq!(parsed.color, "red");
        assert!(!parsed.ambiguous);

        // Idempotent on canonical input
        assert_eq!(parse_details("PETG, red, small"), parsed);
    }

    #[test]
    fn test_material_priority_order() {
        assert_eq!(parse_details("pla+ small").material, Material::PlaPlus);
        assert_eq!(parse_details("plain pla small").material, Material::Pla);
        assert_eq!(parse_details("petg or pla, whatever").material, Material::Petg);
    }

    #[test]
    fn test_defaults_are_flagged_ambiguous() {
        let parsed = parse_details("something sturdy");
        assert_eq!(parsed.material, Material::Pla);
        assert_eq!(parsed.size, SizeClass::Medium);
        assert!(parsed.ambiguous);
    }

    #[test]
    fn test_large_maps_to_full_drawer() {
        assert_eq!(parse_details("large, pla").size, SizeClass::FullDrawer);
        assert_eq!(parse_details("the full drawer one").size, SizeClass::FullDrawer);
    }

    #[test]
    fn test_color_joins_leftover_tokens() {
        let parsed = parse_details("medium pla+ in matte navy blue please");
        assert_eq!(parsed.color, "matte navy blue");
    }

    #[test]
    fn test_color_defaults_to_black() {
        assert_eq!(parse_details("PETG small").color, "black");
    }

    #[test]
    fn test_addon_keywords_set_flags_without_polluting_color() {
        let parsed = parse_details("petg, white, full drawer, rush it");
        assert!(parsed.rush);
        assert!(!parsed.cad_design);
        assert_eq!(parsed.color, "white");
    }

    #[test]
    fn test_quote_reply_fork() {
        assert_eq!(parse_quote_reply("YES!"), QuoteReply::Accepted);
        assert_eq!(parse_quote_reply("ok, confirm it"), QuoteReply::Accepted);
        assert_eq!(parse_quote_reply("I approve"), QuoteReply::Accepted);
        assert_eq!(parse_quote_reply("nah, no thanks"), QuoteReply::Declined);
        assert_eq!(parse_quote_reply("cancel please"), QuoteReply::Declined);
        assert_eq!(parse_quote_reply("how long will it take?"), QuoteReply::Unclear);
    }

    #[test]
    fn test_wants_cloud_is_case_insensitive() {
        assert!(wants_cloud("I'll do cloud printing"));
        assert!(wants_cloud("CLOUD"));
        assert!(!wants_cloud("print it yourselves"));
    }
}
