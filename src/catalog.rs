// Built-in preset colors and gradients

use crate::model::ColorOption;

/// (title, hex, keywords) for solid presets
const SOLIDS: &[(&str, &str, &[&str])] = &[
    ("Pure White", "#FFFFFF", &["white", "blank"]),
    ("Pure Black", "#000000", &["black", "dark"]),
    ("Coral Red", "#FF4757", &["red", "coral"]),
    ("Tomato", "#FF6348", &["red", "orange"]),
    ("Sunset Orange", "#FF7F50", &["orange"]),
    ("Golden Amber", "#FFA502", &["yellow", "amber", "gold"]),
    ("Lemon Yellow", "#FFDD59", &["yellow", "lemon"]),
    ("Lime Green", "#7BED9F", &["green", "lime"]),
    ("Emerald", "#2ED573", &["green", "emerald"]),
    ("Mint Green", "#66D4CF", &["mint", "teal", "green"]),
    ("Sky Blue", "#70A1FF", &["blue", "sky"]),
    ("Dodger Blue", "#1E90FF", &["blue"]),
    ("Deep Ocean", "#1E3799", &["blue", "navy", "ocean"]),
    ("Royal Purple", "#5F27CD", &["purple", "violet"]),
    ("Lavender", "#A29BFE", &["purple", "lavender"]),
    ("Hot Pink", "#FF6B81", &["pink"]),
    ("Rose", "#FC5C9C", &["pink", "rose"]),
    ("Slate Gray", "#57606F", &["gray", "grey", "slate"]),
    ("Soft Cream", "#FFF8E7", &["cream", "warm", "paper"]),
    ("Midnight", "#2F3542", &["dark", "night"]),
];

/// (title, hex, hex2, keywords) for two-stop gradient presets
const GRADIENTS: &[(&str, &str, &str, &[&str])] = &[
    ("Sunrise", "#FF9A9E", "#FAD0C4", &["warm", "pink", "morning"]),
    ("Sunset Glow", "#FF4757", "#FFA502", &["warm", "sunset", "orange"]),
    ("Ocean Breeze", "#2193B0", "#6DD5ED", &["blue", "ocean", "cool"]),
    ("Northern Lights", "#00C9FF", "#92FE9D", &["aurora", "green", "blue"]),
    ("Purple Haze", "#5F27CD", "#FF6B81", &["purple", "pink"]),
    ("Deep Space", "#000428", "#004E92", &["dark", "blue", "night"]),
    ("Peach Soda", "#FFECD2", "#FCB69F", &["peach", "warm", "soft"]),
    ("Forest Mist", "#134E5E", "#71B280", &["green", "forest"]),
];

fn preset(title: &str, hex: &str, hex2: Option<&str>, keywords: &[&str]) -> ColorOption {
    ColorOption {
        title: title.to_string(),
        hex: hex.to_string(),
        hex2: hex2.map(str::to_string),
        keywords: keywords.iter().map(|s| s.to_string()).collect(),
        id: None,
        favorite: false,
        created_at: 0,
        last_used: 0,
    }
}

/// All solid presets, catalog order
pub fn solids() -> Vec<ColorOption> {
    SOLIDS
        .iter()
        .map(|(title, hex, keywords)| preset(title, hex, None, keywords))
        .collect()
}

/// All gradient presets, catalog order
pub fn gradients() -> Vec<ColorOption> {
    GRADIENTS
        .iter()
        .map(|(title, hex, hex2, keywords)| preset(title, hex, Some(hex2), keywords))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hex;
    use crate::matcher;

    #[test]
    fn test_all_presets_canonical() {
        for preset in solids().iter().chain(gradients().iter()) {
            assert_eq!(
                hex::normalize(&preset.hex).as_deref(),
                Some(preset.hex.as_str()),
                "{} hex not canonical",
                preset.title
            );
            if let Some(hex2) = &preset.hex2 {
                assert_eq!(hex::normalize(hex2).as_deref(), Some(hex2.as_str()));
            }
        }
    }

    #[test]
    fn test_mint_keyword_finds_mint_green() {
        let hit = solids()
            .into_iter()
            .find(|p| matcher::matches(p, "mint"))
            .expect("mint should match a preset");
        assert_eq!(hit.title, "Mint Green");
        assert_eq!(hit.hex, "#66D4CF");
    }

    #[test]
    fn test_preset_ids() {
        let mint = solids()
            .into_iter()
            .find(|p| p.title == "Mint Green")
            .unwrap();
        assert_eq!(mint.preset_id(), "#66D4CF");

        let sunset = gradients()
            .into_iter()
            .find(|p| p.title == "Sunset Glow")
            .unwrap();
        assert_eq!(sunset.preset_id(), "#FF4757-#FFA502");
    }

    #[test]
    fn test_no_duplicate_preset_ids() {
        let mut ids: Vec<String> = solids()
            .iter()
            .chain(gradients().iter())
            .map(|p| p.preset_id())
            .collect();
        let before = ids.len();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), before);
    }
}
