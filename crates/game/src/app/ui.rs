use engine::{AssetError, AssetRegistry, FontHandle, TextureHandle};

use super::assets::{UI_FONT, UI_PANEL};

/// Handles shared by every panel-and-text widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct UiAssets {
    pub(crate) font: FontHandle,
    pub(crate) panel: TextureHandle,
}

impl UiAssets {
    pub(crate) fn resolve(assets: &AssetRegistry) -> Result<Self, AssetError> {
        Ok(Self {
            font: assets.font(UI_FONT)?,
            panel: assets.texture(UI_PANEL)?,
        })
    }
}

/// Greedy word wrap at `columns` characters. Words longer than a line are
/// split.
pub(crate) fn wrap_text(text: &str, columns: usize) -> Vec<String> {
    let columns = columns.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > columns {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let rest = word.split_off(columns);
            lines.push(word.into_iter().collect());
            word = rest;
        }
        let current_len = current.chars().count();
        if current_len > 0 && current_len + 1 + word.len() > columns {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.extend(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_breaks_on_words_and_splits_long_words() {
        assert_eq!(
            wrap_text("Awesome! A Medium Latte with Oat Milk", 16),
            vec!["Awesome! A", "Medium Latte", "with Oat Milk"]
        );
        assert_eq!(wrap_text("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
        assert!(wrap_text("   ", 10).is_empty());
    }

    #[test]
    fn missing_ui_font_is_reported() {
        let error = UiAssets::resolve(&AssetRegistry::default()).expect_err("empty registry");
        assert!(matches!(error, AssetError::UnknownFont { .. }));
    }
}
