use engine::AssetManifest;

pub(crate) const CAFE_BACKGROUND: &str = "cafe_bg";
pub(crate) const PLAYER_SPRITE: &str = "player";
pub(crate) const BARISTA_SPRITE: &str = "barista";
pub(crate) const CUSTOMER_SPRITE: &str = "customer";
pub(crate) const UI_PANEL: &str = "ui_panel";
pub(crate) const UI_FONT: &str = "ui";
pub(crate) const DING_SOUND: &str = "ding";
pub(crate) const STEP_SOUND: &str = "step";
pub(crate) const UI_CLICK_SOUND: &str = "ui_click";
pub(crate) const AMBIENCE_TRACK: &str = "ambience";

const FONT_GLYPH_WIDTH: u32 = 3;
const FONT_GLYPH_HEIGHT: u32 = 5;

/// Every asset the game ships, relative to the asset root.
pub(crate) fn asset_manifest() -> AssetManifest {
    AssetManifest::default()
        .texture(CAFE_BACKGROUND, "textures/cafe_bg.png")
        .texture(PLAYER_SPRITE, "textures/player.png")
        .texture(BARISTA_SPRITE, "textures/barista.png")
        .texture(CUSTOMER_SPRITE, "textures/customer.png")
        .texture(UI_PANEL, "textures/ui_panel.png")
        .font(
            UI_FONT,
            "fonts/ui_font.png",
            FONT_GLYPH_WIDTH,
            FONT_GLYPH_HEIGHT,
        )
        .sound(DING_SOUND, "sounds/ding.wav")
        .sound(STEP_SOUND, "sounds/step.wav")
        .sound(UI_CLICK_SOUND, "sounds/ui_click.wav")
        .track(AMBIENCE_TRACK, "music/ambience.wav")
}

#[cfg(test)]
pub(crate) mod test_support {
    use engine::{AssetRegistry, BitmapFont, SoundClip, Texture};

    use super::*;

    /// Registry with every manifest id backed by in-memory placeholders.
    pub(crate) fn test_assets() -> AssetRegistry {
        let mut assets = AssetRegistry::default();
        for (id, color) in [
            (CAFE_BACKGROUND, [90, 70, 50, 255]),
            (PLAYER_SPRITE, [40, 120, 220, 255]),
            (BARISTA_SPRITE, [200, 90, 60, 255]),
            (CUSTOMER_SPRITE, [120, 180, 90, 255]),
            (UI_PANEL, [20, 20, 26, 200]),
        ] {
            assets.insert_texture(id, Texture::solid(4, 4, color));
        }
        assets.insert_font(
            UI_FONT,
            BitmapFont::blank(FONT_GLYPH_WIDTH, FONT_GLYPH_HEIGHT).expect("blank font"),
        );
        for id in [DING_SOUND, STEP_SOUND, UI_CLICK_SOUND] {
            assets.insert_sound(id, SoundClip::silent(id));
        }
        assets.insert_track(AMBIENCE_TRACK, SoundClip::silent(AMBIENCE_TRACK));
        assets
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use engine::AssetRegistry;

    use super::*;
    use crate::app::ui::UiAssets;

    #[test]
    fn shipped_assets_load_from_repository() {
        let asset_root = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("../..")
            .join("assets");
        let assets = AssetRegistry::load(&asset_root, &asset_manifest()).expect("load assets");

        let ui = UiAssets::resolve(&assets).expect("ui assets");
        let font = assets.font_data(ui.font).expect("font data");
        assert_eq!(font.glyph_width(), FONT_GLYPH_WIDTH);
        assert_eq!(font.glyph_height(), FONT_GLYPH_HEIGHT);
        assert!(assets.texture(CAFE_BACKGROUND).is_ok());
        assert!(assets.sound(STEP_SOUND).is_ok());
        assert!(assets.track(AMBIENCE_TRACK).is_ok());
    }

    #[test]
    fn placeholder_registry_covers_manifest_ids() {
        let assets = test_support::test_assets();
        assert!(UiAssets::resolve(&assets).is_ok());
        for id in [CAFE_BACKGROUND, PLAYER_SPRITE, BARISTA_SPRITE, CUSTOMER_SPRITE] {
            assert!(assets.texture(id).is_ok(), "{id}");
        }
    }
}
