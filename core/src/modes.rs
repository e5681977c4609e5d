//! Static catalogue describing each mode to the view layer: labels, models,
//! and which generation settings the settings form should offer.

use serde::Serialize;

use crate::types::Mode;

#[derive(Debug, Clone, Serialize)]
pub struct ModeInfo {
    pub mode: Mode,
    pub label: &'static str,
    pub icon: &'static str,
    pub description: &'static str,
    pub models: &'static [&'static str],
    pub aspect_ratios: &'static [&'static str],
    pub image_sizes: &'static [&'static str],
    /// Resolution shown read-only in the settings form.
    pub fixed_resolution: Option<&'static str>,
}

const IMAGE_RATIOS: &[&str] = &["1:1", "16:9", "4:3", "3:4", "9:16", "21:9"];
const VIDEO_RATIOS: &[&str] = &["16:9", "9:16"];
const IMAGE_SIZES: &[&str] = &["1K", "2K", "4K"];

pub static MODE_CATALOGUE: &[ModeInfo] = &[
    ModeInfo {
        mode: Mode::Chat,
        label: "Chat & Analyze",
        icon: "✨",
        description: "Gemini Lite / Pro",
        models: &["gemini-flash-lite-latest", "gemini-3-pro-preview"],
        aspect_ratios: &[],
        image_sizes: &[],
        fixed_resolution: None,
    },
    ModeInfo {
        mode: Mode::ImageGen,
        label: "Generate Images",
        icon: "🎨",
        description: "Gemini 3 Pro Image",
        models: &["gemini-3-pro-image-preview"],
        aspect_ratios: IMAGE_RATIOS,
        image_sizes: IMAGE_SIZES,
        fixed_resolution: None,
    },
    ModeInfo {
        mode: Mode::VideoGen,
        label: "Generate Video",
        icon: "🎥",
        description: "Veo 3",
        models: &["veo-3.1-fast-generate-preview"],
        aspect_ratios: VIDEO_RATIOS,
        image_sizes: &[],
        fixed_resolution: Some("1080p"),
    },
    ModeInfo {
        mode: Mode::ImageEdit,
        label: "Edit Image",
        icon: "🪄",
        description: "Gemini 2.5 Flash",
        models: &["gemini-2.5-flash-image"],
        aspect_ratios: &[],
        image_sizes: &[],
        fixed_resolution: None,
    },
];

pub fn mode_info(mode: Mode) -> &'static ModeInfo {
    MODE_CATALOGUE
        .iter()
        .find(|info| info.mode == mode)
        .unwrap_or(&MODE_CATALOGUE[0])
}

impl ModeInfo {
    /// Whether the settings form has anything to show for this mode.
    pub fn has_settings(&self) -> bool {
        !self.aspect_ratios.is_empty() || !self.image_sizes.is_empty() || self.fixed_resolution.is_some()
    }

    /// Input hint; image editing asks for a picture first.
    pub fn placeholder(&self, has_attachment: bool) -> &'static str {
        if self.mode.requires_attachment() && !has_attachment {
            "Upload an image first..."
        } else {
            "Ask Chaitanya..."
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_mode_has_an_entry() {
        for mode in Mode::ALL {
            assert_eq!(mode_info(mode).mode, mode);
        }
    }

    #[test]
    fn settings_visibility_follows_mode() {
        assert!(!mode_info(Mode::Chat).has_settings());
        assert!(!mode_info(Mode::ImageEdit).has_settings());
        assert!(mode_info(Mode::ImageGen).has_settings());
        assert_eq!(mode_info(Mode::VideoGen).aspect_ratios, &["16:9", "9:16"]);
    }

    #[test]
    fn image_edit_prompts_for_upload() {
        let info = mode_info(Mode::ImageEdit);
        assert_eq!(info.placeholder(false), "Upload an image first...");
        assert_eq!(info.placeholder(true), "Ask Chaitanya...");
    }
}
