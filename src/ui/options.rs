//! Options tab schema so rendering and key handling share one list.

use crate::config::{Rgb, Settings};

const COLOR_STEP: i16 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    R,
    G,
    B,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionItem {
    SearchMode,
    LaunchMode,
    FastSwitch,
    SelectionFg(Channel),
    SelectionBg(Channel),
}

pub const OPTION_ITEMS: &[OptionItem] = &[
    OptionItem::SearchMode,
    OptionItem::LaunchMode,
    OptionItem::FastSwitch,
    OptionItem::SelectionFg(Channel::R),
    OptionItem::SelectionFg(Channel::G),
    OptionItem::SelectionFg(Channel::B),
    OptionItem::SelectionBg(Channel::R),
    OptionItem::SelectionBg(Channel::G),
    OptionItem::SelectionBg(Channel::B),
];

impl OptionItem {
    /// Apply one step; returns true when the search mode changed.
    pub fn adjust(self, settings: &mut Settings, delta: i16) -> bool {
        match self {
            OptionItem::SearchMode => {
                settings.fuzzy_search_mode = settings.fuzzy_search_mode.toggled();
                return true;
            }
            OptionItem::LaunchMode => {
                settings.editor_launch_mode = settings.editor_launch_mode.toggled();
            }
            OptionItem::FastSwitch => {
                settings.fast_switch_search = settings.fast_switch_search.toggled();
            }
            OptionItem::SelectionFg(channel) => adjust_channel(&mut settings.selection_fg, channel, delta),
            OptionItem::SelectionBg(channel) => adjust_channel(&mut settings.selection_bg, channel, delta),
        }
        false
    }
}

fn adjust_channel(color: &mut Rgb, channel: Channel, delta: i16) {
    let value = match channel {
        Channel::R => &mut color.r,
        Channel::G => &mut color.g,
        Channel::B => &mut color.b,
    };
    *value = (i16::from(*value) + delta * COLOR_STEP).clamp(0, 255) as u8;
}

pub fn channel_value(color: Rgb, channel: Channel) -> u8 {
    match channel {
        Channel::R => color.r,
        Channel::G => color.g,
        Channel::B => color.b,
    }
}

pub fn channel_label(channel: Channel) -> &'static str {
    match channel {
        Channel::R => "R",
        Channel::G => "G",
        Channel::B => "B",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EditorLaunchMode, FuzzySearchMode};

    #[test]
    fn toggles_report_search_mode_changes_only() {
        let mut settings = Settings::default();
        assert!(OptionItem::SearchMode.adjust(&mut settings, 1));
        assert_eq!(settings.fuzzy_search_mode, FuzzySearchMode::WordUnordered);
        assert!(!OptionItem::LaunchMode.adjust(&mut settings, -1));
        assert_eq!(settings.editor_launch_mode, EditorLaunchMode::Replace);
    }

    #[test]
    fn color_channels_step_and_clamp() {
        let mut settings = Settings::default();
        OptionItem::SelectionFg(Channel::R).adjust(&mut settings, -1);
        assert_eq!(settings.selection_fg.r, 0);
        OptionItem::SelectionBg(Channel::B).adjust(&mut settings, 1);
        assert_eq!(settings.selection_bg.b, 255);
        OptionItem::SelectionBg(Channel::G).adjust(&mut settings, -1);
        assert_eq!(settings.selection_bg.g, 226);
    }
}
