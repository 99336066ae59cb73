//! Picker view model: tabs, search box, result list and options.
//!
//! Pure state; the session controller feeds it keys and notifications and
//! asks it for a frame.

mod options;
mod render;
mod scroll;
mod text;

#[cfg(test)]
mod tests;

use crate::config::Settings;
use crate::input::{Key, KeyCode, KeyPress, Modifiers, CTRL_W};
use crate::loader::Item;
use crate::search;

pub use options::{OptionItem, OPTION_ITEMS};
pub use scroll::ScrollState;

/// Rows used by the title bar, search box, spacer and bottom bar.
const CHROME_ROWS: u16 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Items,
    Options,
    Help,
}

impl Tab {
    const ALL: [Tab; 3] = [Tab::Items, Tab::Options, Tab::Help];

    fn cycle(self, forward: bool) -> Tab {
        let index = Self::ALL.iter().position(|tab| *tab == self).unwrap_or(0);
        let len = Self::ALL.len();
        let next = if forward {
            (index + 1) % len
        } else {
            (index + len - 1) % len
        };
        Self::ALL[next]
    }
}

/// What the controller must do after a keypress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiAction {
    None,
    Chosen(Item),
    ClosedByEscape,
}

pub struct PickerUi {
    label: String,
    tab: Tab,
    search: String,
    items: Option<Vec<Item>>,
    filtered: Vec<usize>,
    processed: usize,
    ignored: usize,
    scroll: ScrollState,
    option_index: usize,
    settings: Settings,
    size: (u16, u16),
}

impl PickerUi {
    pub fn new(label: impl Into<String>, settings: Settings, size: (u16, u16)) -> Self {
        Self {
            label: label.into(),
            tab: Tab::Items,
            search: String::new(),
            items: None,
            filtered: Vec::new(),
            processed: 0,
            ignored: 0,
            scroll: ScrollState::new(list_height(size)),
            option_index: 0,
            settings,
            size,
        }
    }

    pub fn tab(&self) -> Tab {
        self.tab
    }

    pub fn search_text(&self) -> &str {
        &self.search
    }

    pub fn settings(&self) -> Settings {
        self.settings
    }

    pub fn is_loading(&self) -> bool {
        self.items.is_none()
    }

    pub fn progress(&self) -> (usize, usize) {
        (self.processed, self.ignored)
    }

    /// Number of items passing the current filter.
    pub fn match_count(&self) -> usize {
        self.filtered.len()
    }

    pub fn current_item(&self) -> Option<&Item> {
        let items = self.items.as_ref()?;
        let index = self.scroll.selected()?;
        self.filtered.get(index).and_then(|&i| items.get(i))
    }

    pub fn set_progress(&mut self, processed: usize, ignored: usize) {
        self.processed = processed;
        self.ignored = ignored;
    }

    pub fn set_items(&mut self, items: Vec<Item>) {
        self.items = Some(items);
        self.refilter();
    }

    pub fn clear_search(&mut self) {
        if !self.search.is_empty() {
            self.search.clear();
            self.refilter();
        }
    }

    pub fn resize(&mut self, size: (u16, u16)) {
        self.size = size;
        self.scroll.set_height(list_height(size));
    }

    pub fn on_key(&mut self, key: &KeyPress) -> UiAction {
        match key.key {
            Key::Code(KeyCode::Escape) => return UiAction::ClosedByEscape,
            Key::Code(KeyCode::Right) => self.tab = self.tab.cycle(true),
            Key::Code(KeyCode::Left) => self.tab = self.tab.cycle(false),
            _ => match self.tab {
                Tab::Items => return self.on_items_key(key),
                Tab::Options => self.on_options_key(key),
                Tab::Help => {}
            },
        }
        UiAction::None
    }

    fn on_items_key(&mut self, key: &KeyPress) -> UiAction {
        match key.key {
            Key::Char('\r') | Key::Char('\n') => {
                if let Some(item) = self.current_item() {
                    return UiAction::Chosen(item.clone());
                }
            }
            Key::Char('\t') | Key::Code(KeyCode::Down) => self.scroll.move_down(),
            Key::Code(KeyCode::Up) | Key::Code(KeyCode::BackTab) => self.scroll.move_up(),
            Key::Code(KeyCode::PageDown) => self.scroll.page_down(),
            Key::Code(KeyCode::PageUp) => self.scroll.page_up(),
            Key::Code(KeyCode::End) => self.scroll.end(),
            Key::Code(KeyCode::Home) => self.scroll.home(),
            _ => self.on_search_key(key),
        }
        UiAction::None
    }

    fn on_search_key(&mut self, key: &KeyPress) {
        let changed = match key.key {
            Key::Char(CTRL_W) => {
                delete_word(&mut self.search);
                true
            }
            Key::Code(KeyCode::Backspace) | Key::Char('\u{8}') => self.search.pop().is_some(),
            Key::Char(ch) if !ch.is_control() && plain(key.modifiers) => {
                self.search.push(ch);
                true
            }
            _ => false,
        };
        if changed {
            self.refilter();
        }
    }

    fn on_options_key(&mut self, key: &KeyPress) {
        let count = OPTION_ITEMS.len();
        let delta = match key.key {
            Key::Char('j') | Key::Char('\t') | Key::Code(KeyCode::Down) => {
                self.option_index = (self.option_index + 1) % count;
                return;
            }
            Key::Char('k') | Key::Code(KeyCode::Up) | Key::Code(KeyCode::BackTab) => {
                self.option_index = (self.option_index + count - 1) % count;
                return;
            }
            Key::Char('h') | Key::Char('[') => -1,
            Key::Char('l') | Key::Char(']') | Key::Char('\r') | Key::Char(' ') => 1,
            _ => return,
        };
        let item = OPTION_ITEMS[self.option_index];
        if item.adjust(&mut self.settings, delta) {
            self.refilter();
        }
    }

    fn refilter(&mut self) {
        self.filtered = match &self.items {
            Some(items) => search::filter(items, &self.search, self.settings.fuzzy_search_mode),
            None => Vec::new(),
        };
        self.scroll.set_total(self.filtered.len());
    }
}

fn plain(modifiers: Modifiers) -> bool {
    !modifiers.contains(Modifiers::ALT) && !modifiers.contains(Modifiers::CTRL)
}

fn list_height(size: (u16, u16)) -> usize {
    usize::from(size.1.saturating_sub(CHROME_ROWS))
}

/// Bash-style Ctrl-W: drop trailing spaces, then the last word.
fn delete_word(text: &mut String) {
    let trimmed = text.trim_end().len();
    text.truncate(trimmed);
    match text.rfind(' ') {
        Some(sep) => text.truncate(sep + 1),
        None => text.clear(),
    }
}
