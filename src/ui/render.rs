//! Frame rendering so view state maps to one buffered terminal write.

use super::options::{channel_label, channel_value, OptionItem, OPTION_ITEMS};
use super::text::{display_width, sanitize, truncate_display};
use super::{PickerUi, Tab};
use crate::config::{EditorLaunchMode, FastSwitchSearch, FuzzySearchMode, Rgb};
use crate::VERSION;
use crossterm::{
    cursor::{Hide, MoveTo, Show},
    queue,
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor},
    terminal::{Clear, ClearType},
};
use std::io;

const SPINNER: [&str; 4] = ["-", "\\", "|", "/"];
const SEARCH_LABEL: &str = "  Search: ";
const SEARCH_BOX_WIDTH: usize = 25;

const HELP_LINES: &[&str] = &[
    "",
    "  --- Keys ---------------------------------------------",
    "  Escape                     cancel / quit",
    "  Enter                      activate selected item",
    "",
    "  Left/Right                 change tab",
    "  Up/Down/Tab/ShiftTab       change selected item",
    "  PageUp/PageDown/Home/End   scroll",
    "",
    "  Ctrl-w                     delete previous word (in search box)",
    "",
    "  --- Notes --------------------------------------------",
    "  * .gitignore files are checked at every level",
    "  * $VILARK_IGNORE_FILE holds additional ignore patterns",
    "    (Default: ~/.config/vilark/ignore_rules.txt)",
];

fn color(rgb: Rgb) -> Color {
    Color::Rgb {
        r: rgb.r,
        g: rgb.g,
        b: rgb.b,
    }
}

fn plain_row(out: &mut Vec<u8>, y: u16, text: &str, width: usize) -> io::Result<()> {
    queue!(
        out,
        MoveTo(0, y),
        Print(truncate_display(text, width)),
        Clear(ClearType::UntilNewLine)
    )
}

impl PickerUi {
    /// Queue one complete frame into `out`. `spinner` advances the loading
    /// animation.
    pub fn render(&self, out: &mut Vec<u8>, spinner: usize) -> io::Result<()> {
        let (cols, rows) = self.size;
        if rows == 0 || cols == 0 {
            return Ok(());
        }
        let width = usize::from(cols);
        queue!(out, Hide)?;
        self.render_title(out, width)?;

        let body_top = 1u16;
        let body_rows = rows.saturating_sub(2);
        let cursor = match self.tab {
            Tab::Items => Some(self.render_items(out, body_top, body_rows, width, spinner)?),
            Tab::Options => {
                self.render_options(out, body_top, body_rows, width)?;
                None
            }
            Tab::Help => {
                render_help(out, body_top, body_rows, width)?;
                None
            }
        };

        if rows > 1 {
            self.render_bottom(out, rows - 1, width)?;
        }
        if let Some((x, y)) = cursor {
            queue!(out, MoveTo(x, y), Show)?;
        }
        Ok(())
    }

    fn render_title(&self, out: &mut Vec<u8>, width: usize) -> io::Result<()> {
        queue!(out, MoveTo(0, 0), Clear(ClearType::CurrentLine))?;
        let mut used = 0;
        for tab in Tab::ALL {
            let name = match tab {
                Tab::Items => self.label.as_str(),
                Tab::Options => "Options",
                Tab::Help => "Help",
            };
            let cell = format!(" {name} ");
            let cell = truncate_display(&cell, width.saturating_sub(used));
            used += display_width(&cell);
            if tab == self.tab {
                queue!(
                    out,
                    SetAttribute(Attribute::Reverse),
                    Print(&cell),
                    SetAttribute(Attribute::Reset)
                )?;
            } else {
                queue!(out, Print(&cell))?;
            }
            if used < width {
                queue!(out, Print(" "))?;
                used += 1;
            }
        }
        Ok(())
    }

    /// Returns where the text cursor belongs (end of the search text).
    fn render_items(
        &self,
        out: &mut Vec<u8>,
        top: u16,
        rows: u16,
        width: usize,
        spinner: usize,
    ) -> io::Result<(u16, u16)> {
        if rows == 0 {
            return Ok((0, top));
        }
        let shown = truncate_display(&sanitize(&self.search), SEARCH_BOX_WIDTH);
        let pad = SEARCH_BOX_WIDTH.saturating_sub(display_width(&shown));
        queue!(
            out,
            MoveTo(0, top),
            Print(truncate_display(SEARCH_LABEL, width)),
            SetAttribute(Attribute::Underlined),
            Print(&shown),
            Print(" ".repeat(pad)),
            SetAttribute(Attribute::NoUnderline),
            Clear(ClearType::UntilNewLine)
        )?;
        let cursor_x = (display_width(SEARCH_LABEL) + display_width(&shown)).min(width.saturating_sub(1));
        let cursor = (cursor_x as u16, top);

        if rows > 1 {
            plain_row(out, top + 1, "", width)?;
        }
        let list_top = top + 2;
        let list_rows = rows.saturating_sub(2);

        let Some(items) = &self.items else {
            let lines = [
                format!("  {} Looking for files...", SPINNER[spinner % SPINNER.len()]),
                format!("  Found:   {}", self.processed),
                format!("  Ignored: {}", self.ignored),
            ];
            for row in 0..list_rows {
                let text = lines.get(usize::from(row)).map(String::as_str).unwrap_or("");
                plain_row(out, list_top + row, text, width)?;
            }
            return Ok(cursor);
        };

        let visible = self.scroll.visible();
        let selected_row = self.scroll.cursor_row();
        let text_width = width.saturating_sub(3);
        for row in 0..list_rows {
            let y = list_top + row;
            let row = usize::from(row);
            let position = visible.start + row;
            let Some(&index) = self.filtered.get(position).filter(|_| position < visible.end) else {
                plain_row(out, y, "", width)?;
                continue;
            };
            let text = truncate_display(&sanitize(items[index].display_text()), text_width);
            if row == selected_row {
                let pad = text_width.saturating_sub(display_width(&text));
                queue!(
                    out,
                    MoveTo(0, y),
                    Print(" "),
                    SetForegroundColor(color(self.settings.selection_fg)),
                    SetBackgroundColor(color(self.settings.selection_bg)),
                    Print(" "),
                    Print(&text),
                    Print(" ".repeat(pad)),
                    ResetColor,
                    Clear(ClearType::UntilNewLine)
                )?;
            } else {
                plain_row(out, y, &format!("  {text}"), width)?;
            }
        }
        Ok(cursor)
    }

    fn render_options(&self, out: &mut Vec<u8>, top: u16, rows: u16, width: usize) -> io::Result<()> {
        let settings = &self.settings;
        let mut lines: Vec<(String, bool)> = Vec::new();
        for (index, item) in OPTION_ITEMS.iter().enumerate() {
            let selected = index == self.option_index;
            match item {
                OptionItem::SearchMode => {
                    lines.push(("  When multiple search words are used:".into(), false));
                    let label = match settings.fuzzy_search_mode {
                        FuzzySearchMode::WordOrdered => "Match exact order",
                        FuzzySearchMode::WordUnordered => "Match any order",
                    };
                    lines.push((selector(label, selected), selected));
                }
                OptionItem::LaunchMode => {
                    lines.push(("  How to start the $EDITOR process:".into(), false));
                    let label = match settings.editor_launch_mode {
                        EditorLaunchMode::Replace => "Replace current process",
                        EditorLaunchMode::Child => "Start a child process",
                    };
                    lines.push((selector(label, selected), selected));
                }
                OptionItem::FastSwitch => {
                    lines.push(("  When fast switching from the editor:".into(), false));
                    let label = match settings.fast_switch_search {
                        FastSwitchSearch::Clear => "Clear the search box text",
                        FastSwitchSearch::Preserve => "Preserve the search box text",
                    };
                    lines.push((selector(label, selected), selected));
                }
                OptionItem::SelectionFg(channel) => {
                    if !matches!(previous(index), Some(OptionItem::SelectionFg(_))) {
                        lines.push(("  Selection color (foreground)".into(), false));
                    }
                    lines.push((slider(channel_label(*channel), channel_value(settings.selection_fg, *channel), selected), selected));
                }
                OptionItem::SelectionBg(channel) => {
                    if !matches!(previous(index), Some(OptionItem::SelectionBg(_))) {
                        lines.push(("  Selection color (background)".into(), false));
                    }
                    lines.push((slider(channel_label(*channel), channel_value(settings.selection_bg, *channel), selected), selected));
                }
            }
        }
        lines.push((String::new(), false));
        lines.push(("  ~~ j/k select, h/l adjust ~~".into(), false));

        for row in 0..rows {
            let y = top + row;
            match lines.get(usize::from(row)) {
                Some((text, true)) => queue!(
                    out,
                    MoveTo(0, y),
                    SetForegroundColor(color(settings.selection_fg)),
                    SetBackgroundColor(color(settings.selection_bg)),
                    Print(truncate_display(text, width)),
                    ResetColor,
                    Clear(ClearType::UntilNewLine)
                )?,
                Some((text, false)) => plain_row(out, y, text, width)?,
                None => plain_row(out, y, "", width)?,
            }
        }
        Ok(())
    }

    fn render_bottom(&self, out: &mut Vec<u8>, y: u16, width: usize) -> io::Result<()> {
        let status = match (self.tab, &self.items) {
            (Tab::Items, Some(items)) => format!(" {} of {} ", self.filtered.len(), items.len()),
            (Tab::Items, None) => " loading ".to_string(),
            (Tab::Options, _) => " settings are saved on exit ".to_string(),
            (Tab::Help, _) => format!(" vilark {VERSION} "),
        };
        queue!(
            out,
            MoveTo(0, y),
            SetAttribute(Attribute::Reverse),
            Print(truncate_display(&status, width)),
            SetAttribute(Attribute::Reset),
            Clear(ClearType::UntilNewLine)
        )
    }
}

fn render_help(out: &mut Vec<u8>, top: u16, rows: u16, width: usize) -> io::Result<()> {
    let title = format!("  vilark {VERSION}");
    for row in 0..rows {
        let text = match usize::from(row) {
            0 => title.as_str(),
            n => HELP_LINES.get(n - 1).copied().unwrap_or(""),
        };
        plain_row(out, top + row, text, width)?;
    }
    Ok(())
}

fn previous(index: usize) -> Option<&'static OptionItem> {
    index.checked_sub(1).and_then(|prev| OPTION_ITEMS.get(prev))
}

fn selector(label: &str, selected: bool) -> String {
    if selected {
        format!("      [ {label} ]")
    } else {
        format!("        {label}  ")
    }
}

fn slider(label: &str, value: u8, selected: bool) -> String {
    let filled = usize::from(value) * 10 / 255;
    let bar = format!("{:<10}", "=".repeat(filled));
    if selected {
        format!("      [ {label} {value:>3} ] [{bar}]")
    } else {
        format!("        {label} {value:>3}   [{bar}]")
    }
}
