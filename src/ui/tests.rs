use super::*;
use crate::config::{FastSwitchSearch, FuzzySearchMode};

fn key(ch: char) -> KeyPress {
    KeyPress::char(ch)
}

fn code(code: KeyCode) -> KeyPress {
    KeyPress::code(code)
}

fn type_text(ui: &mut PickerUi, text: &str) {
    for ch in text.chars() {
        assert_eq!(ui.on_key(&key(ch)), UiAction::None);
    }
}

fn loaded(paths: &[&str]) -> PickerUi {
    let mut ui = PickerUi::new("Files", Settings::default(), (80, 10));
    ui.set_items(
        paths
            .iter()
            .map(|path| Item::scanned("/work/", path.to_string()))
            .collect(),
    );
    ui
}

fn frame(ui: &PickerUi) -> String {
    let mut out = Vec::new();
    ui.render(&mut out, 1).unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn typing_filters_and_enter_chooses() {
    let mut ui = loaded(&["src/main.rs", "src/lib.rs", "README.md"]);
    assert_eq!(ui.match_count(), 3);
    type_text(&mut ui, "lib");
    assert_eq!(ui.search_text(), "lib");
    assert_eq!(ui.match_count(), 1);
    match ui.on_key(&key('\r')) {
        UiAction::Chosen(item) => assert_eq!(item.choice(), "/work/src/lib.rs"),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn enter_with_no_match_does_nothing() {
    let mut ui = loaded(&["a.txt"]);
    type_text(&mut ui, "zzz");
    assert_eq!(ui.on_key(&key('\r')), UiAction::None);
}

#[test]
fn backspace_and_ctrl_w_edit_the_search() {
    let mut ui = loaded(&["a"]);
    type_text(&mut ui, "foo bar  ");
    ui.on_key(&key(CTRL_W));
    assert_eq!(ui.search_text(), "foo ");
    ui.on_key(&code(KeyCode::Backspace));
    ui.on_key(&key('\u{8}'));
    assert_eq!(ui.search_text(), "fo");
    ui.on_key(&key(CTRL_W));
    assert_eq!(ui.search_text(), "");
}

#[test]
fn alt_chords_and_controls_are_not_typed() {
    let mut ui = loaded(&["a"]);
    ui.on_key(&key('x').with_modifiers(Modifiers::ALT));
    ui.on_key(&key('\u{1}'));
    assert_eq!(ui.search_text(), "");
}

#[test]
fn navigation_moves_the_selection_with_wrap() {
    let mut ui = loaded(&["one", "two", "three"]);
    ui.on_key(&key('\t'));
    assert_eq!(ui.current_item().unwrap().search_text(), "two");
    ui.on_key(&code(KeyCode::BackTab));
    ui.on_key(&code(KeyCode::Up));
    assert_eq!(ui.current_item().unwrap().search_text(), "three");
    ui.on_key(&code(KeyCode::Down));
    assert_eq!(ui.current_item().unwrap().search_text(), "one");
}

#[test]
fn escape_closes_from_any_tab() {
    let mut ui = loaded(&["a"]);
    ui.on_key(&code(KeyCode::Right));
    assert_eq!(ui.tab(), Tab::Options);
    assert_eq!(ui.on_key(&code(KeyCode::Escape)), UiAction::ClosedByEscape);
}

#[test]
fn left_and_right_cycle_tabs() {
    let mut ui = loaded(&["a"]);
    ui.on_key(&code(KeyCode::Left));
    assert_eq!(ui.tab(), Tab::Help);
    ui.on_key(&code(KeyCode::Right));
    assert_eq!(ui.tab(), Tab::Items);
    ui.on_key(&code(KeyCode::Right));
    ui.on_key(&code(KeyCode::Right));
    assert_eq!(ui.tab(), Tab::Help);
    type_text(&mut ui, "abc");
    assert_eq!(ui.search_text(), "");
}

#[test]
fn changing_search_mode_refilters() {
    let mut ui = loaded(&["b/a", "a/b"]);
    type_text(&mut ui, "b a");
    assert_eq!(ui.match_count(), 1);
    ui.on_key(&code(KeyCode::Right));
    ui.on_key(&key('l'));
    assert_eq!(ui.settings().fuzzy_search_mode, FuzzySearchMode::WordUnordered);
    assert_eq!(ui.match_count(), 2);
}

#[test]
fn options_navigation_wraps_and_adjusts_selected_item() {
    let mut ui = loaded(&["a"]);
    ui.on_key(&code(KeyCode::Right));
    ui.on_key(&key('j'));
    ui.on_key(&key('j'));
    ui.on_key(&key(' '));
    assert_eq!(ui.settings().fast_switch_search, FastSwitchSearch::Clear);
    ui.on_key(&key('k'));
    ui.on_key(&key('k'));
    ui.on_key(&key('k'));
    ui.on_key(&key('h'));
    assert_eq!(ui.settings().selection_bg.b, 239);
}

#[test]
fn clear_search_restores_all_matches() {
    let mut ui = loaded(&["alpha", "beta"]);
    type_text(&mut ui, "alp");
    assert_eq!(ui.match_count(), 1);
    ui.clear_search();
    assert_eq!(ui.search_text(), "");
    assert_eq!(ui.match_count(), 2);
}

#[test]
fn loading_frame_shows_counters() {
    let mut ui = PickerUi::new("Files", Settings::default(), (80, 10));
    assert!(ui.is_loading());
    ui.set_progress(1200, 7);
    assert_eq!(ui.progress(), (1200, 7));
    let text = frame(&ui);
    assert!(text.contains("\\ Looking for files..."));
    assert!(text.contains("Found:   1200"));
    assert!(text.contains("Ignored: 7"));
    assert!(text.contains(" loading "));
}

#[test]
fn loaded_frame_lists_items_and_counts() {
    let ui = loaded(&["src/main.rs", "README.md"]);
    let text = frame(&ui);
    assert!(text.contains("src | main.rs"));
    assert!(text.contains("README.md"));
    assert!(text.contains(" 2 of 2 "));
    assert!(text.contains(" Files "));
}

#[test]
fn items_past_the_viewport_are_not_drawn() {
    let paths: Vec<String> = (0..30).map(|i| format!("file{i:02}")).collect();
    let refs: Vec<&str> = paths.iter().map(String::as_str).collect();
    let mut ui = loaded(&refs);
    let text = frame(&ui);
    assert!(text.contains("file05"));
    assert!(!text.contains("file06"));
    ui.resize((80, 20));
    assert!(frame(&ui).contains("file15"));
}

#[test]
fn tiny_terminal_renders_nothing() {
    let ui = PickerUi::new("Files", Settings::default(), (0, 0));
    let mut out = Vec::new();
    ui.render(&mut out, 0).unwrap();
    assert!(out.is_empty());
}
