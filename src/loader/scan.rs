use super::ignore::IgnoreRules;
use super::item::Item;
use crate::event::{EventSender, Notification};
use crate::log_info;
use std::collections::VecDeque;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const FILES_PROGRESS: usize = 1000;
const DIRS_PROGRESS: usize = 100;

/// Breadth-first walk below one root.
pub struct DirectoryScanner<'a> {
    /// Absolute root, ending in `/`.
    root: String,
    gitignores: bool,
    notes: &'a EventSender<Notification>,
    files: usize,
    dirs: usize,
    ignored: usize,
}

impl<'a> DirectoryScanner<'a> {
    pub fn new(root: &Path, gitignores: bool, notes: &'a EventSender<Notification>) -> io::Result<Self> {
        let mut root = absolute_dir(root)?.to_string_lossy().into_owned();
        if !root.ends_with('/') {
            root.push('/');
        }
        Ok(Self {
            root,
            gitignores,
            notes,
            files: 0,
            dirs: 0,
            ignored: 0,
        })
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    /// Rules in effect at the root: global rules, then `.gitignore` files
    /// from the filesystem root down to the scan root.
    pub fn root_rules(&self, global: IgnoreRules) -> Arc<IgnoreRules> {
        let mut rules = Arc::new(global);
        if !self.gitignores {
            return rules;
        }
        let mut dirs: Vec<&Path> = Path::new(&self.root).ancestors().collect();
        dirs.reverse();
        for dir in dirs {
            let file = dir.join(".gitignore");
            if let Ok(text) = fs::read_to_string(&file) {
                log_info(&format!("using ignore rules from {}", file.display()));
                let mut base = dir.to_string_lossy().into_owned();
                if !base.ends_with('/') {
                    base.push('/');
                }
                rules = Arc::new(IgnoreRules::child(&rules, &text, &base));
            }
        }
        rules
    }

    /// Walk the tree. Only failure to list the root itself is an error.
    pub fn scan(&mut self, rules: Arc<IgnoreRules>) -> io::Result<Vec<Item>> {
        log_info(&format!("scanning {}", self.root));
        let mut items = Vec::new();
        let mut queue = VecDeque::from([(self.root.clone(), rules)]);

        while let Some((dir, inherited)) = queue.pop_front() {
            let rules = self.rules_for(&dir, inherited);
            let entries = match fs::read_dir(&dir) {
                Ok(entries) => entries,
                Err(err) if dir == self.root => return Err(err),
                Err(err) => {
                    log_info(&format!("skipping {dir}: {err}"));
                    continue;
                }
            };

            let mut files = Vec::new();
            let mut subdirs = Vec::new();
            for entry in entries {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(err) => {
                        log_info(&format!("skipping entry in {dir}: {err}"));
                        continue;
                    }
                };
                let name = entry.file_name().to_string_lossy().into_owned();
                let Ok(file_type) = entry.file_type() else {
                    continue;
                };
                if file_type.is_dir() {
                    subdirs.push((name, false));
                } else if file_type.is_symlink()
                    && fs::metadata(entry.path()).is_ok_and(|meta| meta.is_dir())
                {
                    subdirs.push((name, true));
                } else {
                    files.push(name);
                }
            }
            files.sort();
            subdirs.sort();

            for name in files {
                let path = format!("{dir}{name}");
                if rules.is_ignored(&path, false) {
                    self.ignored += 1;
                    continue;
                }
                items.push(Item::scanned(&self.root, path[self.root.len()..].to_string()));
                self.files += 1;
                if self.files % FILES_PROGRESS == 0 {
                    self.progress();
                }
            }

            for (name, is_link) in subdirs {
                let path = format!("{dir}{name}/");
                if rules.is_ignored(&path, true) {
                    self.ignored += 1;
                    continue;
                }
                if is_link {
                    log_info(&format!("not following symlink {path}"));
                    continue;
                }
                queue.push_back((path, Arc::clone(&rules)));
                self.dirs += 1;
                if self.dirs % DIRS_PROGRESS == 0 {
                    self.progress();
                }
            }
        }

        log_info(&format!(
            "scan done files={} dirs={} ignored={}",
            self.files, self.dirs, self.ignored
        ));
        Ok(items)
    }

    fn rules_for(&self, dir: &str, inherited: Arc<IgnoreRules>) -> Arc<IgnoreRules> {
        if !self.gitignores || dir == self.root {
            return inherited;
        }
        match fs::read_to_string(format!("{dir}.gitignore")) {
            Ok(text) => Arc::new(IgnoreRules::child(&inherited, &text, dir)),
            Err(_) => inherited,
        }
    }

    fn progress(&self) {
        self.notes.send(Notification::Progress {
            processed: self.files + self.dirs,
            ignored: self.ignored,
        });
    }
}

/// Absolute form of `path` without touching symlinks.
fn absolute_dir(path: &Path) -> io::Result<PathBuf> {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };
    Ok(joined.components().collect())
}
