//! ``src/model/file_types.rs``
//! ============================================================================
//! # `FileTypeRegistry`: extension and modifier associations
//!
//! Maps lowercased file extensions and keyboard-modifier combinations to a
//! [`FileTypeRule`]. Rules live in an arena of `Arc`s; directory entries keep
//! a clone of the `Arc`, so a reload can swap in a whole new registry without
//! invalidating listings that are still on screen.

use ahash::AHashMap;
use compact_str::CompactString;
use serde::Serialize;
use std::{fmt, sync::Arc};

/// Keyboard modifier state at activation time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Modifiers {
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        ctrl: false,
        shift: false,
        alt: false,
    };

    #[must_use]
    pub const fn is_empty(self) -> bool {
        !(self.ctrl || self.shift || self.alt)
    }

    /// Parses a pseudo-key such as `:ctrl` or `:shift:alt`.
    /// Returns `None` for unknown parts or an empty combination.
    #[must_use]
    pub fn parse_pseudo_key(token: &str) -> Option<Self> {
        let mut mods = Self::NONE;
        for part in token.split(':').filter(|p| !p.is_empty()) {
            match part.to_ascii_lowercase().as_str() {
                "ctrl" | "control" => mods.ctrl = true,
                "shift" => mods.shift = true,
                "alt" => mods.alt = true,
                _ => return None,
            }
        }
        (!mods.is_empty()).then_some(mods)
    }
}

impl fmt::Display for Modifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ctrl {
            write!(f, ":ctrl")?;
        }
        if self.shift {
            write!(f, ":shift")?;
        }
        if self.alt {
            write!(f, ":alt")?;
        }
        Ok(())
    }
}

/// Registry lookup key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "String")]
pub enum LookupKey {
    Extension(CompactString),
    ModifierCombo(Modifiers),
}

impl From<LookupKey> for String {
    fn from(key: LookupKey) -> Self {
        match key {
            LookupKey::Extension(ext) => ext.into_string(),
            LookupKey::ModifierCombo(mods) => mods.to_string(),
        }
    }
}

impl LookupKey {
    /// Parses one key token from an `[actions]` line. A leading `:` makes it a
    /// modifier combination; otherwise it is an extension (leading dot optional).
    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        if token.starts_with(':') {
            return Modifiers::parse_pseudo_key(token).map(Self::ModifierCombo);
        }
        let ext = token.trim_start_matches('.');
        (!ext.is_empty()).then(|| Self::Extension(CompactString::new(ext.to_lowercase())))
    }
}

/// How to handle one kind of file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileTypeRule {
    /// Glyph shown in front of matching files.
    pub prefix: char,
    /// Tool name handed to the resolver. Empty means "no action".
    pub command: String,
    /// Argument template; `$` is the target path, `&` the tool's directory.
    pub args: String,
}

impl FileTypeRule {
    #[must_use]
    pub const fn has_action(&self) -> bool {
        !self.command.is_empty()
    }

    /// Parses the value side of an `[actions]` line:
    /// `['X'] command [args...]`, where `command` may be double-quoted.
    /// Environment references (`%VAR%`) are expanded after the prefix is taken.
    pub fn parse<F>(value: &str, env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut prefix = ' ';
        let mut rest = value.trim_start();

        let mut chars = rest.chars();
        if let (Some('\''), Some(glyph), Some('\'')) = (chars.next(), chars.next(), chars.next()) {
            prefix = glyph;
            rest = chars.as_str().trim_start();
        }

        let expanded = expand_env(rest, env);
        let rest = expanded.as_str();

        let (command, tail) = match rest.strip_prefix('"') {
            Some(quoted) => match quoted.find('"') {
                Some(end) => (&quoted[..end], &quoted[end + 1..]),
                None => (quoted, ""),
            },
            None => match rest.find(char::is_whitespace) {
                Some(end) => (&rest[..end], &rest[end + 1..]),
                None => (rest, ""),
            },
        };

        let mut args = tail.trim_start().to_string();
        if !command.is_empty() && !args.contains('$') {
            args.push_str(" \"$\"");
            args = args.trim_start().to_string();
        }

        Self {
            prefix,
            command: command.to_string(),
            args,
        }
    }

    /// Splits the template into arguments and fills in the placeholders.
    #[must_use]
    pub fn build_arguments(&self, target: &str, command_dir: &str) -> Vec<String> {
        split_command_line(&self.args)
            .into_iter()
            .map(|arg| substitute(&arg, target, command_dir))
            .collect()
    }
}

/// Owns every rule of the current settings generation.
#[derive(Debug, Default, Clone)]
pub struct FileTypeRegistry {
    rules: Vec<Arc<FileTypeRule>>,
    by_key: AHashMap<LookupKey, usize>,
}

impl FileTypeRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a rule and points every key at it. Later keys override earlier ones.
    pub fn insert<I>(&mut self, keys: I, rule: FileTypeRule) -> usize
    where
        I: IntoIterator<Item = LookupKey>,
    {
        let id = self.rules.len();
        self.rules.push(Arc::new(rule));
        for key in keys {
            self.by_key.insert(key, id);
        }
        id
    }

    #[must_use]
    pub fn lookup(&self, key: &LookupKey) -> Option<&Arc<FileTypeRule>> {
        self.by_key.get(key).map(|&id| &self.rules[id])
    }

    #[must_use]
    pub fn for_extension(&self, ext: &str) -> Option<&Arc<FileTypeRule>> {
        if ext.is_empty() {
            return None;
        }
        self.lookup(&LookupKey::Extension(CompactString::new(ext)))
    }

    #[must_use]
    pub fn for_modifiers(&self, mods: Modifiers) -> Option<&Arc<FileTypeRule>> {
        if mods.is_empty() {
            return None;
        }
        self.lookup(&LookupKey::ModifierCombo(mods))
    }

    #[must_use]
    pub fn rules(&self) -> &[Arc<FileTypeRule>] {
        &self.rules
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Replaces `%VAR%` references. Undefined variables expand to nothing; a lone
/// `%` without a partner is kept literally.
pub fn expand_env<F>(input: &str, env: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(open) = rest.find('%') {
        let after = &rest[open + 1..];
        let Some(close) = after.find('%') else {
            break;
        };
        out.push_str(&rest[..open]);
        out.push_str(&env(&after[..close]).unwrap_or_default());
        rest = &after[close + 1..];
    }
    out.push_str(rest);
    out
}

/// Whitespace-separated words; double quotes group words and are removed.
/// An empty quoted string yields an empty argument.
#[must_use]
pub fn split_command_line(line: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut part = String::new();
    let mut in_quote = false;
    let mut valid = false;

    for c in line.chars() {
        if c == '"' {
            in_quote = !in_quote;
            valid = true;
        } else if in_quote || !c.is_whitespace() {
            part.push(c);
            valid = true;
        } else if valid {
            out.push(std::mem::take(&mut part));
            valid = false;
        }
    }
    if valid {
        out.push(part);
    }
    out
}

// Single pass, so a `$` or `&` inside the substituted text is left alone.
fn substitute(arg: &str, target: &str, command_dir: &str) -> String {
    let mut out = String::with_capacity(arg.len() + target.len());
    for c in arg.chars() {
        match c {
            '$' => out.push_str(target),
            '&' => out.push_str(command_dir),
            _ => out.push(c),
        }
    }
    out
}
