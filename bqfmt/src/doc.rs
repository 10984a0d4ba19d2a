//! Layout documents and their width-aware renderer.
//!
//! A [`Doc`] describes text together with the places where it may be broken. The
//! renderer prints every [`Doc::Group`] on one line when it fits into the remaining
//! width and breaks all of its direct [`LineKind::Normal`]/[`LineKind::Soft`] lines
//! otherwise. Hard lines always break and force every enclosing group to break too.

use itertools::Itertools;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// A space when flat.
    Normal,
    /// Nothing when flat.
    Soft,
    /// Always a newline.
    Hard,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Doc {
    Nil,
    Text(String),
    Concat(Vec<Doc>),
    Indent(Box<Doc>),
    Group { contents: Box<Doc>, should_break: bool },
    Line(LineKind),
    /// Printed right before the next newline, e.g. a `-- comment` after a token. A group
    /// only stays flat if its next line break is a real newline.
    LineSuffix(Box<Doc>),
    /// Remembers the current indentation as the root for [`Doc::DedentToRoot`].
    MarkAsRoot(Box<Doc>),
    DedentToRoot(Box<Doc>),
}

impl From<&str> for Doc {
    fn from(s: &str) -> Self {
        text(s)
    }
}

impl From<String> for Doc {
    fn from(s: String) -> Self {
        text(s)
    }
}

impl FromIterator<Doc> for Doc {
    fn from_iter<I: IntoIterator<Item = Doc>>(iter: I) -> Self {
        concat(iter.into_iter().collect())
    }
}

impl Doc {
    pub fn is_nil(&self) -> bool {
        match self {
            Doc::Nil => true,
            Doc::Text(s) => s.is_empty(),
            Doc::Concat(docs) => docs.iter().all(Doc::is_nil),
            _ => false,
        }
    }
}

pub fn nil() -> Doc {
    Doc::Nil
}

pub fn text(s: impl Into<String>) -> Doc {
    Doc::Text(s.into())
}

pub fn concat(docs: Vec<Doc>) -> Doc {
    Doc::Concat(docs)
}

pub fn indent(doc: impl Into<Doc>) -> Doc {
    Doc::Indent(Box::new(doc.into()))
}

pub fn group(doc: impl Into<Doc>) -> Doc {
    Doc::Group {
        contents: Box::new(doc.into()),
        should_break: false,
    }
}

/// A group that is printed broken regardless of the width.
pub fn broken_group(doc: impl Into<Doc>) -> Doc {
    Doc::Group {
        contents: Box::new(doc.into()),
        should_break: true,
    }
}

pub fn line() -> Doc {
    Doc::Line(LineKind::Normal)
}

pub fn softline() -> Doc {
    Doc::Line(LineKind::Soft)
}

pub fn hardline() -> Doc {
    Doc::Line(LineKind::Hard)
}

pub fn line_suffix(doc: impl Into<Doc>) -> Doc {
    Doc::LineSuffix(Box::new(doc.into()))
}

pub fn mark_as_root(doc: impl Into<Doc>) -> Doc {
    Doc::MarkAsRoot(Box::new(doc.into()))
}

pub fn dedent_to_root(doc: impl Into<Doc>) -> Doc {
    Doc::DedentToRoot(Box::new(doc.into()))
}

pub fn join(separator: Doc, docs: impl IntoIterator<Item = Doc>) -> Doc {
    concat(Itertools::intersperse(docs.into_iter(), separator).collect())
}

/// Marks every group containing a hard line as broken.
/// Returns whether `doc` forces its parent to break.
fn propagate_breaks(doc: &mut Doc) -> bool {
    match doc {
        Doc::Nil | Doc::Text(_) | Doc::LineSuffix(_) => false,
        Doc::Line(kind) => *kind == LineKind::Hard,
        Doc::Concat(docs) => docs
            .iter_mut()
            .fold(false, |acc, d| propagate_breaks(d) || acc),
        Doc::Indent(d) | Doc::MarkAsRoot(d) | Doc::DedentToRoot(d) => propagate_breaks(d),
        Doc::Group {
            contents,
            should_break,
        } => {
            if propagate_breaks(contents) {
                *should_break = true;
            }
            *should_break
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Break,
    Flat,
}

#[derive(Debug, Clone, Copy)]
struct Indentation {
    level: usize,
    root: Option<usize>,
}

#[derive(Clone, Copy)]
struct Command<'a> {
    indentation: Indentation,
    mode: Mode,
    doc: &'a Doc,
}

fn text_width(s: &str) -> usize {
    s.chars().count()
}

/// Whether `next` followed by `rest` fits in `remaining` columns up to the first newline.
/// Once a line suffix is pending, a flat line does not fit: whatever follows it would
/// be printed in front of the suffix.
fn fits(next: Command, rest: &[Command], mut remaining: isize, mut has_suffix: bool) -> bool {
    let mut rest_index = rest.len();
    let mut stack = vec![(next.mode, next.doc)];
    while remaining >= 0 {
        let Some((mode, doc)) = stack.pop() else {
            if rest_index == 0 {
                return true;
            }
            rest_index -= 1;
            stack.push((rest[rest_index].mode, rest[rest_index].doc));
            continue;
        };
        match doc {
            Doc::Nil => {}
            Doc::Text(s) => match s.split_once('\n') {
                Some((first, _)) => return remaining >= text_width(first) as isize,
                None => remaining -= text_width(s) as isize,
            },
            Doc::Concat(docs) => stack.extend(docs.iter().rev().map(|d| (mode, d))),
            Doc::Indent(d) | Doc::MarkAsRoot(d) | Doc::DedentToRoot(d) => stack.push((mode, d)),
            Doc::Group {
                contents,
                should_break,
            } => {
                let mode = if *should_break { Mode::Break } else { mode };
                stack.push((mode, contents));
            }
            Doc::Line(kind) => {
                if mode == Mode::Break || *kind == LineKind::Hard {
                    return true;
                }
                if has_suffix {
                    return false;
                }
                if *kind == LineKind::Normal {
                    remaining -= 1;
                }
            }
            Doc::LineSuffix(_) => has_suffix = true,
        }
    }
    false
}

fn trim_trailing_spaces(out: &mut String) {
    let trimmed = out.trim_end_matches([' ', '\t']).len();
    out.truncate(trimmed);
}

/// Prints `doc` into a string, breaking groups that do not fit in `width` columns.
pub fn render(mut doc: Doc, width: usize, indent_size: usize) -> String {
    propagate_breaks(&mut doc);
    let mut out = String::new();
    let mut column = 0usize;
    let root = Indentation {
        level: 0,
        root: None,
    };
    let mut commands = vec![Command {
        indentation: root,
        mode: Mode::Break,
        doc: &doc,
    }];
    let mut suffixes: Vec<Command> = Vec::new();
    loop {
        while let Some(command) = commands.pop() {
            let Command {
                indentation,
                mode,
                doc,
            } = command;
            match doc {
                Doc::Nil => {}
                Doc::Text(s) => {
                    out.push_str(s);
                    column = match s.rsplit_once('\n') {
                        Some((_, last)) => text_width(last),
                        None => column + text_width(s),
                    };
                }
                Doc::Concat(docs) => commands.extend(docs.iter().rev().map(|doc| Command {
                    indentation,
                    mode,
                    doc,
                })),
                Doc::Indent(d) => commands.push(Command {
                    indentation: Indentation {
                        level: indentation.level + indent_size,
                        root: indentation.root,
                    },
                    mode,
                    doc: d,
                }),
                Doc::MarkAsRoot(d) => commands.push(Command {
                    indentation: Indentation {
                        level: indentation.level,
                        root: Some(indentation.level),
                    },
                    mode,
                    doc: d,
                }),
                Doc::DedentToRoot(d) => commands.push(Command {
                    indentation: Indentation {
                        level: indentation.root.unwrap_or(0),
                        root: indentation.root,
                    },
                    mode,
                    doc: d,
                }),
                Doc::Group {
                    contents,
                    should_break,
                } => {
                    let flat = Command {
                        indentation,
                        mode: Mode::Flat,
                        doc: contents,
                    };
                    let mode = match mode {
                        Mode::Flat if !should_break => Mode::Flat,
                        _ if *should_break => Mode::Break,
                        _ => {
                            let remaining = width as isize - column as isize;
                            if fits(flat, &commands, remaining, !suffixes.is_empty()) {
                                Mode::Flat
                            } else {
                                Mode::Break
                            }
                        }
                    };
                    commands.push(Command { mode, ..flat });
                }
                Doc::Line(kind) => match (mode, kind) {
                    (Mode::Flat, LineKind::Normal) => {
                        out.push(' ');
                        column += 1;
                    }
                    (Mode::Flat, LineKind::Soft) => {}
                    _ => {
                        if !suffixes.is_empty() {
                            commands.push(command);
                            commands.extend(suffixes.drain(..).rev());
                            continue;
                        }
                        trim_trailing_spaces(&mut out);
                        out.push('\n');
                        out.push_str(&" ".repeat(indentation.level));
                        column = indentation.level;
                    }
                },
                Doc::LineSuffix(d) => suffixes.push(Command {
                    indentation,
                    mode,
                    doc: d,
                }),
            }
        }
        if suffixes.is_empty() {
            break;
        }
        commands.extend(suffixes.drain(..).rev());
    }
    trim_trailing_spaces(&mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(n: usize) -> Doc {
        join(line(), (0..n).map(|i| text(format!("word{i}"))))
    }

    #[test]
    fn test_group_fits_flat() {
        let doc = group(concat(vec![text("SELECT"), indent(concat(vec![line(), words(3)]))]));
        assert_eq!(render(doc, 80, 2), "SELECT word0 word1 word2");
    }

    #[test]
    fn test_group_breaks() {
        let doc = group(concat(vec![text("SELECT"), indent(concat(vec![line(), words(3)]))]));
        assert_eq!(render(doc, 10, 2), "SELECT\n  word0\n  word1\n  word2");
    }

    #[test]
    fn test_softline_and_nested_groups() {
        let inner = group(concat(vec![
            text("("),
            indent(concat(vec![softline(), words(2)])),
            softline(),
            text(")"),
        ]));
        let doc = group(concat(vec![text("f"), inner.clone()]));
        assert_eq!(render(doc, 80, 2), "f(word0 word1)");
        let doc = group(concat(vec![text("f"), inner]));
        assert_eq!(render(doc, 8, 2), "f(\n  word0\n  word1\n)");
    }

    #[test]
    fn test_rest_commands_count_towards_fit() {
        // The group itself fits, but the text after it does not.
        let doc = concat(vec![group(words(2)), text("0123456789")]);
        assert_eq!(render(doc, 15, 2), "word0\nword10123456789");
    }

    #[test]
    fn test_hardline_breaks_parents() {
        let doc = group(concat(vec![text("a"), line(), group(concat(vec![text("b"), hardline(), text("c")]))]));
        assert_eq!(render(doc, 80, 2), "a\nb\nc");
    }

    #[test]
    fn test_line_suffix_flushed_before_newline() {
        let doc = concat(vec![
            text("a"),
            line_suffix(" -- note"),
            text(","),
            hardline(),
            text("b"),
        ]);
        assert_eq!(render(doc, 80, 2), "a, -- note\nb");
        let doc = concat(vec![text("a"), line_suffix(" -- end")]);
        assert_eq!(render(doc, 80, 2), "a -- end");
    }

    #[test]
    fn test_line_suffix_keeps_own_group_flat() {
        // the suffix ends the group, and the next line of the parent breaks anyway
        let call = group(concat(vec![
            text("f("),
            indent(concat(vec![softline(), words(2)])),
            softline(),
            text(")"),
            line_suffix(" -- c"),
        ]));
        let doc = broken_group(concat(vec![call, text(","), line(), text("x")]));
        assert_eq!(render(doc, 80, 2), "f(word0 word1), -- c\nx");
    }

    #[test]
    fn test_line_suffix_breaks_group_with_later_line() {
        let doc = group(concat(vec![
            text("a"),
            line_suffix(" -- c"),
            line(),
            text("b"),
        ]));
        assert_eq!(render(doc, 80, 2), "a -- c\nb");
        let doc = concat(vec![
            text("a"),
            line_suffix(" -- c"),
            group(concat(vec![line(), text("b")])),
        ]);
        assert_eq!(render(doc, 80, 2), "a -- c\nb");
    }

    #[test]
    fn test_dedent_to_root() {
        let doc = indent(concat(vec![
            hardline(),
            mark_as_root(indent(concat(vec![
                dedent_to_root(concat(vec![text("-- c"), hardline(), text("SELECT")])),
                hardline(),
                text("1"),
            ]))),
        ]));
        assert_eq!(render(doc, 80, 2), "\n  -- c\n  SELECT\n    1");
    }

    #[test]
    fn test_trailing_spaces_trimmed() {
        let doc = concat(vec![text("a "), hardline(), text("b  ")]);
        assert_eq!(render(doc, 80, 2), "a\nb");
    }

    #[test]
    fn test_multiline_text_column() {
        let doc = group(concat(vec![text("/* a\n b */"), line(), text("x")]));
        assert_eq!(render(doc, 80, 2), "/* a\n b */ x");
    }
}
