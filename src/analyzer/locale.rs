//! Splits a prop description into per-locale texts.
//!
//! A description may carry translations as marker lines:
//!
//! ```text
//! @description Button size
//! @description.zh-CN 按钮尺寸
//! ```
//!
//! Each marker starts a segment that runs until the next marker. Text
//! before the first marker is the base description. A marker must be
//! followed by whitespace or a line break. Lines that only look like
//! markers (`@description.` without a tag, `@descriptions`, a lone
//! `@description` at the very end) are kept as ordinary text.

use super::metadata::LocalizedText;

const MARKER: &str = "@description";

struct Segment<'a> {
    locale: Option<&'a str>,
    lines: Vec<&'a str>,
}

impl<'a> Segment<'a> {
    fn new(locale: Option<&'a str>, first: &'a str) -> Self {
        Self { locale, lines: vec![first] }
    }

    fn flush(self, out: &mut Vec<LocalizedText>) {
        let text = self.lines.join("\n");
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        let locale = self.locale.map(str::to_string);
        match out.iter_mut().find(|t| t.locale == locale) {
            Some(existing) => existing.text = text.to_string(),
            None => out.push(LocalizedText { locale, text: text.to_string() }),
        }
    }
}

fn strip_eol(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}

/// Recognize a marker line, returning its locale tag and the content after it.
///
/// `line` keeps its line break: a marker must be followed by whitespace,
/// and a line break counts, but the end of the text does not.
fn parse_marker(line: &str) -> Option<(Option<&str>, &str)> {
    let rest = line.strip_prefix(MARKER)?;
    let (locale, rest) = match rest.strip_prefix('.') {
        Some(tail) => {
            let end = tail
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '-'))
                .unwrap_or(tail.len());
            if end == 0 {
                return None;
            }
            (Some(&tail[..end]), &tail[end..])
        }
        None => (None, rest),
    };
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    Some((locale, strip_eol(rest.trim_start_matches([' ', '\t']))))
}

pub fn split_description(text: &str) -> Vec<LocalizedText> {
    if !text.split_inclusive('\n').any(|line| parse_marker(line).is_some()) {
        if text.is_empty() {
            return Vec::new();
        }
        return vec![LocalizedText { locale: None, text: text.to_string() }];
    }

    let mut out = Vec::new();
    let mut current: Option<Segment<'_>> = None;
    for raw in text.split_inclusive('\n') {
        let line = strip_eol(raw);
        match parse_marker(raw) {
            Some((locale, content)) => {
                if let Some(segment) = current.take() {
                    segment.flush(&mut out);
                }
                current = Some(Segment::new(locale, content));
            }
            None => match current.as_mut() {
                Some(segment) => segment.lines.push(line),
                None => current = Some(Segment::new(None, line)),
            },
        }
    }
    if let Some(segment) = current {
        segment.flush(&mut out);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(text: &str) -> Vec<(Option<String>, String)> {
        split_description(text).into_iter().map(|t| (t.locale, t.text)).collect()
    }

    #[test]
    fn base_and_locale_markers() {
        assert_eq!(
            pairs("@description base\n@description.zh-CN 中文"),
            vec![(None, "base".into()), (Some("zh-CN".into()), "中文".into())]
        );
    }

    #[test]
    fn plain_text_is_verbatim() {
        assert_eq!(pairs("hello"), vec![(None, "hello".into())]);
        assert_eq!(pairs(" padded \n"), vec![(None, " padded \n".into())]);
        assert!(pairs("").is_empty());
    }

    #[test]
    fn preamble_becomes_base_description() {
        assert_eq!(
            pairs("Size of the button\n@description.en-US Size"),
            vec![(None, "Size of the button".into()), (Some("en-US".into()), "Size".into())]
        );
    }

    #[test]
    fn multiline_segments_and_blank_content() {
        assert_eq!(
            pairs("@description first\nsecond line\n\n@description.ja-JP\n@description.zh-CN 中文"),
            vec![(None, "first\nsecond line".into()), (Some("zh-CN".into()), "中文".into())]
        );
    }

    #[test]
    fn later_marker_overwrites_same_locale() {
        assert_eq!(pairs("@description a\n@description b"), vec![(None, "b".into())]);
    }

    #[test]
    fn lookalike_markers_are_text() {
        assert_eq!(pairs("@descriptions here"), vec![(None, "@descriptions here".into())]);
        assert_eq!(pairs("@description. broken"), vec![(None, "@description. broken".into())]);
        assert_eq!(pairs("see @description x"), vec![(None, "see @description x".into())]);
    }

    #[test]
    fn marker_needs_trailing_whitespace() {
        assert_eq!(pairs("@description"), vec![(None, "@description".into())]);
        assert_eq!(pairs("@description.zh-CN"), vec![(None, "@description.zh-CN".into())]);
        assert_eq!(pairs("@description\nSize"), vec![(None, "Size".into())]);
        assert_eq!(pairs("@description Size\r\nmore"), vec![(None, "Size\nmore".into())]);
    }
}
