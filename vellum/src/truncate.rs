//! String truncation with terminators.
use crate::format::{HtmlFormat, MarkupModel};
use crate::{Error, Result};
use std::sync::{Arc, OnceLock};

/// Terminator of the `ascii` preset, safe in every output charset.
pub const STANDARD_ASCII_TERMINATOR: &str = "[...]";

/// Terminator of the `unicode` preset; holds an ellipsis character, so
/// it survives UTF-8 but not the ISO-8859-x charsets.
pub const STANDARD_UNICODE_TERMINATOR: &str = "[\u{2026}]";

/// Markup terminator of both presets. Only US-ASCII characters, the
/// visible ellipsis comes from the character reference.
pub const STANDARD_MARKUP_TERMINATOR: &str =
    "<span class='truncateTerminator'>[&#8230;]</span>";

/// Visible length assumed for markup terminators in formats whose tags
/// can't be recognized.
const FALLBACK_MARKUP_TERMINATOR_LENGTH: usize = 3;

const DEFAULT_WORD_BOUNDARY_MIN_LENGTH: f64 = 0.75;

/// A call-site terminator override.
#[derive(Debug, Clone)]
pub enum Terminator {
    Plain(String),
    Markup(Arc<MarkupModel>),
}

/// The outcome of a truncation that may carry markup.
#[derive(Debug)]
pub enum Truncated {
    Plain(String),
    Markup(Arc<MarkupModel>),
}

#[derive(Clone, Copy, PartialEq)]
enum Mode {
    CharBoundary,
    WordBoundary,
    Auto,
}

/// Truncates strings to a maximum length, appending a terminator.
///
/// The terminator is always appended to a truncated result, even when
/// that exceeds the maximum length; without it the reader couldn't tell
/// the string was cut. When nothing of the input survives, the
/// terminator alone is returned.
pub struct TruncateAlgorithm {
    terminator: String,
    terminator_length: usize,
    terminator_removes_dots: bool,
    m_terminator: Option<Arc<MarkupModel>>,
    m_terminator_length: usize,
    m_terminator_removes_dots: bool,
    word_boundary_min_length: f64,
    add_space_at_word_boundary: bool,
}

impl TruncateAlgorithm {
    /// An algorithm with the given default plain terminator.
    ///
    /// The terminator's length and whether it removes neighboring dots
    /// are detected from its text; the `with_*` methods override the
    /// detection.
    pub fn new(terminator: impl Into<String>, add_space_at_word_boundary: bool) -> Self {
        let terminator = terminator.into();
        TruncateAlgorithm {
            terminator_length: terminator.chars().count(),
            terminator_removes_dots: plain_removes_dots(&terminator),
            terminator,
            m_terminator: None,
            m_terminator_length: 0,
            m_terminator_removes_dots: false,
            word_boundary_min_length: DEFAULT_WORD_BOUNDARY_MIN_LENGTH,
            add_space_at_word_boundary,
        }
    }

    /// Sets the default markup terminator, used by the `_m` entry points
    /// when the call doesn't pass one.
    pub fn with_markup_terminator(mut self, terminator: Arc<MarkupModel>) -> Self {
        self.m_terminator_length = markup_terminator_length(&terminator);
        self.m_terminator_removes_dots = markup_removes_dots(&terminator);
        self.m_terminator = Some(terminator);
        self
    }

    /// Overrides the assumed length of the default plain terminator.
    pub fn with_terminator_length(mut self, length: usize) -> Self {
        self.terminator_length = length;
        self
    }

    /// Overrides dot removal for the default plain terminator.
    pub fn with_terminator_removes_dots(mut self, removes: bool) -> Self {
        self.terminator_removes_dots = removes;
        self
    }

    /// Overrides the assumed visible length of the default markup
    /// terminator.
    pub fn with_markup_terminator_length(mut self, length: usize) -> Self {
        self.m_terminator_length = length;
        self
    }

    /// Overrides dot removal for the default markup terminator.
    pub fn with_markup_terminator_removes_dots(mut self, removes: bool) -> Self {
        self.m_terminator_removes_dots = removes;
        self
    }

    /// The minimum length word boundary truncation must reach, as a
    /// proportion of the maximum length; below it the `Auto` entry
    /// points fall back to character boundary truncation. 0 forces word
    /// boundaries, 1 gives them no preference.
    pub fn with_word_boundary_min_length(mut self, proportion: f64) -> Self {
        assert!(
            (0.0..=1.0).contains(&proportion),
            "word_boundary_min_length must be between 0.0 and 1.0 (inclusive)",
        );
        self.word_boundary_min_length = proportion;
        self
    }

    /// The shared instance with the `"[...]"` terminator.
    pub fn ascii() -> &'static Arc<TruncateAlgorithm> {
        static INSTANCE: OnceLock<Arc<TruncateAlgorithm>> = OnceLock::new();
        INSTANCE.get_or_init(|| {
            Arc::new(
                TruncateAlgorithm::new(STANDARD_ASCII_TERMINATOR, true)
                    .with_markup_terminator(standard_markup_terminator()),
            )
        })
    }

    /// The shared instance with the `"[…]"` terminator.
    pub fn unicode() -> &'static Arc<TruncateAlgorithm> {
        static INSTANCE: OnceLock<Arc<TruncateAlgorithm>> = OnceLock::new();
        INSTANCE.get_or_init(|| {
            Arc::new(
                TruncateAlgorithm::new(STANDARD_UNICODE_TERMINATOR, true)
                    .with_markup_terminator(standard_markup_terminator()),
            )
        })
    }

    pub fn default_terminator(&self) -> &str {
        &self.terminator
    }

    pub fn default_terminator_length(&self) -> usize {
        self.terminator_length
    }

    pub fn default_markup_terminator(&self) -> Option<&Arc<MarkupModel>> {
        self.m_terminator.as_ref()
    }

    pub fn word_boundary_min_length(&self) -> f64 {
        self.word_boundary_min_length
    }

    pub fn add_space_at_word_boundary(&self) -> bool {
        self.add_space_at_word_boundary
    }

    /// Truncates at a word boundary when one is close enough, otherwise
    /// at a character boundary.
    pub fn truncate(
        &self,
        s: &str,
        max_length: usize,
        terminator: Option<&Terminator>,
        terminator_length: Option<usize>,
    ) -> Result<String> {
        self.plain(s, max_length, terminator, terminator_length, Mode::Auto)
    }

    /// Truncates at a word boundary only.
    pub fn truncate_w(
        &self,
        s: &str,
        max_length: usize,
        terminator: Option<&Terminator>,
        terminator_length: Option<usize>,
    ) -> Result<String> {
        self.plain(s, max_length, terminator, terminator_length, Mode::WordBoundary)
    }

    /// Truncates at a character boundary only.
    pub fn truncate_c(
        &self,
        s: &str,
        max_length: usize,
        terminator: Option<&Terminator>,
        terminator_length: Option<usize>,
    ) -> Result<String> {
        self.plain(s, max_length, terminator, terminator_length, Mode::CharBoundary)
    }

    /// Like [`TruncateAlgorithm::truncate`], but the result may carry
    /// the markup terminator.
    pub fn truncate_m(
        &self,
        s: &str,
        max_length: usize,
        terminator: Option<&Terminator>,
        terminator_length: Option<usize>,
    ) -> Result<Truncated> {
        self.unified(s, max_length, terminator, terminator_length, Mode::Auto, true)
    }

    /// Like [`TruncateAlgorithm::truncate_w`] with a possibly-markup
    /// result.
    pub fn truncate_wm(
        &self,
        s: &str,
        max_length: usize,
        terminator: Option<&Terminator>,
        terminator_length: Option<usize>,
    ) -> Result<Truncated> {
        self.unified(s, max_length, terminator, terminator_length, Mode::WordBoundary, true)
    }

    /// Like [`TruncateAlgorithm::truncate_c`] with a possibly-markup
    /// result.
    pub fn truncate_cm(
        &self,
        s: &str,
        max_length: usize,
        terminator: Option<&Terminator>,
        terminator_length: Option<usize>,
    ) -> Result<Truncated> {
        self.unified(s, max_length, terminator, terminator_length, Mode::CharBoundary, true)
    }

    fn plain(
        &self,
        s: &str,
        max_length: usize,
        terminator: Option<&Terminator>,
        terminator_length: Option<usize>,
        mode: Mode,
    ) -> Result<String> {
        match self.unified(s, max_length, terminator, terminator_length, mode, false)? {
            Truncated::Plain(out) => Ok(out),
            Truncated::Markup(_) => unreachable!("plain truncation produced markup"),
        }
    }

    fn unified(
        &self,
        s: &str,
        max_length: usize,
        terminator: Option<&Terminator>,
        terminator_length: Option<usize>,
        mode: Mode,
        allow_markup: bool,
    ) -> Result<Truncated> {
        let chars: Vec<char> = s.chars().collect();
        if chars.len() <= max_length {
            return Ok(Truncated::Plain(s.to_string()));
        }

        let (term, term_len, mut removes_dots) = match terminator {
            None => match (allow_markup, &self.m_terminator) {
                (true, Some(markup)) => (
                    Terminator::Markup(markup.clone()),
                    self.m_terminator_length,
                    Some(self.m_terminator_removes_dots),
                ),
                _ => (
                    Terminator::Plain(self.terminator.clone()),
                    self.terminator_length,
                    Some(self.terminator_removes_dots),
                ),
            },
            Some(Terminator::Plain(text)) => {
                let length = terminator_length.unwrap_or_else(|| text.chars().count());
                (Terminator::Plain(text.clone()), length, None)
            }
            Some(Terminator::Markup(markup)) => {
                if !allow_markup {
                    return Err(Error::FormatMismatch {
                        expected: "plainText".to_string(),
                        actual: markup.format_name().to_string(),
                    });
                }
                let length =
                    terminator_length.unwrap_or_else(|| markup_terminator_length(markup));
                (Terminator::Markup(markup.clone()), length, None)
            }
        };

        let body = self.cut(&chars, max_length, &term, term_len, &mut removes_dots, mode);

        match body {
            Some(body) if !body.is_empty() => match term {
                Terminator::Plain(text) => {
                    let mut out = body;
                    out.push_str(&text);
                    Ok(Truncated::Plain(out))
                }
                Terminator::Markup(markup) => {
                    let plain = MarkupModel::from_plain(markup.format().clone(), body);
                    Ok(Truncated::Markup(Arc::new(plain.concat(&markup)?)))
                }
            },
            // nothing of the input survived
            _ => Ok(match term {
                Terminator::Plain(text) => Truncated::Plain(text),
                Terminator::Markup(markup) => Truncated::Markup(markup),
            }),
        }
    }

    /// The truncation itself, without the terminator appended. `None`
    /// when no content survives.
    fn cut(
        &self,
        chars: &[char],
        max_length: usize,
        term: &Terminator,
        term_len: usize,
        removes_dots: &mut Option<bool>,
        mode: Mode,
    ) -> Option<String> {
        let cb_initial = max_length as isize - term_len as isize - 1;

        // Both boundary modes skip this whitespace, do it once up front.
        let mut cb_last = skip_trailing_ws(chars, cb_initial);
        if cb_last < 0 {
            return None;
        }

        if mode == Mode::Auto && self.word_boundary_min_length < 1.0
            || mode == Mode::WordBoundary
        {
            let mut worded: Option<String> = None;
            {
                let word_term_len = if self.add_space_at_word_boundary {
                    term_len + 1
                } else {
                    term_len
                };
                let min_idx: isize = match mode {
                    Mode::Auto => {
                        let floor = (max_length as f64 * self.word_boundary_min_length)
                            .ceil() as isize;
                        (floor - word_term_len as isize - 1).max(0)
                    }
                    _ => 0,
                };

                let mut wb_last =
                    (max_length as isize - word_term_len as isize - 1).min(cb_last);
                let mut following_is_ws = match usize::try_from(wb_last + 1) {
                    Ok(next) => chars.get(next).is_none_or(|c| c.is_whitespace()),
                    Err(_) => true,
                };
                'word: while wb_last >= min_idx {
                    let cur = chars[wb_last as usize];
                    let cur_is_ws = cur.is_whitespace();
                    if !cur_is_ws && following_is_ws {
                        // dot removal only matters when the terminator
                        // would touch the dot
                        if !self.add_space_at_word_boundary && is_dot(cur) {
                            let removes = *removes_dots
                                .get_or_insert_with(|| terminator_removes_dots(term));
                            if removes {
                                while wb_last >= min_idx
                                    && is_dot_or_ws(chars[wb_last as usize])
                                {
                                    wb_last -= 1;
                                }
                                if wb_last < min_idx {
                                    break 'word;
                                }
                            }
                        }

                        let mut out =
                            String::with_capacity(wb_last as usize + 1 + word_term_len);
                        out.extend(chars[..=wb_last as usize].iter());
                        if self.add_space_at_word_boundary {
                            out.push(' ');
                        }
                        worded = Some(out);
                        break 'word;
                    }
                    following_is_ws = cur_is_ws;
                    wb_last -= 1;
                }
            }
            if worded.is_some()
                || mode == Mode::WordBoundary
                || mode == Mode::Auto && self.word_boundary_min_length == 0.0
            {
                return worded;
            }
            // Auto mode and no acceptable word boundary, fall through to
            // character boundary truncation.
        }

        // The word-end space may push us past max_length by one, cut one
        // character earlier then.
        if cb_last == cb_initial
            && self.add_space_at_word_boundary
            && is_word_end(chars, cb_last)
        {
            cb_last -= 1;
            if cb_last < 0 {
                return None;
            }
        }

        loop {
            cb_last = skip_trailing_ws(chars, cb_last);
            if cb_last < 0 {
                return None;
            }
            if is_dot(chars[cb_last as usize])
                && !(self.add_space_at_word_boundary && is_word_end(chars, cb_last))
            {
                let removes =
                    *removes_dots.get_or_insert_with(|| terminator_removes_dots(term));
                if removes {
                    cb_last = skip_trailing_dots(chars, cb_last);
                    if cb_last < 0 {
                        return None;
                    }
                    // the dots may have uncovered more whitespace
                    continue;
                }
            }
            break;
        }

        let word_end_space =
            self.add_space_at_word_boundary && is_word_end(chars, cb_last);
        let mut out = String::with_capacity(
            cb_last as usize + 1 + usize::from(word_end_space) + term_len,
        );
        out.extend(chars[..=cb_last as usize].iter());
        if word_end_space {
            out.push(' ');
        }
        Some(out)
    }
}

fn standard_markup_terminator() -> Arc<MarkupModel> {
    Arc::new(MarkupModel::from_markup(
        Arc::new(HtmlFormat),
        STANDARD_MARKUP_TERMINATOR,
    ))
}

fn plain_removes_dots(terminator: &str) -> bool {
    terminator.starts_with('.') || terminator.starts_with('\u{2026}')
}

fn markup_removes_dots(terminator: &MarkupModel) -> bool {
    if is_html_or_xml(terminator.format_name()) {
        markup_starts_with_dot(terminator.markup())
    } else {
        // can't look inside, assume the worst
        true
    }
}

fn terminator_removes_dots(terminator: &Terminator) -> bool {
    match terminator {
        Terminator::Plain(text) => plain_removes_dots(text),
        Terminator::Markup(markup) => markup_removes_dots(markup),
    }
}

fn markup_terminator_length(terminator: &MarkupModel) -> usize {
    if is_html_or_xml(terminator.format_name()) {
        visible_length(terminator.markup())
    } else {
        FALLBACK_MARKUP_TERMINATOR_LENGTH
    }
}

fn is_html_or_xml(format_name: &str) -> bool {
    matches!(format_name, "HTML" | "XHTML" | "XML")
}

fn skip_trailing_ws(chars: &[char], mut idx: isize) -> isize {
    while idx >= 0 && chars[idx as usize].is_whitespace() {
        idx -= 1;
    }
    idx
}

fn skip_trailing_dots(chars: &[char], mut idx: isize) -> isize {
    while idx >= 0 && is_dot(chars[idx as usize]) {
        idx -= 1;
    }
    idx
}

fn is_word_end(chars: &[char], idx: isize) -> bool {
    match usize::try_from(idx + 1) {
        Ok(next) => chars.get(next).is_none_or(|c| c.is_whitespace()),
        Err(_) => false,
    }
}

fn is_dot(c: char) -> bool {
    c == '.' || c == '\u{2026}'
}

fn is_dot_or_ws(c: char) -> bool {
    is_dot(c) || c.is_whitespace()
}

fn starts_with_at(chars: &[char], idx: usize, pattern: &str) -> bool {
    let mut pattern = pattern.chars();
    let mut rest = chars[idx.min(chars.len())..].iter();
    loop {
        match (pattern.next(), rest.next()) {
            (None, _) => return true,
            (Some(_), None) => return false,
            (Some(p), Some(c)) => {
                if p != *c {
                    return false;
                }
            }
        }
    }
}

/// Length of HTML/XML markup as the reader sees it: tags and comments
/// count as nothing, character and entity references as one character,
/// CDATA content without its delimiters.
fn visible_length(s: &str) -> usize {
    let chars: Vec<char> = s.chars().collect();
    let len = chars.len();
    let mut result = 0;
    let mut i = 0;
    while i < len {
        let c = chars[i];
        i += 1;
        if c == '<' {
            if starts_with_at(&chars, i, "!--") {
                i += 3;
                while i + 2 < len
                    && !(chars[i] == '-' && chars[i + 1] == '-' && chars[i + 2] == '>')
                {
                    i += 1;
                }
                i += 3;
            } else if starts_with_at(&chars, i, "![CDATA[") {
                i += 8;
                while i < len
                    && !(chars[i] == ']'
                        && i + 2 < len
                        && chars[i + 1] == ']'
                        && chars[i + 2] == '>')
                {
                    result += 1;
                    i += 1;
                }
                i += 3;
            } else {
                while i < len && chars[i] != '>' {
                    i += 1;
                }
                i += 1;
            }
        } else if c == '&' {
            while i < len && chars[i] != ';' {
                i += 1;
            }
            i += 1;
            result += 1;
        } else {
            result += 1;
        }
    }
    result
}

/// Whether the first visible character of HTML/XML markup is a dot or
/// ellipsis, resolving character references.
fn markup_starts_with_dot(s: &str) -> bool {
    let chars: Vec<char> = s.chars().collect();
    let len = chars.len();
    let mut i = 0;
    while i < len {
        let c = chars[i];
        i += 1;
        if c == '<' {
            if starts_with_at(&chars, i, "!--") {
                i += 3;
                while i + 2 < len
                    && !(chars[i] == '-' && chars[i + 1] == '-' && chars[i + 2] == '>')
                {
                    i += 1;
                }
                i += 3;
            } else if starts_with_at(&chars, i, "![CDATA[") {
                i += 8;
                if i < len
                    && !(chars[i] == ']'
                        && i + 2 < len
                        && chars[i + 1] == ']'
                        && chars[i + 2] == '>')
                {
                    return is_dot(chars[i]);
                }
                i += 3;
            } else {
                while i < len && chars[i] != '>' {
                    i += 1;
                }
                i += 1;
            }
        } else if c == '&' {
            let start = i;
            while i < len && chars[i] != ';' {
                i += 1;
            }
            let name: String = chars[start..i.min(len)].iter().collect();
            return is_dot_char_reference(&name);
        } else {
            return is_dot(c);
        }
    }
    false
}

fn is_dot_char_reference(name: &str) -> bool {
    if name.len() > 2 && name.starts_with('#') {
        let code = numerical_char_reference_code(name);
        return code == 0x2026 || code == 0x2e;
    }
    name == "hellip" || name == "period"
}

fn numerical_char_reference_code(name: &str) -> i32 {
    let bytes = name.as_bytes();
    let hex = matches!(bytes[1], b'x' | b'X');
    let mut code: i32 = 0;
    for &b in &bytes[if hex { 2 } else { 1 }..] {
        code = code.saturating_mul(if hex { 16 } else { 10 });
        code += match b {
            b'0'..=b'9' => (b - b'0') as i32,
            b'a'..=b'f' if hex => (b - b'a' + 10) as i32,
            b'A'..=b'F' if hex => (b - b'A' + 10) as i32,
            _ => return -1,
        };
    }
    code
}

#[cfg(test)]
mod test {
    use super::*;

    const SAMPLE: &str = "Some text for truncation testing.";

    #[test]
    fn short_input_passes_through() {
        let out = TruncateAlgorithm::ascii()
            .truncate(SAMPLE, SAMPLE.len(), None, None)
            .unwrap();
        assert_eq!(out, SAMPLE);
    }

    #[test]
    fn auto_prefers_word_boundary() {
        let out = TruncateAlgorithm::ascii().truncate(SAMPLE, 20, None, None).unwrap();
        assert_eq!(out, "Some text for [...]");
    }

    #[test]
    fn auto_falls_back_to_char_boundary() {
        let out = TruncateAlgorithm::ascii()
            .truncate("CaNotBeBrokenAnywhere", 20, None, None)
            .unwrap();
        assert_eq!(out, "CaNotBeBrokenAn[...]");
    }

    #[test]
    fn char_boundary_cuts_inside_words() {
        let out = TruncateAlgorithm::ascii().truncate_c(SAMPLE, 20, None, None).unwrap();
        assert_eq!(out, "Some text for t[...]");
    }

    #[test]
    fn word_boundary_only() {
        let out = TruncateAlgorithm::ascii().truncate_w(SAMPLE, 20, None, None).unwrap();
        assert_eq!(out, "Some text for [...]");
    }

    #[test]
    fn custom_terminator() {
        let out = TruncateAlgorithm::ascii()
            .truncate(SAMPLE, 20, Some(&Terminator::Plain("|".to_string())), None)
            .unwrap();
        assert_eq!(out, "Some text for |");
    }

    #[test]
    fn terminator_alone_when_nothing_survives() {
        let out = TruncateAlgorithm::ascii().truncate("x y", 1, None, None).unwrap();
        assert_eq!(out, "[...]");
    }

    #[test]
    fn dotted_terminator_removes_touching_dots() {
        let alg = TruncateAlgorithm::new("...", false);
        let out = alg.truncate_c("ab... cd", 7, None, None).unwrap();
        assert_eq!(out, "ab...");
    }

    #[test]
    fn bracketed_terminator_keeps_dots() {
        let alg = TruncateAlgorithm::new("[...]", false);
        let out = alg.truncate_c("ab.cd.efgh", 8, None, None).unwrap();
        assert_eq!(out, "ab.[...]");
    }

    #[test]
    fn unicode_preset() {
        let out = TruncateAlgorithm::unicode().truncate(SAMPLE, 20, None, None).unwrap();
        assert_eq!(out, "Some text for [\u{2026}]");
    }

    #[test]
    fn plain_entry_rejects_markup_terminator() {
        let terminator = Terminator::Markup(standard_markup_terminator());
        let err = TruncateAlgorithm::ascii()
            .truncate(SAMPLE, 20, Some(&terminator), None)
            .unwrap_err();
        assert!(matches!(err, Error::FormatMismatch { .. }));
    }

    #[test]
    fn markup_entry_uses_markup_terminator() {
        let out = TruncateAlgorithm::ascii().truncate_m(SAMPLE, 20, None, None).unwrap();
        let Truncated::Markup(model) = out else { panic!("expected markup") };
        assert_eq!(
            model.markup(),
            "Some text for <span class='truncateTerminator'>[&#8230;]</span>",
        );
    }

    #[test]
    fn markup_entry_escapes_truncated_body() {
        let out = TruncateAlgorithm::ascii()
            .truncate_m("a < b and some more words here", 12, None, None)
            .unwrap();
        let Truncated::Markup(model) = out else { panic!("expected markup") };
        assert!(model.markup().starts_with("a &lt; b "));
        assert!(model.markup().ends_with("</span>"));
    }

    #[test]
    fn markup_entry_without_markup_default() {
        let alg = TruncateAlgorithm::new("[...]", true);
        let out = alg.truncate_m(SAMPLE, 20, None, None).unwrap();
        assert!(matches!(out, Truncated::Plain(s) if s == "Some text for [...]"));
    }

    #[test]
    fn word_boundary_min_length_zero_forces_words() {
        // with the default threshold the word boundary at index 1 is too
        // early and character boundary truncation wins
        let alg = TruncateAlgorithm::new("[...]", true);
        let out = alg.truncate("Ab cdefghijklmnopqrs", 12, None, None).unwrap();
        assert_eq!(out, "Ab cdef[...]");

        let alg = TruncateAlgorithm::new("[...]", true).with_word_boundary_min_length(0.0);
        let out = alg.truncate("Ab cdefghijklmnopqrs", 12, None, None).unwrap();
        assert_eq!(out, "Ab [...]");
    }

    #[test]
    fn visible_length_of_markup() {
        assert_eq!(visible_length("<span>x&amp;y</span>"), 3);
        assert_eq!(visible_length(STANDARD_MARKUP_TERMINATOR), 3);
        assert_eq!(visible_length("<!-- note -->ab"), 2);
        assert_eq!(visible_length("<![CDATA[ab]]>c"), 3);
        assert_eq!(visible_length("plain"), 5);
    }

    #[test]
    fn markup_dot_detection() {
        assert!(markup_starts_with_dot("<b>.foo</b>"));
        assert!(markup_starts_with_dot("&hellip;rest"));
        assert!(markup_starts_with_dot("&#x2026;rest"));
        assert!(markup_starts_with_dot("&#46;rest"));
        assert!(!markup_starts_with_dot("<b>a.</b>"));
        assert!(!markup_starts_with_dot("&amp;."));
        assert!(!markup_starts_with_dot(STANDARD_MARKUP_TERMINATOR));
    }

    #[test]
    #[should_panic]
    fn min_length_out_of_range() {
        let _ = TruncateAlgorithm::new("[...]", true).with_word_boundary_min_length(1.5);
    }
}
