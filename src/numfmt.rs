//! Number format support: built-in format table, format-code compilation and
//! display of stored numbers.
//!
//! Covers the parts of ECMA-376 format codes that affect plain text output:
//! - Sections (`positive;negative;zero;text`)
//! - Fixed and optional decimals, thousands grouping and `,` scaling
//! - Percent and scientific notation
//! - Quoted, escaped and `[$...]` currency literals
//! - Dates and times, including 12-hour clocks and elapsed `[h]`/`[mm]`/`[ss]`
//!
//! Colors, conditions and fill characters are dropped. Fractions are not
//! supported and render like the closest decimal format.

/// Format code of a built-in number format id.
pub const fn builtin_format(id: u32) -> Option<&'static str> {
    match id {
        0 => Some("General"),
        1 => Some("0"),
        2 => Some("0.00"),
        3 => Some("#,##0"),
        4 => Some("#,##0.00"),
        5 => Some("$#,##0_);($#,##0)"),
        6 => Some("$#,##0_);[Red]($#,##0)"),
        7 => Some("$#,##0.00_);($#,##0.00)"),
        8 => Some("$#,##0.00_);[Red]($#,##0.00)"),
        9 => Some("0%"),
        10 => Some("0.00%"),
        11 => Some("0.00E+00"),
        12 => Some("# ?/?"),
        13 => Some("# ??/??"),
        14 => Some("mm-dd-yy"),
        15 => Some("d-mmm-yy"),
        16 => Some("d-mmm"),
        17 => Some("mmm-yy"),
        18 => Some("h:mm AM/PM"),
        19 => Some("h:mm:ss AM/PM"),
        20 => Some("h:mm"),
        21 => Some("h:mm:ss"),
        22 => Some("m/d/yy h:mm"),
        37 => Some("#,##0 ;(#,##0)"),
        38 => Some("#,##0 ;[Red](#,##0)"),
        39 => Some("#,##0.00;(#,##0.00)"),
        40 => Some("#,##0.00;[Red](#,##0.00)"),
        41 => Some(r#"_(* #,##0_);_(* (#,##0);_(* "-"_);_(@_)"#),
        42 => Some(r#"_($* #,##0_);_($* (#,##0);_($* "-"_);_(@_)"#),
        43 => Some(r#"_(* #,##0.00_);_(* (#,##0.00);_(* "-"??_);_(@_)"#),
        44 => Some(r#"_($* #,##0.00_);_($* (#,##0.00);_($* "-"??_);_(@_)"#),
        45 => Some("mm:ss"),
        46 => Some("[h]:mm:ss"),
        47 => Some("mmss.0"),
        48 => Some("##0.0E+0"),
        49 => Some("@"),
        _ => None,
    }
}

/// A compiled number format.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum NumberFormat {
    /// Stored text is shown unchanged.
    #[default]
    General,
    /// `@`: the value is text.
    Text,
    Date(DateFormat),
    Numeric(NumericFormat),
}

impl NumberFormat {
    pub fn compile(code: &str) -> Self {
        let code = code.trim();
        if code.is_empty() || code.eq_ignore_ascii_case("general") {
            return Self::General;
        }
        if code == "@" {
            return Self::Text;
        }

        let sections = split_sections(code);
        let first = sections.first().map(|s| pieces(s)).unwrap_or_default();
        if is_general(&first) {
            return Self::General;
        }
        if is_date(&first) {
            return Self::Date(DateFormat::compile(&first));
        }
        Self::Numeric(NumericFormat {
            sections: sections
                .iter()
                .map(|s| NumericSection::compile(&pieces(s)))
                .collect(),
        })
    }

    pub fn is_date(&self) -> bool {
        matches!(self, Self::Date(_))
    }

    /// Display text for a stored value. Values that are not numbers, and
    /// numbers a date format cannot show, come back unchanged.
    pub fn apply(&self, raw: &str, date1904: bool) -> String {
        let value = match raw.trim().parse::<f64>() {
            Ok(v) if v.is_finite() => v,
            _ => return raw.to_string(),
        };
        let formatted = match self {
            Self::General | Self::Text => None,
            Self::Date(fmt) => fmt.render(value, date1904),
            Self::Numeric(fmt) => Some(fmt.render(value)),
        };
        formatted.unwrap_or_else(|| raw.to_string())
    }
}

// ============================================================================
// Lexing
// ============================================================================

/// Split on `;` outside quotes and escapes.
fn split_sections(code: &str) -> Vec<String> {
    let mut sections = vec![String::new()];
    let mut in_quotes = false;
    let mut escaped = false;
    for ch in code.chars() {
        if !escaped && !in_quotes && ch == ';' {
            sections.push(String::new());
            continue;
        }
        if !escaped && ch == '"' {
            in_quotes = !in_quotes;
        }
        escaped = !escaped && !in_quotes && ch == '\\';
        if let Some(current) = sections.last_mut() {
            current.push(ch);
        }
    }
    sections
}

#[derive(Debug, Clone, PartialEq)]
enum Piece {
    Literal(String),
    /// Contents of `[...]`.
    Bracket(String),
    /// `AM/PM` (true) or `A/P` (false).
    AmPm(bool),
    Code(char),
}

fn pieces(section: &str) -> Vec<Piece> {
    let mut out = Vec::new();
    let mut chars = section.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '"' => out.push(Piece::Literal(chars.by_ref().take_while(|&c| c != '"').collect())),
            '\\' => {
                if let Some(c) = chars.next() {
                    out.push(Piece::Literal(c.to_string()));
                }
            }
            // `_x` pads with the width of x; `*x` repeats x to fill the cell.
            '_' => {
                chars.next();
                out.push(Piece::Literal(" ".to_string()));
            }
            '*' => {
                chars.next();
            }
            '[' => out.push(Piece::Bracket(chars.by_ref().take_while(|&c| c != ']').collect())),
            'a' | 'A' => {
                let ahead: String = std::iter::once(ch).chain(chars.clone().take(4)).collect();
                if ahead.eq_ignore_ascii_case("am/pm") {
                    chars.nth(3);
                    out.push(Piece::AmPm(true));
                } else if ahead.get(..3).is_some_and(|a| a.eq_ignore_ascii_case("a/p")) {
                    chars.nth(1);
                    out.push(Piece::AmPm(false));
                } else {
                    out.push(Piece::Code(ch));
                }
            }
            c => out.push(Piece::Code(c)),
        }
    }
    out
}

fn is_general(pieces: &[Piece]) -> bool {
    let code: String = pieces
        .iter()
        .filter_map(|p| match p {
            Piece::Code(c) => Some(*c),
            _ => None,
        })
        .collect();
    code.eq_ignore_ascii_case("general")
}

fn elapsed_unit(bracket: &str) -> Option<char> {
    let mut chars = bracket.chars().map(|c| c.to_ascii_lowercase());
    let first = chars.next().filter(|c| matches!(c, 'h' | 'm' | 's'))?;
    chars.all(|c| c == first).then_some(first)
}

fn is_date(pieces: &[Piece]) -> bool {
    pieces.iter().any(|p| match p {
        Piece::Code(c) => matches!(c.to_ascii_lowercase(), 'y' | 'm' | 'd' | 'h' | 's'),
        Piece::Bracket(b) => elapsed_unit(b).is_some(),
        Piece::AmPm(_) => true,
        Piece::Literal(_) => false,
    })
}

// ============================================================================
// Numbers
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct NumericFormat {
    sections: Vec<NumericSection>,
}

impl NumericFormat {
    fn render(&self, value: f64) -> String {
        let Some(first) = self.sections.first() else {
            return String::new();
        };
        if value < 0.0 {
            match self.sections.get(1) {
                Some(negative) => negative.render(-value, false),
                None => first.render(-value, true),
            }
        } else if value == 0.0 {
            self.sections.get(2).unwrap_or(first).render(0.0, false)
        } else {
            first.render(value, false)
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Exponent {
    digits: usize,
    always_sign: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
struct NumericSection {
    prefix: String,
    suffix: String,
    has_digits: bool,
    after_point: bool,
    min_int: usize,
    required_decimals: usize,
    optional_decimals: usize,
    grouping: bool,
    percent: bool,
    /// Trailing commas: each divides by 1000.
    scale: usize,
    exponent: Option<Exponent>,
}

impl NumericSection {
    fn compile(pieces: &[Piece]) -> Self {
        let mut section = Self::default();
        let mut pending_commas = 0;
        let mut iter = pieces.iter().peekable();

        while let Some(piece) = iter.next() {
            match piece {
                Piece::Code(c @ ('0' | '#' | '?')) => {
                    if let Some(exp) = section.exponent.as_mut() {
                        exp.digits += 1;
                        continue;
                    }
                    if pending_commas > 0 {
                        section.grouping = true;
                        pending_commas = 0;
                    }
                    section.has_digits = true;
                    match (section.after_point, *c) {
                        (true, '0') => section.required_decimals += 1,
                        (true, _) => section.optional_decimals += 1,
                        (false, '0') => section.min_int += 1,
                        (false, _) => {}
                    }
                }
                Piece::Code('.') if !section.after_point && section.suffix.is_empty() => {
                    section.after_point = true;
                }
                Piece::Code(',') if section.has_digits && !section.after_point => {
                    pending_commas += 1;
                }
                Piece::Code(e @ ('E' | 'e')) if section.has_digits => {
                    match iter.peek() {
                        Some(Piece::Code(sign @ ('+' | '-'))) => {
                            section.exponent = Some(Exponent {
                                digits: 0,
                                always_sign: *sign == '+',
                            });
                            iter.next();
                        }
                        _ => section.push_literal(&e.to_string()),
                    }
                }
                Piece::Code('%') => {
                    section.percent = true;
                    section.push_literal("%");
                }
                Piece::Code(c) => section.push_literal(&c.to_string()),
                Piece::Literal(text) => section.push_literal(text),
                Piece::Bracket(inner) => {
                    // [$€-407] carries a currency symbol; colors and conditions draw nothing.
                    if let Some(currency) = inner.strip_prefix('$') {
                        section.push_literal(currency.split('-').next().unwrap_or_default());
                    }
                }
                Piece::AmPm(_) => {}
            }
        }
        section.scale = pending_commas;
        section
    }

    fn push_literal(&mut self, text: &str) {
        if self.has_digits || self.after_point {
            self.suffix.push_str(text);
        } else {
            self.prefix.push_str(text);
        }
    }

    fn render(&self, magnitude: f64, negative: bool) -> String {
        if !self.has_digits {
            return format!("{}{}", self.prefix, self.suffix);
        }
        let mut value = magnitude;
        if self.percent {
            value *= 100.0;
        }
        for _ in 0..self.scale {
            value /= 1000.0;
        }

        let number = match &self.exponent {
            Some(exp) => self.scientific(value, exp),
            None => self.fixed(value),
        };
        let is_zero = number.chars().all(|c| !c.is_ascii_digit() || c == '0');
        let sign = if negative && !is_zero { "-" } else { "" };
        format!("{sign}{}{number}{}", self.prefix, self.suffix)
    }

    fn fixed(&self, value: f64) -> String {
        let decimals = self.required_decimals + self.optional_decimals;
        let text = format!("{value:.decimals$}");
        let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), ""));

        let mut frac = frac_part.to_string();
        while frac.len() > self.required_decimals && frac.ends_with('0') {
            frac.pop();
        }
        let mut int = if int_part == "0" && self.min_int == 0 {
            String::new()
        } else {
            int_part.to_string()
        };
        while int.len() < self.min_int {
            int.insert(0, '0');
        }
        if self.grouping {
            int = group_thousands(&int);
        }

        if decimals > 0 {
            format!("{int}.{frac}")
        } else {
            int
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn scientific(&self, value: f64, exp: &Exponent) -> String {
        let decimals = self.required_decimals + self.optional_decimals;
        let (mut mantissa, mut power) = if value > 0.0 {
            let p = value.log10().floor();
            (value / 10f64.powf(p), p as i32)
        } else {
            (0.0, 0)
        };
        let mut text = format!("{mantissa:.decimals$}");
        if text.starts_with("10") {
            mantissa /= 10.0;
            power += 1;
            text = format!("{mantissa:.decimals$}");
        }
        let sign = if power < 0 {
            "-"
        } else if exp.always_sign {
            "+"
        } else {
            ""
        };
        let width = exp.digits.max(1);
        format!("{text}E{sign}{:0width$}", power.unsigned_abs())
    }
}

fn group_thousands(digits: &str) -> String {
    let len = digits.chars().count();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

// ============================================================================
// Dates and times
// ============================================================================

/// Largest serial Excel displays as a date (9999-12-31).
const MAX_DATE_SERIAL: f64 = 2_958_466.0;

const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

const WEEKDAYS: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

#[derive(Debug, Clone, PartialEq)]
enum DateToken {
    Year(usize),
    Month(usize),
    Day(usize),
    Hour(usize),
    Minute(usize),
    Second(usize),
    /// Digits of a fraction of a second (`ss.00`).
    SubSecond(usize),
    ElapsedHours,
    ElapsedMinutes,
    ElapsedSeconds,
    AmPm(bool),
    Literal(String),
}

impl DateToken {
    fn is_hour(&self) -> bool {
        matches!(self, Self::Hour(_) | Self::ElapsedHours)
    }

    fn is_second(&self) -> bool {
        matches!(self, Self::Second(_) | Self::ElapsedSeconds)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DateFormat {
    tokens: Vec<DateToken>,
    twelve_hour: bool,
    subsecond_digits: usize,
}

impl DateFormat {
    fn compile(pieces: &[Piece]) -> Self {
        let mut tokens = Vec::new();
        let mut iter = pieces.iter().peekable();

        while let Some(piece) = iter.next() {
            match piece {
                Piece::Code(c) if matches!(c.to_ascii_lowercase(), 'y' | 'm' | 'd' | 'h' | 's') => {
                    let mut run = 1;
                    while iter
                        .next_if(|p| matches!(p, Piece::Code(n) if n.eq_ignore_ascii_case(c)))
                        .is_some()
                    {
                        run += 1;
                    }
                    tokens.push(match c.to_ascii_lowercase() {
                        'y' => DateToken::Year(run),
                        'm' => DateToken::Month(run),
                        'd' => DateToken::Day(run),
                        'h' => DateToken::Hour(run),
                        _ => DateToken::Second(run),
                    });
                }
                Piece::Code('.') if tokens.last().is_some_and(DateToken::is_second) => {
                    let mut digits = 0;
                    while iter.next_if_eq(&&Piece::Code('0')).is_some() {
                        digits += 1;
                    }
                    if digits == 0 {
                        tokens.push(DateToken::Literal(".".to_string()));
                    } else {
                        tokens.push(DateToken::SubSecond(digits.min(3)));
                    }
                }
                Piece::Code(c) => tokens.push(DateToken::Literal(c.to_string())),
                Piece::Literal(text) => tokens.push(DateToken::Literal(text.clone())),
                Piece::Bracket(inner) => match elapsed_unit(inner) {
                    Some('h') => tokens.push(DateToken::ElapsedHours),
                    Some('m') => tokens.push(DateToken::ElapsedMinutes),
                    Some(_) => tokens.push(DateToken::ElapsedSeconds),
                    None => {}
                },
                Piece::AmPm(long) => tokens.push(DateToken::AmPm(*long)),
            }
        }

        resolve_minutes(&mut tokens);
        Self {
            twelve_hour: tokens.iter().any(|t| matches!(t, DateToken::AmPm(_))),
            subsecond_digits: tokens
                .iter()
                .find_map(|t| match t {
                    DateToken::SubSecond(n) => Some(*n),
                    _ => None,
                })
                .unwrap_or(0),
            tokens,
        }
    }

    /// `None` for serials outside the displayable date range.
    #[allow(clippy::cast_possible_truncation)]
    fn render(&self, serial: f64, date1904: bool) -> Option<String> {
        if !(0.0..MAX_DATE_SERIAL).contains(&serial) {
            return None;
        }
        // Ticks are seconds, or milliseconds when fractions of a second show.
        let per_second: i64 = if self.subsecond_digits > 0 { 1000 } else { 1 };
        let ticks = (serial * 86_400.0 * per_second as f64).round() as i64;
        let per_day = 86_400 * per_second;
        let days = ticks.div_euclid(per_day);
        let seconds_of_day = ticks.rem_euclid(per_day) / per_second;
        let millis = ticks.rem_euclid(per_second);
        let total_seconds = ticks / per_second;

        let (year, month, day) = serial_to_date(days, date1904);
        let weekday = (if date1904 { days + 5 } else { days + 6 }).rem_euclid(7);
        let hour = seconds_of_day / 3600;
        let minute = seconds_of_day / 60 % 60;
        let second = seconds_of_day % 60;
        let clock_hour = match (self.twelve_hour, hour % 12) {
            (true, 0) => 12,
            (true, h) => h,
            (false, _) => hour,
        };

        let mut out = String::new();
        for token in &self.tokens {
            match token {
                DateToken::Year(n) if *n <= 2 => out.push_str(&format!("{:02}", year % 100)),
                DateToken::Year(_) => out.push_str(&format!("{year:04}")),
                DateToken::Month(1) => out.push_str(&month.to_string()),
                DateToken::Month(2) => out.push_str(&format!("{month:02}")),
                DateToken::Month(n) => {
                    let name = name_at(&MONTHS, month - 1);
                    out.push_str(match n {
                        3 => name.get(..3).unwrap_or(name),
                        4 => name,
                        _ => name.get(..1).unwrap_or(name),
                    });
                }
                DateToken::Day(1) => out.push_str(&day.to_string()),
                DateToken::Day(2) => out.push_str(&format!("{day:02}")),
                DateToken::Day(3) => {
                    let name = name_at(&WEEKDAYS, weekday);
                    out.push_str(name.get(..3).unwrap_or(name));
                }
                DateToken::Day(_) => out.push_str(name_at(&WEEKDAYS, weekday)),
                DateToken::Hour(1) => out.push_str(&clock_hour.to_string()),
                DateToken::Hour(_) => out.push_str(&format!("{clock_hour:02}")),
                DateToken::Minute(1) => out.push_str(&minute.to_string()),
                DateToken::Minute(_) => out.push_str(&format!("{minute:02}")),
                DateToken::Second(1) => out.push_str(&second.to_string()),
                DateToken::Second(_) => out.push_str(&format!("{second:02}")),
                DateToken::SubSecond(n) => {
                    let digits = format!("{millis:03}");
                    out.push('.');
                    out.push_str(digits.get(..*n).unwrap_or(&digits));
                }
                DateToken::ElapsedHours => out.push_str(&(total_seconds / 3600).to_string()),
                DateToken::ElapsedMinutes => out.push_str(&(total_seconds / 60).to_string()),
                DateToken::ElapsedSeconds => out.push_str(&total_seconds.to_string()),
                DateToken::AmPm(long) => {
                    let pm = hour >= 12;
                    out.push_str(match (long, pm) {
                        (true, false) => "AM",
                        (true, true) => "PM",
                        (false, false) => "A",
                        (false, true) => "P",
                    });
                }
                DateToken::Literal(text) => out.push_str(text),
            }
        }
        Some(out)
    }
}

/// `m`/`mm` right after an hour or right before a second means minutes.
fn resolve_minutes(tokens: &mut [DateToken]) {
    let significant: Vec<usize> = tokens
        .iter()
        .enumerate()
        .filter(|(_, t)| !matches!(t, DateToken::Literal(_)))
        .map(|(i, _)| i)
        .collect();

    let mut minutes = Vec::new();
    for (pos, &idx) in significant.iter().enumerate() {
        let Some(DateToken::Month(n @ (1 | 2))) = tokens.get(idx) else {
            continue;
        };
        let after_hour = pos
            .checked_sub(1)
            .and_then(|p| significant.get(p))
            .and_then(|&i| tokens.get(i))
            .is_some_and(DateToken::is_hour);
        let before_second = significant
            .get(pos + 1)
            .and_then(|&i| tokens.get(i))
            .is_some_and(DateToken::is_second);
        if after_hour || before_second {
            minutes.push((idx, *n));
        }
    }
    for (idx, n) in minutes {
        if let Some(token) = tokens.get_mut(idx) {
            *token = DateToken::Minute(n);
        }
    }
}

fn name_at(names: &[&'static str], idx: i64) -> &'static str {
    usize::try_from(idx)
        .ok()
        .and_then(|i| names.get(i))
        .copied()
        .unwrap_or_default()
}

/// Calendar date of a day serial.
///
/// The 1900 system counts the nonexistent 1900-02-29 as serial 60.
fn serial_to_date(days: i64, date1904: bool) -> (i64, i64, i64) {
    if !date1904 && days == 60 {
        return (1900, 2, 29);
    }
    // Offsets to days since 1970-01-01.
    let unix_days = if date1904 {
        days - 24_107
    } else if days < 60 {
        days - 25_568
    } else {
        days - 25_569
    };
    civil_from_days(unix_days)
}

/// Proleptic Gregorian `(year, month, day)` for days since 1970-01-01.
fn civil_from_days(days: i64) -> (i64, i64, i64) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = doy - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = yoe + era * 400 + i64::from(month <= 2);
    (year, month, day)
}
