//! Topic colors, the allocation palette, and topic normalization.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// The built-in palette, in allocation order.
pub const DEFAULT_PALETTE: &[&str] = &[
    "#FFE0E0", // Rose
    "#E0FFE0", // Mint
    "#E0E0FF", // Periwinkle
    "#FFE0FF", // Lilac
    "#FFFFE0", // Cream
    "#E0FFFF", // Ice
    "#FFE0E9", // Blush
    "#E9FFE0", // Pistachio
    "#E0EAFF", // Powder blue
    "#FFE9E0", // Peach
    "#F0E0FF", // Lavender
    "#E0FFE9", // Seafoam
];

/// Errors from parsing a color token.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid color '{0}': expected #RRGGBB")]
pub struct InvalidColor(pub String);

/// A display color in `#RRGGBB` form, stored upper-case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TopicColor(String);

impl TopicColor {
    /// Parse a `#RRGGBB` token (case-insensitive, surrounding whitespace ignored).
    ///
    /// # Examples
    /// ```
    /// use swipe_topics::TopicColor;
    /// assert_eq!(TopicColor::parse("#ffe0e0").unwrap().as_str(), "#FFE0E0");
    /// assert!(TopicColor::parse("FFE0E0").is_err());
    /// assert!(TopicColor::parse("#FFE0").is_err());
    /// ```
    pub fn parse(input: &str) -> Result<Self, InvalidColor> {
        let trimmed = input.trim();
        let valid = trimmed.len() == 7
            && trimmed.starts_with('#')
            && trimmed[1..].chars().all(|c| c.is_ascii_hexdigit());
        if !valid {
            return Err(InvalidColor(input.to_string()));
        }
        Ok(Self(trimmed.to_ascii_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TopicColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for TopicColor {
    type Error = InvalidColor;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<TopicColor> for String {
    fn from(color: TopicColor) -> Self {
        color.0
    }
}

/// Errors from building a palette.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PaletteError {
    #[error("Palette must contain at least one color")]
    Empty,

    #[error("Palette lists {0} more than once")]
    Duplicate(TopicColor),

    #[error(transparent)]
    InvalidColor(#[from] InvalidColor),
}

/// An ordered, non-empty, duplicate-free list of allocatable colors.
///
/// The first entry doubles as the default color: it is returned for empty
/// topics, after faults, and once every color is taken.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    colors: Vec<TopicColor>,
}

impl Palette {
    /// Build a palette from already-parsed colors.
    pub fn new(colors: Vec<TopicColor>) -> Result<Self, PaletteError> {
        if colors.is_empty() {
            return Err(PaletteError::Empty);
        }
        let mut seen = HashSet::new();
        for color in &colors {
            if !seen.insert(color) {
                return Err(PaletteError::Duplicate(color.clone()));
            }
        }
        Ok(Self { colors })
    }

    /// Build a palette from color tokens.
    pub fn parse<S: AsRef<str>>(tokens: &[S]) -> Result<Self, PaletteError> {
        let colors = tokens
            .iter()
            .map(|t| TopicColor::parse(t.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(colors)
    }

    /// The palette's first entry.
    pub fn default_color(&self) -> &TopicColor {
        &self.colors[0]
    }

    /// Colors in allocation order.
    pub fn colors(&self) -> &[TopicColor] {
        &self.colors
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn contains(&self, color: &TopicColor) -> bool {
        self.colors.contains(color)
    }

    /// First color, in palette order, that is not in `used`.
    ///
    /// Returns `None` when the palette is exhausted.
    pub fn first_unused(&self, used: &HashSet<TopicColor>) -> Option<&TopicColor> {
        self.colors.iter().find(|c| !used.contains(*c))
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            colors: DEFAULT_PALETTE
                .iter()
                .map(|c| TopicColor(c.to_string()))
                .collect(),
        }
    }
}

/// Canonical lookup key for a topic: trimmed and lower-cased.
///
/// Returns `None` for empty or whitespace-only input.
///
/// # Examples
/// ```
/// use swipe_topics::normalize_topic;
/// assert_eq!(normalize_topic("  Biology "), Some("biology".to_string()));
/// assert_eq!(normalize_topic("   "), None);
/// ```
pub fn normalize_topic(topic: &str) -> Option<String> {
    let trimmed = topic.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.to_lowercase())
}
