//! Inline style declarations
//!
//! The `style` attribute as an ordered list of `property: value` pairs.

use std::fmt;

/// CSS declaration (property: value)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub property: String,
    pub value: String,
    pub important: bool,
}

/// Parsed inline style, in source order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleDeclaration {
    declarations: Vec<Declaration>,
}

impl StyleDeclaration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a `style` attribute value. Malformed declarations are dropped;
    /// a repeated property keeps its last value.
    pub fn parse(style: &str) -> Self {
        let mut parsed = Self::new();
        for decl in style.split(';') {
            let Some((name, value)) = decl.split_once(':') else {
                continue;
            };
            let name = name.trim();
            let mut value = value.trim();
            if name.is_empty() || value.is_empty() {
                continue;
            }

            let mut important = false;
            if let Some(stripped) = strip_important(value) {
                value = stripped;
                important = true;
            }
            parsed.insert(Declaration {
                property: name.to_ascii_lowercase(),
                value: value.to_string(),
                important,
            });
        }
        parsed
    }

    fn insert(&mut self, decl: Declaration) {
        match self.declarations.iter_mut().find(|d| d.property == decl.property) {
            Some(existing) => *existing = decl,
            None => self.declarations.push(decl),
        }
    }

    pub fn get_property_value(&self, property: &str) -> Option<&str> {
        self.declarations.iter()
            .find(|d| d.property.eq_ignore_ascii_case(property))
            .map(|d| d.value.as_str())
    }

    /// Set a property; an empty value removes it
    pub fn set_property(&mut self, property: &str, value: &str) {
        let value = value.trim();
        if value.is_empty() {
            self.remove_property(property);
            return;
        }
        self.insert(Declaration {
            property: property.trim().to_ascii_lowercase(),
            value: value.to_string(),
            important: false,
        });
    }

    /// Remove a property, returning its old value
    pub fn remove_property(&mut self, property: &str) -> Option<String> {
        let pos = self.declarations.iter()
            .position(|d| d.property.eq_ignore_ascii_case(property))?;
        Some(self.declarations.remove(pos).value)
    }

    /// Serialized form, as written back to the `style` attribute
    pub fn css_text(&self) -> String {
        self.to_string()
    }

    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Declaration> {
        self.declarations.iter()
    }
}

impl fmt::Display for StyleDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, d) in self.declarations.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}: {}", d.property, d.value)?;
            if d.important {
                f.write_str(" !important")?;
            }
            f.write_str(";")?;
        }
        Ok(())
    }
}

fn strip_important(value: &str) -> Option<&str> {
    let bang = value.rfind('!')?;
    value[bang + 1..]
        .trim()
        .eq_ignore_ascii_case("important")
        .then(|| value[..bang].trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_inline_style() {
        let style = StyleDeclaration::parse("color: red; Margin:0 auto ;; bogus; width:");
        assert_eq!(style.len(), 2);
        assert_eq!(style.get_property_value("color"), Some("red"));
        assert_eq!(style.get_property_value("margin"), Some("0 auto"));
        assert_eq!(style.get_property_value("width"), None);
    }

    #[test]
    fn test_repeated_property_keeps_last() {
        let style = StyleDeclaration::parse("display: block; color: red; display: none");
        assert_eq!(style.css_text(), "display: none; color: red;");
    }

    #[test]
    fn test_important() {
        let style = StyleDeclaration::parse("color: red !important");
        let decl = style.iter().next().unwrap();
        assert!(decl.important);
        assert_eq!(decl.value, "red");
        assert_eq!(style.css_text(), "color: red !important;");
    }

    #[test]
    fn test_set_and_remove() {
        let mut style = StyleDeclaration::parse("color: red");
        style.set_property("display", "none");
        assert_eq!(style.css_text(), "color: red; display: none;");

        style.set_property("display", "");
        assert_eq!(style.get_property_value("display"), None);
        assert_eq!(style.remove_property("color"), Some("red".to_string()));
        assert!(style.is_empty());
        assert_eq!(style.css_text(), "");
    }
}
