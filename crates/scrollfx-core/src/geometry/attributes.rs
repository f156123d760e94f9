//! Typed view of an element's `data-*` configuration
//!
//! Attributes are read once per scan and turned into an [`ElementConfig`], so
//! the geometry code never looks at raw strings.

use std::sync::OnceLock;

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::dom::{Document, ElementId};
use crate::{Error, Result};

pub const ATTR_SPEED: &str = "speed";
pub const ATTR_POSITION: &str = "position";
pub const ATTR_TARGET: &str = "target";
pub const ATTR_HORIZONTAL: &str = "horizontal";
pub const ATTR_STICKY: &str = "sticky";
pub const ATTR_STICKY_TARGET: &str = "sticky-target";
pub const ATTR_CALLBACK: &str = "callback";
pub const ATTR_REPEAT: &str = "repeat";
pub const ATTR_INVIEW_CLASS: &str = "inview-class";

/// Viewport reference point used by the parallax formula
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Anchor {
    Top,
    Bottom,
    #[default]
    Middle,
}

impl Anchor {
    /// Anything other than `top` or `bottom` falls back to `middle`
    pub fn from_attr(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("top") => Self::Top,
            Some("bottom") => Self::Bottom,
            _ => Self::Middle,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Bottom => "bottom",
            Self::Middle => "middle",
        }
    }
}

/// Visibility transition of a trigger element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Enter,
    Leave,
}

/// Which transitions fire a callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Way {
    #[default]
    Enter,
    Leave,
    Both,
}

impl Way {
    pub fn matches(&self, direction: Direction) -> bool {
        matches!(
            (self, direction),
            (Way::Both, _) | (Way::Enter, Direction::Enter) | (Way::Leave, Direction::Leave)
        )
    }
}

/// Parsed `data-callback` descriptor: `eventName:{key: value, ...}`
#[derive(Debug, Clone, PartialEq)]
pub struct CallbackSpec {
    pub event: String,
    pub options: Map<String, Value>,
}

impl CallbackSpec {
    /// Parse a compact descriptor whose object keys may be unquoted
    pub fn parse(descriptor: &str) -> Result<Self> {
        let fail = |reason: String| Error::CallbackParse {
            descriptor: descriptor.to_string(),
            reason,
        };

        let (event, rest) = descriptor
            .split_once(':')
            .ok_or_else(|| fail("expected 'event:{...}'".to_string()))?;
        let event = event.trim();
        if event.is_empty() {
            return Err(fail("empty event name".to_string()));
        }

        let rest = rest.trim();
        if !rest.starts_with('{') {
            return Err(fail("options must be an object".to_string()));
        }

        let normalized = quote_keys(rest);
        let options: Map<String, Value> =
            serde_json::from_str(&normalized).map_err(|e| fail(e.to_string()))?;

        Ok(Self {
            event: event.to_string(),
            options,
        })
    }

    /// The `way` option: `enter` (default), `leave` or `both`
    pub fn way(&self) -> Way {
        match self.options.get("way").and_then(Value::as_str) {
            Some("leave") => Way::Leave,
            Some("both") => Way::Both,
            _ => Way::Enter,
        }
    }
}

/// Wrap bare object keys in double quotes so the text parses as JSON
///
/// String literals are matched first and copied unchanged, so a `, word:`
/// inside a value is never taken for a key.
fn quote_keys(source: &str) -> String {
    static UNQUOTED_KEY: OnceLock<Regex> = OnceLock::new();
    let re = UNQUOTED_KEY.get_or_init(|| {
        Regex::new(r#""(?:[^"\\]|\\.)*"|([{,]\s*)([A-Za-z_$][A-Za-z0-9_$-]*)\s*:"#)
            .expect("valid key pattern")
    });
    re.replace_all(source, |caps: &Captures<'_>| match (caps.get(1), caps.get(2)) {
        (Some(lead), Some(key)) => format!("{}\"{}\":", lead.as_str(), key.as_str()),
        _ => caps[0].to_string(),
    })
    .into_owned()
}

/// Everything an element's attributes say about how it should animate
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ElementConfig {
    /// Usable parallax speed (raw attribute / 10); `Some` marks a parallax element
    pub speed: Option<f64>,
    pub position: Anchor,
    /// Reference to the element whose box is measured instead
    pub target: Option<String>,
    pub horizontal: bool,
    pub sticky: bool,
    pub sticky_target: Option<String>,
    pub callback: Option<CallbackSpec>,
    pub repeat: bool,
    pub inview_class: Option<String>,
}

impl ElementConfig {
    /// Read and parse the attributes of `element`
    ///
    /// Fails only on a malformed callback descriptor.
    pub fn read<D: Document + ?Sized>(doc: &D, element: ElementId) -> Result<Self> {
        let data = |key: &str| doc.data(element, key);

        let callback = match data(ATTR_CALLBACK) {
            Some(descriptor) => Some(CallbackSpec::parse(&descriptor)?),
            None => None,
        };

        Ok(Self {
            speed: data(ATTR_SPEED).as_deref().and_then(parse_speed),
            position: Anchor::from_attr(data(ATTR_POSITION).as_deref()),
            target: data(ATTR_TARGET).filter(|t| !t.trim().is_empty()),
            horizontal: is_truthy(data(ATTR_HORIZONTAL).as_deref()),
            sticky: data(ATTR_STICKY).is_some(),
            sticky_target: data(ATTR_STICKY_TARGET).filter(|t| !t.trim().is_empty()),
            callback,
            repeat: data(ATTR_REPEAT).is_some(),
            inview_class: data(ATTR_INVIEW_CLASS),
        })
    }

    pub fn is_parallax(&self) -> bool {
        self.speed.is_some()
    }
}

/// Integer part of a numeric attribute, divided by ten
fn parse_speed(raw: &str) -> Option<f64> {
    let value: f64 = raw.trim().parse().ok()?;
    value.is_finite().then(|| value.trunc() / 10.0)
}

fn is_truthy(value: Option<&str>) -> bool {
    match value.map(str::trim) {
        None | Some("") | Some("false") | Some("0") => false,
        Some(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_speed() {
        assert_eq!(parse_speed("5"), Some(0.5));
        assert_eq!(parse_speed("-3"), Some(-0.3));
        assert_eq!(parse_speed("0"), Some(0.0));
        assert_eq!(parse_speed("7.9"), Some(0.7));
        assert_eq!(parse_speed(" 2 "), Some(0.2));
        assert_eq!(parse_speed("fast"), None);
        assert_eq!(parse_speed(""), None);
        assert_eq!(parse_speed("inf"), None);
    }

    #[test]
    fn test_anchor_from_attr() {
        assert_eq!(Anchor::from_attr(Some("top")), Anchor::Top);
        assert_eq!(Anchor::from_attr(Some("bottom")), Anchor::Bottom);
        assert_eq!(Anchor::from_attr(Some("center")), Anchor::Middle);
        assert_eq!(Anchor::from_attr(None), Anchor::Middle);
    }

    #[test]
    fn test_callback_unquoted_keys() {
        let spec = CallbackSpec::parse("toggleLogo:{logo: 1, label: \"dark\"}").unwrap();
        assert_eq!(spec.event, "toggleLogo");
        assert_eq!(spec.options.get("logo"), Some(&json!(1)));
        assert_eq!(spec.options.get("label"), Some(&json!("dark")));
        assert_eq!(spec.way(), Way::Enter);
    }

    #[test]
    fn test_callback_boolean_values_and_quoted_keys() {
        let spec = CallbackSpec::parse("menu:{ \"open\": true, way: \"both\" }").unwrap();
        assert_eq!(spec.options.get("open"), Some(&json!(true)));
        assert_eq!(spec.way(), Way::Both);
    }

    #[test]
    fn test_callback_string_values_left_alone() {
        let spec =
            CallbackSpec::parse(r#"evt:{label: "a, b: c", note: "{x: \"y\"}", n: 2}"#).unwrap();
        assert_eq!(spec.options.get("label"), Some(&json!("a, b: c")));
        assert_eq!(spec.options.get("note"), Some(&json!("{x: \"y\"}")));
        assert_eq!(spec.options.get("n"), Some(&json!(2)));
    }

    #[test]
    fn test_callback_empty_options() {
        let spec = CallbackSpec::parse("reveal:{}").unwrap();
        assert!(spec.options.is_empty());
    }

    #[test]
    fn test_callback_malformed() {
        for bad in ["noColon", ":{a: 1}", "evt:[1, 2]", "evt:{a: }", "evt:{a: 'x'}"] {
            let err = CallbackSpec::parse(bad).unwrap_err();
            assert!(matches!(err, Error::CallbackParse { .. }), "{bad}");
        }
    }

    #[test]
    fn test_way_matches() {
        assert!(Way::Enter.matches(Direction::Enter));
        assert!(!Way::Enter.matches(Direction::Leave));
        assert!(Way::Leave.matches(Direction::Leave));
        assert!(Way::Both.matches(Direction::Enter));
        assert!(Way::Both.matches(Direction::Leave));
    }

    #[test]
    fn test_truthy() {
        assert!(is_truthy(Some("true")));
        assert!(is_truthy(Some("1")));
        assert!(!is_truthy(Some("")));
        assert!(!is_truthy(Some("false")));
        assert!(!is_truthy(None));
    }
}
