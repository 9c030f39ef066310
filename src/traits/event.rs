//! Raw pointer events as delivered by the host.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::element::ElementRef;

/// Which pointer button triggered an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerButton {
    /// Usually the left button.
    Primary,
    /// Usually the wheel button.
    Auxiliary,
    /// Usually the right button.
    Secondary,
    Other(u16),
}

impl PointerButton {
    /// Map a DOM `MouseEvent.button` index.
    pub fn from_index(index: u16) -> Self {
        match index {
            0 => PointerButton::Primary,
            1 => PointerButton::Auxiliary,
            2 => PointerButton::Secondary,
            n => PointerButton::Other(n),
        }
    }

    pub fn is_primary(&self) -> bool {
        matches!(self, PointerButton::Primary)
    }
}

/// A single keyboard modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modifier {
    Alt,
    Ctrl,
    Shift,
    Meta,
}

impl Modifier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Modifier::Alt => "alt",
            Modifier::Ctrl => "ctrl",
            Modifier::Shift => "shift",
            Modifier::Meta => "meta",
        }
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Modifier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "alt" | "option" => Ok(Modifier::Alt),
            "ctrl" | "control" => Ok(Modifier::Ctrl),
            "shift" => Ok(Modifier::Shift),
            "meta" | "cmd" | "command" => Ok(Modifier::Meta),
            other => Err(format!("unknown modifier '{}'", other)),
        }
    }
}

/// Modifier keys held while an event fired.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub alt: bool,
    pub ctrl: bool,
    pub shift: bool,
    pub meta: bool,
}

impl Modifiers {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn alt() -> Self {
        Self {
            alt: true,
            ..Self::default()
        }
    }

    pub fn contains(&self, modifier: Modifier) -> bool {
        match modifier {
            Modifier::Alt => self.alt,
            Modifier::Ctrl => self.ctrl,
            Modifier::Shift => self.shift,
            Modifier::Meta => self.meta,
        }
    }
}

/// A DOM-level event delivered to a registered listener.
#[derive(Debug, Clone)]
pub struct DomEvent {
    pub event_type: String,
    pub button: PointerButton,
    pub modifiers: Modifiers,
    /// Original (innermost) target of the event.
    pub target: Option<ElementRef>,
}

impl DomEvent {
    /// A `click` event with the given button, modifiers and target.
    pub fn click(button: PointerButton, modifiers: Modifiers, target: Option<ElementRef>) -> Self {
        Self {
            event_type: "click".to_string(),
            button,
            modifiers,
            target,
        }
    }

    /// A non-pointer event, such as a window `resize`.
    pub fn signal(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            button: PointerButton::Primary,
            modifiers: Modifiers::none(),
            target: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pointer_button_from_index() {
        assert_eq!(PointerButton::from_index(0), PointerButton::Primary);
        assert_eq!(PointerButton::from_index(1), PointerButton::Auxiliary);
        assert_eq!(PointerButton::from_index(2), PointerButton::Secondary);
        assert_eq!(PointerButton::from_index(4), PointerButton::Other(4));
        assert!(PointerButton::from_index(0).is_primary());
        assert!(!PointerButton::from_index(2).is_primary());
    }

    #[test]
    fn test_modifier_parse() {
        assert_eq!("Alt".parse::<Modifier>(), Ok(Modifier::Alt));
        assert_eq!("control".parse::<Modifier>(), Ok(Modifier::Ctrl));
        assert_eq!(" cmd ".parse::<Modifier>(), Ok(Modifier::Meta));
        assert!("hyper".parse::<Modifier>().is_err());
    }

    #[test]
    fn test_modifiers_contains() {
        let held = Modifiers::alt();
        assert!(held.contains(Modifier::Alt));
        assert!(!held.contains(Modifier::Shift));
        assert!(!Modifiers::none().contains(Modifier::Alt));
    }

    #[test]
    fn test_modifier_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Modifier::Ctrl).unwrap(), "\"ctrl\"");
        let parsed: Modifier = serde_json::from_str("\"shift\"").unwrap();
        assert_eq!(parsed, Modifier::Shift);
    }
}
