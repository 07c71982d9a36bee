//! Launcher item output
//!
//! Listing and search commands print `{ "items": [...] }`, the item format
//! consumed by Alfred-style launchers.

use miette::{IntoDiagnostic, Result};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Icon {
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LauncherItem {
    pub uid: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    pub arg: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<Icon>,
}

impl LauncherItem {
    pub fn new(uid: impl Into<String>, title: impl Into<String>, arg: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            title: title.into(),
            subtitle: None,
            arg: arg.into(),
            icon: None,
        }
    }

    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    pub fn with_icon(mut self, path: impl Into<String>) -> Self {
        self.icon = Some(Icon { path: path.into() });
        self
    }
}

#[derive(Serialize)]
struct ItemList<'a> {
    items: &'a [LauncherItem],
    #[serde(skip_serializing_if = "Option::is_none")]
    query: Option<&'a str>,
}

/// Render items (and the originating query, for searches) as pretty JSON
pub fn render_items(items: &[LauncherItem], query: Option<&str>) -> Result<String> {
    serde_json::to_string_pretty(&ItemList { items, query }).into_diagnostic()
}

pub fn print_items(items: &[LauncherItem], query: Option<&str>) -> Result<()> {
    println!("{}", render_items(items, query)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_items() {
        let items = vec![
            LauncherItem::new("T1", "Eng", "T1"),
            LauncherItem::new("U1", "Ann", "U1").with_icon("/home/a/.linear/icons/U1.png"),
        ];
        let value: serde_json::Value = serde_json::from_str(&render_items(&items, None).unwrap()).unwrap();

        assert_eq!(value["items"][0]["title"], "Eng");
        assert!(value["items"][0].get("icon").is_none());
        assert_eq!(value["items"][1]["icon"]["path"], "/home/a/.linear/icons/U1.png");
        assert!(value.get("query").is_none());
    }

    #[test]
    fn test_render_items_with_query() {
        let items = vec![LauncherItem::new("I1", "Crash", "ENG-1").with_subtitle("Mobile on start")];
        let value: serde_json::Value =
            serde_json::from_str(&render_items(&items, Some("crash")).unwrap()).unwrap();
        assert_eq!(value["query"], "crash");
        assert_eq!(value["items"][0]["subtitle"], "Mobile on start");
    }
}
