//! `show` command.

use anyhow::Result;
use serde_json::Value;

use super::common::Project;
use crate::runtime::{DataSource, FileDataProvider};

/// Entries of a collection as JSON, or a single entry when one is named.
pub fn render(
    provider: &impl DataSource,
    collection: &str,
    entry: Option<&str>,
    pretty: bool,
) -> Result<String> {
    let value = match entry {
        Some(entry) => serde_json::to_value(provider.entry(collection, entry)?)?,
        None => {
            let entries = provider
                .entries(collection)
                .collect::<Result<Vec<_>, _>>()?;
            serde_json::to_value(entries)?
        }
    };
    Ok(to_json(&value, pretty)?)
}

fn to_json(value: &Value, pretty: bool) -> serde_json::Result<String> {
    if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
}

/// Print entries of a collection to stdout.
pub fn show(project: &Project, collection: &str, entry: Option<&str>, pretty: bool) -> Result<()> {
    let provider = FileDataProvider::new(project.root(), project.config.registry()?);
    println!("{}", render(&provider, collection, entry, pretty)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::args::SelectArgs;
    use crate::cli::build::build;
    use crate::cli::common::tests::fixture;

    fn built() -> (tempfile::TempDir, FileDataProvider) {
        let (dir, project) = fixture();
        build(&project, &SelectArgs::default(), true).unwrap();
        let provider = FileDataProvider::new(project.root(), project.config.registry().unwrap());
        (dir, provider)
    }

    #[test]
    fn test_show_collection() {
        let (_dir, provider) = built();
        let json = render(&provider, "pages", None, false).unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();
        let keys: Vec<_> = value
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["key"].as_str().unwrap())
            .collect();
        assert_eq!(keys, ["guide/setup", "intro"]);
    }

    #[test]
    fn test_show_entry() {
        let (_dir, provider) = built();
        let json = render(&provider, "Posts", Some("hello"), true).unwrap();
        assert!(json.contains('\n'));
        let value: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["key"], "hello");
        assert_eq!(value["data"]["title"], "Hello");
    }

    #[test]
    fn test_show_unknown() {
        let (_dir, provider) = built();
        assert!(render(&provider, "nope", None, false).is_err());
        assert!(render(&provider, "pages", Some("missing"), false).is_err());
    }

    #[test]
    fn test_show_unbuilt_collection() {
        let (_dir, project) = fixture();
        let provider = FileDataProvider::new(project.root(), project.config.registry().unwrap());
        let err = render(&provider, "pages", None, false).unwrap_err();
        assert!(err.to_string().contains("lectern build"));
    }
}
