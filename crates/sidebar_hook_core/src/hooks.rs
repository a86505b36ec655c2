//! The two post-merge sidebar hooks and the load/mutate/save pipeline they share.

use std::path::Path;

use anyhow::Result;
use serde_yaml::Value;

use crate::codec::DocumentCodec;
use crate::document::Document;
use crate::sidebar::{
    CONTENTS_KEY, contents, is_top_link, section_title_for, section_wrapper, set_collapse_level,
    sidebar_mut,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
    Applied,
    SidebarAbsent,
    ContentsAbsent,
}

impl MutationOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Applied => "applied",
            Self::SidebarAbsent => "sidebar-absent",
            Self::ContentsAbsent => "contents-absent",
        }
    }
}

pub trait SidebarMutation {
    fn name(&self) -> &'static str;

    fn apply(&self, document: &mut Document) -> MutationOutcome;

    /// Whether the document is rewritten even when nothing was applied.
    fn save_when_unapplied(&self) -> bool {
        false
    }
}

/// Hook A: drop the leading top link and nest the rest under one section.
#[derive(Debug, Clone)]
pub struct WrapSection {
    pub lang_id: String,
}

impl WrapSection {
    pub fn new(lang_id: impl Into<String>) -> Self {
        Self {
            lang_id: lang_id.into(),
        }
    }
}

impl SidebarMutation for WrapSection {
    fn name(&self) -> &'static str {
        "wrap-section"
    }

    fn apply(&self, document: &mut Document) -> MutationOutcome {
        let Some(sidebar) = sidebar_mut(document) else {
            return MutationOutcome::SidebarAbsent;
        };
        let Some(entries) = contents(sidebar) else {
            return MutationOutcome::ContentsAbsent;
        };

        let mut body = entries.clone();
        if body.first().is_some_and(is_top_link) {
            body.remove(0);
        }

        let wrapper = section_wrapper(section_title_for(&self.lang_id), body);
        sidebar.insert(Value::from(CONTENTS_KEY), Value::Sequence(vec![wrapper]));
        set_collapse_level(sidebar);
        MutationOutcome::Applied
    }

    fn save_when_unapplied(&self) -> bool {
        true
    }
}

/// Hook B: only set the expansion depth.
#[derive(Debug, Clone, Copy, Default)]
pub struct CollapseLevelOnly;

impl SidebarMutation for CollapseLevelOnly {
    fn name(&self) -> &'static str {
        "collapse-level"
    }

    fn apply(&self, document: &mut Document) -> MutationOutcome {
        match sidebar_mut(document) {
            Some(sidebar) => {
                set_collapse_level(sidebar);
                MutationOutcome::Applied
            }
            None => MutationOutcome::SidebarAbsent,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HookReport {
    pub outcome: MutationOutcome,
    pub wrote: bool,
}

pub fn run_hook(
    codec: &dyn DocumentCodec,
    path: &Path,
    mutation: &dyn SidebarMutation,
) -> Result<HookReport> {
    let mut document = codec.load(path)?;
    let outcome = mutation.apply(&mut document);
    let wrote = outcome == MutationOutcome::Applied || mutation.save_when_unapplied();
    if wrote {
        codec.save(path, &document)?;
    }
    Ok(HookReport { outcome, wrote })
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::codec::NativeYamlCodec;
    use crate::document::parse_yaml;
    use crate::sidebar::{ENGLISH_SECTION_TITLE, JAPANESE_SECTION_TITLE};
    use tempfile::tempdir;

    fn document(yaml: &str) -> Document {
        parse_yaml(yaml).expect("parse document")
    }

    #[test]
    fn wrap_section_drops_top_link_and_wraps_rest() {
        let mut input = document(
            r#"
website:
  sidebar:
    contents:
      - href: index.qmd
        text: トップ
      - text: A
      - text: B
"#,
        );
        let outcome = WrapSection::new("ja-JP").apply(&mut input);
        assert_eq!(outcome, MutationOutcome::Applied);

        let expected = document(
            r#"
website:
  sidebar:
    contents:
      - section: ハイパーグルーヴ理論
        contents:
          - text: A
          - text: B
    collapse-level: 3
"#,
        );
        assert_eq!(input, expected);
    }

    #[test]
    fn wrap_section_keeps_all_entries_without_top_link() {
        let mut input = document("website:\n  sidebar:\n    contents:\n      - text: A\n");
        WrapSection::new("en").apply(&mut input);

        let expected = document(
            r#"
website:
  sidebar:
    contents:
      - section: Hypergroove Theory
        contents:
          - text: A
    collapse-level: 3
"#,
        );
        assert_eq!(input, expected);
    }

    #[test]
    fn wrap_section_only_inspects_first_entry() {
        let mut input = document(
            r#"
website:
  sidebar:
    contents:
      - text: Intro
      - href: index.qmd
        text: トップ
      - plain-entry
"#,
        );
        WrapSection::new("en").apply(&mut input);
        let wrapped = &input["website"]["sidebar"]["contents"];
        assert_eq!(wrapped.as_sequence().map(Vec::len), Some(1));
        assert_eq!(wrapped[0]["section"].as_str(), Some(ENGLISH_SECTION_TITLE));
        let inner = wrapped[0]["contents"].as_sequence().expect("inner contents");
        assert_eq!(inner.len(), 3);
        assert_eq!(inner[0]["text"].as_str(), Some("Intro"));
        assert_eq!(inner[2].as_str(), Some("plain-entry"));
    }

    #[test]
    fn wrap_section_handles_lone_top_link_and_empty_contents() {
        let mut lone = document("website:\n  sidebar:\n    contents:\n      - href: index.qmd\n");
        WrapSection::new("ja").apply(&mut lone);
        let wrapped = &lone["website"]["sidebar"]["contents"][0];
        assert_eq!(wrapped["section"].as_str(), Some(JAPANESE_SECTION_TITLE));
        assert_eq!(wrapped["contents"].as_sequence().map(Vec::len), Some(0));

        let mut empty = document("website:\n  sidebar:\n    contents: []\n");
        assert_eq!(
            WrapSection::new("ja").apply(&mut empty),
            MutationOutcome::Applied
        );
        assert_eq!(
            empty["website"]["sidebar"]["contents"][0]["contents"]
                .as_sequence()
                .map(Vec::len),
            Some(0)
        );
    }

    #[test]
    fn wrap_section_preserves_surrounding_keys_and_order() {
        let mut input = document(
            r#"
project:
  type: website
website:
  title: Rhythmpress
  sidebar:
    style: docked
    contents:
      - text: A
    search: true
format: html
"#,
        );
        WrapSection::new("en").apply(&mut input);
        let sidebar = input["website"]["sidebar"].as_mapping().expect("sidebar");
        let keys = sidebar.keys().filter_map(Value::as_str).collect::<Vec<_>>();
        assert_eq!(keys, vec!["style", "contents", "search", "collapse-level"]);
        assert_eq!(input["format"].as_str(), Some("html"));
        assert_eq!(input["website"]["title"].as_str(), Some("Rhythmpress"));
    }

    #[test]
    fn wrap_section_is_noop_on_shape_mismatch() {
        for (yaml, outcome) in [
            ("project: {type: website}\n", MutationOutcome::SidebarAbsent),
            ("website: {title: T}\n", MutationOutcome::SidebarAbsent),
            ("website:\n  sidebar: [a]\n", MutationOutcome::SidebarAbsent),
            (
                "website:\n  sidebar:\n    style: docked\n",
                MutationOutcome::ContentsAbsent,
            ),
            (
                "website:\n  sidebar:\n    contents: auto\n",
                MutationOutcome::ContentsAbsent,
            ),
        ] {
            let original = document(yaml);
            let mut input = original.clone();
            assert_eq!(WrapSection::new("ja").apply(&mut input), outcome, "{yaml}");
            assert_eq!(input, original, "{yaml}");
        }
    }

    #[test]
    fn collapse_level_only_touches_depth() {
        let mut input = document(
            "website:\n  sidebar:\n    contents:\n      - href: index.qmd\n        text: トップ\n",
        );
        let before = input["website"]["sidebar"]["contents"].clone();
        assert_eq!(CollapseLevelOnly.apply(&mut input), MutationOutcome::Applied);
        assert_eq!(input["website"]["sidebar"]["contents"], before);
        assert_eq!(input["website"]["sidebar"]["collapse-level"].as_u64(), Some(3));

        let mut no_contents = document("website:\n  sidebar: {}\n");
        assert_eq!(
            CollapseLevelOnly.apply(&mut no_contents),
            MutationOutcome::Applied
        );
        assert_eq!(
            no_contents["website"]["sidebar"]["collapse-level"].as_u64(),
            Some(3)
        );
    }

    #[test]
    fn run_hook_rewrites_file_for_wrap_section() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("_sidebar-ja.generated.yml");
        fs::write(
            &path,
            "website:\n  sidebar:\n    contents:\n    - href: index.qmd\n      text: トップ\n    - text: A\n",
        )
        .expect("write yaml");

        let report = run_hook(&NativeYamlCodec, &path, &WrapSection::new("ja")).expect("run");
        assert_eq!(
            report,
            HookReport {
                outcome: MutationOutcome::Applied,
                wrote: true
            }
        );
        let written = fs::read_to_string(&path).expect("read back");
        assert_eq!(
            written,
            "website:\n  sidebar:\n    contents:\n    - section: ハイパーグルーヴ理論\n      contents:\n      - text: A\n    collapse-level: 3\n"
        );
    }

    #[test]
    fn run_hook_wrap_section_rewrites_even_without_sidebar() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("_quarto.yml");
        fs::write(&path, "project:   {type: website}\n").expect("write yaml");

        let report = run_hook(&NativeYamlCodec, &path, &WrapSection::new("en")).expect("run");
        assert_eq!(report.outcome, MutationOutcome::SidebarAbsent);
        assert!(report.wrote);
        let written = fs::read_to_string(&path).expect("read back");
        assert_eq!(parse_yaml(&written).expect("parse"), document("project: {type: website}\n"));
    }

    #[test]
    fn run_hook_collapse_level_writes_when_sidebar_present() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("_sidebar-en.generated.yml");
        fs::write(
            &path,
            "website:\n  sidebar:\n    contents:\n    - href: index.qmd\n      text: トップ\n    - text: A\n",
        )
        .expect("write yaml");
        let before = NativeYamlCodec.load(&path).expect("load input");

        let report = run_hook(&NativeYamlCodec, &path, &CollapseLevelOnly).expect("run");
        assert_eq!(
            report,
            HookReport {
                outcome: MutationOutcome::Applied,
                wrote: true
            }
        );

        let after = NativeYamlCodec.load(&path).expect("reload");
        assert_eq!(
            after["website"]["sidebar"]["contents"],
            before["website"]["sidebar"]["contents"]
        );
        assert_eq!(after["website"]["sidebar"]["collapse-level"].as_u64(), Some(3));
        let written = fs::read_to_string(&path).expect("read back");
        assert!(written.starts_with(
            "website:\n  sidebar:\n    contents:\n    - href: index.qmd\n      text: トップ\n    - text: A\n"
        ));
    }

    #[test]
    fn run_hook_collapse_level_skips_write_without_sidebar() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("_quarto.yml");
        let original = "project:   {type: website}\n";
        fs::write(&path, original).expect("write yaml");

        let report = run_hook(&NativeYamlCodec, &path, &CollapseLevelOnly).expect("run");
        assert_eq!(
            report,
            HookReport {
                outcome: MutationOutcome::SidebarAbsent,
                wrote: false
            }
        );
        assert_eq!(fs::read_to_string(&path).expect("read back"), original);
    }
}
